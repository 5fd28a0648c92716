//! Project loading end to end: build-tool config on disk, remappings,
//! dependency discovery, and indexing through `AnalysisHost::open_project`.

use std::fs;
use std::path::{Path, PathBuf};

use rstest::rstest;

use soli::ide::AnalysisHost;
use soli::project::{Project, ProjectConfig};

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_open_foundry_project_indexes_all_sources() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(
        &root.join("foundry.toml"),
        "[profile.default]\nsrc = \"src\"\nremappings = [\"@oz/=lib/oz/src/\"]\n",
    );
    write(
        &root.join("src/App.sol"),
        "import \"@oz/Token.sol\";\ncontract App is Token {}\n",
    );
    write(
        &root.join("lib/oz/src/Token.sol"),
        "contract Token { uint256 total; }\n",
    );

    let mut host = AnalysisHost::new();
    host.open_project(root);

    assert_eq!(host.file_count(), 2);
    assert!(host.has_file(&root.join("src/App.sol")));
    assert!(host.has_file(&root.join("lib/oz/src/Token.sol")));
}

#[test]
fn test_goto_definition_through_remapped_import() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(
        &root.join("foundry.toml"),
        "[profile.default]\nsrc = \"src\"\nremappings = [\"@oz/=lib/oz/src/\"]\n",
    );
    write(
        &root.join("src/App.sol"),
        "import \"@oz/Token.sol\";\ncontract App is Token {}\n",
    );
    write(
        &root.join("lib/oz/src/Token.sol"),
        "contract Token { uint256 total; }\n",
    );

    let mut host = AnalysisHost::new();
    host.open_project(root);

    // Bare specifiers get rewritten to resolved paths before parsing, so
    // offsets come from the stored text, not the on-disk source.
    let app = root.join("src/App.sol");
    let text = host.document(&app).expect("App.sol indexed").text.clone();
    let offset = text.find("Token {}").expect("inheritance reference");

    let results = host.analysis().goto_definition(&app, offset);
    let target = results[0].target.as_ref().expect("resolved");
    assert_eq!(target.name, "Token");
    assert_eq!(target.path, root.join("lib/oz/src/Token.sol"));
}

#[rstest]
#[case("@x/One.sol", "libA/One.sol")]
#[case("@x/sub/Two.sol", "libB/Two.sol")]
fn test_longest_remapping_prefix_wins(#[case] specifier: &str, #[case] expected: &str) {
    let config = ProjectConfig {
        source_dir: None,
        remappings: Some(vec!["@x/=libA/".to_string(), "@x/sub/=libB/".to_string()]),
    };
    let project = Project::with_config(Path::new("/p"), config);

    assert_eq!(
        project.resolve_import(specifier, Path::new("/p/src/Main.sol")),
        Some(PathBuf::from("/p").join(expected))
    );
}

#[test]
fn test_remappings_txt_project() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(&root.join("remappings.txt"), "@dep/=vendor/dep/\n");
    write(&root.join("vendor/dep/Util.sol"), "library Util {}\n");

    let project = Project::load(root);
    assert_eq!(
        project.resolve_import("@dep/Util.sol", &root.join("Main.sol")),
        Some(root.join("vendor/dep/Util.sol"))
    );
}

#[test]
fn test_unresolvable_bare_import_keeps_specifier_unlinked() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(&root.join("src/App.sol"), "import \"ghost/Gone.sol\";\ncontract App {}\n");

    let mut host = AnalysisHost::new();
    host.open_project(root);

    let app = root.join("src/App.sol");
    assert!(host.has_file(&app));
    let links = host.workspace().links();
    assert_eq!(links.import_target(&app, 0), None);
}
