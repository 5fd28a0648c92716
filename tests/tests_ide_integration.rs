//! IDE features across files: goto through aliased imports, hover with
//! doc comments, completion over namespaces and using-for extensions.

use std::path::{Path, PathBuf};

use soli::ide::{AnalysisHost, CompletionKind};

#[test]
fn test_goto_through_aliased_import() {
    let a = "contract Token { function mint() public {} }";
    let b = "import {Token as Coin} from \"/a.sol\";\ncontract B { function f() public { Coin c; } }";
    let mut host = AnalysisHost::new();
    host.set_file_content(Path::new("/a.sol"), a);
    host.set_file_content(Path::new("/b.sol"), b);

    let offset = b.find("Coin c").unwrap();
    let results = host.analysis().goto_definition(Path::new("/b.sol"), offset);
    let target = results[0].target.as_ref().expect("resolved");
    assert_eq!(target.path, PathBuf::from("/a.sol"));
    // The declaration keeps its own name; only the importing file sees the
    // alias.
    assert_eq!(target.name, "Token");
}

#[test]
fn test_hover_cross_file_shows_doc_comment() {
    let a = "/// @notice The canonical token.\ncontract Token {}";
    let b = "import \"/a.sol\";\ncontract B is Token {}";
    let mut host = AnalysisHost::new();
    host.set_file_content(Path::new("/a.sol"), a);
    host.set_file_content(Path::new("/b.sol"), b);

    let offset = b.find("Token {}").unwrap();
    let result = host.analysis().hover(Path::new("/b.sol"), offset).expect("hover");
    assert!(result.contents.contains("contract Token"));
    assert!(result.contents.contains("@notice The canonical token."));
    assert_eq!(result.target.path, PathBuf::from("/a.sol"));
}

#[test]
fn test_completion_after_namespace_alias_dot() {
    let a = "contract Token {}\nstruct Shape { uint256 sides; }";
    let b = "import * as lib from \"/a.sol\";\ncontract B {\n    function f() public {\n        lib.\n    }\n}";
    let mut host = AnalysisHost::new();
    host.set_file_content(Path::new("/a.sol"), a);
    host.set_file_content(Path::new("/b.sol"), b);

    let offset = b.find("lib.").unwrap() + "lib.".len();
    let items = host.analysis().completions(Path::new("/b.sol"), offset);
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert!(labels.contains(&"Token"));
    assert!(labels.contains(&"Shape"));
}

#[test]
fn test_completion_extension_scoped_to_matching_type() {
    let lib = "library MathExt { function double(uint256 v) internal pure returns (uint256) {} }";
    let user = "import \"/ext.sol\";\ncontract C {\n    using MathExt for uint256;\n    uint256 n;\n    bool flag;\n    function f() public {\n        n.\n    }\n}";
    let mut host = AnalysisHost::new();
    host.set_file_content(Path::new("/ext.sol"), lib);
    host.set_file_content(Path::new("/c.sol"), user);

    let offset = user.find("n.").unwrap() + "n.".len();
    let items = host.analysis().completions(Path::new("/c.sol"), offset);
    assert!(items.iter().any(|i| i.label == "double"));
}

#[test]
fn test_references_span_importing_files() {
    let a = "contract Token { function mint() public {} }";
    let b = "import \"/a.sol\";\ncontract B is Token { function g() public { mint(); } }";
    let mut host = AnalysisHost::new();
    host.set_file_content(Path::new("/a.sol"), a);
    host.set_file_content(Path::new("/b.sol"), b);

    let offset = a.find("mint").unwrap();
    let references = host.analysis().find_references(Path::new("/a.sol"), offset);

    // Declaration first, then the call through the inherited scope.
    assert_eq!(references[0].path, PathBuf::from("/a.sol"));
    assert!(references.iter().any(|r| r.path == PathBuf::from("/b.sol")));
}

#[test]
fn test_completion_import_string_lists_workspace_files() {
    let mut host = AnalysisHost::new();
    host.set_file_content(Path::new("/a.sol"), "contract A {}");
    host.set_file_content(Path::new("/b.sol"), "contract B {}");
    let source = "import \"";
    host.set_file_content(Path::new("/new.sol"), source);

    let items = host.analysis().completions(Path::new("/new.sol"), source.len());
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.kind == CompletionKind::File));
}
