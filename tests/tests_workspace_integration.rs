//! Workspace behavior through the host: document reuse across edits,
//! reference reachability over the import graph, and parse recovery.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use soli::ide::AnalysisHost;

#[test]
fn test_editing_one_file_keeps_other_documents_cached() {
    let mut host = AnalysisHost::new();
    host.set_file_content(Path::new("/a.sol"), "contract A {}");
    host.set_file_content(Path::new("/b.sol"), "import \"/a.sol\";\ncontract B {}");

    let a_before = Arc::clone(host.document(Path::new("/a.sol")).unwrap());
    let b_before = Arc::clone(host.document(Path::new("/b.sol")).unwrap());

    host.set_file_content(Path::new("/b.sol"), "import \"/a.sol\";\ncontract B2 {}");

    assert!(Arc::ptr_eq(&a_before, host.document(Path::new("/a.sol")).unwrap()));
    assert!(!Arc::ptr_eq(&b_before, host.document(Path::new("/b.sol")).unwrap()));
}

#[test]
fn test_reference_reachability_follows_import_chain() {
    let mut host = AnalysisHost::new();
    host.set_file_content(Path::new("/a.sol"), "contract A {}");
    host.set_file_content(Path::new("/b.sol"), "import \"/a.sol\";\ncontract B {}");
    host.set_file_content(Path::new("/c.sol"), "import \"/b.sol\";\ncontract C {}");
    host.set_file_content(Path::new("/d.sol"), "contract D {}");

    let referencing = host
        .workspace()
        .documents_that_reference(Path::new("/a.sol"));

    assert!(referencing.contains(&PathBuf::from("/b.sol")));
    assert!(referencing.contains(&PathBuf::from("/c.sol")));
    assert!(!referencing.contains(&PathBuf::from("/d.sol")));
    assert!(!referencing.contains(&PathBuf::from("/a.sol")));
}

#[test]
fn test_recovery_keeps_cross_file_resolution_working() {
    let a = "struct S { uint256 v; }";
    // The half-typed line is blanked by recovery; the import and the state
    // variable around it must keep resolving.
    let b = "import \"/a.sol\";\ncontract B {\n    S state;\n    uint256 broken broken broken\n    uint256 ok;\n}";
    let mut host = AnalysisHost::new();
    host.set_file_content(Path::new("/a.sol"), a);
    host.set_file_content(Path::new("/b.sol"), b);

    let offset = b.find("S state").unwrap();
    let results = host.analysis().goto_definition(Path::new("/b.sol"), offset);
    let target = results[0].target.as_ref().expect("resolved");
    assert_eq!(target.path, PathBuf::from("/a.sol"));
    assert_eq!(target.name, "S");

    // Spans of surviving declarations still index the original text.
    let document = host.document(Path::new("/b.sol")).unwrap();
    let ok = document.contracts[0]
        .variable_named("ok")
        .expect("declaration after the broken line survives");
    assert_eq!(&b[ok.name_span.start..ok.name_span.end], "ok");
}

#[test]
fn test_removing_a_file_breaks_its_links() {
    let mut host = AnalysisHost::new();
    host.set_file_content(Path::new("/a.sol"), "contract A {}");
    host.set_file_content(Path::new("/b.sol"), "import \"/a.sol\";\ncontract B is A {}");

    let offset = "import \"/a.sol\";\ncontract B is A {}".find("A {}").unwrap();
    let before = host.analysis().goto_definition(Path::new("/b.sol"), offset);
    assert!(before[0].target.is_some());

    host.remove_file(Path::new("/a.sol"));
    let after = host.analysis().goto_definition(Path::new("/b.sol"), offset);
    assert!(after[0].target.is_none());
}
