//! Cross-document links over the import graph.
//!
//! Links are path handles, never pointers between documents: document A
//! importing document B stores only B's resolved path, owned by the link
//! table, so reference cycles in the import graph cannot keep documents
//! alive or leak.

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::project::ImportResolver;

use super::nodes::ParsedDocument;

/// Resolved import edges, one entry per document, aligned by index with the
/// document's `imports` collection. `None` marks an import that did not
/// resolve; it contributes nothing downstream.
#[derive(Debug, Default)]
pub struct LinkTable {
    edges: FxHashMap<PathBuf, Vec<Option<PathBuf>>>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-resolve every import of one document.
    pub fn link_document(&mut self, document: &ParsedDocument, resolver: &dyn ImportResolver) {
        let targets: Vec<Option<PathBuf>> = document
            .imports
            .iter()
            .map(|import| {
                let resolved = resolver.resolve(&import.specifier, &document.path);
                if resolved.is_none() {
                    tracing::debug!(
                        "unresolved import '{}' in {}",
                        import.specifier,
                        document.path.display()
                    );
                }
                resolved
            })
            .collect();
        self.edges.insert(document.path.clone(), targets);
    }

    pub fn unlink(&mut self, path: &Path) {
        self.edges.remove(path);
    }

    /// Resolved target of import `index` of the given document.
    pub fn import_target(&self, path: &Path, index: usize) -> Option<&PathBuf> {
        self.edges.get(path)?.get(index)?.as_ref()
    }

    /// Resolved targets of all imports of the given document.
    pub fn imports_of(&self, path: &Path) -> impl Iterator<Item = &PathBuf> {
        self.edges
            .get(path)
            .into_iter()
            .flatten()
            .filter_map(|target| target.as_ref())
    }

    /// Documents that directly import `target`.
    pub fn direct_importers(&self, target: &Path) -> Vec<&PathBuf> {
        self.edges
            .iter()
            .filter(|(_, targets)| {
                targets
                    .iter()
                    .any(|t| t.as_deref() == Some(target))
            })
            .map(|(path, _)| path)
            .collect()
    }
}

/// Per-query memo for reverse-edge traversal. One walk object guards one
/// query; visited (importer, imported) pairs are never expanded twice, which
/// terminates cycles and collapses diamonds.
#[derive(Debug, Default)]
pub struct ReferenceWalk {
    visited: FxHashSet<(PathBuf, PathBuf)>,
}

impl ReferenceWalk {
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents that reach `target` through imports, directly or
    /// transitively. The target itself is not included.
    pub fn documents_that_reference(
        &mut self,
        table: &LinkTable,
        target: &Path,
    ) -> Vec<PathBuf> {
        let mut found = Vec::new();
        self.walk(table, target, &mut found);
        // A document cycling back to the target is not a "referencing"
        // document of itself.
        found.retain(|path| path != target);
        found
    }

    fn walk(&mut self, table: &LinkTable, target: &Path, found: &mut Vec<PathBuf>) {
        for importer in table.direct_importers(target) {
            let pair = (importer.clone(), target.to_path_buf());
            if !self.visited.insert(pair) {
                continue;
            }
            if !found.contains(importer) {
                found.push(importer.clone());
            }
            let importer = importer.clone();
            self.walk(table, &importer, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::build_document;
    use rustc_hash::FxHashMap;

    /// Fixed-table resolver for tests that need no filesystem.
    struct MapResolver(FxHashMap<String, PathBuf>);

    impl ImportResolver for MapResolver {
        fn resolve(&self, specifier: &str, _from: &Path) -> Option<PathBuf> {
            self.0.get(specifier).cloned()
        }
    }

    fn doc(path: &str, text: &str) -> ParsedDocument {
        build_document(Path::new(path), text)
    }

    fn linked_chain() -> LinkTable {
        // b imports a, c imports b, d imports nothing.
        let a = doc("/a.sol", "contract A {}");
        let b = doc("/b.sol", "import \"/a.sol\";\ncontract B {}");
        let c = doc("/c.sol", "import \"/b.sol\";\ncontract C {}");
        let d = doc("/d.sol", "contract D {}");

        let resolver = MapResolver(FxHashMap::from_iter([
            ("/a.sol".to_string(), PathBuf::from("/a.sol")),
            ("/b.sol".to_string(), PathBuf::from("/b.sol")),
        ]));

        let mut table = LinkTable::new();
        for document in [&a, &b, &c, &d] {
            table.link_document(document, &resolver);
        }
        table
    }

    #[test]
    fn test_import_targets_align_with_imports() {
        let table = linked_chain();
        assert_eq!(
            table.import_target(Path::new("/b.sol"), 0),
            Some(&PathBuf::from("/a.sol"))
        );
        assert_eq!(table.import_target(Path::new("/b.sol"), 1), None);
    }

    #[test]
    fn test_transitive_importers() {
        let table = linked_chain();
        let mut walk = ReferenceWalk::new();
        let referencing = walk.documents_that_reference(&table, Path::new("/a.sol"));
        assert!(referencing.contains(&PathBuf::from("/b.sol")));
        assert!(referencing.contains(&PathBuf::from("/c.sol")));
        assert!(!referencing.contains(&PathBuf::from("/d.sol")));
        assert!(!referencing.contains(&PathBuf::from("/a.sol")));
    }

    #[test]
    fn test_cyclic_imports_terminate() {
        let x = doc("/x.sol", "import \"/y.sol\";\ncontract X {}");
        let y = doc("/y.sol", "import \"/x.sol\";\ncontract Y {}");
        let resolver = MapResolver(FxHashMap::from_iter([
            ("/x.sol".to_string(), PathBuf::from("/x.sol")),
            ("/y.sol".to_string(), PathBuf::from("/y.sol")),
        ]));
        let mut table = LinkTable::new();
        table.link_document(&x, &resolver);
        table.link_document(&y, &resolver);

        let mut walk = ReferenceWalk::new();
        let referencing = walk.documents_that_reference(&table, Path::new("/x.sol"));
        assert_eq!(referencing, vec![PathBuf::from("/y.sol")]);
    }

    #[test]
    fn test_unresolved_import_contributes_nothing() {
        let b = doc("/b.sol", "import \"ghost/Nothing.sol\";\ncontract B {}");
        let resolver = MapResolver(FxHashMap::default());
        let mut table = LinkTable::new();
        table.link_document(&b, &resolver);
        assert_eq!(table.import_target(Path::new("/b.sol"), 0), None);
        assert_eq!(table.imports_of(Path::new("/b.sol")).count(), 0);
    }
}
