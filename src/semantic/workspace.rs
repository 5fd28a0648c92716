//! The document cache.
//!
//! At most one live `ParsedDocument` per absolute path. Requesting a
//! document for text identical to the cached version returns the identical
//! `Arc` — that reuse is what makes repeated queries over an unchanged
//! workspace cheap, and it is the invariant everything downstream leans on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::project::ImportResolver;

use super::builder::build_document;
use super::linker::{LinkTable, ReferenceWalk};
use super::nodes::ParsedDocument;

#[derive(Debug, Default)]
pub struct Workspace {
    documents: IndexMap<PathBuf, Arc<ParsedDocument>>,
    links: LinkTable,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document for `path` at exactly this text.
    ///
    /// Returns the cached instance unchanged when the text matches;
    /// otherwise builds a replacement. After a rebuild the caller must
    /// [`Workspace::relink_all`] — other documents' links may now point at
    /// stale or new imports.
    pub fn document_for(&mut self, path: &Path, text: &str) -> Arc<ParsedDocument> {
        if let Some(existing) = self.documents.get(path) {
            if existing.text == text {
                return Arc::clone(existing);
            }
        }
        tracing::debug!("building document for {}", path.display());
        let document = Arc::new(build_document(path, text));
        self.documents
            .insert(path.to_path_buf(), Arc::clone(&document));
        document
    }

    pub fn get(&self, path: &Path) -> Option<&Arc<ParsedDocument>> {
        self.documents.get(path)
    }

    pub fn remove(&mut self, path: &Path) -> Option<Arc<ParsedDocument>> {
        self.links.unlink(path);
        self.documents.shift_remove(path)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Arc<ParsedDocument>> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Re-resolve the imports of every cached document. Runs after any
    /// document mutation and once after startup indexing.
    pub fn relink_all(&mut self, resolver: &dyn ImportResolver) {
        for document in self.documents.values() {
            self.links.link_document(document, resolver);
        }
    }

    /// The document a resolved import of `path` points at.
    pub fn imported_document(&self, path: &Path, index: usize) -> Option<&Arc<ParsedDocument>> {
        let target = self.links.import_target(path, index)?;
        self.documents.get(target)
    }

    /// Paths of documents that import `target`, directly or transitively.
    pub fn documents_that_reference(&self, target: &Path) -> Vec<PathBuf> {
        let mut walk = ReferenceWalk::new();
        walk.documents_that_reference(&self.links, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoResolver;
    impl ImportResolver for NoResolver {
        fn resolve(&self, _specifier: &str, _from: &Path) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn test_same_text_returns_identical_arc() {
        let mut workspace = Workspace::new();
        let first = workspace.document_for(Path::new("/a.sol"), "contract A {}");
        let second = workspace.document_for(Path::new("/a.sol"), "contract A {}");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_changed_text_rebuilds() {
        let mut workspace = Workspace::new();
        let first = workspace.document_for(Path::new("/a.sol"), "contract A {}");
        let second = workspace.document_for(Path::new("/a.sol"), "contract A2 {}");
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.contracts[0].name, "A2");
        // The old version stays usable for holders of the Arc.
        assert_eq!(first.contracts[0].name, "A");
    }

    #[test]
    fn test_remove_unlinks() {
        let mut workspace = Workspace::new();
        workspace.document_for(Path::new("/a.sol"), "contract A {}");
        workspace.relink_all(&NoResolver);
        assert!(workspace.remove(Path::new("/a.sol")).is_some());
        assert!(workspace.get(Path::new("/a.sol")).is_none());
        assert!(workspace.is_empty());
    }
}
