//! AnalysisHost and Analysis — unified state management for IDE features.
//!
//! The `AnalysisHost` owns all mutable state (project, raw sources, the
//! document cache) and hands out `Analysis` snapshots for querying, so a
//! batch of queries always sees one consistent workspace.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::project::{ImportResolver, Project, SourceDocumentStore};
use crate::semantic::nodes::ParsedDocument;
use crate::semantic::type_ref::{Location, TypeReference};
use crate::semantic::workspace::Workspace;

use super::completion::{CompletionItem, completions};
use super::goto::goto_definition;
use super::hover::{HoverResult, hover};
use super::references::find_references;

/// Import resolution without a project: relative specifiers resolve
/// lexically, anything else is taken verbatim as a path. Enough for
/// single-file use and tests.
struct StandaloneResolver;

impl ImportResolver for StandaloneResolver {
    fn resolve(&self, specifier: &str, from: &Path) -> Option<PathBuf> {
        if specifier.starts_with('.') {
            let base = from.parent().unwrap_or(Path::new(""));
            let mut out = base.to_path_buf();
            for segment in specifier.split(['/', '\\']).filter(|s| !s.is_empty()) {
                match segment {
                    "." => {}
                    ".." => {
                        out.pop();
                    }
                    other => out.push(other),
                }
            }
            Some(out)
        } else {
            Some(PathBuf::from(specifier))
        }
    }
}

/// Owns all mutable state for the IDE layer.
///
/// Apply changes via `set_file_content()` / `remove_file()`, then take a
/// consistent snapshot via `analysis()`.
#[derive(Default)]
pub struct AnalysisHost {
    project: Option<Project>,
    store: SourceDocumentStore,
    workspace: Workspace,
}

impl AnalysisHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the project at `root` and index every source file it knows:
    /// each file is read and parsed once, then all documents are linked in
    /// one pass.
    pub fn open_project(&mut self, root: &Path) {
        let project = Project::load(root);
        let files = project.source_files();
        tracing::debug!("indexing {} project files", files.len());
        self.project = Some(project);
        for path in files {
            self.load_and_parse(&path, None);
        }
        self.relink();
    }

    /// Replace one file's content, rebuild its document, and re-link the
    /// workspace.
    pub fn set_file_content(&mut self, path: &Path, text: &str) {
        self.load_and_parse(path, Some(text.to_string()));
        self.relink();
    }

    pub fn remove_file(&mut self, path: &Path) {
        self.store.remove(path);
        self.workspace.remove(path);
        self.relink();
    }

    pub fn has_file(&self, path: &Path) -> bool {
        self.workspace.get(path).is_some()
    }

    pub fn file_count(&self) -> usize {
        self.workspace.len()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn document(&self, path: &Path) -> Option<&Arc<ParsedDocument>> {
        self.workspace.get(path)
    }

    /// A consistent snapshot for queries.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis {
            workspace: &self.workspace,
        }
    }

    fn load_and_parse(&mut self, path: &Path, text: Option<String>) {
        if self.store.load(path, text).is_none() {
            tracing::debug!("could not read {}", path.display());
            return;
        }
        self.rewrite_bare_imports(path);
        let Some(source) = self.store.get(path) else {
            return;
        };
        let text = source.text.clone();
        self.workspace.document_for(path, &text);
    }

    /// Rewrite resolvable non-relative specifiers to absolute paths in the
    /// raw text, so the parsed document's imports are directly usable.
    fn rewrite_bare_imports(&mut self, path: &Path) {
        let Some(project) = &self.project else {
            return;
        };
        let Some(source) = self.store.get(path) else {
            return;
        };
        let rewrites: Vec<(String, PathBuf)> = source
            .imports
            .iter()
            .filter(|import| !import.specifier.starts_with('.'))
            .filter_map(|import| {
                project
                    .resolve_import(&import.specifier, path)
                    .map(|resolved| (import.specifier.clone(), resolved))
            })
            .collect();
        if rewrites.is_empty() {
            return;
        }
        if let Some(source) = self.store.get_mut(path) {
            for (specifier, resolved) in rewrites {
                source.rewrite_import(&specifier, &resolved);
            }
        }
    }

    fn relink(&mut self) {
        match &self.project {
            Some(project) => self.workspace.relink_all(project),
            None => self.workspace.relink_all(&StandaloneResolver),
        }
    }
}

/// An immutable view over the workspace for running queries.
pub struct Analysis<'a> {
    workspace: &'a Workspace,
}

impl Analysis<'_> {
    pub fn goto_definition(&self, path: &Path, offset: usize) -> Vec<TypeReference> {
        goto_definition(self.workspace, path, offset)
    }

    pub fn find_references(&self, path: &Path, offset: usize) -> Vec<Location> {
        find_references(self.workspace, path, offset)
    }

    pub fn hover(&self, path: &Path, offset: usize) -> Option<HoverResult> {
        hover(self.workspace, path, offset)
    }

    pub fn completions(&self, path: &Path, offset: usize) -> Vec<CompletionItem> {
        completions(self.workspace, path, offset)
    }
}
