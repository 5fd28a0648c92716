//! Dependency packages: one node per source root.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use super::remapping::Remapping;

/// Directories scanned for dependency packages, in order.
const LIB_DIRS: &[&str] = &["lib", "node_modules"];

/// Source subdirectories probed when a package is constructed, in order.
const SOURCE_SUBDIRS: &[&str] = &["src", "contracts"];

/// A source root: the project itself or one dependency.
///
/// Packages form a tree (a dependency's own `lib/` is scanned too); the tree
/// is acyclic by construction because a package name is only descended into
/// once per discovery pass.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub root_path: PathBuf,
    /// Subdirectory holding sources (`src`, `contracts`), empty when sources
    /// sit directly in the root.
    pub source_subdir: String,
    pub libs: Vec<Package>,
    /// The subset of the project remappings whose target lies under this
    /// package.
    pub remappings: Vec<Remapping>,
}

impl Package {
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        let root_path = root_path.into();
        let source_subdir = SOURCE_SUBDIRS
            .iter()
            .find(|sub| root_path.join(sub).is_dir())
            .map(|sub| (*sub).to_string())
            .unwrap_or_default();
        Self {
            name: name.into(),
            root_path,
            source_subdir,
            libs: Vec::new(),
            remappings: Vec::new(),
        }
    }

    /// Like `new`, but with an explicitly configured source subdirectory.
    pub fn with_source_subdir(
        name: impl Into<String>,
        root_path: impl Into<PathBuf>,
        source_subdir: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
            source_subdir: source_subdir.into(),
            libs: Vec::new(),
            remappings: Vec::new(),
        }
    }

    /// Directory in which this package's sources live.
    pub fn source_root(&self) -> PathBuf {
        if self.source_subdir.is_empty() {
            self.root_path.clone()
        } else {
            self.root_path.join(&self.source_subdir)
        }
    }

    /// Does a specifier name this package (`pkg/...` or exactly `pkg`)?
    pub fn is_import_for_this(&self, specifier: &str) -> bool {
        let first = specifier
            .split(['/', '\\'])
            .next()
            .unwrap_or(specifier);
        first == self.name
    }

    /// Does the given file live under this package?
    pub fn is_file_for_this(&self, path: &Path) -> bool {
        path.starts_with(&self.root_path)
    }

    /// Resolve `pkg/rest/of/path.sol` under this package's source root, then
    /// under the bare root as a fallback for packages that keep sources at
    /// the top level despite having a `src/` directory.
    pub fn resolve_import(&self, specifier: &str) -> Option<PathBuf> {
        if !self.is_import_for_this(specifier) {
            return None;
        }
        let rest: Vec<_> = specifier
            .split(['/', '\\'])
            .skip(1)
            .filter(|s| !s.is_empty())
            .collect();

        let mut candidate = self.source_root();
        for segment in &rest {
            candidate.push(segment);
        }
        if candidate.exists() || self.source_subdir.is_empty() {
            return Some(candidate);
        }

        let mut fallback = self.root_path.clone();
        for segment in &rest {
            fallback.push(segment);
        }
        if fallback.exists() {
            Some(fallback)
        } else {
            Some(candidate)
        }
    }

    /// Keep only the remappings whose target lies under this package.
    pub fn adopt_remappings(&mut self, all: &[Remapping]) {
        self.remappings = all
            .iter()
            .filter(|r| self.is_file_for_this(&r.base_path.join(&r.target)))
            .cloned()
            .collect();
    }
}

/// Discover dependency packages under a root's library directories.
///
/// Each directory entry of `lib/` and `node_modules/` (including scoped
/// `@org/pkg` entries) becomes a package; every unique name is descended
/// into exactly once, which also breaks cycles between vendored packages.
pub fn discover_dependencies(root: &Path) -> Vec<Package> {
    let mut seen = FxHashSet::default();
    seen.insert(
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    discover_in(root, &mut seen)
}

fn discover_in(root: &Path, seen: &mut FxHashSet<String>) -> Vec<Package> {
    let mut packages = Vec::new();
    for lib_dir in LIB_DIRS {
        let dir = root.join(lib_dir);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut entries: Vec<_> = entries.flatten().map(|e| e.path()).collect();
        entries.sort();
        for path in entries {
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            // Scoped npm packages nest one level deeper.
            if name.starts_with('@') && *lib_dir == "node_modules" {
                let Ok(scoped) = std::fs::read_dir(&path) else {
                    continue;
                };
                for scoped_entry in scoped.flatten() {
                    let scoped_path = scoped_entry.path();
                    if !scoped_path.is_dir() {
                        continue;
                    }
                    let scoped_name = format!(
                        "{}/{}",
                        name,
                        scoped_entry.file_name().to_string_lossy()
                    );
                    push_package(&mut packages, scoped_name, scoped_path, seen);
                }
                continue;
            }
            push_package(&mut packages, name.to_string(), path, seen);
        }
    }
    packages
}

fn push_package(
    packages: &mut Vec<Package>,
    name: String,
    path: PathBuf,
    seen: &mut FxHashSet<String>,
) {
    if !seen.insert(name.clone()) {
        return;
    }
    tracing::debug!("discovered dependency package '{}' at {}", name, path.display());
    let mut package = Package::new(name, path);
    package.libs = discover_in(&package.root_path, seen);
    packages.push(package);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_import_for_this() {
        let package = Package::with_source_subdir("openzeppelin", "/p/lib/openzeppelin", "");
        assert!(package.is_import_for_this("openzeppelin/Token.sol"));
        assert!(package.is_import_for_this("openzeppelin"));
        assert!(!package.is_import_for_this("other/Token.sol"));
    }

    #[test]
    fn test_resolve_import_without_subdir() {
        let package = Package::with_source_subdir("oz", "/p/lib/oz", "");
        assert_eq!(
            package.resolve_import("oz/token/ERC20.sol"),
            Some(PathBuf::from("/p/lib/oz/token/ERC20.sol"))
        );
        assert_eq!(package.resolve_import("other/X.sol"), None);
    }

    #[test]
    fn test_source_root() {
        let package = Package::with_source_subdir("oz", "/p/lib/oz", "contracts");
        assert_eq!(package.source_root(), PathBuf::from("/p/lib/oz/contracts"));
    }

    #[test]
    fn test_discovery_once_per_unique_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("lib/a/lib/b")).unwrap();
        // `a` nested under itself must not be descended twice.
        std::fs::create_dir_all(root.join("lib/a/lib/a")).unwrap();

        let packages = discover_dependencies(root);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "a");
        assert_eq!(packages[0].libs.len(), 1);
        assert_eq!(packages[0].libs[0].name, "b");
    }
}
