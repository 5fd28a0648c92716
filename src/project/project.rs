//! The project aggregate and its import-resolution pipeline.

use std::path::{Path, PathBuf};

use super::config::{ProjectConfig, default_readers, load_config};
use super::file_loader::collect_sol_files;
use super::package::{Package, discover_dependencies};
use super::remapping::{Remapping, best_remapping};

/// Anything that can turn an import specifier into a file path.
///
/// The semantic layer links documents through this trait so it can be tested
/// with a fixed lookup table instead of a real project on disk.
pub trait ImportResolver {
    fn resolve(&self, specifier: &str, from: &Path) -> Option<PathBuf>;
}

/// A project rooted at one directory: the root package, its discovered
/// dependency packages, and the remapping list from build-tool config.
#[derive(Debug)]
pub struct Project {
    pub root_package: Package,
    pub dependencies: Vec<Package>,
    pub remappings: Vec<Remapping>,
    pub excludes: Vec<String>,
}

impl Project {
    /// Load a project from disk: read build-tool configuration, discover
    /// dependency packages, and parse remappings.
    pub fn load(root: &Path) -> Self {
        let config = load_config(root, &default_readers());
        Self::with_config(root, config)
    }

    pub fn with_config(root: &Path, config: ProjectConfig) -> Self {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let root_package = match &config.source_dir {
            Some(subdir) => Package::with_source_subdir(name, root, subdir.clone()),
            None => Package::new(name, root),
        };

        let remappings: Vec<Remapping> = config
            .remappings
            .unwrap_or_default()
            .iter()
            .filter_map(|line| Remapping::parse(line, root))
            .collect();

        let mut dependencies = discover_dependencies(root);
        for dependency in &mut dependencies {
            dependency.adopt_remappings(&remappings);
        }

        tracing::debug!(
            "loaded project at {} ({} dependencies, {} remappings)",
            root.display(),
            dependencies.len(),
            remappings.len()
        );

        Self {
            root_package,
            dependencies,
            remappings,
            excludes: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_package.root_path
    }

    /// Resolve an import specifier against the file that contains it.
    ///
    /// Strategies, in order:
    /// 1. relative specifiers resolve lexically against the importing file's
    ///    directory (this never fails, even for files that do not exist);
    /// 2. the best-matching remapping;
    /// 3. a dependency package named by the first path segment;
    /// 4. a fuzzy match on the file name across the project's source files.
    pub fn resolve_import(&self, specifier: &str, from: &Path) -> Option<PathBuf> {
        if specifier.starts_with('.') {
            let base = from.parent().unwrap_or(Path::new(""));
            return Some(normalize_relative(base, specifier));
        }

        if let Some(remapping) = best_remapping(specifier, &self.remappings) {
            return Some(remapping.resolve_import(specifier));
        }

        if let Some(package) = self.find_package(specifier) {
            return package.resolve_import(specifier);
        }

        self.fuzzy_match(specifier)
    }

    /// The dependency package (at any nesting depth) named by the
    /// specifier's first segment.
    fn find_package(&self, specifier: &str) -> Option<&Package> {
        fn search<'a>(packages: &'a [Package], specifier: &str) -> Option<&'a Package> {
            for package in packages {
                if package.is_import_for_this(specifier) {
                    return Some(package);
                }
                if let Some(found) = search(&package.libs, specifier) {
                    return Some(found);
                }
            }
            None
        }
        if self.root_package.is_import_for_this(specifier) {
            return Some(&self.root_package);
        }
        search(&self.dependencies, specifier)
    }

    /// Last resort: find a source file whose trailing path components match
    /// the specifier's. Only unambiguous when exactly one file matches the
    /// file name; we take the first in sorted order otherwise.
    fn fuzzy_match(&self, specifier: &str) -> Option<PathBuf> {
        let wanted: Vec<&str> = specifier
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        let file_name = wanted.last()?;

        let found = self
            .source_files()
            .into_iter()
            .find(|path| path.file_name().and_then(|n| n.to_str()) == Some(file_name));
        if let Some(path) = &found {
            tracing::debug!(
                "fuzzy-resolved import '{}' to {}",
                specifier,
                path.display()
            );
        }
        found
    }

    /// All `.sol` files under the project root, excluding build output and
    /// the configured exclude directories.
    pub fn source_files(&self) -> Vec<PathBuf> {
        collect_sol_files(self.root(), &self.excludes)
    }
}

impl ImportResolver for Project {
    fn resolve(&self, specifier: &str, from: &Path) -> Option<PathBuf> {
        self.resolve_import(specifier, from)
    }
}

/// Join a relative specifier onto a base directory, folding `.` and `..`
/// segments and accepting either path separator.
fn normalize_relative(base: &Path, specifier: &str) -> PathBuf {
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
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectConfig;

    fn project_at(root: &Path) -> Project {
        Project::with_config(root, ProjectConfig::default())
    }

    #[test]
    fn test_relative_resolution_is_lexical() {
        let project = project_at(Path::new("/p"));
        let from = Path::new("/p/src/token/ERC20.sol");
        assert_eq!(
            project.resolve_import("./IERC20.sol", from),
            Some(PathBuf::from("/p/src/token/IERC20.sol"))
        );
        assert_eq!(
            project.resolve_import("../utils/Math.sol", from),
            Some(PathBuf::from("/p/src/utils/Math.sol"))
        );
    }

    #[test]
    fn test_relative_resolution_accepts_backslashes() {
        let project = project_at(Path::new("/p"));
        let from = Path::new("/p/src/A.sol");
        assert_eq!(
            project.resolve_import(r".\sub\B.sol", from),
            Some(PathBuf::from("/p/src/sub/B.sol"))
        );
    }

    #[test]
    fn test_relative_resolution_does_not_require_existence() {
        let project = project_at(Path::new("/does/not/exist"));
        let resolved = project.resolve_import("./Missing.sol", Path::new("/does/not/exist/A.sol"));
        assert_eq!(resolved, Some(PathBuf::from("/does/not/exist/Missing.sol")));
    }

    #[test]
    fn test_remapping_beats_package_lookup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("lib/oz/src")).unwrap();
        std::fs::write(root.join("lib/oz/src/Token.sol"), "contract Token {}").unwrap();

        let config = ProjectConfig {
            source_dir: Some("src".to_string()),
            remappings: Some(vec!["@oz/=lib/oz/src/".to_string()]),
        };
        let project = Project::with_config(root, config);

        assert_eq!(
            project.resolve_import("@oz/Token.sol", &root.join("src/A.sol")),
            Some(root.join("lib/oz/src/Token.sol"))
        );
    }

    #[test]
    fn test_package_resolution_by_first_segment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("lib/solmate/src")).unwrap();
        std::fs::write(root.join("lib/solmate/src/Auth.sol"), "").unwrap();

        let project = project_at(root);
        assert_eq!(
            project.resolve_import("solmate/Auth.sol", &root.join("src/A.sol")),
            Some(root.join("lib/solmate/src/Auth.sol"))
        );
    }

    #[test]
    fn test_fuzzy_match_falls_back_to_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("contracts/deep/nested")).unwrap();
        std::fs::write(root.join("contracts/deep/nested/Odd.sol"), "").unwrap();

        let project = project_at(root);
        assert_eq!(
            project.resolve_import("whatever/Odd.sol", &root.join("contracts/Main.sol")),
            Some(root.join("contracts/deep/nested/Odd.sol"))
        );
    }

    #[test]
    fn test_unresolvable_import_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let project = project_at(dir.path());
        assert_eq!(
            project.resolve_import("ghost/Nothing.sol", &dir.path().join("A.sol")),
            None
        );
    }
}
