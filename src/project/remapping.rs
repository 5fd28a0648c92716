//! Import-specifier remappings (`@oz/=lib/openzeppelin/`).

use std::path::{Path, PathBuf};

/// A single remapping rule: an import-specifier prefix mapped to a target
/// directory, optionally restricted to a source context. Immutable once
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remapping {
    /// Context qualifier (`context:prefix=target`), if any.
    pub context: Option<String>,
    pub prefix: String,
    pub target: String,
    /// Directory the target is resolved against (usually the project root).
    pub base_path: PathBuf,
}

impl Remapping {
    /// Parse a `[context:]prefix=target` line. Returns `None` for blank or
    /// malformed lines — malformed remappings are skipped, never errors.
    pub fn parse(line: &str, base_path: &Path) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (lhs, target) = line.split_once('=')?;
        if lhs.is_empty() || target.is_empty() {
            return None;
        }
        let (context, prefix) = match lhs.split_once(':') {
            Some((context, prefix)) => (Some(context.to_string()), prefix),
            None => (None, lhs),
        };
        if prefix.is_empty() {
            return None;
        }
        Some(Self {
            context,
            prefix: prefix.to_string(),
            target: target.to_string(),
            base_path: base_path.to_path_buf(),
        })
    }

    /// Does this remapping apply to the given import specifier?
    pub fn is_import_for_this(&self, specifier: &str) -> bool {
        let specifier = match &self.context {
            Some(context) => match specifier.strip_prefix(context.as_str()) {
                Some(rest) => rest.strip_prefix(':').unwrap_or(rest),
                None => specifier,
            },
            None => specifier,
        };
        specifier.starts_with(&self.prefix)
    }

    /// Resolve a matching specifier to an absolute path. Callers must check
    /// `is_import_for_this` first; a non-matching specifier resolves as if
    /// the prefix were empty.
    pub fn resolve_import(&self, specifier: &str) -> PathBuf {
        let specifier = match &self.context {
            Some(context) => match specifier.strip_prefix(context.as_str()) {
                Some(rest) => rest.strip_prefix(':').unwrap_or(rest),
                None => specifier,
            },
            None => specifier,
        };
        let rest = specifier.strip_prefix(&self.prefix).unwrap_or(specifier);
        let mut resolved = self.base_path.join(&self.target);
        for segment in rest.split(['/', '\\']).filter(|s| !s.is_empty()) {
            resolved.push(segment);
        }
        resolved
    }

    /// Does the given file live under this remapping's target directory?
    pub fn is_file_for_this(&self, path: &Path) -> bool {
        path.starts_with(self.base_path.join(&self.target))
    }
}

/// Pick the remapping that wins for a specifier: the longest matching prefix,
/// ties broken by the last-declared rule.
pub fn best_remapping<'a>(specifier: &str, remappings: &'a [Remapping]) -> Option<&'a Remapping> {
    let mut best: Option<&Remapping> = None;
    for remapping in remappings {
        if !remapping.is_import_for_this(specifier) {
            continue;
        }
        match best {
            // `>=` keeps the later declaration on equal prefix lengths.
            Some(current) if remapping.prefix.len() < current.prefix.len() => {}
            _ => best = Some(remapping),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remapping(line: &str) -> Remapping {
        Remapping::parse(line, Path::new("/p")).expect("valid remapping")
    }

    #[test]
    fn test_parse_basic() {
        let r = remapping("@oz/=lib/openzeppelin/");
        assert_eq!(r.prefix, "@oz/");
        assert_eq!(r.target, "lib/openzeppelin/");
        assert!(r.context.is_none());
    }

    #[test]
    fn test_parse_with_context() {
        let r = remapping("src/:@oz/=lib/oz/");
        assert_eq!(r.context.as_deref(), Some("src/"));
        assert_eq!(r.prefix, "@oz/");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Remapping::parse("", Path::new("/p")).is_none());
        assert!(Remapping::parse("# comment", Path::new("/p")).is_none());
        assert!(Remapping::parse("no-equals", Path::new("/p")).is_none());
        assert!(Remapping::parse("=target/", Path::new("/p")).is_none());
    }

    #[test]
    fn test_resolve_import() {
        let r = remapping("@oz/=lib/openzeppelin/");
        assert!(r.is_import_for_this("@oz/Token.sol"));
        assert!(!r.is_import_for_this("@other/Token.sol"));
        assert_eq!(
            r.resolve_import("@oz/token/ERC20.sol"),
            PathBuf::from("/p/lib/openzeppelin/token/ERC20.sol")
        );
    }

    #[test]
    fn test_is_file_for_this() {
        let r = remapping("@oz/=lib/openzeppelin/");
        assert!(r.is_file_for_this(Path::new("/p/lib/openzeppelin/Token.sol")));
        assert!(!r.is_file_for_this(Path::new("/p/src/Token.sol")));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let remappings = vec![remapping("@x/=libA/"), remapping("@x/sub/=libB/")];
        let best = best_remapping("@x/sub/Y.sol", &remappings).expect("match");
        assert_eq!(best.target, "libB/");
        assert!(
            best.resolve_import("@x/sub/Y.sol")
                .starts_with("/p/libB")
        );
    }

    #[test]
    fn test_tie_broken_by_last_declared() {
        let remappings = vec![remapping("@x/=libA/"), remapping("@x/=libB/")];
        let best = best_remapping("@x/Y.sol", &remappings).expect("match");
        assert_eq!(best.target, "libB/");
    }
}
