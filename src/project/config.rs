//! Build-tool configuration readers.
//!
//! Each reader is a pure function from a project root to an optional
//! `ProjectConfig`. Readers are tried in a fixed, documented precedence
//! order — Foundry, then Brownie, then a plain `remappings.txt` — and the
//! first non-`None` value **per field** wins. Malformed configuration is
//! treated as "this source returned nothing" and never propagates.

use std::path::Path;

/// The result shape every reader produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    pub source_dir: Option<String>,
    /// Raw `prefix=target` remapping lines, unparsed.
    pub remappings: Option<Vec<String>>,
}

/// One supported build-tool configuration format.
pub trait ConfigReader {
    fn name(&self) -> &'static str;
    fn read(&self, root: &Path) -> Option<ProjectConfig>;
}

/// `foundry.toml`: `src` and `remappings` from `[profile.default]`, falling
/// back to top-level keys.
pub struct FoundryConfigReader;

impl ConfigReader for FoundryConfigReader {
    fn name(&self) -> &'static str {
        "foundry"
    }

    fn read(&self, root: &Path) -> Option<ProjectConfig> {
        let text = std::fs::read_to_string(root.join("foundry.toml")).ok()?;
        let value: toml::Value = match text.parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("ignoring malformed foundry.toml: {e}");
                return None;
            }
        };

        let profile = value
            .get("profile")
            .and_then(|p| p.get("default"))
            .unwrap_or(&value);

        let source_dir = profile
            .get("src")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let remappings = profile.get("remappings").and_then(string_array);

        Some(ProjectConfig {
            source_dir,
            remappings,
        })
    }
}

fn string_array(value: &toml::Value) -> Option<Vec<String>> {
    let array = value.as_array()?;
    Some(
        array
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}

/// `brownie-config.yaml`: remappings under `compiler.solc.remappings`.
/// Brownie projects keep sources in `contracts/`.
pub struct BrownieConfigReader;

impl ConfigReader for BrownieConfigReader {
    fn name(&self) -> &'static str {
        "brownie"
    }

    fn read(&self, root: &Path) -> Option<ProjectConfig> {
        let text = std::fs::read_to_string(root.join("brownie-config.yaml"))
            .or_else(|_| std::fs::read_to_string(root.join("brownie-config.yml")))
            .ok()?;
        let value: serde_yaml::Value = match serde_yaml::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("ignoring malformed brownie config: {e}");
                return None;
            }
        };

        let remappings = value
            .get("compiler")
            .and_then(|c| c.get("solc"))
            .and_then(|s| s.get("remappings"))
            .and_then(|r| r.as_sequence())
            .map(|seq| {
                seq.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            });

        Some(ProjectConfig {
            source_dir: Some("contracts".to_string()),
            remappings,
        })
    }
}

/// A plain `remappings.txt`, one `prefix=target` per line.
pub struct RemappingsFileReader;

impl ConfigReader for RemappingsFileReader {
    fn name(&self) -> &'static str {
        "remappings.txt"
    }

    fn read(&self, root: &Path) -> Option<ProjectConfig> {
        let text = std::fs::read_to_string(root.join("remappings.txt")).ok()?;
        let remappings: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        Some(ProjectConfig {
            source_dir: None,
            remappings: Some(remappings),
        })
    }
}

/// The documented precedence order.
pub fn default_readers() -> Vec<Box<dyn ConfigReader>> {
    vec![
        Box::new(FoundryConfigReader),
        Box::new(BrownieConfigReader),
        Box::new(RemappingsFileReader),
    ]
}

/// Merge readers in precedence order: the first non-`None` value per field
/// wins, independently for `source_dir` and `remappings`.
pub fn load_config(root: &Path, readers: &[Box<dyn ConfigReader>]) -> ProjectConfig {
    let mut merged = ProjectConfig::default();
    for reader in readers {
        if merged.source_dir.is_some() && merged.remappings.is_some() {
            break;
        }
        let Some(config) = reader.read(root) else {
            continue;
        };
        tracing::debug!("config source '{}' contributed {:?}", reader.name(), config);
        if merged.source_dir.is_none() {
            merged.source_dir = config.source_dir;
        }
        if merged.remappings.is_none() {
            merged.remappings = config.remappings;
        }
    }
    merged
}
