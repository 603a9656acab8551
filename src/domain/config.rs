use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::domain::{AliasKind, AliasTables};

/// Configuration for tender search.
///
/// This struct holds settings that control where tenders are loaded from, how
/// strictly they are parsed, how many rows a search shows, and any extra
/// aliases layered over the built-in tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The JSON file tenders are loaded from when none is given explicitly.
    pub data: Option<PathBuf>,

    /// The default maximum number of rows shown by a search.
    limit: usize,

    /// Whether records that fail to parse are skipped (`true`) or fail the
    /// whole load (`false`).
    pub allow_invalid_records: bool,

    /// Extra category aliases, keyed by code.
    category_aliases: BTreeMap<String, Vec<String>>,

    /// Extra cable type aliases, keyed by code.
    cable_type_aliases: BTreeMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: None,
            limit: default_limit(),
            allow_invalid_records: default_allow_invalid_records(),
            category_aliases: BTreeMap::new(),
            cable_type_aliases: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration if the file exists, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the default row limit for searches.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Adds an extra alias phrase for `code`.
    ///
    /// Returns `true` if the phrase was added, `false` if it already existed.
    pub fn add_alias(&mut self, kind: AliasKind, code: &str, phrase: String) -> bool {
        let map = match kind {
            AliasKind::Category => &mut self.category_aliases,
            AliasKind::CableType => &mut self.cable_type_aliases,
        };
        let phrases = map.entry(code.trim().to_lowercase()).or_default();
        if phrases.contains(&phrase) {
            false
        } else {
            phrases.push(phrase);
            true
        }
    }

    /// The built-in alias tables with this configuration's extras merged in.
    #[must_use]
    pub fn alias_tables(&self) -> AliasTables {
        let mut tables = AliasTables::default();
        tables.merge(AliasKind::Category, &self.category_aliases);
        tables.merge(AliasKind::CableType, &self.cable_type_aliases);
        tables
    }
}

const fn default_limit() -> usize {
    200
}

const fn default_allow_invalid_records() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<PathBuf>,

        #[serde(default = "default_limit")]
        limit: usize,

        #[serde(default = "default_allow_invalid_records")]
        allow_invalid_records: bool,

        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        category_aliases: BTreeMap<String, Vec<String>>,

        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        cable_type_aliases: BTreeMap<String, Vec<String>>,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                data,
                limit,
                allow_invalid_records,
                category_aliases,
                cable_type_aliases,
            } => Self {
                data,
                limit,
                allow_invalid_records,
                category_aliases,
                cable_type_aliases,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            data: config.data,
            limit: config.limit,
            allow_invalid_records: config.allow_invalid_records,
            category_aliases: config.category_aliases,
            cable_type_aliases: config.cable_type_aliases,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ndata = \"tenders.json\"\nlimit = 25\nallow_invalid_records = false\n\n[cable_type_aliases]\nht-cable = [\"11kV XLPE\"]\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.data, Some(PathBuf::from("tenders.json")));
        assert_eq!(config.limit(), 25);
        assert!(!config.allow_invalid_records);
        assert_eq!(
            config.alias_tables().resolve(AliasKind::CableType, "ht-cable"),
            vec!["HT Cable", "High Tension", "11kV XLPE"]
        );
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("tenders.toml");

        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nlimit = \"lots\"\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_aliases() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tenders.toml");

        let mut config = Config::default();
        assert!(config.add_alias(AliasKind::Category, "Solar", "Solar Modules".to_string()));
        assert!(!config.add_alias(AliasKind::Category, "solar", "Solar Modules".to_string()));
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn alias_tables_include_extras() {
        let mut config = Config::default();
        config.add_alias(AliasKind::CableType, "control-cable", "Ctrl Cable".to_string());

        let tables = config.alias_tables();
        assert_eq!(
            tables.resolve(AliasKind::CableType, "control-cable"),
            vec!["Control Cable", "Ctrl Cable"]
        );
    }
}
