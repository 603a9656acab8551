//! Alias tables mapping UI codes to acceptable raw-text matches.
//!
//! A code such as `wires-cables` stands for several spellings of the same
//! category in the source data ("Wires & Cables", "Wires and Cables", ...).
//! Resolving a code yields every spelling; the filter pipeline accepts a
//! record if its text contains any of them.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

const CATEGORY_ALIASES: &[(&str, &[&str])] = &[
    (
        "wires-cables",
        &[
            "Wires & Cables",
            "Wires and Cables",
            "Wires-Cables",
            "wires_cables",
            "Cables & Wires",
        ],
    ),
    (
        "transformers",
        &[
            "Transformers",
            "Transformer",
            "Power Transformer",
            "Power-Transformers",
            "power_transformers",
        ],
    ),
    (
        "fmcg-packaging",
        &[
            "FMCG Packaging",
            "FMCG & Packaging",
            "FMCG-Packaging",
            "fmcg_packaging",
            "Packaging",
        ],
    ),
];

const CABLE_TYPE_ALIASES: &[(&str, &[&str])] = &[
    ("ht-cable", &["HT Cable", "High Tension"]),
    ("lt-cable", &["LT Cable", "Low Tension"]),
    ("control-cable", &["Control Cable"]),
    ("ehv-cable", &["EHV Cable", "Extra High Voltage"]),
    ("instrumentation-cable", &["Instrumentation Cable"]),
];

/// Which alias table a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasKind {
    /// Product category codes.
    Category,
    /// Cable type codes.
    CableType,
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Category => "category",
            Self::CableType => "cable-type",
        })
    }
}

/// A mapping from lowercase codes to their acceptable substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl AliasTable {
    /// The built-in table for `kind`.
    #[must_use]
    pub fn builtin(kind: AliasKind) -> Self {
        let source = match kind {
            AliasKind::Category => CATEGORY_ALIASES,
            AliasKind::CableType => CABLE_TYPE_ALIASES,
        };

        let mut table = Self::default();
        for (code, phrases) in source {
            table.extend(code, phrases.iter().map(ToString::to_string));
        }
        table
    }

    /// Adds phrases to a code, creating the code if needed.
    ///
    /// Phrases already listed for the code are not added again.
    pub fn extend(&mut self, code: &str, phrases: impl IntoIterator<Item = String>) {
        let entry = self.entries.entry(normalize_code(code)).or_default();
        for phrase in phrases {
            if !phrase.trim().is_empty() && !entry.contains(&phrase) {
                entry.push(phrase);
            }
        }
    }

    /// Returns the acceptable substrings for `code`.
    ///
    /// Phrases keep their authored case; callers lowercase before comparing.
    /// Lookup ignores case and surrounding whitespace. An unknown code
    /// resolves to itself, so it still works as a literal substring.
    #[must_use]
    pub fn resolve(&self, code: &str) -> Vec<String> {
        self.entries
            .get(&normalize_code(code))
            .cloned()
            .unwrap_or_else(|| vec![code.trim().to_string()])
    }

    /// Whether `code` is a known entry.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(&normalize_code(code))
    }

    /// Iterates over codes and their phrases in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(code, phrases)| (code.as_str(), phrases.as_slice()))
    }
}

/// The category and cable-type tables used by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTables {
    category: AliasTable,
    cable_type: AliasTable,
}

impl Default for AliasTables {
    fn default() -> Self {
        Self {
            category: AliasTable::builtin(AliasKind::Category),
            cable_type: AliasTable::builtin(AliasKind::CableType),
        }
    }
}

impl AliasTables {
    /// The table for `kind`.
    #[must_use]
    pub const fn table(&self, kind: AliasKind) -> &AliasTable {
        match kind {
            AliasKind::Category => &self.category,
            AliasKind::CableType => &self.cable_type,
        }
    }

    /// Mutable access to the table for `kind`.
    pub const fn table_mut(&mut self, kind: AliasKind) -> &mut AliasTable {
        match kind {
            AliasKind::Category => &mut self.category,
            AliasKind::CableType => &mut self.cable_type,
        }
    }

    /// Resolves `code` in the table for `kind`.
    #[must_use]
    pub fn resolve(&self, kind: AliasKind, code: &str) -> Vec<String> {
        self.table(kind).resolve(code)
    }

    /// Merges extra aliases into the table for `kind`.
    pub fn merge(&mut self, kind: AliasKind, extra: &BTreeMap<String, Vec<String>>) {
        let table = self.table_mut(kind);
        for (code, phrases) in extra {
            table.extend(code, phrases.iter().cloned());
        }
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(AliasKind::Category, &["wires-cables", "transformers", "fmcg-packaging"]; "category")]
    #[test_case(AliasKind::CableType, &["ht-cable", "lt-cable", "control-cable", "ehv-cable", "instrumentation-cable"]; "cable type")]
    fn builtin_tables_have_every_code(kind: AliasKind, codes: &[&str]) {
        let table = AliasTable::builtin(kind);
        for code in codes {
            assert!(table.contains(code), "{kind} table is missing {code}");
            assert!(!table.resolve(code).is_empty());
        }
        assert_eq!(table.iter().count(), codes.len());
    }

    #[test]
    fn resolve_known_code_keeps_authored_case() {
        let table = AliasTable::builtin(AliasKind::CableType);
        assert_eq!(table.resolve("control-cable"), vec!["Control Cable"]);
    }

    #[test]
    fn resolve_ignores_code_case_and_padding() {
        let table = AliasTable::builtin(AliasKind::CableType);
        assert_eq!(table.resolve("  LT-Cable "), vec!["LT Cable", "Low Tension"]);
    }

    #[test]
    fn unknown_code_resolves_to_itself() {
        let table = AliasTable::builtin(AliasKind::Category);
        assert_eq!(table.resolve(" Solar Panels "), vec!["Solar Panels"]);
    }

    #[test]
    fn extend_adds_new_codes_and_phrases() {
        let mut tables = AliasTables::default();
        let mut extra = BTreeMap::new();
        extra.insert(
            "Transformers".to_string(),
            vec!["Distribution Transformer".to_string(), "Transformer".to_string()],
        );
        extra.insert("solar".to_string(), vec!["Solar Modules".to_string()]);
        tables.merge(AliasKind::Category, &extra);

        assert_eq!(
            tables.resolve(AliasKind::Category, "transformers"),
            vec![
                "Transformers",
                "Transformer",
                "Power Transformer",
                "Power-Transformers",
                "power_transformers",
                "Distribution Transformer"
            ]
        );
        assert_eq!(
            tables.resolve(AliasKind::Category, "solar"),
            vec!["Solar Modules"]
        );
        // cable type table untouched
        assert!(!tables.table(AliasKind::CableType).contains("solar"));
    }

    #[test]
    fn kind_display_matches_cli_name() {
        assert_eq!(AliasKind::CableType.to_string(), "cable-type");
        assert_eq!(AliasKind::Category.to_string(), "category");
    }
}
