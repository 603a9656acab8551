//! A search session.
//!
//! The [`Session`] owns the tender snapshot loaded at startup and the alias
//! tables used to resolve category and cable type codes. Searches borrow it
//! immutably, so any number of them can run against one session.

use std::path::Path;

use crate::{
    domain::{AliasTables, Config, FilterSpec, TenderId, TenderRecord},
    search::{Pipeline, SearchOutcome},
    storage::{self, LoadError},
};

/// Loaded tenders plus the alias tables used to search them.
#[derive(Debug, Clone, Default)]
pub struct Session {
    tenders: Vec<TenderRecord>,
    aliases: AliasTables,
}

impl Session {
    /// Creates a session over `tenders` with the built-in alias tables.
    #[must_use]
    pub fn new(tenders: Vec<TenderRecord>) -> Self {
        Self::with_aliases(tenders, AliasTables::default())
    }

    /// Creates a session over `tenders` with the given alias tables.
    #[must_use]
    pub const fn with_aliases(tenders: Vec<TenderRecord>, aliases: AliasTables) -> Self {
        Self { tenders, aliases }
    }

    /// Loads tenders from `path` using the settings and aliases in `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be loaded.
    pub fn load(path: &Path, config: &Config) -> Result<Self, LoadError> {
        let tenders = storage::load_file(path, config.allow_invalid_records)?;
        Ok(Self::with_aliases(tenders, config.alias_tables()))
    }

    /// Like [`Session::load`], but a failed load yields an empty session.
    ///
    /// Searching an empty session returns no tenders.
    #[must_use]
    pub fn load_or_empty(path: &Path, config: &Config) -> Self {
        Self::load(path, config).unwrap_or_else(|e| {
            tracing::warn!("Failed to load tenders, continuing with none: {e}");
            Self::with_aliases(Vec::new(), config.alias_tables())
        })
    }

    /// All loaded tenders, in load order.
    #[must_use]
    pub fn tenders(&self) -> &[TenderRecord] {
        &self.tenders
    }

    /// The alias tables in use.
    #[must_use]
    pub const fn aliases(&self) -> &AliasTables {
        &self.aliases
    }

    /// Finds a tender by its identifier.
    #[must_use]
    pub fn find(&self, tender_id: &TenderId) -> Option<&TenderRecord> {
        self.tenders.iter().find(|t| &t.tender_id == tender_id)
    }

    /// Compiles `spec` against this session's alias tables.
    #[must_use]
    pub fn pipeline(&self, spec: &FilterSpec) -> Pipeline {
        Pipeline::new(spec, &self.aliases)
    }

    /// The tenders matching `spec`, in load order.
    #[must_use]
    pub fn search(&self, spec: &FilterSpec) -> Vec<TenderRecord> {
        self.pipeline(spec).apply(&self.tenders)
    }

    /// Like [`Session::search`], with a report for each enabled stage.
    #[must_use]
    pub fn search_with_report(&self, spec: &FilterSpec) -> SearchOutcome {
        self.pipeline(spec).run(&self.tenders)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::AliasKind;

    const TENDERS: &str = r#"[
        {"tender_id": "T1", "title": "Ctrl Cable 12 core", "cable_type": "Ctrl Cable"},
        {"tender_id": "T2", "title": "Control Cable", "cable_type": "Control Cable"}
    ]"#;

    fn write_tenders() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TENDERS.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_applies_configured_aliases() {
        let file = write_tenders();
        let mut config = Config::default();
        config.add_alias(AliasKind::CableType, "control-cable", "Ctrl Cable".to_string());

        let session = Session::load(file.path(), &config).unwrap();
        let found = session.search(&FilterSpec::default().with_cable_type("control-cable"));

        assert_eq!(found.len(), 2);
    }

    #[test]
    fn builtin_aliases_without_config() {
        let file = write_tenders();
        let session = Session::load(file.path(), &Config::default()).unwrap();
        let found = session.search(&FilterSpec::default().with_cable_type("control-cable"));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tender_id.as_str(), "T2");
    }

    #[test]
    fn failed_load_gives_empty_session() {
        let tmp = tempfile::tempdir().unwrap();
        let session = Session::load_or_empty(&tmp.path().join("missing.json"), &Config::default());

        assert!(session.tenders().is_empty());
        assert!(session.search(&FilterSpec::default()).is_empty());
    }

    #[test]
    fn find_by_id() {
        let file = write_tenders();
        let session = Session::load(file.path(), &Config::default()).unwrap();

        let id = TenderId::new("T2").unwrap();
        assert_eq!(session.find(&id).map(TenderRecord::title), Some("Control Cable"));
        assert!(session.find(&TenderId::new("T9").unwrap()).is_none());
    }

    #[test]
    fn report_matches_search() {
        let session = Session::new(crate::storage::parse_str(TENDERS, false).unwrap());
        let spec = FilterSpec::default().with_keyword("cable").with_keyword("12");

        let outcome = session.search_with_report(&spec);
        assert_eq!(outcome.records, session.search(&spec));
        assert_eq!(outcome.stages.len(), 1);
    }
}
