//! Tender search
//!
//! Filters a locally loaded collection of tender/RFP records by keyword,
//! category, cable type, voltage, city and due date.

pub mod domain;
pub use domain::{AliasKind, AliasTable, AliasTables, Config, FilterSpec, LineItem, TenderId, TenderRecord};

/// The filter pipeline.
pub mod search;
pub use search::{Pipeline, SearchOutcome, Stage, StageReport, search};

mod session;
pub use session::Session;

/// Loading tenders from JSON.
pub mod storage;
pub use storage::LoadError;
