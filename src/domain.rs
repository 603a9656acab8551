//! Domain models for tender search.
//!
//! This module contains the tender record shape, the per-query
//! filter criteria, the alias tables and keyword tokenizer the filter pipeline
//! is built from, and configuration.

mod tender;
pub use tender::{LineItem, TenderRecord};

/// Tender identifier type.
pub mod tender_id;
pub use tender_id::{EmptyTenderIdError, TenderId};

mod filter_spec;
pub(crate) use filter_spec::active;
pub use filter_spec::FilterSpec;

pub mod alias;
pub use alias::{AliasKind, AliasTable, AliasTables};

pub mod keyword;

pub mod due_date;

mod config;
pub use config::Config;
