pub mod loader;

pub use loader::{InvalidRecord, LoadError, load_file, parse_str};
