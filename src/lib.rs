pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod histogram;
pub mod stats;
pub mod store;
pub mod summary;
pub mod ui;

pub use catalog::{load_catalogue, Catalogue, DropdownOption};
pub use cli::{Cli, Commands};
pub use config::DataPaths;
pub use engine::{Selection, VariantEngine, VariantReport};
pub use store::{DdgStore, MemoryStore, SqliteStore, Variant};
