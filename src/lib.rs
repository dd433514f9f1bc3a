//! AppLogger library root.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod web;

pub use cli::Commands;
pub use config::{load_settings, Settings, StoreConfig};
pub use error::{Error, Result};
pub use store::{Listing, NewRecord, Record, RecordPatch, Store};
pub use web::run_server;
