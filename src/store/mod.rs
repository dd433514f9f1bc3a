//! Application store - CSV file persistence.

pub mod codec;
pub mod csv_store;
pub mod lock;
pub mod record;

pub use csv_store::Store;
pub use record::{
    calculate_points, is_known_status, Listing, NewRecord, Record, RecordPatch, DEFAULT_STATUS,
    STATUS_OPTIONS,
};
