//! API endpoints module.

pub mod applications;
pub mod error;

pub use applications::{
    create_application, delete_application, download_csv, list_applications, update_application,
};
pub use error::ApiError;
