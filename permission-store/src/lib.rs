pub mod database;
pub mod error;

pub use database::{PermissionDatabase, PermissionStoreConfig};
pub use error::{Result, StoreError};
