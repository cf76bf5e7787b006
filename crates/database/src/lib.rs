pub mod dialect;
pub mod error;
pub mod manager;
pub mod primary;

pub use dialect::{StorageKind, TenantLookupField, TenantStore};
pub use error::{DatabaseError, Result};
pub use manager::{TenantConnectionManager, TenantHandle};
pub use primary::{connect_primary, PrimaryConfig, PrimaryStore};
