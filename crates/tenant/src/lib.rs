pub mod context;
pub mod directory;
pub mod error;
pub mod resolver;

pub use context::{OperationContext, TenantContext};
pub use directory::{Environment, TenantDirectory};
pub use error::{Result, TenantError};
pub use resolver::{IdentityResolver, RoutingConfig, RoutingHint};
