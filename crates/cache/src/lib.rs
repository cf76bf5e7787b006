pub mod cache_aside;
pub mod error;
pub mod keys;
pub mod redis_cache;

pub use cache_aside::CacheAside;
pub use error::{CacheError, Result};
pub use keys::{setting_cache_key, tenant_cache_key};
pub use redis_cache::{Cache, CacheConfig};
