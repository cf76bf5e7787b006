pub mod id;
pub mod page;
pub mod role;
pub mod tenant;
pub mod user;

pub use id::EntityId;
pub use page::{Page, PageMeta, SearchRequest, SortOrder};
pub use role::{Role, RoleType, RoleUserSummary, RoleUsersRow};
pub use tenant::{FeatureLimits, FeatureRestriction, PrimaryDirectoryEntry, TenantRecord};
pub use user::{User, UserStatus};
