//! Storage-engine polymorphism.
//!
//! Every component that issues tenant-data queries is written against the
//! [`TenantStore`] capability set, never against a concrete backend. The
//! active variant is decided once at startup from `DB_TYPE` and injected
//! everywhere; per-request branching on the storage kind is a bug.

mod mongo;
mod postgres;

pub use mongo::{MongoPrimary, MongoStore};
pub use postgres::{PostgresPrimary, PostgresStore};

use crate::error::{DatabaseError, Result};
use async_trait::async_trait;
use coral_models::{EntityId, Page, Role, RoleUsersRow, SearchRequest, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Mongo,
}

impl StorageKind {
    /// Process-wide selection from `DB_TYPE`; never re-evaluated per request.
    pub fn from_env() -> Self {
        match std::env::var("DB_TYPE").as_deref() {
            Ok("postgres") => Self::Postgres,
            _ => Self::Mongo,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mongo => "mongo",
        }
    }

    /// Validate a raw identifier against this engine's native representation
    /// (UUID vs ObjectId hex) and wrap it as an opaque token.
    pub fn parse_id(&self, raw: &str) -> Result<EntityId> {
        match self {
            Self::Postgres => {
                uuid::Uuid::parse_str(raw)
                    .map_err(|_| DatabaseError::InvalidIdentifier(format!("{} must be a UUID", raw)))?;
            }
            Self::Mongo => {
                bson::oid::ObjectId::parse_str(raw).map_err(|_| {
                    DatabaseError::InvalidIdentifier(format!("{} must be an ObjectId", raw))
                })?;
            }
        }
        Ok(EntityId::new(raw))
    }
}

/// Which column/field of the control-plane tenant table a raw routing key is
/// matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantLookupField {
    /// Virtual-host routing key (multi-domain deployments).
    Host,
    /// Tenant name (explicit tenant-id header deployments).
    Name,
}

impl TenantLookupField {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Name => "name",
        }
    }
}

/// The capability set one live tenant-database session exposes.
///
/// A store is bound to exactly one tenant's credentials and lives for one
/// logical unit of work; it is handed out by the connection manager and
/// closed by it on every exit path.
#[async_trait]
pub trait TenantStore: Send {
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>>;

    /// Identifier equality filter.
    async fn find_role_by_id(&mut self, id: &EntityId) -> Result<Option<Role>>;

    /// Identifier-set filter.
    async fn find_roles_by_ids(&mut self, ids: &[EntityId]) -> Result<Vec<Role>>;

    /// Keyword + type filtered, sortable, paginated role search.
    async fn search_roles(&mut self, search: &SearchRequest) -> Result<Page<Role>>;

    /// Keyword filtered user search, optionally restricted to users holding
    /// a role of the given type.
    async fn search_users(
        &mut self,
        search: &SearchRequest,
        user_type: Option<&str>,
    ) -> Result<Page<User>>;

    /// Raw tabular read grouped by role: every role with the summaries of
    /// the users holding it.
    async fn users_by_role(&mut self, search: &SearchRequest) -> Result<Page<RoleUsersRow>>;

    /// Tear the session down. Consumes the store; the connection manager is
    /// the only caller.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Sort columns arrive from the outside; only plain identifiers are allowed
/// into an ORDER BY / $sort position.
pub(crate) fn sort_identifier(raw: &str) -> Result<&str> {
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(raw)
    } else {
        Err(DatabaseError::InvalidInput(format!(
            "invalid sort column: {}",
            raw
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_type_selects_kind() {
        assert_eq!(StorageKind::Postgres.as_str(), "postgres");
        assert_eq!(StorageKind::Mongo.as_str(), "mongo");
    }

    #[test]
    fn postgres_ids_must_be_uuids() {
        let kind = StorageKind::Postgres;
        assert!(kind.parse_id("a4f2df1e-9d01-4f7a-8a30-111111111111").is_ok());
        assert!(matches!(
            kind.parse_id("66f1a2b3c4d5e6f7a8b9c0d1"),
            Err(DatabaseError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn mongo_ids_must_be_object_ids() {
        let kind = StorageKind::Mongo;
        assert!(kind.parse_id("66f1a2b3c4d5e6f7a8b9c0d1").is_ok());
        assert!(matches!(
            kind.parse_id("a4f2df1e-9d01-4f7a-8a30-111111111111"),
            Err(DatabaseError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn sort_identifiers_are_allowlisted() {
        assert_eq!(sort_identifier("createdAt").unwrap(), "createdAt");
        assert_eq!(sort_identifier("first_name").unwrap(), "first_name");
        assert!(sort_identifier("name\"; DROP TABLE \"role").is_err());
        assert!(sort_identifier("").is_err());
    }
}
