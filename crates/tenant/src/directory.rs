use crate::error::Result;
use crate::TenantError;
use coral_cache::{tenant_cache_key, CacheAside};
use coral_database::{PrimaryStore, TenantLookupField};
use coral_models::TenantRecord;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match std::env::var("ENVIRONMENT").as_deref() {
            Ok("production") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Cached lookups against the control-plane tenant table.
///
/// Production resolves through the cache-aside layer under `tenant:{key}`;
/// a lookup that finds nothing is cached too, so repeated probes for unknown
/// tenants stay off the primary. Development bypasses the cache entirely so
/// control-plane edits show up immediately.
#[derive(Clone)]
pub struct TenantDirectory {
    primary: Arc<dyn PrimaryStore>,
    cache: CacheAside,
    environment: Environment,
}

impl TenantDirectory {
    pub fn new(primary: Arc<dyn PrimaryStore>, cache: CacheAside, environment: Environment) -> Self {
        Self {
            primary,
            cache,
            environment,
        }
    }

    pub async fn resolve(
        &self,
        routing_key: &str,
        field: TenantLookupField,
    ) -> Result<Option<TenantRecord>> {
        if self.environment.is_development() {
            tracing::debug!(routing_key, "tenant cache bypassed in development");
            return Ok(self.primary.find_tenant(routing_key, field).await?);
        }

        let key = tenant_cache_key(routing_key);
        let primary = self.primary.clone();
        let value = routing_key.to_string();
        self.cache
            .get_or_compute(&key, move || async move {
                primary
                    .find_tenant(&value, field)
                    .await
                    .map_err(TenantError::from)
            })
            .await
    }

    /// Every control-plane write that touches a tenant record must call this
    /// before reporting success.
    pub async fn invalidate(&self, routing_key: &str) {
        self.cache.invalidate(&tenant_cache_key(routing_key)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coral_cache::{Cache, CacheConfig};
    use coral_database::DatabaseError;
    use coral_models::{EntityId, PrimaryDirectoryEntry};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubPrimary {
        lookups: AtomicUsize,
        record: Option<TenantRecord>,
    }

    impl StubPrimary {
        fn with_record(record: Option<TenantRecord>) -> Arc<Self> {
            Arc::new(Self {
                lookups: AtomicUsize::new(0),
                record,
            })
        }
    }

    #[async_trait]
    impl PrimaryStore for StubPrimary {
        async fn find_tenant(
            &self,
            _value: &str,
            _field: TenantLookupField,
        ) -> coral_database::Result<Option<TenantRecord>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.record.clone())
        }

        async fn find_directory_entry(
            &self,
            _email: &str,
        ) -> coral_database::Result<Option<PrimaryDirectoryEntry>> {
            Err(DatabaseError::Query("not used".into()))
        }
    }

    fn acme() -> TenantRecord {
        TenantRecord {
            id: EntityId::new("66f1a2b3c4d5e6f7a8b9c0d1"),
            host: "acme.example.com".into(),
            name: "acme".into(),
            db_host: "10.0.0.5".into(),
            db_port: 27017,
            db_user_name: "svc".into(),
            db_password: "secret".into(),
            features_restrictions: Vec::new(),
        }
    }

    fn unreachable_cache() -> CacheAside {
        CacheAside::new(
            Cache::new(CacheConfig {
                url: "redis://127.0.0.1:1".to_string(),
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn development_bypasses_the_cache() {
        let primary = StubPrimary::with_record(Some(acme()));
        let directory = TenantDirectory::new(
            primary.clone(),
            unreachable_cache(),
            Environment::Development,
        );

        for _ in 0..3 {
            let record = directory
                .resolve("acme.example.com", TenantLookupField::Host)
                .await
                .unwrap();
            assert_eq!(record.unwrap().name, "acme");
        }
        assert_eq!(primary.lookups.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn production_degrades_to_primary_when_cache_is_down() {
        let primary = StubPrimary::with_record(Some(acme()));
        let directory =
            TenantDirectory::new(primary.clone(), unreachable_cache(), Environment::Production);

        let record = directory
            .resolve("acme.example.com", TenantLookupField::Host)
            .await
            .unwrap();
        assert_eq!(record.unwrap().name, "acme");
        assert_eq!(primary.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_tenant_resolves_to_none() {
        let primary = StubPrimary::with_record(None);
        let directory =
            TenantDirectory::new(primary, unreachable_cache(), Environment::Production);

        let record = directory
            .resolve("nobody.example.com", TenantLookupField::Host)
            .await
            .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn invalidate_survives_cache_outage() {
        let primary = StubPrimary::with_record(None);
        let directory =
            TenantDirectory::new(primary, unreachable_cache(), Environment::Production);
        directory.invalidate("acme.example.com").await;
    }
}
