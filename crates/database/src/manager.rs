//! Ephemeral per-tenant connections.
//!
//! A tenant database is dialed for exactly one unit of work and torn down on
//! every exit path, success or failure. Nothing here pools tenant
//! connections; tenant credentials come from the control plane at call time
//! and must not outlive the operation that needed them.

use crate::dialect::{MongoStore, PostgresStore, StorageKind, TenantStore};
use crate::error::{DatabaseError, Result};
use coral_models::TenantRecord;
use futures::future::BoxFuture;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleState {
    Unopened,
    Opening,
    Active,
    Closing,
    Closed,
}

/// A live tenant session scoped to one unit of work. Handed to the work
/// closure by [`TenantConnectionManager::with_tenant_connection`]; holding it
/// past that scope is impossible and using it after close is a programming
/// error, not an I/O error.
pub struct TenantHandle {
    store: Option<Box<dyn TenantStore>>,
    state: HandleState,
    tenant: String,
}

impl TenantHandle {
    fn new(tenant: String) -> Self {
        Self {
            store: None,
            state: HandleState::Unopened,
            tenant,
        }
    }

    fn activate(&mut self, store: Box<dyn TenantStore>) {
        self.store = Some(store);
        self.state = HandleState::Active;
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Panics outside the active window.
    pub fn store(&mut self) -> &mut dyn TenantStore {
        match (self.state, &mut self.store) {
            (HandleState::Active, Some(store)) => store.as_mut(),
            (state, _) => panic!(
                "tenant handle for {} used in state {:?}",
                self.tenant, state
            ),
        }
    }

    /// Idempotent; the first call tears the session down, later calls are
    /// no-ops.
    async fn close(&mut self) -> Result<()> {
        if self.state != HandleState::Active {
            return Ok(());
        }
        self.state = HandleState::Closing;
        let result = match self.store.take() {
            Some(store) => store.close().await,
            None => Ok(()),
        };
        self.state = HandleState::Closed;
        result
    }
}

/// Opens and scopes tenant sessions. Cheap to clone; carries configuration
/// only, never live connections.
#[derive(Debug, Clone)]
pub struct TenantConnectionManager {
    kind: StorageKind,
    connect_timeout: Duration,
    mongo_fallback_uri: Option<String>,
}

impl TenantConnectionManager {
    pub fn new(
        kind: StorageKind,
        connect_timeout: Duration,
        mongo_fallback_uri: Option<String>,
    ) -> Self {
        Self {
            kind,
            connect_timeout,
            mongo_fallback_uri,
        }
    }

    pub fn from_env(kind: StorageKind) -> Self {
        let timeout_secs = std::env::var("TENANT_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        Self::new(
            kind,
            Duration::from_secs(timeout_secs),
            std::env::var("MONGODB_CONNECTION_STRING").ok(),
        )
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.kind
    }

    async fn open(&self, record: &TenantRecord) -> Result<Box<dyn TenantStore>> {
        match self.kind {
            StorageKind::Postgres => Ok(Box::new(
                PostgresStore::connect(record, self.connect_timeout).await?,
            )),
            StorageKind::Mongo => Ok(Box::new(
                MongoStore::connect(record, self.mongo_fallback_uri.as_deref(), self.connect_timeout)
                    .await?,
            )),
        }
    }

    /// Dial the tenant's database, run `work` against the session, and close
    /// the session no matter how `work` exited. A close failure is logged
    /// and never masks the work's own result.
    pub async fn with_tenant_connection<T, E, F>(
        &self,
        record: &TenantRecord,
        work: F,
    ) -> std::result::Result<T, E>
    where
        E: From<DatabaseError>,
        F: for<'h> FnOnce(&'h mut TenantHandle) -> BoxFuture<'h, std::result::Result<T, E>>,
    {
        let mut handle = TenantHandle::new(record.name.clone());
        handle.state = HandleState::Opening;
        let store = self.open(record).await.map_err(E::from)?;
        handle.activate(store);
        run_scoped(handle, work).await
    }
}

async fn run_scoped<T, E, F>(mut handle: TenantHandle, work: F) -> std::result::Result<T, E>
where
    E: From<DatabaseError>,
    F: for<'h> FnOnce(&'h mut TenantHandle) -> BoxFuture<'h, std::result::Result<T, E>>,
{
    let result = work(&mut handle).await;
    let tenant = handle.tenant().to_string();
    if let Err(error) = handle.close().await {
        tracing::warn!(tenant = %tenant, error = %error, "tenant connection close failed");
    }
    result
}
