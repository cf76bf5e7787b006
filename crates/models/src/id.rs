use serde::{Deserialize, Serialize};
use std::fmt;

/// Tenant-scoped entity identifier.
///
/// The concrete representation depends on the storage engine the deployment
/// runs on: a UUID on the relational backend, an ObjectId hex string on the
/// document backend. Everything above the dialect layer treats the value as
/// an opaque comparable token; only dialect code parses it into a native
/// filter value (see `StorageKind::parse_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_string() {
        let id = EntityId::new("66f1a2b3c4d5e6f7a8b9c0d1");
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"66f1a2b3c4d5e6f7a8b9c0d1\""
        );
    }

    #[test]
    fn round_trips_through_json() {
        let id: EntityId = serde_json::from_str("\"a4f2df1e-9d01-4f7a-8a30-111111111111\"").unwrap();
        assert_eq!(id.as_str(), "a4f2df1e-9d01-4f7a-8a30-111111111111");
    }
}
