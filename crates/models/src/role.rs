use crate::{EntityId, UserStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Admin,
    Enduser,
}

impl RoleType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Self::Admin),
            "enduser" => Some(Self::Enduser),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Enduser => "enduser",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: EntityId,

    pub name: String,
    pub role_type: RoleType,

    #[serde(default)]
    pub acl: serde_json::Value,

    #[serde(rename = "areIsDefault", default)]
    pub is_default: bool,
}

/// One row of the users-by-role grouped aggregation: a role plus the
/// summaries of every user holding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUsersRow {
    pub role_id: EntityId,
    pub role_type: String,
    pub role_name: String,
    pub is_default: bool,
    pub total_users: i64,
    pub users: Vec<RoleUserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUserSummary {
    #[serde(rename = "_id")]
    pub id: EntityId,

    pub first_name: String,
    pub email: String,
    pub status: UserStatus,

    /// Country code + number when a country code is present.
    pub phone_number: Option<String>,
}
