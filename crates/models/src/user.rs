use crate::EntityId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Active" => Some(Self::Active),
            "Inactive" => Some(Self::Inactive),
            "Suspended" => Some(Self::Suspended),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Suspended => "Suspended",
        }
    }

    /// Inactive and suspended accounts short-circuit sign-in with a status
    /// message instead of a token.
    pub fn blocks_sign_in(&self) -> bool {
        matches!(self, Self::Inactive | Self::Suspended)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: EntityId,

    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// bcrypt hash; never serialized outward.
    #[serde(skip_serializing, default)]
    pub password: String,

    #[serde(default)]
    pub role_ids: Vec<EntityId>,

    pub status: UserStatus,

    #[serde(default)]
    pub acl: serde_json::Value,

    #[serde(default)]
    pub enforce_password_reset: i32,

    pub date_of_birth: Option<NaiveDateTime>,
    pub gender: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub user_image: Option<String>,

    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_matches_stored_labels() {
        assert_eq!(UserStatus::parse("Active"), Some(UserStatus::Active));
        assert_eq!(UserStatus::parse("Suspended"), Some(UserStatus::Suspended));
        assert_eq!(UserStatus::parse("active"), None);
    }

    #[test]
    fn blocked_statuses() {
        assert!(!UserStatus::Active.blocks_sign_in());
        assert!(UserStatus::Inactive.blocks_sign_in());
        assert!(UserStatus::Suspended.blocks_sign_in());
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: EntityId::new("u1"),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@acme.example.com".into(),
            password: "$2b$12$secret".into(),
            role_ids: vec![],
            status: UserStatus::Active,
            acl: serde_json::Value::Null,
            enforce_password_reset: 0,
            date_of_birth: None,
            gender: None,
            country_code: None,
            phone_number: None,
            country: None,
            address: None,
            user_image: None,
            created_at: None,
            updated_at: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["status"], "Active");
    }
}
