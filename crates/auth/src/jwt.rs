use chrono::Utc;
use coral_models::User;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id within the tenant's database.
    pub sub: String,

    #[serde(rename = "firstName")]
    pub first_name: String,

    #[serde(rename = "lastName")]
    pub last_name: String,

    pub iat: i64,
    pub exp: i64,

    /// Unique per token, for revocation lists downstream.
    pub jti: String,
}

#[derive(Clone)]
pub struct JwtService {
    secret: String,
    expiration_hours: i64,
}

impl JwtService {
    pub fn new(secret: String, expiration_hours: i64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }

    /// Panics when `JWT_SECRET` is unset; the process must not come up able
    /// to mint unverifiable tokens.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let expiration_hours = std::env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        Self::new(secret, expiration_hours)
    }

    pub fn sign(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(self.expiration_hours)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coral_models::{EntityId, UserStatus};

    fn user() -> User {
        User {
            id: EntityId::new("66f1a2b3c4d5e6f7a8b9c0d1"),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@acme.example.com".into(),
            password: String::new(),
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
        }
    }

    #[test]
    fn sign_then_verify_round_trips_claims() {
        let jwt = JwtService::new("test-secret".into(), 1);
        let token = jwt.sign(&user()).unwrap();
        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.sub, "66f1a2b3c4d5e6f7a8b9c0d1");
        assert_eq!(claims.first_name, "Ada");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let jwt = JwtService::new("test-secret".into(), 1);
        let token = jwt.sign(&user()).unwrap();
        assert!(JwtService::new("other".into(), 1).verify(&token).is_err());
    }

    #[test]
    fn tokens_carry_distinct_jtis() {
        let jwt = JwtService::new("test-secret".into(), 1);
        let a = jwt.verify(&jwt.sign(&user()).unwrap()).unwrap();
        let b = jwt.verify(&jwt.sign(&user()).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
