use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

/// Request body for registration. Fields are optional so missing keys
/// surface as our 400, not as a body rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub access_token: String,
    pub user: PublicUser,
}

/// Public slice of the account embedded in auth responses.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
}

/// Serialized account for `/auth/me`; the password hash is stripped.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

impl TryFrom<User> for UserResponse {
    type Error = anyhow::Error;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        let id = user
            .id
            .ok_or_else(|| anyhow::anyhow!("user document missing _id"))?;
        Ok(Self {
            id: id.to_hex(),
            username: user.username,
            created_at: user.created_at.try_to_rfc3339_string()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{oid::ObjectId, DateTime};

    #[test]
    fn user_response_strips_the_password_hash() {
        let user = User {
            id: Some(ObjectId::new()),
            username: "@alice".into(),
            password: "$2b$12$secret-hash".into(),
            created_at: DateTime::now(),
        };
        let response = UserResponse::try_from(user).expect("conversion should succeed");
        let json = serde_json::to_string(&response).expect("serialization should succeed");
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password"));
        assert!(json.contains("@alice"));
    }

    #[test]
    fn user_response_emits_hex_id() {
        let id = ObjectId::new();
        let user = User {
            id: Some(id),
            username: "@bob".into(),
            password: "hash".into(),
            created_at: DateTime::now(),
        };
        let response = UserResponse::try_from(user).expect("conversion should succeed");
        assert_eq!(response.id, id.to_hex());
        assert_eq!(response.id.len(), 24);
    }

    #[test]
    fn user_response_requires_an_id() {
        let user = User {
            id: None,
            username: "@carol".into(),
            password: "hash".into(),
            created_at: DateTime::now(),
        };
        assert!(UserResponse::try_from(user).is_err());
    }
}
