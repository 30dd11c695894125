use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

/// A stored account document. The password hash never leaves the process;
/// responses go through the DTOs in [`super::dto`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub password: String,
    pub created_at: DateTime,
}

fn users(db: &Database) -> Collection<User> {
    db.collection::<User>("users")
}

pub async fn find_by_username(
    db: &Database,
    username: &str,
) -> mongodb::error::Result<Option<User>> {
    users(db).find_one(doc! { "username": username }, None).await
}

pub async fn find_by_id(db: &Database, id: ObjectId) -> mongodb::error::Result<Option<User>> {
    users(db).find_one(doc! { "_id": id }, None).await
}

/// Inserts a new account and returns it with the store-assigned id.
pub async fn insert(
    db: &Database,
    username: &str,
    password_hash: &str,
) -> mongodb::error::Result<User> {
    let mut user = User {
        id: None,
        username: username.to_string(),
        password: password_hash.to_string(),
        created_at: DateTime::now(),
    };
    let result = users(db).insert_one(&user, None).await?;
    user.id = result.inserted_id.as_object_id();
    Ok(user)
}
