use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    results::{DeleteResult, UpdateResult},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use super::dto::UpdateTaskRequest;

/// A stored task document. Owner scoping happens in the queries below:
/// every lookup and mutation filters on both `_id` and `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn tasks(db: &Database) -> Collection<Task> {
    db.collection::<Task>("tasks")
}

pub async fn list_by_owner(db: &Database, owner: ObjectId) -> mongodb::error::Result<Vec<Task>> {
    let cursor = tasks(db).find(doc! { "user_id": owner }, None).await?;
    cursor.try_collect().await
}

/// Inserts a fresh task for `owner` and returns it with the
/// store-assigned id.
pub async fn insert(
    db: &Database,
    owner: ObjectId,
    title: String,
    description: String,
) -> mongodb::error::Result<Task> {
    let now = DateTime::now();
    let mut task = Task {
        id: None,
        user_id: owner,
        title,
        description,
        completed: false,
        created_at: now,
        updated_at: now,
    };
    let result = tasks(db).insert_one(&task, None).await?;
    task.id = result.inserted_id.as_object_id();
    Ok(task)
}

pub async fn find_by_id_and_owner(
    db: &Database,
    id: ObjectId,
    owner: ObjectId,
) -> mongodb::error::Result<Option<Task>> {
    tasks(db)
        .find_one(doc! { "_id": id, "user_id": owner }, None)
        .await
}

/// Builds the partial `$set` document for a full update: only supplied
/// fields are written, `updated_at` always is.
pub fn patch_document(patch: &UpdateTaskRequest) -> Document {
    let mut set = doc! { "updated_at": DateTime::now() };
    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(description) = &patch.description {
        set.insert("description", description.as_str());
    }
    set
}

pub async fn apply_patch(
    db: &Database,
    id: ObjectId,
    owner: ObjectId,
    patch: &UpdateTaskRequest,
) -> mongodb::error::Result<UpdateResult> {
    tasks(db)
        .update_one(
            doc! { "_id": id, "user_id": owner },
            doc! { "$set": patch_document(patch) },
            None,
        )
        .await
}

pub async fn set_completed(
    db: &Database,
    id: ObjectId,
    owner: ObjectId,
    completed: bool,
) -> mongodb::error::Result<UpdateResult> {
    tasks(db)
        .update_one(
            doc! { "_id": id, "user_id": owner },
            doc! { "$set": { "completed": completed, "updated_at": DateTime::now() } },
            None,
        )
        .await
}

pub async fn delete_by_id_and_owner(
    db: &Database,
    id: ObjectId,
    owner: ObjectId,
) -> mongodb::error::Result<DeleteResult> {
    tasks(db)
        .delete_one(doc! { "_id": id, "user_id": owner }, None)
        .await
}

pub async fn delete_completed(
    db: &Database,
    owner: ObjectId,
) -> mongodb::error::Result<DeleteResult> {
    tasks(db)
        .delete_many(doc! { "user_id": owner, "completed": true }, None)
        .await
}

pub async fn count_by_owner(db: &Database, owner: ObjectId) -> mongodb::error::Result<u64> {
    tasks(db).count_documents(doc! { "user_id": owner }, None).await
}

pub async fn count_completed(db: &Database, owner: ObjectId) -> mongodb::error::Result<u64> {
    tasks(db)
        .count_documents(doc! { "user_id": owner, "completed": true }, None)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_with_no_fields_still_touches_updated_at() {
        let set = patch_document(&UpdateTaskRequest::default());
        assert!(set.contains_key("updated_at"));
        assert!(!set.contains_key("title"));
        assert!(!set.contains_key("description"));
    }

    #[test]
    fn patch_includes_only_supplied_fields() {
        let patch = UpdateTaskRequest {
            title: Some("New title".into()),
            description: None,
        };
        let set = patch_document(&patch);
        assert_eq!(set.get_str("title").expect("title should be set"), "New title");
        assert!(!set.contains_key("description"));
    }

    #[test]
    fn patch_never_carries_completed() {
        let patch = UpdateTaskRequest {
            title: Some("t".into()),
            description: Some("d".into()),
        };
        let set = patch_document(&patch);
        assert!(!set.contains_key("completed"));
    }
}
