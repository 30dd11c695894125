use serde::{Deserialize, Serialize};

use super::repo::Task;

/// Request body for task creation. Both fields are required; missing keys
/// map to a 400, not a body rejection.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update: only fields present in the body are written.
/// `completed` is deliberately absent here; it is only reachable through
/// the toggle route.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// JSON-safe task view: hex ids, RFC 3339 timestamps.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<Task> for TaskResponse {
    type Error = anyhow::Error;

    fn try_from(task: Task) -> Result<Self, Self::Error> {
        let id = task
            .id
            .ok_or_else(|| anyhow::anyhow!("task document missing _id"))?;
        Ok(Self {
            id: id.to_hex(),
            user_id: task.user_id.to_hex(),
            title: task.title,
            description: task.description,
            completed: task.completed,
            created_at: task.created_at.try_to_rfc3339_string()?,
            updated_at: task.updated_at.try_to_rfc3339_string()?,
        })
    }
}

/// Per-owner task counters; `pending` is derived so the total always
/// balances.
#[derive(Debug, Serialize)]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

impl TaskStats {
    pub fn from_counts(total: u64, completed: u64) -> Self {
        Self {
            total,
            completed,
            pending: total.saturating_sub(completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{oid::ObjectId, DateTime};

    fn sample_task() -> Task {
        Task {
            id: Some(ObjectId::new()),
            user_id: ObjectId::new(),
            title: "Buy milk".into(),
            description: "2%".into(),
            completed: false,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[test]
    fn task_response_emits_hex_ids() {
        let task = sample_task();
        let owner = task.user_id;
        let response = TaskResponse::try_from(task).expect("conversion should succeed");
        assert_eq!(response.id.len(), 24);
        assert_eq!(response.user_id, owner.to_hex());
    }

    #[test]
    fn task_response_preserves_fields() {
        let response = TaskResponse::try_from(sample_task()).expect("conversion should succeed");
        assert_eq!(response.title, "Buy milk");
        assert_eq!(response.description, "2%");
        assert!(!response.completed);
    }

    #[test]
    fn task_response_requires_an_id() {
        let mut task = sample_task();
        task.id = None;
        assert!(TaskResponse::try_from(task).is_err());
    }

    #[test]
    fn stats_total_balances_completed_and_pending() {
        for (total, completed) in [(0, 0), (1, 0), (5, 2), (7, 7)] {
            let stats = TaskStats::from_counts(total, completed);
            assert_eq!(stats.total, stats.completed + stats.pending);
        }
    }
}
