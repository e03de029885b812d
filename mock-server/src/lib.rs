//! In-memory reference backend for the todo collection.
//!
//! Serves the four collection endpoints the client consumes plus a
//! single-item read. Ids are sequential integers starting at 1 and the list
//! endpoint returns tasks in creation order.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

/// Body of both `POST /todos` and `PUT /todos/{id}`. A PUT replaces every
/// field, so an omitted `completed` resets it to `false`.
#[derive(Deserialize)]
pub struct TaskFields {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    tasks: BTreeMap<u64, Task>,
}

impl Store {
    fn insert(&mut self, fields: TaskFields) -> Task {
        self.next_id += 1;
        let task = Task {
            id: self.next_id,
            text: fields.text,
            completed: fields.completed,
        };
        self.tasks.insert(task.id, task.clone());
        task
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/todos", get(list_tasks).post(create_task))
        .route("/todos/{id}", get(get_task).put(replace_task).delete(delete_task))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_tasks(State(db): State<Db>) -> Json<Vec<Task>> {
    let store = db.read().await;
    tracing::debug!(count = store.tasks.len(), "list");
    Json(store.tasks.values().cloned().collect())
}

async fn create_task(
    State(db): State<Db>,
    Json(input): Json<TaskFields>,
) -> (StatusCode, Json<Task>) {
    let task = db.write().await.insert(input);
    tracing::info!(id = task.id, "created");
    (StatusCode::CREATED, Json(task))
}

async fn get_task(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Task>, StatusCode> {
    let store = db.read().await;
    store.tasks.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn replace_task(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<TaskFields>,
) -> Result<Json<Task>, StatusCode> {
    let mut store = db.write().await;
    let task = store.tasks.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    task.text = input.text;
    task.completed = input.completed;
    tracing::info!(id, completed = task.completed, "replaced");
    Ok(Json(task.clone()))
}

async fn delete_task(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let removed = store.tasks.remove(&id);
    tracing::info!(id, found = removed.is_some(), "delete");
    removed.map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serializes_to_json() {
        let task = Task {
            id: 7,
            text: "Test".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["text"], "Test");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn fields_default_completed_to_false() {
        let input: TaskFields = serde_json::from_str(r#"{"text":"No completed field"}"#).unwrap();
        assert_eq!(input.text, "No completed field");
        assert!(!input.completed);
    }

    #[test]
    fn fields_reject_missing_text() {
        let result: Result<TaskFields, _> = serde_json::from_str(r#"{"completed":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn store_assigns_sequential_ids() {
        let mut store = Store::default();
        let a = store.insert(TaskFields { text: "a".into(), completed: false });
        let b = store.insert(TaskFields { text: "b".into(), completed: true });
        assert_eq!((a.id, b.id), (1, 2));
        assert!(b.completed);
    }

    #[test]
    fn store_ids_are_not_reused_after_delete() {
        let mut store = Store::default();
        let a = store.insert(TaskFields { text: "a".into(), completed: false });
        store.tasks.remove(&a.id);
        let b = store.insert(TaskFields { text: "b".into(), completed: false });
        assert_eq!(b.id, 2);
    }
}
