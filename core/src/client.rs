//! Stateless HTTP request builder and response parser for the collection.
//!
//! # Design
//! `TodoClient` holds only the collection URL. Each endpoint is split into a
//! `build_*` method producing an `HttpRequest` and a `parse_*` method
//! consuming an `HttpResponse`; the host runs the round-trip in between.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Task, TaskFields, TaskId};

/// Builds requests against a collection URL such as
/// `http://localhost:5000/todos`.
#[derive(Debug, Clone)]
pub struct TodoClient {
    collection_url: String,
}

impl TodoClient {
    pub fn new(collection_url: &str) -> Self {
        Self {
            collection_url: collection_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_tasks(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_task(&self, input: &TaskFields) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_url.clone(),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_update_task(&self, id: &TaskId, input: &TaskFields) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.item_url(id),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_delete_task(&self, id: &TaskId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    /// The body is ignored; backends variously answer 200 with the deleted
    /// item, 200 with `{}`, or 204.
    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn item_url(&self, id: &TaskId) -> String {
        format!("{}/{id}", self.collection_url)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json(input: &TaskFields) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:5000/todos")
    }

    #[test]
    fn build_list_tasks_targets_collection() {
        let req = client().build_list_tasks();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:5000/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_task_sends_json_fields() {
        let input = TaskFields {
            text: "Buy milk".to_string(),
            completed: false,
        };
        let req = client().build_create_task(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:5000/todos");
        assert_eq!(req.headers, json_headers());
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"text": "Buy milk", "completed": false}));
    }

    #[test]
    fn build_update_task_sends_full_replace() {
        let input = TaskFields {
            text: "Updated".to_string(),
            completed: true,
        };
        let req = client().build_update_task(&TaskId::Number(3), &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:5000/todos/3");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["text"], "Updated");
        assert_eq!(body["completed"], true);
    }

    #[test]
    fn build_delete_task_uses_string_id_verbatim() {
        let req = client().build_delete_task(&TaskId::from("x9"));
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:5000/todos/x9");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:5000/todos/");
        assert_eq!(client.build_list_tasks().path, "http://localhost:5000/todos");
    }

    #[test]
    fn parse_create_task_accepts_any_2xx() {
        let body = r#"{"id":1,"text":"New","completed":false}"#;
        for status in [200, 201] {
            let task = client().parse_create_task(HttpResponse::new(status, body)).unwrap();
            assert_eq!(task.id, TaskId::Number(1));
        }
    }

    #[test]
    fn parse_update_task_not_found() {
        let err = client().parse_update_task(HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_create_task_server_error() {
        let err = client()
            .parse_create_task(HttpResponse::new(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, ref body } if body == "internal error"));
    }

    #[test]
    fn parse_delete_task_ignores_body() {
        assert!(client().parse_delete_task(HttpResponse::new(200, "{}")).is_ok());
        assert!(client().parse_delete_task(HttpResponse::new(204, "")).is_ok());
    }

    #[test]
    fn parse_list_tasks_bad_json() {
        let err = client().parse_list_tasks(HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
