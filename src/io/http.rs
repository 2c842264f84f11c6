//! REST client for the task server.
//!
//! Uses reqwest's blocking client. Every call is one request; nothing is
//! cached between calls.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::io::store::{StoreError, TaskStore};
use crate::model::category::{Category, CategoryPatch, NewCategory};
use crate::model::task::{NewTask, Subtask, SubtaskPatch, Task, TaskPatch};

pub struct HttpStore {
    client: Client,
    base: Url,
}

impl HttpStore {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base = Url::parse(base_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(HttpStore { client, base })
    }

    /// Join path segments onto the API root, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn execute(&self, request: RequestBuilder, what: &str) -> Result<Response, StoreError> {
        let response = request.send().map_err(|e| {
            log::warn!("request for {} failed: {}", what, e);
            StoreError::Network(e.to_string())
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        log::warn!("request for {} returned {}", what, status);
        Err(StoreError::from_status(status.as_u16(), what, body))
    }

    fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, StoreError> {
        self.execute(request, what)?
            .json::<T>()
            .map_err(|e| StoreError::Decode(format!("{}: {}", what, e)))
    }
}

impl TaskStore for HttpStore {
    fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        log::debug!("GET /tasks");
        self.fetch(self.client.get(self.endpoint(&["tasks"])), "tasks")
    }

    fn create_task(&self, draft: &NewTask) -> Result<Task, StoreError> {
        log::debug!("POST /tasks {:?}", draft.title);
        self.fetch(
            self.client.post(self.endpoint(&["tasks"])).json(draft),
            "tasks",
        )
    }

    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError> {
        log::debug!("PUT /tasks/{}", id);
        self.fetch(
            self.client.put(self.endpoint(&["tasks", id])).json(patch),
            &format!("task {}", id),
        )
    }

    fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        log::debug!("DELETE /tasks/{}", id);
        self.execute(
            self.client.delete(self.endpoint(&["tasks", id])),
            &format!("task {}", id),
        )?;
        Ok(())
    }

    fn add_subtask(&self, task_id: &str, title: &str) -> Result<Subtask, StoreError> {
        log::debug!("POST /tasks/{}/subtasks", task_id);
        self.fetch(
            self.client
                .post(self.endpoint(&["tasks", task_id, "subtasks"]))
                .json(&serde_json::json!({ "title": title })),
            &format!("task {}", task_id),
        )
    }

    fn update_subtask(&self, id: &str, patch: &SubtaskPatch) -> Result<Subtask, StoreError> {
        log::debug!("PUT /subtasks/{}", id);
        self.fetch(
            self.client.put(self.endpoint(&["subtasks", id])).json(patch),
            &format!("subtask {}", id),
        )
    }

    fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        log::debug!("GET /categories");
        self.fetch(self.client.get(self.endpoint(&["categories"])), "categories")
    }

    fn create_category(&self, draft: &NewCategory) -> Result<Category, StoreError> {
        log::debug!("POST /categories {:?}", draft.name);
        self.fetch(
            self.client.post(self.endpoint(&["categories"])).json(draft),
            "categories",
        )
    }

    fn update_category(&self, id: &str, patch: &CategoryPatch) -> Result<Category, StoreError> {
        log::debug!("PUT /categories/{}", id);
        self.fetch(
            self.client
                .put(self.endpoint(&["categories", id]))
                .json(patch),
            &format!("category {}", id),
        )
    }

    fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        log::debug!("DELETE /categories/{}", id);
        self.execute(
            self.client.delete(self.endpoint(&["categories", id])),
            &format!("category {}", id),
        )?;
        Ok(())
    }

    fn health(&self) -> Result<(), StoreError> {
        self.execute(self.client.get(self.endpoint(&["health"])), "health")?;
        Ok(())
    }
}
