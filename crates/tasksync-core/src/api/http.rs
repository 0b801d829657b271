//! HTTP implementation of the task API

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use super::{edit_path, task_path, TaskApi, TASKS_PATH};
use crate::error::{ApiError, ApiResult};
use crate::models::{NewTask, Task, TaskId};

/// Task API client over HTTP
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
}

impl HttpTaskApi {
    /// Create a client for the server at `base_url`
    ///
    /// `base_url` is the scheme and authority (e.g. `http://localhost:3000`);
    /// the `/api/tasks` paths are appended to it.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tasksync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and map transport and status failures
    async fn execute(
        &self,
        method: &'static str,
        path: &str,
        request: RequestBuilder,
    ) -> ApiResult<Response> {
        debug!("{} {}", method, path);

        let response = request
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network {
                method,
                path: path.to_string(),
                details: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!("{} {} -> {}", method, path, status);
            return Err(ApiError::Rejected {
                method,
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> ApiResult<Vec<Task>> {
        let request = self.client.get(self.url(TASKS_PATH));
        let response = self.execute("GET", TASKS_PATH, request).await?;

        let body = response.text().await.map_err(|e| ApiError::Network {
            method: "GET",
            path: TASKS_PATH.to_string(),
            details: e.to_string(),
        })?;

        decode_task_list(&body)
    }

    async fn create_task(&self, task: &NewTask) -> ApiResult<()> {
        let request = self.client.post(self.url(TASKS_PATH)).json(task);
        self.execute("POST", TASKS_PATH, request).await?;
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> ApiResult<()> {
        let path = edit_path(task.id);
        let request = self.client.put(self.url(&path)).json(task);
        self.execute("PUT", &path, request).await?;
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> ApiResult<()> {
        let path = task_path(id);
        let request = self.client.delete(self.url(&path));
        self.execute("DELETE", &path, request).await?;
        Ok(())
    }
}

/// Decode a list response body
fn decode_task_list(body: &str) -> ApiResult<Vec<Task>> {
    serde_json::from_str(body).map_err(|e| ApiError::Malformed {
        path: TASKS_PATH.to_string(),
        details: e.to_string(),
    })
}
