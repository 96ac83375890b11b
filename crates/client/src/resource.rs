//! Typed resource helpers over the pipeline.
//!
//! Thin by design: every error is the pipeline's normalized [`ApiError`],
//! forwarded unchanged. Page components compose these with their own paths
//! (`/clientes`, `/pets`, `/agendamentos`, ...).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::pipeline::{ApiClient, ApiRequest};

/// Pagination envelope returned by list endpoints. `page_index` is
/// zero-based; requesting further pages is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub page_size: u32,
    pub page_index: u32,
    pub is_first: bool,
    pub is_last: bool,
    pub is_empty: bool,
}

/// Query half of the pagination contract.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
    pub search: Option<String>,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        request = request.query("page", self.page).query("size", self.size);
        if let Some(search) = &self.search {
            request = request.query("search", search);
        }
        request
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

impl ApiClient {
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(ApiRequest::get(path)).await?;
        decode(response).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let response = self.execute(ApiRequest::post(path).json(encode(body)?)).await?;
        decode(response).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let response = self.execute(ApiRequest::put(path).json(encode(body)?)).await?;
        decode(response).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let response = self.execute(ApiRequest::patch(path).json(encode(body)?)).await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Fetch one page of a paginated list endpoint.
    pub async fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &PageQuery,
    ) -> Result<Page<T>, ApiError> {
        let response = self.execute(query.apply(ApiRequest::get(path))).await?;
        decode(response).await
    }
}

fn encode(body: &impl Serialize) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
