use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::datasets::{Dataset, DatasetInfo, ReportColumn};
use crate::error::ApiError;
use crate::reports::Collection;

use super::status::parse_status;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ReportsApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ReportsApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.api_base_url.clone(), config.api_token.clone())
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        let mut url =
            reqwest::Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(format!("{} cannot take a path", self.base_url)))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: reqwest::Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url).timeout(REQUEST_TIMEOUT);
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => builder.bearer_auth(token),
            _ => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");

        let started = Instant::now();
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let response = ensure_success(response).await?;
        let value = response.json::<T>().await?;
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "GET finished");
        Ok(value)
    }

    pub async fn fetch_collections(&self, user_uid: &str) -> Result<Vec<Collection>, ApiError> {
        let collections: Vec<Collection> = self.get_json(&["reports", user_uid, "collections"]).await?;
        info!(user = user_uid, count = collections.len(), "fetched report collections");
        Ok(collections)
    }

    pub async fn save_collections(&self, user_uid: &str, collections: &[Collection]) -> Result<(), ApiError> {
        let url = self.endpoint(&["reports", user_uid, "collections"])?;
        debug!(%url, "PUT");

        let response = self
            .request(reqwest::Method::PUT, url)
            .json(collections)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        parse_status(&body)?;

        info!(user = user_uid, count = collections.len(), "saved report collections");
        Ok(())
    }

    pub async fn fetch_datasets(&self) -> Result<Vec<DatasetInfo>, ApiError> {
        let catalog: Vec<DatasetInfo> = self.get_json(&["reports", "datasets"]).await?;
        info!(count = catalog.len(), "fetched dataset catalog");
        Ok(catalog)
    }

    pub async fn fetch_columns(&self, dataset: Dataset) -> Result<Vec<ReportColumn>, ApiError> {
        let columns: Vec<ReportColumn> = self
            .get_json(&["reports", "datasets", dataset.key(), "columns"])
            .await?;
        info!(%dataset, count = columns.len(), "fetched dataset columns");
        Ok(columns)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}
