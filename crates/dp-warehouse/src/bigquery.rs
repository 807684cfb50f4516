//! BigQuery warehouse backend over the v2 REST API
//!
//! Projects are namespaces, datasets are containers and tables (including
//! views) are resources. Authentication is a pre-issued OAuth access token;
//! obtaining one (`gcloud auth print-access-token`, workload identity) is left
//! to the operator.

use crate::error::{WarehouseError, WarehouseResult};
use crate::traits::Warehouse;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;

/// Page size requested from list endpoints
const PAGE_SIZE: &str = "1000";

/// BigQuery REST backend
pub struct BigQueryWarehouse {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetList {
    #[serde(default)]
    datasets: Vec<DatasetEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetEntry {
    dataset_reference: DatasetReference,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetReference {
    dataset_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableList {
    #[serde(default)]
    tables: Vec<TableEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableEntry {
    table_reference: TableReference,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableReference {
    table_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl BigQueryWarehouse {
    /// Create a client for `endpoint` (e.g. `https://bigquery.googleapis.com/bigquery/v2`).
    ///
    /// Requests are sent without credentials when `access_token` is `None`.
    pub fn new(endpoint: &str, access_token: Option<String>) -> WarehouseResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            WarehouseError::ConnectionError(format!("invalid endpoint '{}': {}", endpoint, e))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(WarehouseError::ConnectionError(format!(
                "invalid endpoint '{}': not a base URL",
                endpoint
            )));
        }
        let client = Client::builder()
            .user_agent(concat!("dfprune/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WarehouseError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            access_token,
        })
    }

    /// Create a client that authenticates with the token stored in `token_env`.
    pub fn from_env(endpoint: &str, token_env: &str) -> WarehouseResult<Self> {
        let token = std::env::var(token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                WarehouseError::AccessDenied(format!(
                    "environment variable {} is not set; export an OAuth access token \
                     (e.g. `gcloud auth print-access-token`)",
                    token_env
                ))
            })?;
        Self::new(endpoint, Some(token.trim().to_string()))
    }

    fn url(&self, segments: &[&str]) -> WarehouseResult<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| WarehouseError::Internal("endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request, mapping non-success statuses to warehouse errors.
    async fn send(&self, request: RequestBuilder, what: &str) -> WarehouseResult<Response> {
        let request = match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|parsed| parsed.error.message)
            .unwrap_or(body);
        let detail = format!("{}: {} (HTTP {})", what, message, status.as_u16());

        Err(match status.as_u16() {
            401 | 403 => WarehouseError::AccessDenied(detail),
            404 => WarehouseError::NotFound(detail),
            _ => WarehouseError::Request(detail),
        })
    }

    fn list_request(&self, url: Url, page_token: Option<&str>) -> RequestBuilder {
        let request = self.client.get(url).query(&[("maxResults", PAGE_SIZE)]);
        match page_token {
            Some(token) => request.query(&[("pageToken", token)]),
            None => request,
        }
    }
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    async fn list_containers(&self, namespace: &str) -> WarehouseResult<Vec<String>> {
        let url = self.url(&["projects", namespace, "datasets"])?;
        let what = format!("list datasets in {}", namespace);
        let mut datasets = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let request = self.list_request(url.clone(), page_token.as_deref());
            let page: DatasetList = self.send(request, &what).await?.json().await?;
            datasets.extend(
                page.datasets
                    .into_iter()
                    .map(|entry| entry.dataset_reference.dataset_id),
            );
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        log::debug!("bigquery: {} dataset(s) in {}", datasets.len(), namespace);
        Ok(datasets)
    }

    async fn list_resources(
        &self,
        namespace: &str,
        container: &str,
    ) -> WarehouseResult<Vec<String>> {
        let url = self.url(&["projects", namespace, "datasets", container, "tables"])?;
        let what = format!("list tables in {}.{}", namespace, container);
        let mut tables = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let request = self.list_request(url.clone(), page_token.as_deref());
            let page: TableList = self.send(request, &what).await?.json().await?;
            tables.extend(
                page.tables
                    .into_iter()
                    .map(|entry| entry.table_reference.table_id),
            );
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(tables)
    }

    async fn delete_resource(
        &self,
        namespace: &str,
        container: &str,
        name: &str,
    ) -> WarehouseResult<()> {
        let url = self.url(&[
            "projects", namespace, "datasets", container, "tables", name,
        ])?;
        let what = format!("delete table {}.{}.{}", namespace, container, name);
        self.send(self.client.delete(url), &what).await?;
        Ok(())
    }

    async fn delete_container(&self, namespace: &str, container: &str) -> WarehouseResult<()> {
        // deleteContents is left unset so BigQuery rejects a dataset that is no longer empty.
        let url = self.url(&["projects", namespace, "datasets", container])?;
        let what = format!("delete dataset {}.{}", namespace, container);
        self.send(self.client.delete(url), &what).await?;
        Ok(())
    }

    fn warehouse_type(&self) -> &'static str {
        "bigquery"
    }
}

#[cfg(test)]
#[path = "bigquery_test.rs"]
mod tests;
