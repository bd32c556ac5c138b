//! Segmented query access to the platform's table storage service
//!
//! Queries against a log table are served in segments: each response carries
//! a batch of rows plus, when more rows match, a continuation cursor in the
//! `x-grid-continuation-*` headers. Callers page by feeding the cursor back
//! into the next call; ordering within and across segments is whatever the
//! service returns.

use reqwest::header::{self, HeaderMap};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApiError, Result};

const CONTINUATION_PARTITION_HEADER: &str = "x-grid-continuation-next-partition-key";
const CONTINUATION_ROW_HEADER: &str = "x-grid-continuation-next-row-key";
const DEFAULT_ENDPOINT_SUFFIX: &str = "tables.gridplatform.io";

/// Opaque continuation token returned by a segmented query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCursor {
    pub next_partition_key: String,
    pub next_row_key: String,
}

impl std::fmt::Display for TableCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.next_partition_key, self.next_row_key)
    }
}

/// One segment of a query result
#[derive(Debug)]
pub struct TableSegment<T> {
    pub rows: Vec<T>,
    pub continuation: Option<TableCursor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    filter: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_partition_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_row_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableEntry {
    table_name: String,
}

#[derive(Debug, Deserialize)]
struct TableListResponse {
    value: Vec<TableEntry>,
}

/// Client for one storage account's table service
#[derive(Debug, Clone)]
pub struct TableClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TableClient {
    /// Build a client for `account`, authenticating every request with the
    /// shared account key.
    pub fn new(account: &str, key: &str, endpoint_suffix: Option<&str>) -> Result<Self> {
        let suffix = endpoint_suffix.unwrap_or(DEFAULT_ENDPOINT_SUFFIX);
        Self::with_endpoint(&format!("https://{account}.{suffix}/"), key)
    }

    /// Build a client against an explicit endpoint URL. `new` is the normal
    /// entry point; this one exists for non-standard deployments and tests.
    pub fn with_endpoint(endpoint: &str, key: &str) -> Result<Self> {
        let normalized = if endpoint.ends_with('/') {
            endpoint.to_string()
        } else {
            format!("{endpoint}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidResponse(format!("invalid storage endpoint: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let mut key_value = header::HeaderValue::from_str(key)
            .map_err(|e| ApiError::InvalidResponse(format!("invalid account key: {e}")))?;
        key_value.set_sensitive(true);
        headers.insert("x-grid-account-key", key_value);

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { http, base_url })
    }

    /// List table names starting with `prefix`
    pub async fn list_tables(&self, prefix: &str) -> Result<Vec<String>> {
        let mut url = self
            .base_url
            .join("tables")
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut().append_pair("prefix", prefix);

        tracing::trace!(%url, "GET");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        let parsed: TableListResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("{e} (body: {body})")))?;
        Ok(parsed.value.into_iter().map(|t| t.table_name).collect())
    }

    /// Execute one segment of a filtered query against `table`.
    ///
    /// Pass `None` for the first segment; feed the returned cursor back in to
    /// fetch the next one. A segment without a cursor is the last.
    pub async fn query_segmented<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: &str,
        cursor: Option<&TableCursor>,
    ) -> Result<TableSegment<T>> {
        let url = self
            .base_url
            .join(&format!("tables/{table}/query"))
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        let request = QueryRequest {
            filter,
            next_partition_key: cursor.map(|c| c.next_partition_key.as_str()),
            next_row_key: cursor.map(|c| c.next_row_key.as_str()),
        };

        tracing::trace!(%url, filter, "POST query segment");
        let response = self.http.post(url).json(&request).send().await?;
        let status = response.status();
        let continuation = cursor_from_headers(response.headers());
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        let parsed: QueryResponse<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("{e} (body: {body})")))?;
        Ok(TableSegment {
            rows: parsed.value,
            continuation,
        })
    }
}

fn cursor_from_headers(headers: &HeaderMap) -> Option<TableCursor> {
    let partition = headers.get(CONTINUATION_PARTITION_HEADER)?.to_str().ok()?;
    let row = headers.get(CONTINUATION_ROW_HEADER)?.to_str().ok()?;
    Some(TableCursor {
        next_partition_key: partition.to_string(),
        next_row_key: row.to_string(),
    })
}
