/// InfluxDB 1.x HTTP client
///
/// Writes points through the `/write` endpoint as line protocol, one point
/// per request, and bootstraps the database through `/query`.
///
/// API Documentation: https://docs.influxdata.com/influxdb/v1/tools/api/

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

use super::line_protocol;
use super::PointSink;
use crate::error::StoreError;
use crate::model::CanonicalPoint;

/// Timestamps produced by the parsers are epoch milliseconds.
const PRECISION: &str = "ms";

// ---------------------------------------------------------------------------
// Query response structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking InfluxDB client. Cheap to share: the underlying HTTP client
/// pools connections and is safe for concurrent use.
pub struct InfluxClient {
    http: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl InfluxClient {
    /// Create a client for the server at `url` (e.g. `http://localhost:8086`).
    pub fn new(
        url: &str,
        credentials: Option<(&str, &str)>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            credentials: credentials.map(|(u, p)| (u.to_string(), p.to_string())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the server is reachable (`GET /ping` answers 204).
    pub fn ping(&self) -> Result<bool, StoreError> {
        let url = format!("{}/ping", self.base_url);
        let response = self.authed(self.http.get(&url)).send()?;
        Ok(response.status().is_success())
    }

    /// Builds the `/write` URL for `database` at millisecond precision.
    pub fn write_url(&self, database: &str) -> String {
        format!(
            "{}/write?db={}&precision={}",
            self.base_url,
            urlencoding::encode(database),
            PRECISION
        )
    }

    /// Builds the `/query` URL carrying an InfluxQL statement.
    pub fn query_url(&self, statement: &str) -> String {
        format!("{}/query?q={}", self.base_url, urlencoding::encode(statement))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }
}

impl PointSink for InfluxClient {
    fn write_point(&self, point: &CanonicalPoint, database: &str) -> Result<(), StoreError> {
        let body = line_protocol::render(point);
        let response = self
            .authed(self.http.post(self.write_url(database)))
            .body(body)
            .send()?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(StoreError::Rejected { status, message })
        }
    }

    /// `CREATE DATABASE` is a no-op when the database already exists.
    fn ensure_database(&self, database: &str) -> Result<(), StoreError> {
        let statement = create_database_statement(database);
        let response = self.authed(self.http.post(self.query_url(&statement))).send()?;

        let status = response.status().as_u16();
        let text = response.text()?;
        if !(200..300).contains(&status) {
            return Err(StoreError::Rejected { status, message: text });
        }

        match query_error(&text) {
            Some(message) => Err(StoreError::Rejected { status, message }),
            None => Ok(()),
        }
    }

    fn describe(&self) -> String {
        format!("InfluxDB at {}", self.base_url)
    }
}

fn create_database_statement(database: &str) -> String {
    format!("CREATE DATABASE \"{}\"", database.replace('"', "\\\""))
}

/// Extracts the first error reported in a `/query` response body, if any.
fn query_error(body: &str) -> Option<String> {
    let response: QueryResponse = serde_json::from_str(body).ok()?;
    response
        .error
        .or_else(|| response.results.into_iter().find_map(|r| r.error))
}
