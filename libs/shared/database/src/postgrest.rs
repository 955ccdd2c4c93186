use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION, CONTENT_RANGE},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::DbError;

/// Thin JSON client for a PostgREST endpoint. Paths are table routes with
/// PostgREST filter syntax, e.g. `/appointments?doctor_id=eq.5`.
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.postgrest_url.trim_end_matches('/').to_string(),
            api_key: config.postgrest_api_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, DbError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !self.api_key.is_empty() {
            let key = HeaderValue::from_str(&self.api_key)
                .map_err(|e| DbError::Config(format!("invalid api key: {}", e)))?;
            let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| DbError::Config(format!("invalid api key: {}", e)))?;
            headers.insert("apikey", key);
            headers.insert(AUTHORIZATION, bearer);
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, DbError>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, DbError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("PostgREST error ({}): {}", status, error_text);
            return Err(DbError::from_response(status.as_u16(), &error_text));
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<T, DbError>
    where T: DeserializeOwned {
        let mut rows: Vec<T> = self.request_with_headers(
            Method::POST,
            &format!("/{}", table),
            Some(row),
            Some(return_representation()),
        ).await?;

        if rows.is_empty() {
            return Err(DbError::Api {
                status: 201,
                message: format!("insert into {} returned no rows", table),
            });
        }

        Ok(rows.swap_remove(0))
    }

    /// PATCH the rows matched by `path` and return them. An empty vector means
    /// the filter matched nothing, which callers use for conditional updates.
    pub async fn update<T>(&self, path: &str, changes: Value) -> Result<Vec<T>, DbError>
    where T: DeserializeOwned {
        self.request_with_headers(
            Method::PATCH,
            path,
            Some(changes),
            Some(return_representation()),
        ).await
    }

    /// DELETE the rows matched by `path`, returning how many were removed.
    pub async fn delete(&self, path: &str) -> Result<usize, DbError> {
        let removed: Vec<Value> = self.request_with_headers(
            Method::DELETE,
            path,
            None,
            Some(return_representation()),
        ).await?;

        Ok(removed.len())
    }

    /// Exact row count for `path` using `Prefer: count=exact`.
    pub async fn count(&self, path: &str) -> Result<u64, DbError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Counting rows at {}", url);

        let mut headers = self.get_headers()?;
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));

        let response = self.client.head(&url).headers(headers).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("PostgREST count error ({}): {}", status, error_text);
            return Err(DbError::from_response(status.as_u16(), &error_text));
        }

        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| DbError::Api {
                status: status.as_u16(),
                message: "missing Content-Range header".to_string(),
            })?;

        parse_content_range_total(range).ok_or_else(|| DbError::Api {
            status: status.as_u16(),
            message: format!("unparseable Content-Range: {}", range),
        })
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

/// `0-24/3573` -> 3573, `*/0` -> 0.
pub fn parse_content_range_total(range: &str) -> Option<u64> {
    range.rsplit_once('/').and_then(|(_, total)| total.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PostgrestClient {
        PostgrestClient::new(&AppConfig {
            postgrest_url: server.uri(),
            postgrest_api_key: "service-key".to_string(),
            jwt_secret: "secret".to_string(),
            token_ttl_hours: 24,
            bind_address: "127.0.0.1:0".to_string(),
        })
    }

    #[test]
    fn parses_content_range_totals() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-24/*"), None);
    }

    #[tokio::test]
    async fn insert_returns_first_row_and_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/doctors"))
            .and(header("apikey", "service-key"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": 5, "name": "Dr. Rao" }])))
            .mount(&server)
            .await;

        let row: Value = client_for(&server)
            .insert("doctors", json!({ "name": "Dr. Rao" }))
            .await
            .unwrap();
        assert_eq!(row["id"], 5);
    }

    #[tokio::test]
    async fn unique_violation_surfaces_as_typed_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/appointments"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"appointments_active_slot\"",
                "details": null,
                "hint": null
            })))
            .mount(&server)
            .await;

        let result: Result<Value, DbError> = client_for(&server)
            .insert("appointments", json!({ "doctor_id": 5 }))
            .await;
        assert_matches!(result, Err(DbError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn count_reads_content_range() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/patients"))
            .and(query_param("select", "id"))
            .respond_with(ResponseTemplate::new(200).insert_header("Content-Range", "0-9/42"))
            .mount(&server)
            .await;

        let total = client_for(&server).count("/patients?select=id").await.unwrap();
        assert_eq!(total, 42);
    }
}
