// PostgREST client
// Issues collection reads against `<base>/rest/v1/<table>`

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use super::error::BackendError;
use super::factory::ClientTier;
use super::query::Query;
use super::BackendClient;

pub(super) const REST_PREFIX: &str = "rest/v1";

/// Error payload returned by PostgREST
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

pub struct RestClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
    tier: ClientTier,
    api_key: String,
    bearer: String,
    client_info: String,
}

impl RestClient {
    pub(super) fn new(
        http: reqwest::Client,
        base_url: reqwest::Url,
        tier: ClientTier,
        api_key: String,
        bearer: String,
        client_info: String,
    ) -> Self {
        Self {
            http,
            base_url,
            tier,
            api_key,
            bearer,
            client_info,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/{REST_PREFIX}/{table}",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

// Keys stay out of logs
impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("tier", &self.tier)
            .field("client_info", &self.client_info)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BackendClient for RestClient {
    fn tier(&self) -> ClientTier {
        self.tier
    }

    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(&query.table);
        debug!(table = %query.table, tier = %self.tier, "backend select");

        let response = self
            .http
            .get(&url)
            .query(&query.to_query_pairs())
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.bearer))
            .header("Accept", "application/json")
            .header("X-Client-Info", &self.client_info)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(table = %query.table, %status, "backend query failed");
            return Err(error_from_body(status.as_u16(), &body));
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        if let Some(limit) = query.limit {
            if rows.len() > limit {
                return Err(BackendError::Ambiguous {
                    expected: limit,
                    actual: rows.len(),
                });
            }
        }

        Ok(rows)
    }
}

/// Turn a non-2xx body into a structured error, keeping raw text when the
/// body is not a PostgREST error object
fn error_from_body(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            code,
            details,
        }) => BackendError::Query {
            message,
            code,
            details: details.filter(|d| !d.is_empty()),
            status,
        },
        _ => BackendError::Query {
            message: if body.trim().is_empty() {
                format!("Backend returned HTTP {status}")
            } else {
                body.trim().to_string()
            },
            code: Some(status.to_string()),
            details: None,
            status,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::stub::{Reply, StubServer};
    use crate::backend::NO_ROWS_CODE;
    use hyper::StatusCode;
    use std::time::Duration;

    fn stub_client(server: &StubServer, timeout: Duration) -> RestClient {
        RestClient::new(
            reqwest::Client::builder().timeout(timeout).build().unwrap(),
            reqwest::Url::parse(&server.base_url()).unwrap(),
            ClientTier::Unprivileged,
            "anon-key".to_string(),
            "anon-key".to_string(),
            "crescents-landing/1.0".to_string(),
        )
    }

    fn active_query() -> Query {
        Query::new("landing_page_content")
            .eq("is_active", true)
            .order("updated_at", true)
            .limit(1)
    }

    #[tokio::test]
    async fn test_select_sends_postgrest_request() {
        let server = StubServer::start(Reply::json(
            StatusCode::OK,
            r#"[{"id":"row-1","content":{"heroTitle":"Hi"}}]"#,
        ))
        .await;
        let rows = stub_client(&server, Duration::from_secs(5))
            .select(&active_query())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "row-1");

        let seen = server.last();
        assert_eq!(seen.method, hyper::Method::GET);
        assert_eq!(seen.path, "/rest/v1/landing_page_content");
        assert_eq!(
            seen.query_pairs(),
            vec![
                ("select".to_string(), "*".to_string()),
                ("is_active".to_string(), "eq.true".to_string()),
                ("order".to_string(), "updated_at.desc".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(seen.header("apikey"), Some("anon-key"));
        assert_eq!(seen.header("authorization"), Some("Bearer anon-key"));
        assert_eq!(seen.header("accept"), Some("application/json"));
        assert_eq!(seen.header("x-client-info"), Some("crescents-landing/1.0"));
    }

    #[tokio::test]
    async fn test_error_status_maps_to_query_error() {
        let server = StubServer::start(Reply::json(
            StatusCode::BAD_REQUEST,
            r#"{"code":"42703","message":"column landing_page_content.nope does not exist","details":null,"hint":null}"#,
        ))
        .await;
        let err = stub_client(&server, Duration::from_secs(5))
            .select(&active_query())
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Query { status: 400, .. }));
        assert_eq!(err.code().as_deref(), Some("42703"));
        assert_eq!(err.http_status(), Some(400));
        assert_eq!(
            err.to_string(),
            "column landing_page_content.nope does not exist"
        );
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_decode_error() {
        let server = StubServer::start(Reply::json(StatusCode::OK, "<html>oops</html>")).await;
        let err = stub_client(&server, Duration::from_secs(5))
            .select(&active_query())
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Decode(_)));
        assert_eq!(err.code().as_deref(), Some("DECODE"));
    }

    #[tokio::test]
    async fn test_more_rows_than_limit_is_ambiguous() {
        let server = StubServer::start(Reply::json(
            StatusCode::OK,
            r#"[{"id":"a"},{"id":"b"}]"#,
        ))
        .await;
        let err = stub_client(&server, Duration::from_secs(5))
            .select(&active_query())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BackendError::Ambiguous {
                expected: 1,
                actual: 2
            }
        ));
        assert_eq!(err.code().as_deref(), Some("AMBIGUOUS"));
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let server = StubServer::start(
            Reply::json(StatusCode::OK, "[]").delayed(Duration::from_secs(5)),
        )
        .await;
        let err = stub_client(&server, Duration::from_millis(200))
            .select(&active_query())
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Transport(_)));
        assert_eq!(err.code().as_deref(), Some("TIMEOUT"));
    }

    fn client(base: &str) -> RestClient {
        RestClient::new(
            reqwest::Client::new(),
            reqwest::Url::parse(base).unwrap(),
            ClientTier::Privileged,
            "service-key".to_string(),
            "service-key".to_string(),
            "test/1.0".to_string(),
        )
    }

    #[test]
    fn test_table_url() {
        assert_eq!(
            client("https://abc.supabase.co").table_url("landing_page_content"),
            "https://abc.supabase.co/rest/v1/landing_page_content"
        );
        assert_eq!(
            client("https://abc.supabase.co/").table_url("t"),
            "https://abc.supabase.co/rest/v1/t"
        );
    }

    #[test]
    fn test_debug_redacts_keys() {
        let rendered = format!("{:?}", client("https://abc.supabase.co"));
        assert!(!rendered.contains("service-key"));
        assert!(rendered.contains("abc.supabase.co"));
    }

    #[test]
    fn test_error_from_postgrest_body() {
        let body = r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#;
        let err = error_from_body(406, body);
        assert!(err.is_no_rows());
        assert_eq!(err.code().as_deref(), Some(NO_ROWS_CODE));
        assert_eq!(
            err.to_string(),
            "JSON object requested, multiple (or no) rows returned"
        );
        assert_eq!(err.details(), Some("The result contains 0 rows"));
    }

    #[test]
    fn test_error_from_plain_body() {
        let err = error_from_body(502, "Bad Gateway");
        assert_eq!(err.to_string(), "Bad Gateway");
        assert_eq!(err.code().as_deref(), Some("502"));
        assert_eq!(err.details(), None);

        let err = error_from_body(503, "");
        assert_eq!(err.to_string(), "Backend returned HTTP 503");
    }
}
