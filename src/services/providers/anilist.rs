/// AniList GraphQL client
///
/// API Flow:
/// 1. Availability: HEAD {site}/ and HEAD {site}/user/{name}
/// 2. Watch lists: MediaListCollection by user name
/// 3. Recommendations: Media by id, first page of recommendations sorted by rating
///
/// AniList reports throttling inside the GraphQL envelope (`data: null`, first error
/// status 429), so the body is always decoded before the HTTP status is considered.
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{GraphQlResponse, MediaId, MediaList, MediaPage, MediaPageData, WatchListsData},
    services::providers::{queries, AnimeCatalog},
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::io::Write;
use std::time::Duration;

const PROGRESS_TICK: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct AniListClient {
    http_client: HttpClient,
    site_url: String,
    graphql_url: String,
    request_delay: Duration,
    rate_limit_wait: Duration,
    max_attempts: u32,
}

impl AniListClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: HttpClient::new(),
            site_url: config.site_url.trim_end_matches('/').to_string(),
            graphql_url: config.graphql_url.clone(),
            request_delay: config.request_delay(),
            rate_limit_wait: config.rate_limit_wait(),
            max_attempts: config.rate_limit_max_attempts.max(1),
        }
    }

    /// POSTs a GraphQL query and decodes the envelope
    async fn post_query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> AppResult<GraphQlResponse<T>> {
        let response = self
            .http_client
            .post(&self.graphql_url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        tracing::debug!(status = %status, response = %response_text, "Raw AniList response");

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                status = %status,
                response = %response_text,
                "Failed to deserialize AniList response"
            );
            AppError::ExternalApi(format!(
                "Failed to parse AniList response (status {}): {}",
                status, e
            ))
        })
    }

    async fn head_is_ok(&self, url: &str) -> AppResult<bool> {
        let response = self.http_client.head(url).send().await?;
        tracing::debug!(url = %url, status = %response.status(), "HEAD check");
        Ok(response.status() == StatusCode::OK)
    }
}

/// Wait before the attempt following `attempt`: base, 2x base, 4x base, ...
pub(crate) fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Unwraps `data` from an envelope that is not rate limited
fn into_data<T>(response: GraphQlResponse<T>) -> AppResult<T> {
    if let Some(data) = response.data {
        return Ok(data);
    }
    Err(AppError::ExternalApi(format!(
        "AniList returned no data: {}",
        response.error_summary()
    )))
}

/// Sleeps for `delay`, printing a dot every few seconds so the user sees progress
async fn wait_with_progress(delay: Duration) {
    println!("hit the rate limit, waiting");
    let mut remaining = delay;
    while !remaining.is_zero() {
        let step = remaining.min(PROGRESS_TICK);
        tokio::time::sleep(step).await;
        remaining -= step;
        print!(".");
        if let Err(e) = std::io::stdout().flush() {
            tracing::debug!(error = %e, "Failed to flush progress output");
        }
    }
    println!();
}

#[async_trait::async_trait]
impl AnimeCatalog for AniListClient {
    async fn service_available(&self) -> AppResult<bool> {
        match self.head_is_ok(&self.site_url).await {
            Err(AppError::HttpClient(e)) => {
                tracing::warn!(error = %e, url = %self.site_url, "AniList root unreachable");
                Ok(false)
            }
            result => result,
        }
    }

    async fn user_exists(&self, username: &str) -> AppResult<bool> {
        let url = format!("{}/user/{}", self.site_url, username);
        self.head_is_ok(&url).await
    }

    async fn fetch_watch_lists(&self, username: &str) -> AppResult<Vec<MediaList>> {
        let response: GraphQlResponse<WatchListsData> = self
            .post_query(queries::WATCH_LISTS, json!({ "username": username }))
            .await?;

        if response.is_rate_limited() {
            tracing::warn!(username = %username, "Rate limited while fetching watch lists");
            return Err(AppError::RateLimited { attempts: 1 });
        }

        let lists = into_data(response)?.media_list_collection.lists;

        tracing::info!(
            username = %username,
            lists = lists.len(),
            entries = lists.iter().map(|l| l.entries.len()).sum::<usize>(),
            provider = "anilist",
            "Watch lists fetched"
        );

        Ok(lists)
    }

    async fn fetch_recommendations(&self, media_id: MediaId) -> AppResult<MediaPage> {
        let mut attempt = 1;
        loop {
            tokio::time::sleep(self.request_delay).await;

            let response: GraphQlResponse<MediaPageData> = self
                .post_query(queries::MEDIA_RECOMMENDATIONS, json!({ "id": media_id }))
                .await?;

            if !response.is_rate_limited() {
                let page = into_data(response)?.media;
                tracing::debug!(
                    media_id = %media_id,
                    recommendations = page.recommendations.nodes.len(),
                    attempt,
                    provider = "anilist",
                    "Recommendations fetched"
                );
                return Ok(page);
            }

            if attempt >= self.max_attempts {
                tracing::error!(
                    media_id = %media_id,
                    attempts = attempt,
                    "Giving up after repeated rate limiting"
                );
                return Err(AppError::RateLimited { attempts: attempt });
            }

            let delay = backoff_delay(self.rate_limit_wait, attempt);
            tracing::warn!(
                media_id = %media_id,
                attempt,
                wait_secs = delay.as_secs(),
                "Rate limited, backing off"
            );
            wait_with_progress(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const THROTTLED: &str = r#"{"data":null,"errors":[{"message":"Too Many Requests.","status":429}]}"#;

    /// Reads one request, headers plus a Content-Length body
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let body_len = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return;
                }
            }
        }
    }

    /// Local HTTP server answering every request with the same response
    ///
    /// Connections are closed after each response, so the hit counter equals the
    /// number of requests made.
    async fn serve(status: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}", addr), hits)
    }

    fn client_for(url: &str) -> AniListClient {
        let config = Config {
            site_url: url.to_string(),
            graphql_url: url.to_string(),
            request_delay_ms: 0,
            rate_limit_wait_secs: 0,
            rate_limit_max_attempts: 3,
            ..Config::default()
        };
        AniListClient::new(&config)
    }

    fn create_test_client() -> AniListClient {
        let config = Config {
            site_url: "http://test.local/".to_string(),
            rate_limit_max_attempts: 0,
            ..Config::default()
        };
        AniListClient::new(&config)
    }

    #[test]
    fn test_new_normalizes_config() {
        let client = create_test_client();
        assert_eq!(client.site_url, "http://test.local");
        assert_eq!(client.max_attempts, 1);
        assert_eq!(client.request_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_backoff_doubles_each_attempt() {
        let base = Duration::from_secs(65);
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(65));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(130));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(260));
    }

    #[test]
    fn test_backoff_saturates() {
        let delay = backoff_delay(Duration::from_secs(65), 64);
        assert_eq!(delay, Duration::from_secs(65).saturating_mul(u32::MAX));
    }

    #[test]
    fn test_into_data_success() {
        let response: GraphQlResponse<WatchListsData> = serde_json::from_value(json!({
            "data": { "MediaListCollection": { "lists": [] } }
        }))
        .unwrap();
        let data = into_data(response).unwrap();
        assert!(data.media_list_collection.lists.is_empty());
    }

    #[test]
    fn test_into_data_reports_errors() {
        let response: GraphQlResponse<WatchListsData> = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "Internal Server Error", "status": 500 }]
        }))
        .unwrap();
        let err = into_data(response).unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
        assert!(err.to_string().contains("Internal Server Error (500)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_with_progress_sleeps_full_delay() {
        let start = tokio::time::Instant::now();
        wait_with_progress(Duration::from_secs(7)).await;
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_recommendations_give_up_after_max_attempts() {
        let (url, hits) = serve("429 Too Many Requests", THROTTLED).await;
        let client = client_for(&url);

        let err = client.fetch_recommendations(MediaId(1)).await.unwrap_err();

        assert!(matches!(err, AppError::RateLimited { attempts: 3 }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_throttled_watch_lists_are_not_retried() {
        let (url, hits) = serve("429 Too Many Requests", THROTTLED).await;
        let client = client_for(&url);

        let err = client.fetch_watch_lists("tester").await.unwrap_err();

        assert!(matches!(err, AppError::RateLimited { attempts: 1 }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recommendations_decoded_from_data() {
        let body = r#"{"data":{"Media":{"id":1,"title":{"english":"Cowboy Bebop","romaji":"Cowboy Bebop"},"recommendations":{"nodes":[{"mediaRecommendation":{"id":205,"title":{"english":null,"romaji":"Samurai Champloo"},"meanScore":85}}]}}}}"#;
        let (url, hits) = serve("200 OK", body).await;
        let client = client_for(&url);

        let page = client.fetch_recommendations(MediaId(1)).await.unwrap();

        assert_eq!(page.id, MediaId(1));
        let rec = page.recommendations.nodes[0].media_recommendation.as_ref().unwrap();
        assert_eq!(rec.id, MediaId(205));
        assert_eq!(rec.title.display_name(), Some("Samurai Champloo"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_watch_lists_decoded_from_data() {
        let body = r#"{"data":{"MediaListCollection":{"lists":[{"status":"COMPLETED","entries":[{"media":{"meanScore":80},"score":90,"mediaId":7}]}]}}}"#;
        let (url, _hits) = serve("200 OK", body).await;
        let client = client_for(&url);

        let lists = client.fetch_watch_lists("tester").await.unwrap();

        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].entries[0].media_id, MediaId(7));
    }

    #[tokio::test]
    async fn test_non_json_body_is_external_api_error() {
        let (url, _hits) = serve("502 Bad Gateway", "<html>bad gateway</html>").await;
        let client = client_for(&url);

        let err = client.fetch_recommendations(MediaId(1)).await.unwrap_err();

        assert!(matches!(err, AppError::ExternalApi(_)));
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_head_checks_follow_status() {
        let (up, _) = serve("200 OK", "").await;
        assert!(client_for(&up).service_available().await.unwrap());
        assert!(client_for(&up).user_exists("tester").await.unwrap());

        let (missing, _) = serve("404 Not Found", "").await;
        assert!(!client_for(&missing).user_exists("nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_root_is_not_available() {
        let client = client_for("http://127.0.0.1:1");
        assert!(!client.service_available().await.unwrap());
    }
}
