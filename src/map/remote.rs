//! Server side of the floor plan.
//!
//! This module provides:
//! - `MapRemote` trait for abstracting where placements are persisted
//! - `HttpMapClient` talking to the phonebook server's `/map` endpoints
//! - the JSON reply shared by both endpoints

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::map::{PersonId, Point};

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Reply of both map endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Сервер вернул HTML вместо JSON. Status: {status}")]
    NonJson { status: u16 },
    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server answered with status {status}")]
    Status { status: u16 },
    #[error("invalid server address `{0}`")]
    BaseUrl(String),
}

/// Trait for placement storage implementations
#[allow(async_fn_in_trait)]
pub trait MapRemote {
    /// Store `point` as the position of `person`
    async fn save_coordinates(&self, person: &PersonId, point: Point) -> Result<ApiResponse, MapError>;

    /// Take `person` off the map
    async fn remove_placement(&self, person: &PersonId) -> Result<ApiResponse, MapError>;
}

#[derive(Debug, Serialize)]
struct CoordinatesBody {
    coordinates: String,
}

pub struct HttpMapClient {
    client: reqwest::Client,
    base_url: Url,
    csrf_token: String,
}

impl HttpMapClient {
    /// `csrf_token` is sent as-is, even when empty.
    pub fn new(base_url: &str, csrf_token: String, timeout: Duration) -> Result<Self, MapError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| MapError::BaseUrl(base_url.to_string()))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            csrf_token,
        })
    }

    /// `<base>/map/<action>/<person>`, with the id escaped as one path segment.
    fn endpoint(&self, action: &str, person: &PersonId) -> Result<Url, MapError> {
        let person = person.to_string();
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MapError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["map", action, person.as_str()]);
        Ok(url)
    }

    async fn post(&self, url: Url, body: Option<CoordinatesBody>) -> Result<ApiResponse, MapError> {
        debug!("POST {}", url);

        let mut request = self
            .client
            .post(url.clone())
            .header(CSRF_HEADER, self.csrf_token.as_str());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));

        if !is_json {
            let text = response.text().await.unwrap_or_default();
            let preview: String = text.chars().take(200).collect();
            debug!("non-JSON response from {}: {}", url, preview);
            return Err(MapError::NonJson {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let reply: ApiResponse = serde_json::from_slice(&bytes)?;
        debug!("{} -> {} {:?}", url, status, reply);

        // A rejection carries its own message; only an error status that
        // claims success is reported as a bare status failure.
        if !status.is_success() && reply.success {
            return Err(MapError::Status {
                status: status.as_u16(),
            });
        }
        Ok(reply)
    }
}

impl MapRemote for HttpMapClient {
    async fn save_coordinates(&self, person: &PersonId, point: Point) -> Result<ApiResponse, MapError> {
        let body = CoordinatesBody {
            coordinates: point.to_string(),
        };
        let url = self.endpoint("update_coordinates", person)?;
        self.post(url, Some(body)).await
    }

    async fn remove_placement(&self, person: &PersonId) -> Result<ApiResponse, MapError> {
        let url = self.endpoint("remove", person)?;
        self.post(url, None).await
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::thread;

    use tiny_http::{Header, Method, Response, Server, StatusCode};

    use super::*;

    #[derive(Debug)]
    struct Seen {
        is_post: bool,
        url: String,
        csrf: Option<String>,
        body: String,
    }

    /// Serve exactly one request with the given reply, returning what was
    /// received once the test joins the handle.
    fn serve_once(
        status: u16,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<Seen>) {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let base = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            let mut req = server.recv().expect("request");
            let csrf = req
                .headers()
                .iter()
                .find(|h| h.field.equiv(CSRF_HEADER))
                .map(|h| h.value.as_str().to_string());
            let mut received = String::new();
            req.as_reader().read_to_string(&mut received).expect("body");
            let seen = Seen {
                is_post: *req.method() == Method::Post,
                url: req.url().to_string(),
                csrf,
                body: received,
            };
            let response = Response::from_data(body.as_bytes().to_vec())
                .with_status_code(StatusCode(status))
                .with_header(
                    Header::from_bytes("Content-Type", content_type.as_bytes()).expect("content type"),
                );
            req.respond(response).expect("respond");
            seen
        });
        (base, handle)
    }

    fn client(base: &str, token: &str) -> HttpMapClient {
        HttpMapClient::new(base, token.to_string(), Duration::from_secs(5)).expect("client")
    }

    fn id(s: &str) -> PersonId {
        PersonId::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_save_posts_coordinates_with_csrf_header() {
        let (base, handle) = serve_once(200, "application/json", r#"{"success": true, "message": "ok"}"#);
        let reply = client(&base, "tok-1")
            .save_coordinates(&id("42"), Point::new(100.0, 50.0))
            .await
            .expect("save");
        assert!(reply.success);
        assert_eq!(reply.message.as_deref(), Some("ok"));

        let seen = handle.join().unwrap();
        assert!(seen.is_post);
        assert_eq!(seen.url, "/map/update_coordinates/42");
        assert_eq!(seen.csrf.as_deref(), Some("tok-1"));
        let body: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
        assert_eq!(body, serde_json::json!({"coordinates": "100,50"}));
    }

    #[tokio::test]
    async fn test_remove_posts_without_body() {
        let (base, handle) = serve_once(200, "application/json; charset=utf-8", r#"{"success": true}"#);
        let reply = client(&base, "")
            .remove_placement(&id("7"))
            .await
            .expect("remove");
        assert!(reply.success);
        assert_eq!(reply.message, None);

        let seen = handle.join().unwrap();
        assert_eq!(seen.url, "/map/remove/7");
        assert_eq!(seen.csrf.as_deref(), Some(""));
        assert!(seen.body.is_empty());
    }

    #[tokio::test]
    async fn test_person_id_is_escaped_as_one_path_segment() {
        let (base, handle) = serve_once(200, "application/json", r#"{"success": true}"#);
        client(&format!("{}/", base), "")
            .remove_placement(&id("4?x=1#y"))
            .await
            .expect("remove");
        let seen = handle.join().unwrap();
        assert_eq!(seen.url, "/map/remove/4%3Fx=1%23y");
    }

    #[test]
    fn test_base_url_with_prefix() {
        let client = client("http://phonebook.local/intranet/", "");
        let url = client.endpoint("update_coordinates", &id("42 a")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://phonebook.local/intranet/map/update_coordinates/42%20a"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpMapClient::new("not a url", String::new(), Duration::from_secs(1))
            .err()
            .expect("rejected");
        assert!(matches!(err, MapError::BaseUrl(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_html_reply_is_a_failure() {
        let (base, handle) = serve_once(200, "text/html", "<html>login</html>");
        let err = client(&base, "")
            .remove_placement(&id("7"))
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::NonJson { status: 200 }), "{err:?}");
        assert_eq!(err.to_string(), "Сервер вернул HTML вместо JSON. Status: 200");
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_rejection_with_error_status_keeps_message() {
        let (base, handle) = serve_once(
            400,
            "application/json",
            r#"{"success": false, "message": "Не указаны координаты"}"#,
        );
        let reply = client(&base, "")
            .save_coordinates(&id("1"), Point::new(1.0, 2.0))
            .await
            .expect("reply");
        assert!(!reply.success);
        assert_eq!(reply.message.as_deref(), Some("Не указаны координаты"));
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_error_status_claiming_success_is_a_failure() {
        let (base, handle) = serve_once(500, "application/json", r#"{"success": true}"#);
        let err = client(&base, "")
            .remove_placement(&id("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::Status { status: 500 }), "{err:?}");
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_decode_error() {
        let (base, handle) = serve_once(200, "application/json", "{not json");
        let err = client(&base, "")
            .remove_placement(&id("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::Decode(_)), "{err:?}");
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        let err = client("http://127.0.0.1:9", "")
            .remove_placement(&id("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::Transport(_)), "{err:?}");
    }
}
