//! Integration tests for the ALL IN site.
//!
//! # Running Tests
//!
//! ```bash
//! # Hermetic suite: spawns the site in-process in demo mode
//! cargo test -p allin-integration-tests
//!
//! # Live smoke tests against a running server (SITE_BASE_URL)
//! cargo test -p allin-integration-tests -- --ignored
//! ```
//!
//! The hermetic tests need no credentials and no network: each test spawns
//! its own server on an ephemeral port, backed by the in-memory demo store,
//! demo media storage, and demo auth. The live tests in `live_site.rs` hit
//! whatever server `SITE_BASE_URL` points at and stay `#[ignore]`d by
//! default.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use allin_site::config::SiteConfig;
use allin_site::routes;
use allin_site::state::AppState;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::{Client, Response, StatusCode, redirect};
use secrecy::SecretString;
use serde_json::Value;

/// How long to wait for the catalog pumps to deliver their first snapshot.
const READY_TIMEOUT: Duration = Duration::from_secs(10);

/// How long to wait for a single event on an open snapshot stream.
const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(10);

/// A site instance spawned in-process for one test.
///
/// The server runs in demo mode on an ephemeral port and lives until the
/// test's runtime shuts down. The bundled client keeps cookies (so a
/// signed-in session persists across requests) and does not follow
/// redirects, letting tests assert on `Location` headers directly.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Spawn a demo-mode site on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the server or the HTTP client cannot be started; tests
    /// cannot proceed without either.
    pub async fn spawn() -> Self {
        let state = AppState::new(demo_config()).expect("Failed to initialize application state");
        let app = routes::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read listener address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute URL for a path on this instance.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET` a path.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// `POST` a URL-encoded form to a path.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Sign in through the login form; demo auth accepts any password.
    ///
    /// # Panics
    ///
    /// Panics if the sign-in does not redirect to the home page.
    pub async fn sign_in(&self, email: &str) {
        let response = self
            .post_form("/login", &[("email", email), ("password", "anything")])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    /// Block until both catalog collections have delivered a snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the server does not become ready within [`READY_TIMEOUT`].
    pub async fn wait_ready(&self) {
        let deadline = tokio::time::Instant::now() + READY_TIMEOUT;
        loop {
            if self.get("/health/ready").await.status() == StatusCode::OK {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "server did not become ready within {READY_TIMEOUT:?}"
            );
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Open the snapshot stream for a collection (`products` or `services`).
    ///
    /// # Panics
    ///
    /// Panics if the stream cannot be opened.
    pub async fn open_events(&self, collection: &str) -> EventReader {
        let response = self.get(&format!("/events/{collection}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        EventReader::new(response)
    }
}

/// The `Location` header of a redirect response.
///
/// # Panics
///
/// Panics if the header is missing or not UTF-8.
#[must_use]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .expect("Location header is not UTF-8")
}

/// Reads `snapshot` events off an open SSE response.
pub struct EventReader {
    stream: BoxStream<'static, reqwest::Result<Bytes>>,
    buffer: Vec<u8>,
}

impl EventReader {
    fn new(response: Response) -> Self {
        Self {
            stream: response.bytes_stream().boxed(),
            buffer: Vec::new(),
        }
    }

    /// Wait for the next `snapshot` event and return its JSON payload.
    ///
    /// Keep-alive comments and unrelated frames are skipped.
    ///
    /// # Panics
    ///
    /// Panics if the stream ends, errors, or stays silent past
    /// [`SNAPSHOT_TIMEOUT`].
    pub async fn next_snapshot(&mut self) -> Vec<Value> {
        tokio::time::timeout(SNAPSHOT_TIMEOUT, self.read_snapshot())
            .await
            .expect("timed out waiting for a snapshot event")
    }

    async fn read_snapshot(&mut self) -> Vec<Value> {
        loop {
            // Frames end on a blank line; the byte search is UTF-8-safe
            // even when a chunk boundary splits a multi-byte glyph.
            while let Some(end) = find_frame_end(&self.buffer) {
                let frame: Vec<u8> = self.buffer.drain(..end + 2).collect();
                let frame = String::from_utf8_lossy(&frame);
                if let Some(payload) = snapshot_payload(&frame) {
                    return payload;
                }
            }

            let chunk = self
                .stream
                .next()
                .await
                .expect("event stream ended before a snapshot arrived")
                .expect("event stream failed");
            self.buffer.extend_from_slice(&chunk);
        }
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|pair| pair == b"\n\n")
}

/// Parse one SSE frame; `Some` only for `snapshot` events.
fn snapshot_payload(frame: &str) -> Option<Vec<Value>> {
    let mut is_snapshot = false;
    let mut data = None;

    for line in frame.lines() {
        if let Some(name) = line.strip_prefix("event: ") {
            is_snapshot = name.trim() == "snapshot";
        } else if let Some(payload) = line.strip_prefix("data: ") {
            data = Some(payload.to_owned());
        }
    }

    if !is_snapshot {
        return None;
    }
    let data = data.expect("snapshot event carried no data");
    Some(serde_json::from_str(&data).expect("snapshot payload is not a JSON array"))
}

/// Demo-mode configuration for an in-process instance.
///
/// Port 0 is never bound; tests bind their own ephemeral listener.
fn demo_config() -> SiteConfig {
    SiteConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:0".to_string(),
        session_secret: SecretString::from("integration-test-session-secret-7f3d9b1c4e"),
        store: None,
        storage: None,
        auth: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
