//! HTTP CRUD Client - The backend is an opaque JSON service.
//!
//! Thin wrapper over `/api/projects` and `/api/posts`. Non-2xx responses
//! become errors carrying the response body text (or the status line when
//! the body is empty) - the same message the admin panel shows inline.
//!
//! Requests run on background threads and deliver through a channel; a
//! [`CancelToken`] provides structured cooperative cancellation: the
//! in-flight network cost is not recovered, but a canceled token
//! guarantees the result is never applied (late responses after unmount
//! or supersession are discarded, not leaked into dead state).

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::content::{Post, Project};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; the message is the body text or status line.
    #[error("{0}")]
    Status(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("invalid base URL: {0}")]
    InvalidBase(#[from] url::ParseError),
}

/// Message for a failed response: body text, or `"{status} {reason}"`.
fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string()
    } else {
        body.to_string()
    }
}

fn into_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ApiError::Status(status_message(status, &body)));
    }
    Ok(response.json()?)
}

fn into_unit(response: Response) -> Result<(), ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ApiError::Status(status_message(status, &body)));
    }
    Ok(())
}

// =============================================================================
// CLIENT
// =============================================================================

/// Blocking JSON client for the portfolio backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// `base` is the absolute API root, e.g. `http://localhost:8080/api`.
    pub fn new(base: &str) -> Result<Self, ApiError> {
        Ok(Self {
            http: Client::new(),
            base: Url::parse(base)?,
        })
    }

    /// Join path segments onto the base, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let url = self.endpoint(&["projects"]);
        debug!(%url, "GET projects");
        into_json(self.http.get(url).send()?)
    }

    pub fn get_project(&self, id_or_slug: &str) -> Result<Project, ApiError> {
        into_json(self.http.get(self.endpoint(&["projects", id_or_slug])).send()?)
    }

    pub fn create_project(&self, payload: &Project) -> Result<Project, ApiError> {
        into_json(
            self.http
                .post(self.endpoint(&["projects"]))
                .json(payload)
                .send()?,
        )
    }

    pub fn update_project(&self, id: i64, payload: &Project) -> Result<Project, ApiError> {
        into_json(
            self.http
                .put(self.endpoint(&["projects", &id.to_string()]))
                .json(payload)
                .send()?,
        )
    }

    pub fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        into_unit(
            self.http
                .delete(self.endpoint(&["projects", &id.to_string()]))
                .send()?,
        )
    }

    // =========================================================================
    // Posts
    // =========================================================================

    pub fn list_posts(&self, limit: u32, offset: u32) -> Result<Vec<Post>, ApiError> {
        let mut url = self.endpoint(&["posts"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        debug!(%url, "GET posts");
        into_json(self.http.get(url).send()?)
    }

    pub fn get_post(&self, slug: &str) -> Result<Post, ApiError> {
        into_json(self.http.get(self.endpoint(&["posts", slug])).send()?)
    }

    pub fn create_post(&self, payload: &Post) -> Result<Post, ApiError> {
        into_json(
            self.http
                .post(self.endpoint(&["posts"]))
                .json(payload)
                .send()?,
        )
    }

    pub fn update_post(&self, id: i64, payload: &Post) -> Result<Post, ApiError> {
        into_json(
            self.http
                .put(self.endpoint(&["posts", &id.to_string()]))
                .json(payload)
                .send()?,
        )
    }

    pub fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        into_unit(
            self.http
                .delete(self.endpoint(&["posts", &id.to_string()]))
                .send()?,
        )
    }
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Structured cooperative cancellation for one fetch.
///
/// Canceling does not abort the network request; it guarantees the
/// result is never applied.
#[derive(Clone, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

/// A fetch running on a background thread.
pub struct FetchHandle<T> {
    receiver: Receiver<Result<T, ApiError>>,
    token: CancelToken,
}

impl<T> FetchHandle<T> {
    /// Poll for a result. Returns `None` while still in flight, and also
    /// `None` (discarding any delivered result) once the token is
    /// canceled - a late response never reaches the caller.
    pub fn poll(&self) -> Option<Result<T, ApiError>> {
        if self.token.is_canceled() {
            // Drain so the channel buffer does not hold the payload.
            let _ = self.receiver.try_recv();
            return None;
        }
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }
}

/// Run `fetch` on a background thread, tied to `token`.
pub fn spawn_fetch<T, F>(token: CancelToken, fetch: F) -> FetchHandle<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    let (sender, receiver) = channel();
    thread::spawn(move || {
        let result = fetch();
        // Receiver may be gone already; that is fine.
        let _ = sender.send(result);
    });
    FetchHandle { receiver, token }
}

// =============================================================================
// TESTS
// =============================================================================
