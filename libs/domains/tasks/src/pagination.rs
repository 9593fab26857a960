//! Keyset pagination for `ListTasks`.
//!
//! Tasks are listed newest first, ordered by `(created_at DESC, id DESC)`.
//! A page token is the URL-safe base64 (no padding) encoding of a small JSON
//! object naming the last task of the previous page; the next page starts
//! strictly after it. Tokens are opaque to clients.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use grpc_client::conversions::truncate_to_micros;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{ListTasks, Task};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Position of the last task on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub created_at: DateTime<Utc>,
    pub id: String,
}

impl PageCursor {
    pub fn after(task: &Task) -> Self {
        Self {
            created_at: task.created_at,
            id: task.id.clone(),
        }
    }

    pub fn encode(&self) -> String {
        let json = serde_json::json!({
            "created_at": self.created_at,
            "id": self.id,
        });
        URL_SAFE_NO_PAD.encode(json.to_string())
    }

    pub fn decode(token: &str) -> Result<Self, ValidationError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| ValidationError::InvalidPageToken)?;
        let cursor: Self =
            serde_json::from_slice(&bytes).map_err(|_| ValidationError::InvalidPageToken)?;

        // Stored timestamps carry microseconds; finer precision would let stores disagree
        Ok(Self {
            created_at: truncate_to_micros(cursor.created_at),
            ..cursor
        })
    }
}

/// A normalized list request handed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub after: Option<PageCursor>,
}

impl PageRequest {
    pub fn first(limit: u64) -> Self {
        Self { limit, after: None }
    }
}

impl TryFrom<ListTasks> for PageRequest {
    type Error = ValidationError;

    fn try_from(list: ListTasks) -> Result<Self, Self::Error> {
        let after = list
            .page_token
            .as_deref()
            .map(PageCursor::decode)
            .transpose()?;

        Ok(Self {
            limit: normalize_page_size(list.page_size),
            after,
        })
    }
}

/// A page of tasks plus the cursor for the next one, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub next: Option<PageCursor>,
}

impl TaskPage {
    /// Build a page from up to `limit + 1` rows already in list order.
    ///
    /// The extra row only signals that another page exists; it is dropped.
    pub fn from_rows(mut rows: Vec<Task>, limit: u64) -> Self {
        let limit = limit as usize;
        let has_more = rows.len() > limit;
        rows.truncate(limit);

        let next = if has_more {
            rows.last().map(PageCursor::after)
        } else {
            None
        };

        Self { tasks: rows, next }
    }

    pub fn next_page_token(&self) -> Option<String> {
        self.next.as_ref().map(PageCursor::encode)
    }
}

/// Requested sizes outside `1..=100` fall back to 10.
pub fn normalize_page_size(page_size: i32) -> u64 {
    match u64::try_from(page_size) {
        Ok(size) if (1..=MAX_PAGE_SIZE).contains(&size) => size,
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Strict `(created_at, id)` ordering key used by every store.
pub fn sort_key(task: &Task) -> (DateTime<Utc>, &str) {
    (task.created_at, task.id.as_str())
}
