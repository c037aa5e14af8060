use std::future::Future;

use rand::{Rng, distr::Alphanumeric};

use crate::{
    types::{Page, TrackItem, TrackRow},
    warning,
};

/// Page size requested from paged endpoints (the Spotify maximum).
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Page cap applied by the route handlers.
pub const MAX_PAGES: usize = 200;

/// Collects a complete result set from a limit/offset paged endpoint.
///
/// The fetch operation is called with a fixed page size and a monotonically
/// increasing offset (`0, limit, 2 * limit, ...`). Items are appended in the
/// order they arrive. An empty page is the only end-of-list signal; short
/// pages do not stop iteration.
///
/// Extra request parameters (for example a playlist id) are captured by the
/// `fetch` closure.
///
/// # Example
///
/// ```
/// let paginator = Paginator::default().with_max_pages(MAX_PAGES);
/// let items = paginator
///     .collect_all(|limit, offset| client.playlist_items(playlist_id, limit, offset))
///     .await?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    limit: u32,
    max_pages: Option<usize>,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            max_pages: None,
        }
    }
}

impl Paginator {
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            max_pages: None,
        }
    }

    /// Stops after `max_pages` fetches even if no empty page was seen.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub async fn collect_all<T, E, F, Fut>(&self, mut fetch: F) -> Result<Vec<T>, E>
    where
        F: FnMut(u32, u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, E>>,
    {
        let mut items = Vec::new();
        let mut offset = 0u32;
        let mut pages = 0usize;

        loop {
            if let Some(max) = self.max_pages {
                if pages >= max {
                    warning!(
                        "Stopped paging after {} pages ({} items); results may be incomplete.",
                        pages,
                        items.len()
                    );
                    break;
                }
            }

            let page = fetch(self.limit, offset).await?;
            pages += 1;

            if !page.has_more() {
                break;
            }

            items.extend(page.items);
            offset = offset.saturating_add(self.limit);
        }

        Ok(items)
    }
}

/// Collects all items with the default page size and no page cap.
pub async fn collect_all<T, E, F, Fut>(fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    Paginator::default().collect_all(fetch).await
}

pub fn generate_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

/// Turns saved-track or playlist entries into display rows, skipping empty entries.
pub fn track_rows(items: Vec<TrackItem>) -> Vec<TrackRow> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .map(TrackRow::from)
        .collect()
}

pub fn join_artist_names(names: &[String]) -> String {
    names.join(", ")
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
