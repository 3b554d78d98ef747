//! Cursor- and page-based pagination.
//!
//! Both strategies produce a lazy, forward-only stream of items. Each page is
//! fetched through [`Client::call`], so retries and error normalization apply
//! per page. The first error ends the stream; items already yielded stay yielded.
//! A stream is single-pass: iterating again means building a new one.

use crate::{metadata::RequestMetadata, Client, Result};
use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Query parameter carrying the continuation token.
pub const CURSOR_PARAM: &str = "cursor";
/// Query parameter carrying the 1-based page number.
pub const PAGE_PARAM: &str = "page";
/// Query parameter carrying the page size.
pub const PER_PAGE_PARAM: &str = "perPage";

/// One page of a cursor-paginated listing.
///
/// Wire shape: `{"items": [...], "nextCursor": "..." | null, "hasMore": bool}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    /// Items in server order.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Token for the next page.
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Whether the server reports more pages.
    #[serde(default)]
    pub has_more: bool,
}

impl<T> CursorPage<T> {
    /// The cursor to request next, or `None` when iteration is over.
    ///
    /// Iteration stops when `has_more` is false or the cursor is absent or empty.
    pub fn continuation(&self) -> Option<&str> {
        match self.next_cursor.as_deref() {
            Some(cursor) if self.has_more && !cursor.is_empty() => Some(cursor),
            _ => None,
        }
    }
}

/// One page of a page-number-paginated listing.
///
/// Wire shape: `{"items": [...], "page": n, "perPage": n, "totalPages": n, "totalItems": n}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    /// Items in server order.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// 1-based page number.
    #[serde(default)]
    pub page: u32,
    /// Page size.
    #[serde(default)]
    pub per_page: u32,
    /// Number of pages as of this response.
    pub total_pages: u32,
    /// Number of items as of this response.
    #[serde(default)]
    pub total_items: u64,
}

/// Options for page-number pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageParams {
    /// Sent as `perPage` when set; otherwise the server default applies.
    pub per_page: Option<u32>,
}

impl PageParams {
    /// Requests pages of `per_page` items.
    pub fn per_page(per_page: u32) -> Self {
        Self {
            per_page: Some(per_page),
        }
    }
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

struct CursorState {
    client: Client,
    metadata: RequestMetadata,
    cursor: Cursor,
}

/// Streams the items of a cursor-paginated listing.
pub(crate) fn cursor_stream<T>(
    client: Client,
    metadata: RequestMetadata,
) -> BoxStream<'static, Result<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let init = CursorState {
        client,
        metadata,
        cursor: Cursor::Start,
    };

    stream::try_unfold(init, next_cursor_page::<T>)
        .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
        .try_flatten()
        .boxed()
}

async fn next_cursor_page<T>(mut state: CursorState) -> Result<Option<(Vec<T>, CursorState)>>
where
    T: DeserializeOwned,
{
    let mut request = state.metadata.clone();
    match &state.cursor {
        Cursor::Done => return Ok(None),
        Cursor::Next(cursor) => request.set_query_param(CURSOR_PARAM, cursor.as_str()),
        Cursor::Start => {}
    }

    let page = state
        .client
        .call::<(), CursorPage<T>>(request, None)
        .await?
        .into_data();

    let Some(page) = page else {
        state.cursor = Cursor::Done;
        return Ok(Some((Vec::new(), state)));
    };

    state.cursor = match page.continuation() {
        Some(next) => Cursor::Next(next.to_string()),
        None => Cursor::Done,
    };
    Ok(Some((page.items, state)))
}

struct PageState {
    client: Client,
    metadata: RequestMetadata,
    params: PageParams,
    next: Option<u32>,
}

/// Streams the items of a page-number-paginated listing.
///
/// `totalPages` is re-read from every response, so a shrinking total ends
/// iteration early.
pub(crate) fn page_stream<T>(
    client: Client,
    metadata: RequestMetadata,
    params: PageParams,
) -> BoxStream<'static, Result<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let init = PageState {
        client,
        metadata,
        params,
        next: Some(1),
    };

    stream::try_unfold(init, next_page::<T>)
        .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
        .try_flatten()
        .boxed()
}

async fn next_page<T>(mut state: PageState) -> Result<Option<(Vec<T>, PageState)>>
where
    T: DeserializeOwned,
{
    let Some(page) = state.next else {
        return Ok(None);
    };

    let mut request = state.metadata.clone();
    request.set_query_param(PAGE_PARAM, page.to_string());
    if let Some(per_page) = state.params.per_page {
        request.set_query_param(PER_PAGE_PARAM, per_page.to_string());
    }

    let result = state
        .client
        .call::<(), PagedResult<T>>(request, None)
        .await?
        .into_data();

    let Some(result) = result else {
        state.next = None;
        return Ok(Some((Vec::new(), state)));
    };

    state.next = following_page(page, result.total_pages);
    Ok(Some((result.items, state)))
}

/// The page after `page`, or `None` once `total_pages` is reached.
fn following_page(page: u32, total_pages: u32) -> Option<u32> {
    page.checked_add(1).filter(|next| *next <= total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_page_from_wire() {
        let page: CursorPage<String> =
            serde_json::from_str(r#"{"items":["a","b"],"nextCursor":"x","hasMore":true}"#).unwrap();
        assert_eq!(page.items, vec!["a", "b"]);
        assert_eq!(page.continuation(), Some("x"));

        let last: CursorPage<String> =
            serde_json::from_str(r#"{"items":["c"],"nextCursor":null,"hasMore":false}"#).unwrap();
        assert_eq!(last.continuation(), None);
    }

    #[test]
    fn cursor_continuation_requires_both_signals() {
        let no_more = CursorPage::<u8> {
            items: vec![],
            next_cursor: Some("x".into()),
            has_more: false,
        };
        assert_eq!(no_more.continuation(), None);

        let empty_cursor = CursorPage::<u8> {
            items: vec![],
            next_cursor: Some(String::new()),
            has_more: true,
        };
        assert_eq!(empty_cursor.continuation(), None);

        let missing: CursorPage<u8> = serde_json::from_str(r#"{"items":[],"hasMore":true}"#).unwrap();
        assert_eq!(missing.continuation(), None);
    }

    #[test]
    fn paged_result_defaults_optional_fields() {
        let page: PagedResult<u32> =
            serde_json::from_str(r#"{"items":[1],"page":1,"totalPages":2}"#).unwrap();
        assert_eq!(page.items, vec![1]);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.per_page, 0);
        assert_eq!(page.total_items, 0);

        assert!(serde_json::from_str::<PagedResult<u32>>(r#"{"items":[1]}"#).is_err());
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Invoice {
        id: String,
    }

    #[test]
    fn pages_decode_items_without_default() {
        let page: CursorPage<Invoice> =
            serde_json::from_str(r#"{"items":[{"id":"in_1"}],"hasMore":false}"#).unwrap();
        assert_eq!(page.items, vec![Invoice { id: "in_1".into() }]);

        let empty: PagedResult<Invoice> = serde_json::from_str(r#"{"totalPages":0}"#).unwrap();
        assert!(empty.items.is_empty());
    }

    #[test]
    fn following_page_stops_at_total() {
        assert_eq!(following_page(1, 2), Some(2));
        assert_eq!(following_page(2, 2), None);
        assert_eq!(following_page(1, 0), None);
        assert_eq!(following_page(u32::MAX, u32::MAX), None);
    }
}
