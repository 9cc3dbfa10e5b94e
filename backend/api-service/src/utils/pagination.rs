use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Raw `limit` / `cursor` query parameters.
///
/// Kept as strings so malformed values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub limit: i64,
    /// Only rows with an id below the cursor are returned
    pub cursor: Option<i64>,
}

impl PageQuery {
    pub fn params(&self) -> PageParams {
        let limit = self
            .limit
            .as_deref()
            .and_then(|l| l.parse::<i64>().ok())
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT);

        let cursor = self
            .cursor
            .as_deref()
            .and_then(|c| c.parse::<i64>().ok());

        PageParams { limit, cursor }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    pub has_more: bool,
    pub next_cursor: Option<String>,
    pub limit: i64,
}

/// Trim a `limit + 1` result set and compute the pagination block.
pub fn paginate<T>(mut items: Vec<T>, limit: i64, id_of: impl Fn(&T) -> i64) -> (Vec<T>, Pagination) {
    let has_more = items.len() as i64 > limit;
    if has_more {
        items.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        items.last().map(|item| id_of(item).to_string())
    } else {
        None
    };

    (
        items,
        Pagination {
            has_more,
            next_cursor,
            limit,
        },
    )
}
