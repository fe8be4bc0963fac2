//! Windowed fetching over list-returning API methods.
//!
//! Every list method of the API takes `count`/`offset` and answers with
//! `{"count": total, "items": [...]}`. [`fetch_items`] drives that window
//! according to [`FetchOptions`]: a single page by default, every page with
//! `all`, and a date-bounded walk with `after`/`before`.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;
use vkvideo_common::{Error, Result, SortOrder};

use crate::api::{Params, VkApi};

/// Largest page most list methods accept.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Window and ordering of a list fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Page size. Defaults to the method's maximum.
    pub count: Option<u32>,
    pub offset: u32,
    /// Keep paging until the remote list is exhausted.
    pub all: bool,
    /// Only keep records dated at or after this instant. Implies paging.
    pub after: Option<DateTime<Utc>>,
    /// Only keep records dated at or before this instant. Needs `after`.
    pub before: Option<DateTime<Utc>>,
    pub sort: Option<SortOrder>,
}

impl FetchOptions {
    /// Single page of `count` records starting at `offset`.
    pub fn page(count: u32, offset: u32) -> Self {
        Self {
            count: Some(count),
            offset,
            ..Self::default()
        }
    }

    /// Every record, in pages of the method's maximum size.
    pub fn everything() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// Reject windows the API or the date walk cannot serve.
    pub fn validate(&self, cap: u32) -> Result<()> {
        if let Some(count) = self.count {
            if count > cap {
                return Err(Error::invalid_input(format!(
                    "count {count} exceeds the maximum page size of {cap}"
                )));
            }
        }

        match (self.after, self.before) {
            (None, Some(_)) => {
                return Err(Error::invalid_input(
                    "`before` can only be used together with `after`",
                ))
            }
            (Some(after), Some(before)) if before < after => {
                return Err(Error::invalid_input(format!(
                    "`before` ({before}) is earlier than `after` ({after})"
                )))
            }
            _ => {}
        }

        // The date walk stops at the first record older than `after`, which
        // only works when records arrive newest first.
        if self.after.is_some() && self.sort == Some(SortOrder::Asc) {
            return Err(Error::invalid_input(
                "`after` requires descending sort order",
            ));
        }

        Ok(())
    }

    fn pages_through(&self) -> bool {
        self.all || self.after.is_some()
    }

    fn has_window(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }
}

/// Where a dated record falls relative to the requested window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Newer,
    Inside,
    Older,
}

fn position(options: &FetchOptions, item: &Value) -> Result<Position> {
    if !options.has_window() {
        return Ok(Position::Inside);
    }

    let date = item
        .get("date")
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::parse("record has no `date` to compare with the time window"))?;
    let date = unix_time(date)?;

    if options.after.is_some_and(|after| date < after) {
        Ok(Position::Older)
    } else if options.before.is_some_and(|before| date > before) {
        Ok(Position::Newer)
    } else {
        Ok(Position::Inside)
    }
}

/// Convert API unix seconds to UTC.
pub fn unix_time(seconds: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| Error::parse(format!("timestamp out of range: {seconds}")))
}

/// One page of a list response.
struct Page {
    total: Option<u32>,
    items: Vec<Value>,
}

impl Page {
    fn from_payload(payload: Value) -> Result<Self> {
        match payload {
            Value::Object(mut map) => {
                let total = map
                    .get("count")
                    .and_then(Value::as_u64)
                    .map(|n| u32::try_from(n).unwrap_or(u32::MAX));
                match map.remove("items") {
                    Some(Value::Array(items)) => Ok(Self { total, items }),
                    Some(other) => Err(Error::parse(format!("`items` is not a list: {other}"))),
                    None => Ok(Self {
                        total,
                        items: Vec::new(),
                    }),
                }
            }
            // Older API versions put the total count first in a bare list.
            Value::Array(mut items) => {
                let total = match items.first() {
                    Some(Value::Number(n)) => {
                        let total = n.as_u64().map(|n| u32::try_from(n).unwrap_or(u32::MAX));
                        items.remove(0);
                        total
                    }
                    _ => None,
                };
                Ok(Self { total, items })
            }
            other => Err(Error::parse(format!("unexpected list payload: {other}"))),
        }
    }
}

/// Fetch the records `method` returns for `params` within the window of
/// `options`.
///
/// `cap` is the largest page the method accepts. Options are validated
/// before the first request.
pub async fn fetch_items(
    api: &dyn VkApi,
    method: &str,
    params: &Params,
    options: &FetchOptions,
    cap: u32,
) -> Result<Vec<Value>> {
    options.validate(cap)?;

    let page_size = options.count.unwrap_or(cap);
    let mut offset = options.offset;
    let mut collected = Vec::new();

    loop {
        let mut page_params = params.clone();
        page_params.set("count", page_size).set("offset", offset);

        let page = Page::from_payload(api.call(method, &page_params).await?)?;
        let received = page.items.len() as u32;
        debug!(method, offset, received, total = ?page.total, "Fetched page");

        let mut passed_window = false;
        for item in page.items {
            match position(options, &item)? {
                Position::Inside => collected.push(item),
                Position::Newer => {}
                Position::Older => {
                    passed_window = true;
                    break;
                }
            }
        }

        offset += received;
        let exhausted = received == 0
            || received < page_size
            || page.total.is_some_and(|total| offset >= total);

        if !options.pages_through() || passed_window || exhausted {
            break;
        }
    }

    Ok(collected)
}
