//! Database query modules.
//!
//! - actors: get-or-create of users and groups, owner id resolution
//! - albums: Video album storage
//! - videos: Video storage
//! - comments: Video comment storage and archive flag
//! - likes: Users who liked a video

pub mod actors;
pub mod albums;
pub mod comments;
pub mod likes;
pub mod videos;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use vkvideo_common::{Actor, OwnerId};

/// Timestamps are stored as RFC 3339 UTC with second precision, so text
/// ordering matches chronological ordering.
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn decode_actor(idx: usize, raw: i64) -> rusqlite::Result<Actor> {
    OwnerId::new(raw)
        .actor()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}
