//! Fetch managers and record parsers for each mirrored entity.
//!
//! - albums: `video.getAlbums`
//! - videos: `video.get`
//! - likes: `likes.getList` for a video
//! - comments: `video.getComments` and the comment write methods
//!
//! Fetches finish all network work first and then persist every parsed
//! record inside one transaction, so a failed fetch leaves no partial rows.

pub mod albums;
pub mod comments;
pub mod likes;
pub mod videos;

use rusqlite::Connection;
use serde::Deserialize;
use vkvideo_common::{Error, Result};

/// Run `f` inside a transaction on `conn`, committing when it succeeds.
pub(crate) fn in_transaction<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(format!("Failed to begin transaction: {}", e)))?;
    let value = f(&tx)?;
    tx.commit()
        .map_err(|e| Error::database(format!("Failed to commit transaction: {}", e)))?;
    Ok(value)
}

/// `{"count": n}` sub-object used for likes on videos and comments.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Counter {
    #[serde(default)]
    pub count: u32,
}
