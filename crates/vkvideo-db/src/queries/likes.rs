//! Users who liked a video.
//!
//! Filled lazily, only when likes are fetched explicitly.

use rusqlite::Connection;
use vkvideo_common::{Error, Result, UserId, VideoId};

/// Link a user to a video. Returns `false` if the link already existed.
pub fn add_like_user(conn: &Connection, video: VideoId, user: UserId) -> Result<bool> {
    let rows = conn
        .execute(
            "INSERT OR IGNORE INTO video_like_users (video_id, user_id) VALUES (?, ?)",
            rusqlite::params![video.get(), user.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows > 0)
}

/// Number of users linked as liking the video.
pub fn count_like_users(conn: &Connection, video: VideoId) -> Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM video_like_users WHERE video_id = ?",
        [video.get()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Users linked as liking the video, by remote id.
pub fn list_like_users(conn: &Connection, video: VideoId) -> Result<Vec<UserId>> {
    let mut stmt = conn
        .prepare("SELECT user_id FROM video_like_users WHERE video_id = ? ORDER BY user_id")
        .map_err(|e| Error::database(e.to_string()))?;

    let users = stmt
        .query_map([video.get()], |row| row.get::<_, i64>(0).map(UserId::new))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(users)
}
