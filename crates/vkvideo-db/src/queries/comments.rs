//! Video comment queries.
//!
//! Comments keep their row after remote deletion; the `archived` flag marks
//! them so a later restore can bring them back.

use rusqlite::{Connection, OptionalExtension, Row};
use vkvideo_common::{CommentState, CompositeId, Error, Result, VideoId};

use super::{decode_actor, format_timestamp, parse_timestamp};
use crate::models::Comment;

const COMMENT_COLUMNS: &str =
    "remote_id, video_id, author_id, text, likes_count, date, archived, fetched_at";

fn row_to_comment(row: &Row) -> rusqlite::Result<Comment> {
    let remote_id: String = row.get(0)?;
    let id = remote_id.parse::<CompositeId>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let archived: bool = row.get(6)?;

    Ok(Comment {
        id,
        video_id: VideoId::new(row.get(1)?),
        author: decode_actor(2, row.get(2)?)?,
        text: row.get(3)?,
        likes_count: row.get(4)?,
        date: parse_timestamp(5, &row.get::<_, String>(5)?)?,
        state: if archived {
            CommentState::Archived
        } else {
            CommentState::Active
        },
        fetched_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
    })
}

/// Insert a comment or overwrite the stored copy.
///
/// `Absent` is not a storable state and is rejected.
pub fn upsert_comment(conn: &Connection, comment: &Comment) -> Result<()> {
    if comment.state == CommentState::Absent {
        return Err(Error::invalid_state(format!(
            "comment {} has no local row to write",
            comment.id
        )));
    }

    conn.execute(
        "INSERT INTO comments (remote_id, video_id, author_id, text, likes_count, date,
                               archived, fetched_at)
         VALUES (:id, :video_id, :author_id, :text, :likes_count, :date, :archived, :fetched_at)
         ON CONFLICT(remote_id) DO UPDATE SET
            video_id = excluded.video_id,
            author_id = excluded.author_id,
            text = excluded.text,
            likes_count = excluded.likes_count,
            date = excluded.date,
            archived = excluded.archived,
            fetched_at = excluded.fetched_at",
        rusqlite::named_params! {
            ":id": comment.id.to_string(),
            ":video_id": comment.video_id.get(),
            ":author_id": comment.author.owner_id().get(),
            ":text": comment.text,
            ":likes_count": comment.likes_count,
            ":date": format_timestamp(&comment.date),
            ":archived": comment.state.is_archived(),
            ":fetched_at": format_timestamp(&comment.fetched_at),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Get a comment by composite id.
pub fn get_comment(conn: &Connection, id: &CompositeId) -> Result<Option<Comment>> {
    conn.query_row(
        &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE remote_id = ?"),
        [id.to_string()],
        row_to_comment,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List comments of a video in chronological order.
pub fn list_comments_by_video(
    conn: &Connection,
    video: VideoId,
    include_archived: bool,
) -> Result<Vec<Comment>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             WHERE video_id = :video_id AND (:include_archived OR archived = 0)
             ORDER BY date, remote_id"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let comments = stmt
        .query_map(
            rusqlite::named_params! {
                ":video_id": video.get(),
                ":include_archived": include_archived,
            },
            row_to_comment,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(comments)
}

/// Replace the text of a stored comment.
pub fn update_comment_text(conn: &Connection, id: &CompositeId, text: &str) -> Result<()> {
    let rows = conn
        .execute(
            "UPDATE comments SET text = ? WHERE remote_id = ?",
            rusqlite::params![text, id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if rows == 0 {
        return Err(Error::not_found(format!("comment {id}")));
    }
    Ok(())
}

/// Set or clear the archived flag of a stored comment.
pub fn set_archived(conn: &Connection, id: &CompositeId, archived: bool) -> Result<()> {
    let rows = conn
        .execute(
            "UPDATE comments SET archived = ? WHERE remote_id = ?",
            rusqlite::params![archived, id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if rows == 0 {
        return Err(Error::not_found(format!("comment {id}")));
    }
    Ok(())
}

/// Count stored comments of a video, archived ones included.
pub fn count_comments(conn: &Connection, video: VideoId) -> Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE video_id = ?",
        [video.get()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}
