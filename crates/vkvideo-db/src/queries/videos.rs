//! Video queries.

use rusqlite::{Connection, OptionalExtension, Row};
use vkvideo_common::{Actor, AlbumId, Error, Result, VideoId};

use super::{decode_actor, format_timestamp, parse_timestamp};
use crate::models::Video;

const VIDEO_COLUMNS: &str = "remote_id, owner_id, album_id, title, description, duration, \
     likes_count, comments_count, views_count, photo_130, player, date, fetched_at";

fn row_to_video(row: &Row) -> rusqlite::Result<Video> {
    Ok(Video {
        id: VideoId::new(row.get(0)?),
        owner: decode_actor(1, row.get(1)?)?,
        album_id: row.get::<_, Option<i64>>(2)?.map(AlbumId::new),
        title: row.get(3)?,
        description: row.get(4)?,
        duration: row.get(5)?,
        likes_count: row.get(6)?,
        comments_count: row.get(7)?,
        views_count: row.get(8)?,
        photo_130: row.get(9)?,
        player: row.get(10)?,
        date: parse_timestamp(11, &row.get::<_, String>(11)?)?,
        fetched_at: parse_timestamp(12, &row.get::<_, String>(12)?)?,
    })
}

fn collect_videos(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Video>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let videos = stmt
        .query_map(params, row_to_video)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(videos)
}

/// Insert a video or overwrite the stored copy with fresh remote values.
pub fn upsert_video(conn: &Connection, video: &Video) -> Result<()> {
    conn.execute(
        "INSERT INTO videos (remote_id, owner_id, album_id, title, description, duration,
                             likes_count, comments_count, views_count, photo_130, player,
                             date, fetched_at)
         VALUES (:id, :owner_id, :album_id, :title, :description, :duration,
                 :likes_count, :comments_count, :views_count, :photo_130, :player,
                 :date, :fetched_at)
         ON CONFLICT(remote_id) DO UPDATE SET
            owner_id = excluded.owner_id,
            album_id = excluded.album_id,
            title = excluded.title,
            description = excluded.description,
            duration = excluded.duration,
            likes_count = excluded.likes_count,
            comments_count = excluded.comments_count,
            views_count = excluded.views_count,
            photo_130 = excluded.photo_130,
            player = excluded.player,
            date = excluded.date,
            fetched_at = excluded.fetched_at",
        rusqlite::named_params! {
            ":id": video.id.get(),
            ":owner_id": video.owner_id().get(),
            ":album_id": video.album_id.map(AlbumId::get),
            ":title": video.title,
            ":description": video.description,
            ":duration": video.duration,
            ":likes_count": video.likes_count,
            ":comments_count": video.comments_count,
            ":views_count": video.views_count,
            ":photo_130": video.photo_130,
            ":player": video.player,
            ":date": format_timestamp(&video.date),
            ":fetched_at": format_timestamp(&video.fetched_at),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Get a video by remote id.
pub fn get_video(conn: &Connection, id: VideoId) -> Result<Option<Video>> {
    conn.query_row(
        &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE remote_id = ?"),
        [id.get()],
        row_to_video,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List videos of an album, newest first.
pub fn list_videos_by_album(conn: &Connection, album: AlbumId) -> Result<Vec<Video>> {
    collect_videos(
        conn,
        &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE album_id = ? ORDER BY date DESC"),
        [album.get()],
    )
}

/// List videos of an owner, newest first.
pub fn list_videos_by_owner(conn: &Connection, owner: Actor) -> Result<Vec<Video>> {
    collect_videos(
        conn,
        &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE owner_id = ? ORDER BY date DESC"),
        [owner.owner_id().get()],
    )
}

/// Overwrite the cached like counter.
pub fn set_likes_count(conn: &Connection, id: VideoId, count: u32) -> Result<()> {
    let rows = conn
        .execute(
            "UPDATE videos SET likes_count = ? WHERE remote_id = ?",
            rusqlite::params![count, id.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if rows == 0 {
        return Err(Error::not_found(format!("video {id}")));
    }
    Ok(())
}

/// Count mirrored videos.
pub fn count_videos(conn: &Connection) -> Result<u32> {
    conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}

/// Count mirrored videos of one album.
pub fn count_videos_in_album(conn: &Connection, album: AlbumId) -> Result<u32> {
    conn.query_row(
        "SELECT COUNT(*) FROM videos WHERE album_id = ?",
        [album.get()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}
