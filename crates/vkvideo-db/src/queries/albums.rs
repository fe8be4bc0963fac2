//! Video album queries.

use rusqlite::{Connection, OptionalExtension, Row};
use vkvideo_common::{Actor, AlbumId, Error, Result};

use super::{decode_actor, format_timestamp, parse_timestamp};
use crate::models::Album;

const ALBUM_COLUMNS: &str = "remote_id, owner_id, title, photo_160, videos_count, fetched_at";

fn row_to_album(row: &Row) -> rusqlite::Result<Album> {
    Ok(Album {
        id: AlbumId::new(row.get(0)?),
        owner: decode_actor(1, row.get(1)?)?,
        title: row.get(2)?,
        photo_160: row.get(3)?,
        videos_count: row.get(4)?,
        fetched_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
    })
}

/// Insert an album or overwrite the stored copy with fresh remote values.
pub fn upsert_album(conn: &Connection, album: &Album) -> Result<()> {
    conn.execute(
        "INSERT INTO albums (remote_id, owner_id, title, photo_160, videos_count, fetched_at)
         VALUES (:id, :owner_id, :title, :photo_160, :videos_count, :fetched_at)
         ON CONFLICT(remote_id) DO UPDATE SET
            owner_id = excluded.owner_id,
            title = excluded.title,
            photo_160 = excluded.photo_160,
            videos_count = excluded.videos_count,
            fetched_at = excluded.fetched_at",
        rusqlite::named_params! {
            ":id": album.id.get(),
            ":owner_id": album.owner_id().get(),
            ":title": album.title,
            ":photo_160": album.photo_160,
            ":videos_count": album.videos_count,
            ":fetched_at": format_timestamp(&album.fetched_at),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Get an album by remote id.
pub fn get_album(conn: &Connection, id: AlbumId) -> Result<Option<Album>> {
    conn.query_row(
        &format!("SELECT {ALBUM_COLUMNS} FROM albums WHERE remote_id = ?"),
        [id.get()],
        row_to_album,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Whether an album with this remote id is mirrored locally.
pub fn album_exists(conn: &Connection, id: AlbumId) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM albums WHERE remote_id = ?)",
        [id.get()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// List albums of one owner, newest remote id first.
pub fn list_albums_by_owner(conn: &Connection, owner: Actor) -> Result<Vec<Album>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ALBUM_COLUMNS} FROM albums WHERE owner_id = ? ORDER BY remote_id DESC"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let albums = stmt
        .query_map([owner.owner_id().get()], row_to_album)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(albums)
}

/// Raise the cached video count to `count` if the stored value is lower.
///
/// Returns `true` when the row changed.
pub fn raise_videos_count(conn: &Connection, id: AlbumId, count: u32) -> Result<bool> {
    let rows = conn
        .execute(
            "UPDATE albums SET videos_count = :count
             WHERE remote_id = :id AND videos_count < :count",
            rusqlite::named_params! { ":id": id.get(), ":count": count },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows > 0)
}

/// Count mirrored albums.
pub fn count_albums(conn: &Connection) -> Result<u32> {
    conn.query_row("SELECT COUNT(*) FROM albums", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use crate::queries::actors;
    use chrono::{TimeZone, Utc};
    use vkvideo_common::{GroupId, UserId};

    pub(crate) fn sample_album(id: i64, owner: Actor) -> Album {
        Album {
            id: AlbumId::new(id),
            owner,
            title: format!("Album {id}"),
            photo_160: "http://cs619722.vk.me/u8704019/video/m_ef3493e1.jpg".to_string(),
            videos_count: 0,
            fetched_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_upsert_and_get_album() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let group = Actor::Group(GroupId::new(16297716));
        actors::ensure_actor(&conn, group).unwrap();

        let album = sample_album(54387280, group);
        upsert_album(&conn, &album).unwrap();

        let found = get_album(&conn, album.id).unwrap().unwrap();
        assert_eq!(found, album);
        assert!(album_exists(&conn, album.id).unwrap());
        assert!(!album_exists(&conn, AlbumId::new(1)).unwrap());
    }

    #[test]
    fn test_upsert_overwrites() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let owner = Actor::User(UserId::new(1));

        let mut album = sample_album(7, owner);
        upsert_album(&conn, &album).unwrap();

        album.title = "Renamed".to_string();
        album.videos_count = 16;
        upsert_album(&conn, &album).unwrap();

        let found = get_album(&conn, album.id).unwrap().unwrap();
        assert_eq!(found.title, "Renamed");
        assert_eq!(found.videos_count, 16);
        assert_eq!(count_albums(&conn).unwrap(), 1);
    }

    #[test]
    fn test_list_albums_by_owner() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let group = Actor::Group(GroupId::new(3));
        let user = Actor::User(UserId::new(3));

        upsert_album(&conn, &sample_album(1, group)).unwrap();
        upsert_album(&conn, &sample_album(2, group)).unwrap();
        upsert_album(&conn, &sample_album(3, user)).unwrap();

        let albums = list_albums_by_owner(&conn, group).unwrap();
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].id, AlbumId::new(2));
        assert!(albums.iter().all(|a| a.owner == group));
    }

    #[test]
    fn test_raise_videos_count_only_grows() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let album = sample_album(9, Actor::User(UserId::new(1)));
        upsert_album(&conn, &album).unwrap();

        assert!(raise_videos_count(&conn, album.id, 5).unwrap());
        assert!(!raise_videos_count(&conn, album.id, 3).unwrap());
        assert!(!raise_videos_count(&conn, album.id, 5).unwrap());

        let found = get_album(&conn, album.id).unwrap().unwrap();
        assert_eq!(found.videos_count, 5);
    }
}
