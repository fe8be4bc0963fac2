//! Video albums of a user or group.

use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use vkvideo_common::{Actor, AlbumId, Error, GroupId, OwnerId, Result, UserId};
use vkvideo_db::models::Album;
use vkvideo_db::queries::{actors, albums};

use super::in_transaction;
use crate::api::{Params, VkApi};
use crate::remote::{fetch_items, FetchOptions, MAX_PAGE_SIZE};

pub const GET_ALBUMS: &str = "video.getAlbums";

/// Request for the albums of exactly one owner.
#[derive(Debug, Clone, Default)]
pub struct AlbumFetch {
    pub user: Option<UserId>,
    pub group: Option<GroupId>,
    /// Restrict the result to these albums.
    pub ids: Vec<AlbumId>,
    pub options: FetchOptions,
}

impl AlbumFetch {
    pub fn for_owner(owner: Actor) -> Self {
        Self {
            user: owner.as_user(),
            group: owner.as_group(),
            ..Self::default()
        }
    }

    pub fn owner(&self) -> Result<Actor> {
        match (self.user, self.group) {
            (Some(user), None) => Actor::User(user).validate(),
            (None, Some(group)) => Actor::Group(group).validate(),
            (None, None) => Err(Error::invalid_input(
                "album fetch needs the user or group that owns the albums",
            )),
            (Some(_), Some(_)) => Err(Error::invalid_input(
                "album fetch takes either a user or a group, not both",
            )),
        }
    }

    /// Request parameters, without the page window.
    pub fn params(&self) -> Result<Params> {
        let owner = self.owner()?;
        if self.options.after.is_some() || self.options.before.is_some() {
            return Err(Error::invalid_input("albums carry no date to window by"));
        }
        self.options.validate(MAX_PAGE_SIZE)?;

        let mut params = Params::new();
        params.set("owner_id", owner.owner_id()).set_flag("extended", true);
        if !self.ids.is_empty() {
            params.set("album_ids", join_ids(&self.ids));
        }
        Ok(params)
    }
}

fn join_ids(ids: &[AlbumId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Deserialize)]
struct AlbumRecord {
    id: i64,
    owner_id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    count: u32,
    #[serde(default)]
    photo_160: String,
}

/// Build an [`Album`] from one record of `video.getAlbums`.
///
/// The owning user or group is created locally when missing.
pub fn parse_album(conn: &Connection, record: &Value) -> Result<Album> {
    let record = AlbumRecord::deserialize(record)?;
    let owner = actors::resolve_owner(conn, OwnerId::new(record.owner_id))?;

    Ok(Album {
        id: AlbumId::new(record.id),
        owner,
        title: record.title,
        photo_160: record.photo_160,
        videos_count: record.count,
        fetched_at: Utc::now(),
    })
}

/// Fetch albums and store them.
pub async fn fetch_albums(
    api: &dyn VkApi,
    conn: &Connection,
    request: &AlbumFetch,
) -> Result<Vec<Album>> {
    let params = request.params()?;
    let items = fetch_items(api, GET_ALBUMS, &params, &request.options, MAX_PAGE_SIZE).await?;

    let fetched = in_transaction(conn, |tx| {
        let mut fetched = Vec::with_capacity(items.len());
        for item in &items {
            let album = parse_album(tx, item)?;
            if !request.ids.is_empty() && !request.ids.contains(&album.id) {
                continue;
            }
            albums::upsert_album(tx, &album)?;
            fetched.push(album);
        }
        Ok(fetched)
    })?;

    info!(owner = %request.owner()?, count = fetched.len(), "Fetched albums");
    Ok(fetched)
}
