//! Videos of an album, a user, or a group.

use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use vkvideo_common::{Actor, AlbumId, Error, GroupId, OwnerId, Result, UserId, VideoId};
use vkvideo_db::models::{Album, Video};
use vkvideo_db::queries::{actors, albums, videos};

use super::{in_transaction, Counter};
use crate::api::{Params, VkApi};
use crate::remote::{fetch_items, unix_time, FetchOptions, MAX_PAGE_SIZE};

pub const GET_VIDEOS: &str = "video.get";

/// Request for videos. An album, when given, decides the owner.
#[derive(Debug, Clone, Default)]
pub struct VideoFetch<'a> {
    pub album: Option<&'a Album>,
    pub user: Option<UserId>,
    pub group: Option<GroupId>,
    /// Restrict the result to these videos of the owner.
    pub ids: Vec<VideoId>,
    pub options: FetchOptions,
}

impl<'a> VideoFetch<'a> {
    pub fn for_album(album: &'a Album) -> Self {
        Self {
            album: Some(album),
            ..Self::default()
        }
    }

    pub fn for_owner(owner: Actor) -> Self {
        Self {
            user: owner.as_user(),
            group: owner.as_group(),
            ..Self::default()
        }
    }

    pub fn owner_id(&self) -> Result<OwnerId> {
        if let Some(album) = self.album {
            return Ok(album.owner_id());
        }
        match (self.user, self.group) {
            (Some(user), None) => Ok(Actor::User(user).validate()?.owner_id()),
            (None, Some(group)) => Ok(Actor::Group(group).validate()?.owner_id()),
            (None, None) => Err(Error::invalid_input(
                "video fetch needs an album, a user, or a group",
            )),
            (Some(_), Some(_)) => Err(Error::invalid_input(
                "video fetch takes either a user or a group, not both",
            )),
        }
    }

    /// Request parameters, without the page window.
    pub fn params(&self) -> Result<Params> {
        let owner = self.owner_id()?;
        self.options.validate(MAX_PAGE_SIZE)?;

        let mut params = Params::new();
        params.set("owner_id", owner).set_flag("extended", true);
        if let Some(album) = self.album {
            params.set("album_id", album.id);
        }
        if !self.ids.is_empty() {
            let videos = self
                .ids
                .iter()
                .map(|id| format!("{owner}_{id}"))
                .collect::<Vec<_>>()
                .join(",");
            params.set("videos", videos);
        }
        Ok(params)
    }
}

#[derive(Debug, Deserialize)]
struct VideoRecord {
    id: i64,
    owner_id: i64,
    #[serde(default)]
    album_id: Option<i64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    duration: u32,
    #[serde(default)]
    views: u32,
    #[serde(default)]
    comments: u32,
    #[serde(default)]
    likes: Counter,
    #[serde(default)]
    photo_130: String,
    #[serde(default)]
    player: String,
    date: i64,
}

/// Build a [`Video`] from one record of `video.get`.
///
/// `album_id` is kept only when that album is mirrored locally. When the
/// record names none, `fallback_album` (the album being fetched) is used.
pub fn parse_video(
    conn: &Connection,
    record: &Value,
    fallback_album: Option<AlbumId>,
) -> Result<Video> {
    let record = VideoRecord::deserialize(record)?;
    let owner = actors::resolve_owner(conn, OwnerId::new(record.owner_id))?;

    let mut album_id = None;
    for candidate in record.album_id.map(AlbumId::new).into_iter().chain(fallback_album) {
        if albums::album_exists(conn, candidate)? {
            album_id = Some(candidate);
            break;
        }
    }

    Ok(Video {
        id: VideoId::new(record.id),
        owner,
        album_id,
        title: record.title,
        description: record.description,
        duration: record.duration,
        likes_count: record.likes.count,
        comments_count: record.comments,
        views_count: record.views,
        photo_130: record.photo_130,
        player: record.player,
        date: unix_time(record.date)?,
        fetched_at: Utc::now(),
    })
}

/// Fetch videos and store them.
///
/// When fetching through an album, its cached `videos_count` is raised to
/// the number of fetched videos if that is larger.
pub async fn fetch_videos(
    api: &dyn VkApi,
    conn: &Connection,
    request: &VideoFetch<'_>,
) -> Result<Vec<Video>> {
    let params = request.params()?;
    let items = fetch_items(api, GET_VIDEOS, &params, &request.options, MAX_PAGE_SIZE).await?;
    let fallback = request.album.map(|album| album.id);

    let fetched = in_transaction(conn, |tx| {
        let mut fetched = Vec::with_capacity(items.len());
        for item in &items {
            let video = parse_video(tx, item, fallback)?;
            videos::upsert_video(tx, &video)?;
            fetched.push(video);
        }
        if let Some(album) = request.album {
            albums::raise_videos_count(tx, album.id, fetched.len() as u32)?;
        }
        Ok(fetched)
    })?;

    info!(owner = %request.owner_id()?, count = fetched.len(), "Fetched videos");
    Ok(fetched)
}

/// Fetch the videos of `album`, keeping its in-memory count in step with
/// the stored one.
pub async fn fetch_album_videos(
    api: &dyn VkApi,
    conn: &Connection,
    album: &mut Album,
    options: FetchOptions,
) -> Result<Vec<Video>> {
    let fetched = {
        let request = VideoFetch {
            options,
            ..VideoFetch::for_album(album)
        };
        fetch_videos(api, conn, &request).await?
    };

    let count = fetched.len() as u32;
    if count > album.videos_count {
        album.videos_count = count;
    }
    Ok(fetched)
}
