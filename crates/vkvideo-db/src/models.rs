//! Rust models matching the database schema.
//!
//! Owners and authors are carried as [`Actor`] rather than a pair of nullable
//! user/group references, so a record always has exactly one of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vkvideo_common::{
    Actor, AlbumId, CommentState, CompositeId, GroupId, OwnerId, UserId, VideoId,
};

/// Mirrored user profile. Only the id is guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: Option<String>,
    pub screen_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mirrored group/community. Only the id is guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: Option<String>,
    pub screen_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Video album.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Album {
    pub id: AlbumId,
    pub owner: Actor,
    pub title: String,
    pub photo_160: String,
    /// Last known number of videos. May lag behind the remote value.
    pub videos_count: u32,
    pub fetched_at: DateTime<Utc>,
}

impl Album {
    pub fn owner_id(&self) -> OwnerId {
        self.owner.owner_id()
    }

    /// Public page of the album.
    pub fn link(&self) -> String {
        format!(
            "https://vk.com/videos{}?section=album_{}",
            self.owner_id(),
            self.id
        )
    }
}

/// Video record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub owner: Actor,
    /// Album the video belongs to, when that album is mirrored locally.
    pub album_id: Option<AlbumId>,
    pub title: String,
    pub description: String,
    /// Duration in seconds.
    pub duration: u32,
    pub likes_count: u32,
    pub comments_count: u32,
    pub views_count: u32,
    pub photo_130: String,
    pub player: String,
    /// Upload date; drives time-windowed fetches.
    pub date: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

impl Video {
    pub fn owner_id(&self) -> OwnerId {
        self.owner.owner_id()
    }

    /// Public page of the video.
    pub fn link(&self) -> String {
        format!("https://vk.com/video{}_{}", self.owner_id(), self.id)
    }
}

/// Comment on a video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: CompositeId,
    pub video_id: VideoId,
    pub author: Actor,
    pub text: String,
    pub likes_count: u32,
    pub date: DateTime<Utc>,
    /// Either `Active` or `Archived` for stored rows.
    pub state: CommentState,
    pub fetched_at: DateTime<Utc>,
}
