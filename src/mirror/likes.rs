//! Users who liked a video.

use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use vkvideo_common::{Error, Result, UserId};
use vkvideo_db::models::Video;
use vkvideo_db::queries::{actors, likes, videos};

use super::in_transaction;
use crate::api::{Params, VkApi};
use crate::remote::{fetch_items, FetchOptions};

pub const GET_LIKES: &str = "likes.getList";

/// `likes.getList` serves up to 1000 ids per page.
pub const MAX_LIKES_PAGE_SIZE: u32 = 1000;

pub fn likes_params(video: &Video) -> Params {
    let mut params = Params::new();
    params
        .set("type", "video")
        .set("owner_id", video.owner_id())
        .set("item_id", video.id)
        .set_flag("extended", true);
    params
}

/// An entry of `likes.getList`: a bare id, or a profile with `extended=1`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Liker {
    Id(i64),
    Profile {
        id: i64,
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        first_name: Option<String>,
        #[serde(default)]
        last_name: Option<String>,
        #[serde(default)]
        screen_name: Option<String>,
    },
}

fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let name = [first, last]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!name.is_empty()).then_some(name)
}

/// Store one liker, returning the user id when it is a user.
fn store_liker(conn: &Connection, video: &Video, item: &Value) -> Result<Option<UserId>> {
    match Liker::deserialize(item)? {
        Liker::Id(id) => {
            let user = actors::get_or_create_user(conn, UserId::new(id))?;
            likes::add_like_user(conn, video.id, user.id)?;
            Ok(Some(user.id))
        }
        Liker::Profile { kind, id, .. } if kind.as_deref().is_some_and(|k| k != "profile") => {
            debug!(video = %video.id, id, kind = ?kind, "Skipping non-user liker");
            Ok(None)
        }
        Liker::Profile {
            id,
            first_name,
            last_name,
            screen_name,
            ..
        } => {
            let user = actors::get_or_create_user(conn, UserId::new(id))?;
            let name = full_name(first_name.as_deref(), last_name.as_deref());
            if name.is_some() || screen_name.is_some() {
                actors::update_user_profile(
                    conn,
                    user.id,
                    name.as_deref().or(user.name.as_deref()),
                    screen_name.as_deref().or(user.screen_name.as_deref()),
                )?;
            }
            likes::add_like_user(conn, video.id, user.id)?;
            Ok(Some(user.id))
        }
    }
}

/// Fetch the users who liked `video`, link them to it, and recount its
/// likes from the stored links.
pub async fn fetch_video_likes(
    api: &dyn VkApi,
    conn: &Connection,
    video: &mut Video,
    options: &FetchOptions,
) -> Result<Vec<UserId>> {
    if options.after.is_some() || options.before.is_some() {
        return Err(Error::invalid_input("likes carry no date to window by"));
    }

    let items = fetch_items(
        api,
        GET_LIKES,
        &likes_params(video),
        options,
        MAX_LIKES_PAGE_SIZE,
    )
    .await?;

    let (users, likes_count) = in_transaction(conn, |tx| {
        let mut users = Vec::with_capacity(items.len());
        for item in &items {
            if let Some(user) = store_liker(tx, video, item)? {
                users.push(user);
            }
        }
        let likes_count = likes::count_like_users(tx, video.id)?;
        videos::set_likes_count(tx, video.id, likes_count)?;
        Ok((users, likes_count))
    })?;

    video.likes_count = likes_count;
    info!(video = %video.id, count = users.len(), "Fetched likes");
    Ok(users)
}
