//! Video comments: fetching, parsing, and the write-through CRUD mirror.
//!
//! Every write first checks the local lifecycle transition, then performs
//! the remote call, and only after it succeeds touches local rows. A
//! rejected remote call therefore leaves the local mirror as it was.

use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use vkvideo_common::{Actor, CommentOp, CommentState, CompositeId, Error, OwnerId, Result};
use vkvideo_db::models::{Comment, Video};
use vkvideo_db::queries::{actors, comments, videos};

use super::{in_transaction, Counter};
use crate::api::{Params, VkApi};
use crate::remote::{fetch_items, unix_time, FetchOptions, MAX_PAGE_SIZE};

pub const GET_COMMENTS: &str = "video.getComments";
pub const CREATE_COMMENT: &str = "video.createComment";
pub const EDIT_COMMENT: &str = "video.editComment";
pub const DELETE_COMMENT: &str = "video.deleteComment";
pub const RESTORE_COMMENT: &str = "video.restoreComment";

/// Author id the API reports for comments written on behalf of the group
/// that owns the video.
const OWNING_GROUP_AUTHOR: i64 = 101;

#[derive(Debug, Clone, Default)]
pub struct CommentFetch {
    pub options: FetchOptions,
    /// Ask for per-comment like counts.
    pub need_likes: bool,
}

impl CommentFetch {
    /// Options with the sort order the request will actually use.
    fn effective_options(&self) -> FetchOptions {
        FetchOptions {
            sort: Some(self.options.sort.unwrap_or_default()),
            ..self.options.clone()
        }
    }
}

/// Request parameters for the comments of `video`, without the page window.
pub fn comment_params(video: &Video, request: &CommentFetch) -> Result<Params> {
    let options = request.effective_options();
    options.validate(MAX_PAGE_SIZE)?;

    let mut params = Params::new();
    params
        .set("owner_id", video.owner_id())
        .set("video_id", video.id)
        .set_flag("need_likes", request.need_likes)
        .set("sort", options.sort.unwrap_or_default());
    Ok(params)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommentRecord {
    id: RawId,
    from_id: i64,
    date: i64,
    #[serde(default, alias = "message")]
    text: String,
    #[serde(default)]
    likes: Counter,
}

fn resolve_author(conn: &Connection, video: &Video, from_id: i64) -> Result<Actor> {
    if from_id == OWNING_GROUP_AUTHOR {
        if let Some(group) = video.owner.as_group() {
            actors::get_or_create_group(conn, group)?;
            return Ok(Actor::Group(group));
        }
    }
    actors::resolve_owner(conn, OwnerId::new(from_id))
}

/// Build a [`Comment`] on `video` from one record of `video.getComments`.
pub fn parse_comment(conn: &Connection, video: &Video, record: &Value) -> Result<Comment> {
    let record = CommentRecord::deserialize(record)?;
    let author = resolve_author(conn, video, record.from_id)?;
    let id = CompositeId::normalize(video.owner_id(), &record.id.into_string())?;
    let now = Utc::now();

    Ok(Comment {
        id,
        video_id: video.id,
        author,
        text: record.text,
        likes_count: record.likes.count,
        date: unix_time(record.date)?,
        state: CommentState::Active,
        fetched_at: now,
    })
}

/// Fetch the comments of `video` and store them.
pub async fn fetch_video_comments(
    api: &dyn VkApi,
    conn: &Connection,
    video: &Video,
    request: &CommentFetch,
) -> Result<Vec<Comment>> {
    let params = comment_params(video, request)?;
    let options = request.effective_options();
    let items = fetch_items(api, GET_COMMENTS, &params, &options, MAX_PAGE_SIZE).await?;

    let fetched = in_transaction(conn, |tx| {
        let mut fetched = Vec::with_capacity(items.len());
        for item in &items {
            let comment = parse_comment(tx, video, item)?;
            comments::upsert_comment(tx, &comment)?;
            fetched.push(comment);
        }
        Ok(fetched)
    })?;

    info!(video = %video.id, count = fetched.len(), "Fetched comments");
    Ok(fetched)
}

/// Parameters of `video.createComment`.
pub fn create_params(video: &Video, author: Actor, text: &str) -> Params {
    let from_group = video
        .owner
        .as_group()
        .is_some_and(|group| author == Actor::Group(group));

    let mut params = Params::new();
    params
        .set("owner_id", video.owner_id())
        .set("video_id", video.id)
        .set("message", text)
        .set_flag("from_group", from_group)
        .set("attachments", "");
    params
}

fn comment_ref_params(comment: &Comment) -> Params {
    let mut params = Params::new();
    params
        .set("owner_id", comment.id.owner)
        .set("comment_id", comment.id.short());
    params
}

/// Ids come back either bare or as `{"comment_id": n}`.
fn created_id(response: &Value) -> Result<i64> {
    response
        .as_i64()
        .or_else(|| response.get("comment_id").and_then(Value::as_i64))
        .ok_or_else(|| Error::parse(format!("{CREATE_COMMENT} returned no id: {response}")))
}

fn expect_success(method: &str, response: &Value) -> Result<()> {
    match response {
        Value::Number(n) if n.as_i64() == Some(1) => Ok(()),
        Value::Bool(true) => Ok(()),
        other => Err(Error::parse(format!("{method} returned {other}"))),
    }
}

/// Post a new comment on `video` as `author` and mirror it locally.
///
/// `video` must already be mirrored. The API answers with the new id only,
/// so the stored `date` is the local time of the call.
pub async fn create_comment(
    api: &dyn VkApi,
    conn: &Connection,
    video: &Video,
    author: Actor,
    text: &str,
) -> Result<Comment> {
    let state = CommentState::Absent.apply(CommentOp::Create)?;
    let author = author.validate()?;
    if videos::get_video(conn, video.id)?.is_none() {
        return Err(Error::not_found(format!(
            "video {} is not mirrored locally",
            video.id
        )));
    }

    let response = api
        .call(CREATE_COMMENT, &create_params(video, author, text))
        .await?;
    let id = CompositeId::new(video.owner_id(), created_id(&response)?);

    let now = Utc::now();
    let comment = Comment {
        id,
        video_id: video.id,
        author,
        text: text.to_string(),
        likes_count: 0,
        date: now,
        state,
        fetched_at: now,
    };

    in_transaction(conn, |tx| {
        actors::ensure_actor(tx, author)?;
        comments::upsert_comment(tx, &comment)
    })?;

    info!(comment = %comment.id, video = %video.id, "Created comment");
    Ok(comment)
}

fn ensure_stored(conn: &Connection, comment: &Comment) -> Result<()> {
    if comments::get_comment(conn, &comment.id)?.is_none() {
        return Err(Error::not_found(format!(
            "comment {} is not mirrored locally",
            comment.id
        )));
    }
    Ok(())
}

/// Replace the text of `comment` remotely and locally.
pub async fn update_comment(
    api: &dyn VkApi,
    conn: &Connection,
    comment: &mut Comment,
    text: &str,
) -> Result<()> {
    let state = comment.state.apply(CommentOp::Update)?;
    ensure_stored(conn, comment)?;

    let mut params = comment_ref_params(comment);
    params.set("message", text).set("attachments", "");
    let response = api.call(EDIT_COMMENT, &params).await?;
    expect_success(EDIT_COMMENT, &response)?;

    in_transaction(conn, |tx| comments::update_comment_text(tx, &comment.id, text))?;

    comment.text = text.to_string();
    comment.state = state;
    debug!(comment = %comment.id, "Updated comment");
    Ok(())
}

/// Delete `comment` remotely. The local row is archived, not removed.
pub async fn delete_comment(api: &dyn VkApi, conn: &Connection, comment: &mut Comment) -> Result<()> {
    change_archived(api, conn, comment, CommentOp::Delete, DELETE_COMMENT).await
}

/// Restore a deleted `comment` remotely and un-archive the local row.
pub async fn restore_comment(
    api: &dyn VkApi,
    conn: &Connection,
    comment: &mut Comment,
) -> Result<()> {
    change_archived(api, conn, comment, CommentOp::Restore, RESTORE_COMMENT).await
}

async fn change_archived(
    api: &dyn VkApi,
    conn: &Connection,
    comment: &mut Comment,
    op: CommentOp,
    method: &str,
) -> Result<()> {
    let state = comment.state.apply(op)?;
    ensure_stored(conn, comment)?;

    let response = api.call(method, &comment_ref_params(comment)).await?;
    expect_success(method, &response)?;

    in_transaction(conn, |tx| {
        comments::set_archived(tx, &comment.id, state.is_archived())
    })?;

    comment.state = state;
    debug!(comment = %comment.id, op = %op, "Changed comment state");
    Ok(())
}
