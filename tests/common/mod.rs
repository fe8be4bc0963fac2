//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which pairs an in-memory DB with a
//! [`ScriptedApi`]: a [`VkApi`] double that answers calls from a queue of
//! canned payloads and records every request it sees.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use vkvideo::api::{Params, VkApi};
use vkvideo_common::{Actor, AlbumId, Error, GroupId, Result, VideoId};
use vkvideo_db::models::{Album, Video};
use vkvideo_db::pool::{get_conn, init_memory_pool, DbPool, PooledConnection};
use vkvideo_db::queries::{actors, albums, videos};

pub const GROUP_ID: i64 = 16297716;
pub const ALBUM_ID: i64 = 50850761;
pub const VIDEO_ID: i64 = 166742757;

/// Base unix time for generated records.
pub const BASE_DATE: i64 = 1_386_074_580;

/// A scripted [`VkApi`].
///
/// Responses are consumed in order. A call whose method differs from the
/// next scripted one fails with [`Error::Internal`].
#[derive(Default)]
pub struct ScriptedApi {
    responses: Mutex<VecDeque<(String, Result<Value>)>>,
    calls: Mutex<Vec<(String, Params)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful `payload` for the next call to `method`.
    pub fn respond(&self, method: &str, payload: Value) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back((method.to_string(), Ok(payload)));
        self
    }

    /// Queue an API error for the next call to `method`.
    pub fn fail(&self, method: &str, code: i64, message: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back((method.to_string(), Err(Error::api(code, message))));
        self
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.calls.lock().unwrap().clone()
    }

    /// Parameters of every call made to `method`, in order.
    pub fn calls_to(&self, method: &str) -> Vec<Params> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl VkApi for ScriptedApi {
    async fn call(&self, method: &str, params: &Params) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        let (expected, response) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::internal(format!("unscripted call to {method}")))?;

        if expected != method {
            return Err(Error::internal(format!(
                "expected a call to {expected}, got {method}"
            )));
        }
        response
    }
}

/// In-memory database plus scripted API.
pub struct TestHarness {
    pub db: DbPool,
    pub api: ScriptedApi,
}

impl TestHarness {
    pub fn new() -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        Self {
            db,
            api: ScriptedApi::new(),
        }
    }

    /// The in-memory pool holds a single connection; keep at most one
    /// checked out at a time.
    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get connection")
    }
}

pub fn group() -> Actor {
    Actor::Group(GroupId::new(GROUP_ID))
}

/// Store the test group's album with the given cached count.
pub fn seed_album(conn: &rusqlite::Connection, videos_count: u32) -> Album {
    let album = Album {
        id: AlbumId::new(ALBUM_ID),
        owner: group(),
        title: "Sochi 2014".to_string(),
        photo_160: String::new(),
        videos_count,
        fetched_at: Utc::now(),
    };
    actors::ensure_actor(conn, album.owner).unwrap();
    albums::upsert_album(conn, &album).unwrap();
    album
}

/// Store the test group's video, optionally inside the test album.
pub fn seed_video(conn: &rusqlite::Connection, album_id: Option<AlbumId>) -> Video {
    let video = Video {
        id: VideoId::new(VIDEO_ID),
        owner: group(),
        album_id,
        title: "Эстафета Олимпийского огня «Сочи 2014». Неделя 3-я".to_string(),
        description: String::new(),
        duration: 206,
        likes_count: 0,
        comments_count: 12,
        views_count: 928,
        photo_130: String::new(),
        player: String::new(),
        date: Utc::now(),
        fetched_at: Utc::now(),
    };
    actors::ensure_actor(conn, video.owner).unwrap();
    videos::upsert_video(conn, &video).unwrap();
    video
}

/// `{"count": total, "items": items}`
pub fn list(total: usize, items: Vec<Value>) -> Value {
    json!({"count": total, "items": items})
}

pub fn album_record(id: i64, count: u32) -> Value {
    json!({
        "id": id,
        "owner_id": -GROUP_ID,
        "title": format!("Album {id}"),
        "count": count,
        "photo_160": format!("http://cs619722.vk.me/video/m_{id}.jpg"),
        "photo_320": format!("http://cs619722.vk.me/video/l_{id}.jpg")
    })
}

/// Video record without `album_id`, dated `BASE_DATE + offset`.
pub fn video_record(id: i64, offset: i64) -> Value {
    json!({
        "id": id,
        "owner_id": -GROUP_ID,
        "title": format!("Video {id}"),
        "description": "",
        "duration": 60,
        "views": 10,
        "comments": 0,
        "likes": {"count": 1, "user_likes": 0},
        "photo_130": "",
        "player": format!("https://vk.com/video_ext.php?oid=-{GROUP_ID}&id={id}"),
        "date": BASE_DATE + offset
    })
}

pub fn comment_record(id: i64, from_id: i64, offset: i64) -> Value {
    json!({
        "id": id,
        "from_id": from_id,
        "date": BASE_DATE + offset,
        "text": format!("Comment {id}"),
        "likes": {"count": 0, "can_like": 1, "user_likes": 0}
    })
}
