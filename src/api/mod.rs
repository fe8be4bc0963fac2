//! Remote API transport.
//!
//! The rest of the crate talks to VKontakte only through the [`VkApi`]
//! trait: a method name plus a flat parameter map in, the decoded
//! `response` payload out. [`HttpVkApi`] is the production implementation.

mod client;

pub use client::{decode_envelope, HttpVkApi};

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use vkvideo_common::Result;

/// Flat request parameters. Values are already in wire form: booleans are
/// sent as `1`/`0`, lists are comma-joined by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to the string form of `value`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    /// Set `key` to `1` or `0`.
    pub fn set_flag(&mut self, key: &str, value: bool) -> &mut Self {
        self.set(key, u8::from(value))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Transport to the remote social-graph API.
///
/// Implementations return the unwrapped `response` payload and map the
/// API's error envelope to [`vkvideo_common::Error::Api`] without retrying.
#[async_trait]
pub trait VkApi: Send + Sync {
    /// Invoke `method` (e.g. `"video.get"`) with `params`.
    async fn call(&self, method: &str, params: &Params) -> Result<Value>;
}
