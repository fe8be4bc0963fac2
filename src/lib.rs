//! Vkvideo - Local mirror of VKontakte video albums, videos, and comments
//!
//! This library crate exposes the transport, fetch engine, and mirror
//! operations used by the `vkvideo` binary and the integration tests.

pub mod api;
pub mod config;
pub mod mirror;
pub mod remote;
