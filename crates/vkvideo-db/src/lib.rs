//! Vkvideo-DB: Database schema, migrations, and query operations
//!
//! Local mirror of remote video albums, videos, comments, and the actors
//! that own them, stored in SQLite through rusqlite with r2d2 pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use vkvideo_db::pool::{init_pool, get_conn};
//! use vkvideo_db::queries::albums;
//! use vkvideo_common::{Actor, GroupId};
//!
//! let pool = init_pool("vkvideo.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let owned = albums::list_albums_by_owner(&conn, Actor::Group(GroupId::new(16297716))).unwrap();
//! println!("{} albums", owned.len());
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
