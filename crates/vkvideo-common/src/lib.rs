//! Vkvideo-Common: Shared types, id codecs, and errors.
//!
//! This crate provides the pieces shared by the database layer and the
//! remote mirror:
//!
//! - **Typed IDs**: Remote id wrappers for users, groups, albums, and videos
//! - **Owner codec**: The API's signed owner convention ([`OwnerId`])
//! - **Composite keys**: `"<owner>_<local>"` identifiers ([`CompositeId`])
//! - **Core Types**: [`Actor`], [`SortOrder`], and the comment lifecycle
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use vkvideo_common::{Actor, CompositeId, GroupId, OwnerId};
//!
//! let owner = Actor::Group(GroupId::new(16297716)).owner_id();
//! assert_eq!(owner, OwnerId::new(-16297716));
//!
//! let key = CompositeId::normalize(owner, "811").unwrap();
//! assert_eq!(key.to_string(), "-16297716_811");
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
