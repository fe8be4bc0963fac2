//! Core type definitions shared by the store and the mirror.
//!
//! Enums serialize in lowercase, matching the strings the remote API and the
//! database use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::ids::{GroupId, OwnerId, UserId};

/// The owner or author of an album, video, or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Actor {
    /// A user profile.
    User(UserId),
    /// A group, public page, or event.
    Group(GroupId),
}

impl Actor {
    /// Encode into the API's signed owner convention.
    ///
    /// Only meaningful for positive ids; see [`Actor::validate`].
    #[must_use]
    pub fn owner_id(&self) -> OwnerId {
        match self {
            Self::User(id) => OwnerId::new(id.get()),
            Self::Group(id) => OwnerId::new(id.get().saturating_neg()),
        }
    }

    /// Reject actors whose id is zero or negative.
    ///
    /// The sign of an owner id carries the user/group distinction, so a
    /// non-positive id would encode to the wrong kind of owner.
    pub fn validate(self) -> Result<Self> {
        let raw = match self {
            Self::User(id) => id.get(),
            Self::Group(id) => id.get(),
        };
        if raw <= 0 {
            return Err(Error::invalid_input(format!(
                "{self} is not a valid owner: ids must be positive"
            )));
        }
        Ok(self)
    }

    #[must_use]
    pub fn as_group(&self) -> Option<GroupId> {
        match self {
            Self::Group(id) => Some(*id),
            Self::User(_) => None,
        }
    }

    #[must_use]
    pub fn as_user(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Group(_) => None,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {id}"),
            Self::Group(id) => write!(f, "group {id}"),
        }
    }
}

/// Chronological order of a comment listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first. The API's default.
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order: {other} (expected asc or desc)")),
        }
    }
}

/// Lifecycle of a mirrored comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentState {
    /// Not yet created, no local row.
    Absent,
    /// Visible remotely, stored locally.
    Active,
    /// Deleted remotely, local row kept so it can be restored.
    Archived,
}

/// Mutation pushed to the remote API for a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentOp {
    Create,
    Update,
    Delete,
    Restore,
}

impl fmt::Display for CommentOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Restore => write!(f, "restore"),
        }
    }
}

impl CommentState {
    /// State reached by applying `op`, or [`Error::InvalidState`] when `op`
    /// is not legal from here.
    ///
    /// ```text
    /// Absent   --create-->  Active
    /// Active   --update-->  Active
    /// Active   --delete-->  Archived
    /// Archived --restore--> Active
    /// ```
    pub fn apply(self, op: CommentOp) -> Result<Self> {
        match (self, op) {
            (Self::Absent, CommentOp::Create) => Ok(Self::Active),
            (Self::Active, CommentOp::Update) => Ok(Self::Active),
            (Self::Active, CommentOp::Delete) => Ok(Self::Archived),
            (Self::Archived, CommentOp::Restore) => Ok(Self::Active),
            (state, op) => Err(Error::invalid_state(format!(
                "cannot {op} a comment that is {state}"
            ))),
        }
    }

    #[must_use]
    pub fn is_archived(self) -> bool {
        self == Self::Archived
    }
}

impl fmt::Display for CommentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_owner_id() {
        assert_eq!(Actor::User(UserId::new(5)).owner_id(), OwnerId::new(5));
        assert_eq!(Actor::Group(GroupId::new(5)).owner_id(), OwnerId::new(-5));
    }

    #[test]
    fn test_actor_validate() {
        assert!(Actor::User(UserId::new(1)).validate().is_ok());
        assert!(Actor::Group(GroupId::new(16297716)).validate().is_ok());

        for actor in [
            Actor::User(UserId::new(0)),
            Actor::User(UserId::new(-3)),
            Actor::Group(GroupId::new(0)),
            Actor::Group(GroupId::new(-5)),
            Actor::Group(GroupId::new(i64::MIN)),
        ] {
            let err = actor.validate().unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{actor}");
        }
    }

    #[test]
    fn test_owner_id_of_min_group_does_not_overflow() {
        let owner = Actor::Group(GroupId::new(i64::MIN)).owner_id();
        assert_eq!(owner, OwnerId::new(i64::MAX));
    }

    #[test]
    fn test_actor_accessors() {
        let group = Actor::Group(GroupId::new(9));
        assert_eq!(group.as_group(), Some(GroupId::new(9)));
        assert_eq!(group.as_user(), None);
    }

    #[test]
    fn test_actor_serialization() {
        let actor = Actor::Group(GroupId::new(16297716));
        let json = serde_json::to_string(&actor).unwrap();
        assert_eq!(json, r#"{"kind":"group","id":16297716}"#);
        let back: Actor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, actor);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default(), SortOrder::Asc);
        assert_eq!(SortOrder::Desc.to_string(), "desc");
    }

    #[test]
    fn test_comment_legal_transitions() {
        let state = CommentState::Absent.apply(CommentOp::Create).unwrap();
        assert_eq!(state, CommentState::Active);
        let state = state.apply(CommentOp::Update).unwrap();
        assert_eq!(state, CommentState::Active);
        let state = state.apply(CommentOp::Delete).unwrap();
        assert!(state.is_archived());
        let state = state.apply(CommentOp::Restore).unwrap();
        assert_eq!(state, CommentState::Active);
    }

    #[test]
    fn test_comment_illegal_transitions() {
        let illegal = [
            (CommentState::Absent, CommentOp::Update),
            (CommentState::Absent, CommentOp::Delete),
            (CommentState::Absent, CommentOp::Restore),
            (CommentState::Active, CommentOp::Create),
            (CommentState::Active, CommentOp::Restore),
            (CommentState::Archived, CommentOp::Create),
            (CommentState::Archived, CommentOp::Update),
            (CommentState::Archived, CommentOp::Delete),
        ];
        for (state, op) in illegal {
            let err = state.apply(op).unwrap_err();
            assert!(matches!(err, Error::InvalidState(_)), "{state} + {op}");
        }
    }
}
