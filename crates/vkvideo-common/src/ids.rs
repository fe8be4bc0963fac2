//! Remote identifiers and the two id codecs of the API.
//!
//! Every entity is keyed by the id the remote API assigned to it. Users and
//! groups share one signed namespace when they appear as owners ([`OwnerId`]),
//! and owner-scoped objects such as comments are addressed by a composite
//! `"<owner>_<local>"` key ([`CompositeId`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Actor;

/// Separator between the owner and local parts of a [`CompositeId`].
pub const COMPOSITE_SEPARATOR: char = '_';

macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw remote id.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// The raw remote id.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

remote_id!(
    /// Remote id of a user (always positive).
    UserId
);
remote_id!(
    /// Remote id of a group/community (always positive, unsigned form).
    GroupId
);
remote_id!(
    /// Remote id of a video album.
    AlbumId
);
remote_id!(
    /// Remote id of a video.
    VideoId
);

/// Owner id in the API's signed convention: positive is a user, negative is
/// a group. Zero never names an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Wrap a signed owner id as received from the API.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The signed value sent to and received from the API.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Decode into the actor this id names.
    ///
    /// Fails with [`Error::InvalidInput`] for zero.
    pub fn actor(self) -> Result<Actor> {
        match self.0 {
            id if id > 0 => Ok(Actor::User(UserId::new(id))),
            id if id < 0 => id
                .checked_neg()
                .map(|abs| Actor::Group(GroupId::new(abs)))
                .ok_or_else(|| Error::invalid_input(format!("owner id {id} is out of range"))),
            _ => Err(Error::invalid_input("owner id 0 names neither a user nor a group")),
        }
    }
}

impl From<Actor> for OwnerId {
    fn from(actor: Actor) -> Self {
        actor.owner_id()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::invalid_input(format!("invalid owner id: {s:?}")))?;
        if id == 0 {
            return Err(Error::invalid_input("owner id 0 names neither a user nor a group"));
        }
        Ok(Self(id))
    }
}

/// Two-part remote key `"<owner>_<local>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeId {
    pub owner: OwnerId,
    pub local: i64,
}

impl CompositeId {
    #[must_use]
    pub const fn new(owner: OwnerId, local: i64) -> Self {
        Self { owner, local }
    }

    /// Build a key from a raw id that may or may not already carry its owner.
    ///
    /// A raw id containing the separator is parsed as-is and never prefixed
    /// twice; a bare numeric id is prefixed with `owner`.
    pub fn normalize(owner: OwnerId, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.contains(COMPOSITE_SEPARATOR) {
            return raw.parse();
        }
        let local = raw
            .parse()
            .map_err(|_| Error::invalid_input(format!("invalid local id: {raw:?}")))?;
        Ok(Self::new(owner, local))
    }

    /// The short numeric part, as the API's edit/delete methods expect it.
    #[must_use]
    pub const fn short(&self) -> i64 {
        self.local
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.owner, COMPOSITE_SEPARATOR, self.local)
    }
}

impl FromStr for CompositeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (owner, local) = s
            .trim()
            .split_once(COMPOSITE_SEPARATOR)
            .ok_or_else(|| Error::invalid_input(format!("not a composite id: {s:?}")))?;
        let owner: OwnerId = owner.parse()?;
        let local = local
            .parse()
            .map_err(|_| Error::invalid_input(format!("invalid local id in {s:?}")))?;
        Ok(Self::new(owner, local))
    }
}

impl Serialize for CompositeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompositeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_sign_round_trip() {
        for raw in [1, 27224390, -1, -16297716, i64::MAX, -i64::MAX] {
            let owner = OwnerId::new(raw);
            let actor = owner.actor().unwrap();
            assert_eq!(actor.owner_id(), owner);
        }
    }

    #[test]
    fn test_owner_sign_decodes_kind() {
        assert_eq!(
            OwnerId::new(27224390).actor().unwrap(),
            Actor::User(UserId::new(27224390))
        );
        assert_eq!(
            OwnerId::new(-16297716).actor().unwrap(),
            Actor::Group(GroupId::new(16297716))
        );
    }

    #[test]
    fn test_owner_zero_is_invalid() {
        let err = OwnerId::new(0).actor().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!("0".parse::<OwnerId>().is_err());
    }

    #[test]
    fn test_composite_round_trip() {
        let id = CompositeId::new(OwnerId::new(-16297716), 811);
        assert_eq!(id.to_string(), "-16297716_811");

        let parsed: CompositeId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.owner, OwnerId::new(-16297716));
        assert_eq!(parsed.short(), 811);
    }

    #[test]
    fn test_normalize_prefixes_bare_id() {
        let id = CompositeId::normalize(OwnerId::new(4), "811").unwrap();
        assert_eq!(id.to_string(), "4_811");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let owner = OwnerId::new(-16297716);
        let once = CompositeId::normalize(owner, "811").unwrap();
        let twice = CompositeId::normalize(owner, &once.to_string()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_keeps_existing_owner() {
        let id = CompositeId::normalize(OwnerId::new(7), "-5_3").unwrap();
        assert_eq!(id, CompositeId::new(OwnerId::new(-5), 3));
    }

    #[test]
    fn test_composite_rejects_garbage() {
        assert!("811".parse::<CompositeId>().is_err());
        assert!("a_b".parse::<CompositeId>().is_err());
        assert!("0_5".parse::<CompositeId>().is_err());
        assert!(CompositeId::normalize(OwnerId::new(1), "abc").is_err());
    }

    #[test]
    fn test_composite_serialization() {
        let id = CompositeId::new(OwnerId::new(-1), 2);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"-1_2\"");
        let back: CompositeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_remote_id_display() {
        assert_eq!(AlbumId::new(50850761).to_string(), "50850761");
        assert_eq!(i64::from(VideoId::new(166742757)), 166742757);
    }
}
