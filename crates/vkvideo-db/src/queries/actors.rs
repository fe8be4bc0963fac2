//! User and group queries.
//!
//! Actors are owned by the wider application; this module only guarantees a
//! row exists for every remote id an album, video, or comment points at.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use vkvideo_common::{Actor, Error, GroupId, OwnerId, Result, UserId};

use super::{format_timestamp, parse_timestamp};
use crate::models::{Group, User};

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId::new(row.get(0)?),
        name: row.get(1)?,
        screen_name: row.get(2)?,
        created_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}

fn row_to_group(row: &Row) -> rusqlite::Result<Group> {
    Ok(Group {
        id: GroupId::new(row.get(0)?),
        name: row.get(1)?,
        screen_name: row.get(2)?,
        created_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}

/// Get a user by remote id.
pub fn get_user(conn: &Connection, id: UserId) -> Result<Option<User>> {
    conn.query_row(
        "SELECT remote_id, name, screen_name, created_at FROM users WHERE remote_id = ?",
        [id.get()],
        row_to_user,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Get a group by remote id (unsigned form).
pub fn get_group(conn: &Connection, id: GroupId) -> Result<Option<Group>> {
    conn.query_row(
        "SELECT remote_id, name, screen_name, created_at FROM groups WHERE remote_id = ?",
        [id.get()],
        row_to_group,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Get the user with this remote id, creating a bare row when missing.
pub fn get_or_create_user(conn: &Connection, id: UserId) -> Result<User> {
    if id.get() <= 0 {
        return Err(Error::invalid_input(format!("invalid user id: {id}")));
    }
    conn.execute(
        "INSERT OR IGNORE INTO users (remote_id, created_at) VALUES (?, ?)",
        rusqlite::params![id.get(), format_timestamp(&Utc::now())],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    get_user(conn, id)?.ok_or_else(|| Error::not_found(format!("user {id}")))
}

/// Get the group with this remote id, creating a bare row when missing.
pub fn get_or_create_group(conn: &Connection, id: GroupId) -> Result<Group> {
    if id.get() <= 0 {
        return Err(Error::invalid_input(format!("invalid group id: {id}")));
    }
    conn.execute(
        "INSERT OR IGNORE INTO groups (remote_id, created_at) VALUES (?, ?)",
        rusqlite::params![id.get(), format_timestamp(&Utc::now())],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    get_group(conn, id)?.ok_or_else(|| Error::not_found(format!("group {id}")))
}

/// Make sure a local row exists for `actor`.
pub fn ensure_actor(conn: &Connection, actor: Actor) -> Result<()> {
    match actor {
        Actor::User(id) => get_or_create_user(conn, id).map(|_| ()),
        Actor::Group(id) => get_or_create_group(conn, id).map(|_| ()),
    }
}

/// Decode a signed owner id and get-or-create the actor it names.
///
/// Zero fails with [`Error::InvalidInput`].
pub fn resolve_owner(conn: &Connection, owner: OwnerId) -> Result<Actor> {
    let actor = owner.actor()?;
    ensure_actor(conn, actor)?;
    Ok(actor)
}

/// Set display fields of a user.
pub fn update_user_profile(
    conn: &Connection,
    id: UserId,
    name: Option<&str>,
    screen_name: Option<&str>,
) -> Result<()> {
    let rows = conn
        .execute(
            "UPDATE users SET name = ?, screen_name = ? WHERE remote_id = ?",
            rusqlite::params![name, screen_name, id.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    if rows == 0 {
        return Err(Error::not_found(format!("user {id}")));
    }
    Ok(())
}

/// Count mirrored users.
pub fn count_users(conn: &Connection) -> Result<u32> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}
