use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vkvideo::remote::FetchOptions;
use vkvideo_common::{CompositeId, OwnerId, SortOrder};

#[derive(Parser)]
#[command(name = "vkvideo")]
#[command(author, version, about = "Mirror VKontakte video albums, videos, and comments")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Page and time window shared by the fetch commands.
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Page size
    #[arg(long)]
    pub count: Option<u32>,

    /// Records to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Fetch every page
    #[arg(long)]
    pub all: bool,

    /// Only records dated at or after this RFC 3339 instant
    #[arg(long)]
    pub after: Option<DateTime<Utc>>,

    /// Only records dated at or before this RFC 3339 instant (needs --after)
    #[arg(long)]
    pub before: Option<DateTime<Utc>>,
}

impl WindowArgs {
    pub fn options(&self, sort: Option<SortOrder>) -> FetchOptions {
        FetchOptions {
            count: self.count,
            offset: self.offset,
            all: self.all,
            after: self.after,
            before: self.before,
            sort,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the video albums of a user or group
    Albums {
        /// Owning user id
        #[arg(long, conflicts_with = "group")]
        user: Option<i64>,

        /// Owning group id (positive)
        #[arg(long)]
        group: Option<i64>,

        /// Only these album ids
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Fetch videos of a mirrored album, a user, or a group
    Videos {
        /// Mirrored album id
        #[arg(long)]
        album: Option<i64>,

        /// Owning user id
        #[arg(long, conflicts_with = "group")]
        user: Option<i64>,

        /// Owning group id (positive)
        #[arg(long)]
        group: Option<i64>,

        /// Only these video ids
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Fetch comments of a mirrored video
    Comments {
        /// Mirrored video id
        video: i64,

        /// Also fetch like counts
        #[arg(long)]
        need_likes: bool,

        /// Chronological order (asc or desc)
        #[arg(long)]
        sort: Option<SortOrder>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Fetch users who liked a mirrored video
    Likes {
        /// Mirrored video id
        video: i64,

        /// Page size (up to 1000)
        #[arg(long)]
        count: Option<u32>,

        /// Records to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Fetch every page
        #[arg(long)]
        all: bool,
    },

    /// Create, edit, delete, or restore a comment
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// Post a comment on a mirrored video
    Create {
        /// Mirrored video id
        video: i64,

        /// Author as a signed owner id (negative for the owning group)
        #[arg(long, allow_hyphen_values = true)]
        author: OwnerId,

        /// Comment text
        #[arg(long)]
        text: String,
    },

    /// Replace the text of a mirrored comment
    Edit {
        /// Comment id as `<owner>_<id>`
        #[arg(allow_hyphen_values = true)]
        comment: CompositeId,

        /// New text
        #[arg(long)]
        text: String,
    },

    /// Delete a mirrored comment (kept locally as archived)
    Delete {
        /// Comment id as `<owner>_<id>`
        #[arg(allow_hyphen_values = true)]
        comment: CompositeId,
    },

    /// Restore a deleted comment
    Restore {
        /// Comment id as `<owner>_<id>`
        #[arg(allow_hyphen_values = true)]
        comment: CompositeId,
    },
}
