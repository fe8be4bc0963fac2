mod cli;

use vkvideo::{
    api::HttpVkApi,
    config,
    mirror::{albums, comments, likes, videos},
    remote::FetchOptions,
};
use vkvideo_common::{Actor, AlbumId, CompositeId, GroupId, OwnerId, UserId, VideoId};
use vkvideo_db::models::{Comment, Video};
use vkvideo_db::pool::{get_conn, init_pool, DbPool};
use vkvideo_db::queries;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, CommentAction, Commands};
use std::path::Path;

/// API client and database opened from the loaded config.
struct Mirror {
    api: HttpVkApi,
    pool: DbPool,
}

impl Mirror {
    fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = config::load_config_or_default(config_path)?;

        let db_path = config.database.path.to_string_lossy();
        tracing::info!("Opening database at {}", db_path);
        let pool = init_pool(&db_path)?;
        let api = HttpVkApi::new(&config.api)?;

        Ok(Self { api, pool })
    }

    fn video(&self, id: i64) -> Result<Video> {
        let conn = get_conn(&self.pool)?;
        queries::videos::get_video(&conn, VideoId::new(id))?.with_context(|| {
            format!("Video {} is not mirrored; fetch it with `vkvideo videos` first", id)
        })
    }

    fn comment(&self, id: &CompositeId) -> Result<Comment> {
        let conn = get_conn(&self.pool)?;
        queries::comments::get_comment(&conn, id)?
            .with_context(|| format!("Comment {} is not mirrored", id))
    }
}

fn owner(user: Option<i64>, group: Option<i64>) -> (Option<UserId>, Option<GroupId>) {
    (user.map(UserId::new), group.map(GroupId::new))
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Albums {
            user,
            group,
            ids,
            window,
        } => {
            let mirror = Mirror::open(config_path)?;
            let (user, group) = owner(user, group);
            let request = albums::AlbumFetch {
                user,
                group,
                ids: ids.into_iter().map(AlbumId::new).collect(),
                options: window.options(None),
            };

            let conn = get_conn(&mirror.pool)?;
            let fetched = albums::fetch_albums(&mirror.api, &conn, &request).await?;
            for album in &fetched {
                println!("{}\t{}\t{} videos", album.id, album.title, album.videos_count);
            }
            println!("Fetched {} albums", fetched.len());
        }
        Commands::Videos {
            album,
            user,
            group,
            ids,
            window,
        } => {
            let mirror = Mirror::open(config_path)?;
            let conn = get_conn(&mirror.pool)?;
            let ids: Vec<VideoId> = ids.into_iter().map(VideoId::new).collect();

            let fetched = match album {
                Some(album_id) => {
                    let mut album = queries::albums::get_album(&conn, AlbumId::new(album_id))?
                        .with_context(|| {
                            format!(
                                "Album {} is not mirrored; fetch it with `vkvideo albums` first",
                                album_id
                            )
                        })?;
                    if ids.is_empty() {
                        videos::fetch_album_videos(
                            &mirror.api,
                            &conn,
                            &mut album,
                            window.options(None),
                        )
                        .await?
                    } else {
                        let request = videos::VideoFetch {
                            ids,
                            options: window.options(None),
                            ..videos::VideoFetch::for_album(&album)
                        };
                        videos::fetch_videos(&mirror.api, &conn, &request).await?
                    }
                }
                None => {
                    let (user, group) = owner(user, group);
                    let request = videos::VideoFetch {
                        album: None,
                        user,
                        group,
                        ids,
                        options: window.options(None),
                    };
                    videos::fetch_videos(&mirror.api, &conn, &request).await?
                }
            };

            for video in &fetched {
                println!("{}\t{}\t{}", video.id, video.title, video.link());
            }
            println!("Fetched {} videos", fetched.len());
        }
        Commands::Comments {
            video,
            need_likes,
            sort,
            window,
        } => {
            let mirror = Mirror::open(config_path)?;
            let video = mirror.video(video)?;
            let request = comments::CommentFetch {
                options: window.options(sort),
                need_likes,
            };

            let conn = get_conn(&mirror.pool)?;
            let fetched =
                comments::fetch_video_comments(&mirror.api, &conn, &video, &request).await?;
            for comment in &fetched {
                println!("{}\t{}\t{}", comment.id, comment.author, comment.text);
            }
            println!("Fetched {} comments", fetched.len());
        }
        Commands::Likes {
            video,
            count,
            offset,
            all,
        } => {
            let mirror = Mirror::open(config_path)?;
            let mut video = mirror.video(video)?;
            let options = FetchOptions {
                count,
                offset,
                all,
                ..FetchOptions::default()
            };

            let conn = get_conn(&mirror.pool)?;
            let users = likes::fetch_video_likes(&mirror.api, &conn, &mut video, &options).await?;
            println!(
                "Fetched {} users; video {} has {} likes",
                users.len(),
                video.id,
                video.likes_count
            );
        }
        Commands::Comment { action } => {
            let mirror = Mirror::open(config_path)?;
            run_comment_action(&mirror, action).await?;
        }
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or(cli.config);
            validate_config(path.as_deref())?;
        }
        Commands::Version => {
            println!("vkvideo {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

async fn run_comment_action(mirror: &Mirror, action: CommentAction) -> Result<()> {
    let conn = get_conn(&mirror.pool)?;

    match action {
        CommentAction::Create {
            video,
            author,
            text,
        } => {
            let video = mirror.video(video)?;
            let author = resolve_author(author)?;
            let comment =
                comments::create_comment(&mirror.api, &conn, &video, author, &text).await?;
            println!("Created comment {}", comment.id);
        }
        CommentAction::Edit { comment, text } => {
            let mut comment = mirror.comment(&comment)?;
            comments::update_comment(&mirror.api, &conn, &mut comment, &text).await?;
            println!("Updated comment {}", comment.id);
        }
        CommentAction::Delete { comment } => {
            let mut comment = mirror.comment(&comment)?;
            comments::delete_comment(&mirror.api, &conn, &mut comment).await?;
            println!("Deleted comment {} (archived locally)", comment.id);
        }
        CommentAction::Restore { comment } => {
            let mut comment = mirror.comment(&comment)?;
            comments::restore_comment(&mirror.api, &conn, &mut comment).await?;
            println!("Restored comment {}", comment.id);
        }
    }

    Ok(())
}

fn resolve_author(author: OwnerId) -> Result<Actor> {
    author
        .actor()
        .with_context(|| format!("Invalid comment author: {}", author))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vkvideo=trace,vkvideo_db=debug,vkvideo_common=debug,reqwest=debug".to_string()
        } else {
            "vkvideo=info,vkvideo_db=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli))
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  API: {} (v{})", config.api.base_url, config.api.version);
            println!(
                "  Access token: {}",
                if config.api.access_token.is_some() {
                    "set"
                } else {
                    "not set"
                }
            );
            println!("  Rate limit: {} requests/s", config.api.requests_per_second);
            println!("  Database: {:?}", config.database.path);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  API: {} (v{})", config.api.base_url, config.api.version);
            println!("  Database: {:?}", config.database.path);
        }
    }

    Ok(())
}
