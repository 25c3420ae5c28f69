use std::fs;
use std::io;
use std::path::Path;
use std::process;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use chirp_client::feed::{Feed, Notification};
use chirp_client::poller::{
    DEFAULT_POLL_INTERVAL, FeedEvent, FeedPoller, PollMode, PollerControl,
};
use chirp_client::{AuthResponse, ChirpClient, ChirpClientError, Post, RecordCounts};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const TOKEN_FILE: &str = ".chirp_token";
const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";
const SERVER_ENV: &str = "CHIRP_SERVER";
const ADMIN_PASSWORD_ENV: &str = "CHIRP_ADMIN_PASSWORD";
const MAX_POST_CHARS: usize = 280;

#[derive(Debug, Parser)]
#[command(name = "chirp-cli", version, about = "Command-line client for chirp-server")]
struct Cli {
    /// Server address. Defaults to $CHIRP_SERVER, then http://127.0.0.1:3000.
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in with a username or an email.
    Login {
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session.
    Logout,
    /// Publish a post (requires a session).
    Post {
        #[arg(long)]
        content: String,
    },
    /// Replace the content of one of your posts.
    Edit {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        content: String,
    },
    /// Delete one of your posts.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Print the feed, newest first.
    List {
        /// Print raw JSON instead of a listing.
        #[arg(long)]
        json: bool,
    },
    /// Follow the feed until Ctrl-C.
    Watch {
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
        interval_secs: u64,
    },
    /// Password-gated maintenance.
    Admin {
        /// Falls back to $CHIRP_ADMIN_PASSWORD.
        #[arg(long)]
        admin_password: Option<String>,

        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    /// Record counts.
    Stats,
    /// All registered users.
    Users,
    /// Delete a user with their posts and sessions.
    DeleteUser {
        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = cli
        .server
        .or_else(|| std::env::var(SERVER_ENV).ok())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    let mut client = ChirpClient::new(normalize_server(server)).map_err(map_client_error)?;

    if let Some(token) = load_token().context("failed to read .chirp_token")? {
        client.set_token(token);
    }

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client
                .register(&username, &email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("failed to save session token")?;
            print_auth(&auth);
        }
        Command::Login { user, password } => {
            let auth = client
                .login(&user, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("failed to save session token")?;
            print_auth(&auth);
        }
        Command::Logout => {
            let result = client.logout().await;
            remove_token().context("failed to remove .chirp_token")?;
            result.map_err(map_client_error)?;
            println!("logged out");
        }
        Command::Post { content } => {
            let content = validate_content(&content)?;
            let post = client
                .create_post(content)
                .await
                .map_err(map_client_error)?;
            print_post(&post);
        }
        Command::Edit { id, content } => {
            let content = validate_content(&content)?;
            let post = client
                .update_post(id, content)
                .await
                .map_err(map_client_error)?;
            print_post(&post);
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("deleted post {id}");
        }
        Command::List { json } => {
            let posts = client.list_posts().await.map_err(map_client_error)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                print_feed(&posts);
            }
        }
        Command::Watch { interval_secs } => {
            if interval_secs == 0 {
                bail!("--interval-secs must be positive");
            }
            watch(client, Duration::from_secs(interval_secs)).await?;
        }
        Command::Admin {
            admin_password,
            command,
        } => {
            let admin_password = admin_password
                .or_else(|| std::env::var(ADMIN_PASSWORD_ENV).ok())
                .ok_or_else(|| {
                    anyhow!("admin password required: pass --admin-password or set {ADMIN_PASSWORD_ENV}")
                })?;
            run_admin(&client, &admin_password, command).await?;
        }
    }

    Ok(())
}

async fn run_admin(client: &ChirpClient, admin_password: &str, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Stats => {
            let stats = client
                .admin_stats(admin_password)
                .await
                .map_err(map_client_error)?;
            print_counts("totals", &stats);
        }
        AdminCommand::Users => {
            let users = client
                .admin_list_users(admin_password)
                .await
                .map_err(map_client_error)?;
            println!("{} users", users.len());
            for user in &users {
                println!(
                    "- [{}] {} <{}> since {}",
                    user.id,
                    user.username,
                    user.email,
                    user.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        AdminCommand::DeleteUser { id } => {
            let action = client
                .admin_delete_user(admin_password, id)
                .await
                .map_err(map_client_error)?;
            println!("{}", action.message);
            print_counts("removed", &action.removed);
        }
    }
    Ok(())
}

/// Polls until Ctrl-C, re-rendering the whole feed whenever it changes.
async fn watch(client: ChirpClient, interval: Duration) -> Result<()> {
    if client.token().is_none() {
        return Err(map_client_error(ChirpClientError::Unauthorized));
    }

    init_tracing();

    let control = PollerControl::new();
    let (tx, mut rx) = mpsc::channel(16);
    let poller = tokio::spawn(FeedPoller::new(client, interval, &control, tx).run());
    control.enter_main_view();

    let mut feed = Feed::new();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(FeedEvent::Fetched(posts)) => {
                    let Some(update) = feed.reconcile(posts) else {
                        continue;
                    };
                    print_feed(feed.posts());
                    if let Some(notification) = Notification::for_update(&update, Instant::now()) {
                        println!(">> {}", notification.message());
                    }
                }
                Some(FeedEvent::ModeChanged(mode)) => {
                    debug!(?mode, "poller mode changed");
                    if mode == PollMode::Polling {
                        println!("watching feed every {}s, Ctrl-C to stop", interval.as_secs());
                    }
                }
                None => break,
            },
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    control.logout();
    drop(control);
    poller.await.context("feed poller task failed")?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

fn validate_content(raw: &str) -> Result<&str> {
    let content = raw.trim();
    if content.is_empty() {
        bail!("post content must not be empty");
    }
    let chars = content.chars().count();
    if chars > MAX_POST_CHARS {
        bail!("post is {chars} characters, the limit is {MAX_POST_CHARS}");
    }
    Ok(content)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &ChirpClient) -> io::Result<()> {
    if let Some(token) = client.token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn remove_token() -> io::Result<()> {
    match fs::remove_file(TOKEN_FILE) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn map_client_error(err: ChirpClientError) -> anyhow::Error {
    let message = match err {
        ChirpClientError::Unauthorized => {
            "not signed in: run `chirp-cli login ...` or `chirp-cli register ...`".to_string()
        }
        ChirpClientError::Forbidden => "you can only change your own posts".to_string(),
        ChirpClientError::NotFound => "not found".to_string(),
        ChirpClientError::InvalidRequest(message) => format!("rejected: {message}"),
        ChirpClientError::Http(err) => format!("http error: {err}"),
    };
    anyhow!(message)
}

fn print_auth(auth: &AuthResponse) {
    println!("{}", auth.message);
    println!("signed in as {}", auth.username);
}

fn print_post(post: &Post) {
    println!("[{}] @{}: {}", post.id, post.username, post.content);
    println!("  posted {}", post.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(edited_at) = post.edited_at {
        println!("  edited {}", edited_at.format("%Y-%m-%d %H:%M:%S"));
    }
}

fn print_feed(posts: &[Post]) {
    println!("{} posts", posts.len());
    for post in posts {
        let edited = if post.edited { " (edited)" } else { "" };
        println!(
            "- [{}] @{} {}{}: {}",
            post.id,
            post.username,
            post.created_at.format("%H:%M"),
            edited,
            post.content
        );
    }
}

fn print_counts(title: &str, counts: &RecordCounts) {
    println!(
        "{title}: users={}, posts={}, sessions={}",
        counts.users, counts.posts, counts.sessions
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://example.com:3000".to_string());
        assert_eq!(s, "https://example.com:3000");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:3000".to_string());
        assert_eq!(s, "http://127.0.0.1:3000");
    }

    #[test]
    fn parse_token_content_trims_and_rejects_blank() {
        assert_eq!(parse_token_content("  abc\n"), Some("abc".to_string()));
        assert_eq!(parse_token_content(" \n"), None);
    }

    #[test]
    fn content_is_trimmed() {
        assert_eq!(validate_content("  hello ").expect("valid"), "hello");
    }

    #[test]
    fn blank_content_is_rejected() {
        validate_content("   ").expect_err("blank");
    }

    #[test]
    fn content_limit_counts_characters_not_bytes() {
        let at_limit = "é".repeat(MAX_POST_CHARS);
        validate_content(&at_limit).expect("280 chars allowed");

        let over = "a".repeat(MAX_POST_CHARS + 1);
        validate_content(&over).expect_err("281 chars rejected");
    }

    #[test]
    fn cli_parses_watch_interval() {
        let cli = Cli::try_parse_from(["chirp-cli", "watch", "--interval-secs", "5"]).expect("parse");
        match cli.command {
            Command::Watch { interval_secs } => assert_eq!(interval_secs, 5),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
