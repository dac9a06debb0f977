//! Folio CLI - Command-line interface for Folio CMS

mod session_store;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use folio_sdk::{
    ContentField, ContentInput, ContentPatch, ContentQuery, FolioClient, LogQuery, MediaQuery,
    RegisterRequest, SdkError, SettingInput,
};
use serde_json::Value;
use session_store::SessionStore;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

const DEFAULT_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CMS CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server URL
    #[arg(long, env = "FOLIO_URL", default_value = DEFAULT_URL, global = true)]
    url: String,

    /// Session file (defaults to the user config directory)
    #[arg(long, env = "FOLIO_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "FOLIO_PASSWORD")]
        password: String,
    },

    /// Revoke the stored session
    Logout {
        /// Sign out on every device
        #[arg(long)]
        all: bool,
    },

    /// Show the logged-in user
    Whoami,

    /// Register a user (first user becomes super-admin)
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "FOLIO_PASSWORD")]
        password: String,

        /// admin | editor | super-admin
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Manage content entries
    #[command(subcommand)]
    Content(ContentCommand),

    /// Manage uploaded media
    #[command(subcommand)]
    Media(MediaCommand),

    /// Manage site settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Query the activity log
    Logs {
        /// Action filter (e.g., LOGIN_SUCCESS)
        #[arg(short, long)]
        action: Option<String>,

        /// Free-text search over email, path and resource
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(short = 'n', long, default_value = "20")]
        limit: u32,
    },

    /// Show public site statistics
    Stats,
}

#[derive(Subcommand)]
enum ContentCommand {
    /// List entries of a content type
    List {
        content_type: String,

        #[arg(long)]
        status: Option<String>,

        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(short = 'n', long, default_value = "10")]
        limit: u32,
    },

    /// Show one entry as JSON
    Get { content_type: String, id: String },

    /// Create an entry
    Create {
        content_type: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Field as key=value (repeatable)
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<ContentField>,

        /// Publish immediately instead of saving a draft
        #[arg(long)]
        publish: bool,
    },

    /// Publish a draft
    Publish { content_type: String, id: String },

    /// Delete an entry
    Delete { content_type: String, id: String },
}

#[derive(Subcommand)]
enum MediaCommand {
    /// Upload a file
    Upload { path: PathBuf },

    /// List uploaded files
    List {
        /// MIME prefix filter (e.g., image)
        #[arg(short, long)]
        mime_type: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(short = 'n', long, default_value = "20")]
        limit: u32,
    },

    /// Delete a file
    Delete { id: String },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// List settings
    List {
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Create or update a setting (value is parsed as JSON when possible)
    Set {
        key: String,
        value: String,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Tabled)]
struct ContentRow {
    id: String,
    title: String,
    slug: String,
    status: String,
}

#[derive(Tabled)]
struct MediaRow {
    id: String,
    name: String,
    #[tabled(rename = "type")]
    mime_type: String,
    size: String,
    url: String,
}

#[derive(Tabled)]
struct SettingRow {
    key: String,
    value: String,
    category: String,
}

#[derive(Tabled)]
struct LogRow {
    action: String,
    user: String,
    request: String,
    status: u16,
    #[tabled(rename = "ms")]
    duration: String,
}

fn parse_field(raw: &str) -> Result<ContentField, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.trim().is_empty() {
        return Err("field key must not be empty".to_string());
    }
    Ok(ContentField::text(key.trim(), value))
}

/// JSON literal when it parses, plain string otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("mp4") => "video/mp4",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn human_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < KB * KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{:.1} MB", bytes / (KB * KB))
    }
}

fn print_paging(pagination: &folio_sdk::Pagination) {
    println!(
        "{}",
        format!(
            "Page {}/{} ({} total)",
            pagination.page,
            pagination.total_pages.max(1),
            pagination.total
        )
        .dimmed()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = match &cli.session_file {
        Some(path) => SessionStore::at(path),
        None => SessionStore::open_default()?,
    };

    let mut client = FolioClient::connect(&cli.url)
        .await
        .with_context(|| format!("Invalid server URL: {}", cli.url))?;
    if let Some(session) = store.load()? {
        client = client.with_session(session);
    }

    let outcome = run(cli.command, &client).await;

    // Persist rotated tokens (or the cleared session) whatever the outcome
    store.save(client.session().await.as_ref())?;

    match outcome {
        Err(e) if matches!(e.downcast_ref::<SdkError>(), Some(SdkError::Unauthorized)) => {
            bail!("Not logged in or session expired. Run `folio login` first.")
        }
        other => other,
    }
}

async fn run(command: Commands, client: &FolioClient) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let result = client.login(&email, &password).await?;
            println!(
                "{}",
                format!("✓ Logged in as {} ({})", result.user.email, result.user.role)
                    .green()
                    .bold()
            );
        }

        Commands::Logout { all: false } => {
            client.logout().await?;
            println!("{}", "✓ Logged out".green().bold());
        }

        Commands::Logout { all: true } => {
            client.logout_everywhere().await?;
            println!("{}", "✓ Logged out on every device".green().bold());
        }

        Commands::Whoami => {
            let me = client.me().await?;
            println!("  {} {}", "Email:".bold(), me.email);
            println!("  {} {}", "Role:".bold(), me.role);
            println!("  {} {}", "ID:".bold(), me.id);
        }

        Commands::Register {
            email,
            password,
            role,
        } => {
            let user = client
                .register(&RegisterRequest {
                    email,
                    password,
                    role,
                })
                .await?;
            println!(
                "{}",
                format!("✓ Registered {} ({})", user.email, user.role)
                    .green()
                    .bold()
            );
        }

        Commands::Content(command) => content(command, client).await?,
        Commands::Media(command) => media(command, client).await?,
        Commands::Settings(command) => settings(command, client).await?,

        Commands::Logs {
            action,
            search,
            page,
            limit,
        } => {
            let logs = client
                .logs(&LogQuery {
                    page: Some(page),
                    limit: Some(limit),
                    action,
                    search,
                    ..Default::default()
                })
                .await?;

            let rows: Vec<LogRow> = logs
                .items
                .into_iter()
                .map(|log| LogRow {
                    action: log.action,
                    user: log.email.unwrap_or_else(|| "-".to_string()),
                    request: format!("{} {}", log.method, log.path),
                    status: log.status_code,
                    duration: log
                        .duration_ms
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            println!("{}", Table::new(rows));
            print_paging(&logs.pagination);
        }

        Commands::Stats => {
            let stats = client.stats().await?;
            println!("{}", "Site Statistics".cyan().bold());
            println!();
            println!("  {} {}", "Team:".bold(), stats.team_count);
            println!("  {} {}", "Clients:".bold(), stats.clients_count);
            println!("  {} {}", "Projects:".bold(), stats.projects_count);
            println!("  {} {}", "Cities:".bold(), stats.cities_count);
        }
    }

    Ok(())
}

async fn content(command: ContentCommand, client: &FolioClient) -> Result<()> {
    match command {
        ContentCommand::List {
            content_type,
            status,
            search,
            page,
            limit,
        } => {
            let listing = client
                .list_content(
                    &content_type,
                    &ContentQuery {
                        page: Some(page),
                        limit: Some(limit),
                        status,
                        search,
                        ..Default::default()
                    },
                )
                .await?;

            let rows: Vec<ContentRow> = listing
                .items
                .into_iter()
                .map(|c| ContentRow {
                    id: c.id,
                    title: c.title,
                    slug: c.slug,
                    status: c.status,
                })
                .collect();
            println!("{}", Table::new(rows));
            print_paging(&listing.pagination);
        }

        ContentCommand::Get { content_type, id } => {
            let entry = client.get_content(&content_type, &id).await?;
            println!("{}", format!("{} / {}", entry.content_type, entry.slug).cyan().bold());
            println!("  {} {}", "Title:".bold(), entry.title);
            println!("  {} {}", "Status:".bold(), entry.status);
            for field in &entry.fields {
                let value = match &field.value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                println!("  {} {}", format!("{}:", field.key).bold(), value);
            }
        }

        ContentCommand::Create {
            content_type,
            title,
            description,
            fields,
            publish,
        } => {
            let entry = client
                .create_content(
                    &content_type,
                    &ContentInput {
                        title,
                        description,
                        fields,
                        status: Some(if publish { "published" } else { "draft" }.to_string()),
                        ..Default::default()
                    },
                )
                .await?;
            println!("{}", "✓ Content created".green().bold());
            println!();
            println!(
                "{}",
                Table::new(vec![ContentRow {
                    id: entry.id,
                    title: entry.title,
                    slug: entry.slug,
                    status: entry.status,
                }])
            );
        }

        ContentCommand::Publish { content_type, id } => {
            let entry = client
                .update_content(
                    &content_type,
                    &id,
                    &ContentPatch {
                        status: Some("published".to_string()),
                        ..Default::default()
                    },
                )
                .await?;
            println!(
                "{}",
                format!("✓ Published {}", entry.slug).green().bold()
            );
        }

        ContentCommand::Delete { content_type, id } => {
            client.delete_content(&content_type, &id).await?;
            println!("{}", format!("✓ Deleted {}", id).green().bold());
        }
    }
    Ok(())
}

async fn media(command: MediaCommand, client: &FolioClient) -> Result<()> {
    match command {
        MediaCommand::Upload { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .context("Path has no file name")?;

            let media = client
                .upload_media(name, guess_mime(&path), bytes)
                .await?;
            println!("{}", "✓ File uploaded".green().bold());
            println!("  {} {}", "ID:".bold(), media.id);
            println!("  {} {}", "URL:".bold(), media.url);
            if let (Some(w), Some(h)) = (media.width, media.height) {
                println!("  {} {}x{}", "Size:".bold(), w, h);
            }
        }

        MediaCommand::List {
            mime_type,
            page,
            limit,
        } => {
            let listing = client
                .list_media(&MediaQuery {
                    page: Some(page),
                    limit: Some(limit),
                    mime_type,
                    ..Default::default()
                })
                .await?;

            let rows: Vec<MediaRow> = listing
                .items
                .into_iter()
                .map(|m| MediaRow {
                    id: m.id,
                    name: m.original_name,
                    mime_type: m.mime_type,
                    size: human_size(m.size),
                    url: m.url,
                })
                .collect();
            println!("{}", Table::new(rows));
            print_paging(&listing.pagination);
        }

        MediaCommand::Delete { id } => {
            client.delete_media(&id).await?;
            println!("{}", format!("✓ Deleted {}", id).green().bold());
        }
    }
    Ok(())
}

async fn settings(command: SettingsCommand, client: &FolioClient) -> Result<()> {
    match command {
        SettingsCommand::List { category } => {
            let settings = client.list_settings(category.as_deref()).await?;
            if settings.is_empty() {
                println!("{}", "No settings".yellow());
                return Ok(());
            }
            let rows: Vec<SettingRow> = settings
                .into_iter()
                .map(|s| SettingRow {
                    key: s.key,
                    value: s.value.to_string(),
                    category: s.category.unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            println!("{}", Table::new(rows));
        }

        SettingsCommand::Set {
            key,
            value,
            category,
            description,
        } => {
            let saved = client
                .save_setting(&SettingInput {
                    key,
                    value: parse_value(&value),
                    category,
                    description,
                })
                .await?;
            println!(
                "{}",
                format!("✓ {} = {}", saved.key, saved.value).green().bold()
            );
        }
    }
    Ok(())
}
