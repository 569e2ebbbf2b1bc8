use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use scriba::http::{HttpAuthGateway, HttpPostGateway};
use scriba::prelude::*;
use tracing_subscriber::EnvFilter;

type Client = BlogClient<HttpAuthGateway, HttpPostGateway>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Scriba(#[from] ScribaError),

    #[error("{0} is a published post, not a draft")]
    NotADraft(PostId),

    #[error("no published post {0} for the current user")]
    PostNotFound(PostId),
}

impl CliError {
    fn requires_login(&self) -> bool {
        matches!(self, Self::Scriba(e) if e.requires_login())
    }
}

#[derive(Parser)]
#[command(author, version, about = "Write, save and publish blog posts from the terminal")]
struct Cli {
    /// Base URL of the blog API
    #[arg(long, env = "SCRIBA_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Directory holding the saved session and the local drafts
    #[arg(long, env = "SCRIBA_DATA_DIR", default_value = ".scriba")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and keep the session for later commands
    Login {
        handle: String,
        #[arg(long, env = "SCRIBA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the saved session
    Logout,
    /// Show who is logged in
    Whoami,
    /// List published posts followed by local drafts
    List,
    /// Start a new draft
    New { title: String, body: String },
    /// Open an edit draft for a published post
    Edit { post_id: i64 },
    /// Replace the content of a draft
    Save {
        /// Draft key, e.g. `draft-1700000000000123`
        draft: PostKey,
        title: String,
        body: String,
    },
    /// Publish a draft
    Publish { draft: PostKey },
    /// Delete a draft (`draft-<n>`) or a published post (`<n>`)
    Delete { key: PostKey },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let storage = Arc::new(FileStorage::open(&cli.data_dir)?);
    tracing::debug!(data_dir = %cli.data_dir.display(), "storage opened");
    let client = BlogClientBuilder::new()
        .http_config(HttpConfig::default().with_base_url(cli.api_url))
        .storage(storage)
        .build_http()?;

    if let Err(e) = run(&client, cli.command).await {
        if e.requires_login() {
            eprintln!("not logged in: run `blog-cli login <handle>` first");
        }
        return Err(e.into());
    }
    Ok(())
}

async fn run(client: &Client, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Login { handle, password } => {
            let user = client.login(&Credentials::new(handle, password)).await?;
            println!("logged in as {user}");
        }
        Commands::Logout => {
            client.logout();
            println!("logged out");
        }
        Commands::Whoami => match client.current_user() {
            Some(user) => println!("{user} ({})", user.display_name.as_deref().unwrap_or("-")),
            None => println!("anonymous"),
        },
        Commands::List => {
            for post in client.list_posts().await? {
                let marker = if post.is_draft() { "draft" } else { "published" };
                println!("{:<26} {:<10} {}", post.key(), marker, post.title());
            }
        }
        Commands::New { title, body } => {
            let draft = client.create_draft()?;
            write(client, draft.id, title, body).await?;
            println!("created {}", draft.id);
        }
        Commands::Edit { post_id } => {
            let post = find_published(client, PostId(post_id)).await?;
            let draft = client.edit_published(&post)?;
            println!("editing {} as {}", post.id, draft.id);
        }
        Commands::Save { draft, title, body } => {
            let id = draft_id(draft)?;
            write(client, id, title, body).await?;
            println!("saved {id}");
        }
        Commands::Publish { draft } => {
            let post = client.publish(draft_id(draft)?).await?;
            println!("published as {}", post.id);
        }
        Commands::Delete { key } => {
            client.delete_post(key).await?;
            println!("deleted {key}");
        }
    }
    Ok(())
}

/// Routes content through the autosave task, flushing right away since
/// the process exits after the command.
async fn write(client: &Client, id: DraftId, title: String, body: String) -> Result<(), ScribaError> {
    let editor = client.open_editor(id)?;
    editor.edit(title, body)?;
    editor.flush().await?;
    Ok(())
}

async fn find_published(client: &Client, id: PostId) -> Result<PublishedPost, CliError> {
    client
        .list_posts()
        .await?
        .into_iter()
        .find_map(|post| match post {
            Post::Published(p) if p.id == id => Some(p),
            _ => None,
        })
        .ok_or(CliError::PostNotFound(id))
}

fn draft_id(key: PostKey) -> Result<DraftId, CliError> {
    match key {
        PostKey::Draft(id) => Ok(id),
        PostKey::Published(id) => Err(CliError::NotADraft(id)),
    }
}
