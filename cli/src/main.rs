//! `todo`: terminal client for the TODO service.
//!
//! Usage:
//!   todo [--base-url URL] [--api-key KEY] <command>

mod render;
mod shell;
mod transport;

use std::io::{self, BufReader};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use todo_core::{board::error_text, ApiError, ClientConfig, TodoBoard, TodoClient, TodoForm};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::shell::{parse_filter, Shell};
use crate::transport::Transport;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Manage TODO items on a todo server")]
struct Cli {
    /// Server base URL; defaults to the value baked in at build time
    #[arg(long, env = "TODO_API_BASE_URL", global = true)]
    base_url: Option<String>,

    /// API key sent as X-API-KEY; defaults to the value baked in at build time
    #[arg(long, env = "TODO_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List items
    List {
        /// all, completed or incomplete
        #[arg(long, default_value = "all", value_parser = filter_arg)]
        filter: todo_core::Filter,
    },
    /// Show one item
    Show { id: Uuid },
    /// Add an item
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Replace an item's title, description and completion flag
    Edit {
        id: Uuid,
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Mark the item completed (or not, with --completed=false)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        completed: Option<bool>,
    },
    /// Flip an item's completion flag
    Toggle { id: Uuid },
    /// Delete an item
    Delete { id: Uuid },
    /// Interactive session
    Shell,
}

fn filter_arg(raw: &str) -> Result<todo_core::Filter, String> {
    parse_filter(raw).ok_or_else(|| format!("unknown filter {raw:?}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match (cli.base_url.as_deref(), cli.api_key.as_deref()) {
        (None, None) => ClientConfig::from_build_env(),
        (base_url, api_key) => ClientConfig::with_overrides(base_url, api_key),
    }
    .context("pass --base-url and --api-key or set them at build time")?;
    let client = config.client();
    let transport = Transport::new();

    match cli.command {
        Commands::List { filter } => {
            let board = fetch_board(&client, &transport);
            if let Some(error) = board.error() {
                bail!("{error}");
            }
            println!("{}", render::board(&board, filter));
        }
        Commands::Show { id } => {
            let todo = call(&transport, client.build_get_todo(id), |r| client.parse_get_todo(r))?;
            println!("{}", render::todo_detail(&todo));
        }
        Commands::Add { title, description } => {
            let mut form = TodoForm::new();
            form.title = title;
            form.description = description.unwrap_or_default();
            let request = form
                .submit(&client)
                .ok_or_else(|| anyhow!("{}", form.error().unwrap_or_default()))?;
            let todo = call(&transport, request, |r| client.parse_create_todo(r))?;
            form.submit_succeeded();
            println!("{}\n{}", form.heading(), render::todo_detail(&todo));
        }
        Commands::Edit {
            id,
            title,
            description,
            completed,
        } => {
            let current = call(&transport, client.build_get_todo(id), |r| client.parse_get_todo(r))?;
            let mut form = TodoForm::edit(&current);
            form.title = title;
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(done) = completed {
                form.set_completed(done);
            }
            let request = form
                .submit(&client)
                .ok_or_else(|| anyhow!("{}", form.error().unwrap_or_default()))?;
            call(&transport, request, |r| client.parse_update_todo(r))?;
            form.submit_succeeded();
            println!("{}: updated {id}", form.heading());
        }
        Commands::Toggle { id } => {
            let mut board = fetch_board(&client, &transport);
            let pending = board
                .toggle_optimistic(id)
                .ok_or_else(|| anyhow!("TODO item with ID {id} not found."))?;
            let result = pending
                .request(&client)
                .and_then(|request| transport.execute(request))
                .and_then(|response| client.parse_update_todo(response));
            if let Err(err) = result {
                board.toggle_failed(pending, &err);
                bail!("{}", board.error().unwrap_or_default());
            }
            println!("{}", render::board(&board, todo_core::Filter::All));
        }
        Commands::Delete { id } => {
            call(&transport, client.build_delete_todo(id), |r| client.parse_delete_todo(r))?;
            println!("deleted {id}");
        }
        Commands::Shell => {
            Shell::new(client, transport).run(BufReader::new(io::stdin()), io::stdout())?;
        }
    }
    Ok(())
}

fn fetch_board(client: &TodoClient, transport: &Transport) -> TodoBoard {
    let mut board = TodoBoard::new();
    board.begin_fetch();
    let result = transport
        .execute(client.build_list_todos())
        .and_then(|response| client.parse_list_todos(response));
    board.finish_fetch(result);
    board
}

fn call<T>(
    transport: &Transport,
    request: todo_core::HttpRequest,
    parse: impl FnOnce(todo_core::HttpResponse) -> Result<T, ApiError>,
) -> Result<T> {
    transport
        .execute(request)
        .and_then(parse)
        .map_err(|err| anyhow!("{}", error_text(&err)))
}
