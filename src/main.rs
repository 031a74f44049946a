//! Command-line tool for managing URL rewrites.
//!
//! Every write goes through [`UrlRewriteService`], so the entity cache of the
//! affected rewrite is invalidated exactly as it would be for any other writer.
//!
//! # Usage
//!
//! ```bash
//! # Add a product rewrite (target defaults to catalog/product/view/id/42)
//! cargo run -- rewrite add --type product --entity-id 42 --request-path blue-shirt.html --store 1
//!
//! # Add a custom 301 redirect
//! cargo run -- rewrite add --type custom --request-path sale --target https://example.com/sale --redirect 301
//!
//! # Update, show, list, delete
//! cargo run -- rewrite update 7 --redirect 302
//! cargo run -- rewrite show 7
//! cargo run -- rewrite list --store 1
//! cargo run -- rewrite delete 7
//!
//! # Invalidate an entity's cache without writing
//! cargo run -- invalidate --type category --entity-id 3
//!
//! # Check database connection
//! cargo run -- db check
//! ```
//!
//! See [`url_rewrite::config`] for environment variables.

use url_rewrite::bootstrap;
use url_rewrite::config;
use url_rewrite::domain::entities::{
    EntityType, NewUrlRewrite, RedirectType, UrlRewrite, UrlRewritePatch,
};
use url_rewrite::error::AppError;
use url_rewrite::state::{AppState, RewriteService};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use serde_json::{Map, Value};

/// CLI tool for managing URL rewrites.
#[derive(Parser)]
#[command(name = "url-rewrite")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage URL rewrites
    Rewrite {
        #[command(subcommand)]
        action: RewriteAction,
    },

    /// Invalidate the cache of one entity without writing a rewrite
    Invalidate {
        /// Entity type: product, category, cms-page or custom
        #[arg(long = "type", value_parser = parse_entity_type)]
        entity_type: EntityType,

        /// Entity ID
        #[arg(long)]
        entity_id: i64,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Rewrite management subcommands.
#[derive(Subcommand)]
enum RewriteAction {
    /// Create a rewrite
    Add {
        /// Entity type: product, category, cms-page or custom
        #[arg(long = "type", value_parser = parse_entity_type)]
        entity_type: EntityType,

        /// Entity ID (required unless --type custom)
        #[arg(
            long,
            required_if_eq_any([
                ("entity_type", "product"),
                ("entity_type", "category"),
                ("entity_type", "cms-page"),
            ])
        )]
        entity_id: Option<i64>,

        /// Request path, relative to the store base URL
        #[arg(long)]
        request_path: String,

        /// Target path or absolute URL (defaults to the entity's system path)
        #[arg(long)]
        target: Option<String>,

        /// Redirect type: 0 (none), 301 or 302
        #[arg(long, default_value = "0", value_parser = parse_redirect_type)]
        redirect: RedirectType,

        /// Store ID
        #[arg(long, default_value_t = 0)]
        store: i64,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,

        /// Mark the rewrite as system-generated
        #[arg(long)]
        autogenerated: bool,

        /// Metadata as a JSON object, e.g. '{"category_id":"3"}'
        #[arg(long, value_parser = parse_metadata)]
        metadata: Option<Map<String, Value>>,
    },

    /// Update fields of a rewrite
    Update {
        /// Rewrite ID
        id: i64,

        #[arg(long)]
        request_path: Option<String>,

        #[arg(long)]
        target: Option<String>,

        #[arg(long, value_parser = parse_redirect_type)]
        redirect: Option<RedirectType>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        #[arg(long, value_parser = parse_metadata)]
        metadata: Option<Map<String, Value>>,
    },

    /// Delete a rewrite
    Delete {
        /// Rewrite ID
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show one rewrite
    Show {
        /// Rewrite ID
        id: i64,
    },

    /// Find the rewrite registered for a request path
    Find {
        request_path: String,

        #[arg(long, default_value_t = 0)]
        store: i64,
    },

    /// List rewrites pointing at an entity
    Entity {
        #[arg(long = "type", value_parser = parse_entity_type)]
        entity_type: EntityType,

        #[arg(long)]
        entity_id: i64,

        #[arg(long)]
        store: Option<i64>,
    },

    /// List rewrites
    List {
        #[arg(long)]
        store: Option<i64>,

        #[arg(long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = 20)]
        page_size: i64,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

fn parse_entity_type(s: &str) -> Result<EntityType, String> {
    s.parse().map_err(|e: url_rewrite::domain::invalidation::InvalidationError| e.to_string())
}

fn parse_redirect_type(s: &str) -> Result<RedirectType, String> {
    let code: i16 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a redirect code"))?;
    RedirectType::try_from(code).map_err(|code| format!("unsupported redirect type {code}"))
}

fn parse_metadata(s: &str) -> Result<Map<String, Value>, String> {
    serde_json::from_str(s).map_err(|e| format!("metadata must be a JSON object: {e}"))
}

fn app_error(context: &str, e: AppError) -> anyhow::Error {
    anyhow::anyhow!("{}: [{}] {} {}", context, e.code(), e, e.details())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    bootstrap::init_tracing(&config);
    config.print_summary();

    match cli.command {
        Commands::Db { action } => handle_db_action(action, &config).await?,
        Commands::Rewrite { action } => {
            let state = bootstrap::build_state(&config).await?;
            handle_rewrite_action(action, &state.rewrite_service).await?;
        }
        Commands::Invalidate {
            entity_type,
            entity_id,
        } => {
            let state = bootstrap::build_state(&config).await?;
            handle_invalidate(&state, entity_type, entity_id).await?;
        }
    }

    Ok(())
}

/// Dispatches rewrite management commands.
async fn handle_rewrite_action(action: RewriteAction, service: &RewriteService) -> Result<()> {
    match action {
        RewriteAction::Add {
            entity_type,
            entity_id,
            request_path,
            target,
            redirect,
            store,
            description,
            autogenerated,
            metadata,
        } => {
            let new_rewrite = NewUrlRewrite {
                entity_type,
                entity_id: entity_id.unwrap_or_default(),
                request_path,
                target_path: target,
                redirect_type: redirect,
                store_id: store,
                description,
                is_autogenerated: autogenerated,
                metadata,
            };

            let saved = service
                .create(new_rewrite)
                .await
                .map_err(|e| app_error("Failed to create rewrite", e))?;

            println!("{}", "✅ Rewrite created".green().bold());
            print_rewrite(&saved);
        }
        RewriteAction::Update {
            id,
            request_path,
            target,
            redirect,
            description,
            clear_description,
            metadata,
        } => {
            let description = if clear_description {
                Some(None)
            } else {
                description.map(Some)
            };

            let patch = UrlRewritePatch {
                request_path,
                target_path: target,
                redirect_type: redirect,
                description,
                metadata,
            };

            let saved = service
                .update(id, patch)
                .await
                .map_err(|e| app_error("Failed to update rewrite", e))?;

            println!("{}", "✅ Rewrite updated".green().bold());
            print_rewrite(&saved);
        }
        RewriteAction::Delete { id, yes } => {
            let rewrite = service
                .get(id)
                .await
                .map_err(|e| app_error("Failed to load rewrite", e))?;
            print_rewrite(&rewrite);

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete this rewrite?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            service
                .delete(id)
                .await
                .map_err(|e| app_error("Failed to delete rewrite", e))?;

            println!("{}", "✅ Rewrite deleted".green().bold());
        }
        RewriteAction::Show { id } => {
            let rewrite = service
                .get(id)
                .await
                .map_err(|e| app_error("Failed to load rewrite", e))?;
            print_rewrite(&rewrite);
        }
        RewriteAction::Find {
            request_path,
            store,
        } => {
            let rewrite = service
                .find_by_request_path(&request_path, store)
                .await
                .map_err(|e| app_error("Lookup failed", e))?;
            print_rewrite(&rewrite);
        }
        RewriteAction::Entity {
            entity_type,
            entity_id,
            store,
        } => {
            let rewrites = service
                .find_by_entity(entity_type, entity_id, store)
                .await
                .map_err(|e| app_error("Lookup failed", e))?;
            print_table(&rewrites, rewrites.len() as i64);
        }
        RewriteAction::List {
            store,
            page,
            page_size,
        } => {
            let (rewrites, total) = service
                .list(page, page_size, store)
                .await
                .map_err(|e| app_error("Failed to list rewrites", e))?;
            print_table(&rewrites, total);
        }
    }

    Ok(())
}

async fn handle_invalidate(state: &AppState, entity_type: EntityType, entity_id: i64) -> Result<()> {
    if state.invalidator.invalidate_entity(entity_type, entity_id).await {
        println!(
            "{} {} {}",
            "✅ Invalidation submitted for".green().bold(),
            entity_type.to_string().cyan(),
            entity_id.to_string().bright_white()
        );
    } else {
        println!(
            "{}",
            "⚠️  Custom rewrites have no entity cache to invalidate".yellow()
        );
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, config: &config::Config) -> Result<()> {
    let pool = bootstrap::connect_database(config).await?;

    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(&pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            bootstrap::run_migrations(&pool).await?;
            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}

fn print_rewrite(rewrite: &UrlRewrite) {
    println!();
    println!("  ID:            {}", rewrite.id.to_string().bright_black());
    println!(
        "  Entity:        {} {}",
        rewrite.entity_type.cyan(),
        rewrite.entity_id
    );
    println!("  Request path:  {}", rewrite.request_path.bright_white());
    println!("  Target path:   {}", rewrite.target_path.bright_white());
    println!("  Redirect:      {}", rewrite.redirect_type.code());
    println!("  Store:         {}", rewrite.store_id);
    if let Some(ref description) = rewrite.description {
        println!("  Description:   {}", description);
    }
    if let Some(ref metadata) = rewrite.metadata {
        println!("  Metadata:      {}", metadata.bright_black());
    }
    println!(
        "  Updated:       {}",
        rewrite
            .updated_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();
}

fn print_table(rewrites: &[UrlRewrite], total: i64) {
    if rewrites.is_empty() {
        println!("{}", "  No rewrites found".yellow());
        return;
    }

    println!(
        "  {:<6} {:<10} {:<8} {:<35} {:<35} {:<5}",
        "ID".bright_white().bold(),
        "Type".bright_white().bold(),
        "Entity".bright_white().bold(),
        "Request path".bright_white().bold(),
        "Target path".bright_white().bold(),
        "Code".bright_white().bold()
    );
    println!("  {}", "─".repeat(104).bright_black());

    for rewrite in rewrites {
        println!(
            "  {:<6} {:<10} {:<8} {:<35} {:<35} {:<5}",
            rewrite.id.to_string().bright_black(),
            rewrite.entity_type.cyan(),
            rewrite.entity_id,
            rewrite.request_path,
            rewrite.target_path,
            rewrite.redirect_type.code()
        );
    }

    println!();
    println!("  Total: {}", total.to_string().bright_white().bold());
    println!();
}
