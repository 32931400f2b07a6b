//! bistro: edit restaurant website documents from the command line.
//!
//! Documents live as JSON files under a store directory, one per restaurant.
//!
//! ```bash
//! # Apply an edit script and save
//! bistro --store ./sites replay --restaurant <uuid> edits.json
//!
//! # Print the document with styles resolved for a device tier
//! bistro --store ./sites show --restaurant <uuid> --tier mobile
//!
//! # Mint a restaurant id
//! bistro new-id
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

mod script;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use bistro_canvas::{DeviceTier, resolve_styles};
use bistro_client::{EditSession, EditorConfig, FsWebsiteRemote, SaveOutcome, TracingNotifier};
use bistro_types::RestaurantId;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Website document editor.
#[derive(Parser, Debug)]
#[command(name = "bistro")]
#[command(about = "Edit restaurant website documents")]
struct Args {
    /// Editor config (RON). Missing fields use defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding one `<restaurant>.json` per website
    #[arg(long, global = true, default_value = "sites")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a website, apply an edit script, and save it back
    Replay {
        #[arg(long)]
        restaurant: RestaurantId,

        /// JSON array of edit steps
        script: PathBuf,

        /// Apply edits but leave the stored document untouched
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a website document as JSON
    Show {
        #[arg(long)]
        restaurant: RestaurantId,

        /// Resolve styles for this device tier
        #[arg(long, default_value = "desktop")]
        tier: DeviceTier,
    },
    /// Print a fresh restaurant id
    NewId,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match args.command {
        Command::Replay {
            restaurant,
            script,
            dry_run,
        } => replay(&args.store, &config, restaurant, &script, dry_run).await,
        Command::Show { restaurant, tier } => show(&args.store, &config, restaurant, tier).await,
        Command::NewId => {
            println!("{}", RestaurantId::new());
            Ok(())
        }
    }
}

fn open_session(store: &Path, config: &EditorConfig, restaurant: RestaurantId) -> EditSession {
    EditSession::from_config(
        restaurant,
        Arc::new(FsWebsiteRemote::new(store)),
        Arc::new(TracingNotifier),
        config,
    )
}

async fn replay(
    store: &Path,
    config: &EditorConfig,
    restaurant: RestaurantId,
    script_path: &Path,
    dry_run: bool,
) -> Result<()> {
    let steps = script::load(script_path)?;
    let session = open_session(store, config, restaurant);
    session.load().await?;

    let summary = script::replay(&session, steps)?;
    tracing::info!(
        steps = summary.steps,
        changed = summary.changed,
        "replayed {}",
        script_path.display()
    );

    if dry_run {
        tracing::info!("dry run; not saving");
    } else if session.has_unsaved_changes() {
        match session.save().await? {
            SaveOutcome::Saved { .. } => {}
            SaveOutcome::AlreadyInFlight => anyhow::bail!("a save was already in flight"),
        }
    } else {
        tracing::info!("no changes to save");
    }

    println!("{}", serde_json::to_string_pretty(&session.blocks())?);
    Ok(())
}

async fn show(
    store: &Path,
    config: &EditorConfig,
    restaurant: RestaurantId,
    tier: DeviceTier,
) -> Result<()> {
    let session = open_session(store, config, restaurant);
    session.load().await?;

    let blocks: Vec<_> = session
        .blocks()
        .iter()
        .map(|block| {
            json!({
                "id": block.id,
                "type": block.kind,
                "order": block.order,
                "isVisible": block.is_visible,
                "content": block.content,
                "styles": resolve_styles(block, tier),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}
