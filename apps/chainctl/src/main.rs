use std::{path::PathBuf, process::ExitCode};

use anyhow::{bail, Result};
use chain_store::chain_views;
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::{
    domain::{EntityId, TransformKind},
    protocol::StoreAction,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod script;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(about = "Replay and inspect transform-chain editing sessions")]
struct Cli {
    /// Config file; defaults to ./chainctl.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the final store state.
    Replay { script: PathBuf },
    /// Print one chain's transforms in order.
    Resolve {
        script: PathBuf,
        #[arg(long)]
        chain: String,
    },
    /// List transforms with fields that are not numbers.
    Validate { script: PathBuf },
    /// Print an action that appends a new default transform to a chain.
    New {
        kind: TransformKind,
        #[arg(long)]
        chain: String,
        #[arg(long)]
        id: Option<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    init_tracing(&settings.log_filter);

    match cli.command {
        Command::Replay { script } => {
            let store = script::replay(script::load_script(&script)?);
            print_json(&*store.snapshot(), settings.pretty)?;
        }
        Command::Resolve { script, chain } => {
            let store = script::replay(script::load_script(&script)?);
            let chain = EntityId::new(chain);
            let snapshot = store.snapshot();
            if snapshot.chain(&chain).is_none() {
                bail!("script does not define chain '{chain}'");
            }
            let dangling = snapshot.dangling_references(&chain);
            if !dangling.is_empty() {
                warn!(%chain, ?dangling, "skipping references to missing transforms");
            }
            print_json(&snapshot.resolve_chain(&chain), settings.pretty)?;
        }
        Command::Validate { script } => {
            let store = script::replay(script::load_script(&script)?);
            if !validate(&store.snapshot()) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::New { kind, chain, id } => {
            let action = new_transform_action(&settings, kind, EntityId::new(chain), id);
            // always one line so the output can be appended to a JSON Lines script
            println!("{}", serde_json::to_string(&action)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

/// Prints invalid transforms and chains; returns whether everything is valid.
fn validate(state: &chain_store::StoreState) -> bool {
    let invalid = state.invalid_transforms();
    for transform in &invalid {
        let fields = transform
            .invalid_fields()
            .iter()
            .map(|axis| axis.as_str())
            .collect::<Vec<_>>()
            .join(",");
        println!("{}\t{}\tinvalid: {fields}", transform.id(), transform.kind());
    }
    for view in chain_views(state).iter().filter(|view| !view.is_valid()) {
        println!("chain {} has invalid rows", view.id);
    }

    if invalid.is_empty() {
        info!(transforms = state.transforms.len(), "all transforms valid");
        println!("all {} transforms valid", state.transforms.len());
    }
    invalid.is_empty()
}

fn new_transform_action(
    settings: &Settings,
    kind: TransformKind,
    chain_id: EntityId,
    id: Option<String>,
) -> StoreAction {
    let id = id.map(EntityId::new).unwrap_or_else(EntityId::generate);
    StoreAction::AppendTransform {
        chain_id,
        transform: settings.new_transform(kind, id),
    }
}
