use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::rc::Rc;

use crate::cms::SnapshotCmsManager;
use crate::config::PageSnapConfig;
use crate::metrics;
use crate::snapshots::InMemorySnapshotManager;
use crate::transformer::JsonTransformer;

mod pages;

#[derive(Parser, Debug)]
#[command(
    name = "pagesnap",
    version,
    about = "Inspect pages served from published snapshots",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Snapshots JSON file (falls back to PS_SNAPSHOTS_PATH)
    #[arg(long, global = true)]
    snapshots: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Materialized page summary
    Show {
        #[arg(long)]
        page_id: u64,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Ancestor chain, root first
    Parents {
        #[arg(long)]
        page_id: u64,
    },
    /// Block tree of the page
    Blocks {
        #[arg(long)]
        page_id: u64,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compact serialized record of the page proxy
    Record {
        #[arg(long)]
        page_id: u64,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let cms = open_cms(cli.snapshots)?;
    let res = match cli.cmd {
        Cmd::Show { page_id, json } => pages::cmd_show(&cms, page_id, json),
        Cmd::Parents { page_id } => pages::cmd_parents(&cms, page_id),
        Cmd::Blocks { page_id, json } => pages::cmd_blocks(&cms, page_id, json),
        Cmd::Record { page_id } => pages::cmd_record(&cms, page_id),
    };
    log::debug!("cli: {:?}", metrics::snapshot());
    res
}

/// Process exit code for a finished run; failures are logged.
pub fn exit_code(res: &Result<()>) -> i32 {
    match res {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{:#}", e);
            1
        }
    }
}

fn open_cms(snapshots: Option<PathBuf>) -> Result<SnapshotCmsManager> {
    let mut cfg = PageSnapConfig::from_env();
    if snapshots.is_some() {
        cfg = cfg.with_snapshots_path(snapshots);
    }
    let path = cfg
        .snapshots_path
        .clone()
        .ok_or_else(|| anyhow!("no snapshots file: pass --snapshots or set PS_SNAPSHOTS_PATH"))?;
    log::debug!("cli: {}", cfg);

    let manager = InMemorySnapshotManager::open(&path)?;
    Ok(SnapshotCmsManager::with_config(
        Rc::new(manager),
        Rc::new(JsonTransformer::new()),
        cfg.build(),
    ))
}
