//! CLI argument definitions

use clap::{Parser, Subcommand};
use nsinspect_cni::config::DEFAULT_RESULTS_DIR;
use nsinspect_namespace::config::DEFAULT_PROC_ROOT;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nsinspect")]
#[command(about = "Inspect container network namespaces", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Root of the proc filesystem
    #[arg(long, global = true, default_value = DEFAULT_PROC_ROOT)]
    pub proc_root: PathBuf,

    /// Directory holding cached CNI results
    #[arg(long, global = true, default_value = DEFAULT_RESULTS_DIR)]
    pub cni_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect the network namespace of a running process
    Netns {
        /// Process ID inside the container
        #[arg(short, long)]
        pid: i32,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild a container's interfaces from its cached CNI result
    Cni {
        /// Container ID
        #[arg(short, long)]
        id: String,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect a container, falling back to the CNI cache
    Inspect {
        /// Process ID inside the container
        #[arg(short, long)]
        pid: i32,

        /// Container ID
        #[arg(short, long)]
        id: String,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}
