use crate::cli::{Cli, Commands};
use anyhow::Result;
use nsinspect_cni::CniCacheConfig;
use nsinspect_core::NetworkNamespaceSnapshot;
use nsinspect_namespace::NetnsConfig;

pub mod cni;
pub mod inspect;
pub mod netns;

/// Dispatch command to appropriate handler
pub async fn dispatch(cli: Cli) -> Result<()> {
    let netns_config = NetnsConfig::new().with_proc_root(cli.proc_root);
    let cni_config = CniCacheConfig::new().with_results_dir(cli.cni_dir);

    match cli.command {
        Commands::Netns { pid, json } => netns::execute(netns_config, pid, json).await,

        Commands::Cni { id, json } => cni::execute(cni_config, &id, json).await,

        Commands::Inspect { pid, id, json } => {
            inspect::execute(netns_config, cni_config, pid, &id, json).await
        }

        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Print a snapshot as text under a heading, or as bare JSON
fn render(snapshot: &NetworkNamespaceSnapshot, heading: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }

    println!("\n🌐 {heading}");
    println!("{:-<60}", "");
    print!("{snapshot}");
    println!("{:-<60}", "");

    Ok(())
}

fn print_version() {
    println!("🦀 nsinspect");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Sources:");
    println!("  • Live network namespace (setns + getifaddrs)");
    println!("  • Cached CNI plugin results");
}
