//! Interactive network namespace demonstration
//!
//! Run with: cargo run --example namespace_demo -- <pid>
//! Run as root: sudo cargo run --example namespace_demo -- <pid>

use nsinspect_namespace::{
    IfAddrsSource, NetnsInspector, NetworkNamespaceSnapshot, ProcessId, collect_interfaces,
};

/// Check if running as root
fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

fn main() {
    println!("🔒 nsinspect Namespace Demo\n");

    // Initialize tracing
    tracing_subscriber::fmt::init();

    demo_current_namespace();

    let pid = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<i32>().ok())
        .map_or_else(ProcessId::current, ProcessId::from_raw);

    if is_root() {
        println!("\n🔐 Running with root privileges - entering namespace of PID {pid}\n");
        demo_enter_namespace(pid);
    } else {
        println!("\n⚠️  Run with sudo to enter another process's namespace");
    }
}

fn demo_current_namespace() {
    println!("📊 Interfaces visible to this process:");
    println!("{:-<60}", "");

    let source = match IfAddrsSource::capture() {
        Ok(source) => source,
        Err(e) => {
            println!("❌ Failed to dump interfaces: {e}");
            return;
        }
    };

    match collect_interfaces(&source) {
        Ok(interfaces) => print!("{}", NetworkNamespaceSnapshot::from_interfaces(interfaces)),
        Err(e) => println!("❌ Failed to list interfaces: {e}"),
    }
}

fn demo_enter_namespace(pid: ProcessId) {
    println!("{:-<60}", "");

    match NetnsInspector::with_defaults().inspect(pid) {
        Ok(snapshot) => print!("{snapshot}"),
        Err(e) => println!("❌ Failed to inspect PID {pid}: {e}"),
    }
}
