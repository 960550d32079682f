use std::sync::Arc;

use anyhow::Result;
use notif_app::replay::{build_plugin, load_script, replay, ReplayConfig};

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(err) = run() {
        eprintln!("Failed to replay notifications: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = ReplayConfig::from_env()?;
    let steps = load_script(&config.script)?;
    let (plugin, host) = build_plugin(config.plugin);
    if !notif_bridge::register(Arc::clone(&plugin)) {
        tracing::warn!("using unregistered plugin instance");
    }
    for line in replay(&plugin, &host, &steps)? {
        println!("{line}");
    }
    Ok(())
}
