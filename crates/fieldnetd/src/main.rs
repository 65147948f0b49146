//! fieldnetd daemon entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use fieldnet_common::danger::SafetyGate;
use fieldnetd::bringup::NetworkBringUp;
use fieldnetd::dhcp::{DhcpService, SystemCtl};
use fieldnetd::firewall::{FirewallService, SysCommandRunner};
use fieldnetd::ip_operations::{NetIf, SysNetIf};
use fieldnetd::{arena, config, validation};

#[derive(Parser, Debug)]
#[command(name = "fieldnetd", about = "Competition field network bring-up")]
struct Args {
    /// Path to the daemon configuration file.
    #[arg(short, long, default_value = "fieldnet.yml")]
    config: PathBuf,
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    info!("--- starting fieldnetd ---");

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("bring-up failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let cfg = config::load(&args.config)?;
    let gate = SafetyGate::from_host();

    let netif: Arc<dyn NetIf> = Arc::new(SysNetIf::new(gate));

    validation::validate_interface_map(&cfg.interfaces, netif.as_ref()).await?;
    let net = arena::build_arena_network(&cfg.interfaces, &cfg.teams, netif.as_ref()).await?;

    let dhcp = DhcpService::new(Arc::new(SystemCtl::new(gate)), gate);
    let firewall = FirewallService::new(Arc::new(SysCommandRunner::new(gate)));

    let mut bringup = NetworkBringUp::new(netif, dhcp, firewall);
    bringup.up(&net).await?;

    Ok(())
}
