//! rcalcd - remote calculator protocol server.
//!
//! Serves prefix-notation arithmetic over a persistent line-oriented TCP
//! session protocol or a binary-framed UDP datagram protocol, one mode per
//! process.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::net::{TcpListener, UdpSocket};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rcalc_server::tcp::{self, TcpRegistry};
use rcalc_server::{signals, udp};

/// Remote calculator protocol server.
#[derive(Parser)]
#[command(name = "rcalcd", version, about)]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(short, long)]
    port: u16,

    /// Transport mode.
    #[arg(short, long, value_enum)]
    mode: Mode,
}

/// Transport selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Persistent line-oriented sessions.
    Tcp,
    /// One datagram per request.
    Udp,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let addr = SocketAddr::new(cli.host, cli.port);
    match cli.mode {
        Mode::Tcp => run_tcp(addr).await,
        Mode::Udp => run_udp(addr).await,
    }
}

async fn run_tcp(addr: SocketAddr) -> Result<()> {
    // Bind failure is fatal; everything past this point survives on its own.
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind tcp listener on {addr}"))?;
    info!(%addr, mode = "tcp", "listening");

    let registry = Arc::new(TcpRegistry::new());
    tokio::select! {
        result = tcp::serve(listener, Arc::clone(&registry)) => {
            result.context("tcp serve loop failed")
        }
        result = signals::wait_for_shutdown() => {
            result.context("signal handling failed")?;
            registry.shutdown_all().await;
            Ok(())
        }
    }
}

async fn run_udp(addr: SocketAddr) -> Result<()> {
    let socket = UdpSocket::bind(addr)
        .await
        .with_context(|| format!("failed to bind udp socket on {addr}"))?;
    info!(%addr, mode = "udp", "listening");

    tokio::select! {
        result = udp::serve(socket) => result.context("udp serve loop failed"),
        result = signals::wait_for_shutdown() => result.context("signal handling failed"),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
