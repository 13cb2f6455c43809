// MIT License - Copyright (c) 2026 elk-m1-client contributors
// Command line tool for Elk M1 panels

use std::net::Ipv4Addr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Duration;
use tracing::{info, warn};

use elk_m1_client::{
    ArmingLevel, Client, ClientEvent, ClientOptions, ConnectionOptions, DiscoveryClient,
    DiscoveryOptions, ElkMessage,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "elkctl")]
#[command(about = "Talk to an Elk M1 panel over its ethernet interface")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Panel host, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Panel port, overrides the config file
    #[arg(long)]
    port: Option<u16>,

    /// Connect with TLS
    #[arg(long)]
    secure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find M1XEP and C1M1 modules on the local network
    Discover {
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,
        /// Broadcast address to probe
        #[arg(long, default_value_t = Ipv4Addr::BROADCAST)]
        broadcast: Ipv4Addr,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the panel and ethernet module firmware versions
    Version,
    /// Print arming status, troubles and violated zones
    Status,
    /// Print every message from the panel until interrupted
    Watch,
    /// Arm an area
    Arm {
        #[arg(long, default_value_t = 1)]
        area: u8,
        /// away, stay, stay-instant, night, night-instant, vacation,
        /// next-away, next-stay, force-away or force-stay
        #[arg(long, default_value = "away")]
        level: String,
        #[arg(long)]
        code: String,
    },
    /// Disarm an area
    Disarm {
        #[arg(long, default_value_t = 1)]
        area: u8,
        #[arg(long)]
        code: String,
    },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct Config {
    #[serde(default)]
    panel: PanelToml,
}

#[derive(Debug, Deserialize)]
struct PanelToml {
    #[serde(default = "default_host")]
    host: String,
    /// Defaults to 2601 when secure, 2101 otherwise
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    secure: bool,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    verify_certificates: bool,
    #[serde(default)]
    ca_file: Option<PathBuf>,
    #[serde(default = "default_idle_timeout")]
    idle_timeout_ms: u64,
    #[serde(default = "default_connect_timeout")]
    connect_timeout_ms: u64,
    #[serde(default = "default_response_timeout")]
    response_timeout_ms: u64,
}

impl Default for PanelToml {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            secure: false,
            username: None,
            password: None,
            verify_certificates: false,
            ca_file: None,
            idle_timeout_ms: default_idle_timeout(),
            connect_timeout_ms: default_connect_timeout(),
            response_timeout_ms: default_response_timeout(),
        }
    }
}

fn default_host() -> String {
    elk_m1_client::constants::DEFAULT_HOST.to_string()
}
fn default_idle_timeout() -> u64 {
    60000
}
fn default_connect_timeout() -> u64 {
    60000
}
fn default_response_timeout() -> u64 {
    30000
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&text).context("Failed to parse config file")
}

fn build_client_options(cli: &Cli, panel: PanelToml) -> ClientOptions {
    let mut connection = ConnectionOptions::builder()
        .host(cli.host.clone().unwrap_or(panel.host))
        .secure(cli.secure || panel.secure)
        .verify_certificates(panel.verify_certificates)
        .idle_timeout(Duration::from_millis(panel.idle_timeout_ms));
    if let Some(port) = cli.port.or(panel.port) {
        connection = connection.port(port);
    }
    if let Some(ca_file) = panel.ca_file {
        connection = connection.ca_file(ca_file);
    }

    let mut options = ClientOptions::builder()
        .connection(connection.build())
        .connect_timeout(Duration::from_millis(panel.connect_timeout_ms))
        .response_timeout(Duration::from_millis(panel.response_timeout_ms));
    if let Some(username) = panel.username {
        options = options.username(username);
    }
    if let Some(password) = panel.password {
        options = options.password(password);
    }
    options.build()
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn discover(timeout_ms: u64, broadcast: Ipv4Addr, json: bool) -> Result<()> {
    let options = DiscoveryOptions::builder()
        .broadcast_address(broadcast)
        .timeout(Duration::from_millis(timeout_ms))
        .build();
    let devices = DiscoveryClient::new(options).start().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }
    if devices.is_empty() {
        println!("No devices found");
    }
    for device in &devices {
        println!(
            "{:?} {} {}:{}{}{}",
            device.device_type,
            device.mac_address,
            device.ip_address,
            device.port,
            device
                .secure_port
                .map(|p| format!(" (secure {p})"))
                .unwrap_or_default(),
            device
                .name
                .as_deref()
                .map(|n| format!(" \"{n}\""))
                .unwrap_or_default(),
        );
    }
    Ok(())
}

async fn print_status(client: &Client) -> Result<()> {
    let arming = client.get_arming_status().await?;
    for area in &arming.areas {
        println!(
            "Area {}: {:?}, {:?}{}",
            area.area,
            area.arming_status,
            area.arm_up_state,
            if area.alarm_state.is_clear() {
                String::new()
            } else {
                format!(", alarm {:?}", area.alarm_state)
            }
        );
    }

    let troubles = client.get_trouble_status().await?.troubles;
    if troubles.is_empty() {
        println!("Troubles: none");
    } else {
        println!("Troubles: {:?}", troubles);
    }

    let violated = client.get_zone_status().await?.violated_zones();
    println!("Violated zones: {:?}", violated);
    Ok(())
}

async fn watch(client: &Client) -> Result<()> {
    let mut events = client.subscribe();
    let mut sigterm = signal(SignalKind::terminate())?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                return Ok(());
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down");
                return Ok(());
            }
            event = events.recv() => match event {
                Ok(ClientEvent::Message(ElkMessage::EthernetTest(_))) => {}
                Ok(ClientEvent::Message(message)) => {
                    println!("{} {:?}", Local::now().format("%H:%M:%S"), message);
                }
                Ok(ClientEvent::Disconnected) => {
                    anyhow::bail!("Panel closed the connection");
                }
                Ok(ClientEvent::Error(e)) => warn!("Client error: {}", e),
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => warn!("Missed {n} events"),
                Err(RecvError::Closed) => return Ok(()),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=elk_m1_client=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt().without_time().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();

    if let Commands::Discover {
        timeout_ms,
        broadcast,
        json,
    } = &cli.command
    {
        return discover(*timeout_ms, *broadcast, *json).await;
    }

    let config = load_config(cli.config.as_ref())?;
    let options = build_client_options(&cli, config.panel);
    info!("Connecting to panel at {}", options.connection.address());

    let client = Client::new(options);
    client.connect().await.context("Failed to connect to panel")?;
    if client.authenticated() {
        info!("Logged in");
    }

    let result = match &cli.command {
        Commands::Discover { .. } => Ok(()),
        Commands::Version => client
            .get_version_number()
            .await
            .map(|version| {
                println!("M1: {}", version.m1_version);
                println!("M1XEP: {}", version.xep_version);
            })
            .map_err(anyhow::Error::from),
        Commands::Status => print_status(&client).await,
        Commands::Watch => watch(&client).await,
        Commands::Arm { area, level, code } => match ArmingLevel::from_name(level) {
            Some(level) => client
                .arm(*area, level, code)
                .await
                .map_err(anyhow::Error::from),
            None => Err(anyhow::anyhow!("Unknown arming level: {level}")),
        },
        Commands::Disarm { area, code } => client
            .disarm(*area, code)
            .await
            .map_err(anyhow::Error::from),
    };

    client.disconnect().await;
    result
}
