// MIT License - Copyright (c) 2026 elk-m1-client contributors
//
//! # elk-m1-client
//!
//! Asynchronous client for Elk M1 Gold / M1 EZ8 security and automation
//! panels, reached through an M1XEP ethernet module or a C1M1 communicator.
//!
//! The crate is layered:
//!
//! - [`Connection`] owns one TCP or TLS socket and reports its lifecycle and
//!   the raw text it receives as [`ConnectionEvent`]s.
//! - [`Client`] drives the login handshake on top of a connection, splits
//!   the stream into packets and broadcasts decoded [`ElkMessage`]s as
//!   [`ClientEvent`]s. It also correlates commands with their replies.
//! - [`DiscoveryClient`] finds M1XEP and C1M1 modules on the local network.
//!
//! ## Quick Start
//!
//! ```no_run
//! use elk_m1_client::{Client, ClientEvent, ClientOptions, ConnectionOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let options = ClientOptions::builder()
//!         .connection(
//!             ConnectionOptions::builder()
//!                 .host("192.168.0.251")
//!                 .secure(true)
//!                 .build(),
//!         )
//!         .username("someone")
//!         .password("supersecret")
//!         .build();
//!
//!     let client = Client::new(options);
//!     let mut events = client.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let ClientEvent::Message(message) = event {
//!                 println!("Message: {:?}", message);
//!             }
//!         }
//!     });
//!
//!     client.connect().await?;
//!     let zones = client.get_zone_status().await?;
//!     println!("Violated zones: {:?}", zones.violated_zones());
//!
//!     tokio::signal::ctrl_c().await?;
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod commands;
pub mod config;
pub mod connection;
pub mod constants;
pub mod devices;
pub mod error;
pub mod event;
pub mod protocol;
pub mod timeout;
pub mod transport;

// Re-exports for convenience
pub use client::{Client, ClientState};
pub use config::{
    ClientOptions, ClientOptionsBuilder, ConnectionOptions, ConnectionOptionsBuilder,
    DiscoveryOptions, DiscoveryOptionsBuilder, TlsOptions,
};
pub use connection::{Connection, ConnectionState};
pub use devices::area::{ArmUpState, ArmingLevel, ArmingStatus};
pub use devices::keypad::{FunctionKey, KeyIllumination};
pub use devices::lighting::PlcFunctionCode;
pub use devices::system::SystemTroubles;
pub use devices::thermostat::{TemperatureDeviceType, ThermostatElement, ThermostatMode};
pub use devices::zone::{ZoneDefinition, ZoneLogicalState, ZonePhysicalState, ZoneStatus};
pub use error::{AuthenticationFailedReason, ElkError, Result};
pub use event::{ClientEvent, ConnectionEvent, EventReceiver};
pub use protocol::{Command, DisplayTextClearOption, ElkMessage, MessageKind, Reply};
pub use timeout::with_timeout;
pub use transport::discovery::{DiscoveryClient, ElkDevice, ElkDeviceType};
pub use transport::{NetSocketFactory, SocketFactory};
