// MIT License - Copyright (c) 2026 elk-m1-client contributors

//! UDP broadcast discovery of M1XEP ethernet modules and C1M1 communicators.
//!
//! The client broadcasts a short probe per device type and collects replies
//! until the timeout. Every reply starts with:
//!
//! ```text
//! DDDDD MMMMMM IIII PP
//! ```
//!
//! - `DDDDD`: `"C1M1 "` or `"M1XEP"`
//! - `MMMMMM`: MAC address
//! - `IIII`: IPv4 address, one byte per octet
//! - `PP`: big-endian port for insecure connections
//!
//! A C1M1 follows with a 2-byte secure port, an M1XEP with a 16-character
//! space-padded name.

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};

use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::DiscoveryOptions;
use crate::constants::*;
use crate::error::{ElkError, Result};

/// Kind of device that answered a discovery probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElkDeviceType {
    #[serde(rename = "M1XEP")]
    M1Xep,
    C1M1,
}

impl ElkDeviceType {
    /// Probe payload this device type answers.
    pub fn discovery_id(&self) -> &'static [u8] {
        match self {
            Self::M1Xep => M1XEP_DISCOVERY_ID,
            Self::C1M1 => C1M1_DISCOVERY_ID,
        }
    }
}

/// A device found on the local network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElkDevice {
    pub device_type: ElkDeviceType,
    /// Lowercase, colon separated
    pub mac_address: String,
    pub ip_address: Ipv4Addr,
    /// Port for insecure connections
    pub port: u16,
    /// Port for secure connections (C1M1 only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_port: Option<u16>,
    /// User-assigned name (M1XEP only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Format the 6 bytes at `start` as a MAC address.
pub fn extract_mac_address(buffer: &[u8], start: usize, separator: &str) -> Option<String> {
    let bytes = buffer.get(start..start + 6)?;
    Some(
        bytes
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(separator),
    )
}

fn extract_ip_address(buffer: &[u8], start: usize) -> Option<Ipv4Addr> {
    let octets: [u8; 4] = buffer.get(start..start + 4)?.try_into().ok()?;
    Some(Ipv4Addr::from(octets))
}

fn extract_port(buffer: &[u8], start: usize) -> Option<u16> {
    let bytes: [u8; 2] = buffer.get(start..start + 2)?.try_into().ok()?;
    Some(u16::from_be_bytes(bytes))
}

fn truncated(data: &[u8]) -> ElkError {
    ElkError::DiscoveryFailed {
        reason: format!("truncated discovery reply ({} bytes)", data.len()),
    }
}

/// Decode a discovery reply.
pub fn decode(data: &[u8]) -> Result<ElkDevice> {
    let tag = data.get(..5).ok_or_else(|| truncated(data))?;
    let device_type = if tag == C1M1_REPLY_TAG {
        ElkDeviceType::C1M1
    } else if tag == M1XEP_REPLY_TAG {
        ElkDeviceType::M1Xep
    } else {
        return Err(ElkError::DiscoveryFailed {
            reason: format!(
                "unknown reply received with ID {:?}",
                String::from_utf8_lossy(tag)
            ),
        });
    };

    let mac_address = extract_mac_address(data, 5, ":").ok_or_else(|| truncated(data))?;
    let ip_address = extract_ip_address(data, 11).ok_or_else(|| truncated(data))?;
    let port = extract_port(data, 15).ok_or_else(|| truncated(data))?;

    let (secure_port, name) = match device_type {
        ElkDeviceType::C1M1 => (Some(extract_port(data, 17).ok_or_else(|| truncated(data))?), None),
        ElkDeviceType::M1Xep => {
            let raw = data.get(17..data.len().min(33)).unwrap_or(&[]);
            let name = String::from_utf8_lossy(raw)
                .trim_matches(|c: char| c.is_whitespace() || c == '\0')
                .to_string();
            (None, Some(name))
        }
    };

    Ok(ElkDevice {
        device_type,
        mac_address,
        ip_address,
        port,
        secure_port,
        name,
    })
}

fn is_probe(datagram: &[u8]) -> bool {
    datagram == C1M1_DISCOVERY_ID || datagram == M1XEP_DISCOVERY_ID
}

/// Finds Elk devices on the local network.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryClient {
    options: DiscoveryOptions,
}

impl DiscoveryClient {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Broadcast the probes and collect replies until the timeout.
    ///
    /// Devices are de-duplicated by MAC address. Our own broadcast probes and
    /// replies that fail to decode are ignored.
    pub async fn start(&self) -> Result<Vec<ElkDevice>> {
        let options = &self.options;
        let bind_address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, options.local_port));
        let socket = UdpSocket::bind(bind_address)
            .await
            .map_err(|e| ElkError::DiscoveryFailed {
                reason: format!("cannot bind {}: {}", bind_address, e),
            })?;
        socket.set_broadcast(true)?;

        let target = SocketAddr::from((options.broadcast_address, options.port));
        let device_types: &[ElkDeviceType] = if options.device_types.is_empty() {
            &[ElkDeviceType::C1M1, ElkDeviceType::M1Xep]
        } else {
            &options.device_types
        };
        for device_type in device_types {
            debug!("Sending {:?} discovery probe to {}", device_type, target);
            socket.send_to(device_type.discovery_id(), target).await?;
        }

        let deadline = Instant::now() + options.timeout;
        let mut devices = BTreeMap::new();
        let mut buf = [0u8; 512];
        loop {
            let (len, from) = match tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await {
                Err(_) => break,
                Ok(result) => result?,
            };
            let datagram = &buf[..len];
            if is_probe(datagram) {
                continue;
            }
            match decode(datagram) {
                Ok(device) => {
                    info!(
                        "Found {:?} {} at {}:{}",
                        device.device_type, device.mac_address, device.ip_address, device.port
                    );
                    devices.insert(device.mac_address.clone(), device);
                }
                Err(e) => debug!("Ignoring datagram from {}: {}", from, e),
            }
        }

        Ok(devices.into_values().collect())
    }
}
