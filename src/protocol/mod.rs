// MIT License - Copyright (c) 2026 elk-m1-client contributors

//! Elk M1 ASCII protocol.
//!
//! # Framing
//!
//! Every packet, in either direction, has the form:
//!
//! ```text
//! NN TT data 00 CC <CR><LF>
//! ```
//!
//! - `NN`: two hex digits counting every character after `NN` up to and
//!   including the checksum.
//! - `TT`: message type. Commands sent to the panel are lowercase, replies and
//!   unsolicited reports are uppercase.
//! - `00`: reserved.
//! - `CC`: two hex digits chosen so that the byte sum of everything before
//!   them plus `CC` is zero modulo 256.
//!
//! `06vn0056` is the complete version request.
//!
//! The only unframed traffic is the literal `OK` acknowledgement and the
//! login prompts of secure connections.

pub mod command;
pub mod reply;

pub use command::{Command, DisplayTextClearOption};
pub use reply::*;

use crate::constants::CRLF;
use crate::error::{ElkError, Result};

/// Checksum of a packet body as two uppercase hex digits.
pub fn checksum(body: &str) -> String {
    let sum = body.bytes().fold(0u32, |acc, b| acc + u32::from(b));
    format!("{:02X}", (256 - sum % 256) & 0xFF)
}

/// Frame `TT data` into a complete packet terminated by CRLF.
pub fn frame(body: &str) -> String {
    // length covers body, the reserved "00" and the checksum
    let packet = format!("{:02X}{}00", body.len() + 4, body);
    let cc = checksum(&packet);
    format!("{}{}{}", packet, cc, CRLF)
}

/// Discriminant of an [`ElkMessage`], used for matching replies by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    VersionNumber,
    ArmingStatus,
    AlarmByZone,
    AudioData,
    ControlOutputStatus,
    CounterValue,
    CustomValue,
    UserCodeChange,
    LightingDeviceStatus,
    InsteonLightingDeviceStatus,
    InsteonLightingDeviceProgrammed,
    KeypadAreaAssignments,
    KeypadKeyChange,
    KeypadFunctionKeyPress,
    SystemLogData,
    PlcDeviceStatus,
    RealTimeClock,
    TextDescription,
    SystemTroubleStatus,
    TemperatureData,
    Temperature,
    ThermostatData,
    Omnistat2,
    UserCodeAreas,
    ZoneBypass,
    ZonePartitions,
    ZoneStatus,
    ZoneDefinitions,
    ZoneVoltage,
    ZoneChange,
    EthernetTest,
    Unknown,
}

impl MessageKind {
    /// Kind for a two-character wire type such as `"ZS"`.
    pub fn from_message_type(message_type: &str) -> Self {
        match message_type {
            "VN" => Self::VersionNumber,
            "AS" => Self::ArmingStatus,
            "AZ" => Self::AlarmByZone,
            "CA" => Self::AudioData,
            "CS" => Self::ControlOutputStatus,
            "CV" => Self::CounterValue,
            "CR" => Self::CustomValue,
            "CU" => Self::UserCodeChange,
            "DS" => Self::LightingDeviceStatus,
            "IR" => Self::InsteonLightingDeviceStatus,
            "IP" => Self::InsteonLightingDeviceProgrammed,
            "KA" => Self::KeypadAreaAssignments,
            "KC" => Self::KeypadKeyChange,
            "KF" => Self::KeypadFunctionKeyPress,
            "LD" => Self::SystemLogData,
            "PS" => Self::PlcDeviceStatus,
            "RR" => Self::RealTimeClock,
            "SD" => Self::TextDescription,
            "SS" => Self::SystemTroubleStatus,
            "LW" => Self::TemperatureData,
            "ST" => Self::Temperature,
            "TR" => Self::ThermostatData,
            "T2" => Self::Omnistat2,
            "UA" => Self::UserCodeAreas,
            "ZB" => Self::ZoneBypass,
            "ZP" => Self::ZonePartitions,
            "ZS" => Self::ZoneStatus,
            "ZD" => Self::ZoneDefinitions,
            "ZV" => Self::ZoneVoltage,
            "ZC" => Self::ZoneChange,
            "XK" => Self::EthernetTest,
            _ => Self::Unknown,
        }
    }
}

/// A message received from the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ElkMessage {
    VersionNumber(VersionNumberReply),
    ArmingStatus(ArmingStatusReport),
    AlarmByZone(AlarmByZoneReport),
    AudioData(AudioDataReply),
    ControlOutputStatus(ControlOutputStatusReport),
    CounterValue(CounterValueReply),
    CustomValue(CustomValueReply),
    UserCodeChange(UserCodeChangeReply),
    LightingDeviceStatus(LightingDeviceStatusReply),
    InsteonLightingDeviceStatus(InsteonLightingDeviceStatusReply),
    InsteonLightingDeviceProgrammed(InsteonLightingDeviceProgrammedReply),
    KeypadAreaAssignments(KeypadAreaAssignmentsReply),
    KeypadKeyChange(KeypadKeyChangeUpdate),
    KeypadFunctionKeyPress(KeypadFunctionKeyPressReply),
    SystemLogData(SystemLogDataUpdate),
    PlcDeviceStatus(PlcDeviceStatusReply),
    RealTimeClock(RealTimeClockReply),
    TextDescription(TextDescriptionReply),
    SystemTroubleStatus(SystemTroubleStatusReply),
    TemperatureData(TemperatureDataReply),
    Temperature(TemperatureReply),
    ThermostatData(ThermostatDataReply),
    Omnistat2(Omnistat2Reply),
    UserCodeAreas(UserCodeAreasReply),
    ZoneBypass(ZoneBypassReply),
    ZonePartitions(ZonePartitionsReport),
    ZoneStatus(ZoneStatusReport),
    ZoneDefinitions(ZoneDefinitionsReport),
    ZoneVoltage(ZoneVoltageReply),
    ZoneChange(ZoneChangeUpdate),
    EthernetTest(EthernetTest),
    /// A well-formed packet of a type this crate does not decode.
    Unknown { message_type: String, data: String },
}

/// A typed reply that can be pulled out of an [`ElkMessage`].
pub trait Reply: Sized + Send + 'static {
    const KIND: MessageKind;

    fn from_message(message: ElkMessage) -> Option<Self>;
}

macro_rules! replies {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        impl ElkMessage {
            pub fn kind(&self) -> MessageKind {
                match self {
                    $(ElkMessage::$variant(_) => MessageKind::$variant,)*
                    ElkMessage::Unknown { .. } => MessageKind::Unknown,
                }
            }
        }

        $(
            impl Reply for $ty {
                const KIND: MessageKind = MessageKind::$variant;

                fn from_message(message: ElkMessage) -> Option<Self> {
                    match message {
                        ElkMessage::$variant(reply) => Some(reply),
                        _ => None,
                    }
                }
            }
        )*
    };
}

replies! {
    VersionNumber => VersionNumberReply,
    ArmingStatus => ArmingStatusReport,
    AlarmByZone => AlarmByZoneReport,
    AudioData => AudioDataReply,
    ControlOutputStatus => ControlOutputStatusReport,
    CounterValue => CounterValueReply,
    CustomValue => CustomValueReply,
    UserCodeChange => UserCodeChangeReply,
    LightingDeviceStatus => LightingDeviceStatusReply,
    InsteonLightingDeviceStatus => InsteonLightingDeviceStatusReply,
    InsteonLightingDeviceProgrammed => InsteonLightingDeviceProgrammedReply,
    KeypadAreaAssignments => KeypadAreaAssignmentsReply,
    KeypadKeyChange => KeypadKeyChangeUpdate,
    KeypadFunctionKeyPress => KeypadFunctionKeyPressReply,
    SystemLogData => SystemLogDataUpdate,
    PlcDeviceStatus => PlcDeviceStatusReply,
    RealTimeClock => RealTimeClockReply,
    TextDescription => TextDescriptionReply,
    SystemTroubleStatus => SystemTroubleStatusReply,
    TemperatureData => TemperatureDataReply,
    Temperature => TemperatureReply,
    ThermostatData => ThermostatDataReply,
    Omnistat2 => Omnistat2Reply,
    UserCodeAreas => UserCodeAreasReply,
    ZoneBypass => ZoneBypassReply,
    ZonePartitions => ZonePartitionsReport,
    ZoneStatus => ZoneStatusReport,
    ZoneDefinitions => ZoneDefinitionsReport,
    ZoneVoltage => ZoneVoltageReply,
    ZoneChange => ZoneChangeUpdate,
    EthernetTest => EthernetTest,
}

fn invalid(details: String) -> ElkError {
    ElkError::InvalidMessage { details }
}

/// Parse one line received from the panel.
///
/// The line terminator is optional. Length and checksum are verified before
/// the payload is decoded.
pub fn parse(line: &str) -> Result<ElkMessage> {
    let packet = line.trim_end_matches(['\r', '\n']);
    if !packet.is_ascii() || packet.len() < 8 {
        return Err(invalid(format!("packet too short: {:?}", packet)));
    }

    let declared = usize::from_str_radix(&packet[..2], 16)
        .map_err(|_| invalid(format!("bad length prefix: {:?}", packet)))?;
    if declared + 2 != packet.len() {
        return Err(invalid(format!(
            "length {} does not match packet {:?}",
            declared, packet
        )));
    }

    let (body, cc) = packet.split_at(packet.len() - 2);
    let expected = checksum(body);
    if !cc.eq_ignore_ascii_case(&expected) {
        return Err(invalid(format!(
            "checksum {} (expected {}) in packet {:?}",
            cc, expected, packet
        )));
    }

    let message_type = &packet[2..4];
    let data = &packet[4..packet.len() - 4];
    decode(message_type, data)
}

fn decode(message_type: &str, data: &str) -> Result<ElkMessage> {
    let message = match MessageKind::from_message_type(message_type) {
        MessageKind::VersionNumber => ElkMessage::VersionNumber(VersionNumberReply::parse(data)?),
        MessageKind::ArmingStatus => ElkMessage::ArmingStatus(ArmingStatusReport::parse(data)?),
        MessageKind::AlarmByZone => ElkMessage::AlarmByZone(AlarmByZoneReport::parse(data)?),
        MessageKind::AudioData => ElkMessage::AudioData(AudioDataReply::parse(data)?),
        MessageKind::ControlOutputStatus => {
            ElkMessage::ControlOutputStatus(ControlOutputStatusReport::parse(data)?)
        }
        MessageKind::CounterValue => ElkMessage::CounterValue(CounterValueReply::parse(data)?),
        MessageKind::CustomValue => ElkMessage::CustomValue(CustomValueReply::parse(data)?),
        MessageKind::UserCodeChange => {
            ElkMessage::UserCodeChange(UserCodeChangeReply::parse(data)?)
        }
        MessageKind::LightingDeviceStatus => {
            ElkMessage::LightingDeviceStatus(LightingDeviceStatusReply::parse(data)?)
        }
        MessageKind::InsteonLightingDeviceStatus => {
            let reply = InsteonLightingDeviceStatusReply::parse(data)?;
            ElkMessage::InsteonLightingDeviceStatus(reply)
        }
        MessageKind::InsteonLightingDeviceProgrammed => {
            let reply = InsteonLightingDeviceProgrammedReply::parse(data)?;
            ElkMessage::InsteonLightingDeviceProgrammed(reply)
        }
        MessageKind::KeypadAreaAssignments => {
            ElkMessage::KeypadAreaAssignments(KeypadAreaAssignmentsReply::parse(data)?)
        }
        MessageKind::KeypadKeyChange => {
            ElkMessage::KeypadKeyChange(KeypadKeyChangeUpdate::parse(data)?)
        }
        MessageKind::KeypadFunctionKeyPress => {
            ElkMessage::KeypadFunctionKeyPress(KeypadFunctionKeyPressReply::parse(data)?)
        }
        MessageKind::SystemLogData => ElkMessage::SystemLogData(SystemLogDataUpdate::parse(data)?),
        MessageKind::PlcDeviceStatus => {
            ElkMessage::PlcDeviceStatus(PlcDeviceStatusReply::parse(data)?)
        }
        MessageKind::RealTimeClock => ElkMessage::RealTimeClock(RealTimeClockReply::parse(data)?),
        MessageKind::TextDescription => {
            ElkMessage::TextDescription(TextDescriptionReply::parse(data)?)
        }
        MessageKind::SystemTroubleStatus => {
            ElkMessage::SystemTroubleStatus(SystemTroubleStatusReply::parse(data)?)
        }
        MessageKind::TemperatureData => {
            ElkMessage::TemperatureData(TemperatureDataReply::parse(data)?)
        }
        MessageKind::Temperature => ElkMessage::Temperature(TemperatureReply::parse(data)?),
        MessageKind::ThermostatData => {
            ElkMessage::ThermostatData(ThermostatDataReply::parse(data)?)
        }
        MessageKind::Omnistat2 => ElkMessage::Omnistat2(Omnistat2Reply {
            data: data.to_string(),
        }),
        MessageKind::UserCodeAreas => ElkMessage::UserCodeAreas(UserCodeAreasReply::parse(data)?),
        MessageKind::ZoneBypass => ElkMessage::ZoneBypass(ZoneBypassReply::parse(data)?),
        MessageKind::ZonePartitions => {
            ElkMessage::ZonePartitions(ZonePartitionsReport::parse(data)?)
        }
        MessageKind::ZoneStatus => ElkMessage::ZoneStatus(ZoneStatusReport::parse(data)?),
        MessageKind::ZoneDefinitions => {
            ElkMessage::ZoneDefinitions(ZoneDefinitionsReport::parse(data)?)
        }
        MessageKind::ZoneVoltage => ElkMessage::ZoneVoltage(ZoneVoltageReply::parse(data)?),
        MessageKind::ZoneChange => ElkMessage::ZoneChange(ZoneChangeUpdate::parse(data)?),
        MessageKind::EthernetTest => ElkMessage::EthernetTest(EthernetTest {
            data: data.to_string(),
        }),
        MessageKind::Unknown => ElkMessage::Unknown {
            message_type: message_type.to_string(),
            data: data.to_string(),
        },
    };
    Ok(message)
}
