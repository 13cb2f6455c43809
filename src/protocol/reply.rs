// MIT License - Copyright (c) 2026 elk-m1-client contributors

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::constants::{MAX_AREAS, MAX_KEYPADS, MAX_OUTPUTS, MAX_ZONES};
use crate::devices::area::{AlarmState, AreaStatus, ArmUpState, ArmingStatus};
use crate::devices::keypad::{FunctionKey, KeyIllumination};
use crate::devices::lighting::plc_level;
use crate::devices::system::SystemTroubles;
use crate::devices::thermostat::{TemperatureDeviceType, ThermostatMode};
use crate::devices::zone::{ZoneDefinition, ZoneStatus};
use crate::error::{ElkError, Result};

fn invalid(what: &str, data: &str) -> ElkError {
    ElkError::InvalidMessage {
        details: format!("{}: {:?}", what, data),
    }
}

/// Slice `len` characters of `data` starting at `start`.
fn field<'a>(data: &'a str, start: usize, len: usize, what: &str) -> Result<&'a str> {
    data.get(start..start + len)
        .ok_or_else(|| invalid(&format!("{} missing", what), data))
}

/// Parse a decimal field.
fn number<T: FromStr>(data: &str, start: usize, len: usize, what: &str) -> Result<T> {
    field(data, start, len, what)?
        .parse()
        .map_err(|_| invalid(&format!("{} is not a number", what), data))
}

fn char_at(data: &str, index: usize, what: &str) -> Result<char> {
    data.as_bytes()
        .get(index)
        .map(|b| *b as char)
        .ok_or_else(|| invalid(&format!("{} missing", what), data))
}

/// Parse one character per entry for `count` entries.
fn per_char<T>(
    data: &str,
    count: usize,
    what: &str,
    decode: impl Fn(char) -> Option<T>,
) -> Result<Vec<T>> {
    let chars = field(data, 0, count, what)?;
    chars
        .chars()
        .map(|c| decode(c).ok_or_else(|| invalid(&format!("bad {} character {:?}", what, c), data)))
        .collect()
}

/// Firmware versions (`VN`). Each version is sent as three hex bytes, e.g.
/// `05020A` for 5.2.10.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionNumberReply {
    pub m1_version: String,
    pub xep_version: String,
}

fn hex_version(raw: &str) -> Result<String> {
    let parts = (0..3)
        .map(|i| {
            let byte = raw
                .get(i * 2..i * 2 + 2)
                .ok_or_else(|| invalid("version too short", raw))?;
            u8::from_str_radix(byte, 16)
                .map(|v| v.to_string())
                .map_err(|_| invalid("version is not hex", raw))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("."))
}

impl VersionNumberReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            m1_version: hex_version(field(data, 0, 6, "M1 version")?)?,
            xep_version: hex_version(field(data, 6, 6, "XEP version")?)?,
        })
    }
}

/// Arming status of all areas (`AS`): 8 arming statuses, 8 arm-up states,
/// then 8 alarm states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmingStatusReport {
    pub areas: Vec<AreaStatus>,
}

impl ArmingStatusReport {
    pub fn parse(data: &str) -> Result<Self> {
        field(data, 0, MAX_AREAS * 3, "arming status")?;
        let bytes = data.as_bytes();
        let areas = (0..MAX_AREAS)
            .map(|i| {
                let status = bytes[i] as char;
                let up = bytes[MAX_AREAS + i] as char;
                let alarm = bytes[MAX_AREAS * 2 + i] as char;
                Ok(AreaStatus {
                    area: i as u8 + 1,
                    arming_status: ArmingStatus::from_wire_char(status)
                        .ok_or_else(|| invalid("bad arming status", data))?,
                    arm_up_state: ArmUpState::from_wire_char(up)
                        .ok_or_else(|| invalid("bad arm-up state", data))?,
                    alarm_state: AlarmState(alarm),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { areas })
    }

    /// Status of a 1-based area.
    pub fn area(&self, area: u8) -> Option<&AreaStatus> {
        self.areas.iter().find(|a| a.area == area)
    }
}

/// Alarm-by-zone report (`AZ`): the zone definition that is in alarm for each
/// zone, `Disabled` when the zone is not in alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmByZoneReport {
    pub zones: Vec<ZoneDefinition>,
}

impl AlarmByZoneReport {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            zones: per_char(data, MAX_ZONES, "alarm by zone", ZoneDefinition::from_wire_char)?,
        })
    }

    /// 1-based zone numbers currently in alarm.
    pub fn alarmed_zones(&self) -> Vec<u16> {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, d)| **d != ZoneDefinition::Disabled)
            .map(|(i, _)| i as u16 + 1)
            .collect()
    }
}

/// Control output status (`CS`), one flag per output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlOutputStatusReport {
    pub outputs: Vec<bool>,
}

impl ControlOutputStatusReport {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            outputs: per_char(data, MAX_OUTPUTS, "output status", |c| match c {
                '0' => Some(false),
                '1' => Some(true),
                _ => None,
            })?,
        })
    }

    pub fn is_on(&self, output: u16) -> bool {
        output > 0 && self.outputs.get(output as usize - 1).copied().unwrap_or(false)
    }
}

/// Counter value (`CV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterValueReply {
    pub counter: u8,
    pub value: u16,
}

impl CounterValueReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            counter: number(data, 0, 2, "counter")?,
            value: number(data, 2, 5, "counter value")?,
        })
    }
}

/// One custom value. `format` is 0 for a number, 1 for a timer and 2 for a
/// time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomValue {
    pub number: u8,
    pub value: u16,
    pub format: u8,
}

/// Custom value reply (`CR`). Number `00` means every value follows in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomValueReply {
    pub number: u8,
    pub values: Vec<CustomValue>,
}

impl CustomValueReply {
    pub fn parse(data: &str) -> Result<Self> {
        let requested: u8 = number(data, 0, 2, "custom value number")?;
        let body = data.get(2..).unwrap_or("");
        let count = body.len() / 6;
        if count == 0 {
            return Err(invalid("custom value reply has no values", data));
        }
        let values = (0..count)
            .map(|i| {
                Ok(CustomValue {
                    number: if requested == 0 { i as u8 + 1 } else { requested },
                    value: number(body, i * 6, 5, "custom value")?,
                    format: number(body, i * 6 + 5, 1, "custom value format")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            number: requested,
            values,
        })
    }
}

/// Lighting device level (`DS`); 0 is off, 1 is on, 2-99 is a dim level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingDeviceStatusReply {
    pub device: u16,
    pub level: u8,
}

impl LightingDeviceStatusReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            device: number(data, 0, 3, "lighting device")?,
            level: number(data, 3, 2, "lighting level")?,
        })
    }
}

/// Area each keypad belongs to (`KA`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadAreaAssignmentsReply {
    pub areas: Vec<u8>,
}

impl KeypadAreaAssignmentsReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            areas: per_char(data, MAX_KEYPADS, "keypad area", |c| {
                c.to_digit(10).map(|d| d as u8)
            })?,
        })
    }
}

/// Real-time clock (`RR`): `ss mm hh D dd MM yy` followed by flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealTimeClockReply {
    pub time: NaiveDateTime,
    /// 1 = Sunday.
    pub day_of_week: u8,
}

impl RealTimeClockReply {
    pub fn parse(data: &str) -> Result<Self> {
        let second: u32 = number(data, 0, 2, "seconds")?;
        let minute: u32 = number(data, 2, 2, "minutes")?;
        let hour: u32 = number(data, 4, 2, "hours")?;
        let day_of_week: u8 = number(data, 6, 1, "day of week")?;
        let day: u32 = number(data, 7, 2, "day")?;
        let month: u32 = number(data, 9, 2, "month")?;
        let year: i32 = number(data, 11, 2, "year")?;
        let time = NaiveDate::from_ymd_opt(2000 + year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .ok_or_else(|| invalid("clock is not a valid date", data))?;
        Ok(Self { time, day_of_week })
    }
}

/// Text description (`SD`), e.g. a zone or area name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDescriptionReply {
    pub description_type: u8,
    pub address: u16,
    pub text: String,
}

impl TextDescriptionReply {
    pub fn parse(data: &str) -> Result<Self> {
        let text = data.get(5..).unwrap_or("");
        Ok(Self {
            description_type: number(data, 0, 2, "description type")?,
            address: number(data, 2, 3, "description address")?,
            text: text.chars().take(16).collect::<String>().trim().to_string(),
        })
    }
}

/// System trouble status (`SS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemTroubleStatusReply {
    pub troubles: SystemTroubles,
}

impl SystemTroubleStatusReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            troubles: SystemTroubles::from_status_string(field(data, 0, 34, "trouble status")?),
        })
    }
}

/// All keypad and zone temperatures (`LW`). `None` when no sensor is fitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemperatureDataReply {
    pub keypads: Vec<Option<i16>>,
    pub zones: Vec<Option<i16>>,
}

impl TemperatureDataReply {
    pub fn parse(data: &str) -> Result<Self> {
        let read = |start: usize, offset: i16| -> Result<Vec<Option<i16>>> {
            (0..16)
                .map(|i| {
                    let raw: i16 = number(data, start + i * 3, 3, "temperature")?;
                    Ok((raw != 0).then_some(raw - offset))
                })
                .collect()
        };
        Ok(Self {
            keypads: read(0, TemperatureDeviceType::Keypad.offset())?,
            zones: read(48, TemperatureDeviceType::ZoneProbe.offset())?,
        })
    }
}

/// One temperature reading (`ST`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureReply {
    pub device_type: TemperatureDeviceType,
    pub device: u8,
    pub temperature: i16,
}

impl TemperatureReply {
    pub fn parse(data: &str) -> Result<Self> {
        let device_type = TemperatureDeviceType::from_wire_char(char_at(data, 0, "device type")?)
            .ok_or_else(|| invalid("bad temperature device type", data))?;
        let raw: i16 = number(data, 3, 3, "temperature")?;
        Ok(Self {
            device_type,
            device: number(data, 1, 2, "temperature device")?,
            temperature: raw - device_type.offset(),
        })
    }
}

/// Thermostat data (`TR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermostatDataReply {
    pub thermostat: u8,
    pub mode: ThermostatMode,
    pub hold: bool,
    pub fan_on: bool,
    pub temperature: u8,
    pub heat_set_point: u8,
    pub cool_set_point: u8,
    pub humidity: u8,
}

impl ThermostatDataReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            thermostat: number(data, 0, 2, "thermostat")?,
            mode: ThermostatMode::from_wire_char(char_at(data, 2, "mode")?)
                .ok_or_else(|| invalid("bad thermostat mode", data))?,
            hold: char_at(data, 3, "hold")? == '1',
            fan_on: char_at(data, 4, "fan")? == '1',
            temperature: number(data, 5, 2, "temperature")?,
            heat_set_point: number(data, 7, 2, "heat set point")?,
            cool_set_point: number(data, 9, 2, "cool set point")?,
            humidity: number(data, 11, 2, "humidity")?,
        })
    }
}

/// Areas a user code is valid in (`UA`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCodeAreasReply {
    pub code: String,
    /// 1-based area numbers.
    pub areas: Vec<u8>,
}

impl UserCodeAreasReply {
    pub fn parse(data: &str) -> Result<Self> {
        let code = field(data, 0, 6, "user code")?.to_string();
        let mask = u8::from_str_radix(field(data, 6, 2, "area mask")?, 16)
            .map_err(|_| invalid("area mask is not hex", data))?;
        let areas = (0..8u8).filter(|bit| mask & (1 << bit) != 0).map(|bit| bit + 1).collect();
        Ok(Self { code, areas })
    }

    /// Whether the code was accepted at all.
    pub fn is_valid(&self) -> bool {
        !self.areas.is_empty()
    }
}

/// Zone bypass result (`ZB`). Zone `000` reports a whole-area toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneBypassReply {
    pub zone: u16,
    pub bypassed: bool,
}

impl ZoneBypassReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            zone: number(data, 0, 3, "zone")?,
            bypassed: char_at(data, 3, "bypass state")? == '1',
        })
    }
}

/// Area each zone is assigned to (`ZP`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonePartitionsReport {
    pub areas: Vec<u8>,
}

impl ZonePartitionsReport {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            areas: per_char(data, MAX_ZONES, "zone area", |c| c.to_digit(10).map(|d| d as u8))?,
        })
    }
}

/// Status of every zone (`ZS`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneStatusReport {
    pub zones: Vec<ZoneStatus>,
}

impl ZoneStatusReport {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            zones: per_char(data, MAX_ZONES, "zone status", ZoneStatus::from_hex_digit)?,
        })
    }

    /// Status of a 1-based zone.
    pub fn zone(&self, zone: u16) -> Option<&ZoneStatus> {
        self.zones.get((zone as usize).checked_sub(1)?)
    }

    /// 1-based zone numbers currently violated.
    pub fn violated_zones(&self) -> Vec<u16> {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.is_violated())
            .map(|(i, _)| i as u16 + 1)
            .collect()
    }
}

/// Definition of every zone (`ZD`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneDefinitionsReport {
    pub definitions: Vec<ZoneDefinition>,
}

impl ZoneDefinitionsReport {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            definitions: per_char(data, MAX_ZONES, "zone definition", ZoneDefinition::from_wire_char)?,
        })
    }
}

/// Analog zone voltage (`ZV`) in volts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneVoltageReply {
    pub zone: u16,
    pub voltage: f32,
}

impl ZoneVoltageReply {
    pub fn parse(data: &str) -> Result<Self> {
        let tenths: u16 = number(data, 3, 3, "voltage")?;
        Ok(Self {
            zone: number(data, 0, 3, "zone")?,
            voltage: f32::from(tenths) / 10.0,
        })
    }
}

/// Unsolicited zone change (`ZC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneChangeUpdate {
    pub zone: u16,
    pub status: ZoneStatus,
}

impl ZoneChangeUpdate {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            zone: number(data, 0, 3, "zone")?,
            status: ZoneStatus::from_hex_digit(char_at(data, 3, "zone status")?)
                .ok_or_else(|| invalid("bad zone status", data))?,
        })
    }
}

/// Audio zone state (`CA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioDataReply {
    pub zone: u8,
    pub power: bool,
    pub source: u8,
    pub volume: u8,
    pub bass: u8,
    pub treble: u8,
    pub loudness: bool,
    pub balance: u8,
    pub party_mode: bool,
    pub do_not_disturb: bool,
}

impl AudioDataReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            zone: number(data, 0, 2, "audio zone")?,
            power: char_at(data, 2, "power")? == '1',
            source: number(data, 3, 2, "source")?,
            volume: number(data, 5, 2, "volume")?,
            bass: number(data, 7, 2, "bass")?,
            treble: number(data, 9, 2, "treble")?,
            loudness: char_at(data, 11, "loudness")? == '1',
            balance: number(data, 12, 2, "balance")?,
            party_mode: char_at(data, 14, "party mode")? == '1',
            do_not_disturb: char_at(data, 15, "do not disturb")? == '1',
        })
    }
}

/// Result of a user code change (`CU`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserCodeChangeReply {
    /// The changed user, `0` when the authorising code was refused and
    /// `255` when the new code duplicates another user's.
    pub user: u16,
}

impl UserCodeChangeReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            user: number(data, 0, 3, "user")?,
        })
    }

    pub fn is_changed(&self) -> bool {
        self.user != 0 && self.user != 255
    }
}

/// Insteon device ids stored in consecutive lighting devices (`IR`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsteonLightingDeviceStatusReply {
    pub start: u16,
    pub count: u8,
    /// Six hex digits per device.
    pub device_ids: Vec<String>,
}

impl InsteonLightingDeviceStatusReply {
    pub fn parse(data: &str) -> Result<Self> {
        let start = number(data, 0, 3, "starting device")?;
        let count: u8 = number(data, 3, 1, "device count")?;
        let device_ids = (0..usize::from(count))
            .map(|i| field(data, 4 + i * 6, 6, "device id").map(str::to_string))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            start,
            count,
            device_ids,
        })
    }
}

/// Acknowledgement of programmed Insteon device ids (`IP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsteonLightingDeviceProgrammedReply {
    pub start: u16,
    pub count: u8,
}

impl InsteonLightingDeviceProgrammedReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            start: number(data, 0, 3, "starting device")?,
            count: number(data, 3, 1, "device count")?,
        })
    }
}

/// Chime mode digit of each area, as sent in `KC` and `KF`.
fn chime_modes(data: &str, start: usize) -> Result<Vec<u8>> {
    per_char(field(data, start, MAX_AREAS, "chime modes")?, MAX_AREAS, "chime mode", |c| {
        c.to_digit(10).map(|d| d as u8)
    })
}

/// Keypad key change (`KC`), sent when a key is pressed or in answer to
/// `kc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadKeyChangeUpdate {
    pub keypad: u8,
    /// Code of the key pressed, `0` when reporting state only.
    pub key: u8,
    /// LED state of function keys F1 to F6.
    pub illumination: Vec<KeyIllumination>,
    pub code_required_for_bypass: bool,
    pub chime_modes: Vec<u8>,
}

impl KeypadKeyChangeUpdate {
    pub fn parse(data: &str) -> Result<Self> {
        let leds = field(data, 4, 6, "key illumination")?;
        Ok(Self {
            keypad: number(data, 0, 2, "keypad")?,
            key: number(data, 2, 2, "key")?,
            illumination: per_char(leds, 6, "key illumination", KeyIllumination::from_wire_char)?,
            code_required_for_bypass: char_at(data, 10, "bypass code flag")? == '1',
            chime_modes: chime_modes(data, 11)?,
        })
    }
}

/// Function key press acknowledgement (`KF`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadFunctionKeyPressReply {
    pub keypad: u8,
    pub key: FunctionKey,
    pub chime_modes: Vec<u8>,
}

impl KeypadFunctionKeyPressReply {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(Self {
            keypad: number(data, 0, 2, "keypad")?,
            key: FunctionKey::from_wire_char(char_at(data, 2, "function key")?)
                .ok_or_else(|| invalid("bad function key", data))?,
            chime_modes: chime_modes(data, 3)?,
        })
    }
}

/// One system log entry (`LD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemLogDataUpdate {
    pub event: u16,
    /// Zone or user number the event refers to.
    pub number: u16,
    pub area: u8,
    /// `None` for empty log slots.
    pub time: Option<NaiveDateTime>,
    /// 1 = Sunday.
    pub day_of_week: u8,
    pub index: u16,
}

impl SystemLogDataUpdate {
    pub fn parse(data: &str) -> Result<Self> {
        let hour: u32 = number(data, 8, 2, "hour")?;
        let minute: u32 = number(data, 10, 2, "minute")?;
        let month: u32 = number(data, 12, 2, "month")?;
        let day: u32 = number(data, 14, 2, "day")?;
        let year: i32 = number(data, 20, 2, "year")?;
        Ok(Self {
            event: number(data, 0, 4, "event")?,
            number: number(data, 4, 3, "event number")?,
            area: number(data, 7, 1, "area")?,
            time: NaiveDate::from_ymd_opt(2000 + year, month, day)
                .and_then(|d| d.and_hms_opt(hour, minute, 0)),
            index: number(data, 16, 3, "log index")?,
            day_of_week: number(data, 19, 1, "day of week")?,
        })
    }
}

/// Powerline device levels of one bank (`PS`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlcDeviceStatusReply {
    pub bank: u8,
    /// 64 levels; 0 is off, 1 is on, 2-99 is a dim level.
    pub levels: Vec<u8>,
}

impl PlcDeviceStatusReply {
    pub fn parse(data: &str) -> Result<Self> {
        let levels = field(data, 1, 64, "device levels")?;
        Ok(Self {
            bank: number(data, 0, 1, "bank")?,
            levels: per_char(levels, 64, "device level", plc_level)?,
        })
    }
}

/// Omnistat 2 pass-through reply (`T2`). The payload is kept raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Omnistat2Reply {
    pub data: String,
}

/// Periodic ethernet test / heartbeat (`XK`). The payload is kept raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetTest {
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::zone::{ZoneLogicalState, ZonePhysicalState};

    #[test]
    fn test_version_number() {
        let reply = VersionNumberReply::parse("05020A010464").unwrap();
        assert_eq!(reply.m1_version, "5.2.10");
        assert_eq!(reply.xep_version, "1.4.100");
        assert!(VersionNumberReply::parse("0502").is_err());
    }

    #[test]
    fn test_arming_status() {
        let data = "10000000".to_string() + "41111111" + "00300000";
        let report = ArmingStatusReport::parse(&data).unwrap();
        assert_eq!(report.areas.len(), 8);
        let area1 = report.area(1).unwrap();
        assert_eq!(area1.arming_status, ArmingStatus::ArmedAway);
        assert_eq!(area1.arm_up_state, ArmUpState::ArmedFully);
        assert!(area1.alarm_state.is_clear());
        let area3 = report.area(3).unwrap();
        assert!(!area3.arming_status.is_armed());
        assert!(area3.alarm_state.is_alarm());
    }

    #[test]
    fn test_zone_status_report() {
        let mut data = "2".repeat(MAX_ZONES);
        data.replace_range(4..5, "9");
        let report = ZoneStatusReport::parse(&data).unwrap();
        assert_eq!(report.zones.len(), MAX_ZONES);
        assert_eq!(report.violated_zones(), vec![5]);
        assert_eq!(report.zone(1).unwrap().physical, ZonePhysicalState::Eol);
        assert!(report.zone(0).is_none());
        assert!(ZoneStatusReport::parse("222").is_err());
    }

    #[test]
    fn test_custom_values() {
        let single = CustomValueReply::parse("03001230").unwrap();
        assert_eq!(single.values, vec![CustomValue { number: 3, value: 123, format: 0 }]);

        let all = CustomValueReply::parse("00000011000022").unwrap();
        assert_eq!(all.values.len(), 2);
        assert_eq!(all.values[1], CustomValue { number: 2, value: 2, format: 2 });
    }

    #[test]
    fn test_real_time_clock() {
        let reply = RealTimeClockReply::parse("5934172150723000").unwrap();
        assert_eq!(reply.day_of_week, 2);
        assert_eq!(
            reply.time,
            NaiveDate::from_ymd_opt(2023, 7, 15)
                .unwrap()
                .and_hms_opt(17, 34, 59)
                .unwrap()
        );
        assert!(RealTimeClockReply::parse("5934172991323000").is_err());
    }

    #[test]
    fn test_text_description() {
        let reply = TextDescriptionReply::parse("00005Front Door      ").unwrap();
        assert_eq!(reply.description_type, 0);
        assert_eq!(reply.address, 5);
        assert_eq!(reply.text, "Front Door");
    }

    #[test]
    fn test_temperatures() {
        let mut data = "000".repeat(32);
        data.replace_range(0..3, "110");
        data.replace_range(48..51, "130");
        let reply = TemperatureDataReply::parse(&data).unwrap();
        assert_eq!(reply.keypads[0], Some(70));
        assert_eq!(reply.keypads[1], None);
        assert_eq!(reply.zones[0], Some(70));

        let single = TemperatureReply::parse("103112").unwrap();
        assert_eq!(single.device_type, TemperatureDeviceType::Keypad);
        assert_eq!(single.device, 3);
        assert_eq!(single.temperature, 72);
    }

    #[test]
    fn test_thermostat_data() {
        let reply = ThermostatDataReply::parse("0110172687645").unwrap();
        assert_eq!(reply.thermostat, 1);
        assert_eq!(reply.mode, ThermostatMode::Heat);
        assert!(!reply.hold);
        assert!(reply.fan_on);
        assert_eq!(reply.temperature, 72);
        assert_eq!(reply.heat_set_point, 68);
        assert_eq!(reply.cool_set_point, 76);
        assert_eq!(reply.humidity, 45);
    }

    #[test]
    fn test_user_code_areas() {
        let reply = UserCodeAreasReply::parse("00123405").unwrap();
        assert_eq!(reply.areas, vec![1, 3]);
        assert!(reply.is_valid());
        assert!(!UserCodeAreasReply::parse("00999900").unwrap().is_valid());
    }

    #[test]
    fn test_zone_updates() {
        let change = ZoneChangeUpdate::parse("0059").unwrap();
        assert_eq!(change.zone, 5);
        assert_eq!(change.status.logical, ZoneLogicalState::Violated);

        let voltage = ZoneVoltageReply::parse("012072").unwrap();
        assert_eq!(voltage.zone, 12);
        assert!((voltage.voltage - 7.2).abs() < f32::EPSILON);

        let bypass = ZoneBypassReply::parse("0031").unwrap();
        assert_eq!(bypass.zone, 3);
        assert!(bypass.bypassed);
    }

    #[test]
    fn test_audio_data() {
        let reply = AudioDataReply::parse("0210205006004010500000000000").unwrap();
        assert_eq!(reply.zone, 2);
        assert!(reply.power);
        assert_eq!(reply.source, 2);
        assert_eq!(reply.volume, 5);
        assert!(AudioDataReply::parse("02").is_err());
    }

    #[test]
    fn test_user_code_change() {
        assert!(UserCodeChangeReply::parse("005").unwrap().is_changed());
        assert!(!UserCodeChangeReply::parse("000").unwrap().is_changed());
    }

    #[test]
    fn test_insteon_replies() {
        let status = InsteonLightingDeviceStatusReply::parse("0014123456ABCDEF987654A1B2C3").unwrap();
        assert_eq!(status.start, 1);
        assert_eq!(status.count, 4);
        assert_eq!(status.device_ids, vec!["123456", "ABCDEF", "987654", "A1B2C3"]);
        assert!(InsteonLightingDeviceStatusReply::parse("0014123456").is_err());

        let programmed = InsteonLightingDeviceProgrammedReply::parse("0014").unwrap();
        assert_eq!(programmed, InsteonLightingDeviceProgrammedReply { start: 1, count: 4 });
    }

    #[test]
    fn test_keypad_replies() {
        let change = KeypadKeyChangeUpdate::parse("0311201000020000000").unwrap();
        assert_eq!(change.keypad, 3);
        assert_eq!(change.key, 11);
        assert_eq!(change.illumination[0], KeyIllumination::Blinking);
        assert_eq!(change.illumination[2], KeyIllumination::On);
        assert!(!change.code_required_for_bypass);
        assert_eq!(change.chime_modes, vec![2, 0, 0, 0, 0, 0, 0, 0]);

        let press = KeypadFunctionKeyPressReply::parse("01C20000000").unwrap();
        assert_eq!(press.keypad, 1);
        assert_eq!(press.key, FunctionKey::Chime);
        assert!(KeypadFunctionKeyPressReply::parse("01X20000000").is_err());
    }

    #[test]
    fn test_system_log_entry() {
        let entry = SystemLogDataUpdate::parse("1193102119450607500505").unwrap();
        assert_eq!(entry.event, 1193);
        assert_eq!(entry.number, 102);
        assert_eq!(entry.area, 1);
        assert_eq!(entry.index, 500);
        assert_eq!(entry.day_of_week, 5);
        assert_eq!(
            entry.time,
            NaiveDate::from_ymd_opt(2005, 6, 7).and_then(|d| d.and_hms_opt(19, 45, 0))
        );

        let empty = SystemLogDataUpdate::parse("0000000000000000001000").unwrap();
        assert_eq!(empty.time, None);
    }

    #[test]
    fn test_plc_status() {
        let data = "3".to_string() + &"1".repeat(16) + &"0".repeat(47) + "A";
        let reply = PlcDeviceStatusReply::parse(&data).unwrap();
        assert_eq!(reply.bank, 3);
        assert_eq!(reply.levels.len(), 64);
        assert_eq!(reply.levels[0], 1);
        assert_eq!(reply.levels[16], 0);
        assert_eq!(reply.levels[63], 17);
    }

    #[test]
    fn test_alarm_by_zone() {
        let mut data = "0".repeat(MAX_ZONES);
        data.replace_range(9..10, ":");
        let report = AlarmByZoneReport::parse(&data).unwrap();
        assert_eq!(report.alarmed_zones(), vec![10]);
        assert_eq!(report.zones[9], ZoneDefinition::FireAlarm);
    }
}
