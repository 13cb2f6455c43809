// MIT License - Copyright (c) 2026 elk-m1-client contributors

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::devices::area::ArmingLevel;
use crate::devices::keypad::FunctionKey;
use crate::devices::lighting::PlcFunctionCode;
use crate::devices::thermostat::{TemperatureDeviceType, ThermostatElement};
use crate::protocol::frame;

/// How `dm` treats the text already on the keypad display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTextClearOption {
    /// Leave the text until a key is pressed.
    ClearOnKeypress,
    /// Show the text until the timeout elapses.
    ShowUntilTimeout,
    /// Clear any message previously shown.
    Clear,
}

impl DisplayTextClearOption {
    fn wire_char(&self) -> char {
        match self {
            Self::ClearOnKeypress => '0',
            Self::ShowUntilTimeout => '1',
            Self::Clear => '2',
        }
    }
}

/// Commands that can be sent to the Elk M1.
///
/// Every command is framed as `NN TT data 00 CC` (see [`frame`]); the
/// variants below document the `TT data` part and the reply the panel sends
/// back, if any.
///
/// # Correlation
///
/// Replies carry no request identifier. A reply is matched to its command by
/// message type and, where a command addresses one thing (a zone, a counter,
/// a thermostat), by the number echoed in the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `vn`: Request M1 and ethernet module firmware versions.
    /// Reply: `VN`. Also used as a harmless probe right after connecting.
    VersionNumberRequest,
    /// `a<L><A><CCCCCC>`: Arm or disarm area `A` at level `L` with a user code.
    /// No direct reply; the panel later broadcasts `AS`.
    Arm {
        level: ArmingLevel,
        area: u8,
        code: String,
    },
    /// `as`: Request arming status of all areas. Reply: `AS`.
    ArmingStatusRequest,
    /// `az`: Request alarm-by-zone report. Reply: `AZ`.
    AlarmByZoneRequest,
    /// `ca<ZZ>`: Request the state of an audio zone. Reply: `CA`.
    AudioDataRequest { zone: u8 },
    /// `cf<OOO>`: Turn a control output off.
    ControlOutputOff { output: u16 },
    /// `cn<OOO><TTTTT>`: Turn a control output on, optionally for a number of
    /// seconds (`0` = indefinitely).
    ControlOutputOn { output: u16, seconds: u32 },
    /// `ct<OOO>`: Toggle a control output.
    ControlOutputToggle { output: u16 },
    /// `cs`: Request control output status. Reply: `CS`.
    ControlOutputStatusRequest,
    /// `cv<NN>`: Read a counter. Reply: `CV`.
    CounterValueRead { counter: u8 },
    /// `cx<NN><VVVVV>`: Write a counter. Reply: `CV`.
    CounterValueWrite { counter: u8, value: u16 },
    /// `cr<NN>`: Read one custom value. Reply: `CR`.
    CustomValueRead { value_number: u8 },
    /// `cr00`: Read all custom values. Reply: `CR` with number `00`.
    CustomValuesReadAll,
    /// `cw<NN><VVVVV>`: Write a custom value. Reply: `CR`.
    CustomValueWrite { value_number: u8, value: u16 },
    /// `cu<UUU><MMMMMM><NNNNNN><AA>`: Change user `UUU`'s code, authorised by
    /// the master code or the user's current code. `AA` is a hex bit mask of
    /// the areas the code is valid in. Reply: `CU`.
    UserCodeChange {
        user: u16,
        authorising_code: String,
        new_code: String,
        areas: Vec<u8>,
    },
    /// `dm<A><C><B><TTTTT><16 chars><16 chars>`: Show text on the keypads of
    /// an area. Unused characters are padded with `^`.
    DisplayTextOnScreen {
        area: u8,
        clear: DisplayTextClearOption,
        beep: bool,
        seconds: u32,
        first_line: String,
        second_line: String,
    },
    /// `ds<DDD>`: Request a lighting device's level. Reply: `DS`.
    LightingDeviceStatusRequest { device: u16 },
    /// `ir<SSS><C>`: Request the ids of `C` Insteon devices starting at
    /// lighting device `SSS`. Reply: `IR`.
    InsteonLightingDeviceStatusRequest { start: u16, count: u8 },
    /// `ip<SSS><C><ID...>`: Program Insteon device ids (six hex digits each)
    /// starting at lighting device `SSS`. Reply: `IP`.
    InsteonLightingDeviceProgram { start: u16, device_ids: Vec<String> },
    /// `ka`: Request keypad area assignments. Reply: `KA`.
    KeypadAreaAssignmentsRequest,
    /// `kc<KK>`: Request a keypad's function key state. Reply: `KC`.
    KeypadFunctionKeyStatusRequest { keypad: u8 },
    /// `kf<KK><K>`: Press a function key on a keypad. Reply: `KF`.
    KeypadFunctionKeyPress { keypad: u8, key: FunctionKey },
    /// `ld<NNN>`: Read one entry of the system log. Reply: `LD`.
    SystemLogDataRead { index: u16 },
    /// `le<T><EEE><ZZZ><A>`: Write an entry to the system log. `T` is the
    /// leading digit of the logged event code. Reply: `OK`.
    SystemLogDataWrite {
        log_type: u8,
        event_type: u16,
        zone: u16,
        area: u8,
    },
    /// `pc<H><UU><FF><EE><TTTT>`: Send an X-10 function to a powerline
    /// device.
    PlcDeviceControl {
        house_code: char,
        unit: u8,
        function: PlcFunctionCode,
        extended_code: u8,
        on_time: u16,
    },
    /// `pf<H><UU>`: Turn a powerline device off.
    PlcDeviceOff { house_code: char, unit: u8 },
    /// `pn<H><UU>`: Turn a powerline device on.
    PlcDeviceOn { house_code: char, unit: u8 },
    /// `pt<H><UU>`: Toggle a powerline device.
    PlcDeviceToggle { house_code: char, unit: u8 },
    /// `ps<B>`: Request the levels of the 64 devices in a bank. Reply: `PS`.
    PlcDeviceStatusRequest { bank: u8 },
    /// `rr`: Request the real-time clock. Reply: `RR`.
    RealTimeClockDataRequest,
    /// `rw<ss><mm><hh><D><dd><MM><yy>`: Set the real-time clock. Reply: `RR`.
    RealTimeClockDataWrite { time: NaiveDateTime },
    /// `sd<TT><AAA>`: Request a text description (zone name, area name...).
    /// Reply: `SD`. The panel may answer with the next named address.
    TextDescriptionRequest { description_type: u8, address: u16 },
    /// `ss`: Request system trouble status. Reply: `SS`.
    SystemTroubleStatusRequest,
    /// `lw`: Request all keypad and zone temperatures. Reply: `LW`.
    TemperatureDataRequest,
    /// `st<G><DD>`: Request one temperature. Reply: `ST`.
    TemperatureRequest {
        device_type: TemperatureDeviceType,
        device: u8,
    },
    /// `sw<WWW>`: Speak a word.
    SpeakWord { word: u16 },
    /// `sp<PPP>`: Speak a phrase.
    SpeakPhrase { phrase: u16 },
    /// `tn<TTT>`: Activate an automation task.
    TaskActivation { task: u16 },
    /// `tr<NN>`: Request thermostat data. Reply: `TR`.
    ThermostatDataRequest { thermostat: u8 },
    /// `ts<NN><VV><E>`: Set a thermostat element. Reply: `TR`.
    ThermostatSet {
        thermostat: u8,
        value: u8,
        element: ThermostatElement,
    },
    /// `t2<data>`: Pass a request through to an Omnistat 2 thermostat.
    /// Reply: `T2`.
    Omnistat2Request { data: String },
    /// `ua<CCCCCC>`: Request the areas a user code is valid in. Reply: `UA`.
    UserCodeAreasRequest { code: String },
    /// `zb<ZZZ><A><CCCCCC>`: Toggle bypass of a zone, or of every violated
    /// zone in area `A` when zone is `000`. Reply: `ZB`.
    ZoneBypassRequest { zone: u16, area: u8, code: String },
    /// `zp`: Request zone partition assignments. Reply: `ZP`.
    ZonePartitionRequest,
    /// `zs`: Request zone status. Reply: `ZS`.
    ZoneStatusRequest,
    /// `zd`: Request zone definitions. Reply: `ZD`.
    ZoneDefinitionRequest,
    /// `zt<ZZZ>`: Trigger (violate) a zone.
    ZoneTrigger { zone: u16 },
    /// `zv<ZZZ>`: Request a zone's analog voltage. Reply: `ZV`.
    ZoneVoltageRequest { zone: u16 },
}

/// Left-pad a user code with zeros to the six digits the panel expects.
pub fn pad_user_code(code: &str) -> String {
    format!("{:0>6}", code)
}

/// Hex bit mask of 1-based area numbers, bit 0 being area 1.
fn area_mask(areas: &[u8]) -> u8 {
    areas
        .iter()
        .filter(|area| (1..=8).contains(*area))
        .fold(0, |mask, area| mask | 1 << (area - 1))
}

/// Pad or truncate keypad text to the 16 characters of one display line.
fn display_line(text: &str) -> String {
    let mut line: String = text.chars().filter(|c| c.is_ascii()).take(16).collect();
    while line.len() < 16 {
        line.push('^');
    }
    line
}

impl Command {
    /// The two-character message type, e.g. `"vn"`.
    pub fn kind(&self) -> String {
        match self {
            Command::Arm { level, .. } => format!("a{}", level.wire_char()),
            other => other.to_wire_string()[..2].to_string(),
        }
    }

    /// Convert the command to its unframed `TT data` representation.
    pub fn to_wire_string(&self) -> String {
        match self {
            Command::VersionNumberRequest => "vn".to_string(),
            Command::Arm { level, area, code } => {
                format!("a{}{}{}", level.wire_char(), area, pad_user_code(code))
            }
            Command::ArmingStatusRequest => "as".to_string(),
            Command::AlarmByZoneRequest => "az".to_string(),
            Command::AudioDataRequest { zone } => format!("ca{:02}", zone),
            Command::ControlOutputOff { output } => format!("cf{:03}", output),
            Command::ControlOutputOn { output, seconds } => {
                format!("cn{:03}{:05}", output, seconds)
            }
            Command::ControlOutputToggle { output } => format!("ct{:03}", output),
            Command::ControlOutputStatusRequest => "cs".to_string(),
            Command::CounterValueRead { counter } => format!("cv{:02}", counter),
            Command::CounterValueWrite { counter, value } => {
                format!("cx{:02}{:05}", counter, value)
            }
            Command::CustomValueRead { value_number } => format!("cr{:02}", value_number),
            Command::CustomValuesReadAll => "cr00".to_string(),
            Command::CustomValueWrite {
                value_number,
                value,
            } => format!("cw{:02}{:05}", value_number, value),
            Command::UserCodeChange {
                user,
                authorising_code,
                new_code,
                areas,
            } => format!(
                "cu{:03}{}{}{:02X}",
                user,
                pad_user_code(authorising_code),
                pad_user_code(new_code),
                area_mask(areas)
            ),
            Command::DisplayTextOnScreen {
                area,
                clear,
                beep,
                seconds,
                first_line,
                second_line,
            } => format!(
                "dm{}{}{}{:05}{}{}",
                area,
                clear.wire_char(),
                if *beep { 1 } else { 0 },
                seconds,
                display_line(first_line),
                display_line(second_line),
            ),
            Command::LightingDeviceStatusRequest { device } => format!("ds{:03}", device),
            Command::InsteonLightingDeviceStatusRequest { start, count } => {
                format!("ir{:03}{}", start, count)
            }
            Command::InsteonLightingDeviceProgram { start, device_ids } => {
                let ids: String = device_ids
                    .iter()
                    .map(|id| format!("{:0>6}", id.to_ascii_uppercase()))
                    .collect();
                format!("ip{:03}{}{}", start, device_ids.len(), ids)
            }
            Command::KeypadAreaAssignmentsRequest => "ka".to_string(),
            Command::KeypadFunctionKeyStatusRequest { keypad } => format!("kc{:02}", keypad),
            Command::KeypadFunctionKeyPress { keypad, key } => {
                format!("kf{:02}{}", keypad, key.wire_char())
            }
            Command::SystemLogDataRead { index } => format!("ld{:03}", index),
            Command::SystemLogDataWrite {
                log_type,
                event_type,
                zone,
                area,
            } => format!("le{}{:03}{:03}{}", log_type, event_type, zone, area),
            Command::PlcDeviceControl {
                house_code,
                unit,
                function,
                extended_code,
                on_time,
            } => format!(
                "pc{}{:02}{:02}{:02}{:04}",
                house_code.to_ascii_uppercase(),
                unit,
                function.value(),
                extended_code,
                on_time
            ),
            Command::PlcDeviceOff { house_code, unit } => {
                format!("pf{}{:02}", house_code.to_ascii_uppercase(), unit)
            }
            Command::PlcDeviceOn { house_code, unit } => {
                format!("pn{}{:02}", house_code.to_ascii_uppercase(), unit)
            }
            Command::PlcDeviceToggle { house_code, unit } => {
                format!("pt{}{:02}", house_code.to_ascii_uppercase(), unit)
            }
            Command::PlcDeviceStatusRequest { bank } => format!("ps{}", bank),
            Command::RealTimeClockDataRequest => "rr".to_string(),
            Command::RealTimeClockDataWrite { time } => format!(
                "rw{:02}{:02}{:02}{}{:02}{:02}{:02}",
                time.second(),
                time.minute(),
                time.hour(),
                time.weekday().number_from_sunday(),
                time.day(),
                time.month(),
                time.year() % 100
            ),
            Command::TextDescriptionRequest {
                description_type,
                address,
            } => format!("sd{:02}{:03}", description_type, address),
            Command::SystemTroubleStatusRequest => "ss".to_string(),
            Command::TemperatureDataRequest => "lw".to_string(),
            Command::TemperatureRequest {
                device_type,
                device,
            } => format!("st{}{:02}", device_type.wire_char(), device),
            Command::SpeakWord { word } => format!("sw{:03}", word),
            Command::SpeakPhrase { phrase } => format!("sp{:03}", phrase),
            Command::TaskActivation { task } => format!("tn{:03}", task),
            Command::ThermostatDataRequest { thermostat } => format!("tr{:02}", thermostat),
            Command::ThermostatSet {
                thermostat,
                value,
                element,
            } => format!("ts{:02}{:02}{}", thermostat, value, element.wire_char()),
            Command::Omnistat2Request { data } => format!("t2{}", data),
            Command::UserCodeAreasRequest { code } => format!("ua{}", pad_user_code(code)),
            Command::ZoneBypassRequest { zone, area, code } => {
                format!("zb{:03}{}{}", zone, area, pad_user_code(code))
            }
            Command::ZonePartitionRequest => "zp".to_string(),
            Command::ZoneStatusRequest => "zs".to_string(),
            Command::ZoneDefinitionRequest => "zd".to_string(),
            Command::ZoneTrigger { zone } => format!("zt{:03}", zone),
            Command::ZoneVoltageRequest { zone } => format!("zv{:03}", zone),
        }
    }

    /// The complete framed packet, CRLF included, written verbatim to the
    /// connection.
    pub fn raw(&self) -> String {
        frame(&self.to_wire_string())
    }
}
