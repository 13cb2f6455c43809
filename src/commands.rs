// MIT License - Copyright (c) 2026 elk-m1-client contributors

//! Request/response helpers and the panel command API of [`Client`].
//!
//! The panel protocol carries no request ids. A reply is matched to its
//! request by content: its message type and, where the request names one,
//! the zone, output, counter or thermostat number. Only one request of each
//! kind should be in flight at a time.

use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::client::Client;
use crate::devices::area::ArmingLevel;
use crate::devices::keypad::FunctionKey;
use crate::devices::lighting::PlcFunctionCode;
use crate::devices::thermostat::{TemperatureDeviceType, ThermostatElement, ThermostatMode};
use crate::error::{ElkError, Result};
use crate::event::{ClientEvent, EventReceiver};
use crate::protocol::command::pad_user_code;
use crate::protocol::*;
use crate::timeout::with_timeout;

/// Wait on `events` for the first message `matcher` accepts.
async fn next_message<F>(mut events: EventReceiver, matcher: F) -> Result<ElkMessage>
where
    F: Fn(&ElkMessage) -> bool,
{
    loop {
        match events.recv().await {
            Ok(ClientEvent::Message(message)) if matcher(&message) => return Ok(message),
            Ok(_) => {}
            Err(RecvError::Lagged(n)) => warn!("Missed {} client events waiting for a response", n),
            Err(RecvError::Closed) => return Err(ElkError::ChannelClosed),
        }
    }
}

/// Wait on `events` for the next "OK" line.
async fn next_ok(mut events: EventReceiver) -> Result<()> {
    loop {
        match events.recv().await {
            Ok(ClientEvent::Ok) => return Ok(()),
            Ok(_) => {}
            Err(RecvError::Lagged(n)) => warn!("Missed {} client events waiting for OK", n),
            Err(RecvError::Closed) => return Err(ElkError::ChannelClosed),
        }
    }
}

fn reply_matches<R, F>(message: &ElkMessage, accept: &F) -> bool
where
    R: Reply,
    F: Fn(&R) -> bool,
{
    message.kind() == R::KIND && R::from_message(message.clone()).is_some_and(|reply| accept(&reply))
}

impl Client {
    /// Write a command using the default timeout. Does not wait for a reply.
    pub async fn send_command(&self, command: &Command) -> Result<()> {
        self.send_command_with_timeout(command, self.default_timeout())
            .await
    }

    /// Write a command, failing if the write takes longer than `timeout`.
    pub async fn send_command_with_timeout(&self, command: &Command, timeout: Duration) -> Result<()> {
        debug!("Sending {} command", command.kind());
        with_timeout(timeout, self.connection().write(&command.raw())).await
    }

    /// Wait for the first message from the panel that `matcher` accepts.
    /// A zero `timeout` waits forever.
    pub async fn wait_for_response<F>(&self, matcher: F, timeout: Duration) -> Result<ElkMessage>
    where
        F: Fn(&ElkMessage) -> bool + Send,
    {
        with_timeout(timeout, next_message(self.subscribe(), matcher)).await
    }

    /// Wait for the next bare "OK" from the panel.
    pub async fn wait_for_ok(&self, timeout: Duration) -> Result<()> {
        with_timeout(timeout, next_ok(self.subscribe())).await
    }

    /// Send a command and wait for the first message `matcher` accepts.
    ///
    /// `timeout` covers both the write and the wait. Listening starts before
    /// the command is written, so a fast reply is not missed.
    pub async fn send_command_for_response<F>(
        &self,
        command: &Command,
        matcher: F,
        timeout: Duration,
    ) -> Result<ElkMessage>
    where
        F: Fn(&ElkMessage) -> bool + Send,
    {
        let events = self.subscribe();
        with_timeout(timeout, async {
            self.send_command_with_timeout(command, Duration::ZERO).await?;
            next_message(events, matcher).await
        })
        .await
    }

    /// Send a command and wait for the panel's "OK".
    pub async fn send_command_for_ok(&self, command: &Command, timeout: Duration) -> Result<()> {
        let events = self.subscribe();
        with_timeout(timeout, async {
            self.send_command_with_timeout(command, Duration::ZERO).await?;
            next_ok(events).await
        })
        .await
    }

    /// Send a command and wait for any message of the given kind.
    pub async fn send_command_for_response_type(
        &self,
        command: &Command,
        kind: MessageKind,
    ) -> Result<ElkMessage> {
        self.send_command_for_response(command, move |message| message.kind() == kind, self.default_timeout())
            .await
    }

    /// Send a command and return the first reply of type `R` that `accept`
    /// agrees with.
    async fn request_where<R, F>(&self, command: Command, accept: F) -> Result<R>
    where
        R: Reply,
        F: Fn(&R) -> bool + Send,
    {
        let message = self
            .send_command_for_response(
                &command,
                move |message| reply_matches::<R, F>(message, &accept),
                self.default_timeout(),
            )
            .await?;
        R::from_message(message).ok_or_else(|| ElkError::UnexpectedResponse {
            details: format!("{} reply did not decode as {:?}", command.kind(), R::KIND),
        })
    }

    async fn request<R: Reply>(&self, command: Command) -> Result<R> {
        self.request_where(command, |_: &R| true).await
    }

    // Arming

    /// Arm an area. The panel reports the change with an arming status
    /// broadcast rather than a reply.
    pub async fn arm(&self, area: u8, level: ArmingLevel, code: &str) -> Result<()> {
        let command = Command::Arm {
            level,
            area,
            code: code.to_string(),
        };
        self.send_command(&command).await
    }

    pub async fn disarm(&self, area: u8, code: &str) -> Result<()> {
        self.arm(area, ArmingLevel::Disarm, code).await
    }

    pub async fn get_arming_status(&self) -> Result<ArmingStatusReport> {
        self.request(Command::ArmingStatusRequest).await
    }

    pub async fn get_alarms_by_zone(&self) -> Result<AlarmByZoneReport> {
        self.request(Command::AlarmByZoneRequest).await
    }

    /// Change a user's code.
    ///
    /// A refusal (user `000`) or duplicate code (user `255`) reply is
    /// returned as is; check [`UserCodeChangeReply::is_changed`].
    pub async fn change_user_code(
        &self,
        user: u16,
        authorising_code: &str,
        new_code: &str,
        areas: &[u8],
    ) -> Result<UserCodeChangeReply> {
        let command = Command::UserCodeChange {
            user,
            authorising_code: authorising_code.to_string(),
            new_code: new_code.to_string(),
            areas: areas.to_vec(),
        };
        self.request_where(command, move |r: &UserCodeChangeReply| {
            r.user == user || !r.is_changed()
        })
        .await
    }

    // Audio

    pub async fn get_audio_data(&self, zone: u8) -> Result<AudioDataReply> {
        self.request_where(Command::AudioDataRequest { zone }, move |r: &AudioDataReply| {
            r.zone == zone
        })
        .await
    }

    // Outputs

    pub async fn set_control_output_off(&self, output: u16) -> Result<()> {
        self.send_command(&Command::ControlOutputOff { output }).await
    }

    /// Turn an output on for `seconds`, or until turned off when zero.
    pub async fn set_control_output_on(&self, output: u16, seconds: u32) -> Result<()> {
        self.send_command(&Command::ControlOutputOn { output, seconds })
            .await
    }

    pub async fn toggle_control_output(&self, output: u16) -> Result<()> {
        self.send_command(&Command::ControlOutputToggle { output }).await
    }

    pub async fn get_control_output_status(&self) -> Result<ControlOutputStatusReport> {
        self.request(Command::ControlOutputStatusRequest).await
    }

    // Counters and custom values

    pub async fn get_counter_value(&self, counter: u8) -> Result<CounterValueReply> {
        self.request_where(Command::CounterValueRead { counter }, move |r: &CounterValueReply| {
            r.counter == counter
        })
        .await
    }

    pub async fn set_counter_value(&self, counter: u8, value: u16) -> Result<CounterValueReply> {
        self.request_where(
            Command::CounterValueWrite { counter, value },
            move |r: &CounterValueReply| r.counter == counter,
        )
        .await
    }

    pub async fn get_custom_value(&self, value_number: u8) -> Result<CustomValueReply> {
        self.request_where(
            Command::CustomValueRead { value_number },
            move |r: &CustomValueReply| r.number == value_number,
        )
        .await
    }

    /// Read every custom value in one reply.
    pub async fn get_custom_values(&self) -> Result<CustomValueReply> {
        self.request_where(Command::CustomValuesReadAll, |r: &CustomValueReply| r.number == 0)
            .await
    }

    pub async fn set_custom_value(&self, value_number: u8, value: u16) -> Result<CustomValueReply> {
        self.request_where(
            Command::CustomValueWrite { value_number, value },
            move |r: &CustomValueReply| r.number == value_number,
        )
        .await
    }

    // Keypads

    /// Show two lines of text on the keypads of an area for `seconds`
    /// (zero shows it until cleared).
    pub async fn display_text_on_screen(
        &self,
        area: u8,
        first_line: &str,
        second_line: &str,
        clear: DisplayTextClearOption,
        beep: bool,
        seconds: u32,
    ) -> Result<()> {
        let command = Command::DisplayTextOnScreen {
            area,
            clear,
            beep,
            seconds,
            first_line: first_line.to_string(),
            second_line: second_line.to_string(),
        };
        self.send_command(&command).await
    }

    pub async fn clear_text_on_screen(&self, area: u8, beep: bool) -> Result<()> {
        self.display_text_on_screen(area, "", "", DisplayTextClearOption::Clear, beep, 0)
            .await
    }

    pub async fn get_keypad_area_assignments(&self) -> Result<KeypadAreaAssignmentsReply> {
        self.request(Command::KeypadAreaAssignmentsRequest).await
    }

    pub async fn get_keypad_function_key_status(&self, keypad: u8) -> Result<KeypadKeyChangeUpdate> {
        self.request_where(
            Command::KeypadFunctionKeyStatusRequest { keypad },
            move |r: &KeypadKeyChangeUpdate| r.keypad == keypad,
        )
        .await
    }

    /// Press a function key as if on the keypad itself. `FunctionKey::None`
    /// presses nothing and just reports the keypad's chime modes.
    pub async fn press_keypad_function_key(
        &self,
        keypad: u8,
        key: FunctionKey,
    ) -> Result<KeypadFunctionKeyPressReply> {
        self.request_where(
            Command::KeypadFunctionKeyPress { keypad, key },
            move |r: &KeypadFunctionKeyPressReply| r.keypad == keypad && r.key == key,
        )
        .await
    }

    // Lighting

    pub async fn get_lighting_device_status(&self, device: u16) -> Result<LightingDeviceStatusReply> {
        self.request_where(
            Command::LightingDeviceStatusRequest { device },
            move |r: &LightingDeviceStatusReply| r.device == device,
        )
        .await
    }

    /// Read the Insteon ids of `count` lighting devices starting at `start`.
    pub async fn get_insteon_lighting_device_status(
        &self,
        start: u16,
        count: u8,
    ) -> Result<InsteonLightingDeviceStatusReply> {
        self.request_where(
            Command::InsteonLightingDeviceStatusRequest { start, count },
            move |r: &InsteonLightingDeviceStatusReply| r.start == start && r.count == count,
        )
        .await
    }

    /// Store Insteon ids in consecutive lighting devices starting at `start`.
    pub async fn set_insteon_lighting_device(
        &self,
        start: u16,
        device_ids: &[&str],
    ) -> Result<InsteonLightingDeviceProgrammedReply> {
        let count = device_ids.len();
        let command = Command::InsteonLightingDeviceProgram {
            start,
            device_ids: device_ids.iter().map(|id| id.to_string()).collect(),
        };
        self.request_where(command, move |r: &InsteonLightingDeviceProgrammedReply| {
            r.start == start && usize::from(r.count) == count
        })
        .await
    }

    /// Send an X-10 function to a powerline device. `on_time` is in seconds.
    pub async fn set_plc_device(
        &self,
        house_code: char,
        unit: u8,
        function: PlcFunctionCode,
        extended_code: u8,
        on_time: u16,
    ) -> Result<()> {
        let command = Command::PlcDeviceControl {
            house_code,
            unit,
            function,
            extended_code,
            on_time,
        };
        self.send_command(&command).await
    }

    pub async fn set_plc_device_off(&self, house_code: char, unit: u8) -> Result<()> {
        self.send_command(&Command::PlcDeviceOff { house_code, unit })
            .await
    }

    pub async fn set_plc_device_on(&self, house_code: char, unit: u8) -> Result<()> {
        self.send_command(&Command::PlcDeviceOn { house_code, unit })
            .await
    }

    pub async fn toggle_plc_device(&self, house_code: char, unit: u8) -> Result<()> {
        self.send_command(&Command::PlcDeviceToggle { house_code, unit })
            .await
    }

    /// Levels of the 64 powerline devices in `bank` (0-3).
    pub async fn get_plc_status(&self, bank: u8) -> Result<PlcDeviceStatusReply> {
        self.request_where(
            Command::PlcDeviceStatusRequest { bank },
            move |r: &PlcDeviceStatusReply| r.bank == bank,
        )
        .await
    }

    // System

    pub async fn get_system_log_data(&self, index: u16) -> Result<SystemLogDataUpdate> {
        self.request_where(
            Command::SystemLogDataRead { index },
            move |r: &SystemLogDataUpdate| r.index == index,
        )
        .await
    }

    /// Write an event to the panel's log. `log_type` is the leading digit of
    /// the logged event code. The panel answers with a bare "OK".
    pub async fn write_system_log_data(
        &self,
        log_type: u8,
        event_type: u16,
        zone: u16,
        area: u8,
    ) -> Result<()> {
        let command = Command::SystemLogDataWrite {
            log_type,
            event_type,
            zone,
            area,
        };
        self.send_command_for_ok(&command, self.default_timeout())
            .await
    }

    pub async fn get_real_time_clock(&self) -> Result<RealTimeClockReply> {
        self.request(Command::RealTimeClockDataRequest).await
    }

    /// Set the panel clock and return the clock as the panel now reports it.
    pub async fn set_real_time_clock(&self, time: NaiveDateTime) -> Result<RealTimeClockReply> {
        self.request(Command::RealTimeClockDataWrite { time }).await
    }

    /// Request the name of a zone, area, user and so on.
    ///
    /// If the requested name is blank the panel skips ahead to the next
    /// named address, so any description reply is accepted.
    pub async fn get_description(&self, description_type: u8, address: u16) -> Result<TextDescriptionReply> {
        self.request(Command::TextDescriptionRequest {
            description_type,
            address,
        })
        .await
    }

    pub async fn get_trouble_status(&self) -> Result<SystemTroubleStatusReply> {
        self.request(Command::SystemTroubleStatusRequest).await
    }

    pub async fn get_version_number(&self) -> Result<VersionNumberReply> {
        self.request(Command::VersionNumberRequest).await
    }

    pub async fn speak_word(&self, word: u16) -> Result<()> {
        self.send_command(&Command::SpeakWord { word }).await
    }

    pub async fn speak_phrase(&self, phrase: u16) -> Result<()> {
        self.send_command(&Command::SpeakPhrase { phrase }).await
    }

    pub async fn activate_task(&self, task: u16) -> Result<()> {
        self.send_command(&Command::TaskActivation { task }).await
    }

    pub async fn get_valid_user_code_areas(&self, code: &str) -> Result<UserCodeAreasReply> {
        let padded = pad_user_code(code);
        let command = Command::UserCodeAreasRequest {
            code: code.to_string(),
        };
        self.request_where(command, move |r: &UserCodeAreasReply| r.code == padded)
            .await
    }

    // Temperatures and thermostats

    pub async fn get_temperature_data(&self) -> Result<TemperatureDataReply> {
        self.request(Command::TemperatureDataRequest).await
    }

    pub async fn get_temperature(
        &self,
        device_type: TemperatureDeviceType,
        device: u8,
    ) -> Result<TemperatureReply> {
        self.request_where(
            Command::TemperatureRequest { device_type, device },
            move |r: &TemperatureReply| r.device_type == device_type && r.device == device,
        )
        .await
    }

    pub async fn get_thermostat_data(&self, thermostat: u8) -> Result<ThermostatDataReply> {
        self.request_where(
            Command::ThermostatDataRequest { thermostat },
            move |r: &ThermostatDataReply| r.thermostat == thermostat,
        )
        .await
    }

    /// Set one thermostat element and return the updated thermostat data.
    pub async fn set_thermostat(
        &self,
        thermostat: u8,
        value: u8,
        element: ThermostatElement,
    ) -> Result<ThermostatDataReply> {
        self.request_where(
            Command::ThermostatSet {
                thermostat,
                value,
                element,
            },
            move |r: &ThermostatDataReply| r.thermostat == thermostat,
        )
        .await
    }

    pub async fn set_thermostat_cool_set_point(
        &self,
        thermostat: u8,
        temperature: u8,
    ) -> Result<ThermostatDataReply> {
        self.set_thermostat(thermostat, temperature, ThermostatElement::CoolSetPoint)
            .await
    }

    pub async fn set_thermostat_heat_set_point(
        &self,
        thermostat: u8,
        temperature: u8,
    ) -> Result<ThermostatDataReply> {
        self.set_thermostat(thermostat, temperature, ThermostatElement::HeatSetPoint)
            .await
    }

    /// Run the fan continuously (`true`) or only when needed.
    pub async fn set_thermostat_fan(&self, thermostat: u8, on: bool) -> Result<ThermostatDataReply> {
        self.set_thermostat(thermostat, u8::from(on), ThermostatElement::Fan)
            .await
    }

    pub async fn set_thermostat_mode(
        &self,
        thermostat: u8,
        mode: ThermostatMode,
    ) -> Result<ThermostatDataReply> {
        self.set_thermostat(thermostat, mode.value(), ThermostatElement::Mode)
            .await
    }

    pub async fn set_thermostat_hold(&self, thermostat: u8, on: bool) -> Result<ThermostatDataReply> {
        self.set_thermostat(thermostat, u8::from(on), ThermostatElement::Hold)
            .await
    }

    /// Pass a raw request through to an Omnistat 2 thermostat.
    pub async fn get_omnistat2_data(&self, data: &str) -> Result<Omnistat2Reply> {
        self.request(Command::Omnistat2Request {
            data: data.to_string(),
        })
        .await
    }

    // Zones

    pub async fn toggle_bypass_for_zone(&self, code: &str, zone: u16) -> Result<ZoneBypassReply> {
        let command = Command::ZoneBypassRequest {
            zone,
            area: 1,
            code: code.to_string(),
        };
        self.request_where(command, move |r: &ZoneBypassReply| r.zone == zone)
            .await
    }

    /// Toggle bypass of every violated zone in an area.
    pub async fn toggle_bypass_for_area(&self, code: &str, area: u8) -> Result<ZoneBypassReply> {
        let command = Command::ZoneBypassRequest {
            zone: 0,
            area,
            code: code.to_string(),
        };
        self.request_where(command, |r: &ZoneBypassReply| r.zone == 0)
            .await
    }

    pub async fn get_zone_partitions(&self) -> Result<ZonePartitionsReport> {
        self.request(Command::ZonePartitionRequest).await
    }

    pub async fn get_zone_status(&self) -> Result<ZoneStatusReport> {
        self.request(Command::ZoneStatusRequest).await
    }

    pub async fn get_zone_definitions(&self) -> Result<ZoneDefinitionsReport> {
        self.request(Command::ZoneDefinitionRequest).await
    }

    pub async fn trigger_zone(&self, zone: u16) -> Result<()> {
        self.send_command(&Command::ZoneTrigger { zone }).await
    }

    pub async fn get_zone_voltage(&self, zone: u16) -> Result<ZoneVoltageReply> {
        self.request_where(Command::ZoneVoltageRequest { zone }, move |r: &ZoneVoltageReply| {
            r.zone == zone
        })
        .await
    }
}
