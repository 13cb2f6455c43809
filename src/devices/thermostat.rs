// MIT License - Copyright (c) 2026 elk-m1-client contributors

/// Thermostat operating mode (`TR` mode digit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThermostatMode {
    Off,
    Heat,
    Cool,
    Auto,
    EmergencyHeat,
}

impl ThermostatMode {
    pub fn from_wire_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Off),
            '1' => Some(Self::Heat),
            '2' => Some(Self::Cool),
            '3' => Some(Self::Auto),
            '4' => Some(Self::EmergencyHeat),
            _ => None,
        }
    }

    /// Numeric value used when setting the mode with `ts`.
    pub fn value(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Heat => 1,
            Self::Cool => 2,
            Self::Auto => 3,
            Self::EmergencyHeat => 4,
        }
    }
}

/// Which thermostat setting a `ts` command changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThermostatElement {
    Mode,
    Hold,
    Fan,
    CoolSetPoint,
    HeatSetPoint,
}

impl ThermostatElement {
    pub fn wire_char(&self) -> char {
        match self {
            Self::Mode => '0',
            Self::Hold => '1',
            Self::Fan => '2',
            Self::CoolSetPoint => '4',
            Self::HeatSetPoint => '5',
        }
    }
}

/// Source of a temperature reading for `st`/`ST`.
///
/// The panel reports each source with its own offset so that negative
/// readings fit in three unsigned digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemperatureDeviceType {
    ZoneProbe,
    Keypad,
    Thermostat,
}

impl TemperatureDeviceType {
    pub fn wire_char(&self) -> char {
        match self {
            Self::ZoneProbe => '0',
            Self::Keypad => '1',
            Self::Thermostat => '2',
        }
    }

    pub fn from_wire_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::ZoneProbe),
            '1' => Some(Self::Keypad),
            '2' => Some(Self::Thermostat),
            _ => None,
        }
    }

    /// Offset subtracted from the raw reading to get degrees.
    pub fn offset(&self) -> i16 {
        match self {
            Self::ZoneProbe => 60,
            Self::Keypad => 40,
            Self::Thermostat => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trip_values() {
        for c in ['0', '1', '2', '3', '4'] {
            let mode = ThermostatMode::from_wire_char(c).unwrap();
            assert_eq!(char::from(b'0' + mode.value()), c);
        }
        assert!(ThermostatMode::from_wire_char('5').is_none());
    }

    #[test]
    fn test_temperature_offsets() {
        assert_eq!(TemperatureDeviceType::ZoneProbe.offset(), 60);
        assert_eq!(TemperatureDeviceType::Keypad.offset(), 40);
        assert_eq!(TemperatureDeviceType::Thermostat.offset(), 0);
    }
}
