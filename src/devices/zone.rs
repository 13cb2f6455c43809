// MIT License - Copyright (c) 2026 elk-m1-client contributors

/// Physical state of a zone's wiring (low two bits of the status nibble).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZonePhysicalState {
    Unconfigured,
    Open,
    /// End-of-line resistor present: the normal, closed state.
    Eol,
    Short,
}

/// Logical state of a zone (high two bits of the status nibble).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneLogicalState {
    Normal,
    Trouble,
    Violated,
    Bypassed,
}

/// Status of one zone, packed by the panel into a single hex digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneStatus {
    pub physical: ZonePhysicalState,
    pub logical: ZoneLogicalState,
}

impl ZoneStatus {
    /// Decode the hex status digit used by `ZS` and `ZC` messages.
    pub fn from_hex_digit(c: char) -> Option<Self> {
        let nibble = c.to_digit(16)? as u8;
        let physical = match nibble & 0b0011 {
            0 => ZonePhysicalState::Unconfigured,
            1 => ZonePhysicalState::Open,
            2 => ZonePhysicalState::Eol,
            _ => ZonePhysicalState::Short,
        };
        let logical = match (nibble >> 2) & 0b0011 {
            0 => ZoneLogicalState::Normal,
            1 => ZoneLogicalState::Trouble,
            2 => ZoneLogicalState::Violated,
            _ => ZoneLogicalState::Bypassed,
        };
        Some(Self { physical, logical })
    }

    pub fn is_unconfigured(&self) -> bool {
        self.physical == ZonePhysicalState::Unconfigured
    }

    pub fn is_violated(&self) -> bool {
        self.logical == ZoneLogicalState::Violated
    }

    pub fn is_bypassed(&self) -> bool {
        self.logical == ZoneLogicalState::Bypassed
    }

    pub fn is_trouble(&self) -> bool {
        self.logical == ZoneLogicalState::Trouble
    }
}

/// Zone definition numbers reported by `ZD`, one character per zone
/// (`'0'` + definition, so values above 9 use the following ASCII characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ZoneDefinition {
    Disabled = 0,
    BurglarEntryExit1 = 1,
    BurglarEntryExit2 = 2,
    BurglarPerimeterInstant = 3,
    BurglarInterior = 4,
    BurglarInteriorFollower = 5,
    BurglarInteriorNight = 6,
    BurglarInteriorNightDelay = 7,
    Burglar24Hour = 8,
    BurglarBoxTamper = 9,
    FireAlarm = 10,
    FireVerified = 11,
    FireSupervisory = 12,
    AuxAlarm1 = 13,
    AuxAlarm2 = 14,
    KeyFob = 15,
    NonAlarm = 16,
    CarbonMonoxide = 17,
    EmergencyAlarm = 18,
    FreezeAlarm = 19,
    GasAlarm = 20,
    HeatAlarm = 21,
    MedicalAlarm = 22,
    PoliceAlarm = 23,
    PoliceNoIndication = 24,
    WaterAlarm = 25,
    KeyMomentaryArmDisarm = 26,
    KeyMomentaryArmAway = 27,
    KeyMomentaryArmStay = 28,
    KeyMomentaryDisarm = 29,
    KeyOnOff = 30,
    MuteAudibles = 31,
    PowerSupervisory = 32,
    Temperature = 33,
    AnalogZone = 34,
    PhoneKey = 35,
    IntercomKey = 36,
}

impl ZoneDefinition {
    /// Parse a definition from its number, or `None` if out of range.
    pub fn from_value(value: u8) -> Option<Self> {
        use ZoneDefinition::*;
        const ALL: [ZoneDefinition; 37] = [
            Disabled,
            BurglarEntryExit1,
            BurglarEntryExit2,
            BurglarPerimeterInstant,
            BurglarInterior,
            BurglarInteriorFollower,
            BurglarInteriorNight,
            BurglarInteriorNightDelay,
            Burglar24Hour,
            BurglarBoxTamper,
            FireAlarm,
            FireVerified,
            FireSupervisory,
            AuxAlarm1,
            AuxAlarm2,
            KeyFob,
            NonAlarm,
            CarbonMonoxide,
            EmergencyAlarm,
            FreezeAlarm,
            GasAlarm,
            HeatAlarm,
            MedicalAlarm,
            PoliceAlarm,
            PoliceNoIndication,
            WaterAlarm,
            KeyMomentaryArmDisarm,
            KeyMomentaryArmAway,
            KeyMomentaryArmStay,
            KeyMomentaryDisarm,
            KeyOnOff,
            MuteAudibles,
            PowerSupervisory,
            Temperature,
            AnalogZone,
            PhoneKey,
            IntercomKey,
        ];
        ALL.get(value as usize).copied()
    }

    /// Parse from the wire character (`'0'` offset).
    pub fn from_wire_char(c: char) -> Option<Self> {
        let value = (c as u32).checked_sub('0' as u32)?;
        u8::try_from(value).ok().and_then(Self::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_status_nibble() {
        let status = ZoneStatus::from_hex_digit('2').unwrap();
        assert_eq!(status.physical, ZonePhysicalState::Eol);
        assert_eq!(status.logical, ZoneLogicalState::Normal);

        let status = ZoneStatus::from_hex_digit('9').unwrap();
        assert_eq!(status.physical, ZonePhysicalState::Open);
        assert!(status.is_violated());

        let status = ZoneStatus::from_hex_digit('E').unwrap();
        assert_eq!(status.physical, ZonePhysicalState::Eol);
        assert!(status.is_bypassed());

        assert!(ZoneStatus::from_hex_digit('0').unwrap().is_unconfigured());
        assert!(ZoneStatus::from_hex_digit('G').is_none());
    }

    #[test]
    fn test_zone_definition_from_wire_char() {
        assert_eq!(ZoneDefinition::from_wire_char('0'), Some(ZoneDefinition::Disabled));
        assert_eq!(ZoneDefinition::from_wire_char('1'), Some(ZoneDefinition::BurglarEntryExit1));
        assert_eq!(ZoneDefinition::from_wire_char(':'), Some(ZoneDefinition::FireAlarm));
        assert_eq!(ZoneDefinition::from_wire_char('T'), Some(ZoneDefinition::IntercomKey));
        assert_eq!(ZoneDefinition::from_wire_char('U'), None);
        assert_eq!(ZoneDefinition::from_wire_char(' '), None);
    }
}
