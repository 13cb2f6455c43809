// MIT License - Copyright (c) 2026 elk-m1-client contributors

/// Arming level requested with an `a0`–`a:` command.
///
/// The level is the character that follows `a` in the message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmingLevel {
    Disarm,
    ArmedAway,
    ArmedStay,
    ArmedStayInstant,
    ArmedNight,
    ArmedNightInstant,
    ArmedVacation,
    ArmToNextAwayMode,
    ArmToNextStayMode,
    ForceArmToAway,
    ForceArmToStay,
}

impl ArmingLevel {
    /// The character sent after `a` on the wire.
    pub fn wire_char(&self) -> char {
        match self {
            Self::Disarm => '0',
            Self::ArmedAway => '1',
            Self::ArmedStay => '2',
            Self::ArmedStayInstant => '3',
            Self::ArmedNight => '4',
            Self::ArmedNightInstant => '5',
            Self::ArmedVacation => '6',
            Self::ArmToNextAwayMode => '7',
            Self::ArmToNextStayMode => '8',
            Self::ForceArmToAway => '9',
            Self::ForceArmToStay => ':',
        }
    }

    /// Parse from a user-facing name (used by the CLI).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "disarm" => Some(Self::Disarm),
            "away" => Some(Self::ArmedAway),
            "stay" => Some(Self::ArmedStay),
            "stay-instant" => Some(Self::ArmedStayInstant),
            "night" => Some(Self::ArmedNight),
            "night-instant" => Some(Self::ArmedNightInstant),
            "vacation" => Some(Self::ArmedVacation),
            "next-away" => Some(Self::ArmToNextAwayMode),
            "next-stay" => Some(Self::ArmToNextStayMode),
            "force-away" => Some(Self::ForceArmToAway),
            "force-stay" => Some(Self::ForceArmToStay),
            _ => None,
        }
    }
}

/// Current arming status of an area, as reported by `AS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmingStatus {
    Disarmed,
    ArmedAway,
    ArmedStay,
    ArmedStayInstant,
    ArmedNight,
    ArmedNightInstant,
    ArmedVacation,
}

impl ArmingStatus {
    pub fn from_wire_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Disarmed),
            '1' => Some(Self::ArmedAway),
            '2' => Some(Self::ArmedStay),
            '3' => Some(Self::ArmedStayInstant),
            '4' => Some(Self::ArmedNight),
            '5' => Some(Self::ArmedNightInstant),
            '6' => Some(Self::ArmedVacation),
            _ => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        *self != Self::Disarmed
    }
}

/// Readiness of an area to arm, as reported by `AS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmUpState {
    NotReadyToArm,
    ReadyToArm,
    ReadyToForceArm,
    ArmedWithExitTimer,
    ArmedFully,
    ForceArmedWithViolatedZone,
    ArmedWithBypass,
}

impl ArmUpState {
    pub fn from_wire_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::NotReadyToArm),
            '1' => Some(Self::ReadyToArm),
            '2' => Some(Self::ReadyToForceArm),
            '3' => Some(Self::ArmedWithExitTimer),
            '4' => Some(Self::ArmedFully),
            '5' => Some(Self::ForceArmedWithViolatedZone),
            '6' => Some(Self::ArmedWithBypass),
            _ => None,
        }
    }
}

/// Alarm state of an area: `'0'` for no alarm, otherwise a code for the kind
/// of alarm (entrance delay, fire, burglar, ...). Kept as the raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlarmState(pub char);

impl AlarmState {
    /// No alarm and no entrance delay running.
    pub fn is_clear(&self) -> bool {
        self.0 == '0'
    }

    /// An entrance delay is running (no alarm yet).
    pub fn is_entrance_delay(&self) -> bool {
        self.0 == '1'
    }

    /// An actual alarm condition (anything past the entrance delay).
    pub fn is_alarm(&self) -> bool {
        !self.is_clear() && !self.is_entrance_delay()
    }
}

/// Arming information for one area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaStatus {
    /// 1-based area number.
    pub area: u8,
    pub arming_status: ArmingStatus,
    pub arm_up_state: ArmUpState,
    pub alarm_state: AlarmState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arming_level_wire_chars() {
        assert_eq!(ArmingLevel::Disarm.wire_char(), '0');
        assert_eq!(ArmingLevel::ArmedAway.wire_char(), '1');
        assert_eq!(ArmingLevel::ForceArmToStay.wire_char(), ':');
    }

    #[test]
    fn test_arming_level_from_name() {
        assert_eq!(ArmingLevel::from_name("Away"), Some(ArmingLevel::ArmedAway));
        assert_eq!(ArmingLevel::from_name("night-instant"), Some(ArmingLevel::ArmedNightInstant));
        assert_eq!(ArmingLevel::from_name("sideways"), None);
    }

    #[test]
    fn test_alarm_state() {
        assert!(AlarmState('0').is_clear());
        assert!(AlarmState('1').is_entrance_delay());
        assert!(!AlarmState('1').is_alarm());
        assert!(AlarmState('3').is_alarm());
    }

    #[test]
    fn test_arming_status_is_armed() {
        assert!(!ArmingStatus::from_wire_char('0').unwrap().is_armed());
        assert!(ArmingStatus::from_wire_char('2').unwrap().is_armed());
        assert!(ArmingStatus::from_wire_char('7').is_none());
    }
}
