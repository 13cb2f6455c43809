// MIT License - Copyright (c) 2026 elk-m1-client contributors

use bitflags::bitflags;

bitflags! {
    /// System trouble flags parsed from the 34-character `SS` reply.
    ///
    /// Each character position is one trouble condition; `'0'` means clear.
    /// Positions not listed here are reserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SystemTroubles: u64 {
        const AC_FAIL                 = 1 << 0;
        const BOX_TAMPER              = 1 << 1;
        const FAIL_TO_COMMUNICATE     = 1 << 2;
        const EEPROM_MEMORY_ERROR     = 1 << 3;
        const LOW_BATTERY_CONTROL     = 1 << 4;
        const TRANSMITTER_LOW_BATTERY = 1 << 5;
        const OVER_CURRENT            = 1 << 6;
        const TELEPHONE_FAULT         = 1 << 7;
        const OUTPUT_2                = 1 << 9;
        const MISSING_KEYPAD          = 1 << 10;
        const ZONE_EXPANDER           = 1 << 11;
        const OUTPUT_EXPANDER         = 1 << 12;
        const REMOTE_PROGRAMMING      = 1 << 14;
        const COMMON_AREA_NOT_ARMED   = 1 << 16;
        const FLASH_MEMORY_ERROR      = 1 << 17;
        const SECURITY_ALERT          = 1 << 18;
        const SERIAL_PORT_EXPANDER    = 1 << 19;
        const LOST_TRANSMITTER        = 1 << 20;
        const SMOKE_DETECTOR_CLEAN_ME = 1 << 21;
        const ETHERNET                = 1 << 22;
        const KEYPAD_MESSAGE_LINE_1   = 1 << 30;
        const KEYPAD_MESSAGE_LINE_2   = 1 << 31;
        const FIRE_TROUBLE            = 1 << 32;
    }
}

impl SystemTroubles {
    /// Parse the trouble string: every non-`'0'` character at a known position
    /// sets the corresponding flag.
    pub fn from_status_string(s: &str) -> Self {
        s.chars()
            .take(64)
            .enumerate()
            .filter(|(_, c)| *c != '0')
            .fold(Self::empty(), |flags, (i, _)| {
                flags | Self::from_bits_truncate(1u64 << i)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_troubles() {
        let s = "0".repeat(34);
        assert!(SystemTroubles::from_status_string(&s).is_empty());
    }

    #[test]
    fn test_trouble_positions() {
        let mut s: Vec<char> = "0".repeat(34).chars().collect();
        s[0] = '1';
        s[22] = '1';
        s[32] = '1';
        // reserved position is ignored
        s[8] = '1';
        let s: String = s.into_iter().collect();
        let flags = SystemTroubles::from_status_string(&s);
        assert_eq!(
            flags,
            SystemTroubles::AC_FAIL | SystemTroubles::ETHERNET | SystemTroubles::FIRE_TROUBLE
        );
    }
}
