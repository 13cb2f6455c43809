// MIT License - Copyright (c) 2026 elk-m1-client contributors

/// X-10 function codes accepted by `pc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlcFunctionCode {
    AllUnitsOff,
    AllLightsOn,
    On,
    Off,
    Dim,
    Bright,
    AllLightsOff,
    ExtendedCode,
    PresetDim,
    ExtendedData,
    StatusRequest,
    HailRequest,
    HailAcknowledge,
    StatusOn,
    StatusOff,
}

impl PlcFunctionCode {
    pub fn value(&self) -> u8 {
        match self {
            Self::AllUnitsOff => 1,
            Self::AllLightsOn => 2,
            Self::On => 3,
            Self::Off => 4,
            Self::Dim => 5,
            Self::Bright => 6,
            Self::AllLightsOff => 7,
            Self::ExtendedCode => 8,
            Self::PresetDim => 9,
            Self::ExtendedData => 10,
            Self::StatusRequest => 11,
            Self::HailRequest => 12,
            Self::HailAcknowledge => 13,
            Self::StatusOn => 14,
            Self::StatusOff => 15,
        }
    }
}

/// Decode one `PS` level character: 0 is off, 1 is on, 2-99 is a dim level.
pub fn plc_level(c: char) -> Option<u8> {
    (c as u32)
        .checked_sub('0' as u32)
        .filter(|level| *level <= 99)
        .map(|level| level as u8)
}
