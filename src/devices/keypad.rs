// MIT License - Copyright (c) 2026 elk-m1-client contributors

/// A keypad key that can be pressed remotely with `kf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKey {
    /// No key; the panel just reports the keypad state.
    None,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    Star,
    Chime,
}

impl FunctionKey {
    pub fn wire_char(&self) -> char {
        match self {
            Self::None => '0',
            Self::F1 => '1',
            Self::F2 => '2',
            Self::F3 => '3',
            Self::F4 => '4',
            Self::F5 => '5',
            Self::F6 => '6',
            Self::Star => '*',
            Self::Chime => 'C',
        }
    }

    pub fn from_wire_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::None),
            '1' => Some(Self::F1),
            '2' => Some(Self::F2),
            '3' => Some(Self::F3),
            '4' => Some(Self::F4),
            '5' => Some(Self::F5),
            '6' => Some(Self::F6),
            '*' => Some(Self::Star),
            'C' => Some(Self::Chime),
            _ => None,
        }
    }
}

/// LED state of one function key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIllumination {
    Off,
    On,
    Blinking,
}

impl KeyIllumination {
    pub fn from_wire_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Off),
            '1' => Some(Self::On),
            '2' => Some(Self::Blinking),
            _ => None,
        }
    }
}
