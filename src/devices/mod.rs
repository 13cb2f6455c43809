// MIT License - Copyright (c) 2026 elk-m1-client contributors

pub mod area;
pub mod keypad;
pub mod lighting;
pub mod system;
pub mod thermostat;
pub mod zone;
