use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Channel;

/// How many channels a device consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotShape {
    Single,
    Dual,
    Multi,
}

/// Devices a run can be visualised with
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Lamp on one pin
    Led,
    /// Speaker on one pin; reads level and frequency
    Buzzer,
    /// HC-SR04 style proximity sensor: trigger and echo pins
    Ultrasonic,
    /// Four-digit seven-segment display, eight segment pins and four digit selects
    SevenSegment,
}

const SINGLE_SLOTS: &[&str] = &["pin"];
const ULTRASONIC_SLOTS: &[&str] = &["trig", "echo"];
const SEVEN_SEGMENT_SLOTS: &[&str] = &[
    "a", "b", "c", "d", "e", "f", "g", "dp", "d1", "d2", "d3", "d4",
];

/// Conventional seven-segment wiring: segments a..g, dp then digits d1..d4.
/// Same order as [`DeviceKind::slot_names`].
pub const SEVEN_SEGMENT_STANDARD_WIRING: [Channel; 12] = [2, 3, 4, 17, 27, 22, 10, 9, 11, 5, 6, 13];

impl DeviceKind {
    pub const ALL: [DeviceKind; 4] = [
        DeviceKind::Led,
        DeviceKind::Buzzer,
        DeviceKind::Ultrasonic,
        DeviceKind::SevenSegment,
    ];

    pub fn shape(self) -> SlotShape {
        match self {
            DeviceKind::Led | DeviceKind::Buzzer => SlotShape::Single,
            DeviceKind::Ultrasonic => SlotShape::Dual,
            DeviceKind::SevenSegment => SlotShape::Multi,
        }
    }

    /// Required slot names, fixed per kind
    pub fn slot_names(self) -> &'static [&'static str] {
        match self {
            DeviceKind::Led | DeviceKind::Buzzer => SINGLE_SLOTS,
            DeviceKind::Ultrasonic => ULTRASONIC_SLOTS,
            DeviceKind::SevenSegment => SEVEN_SEGMENT_SLOTS,
        }
    }

    /// Wiring to pre-fill when every channel of it is available
    pub fn standard_wiring(self) -> Option<&'static [Channel]> {
        match self {
            DeviceKind::SevenSegment => Some(&SEVEN_SEGMENT_STANDARD_WIRING),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceKind::Led => "led",
            DeviceKind::Buzzer => "buzzer",
            DeviceKind::Ultrasonic => "ultrasonic",
            DeviceKind::SevenSegment => "seven-segment",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown device kind `{0}` (expected led, buzzer, ultrasonic or seven-segment)")]
pub struct UnknownKind(pub String);

impl FromStr for DeviceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "led" | "lamp" => Ok(DeviceKind::Led),
            "buzzer" | "speaker" => Ok(DeviceKind::Buzzer),
            "ultrasonic" | "hc-sr04" => Ok(DeviceKind::Ultrasonic),
            "seven-segment" | "7-segment" | "sevenseg" => Ok(DeviceKind::SevenSegment),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}
