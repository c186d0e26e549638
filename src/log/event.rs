use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Channel;

/// What an event does to its channel
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Set the discrete level (0 = low, nonzero = high)
    SetDigital,
    /// Set the analog intensity; nonzero counts as "on"
    SetDutyCycle,
    /// Set the carrier frequency, level untouched
    SetFrequency,
    /// Force the level to 0, frequency untouched
    ChannelStop,
    /// Anything the producer emitted that we don't model (kept, never applied)
    Unknown(String),
}

impl Action {
    /// Map a producer action name onto an action kind.
    ///
    /// Accepts both the canonical names and the RPi.GPIO-style names the
    /// simulation service writes into its logs. Never fails: unrecognised
    /// names become [`Action::Unknown`].
    pub fn parse(name: &str) -> Self {
        match name {
            "set-digital" | "GPIO.output" => Action::SetDigital,
            "set-duty-cycle" | "PWM.start" | "PWM.ChangeDutyCycle" => Action::SetDutyCycle,
            "set-frequency" | "PWM.init" | "PWM.ChangeFrequency" => Action::SetFrequency,
            "channel-stop" | "PWM.stop" => Action::ChannelStop,
            other => Action::Unknown(other.to_string()),
        }
    }

    /// Canonical name of this action
    pub fn name(&self) -> &str {
        match self {
            Action::SetDigital => "set-digital",
            Action::SetDutyCycle => "set-duty-cycle",
            Action::SetFrequency => "set-frequency",
            Action::ChannelStop => "channel-stop",
            Action::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Action::Unknown(_))
    }
}

impl FromStr for Action {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Action::parse(s))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single timestamped mutation of one channel
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Seconds from simulation start (never negative)
    pub time: f64,
    pub action: Action,
    pub channel: Channel,
    pub value: i64,
}

impl Event {
    pub fn new(time: f64, action: Action, channel: Channel, value: i64) -> Self {
        Self {
            time,
            action,
            channel,
            value,
        }
    }

    pub fn digital(time: f64, channel: Channel, value: i64) -> Self {
        Self::new(time, Action::SetDigital, channel, value)
    }

    pub fn duty_cycle(time: f64, channel: Channel, value: i64) -> Self {
        Self::new(time, Action::SetDutyCycle, channel, value)
    }

    pub fn frequency(time: f64, channel: Channel, hz: i64) -> Self {
        Self::new(time, Action::SetFrequency, channel, hz)
    }

    pub fn stop(time: f64, channel: Channel) -> Self {
        Self::new(time, Action::ChannelStop, channel, 0)
    }
}

/// Value column as the producer writes it.
///
/// Python's RPi.GPIO accepts `True`/`False` and float duty cycles, so the
/// log can carry any of these.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl RawValue {
    /// Integer view of the value; floats round to nearest, non-finite floats are rejected
    pub fn as_int(self) -> Option<i64> {
        match self {
            RawValue::Bool(b) => Some(b as i64),
            RawValue::Int(v) => Some(v),
            RawValue::Float(v) if v.is_finite() => Some(v.round() as i64),
            RawValue::Float(_) => None,
        }
    }
}

/// An event record before validation
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub time: f64,
    pub action: String,
    /// Pin number; the producer writes `null` for calls without a pin
    #[cfg_attr(feature = "serde", serde(alias = "pin", default))]
    pub channel: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<RawValue>,
}

/// Why a raw record was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    MissingChannel,
    NegativeChannel,
    ChannelOutOfRange,
    NegativeTime,
    NonFiniteTime,
    NonFiniteValue,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Malformed::MissingChannel => "missing channel",
            Malformed::NegativeChannel => "negative channel",
            Malformed::ChannelOutOfRange => "channel out of range",
            Malformed::NegativeTime => "negative time",
            Malformed::NonFiniteTime => "time is not finite",
            Malformed::NonFiniteValue => "value is not finite",
        };
        f.write_str(reason)
    }
}

/// Event times must be finite and not before the start of the run
pub(crate) fn check_time(time: f64) -> Result<(), Malformed> {
    if !time.is_finite() {
        return Err(Malformed::NonFiniteTime);
    }
    if time < 0.0 {
        return Err(Malformed::NegativeTime);
    }
    Ok(())
}

impl RawEvent {
    pub fn new(time: f64, action: impl Into<String>, channel: i64, value: i64) -> Self {
        Self {
            time,
            action: action.into(),
            channel: Some(channel),
            value: Some(RawValue::Int(value)),
        }
    }

    /// Validate into an [`Event`]
    pub fn validate(&self) -> Result<Event, Malformed> {
        check_time(self.time)?;

        let channel = match self.channel {
            None => return Err(Malformed::MissingChannel),
            Some(c) if c < 0 => return Err(Malformed::NegativeChannel),
            Some(c) => Channel::try_from(c).map_err(|_| Malformed::ChannelOutOfRange)?,
        };

        // PWM.stop is logged without a value
        let value = match self.value {
            None => 0,
            Some(v) => v.as_int().ok_or(Malformed::NonFiniteValue)?,
        };

        Ok(Event::new(
            self.time,
            Action::parse(&self.action),
            channel,
            value,
        ))
    }
}
