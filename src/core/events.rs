use crate::domain::model::Port;
use crate::utils::error::{DevsError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Simulation time as the CD++ engine writes it: `HH:MM:SS:mmm[:remainder]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirtualTime {
    hours: u32,
    minutes: u32,
    seconds: u32,
    millis: u32,
    remainder: f64,
}

impl VirtualTime {
    pub fn new(hours: u32, minutes: u32, seconds: u32, millis: u32, remainder: f64) -> Result<Self> {
        if minutes >= 60 {
            return Err(bad_time(format!("minutes should be less than 60, but is {}", minutes)));
        }
        if seconds >= 60 {
            return Err(bad_time(format!("seconds should be less than 60, but is {}", seconds)));
        }
        if millis >= 1000 {
            return Err(bad_time(format!("milliseconds should be less than 1000, but is {}", millis)));
        }
        if !remainder.is_finite() || remainder < 0.0 {
            return Err(bad_time(format!("remainder should be a non-negative number, but is {}", remainder)));
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
            millis,
            remainder,
        })
    }

    pub fn zero() -> Self {
        Self {
            hours: 0,
            minutes: 0,
            seconds: 0,
            millis: 0,
            remainder: 0.0,
        }
    }

    /// Normalizes `total` milliseconds into hours, minutes, seconds and millis.
    pub fn from_millis(total: u64) -> Result<Self> {
        let total_seconds = total / 1000;
        let hours = u32::try_from(total_seconds / 3600)
            .map_err(|_| bad_time(format!("{} milliseconds exceed the representable hours", total)))?;
        Ok(Self {
            hours,
            minutes: ((total_seconds / 60) % 60) as u32,
            seconds: (total_seconds % 60) as u32,
            millis: (total % 1000) as u32,
            remainder: 0.0,
        })
    }

    pub fn of_seconds(seconds: u64) -> Result<Self> {
        Self::from_millis(scaled(seconds, 1000, "seconds")?)
    }

    pub fn of_minutes(minutes: u64) -> Result<Self> {
        Self::from_millis(scaled(minutes, 60_000, "minutes")?)
    }

    pub fn of_hours(hours: u64) -> Result<Self> {
        Self::from_millis(scaled(hours, 3_600_000, "hours")?)
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn millis(&self) -> u32 {
        self.millis
    }

    pub fn remainder(&self) -> f64 {
        self.remainder
    }

    /// Whole milliseconds, ignoring the remainder.
    pub fn total_millis(&self) -> u64 {
        u64::from(self.hours) * 3_600_000
            + u64::from(self.minutes) * 60_000
            + u64::from(self.seconds) * 1000
            + u64::from(self.millis)
    }
}

fn bad_time(message: String) -> DevsError {
    DevsError::BadVirtualTime { message }
}

fn scaled(value: u64, millis_per_unit: u64, unit: &str) -> Result<u64> {
    value
        .checked_mul(millis_per_unit)
        .ok_or_else(|| bad_time(format!("{} {} overflow the millisecond range", value, unit)))
}

impl PartialOrd for VirtualTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.total_millis().cmp(&other.total_millis()) {
            Ordering::Equal => self.remainder.partial_cmp(&other.remainder),
            ord => Some(ord),
        }
    }
}

impl fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:03}",
            self.hours, self.minutes, self.seconds, self.millis
        )?;
        if self.remainder != 0.0 {
            write!(f, ":{}", self.remainder)?;
        }
        Ok(())
    }
}

impl FromStr for VirtualTime {
    type Err = DevsError;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.trim().split(':').collect();
        if fields.len() != 4 && fields.len() != 5 {
            return Err(bad_time(format!("'{}' is not HH:MM:SS:mmm[:remainder]", s)));
        }
        let unit = |index: usize| -> Result<u32> {
            fields[index]
                .parse::<u32>()
                .map_err(|e| bad_time(format!("'{}' in '{}': {}", fields[index], s, e)))
        };
        let remainder = match fields.get(4) {
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|e| bad_time(format!("'{}' in '{}': {}", raw, s, e)))?,
            None => 0.0,
        };
        Self::new(unit(0)?, unit(1)?, unit(2)?, unit(3)?, remainder)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Scalar(f64),
    List(Vec<f64>),
}

impl From<f64> for EventValue {
    fn from(value: f64) -> Self {
        EventValue::Scalar(value)
    }
}

impl From<Vec<f64>> for EventValue {
    fn from(values: Vec<f64>) -> Self {
        EventValue::List(values)
    }
}

impl fmt::Display for EventValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventValue::Scalar(value) => write!(f, "{}", value),
            EventValue::List(values) => {
                let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", joined.join(","))
            }
        }
    }
}

/// External input injected into a port of the top model at a given time.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub time: VirtualTime,
    pub port: String,
    pub value: EventValue,
}

impl Event {
    pub fn new(time: VirtualTime, port: &Port, value: impl Into<EventValue>) -> Self {
        Self::on_port_named(time, port.name(), value)
    }

    pub fn on_port_named(time: VirtualTime, port: impl Into<String>, value: impl Into<EventValue>) -> Self {
        Self {
            time,
            port: port.into(),
            value: value.into(),
        }
    }

    pub fn serialize(&self) -> String {
        format!("{} {} {};", self.time, self.port, self.value)
    }
}

/// Events file contents, one event per line.
pub fn serialize_events(events: &[Event]) -> String {
    events
        .iter()
        .map(|event| event.serialize() + "\n")
        .collect()
}
