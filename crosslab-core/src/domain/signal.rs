//! Directional tags: trade direction, per-bar cross events, exit markers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trade or entry signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Close crossing the trend line on a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossEvent {
    #[default]
    None,
    Long,
    Short,
}

impl CrossEvent {
    /// The direction this event signals, if any.
    pub fn direction(self) -> Option<Direction> {
        match self {
            CrossEvent::None => None,
            CrossEvent::Long => Some(Direction::Long),
            CrossEvent::Short => Some(Direction::Short),
        }
    }

    pub fn is_some(self) -> bool {
        self != CrossEvent::None
    }
}

/// Why a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    /// The opposite cross event fired.
    CrossReversal,
    /// The oscillator histogram turned against the trade.
    MomentumFlip,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::CrossReversal => "CrossReversal",
            ExitReason::MomentumFlip => "MomentumFlip",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exit marker tagged with the direction of the trade being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitSignal {
    ExitLong,
    ExitShort,
}

impl ExitSignal {
    pub fn closing(direction: Direction) -> Self {
        match direction {
            Direction::Long => ExitSignal::ExitLong,
            Direction::Short => ExitSignal::ExitShort,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExitSignal::ExitLong => "exit_long",
            ExitSignal::ExitShort => "exit_short",
        }
    }
}

impl fmt::Display for ExitSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
