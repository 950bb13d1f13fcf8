use serde::{Deserialize, Serialize};

use smartstore_core::ShelfLabel;

/// Lower bound (inclusive) for the severity value assigned when a shelf
/// goes empty.
pub const EMPTY_MINUTES_MIN: u32 = 1;

/// Upper bound (inclusive) for the severity value assigned when a shelf
/// goes empty.
pub const EMPTY_MINUTES_MAX: u32 = 15;

/// Customer-traffic tag assigned at shelf creation, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traffic {
    Low,
    Medium,
    High,
}

impl core::fmt::Display for Traffic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Traffic::Low => "low",
            Traffic::Medium => "medium",
            Traffic::High => "high",
        };
        f.write_str(s)
    }
}

/// Shelf stocking status. Every shelf is in exactly one of these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShelfStatus {
    Full,
    Empty,
}

impl core::fmt::Display for ShelfStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ShelfStatus::Full => "full",
            ShelfStatus::Empty => "empty",
        };
        f.write_str(s)
    }
}

/// A stocking slot with a status, a severity value, and a traffic tag.
///
/// `empty_minutes` is a severity assigned at the moment the shelf becomes
/// empty; it is not advanced by wall-clock time and is zeroed on restock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    pub(crate) label: ShelfLabel,
    pub(crate) status: ShelfStatus,
    pub(crate) empty_minutes: u32,
    pub(crate) traffic: Traffic,
}

impl Shelf {
    /// A freshly stocked shelf.
    pub fn new(label: ShelfLabel, traffic: Traffic) -> Self {
        Self {
            label,
            status: ShelfStatus::Full,
            empty_minutes: 0,
            traffic,
        }
    }

    /// Test/fixture constructor for a shelf that is already empty.
    pub fn empty_with_minutes(label: ShelfLabel, traffic: Traffic, empty_minutes: u32) -> Self {
        Self {
            label,
            status: ShelfStatus::Empty,
            empty_minutes,
            traffic,
        }
    }

    pub fn label(&self) -> &ShelfLabel {
        &self.label
    }

    pub fn status(&self) -> ShelfStatus {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.status == ShelfStatus::Empty
    }

    pub fn empty_minutes(&self) -> u32 {
        self.empty_minutes
    }

    pub fn traffic(&self) -> Traffic {
        self.traffic
    }
}
