use rand::Rng;
use serde::{Deserialize, Serialize};

use smartstore_core::{DomainError, DomainResult, ShelfLabel};

use crate::shelf::{Shelf, ShelfStatus, Traffic, EMPTY_MINUTES_MAX, EMPTY_MINUTES_MIN};

/// Where the robot last was: a shelf it restocked, or the dock when idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotPosition {
    Dock,
    Shelf(ShelfLabel),
}

impl core::fmt::Display for RobotPosition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RobotPosition::Dock => f.write_str("Dock"),
            RobotPosition::Shelf(label) => core::fmt::Display::fmt(label, f),
        }
    }
}

/// Single source of truth for shelf states and session counters.
///
/// Caller-owned; there is exactly one per running session and only one caller
/// ever mutates it, so every operation is a single atomic step from the
/// model's perspective. Shelf order is fixed at construction and doubles as
/// display order and fallback tie-break order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    shelves: Vec<Shelf>,
    robot_position: RobotPosition,
    tasks_completed: u64,
    log: Vec<String>,
}

impl StoreState {
    /// Build a store with the given shelf layout, all shelves full, robot at
    /// the dock. Labels must be unique and the layout non-empty.
    pub fn with_layout(layout: Vec<(ShelfLabel, Traffic)>) -> DomainResult<Self> {
        if layout.is_empty() {
            return Err(DomainError::validation("store needs at least one shelf"));
        }
        let mut shelves: Vec<Shelf> = Vec::with_capacity(layout.len());
        for (label, traffic) in layout {
            if shelves.iter().any(|s| s.label == label) {
                return Err(DomainError::validation(format!(
                    "duplicate shelf label: {label}"
                )));
            }
            shelves.push(Shelf::new(label, traffic));
        }
        Ok(Self {
            shelves,
            robot_position: RobotPosition::Dock,
            tasks_completed: 0,
            log: Vec::new(),
        })
    }

    /// The fixed reference layout: A (high), B (low), C (medium).
    pub fn starting() -> Self {
        let layout = vec![
            (ShelfLabel::parse("A").expect("static label"), Traffic::High),
            (ShelfLabel::parse("B").expect("static label"), Traffic::Low),
            (
                ShelfLabel::parse("C").expect("static label"),
                Traffic::Medium,
            ),
        ];
        Self::with_layout(layout).expect("static layout is valid")
    }

    /// Shelves in display order.
    pub fn shelves(&self) -> &[Shelf] {
        &self.shelves
    }

    pub fn shelf(&self, label: &ShelfLabel) -> Option<&Shelf> {
        self.shelves.iter().find(|s| &s.label == label)
    }

    /// The empty subset, preserving shelf order.
    pub fn empty_shelves(&self) -> Vec<Shelf> {
        self.shelves
            .iter()
            .filter(|s| s.is_empty())
            .cloned()
            .collect()
    }

    pub fn empty_count(&self) -> usize {
        self.shelves.iter().filter(|s| s.is_empty()).count()
    }

    pub fn robot_position(&self) -> &RobotPosition {
        &self.robot_position
    }

    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Up to `n` most recent log entries, newest first.
    pub fn recent_log(&self, n: usize) -> impl Iterator<Item = &str> {
        self.log.iter().rev().take(n).map(String::as_str)
    }

    /// Mark one shelf empty, chosen uniformly at random from *all* shelves.
    ///
    /// An already-empty shelf is simply re-randomized; this is an idempotent
    /// re-trigger, not a failure. Returns the chosen label.
    pub fn make_empty(&mut self, rng: &mut impl Rng) -> ShelfLabel {
        let idx = rng.gen_range(0..self.shelves.len());
        let shelf = &mut self.shelves[idx];
        shelf.status = ShelfStatus::Empty;
        shelf.empty_minutes = rng.gen_range(EMPTY_MINUTES_MIN..=EMPTY_MINUTES_MAX);
        let label = shelf.label.clone();
        self.log.push(format!("Shelf {label} became empty"));
        label
    }

    /// Restock a currently-empty shelf: mark it full, move the robot there,
    /// bump the task counter.
    pub fn restock(&mut self, label: &ShelfLabel) -> DomainResult<()> {
        let shelf = self
            .shelves
            .iter_mut()
            .find(|s| &s.label == label)
            .ok_or_else(DomainError::not_found)?;
        if !shelf.is_empty() {
            return Err(DomainError::invariant(format!(
                "shelf {label} is not empty"
            )));
        }
        shelf.status = ShelfStatus::Full;
        shelf.empty_minutes = 0;
        self.robot_position = RobotPosition::Shelf(label.clone());
        self.tasks_completed += 1;
        self.log
            .push(format!("Robot restocked Shelf {label} (AI decision)"));
        Ok(())
    }

    /// Restore the initial configuration: all shelves full, robot at the
    /// dock, counter zeroed, log cleared. Traffic tags are static and kept.
    pub fn reset(&mut self) {
        for shelf in &mut self.shelves {
            shelf.status = ShelfStatus::Full;
            shelf.empty_minutes = 0;
        }
        self.robot_position = RobotPosition::Dock;
        self.tasks_completed = 0;
        self.log.clear();
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::starting()
    }
}
