//! One interactive session: a store, an advisor, and a randomness source.

use anyhow::Result;
use rand::rngs::StdRng;

use smartstore_advisor::{DecisionSource, FallbackReason, RestockAdvisor};
use smartstore_store::{RobotPosition, StoreState};

/// How many log entries the status view shows, newest first.
const LOG_TAIL: usize = 10;

pub struct Session {
    store: StoreState,
    advisor: RestockAdvisor,
    rng: StdRng,
}

impl Session {
    pub fn new(advisor: RestockAdvisor, rng: StdRng) -> Self {
        Self {
            store: StoreState::starting(),
            advisor,
            rng,
        }
    }

    /// Mark a random shelf empty.
    pub fn mark_empty(&mut self) {
        let label = self.store.make_empty(&mut self.rng);
        println!("Shelf {label} is now empty");
    }

    /// Ask the advisor for a target and restock it. A store with no empty
    /// shelves is a notice, not an error, and mutates nothing.
    pub fn restock(&mut self) -> Result<()> {
        let empty = self.store.empty_shelves();
        if empty.is_empty() {
            println!("No empty shelves to restock");
            return Ok(());
        }

        let decision = self.advisor.decide(&empty)?;
        match &decision.source {
            DecisionSource::Advisory => {}
            // The disconnected mode is logged once at startup; only real
            // advisory failures warrant a per-decision notice.
            DecisionSource::Fallback(FallbackReason::NoCredential) => {}
            DecisionSource::Fallback(reason) => {
                println!("Warning: {reason}. Using fallback decision.");
            }
        }

        self.store.restock(&decision.label)?;
        println!("Robot is restocking Shelf {} (AI decision)", decision.label);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.store.reset();
        println!("Store reset");
    }

    /// Shelf grid, metrics, and the recent log.
    pub fn print_status(&self) {
        println!("Shelf Status");
        for shelf in self.store.shelves() {
            let here = match self.store.robot_position() {
                RobotPosition::Shelf(l) if l == shelf.label() => "  [robot]",
                _ => "",
            };
            println!(
                "  Shelf {}: status={}, traffic={}, empty_minutes={}{}",
                shelf.label(),
                shelf.status(),
                shelf.traffic(),
                shelf.empty_minutes(),
                here
            );
        }
        println!(
            "Metrics: tasks_completed={}, empty_shelves={}, robot_position={}",
            self.store.tasks_completed(),
            self.store.empty_count(),
            self.store.robot_position()
        );
        if self.store.log().is_empty() {
            println!("Action log: (empty)");
        } else {
            println!("Action log (newest first):");
            for entry in self.store.recent_log(LOG_TAIL) {
                println!("  - {entry}");
            }
        }
    }
}
