//! End-to-end decision flow: empty shelves in, restocked store out.

use rand::rngs::StdRng;
use rand::SeedableRng;

use smartstore_advisor::{DecisionSource, FallbackReason, RestockAdvisor};
use smartstore_core::ShelfLabel;
use smartstore_store::{RobotPosition, Shelf, ShelfStatus, StoreState, Traffic};

fn label(s: &str) -> ShelfLabel {
    ShelfLabel::parse(s).unwrap()
}

#[test]
fn disconnected_decision_picks_the_most_severe_shelf() {
    // A empty for 3, B empty for 9, C full (so absent from the subset).
    let empty = vec![
        Shelf::empty_with_minutes(label("A"), Traffic::High, 3),
        Shelf::empty_with_minutes(label("B"), Traffic::Low, 9),
    ];

    let decision = RestockAdvisor::disconnected().decide(&empty).unwrap();

    assert_eq!(decision.label, label("B"));
    assert_eq!(
        decision.source,
        DecisionSource::Fallback(FallbackReason::NoCredential)
    );
}

#[test]
fn restocking_the_decided_shelf_updates_the_store() {
    let mut store = StoreState::starting();
    let target = label("B");

    // Empty shelves (varying the seed) until B is among them.
    let mut seed = 0u64;
    while !store.shelf(&target).unwrap().is_empty() {
        store.make_empty(&mut StdRng::seed_from_u64(seed));
        seed += 1;
        assert!(seed < 1_000, "seed sweep failed to empty shelf B");
    }

    let empty = store.empty_shelves();
    assert!(empty.iter().any(|s| s.label() == &target));

    store.restock(&target).unwrap();

    assert_eq!(store.tasks_completed(), 1);
    assert_eq!(store.robot_position(), &RobotPosition::Shelf(target.clone()));
    assert_eq!(store.shelf(&target).unwrap().status(), ShelfStatus::Full);
    assert_eq!(
        store.log().last().unwrap(),
        "Robot restocked Shelf B (AI decision)"
    );
}
