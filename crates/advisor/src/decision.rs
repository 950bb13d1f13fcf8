//! Restock decision logic: advisory call, answer validation, local fallback.

use smartstore_core::{DomainError, DomainResult, ShelfLabel};
use smartstore_store::Shelf;

use crate::transport::{AdvisoryRequest, AdvisoryTransport};

/// Answer-length hint sent with each advisory request; the expected answer is
/// a single shelf letter.
pub const MAX_ANSWER_TOKENS: u32 = 5;

/// Why the fallback rule produced the decision instead of the advisory
/// service. Surfaced to the operator as a non-fatal notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No credential configured; the advisor never attempts the network.
    NoCredential,
    /// The request itself failed (connect error, HTTP status, timeout,
    /// malformed body).
    Transport(String),
    /// The service answered, but the answer is not one of the empty shelves.
    InvalidAnswer(String),
}

impl core::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FallbackReason::NoCredential => f.write_str("no advisory credential configured"),
            FallbackReason::Transport(cause) => write!(f, "advisory request failed: {cause}"),
            FallbackReason::InvalidAnswer(raw) => {
                write!(f, "advisory answer {raw:?} is not an empty shelf")
            }
        }
    }
}

/// Provenance of a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionSource {
    Advisory,
    Fallback(FallbackReason),
}

/// A restock target plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub label: ShelfLabel,
    pub source: DecisionSource,
}

impl Decision {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, DecisionSource::Fallback(_))
    }

    fn fallback(empty_shelves: &[Shelf], reason: FallbackReason) -> Self {
        Self {
            label: fallback(empty_shelves).label().clone(),
            source: DecisionSource::Fallback(reason),
        }
    }
}

/// The local fallback rule: the empty shelf with the maximum `empty_minutes`,
/// first maximum in shelf order on ties.
///
/// Panics if `empty_shelves` is empty; [`RestockAdvisor::decide`] guards that
/// precondition before calling in.
pub fn fallback(empty_shelves: &[Shelf]) -> &Shelf {
    let mut best = &empty_shelves[0];
    for shelf in &empty_shelves[1..] {
        if shelf.empty_minutes() > best.empty_minutes() {
            best = shelf;
        }
    }
    best
}

/// Chooses which empty shelf to restock, abstracting over an optional
/// external advisory service.
pub struct RestockAdvisor {
    transport: Option<Box<dyn AdvisoryTransport>>,
}

impl RestockAdvisor {
    /// Advisor with no external service; every decision uses the fallback.
    pub fn disconnected() -> Self {
        Self { transport: None }
    }

    pub fn with_transport(transport: impl AdvisoryTransport + 'static) -> Self {
        Self {
            transport: Some(Box::new(transport)),
        }
    }

    /// Wire up from the environment: HTTP transport when a credential is
    /// configured, disconnected otherwise.
    pub fn from_env() -> Self {
        match crate::transport::AdvisoryConfig::from_env() {
            Some(config) => match crate::transport::HttpAdvisoryTransport::new(config) {
                Ok(transport) => Self::with_transport(transport),
                Err(err) => {
                    tracing::warn!(error = %err, "could not build advisory client; using local fallback");
                    Self::disconnected()
                }
            },
            None => {
                tracing::info!("no advisory credential configured; using local fallback");
                Self::disconnected()
            }
        }
    }

    /// Decide which shelf to restock next.
    ///
    /// `empty_shelves` is the ordered empty subset and must be non-empty; the
    /// caller checks that before invoking (and surfaces the nothing-to-do
    /// notice itself). Advisory failures never propagate: they degrade to the
    /// fallback with the cause recorded in the decision.
    pub fn decide(&self, empty_shelves: &[Shelf]) -> DomainResult<Decision> {
        if empty_shelves.is_empty() {
            return Err(DomainError::validation("no empty shelves to decide on"));
        }

        let Some(transport) = &self.transport else {
            return Ok(Decision::fallback(empty_shelves, FallbackReason::NoCredential));
        };

        let request = AdvisoryRequest {
            prompt: build_prompt(empty_shelves),
            max_tokens: MAX_ANSWER_TOKENS,
        };

        match transport.complete(&request) {
            Ok(answer) => match validate_answer(&answer, empty_shelves) {
                Some(label) => Ok(Decision {
                    label,
                    source: DecisionSource::Advisory,
                }),
                None => {
                    tracing::warn!(%answer, "advisory answer is not an empty shelf; using fallback");
                    Ok(Decision::fallback(
                        empty_shelves,
                        FallbackReason::InvalidAnswer(answer),
                    ))
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "advisory request failed; using fallback");
                Ok(Decision::fallback(
                    empty_shelves,
                    FallbackReason::Transport(err.to_string()),
                ))
            }
        }
    }
}

/// Free-text description of the empty shelves, one line per shelf, closed
/// with the single-letter-answer instruction.
fn build_prompt(empty_shelves: &[Shelf]) -> String {
    let mut prompt = String::from("Shelves data:\n");
    for shelf in empty_shelves {
        prompt.push_str(&format!(
            "Shelf {}: status={}, empty_minutes={}, traffic={}\n",
            shelf.label(),
            shelf.status(),
            shelf.empty_minutes(),
            shelf.traffic()
        ));
    }
    prompt.push_str("Which shelf should the robot restock first? Return only the shelf letter.");
    prompt
}

/// Parse-and-validate step for the advisory answer: first whitespace token,
/// normalized by `ShelfLabel::parse`, then checked for membership in the
/// empty set. Anything else is rejected.
fn validate_answer(answer: &str, empty_shelves: &[Shelf]) -> Option<ShelfLabel> {
    let token = answer.split_whitespace().next()?;
    let label = ShelfLabel::parse(token).ok()?;
    empty_shelves
        .iter()
        .any(|s| s.label() == &label)
        .then_some(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use proptest::prelude::*;
    use smartstore_store::Traffic;

    use crate::transport::TransportError;

    fn label(s: &str) -> ShelfLabel {
        ShelfLabel::parse(s).unwrap()
    }

    fn empty_shelf(l: &str, minutes: u32) -> Shelf {
        Shelf::empty_with_minutes(label(l), Traffic::Medium, minutes)
    }

    /// Transport double: canned reply, records the request it saw.
    struct StubTransport {
        reply: Result<String, TransportError>,
        seen: RefCell<Option<AdvisoryRequest>>,
    }

    impl StubTransport {
        fn answering(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: RefCell::new(None),
            }
        }

        fn failing(err: TransportError) -> Self {
            Self {
                reply: Err(err),
                seen: RefCell::new(None),
            }
        }
    }

    impl AdvisoryTransport for StubTransport {
        fn complete(&self, request: &AdvisoryRequest) -> Result<String, TransportError> {
            *self.seen.borrow_mut() = Some(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(TransportError::Request(m)) => Err(TransportError::Request(m.clone())),
                Err(TransportError::MalformedResponse(m)) => {
                    Err(TransportError::MalformedResponse(m.clone()))
                }
            }
        }
    }

    #[test]
    fn decide_rejects_an_empty_subset_without_touching_the_transport() {
        let advisor = RestockAdvisor::with_transport(StubTransport::answering("A"));
        let err = advisor.decide(&[]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn disconnected_advisor_uses_the_max_minutes_fallback() {
        let shelves = vec![empty_shelf("A", 3), empty_shelf("B", 9)];
        let decision = RestockAdvisor::disconnected().decide(&shelves).unwrap();
        assert_eq!(decision.label, label("B"));
        assert_eq!(
            decision.source,
            DecisionSource::Fallback(FallbackReason::NoCredential)
        );
    }

    #[test]
    fn valid_advisory_answer_wins_over_the_fallback() {
        // Fallback would pick B (9 > 3); the service says A.
        let shelves = vec![empty_shelf("A", 3), empty_shelf("B", 9)];
        let advisor = RestockAdvisor::with_transport(StubTransport::answering("A"));
        let decision = advisor.decide(&shelves).unwrap();
        assert_eq!(decision.label, label("A"));
        assert_eq!(decision.source, DecisionSource::Advisory);
    }

    #[test]
    fn lowercase_advisory_answer_is_normalized() {
        let shelves = vec![empty_shelf("A", 3), empty_shelf("B", 9)];
        let advisor = RestockAdvisor::with_transport(StubTransport::answering("a"));
        let decision = advisor.decide(&shelves).unwrap();
        assert_eq!(decision.label, label("A"));
        assert!(!decision.is_fallback());
    }

    #[test]
    fn verbose_advisory_answer_uses_its_first_token() {
        let shelves = vec![empty_shelf("A", 3), empty_shelf("B", 9)];
        let advisor = RestockAdvisor::with_transport(StubTransport::answering("A because traffic"));
        let decision = advisor.decide(&shelves).unwrap();
        assert_eq!(decision.label, label("A"));
    }

    #[test]
    fn out_of_set_answers_fall_back() {
        let shelves = vec![empty_shelf("A", 3), empty_shelf("B", 9)];
        for bad in ["C", "", "   ", "shelf!", "Z9Z9Z9Z9Z", "🤖"] {
            let advisor = RestockAdvisor::with_transport(StubTransport::answering(bad));
            let decision = advisor.decide(&shelves).unwrap();
            assert_eq!(decision.label, label("B"), "answer {bad:?}");
            assert!(matches!(
                decision.source,
                DecisionSource::Fallback(FallbackReason::InvalidAnswer(_))
            ));
        }
    }

    #[test]
    fn transport_failures_fall_back_without_propagating() {
        let shelves = vec![empty_shelf("A", 3), empty_shelf("B", 9)];
        let failures = [
            TransportError::Request("timed out".to_string()),
            TransportError::MalformedResponse("response carried no choices".to_string()),
        ];
        for failure in failures {
            let advisor = RestockAdvisor::with_transport(StubTransport::failing(failure));
            let decision = advisor.decide(&shelves).unwrap();
            assert_eq!(decision.label, label("B"));
            assert!(matches!(
                decision.source,
                DecisionSource::Fallback(FallbackReason::Transport(_))
            ));
        }
    }

    #[test]
    fn prompt_describes_each_empty_shelf_and_asks_for_one_letter() {
        let shelves = vec![empty_shelf("A", 3), empty_shelf("B", 9)];
        let prompt = build_prompt(&shelves);
        assert!(prompt.starts_with("Shelves data:\n"));
        assert!(prompt.contains("Shelf A: status=empty, empty_minutes=3, traffic=medium\n"));
        assert!(prompt.contains("Shelf B: status=empty, empty_minutes=9, traffic=medium\n"));
        assert!(prompt.ends_with("Return only the shelf letter."));
    }

    #[test]
    fn decide_sends_the_prompt_and_answer_hint_to_the_transport() {
        let shelves = vec![empty_shelf("A", 3)];
        let transport = std::rc::Rc::new(StubTransport::answering("A"));
        let advisor = RestockAdvisor {
            transport: Some(Box::new(SharedStub(transport.clone()))),
        };

        let _ = advisor.decide(&shelves).unwrap();

        let seen = transport.seen.borrow().clone().unwrap();
        assert_eq!(seen.max_tokens, MAX_ANSWER_TOKENS);
        assert!(seen.prompt.contains("Shelf A"));
    }

    struct SharedStub(std::rc::Rc<StubTransport>);

    impl AdvisoryTransport for SharedStub {
        fn complete(&self, request: &AdvisoryRequest) -> Result<String, TransportError> {
            self.0.complete(request)
        }
    }

    #[test]
    fn fallback_tie_break_is_first_in_shelf_order_and_stable() {
        let shelves = vec![
            empty_shelf("A", 9),
            empty_shelf("B", 9),
            empty_shelf("C", 4),
        ];
        for _ in 0..10 {
            assert_eq!(fallback(&shelves).label(), &label("A"));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the fallback always returns a member of the empty set.
        #[test]
        fn fallback_returns_a_member(minutes in prop::collection::vec(0u32..100, 1..8)) {
            let shelves: Vec<Shelf> = minutes
                .iter()
                .enumerate()
                .map(|(i, &m)| empty_shelf(&format!("S{i}"), m))
                .collect();
            let chosen = fallback(&shelves);
            prop_assert!(shelves.iter().any(|s| s.label() == chosen.label()));
        }

        /// Property: the fallback picks the first shelf holding the maximum
        /// severity, deterministically.
        #[test]
        fn fallback_picks_the_first_maximum(minutes in prop::collection::vec(0u32..100, 1..8)) {
            let shelves: Vec<Shelf> = minutes
                .iter()
                .enumerate()
                .map(|(i, &m)| empty_shelf(&format!("S{i}"), m))
                .collect();
            let max = minutes.iter().copied().max().unwrap();
            let first_max = minutes.iter().position(|&m| m == max).unwrap();
            prop_assert_eq!(fallback(&shelves).label(), shelves[first_max].label());
            // Stable across repeated calls.
            prop_assert_eq!(fallback(&shelves).label(), shelves[first_max].label());
        }
    }
}
