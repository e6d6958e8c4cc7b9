// Screening Pipeline — the application state machine and the background
// task that drives it.
//
// lifecycle:   transition table + the outcome bundle a run wants persisted
// runner:      one screening pass (extract -> evaluate -> aggregate -> record)
// coordinator: fire-and-forget submission with total failure containment

pub mod coordinator;
pub mod lifecycle;
pub mod runner;

pub use coordinator::{EvaluationJob, ScreeningCoordinator};
pub use lifecycle::{review_transition, EvaluationOutcome, ReviewDecision};
