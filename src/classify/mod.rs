//! Outcome classification for planner output.
//!
//! Planner output has no machine-readable structure. Success is decided from a
//! free-text marker plus a plan length pulled out by per-planner extractors:
//!
//! - `annotated-count`: `plan found (<n> steps)`
//! - `step-count`: lines like `03: (unstack c a)`
//!
//! The classifier prefers false negatives: anything contradictory is a failure.

mod classifier;
mod extractor;

pub use classifier::{Outcome, OutcomeClassifier, has_success_signal};
pub use extractor::{AnnotatedCountExtractor, ExtractorKind, PlanExtractor, StepCountExtractor};
