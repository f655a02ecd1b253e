//! Success/failure decision for one planner invocation.

use super::extractor::{ExtractorKind, PlanExtractor};
use crate::planner::PlannerSpec;
use crate::runner::{Invocation, Termination};
use tracing::debug;

/// Classified result of one invocation.
///
/// `plan_len` is only ever `Some` when `success` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub plan_len: Option<u32>,
}

impl Outcome {
    pub fn failure() -> Self {
        Self {
            success: false,
            plan_len: None,
        }
    }

    pub fn solved(plan_len: u32) -> Self {
        Self {
            success: true,
            plan_len: Some(plan_len),
        }
    }
}

/// Free-text success marker: both `succeeded` and `plan`, case-insensitive.
pub fn has_success_signal(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("succeeded") && lower.contains("plan")
}

/// Turns captured planner output into an [`Outcome`].
///
/// Rules, in order:
/// 1. timed out, failed to launch, or cancelled → failure
/// 2. extractors run in priority order, first `Some` is the plan length
/// 3. success requires the textual signal *and* a plan length above zero;
///    a "success" with no extractable steps is treated as failure
pub struct OutcomeClassifier {
    extractors: Vec<Box<dyn PlanExtractor>>,
}

impl OutcomeClassifier {
    pub fn new(extractors: Vec<Box<dyn PlanExtractor>>) -> Self {
        Self { extractors }
    }

    /// Classifier configured with a planner's extractor priority list.
    pub fn for_planner(spec: &PlannerSpec) -> Self {
        Self::from_kinds(&spec.extractors)
    }

    pub fn from_kinds(kinds: &[ExtractorKind]) -> Self {
        Self::new(kinds.iter().map(|k| k.build()).collect())
    }

    /// Classify a finished invocation.
    pub fn classify_invocation(&self, invocation: &Invocation) -> Outcome {
        self.classify(&invocation.output, &invocation.termination)
    }

    pub fn classify(&self, text: &str, termination: &Termination) -> Outcome {
        if termination.is_aborted() {
            return Outcome::failure();
        }
        if text.trim().is_empty() {
            return Outcome::failure();
        }

        let signal = has_success_signal(text);
        let plan_len = self.extract_plan_len(text);

        match (signal, plan_len) {
            (true, Some(len)) if len > 0 => Outcome::solved(len),
            (true, _) => {
                debug!("success marker present but no plan steps extracted; recording failure");
                Outcome::failure()
            }
            (false, _) => Outcome::failure(),
        }
    }

    fn extract_plan_len(&self, text: &str) -> Option<u32> {
        self.extractors.iter().find_map(|extractor| {
            let found = extractor.extract(text);
            if let Some(len) = found {
                debug!(extractor = extractor.name(), plan_len = len, "plan length extracted");
            }
            found
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerKind;

    fn exited() -> Termination {
        Termination::Exited { code: Some(0) }
    }

    fn numbered_steps(n: usize) -> String {
        (0..n)
            .map(|i| format!("{:02}: (move b{} table)                [0]\n", i, i))
            .collect()
    }

    fn mcts() -> OutcomeClassifier {
        OutcomeClassifier::for_planner(&PlannerSpec::mcts_default())
    }

    fn astar() -> OutcomeClassifier {
        OutcomeClassifier::for_planner(&PlannerSpec::astar_default())
    }

    #[test]
    fn test_timeout_is_failure_regardless_of_text() {
        let text = format!("Custom A* succeeded, plan found.\n{}", numbered_steps(4));
        let outcome = astar().classify(&text, &Termination::TimedOut);
        assert_eq!(outcome, Outcome::failure());
    }

    #[test]
    fn test_launch_failure_and_cancel_are_failures() {
        let text = "MCTS succeeded, plan found (3 steps).";
        assert_eq!(mcts().classify(text, &Termination::LaunchFailed), Outcome::failure());
        assert_eq!(mcts().classify(text, &Termination::Cancelled), Outcome::failure());
    }

    #[test]
    fn test_annotated_count_overrides_step_lines_for_mcts() {
        let text = format!(
            "* MCTS succeeded, plan found (7 steps).\n{}",
            numbered_steps(3)
        );
        let outcome = mcts().classify(&text, &exited());
        assert_eq!(outcome, Outcome::solved(7));
    }

    #[test]
    fn test_numbered_steps_with_signal() {
        let text = format!("* Custom A* succeeded, plan found.\n{}", numbered_steps(5));
        let outcome = astar().classify(&text, &exited());
        assert!(outcome.success);
        assert_eq!(outcome.plan_len, Some(5));
    }

    #[test]
    fn test_signal_without_steps_is_contradiction() {
        let text = "Search SUCCEEDED but the PLAN was not printed";
        let outcome = astar().classify(text, &exited());
        assert_eq!(outcome, Outcome::failure());
    }

    #[test]
    fn test_zero_step_annotation_is_failure() {
        let text = "MCTS succeeded, plan found (0 steps).";
        assert_eq!(mcts().classify(text, &exited()), Outcome::failure());
    }

    #[test]
    fn test_steps_without_signal_is_failure() {
        let text = format!("* Custom A* failed or timeout reached.\n{}", numbered_steps(2));
        assert_eq!(astar().classify(&text, &exited()), Outcome::failure());
    }

    #[test]
    fn test_empty_text_is_failure() {
        assert_eq!(mcts().classify("", &exited()), Outcome::failure());
        assert_eq!(mcts().classify("  \n\n", &exited()), Outcome::failure());
    }

    #[test]
    fn test_exit_code_is_advisory() {
        let text = "MCTS succeeded, plan found (2 steps).";
        let outcome = mcts().classify(text, &Termination::Exited { code: Some(1) });
        assert_eq!(outcome, Outcome::solved(2));
    }

    #[test]
    fn test_priority_order_is_respected() {
        let text = format!("succeeded, plan found (9 steps)\n{}", numbered_steps(4));
        let steps_first =
            OutcomeClassifier::from_kinds(&[ExtractorKind::StepCount, ExtractorKind::AnnotatedCount]);
        assert_eq!(steps_first.classify(&text, &exited()), Outcome::solved(4));
        let annotated_first =
            OutcomeClassifier::from_kinds(&[ExtractorKind::AnnotatedCount, ExtractorKind::StepCount]);
        assert_eq!(annotated_first.classify(&text, &exited()), Outcome::solved(9));
    }

    #[test]
    fn test_overflowing_annotation_is_failure() {
        // the step lines must not stand in for the unreadable annotation
        let text = format!("MCTS succeeded, plan found (99999999999 steps).\n{}", numbered_steps(3));
        assert_eq!(mcts().classify(&text, &exited()), Outcome::failure());
    }

    #[test]
    fn test_fallback_to_later_extractor() {
        let text = format!("succeeded: plan below\n{}", numbered_steps(6));
        assert_eq!(mcts().classify(&text, &exited()), Outcome::solved(6));
    }

    #[test]
    fn test_success_signal_is_case_insensitive() {
        assert!(has_success_signal("Succeeded. PLAN:"));
        assert!(!has_success_signal("succeeded"));
        assert!(!has_success_signal("plan failed"));
    }

    #[test]
    fn test_for_planner_uses_kind_specific_list() {
        let mut spec = PlannerSpec::astar_default();
        assert_eq!(spec.kind, PlannerKind::AStar);
        spec.extractors = vec![ExtractorKind::StepCount];
        let classifier = OutcomeClassifier::for_planner(&spec);
        let text = "succeeded, plan found (9 steps)";
        assert_eq!(classifier.classify(text, &exited()), Outcome::failure());
    }
}
