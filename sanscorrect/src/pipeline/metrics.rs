//! Per-segment timing and correction counts.

use serde::Serialize;
use std::time::Duration;

use crate::context::ContextResult;

/// Correction count contributed by one pipeline step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepCount {
    /// Step name, e.g. `lexicon_case_insensitive`.
    pub step: &'static str,
    /// Correction events contributed by the step.
    pub corrections: usize,
}

/// Metrics bundle for one pipeline invocation.
///
/// Ephemeral: populated into the caller-provided value and never
/// persisted by the pipeline itself. The step breakdown always sums to
/// `total_corrections`; that consistency is a required property, not an
/// incidental log.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SegmentMetrics {
    /// Time spent in context detection.
    pub context_detection: Duration,
    /// Time spent in the whitelist check.
    pub whitelist_check: Duration,
    /// Per-step correction counts, in execution order.
    pub steps: Vec<StepCount>,
    /// Sum of the step counts.
    pub total_corrections: usize,
    /// `total_corrections / word_count × 100`; zero for empty input.
    pub correction_rate: f32,
    /// True when a whitelist hit overrode an english classification.
    pub english_protection_bypassed: bool,
    /// The (possibly overridden) context used for branching.
    pub context: Option<ContextResult>,
}

impl SegmentMetrics {
    /// Records one step's contribution.
    pub fn record_step(&mut self, step: &'static str, corrections: usize) {
        self.steps.push(StepCount { step, corrections });
    }

    /// Sum of the recorded step counts.
    pub fn step_total(&self) -> usize {
        self.steps.iter().map(|s| s.corrections).sum()
    }

    /// Seals the bundle: totals the steps and derives the rate.
    pub fn finish(&mut self, word_count: usize) {
        self.total_corrections = self.step_total();
        self.correction_rate = if word_count == 0 {
            0.0
        } else {
            self.total_corrections as f32 / word_count as f32 * 100.0
        };
    }
}
