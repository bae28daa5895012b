//! The correction orchestrator.
//!
//! Runs the pipeline steps in a fixed order per segment: context
//! detection, whitelist check, lexicon passes, optional systematic and
//! compound matching, prayer recognition, surgical edits and optional
//! external enhancement. Segments are processed independently; no state
//! carries between calls, so callers may fan segments out to worker
//! threads as long as they share one pipeline.
//!
//! The two operating modes of the source system (a standard processor
//! and an aggressive ASR subclass) are expressed as composition instead:
//! one orchestrator, a pluggable detector and a [`PipelineConfig`]
//! selected at construction time.
//!
//! Failure semantics: no step may fail past its boundary. Collaborator
//! calls are isolation-wrapped and degrade to "no correction from this
//! step" with a log entry; only empty input short-circuits.

mod metrics;

pub use metrics::{SegmentMetrics, StepCount};

use std::sync::Arc;
use std::time::Instant;

use crate::constants::{AGGRESSIVE_PRAYER_THRESHOLD, ENGLISH_CONFIDENCE_THRESHOLD};
use crate::context::{
    AsrPolicy, ContextDetector, ContextResult, ContextType, HeuristicDetector,
};
use crate::lexicon::{LexiconCorrector, LexiconStore, WhitelistMatcher};
use crate::prayer::{
    InvocationRecognizer, PrayerOutcome, PrayerRecognizer, RecognitionCache,
};
use crate::segment::{CorrectedSegment, Segment};
use crate::surgical::{EditMode, SurgicalEditor};
use crate::tokenizer::Tokenize;

/// Systematic/compound matching collaborator contract.
pub trait SystematicMatcher: Send + Sync {
    /// Applies systematic corrections, returning the new text and the
    /// list of corrections applied.
    fn apply_corrections(&self, text: &str, aggressive: bool) -> (String, Vec<String>);
    /// Finds compound-term candidates as `(original, corrected)` pairs.
    fn find_compound_candidates(&self, text: &str, aggressive: bool) -> Vec<(String, String)>;
}

/// External semantic-enhancement collaborator contract.
///
/// Implementors own their timeout handling; a timeout or failure must
/// surface as `None`, never as a panic the caller has to absorb.
pub trait SemanticEnhancer: Send + Sync {
    /// Returns enhanced text, or `None` for "no enhancement applied".
    fn enhance(&self, text: &str, previous_context: Option<&str>) -> Option<String>;
}

/// Construction-time pipeline options.
#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    /// Enables the aggressive/ASR variant: the english-confidence
    /// demotion policy and the lowered prayer threshold.
    pub aggressive: bool,
    /// Demotion threshold for the ASR policy.
    pub english_confidence_threshold: f32,
    /// Prayer acceptance override; `None` uses each entry's own.
    pub prayer_threshold: Option<f32>,
    /// Strictness of the surgical editor.
    pub edit_mode: EditMode,
}

impl PipelineConfig {
    /// The standard pipeline: english segments are protected.
    pub const fn default() -> PipelineConfig {
        PipelineConfig {
            aggressive: false,
            english_confidence_threshold: ENGLISH_CONFIDENCE_THRESHOLD,
            prayer_threshold: None,
            edit_mode: EditMode::Moderate,
        }
    }

    /// The aggressive variant tuned for ASR transcripts.
    pub const fn asr() -> PipelineConfig {
        PipelineConfig {
            aggressive: true,
            english_confidence_threshold: ENGLISH_CONFIDENCE_THRESHOLD,
            prayer_threshold: Some(AGGRESSIVE_PRAYER_THRESHOLD),
            edit_mode: EditMode::Aggressive,
        }
    }
}

/// The per-segment correction orchestrator.
pub struct CorrectionPipeline {
    detector: Box<dyn ContextDetector>,
    policy: Option<AsrPolicy>,
    lexicon: LexiconStore,
    corrector: LexiconCorrector,
    whitelist: WhitelistMatcher,
    prayers: PrayerRecognizer,
    invocations: InvocationRecognizer,
    editor: SurgicalEditor,
    systematic: Option<Box<dyn SystematicMatcher>>,
    enhancer: Option<Box<dyn SemanticEnhancer>>,
    config: PipelineConfig,
}

impl CorrectionPipeline {
    /// Creates a pipeline over a lexicon with the default heuristic
    /// detector. Substitution rules and the whitelist are compiled here,
    /// once, not per call.
    pub fn new(lexicon: LexiconStore, config: PipelineConfig) -> CorrectionPipeline {
        let corrector = LexiconCorrector::new(&lexicon);
        let whitelist = WhitelistMatcher::new(&lexicon);
        let mut prayers = PrayerRecognizer::new();
        if let Some(threshold) = config.prayer_threshold {
            prayers = prayers.with_threshold(threshold);
        }
        CorrectionPipeline {
            detector: Box::new(HeuristicDetector),
            policy: if config.aggressive {
                Some(AsrPolicy::new(config.english_confidence_threshold))
            } else {
                None
            },
            lexicon,
            corrector,
            whitelist,
            prayers,
            invocations: InvocationRecognizer::new(),
            editor: SurgicalEditor::new(config.edit_mode),
            systematic: None,
            enhancer: None,
            config,
        }
    }

    /// Swaps in a caller-provided context detector.
    pub fn with_detector(mut self, detector: Box<dyn ContextDetector>) -> CorrectionPipeline {
        self.detector = detector;
        self
    }

    /// Attaches a systematic/compound matcher.
    pub fn with_systematic(mut self, matcher: Box<dyn SystematicMatcher>) -> CorrectionPipeline {
        self.systematic = Some(matcher);
        self
    }

    /// Attaches an external semantic enhancer.
    pub fn with_enhancer(mut self, enhancer: Box<dyn SemanticEnhancer>) -> CorrectionPipeline {
        self.enhancer = Some(enhancer);
        self
    }

    /// Injects a shared prayer-outcome cache, e.g. for tests that need
    /// to control and reset recognition state.
    pub fn with_prayer_cache(
        mut self,
        cache: Arc<RecognitionCache<PrayerOutcome>>,
    ) -> CorrectionPipeline {
        let mut prayers = PrayerRecognizer::with_cache(cache);
        if let Some(threshold) = self.config.prayer_threshold {
            prayers = prayers.with_threshold(threshold);
        }
        self.prayers = prayers;
        self
    }

    /// The backing lexicon.
    pub fn lexicon(&self) -> &LexiconStore {
        &self.lexicon
    }

    /// Corrects one segment text. Returns the corrected text and the
    /// total number of correction events.
    pub fn process(&self, text: &str) -> (String, usize) {
        let mut metrics = SegmentMetrics::default();
        self.process_with_metrics(text, &mut metrics)
    }

    /// Corrects one segment text, populating the caller's metrics
    /// bundle.
    pub fn process_with_metrics(
        &self,
        text: &str,
        metrics: &mut SegmentMetrics,
    ) -> (String, usize) {
        if text.trim().is_empty() {
            metrics.finish(0);
            return (text.to_string(), 0);
        }

        let started = Instant::now();
        // The detector is caller-pluggable, so it gets the same panic
        // boundary as the other collaborators. A failed detection falls
        // back to mixed at zero confidence: correction proceeds, nothing
        // is protected on the strength of a crashed classifier.
        let mut context = isolated("context_detection", || self.detector.detect(text))
            .unwrap_or_else(|| ContextResult::new(ContextType::Mixed, 0.0));
        if let Some(policy) = &self.policy {
            context = policy.apply(context);
        }
        metrics.context_detection = started.elapsed();

        let started = Instant::now();
        let whitelist_hits = self.whitelist.matches(text);
        metrics.whitelist_check = started.elapsed();

        let detected_english = context.context_type == ContextType::English;
        if !whitelist_hits.is_empty() {
            if detected_english {
                metrics.english_protection_bypassed = true;
                log::debug!(
                    "whitelist terms {:?} override english context",
                    whitelist_hits
                );
            }
            // Hard override, not a weighted blend.
            context = ContextResult::new(ContextType::Sanskrit, context.confidence);
        }
        metrics.context = Some(context);

        if context.context_type == ContextType::English && self.policy.is_none() {
            // English protection: terminal, returns the input verbatim.
            metrics.finish(text.word_count());
            return (text.to_string(), 0);
        }

        let mut current = text.to_string();

        let (next, applied, _) = self.corrector.apply(&current);
        current = next;
        metrics.record_step("lexicon_case_insensitive", applied);

        if let Some(matcher) = &self.systematic {
            let aggressive = self.config.aggressive;
            match isolated("systematic", || {
                matcher.apply_corrections(&current, aggressive)
            }) {
                Some((next, corrections)) => {
                    current = next;
                    metrics.record_step("systematic", corrections.len());
                }
                None => metrics.record_step("systematic", 0),
            }

            match isolated("compound", || {
                matcher.find_compound_candidates(&current, aggressive)
            }) {
                Some(pairs) => {
                    let mut applied = 0;
                    for (original, corrected) in pairs {
                        if original.is_empty() || original == corrected {
                            continue;
                        }
                        if current.contains(&original) {
                            current = current.replace(&original, &corrected);
                            applied += 1;
                        }
                    }
                    metrics.record_step("compound", applied);
                }
                None => metrics.record_step("compound", 0),
            }
        }

        let (next, applied, _) = self.corrector.apply_exact(&current);
        current = next;
        metrics.record_step("lexicon_base", applied);

        let outcome = self.prayers.recognize(&current);
        let mut prayer_corrections = outcome.corrections.len();
        if outcome.matched || !outcome.corrections.is_empty() {
            current = outcome.text;
        }
        if !outcome.matched {
            let invocation = self.invocations.recognize(&current);
            if invocation.invocation && !invocation.corrections.is_empty() {
                prayer_corrections += invocation.corrections.len();
                current = invocation.text;
            }
        }
        metrics.record_step("prayer", prayer_corrections);

        let edited = self.editor.edit(&current);
        let applied = edited.edits.len();
        if edited.success && applied > 0 {
            current = edited.text;
        }
        metrics.record_step("surgical", applied);

        if let Some(enhancer) = &self.enhancer {
            let applied = match isolated("enhancement", || enhancer.enhance(&current, None)) {
                Some(Some(enhanced)) if enhanced != current => {
                    current = enhanced;
                    1
                }
                _ => 0,
            };
            metrics.record_step("enhancement", applied);
        }

        metrics.finish(text.word_count());
        (current, metrics.total_corrections)
    }

    /// Convenience wrapper over [`process_with_metrics`] for a whole
    /// segment, copying index and timestamps through.
    ///
    /// [`process_with_metrics`]: CorrectionPipeline::process_with_metrics
    pub fn process_segment(&self, segment: &Segment) -> (CorrectedSegment, SegmentMetrics) {
        let mut metrics = SegmentMetrics::default();
        let (text, corrections) = self.process_with_metrics(&segment.text, &mut metrics);
        (
            CorrectedSegment {
                index: segment.index,
                start_ms: segment.start_ms,
                end_ms: segment.end_ms,
                text,
                corrections,
            },
            metrics,
        )
    }
}

/// Runs a collaborator call behind a panic boundary; a panicking step
/// contributes zero corrections instead of aborting the segment.
fn isolated<T>(step: &str, f: impl FnOnce() -> T) -> Option<T> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("step {} failed; contributing zero corrections", step);
            None
        }
    }
}
