/// Result of running one cascade stage against a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    /// Stage passed and more stages remain.
    Continue,
    /// Stage failed; no later stage is evaluated.
    Reject,
    /// The last stage passed; the window is a detection.
    Accept,
}

/// Observes every stage evaluation made by the cascade.
///
/// Lets callers see where windows are rejected without changing the
/// evaluation code.
pub trait CascadeObserver {
    fn stage_evaluated(&mut self, stage: usize, outcome: StageOutcome);
}

/// Observer that discards all events.
pub struct NullCascadeObserver;

impl CascadeObserver for NullCascadeObserver {
    fn stage_evaluated(&mut self, _stage: usize, _outcome: StageOutcome) {}
}

/// Per-stage evaluation and rejection counters for a scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageStatistics {
    evaluations: Vec<usize>,
    rejections: Vec<usize>,
    accepted: usize,
}

impl StageStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of windows that reached `stage`.
    pub fn evaluations(&self, stage: usize) -> usize {
        self.evaluations.get(stage).copied().unwrap_or(0)
    }

    pub fn rejections(&self, stage: usize) -> usize {
        self.rejections.get(stage).copied().unwrap_or(0)
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Deepest stage any window reached, or `None` before any evaluation.
    pub fn highest_stage(&self) -> Option<usize> {
        self.evaluations.iter().rposition(|&n| n > 0)
    }

    /// Folds another worker's counters into this one.
    pub fn merge(&mut self, other: &StageStatistics) {
        grow_to(&mut self.evaluations, other.evaluations.len());
        grow_to(&mut self.rejections, other.rejections.len());
        for (mine, theirs) in self.evaluations.iter_mut().zip(&other.evaluations) {
            *mine += theirs;
        }
        for (mine, theirs) in self.rejections.iter_mut().zip(&other.rejections) {
            *mine += theirs;
        }
        self.accepted += other.accepted;
    }

    /// Human-readable per-stage breakdown, or `None` if nothing was evaluated.
    pub fn summary_string(&self) -> Option<String> {
        let highest = self.highest_stage()?;
        let mut lines = Vec::with_capacity(highest + 2);
        lines.push(format!(
            "Cascade summary ({} windows, {} accepted, deepest stage {highest}):",
            self.evaluations(0),
            self.accepted
        ));
        for stage in 0..=highest {
            let reached = self.evaluations(stage);
            let rejected = self.rejections(stage);
            let pct = if reached > 0 {
                rejected as f64 / reached as f64 * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  stage {stage:3}: reached {reached:8}  rejected {rejected:8}  ({pct:5.1}%)"
            ));
        }
        Some(lines.join("\n"))
    }
}

impl CascadeObserver for StageStatistics {
    fn stage_evaluated(&mut self, stage: usize, outcome: StageOutcome) {
        grow_to(&mut self.evaluations, stage + 1);
        self.evaluations[stage] += 1;
        match outcome {
            StageOutcome::Continue => {}
            StageOutcome::Reject => {
                grow_to(&mut self.rejections, stage + 1);
                self.rejections[stage] += 1;
            }
            StageOutcome::Accept => self.accepted += 1,
        }
    }
}

fn grow_to(counts: &mut Vec<usize>, len: usize) {
    if counts.len() < len {
        counts.resize(len, 0);
    }
}
