use crate::view_model::{StepRowView, WidgetViewModel};

/// Monotonically increasing tag for user-triggered chains. One counter per
/// widget instance, never shared across widgets.
pub type Generation = u64;

/// Lifecycle of the newest action chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChainPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed {
        step: usize,
    },
}

/// Output of one completed chain step, as applied to presentation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub step: usize,
    pub operation: String,
    pub asset_id: String,
    pub output_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetState {
    generation: Generation,
    phase: ChainPhase,
    steps_total: usize,
    step_results: Vec<StepResult>,
    output_url: Option<String>,
    error: Option<String>,
    dirty: bool,
}

impl WidgetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn phase(&self) -> ChainPhase {
        self.phase.clone()
    }

    /// Begins a new chain and returns its generation. Any chain still running
    /// under an older generation is superseded by construction: its events no
    /// longer match the current generation and will be dropped on arrival.
    pub(crate) fn begin_chain(&mut self, steps_total: usize) -> Generation {
        self.generation += 1;
        self.phase = ChainPhase::Running;
        self.steps_total = steps_total;
        self.step_results.clear();
        self.error = None;
        self.dirty = true;
        self.generation
    }

    /// True when `generation` identifies the newest chain. Stale events must
    /// never touch presentation state.
    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    pub(crate) fn apply_step(&mut self, result: StepResult) {
        self.output_url = Some(result.output_url.clone());
        self.step_results.push(result);
        self.dirty = true;
    }

    pub(crate) fn complete_chain(&mut self) {
        self.phase = ChainPhase::Completed;
        self.dirty = true;
    }

    /// Records a failed chain. Results of steps that already completed stay
    /// applied; the widget keeps its last good output plus an inline error.
    pub(crate) fn fail_chain(&mut self, step: usize, message: String) {
        self.phase = ChainPhase::Failed { step };
        self.error = Some(message);
        self.dirty = true;
    }

    /// Returns the dirty flag and clears it. The render loop uses this to
    /// skip frames with no visible change.
    pub fn consume_dirty(&mut self) -> bool {
        let dirty = self.dirty;
        self.dirty = false;
        dirty
    }

    pub fn view(&self) -> WidgetViewModel {
        WidgetViewModel {
            generation: self.generation,
            phase: self.phase.clone(),
            busy: self.phase == ChainPhase::Running,
            output_url: self.output_url.clone(),
            steps_total: self.steps_total,
            steps: self
                .step_results
                .iter()
                .map(|result| StepRowView {
                    step: result.step,
                    operation: result.operation.clone(),
                    asset_id: result.asset_id.clone(),
                    output_url: result.output_url.clone(),
                })
                .collect(),
            error: self.error.clone(),
            dirty: self.dirty,
        }
    }
}
