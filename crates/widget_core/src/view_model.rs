use crate::{ChainPhase, Generation};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetViewModel {
    pub generation: Generation,
    pub phase: ChainPhase,
    pub busy: bool,
    pub output_url: Option<String>,
    pub steps_total: usize,
    pub steps: Vec<StepRowView>,
    pub error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRowView {
    pub step: usize,
    pub operation: String,
    pub asset_id: String,
    pub output_url: String,
}
