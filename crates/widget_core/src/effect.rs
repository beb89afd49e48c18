#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunChain {
        generation: crate::Generation,
        source_asset_id: String,
        steps: Vec<StepRequest>,
    },
}

/// One requested chain step, in widget-configuration vocabulary. The engine
/// parses `operation` against its statically known kinds and rejects unknown
/// values before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRequest {
    pub operation: String,
    pub source: StepSource,
    pub background_id: Option<String>,
}

/// Which asset a step operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSource {
    /// The asset the user interacted with.
    Source,
    /// The asset produced by the previous step.
    PreviousOutput,
}
