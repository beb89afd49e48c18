#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User engaged a widget affordance that maps to an action chain.
    ActionTriggered {
        source_asset_id: String,
        steps: Vec<crate::StepRequest>,
    },
    /// Engine finished one chain step.
    StepCompleted {
        generation: crate::Generation,
        step: usize,
        operation: String,
        asset_id: String,
        output_url: String,
    },
    /// Engine ran the whole chain to completion.
    ChainCompleted { generation: crate::Generation },
    /// Engine gave up on the chain at `step`.
    ChainFailed {
        generation: crate::Generation,
        step: usize,
        message: String,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
