use crate::{Effect, Msg, StepResult, WidgetState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: WidgetState, msg: Msg) -> (WidgetState, Vec<Effect>) {
    let effects = match msg {
        Msg::ActionTriggered {
            source_asset_id,
            steps,
        } => {
            if steps.is_empty() {
                return (state, Vec::new());
            }
            // A trigger always wins over anything still in flight: the fresh
            // generation is strictly greater, so older chains become stale.
            let generation = state.begin_chain(steps.len());
            vec![Effect::RunChain {
                generation,
                source_asset_id,
                steps,
            }]
        }
        Msg::StepCompleted {
            generation,
            step,
            operation,
            asset_id,
            output_url,
        } => {
            if state.is_current(generation) {
                state.apply_step(StepResult {
                    step,
                    operation,
                    asset_id,
                    output_url,
                });
            }
            Vec::new()
        }
        Msg::ChainCompleted { generation } => {
            if state.is_current(generation) {
                state.complete_chain();
            }
            Vec::new()
        }
        Msg::ChainFailed {
            generation,
            step,
            message,
        } => {
            if state.is_current(generation) {
                state.fail_chain(step, message);
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
