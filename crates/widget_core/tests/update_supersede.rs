use std::sync::Once;

use widget_core::{update, ChainPhase, Msg, StepRequest, StepSource, WidgetState};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(widget_logging::initialize_for_tests);
}

fn trigger(state: WidgetState, operation: &str) -> WidgetState {
    let (state, _effects) = update(
        state,
        Msg::ActionTriggered {
            source_asset_id: "assetX".to_string(),
            steps: vec![StepRequest {
                operation: operation.to_string(),
                source: StepSource::Source,
                background_id: None,
            }],
        },
    );
    state
}

fn step_completed(generation: u64, asset_id: &str, output_url: &str) -> Msg {
    Msg::StepCompleted {
        generation,
        step: 0,
        operation: "remove-background".to_string(),
        asset_id: asset_id.to_string(),
        output_url: output_url.to_string(),
    }
}

#[test]
fn late_stale_success_is_discarded() {
    init_logging();
    let state = WidgetState::new();

    // Generation 1 enqueued, then generation 2 before it resolves.
    let state = trigger(state, "remove-background");
    let state = trigger(state, "change-background");
    assert_eq!(state.view().generation, 2);

    // Generation 2 resolves first and is applied.
    let (state, _effects) = update(state, step_completed(2, "t2", "u2"));
    let (mut state, _effects) = update(state, Msg::ChainCompleted { generation: 2 });
    assert_eq!(state.view().output_url.as_deref(), Some("u2"));
    assert!(state.consume_dirty());

    // Generation 1's late success arrives afterwards: a no-op.
    let (state, effects) = update(state, step_completed(1, "t1", "u1"));
    assert!(effects.is_empty());
    let (mut state, _effects) = update(state, Msg::ChainCompleted { generation: 1 });

    assert_eq!(state.view().output_url.as_deref(), Some("u2"));
    assert_eq!(state.view().phase, ChainPhase::Completed);
    assert!(!state.consume_dirty());
}

#[test]
fn stale_failure_is_discarded() {
    init_logging();
    let state = WidgetState::new();
    let state = trigger(state, "remove-background");
    let state = trigger(state, "change-background");

    let (state, _effects) = update(state, step_completed(2, "t2", "u2"));

    // The superseded chain failing later must not surface an error.
    let (mut state, _effects) = update(
        state,
        Msg::ChainFailed {
            generation: 1,
            step: 0,
            message: "http status 500".to_string(),
        },
    );
    assert!(state.view().error.is_none());
    assert_eq!(state.view().output_url.as_deref(), Some("u2"));
    assert!(!state.consume_dirty());
}

#[test]
fn double_trigger_assigns_strictly_increasing_generations() {
    init_logging();
    let state = WidgetState::new();

    let (state, first) = update(
        state,
        Msg::ActionTriggered {
            source_asset_id: "assetX".to_string(),
            steps: vec![StepRequest {
                operation: "remove-background".to_string(),
                source: StepSource::Source,
                background_id: None,
            }],
        },
    );
    let (state, second) = update(
        state,
        Msg::ActionTriggered {
            source_asset_id: "assetX".to_string(),
            steps: vec![StepRequest {
                operation: "remove-background".to_string(),
                source: StepSource::Source,
                background_id: None,
            }],
        },
    );

    let generation_of = |effects: &[widget_core::Effect]| match &effects[0] {
        widget_core::Effect::RunChain { generation, .. } => *generation,
    };
    // The later enqueue always wins: its generation is strictly greater.
    assert_eq!(generation_of(&first), 1);
    assert_eq!(generation_of(&second), 2);
    assert_eq!(state.view().generation, 2);
}
