use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use widget_core::{Effect, Msg, StepRequest, StepSource};
use widget_engine::{
    ActionChain, ChainStep, EngineEvent, JobError, OperationKind, SequencerHandle, StepInput,
};
use widget_logging::{widget_info, widget_warn};

/// Bridges the pure core and the engine: forwards `Effect`s to the
/// sequencer and pumps engine events back as `Msg`s.
pub struct EffectRunner {
    sequencer: SequencerHandle,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(sequencer: SequencerHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { sequencer, msg_tx };
        runner.spawn_event_loop();
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RunChain {
                    generation,
                    source_asset_id,
                    steps,
                } => {
                    widget_info!(
                        "RunChain generation={} steps={} source={}",
                        generation,
                        steps.len(),
                        source_asset_id
                    );
                    match build_chain(source_asset_id, &steps) {
                        Ok(chain) => self.sequencer.run(generation, chain),
                        Err(error) => {
                            widget_warn!("chain rejected: {}", error.message);
                            let _ = self.msg_tx.send(Msg::ChainFailed {
                                generation,
                                step: 0,
                                message: error.kind.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    fn spawn_event_loop(&self) {
        let sequencer = self.sequencer.clone();
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || loop {
            if let Some(event) = sequencer.try_recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

/// Parses widget-config steps into an engine chain. Unknown operations and
/// malformed shapes fail here, before anything reaches the network.
fn build_chain(source_asset_id: String, steps: &[StepRequest]) -> Result<ActionChain, JobError> {
    let mut chain_steps = Vec::with_capacity(steps.len());
    for step in steps {
        chain_steps.push(ChainStep {
            kind: OperationKind::parse(&step.operation)?,
            input: map_source(step.source),
            background_id: step.background_id.clone(),
        });
    }
    ActionChain::new(source_asset_id, chain_steps)
}

fn map_source(source: StepSource) -> StepInput {
    match source {
        StepSource::Source => StepInput::Source,
        StepSource::PreviousOutput => StepInput::PreviousOutput,
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StepCompleted {
            generation,
            step,
            kind,
            result,
        } => Msg::StepCompleted {
            generation,
            step,
            operation: kind.to_string(),
            asset_id: result.asset_id,
            output_url: result.output_url,
        },
        EngineEvent::ChainCompleted { generation } => Msg::ChainCompleted { generation },
        EngineEvent::ChainFailed {
            generation,
            step,
            error,
        } => {
            widget_warn!(
                "chain generation {} failed at step {}: {}",
                generation,
                step,
                error.message
            );
            Msg::ChainFailed {
                generation,
                step,
                message: error.kind.to_string(),
            }
        }
    }
}
