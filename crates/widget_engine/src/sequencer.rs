use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use widget_logging::widget_debug;

use crate::{
    ActionChain, EngineEvent, FailureKind, Generation, JobClient, JobError, JobRequest, JobResult,
    StepInput,
};

enum SequencerCommand {
    RunChain {
        generation: Generation,
        chain: ActionChain,
    },
}

/// Drives action chains for one widget instance. Commands enter through
/// [`SequencerHandle::run`]; generation-tagged events come back through
/// [`SequencerHandle::try_recv`].
#[derive(Clone)]
pub struct SequencerHandle {
    cmd_tx: mpsc::Sender<SequencerCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    newest: Arc<AtomicU64>,
}

impl SequencerHandle {
    pub fn new(client: Arc<dyn JobClient>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SequencerCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let newest = Arc::new(AtomicU64::new(0));
        let newest_worker = newest.clone();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                let newest = newest_worker.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, &newest, event_tx).await;
                });
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            newest,
        }
    }

    /// Enqueues a chain under `generation`. From this point on, any chain
    /// with an older generation is superseded: its in-flight call is left to
    /// finish, but its results are discarded when they resolve.
    pub fn run(&self, generation: Generation, chain: ActionChain) {
        self.newest.fetch_max(generation, Ordering::SeqCst);
        let _ = self
            .cmd_tx
            .send(SequencerCommand::RunChain { generation, chain });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

async fn handle_command(
    client: &dyn JobClient,
    command: SequencerCommand,
    newest: &AtomicU64,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        SequencerCommand::RunChain { generation, chain } => {
            run_chain(client, generation, chain, newest, &event_tx).await;
        }
    }
}

async fn run_chain(
    client: &dyn JobClient,
    generation: Generation,
    chain: ActionChain,
    newest: &AtomicU64,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    let mut previous: Option<JobResult> = None;
    for (index, step) in chain.steps.iter().enumerate() {
        if newest.load(Ordering::SeqCst) != generation {
            widget_debug!("chain generation {} superseded, skipping step {}", generation, index);
            return;
        }

        let asset_id = match step.input {
            StepInput::Source => chain.source_asset_id.clone(),
            StepInput::PreviousOutput => match &previous {
                Some(result) => result.asset_id.clone(),
                None => {
                    let _ = event_tx.send(EngineEvent::ChainFailed {
                        generation,
                        step: index,
                        error: JobError::new(
                            FailureKind::Configuration,
                            "step has no previous output",
                        ),
                    });
                    return;
                }
            },
        };

        let result = client
            .submit(&JobRequest {
                kind: step.kind,
                asset_id,
                background_id: step.background_id.clone(),
            })
            .await;

        // The call itself cannot be aborted; staleness is decided once it
        // resolves. A superseded chain completes silently.
        if newest.load(Ordering::SeqCst) != generation {
            widget_debug!("chain generation {} superseded, dropping result of step {}", generation, index);
            return;
        }

        match result {
            Ok(job_result) => {
                let _ = event_tx.send(EngineEvent::StepCompleted {
                    generation,
                    step: index,
                    kind: step.kind,
                    result: job_result.clone(),
                });
                previous = Some(job_result);
            }
            Err(error) => {
                let _ = event_tx.send(EngineEvent::ChainFailed {
                    generation,
                    step: index,
                    error,
                });
                return;
            }
        }
    }

    let _ = event_tx.send(EngineEvent::ChainCompleted { generation });
}
