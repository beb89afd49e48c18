mod effects;
mod logging;

use std::sync::{mpsc, Arc};
use std::time::Duration;

use widget_core::{update, ChainPhase, Msg, StepRequest, StepSource, WidgetState};
use widget_engine::{
    AccessTokenProvider, HttpModuleFetcher, JobSettings, LocaleResolver, ModuleLoader,
    ReqwestJobClient, SequencerHandle, StaticTokenProvider,
};
use widget_logging::{widget_error, widget_info};

use crate::effects::EffectRunner;

/// Headless demo host: runs one remove-background + finalize chain against
/// the configured job API and prints the resulting output URL.
fn main() {
    logging::initialize(logging::LogDestination::Terminal);

    let job_api = match std::env::var("WIDGET_JOB_API") {
        Ok(value) => value,
        Err(_) => {
            eprintln!(
                "usage: WIDGET_JOB_API=<url> [WIDGET_MODULE_BASE=<url>] \
                 [WIDGET_API_TOKEN=<token>] [WIDGET_LOCALE=<code>] widget_app [asset-id]"
            );
            std::process::exit(2);
        }
    };
    let token = std::env::var("WIDGET_API_TOKEN").unwrap_or_default();
    let locale = std::env::var("WIDGET_LOCALE").unwrap_or_else(|_| "en-US".to_string());
    let asset_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo-asset".to_string());

    let tokens = Arc::new(StaticTokenProvider::new(token, locale));

    if let Ok(module_base) = std::env::var("WIDGET_MODULE_BASE") {
        show_localized_title(&module_base, tokens.as_ref());
    }

    let client = match ReqwestJobClient::new(&job_api, JobSettings::default(), tokens) {
        Ok(client) => client,
        Err(error) => {
            widget_error!("invalid job api configuration: {}", error.message);
            std::process::exit(2);
        }
    };
    let sequencer = SequencerHandle::new(Arc::new(client));

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(sequencer, msg_tx);

    let mut state = WidgetState::new();
    let (next, effects) = update(
        state,
        Msg::ActionTriggered {
            source_asset_id: asset_id,
            steps: vec![
                StepRequest {
                    operation: "remove-background".to_string(),
                    source: StepSource::Source,
                    background_id: None,
                },
                StepRequest {
                    operation: "finalize".to_string(),
                    source: StepSource::PreviousOutput,
                    background_id: None,
                },
            ],
        },
    );
    state = next;
    runner.enqueue(effects);

    loop {
        let msg = match msg_rx.recv_timeout(Duration::from_secs(120)) {
            Ok(msg) => msg,
            Err(_) => {
                widget_error!("timed out waiting for engine events");
                std::process::exit(1);
            }
        };
        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);

        if !state.consume_dirty() {
            continue;
        }
        let view = state.view();
        match view.phase {
            ChainPhase::Completed => {
                widget_info!("chain generation {} completed", view.generation);
                if let Some(output_url) = view.output_url {
                    println!("output: {output_url}");
                }
                return;
            }
            ChainPhase::Failed { step } => {
                eprintln!(
                    "chain failed at step {step}: {}",
                    view.error.unwrap_or_default()
                );
                std::process::exit(1);
            }
            _ => {
                for row in &view.steps {
                    widget_info!(
                        "step {} ({}) -> {}",
                        row.step,
                        row.operation,
                        row.output_url
                    );
                }
            }
        }
    }
}

/// Loads the locale bundle for the configured locale and prints the widget
/// title. A failed lazy load leaves the optional text unrendered.
fn show_localized_title(module_base: &str, tokens: &dyn AccessTokenProvider) {
    let fetcher = match HttpModuleFetcher::new(module_base) {
        Ok(fetcher) => fetcher,
        Err(error) => {
            widget_error!("invalid module base: {}", error);
            return;
        }
    };
    let loader = Arc::new(ModuleLoader::new(Arc::new(fetcher)));
    let resolver = LocaleResolver::new(loader, "en-US");

    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let locale = tokens.locale();
    match runtime.block_on(resolver.resolve(Some(&locale))) {
        Ok(entry) => {
            if let Some(title) = entry.bundle.get("title") {
                println!("{title} [{}]", entry.resolved);
            }
        }
        Err(error) => {
            widget_error!("locale bundle unavailable: {}", error);
        }
    }
}
