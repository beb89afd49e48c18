//! Widget engine: remote job IO, chain sequencing, and lazy module loading.
mod job;
mod loader;
mod locale;
mod sequencer;
mod types;

pub use job::{AccessTokenProvider, JobClient, JobSettings, ReqwestJobClient, StaticTokenProvider};
pub use loader::{HttpModuleFetcher, LoadError, ModuleData, ModuleFetcher, ModuleLoader};
pub use locale::{locale_key, LocaleBundle, LocaleEntry, LocaleResolver};
pub use sequencer::SequencerHandle;
pub use types::{
    ActionChain, ChainStep, EngineEvent, FailureKind, Generation, JobError, JobRequest, JobResult,
    OperationKind, StepInput,
};
