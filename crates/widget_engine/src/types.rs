use std::fmt;

use serde::Deserialize;

/// Monotonically increasing tag distinguishing the newest user-triggered
/// chain from superseded ones.
pub type Generation = u64;

/// Statically known remote operation identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    RemoveBackground,
    ChangeBackground,
    Summarize,
    Finalize,
}

impl OperationKind {
    /// Parses a widget-configuration operation string. Unknown identifiers
    /// are a configuration error, raised before any network call.
    pub fn parse(value: &str) -> Result<Self, JobError> {
        match value {
            "remove-background" => Ok(Self::RemoveBackground),
            "change-background" => Ok(Self::ChangeBackground),
            "summarize" => Ok(Self::Summarize),
            "finalize" => Ok(Self::Finalize),
            other => Err(JobError::new(
                FailureKind::Configuration,
                format!("unknown operation kind {other:?}"),
            )),
        }
    }

    /// Request path under the job API base.
    pub fn path(&self) -> &'static str {
        match self {
            Self::RemoveBackground => "jobs/remove-background",
            Self::ChangeBackground => "jobs/change-background",
            Self::Summarize => "jobs/summarize",
            Self::Finalize => "jobs/finalize",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoveBackground => "remove-background",
            Self::ChangeBackground => "change-background",
            Self::Summarize => "summarize",
            Self::Finalize => "finalize",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which asset a chain step consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepInput {
    /// The asset the user interacted with.
    Source,
    /// The asset produced by the previous step.
    PreviousOutput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    pub kind: OperationKind,
    pub input: StepInput,
    pub background_id: Option<String>,
}

/// Ordered chain of remote operations triggered by one user interaction.
/// Validated on construction so malformed shapes fail before any network
/// call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionChain {
    pub source_asset_id: String,
    pub steps: Vec<ChainStep>,
}

impl ActionChain {
    pub fn new(
        source_asset_id: impl Into<String>,
        steps: Vec<ChainStep>,
    ) -> Result<Self, JobError> {
        let source_asset_id = source_asset_id.into();
        if source_asset_id.trim().is_empty() {
            return Err(JobError::new(FailureKind::Configuration, "empty source asset id"));
        }
        if steps.is_empty() {
            return Err(JobError::new(FailureKind::Configuration, "empty chain"));
        }
        for (index, step) in steps.iter().enumerate() {
            if index == 0 && step.input == StepInput::PreviousOutput {
                return Err(JobError::new(
                    FailureKind::Configuration,
                    "first step has no previous output",
                ));
            }
            match step.kind {
                OperationKind::ChangeBackground => {
                    if step.background_id.is_none() {
                        return Err(JobError::new(
                            FailureKind::Configuration,
                            format!("step {index}: change-background requires a background id"),
                        ));
                    }
                }
                _ => {
                    if step.background_id.is_some() {
                        return Err(JobError::new(
                            FailureKind::Configuration,
                            format!("step {index}: background id is only valid for change-background"),
                        ));
                    }
                }
            }
        }
        Ok(Self {
            source_asset_id,
            steps,
        })
    }
}

/// Input for one remote job call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub kind: OperationKind,
    pub asset_id: String,
    pub background_id: Option<String>,
}

/// Success payload of one remote job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub asset_id: String,
    pub output_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobError {
    pub kind: FailureKind,
    pub message: String,
}

impl JobError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Unknown operation kind or malformed input. A programmer error:
    /// raised before any network call, never retried.
    Configuration,
    HttpStatus(u16),
    Timeout,
    Network,
    MalformedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Configuration => write!(f, "configuration error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

/// Generation-tagged notifications published to the presentation layer.
/// A superseded chain emits nothing; it completes silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    StepCompleted {
        generation: Generation,
        step: usize,
        kind: OperationKind,
        result: JobResult,
    },
    ChainCompleted {
        generation: Generation,
    },
    ChainFailed {
        generation: Generation,
        step: usize,
        error: JobError,
    },
}
