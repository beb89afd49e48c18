use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::{FailureKind, JobError, JobRequest, JobResult, OperationKind};

/// Timeouts for remote job calls. The request deadline may be tightened per
/// operation kind; chain length itself is unbounded.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub per_kind_deadlines: HashMap<OperationKind, Duration>,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            per_kind_deadlines: HashMap::new(),
        }
    }
}

impl JobSettings {
    pub fn deadline_for(&self, kind: OperationKind) -> Duration {
        self.per_kind_deadlines
            .get(&kind)
            .copied()
            .unwrap_or(self.request_timeout)
    }
}

/// Injected capability supplying the page's bearer token and locale code.
pub trait AccessTokenProvider: Send + Sync {
    fn bearer_token(&self) -> String;
    fn locale(&self) -> String;
}

/// Fixed token and locale, for the demo host and tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
    locale: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            locale: locale.into(),
        }
    }
}

impl AccessTokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> String {
        self.token.clone()
    }

    fn locale(&self) -> String {
        self.locale.clone()
    }
}

/// Issues a single remote job. Exactly one round trip per submit; callers
/// decide about retries.
#[async_trait::async_trait]
pub trait JobClient: Send + Sync {
    async fn submit(&self, request: &JobRequest) -> Result<JobResult, JobError>;
}

pub struct ReqwestJobClient {
    settings: JobSettings,
    base_url: reqwest::Url,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl ReqwestJobClient {
    pub fn new(
        base_url: &str,
        settings: JobSettings,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, JobError> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            settings,
            base_url,
            tokens,
        })
    }

    fn build_client(&self, deadline: Duration) -> Result<reqwest::Client, JobError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(deadline)
            .build()
            .map_err(|err| JobError::new(FailureKind::Network, err.to_string()))
    }

    fn endpoint(&self, kind: OperationKind) -> Result<reqwest::Url, JobError> {
        self.base_url
            .join(kind.path())
            .map_err(|err| JobError::new(FailureKind::Configuration, err.to_string()))
    }
}

#[async_trait::async_trait]
impl JobClient for ReqwestJobClient {
    async fn submit(&self, request: &JobRequest) -> Result<JobResult, JobError> {
        if request.asset_id.trim().is_empty() {
            return Err(JobError::new(FailureKind::Configuration, "empty asset id"));
        }
        let endpoint = self.endpoint(request.kind)?;
        let client = self.build_client(self.settings.deadline_for(request.kind))?;

        let mut body = serde_json::json!({
            "operation": request.kind.as_str(),
            "assetId": request.asset_id,
        });
        if let Some(background_id) = &request.background_id {
            body["backgroundId"] = serde_json::Value::String(background_id.clone());
        }

        let response = client
            .post(endpoint)
            .bearer_auth(self.tokens.bearer_token())
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let message = if detail.is_empty() {
                status.to_string()
            } else {
                format!("{status}: {detail}")
            };
            return Err(JobError::new(FailureKind::HttpStatus(status.as_u16()), message));
        }

        response
            .json::<JobResult>()
            .await
            .map_err(|err| JobError::new(FailureKind::MalformedResponse, err.to_string()))
    }
}

/// The base must end with a slash so `Url::join` keeps its path prefix.
fn parse_base_url(base_url: &str) -> Result<reqwest::Url, JobError> {
    let mut normalized = base_url.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    reqwest::Url::parse(&normalized)
        .map_err(|err| JobError::new(FailureKind::Configuration, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> JobError {
    if err.is_timeout() {
        return JobError::new(FailureKind::Timeout, err.to_string());
    }
    JobError::new(FailureKind::Network, err.to_string())
}
