use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;

/// A fetched module payload: a component bundle, a runtime chunk, or a
/// locale bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleData {
    pub key: String,
    pub bytes: Bytes,
}

/// Module or locale fetch failure. Cloneable so every caller awaiting the
/// same single-flight fetch sees the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load module {key}: {message}")]
pub struct LoadError {
    pub key: String,
    pub message: String,
}

impl LoadError {
    pub(crate) fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Fetches a module addressed by a deterministic base-plus-suffix path.
#[async_trait::async_trait]
pub trait ModuleFetcher: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Bytes, LoadError>;
}

pub struct HttpModuleFetcher {
    client: reqwest::Client,
    base_url: url::Url,
}

impl HttpModuleFetcher {
    pub fn new(base_url: &str) -> Result<Self, LoadError> {
        let mut normalized = base_url.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = url::Url::parse(&normalized)
            .map_err(|err| LoadError::new(base_url, err.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }
}

#[async_trait::async_trait]
impl ModuleFetcher for HttpModuleFetcher {
    async fn fetch(&self, key: &str) -> Result<Bytes, LoadError> {
        let endpoint = self
            .base_url
            .join(key)
            .map_err(|err| LoadError::new(key, err.to_string()))?;
        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|err| LoadError::new(key, err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::new(key, status.to_string()));
        }
        response
            .bytes()
            .await
            .map_err(|err| LoadError::new(key, err.to_string()))
    }
}

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<ModuleData>, LoadError>>>;

enum Entry {
    Ready(Arc<ModuleData>),
    Pending { id: u64, fut: SharedLoad },
}

/// Lazily fetches optional modules, at most one fetch per key at a time.
/// Owned and injectable: each orchestrator instance constructs its own
/// loader; nothing is process-wide.
pub struct ModuleLoader {
    fetcher: Arc<dyn ModuleFetcher>,
    entries: Mutex<Entries>,
}

#[derive(Default)]
struct Entries {
    map: HashMap<String, Entry>,
    next_load_id: u64,
}

impl ModuleLoader {
    pub fn new(fetcher: Arc<dyn ModuleFetcher>) -> Self {
        Self {
            fetcher,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Loads `key`, memoizing the result for the lifetime of the loader.
    ///
    /// A resolved key returns the cached module without IO. Concurrent
    /// callers of an unresolved key share one in-flight fetch. A failed
    /// fetch leaves the key absent, so a later deliberate call may retry;
    /// there is no implicit retry loop.
    pub async fn load(&self, key: &str) -> Result<Arc<ModuleData>, LoadError> {
        let (load_id, fut) = {
            let mut entries = self.entries.lock().expect("loader lock");
            match entries.map.get(key) {
                Some(Entry::Ready(module)) => return Ok(module.clone()),
                Some(Entry::Pending { id, fut }) => (*id, fut.clone()),
                None => {
                    let id = entries.next_load_id;
                    entries.next_load_id += 1;
                    let fetcher = self.fetcher.clone();
                    let owned_key = key.to_string();
                    let fut: SharedLoad = async move {
                        let bytes = fetcher.fetch(&owned_key).await?;
                        Ok(Arc::new(ModuleData {
                            key: owned_key,
                            bytes,
                        }))
                    }
                    .boxed()
                    .shared();
                    entries.map.insert(
                        key.to_string(),
                        Entry::Pending {
                            id,
                            fut: fut.clone(),
                        },
                    );
                    (id, fut)
                }
            }
        };

        let result = fut.await;
        self.settle(key, load_id, &result);
        result
    }

    /// Loads composite modules strictly in order: each key must resolve
    /// before the next fetch is issued. The first failure aborts the
    /// remainder and propagates.
    pub async fn load_chain(&self, keys: &[&str]) -> Result<Vec<Arc<ModuleData>>, LoadError> {
        let mut modules = Vec::with_capacity(keys.len());
        for key in keys {
            modules.push(self.load(key).await?);
        }
        Ok(modules)
    }

    /// Replaces the pending entry with the outcome of load `load_id`. The id
    /// guard keeps a slow waiter from clobbering a newer retry of the same
    /// key.
    fn settle(&self, key: &str, load_id: u64, result: &Result<Arc<ModuleData>, LoadError>) {
        let mut entries = self.entries.lock().expect("loader lock");
        let current = matches!(
            entries.map.get(key),
            Some(Entry::Pending { id, .. }) if *id == load_id
        );
        if !current {
            return;
        }
        match result {
            Ok(module) => {
                entries
                    .map
                    .insert(key.to_string(), Entry::Ready(module.clone()));
            }
            Err(_) => {
                entries.map.remove(key);
            }
        }
    }
}
