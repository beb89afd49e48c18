use std::collections::HashMap;
use std::sync::Arc;

use widget_logging::widget_warn;

use crate::{LoadError, ModuleLoader};

/// Flat key -> text map for widget labels.
pub type LocaleBundle = HashMap<String, String>;

/// A resolved locale bundle plus the locale actually served, which may
/// differ from the requested one after the fallback hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleEntry {
    pub requested: String,
    pub resolved: String,
    pub bundle: LocaleBundle,
}

/// Resolves locale bundles through the module loader, so concurrent callers
/// and repeated lookups share the loader's memoization.
pub struct LocaleResolver {
    loader: Arc<ModuleLoader>,
    default_locale: String,
}

impl LocaleResolver {
    pub fn new(loader: Arc<ModuleLoader>, default_locale: impl Into<String>) -> Self {
        Self {
            loader,
            default_locale: default_locale.into(),
        }
    }

    /// Resolves `code`, or the default locale when `None`.
    ///
    /// A missing bundle falls back to the default locale exactly once; a
    /// fallback failure propagates. The requested locale is not retried;
    /// the single hop is the whole policy.
    pub async fn resolve(&self, code: Option<&str>) -> Result<LocaleEntry, LoadError> {
        let requested = code.unwrap_or(&self.default_locale).to_string();
        match self.load_bundle(&requested).await {
            Ok(bundle) => Ok(LocaleEntry {
                resolved: requested.clone(),
                requested,
                bundle,
            }),
            Err(err) if requested != self.default_locale => {
                widget_warn!(
                    "locale {} unavailable ({}), falling back to {}",
                    requested,
                    err.message,
                    self.default_locale
                );
                let bundle = self.load_bundle(&self.default_locale).await?;
                Ok(LocaleEntry {
                    requested,
                    resolved: self.default_locale.clone(),
                    bundle,
                })
            }
            Err(err) => Err(err),
        }
    }

    async fn load_bundle(&self, code: &str) -> Result<LocaleBundle, LoadError> {
        let key = locale_key(code);
        let module = self.loader.load(&key).await?;
        serde_json::from_slice(&module.bytes).map_err(|err| LoadError::new(key, err.to_string()))
    }
}

/// Deterministic module key for a locale bundle.
pub fn locale_key(code: &str) -> String {
    format!("locales/{code}.json")
}
