//! Policy and run options for [`super::reconcile`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, ReconResult};
use crate::execution::{ExecutionObserver, ExecutionOptions};
use crate::matching::{MnpPolicy, MNP_MATCH_THRESHOLD};

use super::observer::ReconObserver;

/// Manufacturer value meaning "not yet determined".
pub const DEFAULT_PLACEHOLDER_MANUFACTURER: &str = "TBD - To Be Determined";

/// Business rules for a reconciliation run.
///
/// Serializable so a site can keep its policy in a JSON file; every field is optional in the
/// JSON and falls back to [`Default`].
///
/// ```rust
/// use mnp_reconcile::reconcile::ReconPolicy;
///
/// let policy = ReconPolicy::from_json_str(r#"{ "mnp_threshold": null }"#).unwrap();
/// assert_eq!(policy.mnp_threshold, None);
/// assert_eq!(policy.placeholder_manufacturer, "TBD - To Be Determined");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconPolicy {
    /// Exact manufacturer string treated as "unknown".
    pub placeholder_manufacturer: String,
    /// Part-number cutoff in percent; `None` stores raw similarities instead of 0/100.
    pub mnp_threshold: Option<f64>,
    /// Contributors working on site. When non-empty, implementation rows are scoped to those
    /// last modified by one of them and `created_items` counts rows created by them.
    pub on_site_contributors: Vec<String>,
}

impl ReconPolicy {
    /// Parse a policy from JSON.
    pub fn from_json_str(json: &str) -> ReconResult<Self> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reject policies that cannot produce meaningful verdicts.
    pub fn validate(&self) -> ReconResult<()> {
        match self.mnp_threshold {
            Some(t) if !(0.0..=100.0).contains(&t) => {
                return Err(ReconError::InvalidPolicy {
                    message: format!("mnp_threshold must be within 0..=100, got {t}"),
                });
            }
            _ => {}
        }
        if self.placeholder_manufacturer.is_empty() {
            return Err(ReconError::InvalidPolicy {
                message: "placeholder_manufacturer must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn mnp_policy(&self) -> MnpPolicy {
        MnpPolicy {
            threshold: self.mnp_threshold,
        }
    }

    pub(crate) fn scopes_contributors(&self) -> bool {
        !self.on_site_contributors.is_empty()
    }
}

impl Default for ReconPolicy {
    fn default() -> Self {
        Self {
            placeholder_manufacturer: DEFAULT_PLACEHOLDER_MANUFACTURER.to_string(),
            mnp_threshold: Some(MNP_MATCH_THRESHOLD),
            on_site_contributors: Vec::new(),
        }
    }
}

/// Options controlling a reconciliation run.
///
/// Use [`Default`] for a sequential run with the default policy and no logging.
#[derive(Clone, Default)]
pub struct ReconOptions {
    pub policy: ReconPolicy,
    /// Run per-row matching on a thread pool. `None` matches sequentially.
    pub execution: Option<ExecutionOptions>,
    /// Optional observer for logging.
    pub observer: Option<Arc<dyn ReconObserver>>,
    /// Optional observer for chunk-level events of a parallel run. Ignored when `execution`
    /// is `None`.
    pub execution_observer: Option<Arc<dyn ExecutionObserver>>,
}

impl fmt::Debug for ReconOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconOptions")
            .field("policy", &self.policy)
            .field("execution", &self.execution)
            .field("observer_set", &self.observer.is_some())
            .field("execution_observer_set", &self.execution_observer.is_some())
            .finish()
    }
}
