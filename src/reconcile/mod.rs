//! Reconciliation of a client catalog against an implementation catalog.
//!
//! [`reconcile`] is a pure function of its two input tables and [`ReconOptions`]:
//!
//! 1. read both tables through their logical schemas ([`tables`])
//! 2. scope implementation rows to on-site contributors, apply the legacy manufacturer
//!    fallback and count red tags ([`join`])
//! 3. outer join on `item_code`, excluding placeholder/incomplete implementation rows from
//!    matching
//! 4. run the manufacturer and part-number rules per joined row, optionally in parallel
//!    ([`crate::execution`])
//! 5. aggregate counts and percentages ([`stats`])
//!
//! ## Example
//!
//! ```rust
//! use mnp_reconcile::reconcile::{reconcile, ReconOptions};
//! use mnp_reconcile::types::DataSet;
//!
//! # fn main() -> Result<(), mnp_reconcile::ReconError> {
//! let client = DataSet::from_text_rows(
//!     &["item_code", "manufacturer_client", "mnp_client"],
//!     &[vec![Some("1001"), Some("Acme-Co."), Some("AB-123")]],
//! );
//! let implementation = DataSet::from_text_rows(
//!     &["item_code", "manufacturer_implementation", "mnp_implementation"],
//!     &[vec![Some("1001"), Some("ACME CO INTERNATIONAL"), Some("AB123X")]],
//! );
//!
//! let out = reconcile(&client, &implementation, &ReconOptions::default())?;
//! let row = &out.results.rows[0];
//! assert_eq!(row.manufacturer_match, Some(1));
//! assert_eq!(row.mnp_match, Some(100.0));
//! assert_eq!(out.stats.manufacturer_matches, 1);
//! # Ok(())
//! # }
//! ```

pub mod join;
pub mod observer;
pub mod options;
pub mod result;
pub mod stats;
pub mod tables;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{ReconError, ReconResult};
use crate::execution::ExecutionEngine;
use crate::matching::{manufacturer_verdict, mnp_verdict, MnpPolicy};
use crate::types::{DataSet, Value};

pub use join::{Exclusion, JoinedRecord};
pub use observer::{CompositeObserver, FileObserver, ReconEvent, ReconObserver, StdErrObserver};
pub use options::{ReconOptions, ReconPolicy, DEFAULT_PLACEHOLDER_MANUFACTURER};
pub use result::{ResultRow, ResultTable};
pub use stats::{MatchTally, ReconciliationStats};

/// Output of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconOutput {
    pub results: ResultTable,
    pub stats: ReconciliationStats,
}

/// Reconcile two catalogs.
///
/// Fails only on structural problems: a missing required column, an invalid policy or
/// execution settings the thread pool cannot run with.
/// Rows that cannot be matched are kept in the result table without verdicts and show up in
/// [`ReconciliationStats::excluded_from_matching`].
///
/// When an observer is configured, progress is reported through
/// [`ReconObserver::on_event`] and an abort through [`ReconObserver::on_failure`].
pub fn reconcile(
    client: &DataSet,
    implementation: &DataSet,
    options: &ReconOptions,
) -> ReconResult<ReconOutput> {
    let result = run(client, implementation, options);
    if let (Err(e), Some(obs)) = (&result, options.observer.as_ref()) {
        obs.on_failure(e);
    }
    result
}

fn run(client: &DataSet, implementation: &DataSet, options: &ReconOptions) -> ReconResult<ReconOutput> {
    let start = Instant::now();
    let policy = &options.policy;
    policy.validate()?;
    let engine = match &options.execution {
        Some(exec) => {
            let engine = ExecutionEngine::new(exec.clone())?;
            Some(match &options.execution_observer {
                Some(obs) => engine.with_observer(Arc::clone(obs)),
                None => engine,
            })
        }
        None => None,
    };
    let placeholder = policy.placeholder_manufacturer.as_str();

    let client = tables::client_records(client)?;
    let implementation = tables::implementation_records(implementation, policy.scopes_contributors())?;
    emit(options, ReconEvent::RunStarted {
        client_rows: client.len(),
        implementation_rows: implementation.len(),
    });

    let scoped = join::scope_to_contributors(implementation, &policy.on_site_contributors);
    if policy.scopes_contributors() {
        emit(options, ReconEvent::ContributorsScoped {
            kept: scoped.records.len(),
            dropped: scoped.dropped,
        });
    }

    let (implementation, fallbacks) = join::apply_legacy_fallback(scoped.records, placeholder);
    emit(options, ReconEvent::LegacyFallbackApplied { rows: fallbacks });

    let red_tags = join::count_red_tags(&implementation, placeholder);

    let (placeholders, incomplete) = implementation.iter().fold((0, 0), |(p, i), r| {
        match join::exclusion(r, placeholder) {
            Some(Exclusion::Placeholder) => (p + 1, i),
            Some(Exclusion::Incomplete) => (p, i + 1),
            None => (p, i),
        }
    });
    emit(options, ReconEvent::RecordsExcluded {
        placeholder: placeholders,
        incomplete,
    });

    let joined = join::outer_join(&client, &implementation, placeholder);
    let mnp_policy = policy.mnp_policy();
    let match_one = |j: &JoinedRecord<'_>| match_record(j, placeholder, &mnp_policy);
    let rows = match &engine {
        Some(engine) => engine.map_parallel(&joined, match_one),
        None => joined.iter().map(match_one).collect(),
    };
    emit(options, ReconEvent::MatchingFinished {
        joined_rows: rows.len(),
        parallel: engine.is_some(),
    });

    let stats = stats::aggregate(
        &stats::Inputs {
            client: &client,
            implementation: &implementation,
            created_items: scoped.created_items,
            red_tags,
            placeholder,
        },
        MatchTally::of(&rows),
    );
    emit(options, ReconEvent::RunFinished {
        elapsed: start.elapsed(),
        stats: Box::new(stats.clone()),
    });

    Ok(ReconOutput {
        results: ResultTable { rows },
        stats,
    })
}

/// Apply both comparison rules to one joined row.
///
/// The two field families are evaluated independently; an excluded implementation row gets
/// no verdict for either.
pub fn match_record(joined: &JoinedRecord<'_>, placeholder: &str, mnp_policy: &MnpPolicy) -> ResultRow {
    let client = joined.client;
    let matchable = joined.matchable_implementation();
    let cell = |v: Option<&Value>| v.cloned().unwrap_or(Value::Null);

    ResultRow {
        item_code: joined.item_code.to_owned(),
        manufacturer_client: cell(client.map(|c| &c.manufacturer)),
        manufacturer_implementation: cell(joined.implementation.map(|i| &i.manufacturer)),
        manufacturer_match: manufacturer_verdict(
            client.map(|c| &c.manufacturer),
            matchable.map(|i| &i.manufacturer),
            placeholder,
        ),
        mnp_client: cell(client.map(|c| &c.mnp)),
        mnp_implementation: cell(joined.implementation.map(|i| &i.mnp)),
        mnp_match: mnp_verdict(
            client.map(|c| &c.mnp),
            matchable.map(|i| &i.mnp),
            mnp_policy,
        ),
    }
}

fn emit(options: &ReconOptions, event: ReconEvent) {
    if let Some(obs) = &options.observer {
        obs.on_event(&event);
    }
}

/// An owned reconciliation job whose inputs may not have arrived yet.
#[derive(Clone, Default)]
pub struct ReconRequest {
    pub client: Option<DataSet>,
    pub implementation: Option<DataSet>,
    pub options: ReconOptions,
}

impl fmt::Debug for ReconRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconRequest")
            .field("client_rows", &self.client.as_ref().map(DataSet::row_count))
            .field(
                "implementation_rows",
                &self.implementation.as_ref().map(DataSet::row_count),
            )
            .field("options", &self.options)
            .finish()
    }
}

impl ReconRequest {
    /// Run [`reconcile`], failing with [`ReconError::MissingInput`] if a table is absent.
    pub fn run(&self) -> ReconResult<ReconOutput> {
        let missing = match (&self.client, &self.implementation) {
            (Some(c), Some(i)) => return reconcile(c, i, &self.options),
            (None, _) => ReconError::MissingInput { side: "client" },
            (Some(_), None) => ReconError::MissingInput {
                side: "implementation",
            },
        };
        if let Some(obs) = &self.options.observer {
            obs.on_failure(&missing);
        }
        Err(missing)
    }
}
