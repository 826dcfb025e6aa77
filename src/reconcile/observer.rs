//! Observer hooks for reconciliation runs.
//!
//! Observers never affect results; a failing [`FileObserver`] write is ignored.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::ReconError;

use super::stats::ReconciliationStats;

/// Progress events emitted while a reconciliation runs.
#[derive(Debug, Clone)]
pub enum ReconEvent {
    RunStarted {
        client_rows: usize,
        implementation_rows: usize,
    },
    /// Implementation rows restricted to on-site contributors.
    ContributorsScoped { kept: usize, dropped: usize },
    /// Placeholder manufacturers replaced by the legacy manufacturer.
    LegacyFallbackApplied { rows: usize },
    /// Implementation rows that will not be matched.
    RecordsExcluded { placeholder: usize, incomplete: usize },
    MatchingFinished { joined_rows: usize, parallel: bool },
    RunFinished {
        elapsed: Duration,
        stats: Box<ReconciliationStats>,
    },
}

/// Observer interface for reconciliation runs.
///
/// Implementors can record metrics, write logs or forward to another logging system.
pub trait ReconObserver: Send + Sync {
    fn on_event(&self, _event: &ReconEvent) {}

    /// Called when a run aborts.
    fn on_failure(&self, _error: &ReconError) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ReconObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ReconObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ReconObserver for CompositeObserver {
    fn on_event(&self, event: &ReconEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }

    fn on_failure(&self, error: &ReconError) {
        for o in &self.observers {
            o.on_failure(error);
        }
    }
}

/// Logs reconciliation events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ReconObserver for StdErrObserver {
    fn on_event(&self, event: &ReconEvent) {
        eprintln!("[recon] {}", describe(event));
    }

    fn on_failure(&self, error: &ReconError) {
        eprintln!("[recon][aborted] err={error}");
    }
}

/// Appends reconciliation events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl ReconObserver for FileObserver {
    fn on_event(&self, event: &ReconEvent) {
        self.append_line(&format!("{} {}", unix_ts(), describe(event)));
    }

    fn on_failure(&self, error: &ReconError) {
        self.append_line(&format!("{} aborted err={error}", unix_ts()));
    }
}

fn describe(event: &ReconEvent) -> String {
    match event {
        ReconEvent::RunStarted {
            client_rows,
            implementation_rows,
        } => format!("started client_rows={client_rows} implementation_rows={implementation_rows}"),
        ReconEvent::ContributorsScoped { kept, dropped } => {
            format!("scoped kept={kept} dropped={dropped}")
        }
        ReconEvent::LegacyFallbackApplied { rows } => format!("legacy_fallback rows={rows}"),
        ReconEvent::RecordsExcluded {
            placeholder,
            incomplete,
        } => format!("excluded placeholder={placeholder} incomplete={incomplete}"),
        ReconEvent::MatchingFinished {
            joined_rows,
            parallel,
        } => format!("matched joined_rows={joined_rows} parallel={parallel}"),
        ReconEvent::RunFinished { elapsed, stats } => format!(
            "finished elapsed={elapsed:?} manufacturer_matches={} mnp_matches={} red_tags={} excluded={}",
            stats.manufacturer_matches, stats.mnp_matches, stats.red_tags, stats.excluded_from_matching
        ),
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
