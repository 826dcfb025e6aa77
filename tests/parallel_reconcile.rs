use std::sync::{Arc, Mutex};

use mnp_reconcile::execution::{ExecutionEvent, ExecutionObserver, ExecutionOptions};
use mnp_reconcile::reconcile::{reconcile, ReconEvent, ReconObserver, ReconOptions, ReconPolicy};
use mnp_reconcile::types::DataSet;
use mnp_reconcile::ReconError;

const MAKERS: [&str; 5] = ["Acme-Co.", "Globex Corp", "A.O. Smith", "Initech", "TBD - To Be Determined"];

/// A catalog pair large enough to span many chunks, with every kind of row mixed in.
fn catalogs(n: usize) -> (DataSet, DataSet) {
    let mut client_rows = Vec::with_capacity(n);
    let mut impl_rows = Vec::with_capacity(n);
    let codes: Vec<String> = (0..n).map(|i| format!("{:05}", i)).collect();
    let client_mnps: Vec<String> = (0..n).map(|i| format!("P-{}", i * 7)).collect();
    let impl_mnps: Vec<String> = (0..n)
        .map(|i| match i % 4 {
            0 => format!("P{}", i * 7),
            1 => format!("P{}X", i * 7),
            2 => format!("Q-{}", i),
            _ => "TBD".to_string(),
        })
        .collect();

    for i in 0..n {
        if i % 11 != 0 {
            client_rows.push(vec![
                Some(codes[i].as_str()),
                Some(MAKERS[i % MAKERS.len()]),
                Some(client_mnps[i].as_str()),
            ]);
        }
        if i % 13 != 0 {
            impl_rows.push(vec![
                Some(codes[i].as_str()),
                Some(MAKERS[(i / 2) % MAKERS.len()]),
                (i % 3 == 0).then_some("Legacy Maker"),
                Some(impl_mnps[i].as_str()),
                (i % 17 == 0).then_some("red tag: damaged"),
            ]);
        }
    }

    (
        DataSet::from_text_rows(&["item_code", "manufacturer_client", "mnp_client"], &client_rows),
        DataSet::from_text_rows(
            &[
                "item_code",
                "manufacturer_implementation",
                "legacy_manufacturer",
                "mnp_implementation",
                "description",
            ],
            &impl_rows,
        ),
    )
}

#[test]
fn parallel_results_equal_sequential_results() {
    let (client, implementation) = catalogs(2_000);
    let sequential = reconcile(&client, &implementation, &ReconOptions::default()).unwrap();
    assert!(sequential.stats.manufacturer_matches > 0);
    assert!(sequential.stats.mnp_matches > 0);
    assert!(sequential.stats.excluded_from_matching > 0);

    for (threads, chunk) in [(1, 1), (2, 7), (4, 64), (8, 4_096)] {
        let options = ReconOptions {
            execution: Some(ExecutionOptions {
                num_threads: Some(threads),
                chunk_size: chunk,
                max_in_flight_chunks: threads,
            }),
            ..Default::default()
        };
        let parallel = reconcile(&client, &implementation, &options).unwrap();
        assert_eq!(parallel, sequential, "threads={threads} chunk={chunk}");
    }
}

#[test]
fn raw_policy_is_also_order_independent() {
    let (client, implementation) = catalogs(500);
    let policy = ReconPolicy {
        mnp_threshold: None,
        ..Default::default()
    };
    let sequential = reconcile(
        &client,
        &implementation,
        &ReconOptions {
            policy: policy.clone(),
            ..Default::default()
        },
    )
    .unwrap();
    let parallel = reconcile(
        &client,
        &implementation,
        &ReconOptions {
            policy,
            execution: Some(ExecutionOptions {
                num_threads: Some(3),
                chunk_size: 5,
                max_in_flight_chunks: 2,
            }),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(parallel.results, sequential.results);
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
}

impl ReconObserver for RecordingObserver {
    fn on_event(&self, event: &ReconEvent) {
        let name = match event {
            ReconEvent::RunStarted { .. } => "started",
            ReconEvent::ContributorsScoped { .. } => "scoped",
            ReconEvent::LegacyFallbackApplied { .. } => "fallback",
            ReconEvent::RecordsExcluded { .. } => "excluded",
            ReconEvent::MatchingFinished { .. } => "matched",
            ReconEvent::RunFinished { .. } => "finished",
        };
        self.events.lock().unwrap().push(name.to_string());
    }

    fn on_failure(&self, error: &ReconError) {
        self.failures.lock().unwrap().push(error.to_string());
    }
}

#[test]
fn observer_sees_every_stage_in_order() {
    let (client, implementation) = catalogs(50);
    let obs = Arc::new(RecordingObserver::default());
    let options = ReconOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    reconcile(&client, &implementation, &options).unwrap();

    assert_eq!(
        *obs.events.lock().unwrap(),
        vec!["started", "fallback", "excluded", "matched", "finished"]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_is_told_about_aborted_runs() {
    let (client, _) = catalogs(10);
    let broken = DataSet::from_text_rows(&["item_code"], &[]);
    let obs = Arc::new(RecordingObserver::default());
    let options = ReconOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let _ = reconcile(&client, &broken, &options).unwrap_err();

    assert!(obs.events.lock().unwrap().is_empty());
    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("schema mismatch"));
}

#[derive(Default)]
struct ChunkRecorder {
    started: Mutex<Vec<usize>>,
    finished: Mutex<Vec<usize>>,
    items_processed: Mutex<Option<u64>>,
}

impl ExecutionObserver for ChunkRecorder {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::ChunkStarted { start, .. } => self.started.lock().unwrap().push(*start),
            ExecutionEvent::ChunkFinished { start } => self.finished.lock().unwrap().push(*start),
            ExecutionEvent::RunFinished { metrics, .. } => {
                *self.items_processed.lock().unwrap() = Some(metrics.items_processed)
            }
            _ => {}
        }
    }
}

#[test]
fn execution_observer_sees_chunks_of_a_parallel_run() {
    let (client, implementation) = catalogs(200);
    let chunks = Arc::new(ChunkRecorder::default());
    let options = ReconOptions {
        execution: Some(ExecutionOptions {
            num_threads: Some(2),
            chunk_size: 10,
            max_in_flight_chunks: 2,
        }),
        execution_observer: Some(chunks.clone()),
        ..Default::default()
    };

    let out = reconcile(&client, &implementation, &options).unwrap();

    let joined = out.results.row_count();
    let expected: Vec<usize> = (0..joined).step_by(10).collect();
    let mut started = chunks.started.lock().unwrap().clone();
    let mut finished = chunks.finished.lock().unwrap().clone();
    started.sort_unstable();
    finished.sort_unstable();
    assert_eq!(started, expected);
    assert_eq!(finished, expected);
    assert_eq!(*chunks.items_processed.lock().unwrap(), Some(joined as u64));
}

#[test]
fn execution_observer_is_unused_for_sequential_runs() {
    let (client, implementation) = catalogs(20);
    let chunks = Arc::new(ChunkRecorder::default());
    let options = ReconOptions {
        execution_observer: Some(chunks.clone()),
        ..Default::default()
    };

    reconcile(&client, &implementation, &options).unwrap();

    assert!(chunks.started.lock().unwrap().is_empty());
    assert_eq!(*chunks.items_processed.lock().unwrap(), None);
}

#[test]
fn unusable_execution_options_fail_the_run_instead_of_panicking() {
    let (client, implementation) = catalogs(20);
    let obs = Arc::new(RecordingObserver::default());
    for broken in [
        ExecutionOptions {
            num_threads: Some(2),
            chunk_size: 0,
            max_in_flight_chunks: 2,
        },
        ExecutionOptions {
            num_threads: Some(2),
            chunk_size: 16,
            max_in_flight_chunks: 0,
        },
        ExecutionOptions {
            num_threads: Some(0),
            chunk_size: 16,
            max_in_flight_chunks: 2,
        },
    ] {
        let options = ReconOptions {
            execution: Some(broken),
            observer: Some(obs.clone()),
            ..Default::default()
        };
        let err = reconcile(&client, &implementation, &options).unwrap_err();
        assert!(matches!(err, ReconError::InvalidExecution { .. }), "{err}");
    }

    assert!(obs.events.lock().unwrap().is_empty());
    assert_eq!(obs.failures.lock().unwrap().len(), 3);
}
