use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use mnp_reconcile::execution::ExecutionOptions;
use mnp_reconcile::matching::mnp_similarity;
use mnp_reconcile::normalize::{token_from_text, words_from_text};
use mnp_reconcile::reconcile::{reconcile, ReconOptions};
use mnp_reconcile::types::DataSet;

fn catalogs(n: usize) -> (DataSet, DataSet) {
    let codes: Vec<String> = (0..n).map(|i| i.to_string()).collect();
    let client_mnps: Vec<String> = (0..n).map(|i| format!("AB-{i}")).collect();
    let impl_mnps: Vec<String> = (0..n).map(|i| format!("AB{i}X")).collect();

    let client_rows: Vec<Vec<Option<&str>>> = (0..n)
        .map(|i| vec![Some(codes[i].as_str()), Some("Acme-Co."), Some(client_mnps[i].as_str())])
        .collect();
    let impl_rows: Vec<Vec<Option<&str>>> = (0..n)
        .map(|i| {
            vec![
                Some(codes[i].as_str()),
                Some("ACME CO INTERNATIONAL"),
                Some(impl_mnps[i].as_str()),
            ]
        })
        .collect();

    (
        DataSet::from_text_rows(&["item_code", "manufacturer_client", "mnp_client"], &client_rows),
        DataSet::from_text_rows(
            &["item_code", "manufacturer_implementation", "mnp_implementation"],
            &impl_rows,
        ),
    )
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("words_from_text", |b| {
        b.iter(|| words_from_text(black_box("A.O. Smith Water-Products + Co., Ltd.")))
    });
    c.bench_function("token_from_text", |b| {
        b.iter(|| token_from_text(black_box("TBD-AB 123/45-X")))
    });
    c.bench_function("mnp_similarity", |b| {
        b.iter(|| mnp_similarity(black_box("AB12345X"), black_box("AB12346")))
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for n in [1_000usize, 20_000] {
        let (client, implementation) = catalogs(n);
        group.bench_with_input(BenchmarkId::new("sequential", n), &n, |b, _| {
            b.iter(|| reconcile(&client, &implementation, &ReconOptions::default()))
        });
        let parallel = ReconOptions {
            execution: Some(ExecutionOptions::default()),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("parallel", n), &n, |b, _| {
            b.iter(|| reconcile(&client, &implementation, &parallel))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_reconcile);
criterion_main!(benches);
