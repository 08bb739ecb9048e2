use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sales_pipeline::batch::{partition, partition_contiguous, SummaryBuilder};
use std::path::PathBuf;
use tokio::runtime::Runtime;

fn file_list(count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| PathBuf::from(format!("data/bg/{}.csv", 1900 + i)))
        .collect()
}

fn benchmark_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    for count in [10, 1_000, 100_000] {
        let files = file_list(count);
        group.bench_with_input(BenchmarkId::new("remainder_appended", count), &files, |b, files| {
            b.iter(|| partition(black_box(files), black_box(7)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("contiguous", count), &files, |b, files| {
            b.iter(|| partition_contiguous(black_box(files), black_box(7)).unwrap())
        });
    }

    group.finish();
}

fn benchmark_summarize(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("2020.csv");
    let mut contents = String::from("Country,UnitPrice,TotalPrice\n");
    for i in 0..10_000 {
        let region = ["China", "France", "India", "Japan", "Russia"][i % 5];
        contents.push_str(&format!("{},{}.5,{}.0\n", region, i % 50, i % 200));
    }
    std::fs::write(&path, contents).unwrap();

    let builder = SummaryBuilder::default();
    c.bench_function("summarize_10k_rows", |b| {
        b.iter(|| builder.summarize(black_box(&path)).unwrap())
    });
}

fn benchmark_collect(c: &mut Criterion) {
    use sales_pipeline::batch::Orchestrator;
    use sales_pipeline::config::PipelineConfig;
    use sales_pipeline::sink::MemorySink;
    use std::sync::Arc;

    let rt = Runtime::new().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<PathBuf> = (0..12)
        .map(|i| {
            let path = dir.path().join(format!("{}.csv", 2000 + i));
            let mut contents = String::from("Country,UnitPrice,TotalPrice\n");
            for row in 0..2_000 {
                contents.push_str(&format!("R{},1.0,{}\n", row % 9, row % 31));
            }
            std::fs::write(&path, contents).unwrap();
            path
        })
        .collect();

    for workers in [1, 4] {
        let config = PipelineConfig::default().with_workers(workers);
        let orchestrator = Orchestrator::new(&config, Arc::new(MemorySink::new()), "out").unwrap();
        c.bench_function(&format!("collect_12_files_{}_workers", workers), |b| {
            b.iter(|| rt.block_on(orchestrator.collect(black_box(files.clone()))).unwrap())
        });
    }
}

criterion_group!(benches, benchmark_partition, benchmark_summarize, benchmark_collect);
criterion_main!(benches);
