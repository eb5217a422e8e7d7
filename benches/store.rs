// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use linkshop::backend::{Backend, FolderBackend, LinkoRequest};
use linkshop::store::{detect_file_type, FileStore, FileType};

mod fixtures;
mod profiler;

use fixtures::{Case, TempDir};

struct Seeded {
    _tmp: TempDir,
    backend: FolderBackend,
}

fn seeded(case: Case, prefix: &str) -> Seeded {
    let tmp = TempDir::new(prefix);
    let backend = FolderBackend::new(FileStore::new(tmp.path().join("store")));
    let ontology = serde_json::to_string(&fixtures::ontology(case)).expect("ontology json");
    let abstraction =
        serde_json::to_string(&fixtures::abstraction(case)).expect("abstraction json");
    backend
        .save_file("session", &fixtures::commands_json(case))
        .expect("save commands");
    backend.save_file("doc", &ontology).expect("save ontology");
    backend.save_file("doc", &abstraction).expect("save abstraction");
    Seeded { _tmp: tmp, backend }
}

fn request() -> LinkoRequest {
    LinkoRequest {
        commands: "session".to_owned(),
        ontology: "doc".to_owned(),
        abstraction: "doc".to_owned(),
        linkograph: Some("bench".to_owned()),
    }
}

// Benchmark identity (keep stable):
// - Group names in this file: `store.detect`, `store.create_linko`.
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time (e.g. `commands_small`, `io_medium`).
fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("store.detect");
    for (case, id) in [(Case::Small, "small"), (Case::Medium, "medium")] {
        let commands = fixtures::commands_json(case);
        let ontology = serde_json::to_string(&fixtures::ontology(case)).expect("ontology json");
        group.bench_function(format!("commands_{id}"), |b| {
            b.iter(|| black_box(detect_file_type(black_box(&commands))))
        });
        group.bench_function(format!("ontology_{id}"), |b| {
            b.iter(|| black_box(detect_file_type(black_box(&ontology))))
        });
    }
    group.finish();
}

fn bench_create_linko(c: &mut Criterion) {
    let mut group = c.benchmark_group("store.create_linko");
    for (case, id) in [(Case::Small, "small"), (Case::Medium, "medium")] {
        group.bench_function(format!("io_{id}"), |b| {
            b.iter_batched_ref(
                || seeded(case, "store_create_linko"),
                |seeded| {
                    let name = seeded.backend.create_linko(black_box(&request())).expect("create");
                    let drawn = seeded.backend.draw_linko(&name).expect("draw");
                    black_box(fixtures::checksum_linkograph(&drawn))
                },
                BatchSize::SmallInput,
            )
        });
        let warm = seeded(case, "store_list");
        group.bench_function(format!("list_{id}"), |b| {
            b.iter(|| {
                let mut total = 0usize;
                for file_type in FileType::ALL {
                    total += warm.backend.file_list(file_type).expect("file list").len();
                }
                black_box(total)
            })
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = bench_detect, bench_create_linko
}
criterion_main!(benches);
