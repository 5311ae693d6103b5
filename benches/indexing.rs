//! Admission and end-to-end indexing benchmarks.
//!
//! Run with: `cargo bench`
//! Save baseline: `cargo bench -- --save-baseline main`
//! Compare: `cargo bench -- --baseline main`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use csindex::index::{AdmissionFilter, IndexPipeline, Scope, TrigramStore};
use csindex::utils::app_data::IndexerConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A tree shaped like a C project: sources, headers, docs and test suites.
/// Of its 1040 files, the 500 sources and 20 headers outside `tests/` are
/// admitted.
fn create_fixture_tree() -> (TempDir, PathBuf) {
    let temp_dir = tempfile::Builder::new()
        .prefix("bench")
        .tempdir()
        .expect("Failed to create temp dir");
    let root = temp_dir.path().join("project");

    for module in 0..20 {
        let dir = root.join(format!("module_{module}"));
        fs::create_dir_all(dir.join("tests")).expect("Failed to create dirs");
        for file in 0..25 {
            let body = format!(
                "#include \"module_{module}.h\"\n\nint handler_{file}(struct ctx *c) {{\n    return c->value + {file};\n}}\n"
            );
            fs::write(dir.join(format!("src_{file}.c")), &body).expect("Failed to write file");
            fs::write(dir.join("tests").join(format!("case_{file}.c")), &body)
                .expect("Failed to write file");
        }
        fs::write(dir.join(format!("module_{module}.h")), "struct ctx { int value; };\n")
            .expect("Failed to write file");
        fs::write(dir.join("README.md"), "docs\n").expect("Failed to write file");
    }

    (temp_dir, root)
}

fn bench_admission(c: &mut Criterion) {
    let filter = AdmissionFilter::default();
    let names = [
        "parser.cc",
        "README.md",
        "foo_test.c",
        "test_bar.c",
        "Makefile",
        "kernel.S",
        ".gitignore",
        "backup.c~",
    ];

    c.bench_function("admission_files", |b| {
        b.iter(|| {
            for name in names {
                black_box(filter.decide(black_box(name), Scope::File));
            }
        })
    });
}

fn bench_full_build(c: &mut Criterion) {
    let (temp_dir, root) = create_fixture_tree();
    let master = temp_dir.path().join(".csearchindex");
    let config = IndexerConfig {
        reset: true,
        ..Default::default()
    };
    let store = TrigramStore::new(config.max_file_size);

    let mut group = c.benchmark_group("indexing");
    group.sample_size(20);
    group.bench_function("reset_build_520_of_1040_files", |b| {
        b.iter(|| {
            IndexPipeline::new(&store, &config)
                .run(&master, &[root.as_path()])
                .expect("Failed to build index")
        })
    });
    group.finish();

    remove_index(&master);
}

fn remove_index(master: &Path) {
    let _ = fs::remove_file(master);
}

criterion_group!(benches, bench_admission, bench_full_build);
criterion_main!(benches);
