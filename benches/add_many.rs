//! This bench test simulates building up a large requirement document line by
//! line and writing it back out as markdown.

#![allow(missing_docs)]

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use reqedit::{Document, Kind, storage::markdown};

/// Appends groups of requirements, each with a nested comment.
fn populate(document: &mut Document, groups: usize) {
    for i in 0..groups {
        let subtitle = document
            .add_after(1, Kind::Subtitle, &format!("Section {i}"), None)
            .unwrap();
        for j in 0..5 {
            let requirement = document
                .add_under(subtitle, Kind::Requirement, &format!("Requirement {j}"), None)
                .unwrap();
            document
                .add_under(requirement, Kind::Comment, "Note", None)
                .unwrap();
        }
    }
}

fn add_many(c: &mut Criterion) {
    c.bench_function("add many", |b| {
        b.iter_batched(
            || Document::with_template("Benchmark", "2025-01-01 00:00"),
            |mut document| {
                populate(&mut document, 50);
                markdown::serialize(document.nodes())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, add_many);
criterion_main!(benches);
