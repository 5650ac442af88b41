// benches/aggregate.rs
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use std::collections::HashMap;
use std::io::Write;

use ff_scrape::aggregate::identity::PlayerKey;
use ff_scrape::aggregate::index::{self, SnapshotLookup};
use ff_scrape::aggregate::reader::PositionReader;

const ROWS: usize = 2_000;

fn build_snapshot() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "name,team,pos,proj").unwrap();
    for i in 0..ROWS {
        writeln!(f, "Player {i:04},TM{},QB,{}.5", i % 32, i).unwrap();
    }
    f.flush().unwrap();
    f
}

fn build_index(path: &std::path::Path) {
    let mut reader = PositionReader::open(path).unwrap();
    let mut positions = HashMap::new();
    while let Some((offset, fields)) = reader.next_row().unwrap() {
        let key = PlayerKey::new(
            reader.field(&fields, "name").unwrap(),
            reader.field(&fields, "team").unwrap(),
            reader.field(&fields, "pos").unwrap(),
        );
        positions.insert(key.cache_str(), offset);
    }
    index::save(path, &positions).unwrap();
}

fn bench_lookup(c: &mut Criterion) {
    let snap = build_snapshot();
    let last = PlayerKey::new(&format!("Player {:04}", ROWS - 1), &format!("TM{}", (ROWS - 1) % 32), "QB");

    c.bench_function("lookup_brute_force", |b| {
        let mut lookup = SnapshotLookup::open(snap.path()).unwrap();
        b.iter(|| {
            let v = lookup.value(black_box(&last), "proj").unwrap();
            black_box(v.len())
        })
    });

    build_index(snap.path());
    c.bench_function("lookup_indexed", |b| {
        let mut lookup = SnapshotLookup::open(snap.path()).unwrap();
        b.iter(|| {
            let v = lookup.value(black_box(&last), "proj").unwrap();
            black_box(v.len())
        })
    });

    let _ = std::fs::remove_file(index::index_path(snap.path()));
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
