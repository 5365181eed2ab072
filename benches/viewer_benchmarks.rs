//! Criterion benchmarks for the viewer's hot paths.
//!
//! Run with: `cargo bench`
//!
//! Inputs are synthetic and deterministic so numbers compare across machines.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use vfs_viewer::filter::{filter_references, FilterMode};
use vfs_viewer::{advance, compute_matches, segment_for_highlight, Direction, FileReference};

// ─── Helpers ─────────────────────────────────────────────────────────

/// ~`bytes` of log-like ASCII text with "timeout" roughly every 12th line.
fn ascii_document(bytes: usize) -> String {
    let mut text = String::with_capacity(bytes + 128);
    let mut line = 0usize;
    while text.len() < bytes {
        if line % 12 == 0 {
            text.push_str(&format!("{:06} WARN request {} hit a Timeout after 30s\n", line, line * 7));
        } else {
            text.push_str(&format!("{:06} INFO handled request {} in {}ms\n", line, line * 7, line % 90));
        }
        line += 1;
    }
    text
}

/// Mixed-script text where case folding and multi-byte chars matter.
fn unicode_document(bytes: usize) -> String {
    let mut text = String::with_capacity(bytes + 128);
    let mut line = 0usize;
    while text.len() < bytes {
        text.push_str(match line % 4 {
            0 => "Größe der Straße: ÄRGER über Ärger\n",
            1 => "Ελληνικά κείμενα με ΣΙΓΜΑ και σίγμα\n",
            2 => "日本語のテキストと English words mixed\n",
            _ => "ÅNGSTRÖM ångström Ångström ångström\n",
        });
        line += 1;
    }
    text
}

fn synthetic_references(n: usize) -> Vec<FileReference> {
    const EXTS: [(&str, &str); 5] = [
        ("md", "text/markdown"),
        ("txt", "text/plain"),
        ("rs", "text/x-rust"),
        ("png", "image/png"),
        ("json", "application/json"),
    ];
    (0..n)
        .map(|i| {
            let (ext, mime) = EXTS[i % EXTS.len()];
            let path = format!("team_{}/project_{}/report_{:05}.{}", i % 17, i % 101, i, ext);
            FileReference {
                container_id: "bench".to_string(),
                file_id: path.clone(),
                path,
                mime_type: mime.to_string(),
                size_bytes: (i * 1337) as u64,
            }
        })
        .collect()
}

// ─── Benchmarks ──────────────────────────────────────────────────────

fn bench_compute_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_matches");
    for size in [64 * 1024, 1024 * 1024] {
        let ascii = ascii_document(size);
        group.throughput(Throughput::Bytes(ascii.len() as u64));
        group.bench_with_input(BenchmarkId::new("ascii", size), &ascii, |b, text| {
            b.iter(|| compute_matches(black_box(text), black_box("timeout")))
        });

        let unicode = unicode_document(size);
        group.throughput(Throughput::Bytes(unicode.len() as u64));
        group.bench_with_input(BenchmarkId::new("unicode", size), &unicode, |b, text| {
            b.iter(|| compute_matches(black_box(text), black_box("ångström")))
        });
    }

    // Worst case for overlapping search: every position matches.
    let dense = "a".repeat(256 * 1024);
    group.throughput(Throughput::Bytes(dense.len() as u64));
    group.bench_function("overlapping_dense", |b| {
        b.iter(|| compute_matches(black_box(&dense), black_box("aa")))
    });
    group.finish();
}

fn bench_segment_for_highlight(c: &mut Criterion) {
    let text = ascii_document(1024 * 1024);
    let set = compute_matches(&text, "request");
    let stepped = advance(advance(set.clone(), Direction::Next), Direction::Next);

    let mut group = c.benchmark_group("segment_for_highlight");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("first_current", |b| {
        b.iter(|| segment_for_highlight(black_box(&text), black_box(&set)))
    });
    group.bench_function("third_current", |b| {
        b.iter(|| segment_for_highlight(black_box(&text), black_box(&stepped)))
    });
    group.finish();
}

fn bench_filter_references(c: &mut Criterion) {
    let refs = synthetic_references(20_000);

    let mut group = c.benchmark_group("filter_references");
    group.bench_function("substring", |b| {
        b.iter(|| filter_references(black_box(refs.clone()), black_box("Report_001"), FilterMode::Substring))
    });
    group.bench_function("regex", |b| {
        b.iter(|| filter_references(black_box(refs.clone()), black_box(r"project_(7|42)/.*\.md$"), FilterMode::Regex))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_compute_matches,
    bench_segment_for_highlight,
    bench_filter_references,
);

criterion_main!(benches);
