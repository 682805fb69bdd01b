use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use clockpool::buffer::replacer::Fifo;
use clockpool::storage::MemoryStore;
use clockpool::{BufferManager, Page, PageId, PinMode};

/// Pool of `pool_size` frames over `num_pages` pages, all unpinned.
fn setup(pool_size: usize, num_pages: usize) -> (BufferManager, Vec<PageId>) {
    let bpm = BufferManager::new(pool_size, MemoryStore::new());
    let pages = (0..num_pages)
        .map(|i| {
            let pid = bpm
                .new_page(&Page::from_prefix(&(i as u32).to_le_bytes()), 1)
                .unwrap()
                .page_id();
            bpm.unpin_page(pid, true).unwrap();
            pid
        })
        .collect();
    (bpm, pages)
}

fn bench_pin_hit(c: &mut Criterion) {
    let (bpm, pages) = setup(64, 64);

    c.bench_function("pin_hit", |b| {
        let mut i = 0;
        b.iter(|| {
            let pid = pages[i % pages.len()];
            i += 1;
            bpm.pin_page(black_box(pid), PinMode::Read).unwrap();
            bpm.unpin_page(pid, false).unwrap();
        })
    });
}

fn bench_sequential_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_scan");

    for &pool_size in &[16usize, 64, 256] {
        let (bpm, pages) = setup(pool_size, pool_size * 4);
        group.bench_with_input(BenchmarkId::new("clock", pool_size), &pages, |b, pages| {
            b.iter(|| {
                for &pid in pages {
                    let guard = bpm.fetch_page_read(pid).unwrap();
                    black_box(guard.as_slice()[0]);
                }
            })
        });

        let (bpm, pages) = setup(pool_size, pool_size * 4);
        bpm.set_policy(Box::new(Fifo::new()));
        group.bench_with_input(BenchmarkId::new("fifo", pool_size), &pages, |b, pages| {
            b.iter(|| {
                for &pid in pages {
                    let guard = bpm.fetch_page_read(pid).unwrap();
                    black_box(guard.as_slice()[0]);
                }
            })
        });
    }

    group.finish();
}

fn bench_mostly_pinned_sweep(c: &mut Criterion) {
    // All but one frame pinned: every miss walks the whole ring.
    let (bpm, pages) = setup(128, 256);
    let held = &pages[..127];
    for &pid in held {
        bpm.pin_page(pid, PinMode::Read).unwrap();
    }
    let cold = &pages[127..];

    c.bench_function("mostly_pinned_sweep", |b| {
        let mut i = 0;
        b.iter(|| {
            let pid = cold[i % cold.len()];
            i += 1;
            let guard = bpm.fetch_page_read(pid).unwrap();
            black_box(guard.as_slice()[0]);
        })
    });
}

criterion_group!(
    benches,
    bench_pin_hit,
    bench_sequential_scan,
    bench_mostly_pinned_sweep
);
criterion_main!(benches);
