use std::hint::black_box;

use chiptally::pot::build_pots;
use chiptally::settlement::distribute;
use chiptally::table::{Seat, SeatId, SeatStatus};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn seats(n: usize) -> Vec<Seat> {
    (0..n)
        .map(|i| {
            let mut s = Seat::new(format!("p{i}"), "", None, 0);
            // staggered all-ins with every third seat folded
            s.hand_bet = 100 * (i as u64 + 1);
            s.status = match i % 3 {
                0 => SeatStatus::Fold,
                1 => SeatStatus::AllIn,
                _ => SeatStatus::Active,
            };
            s
        })
        .collect()
}

fn bench_build_pots(c: &mut Criterion) {
    let mut g = c.benchmark_group("build_pots");
    for n in [2usize, 6, 12] {
        let table = seats(n);
        g.bench_with_input(BenchmarkId::new("staggered", n), &table, |b, input| {
            b.iter(|| build_pots(black_box(input)))
        });
    }
    g.finish();
}

fn bench_distribute(c: &mut Criterion) {
    let table = seats(12);
    let pots = match build_pots(&table) {
        Ok(p) => p,
        Err(_) => return,
    };
    let winners: Vec<Vec<SeatId>> = pots.iter().map(|p| p.eligible.clone()).collect();
    c.bench_function("distribute_12_seats", |b| {
        b.iter(|| distribute(black_box(&pots), black_box(&winners)))
    });
}

criterion_group!(benches, bench_build_pots, bench_distribute);
criterion_main!(benches);
