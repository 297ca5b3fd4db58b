use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use nightfall::game::{roster_for, FinalVote, PlayerId, RoundTable};
use nightfall::resolve::{evaluate, find_accused, resolve_night, tally_verdict};

/// A nine-player table in roster order, every player aiming at the next seat.
fn busy_table() -> RoundTable {
    let roster = roster_for(9).unwrap();
    let mut table = RoundTable::new();
    for (i, role) in roster.iter().enumerate() {
        table.seat(PlayerId(i as u32), *role);
    }
    for i in 0..9u32 {
        let state = table.get_mut(PlayerId(i)).unwrap();
        state.target = Some(PlayerId((i + 1) % 9));
        state.vote = Some(PlayerId(8));
        state.final_vote = if i % 2 == 0 {
            FinalVote::Guilty
        } else {
            FinalVote::Innocent
        };
    }
    table
}

fn bench_resolve_night(c: &mut Criterion) {
    let table = busy_table();
    c.bench_function("resolve_night_9_players", |b| {
        b.iter_batched(
            || table.clone(),
            |mut table| resolve_night(black_box(&mut table)),
            BatchSize::SmallInput,
        )
    });
}

fn bench_trial_tallies(c: &mut Criterion) {
    let table = busy_table();
    c.bench_function("find_accused_9_players", |b| {
        b.iter(|| find_accused(black_box(&table)))
    });
    c.bench_function("tally_verdict_9_players", |b| {
        b.iter(|| tally_verdict(black_box(&table)))
    });
    c.bench_function("evaluate_9_players", |b| {
        b.iter(|| evaluate(black_box(&table)))
    });
}

criterion_group!(benches, bench_resolve_night, bench_trial_tallies);
criterion_main!(benches);
