use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use games_tictactoe::{Board, Coord, Piece, Variant};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// A mid-game ultimate position with a few settled-looking regions.
fn midgame_ultimate() -> Board {
    let mut board = Board::new(Variant::Ultimate);
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let mut side = Piece::First;
    for _ in 0..30 {
        if board.status().is_over() {
            break;
        }
        let moves = board.legal_moves();
        let mv = *moves.choose(&mut rng).unwrap();
        board.play_unchecked(mv, side);
        side = side.opponent();
    }
    board
}

fn bench_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_moves");

    let basic = Board::new(Variant::Basic);
    group.bench_function("basic_empty", |b| b.iter(|| black_box(basic.legal_moves())));

    let empty = Board::new(Variant::Ultimate);
    group.bench_function("ultimate_empty", |b| {
        b.iter(|| black_box(empty.legal_moves()))
    });

    let midgame = midgame_ultimate();
    group.bench_function("ultimate_midgame", |b| {
        b.iter(|| black_box(midgame.legal_moves()))
    });

    group.finish();
}

fn bench_apply_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_move");
    let base = Board::new(Variant::Ultimate);
    group.bench_function("ultimate_centre", |b| {
        b.iter_batched(
            || base.clone(),
            |mut board| {
                board.apply_move(Coord::new(4, 4), Piece::First).unwrap();
                board
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_random_playout(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_playout");

    for variant in [Variant::Basic, Variant::Ultimate] {
        group.bench_function(variant.name(), |b| {
            let mut rng = ChaCha20Rng::seed_from_u64(42);
            b.iter_batched(
                || Board::new(variant),
                |mut board| {
                    let mut side = Piece::First;
                    while !board.check_win().is_over() {
                        let moves = board.legal_moves();
                        let mv = *moves.choose(&mut rng).unwrap();
                        board.play_unchecked(mv, side);
                        side = side.opponent();
                    }
                    board
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_legal_moves,
    bench_apply_move,
    bench_random_playout
);
criterion_main!(benches);
