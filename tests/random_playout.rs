use chess_rules::{apply_move, is_in_check, legal_moves, status, GameStatus, Position, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const GAMES: u64 = 6;
const MAX_PLIES: usize = 80;

/// Plays random legal moves from the starting position, checking after every
/// ply that the mover's king is safe and the previous position is unchanged.
fn random_game(seed: u64) -> (Position, Side, usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut position = Position::initial();
    let mut side = Side::White;

    for ply in 0..MAX_PLIES {
        let moves = legal_moves(&position, side);
        if moves.is_empty() {
            assert!(status(&position, side).is_terminal(), "seed {} ply {}", seed, ply);
            return (position, side, ply);
        }
        let request = moves[rng.random_range(0..moves.len())];

        let before = position.clone();
        let next = apply_move(&position, &request, side)
            .unwrap_or_else(|e| panic!("listed move {} refused: {}", request, e));
        assert_eq!(position, before, "apply_move mutated its input");
        assert!(!is_in_check(&next, side), "seed {}: {} left {} in check", seed, request, side);
        assert!(next.find_king(Side::White).is_some() && next.find_king(Side::Black).is_some());

        position = next;
        side = side.opponent();
    }
    (position, side, MAX_PLIES)
}

#[test]
fn random_legal_moves_never_expose_the_mover() {
    for seed in 0..GAMES {
        random_game(seed);
    }
}

#[test]
fn playouts_are_reproducible_from_the_seed() {
    let (first, side_a, plies_a) = random_game(42);
    let (second, side_b, plies_b) = random_game(42);
    assert_eq!(first, second);
    assert_eq!((side_a, plies_a), (side_b, plies_b));
}

#[test]
fn status_agrees_with_the_move_list() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut position = Position::initial();
    let mut side = Side::White;
    for _ in 0..40 {
        let moves = legal_moves(&position, side);
        let current = status(&position, side);
        assert_eq!(moves.is_empty(), current.is_terminal());
        if current == GameStatus::Check || current == GameStatus::Checkmate {
            assert!(is_in_check(&position, side));
        }
        if moves.is_empty() {
            break;
        }
        let request = moves[rng.random_range(0..moves.len())];
        position = apply_move(&position, &request, side).unwrap();
        side = side.opponent();
    }
}
