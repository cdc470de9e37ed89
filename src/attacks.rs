// src/attacks.rs
//! Attack rules: can the piece standing on one square reach/attack another?
//!
//! These are pure geometric tests. They ignore whose turn it is and never
//! consider castling; the move applier layers pawn pushes, castling and
//! self-check safety on top of them.
use crate::position::Position;
use crate::types::{PieceKind, Square};
use lazy_static::lazy_static;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    ( 2,  1), ( 2, -1), (-2,  1), (-2, -1),
    ( 1,  2), ( 1, -2), (-1,  2), (-1, -2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    ( 1,  0), (-1,  0), ( 0,  1), ( 0, -1),
    ( 1,  1), ( 1, -1), (-1,  1), (-1, -1),
];

// --- Precomputed Attack Tables ---

lazy_static! {
    static ref KNIGHT_ATTACKS: [u64; 64] = compute_leaper_attacks(&KNIGHT_OFFSETS);
    static ref KING_ATTACKS: [u64; 64] = compute_leaper_attacks(&KING_OFFSETS);
}

/// Per-square masks for pieces that jump by fixed offsets.
fn compute_leaper_attacks(offsets: &[(i8, i8)]) -> [u64; 64] {
    let mut attacks = [0u64; 64];
    for from in Square::all() {
        attacks[from.index()] = offsets.iter()
            .filter_map(|&(dr, df)| from.offset(dr, df))
            .fold(0u64, |mask, to| mask | to.bit());
    }
    attacks
}

/// True if every square strictly between `from` and `to` is empty.
/// The two squares must share a rank, file or diagonal; otherwise false.
pub fn is_path_clear(position: &Position, from: Square, to: Square) -> bool {
    let dr = to.rank() as i8 - from.rank() as i8;
    let df = to.file() as i8 - from.file() as i8;
    let aligned = dr == 0 || df == 0 || dr.abs() == df.abs();
    if !aligned || (dr == 0 && df == 0) { return false; }

    let (step_r, step_f) = (dr.signum(), df.signum());
    let mut current = from;
    loop {
        current = match current.offset(step_r, step_f) {
            Some(next) => next,
            None => return false, // Unreachable for aligned on-board squares
        };
        if current == to { return true; }
        if !position.is_empty(current) { return false; }
    }
}

/// Orthogonal alignment plus clear path.
pub fn rook_reaches(position: &Position, from: Square, to: Square) -> bool {
    let same_rank = from.rank() == to.rank();
    let same_file = from.file() == to.file();
    same_rank != same_file && is_path_clear(position, from, to)
}

/// Diagonal alignment plus clear path.
pub fn bishop_reaches(position: &Position, from: Square, to: Square) -> bool {
    let dr = (to.rank() as i8 - from.rank() as i8).abs();
    let df = (to.file() as i8 - from.file() as i8).abs();
    dr == df && dr != 0 && is_path_clear(position, from, to)
}

#[inline]
pub fn knight_reaches(from: Square, to: Square) -> bool {
    KNIGHT_ATTACKS[from.index()] & to.bit() != 0
}

#[inline]
pub fn king_reaches(from: Square, to: Square) -> bool {
    KING_ATTACKS[from.index()] & to.bit() != 0
}

/// Whether the piece on `from` attacks `to` in `position`.
///
/// Pawns only attack their two forward diagonals, and only when an enemy
/// piece is standing there; a straight pawn push is never an attack.
/// An empty `from` attacks nothing.
pub fn can_attack(position: &Position, from: Square, to: Square) -> bool {
    let piece = match position.piece_at(from) {
        Some(piece) => piece,
        None => return false,
    };
    if from == to { return false; }

    match piece.kind {
        PieceKind::Pawn => {
            let dr = to.rank() as i8 - from.rank() as i8;
            let df = to.file() as i8 - from.file() as i8;
            let enemy_on_target = position.side_at(to) == Some(piece.side.opponent());
            dr == piece.side.pawn_direction() && df.abs() == 1 && enemy_on_target
        }
        PieceKind::Knight => knight_reaches(from, to),
        PieceKind::King => king_reaches(from, to),
        PieceKind::Rook => rook_reaches(position, from, to),
        PieceKind::Bishop => bishop_reaches(position, from, to),
        PieceKind::Queen => rook_reaches(position, from, to) || bishop_reaches(position, from, to),
    }
}
