// src/check.rs
use crate::attacks::can_attack;
use crate::position::Position;
use crate::types::{Side, Square};

/// Checks if the king of the specified side is currently attacked by any opposing piece.
///
/// A missing king counts as being in check, so no move is ever judged safe
/// for that side. Callers that accept arbitrary positions report it.
pub fn is_in_check(position: &Position, side: Side) -> bool {
    match position.find_king(side) {
        Some(king_sq) => is_attacked_by(position, king_sq, side.opponent()),
        None => true,
    }
}

/// True if any piece of `attacker` can attack `target`.
pub fn is_attacked_by(position: &Position, target: Square, attacker: Side) -> bool {
    position.pieces(attacker).any(|(from, _)| can_attack(position, from, target))
}

/// Would `side`'s king be in check if it stood on `square` instead?
/// Evaluated on a private copy; used for the squares a castling king crosses.
pub fn king_square_attacked_at(position: &Position, side: Side, square: Square) -> bool {
    let king_sq = match position.find_king(side) {
        Some(sq) => sq,
        None => return true,
    };
    let mut probe = position.clone();
    if let Some(king) = probe.clear_square(king_sq) {
        probe.set_piece_at(square, king);
    }
    is_in_check(&probe, side)
}
