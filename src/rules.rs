// src/rules.rs
//! The move applier: validates a requested move and produces the next position.
use crate::attacks::{bishop_reaches, is_path_clear, king_reaches, knight_reaches, rook_reaches};
use crate::check::{is_in_check, king_square_attacked_at};
use crate::error::MoveError;
use crate::position::{EnPassant, Position};
use crate::types::{Piece, PieceKind, Side, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Move Representation ---

/// A move as requested by a player: raw (rank, file) coordinates, which may
/// lie off the board, plus the promotion choice for a pawn reaching the last rank.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MoveRequest {
    pub from: (i8, i8),
    pub to: (i8, i8),
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> Self {
        MoveRequest {
            from: (from.rank() as i8, from.file() as i8),
            to: (to.rank() as i8, to.file() as i8),
            promotion: None,
        }
    }

    /// Builds a request from raw coordinates without any range check.
    pub fn from_coords(from_rank: i8, from_file: i8, to_rank: i8, to_file: i8) -> Self {
        MoveRequest { from: (from_rank, from_file), to: (to_rank, to_file), promotion: None }
    }

    pub fn with_promotion(self, kind: PieceKind) -> Self {
        MoveRequest { promotion: Some(kind), ..self }
    }

    pub fn source(&self) -> Option<Square> {
        Square::new(self.from.0, self.from.1)
    }

    pub fn destination(&self) -> Option<Square> {
        Square::new(self.to.0, self.to.1)
    }

    /// Coordinate notation such as "e2e4" or "e7e8q"; off-board squares print as "??".
    pub fn to_notation(&self) -> String {
        let name = |sq: Option<Square>| sq.map_or("??".to_string(), |s| s.to_string());
        format!("{}{}{}",
            name(self.source()),
            name(self.destination()),
            self.promotion.map_or(String::new(), |k| k.symbol().to_string()))
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

/// Side effects a shape-valid move carries beyond moving the piece itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum MoveEffect {
    Plain,
    DoubleStep { skipped: Square },
    EnPassantCapture { victim: Square },
    Castle { rook_from: Square, rook_to: Square },
}

// --- Move Application ---

/// Validates `request` for `side` against `position` and, if legal, returns the
/// resulting position. `position` itself is never modified.
///
/// Checks run in a fixed order and the first failure is reported: source
/// ownership, destination bounds, friendly fire, piece shape (castling has its
/// own error), promotion choice, and finally self-check safety, which is
/// tested by applying the move to a private copy.
pub fn apply_move(position: &Position, request: &MoveRequest, side: Side) -> Result<Position, MoveError> {
    let from = request.source().ok_or(MoveError::NoOwnedPieceAtSource)?;
    let piece = match position.piece_at(from) {
        Some(piece) if piece.side == side => piece,
        _ => return Err(MoveError::NoOwnedPieceAtSource),
    };

    let to = request.destination().ok_or(MoveError::OutOfBounds)?;
    if position.side_at(to) == Some(side) {
        return Err(MoveError::FriendlyFireCapture);
    }

    let effect = check_shape(position, piece, from, to)?;
    let placed_kind = promotion_kind(piece, to, request.promotion)?;

    let mut next = position.clone();
    next.clear_square(from);
    next.set_piece_at(to, piece.moved_as(placed_kind));
    next.set_en_passant(None); // Only the move right after a double step may use it

    match effect {
        MoveEffect::Plain => {}
        MoveEffect::DoubleStep { skipped } => {
            next.set_en_passant(Some(EnPassant { target: skipped, capturer: side.opponent() }));
        }
        MoveEffect::EnPassantCapture { victim } => {
            next.clear_square(victim);
        }
        MoveEffect::Castle { rook_from, rook_to } => {
            if let Some(rook) = next.clear_square(rook_from) {
                next.set_piece_at(rook_to, rook.moved_as(PieceKind::Rook));
            }
        }
    }

    if is_in_check(&next, side) {
        return Err(MoveError::MovesIntoCheck);
    }
    Ok(next)
}

/// Per-kind geometry and obstruction test.
fn check_shape(position: &Position, piece: Piece, from: Square, to: Square) -> Result<MoveEffect, MoveError> {
    let dx = to.rank() as i8 - from.rank() as i8;
    let dy = to.file() as i8 - from.file() as i8;

    let fits = match piece.kind {
        PieceKind::Pawn => return pawn_shape(position, piece.side, from, to, dx, dy),
        PieceKind::King if dx == 0 && dy.abs() == 2 => return castle_shape(position, piece, from, dy),
        PieceKind::King => king_reaches(from, to),
        PieceKind::Knight => knight_reaches(from, to),
        PieceKind::Rook => rook_reaches(position, from, to),
        PieceKind::Bishop => bishop_reaches(position, from, to),
        PieceKind::Queen => rook_reaches(position, from, to) || bishop_reaches(position, from, to),
    };

    if fits { Ok(MoveEffect::Plain) } else { Err(MoveError::IllegalShapeForPiece) }
}

fn pawn_shape(position: &Position, side: Side, from: Square, to: Square, dx: i8, dy: i8) -> Result<MoveEffect, MoveError> {
    let dir = side.pawn_direction();

    // Single step
    if dy == 0 && dx == dir {
        return if position.is_empty(to) { Ok(MoveEffect::Plain) } else { Err(MoveError::IllegalShapeForPiece) };
    }

    // Double step from the start rank, both squares empty
    if dy == 0 && dx == 2 * dir && from.rank() == side.pawn_start_rank() {
        let skipped = from.offset(dir, 0).ok_or(MoveError::IllegalShapeForPiece)?;
        return if position.is_empty(skipped) && position.is_empty(to) {
            Ok(MoveEffect::DoubleStep { skipped })
        } else {
            Err(MoveError::IllegalShapeForPiece)
        };
    }

    // Diagonal capture, regular or en passant
    if dy.abs() == 1 && dx == dir {
        if position.side_at(to) == Some(side.opponent()) {
            return Ok(MoveEffect::Plain);
        }
        if position.en_passant() == Some(EnPassant { target: to, capturer: side }) {
            let victim = Square::new(from.rank() as i8, to.file() as i8).ok_or(MoveError::IllegalShapeForPiece)?;
            let victim_is_enemy_pawn = position.piece_at(victim)
                .map_or(false, |p| p.kind == PieceKind::Pawn && p.side == side.opponent());
            if victim_is_enemy_pawn {
                return Ok(MoveEffect::EnPassantCapture { victim });
            }
        }
    }

    Err(MoveError::IllegalShapeForPiece)
}

/// King two files sideways. The rook in that direction sits on the corner of
/// the king's rank; neither may have moved, everything between them must be
/// empty, and the king may not start on, cross, or land on an attacked square.
fn castle_shape(position: &Position, king: Piece, from: Square, dy: i8) -> Result<MoveEffect, MoveError> {
    if king.has_moved {
        return Err(MoveError::InvalidCastle);
    }

    let step = dy.signum();
    let rook_file = if step > 0 { 7 } else { 0 };
    let rook_from = Square::new(from.rank() as i8, rook_file).ok_or(MoveError::InvalidCastle)?;
    match position.piece_at(rook_from) {
        Some(rook) if rook.kind == PieceKind::Rook && rook.side == king.side && !rook.has_moved => {}
        _ => return Err(MoveError::InvalidCastle),
    }
    if !is_path_clear(position, from, rook_from) {
        return Err(MoveError::InvalidCastle);
    }

    for distance in 0..=2 {
        let crossed = from.offset(0, step * distance).ok_or(MoveError::InvalidCastle)?;
        if king_square_attacked_at(position, king.side, crossed) {
            return Err(MoveError::InvalidCastle);
        }
    }

    let rook_to = from.offset(0, step).ok_or(MoveError::InvalidCastle)?;
    Ok(MoveEffect::Castle { rook_from, rook_to })
}

/// Kind the moved piece has on arrival.
fn promotion_kind(piece: Piece, to: Square, requested: Option<PieceKind>) -> Result<PieceKind, MoveError> {
    let promotes = piece.kind == PieceKind::Pawn && to.rank() == piece.side.promotion_rank();
    match (promotes, requested) {
        (false, None) => Ok(piece.kind),
        (false, Some(_)) => Err(MoveError::InvalidPromotion),
        (true, None) => Ok(PieceKind::Queen),
        (true, Some(kind)) if kind.is_promotion_choice() => Ok(kind),
        (true, Some(_)) => Err(MoveError::InvalidPromotion),
    }
}

// --- Legal Move Listing ---

/// Destinations the piece on `from` may legally move to. Empty if `from`
/// does not hold a piece of `side`.
pub fn legal_destinations(position: &Position, from: Square, side: Side) -> Vec<Square> {
    Square::all()
        .filter(|&to| to != from)
        .filter(|&to| apply_move(position, &MoveRequest::new(from, to), side).is_ok())
        .collect()
}

/// Every legal (from, to) pair for `side`. Promotions are listed once, with
/// the default (queen) choice.
pub fn legal_moves(position: &Position, side: Side) -> Vec<MoveRequest> {
    position.pieces(side)
        .flat_map(|(from, _)| {
            legal_destinations(position, from, side).into_iter().map(move |to| MoveRequest::new(from, to))
        })
        .collect()
}
