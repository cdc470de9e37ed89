// src/status.rs
use crate::check::is_in_check;
use crate::position::Position;
use crate::rules::{apply_move, MoveRequest};
use crate::types::{Side, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Game Termination Status ---

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Normal,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    /// Checkmate and stalemate both end the game.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Normal => write!(f, "normal"),
            GameStatus::Check => write!(f, "check"),
            GameStatus::Checkmate => write!(f, "checkmate"),
            GameStatus::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// True if `side` has at least one legal move.
///
/// Tries every (from, to) pair for every piece of `side` through
/// `apply_move` and stops at the first success. `apply_move` already rejects
/// moves that leave the king attacked, so one success is a legal escape.
pub fn has_legal_move(position: &Position, side: Side) -> bool {
    position.pieces(side).any(|(from, _)| {
        Square::all()
            .filter(|&to| to != from)
            .any(|to| apply_move(position, &MoveRequest::new(from, to), side).is_ok())
    })
}

/// Status of `position` with `side` to move.
pub fn status(position: &Position, side: Side) -> GameStatus {
    let in_check = is_in_check(position, side);
    match (in_check, has_legal_move(position, side)) {
        (true, true) => GameStatus::Check,
        (false, true) => GameStatus::Normal,
        (true, false) => GameStatus::Checkmate,
        (false, false) => GameStatus::Stalemate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Piece, PieceKind};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn with(pieces: &[(&str, PieceKind, Side)]) -> Position {
        let mut position = Position::empty();
        for &(name, kind, side) in pieces {
            position.set_piece_at(sq(name), Piece::new(kind, side));
        }
        position
    }

    #[test]
    fn starting_position_is_normal() {
        let position = Position::initial();
        assert_eq!(status(&position, Side::White), GameStatus::Normal);
        assert_eq!(status(&position, Side::Black), GameStatus::Normal);
        assert!(!GameStatus::Normal.is_terminal());
    }

    #[test]
    fn back_rank_mate() {
        let position = with(&[
            ("g1", PieceKind::King, Side::White), ("f2", PieceKind::Pawn, Side::White),
            ("g2", PieceKind::Pawn, Side::White), ("h2", PieceKind::Pawn, Side::White),
            ("e1", PieceKind::Rook, Side::Black), ("a8", PieceKind::King, Side::Black),
        ]);
        assert_eq!(status(&position, Side::White), GameStatus::Checkmate);
        assert!(GameStatus::Checkmate.is_terminal());
    }

    #[test]
    fn check_with_an_escape_is_not_mate() {
        let position = with(&[
            ("g1", PieceKind::King, Side::White), ("f2", PieceKind::Pawn, Side::White),
            ("g2", PieceKind::Pawn, Side::White),
            ("e1", PieceKind::Rook, Side::Black), ("a8", PieceKind::King, Side::Black),
        ]);
        assert_eq!(status(&position, Side::White), GameStatus::Check);
    }

    #[test]
    fn blocking_piece_prevents_mate() {
        let position = with(&[
            ("g1", PieceKind::King, Side::White), ("f2", PieceKind::Pawn, Side::White),
            ("g2", PieceKind::Pawn, Side::White), ("h2", PieceKind::Pawn, Side::White),
            ("c2", PieceKind::Bishop, Side::White),
            ("e1", PieceKind::Rook, Side::Black), ("a8", PieceKind::King, Side::Black),
        ]);
        // Bc2-d1 blocks the rook.
        assert_eq!(status(&position, Side::White), GameStatus::Check);
    }

    #[test]
    fn cornered_king_without_moves_is_stalemate() {
        let position = with(&[
            ("a8", PieceKind::King, Side::Black),
            ("b6", PieceKind::Queen, Side::White), ("h1", PieceKind::King, Side::White),
        ]);
        assert_eq!(status(&position, Side::Black), GameStatus::Stalemate);
        assert!(GameStatus::Stalemate.is_terminal());
    }

    #[test]
    fn stalemate_with_blocked_pawn() {
        let position = with(&[
            ("h8", PieceKind::King, Side::Black), ("h7", PieceKind::Pawn, Side::Black),
            ("f7", PieceKind::Queen, Side::White), ("h6", PieceKind::King, Side::White),
        ]);
        // The h7 pawn is blocked by the white king.
        assert_eq!(status(&position, Side::Black), GameStatus::Stalemate);
    }
}
