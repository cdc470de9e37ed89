// src/position.rs
use crate::types::{Piece, PieceKind, Side, Square};
use serde::{Deserialize, Serialize};

/// Contents of one square; `None` is an empty square and carries no side.
pub type Occupant = Option<Piece>;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook, PieceKind::Knight, PieceKind::Bishop, PieceKind::Queen,
    PieceKind::King, PieceKind::Bishop, PieceKind::Knight, PieceKind::Rook,
];

/// A live en passant opportunity, valid for the very next move only.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EnPassant {
    /// Square the double-stepping pawn skipped over; the capturing pawn lands here.
    pub target: Square,
    /// Side allowed to capture onto `target`.
    pub capturer: Side,
}

// --- Board State ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    board: [[Occupant; 8]; 8], // board[rank][file]
    en_passant: Option<EnPassant>,
}

impl Default for Position {
    fn default() -> Self { Position::initial() }
}

impl Position {
    /// A board with no pieces and no en passant target.
    pub fn empty() -> Self {
        Position { board: [[None; 8]; 8], en_passant: None }
    }

    /// Creates the standard starting array.
    pub fn initial() -> Self {
        let mut position = Position::empty();
        for side in [Side::White, Side::Black] {
            for (file, kind) in BACK_RANK.iter().enumerate() {
                position.board[side.back_rank() as usize][file] = Some(Piece::new(*kind, side));
                position.board[side.pawn_start_rank() as usize][file] = Some(Piece::new(PieceKind::Pawn, side));
            }
        }
        position
    }

    #[inline(always)]
    pub fn piece_at(&self, sq: Square) -> Occupant {
        self.board[sq.rank() as usize][sq.file() as usize]
    }

    #[inline(always)]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Side owning the piece on `sq`, if any.
    #[inline(always)]
    pub fn side_at(&self, sq: Square) -> Option<Side> {
        self.piece_at(sq).map(|p| p.side)
    }

    /// Puts `piece` on `sq`, replacing whatever stood there.
    pub fn set_piece_at(&mut self, sq: Square, piece: Piece) {
        self.board[sq.rank() as usize][sq.file() as usize] = Some(piece);
    }

    /// Empties `sq`, returning the piece that was on it.
    pub fn clear_square(&mut self, sq: Square) -> Occupant {
        self.board[sq.rank() as usize][sq.file() as usize].take()
    }

    pub fn en_passant(&self) -> Option<EnPassant> {
        self.en_passant
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant.map(|ep| ep.target)
    }

    pub fn set_en_passant(&mut self, en_passant: Option<EnPassant>) {
        self.en_passant = en_passant;
    }

    /// Read-only walk over all 64 squares, rank-major from a1.
    pub fn squares(&self) -> impl Iterator<Item = (Square, Occupant)> + '_ {
        Square::all().map(move |sq| (sq, self.piece_at(sq)))
    }

    /// Occupied squares belonging to `side`.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares()
            .filter_map(move |(sq, occupant)| occupant.filter(|p| p.side == side).map(|p| (sq, p)))
    }

    /// Finds the king's square for a given side. Returns None if the king is missing.
    pub fn find_king(&self, side: Side) -> Option<Square> {
        self.pieces(side).find(|(_, p)| p.kind == PieceKind::King).map(|(sq, _)| sq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn initial_position_has_standard_array() {
        let position = Position::initial();
        assert_eq!(position.piece_at(sq("e1")), Some(Piece::new(PieceKind::King, Side::White)));
        assert_eq!(position.piece_at(sq("d8")), Some(Piece::new(PieceKind::Queen, Side::Black)));
        assert_eq!(position.piece_at(sq("a2")).map(|p| p.kind), Some(PieceKind::Pawn));
        assert_eq!(position.piece_at(sq("h7")).map(|p| p.side), Some(Side::Black));
        assert!(position.is_empty(sq("e4")));
        assert_eq!(position.pieces(Side::White).count(), 16);
        assert_eq!(position.pieces(Side::Black).count(), 16);
        assert_eq!(position.squares().filter(|(_, o)| o.is_none()).count(), 32);
        assert!(position.en_passant().is_none());
        assert!(position.pieces(Side::White).all(|(_, p)| !p.has_moved));
    }

    #[test]
    fn kings_are_found_on_their_home_squares() {
        let position = Position::initial();
        assert_eq!(position.find_king(Side::White), Some(sq("e1")));
        assert_eq!(position.find_king(Side::Black), Some(sq("e8")));
        assert_eq!(Position::empty().find_king(Side::White), None);
    }

    #[test]
    fn clear_square_returns_the_removed_piece() {
        let mut position = Position::initial();
        let removed = position.clear_square(sq("g1"));
        assert_eq!(removed.map(|p| p.kind), Some(PieceKind::Knight));
        assert!(position.is_empty(sq("g1")));
        assert_eq!(position.clear_square(sq("g1")), None);
    }
}
