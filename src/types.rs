// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Sides ---
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side { White, Black }

impl Side {
    pub fn opponent(&self) -> Side {
        match self { Side::White => Side::Black, Side::Black => Side::White }
    }

    /// Rank delta of a single pawn step for this side.
    pub fn pawn_direction(&self) -> i8 {
        match self { Side::White => 1, Side::Black => -1 }
    }

    pub fn back_rank(&self) -> u8 {
        match self { Side::White => 0, Side::Black => 7 }
    }

    /// Rank the side's pawns start on (the only rank a double step is allowed from).
    pub fn pawn_start_rank(&self) -> u8 {
        match self { Side::White => 1, Side::Black => 6 }
    }

    pub fn promotion_rank(&self) -> u8 {
        self.opponent().back_rank()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

// --- Piece kinds ---
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PieceKind { Pawn, Knight, Bishop, Rook, Queen, King }

impl PieceKind {
    /// Kinds a pawn may promote to, in the order the prompt offers them.
    pub const PROMOTION_CHOICES: [PieceKind; 4] = [PieceKind::Queen, PieceKind::Rook, PieceKind::Bishop, PieceKind::Knight];

    /// Material value, only used to order captured pieces for display.
    pub fn value(&self) -> u32 {
        match self {
            PieceKind::Pawn => 1, PieceKind::Knight => 3, PieceKind::Bishop => 3,
            PieceKind::Rook => 5, PieceKind::Queen => 9, PieceKind::King => 0,
        }
    }

    pub fn is_promotion_choice(&self) -> bool {
        Self::PROMOTION_CHOICES.contains(self)
    }

    /// Lowercase letter used on the board and in move notation.
    pub fn symbol(&self) -> char {
        match self {
            PieceKind::Pawn => 'p', PieceKind::Knight => 'n', PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r', PieceKind::Queen => 'q', PieceKind::King => 'k',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn), 'n' => Some(PieceKind::Knight), 'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook), 'q' => Some(PieceKind::Queen), 'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

// --- Pieces ---
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
    /// Set once the piece has moved; castling looks at it for kings and rooks.
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side) -> Self { Piece { kind, side, has_moved: false } }

    /// The same piece after it has made a move, optionally as a different kind (promotion).
    pub fn moved_as(self, kind: PieceKind) -> Self {
        Piece { kind, side: self.side, has_moved: true }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.kind.symbol();
        let symbol = match self.side {
            Side::White => symbol.to_ascii_uppercase(),
            Side::Black => symbol,
        };
        write!(f, "{}", symbol)
    }
}

// --- Squares ---
/// A board square. Rank 0 is White's back rank, file 0 is the a-file.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// Returns `None` for coordinates off the 8x8 grid.
    pub fn new(rank: i8, file: i8) -> Option<Square> {
        if (0..8).contains(&rank) && (0..8).contains(&file) {
            Some(Square { rank: rank as u8, file: file as u8 })
        } else {
            None
        }
    }

    pub fn rank(&self) -> u8 { self.rank }
    pub fn file(&self) -> u8 { self.file }

    /// Index 0-63, rank-major (a1 = 0, h8 = 63).
    pub fn index(&self) -> usize { (self.rank * 8 + self.file) as usize }

    pub fn from_index(index: usize) -> Option<Square> {
        if index >= 64 { return None; }
        Some(Square { rank: (index / 8) as u8, file: (index % 8) as u8 })
    }

    /// Single-bit mask for the precomputed attack tables.
    pub fn bit(&self) -> u64 { 1u64 << self.index() }

    pub fn offset(&self, d_rank: i8, d_file: i8) -> Option<Square> {
        Square::new(self.rank as i8 + d_rank, self.file as i8 + d_file)
    }

    /// All 64 squares, rank-major from a1.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).filter_map(Square::from_index)
    }

    /// Parses algebraic notation such as "e4" (case-insensitive).
    pub fn from_algebraic(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        let file_char = chars.next()?.to_ascii_lowercase();
        let rank_char = chars.next()?;
        if chars.next().is_some() { return None; }
        let file = match file_char { 'a'..='h' => file_char as u8 - b'a', _ => return None };
        let rank = match rank_char { '1'..='8' => rank_char as u8 - b'1', _ => return None };
        Some(Square { rank, file })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, (b'1' + self.rank) as char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_rejects_off_board_coordinates() {
        assert!(Square::new(-1, 0).is_none());
        assert!(Square::new(0, 8).is_none());
        assert!(Square::new(8, 8).is_none());
        let sq = Square::new(3, 4).unwrap();
        assert_eq!((sq.rank(), sq.file()), (3, 4));
    }

    #[test]
    fn algebraic_names_match_coordinates() {
        assert_eq!(Square::from_algebraic("a1"), Square::new(0, 0));
        assert_eq!(Square::from_algebraic("E4"), Square::new(3, 4));
        assert_eq!(Square::from_algebraic("h8").unwrap().to_string(), "h8");
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("a10"), None);
    }

    #[test]
    fn all_squares_are_distinct_and_indexed_in_order() {
        let squares: Vec<Square> = Square::all().collect();
        assert_eq!(squares.len(), 64);
        for (i, sq) in squares.iter().enumerate() {
            assert_eq!(sq.index(), i);
        }
    }

    #[test]
    fn side_helpers_are_mirrored() {
        assert_eq!(Side::White.opponent(), Side::Black);
        assert_eq!(Side::White.promotion_rank(), 7);
        assert_eq!(Side::Black.promotion_rank(), 0);
        assert_eq!(Side::White.pawn_direction(), -Side::Black.pawn_direction());
    }

    #[test]
    fn piece_display_uses_case_for_side() {
        assert_eq!(Piece::new(PieceKind::Knight, Side::White).to_string(), "N");
        assert_eq!(Piece::new(PieceKind::Queen, Side::Black).to_string(), "q");
        assert!(!PieceKind::King.is_promotion_choice());
        assert!(PieceKind::Knight.is_promotion_choice());
    }
}
