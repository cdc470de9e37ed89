// src/lib.rs
//! Chess rules engine: board state, move legality, check detection and
//! checkmate/stalemate detection, plus the session state the terminal
//! interface in `main.rs` drives.
pub mod types;
pub mod position;
pub mod attacks;
pub mod check;
pub mod error;
pub mod rules;
pub mod status;
pub mod game;
pub mod input;

// --- Constants ---
pub const DEFAULT_STATS_FILENAME: &str = "chess_stats.json";

pub use check::is_in_check;
pub use error::{CommandError, MoveError, SaveLoadError};
pub use game::{Game, GameResult};
pub use position::{Occupant, Position};
pub use rules::{apply_move, legal_moves, MoveRequest};
pub use status::{status, GameStatus};
pub use types::{Piece, PieceKind, Side, Square};
