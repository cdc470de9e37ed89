// src/error.rs
use std::error::Error;
use std::fmt;
use std::io;

// --- Custom Error Types ---

/// Why a move request was refused. Every variant is recoverable: the
/// position the request was made against is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    OutOfBounds,          // Destination off the 8x8 grid
    NoOwnedPieceAtSource, // Source empty, off-board or owned by the opponent
    FriendlyFireCapture,  // Destination holds one of the mover's own pieces
    IllegalShapeForPiece, // Geometry does not fit the piece, or the ray is blocked
    MovesIntoCheck,       // Would leave the mover's king attacked
    InvalidCastle,        // King/rook moved, path blocked, or path attacked
    InvalidPromotion,     // Promotion to king/pawn, or a promotion on a non-promoting move
    GameOver,             // The game has already ended
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::OutOfBounds => write!(f, "Destination square is off the board."),
            MoveError::NoOwnedPieceAtSource => write!(f, "You have no piece on the source square."),
            MoveError::FriendlyFireCapture => write!(f, "You cannot capture your own piece."),
            MoveError::IllegalShapeForPiece => write!(f, "That piece cannot move that way (or its path is blocked)."),
            MoveError::MovesIntoCheck => write!(f, "Illegal move: it leaves your king in check."),
            MoveError::InvalidCastle => write!(f, "Castling is not allowed here (king or rook moved, path blocked or attacked)."),
            MoveError::InvalidPromotion => write!(f, "Invalid promotion: choose q, r, b or n, and only when a pawn reaches the last rank."),
            MoveError::GameOver => write!(f, "The game is already over."),
        }
    }
}
impl Error for MoveError {}

#[derive(Debug)]
pub enum CommandError {
    UnknownCommand(String),
    InvalidArgument(String),
    SaveLoadError(SaveLoadError),
    Move(MoveError),
    DrawAlreadyOffered,
    NoDrawToAccept,
    NoDrawToDecline,
    OpponentDrawOfferPending, // Can't offer if opponent already did
    IoError(io::Error),
}
impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand(cmd) => write!(f, "Unknown command: '{}'. Type 'help' for commands.", cmd),
            CommandError::InvalidArgument(arg) => write!(f, "Invalid argument: '{}'", arg),
            CommandError::SaveLoadError(e) => write!(f, "Stats Save Error: {}", e),
            CommandError::Move(e) => write!(f, "{}", e),
            CommandError::DrawAlreadyOffered => write!(f, "You already have a draw offer on the table."),
            CommandError::NoDrawToAccept => write!(f, "No draw offer from your opponent to accept."),
            CommandError::NoDrawToDecline => write!(f, "No draw offer from your opponent to decline."),
            CommandError::OpponentDrawOfferPending => write!(f, "Your opponent has already offered a draw; accept or decline it."),
            CommandError::IoError(e) => write!(f, "Input/Output error: {}", e),
        }
    }
}
impl Error for CommandError {}

// Automatic conversions for convenience
impl From<SaveLoadError> for CommandError {
    fn from(e: SaveLoadError) -> Self { CommandError::SaveLoadError(e) }
}
impl From<io::Error> for CommandError {
    fn from(e: io::Error) -> Self { CommandError::IoError(e) }
}
impl From<MoveError> for CommandError {
    fn from(e: MoveError) -> Self { CommandError::Move(e) }
}

#[derive(Debug)]
pub enum SaveLoadError {
    Serialization(serde_json::Error),
    Io(String, io::Error),
}
impl fmt::Display for SaveLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveLoadError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SaveLoadError::Io(file, e) => write!(f, "I/O error with file '{}': {}", file, e),
        }
    }
}
impl Error for SaveLoadError {}
