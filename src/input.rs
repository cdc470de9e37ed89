// src/input.rs
//! Text-interface parsing. Turns a typed line into a move request or a
//! command; nothing here knows the chess rules.
use crate::error::CommandError;
use crate::rules::MoveRequest;
use crate::types::{PieceKind, Square};
use crate::DEFAULT_STATS_FILENAME;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "e2e4", "E2 E4", "e2-e4", "e7e8q", "e7 e8=Q"
    static ref MOVE_PATTERN: Regex =
        Regex::new(r"(?i)^([a-h])([1-8])\s*[-\s]?\s*([a-h])([1-8])\s*=?\s*([qrbn])?$").expect("valid move pattern");
    static ref CASTLE_PATTERN: Regex =
        Regex::new(r"(?i)^([o0])-([o0])(-[o0])?$").expect("valid castle pattern");
}

#[derive(Debug, PartialEq, Eq)]
pub enum UserInput {
    Move(MoveRequest),
    CastleKingside,
    CastleQueenside,
    Command(Command),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Moves(Option<Square>), // All legal moves, or those of one piece
    History,
    Resign,
    OfferDraw, AcceptDraw, DeclineDraw,
    SaveStats(String),
    Help,
    Quit,
}

/// Parses user input string into a UserInput variant or returns a CommandError.
pub fn parse_user_input(input: &str) -> Result<UserInput, CommandError> {
    let trimmed_input = input.trim();

    if let Some(caps) = CASTLE_PATTERN.captures(trimmed_input) {
        return Ok(if caps.get(3).is_some() { UserInput::CastleQueenside } else { UserInput::CastleKingside });
    }

    let mut parts = trimmed_input.splitn(2, char::is_whitespace);
    let command_word = parts.next().unwrap_or("").to_lowercase();
    let argument = parts.next().unwrap_or("").trim();

    match command_word.as_str() {
        "offer" if argument.eq_ignore_ascii_case("draw") => return Ok(UserInput::Command(Command::OfferDraw)),
        "accept" if argument.eq_ignore_ascii_case("draw") => return Ok(UserInput::Command(Command::AcceptDraw)),
        "decline" if argument.eq_ignore_ascii_case("draw") => return Ok(UserInput::Command(Command::DeclineDraw)),
        "resign" => return Ok(UserInput::Command(Command::Resign)),
        "history" => return Ok(UserInput::Command(Command::History)),
        "help" | "?" => return Ok(UserInput::Command(Command::Help)),
        "quit" | "exit" => return Ok(UserInput::Command(Command::Quit)),
        "moves" => {
            if argument.is_empty() {
                return Ok(UserInput::Command(Command::Moves(None)));
            }
            let square = Square::from_algebraic(argument)
                .ok_or_else(|| CommandError::InvalidArgument(argument.to_string()))?;
            return Ok(UserInput::Command(Command::Moves(Some(square))));
        }
        "savestats" => {
            let filename = if argument.is_empty() { DEFAULT_STATS_FILENAME } else { argument }.to_string();
            return Ok(UserInput::Command(Command::SaveStats(filename)));
        }
        "offer" | "accept" | "decline" => return Err(CommandError::InvalidArgument(trimmed_input.to_string())),
        _ => {} // Not a command word, try parsing as a move
    }

    if let Ok(request) = parse_move(trimmed_input) {
        return Ok(UserInput::Move(request));
    }
    Err(CommandError::UnknownCommand(trimmed_input.to_string()))
}

/// Parses coordinate notation ("e2e4", "E2 E4", "e7e8q") into a MoveRequest.
/// Only the format is checked, never legality.
pub fn parse_move(input: &str) -> Result<MoveRequest, CommandError> {
    let caps = MOVE_PATTERN.captures(input.trim())
        .ok_or_else(|| CommandError::InvalidArgument(input.trim().to_string()))?;

    // The pattern guarantees a-h and 1-8 in each group.
    let coord = |i: usize| caps[i].to_ascii_lowercase().as_bytes()[0];
    let from_file = (coord(1) - b'a') as i8;
    let from_rank = (coord(2) - b'1') as i8;
    let to_file = (coord(3) - b'a') as i8;
    let to_rank = (coord(4) - b'1') as i8;

    let request = MoveRequest::from_coords(from_rank, from_file, to_rank, to_file);
    Ok(match caps.get(5).and_then(|m| m.as_str().chars().next()).and_then(PieceKind::from_char) {
        Some(kind) => request.with_promotion(kind),
        None => request,
    })
}

/// Reads the answer to the promotion prompt: a single letter (q, r, b, n) or
/// the full piece name.
pub fn parse_promotion_choice(input: &str) -> Option<PieceKind> {
    match input.trim().to_ascii_lowercase().as_str() {
        "q" | "queen" => Some(PieceKind::Queen),
        "r" | "rook" => Some(PieceKind::Rook),
        "b" | "bishop" => Some(PieceKind::Bishop),
        "n" | "knight" => Some(PieceKind::Knight),
        _ => None,
    }
}
