// src/game.rs
//! One game session: the current position, whose turn it is, and everything
//! the text interface shows or saves about the game so far.
use crate::error::{CommandError, MoveError, SaveLoadError};
use crate::position::{Occupant, Position};
use crate::rules::{apply_move, MoveRequest};
use crate::status::{status, GameStatus};
use crate::types::{Piece, PieceKind, Side};
use serde::Serialize;
use std::fmt;
use std::fs;

// --- Event History and Stats Saving ---

#[derive(Debug, Clone, Serialize)]
pub struct MoveRecord {
    pub notation: String, // e2e4, e7e8q, O-O, O-O-O
    pub player: Side,
    pub captured: Option<Piece>,
    pub is_check: bool,
    pub is_checkmate: bool,
}

impl MoveRecord {
    fn annotation(&self) -> &'static str {
        if self.is_checkmate { "#" } else if self.is_check { "+" } else { "" }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum WinReason { Checkmate, Resignation }

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason { Stalemate, Agreement }

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GameResult {
    Win(Side, WinReason),
    Draw(DrawReason),
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Win(side, reason) => write!(f, "{} wins by {:?}", side, reason),
            GameResult::Draw(reason) => write!(f, "Draw by {:?}", reason),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum GameEvent {
    Move(MoveRecord),
    OfferDraw(Side),
    AcceptDraw(Side),
    DeclineDraw(Side),
    Resign(Side),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum GameEventSummary {
    OfferDraw { player: Side },
    AcceptDraw { player: Side },
    DeclineDraw { player: Side },
    Resign { player: Side },
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum GameResultReason {
    Checkmate { winner: Side, loser: Side },
    Resignation { winner: Side, loser: Side },
    Stalemate,
    Agreement,
}

impl From<GameResult> for GameResultReason {
    fn from(result: GameResult) -> Self {
        match result {
            GameResult::Win(winner, WinReason::Checkmate) => GameResultReason::Checkmate { winner, loser: winner.opponent() },
            GameResult::Win(winner, WinReason::Resignation) => GameResultReason::Resignation { winner, loser: winner.opponent() },
            GameResult::Draw(DrawReason::Stalemate) => GameResultReason::Stalemate,
            GameResult::Draw(DrawReason::Agreement) => GameResultReason::Agreement,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameStats {
    pub result: Option<GameResultReason>,
    pub white_moves: Vec<MoveStat>,
    pub black_moves: Vec<MoveStat>,
    pub game_events: Vec<GameEventSummary>,
}

#[derive(Debug, Serialize)]
pub struct MoveStat {
    pub move_notation: String,
    pub captured: Option<Piece>,
    pub annotation: String, // +, #, or empty
}

// --- Game State ---

#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    side_to_move: Side,
    event_history: Vec<GameEvent>,
    captured_white: Vec<Piece>, // White pieces captured by Black
    captured_black: Vec<Piece>, // Black pieces captured by White
    /// Open draw offer and the side that made it. Cleared when the other side moves.
    draw_offer: Option<Side>,
    result: Option<GameResult>,
}

impl Default for Game {
    fn default() -> Self { Game::new() }
}

impl Game {
    /// Creates a new game from the standard starting position, White to move.
    pub fn new() -> Self {
        Game::from_position(Position::initial(), Side::White)
    }

    /// Starts a session from an arbitrary position. A side without a king is
    /// reported once here; the rules treat that side as permanently in check.
    pub fn from_position(position: Position, side_to_move: Side) -> Self {
        for side in [Side::White, Side::Black] {
            if position.find_king(side).is_none() {
                eprintln!("CRITICAL ERROR: {} king not found on the board.", side);
            }
        }
        Game {
            position,
            side_to_move,
            event_history: Vec::new(),
            captured_white: Vec::new(),
            captured_black: Vec::new(),
            draw_offer: None,
            result: None,
        }
    }

    pub fn position(&self) -> &Position { &self.position }
    pub fn side_to_move(&self) -> Side { self.side_to_move }
    pub fn result(&self) -> Option<GameResult> { self.result }
    pub fn draw_offer(&self) -> Option<Side> { self.draw_offer }

    /// Check/checkmate/stalemate for the side to move.
    pub fn status(&self) -> GameStatus {
        status(&self.position, self.side_to_move)
    }

    pub fn history(&self) -> impl Iterator<Item = &MoveRecord> {
        self.event_history.iter().filter_map(|event| match event {
            GameEvent::Move(record) => Some(record),
            _ => None,
        })
    }

    /// Pieces of `side` that have been captured so far.
    pub fn captured(&self, side: Side) -> &[Piece] {
        match side {
            Side::White => &self.captured_white,
            Side::Black => &self.captured_black,
        }
    }

    // --- Public Move Execution Interface ---

    /// Plays `request` for the side to move. On success the turn passes and the
    /// status of the new side to move is returned; on failure nothing changes.
    pub fn make_move(&mut self, request: &MoveRequest) -> Result<GameStatus, MoveError> {
        if self.result.is_some() {
            return Err(MoveError::GameOver);
        }
        let player = self.side_to_move;
        let next = apply_move(&self.position, request, player)?;

        let notation = describe_move(&self.position, &next, request);
        let captured = captured_piece(&self.position, &next, player);
        if let Some(piece) = captured {
            match piece.side {
                Side::White => self.captured_white.push(piece),
                Side::Black => self.captured_black.push(piece),
            }
        }

        // Moving instead of answering declines the opponent's offer.
        if self.draw_offer == Some(player.opponent()) {
            self.draw_offer = None;
        }

        self.position = next;
        self.side_to_move = player.opponent();

        let reply_status = self.status();
        self.event_history.push(GameEvent::Move(MoveRecord {
            notation,
            player,
            captured,
            is_check: matches!(reply_status, GameStatus::Check | GameStatus::Checkmate),
            is_checkmate: reply_status == GameStatus::Checkmate,
        }));
        self.result = result_for(reply_status, self.side_to_move);
        Ok(reply_status)
    }

    /// The king's two-file move for the side to move. Castling legality is left
    /// to the move applier; `None` only if that side has no king.
    pub fn castle_request(&self, kingside: bool) -> Option<MoveRequest> {
        let king_sq = self.position.find_king(self.side_to_move)?;
        let (rank, file) = (king_sq.rank() as i8, king_sq.file() as i8);
        let to_file = if kingside { file + 2 } else { file - 2 };
        Some(MoveRequest::from_coords(rank, file, rank, to_file))
    }

    /// Checks whether the side to move is checkmated or stalemated and
    /// records the result. Returns the result if the game is over.
    pub fn check_game_end(&mut self) -> Option<GameResult> {
        if self.result.is_none() {
            self.result = result_for(self.status(), self.side_to_move);
        }
        self.result
    }

    // --- Action Handlers (Draw Offers, Resign) ---

    /// Offers a draw on behalf of the side to move. The opponent can accept or
    /// decline on their turn; it lapses if they move instead.
    pub fn offer_draw(&mut self) -> Result<(), CommandError> {
        let offering_player = self.side_to_move;
        if self.draw_offer == Some(offering_player.opponent()) {
            return Err(CommandError::OpponentDrawOfferPending);
        }
        if self.draw_offer == Some(offering_player) {
            return Err(CommandError::DrawAlreadyOffered);
        }
        self.draw_offer = Some(offering_player);
        self.event_history.push(GameEvent::OfferDraw(offering_player));
        Ok(())
    }

    /// Accepts the opponent's open draw offer. Ends the game.
    pub fn accept_draw(&mut self) -> Result<GameResult, CommandError> {
        let accepting_player = self.side_to_move;
        if self.draw_offer != Some(accepting_player.opponent()) {
            return Err(CommandError::NoDrawToAccept);
        }
        self.draw_offer = None;
        self.event_history.push(GameEvent::AcceptDraw(accepting_player));
        let result = GameResult::Draw(DrawReason::Agreement);
        self.result = Some(result);
        Ok(result)
    }

    /// Declines the opponent's open draw offer. The turn stays with the decliner.
    pub fn decline_draw(&mut self) -> Result<(), CommandError> {
        let declining_player = self.side_to_move;
        if self.draw_offer != Some(declining_player.opponent()) {
            return Err(CommandError::NoDrawToDecline);
        }
        self.draw_offer = None;
        self.event_history.push(GameEvent::DeclineDraw(declining_player));
        Ok(())
    }

    /// Resigns the game for the side to move. Ends the game.
    pub fn resign(&mut self) -> GameResult {
        if let Some(result) = self.result {
            return result;
        }
        let resigning_player = self.side_to_move;
        self.event_history.push(GameEvent::Resign(resigning_player));
        self.draw_offer = None;
        let result = GameResult::Win(resigning_player.opponent(), WinReason::Resignation);
        self.result = Some(result);
        result
    }

    // --- Stats Generation and Saving ---

    pub fn generate_stats(&self) -> GameStats {
        let mut white_moves = Vec::new();
        let mut black_moves = Vec::new();
        let mut game_events = Vec::new();

        for event in &self.event_history {
            match event {
                GameEvent::Move(record) => {
                    let move_stat = MoveStat {
                        move_notation: record.notation.clone(),
                        captured: record.captured,
                        annotation: record.annotation().to_string(),
                    };
                    match record.player {
                        Side::White => white_moves.push(move_stat),
                        Side::Black => black_moves.push(move_stat),
                    }
                }
                GameEvent::OfferDraw(player) => game_events.push(GameEventSummary::OfferDraw { player: *player }),
                GameEvent::AcceptDraw(player) => game_events.push(GameEventSummary::AcceptDraw { player: *player }),
                GameEvent::DeclineDraw(player) => game_events.push(GameEventSummary::DeclineDraw { player: *player }),
                GameEvent::Resign(player) => game_events.push(GameEventSummary::Resign { player: *player }),
            }
        }

        GameStats {
            result: self.result.map(GameResultReason::from),
            white_moves,
            black_moves,
            game_events,
        }
    }

    pub fn stats_json(&self) -> Result<String, SaveLoadError> {
        serde_json::to_string_pretty(&self.generate_stats()).map_err(SaveLoadError::Serialization)
    }

    /// Saves the generated game statistics to a JSON file.
    pub fn save_stats_to_file(&self, filename: &str) -> Result<(), SaveLoadError> {
        let json_data = self.stats_json()?;
        fs::write(filename, json_data)
            .map_err(|e| SaveLoadError::Io(filename.to_string(), e))?;
        Ok(())
    }
}

/// Maps the status of the side to move onto a finished-game result.
fn result_for(game_status: GameStatus, side_to_move: Side) -> Option<GameResult> {
    match game_status {
        GameStatus::Checkmate => Some(GameResult::Win(side_to_move.opponent(), WinReason::Checkmate)),
        GameStatus::Stalemate => Some(GameResult::Draw(DrawReason::Stalemate)),
        GameStatus::Normal | GameStatus::Check => None,
    }
}

/// The opponent piece that disappeared between `before` and `after`, if any.
/// Covers en passant, where the victim is not on the destination square.
fn captured_piece(before: &Position, after: &Position, mover: Side) -> Option<Piece> {
    let opponent = mover.opponent();
    before.pieces(opponent)
        .find(|(sq, _)| after.side_at(*sq) != Some(opponent))
        .map(|(_, piece)| piece)
}

/// History notation for an applied move: castling shorthand, otherwise
/// coordinates plus the promoted kind.
fn describe_move(before: &Position, after: &Position, request: &MoveRequest) -> String {
    let (from, to) = match (request.source(), request.destination()) {
        (Some(from), Some(to)) => (from, to),
        _ => return request.to_notation(),
    };
    let moved = match before.piece_at(from) {
        Some(piece) => piece,
        None => return request.to_notation(),
    };

    let file_shift = to.file() as i8 - from.file() as i8;
    if moved.kind == PieceKind::King && file_shift.abs() == 2 {
        return if file_shift > 0 { "O-O".to_string() } else { "O-O-O".to_string() };
    }
    match after.piece_at(to) {
        Some(arrived) if arrived.kind != moved.kind => format!("{}{}{}", from, to, arrived.kind.symbol()),
        _ => format!("{}{}", from, to),
    }
}

// Display trait for printing the board and game state
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // --- Captured Pieces ---
        for (label, pieces) in [("White", &self.captured_black), ("Black", &self.captured_white)] {
            write!(f, "Captured by {}: ", label)?;
            let mut sorted = pieces.clone();
            sorted.sort_by_key(|p| p.kind.value());
            for piece in sorted { write!(f, "{} ", piece)?; }
            writeln!(f)?;
        }
        writeln!(f, "---------------------")?;

        // --- Board ---
        let cells: Vec<Occupant> = self.position.squares().map(|(_, occupant)| occupant).collect();
        writeln!(f, "  +-----------------+")?;
        for rank_idx in (0..8).rev() {
            write!(f, "{} | ", rank_idx + 1)?;
            for file_idx in 0..8 {
                match cells[rank_idx * 8 + file_idx] {
                    Some(piece) => write!(f, "{} ", piece)?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "  +-----------------+")?;
        writeln!(f, "    a b c d e f g h")?;

        // --- Game State Info ---
        writeln!(f, "Turn: {}", self.side_to_move)?;
        match self.position.en_passant_target() {
            Some(target) => writeln!(f, "En Passant Target: {}", target)?,
            None => writeln!(f, "En Passant Target: -")?,
        }

        // --- Move History ---
        let records: Vec<&MoveRecord> = self.history().collect();
        if !records.is_empty() {
            writeln!(f, "Move History:")?;
            let mut move_num = 1;
            let mut pending_white: Option<&MoveRecord> = None;
            for record in records {
                match record.player {
                    Side::White => {
                        if let Some(wm) = pending_white.replace(record) {
                            writeln!(f, "{}. {}{}", move_num, wm.notation, wm.annotation())?;
                            move_num += 1;
                        }
                    }
                    Side::Black => {
                        match pending_white.take() {
                            Some(wm) => writeln!(f, "{}. {}{} {}{}", move_num, wm.notation, wm.annotation(), record.notation, record.annotation())?,
                            None => writeln!(f, "{}. ... {}{}", move_num, record.notation, record.annotation())?,
                        }
                        move_num += 1;
                    }
                }
            }
            if let Some(wm) = pending_white {
                writeln!(f, "{}. {}{}", move_num, wm.notation, wm.annotation())?;
            }
        }

        // --- Draw Offer Display ---
        if let Some(offering_side) = self.draw_offer {
            if offering_side == self.side_to_move.opponent() {
                writeln!(f, "--- {} has offered a draw! ('accept draw' / 'decline draw' / move) ---", offering_side)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    fn play(game: &mut Game, moves: &[&str]) {
        for text in moves {
            let request = crate::input::parse_move(text).unwrap();
            game.make_move(&request).unwrap_or_else(|e| panic!("{} rejected: {}", text, e));
        }
    }

    #[test]
    fn new_game_is_normal_with_white_to_move() {
        let mut game = Game::new();
        assert_eq!(game.side_to_move(), Side::White);
        assert_eq!(game.status(), GameStatus::Normal);
        assert_eq!(game.check_game_end(), None);
    }

    #[test]
    fn moves_alternate_sides_and_rejections_change_nothing() {
        let mut game = Game::new();
        play(&mut game, &["e2e4"]);
        assert_eq!(game.side_to_move(), Side::Black);

        let before = game.position().clone();
        let illegal = crate::input::parse_move("e4e5").unwrap(); // White piece, Black to move
        assert_eq!(game.make_move(&illegal), Err(MoveError::NoOwnedPieceAtSource));
        assert_eq!(game.position(), &before);
        assert_eq!(game.side_to_move(), Side::Black);
        assert_eq!(game.history().count(), 1);
    }

    #[test]
    fn fools_mate_ends_the_game() {
        let mut game = Game::new();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(game.result(), Some(GameResult::Win(Side::Black, WinReason::Checkmate)));
        assert_eq!(game.status(), GameStatus::Checkmate);
        let last = game.history().last().unwrap();
        assert!(last.is_checkmate);
        assert_eq!(last.annotation(), "#");

        let any = crate::input::parse_move("a2a3").unwrap();
        assert_eq!(game.make_move(&any), Err(MoveError::GameOver));
    }

    #[test]
    fn captures_are_tracked_including_en_passant() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "d7d5", "e4d5", "g8f6", "d5d6", "e7e5", "d6c7"]);
        assert_eq!(game.captured(Side::Black).len(), 2);
        assert!(game.captured(Side::White).is_empty());

        let mut game = Game::new();
        play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5", "e5d6"]);
        let captured = game.history().last().unwrap().captured;
        assert_eq!(captured.map(|p| (p.kind, p.side)), Some((PieceKind::Pawn, Side::Black)));
        assert!(game.position().is_empty(Square::from_algebraic("d5").unwrap()));
    }

    #[test]
    fn castling_request_and_notation() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]);
        let castle = game.castle_request(true).unwrap();
        assert_eq!(castle.to_notation(), "e1g1");
        game.make_move(&castle).unwrap();
        assert_eq!(game.history().last().unwrap().notation, "O-O");

        // Black's queen side is still blocked.
        let long = game.castle_request(false).unwrap();
        assert_eq!(game.make_move(&long), Err(MoveError::InvalidCastle));
    }

    #[test]
    fn promotion_shows_in_notation() {
        let mut position = Position::empty();
        let put = |p: &mut Position, name: &str, kind, side| {
            p.set_piece_at(Square::from_algebraic(name).unwrap(), Piece::new(kind, side));
        };
        put(&mut position, "e1", PieceKind::King, Side::White);
        put(&mut position, "h1", PieceKind::King, Side::Black);
        put(&mut position, "b7", PieceKind::Pawn, Side::White);
        let mut game = Game::from_position(position, Side::White);
        play(&mut game, &["b7b8"]);
        assert_eq!(game.history().last().unwrap().notation, "b7b8q");
    }

    #[test]
    fn draw_offer_flow() {
        let mut game = Game::new();
        game.offer_draw().unwrap();
        assert!(matches!(game.offer_draw(), Err(CommandError::DrawAlreadyOffered)));
        assert!(matches!(game.accept_draw(), Err(CommandError::NoDrawToAccept)));
        play(&mut game, &["e2e4"]);

        assert!(matches!(game.offer_draw(), Err(CommandError::OpponentDrawOfferPending)));
        game.decline_draw().unwrap();
        assert_eq!(game.draw_offer(), None);
        assert!(matches!(game.accept_draw(), Err(CommandError::NoDrawToAccept)));

        play(&mut game, &["e7e5"]);
        game.offer_draw().unwrap();
        play(&mut game, &["g1f3"]);
        assert_eq!(game.accept_draw().unwrap(), GameResult::Draw(DrawReason::Agreement));
        assert_eq!(game.result(), Some(GameResult::Draw(DrawReason::Agreement)));
    }

    #[test]
    fn moving_lapses_the_opponents_offer() {
        let mut game = Game::new();
        game.offer_draw().unwrap();
        play(&mut game, &["e2e4", "e7e5"]);
        assert_eq!(game.draw_offer(), None);
    }

    #[test]
    fn resignation_gives_the_win_to_the_opponent() {
        let mut game = Game::new();
        play(&mut game, &["e2e4"]);
        assert_eq!(game.resign(), GameResult::Win(Side::White, WinReason::Resignation));
        assert_eq!(game.resign(), GameResult::Win(Side::White, WinReason::Resignation));
    }

    #[test]
    fn stats_json_lists_moves_and_result() {
        let mut game = Game::new();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        let json: serde_json::Value = serde_json::from_str(&game.stats_json().unwrap()).unwrap();
        assert_eq!(json["white_moves"].as_array().unwrap().len(), 2);
        assert_eq!(json["black_moves"][1]["move_notation"], "d8h4");
        assert_eq!(json["black_moves"][1]["annotation"], "#");
        assert_eq!(json["result"]["Checkmate"]["winner"], "Black");
    }

    #[test]
    fn display_draws_the_board() {
        let mut game = Game::new();
        play(&mut game, &["e2e4"]);
        let text = game.to_string();
        assert!(text.contains("8 | r n b q k b n r |"));
        assert!(text.contains("4 | . . . . P . . . |"));
        assert!(text.contains("En Passant Target: e3"));
        assert!(text.contains("1. e2e4"));
        assert!(text.contains("Turn: Black"));
    }

    #[test]
    fn stalemated_start_is_detected() {
        let mut position = Position::empty();
        position.set_piece_at(Square::from_algebraic("a8").unwrap(), Piece::new(PieceKind::King, Side::Black));
        position.set_piece_at(Square::from_algebraic("b6").unwrap(), Piece::new(PieceKind::Queen, Side::White));
        position.set_piece_at(Square::from_algebraic("h1").unwrap(), Piece::new(PieceKind::King, Side::White));
        let mut game = Game::from_position(position, Side::Black);
        assert_eq!(game.check_game_end(), Some(GameResult::Draw(DrawReason::Stalemate)));
    }

    #[test]
    fn missing_king_side_has_no_safe_move() {
        let mut position = Position::empty();
        position.set_piece_at(Square::from_algebraic("e8").unwrap(), Piece::new(PieceKind::King, Side::Black));
        position.set_piece_at(Square::from_algebraic("a2").unwrap(), Piece::new(PieceKind::Pawn, Side::White));
        let mut game = Game::from_position(position, Side::White);
        assert_eq!(game.check_game_end(), Some(GameResult::Win(Side::Black, WinReason::Checkmate)));
    }
}
