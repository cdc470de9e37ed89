// src/main.rs
use chess_rules::input::{parse_promotion_choice, parse_user_input, Command, UserInput};
use chess_rules::rules::{legal_destinations, legal_moves};
use chess_rules::{
    CommandError, Game, GameStatus, MoveError, MoveRequest, PieceKind, Square, DEFAULT_STATS_FILENAME,
};
use std::error::Error;
use std::io::{self, BufRead, Write};

/// What the loop does after one line of input has been handled.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

// --- Main Game Loop ---

fn main() -> Result<(), Box<dyn Error>> {
    let mut game_state: Option<Game> = Some(Game::new());

    println!("==============================");
    println!("|        Rust Chess          |");
    println!("==============================");
    print_help();

    'game_loop: while let Some(game) = &mut game_state {

        // 1. Game end (checkmate, stalemate, resignation, agreement)
        if let Some(result) = game.check_game_end() {
            println!("------------------------------------------");
            println!("{}", game);
            println!("\n=== GAME OVER: {}. ===", result);
            println!("Saving final game stats to '{}'...", DEFAULT_STATS_FILENAME);
            match game.save_stats_to_file(DEFAULT_STATS_FILENAME) {
                Ok(()) => println!("Stats saved successfully."),
                Err(e) => eprintln!("Error: Failed to save final stats: {}", e),
            }
            break 'game_loop;
        }

        // 2. Print state and prompt
        println!("------------------------------------------");
        println!("{}", game);
        if game.status() == GameStatus::Check {
            println!("{} is in check!", game.side_to_move());
        }

        print!("\n{}'s turn. Enter move (e.g. e2e4, O-O) or command: ", game.side_to_move());
        io::stdout().flush()?;

        // 3. Read input
        let mut input_line = String::new();
        match io::stdin().read_line(&mut input_line) {
            Ok(0) => {
                println!("\nEnd of input detected. Quitting game.");
                if let Err(e) = game.save_stats_to_file(DEFAULT_STATS_FILENAME) {
                    eprintln!("Warning: Failed to save stats before quitting on EOF: {}", e);
                }
                game_state = None;
                continue 'game_loop;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}. Try again or use 'quit'/'exit'.", e);
                continue 'game_loop;
            }
        }

        let input_trimmed = input_line.trim();
        if input_trimmed.is_empty() { continue 'game_loop; }

        // 4. Parse, complete a bare promotion, then act
        let mut input = match parse_user_input(input_trimmed) {
            Ok(input) => input,
            Err(e) => {
                println!("Input Error: {}", e);
                continue 'game_loop;
            }
        };
        if let UserInput::Move(request) = &mut input {
            if needs_promotion_prompt(game, request) {
                match prompt_promotion(&mut io::stdin().lock()) {
                    Ok(Some(kind)) => *request = request.with_promotion(kind),
                    Ok(None) => {
                        println!("Promotion choice required but not provided. Move cancelled.");
                        continue 'game_loop;
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        continue 'game_loop;
                    }
                }
            }
        }

        match handle_input(game, input) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => {
                println!("Exiting game.");
                game_state = None;
            }
            Err(e) => println!("Error: {}", e),
        }
    }

    println!("\nGame session finished.");
    Ok(())
}

/// Carries out one parsed line against the session.
fn handle_input(game: &mut Game, input: UserInput) -> Result<Flow, CommandError> {
    match input {
        UserInput::Move(request) => {
            game.make_move(&request)?;
        }
        UserInput::CastleKingside => castle(game, true)?,
        UserInput::CastleQueenside => castle(game, false)?,
        UserInput::Command(command) => match command {
            Command::Moves(square) => print_moves(game, square),
            Command::OfferDraw => {
                game.offer_draw()?;
                println!("Draw offer made. Your opponent may accept or decline after your move.");
            }
            Command::AcceptDraw => {
                game.accept_draw()?;
            }
            Command::DeclineDraw => {
                game.decline_draw()?;
                println!("Draw offer declined. It's still your turn.");
            }
            Command::Resign => {
                game.resign();
            }
            Command::History => print_history(game),
            Command::Help => print_help(),
            Command::Quit => {
                println!("Quit command received.");
                match game.save_stats_to_file(DEFAULT_STATS_FILENAME) {
                    Ok(()) => println!("Stats saved to {}.", DEFAULT_STATS_FILENAME),
                    Err(e) => eprintln!("Warning: Failed to save stats before quitting: {}", e),
                }
                return Ok(Flow::Quit);
            }
            Command::SaveStats(filename) => {
                game.save_stats_to_file(&filename)?;
                println!("Game stats saved to '{}'.", filename);
            }
        },
    }
    Ok(Flow::Continue)
}

fn castle(game: &mut Game, kingside: bool) -> Result<(), CommandError> {
    let request = game.castle_request(kingside).ok_or(MoveError::InvalidCastle)?;
    game.make_move(&request)?;
    Ok(())
}

/// A pawn of the side to move heading for the last rank with no piece chosen,
/// on a move that would otherwise be legal.
fn needs_promotion_prompt(game: &Game, request: &MoveRequest) -> bool {
    if request.promotion.is_some() {
        return false;
    }
    let (from, to) = match (request.source(), request.destination()) {
        (Some(from), Some(to)) => (from, to),
        _ => return false,
    };
    let side = game.side_to_move();
    let is_own_pawn = game.position().piece_at(from)
        .map_or(false, |p| p.kind == PieceKind::Pawn && p.side == side);
    is_own_pawn
        && to.rank() == side.promotion_rank()
        && legal_destinations(game.position(), from, side).contains(&to)
}

/// Asks until a valid choice is typed. `None` on end of input.
fn prompt_promotion<R: BufRead>(reader: &mut R) -> Result<Option<PieceKind>, CommandError> {
    loop {
        print!("Promote pawn to? (q=Queen, r=Rook, b=Bishop, n=Knight): ");
        io::stdout().flush()?;
        let mut promo_input = String::new();
        if reader.read_line(&mut promo_input)? == 0 {
            println!("\nEnd of input during promotion.");
            return Ok(None);
        }
        match parse_promotion_choice(&promo_input) {
            Some(kind) => return Ok(Some(kind)),
            None => println!("Invalid choice. Please enter q, r, b, or n."),
        }
    }
}

fn describe_destinations(destinations: &[Square]) -> String {
    destinations.iter().map(|sq| sq.to_string()).collect::<Vec<_>>().join(" ")
}

fn print_moves(game: &Game, square: Option<Square>) {
    let side = game.side_to_move();
    match square {
        Some(from) => {
            let destinations = legal_destinations(game.position(), from, side);
            if destinations.is_empty() {
                println!("No legal moves from {}.", from);
            } else {
                println!("{}: {}", from, describe_destinations(&destinations));
            }
        }
        None => {
            let moves = legal_moves(game.position(), side);
            let listed: Vec<String> = moves.iter().map(|m| m.to_notation()).collect();
            println!("{} legal moves: {}", moves.len(), listed.join(" "));
        }
    }
}

fn print_history(game: &Game) {
    let mut any = false;
    for (i, record) in game.history().enumerate() {
        any = true;
        let mark = if record.is_checkmate { "#" } else if record.is_check { "+" } else { "" };
        let capture = record.captured.map(|p| format!(" (x{})", p)).unwrap_or_default();
        println!("{:>3}. {:<5} {}{}{}", i + 1, record.player.to_string(), record.notation, mark, capture);
    }
    if !any {
        println!("No moves played yet.");
    }
}

/// Prints available commands.
fn print_help() {
    println!("\nAvailable Commands:");
    println!("  <move>           Enter move in coordinate notation (e.g., e2e4, e2 e4, a7a8q)");
    println!("                   Or use castling notation: O-O (kingside), O-O-O (queenside).");
    println!("                   Promotion (q, r, b, n) is optional; will prompt if needed.");
    println!("                   Making a move declines any open draw offer from the opponent.");
    println!("  moves [square]   List legal moves (all, or for the piece on a square).");
    println!("  history          Show the move history.");
    println!("  offer draw       Offer a draw; your opponent answers on their turn.");
    println!("  accept draw      Accept the opponent's draw offer (ends game).");
    println!("  decline draw     Decline the opponent's draw offer (your turn continues).");
    println!("  resign           Forfeit the game (ends game).");
    println!("  savestats [file] Save game statistics (default: {}).", DEFAULT_STATS_FILENAME);
    println!("  help             Show this help message.");
    println!("  quit / exit      Exit the game (attempts to save stats).");
    println!();
}
