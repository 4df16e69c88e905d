//! Game sessions: player setup, the turn loop and end-of-game reporting.
//!
//! A session owns its RNG, its two seats and the score record it was given.
//! Computer seats are seeded from that RNG when the session starts, and every
//! game draws fresh pieces and a fresh first mover from it, so a seeded
//! session replays exactly.

use anyhow::{anyhow, Result};
use games_tictactoe::{Board, Coord, Piece, Variant};
use mcts::{MctsConfig, MctsSearch, MoveSource, PlayerError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::{debug, info};

use crate::stats::ScoreBoard;

/// Who sits at the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSetting {
    HumanVsHuman,
    HumanVsComputer,
    ComputerVsComputer,
}

impl PlayerSetting {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerSetting::HumanVsHuman => "human-vs-human",
            PlayerSetting::HumanVsComputer => "human-vs-computer",
            PlayerSetting::ComputerVsComputer => "computer-vs-computer",
        }
    }

    pub fn needs_first_name(self) -> bool {
        self != PlayerSetting::ComputerVsComputer
    }

    pub fn needs_second_name(self) -> bool {
        self == PlayerSetting::HumanVsHuman
    }
}

impl fmt::Display for PlayerSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerSetting {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human-vs-human" | "hvh" => Ok(PlayerSetting::HumanVsHuman),
            "human-vs-computer" | "hvc" => Ok(PlayerSetting::HumanVsComputer),
            "computer-vs-computer" | "cvc" => Ok(PlayerSetting::ComputerVsComputer),
            other => Err(anyhow!(
                "unknown player setting '{}', expected human-vs-human, human-vs-computer or computer-vs-computer",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub variant: Variant,
    pub players: PlayerSetting,
    pub first_name: String,
    pub second_name: String,
    /// Search settings shared by every computer player.
    pub mcts: MctsConfig,
    pub show_board: bool,
}

/// One seat at the board. Kept for the whole session; the piece is drawn
/// again every game.
pub struct Player {
    pub name: String,
    pub piece: Piece,
    source: MoveSource,
}

impl Player {
    pub fn is_computer(&self) -> bool {
        self.source.is_computer()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameResult {
    Won { piece: Piece, name: String },
    Drawn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub result: GameResult,
    pub moves: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub games_played: u32,
    pub first_wins: u32,
    pub second_wins: u32,
    pub draws: u32,
    /// The session ended on `quit` or end of input rather than the game count.
    pub quit: bool,
}

impl SessionSummary {
    fn record(&mut self, record: &GameRecord) {
        self.games_played += 1;
        match record.result {
            GameResult::Won {
                piece: Piece::First,
                ..
            } => self.first_wins += 1,
            GameResult::Won { .. } => self.second_wins += 1,
            GameResult::Drawn => self.draws += 1,
        }
    }
}

pub struct GameSession {
    settings: SessionSettings,
    scores: ScoreBoard,
    rng: ChaCha20Rng,
    seats: [Player; 2],
}

impl GameSession {
    pub fn new(settings: SessionSettings, scores: ScoreBoard, mut rng: ChaCha20Rng) -> Self {
        let seats = seat_players(&settings, &mut rng);
        Self {
            settings,
            scores,
            rng,
            seats,
        }
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    /// Prepare both seats for a new game: the first gets a random piece, the
    /// second the other, and per-game source state is dropped.
    fn setup_players(&mut self) {
        let first_piece = if self.rng.gen_bool(0.5) {
            Piece::First
        } else {
            Piece::Second
        };
        let pieces = [first_piece, first_piece.opponent()];

        for (seat, piece) in self.seats.iter_mut().zip(pieces) {
            seat.piece = piece;
            seat.source.reset();
            if self.settings.players == PlayerSetting::ComputerVsComputer {
                seat.name = format!("Computer {}", piece);
            }
        }
    }

    /// Play one game to completion. Returns None if a human quit.
    pub fn play_game<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<Option<GameRecord>> {
        self.setup_players();
        let mut current = self.rng.gen_range(0..2);
        let players = &mut self.seats;
        let mut board = Board::new(self.settings.variant);

        writeln!(
            output,
            "New {} game: {} ({}) vs {} ({})",
            self.settings.variant,
            players[0].name,
            players[0].piece,
            players[1].name,
            players[1].piece
        )?;
        writeln!(output, "{} goes first", players[current].name)?;
        info!(
            variant = %self.settings.variant,
            players = %self.settings.players,
            first_mover = %players[current].name,
            "Game started"
        );

        while !board.check_win().is_over() {
            if self.settings.show_board {
                writeln!(output, "{}", board)?;
            }

            let player = &mut players[current];
            let mv = if player.is_computer() {
                let mv = player.source.next_move(&board, player.piece)?;
                writeln!(output, "{} ({}) plays {} {}", player.name, player.piece, mv.x, mv.y)?;
                mv
            } else {
                match read_human_move(player, &board, input, output)? {
                    Some(mv) => mv,
                    None => {
                        info!(moves = board.move_count(), "Game abandoned");
                        return Ok(None);
                    }
                }
            };

            board.apply_move(mv, player.piece)?;
            players[1 - current].source.observe(mv);
            current = 1 - current;
        }

        if self.settings.show_board {
            writeln!(output, "{}", board)?;
        }

        let winner = board.winner();
        let result = match winner {
            Some(piece) => {
                let name = players
                    .iter()
                    .find(|p| p.piece == piece)
                    .map(|p| p.name.clone())
                    .ok_or_else(|| anyhow!("no player holds the winning piece {}", piece))?;
                GameResult::Won { piece, name }
            }
            None => GameResult::Drawn,
        };

        match &result {
            GameResult::Won { piece, .. }
                if self.settings.players == PlayerSetting::ComputerVsComputer =>
            {
                writeln!(output, "{} wins!", piece)?
            }
            GameResult::Won { name, .. } => writeln!(output, "{} wins!", name)?,
            GameResult::Drawn => writeln!(output, "It's a draw!")?,
        }

        for player in players.iter().filter(|p| !p.is_computer()) {
            self.scores
                .record_game(&player.name, winner == Some(player.piece));
        }
        // Both seats may share a name, so report each name once.
        let mut reported: Vec<&str> = Vec::new();
        for player in players.iter().filter(|p| !p.is_computer()) {
            if reported.contains(&player.name.as_str()) {
                continue;
            }
            reported.push(&player.name);
            if let Some(line) = self.scores.describe(&player.name) {
                writeln!(output, "{}", line)?;
            }
        }
        self.scores.save();

        let record = GameRecord {
            result,
            moves: board.move_count(),
        };
        info!(result = ?record.result, moves = record.moves, "Game finished");
        Ok(Some(record))
    }

    /// Play `games` games, or keep offering another game while `games` is 0.
    pub fn play<R: BufRead, W: Write>(
        &mut self,
        games: u32,
        input: &mut R,
        output: &mut W,
    ) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        loop {
            match self.play_game(input, output)? {
                Some(record) => summary.record(&record),
                None => {
                    summary.quit = true;
                    break;
                }
            }

            if games > 0 {
                if summary.games_played >= games {
                    break;
                }
            } else if !ask_play_again(input, output)? {
                summary.quit = true;
                break;
            }
        }

        info!(
            games = summary.games_played,
            first_wins = summary.first_wins,
            second_wins = summary.second_wins,
            draws = summary.draws,
            "Session finished"
        );
        Ok(summary)
    }
}

fn computer(config: &MctsConfig, rng: &mut ChaCha20Rng) -> MoveSource {
    let rng = ChaCha20Rng::seed_from_u64(rng.gen());
    MoveSource::search(MctsSearch::new(config.clone(), rng))
}

/// Build the two seats for the session's player setting. Pieces are assigned
/// per game by `GameSession::setup_players`.
fn seat_players(settings: &SessionSettings, rng: &mut ChaCha20Rng) -> [Player; 2] {
    let (first, second) = match settings.players {
        PlayerSetting::HumanVsHuman => (
            (settings.first_name.clone(), MoveSource::external()),
            (settings.second_name.clone(), MoveSource::external()),
        ),
        PlayerSetting::HumanVsComputer => (
            (settings.first_name.clone(), MoveSource::external()),
            ("Computer".to_string(), computer(&settings.mcts, rng)),
        ),
        PlayerSetting::ComputerVsComputer => (
            ("Computer".to_string(), computer(&settings.mcts, rng)),
            ("Computer".to_string(), computer(&settings.mcts, rng)),
        ),
    };

    [
        Player {
            name: first.0,
            piece: Piece::First,
            source: first.1,
        },
        Player {
            name: second.0,
            piece: Piece::Second,
            source: second.1,
        },
    ]
}

/// Prompt until the human enters a legal move. None on `quit` or end of input.
fn read_human_move<R: BufRead, W: Write>(
    player: &mut Player,
    board: &Board,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Coord>> {
    loop {
        match board.constrained_subboard() {
            Some((sx, sy)) => write!(
                output,
                "{} ({}), your move in sub-board {} {} as 'x y': ",
                player.name, player.piece, sx, sy
            )?,
            None => write!(
                output,
                "{} ({}), your move as 'x y': ",
                player.name, player.piece
            )?,
        }
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        if line.is_empty() {
            continue;
        }

        let mv: Coord = match line.parse() {
            Ok(mv) => mv,
            Err(e) => {
                writeln!(output, "{}", e)?;
                continue;
            }
        };

        player.source.submit(mv);
        match player.source.next_move(board, player.piece) {
            Ok(mv) => return Ok(Some(mv)),
            Err(PlayerError::Board(e)) => {
                debug!(player = %player.name, error = %e, "Rejected move");
                writeln!(output, "{}, try again", e)?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn ask_play_again<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "Play again? [y/n]: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(false);
    }
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::PlayerRecord;
    use std::io::Cursor;

    fn settings(variant: Variant, players: PlayerSetting) -> SessionSettings {
        SessionSettings {
            variant,
            players,
            first_name: "Ada".into(),
            second_name: "Grace".into(),
            mcts: MctsConfig::for_testing().with_iterations(50),
            show_board: false,
        }
    }

    fn session(variant: Variant, players: PlayerSetting, seed: u64) -> GameSession {
        GameSession::new(
            settings(variant, players),
            ScoreBoard::in_memory(),
            ChaCha20Rng::seed_from_u64(seed),
        )
    }

    fn run_game(session: &mut GameSession, script: &str) -> (Option<GameRecord>, String) {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        let record = session.play_game(&mut input, &mut output).unwrap();
        (record, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_player_setting_parse() {
        assert_eq!(
            "human-vs-human".parse::<PlayerSetting>().unwrap(),
            PlayerSetting::HumanVsHuman
        );
        assert_eq!(
            " CVC ".parse::<PlayerSetting>().unwrap(),
            PlayerSetting::ComputerVsComputer
        );
        assert!("human".parse::<PlayerSetting>().is_err());
        assert_eq!(PlayerSetting::HumanVsComputer.to_string(), "human-vs-computer");
    }

    #[test]
    fn test_setup_assigns_opposite_pieces() {
        let mut seen_first = false;
        let mut seen_second = false;
        for seed in 0..20 {
            let mut s = session(Variant::Basic, PlayerSetting::HumanVsComputer, seed);
            s.setup_players();
            let players = &s.seats;
            assert_eq!(players[0].piece, players[1].piece.opponent());
            assert!(players[0].piece.is_player());
            assert_eq!(players[0].name, "Ada");
            assert!(!players[0].is_computer());
            assert!(players[1].is_computer());
            seen_first |= players[0].piece == Piece::First;
            seen_second |= players[0].piece == Piece::Second;
        }
        // The first player's piece is random, not fixed
        assert!(seen_first && seen_second);
    }

    #[test]
    fn test_computer_seats_start_each_game_without_a_tree() {
        let mut s = session(Variant::Basic, PlayerSetting::ComputerVsComputer, 18);
        run_game(&mut s, "");

        let has_tree = |seat: &Player| match &seat.source {
            MoveSource::Search(search) => search.tree().is_some(),
            MoveSource::External(_) => false,
        };
        assert!(s.seats.iter().any(has_tree));

        s.setup_players();
        assert!(!s.seats.iter().any(has_tree));
        for seat in &s.seats {
            assert_eq!(seat.name, format!("Computer {}", seat.piece));
        }
    }

    #[test]
    fn test_human_vs_human_scripted_game() {
        // Whoever moves first completes the top row.
        let script = "0 0\n0 1\n1 0\n1 1\n2 0\n";
        let mut s = session(Variant::Basic, PlayerSetting::HumanVsHuman, 11);
        let (record, output) = run_game(&mut s, script);

        let record = record.unwrap();
        assert_eq!(record.moves, 5);
        let winner = match &record.result {
            GameResult::Won { name, .. } => name.clone(),
            GameResult::Drawn => panic!("expected a win"),
        };
        assert!(output.contains(&format!("{} wins!", winner)));

        let loser = if winner == "Ada" { "Grace" } else { "Ada" };
        assert_eq!(s.scores().get(&winner), Some(PlayerRecord { wins: 1, played: 1 }));
        assert_eq!(s.scores().get(loser), Some(PlayerRecord { wins: 0, played: 1 }));
        assert!(output.contains(&format!("{}'s score: 1 out of 1", winner)));
        assert!(output.contains(&format!("{}'s score: 0 out of 1", loser)));
    }

    #[test]
    fn test_illegal_input_is_requested_again() {
        // Second "0 0" is occupied, "nonsense" does not parse, "5 5" is off the board.
        let script = "0 0\n0 0\nnonsense\n5 5\n0 1\n1 0\n1 1\n2 0\n";
        let mut s = session(Variant::Basic, PlayerSetting::HumanVsHuman, 4);
        let (record, output) = run_game(&mut s, script);

        assert_eq!(record.unwrap().moves, 5);
        assert_eq!(output.matches("try again").count(), 2);
        assert!(output.contains("cannot parse 'nonsense'"));
    }

    #[test]
    fn test_human_vs_human_draw() {
        // X O X / X O O / O X X from whichever side starts
        let script = "0 0\n1 0\n2 0\n1 1\n0 1\n2 1\n1 2\n0 2\n2 2\n";
        let mut s = session(Variant::Basic, PlayerSetting::HumanVsHuman, 2);
        let (record, output) = run_game(&mut s, script);

        let record = record.unwrap();
        assert_eq!(record.result, GameResult::Drawn);
        assert_eq!(record.moves, 9);
        assert!(output.contains("It's a draw!"));
        assert_eq!(s.scores().get("Ada"), Some(PlayerRecord { wins: 0, played: 1 }));
        assert_eq!(s.scores().get("Grace"), Some(PlayerRecord { wins: 0, played: 1 }));
    }

    #[test]
    fn test_quit_ends_game_without_recording() {
        let mut s = session(Variant::Basic, PlayerSetting::HumanVsHuman, 5);
        let (record, _) = run_game(&mut s, "1 1\nquit\n");
        assert!(record.is_none());
        assert!(s.scores().is_empty());
    }

    #[test]
    fn test_end_of_input_ends_game() {
        let mut s = session(Variant::Basic, PlayerSetting::HumanVsHuman, 5);
        let (record, _) = run_game(&mut s, "");
        assert!(record.is_none());
    }

    #[test]
    fn test_computer_vs_computer_basic() {
        let mut s = session(Variant::Basic, PlayerSetting::ComputerVsComputer, 9);
        let (record, output) = run_game(&mut s, "");

        let record = record.unwrap();
        assert!(record.moves >= 5 && record.moves <= 9);
        match &record.result {
            GameResult::Won { piece, .. } => assert!(output.contains(&format!("{} wins!", piece))),
            GameResult::Drawn => assert!(output.contains("It's a draw!")),
        }
        // Computers are never recorded
        assert!(s.scores().is_empty());
        assert!(!output.contains("score"));
    }

    #[test]
    fn test_computer_vs_computer_ultimate() {
        let mut s = session(Variant::Ultimate, PlayerSetting::ComputerVsComputer, 21);
        let (record, _) = run_game(&mut s, "");
        let record = record.unwrap();
        assert!(record.moves >= 17 && record.moves <= 81);
    }

    #[test]
    fn test_seeded_session_is_reproducible() {
        let mut a = session(Variant::Basic, PlayerSetting::ComputerVsComputer, 33);
        let mut b = session(Variant::Basic, PlayerSetting::ComputerVsComputer, 33);
        let (ra, oa) = run_game(&mut a, "");
        let (rb, ob) = run_game(&mut b, "");
        assert_eq!(ra, rb);
        assert_eq!(oa, ob);
    }

    #[test]
    fn test_human_vs_computer_until_quit() {
        let mut s = session(Variant::Basic, PlayerSetting::HumanVsComputer, 6);
        let mut input = Cursor::new(b"quit\n".to_vec());
        let mut output = Vec::new();

        // The computer may open; the human then quits at the first prompt.
        let summary = s.play(3, &mut input, &mut output).unwrap();
        assert!(summary.quit);
        assert_eq!(summary.games_played, 0);
        assert!(s.scores().get("Ada").is_none());
    }

    #[test]
    fn test_play_fixed_number_of_games() {
        let mut s = session(Variant::Basic, PlayerSetting::ComputerVsComputer, 14);
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();

        let summary = s.play(3, &mut input, &mut output).unwrap();
        assert_eq!(summary.games_played, 3);
        assert_eq!(summary.first_wins + summary.second_wins + summary.draws, 3);
        assert!(!summary.quit);
    }

    #[test]
    fn test_play_again_prompt() {
        let mut s = session(Variant::Basic, PlayerSetting::ComputerVsComputer, 15);
        let mut input = Cursor::new(b"y\nn\n".to_vec());
        let mut output = Vec::new();

        let summary = s.play(0, &mut input, &mut output).unwrap();
        assert_eq!(summary.games_played, 2);
        assert!(summary.quit);
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("Play again?").count(), 2);
    }
}
