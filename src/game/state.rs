use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// Row-major cell index, 0..9.
pub type CellIndex = usize;

/// Board snapshot; `None` is an empty cell.
pub type Board = [Option<Mark>; BOARD_CELLS];

/// The mark that opens every round.
pub const OPENING_MARK: Mark = Mark::X;

/// The mark the computer plays in [`GameMode::VsComputer`].
pub const COMPUTER_MARK: Mark = Mark::O;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl Default for Mark {
    fn default() -> Self {
        OPENING_MARK
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

impl FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Mark::X),
            "o" => Ok(Mark::O),
            _ => Err(()),
        }
    }
}

/// Game mode as selected (and persisted) by the frontend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameMode {
    #[serde(rename = "cpu")]
    VsComputer,
    #[serde(rename = "player")]
    TwoPlayers,
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::VsComputer
    }
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" | "computer" => Ok(GameMode::VsComputer),
            "player" | "players" | "pvp" => Ok(GameMode::TwoPlayers),
            _ => Err(()),
        }
    }
}

/// Cumulative score tally across rounds. Field names match the document the
/// frontend keeps in local storage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scores {
    #[serde(rename = "X", default)]
    pub x: u32,
    #[serde(rename = "O", default)]
    pub o: u32,
    #[serde(rename = "draw", default)]
    pub draws: u32,
}

impl Scores {
    pub fn record_win(&mut self, mark: Mark) {
        match mark {
            Mark::X => self.x += 1,
            Mark::O => self.o += 1,
        }
    }

    pub fn record_draw(&mut self) {
        self.draws += 1;
    }
}

/// Per-round state machine. `Won` and `Drawn` are terminal until a reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameStatus {
    InProgress,
    Won { mark: Mark, line: [CellIndex; 3] },
    Drawn,
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::InProgress
    }
}

/// Full game snapshot exchanged with the frontend as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    #[serde(default)]
    pub next_mark: Mark,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default)]
    pub scores: Scores,
}

impl GameState {
    pub fn new(mode: GameMode) -> Self {
        Self {
            board: [None; BOARD_CELLS],
            next_mark: OPENING_MARK,
            status: GameStatus::InProgress,
            mode,
            scores: Scores::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status != GameStatus::InProgress
    }

    /// The mark that moves next. Toggled by every applied move.
    pub fn current_mark(&self) -> Mark {
        self.next_mark
    }

    pub fn advance_turn(&mut self) {
        self.next_mark = self.next_mark.opponent();
    }

    /// True when the round is live and it is the computer's turn.
    pub fn computer_to_move(&self) -> bool {
        self.mode == GameMode::VsComputer
            && !self.is_finished()
            && self.next_mark == COMPUTER_MARK
    }

    /// Fresh board, X to move. Scores survive.
    pub fn start_new_round(&mut self) {
        self.board = [None; BOARD_CELLS];
        self.next_mark = OPENING_MARK;
        self.status = GameStatus::InProgress;
    }

    /// New round with the tally cleared.
    pub fn reset_game(&mut self) {
        self.scores = Scores::default();
        self.start_new_round();
    }

    /// Switching mode resets the whole game, as the frontend controls do.
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.reset_game();
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(GameMode::default())
    }
}
