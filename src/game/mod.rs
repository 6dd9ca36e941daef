//! Game core: board snapshot, round state machine and rules.

pub mod rules;
pub mod state;

pub use rules::{
    available_moves,
    evaluate,
    GameEvent,
    Outcome,
    RoundResolution,
    RuleEngine,
    RuleError,
    WIN_LINES,
};
pub use state::{
    Board,
    CellIndex,
    GameMode,
    GameState,
    GameStatus,
    Mark,
    Scores,
    BOARD_CELLS,
    COMPUTER_MARK,
    OPENING_MARK,
};
