use serde::{Deserialize, Serialize};

use super::state::{Board, CellIndex, GameState, GameStatus, Mark, BOARD_CELLS};

/// The 8 winning index triples: rows, then columns, then diagonals. The
/// order doubles as the tie-break for which line gets reported.
pub const WIN_LINES: [[CellIndex; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Terminal status of a board snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Outcome {
    NoResult,
    Win { mark: Mark, line: [CellIndex; 3] },
    Draw,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::NoResult)
    }
}

/// Check the fixed lines in order; draw only when no line matches and no
/// cell is empty.
pub fn evaluate(board: &Board) -> Outcome {
    for line in WIN_LINES {
        let [a, b, c] = line;
        if let Some(mark) = board[a] {
            if board[b] == Some(mark) && board[c] == Some(mark) {
                return Outcome::Win { mark, line };
            }
        }
    }
    if board.iter().all(Option::is_some) {
        Outcome::Draw
    } else {
        Outcome::NoResult
    }
}

/// Indices of the empty cells, ascending.
pub fn available_moves(board: &Board) -> Vec<CellIndex> {
    board
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| cell.is_none().then_some(index))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    GameFinished,
    OutOfBounds { index: CellIndex },
    CellOccupied { index: CellIndex },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MarkPlaced { mark: Mark, index: CellIndex },
    RoundWon { mark: Mark, line: [CellIndex; 3] },
    RoundDrawn,
}

/// State plus the events of the last action, handed back to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    pub outcome: Outcome,
}

impl RoundResolution {
    pub fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        let outcome = evaluate(&state.board);
        Self {
            state,
            events,
            outcome,
        }
    }
}

/// Applies moves to a [`GameState`] and drives its round state machine.
#[derive(Debug, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Place the current mark at `index`, toggle the turn and re-evaluate.
    /// On the transition into a terminal status the score tally is bumped
    /// exactly once.
    pub fn place_mark(
        &self,
        state: &mut GameState,
        index: CellIndex,
    ) -> Result<Vec<GameEvent>, RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        if index >= BOARD_CELLS {
            return Err(RuleError::OutOfBounds { index });
        }
        if state.board[index].is_some() {
            return Err(RuleError::CellOccupied { index });
        }

        let mark = state.current_mark();
        state.board[index] = Some(mark);
        state.advance_turn();

        let mut events = vec![GameEvent::MarkPlaced { mark, index }];
        match evaluate(&state.board) {
            Outcome::Win { mark, line } => {
                state.status = GameStatus::Won { mark, line };
                state.scores.record_win(mark);
                events.push(GameEvent::RoundWon { mark, line });
            }
            Outcome::Draw => {
                state.status = GameStatus::Drawn;
                state.scores.record_draw();
                events.push(GameEvent::RoundDrawn);
            }
            Outcome::NoResult => {}
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GameMode;

    fn board_from(cells: [&str; 9]) -> Board {
        let mut board: Board = [None; BOARD_CELLS];
        for (index, cell) in cells.iter().enumerate() {
            board[index] = match *cell {
                "X" => Some(Mark::X),
                "O" => Some(Mark::O),
                _ => None,
            };
        }
        board
    }

    #[test]
    fn empty_board_has_no_result() {
        assert_eq!(evaluate(&[None; BOARD_CELLS]), Outcome::NoResult);
    }

    #[test]
    fn partial_board_without_line_has_no_result() {
        let board = board_from(["X", "O", "", "", "X", "", "", "", "O"]);
        assert_eq!(evaluate(&board), Outcome::NoResult);
    }

    #[test]
    fn each_line_wins_for_its_mark() {
        for line in WIN_LINES {
            let mut board: Board = [None; BOARD_CELLS];
            for index in line {
                board[index] = Some(Mark::O);
            }
            assert_eq!(evaluate(&board), Outcome::Win { mark: Mark::O, line });
        }
    }

    #[test]
    fn rows_are_reported_before_columns_and_diagonals() {
        // Every cell X: all 8 lines are complete, the first row wins the report.
        let board = [Some(Mark::X); BOARD_CELLS];
        assert_eq!(
            evaluate(&board),
            Outcome::Win {
                mark: Mark::X,
                line: [0, 1, 2]
            }
        );

        // Column [0,3,6] and diagonal [0,4,8] both complete; the column is
        // checked first.
        let board = board_from(["X", "", "", "X", "X", "", "X", "", "X"]);
        assert_eq!(
            evaluate(&board),
            Outcome::Win {
                mark: Mark::X,
                line: [0, 3, 6]
            }
        );
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let board = board_from(["X", "O", "X", "X", "O", "O", "O", "X", "X"]);
        assert_eq!(evaluate(&board), Outcome::Draw);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let board = board_from(["X", "O", "X", "", "O", "", "", "", ""]);
        assert_eq!(evaluate(&board), evaluate(&board));
    }

    #[test]
    fn available_moves_lists_empty_cells_in_order() {
        let board = board_from(["X", "", "O", "", "", "X", "", "O", ""]);
        assert_eq!(available_moves(&board), vec![1, 3, 4, 6, 8]);
        assert!(available_moves(&[Some(Mark::O); BOARD_CELLS]).is_empty());
    }

    #[test]
    fn place_mark_alternates_turns() {
        let engine = RuleEngine::new();
        let mut state = GameState::new(GameMode::TwoPlayers);

        let events = engine.place_mark(&mut state, 4).expect("move should apply");
        assert_eq!(
            events,
            vec![GameEvent::MarkPlaced {
                mark: Mark::X,
                index: 4
            }]
        );
        assert_eq!(state.board[4], Some(Mark::X));
        assert_eq!(state.current_mark(), Mark::O);

        engine.place_mark(&mut state, 0).expect("move should apply");
        assert_eq!(state.board[0], Some(Mark::O));
        assert_eq!(state.current_mark(), Mark::X);
    }

    #[test]
    fn place_mark_rejects_bad_moves() {
        let engine = RuleEngine::new();
        let mut state = GameState::new(GameMode::TwoPlayers);

        engine.place_mark(&mut state, 4).expect("move should apply");
        assert_eq!(
            engine.place_mark(&mut state, 4),
            Err(RuleError::CellOccupied { index: 4 })
        );
        assert_eq!(
            engine.place_mark(&mut state, 9),
            Err(RuleError::OutOfBounds { index: 9 })
        );
    }

    #[test]
    fn completing_a_row_wins_the_round_and_scores_once() {
        let engine = RuleEngine::new();
        let mut state = GameState::new(GameMode::TwoPlayers);

        for index in [0, 4, 1, 8] {
            engine.place_mark(&mut state, index).expect("move should apply");
        }
        let events = engine.place_mark(&mut state, 2).expect("move should apply");

        assert_eq!(
            state.status,
            GameStatus::Won {
                mark: Mark::X,
                line: [0, 1, 2]
            }
        );
        assert!(events.contains(&GameEvent::RoundWon {
            mark: Mark::X,
            line: [0, 1, 2]
        }));
        assert_eq!(state.scores.x, 1);

        // Terminal round is frozen; the tally must not move again.
        assert_eq!(
            engine.place_mark(&mut state, 3),
            Err(RuleError::GameFinished)
        );
        assert_eq!(state.scores.x, 1);
    }

    #[test]
    fn filling_the_board_without_line_draws() {
        let engine = RuleEngine::new();
        let mut state = GameState::new(GameMode::TwoPlayers);

        // X O X / X O O / O X X, played in an order that never completes a line.
        for index in [0, 1, 2, 4, 3, 5, 7, 6, 8] {
            engine.place_mark(&mut state, index).expect("move should apply");
        }

        assert_eq!(state.status, GameStatus::Drawn);
        assert_eq!(state.scores.draws, 1);
        assert_eq!(state.scores.x, 0);
        assert_eq!(state.scores.o, 0);
    }

    #[test]
    fn resolution_reports_the_board_outcome() {
        let engine = RuleEngine::new();
        let mut state = GameState::new(GameMode::TwoPlayers);
        let events = engine.place_mark(&mut state, 0).expect("move should apply");

        let resolution = RoundResolution::new(state.clone(), events);
        assert_eq!(resolution.outcome, Outcome::NoResult);
        assert_eq!(resolution.state, state);
    }
}
