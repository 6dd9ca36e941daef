use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::game::rules::{available_moves, evaluate, Outcome};
use crate::game::state::{Board, CellIndex, Mark};

/// While at least this many cells are empty the bot moves at random instead
/// of searching. Keeps the first plies varied; the search from 6 empties on
/// is exhaustive, so the bot never loses a decided position.
pub const RANDOM_MOVE_THRESHOLD: usize = 7;

const WIN_SCORE: i32 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiPolicy {
    Random,
    Minimax,
}

/// What the bot chose and how it got there, for the frontend to display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<CellIndex>,
    pub score: i32,
    pub nodes: u64,
    pub policy: AiPolicy,
}

impl AiDecision {
    /// The "no move" sentinel, returned for full or finished boards.
    pub fn none() -> Self {
        Self {
            cell: None,
            score: 0,
            nodes: 0,
            policy: AiPolicy::Minimax,
        }
    }
}

#[derive(Default)]
struct SearchStats {
    nodes: u64,
}

pub struct AiAgent {
    rng: SmallRng,
}

impl AiAgent {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Pick a cell for `ai_mark`, or `None` when the board is full. The
    /// input board is never observably altered.
    pub fn select_move(
        &mut self,
        board: &Board,
        ai_mark: Mark,
        opponent_mark: Mark,
    ) -> Option<CellIndex> {
        self.decide(board, ai_mark, opponent_mark).cell
    }

    pub fn decide(&mut self, board: &Board, ai_mark: Mark, opponent_mark: Mark) -> AiDecision {
        let empties = available_moves(board);
        if empties.is_empty() {
            return AiDecision::none();
        }

        if empties.len() >= RANDOM_MOVE_THRESHOLD {
            let cell = empties.choose(&mut self.rng).copied();
            return AiDecision {
                cell,
                score: 0,
                nodes: 1,
                policy: AiPolicy::Random,
            };
        }

        let mut stats = SearchStats::default();
        let mut scratch = *board;
        let (score, cell) = minimax(&mut scratch, true, 0, ai_mark, opponent_mark, &mut stats);
        AiDecision {
            cell,
            score,
            nodes: stats.nodes,
            policy: AiPolicy::Minimax,
        }
    }
}

impl Default for AiAgent {
    fn default() -> Self {
        AiAgent::new()
    }
}

/// Exhaustive minimax root, no random opening. `None` only on a full board.
pub fn best_move(board: &Board, ai_mark: Mark, opponent_mark: Mark) -> Option<CellIndex> {
    let mut stats = SearchStats::default();
    let mut scratch = *board;
    minimax(&mut scratch, true, 0, ai_mark, opponent_mark, &mut stats).1
}

/// Terminal boards score `10 - depth` for an AI win, `depth - 10` for an
/// opponent win and `0` for a draw, so faster wins and slower losses are
/// preferred. Ties go to the lowest empty index.
fn minimax(
    board: &mut Board,
    maximizing: bool,
    depth: i32,
    ai_mark: Mark,
    opponent_mark: Mark,
    stats: &mut SearchStats,
) -> (i32, Option<CellIndex>) {
    stats.nodes += 1;

    match evaluate(board) {
        Outcome::Win { mark, .. } => {
            let score = if mark == ai_mark {
                WIN_SCORE - depth
            } else {
                depth - WIN_SCORE
            };
            return (score, None);
        }
        Outcome::Draw => return (0, None),
        Outcome::NoResult => {}
    }

    let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
    let mut best_cell = None;

    for index in available_moves(board) {
        board[index] = Some(if maximizing { ai_mark } else { opponent_mark });
        let (score, _) = minimax(board, !maximizing, depth + 1, ai_mark, opponent_mark, stats);
        board[index] = None;

        let improves = if maximizing {
            score > best_score
        } else {
            score < best_score
        };
        if improves {
            best_score = score;
            best_cell = Some(index);
        }
    }

    (best_score, best_cell)
}
