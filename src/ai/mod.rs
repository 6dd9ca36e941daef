//! Bot move selection (random opening plies, minimax afterwards).

pub mod minimax;

pub use minimax::{best_move, AiAgent, AiDecision, AiPolicy, RANDOM_MOVE_THRESHOLD};
