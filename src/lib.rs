pub mod ai;
pub mod game;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{best_move, AiAgent, AiDecision, AiPolicy, RANDOM_MOVE_THRESHOLD};
pub use game::{
    available_moves, evaluate, Board, CellIndex, GameEvent, GameMode, GameState, GameStatus, Mark,
    Outcome, RoundResolution, RuleEngine, RuleError, Scores, BOARD_CELLS, COMPUTER_MARK,
    OPENING_MARK, WIN_LINES,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_mark(value: &str) -> Result<Mark, JsValue> {
    Mark::from_str(value).map_err(|_| JsValue::from_str("expected mark \"X\" or \"O\""))
}

fn parse_mode(value: &str) -> Result<GameMode, JsValue> {
    GameMode::from_str(value).map_err(|_| JsValue::from_str("expected mode \"cpu\" or \"player\""))
}

fn make_resolution_json(resolution: RoundResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<RoundResolution>,
}

#[wasm_bindgen]
pub struct GameEngine {
    state: GameState,
    agent: AiAgent,
    rules: RuleEngine,
}

#[wasm_bindgen]
impl GameEngine {
    /// Restore from a persisted snapshot, or start fresh. A corrupted
    /// snapshot falls back to the default state instead of failing, so the
    /// frontend can pass whatever local storage holds.
    #[wasm_bindgen(constructor)]
    pub fn new(saved_state_json: Option<String>) -> GameEngine {
        let state = match saved_state_json.as_deref() {
            Some(json) => serde_json::from_str(json).unwrap_or_else(|parse_err| {
                web_sys::console::warn_1(
                    &format!("discarding saved game state: {parse_err}").into(),
                );
                GameState::default()
            }),
            None => GameState::default(),
        };
        GameEngine {
            state,
            agent: AiAgent::new(),
            rules: RuleEngine::new(),
        }
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    /// Strict counterpart of the constructor, for callers that want the
    /// parse error instead of the fallback.
    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.state = state;
        Ok(())
    }

    pub fn scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.scores).map_err(serde_to_js_error)
    }

    pub fn status_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.status).map_err(serde_to_js_error)
    }

    pub fn mode(&self) -> String {
        match self.state.mode {
            GameMode::VsComputer => "cpu".to_owned(),
            GameMode::TwoPlayers => "player".to_owned(),
        }
    }

    /// Mode switch resets the round and the tally, as the mode buttons do.
    pub fn set_mode(&mut self, mode: &str) -> Result<String, JsValue> {
        self.state.set_mode(parse_mode(mode)?);
        self.state_json()
    }

    pub fn computer_to_move(&self) -> bool {
        self.state.computer_to_move()
    }

    /// Apply the current player's mark at `index`.
    pub fn play_cell(&mut self, index: usize) -> Result<String, JsValue> {
        let events = self
            .rules
            .place_mark(&mut self.state, index)
            .map_err(to_js_error)?;
        make_resolution_json(RoundResolution::new(self.state.clone(), events))
    }

    /// Let the bot pick and play a cell for the current mark. On a finished
    /// round the decision carries no cell and nothing is applied.
    pub fn apply_ai_move(&mut self) -> Result<String, JsValue> {
        let decision = if self.state.is_finished() {
            AiDecision::none()
        } else {
            let mark = self.state.current_mark();
            self.agent.decide(&self.state.board, mark, mark.opponent())
        };

        let applied = match decision.cell {
            Some(cell) => {
                let events = self
                    .rules
                    .place_mark(&mut self.state, cell)
                    .map_err(to_js_error)?;
                Some(RoundResolution::new(self.state.clone(), events))
            }
            None => None,
        };

        let response = AiMoveResponse { decision, applied };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// Compute (but do not apply) the bot's move after an optional delay,
    /// for the frontend's "thinking" pause before showing the reply.
    pub fn think_move(&self, delay_ms: Option<u32>) -> Promise {
        let board = self.state.board;
        let finished = self.state.is_finished();
        let mark = self.state.current_mark();
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let decision = if finished {
                AiDecision::none()
            } else {
                AiAgent::new().decide(&board, mark, mark.opponent())
            };
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    pub fn start_new_round(&mut self) -> Result<String, JsValue> {
        self.state.start_new_round();
        self.state_json()
    }

    pub fn reset_game(&mut self) -> Result<String, JsValue> {
        self.state.reset_game();
        self.state_json()
    }
}

/// Fresh game state for the given mode (default: vs computer).
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state(mode: Option<String>) -> Result<JsValue, JsValue> {
    let mode = match mode.as_deref() {
        Some(value) => parse_mode(value)?,
        None => GameMode::default(),
    };
    to_value(&GameState::new(mode)).map_err(JsValue::from)
}

/// Terminal status of a board snapshot: no result, a win with its line, or
/// a draw.
#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&evaluate(&board)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "availableMoves")]
pub fn available_moves_js(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&available_moves(&board)).map_err(JsValue::from)
}

/// Stateless bot move for any snapshot; the caller applies it.
#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    board: JsValue,
    ai_mark: &str,
    opponent_mark: &str,
) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let ai_mark = parse_mark(ai_mark)?;
    let opponent_mark = parse_mark(opponent_mark)?;
    let decision = AiAgent::new().decide(&board, ai_mark, opponent_mark);
    to_value(&decision).map_err(JsValue::from)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
