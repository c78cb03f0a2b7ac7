//! WebAssembly bindings for the match-3 engine.
//!
//! The browser owns animation timing: after `select` reports a committed
//! swap it renders the post-swap board, waits, and calls
//! `completeResolution` to apply the cascade.

use wasm_bindgen::prelude::*;

use crate::actions::{SessionCommand, SessionEvent};
use crate::config::EngineConfig;
use crate::position::Position;
use crate::session::{GameSession, SessionState};

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed session wrapper
#[wasm_bindgen]
pub struct WasmMatch3 {
    session: GameSession,
}

#[wasm_bindgen]
impl WasmMatch3 {
    /// Create a session; `config_json` may be empty for the reference configuration
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmMatch3, JsValue> {
        let config = if config_json.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };

        let session = GameSession::new(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        Ok(WasmMatch3 { session })
    }

    /// Create a deterministic session from a seed
    #[wasm_bindgen(js_name = withSeed)]
    pub fn with_seed(seed: u64) -> Result<WasmMatch3, JsValue> {
        let session = GameSession::with_seed(EngineConfig::default(), seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmMatch3 { session })
    }

    /// Full session snapshot as JSON
    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> String {
        serde_json::to_string(&self.session.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Board rows as JSON (`[[{type, id}, ...], ...]`)
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> String {
        serde_json::to_string(&self.session.snapshot().cells).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> u64 {
        self.session.score()
    }

    #[wasm_bindgen(js_name = isLocked)]
    pub fn is_locked(&self) -> bool {
        self.session.is_locked()
    }

    /// Click a cell; returns the resulting events as JSON
    pub fn select(&mut self, row: usize, col: usize) -> Result<String, JsValue> {
        let pos = Position::new(row, col);
        if !pos.in_bounds(self.session.config().dimension) {
            return Err(JsValue::from_str(&format!("Cell {} is off the board", pos)));
        }
        let events = self.session.apply(SessionCommand::Select(pos));
        Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
    }

    /// Apply the pending cascade, if any; returns the resulting events as JSON
    #[wasm_bindgen(js_name = completeResolution)]
    pub fn complete_resolution(&mut self) -> String {
        let events: Vec<SessionEvent> = match self.session.state() {
            SessionState::Resolving(ticket) => self
                .session
                .apply(SessionCommand::CompleteResolution(ticket)),
            _ => Vec::new(),
        };
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn restart(&mut self) {
        self.session.restart();
    }

    /// A suggested swap as JSON `[from, to]`, or `null`
    pub fn hint(&self) -> String {
        serde_json::to_string(&self.session.hint()).unwrap_or_else(|_| "null".to_string())
    }
}
