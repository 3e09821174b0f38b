use std::sync::Arc;

use once_cell::sync::Lazy;
use wasm_bindgen::prelude::*;

use crate::executor::InlineExecutor;
use crate::game::GameInstance;
use crate::prefs::PreferenceStore;
use crate::score::ScoreRepository;
use crate::snapshot::GameSnapshot;
use crate::types::GameConfig;
use crate::words::{RandomWordSource, WordSource};

/// Shared by every game created from JS so the high score outlives a single
/// `UnscrambleGame` object.
static SHARED_PREFS: Lazy<Arc<PreferenceStore>> =
    Lazy::new(|| Arc::new(PreferenceStore::in_memory()));

#[wasm_bindgen]
pub struct UnscrambleGame {
    inner: GameInstance,
}

#[wasm_bindgen]
impl UnscrambleGame {
    /// `config` may be `undefined` or `{ maxWords?, scoreIncrease? }`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<UnscrambleGame, JsError> {
        Self::create(config, RandomWordSource::new())
    }

    #[wasm_bindgen(js_name = withSeed)]
    pub fn with_seed(seed: u32, config: JsValue) -> Result<UnscrambleGame, JsError> {
        Self::create(config, RandomWordSource::seeded(u64::from(seed)))
    }

    #[wasm_bindgen(js_name = nextWord)]
    pub fn next_word(&mut self) -> bool {
        self.inner.advance_word()
    }

    #[wasm_bindgen(js_name = submitGuess)]
    pub fn submit_guess(&mut self, guess: &str) -> bool {
        self.inner.submit_guess(guess)
    }

    #[wasm_bindgen(js_name = skipWord)]
    pub fn skip_word(&mut self) -> bool {
        self.inner.skip_word()
    }

    pub fn restart(&mut self) -> bool {
        self.inner.restart()
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.inner.to_game_state())
            .map_err(|e| JsError::new(&format!("could not convert game state: {e}")))
    }

    #[wasm_bindgen(js_name = highScore)]
    pub fn high_score(&self) -> u32 {
        self.inner.high_score()
    }

    /// Checkpoint bytes for `restore`, e.g. kept in session storage.
    pub fn snapshot(&self) -> Result<Vec<u8>, JsError> {
        self.inner.snapshot().encode().map_err(|e| JsError::new(&e))
    }

    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), JsError> {
        let snapshot = GameSnapshot::decode(bytes).map_err(|e| JsError::new(&e))?;
        self.inner.restore(snapshot).map_err(|e| JsError::new(&e))
    }
}

impl UnscrambleGame {
    fn create(config: JsValue, source: impl WordSource + 'static) -> Result<Self, JsError> {
        let config = parse_config(config)?;
        let inner = GameInstance::new(
            config,
            Box::new(source),
            ScoreRepository::new(Arc::clone(&SHARED_PREFS)),
            Box::new(InlineExecutor),
        )
        .map_err(|e| JsError::new(&e))?;
        Ok(Self { inner })
    }
}

fn parse_config(value: JsValue) -> Result<GameConfig, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(GameConfig::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsError::new(&format!("invalid game config: {e}")))
}
