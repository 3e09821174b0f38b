use wasm_bindgen::prelude::*;

pub mod executor;
pub mod game;
pub mod observable;
pub mod prefs;
pub mod score;
pub mod snapshot;
pub mod storage;
pub mod types;
pub mod wasm;
pub mod words;

pub use game::GameInstance;
pub use score::ScoreRepository;
pub use types::{GameConfig, GameState, Phase, ScrambledWord};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
