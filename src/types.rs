use serde::{Deserialize, Serialize};

pub const MAX_WORDS: u32 = 10;
pub const SCORE_INCREASE: u32 = 20;

/// Tunables for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Words dealt before the game is over.
    pub max_words: u32,
    /// Points awarded for each correct guess.
    pub score_increase: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_words: MAX_WORDS,
            score_increase: SCORE_INCREASE,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_words == 0 {
            return Err("max_words must be at least 1".to_string());
        }
        if self.score_increase == 0 {
            return Err("score_increase must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    AwaitingWord,
    WordActive,
    Correct,
    Incorrect,
    GameOver,
}

impl Phase {
    /// Whether a guess can still be scored against the current word.
    pub fn accepts_guess(self) -> bool {
        matches!(self, Phase::WordActive | Phase::Incorrect)
    }
}

/// The scrambled word as shown, plus a spelled-out form for read-aloud.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrambledWord {
    pub text: String,
    /// Letters separated by spaces so a screen reader spells them out.
    pub spoken: String,
}

impl ScrambledWord {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let spoken = text
            .chars()
            .map(String::from)
            .collect::<Vec<_>>()
            .join(" ");
        Self { text, spoken }
    }
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub score: u32,
    pub word_count: u32,
    pub max_words: u32,
    pub scrambled_word: ScrambledWord,
    pub phase: Phase,
    pub is_game_over: bool,
    pub high_score: u32,
}
