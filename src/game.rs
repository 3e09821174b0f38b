use std::collections::BTreeSet;

use log::{debug, warn};

use crate::executor::{BackgroundExecutor, default_executor};
use crate::observable::{Observable, Observer};
use crate::score::{HighScoreObserver, ScoreRepository};
use crate::snapshot::GameSnapshot;
use crate::storage::StorageError;
use crate::types::{GameConfig, GameState, Phase, ScrambledWord};
use crate::words::{RandomWordSource, WORDS, WordSource, scramble};

/// One game session: deals scrambled words, checks guesses and keeps score.
///
/// Score, word count and scrambled word are published through observables;
/// the high score lives in the [`ScoreRepository`].
pub struct GameInstance {
    config: GameConfig,
    dictionary: Vec<String>,
    score: Observable<u32>,
    word_count: Observable<u32>,
    scrambled_word: Observable<ScrambledWord>,
    used_words: BTreeSet<String>,
    current_word: String,
    phase: Phase,
    source: Box<dyn WordSource>,
    scores: ScoreRepository,
    executor: Box<dyn BackgroundExecutor>,
}

impl GameInstance {
    pub fn new(
        config: GameConfig,
        source: Box<dyn WordSource>,
        scores: ScoreRepository,
        executor: Box<dyn BackgroundExecutor>,
    ) -> Result<Self, String> {
        config.validate()?;
        Ok(Self::build(config, source, scores, executor))
    }

    pub fn new_with_defaults(scores: ScoreRepository) -> Self {
        Self::build(
            GameConfig::default(),
            Box::new(RandomWordSource::new()),
            scores,
            default_executor(),
        )
    }

    fn build(
        config: GameConfig,
        source: Box<dyn WordSource>,
        scores: ScoreRepository,
        executor: Box<dyn BackgroundExecutor>,
    ) -> Self {
        Self {
            config,
            dictionary: WORDS.iter().map(|w| w.to_string()).collect(),
            score: Observable::new(0),
            word_count: Observable::new(0),
            scrambled_word: Observable::default(),
            used_words: BTreeSet::new(),
            current_word: String::new(),
            phase: Phase::AwaitingWord,
            source,
            scores,
            executor,
        }
    }

    /// Replaces the built-in word list. Words are trimmed, lowercased and
    /// deduplicated; blank entries are dropped.
    pub fn with_dictionary<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        self.dictionary = unique.into_iter().collect();
        self
    }

    /// Deals the next unused word. Returns `false` once the game is over.
    pub fn advance_word(&mut self) -> bool {
        if self.word_count.get() >= self.config.max_words {
            return self.finish();
        }

        let candidates: Vec<&str> = self
            .dictionary
            .iter()
            .map(String::as_str)
            .filter(|w| !self.used_words.contains(*w))
            .collect();
        let Some(word) = self
            .source
            .pick(&candidates)
            .and_then(|idx| candidates.get(idx))
            .map(|w| w.to_string())
        else {
            debug!("dictionary exhausted after {} words", self.used_words.len());
            return self.finish();
        };

        let scrambled = scramble(&word, self.source.as_mut());
        self.used_words.insert(word.clone());
        self.current_word = word;
        self.phase = Phase::WordActive;
        self.word_count.set(self.word_count.get() + 1);
        self.scrambled_word.set(ScrambledWord::new(scrambled));
        debug!("dealt word {}/{}", self.word_count.get(), self.config.max_words);
        true
    }

    /// Checks `guess` against the current word, ignoring case.
    pub fn submit_guess(&mut self, guess: &str) -> bool {
        if !self.phase.accepts_guess() {
            debug!("guess ignored in phase {:?}", self.phase);
            return false;
        }

        if guess.to_lowercase() != self.current_word.to_lowercase() {
            self.phase = Phase::Incorrect;
            return false;
        }

        let score = self.score.get().saturating_add(self.config.score_increase);
        self.score.set(score);
        self.phase = Phase::Correct;
        self.schedule_high_score_update(score);
        true
    }

    /// Drops the current word without scoring and deals the next one.
    pub fn skip_word(&mut self) -> bool {
        self.advance_word()
    }

    pub fn restart(&mut self) -> bool {
        self.score.set(0);
        self.word_count.set(0);
        self.used_words.clear();
        self.current_word.clear();
        self.scrambled_word.set(ScrambledWord::default());
        self.phase = Phase::AwaitingWord;
        self.advance_word()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            score: self.score.get(),
            word_count: self.word_count.get(),
            used_words: self.used_words.clone(),
            current_word: self.current_word.clone(),
            current_scrambled_word: self.scrambled_word.get().text,
            phase: self.phase,
        }
    }

    /// Replaces the session with `snapshot`. Leaves the game untouched when
    /// the snapshot is inconsistent.
    pub fn restore(&mut self, snapshot: GameSnapshot) -> Result<(), String> {
        snapshot.validate(self.config.max_words)?;
        if snapshot.phase == Phase::GameOver && snapshot.word_count < self.config.max_words {
            let unused = self
                .dictionary
                .iter()
                .find(|w| !snapshot.used_words.contains(*w));
            if let Some(word) = unused {
                return Err(format!(
                    "game over after {} words while {word:?} was still unused",
                    snapshot.word_count
                ));
            }
        }

        self.used_words = snapshot.used_words;
        self.current_word = snapshot.current_word;
        self.phase = snapshot.phase;
        self.score.set(snapshot.score);
        self.word_count.set(snapshot.word_count);
        self.scrambled_word.set(ScrambledWord::new(snapshot.current_scrambled_word));
        debug!("restored game at word {}", snapshot.word_count);
        Ok(())
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.score.get()
    }

    pub fn word_count(&self) -> u32 {
        self.word_count.get()
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn scrambled_word(&self) -> ScrambledWord {
        self.scrambled_word.get()
    }

    pub fn used_words(&self) -> &BTreeSet<String> {
        &self.used_words
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Persisted high score; 0 when the store cannot be read.
    pub fn high_score(&self) -> u32 {
        self.scores.high_score().unwrap_or_else(|e| {
            warn!("could not read high score: {e}");
            0
        })
    }

    pub fn observe_score(&self) -> Observer<u32> {
        self.score.subscribe()
    }

    pub fn observe_word_count(&self) -> Observer<u32> {
        self.word_count.subscribe()
    }

    pub fn observe_scrambled_word(&self) -> Observer<ScrambledWord> {
        self.scrambled_word.subscribe()
    }

    pub fn observe_high_score(&self) -> Result<HighScoreObserver, StorageError> {
        self.scores.observe_high_score()
    }

    pub fn to_game_state(&self) -> GameState {
        GameState {
            score: self.score(),
            word_count: self.word_count(),
            max_words: self.config.max_words,
            scrambled_word: self.scrambled_word(),
            phase: self.phase,
            is_game_over: self.is_game_over(),
            high_score: self.high_score(),
        }
    }

    fn finish(&mut self) -> bool {
        if self.phase != Phase::GameOver {
            debug!("game over with score {}", self.score.get());
        }
        self.phase = Phase::GameOver;
        false
    }

    fn schedule_high_score_update(&self, score: u32) {
        let scores = self.scores.clone();
        self.executor.spawn(Box::new(move || {
            if let Err(e) = scores.update_score(score) {
                warn!("high score update dropped: {e}");
            }
        }));
    }
}
