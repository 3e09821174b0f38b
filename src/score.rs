use std::sync::Arc;

use log::{debug, info};

use crate::observable::Observer;
use crate::prefs::PreferenceStore;
use crate::storage::StorageError;

pub const HIGH_SCORE_KEY: &str = "high_score";

/// Persists the best score ever reached.
///
/// The stored value only grows: [`ScoreRepository::update_score`] is a
/// compare-and-set-if-greater against the preference store.
#[derive(Clone)]
pub struct ScoreRepository {
    prefs: Arc<PreferenceStore>,
}

/// Live view of the persisted high score. Reads 0 while unset.
#[derive(Debug, Clone)]
pub struct HighScoreObserver {
    inner: Observer<Option<i64>>,
}

impl ScoreRepository {
    pub fn new(prefs: Arc<PreferenceStore>) -> Self {
        Self { prefs }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(PreferenceStore::in_memory()))
    }

    pub fn high_score(&self) -> Result<u32, StorageError> {
        Ok(to_score(self.prefs.get(HIGH_SCORE_KEY)?))
    }

    pub fn observe_high_score(&self) -> Result<HighScoreObserver, StorageError> {
        Ok(HighScoreObserver {
            inner: self.prefs.watch(HIGH_SCORE_KEY)?,
        })
    }

    /// Stores `candidate` if it beats the persisted score. Returns the high
    /// score after the update.
    pub fn update_score(&self, candidate: u32) -> Result<u32, StorageError> {
        let candidate = i64::from(candidate);
        let mut beaten = false;
        let stored = self.prefs.update(HIGH_SCORE_KEY, |current| {
            if candidate > current.unwrap_or(0) {
                beaten = true;
                Some(candidate)
            } else {
                current
            }
        })?;

        let high_score = to_score(stored);
        if beaten {
            info!("new high score: {high_score}");
        } else {
            debug!("score {candidate} does not beat high score {high_score}");
        }
        Ok(high_score)
    }
}

impl HighScoreObserver {
    pub fn get(&self) -> u32 {
        to_score(self.inner.get())
    }

    pub fn has_changed(&self) -> bool {
        self.inner.has_changed()
    }

    pub fn get_and_mark_seen(&mut self) -> u32 {
        to_score(self.inner.get_and_mark_seen())
    }

    pub async fn changed(&mut self) -> Option<u32> {
        self.inner.changed().await.map(to_score)
    }
}

fn to_score(stored: Option<i64>) -> u32 {
    stored
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn high_score_starts_at_zero() {
        let repo = ScoreRepository::in_memory();

        assert_eq!(repo.high_score().unwrap(), 0);
        assert_eq!(repo.observe_high_score().unwrap().get(), 0);
    }

    #[test]
    fn lower_score_does_not_replace_higher_one() {
        let repo = ScoreRepository::in_memory();

        assert_eq!(repo.update_score(5).unwrap(), 5);
        assert_eq!(repo.update_score(3).unwrap(), 5);

        assert_eq!(repo.high_score().unwrap(), 5);
    }

    #[test]
    fn equal_score_is_not_a_new_high_score() {
        let repo = ScoreRepository::in_memory();
        repo.update_score(40).unwrap();
        let observer = repo.observe_high_score().unwrap();

        repo.update_score(40).unwrap();

        assert!(!observer.has_changed());
    }

    #[test]
    fn observer_follows_new_high_scores() {
        let repo = ScoreRepository::in_memory();
        let mut observer = repo.observe_high_score().unwrap();

        repo.update_score(20).unwrap();
        assert_eq!(observer.get_and_mark_seen(), 20);

        repo.update_score(60).unwrap();
        assert!(observer.has_changed());
        assert_eq!(observer.get(), 60);
    }

    #[test]
    fn changed_yields_each_new_high_score() {
        let repo = ScoreRepository::in_memory();
        let mut observer = repo.observe_high_score().unwrap();

        repo.update_score(30).unwrap();
        assert_eq!(block_on(observer.changed()), Some(30));

        repo.update_score(10).unwrap();
        repo.update_score(50).unwrap();
        assert_eq!(block_on(observer.changed()), Some(50));
    }

    #[test]
    fn changed_returns_none_after_store_is_dropped() {
        let repo = ScoreRepository::in_memory();
        let mut observer = repo.observe_high_score().unwrap();

        drop(repo);

        assert_eq!(block_on(observer.changed()), None);
    }

    #[test]
    fn repositories_sharing_a_store_share_the_score() {
        let prefs = Arc::new(PreferenceStore::in_memory());
        let first = ScoreRepository::new(Arc::clone(&prefs));
        let second = ScoreRepository::new(prefs);

        first.update_score(80).unwrap();

        assert_eq!(second.high_score().unwrap(), 80);
    }
}
