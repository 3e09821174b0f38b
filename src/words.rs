use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Built-in dictionary. Lowercase, no duplicates.
pub const WORDS: &[&str] = &[
    "animal", "auto", "anecdote", "alphabet", "all", "awesome", "arise", "balloon", "basket",
    "bench", "best", "birthday", "book", "briefcase", "camera", "camping", "candle", "cat",
    "cauliflower", "chat", "children", "class", "classic", "classroom", "coffee", "colorful",
    "cookie", "creative", "cruise", "dance", "daytime", "dinosaur", "doorknob", "dine", "dream",
    "dusk", "eating", "elephant", "emerald", "eerie", "electric", "finish", "flowers", "follow",
    "fox", "frame", "free", "frequent", "funnel", "green", "guitar", "grocery", "glass", "great",
    "giggle", "haircut", "half", "homemade", "happen", "honey", "hurry", "hundred", "ice",
    "igloo", "invest", "invite", "icon", "introduce", "joke", "jovial", "journal", "jump", "join",
    "kangaroo", "keyboard", "kitchen", "koala", "kind", "kaleidoscope", "landscape", "late",
    "laugh", "learning", "lemon", "letter", "lily", "magazine", "marine", "marshmallow", "maze",
    "meditate", "melody", "minute", "monument", "moon", "motorcycle", "mountain", "music",
    "north", "nose", "night", "name", "never", "negotiate", "number", "opposite", "octopus",
    "oak", "order", "open", "polar", "pack", "painting", "person", "picnic", "pillow", "pizza",
    "podcast", "presentation", "puppy", "puzzle", "recipe", "release", "restaurant", "revolve",
    "rewind", "room", "run", "secret", "seed", "ship", "shirt", "should", "small", "spaceship",
    "stargazing", "skill", "street", "style", "sunrise", "taxi", "tidy", "timer", "together",
    "tooth", "tourist", "travel", "truck", "under", "useful", "unicorn", "unique", "uplift",
    "uniform", "vase", "violin", "visitor", "vision", "volume", "view", "walrus", "wander",
    "world", "winter", "well", "whirlwind", "x-ray", "xylophone", "yoga", "yogurt", "yoyo",
    "you", "year", "yummy", "zebra", "zigzag", "zoology", "zone", "zeal",
];

/// Source of randomness for dealing words.
pub trait WordSource: Send {
    /// Picks one index into `candidates`; `None` when it is empty.
    fn pick(&mut self, candidates: &[&str]) -> Option<usize>;
    fn shuffle(&mut self, letters: &mut [char]);
}

/// Uniform picks and shuffles from a [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandomWordSource {
    rng: StdRng,
}

impl RandomWordSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence of words and scrambles.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomWordSource {
    fn default() -> Self {
        Self::new()
    }
}

impl WordSource for RandomWordSource {
    fn pick(&mut self, candidates: &[&str]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        Some(self.rng.gen_range(0..candidates.len()))
    }

    fn shuffle(&mut self, letters: &mut [char]) {
        letters.shuffle(&mut self.rng);
    }
}

/// `true` when some ordering of the letters differs from `word`.
pub fn has_distinct_rearrangement(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => chars.any(|c| c != first),
        None => false,
    }
}

/// Shuffles `word` until the result differs from it.
///
/// Words without a distinct rearrangement ("", "a", "zz") come back unchanged.
pub fn scramble(word: &str, source: &mut dyn WordSource) -> String {
    if !has_distinct_rearrangement(word) {
        return word.to_string();
    }

    let mut letters: Vec<char> = word.chars().collect();
    loop {
        source.shuffle(&mut letters);
        let candidate: String = letters.iter().collect();
        if candidate != word {
            return candidate;
        }
    }
}

/// Whether `a` and `b` use exactly the same letters.
pub fn is_permutation(a: &str, b: &str) -> bool {
    let mut left: Vec<char> = a.chars().collect();
    let mut right: Vec<char> = b.chars().collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Always picks the first candidate. Leaves letters untouched for the
    /// first `identity_shuffles` calls, then reverses them.
    struct ScriptedSource {
        identity_shuffles: usize,
        shuffles: usize,
    }

    impl WordSource for ScriptedSource {
        fn pick(&mut self, candidates: &[&str]) -> Option<usize> {
            if candidates.is_empty() { None } else { Some(0) }
        }

        fn shuffle(&mut self, letters: &mut [char]) {
            self.shuffles += 1;
            if self.shuffles > self.identity_shuffles {
                letters.reverse();
            }
        }
    }

    #[test]
    fn word_list_is_lowercase_and_unique() {
        let unique: HashSet<&str> = WORDS.iter().copied().collect();

        assert_eq!(unique.len(), WORDS.len());
        assert!(WORDS.iter().all(|w| w.to_lowercase() == *w));
        assert!(WORDS.iter().all(|w| has_distinct_rearrangement(w)));
    }

    #[test]
    fn scramble_retries_until_result_differs() {
        let mut source = ScriptedSource {
            identity_shuffles: 3,
            shuffles: 0,
        };

        let scrambled = scramble("cat", &mut source);

        assert_eq!(scrambled, "tac");
        assert_eq!(source.shuffles, 4);
    }

    #[test]
    fn scramble_skips_words_without_rearrangement() {
        let mut source = ScriptedSource {
            identity_shuffles: usize::MAX,
            shuffles: 0,
        };

        assert_eq!(scramble("a", &mut source), "a");
        assert_eq!(scramble("zz", &mut source), "zz");
        assert_eq!(scramble("", &mut source), "");
        assert_eq!(source.shuffles, 0);
    }

    #[test]
    fn random_scrambles_are_permutations_that_differ() {
        let mut source = RandomWordSource::seeded(7);

        for word in WORDS {
            let scrambled = scramble(word, &mut source);
            assert_ne!(scrambled, *word);
            assert!(is_permutation(&scrambled, word), "{scrambled} vs {word}");
        }
    }

    #[test]
    fn seeded_sources_repeat_their_picks() {
        let mut a = RandomWordSource::seeded(42);
        let mut b = RandomWordSource::seeded(42);

        for _ in 0..20 {
            assert_eq!(a.pick(WORDS), b.pick(WORDS));
        }
        assert_eq!(a.pick(&[]), None);
    }

    #[test]
    fn is_permutation_compares_letter_multisets() {
        assert!(is_permutation("listen", "silent"));
        assert!(!is_permutation("apple", "appel "));
        assert!(!is_permutation("aab", "abb"));
    }
}
