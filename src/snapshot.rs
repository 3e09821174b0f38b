use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::Phase;
use crate::words::{has_distinct_rearrangement, is_permutation};

const MAGIC: &[u8; 4] = b"UNSC";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 20;

/// Everything needed to bring a game back after the process is killed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub score: u32,
    pub word_count: u32,
    pub used_words: BTreeSet<String>,
    pub current_word: String,
    pub current_scrambled_word: String,
    pub phase: Phase,
}

impl GameSnapshot {
    /// Checks the invariants a live game maintains.
    pub fn validate(&self, max_words: u32) -> Result<(), String> {
        if self.word_count > max_words {
            return Err(format!(
                "word count {} exceeds the limit of {max_words}",
                self.word_count
            ));
        }
        if self.used_words.len() != self.word_count as usize {
            return Err(format!(
                "word count {} does not match {} used words",
                self.word_count,
                self.used_words.len()
            ));
        }

        // A game that found no word at all ends with nothing dealt.
        let nothing_dealt = self.phase == Phase::AwaitingWord
            || (self.phase == Phase::GameOver && self.word_count == 0);
        if nothing_dealt {
            if self.word_count != 0
                || self.score != 0
                || !self.used_words.is_empty()
                || !self.current_word.is_empty()
                || !self.current_scrambled_word.is_empty()
            {
                return Err(format!(
                    "a game in phase {:?} with no word dealt must be empty",
                    self.phase
                ));
            }
            return Ok(());
        }

        if !self.used_words.contains(&self.current_word) {
            return Err(format!(
                "current word {:?} is not among the used words",
                self.current_word
            ));
        }
        if !is_permutation(&self.current_scrambled_word, &self.current_word) {
            return Err("scrambled word is not a permutation of the current word".to_string());
        }
        if has_distinct_rearrangement(&self.current_word)
            && self.current_scrambled_word == self.current_word
        {
            return Err("scrambled word equals the current word".to_string());
        }
        Ok(())
    }

    /// Serializes into the checksummed envelope.
    ///
    /// Layout: magic, version, payload length, CRC32 of payload, reserved
    /// (all u32 LE after the magic), then the JSON payload.
    pub fn encode(&self) -> Result<Vec<u8>, String> {
        let payload =
            serde_json::to_vec(self).map_err(|e| format!("snapshot encode failed: {e}"))?;
        let payload_len = u32::try_from(payload.len())
            .map_err(|_| "snapshot payload too large".to_string())?;

        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&payload_len.to_le_bytes());
        out.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn decode(data: &[u8]) -> Result<Self, String> {
        if data.len() < HEADER_SIZE {
            return Err(format!(
                "snapshot too short: expected at least {HEADER_SIZE} bytes, got {}",
                data.len()
            ));
        }

        if &data[0..4] != MAGIC {
            return Err("invalid snapshot magic (expected UNSC)".to_string());
        }

        let version = read_u32_le(data, 4)?;
        if version != VERSION {
            return Err(format!(
                "unsupported snapshot version: expected {VERSION}, got {version}"
            ));
        }

        let payload_len = read_u32_le(data, 8)? as usize;
        let expected_crc = read_u32_le(data, 12)?;
        let payload = &data[HEADER_SIZE..];
        if payload.len() != payload_len {
            return Err(format!(
                "snapshot length mismatch: header says {payload_len} bytes, got {}",
                payload.len()
            ));
        }

        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            return Err(format!(
                "CRC32 mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}"
            ));
        }

        serde_json::from_slice(payload).map_err(|e| format!("snapshot payload is invalid: {e}"))
    }
}

fn read_u32_le(data: &[u8], offset: usize) -> Result<u32, String> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or_else(|| format!("unexpected EOF while reading u32 at offset {offset}"))?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_snapshot() -> GameSnapshot {
        GameSnapshot {
            score: 40,
            word_count: 3,
            used_words: ["cat", "moon", "pizza"].iter().map(|w| w.to_string()).collect(),
            current_word: "moon".to_string(),
            current_scrambled_word: "noom".to_string(),
            phase: Phase::WordActive,
        }
    }

    #[test]
    fn decode_reads_back_encoded_snapshot() {
        let snapshot = active_snapshot();

        let bytes = snapshot.encode().unwrap();

        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(GameSnapshot::decode(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn decode_rejects_invalid_magic() {
        let mut bytes = active_snapshot().encode().unwrap();
        bytes[0] = b'X';

        let err = GameSnapshot::decode(&bytes).unwrap_err();
        assert!(err.contains("magic"));
    }

    #[test]
    fn decode_rejects_unsupported_version() {
        let mut bytes = active_snapshot().encode().unwrap();
        bytes[4..8].copy_from_slice(&2u32.to_le_bytes());

        let err = GameSnapshot::decode(&bytes).unwrap_err();
        assert!(err.contains("version"));
    }

    #[test]
    fn decode_rejects_crc_mismatch() {
        let mut bytes = active_snapshot().encode().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        let err = GameSnapshot::decode(&bytes).unwrap_err();
        assert!(err.contains("CRC32"));
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let mut bytes = active_snapshot().encode().unwrap();
        bytes.pop();

        let err = GameSnapshot::decode(&bytes).unwrap_err();
        assert!(err.contains("length mismatch"));
    }

    #[test]
    fn decode_rejects_short_header() {
        let err = GameSnapshot::decode(b"UNSC").unwrap_err();
        assert!(err.contains("too short"));
    }

    #[test]
    fn validate_accepts_live_game() {
        assert!(active_snapshot().validate(10).is_ok());
    }

    #[test]
    fn validate_accepts_empty_awaiting_snapshot() {
        let snapshot = GameSnapshot {
            score: 0,
            word_count: 0,
            used_words: BTreeSet::new(),
            current_word: String::new(),
            current_scrambled_word: String::new(),
            phase: Phase::AwaitingWord,
        };

        assert!(snapshot.validate(10).is_ok());
    }

    #[test]
    fn validate_rejects_awaiting_snapshot_with_scrambled_text() {
        let snapshot = GameSnapshot {
            score: 500,
            word_count: 0,
            used_words: BTreeSet::new(),
            current_word: String::new(),
            current_scrambled_word: "zzz".to_string(),
            phase: Phase::AwaitingWord,
        };

        let err = snapshot.validate(10).unwrap_err();
        assert!(err.contains("must be empty"));
    }

    #[test]
    fn validate_rejects_awaiting_snapshot_with_score() {
        let snapshot = GameSnapshot {
            score: 20,
            word_count: 0,
            used_words: BTreeSet::new(),
            current_word: String::new(),
            current_scrambled_word: String::new(),
            phase: Phase::AwaitingWord,
        };

        assert!(snapshot.validate(10).is_err());
    }

    #[test]
    fn validate_accepts_game_over_before_any_word() {
        let snapshot = GameSnapshot {
            score: 0,
            word_count: 0,
            used_words: BTreeSet::new(),
            current_word: String::new(),
            current_scrambled_word: String::new(),
            phase: Phase::GameOver,
        };

        assert!(snapshot.validate(10).is_ok());
    }

    #[test]
    fn validate_rejects_word_count_over_limit() {
        let err = active_snapshot().validate(2).unwrap_err();
        assert!(err.contains("exceeds"));
    }

    #[test]
    fn validate_rejects_current_word_outside_used_words() {
        let mut snapshot = active_snapshot();
        snapshot.current_word = "noon".to_string();
        snapshot.current_scrambled_word = "onno".to_string();

        let err = snapshot.validate(10).unwrap_err();
        assert!(err.contains("not among the used words"));
    }

    #[test]
    fn validate_rejects_unscrambled_word() {
        let mut snapshot = active_snapshot();
        snapshot.current_scrambled_word = "moon".to_string();

        let err = snapshot.validate(10).unwrap_err();
        assert!(err.contains("equals"));
    }

    #[test]
    fn validate_rejects_foreign_letters() {
        let mut snapshot = active_snapshot();
        snapshot.current_scrambled_word = "mood".to_string();

        let err = snapshot.validate(10).unwrap_err();
        assert!(err.contains("permutation"));
    }
}
