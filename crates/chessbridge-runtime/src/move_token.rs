//! Coordinate move notation ("e2e4", "e7e8q")

use serde::{Serialize, Serializer};
use std::fmt;
use tracing::warn;

/// Token the engine uses for "no move"
pub const NO_MOVE: &str = "0000";

/// A move in long algebraic coordinate form
///
/// Always four or five characters: from-square, to-square and an optional
/// promotion piece. The "no move" sentinel is never a `MoveToken`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveToken(String);

impl MoveToken {
    /// Parse a token, returning `None` for the sentinel and malformed text
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if !(bytes.len() == 4 || bytes.len() == 5) {
            return None;
        }

        let file = |b: u8| (b'a'..=b'h').contains(&b);
        let rank = |b: u8| (b'1'..=b'8').contains(&b);
        if !(file(bytes[0]) && rank(bytes[1]) && file(bytes[2]) && rank(bytes[3])) {
            return None;
        }
        if bytes.len() == 5 && !matches!(bytes[4], b'q' | b'r' | b'b' | b'n') {
            return None;
        }

        Some(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_square(&self) -> &str {
        &self.0[..2]
    }

    pub fn to_square(&self) -> &str {
        &self.0[2..4]
    }

    pub fn promotion(&self) -> Option<char> {
        self.0.chars().nth(4)
    }
}

impl fmt::Display for MoveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MoveToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for MoveToken {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for MoveToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Interpret a best-move payload: the sentinel and malformed tokens are absent
pub fn parse_best_move(text: &str) -> Option<MoveToken> {
    let text = text.trim();
    if text == NO_MOVE || text.is_empty() {
        return None;
    }
    let token = MoveToken::parse(text);
    if token.is_none() {
        warn!(token = text, "engine returned a malformed best move");
    }
    token
}

/// Split a legal-move payload
///
/// Tokens are separated by runs of ASCII whitespace; empty tokens never
/// appear in the result. Malformed tokens are dropped.
pub fn parse_move_list(text: &str) -> Vec<MoveToken> {
    text.split_ascii_whitespace()
        .filter_map(|raw| {
            let token = MoveToken::parse(raw);
            if token.is_none() {
                warn!(token = raw, "dropping malformed token from legal move list");
            }
            token
        })
        .collect()
}
