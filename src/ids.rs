//! Window and document identifiers.
//!
//! A satellite window id is `w` followed by 12 characters drawn from
//! `[0-9a-z]`, giving a keyspace of 36^12 (about 4.7e18). Ids are never
//! checked for collisions: with a handful of windows per session the odds
//! are negligible. The main window is identified by the empty id.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const WINDOW_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const WINDOW_ID_LEAD: char = 'w';
const WINDOW_ID_RANDOM_LEN: usize = 12;

/// Identifier of a source window. Empty means the main window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    /// Total length of a generated satellite id
    pub const GENERATED_LEN: usize = 1 + WINDOW_ID_RANDOM_LEN;

    /// The main window's id
    pub fn main() -> Self {
        Self(String::new())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh satellite id using the thread-local RNG
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate a fresh satellite id from the given RNG
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut id = String::with_capacity(Self::GENERATED_LEN);
        id.push(WINDOW_ID_LEAD);
        for _ in 0..WINDOW_ID_RANDOM_LEN {
            let idx = rng.gen_range(0..WINDOW_ID_ALPHABET.len());
            id.push(WINDOW_ID_ALPHABET[idx] as char);
        }
        Self(id)
    }

    /// Recover the id from a satellite window name.
    ///
    /// Names without the prefix belong to the main window.
    pub fn from_window_name(prefix: &str, name: &str) -> Self {
        match name.strip_prefix(prefix) {
            Some(id) => Self(id.to_string()),
            None => Self::main(),
        }
    }

    /// Build the satellite window name for this id
    pub fn window_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.0)
    }

    pub fn is_main(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_main() {
            write!(f, "<main>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for WindowId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WindowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of an open document, stable for the document's lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
