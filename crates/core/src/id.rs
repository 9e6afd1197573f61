// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed identifiers
//!
//! Every identifier in the system is a fixed 4-character family tag
//! followed by a random suffix: `evt-` for events, `cor-` for correlations,
//! `swp-` for hot-swap requests, `wch-` for watch registrations. The tag
//! makes a bare id self-describing in log lines and journal records, and
//! the family marker type keeps an event id from being passed where a
//! correlation id belongs.

use std::marker::PhantomData;

/// Byte length of a generated id: 4-char tag + 19-char random suffix.
/// Ids fit inline, so they stay `Copy` and allocation-free.
pub const ID_LEN: usize = 23;

const SUFFIX_LEN: usize = 19;

/// One identifier family and its fixed tag.
///
/// Tags are exactly 4 ASCII bytes ending in `-`. Downstream crates may
/// declare their own families (the snapshot engine tags captured failures
/// with `err-`).
pub trait IdTag {
    const TAG: &'static str;
}

/// A tagged identifier, stored inline.
pub struct Id<K> {
    len: u8,
    bytes: [u8; ID_LEN],
    _family: PhantomData<K>,
}

impl<K: IdTag> Id<K> {
    /// Generate a fresh random id in this family.
    pub fn new() -> Self {
        Self::pack(&nanoid::nanoid!(SUFFIX_LEN))
    }

    /// Adopt an existing id string.
    ///
    /// A value without the family tag is treated as a bare suffix and
    /// tagged. Oversized values are cut at [`ID_LEN`]; generated ids never
    /// are, so this only debug-asserts.
    pub fn from_string(value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        Self::pack(value.strip_prefix(K::TAG).unwrap_or(value))
    }

    fn pack(suffix: &str) -> Self {
        debug_assert_eq!(K::TAG.len(), 4, "id tags are 4 ASCII bytes");
        debug_assert!(
            K::TAG.len() + suffix.len() <= ID_LEN,
            "id suffix exceeds {} bytes: {:?}",
            ID_LEN - K::TAG.len(),
            suffix,
        );
        let cut = clamp_to_char_boundary(suffix, ID_LEN - K::TAG.len());
        let mut bytes = [0u8; ID_LEN];
        bytes[..K::TAG.len()].copy_from_slice(K::TAG.as_bytes());
        bytes[K::TAG.len()..K::TAG.len() + cut.len()].copy_from_slice(cut.as_bytes());
        Self {
            len: (K::TAG.len() + cut.len()) as u8,
            bytes,
            _family: PhantomData,
        }
    }

    /// The random suffix truncated to at most `n` characters, for compact
    /// log lines.
    pub fn short(&self, n: usize) -> &str {
        let s = self.as_str();
        let suffix = s.strip_prefix(K::TAG).unwrap_or(s);
        clamp_to_char_boundary(suffix, n)
    }
}

impl<K: IdTag> Default for Id<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Id<K> {
    pub fn as_str(&self) -> &str {
        // Packed only from &str slices cut at char boundaries.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a
/// character.
fn clamp_to_char_boundary(s: &str, max: usize) -> &str {
    let mut end = s.len().min(max);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl<K> Clone for Id<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Id<K> {}

impl<K> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<K> Eq for Id<K> {}

impl<K> PartialEq<str> for Id<K> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<K> PartialEq<&str> for Id<K> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<K> std::hash::Hash for Id<K> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Hash the active bytes as str so Borrow<str> map lookups agree.
        self.as_str().hash(state);
    }
}

impl<K> std::borrow::Borrow<str> for Id<K> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<K> AsRef<str> for Id<K> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<K> std::fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<K> std::fmt::Display for Id<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<K> serde::Serialize for Id<K> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, K: IdTag> serde::Deserialize<'de> for Id<K> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.len() > ID_LEN {
            return Err(serde::de::Error::custom(format!(
                "id exceeds {ID_LEN} bytes: {s:?}"
            )));
        }
        Ok(Self::from_string(s))
    }
}

// ── The pipeline's identifier families ──────────────────────────────────

pub enum EventTag {}

impl IdTag for EventTag {
    const TAG: &'static str = "evt-";
}

/// Unique identifier of one appended event.
pub type EventId = Id<EventTag>;

pub enum CorrelationTag {}

impl IdTag for CorrelationTag {
    const TAG: &'static str = "cor-";
}

/// Groups every event causally descended from one originating trigger.
pub type CorrelationId = Id<CorrelationTag>;

pub enum SwapRequestTag {}

impl IdTag for SwapRequestTag {
    const TAG: &'static str = "swp-";
}

/// Identifier for one hot-swap request.
pub type SwapRequestId = Id<SwapRequestTag>;

pub enum WatchTag {}

impl IdTag for WatchTag {
    const TAG: &'static str = "wch-";
}

/// Identifier for one directory-watch registration.
pub type WatchId = Id<WatchTag>;

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
