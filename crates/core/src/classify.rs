// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change and error classifications

use serde::{Deserialize, Serialize};

/// How a proposed bytecode change relates to the loaded definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeClassification {
    /// Only executable bodies of existing methods changed.
    MethodBodyOnly,
    /// New methods were added; nothing existing changed or disappeared.
    SafeAdditive,
    /// Fields, signatures, supertype, or interfaces changed.
    SchemaIncompatible,
    /// Could not be decided (original unknown, unparseable input).
    Unknown,
}

crate::wire_names! {
    ChangeClassification {
        MethodBodyOnly => "method-body-only",
        SafeAdditive => "safe-additive",
        SchemaIncompatible => "schema-incompatible",
        Unknown => "unknown",
    }
}

impl ChangeClassification {
    /// Whether the platform may be asked to redefine with this change.
    ///
    /// `SafeAdditive` is eligible only when the platform permits additive
    /// redefinition.
    pub fn eligible(self, allow_additive: bool) -> bool {
        match self {
            ChangeClassification::MethodBodyOnly => true,
            ChangeClassification::SafeAdditive => allow_additive,
            ChangeClassification::SchemaIncompatible | ChangeClassification::Unknown => false,
        }
    }

    /// Of two classifications, the one that restricts redefinition more.
    ///
    /// A definite schema incompatibility outranks an undecided change.
    pub fn more_restrictive(self, other: ChangeClassification) -> ChangeClassification {
        fn rank(c: ChangeClassification) -> u8 {
            match c {
                ChangeClassification::MethodBodyOnly => 0,
                ChangeClassification::SafeAdditive => 1,
                ChangeClassification::Unknown => 2,
                ChangeClassification::SchemaIncompatible => 3,
            }
        }
        if rank(other) > rank(self) {
            other
        } else {
            self
        }
    }
}

/// Failure classification attached to captured errors.
///
/// Derived deterministically from an error's kind and message; see the
/// snapshot engine for the ordered rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorClass {
    HotSwapFailure,
    TypeMismatch,
    NullReference,
    InvalidState,
    IoFailure,
    Unknown,
}

crate::wire_names! {
    ErrorClass {
        HotSwapFailure => "HOT_SWAP_FAILURE",
        TypeMismatch => "TYPE_MISMATCH",
        NullReference => "NULL_REFERENCE",
        InvalidState => "INVALID_STATE",
        IoFailure => "IO_FAILURE",
        Unknown => "UNKNOWN",
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
