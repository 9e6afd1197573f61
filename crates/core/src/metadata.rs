// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Class metadata extracted from bytecode

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeSet;

/// A field declaration: name, type descriptor, and access flags.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldSig {
    pub name: SmolStr,
    pub descriptor: SmolStr,
    pub access_flags: u16,
}

/// A method declaration: name, type descriptor, and access flags.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: SmolStr,
    pub descriptor: SmolStr,
    pub access_flags: u16,
}

impl FieldSig {
    pub fn new(name: impl Into<SmolStr>, descriptor: impl Into<SmolStr>, access_flags: u16) -> Self {
        Self { name: name.into(), descriptor: descriptor.into(), access_flags }
    }
}

impl MethodSig {
    pub fn new(name: impl Into<SmolStr>, descriptor: impl Into<SmolStr>, access_flags: u16) -> Self {
        Self { name: name.into(), descriptor: descriptor.into(), access_flags }
    }
}

/// Structure extracted from one class artifact.
///
/// Interfaces are a set (declaration order is not significant for
/// redefinition); fields and methods keep their declared order.
/// Lifetime is one validation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMetadata {
    pub class_name: SmolStr,
    /// `None` only for the root of the class hierarchy.
    pub superclass: Option<SmolStr>,
    pub interfaces: BTreeSet<SmolStr>,
    pub fields: Vec<FieldSig>,
    pub methods: Vec<MethodSig>,
}

impl ClassMetadata {
    /// Signature set of all declared methods (name + descriptor).
    pub fn method_set(&self) -> BTreeSet<(&str, &str)> {
        self.methods.iter().map(|m| (m.name.as_str(), m.descriptor.as_str())).collect()
    }

    /// Signature set of all declared fields (name + descriptor).
    pub fn field_set(&self) -> BTreeSet<(&str, &str)> {
        self.fields.iter().map(|f| (f.name.as_str(), f.descriptor.as_str())).collect()
    }

    /// True when the declared schema (supertype, interfaces, fields, method
    /// signatures) is identical; method bodies may still differ.
    pub fn same_schema(&self, other: &ClassMetadata) -> bool {
        self.superclass == other.superclass
            && self.interfaces == other.interfaces
            && self.field_set() == other.field_set()
            && self.method_set() == other.method_set()
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
