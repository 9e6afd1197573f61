// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change validation: is the proposed bytecode redefinable?

use bh_core::{ChangeClassification, ClassMetadata};

/// Validator policy knobs.
///
/// `allow_additive` reflects whether the platform accepts added methods;
/// the default platform primitive replaces method bodies only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationPolicy {
    pub allow_additive: bool,
}

/// The validator's verdict on one proposed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub classification: ChangeClassification,
    pub safe: bool,
    pub detail: String,
}

/// Classify an original→new transition.
///
/// Deterministic: identical inputs always produce identical classifications.
/// When both structural and body changes are present the more restrictive
/// classification wins; that falls out of checking structure first.
pub fn classify_change(
    original: Option<&ClassMetadata>,
    new: &ClassMetadata,
) -> ChangeClassification {
    let Some(original) = original else {
        return ChangeClassification::Unknown;
    };

    if original.class_name != new.class_name
        || original.superclass != new.superclass
        || original.interfaces != new.interfaces
        || original.field_set() != new.field_set()
    {
        return ChangeClassification::SchemaIncompatible;
    }

    let old_methods = original.method_set();
    let new_methods = new.method_set();
    if old_methods == new_methods {
        return ChangeClassification::MethodBodyOnly;
    }
    if old_methods.is_subset(&new_methods) {
        // Existing signatures intact; only additions remain.
        return ChangeClassification::SafeAdditive;
    }
    ChangeClassification::SchemaIncompatible
}

/// Run the full validation and produce a verdict with human detail.
pub fn validate(
    policy: ValidationPolicy,
    original: Option<&ClassMetadata>,
    new: &ClassMetadata,
) -> Validation {
    let classification = classify_change(original, new);
    let safe = classification.eligible(policy.allow_additive);
    let detail = match classification {
        ChangeClassification::MethodBodyOnly => {
            "method bodies only; signatures, fields, supertype, and interfaces unchanged"
                .to_string()
        }
        ChangeClassification::SafeAdditive if safe => {
            "methods added; existing declarations unchanged".to_string()
        }
        ChangeClassification::SafeAdditive => {
            "Schema change: methods added and the platform does not permit additive redefinition"
                .to_string()
        }
        ChangeClassification::SchemaIncompatible => {
            format!("Schema change: {}", schema_difference(original, new))
        }
        ChangeClassification::Unknown => {
            "original definition unknown; cannot prove the change is body-only".to_string()
        }
    };
    Validation { classification, safe, detail }
}

/// First structural difference, for rejection detail.
fn schema_difference(original: Option<&ClassMetadata>, new: &ClassMetadata) -> String {
    let Some(original) = original else {
        return "original definition unknown".to_string();
    };
    if original.class_name != new.class_name {
        return format!("class renamed {} -> {}", original.class_name, new.class_name);
    }
    if original.superclass != new.superclass {
        return "superclass differs".to_string();
    }
    if original.interfaces != new.interfaces {
        return "interface set differs".to_string();
    }
    if original.field_set() != new.field_set() {
        return "field set differs".to_string();
    }
    "method signatures removed or altered".to_string()
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
