//! Negative list (deny-list) filtering of winning matches.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::entity::EntityType;

/// A single deny rule.
///
/// With a type, the rule denies the text only for that entity type; without
/// one, it denies the text unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativeListEntry {
    /// Covered text to deny (exact-case)
    pub text: String,
    /// Restrict the rule to one entity type, or deny for all types
    pub entity_type: Option<EntityType>,
}

impl NegativeListEntry {
    /// Deny `text` for every entity type.
    #[must_use]
    pub fn unqualified(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entity_type: None,
        }
    }

    /// Deny `text` only when tagged as `entity_type`.
    #[must_use]
    pub fn qualified(text: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            text: text.into(),
            entity_type: Some(entity_type),
        }
    }
}

/// Compiled deny set.
///
/// Qualified rules are stored as `text@TYPE` keys, unqualified rules as bare
/// text. Lookup checks the qualified key first and falls through to the bare
/// key. Denial is an expected filtering outcome and is applied silently.
#[derive(Debug, Clone, Default)]
pub struct NegativeList {
    keys: HashSet<String>,
}

impl NegativeList {
    /// Compile a deny set from configured entries.
    #[must_use]
    pub fn new(entries: &[NegativeListEntry]) -> Self {
        let keys = entries
            .iter()
            .map(|e| match &e.entity_type {
                Some(ty) => format!("{}@{}", e.text, ty.as_label()),
                None => e.text.clone(),
            })
            .collect();
        Self { keys }
    }

    /// Check whether a match's covered text is denied for its type.
    #[must_use]
    pub fn is_denied(&self, text: &str, entity_type: &EntityType) -> bool {
        if self.keys.is_empty() {
            return false;
        }
        self.keys
            .contains(&format!("{}@{}", text, entity_type.as_label()))
            || self.keys.contains(text)
    }

    /// Number of compiled deny rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the deny set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
