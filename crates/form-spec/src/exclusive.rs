use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

/// CSS marker applied to a group while its none-token is selected.
pub const NONE_SELECTED_CLASS: &str = "has-none-selected";

/// Synthetic "none of the above" value for a checkbox group.
pub fn none_token(group: &str) -> String {
    format!("{group}_none")
}

/// Observable state of a managed checkbox group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupState {
    Unselected,
    NormalSelection(BTreeSet<String>),
    NoneSelected,
}

/// Presentation follow-up owed after a transition or re-render.
///
/// The protocol itself stays pure; a thin adapter applies these against
/// whatever node tree the rendering engine currently holds. They must be
/// re-applied on every re-render because the engine may recreate nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresentationEffect {
    AddMarkerClass { group: String, class: String },
    RemoveMarkerClass { group: String, class: String },
    DisableSiblings { group: String, none_token: String },
    EnableSiblings { group: String, none_token: String },
}

/// Result of intercepting a pending value change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueChange {
    pub committed: Vec<String>,
    pub effects: Vec<PresentationEffect>,
}

/// Mutual-exclusion protocol for one checkbox group with a synthetic
/// "none of the above" option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveGroup {
    name: String,
    none: String,
}

impl ExclusiveGroup {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let none = none_token(&name);
        Self { name, none }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn none_token(&self) -> &str {
        &self.none
    }

    /// Derives the group state from a committed value set.
    pub fn state_of(&self, value: &[String]) -> GroupState {
        if value.iter().any(|entry| entry == &self.none) {
            GroupState::NoneSelected
        } else if value.is_empty() {
            GroupState::Unselected
        } else {
            GroupState::NormalSelection(value.iter().cloned().collect())
        }
    }

    /// Intercepts a pending value change before it is committed.
    ///
    /// Runs synchronously in the same event turn as the triggering input;
    /// the returned `committed` value never mixes the none-token with other
    /// selections.
    pub fn intercept(&self, old_value: &[String], proposed: &[String]) -> ValueChange {
        let had_none = old_value.iter().any(|entry| entry == &self.none);
        let wants_none = proposed.iter().any(|entry| entry == &self.none);

        if wants_none && !had_none {
            // Selecting "none" discards every other selection.
            return ValueChange {
                committed: vec![self.none.clone()],
                effects: self.none_entered_effects(),
            };
        }

        if had_none && proposed.len() > 1 {
            // A normal option arrived while "none" was active: strip the token.
            return ValueChange {
                committed: proposed
                    .iter()
                    .filter(|entry| *entry != &self.none)
                    .cloned()
                    .collect(),
                effects: self.none_exited_effects(),
            };
        }

        if wants_none && proposed.len() > 1 {
            // Mixed set slipped through; collapse to the token.
            return ValueChange {
                committed: vec![self.none.clone()],
                effects: self.none_entered_effects(),
            };
        }

        ValueChange {
            committed: proposed.to_vec(),
            effects: Vec::new(),
        }
    }

    /// Effects to re-apply for an already-committed value, e.g. after the
    /// engine rebuilt the group's nodes.
    pub fn render_effects(&self, committed: &[String]) -> Vec<PresentationEffect> {
        if committed.iter().any(|entry| entry == &self.none) {
            self.none_entered_effects()
        } else {
            self.none_exited_effects()
        }
    }

    fn none_entered_effects(&self) -> Vec<PresentationEffect> {
        vec![
            PresentationEffect::AddMarkerClass {
                group: self.name.clone(),
                class: NONE_SELECTED_CLASS.into(),
            },
            PresentationEffect::DisableSiblings {
                group: self.name.clone(),
                none_token: self.none.clone(),
            },
        ]
    }

    fn none_exited_effects(&self) -> Vec<PresentationEffect> {
        vec![
            PresentationEffect::RemoveMarkerClass {
                group: self.name.clone(),
                class: NONE_SELECTED_CLASS.into(),
            },
            PresentationEffect::EnableSiblings {
                group: self.name.clone(),
                none_token: self.none.clone(),
            },
        ]
    }
}

/// Finds managed groups in a render schema: checkbox elements whose choices
/// include their own none-token.
pub fn managed_groups(schema: &Value) -> Vec<String> {
    let mut groups = Vec::new();
    if let Some(pages) = schema.get("pages").and_then(Value::as_array) {
        for page in pages {
            if let Some(elements) = page.get("elements").and_then(Value::as_array) {
                for element in elements {
                    collect_groups(element, &mut groups);
                }
            }
        }
    }
    groups
}

fn collect_groups(element: &Value, groups: &mut Vec<String>) {
    if let Some(children) = element.get("elements").and_then(Value::as_array) {
        for child in children {
            collect_groups(child, groups);
        }
    }

    if element.get("type").and_then(Value::as_str) != Some("checkbox") {
        return;
    }
    let Some(name) = element.get("name").and_then(Value::as_str) else {
        return;
    };
    let token = none_token(name);
    let has_token = element
        .get("choices")
        .and_then(Value::as_array)
        .is_some_and(|choices| {
            choices.iter().any(|choice| match choice {
                Value::String(value) => value == &token,
                other => other.get("value").and_then(Value::as_str) == Some(token.as_str()),
            })
        });
    if has_token {
        groups.push(name.to_string());
    }
}
