//! Payload types coming back from the external completion service.
//!
//! The caller parses the model's reply into these types before handing it to
//! the result processor. Every optional field defaults, so a sparse reply
//! never fails to deserialize.

use serde::{Deserialize, Serialize};
use story_state::{EmotionalState, Importance, MetricDelta};

/// Everything a simulated time-jump produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationResult {
    pub events: Vec<SimEvent>,
    pub npc_changes: Vec<NpcChange>,
}

impl SimulationResult {
    /// Parse a model reply, tolerating a surrounding Markdown code fence.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let body = text.trim();
        let body = body
            .strip_prefix("```json")
            .or_else(|| body.strip_prefix("```"))
            .and_then(|rest| rest.trim_end().strip_suffix("```"))
            .unwrap_or(body);
        serde_json::from_str(body.trim())
    }
}

/// Something that happened off-screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimEvent {
    pub description: String,
    /// Display names of the characters involved.
    pub involved: Vec<String>,
    pub importance: Option<Importance>,
}

impl SimEvent {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_involved(mut self, name: impl Into<String>) -> Self {
        self.involved.push(name.into());
        self
    }
}

/// How one NPC changed during the time-jump.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcChange {
    /// Display name, matched case-insensitively.
    pub name: String,
    /// Change in how this NPC regards the player, or `toward` if set.
    pub relationship: Option<MetricDelta>,
    /// Another NPC the relationship change is aimed at.
    pub toward: Option<String>,
    pub died: bool,
    /// Free-text summary, scanned for death mentions.
    pub note: Option<String>,
    /// Things the NPC found out, as plain text.
    pub learned: Vec<String>,
    /// New mood as free text, classified on arrival.
    pub emotional_state: Option<String>,
}

impl NpcChange {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_relationship(mut self, delta: MetricDelta) -> Self {
        self.relationship = Some(delta);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_learned(mut self, text: impl Into<String>) -> Self {
        self.learned.push(text.into());
        self
    }

    /// The classified mood, if one was reported.
    pub fn mood(&self) -> Option<EmotionalState> {
        self.emotional_state
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(EmotionalState::from_text)
    }
}
