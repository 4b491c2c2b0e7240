//! Chronological record of the playthrough and the queue of pending consequences.

use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::entities::{ArcId, CharacterId, ConsequenceId};
use crate::mechanics::Importance;

/// What kind of thing a timeline entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimelineKind {
    ArcStarted,
    BeatTriggered,
    PhaseAdvanced,
    ArcCompleted,
    /// Reported by an off-screen simulation.
    Simulated,
    PlayerAction,
    Revelation,
    Death,
}

/// One entry in the chronological timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub day: u32,
    pub kind: TimelineKind,
    pub description: String,
    pub involved: Vec<CharacterId>,
    pub arc: Option<ArcId>,
    pub recorded_at: Timestamp,
}

impl TimelineEvent {
    pub fn new(day: u32, kind: TimelineKind, description: impl Into<String>) -> Self {
        Self {
            day,
            kind,
            description: description.into(),
            involved: Vec::new(),
            arc: None,
            recorded_at: Timestamp::now(),
        }
    }

    pub fn with_involved(mut self, involved: impl IntoIterator<Item = CharacterId>) -> Self {
        self.involved.extend(involved);
        self
    }

    pub fn with_arc(mut self, arc: ArcId) -> Self {
        self.arc = Some(arc);
        self
    }
}

/// Something the player did that the world may react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub day: u32,
    pub description: String,
    pub target: Option<CharacterId>,
    pub recorded_at: Timestamp,
}

/// A deferred effect that manifests on or after `manifest_day`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConsequence {
    pub id: ConsequenceId,
    pub description: String,
    /// What caused this consequence.
    pub source: String,
    pub severity: Importance,
    pub involved: Vec<CharacterId>,
    pub arc: Option<ArcId>,
    pub created_day: u32,
    pub manifest_day: u32,
}

impl PendingConsequence {
    pub fn new(
        description: impl Into<String>,
        source: impl Into<String>,
        created_day: u32,
        manifest_day: u32,
    ) -> Self {
        Self {
            id: ConsequenceId::new(),
            description: description.into(),
            source: source.into(),
            severity: Importance::Moderate,
            involved: Vec::new(),
            arc: None,
            created_day,
            manifest_day,
        }
    }

    pub fn with_severity(mut self, severity: Importance) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_involved(mut self, character: CharacterId) -> Self {
        if !self.involved.contains(&character) {
            self.involved.push(character);
        }
        self
    }

    pub fn with_arc(mut self, arc: ArcId) -> Self {
        self.arc = Some(arc);
        self
    }

    /// Whether the consequence has arrived by `day`.
    pub fn is_due(&self, day: u32) -> bool {
        self.manifest_day <= day
    }
}
