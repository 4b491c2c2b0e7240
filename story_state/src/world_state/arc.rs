//! Story arcs and their beats.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::{ArcId, BeatId, CharacterId, FactId};
use crate::mechanics::{ArcCategory, ArcPhase, ArcRole, BeatType, PlayerInvolvement};

/// Condition under which a beat may fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BeatTrigger {
    /// At least `days` days after the arc started.
    DayElapsed { days: u32 },
    /// Once the playthrough has seen `count` messages.
    MessageCount { count: u32 },
    /// Once arc or global tension reaches `tension`.
    TensionThreshold { tension: f32 },
    /// When the player does something matching `keyword`.
    PlayerAction { keyword: String },
    /// Fires with `probability` per opportunity.
    Random { probability: f32 },
}

impl BeatTrigger {
    /// Whether NPCs can bring this beat about without the player.
    pub fn is_npc_triggerable(&self) -> bool {
        !matches!(self, BeatTrigger::PlayerAction { .. })
    }
}

/// An atomic plot event inside one arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryBeat {
    pub id: BeatId,
    pub beat_type: BeatType,
    pub phase: ArcPhase,
    /// Content with participant names already substituted.
    pub content: String,
    pub trigger: BeatTrigger,
    /// 1 - 10, higher beats are more important.
    pub weight: u8,
    pub triggered: bool,
    pub triggered_day: Option<u32>,
    pub prerequisites: Vec<BeatId>,
}

/// A generated multi-beat plot thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryArc {
    pub id: ArcId,
    /// Template the arc was built from.
    pub template_id: String,
    pub category: ArcCategory,
    pub title: String,
    pub premise: String,
    pub participants: BTreeMap<CharacterId, ArcRole>,
    pub phase: ArcPhase,
    pub beats: Vec<StoryBeat>,
    /// 0 - 100.
    pub tension: f32,
    pub involvement: PlayerInvolvement,
    pub is_main: bool,
    pub parent: Option<ArcId>,
    pub children: Vec<ArcId>,
    pub facts: Vec<FactId>,
    pub started_day: u32,
    pub completed_day: Option<u32>,
}

impl StoryArc {
    pub fn beat(&self, id: BeatId) -> Option<&StoryBeat> {
        self.beats.iter().find(|b| b.id == id)
    }

    pub fn role_of(&self, character: CharacterId) -> Option<ArcRole> {
        self.participants.get(&character).copied()
    }

    pub fn involves(&self, character: CharacterId) -> bool {
        self.participants.contains_key(&character)
    }

    /// Characters holding a given role.
    pub fn in_role(&self, role: ArcRole) -> Vec<CharacterId> {
        self.participants
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Whether every prerequisite of the beat has fired.
    pub fn prerequisites_met(&self, beat: &StoryBeat) -> bool {
        beat.prerequisites
            .iter()
            .all(|id| self.beat(*id).map(|b| b.triggered).unwrap_or(true))
    }

    /// Beats that have not fired but whose prerequisites have.
    pub fn ready_beats(&self) -> impl Iterator<Item = &StoryBeat> {
        self.beats
            .iter()
            .filter(move |b| !b.triggered && self.prerequisites_met(b))
    }

    /// Fraction of the beats in `phase` that have fired. A phase with no
    /// beats counts as finished.
    pub fn phase_progress(&self, phase: ArcPhase) -> f32 {
        let (total, fired) = self
            .beats
            .iter()
            .filter(|b| b.phase == phase)
            .fold((0u32, 0u32), |(t, f), b| (t + 1, f + b.triggered as u32));
        if total == 0 {
            1.0
        } else {
            fired as f32 / total as f32
        }
    }

    /// Fraction of all beats that have fired.
    pub fn total_progress(&self) -> f32 {
        if self.beats.is_empty() {
            return 1.0;
        }
        let fired = self.beats.iter().filter(|b| b.triggered).count();
        fired as f32 / self.beats.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(phase: ArcPhase, triggered: bool, prerequisites: Vec<BeatId>) -> StoryBeat {
        StoryBeat {
            id: BeatId::new(),
            beat_type: BeatType::Revelation,
            phase,
            content: "something happens".to_string(),
            trigger: BeatTrigger::DayElapsed { days: 1 },
            weight: 5,
            triggered,
            triggered_day: triggered.then_some(1),
            prerequisites,
        }
    }

    fn arc(beats: Vec<StoryBeat>) -> StoryArc {
        StoryArc {
            id: ArcId::new(),
            template_id: "test".to_string(),
            category: ArcCategory::Mystery,
            title: "Test".to_string(),
            premise: String::new(),
            participants: BTreeMap::new(),
            phase: ArcPhase::Setup,
            beats,
            tension: 30.0,
            involvement: PlayerInvolvement::Observer,
            is_main: false,
            parent: None,
            children: Vec::new(),
            facts: Vec::new(),
            started_day: 0,
            completed_day: None,
        }
    }

    #[test]
    fn test_phase_progress() {
        let a = arc(vec![
            beat(ArcPhase::Setup, true, vec![]),
            beat(ArcPhase::Setup, false, vec![]),
            beat(ArcPhase::Rising, false, vec![]),
        ]);
        assert!((a.phase_progress(ArcPhase::Setup) - 0.5).abs() < 1e-6);
        assert_eq!(a.phase_progress(ArcPhase::Rising), 0.0);
        assert_eq!(a.phase_progress(ArcPhase::Climax), 1.0);
        assert!((a.total_progress() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_ready_beats_respect_prerequisites() {
        let first = beat(ArcPhase::Setup, false, vec![]);
        let second = beat(ArcPhase::Rising, false, vec![first.id]);
        let a = arc(vec![first.clone(), second]);

        let ready: Vec<_> = a.ready_beats().map(|b| b.id).collect();
        assert_eq!(ready, vec![first.id]);
    }

    #[test]
    fn test_player_action_is_not_npc_triggerable() {
        assert!(!BeatTrigger::PlayerAction {
            keyword: "confess".to_string()
        }
        .is_npc_triggerable());
        assert!(BeatTrigger::Random { probability: 0.2 }.is_npc_triggerable());
    }
}
