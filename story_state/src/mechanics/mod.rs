//! Narrative mechanics: difficulty tiers, arc vocabulary, fact classification
//! and the external game meters.

use serde::{Deserialize, Serialize};

/// Difficulty tier chosen at the start of a playthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Casual,
    #[default]
    Dramatic,
    Intense,
}

impl Difficulty {
    /// Global tension a new playthrough starts from.
    pub fn base_tension(&self) -> f32 {
        match self {
            Difficulty::Casual => 20.0,
            Difficulty::Dramatic => 40.0,
            Difficulty::Intense => 60.0,
        }
    }

    /// Number of arcs seeded into a new playthrough.
    pub fn initial_arc_count(&self) -> usize {
        match self {
            Difficulty::Casual => 2,
            Difficulty::Dramatic => 3,
            Difficulty::Intense => 5,
        }
    }
}

/// Category of a story arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArcCategory {
    Betrayal,
    Conflict,
    Mystery,
    Romance,
    Crisis,
    Power,
    Secret,
    Revenge,
}

impl ArcCategory {
    pub const ALL: [ArcCategory; 8] = [
        ArcCategory::Betrayal,
        ArcCategory::Conflict,
        ArcCategory::Mystery,
        ArcCategory::Romance,
        ArcCategory::Crisis,
        ArcCategory::Power,
        ArcCategory::Secret,
        ArcCategory::Revenge,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArcCategory::Betrayal => "betrayal",
            ArcCategory::Conflict => "conflict",
            ArcCategory::Mystery => "mystery",
            ArcCategory::Romance => "romance",
            ArcCategory::Crisis => "crisis",
            ArcCategory::Power => "power",
            ArcCategory::Secret => "secret",
            ArcCategory::Revenge => "revenge",
        }
    }
}

/// Role a character plays inside one arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArcRole {
    Protagonist,
    Antagonist,
    Victim,
    Witness,
    Enabler,
    Manipulator,
    Mediator,
    Catalyst,
    Ally,
    Rival,
}

impl ArcRole {
    /// Placeholder used in templates, e.g. `{antagonist}`.
    pub fn placeholder(&self) -> &'static str {
        match self {
            ArcRole::Protagonist => "{protagonist}",
            ArcRole::Antagonist => "{antagonist}",
            ArcRole::Victim => "{victim}",
            ArcRole::Witness => "{witness}",
            ArcRole::Enabler => "{enabler}",
            ArcRole::Manipulator => "{manipulator}",
            ArcRole::Mediator => "{mediator}",
            ArcRole::Catalyst => "{catalyst}",
            ArcRole::Ally => "{ally}",
            ArcRole::Rival => "{rival}",
        }
    }

    pub fn name(&self) -> &'static str {
        let placeholder = self.placeholder();
        &placeholder[1..placeholder.len() - 1]
    }

    /// Roles that drive an arc against other participants.
    pub fn is_aggressor(&self) -> bool {
        matches!(
            self,
            ArcRole::Antagonist | ArcRole::Manipulator | ArcRole::Rival
        )
    }
}

/// Arc phase. Phases only move forward, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum ArcPhase {
    #[default]
    Setup,
    Rising,
    Climax,
    Resolution,
    Aftermath,
}

impl ArcPhase {
    /// The following phase, or `None` from aftermath.
    pub fn next(&self) -> Option<ArcPhase> {
        match self {
            ArcPhase::Setup => Some(ArcPhase::Rising),
            ArcPhase::Rising => Some(ArcPhase::Climax),
            ArcPhase::Climax => Some(ArcPhase::Resolution),
            ArcPhase::Resolution => Some(ArcPhase::Aftermath),
            ArcPhase::Aftermath => None,
        }
    }

    /// Whether an arc in this phase may be completed.
    pub fn is_closing(&self) -> bool {
        matches!(self, ArcPhase::Resolution | ArcPhase::Aftermath)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArcPhase::Setup => "setup",
            ArcPhase::Rising => "rising",
            ArcPhase::Climax => "climax",
            ArcPhase::Resolution => "resolution",
            ArcPhase::Aftermath => "aftermath",
        }
    }
}

/// Kind of beat inside an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeatType {
    Revelation,
    Confrontation,
    Decision,
    Consequence,
    Twist,
    Alliance,
    Betrayal,
    Discovery,
    Escalation,
    Resolution,
}

/// How directly the player is caught up in an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerInvolvement {
    /// The arc happens to the player.
    Central,
    /// The player is close to the participants and will be drawn in.
    Peripheral,
    /// The arc plays out around the player.
    Observer,
    /// The arc surfaced during play and the player is uncovering it.
    Discovering,
}

/// Category of a world fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactCategory {
    Secret,
    Event,
    Relationship,
    History,
    Rumor,
    Evidence,
}

/// Importance tier of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Importance {
    Minor,
    Moderate,
    Major,
    Critical,
}

impl Importance {
    /// Revelation priority, lower is more urgent.
    pub fn priority(&self) -> u8 {
        match self {
            Importance::Critical => 1,
            Importance::Major => 2,
            Importance::Moderate => 3,
            Importance::Minor => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Importance::Minor => "minor",
            Importance::Moderate => "moderate",
            Importance::Major => "major",
            Importance::Critical => "critical",
        }
    }
}

/// Whether a fact is actually true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Veracity {
    True,
    False,
    PartiallyTrue,
    Unknown,
}

/// Conversational strategy for a multi-party scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strategy {
    Aggressive,
    Defensive,
    Manipulative,
    Supportive,
    #[default]
    Neutral,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Aggressive => "aggressive",
            Strategy::Defensive => "defensive",
            Strategy::Manipulative => "manipulative",
            Strategy::Supportive => "supportive",
            Strategy::Neutral => "neutral",
        }
    }
}

/// The five external 0-100 life meters. Read only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Meters {
    pub health: f32,
    pub happiness: f32,
    pub wealth: f32,
    pub social: f32,
    pub career: f32,
}

impl Default for Meters {
    fn default() -> Self {
        Self {
            health: 50.0,
            happiness: 50.0,
            wealth: 50.0,
            social: 50.0,
            career: 50.0,
        }
    }
}

impl Meters {
    /// Meter names paired with their values.
    pub fn entries(&self) -> [(&'static str, f32); 5] {
        [
            ("health", self.health),
            ("happiness", self.happiness),
            ("wealth", self.wealth),
            ("social", self.social),
            ("career", self.career),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_tiers() {
        assert_eq!(Difficulty::Casual.base_tension(), 20.0);
        assert_eq!(Difficulty::Dramatic.base_tension(), 40.0);
        assert_eq!(Difficulty::Intense.base_tension(), 60.0);
        assert_eq!(Difficulty::Casual.initial_arc_count(), 2);
        assert_eq!(Difficulty::Dramatic.initial_arc_count(), 3);
        assert_eq!(Difficulty::Intense.initial_arc_count(), 5);
    }

    #[test]
    fn test_phase_order_is_strictly_forward() {
        let mut phase = ArcPhase::Setup;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            phase = next;
            seen.push(phase);
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(phase, ArcPhase::Aftermath);
    }

    #[test]
    fn test_role_names() {
        assert_eq!(ArcRole::Antagonist.placeholder(), "{antagonist}");
        assert_eq!(ArcRole::Antagonist.name(), "antagonist");
    }

    #[test]
    fn test_importance_priority() {
        assert!(Importance::Critical.priority() < Importance::Major.priority());
        assert!(Importance::Major.priority() < Importance::Minor.priority());
    }
}
