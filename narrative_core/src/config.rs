//! Tunable thresholds for the narrative engine.
//!
//! Every section defaults to the documented behaviour, so a TOML file only
//! needs the values it wants to change:
//!
//! ```toml
//! [revelation]
//! force_after_own_messages = 5
//!
//! [group]
//! emergent_tension_chance = 0.5
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub revelation: RevelationConfig,
    pub group: GroupConfig,
    pub simulation: SimulationConfig,
    pub propagation: PropagationConfig,
}

/// When characters are pushed to disclose what they know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevelationConfig {
    /// Own messages after which the top fact must come out immediately.
    pub force_after_own_messages: u32,
    /// Own messages from which a short countdown starts.
    pub short_countdown_from: u32,
    /// Countdown set after a character's first message.
    pub long_countdown: u32,
    /// Conversation length required before the long countdown applies.
    pub min_conversation_messages: u32,
    /// Only words longer than this count as key words of a fact.
    pub key_word_min_len: usize,
    /// Key words a message must repeat to count as revealing the fact.
    pub key_word_matches: usize,
}

impl Default for RevelationConfig {
    fn default() -> Self {
        Self {
            force_after_own_messages: 4,
            short_countdown_from: 2,
            long_countdown: 3,
            min_conversation_messages: 4,
            key_word_min_len: 4,
            key_word_matches: 2,
        }
    }
}

/// Group scene thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    pub rivalry_conflict: f32,
    pub distrust_conflict: f32,
    pub resentment_conflict: f32,
    pub alliance_trust: f32,
    pub alliance_affection: f32,
    /// Emergent arcs only spawn while fewer arcs than this are active.
    pub max_active_arcs: usize,
    pub emergent_tension_threshold: f32,
    pub emergent_tension_chance: f64,
    pub emergent_pair_chance: f64,
    /// Conflicting facts a pair must share before it can spawn an arc.
    pub emergent_pair_min_facts: usize,
    pub accusatory_delta: f32,
    pub cooperative_delta: f32,
    pub violent_delta: f32,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            rivalry_conflict: 50.0,
            distrust_conflict: 30.0,
            resentment_conflict: 30.0,
            alliance_trust: 60.0,
            alliance_affection: 50.0,
            max_active_arcs: 5,
            emergent_tension_threshold: 60.0,
            emergent_tension_chance: 0.3,
            emergent_pair_chance: 0.2,
            emergent_pair_min_facts: 2,
            accusatory_delta: 5.0,
            cooperative_delta: -3.0,
            violent_delta: 10.0,
        }
    }
}

/// Off-screen simulation pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Share of current-phase beats that must fire before the phase advances.
    pub phase_advance_ratio: f32,
    /// Share of all beats that must fire before a closing arc completes.
    pub completion_ratio: f32,
    /// Shared long words needed to match an event to a beat.
    pub beat_match_words: usize,
    /// Only words longer than this take part in beat matching.
    pub beat_match_min_len: usize,
    pub tension_per_day: f32,
    pub min_target_tension: f32,
    pub max_target_tension: f32,
    pub max_focus_arcs: usize,
    /// Meters below this produce world guidance.
    pub low_meter: f32,
    /// Fraction of the gap to target tension closed per simulation.
    pub tension_convergence: f32,
    /// Days before a consequence of a fired beat manifests.
    pub consequence_delay_days: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            phase_advance_ratio: 0.7,
            completion_ratio: 0.8,
            beat_match_words: 3,
            beat_match_min_len: 4,
            tension_per_day: 2.0,
            min_target_tension: 10.0,
            max_target_tension: 95.0,
            max_focus_arcs: 3,
            low_meter: 30.0,
            tension_convergence: 0.5,
            consequence_delay_days: 2,
        }
    }
}

/// How facts move between characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Trust or affection toward the receiver needed to pass a fact on.
    pub min_closeness: f32,
    pub rumor_confidence: f32,
    pub evidence_confidence: f32,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            min_closeness: 40.0,
            rumor_confidence: 0.5,
            evidence_confidence: 0.8,
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be between 0 and 1, got {value}"
        )))
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that probabilities and ratios are in range and bounds are ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.group;
        check_unit("group.emergent_tension_chance", g.emergent_tension_chance)?;
        check_unit("group.emergent_pair_chance", g.emergent_pair_chance)?;

        let s = &self.simulation;
        check_unit("simulation.phase_advance_ratio", s.phase_advance_ratio.into())?;
        check_unit("simulation.completion_ratio", s.completion_ratio.into())?;
        check_unit("simulation.tension_convergence", s.tension_convergence.into())?;
        if !(0.0..=100.0).contains(&s.min_target_tension)
            || !(0.0..=100.0).contains(&s.max_target_tension)
            || s.min_target_tension > s.max_target_tension
        {
            return Err(ConfigError::Invalid(format!(
                "target tension bounds {}..{} must be ordered within 0..100",
                s.min_target_tension, s.max_target_tension
            )));
        }
        if s.beat_match_words == 0 {
            return Err(ConfigError::Invalid(
                "simulation.beat_match_words must be at least 1".to_string(),
            ));
        }

        let p = &self.propagation;
        check_unit("propagation.rumor_confidence", p.rumor_confidence.into())?;
        check_unit("propagation.evidence_confidence", p.evidence_confidence.into())?;

        let r = &self.revelation;
        if r.key_word_matches == 0 {
            return Err(ConfigError::Invalid(
                "revelation.key_word_matches must be at least 1".to_string(),
            ));
        }
        if r.short_countdown_from > r.force_after_own_messages {
            return Err(ConfigError::Invalid(
                "revelation.short_countdown_from cannot exceed force_after_own_messages"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
