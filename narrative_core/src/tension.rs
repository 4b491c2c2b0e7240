//! Tension derived from relationship metrics.

use story_state::{CharacterId, NarrativeState, Party, RelationshipMetrics};

/// Tension assumed when either direction of a pair has no relationship yet.
pub const DEFAULT_TENSION: f32 = 50.0;

const TRUST_WEIGHT: f32 = 0.4;
const RIVALRY_WEIGHT: f32 = 0.4;
const FEAR_WEIGHT: f32 = 0.2;

/// Tension from both directions of a pair, 0 - 100.
pub fn pair_tension(ab: &RelationshipMetrics, ba: &RelationshipMetrics) -> f32 {
    let trust = (ab.trust + ba.trust) / 2.0;
    let rivalry = (ab.rivalry + ba.rivalry) / 2.0;
    let fear = (ab.fear + ba.fear) / 2.0;

    let tension = (100.0 - trust) * TRUST_WEIGHT + rivalry * RIVALRY_WEIGHT + fear * FEAR_WEIGHT;
    tension.clamp(0.0, 100.0)
}

/// Tension between two parties.
pub fn calculate_tension(state: &NarrativeState, a: Party, b: Party) -> f32 {
    match (state.relationship(a, b), state.relationship(b, a)) {
        (Some(ab), Some(ba)) => pair_tension(&ab.metrics, &ba.metrics),
        _ => DEFAULT_TENSION,
    }
}

/// Mean tension over every unordered pair of participants.
///
/// Returns `None` for fewer than two participants.
pub fn mean_pairwise_tension(state: &NarrativeState, participants: &[CharacterId]) -> Option<f32> {
    let mut total = 0.0;
    let mut pairs = 0u32;
    for (i, a) in participants.iter().enumerate() {
        for b in &participants[i + 1..] {
            total += calculate_tension(state, Party::Npc(*a), Party::Npc(*b));
            pairs += 1;
        }
    }
    (pairs > 0).then(|| total / pairs as f32)
}

/// Group tension: mean pairwise tension averaged with global tension.
pub fn group_tension(state: &NarrativeState, participants: &[CharacterId]) -> f32 {
    match mean_pairwise_tension(state, participants) {
        Some(pairwise) => ((pairwise + state.global_tension) / 2.0).clamp(0.0, 100.0),
        None => state.global_tension,
    }
}
