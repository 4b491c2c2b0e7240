//! Initial state creation.
//!
//! Starting relationships are derived from the persona text each character
//! arrives with. Role words apply in both directions; the character's own
//! mood only colours how they regard the player.

use std::collections::BTreeMap;
use tracing::debug;

use super::{
    MetricDelta, NarrativeState, NpcKnowledge, PlaythroughRef, Relationship,
    RelationshipMetrics, Timestamp, SCHEMA_VERSION,
};
use crate::entities::{Character, CharacterId, EmotionalState, Party};

/// How an NPC regards the player before any role words are applied.
const NPC_TO_PLAYER_BASELINE: RelationshipMetrics = RelationshipMetrics {
    trust: 40.0,
    affection: 30.0,
    fear: 0.0,
    respect: 40.0,
    rivalry: 10.0,
    dependency: 10.0,
};

const fn delta(
    trust: f32,
    affection: f32,
    fear: f32,
    respect: f32,
    rivalry: f32,
    dependency: f32,
) -> MetricDelta {
    MetricDelta {
        trust,
        affection,
        fear,
        respect,
        rivalry,
        dependency,
    }
}

/// Role and persona keywords. Every matching row is applied.
const ROLE_KEYWORDS: &[(&[&str], MetricDelta)] = &[
    (
        &["spouse", "husband", "wife", "fiance", "fiancee", "partner", "girlfriend", "boyfriend"],
        delta(30.0, 40.0, 0.0, 10.0, 0.0, 30.0),
    ),
    (
        &[
            "mother", "father", "parent", "sister", "brother", "sibling", "daughter", "son",
            "cousin", "aunt", "uncle", "grandmother", "grandfather", "grandparent",
        ],
        delta(20.0, 30.0, 0.0, 10.0, 0.0, 20.0),
    ),
    (
        &["best friend", "friend", "roommate"],
        delta(20.0, 20.0, 0.0, 5.0, 0.0, 5.0),
    ),
    (
        &["boss", "manager", "supervisor", "landlord", "principal"],
        delta(0.0, 0.0, 15.0, 20.0, 0.0, 15.0),
    ),
    (
        &["coworker", "co-worker", "colleague", "classmate"],
        delta(0.0, 0.0, 0.0, 10.0, 10.0, 0.0),
    ),
    (
        &["ex", "divorced", "estranged", "former"],
        delta(-20.0, -30.0, 0.0, 0.0, 20.0, 0.0),
    ),
    (
        &["rival", "enemy", "nemesis", "competitor"],
        delta(-30.0, -20.0, 0.0, 5.0, 40.0, 0.0),
    ),
    (&["neighbor", "neighbour"], delta(5.0, 0.0, 0.0, 0.0, 0.0, 0.0)),
    (
        &["hostile", "hates", "resentful", "bitter", "cold"],
        delta(-25.0, -25.0, 0.0, 0.0, 25.0, 0.0),
    ),
];

const HOSTILE_MOOD: MetricDelta = delta(-25.0, -25.0, 0.0, 0.0, 25.0, 0.0);

/// Adjustment an NPC's mood makes to how it regards the player.
fn mood_delta(state: EmotionalState) -> MetricDelta {
    match state {
        EmotionalState::Angry | EmotionalState::Jealous | EmotionalState::Scheming => HOSTILE_MOOD,
        EmotionalState::Suspicious => delta(-15.0, 0.0, 0.0, 0.0, 5.0, 0.0),
        EmotionalState::Fearful => delta(0.0, 0.0, 20.0, 0.0, 0.0, 0.0),
        EmotionalState::Affectionate => delta(0.0, 15.0, 0.0, 0.0, 0.0, 0.0),
        EmotionalState::Happy => delta(5.0, 5.0, 0.0, 0.0, 0.0, 0.0),
        EmotionalState::Guilty => delta(0.0, 0.0, 5.0, 0.0, 0.0, 0.0),
        _ => MetricDelta::default(),
    }
}

/// Lowercase words of a text, split on anything that is not alphanumeric.
fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Multi-word keywords match as phrases, short ones as whole words and
/// longer ones as word prefixes ("resent" matches "resentment").
fn keyword_matches(keyword: &str, lower_text: &str, words: &[String]) -> bool {
    if keyword.contains(' ') || keyword.contains('-') {
        return lower_text.contains(keyword);
    }
    words
        .iter()
        .any(|w| w == keyword || (keyword.len() >= 5 && w.starts_with(keyword)))
}

/// Sum of every keyword row matching the character's persona text.
pub(crate) fn role_delta(character: &Character) -> MetricDelta {
    let text = format!(
        "{} {} {}",
        character.role, character.status_text, character.personality
    )
    .to_lowercase();
    let tokens = words(&text);

    ROLE_KEYWORDS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| keyword_matches(k, &text, &tokens)))
        .fold(MetricDelta::default(), |acc, (_, d)| acc.plus(*d))
}

/// Starting metrics for `character -> player` and `player -> character`.
pub(crate) fn player_metrics(character: &Character) -> (RelationshipMetrics, RelationshipMetrics) {
    let role = role_delta(character);
    let npc_to_player = NPC_TO_PLAYER_BASELINE
        .apply(&role)
        .apply(&mood_delta(character.emotional_state));
    let player_to_npc = NPC_TO_PLAYER_BASELINE.apply(&role);
    (npc_to_player, player_to_npc)
}

impl NarrativeState {
    /// Create the state for a new playthrough.
    ///
    /// Knowledge starts empty, relationships come from the persona heuristics
    /// and global tension from the difficulty.
    pub fn new(identity: PlaythroughRef, characters: impl IntoIterator<Item = Character>) -> Self {
        let global_tension = identity.difficulty.base_tension();
        let mut state = Self {
            identity,
            current_day: 0,
            characters: BTreeMap::new(),
            active_arcs: Vec::new(),
            completed_arcs: Vec::new(),
            queued_arcs: Vec::new(),
            facts: BTreeMap::new(),
            knowledge: BTreeMap::new(),
            relationships: Vec::new(),
            timeline: Vec::new(),
            player_actions: Vec::new(),
            reputation: BTreeMap::new(),
            pending_consequences: Vec::new(),
            conversations: BTreeMap::new(),
            global_tension,
            themes: Vec::new(),
            message_count: 0,
            last_updated: Timestamp::now(),
            schema_version: SCHEMA_VERSION,
        };

        for character in characters {
            let id = character.id;
            if state.characters.insert(id, character).is_some() {
                continue;
            }
            state.knowledge.insert(id, NpcKnowledge::new());
            state.seed_relationships_for(id);
        }

        debug!(
            characters = state.characters.len(),
            relationships = state.relationships.len(),
            tension = state.global_tension,
            "narrative state created"
        );
        state
    }

    /// Create the player and NPC relationships a newly added character needs.
    pub(crate) fn seed_relationships_for(&mut self, id: CharacterId) {
        let Some(character) = self.characters.get(&id) else {
            return;
        };
        let (npc_to_player, player_to_npc) = player_metrics(character);
        let npc = Party::Npc(id);

        let mut fresh = vec![
            Relationship::new(npc, Party::Player, npc_to_player),
            Relationship::new(Party::Player, npc, player_to_npc),
        ];
        for other in self.characters.keys().filter(|other| **other != id) {
            let other = Party::Npc(*other);
            fresh.push(Relationship::new(npc, other, RelationshipMetrics::default()));
            fresh.push(Relationship::new(other, npc, RelationshipMetrics::default()));
        }

        for rel in fresh {
            if self.relationship(rel.from, rel.to).is_none() {
                self.relationships.push(rel);
            }
        }
    }
}
