//! Knowledge Graph - who knows which facts, and how facts travel.

use rand::Rng;
use serde::{Deserialize, Serialize};
use story_state::{
    CharacterId, FactCategory, FactId, KnowledgeSource, NarrativeState, Party, Suspicion,
    WorldFact,
};
use tracing::debug;

use crate::config::PropagationConfig;

/// One hop of a fact from one NPC to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Propagation {
    pub fact: FactId,
    pub from: CharacterId,
    pub to: CharacterId,
}

/// Operations on the fact/knowledge graph held in a [`NarrativeState`].
///
/// Facts are nodes, parties are nodes, and the known-by sets are the edges
/// between them. Relationships decide which edges can grow.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    config: PropagationConfig,
}

impl KnowledgeGraph {
    pub fn new(config: PropagationConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// A party learns a fact. NPCs learning a rumor or evidence about
    /// someone else also form a suspicion about that person.
    pub fn learn(
        &self,
        state: NarrativeState,
        party: Party,
        fact_id: FactId,
        source: KnowledgeSource,
    ) -> NarrativeState {
        let suspicion = match (party, state.fact(fact_id)) {
            (Party::Npc(learner), Some(fact)) if !fact.is_known_by(party) => {
                self.derive_suspicion(fact, learner, state.current_day)
                    .map(|s| (learner, s))
            }
            _ => None,
        };

        let state = state.learn_fact(party, fact_id, source);
        match suspicion {
            Some((learner, s)) if state.fact(fact_id).is_some_and(|f| f.is_known_by(party)) => {
                state.add_suspicion(learner, s)
            }
            _ => state,
        }
    }

    /// Several parties learn the same fact.
    pub fn reveal_to(
        &self,
        state: NarrativeState,
        fact_id: FactId,
        parties: impl IntoIterator<Item = Party>,
        source: KnowledgeSource,
    ) -> NarrativeState {
        parties
            .into_iter()
            .fold(state, |s, party| self.learn(s, party, fact_id, source))
    }

    /// Add a fact, giving anyone in its known-by set the matching suspicions.
    pub fn add_fact(&self, state: NarrativeState, fact: WorldFact) -> NarrativeState {
        let knowers: Vec<Party> = fact.known_by.iter().copied().collect();
        let mut bare = fact;
        bare.known_by.clear();
        let id = bare.id;
        let state = state.add_fact(bare);
        self.reveal_to(state, id, knowers, KnowledgeSource::Initial)
    }

    fn derive_suspicion(&self, fact: &WorldFact, learner: CharacterId, day: u32) -> Option<Suspicion> {
        let confidence = match fact.category {
            FactCategory::Rumor => self.config.rumor_confidence,
            FactCategory::Evidence => self.config.evidence_confidence,
            _ => return None,
        };
        let about = fact.subject.filter(|s| *s != learner)?;
        Some(Suspicion {
            about: Some(about),
            from_fact: fact.id,
            content: fact.content.clone(),
            confidence,
            day,
        })
    }

    /// One propagation pass: every living NPC who knows a spreadable fact
    /// may pass it to each living NPC they are close to, with probability
    /// equal to the fact's spread propensity. Facts travel one hop per pass.
    pub fn propagate<R>(&self, state: NarrativeState, rng: &mut R) -> (NarrativeState, Vec<Propagation>)
    where
        R: Rng + ?Sized,
    {
        let mut hops = Vec::new();
        for fact in state.facts.values().filter(|f| f.is_spreadable()) {
            for teller in fact.known_by.iter().filter_map(|p| p.npc()) {
                if !state.character(teller).is_some_and(|c| c.is_alive()) {
                    continue;
                }
                for listener in state.characters.values() {
                    let to = Party::Npc(listener.id);
                    if listener.id == teller
                        || !listener.is_alive()
                        || fact.is_known_by(to)
                        || hops.iter().any(|h: &Propagation| h.fact == fact.id && h.to == listener.id)
                        || !self.is_close(&state, teller, listener.id)
                    {
                        continue;
                    }
                    if rng.gen::<f32>() < fact.spread_propensity {
                        hops.push(Propagation {
                            fact: fact.id,
                            from: teller,
                            to: listener.id,
                        });
                    }
                }
            }
        }

        let state = hops.iter().fold(state, |s, hop| {
            debug!(fact = %hop.fact, from = %hop.from, to = %hop.to, "fact propagated");
            self.learn(
                s,
                Party::Npc(hop.to),
                hop.fact,
                KnowledgeSource::ToldBy(Party::Npc(hop.from)),
            )
        });
        (state, hops)
    }

    fn is_close(&self, state: &NarrativeState, teller: CharacterId, listener: CharacterId) -> bool {
        state
            .relationship(Party::Npc(teller), Party::Npc(listener))
            .is_some_and(|r| {
                r.metrics.trust >= self.config.min_closeness
                    || r.metrics.affection >= self.config.min_closeness
            })
    }
}

/// Secret facts `holder` knows whose subject is `subject`.
pub fn secrets_held_about(
    state: &NarrativeState,
    holder: CharacterId,
    subject: CharacterId,
) -> Vec<&WorldFact> {
    state
        .facts
        .values()
        .filter(|f| f.is_secret() && f.subject == Some(subject) && f.is_known_by(Party::Npc(holder)))
        .collect()
}

/// Facts one of the pair holds as a secret about the other.
pub fn conflicting_facts(state: &NarrativeState, a: CharacterId, b: CharacterId) -> Vec<FactId> {
    let mut facts: Vec<FactId> = secrets_held_about(state, a, b)
        .into_iter()
        .chain(secrets_held_about(state, b, a))
        .map(|f| f.id)
        .collect();
    facts.sort();
    facts.dedup();
    facts
}

/// Facts known by at least two of the given characters.
pub fn shared_facts(state: &NarrativeState, characters: &[CharacterId]) -> Vec<FactId> {
    state
        .facts
        .values()
        .filter(|f| {
            characters
                .iter()
                .filter(|c| f.is_known_by(Party::Npc(**c)))
                .count()
                >= 2
        })
        .map(|f| f.id)
        .collect()
}

/// Known facts the player has not heard yet, most urgent first.
pub fn unknown_to_player(state: &NarrativeState, character: CharacterId) -> Vec<&WorldFact> {
    let mut facts: Vec<&WorldFact> = state
        .facts_known_by(Party::Npc(character))
        .into_iter()
        .filter(|f| !f.is_known_to_player())
        .collect();
    facts.sort_by_key(|f| f.priority());
    facts
}
