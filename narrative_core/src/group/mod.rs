//! Group Dynamics Engine - multi-party scenes.
//!
//! A scene starts with [`GroupDynamics::start_conversation`], which maps out
//! conflicts and alliances between the participants, builds one agenda per
//! character and may spawn an emergent arc. Every message then goes through
//! [`GroupDynamics::process_message`] to track revelations and tension.

mod agenda;

pub use agenda::*;

use rand::Rng;
use story_state::{
    CharacterId, ConflictReason, ConversationId, FactId, GroupConversationState, Importance,
    KnowledgeSource, NarrativeState, PairConflict, Party, Relationship, RevelationMark,
    TimelineEvent, TimelineKind,
};
use tracing::{debug, trace};

use crate::arcs::ArcGenerator;
use crate::config::{GroupConfig, RevelationConfig};
use crate::knowledge_base::{
    conflicting_facts, message_reveals, plan_revelation, shared_facts, KnowledgeGraph,
};
use crate::tension::group_tension;
use crate::text::mentions_any;

const ACCUSATORY: &[&str] = &[
    "liar", "lying", "lied", "blame", "accuse", "fault", "betrayed", "cheated", "how could you",
    "you did this",
];
const COOPERATIVE: &[&str] = &[
    "sorry", "apologize", "apologise", "agree", "together", "understand", "forgive", "thank",
    "thanks", "let's",
];
const VIOLENT: &[&str] = &[
    "hit", "punch", "punched", "slap", "slapped", "shove", "shoved", "kill", "attack", "throws",
    "grabs",
];

/// Runs group scenes.
#[derive(Debug, Clone, Default)]
pub struct GroupDynamics {
    group: GroupConfig,
    revelation: RevelationConfig,
    knowledge: KnowledgeGraph,
    arcs: ArcGenerator,
}

impl GroupDynamics {
    pub fn new(
        group: GroupConfig,
        revelation: RevelationConfig,
        knowledge: KnowledgeGraph,
        arcs: ArcGenerator,
    ) -> Self {
        Self {
            group,
            revelation,
            knowledge,
            arcs,
        }
    }

    /// Reasons `a` and `b` are at odds, judged from both directions.
    pub fn conflict_reasons(
        &self,
        state: &NarrativeState,
        a: CharacterId,
        b: CharacterId,
    ) -> Vec<ConflictReason> {
        let directions: Vec<&Relationship> = [
            state.relationship(Party::Npc(a), Party::Npc(b)),
            state.relationship(Party::Npc(b), Party::Npc(a)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut reasons = Vec::new();
        if directions
            .iter()
            .any(|r| r.metrics.rivalry > self.group.rivalry_conflict)
        {
            reasons.push(ConflictReason::Rivalry);
        }
        if directions
            .iter()
            .any(|r| r.metrics.trust < self.group.distrust_conflict)
        {
            reasons.push(ConflictReason::Distrust);
        }
        if !conflicting_facts(state, a, b).is_empty() {
            reasons.push(ConflictReason::UnresolvedSecret);
        }
        if directions
            .iter()
            .any(|r| r.metrics.affection < self.group.resentment_conflict)
        {
            reasons.push(ConflictReason::Resentment);
        }
        reasons
    }

    /// Whether both directions of the pair are trusting and warm.
    pub fn is_alliance(&self, state: &NarrativeState, a: CharacterId, b: CharacterId) -> bool {
        let warm = |from: CharacterId, to: CharacterId| {
            state
                .relationship(Party::Npc(from), Party::Npc(to))
                .is_some_and(|r| {
                    r.metrics.trust > self.group.alliance_trust
                        && r.metrics.affection > self.group.alliance_affection
                })
        };
        warm(a, b) && warm(b, a)
    }

    /// Open a scene between the given characters.
    ///
    /// Unknown, dead and duplicate participants are dropped.
    pub fn start_conversation<R>(
        &self,
        state: NarrativeState,
        participants: &[CharacterId],
        rng: &mut R,
    ) -> (NarrativeState, ConversationId)
    where
        R: Rng + ?Sized,
    {
        let mut cast: Vec<CharacterId> = Vec::new();
        for id in participants {
            if state.character(*id).is_some_and(|c| c.is_alive()) && !cast.contains(id) {
                cast.push(*id);
            }
        }

        let mut conv =
            GroupConversationState::new(ConversationId::from_rng(rng), cast.clone(), state.current_day);
        for (i, a) in cast.iter().enumerate() {
            for b in &cast[i + 1..] {
                let reasons = self.conflict_reasons(&state, *a, *b);
                if !reasons.is_empty() {
                    conv.conflicts.push(PairConflict {
                        a: *a,
                        b: *b,
                        reasons,
                        secret_facts: conflicting_facts(&state, *a, *b),
                    });
                }
                if self.is_alliance(&state, *a, *b) {
                    conv.alliances.push((*a, *b));
                }
            }
        }
        conv.shared_knowledge = shared_facts(&state, &cast);
        conv.tension = group_tension(&state, &cast);
        for id in &cast {
            let agenda = build_agenda(&state, &conv, *id);
            conv.agendas.insert(*id, agenda);
        }

        let (state, conv) = self.maybe_spawn_emergent_arc(state, conv, rng);
        let id = conv.id;
        debug!(
            conversation = %id,
            participants = cast.len(),
            conflicts = conv.conflicts.len(),
            tension = conv.tension,
            "group conversation started"
        );
        (state.start_conversation(conv), id)
    }

    fn maybe_spawn_emergent_arc<R>(
        &self,
        state: NarrativeState,
        mut conv: GroupConversationState,
        rng: &mut R,
    ) -> (NarrativeState, GroupConversationState)
    where
        R: Rng + ?Sized,
    {
        if state.active_arcs.len() >= self.group.max_active_arcs || conv.participants.len() < 2 {
            return (state, conv);
        }

        let mut cast = None;
        if conv.tension > self.group.emergent_tension_threshold
            && rng.gen::<f64>() < self.group.emergent_tension_chance
        {
            cast = Some(conv.participants.clone());
        } else {
            for conflict in &conv.conflicts {
                if conflict.secret_facts.len() >= self.group.emergent_pair_min_facts
                    && rng.gen::<f64>() < self.group.emergent_pair_chance
                {
                    cast = Some(vec![conflict.a, conflict.b]);
                    break;
                }
            }
        }
        let Some(cast) = cast else {
            return (state, conv);
        };

        let parent = state
            .active_arcs
            .iter()
            .find(|a| cast.iter().any(|c| a.involves(*c)))
            .map(|a| a.id);
        match self.arcs.emergent_arc(&state, cast, parent, rng) {
            Some(generated) => {
                debug!(arc = %generated.arc.id, conversation = %conv.id, "emergent arc spawned");
                conv.emergent_arc = Some(generated.arc.id);
                (generated.install(state, &self.knowledge), conv)
            }
            None => (state, conv),
        }
    }

    /// Fold one message into a live scene.
    pub fn process_message(
        &self,
        state: NarrativeState,
        conversation: ConversationId,
        speaker: CharacterId,
        text: &str,
    ) -> NarrativeState {
        let Some(mut conv) = state.conversation(conversation).cloned() else {
            trace!(%conversation, "message for unknown conversation ignored");
            return state;
        };
        if !conv.is_participant(speaker) {
            trace!(%conversation, %speaker, "message from non-participant ignored");
            return state;
        }

        conv.message_count += 1;
        let mut state = state.record_message();
        let mut revealed = None;
        if let Some(agenda) = conv.agendas.get_mut(&speaker) {
            agenda.own_messages += 1;
            revealed = agenda
                .must_reveal
                .as_ref()
                .filter(|m| message_reveals(text, &m.content, &self.revelation))
                .map(|m| m.fact);
        }

        if let Some(fact_id) = revealed {
            state = self.record_revelation(state, &mut conv, speaker, fact_id);
        }

        conv.tension = (conv.tension + self.tension_shift(text)).clamp(0.0, 100.0);

        let plans: Vec<_> = conv
            .participants
            .iter()
            .map(|id| (*id, plan_revelation(&state, &conv, *id, &self.revelation)))
            .collect();
        for (id, plan) in plans {
            if let Some(agenda) = conv.agendas.get_mut(&id) {
                agenda.must_reveal = plan;
            }
        }
        state.put_conversation(conv)
    }

    fn record_revelation(
        &self,
        state: NarrativeState,
        conv: &mut GroupConversationState,
        speaker: CharacterId,
        fact_id: FactId,
    ) -> NarrativeState {
        conv.revealed_facts.insert(fact_id);
        let Some(fact) = state.fact(fact_id) else {
            return state;
        };
        if fact.priority() <= Importance::Major.priority() {
            conv.last_major_revelation = Some(RevelationMark {
                by: speaker,
                fact: fact_id,
                at_message: conv.message_count,
            });
        }
        let event = TimelineEvent::new(
            state.current_day,
            TimelineKind::Revelation,
            format!("{} revealed: {}", state.party_name(speaker.into()), fact.content),
        )
        .with_involved(conv.participants.iter().copied());
        debug!(conversation = %conv.id, fact = %fact_id, %speaker, "fact revealed");

        let audience = conv
            .participants
            .iter()
            .map(|id| Party::Npc(*id))
            .chain([Party::Player]);
        let state = self
            .knowledge
            .reveal_to(state, fact_id, audience, KnowledgeSource::Revealed);
        state.add_timeline_event(event)
    }

    /// Tension change caused by the tone of a message.
    pub fn tension_shift(&self, text: &str) -> f32 {
        let mut shift = 0.0;
        if mentions_any(text, ACCUSATORY) {
            shift += self.group.accusatory_delta;
        }
        if mentions_any(text, COOPERATIVE) {
            shift += self.group.cooperative_delta;
        }
        if mentions_any(text, VIOLENT) {
            shift += self.group.violent_delta;
        }
        shift
    }

    /// Close a scene.
    pub fn end_conversation(&self, state: NarrativeState, id: ConversationId) -> NarrativeState {
        state.end_conversation(id)
    }
}
