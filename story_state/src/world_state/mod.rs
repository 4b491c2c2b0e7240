//! World state management - the single root aggregate for a playthrough.
//!
//! [`NarrativeState`] is a plain value. Every mutator consumes the state and
//! returns the next one; keep a clone around for undo or replay. Mutators
//! given ids they do not know return the state unchanged.

mod arc;
mod conversation;
mod init;
mod knowledge;
mod relationship;
mod time;
mod timeline;

pub use arc::*;
pub use conversation::*;
pub use knowledge::*;
pub use relationship::*;
pub use time::*;
pub use timeline::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;
use uuid::Uuid;

use crate::entities::{
    ArcId, BeatId, Character, CharacterId, CharacterStatus, ConversationId, EmotionalState,
    FactId, Party,
};
use crate::mechanics::{ArcPhase, Difficulty};

/// Version of the serialized state layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Identity of the playthrough this state belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaythroughRef {
    pub playthrough_id: Uuid,
    pub player_name: String,
    /// Scenario text from the persona layer, e.g. "small-town family drama".
    pub scenario: String,
    pub difficulty: Difficulty,
}

impl PlaythroughRef {
    pub fn new(
        player_name: impl Into<String>,
        scenario: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            playthrough_id: Uuid::new_v4(),
            player_name: player_name.into(),
            scenario: scenario.into(),
            difficulty,
        }
    }
}

/// The complete narrative state of one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeState {
    pub identity: PlaythroughRef,
    pub current_day: u32,

    /// The cast, as supplied by the scenario layer.
    pub characters: BTreeMap<CharacterId, Character>,

    pub active_arcs: Vec<StoryArc>,
    pub completed_arcs: Vec<StoryArc>,
    /// Generated arcs waiting for room to start.
    pub queued_arcs: Vec<StoryArc>,

    pub facts: BTreeMap<FactId, WorldFact>,
    pub knowledge: BTreeMap<CharacterId, NpcKnowledge>,
    pub relationships: Vec<Relationship>,

    pub timeline: Vec<TimelineEvent>,
    pub player_actions: Vec<PlayerAction>,
    /// Named reputation scalars, each -100 to 100.
    pub reputation: BTreeMap<String, f32>,
    pub pending_consequences: Vec<PendingConsequence>,
    pub conversations: BTreeMap<ConversationId, GroupConversationState>,

    /// 0 - 100.
    pub global_tension: f32,
    pub themes: Vec<String>,
    /// Messages exchanged across the whole playthrough.
    pub message_count: u32,

    pub last_updated: Timestamp,
    pub schema_version: u32,
}

// Mutators.
impl NarrativeState {
    fn touch(mut self) -> Self {
        self.last_updated = Timestamp::now();
        self
    }

    /// Active or queued arc. Completed arcs are read-only.
    fn open_arc_mut(&mut self, id: ArcId) -> Option<&mut StoryArc> {
        self.active_arcs
            .iter_mut()
            .chain(self.queued_arcs.iter_mut())
            .find(|a| a.id == id)
    }

    fn party_exists(&self, party: Party) -> bool {
        match party {
            Party::Player => true,
            Party::Npc(id) => self.characters.contains_key(&id),
        }
    }

    /// Add a character to the cast and seed its relationships.
    pub fn add_character(mut self, character: Character) -> Self {
        if self.characters.contains_key(&character.id) {
            return self;
        }
        let id = character.id;
        self.characters.insert(id, character);
        self.knowledge.entry(id).or_default();
        self.seed_relationships_for(id);
        self.touch()
    }

    pub fn set_character_status(mut self, id: CharacterId, status: CharacterStatus) -> Self {
        match self.characters.get_mut(&id) {
            Some(c) if c.status != status => c.status = status,
            _ => return self,
        }
        self.touch()
    }

    pub fn set_emotional_state(mut self, id: CharacterId, state: EmotionalState) -> Self {
        match self.characters.get_mut(&id) {
            Some(c) if c.emotional_state != state => c.emotional_state = state,
            _ => return self,
        }
        self.touch()
    }

    /// Add a fact. Every NPC in its known-by set learns it; ids outside the
    /// cast are dropped from the set.
    pub fn add_fact(mut self, mut fact: WorldFact) -> Self {
        if self.facts.contains_key(&fact.id) {
            return self;
        }
        let characters = &self.characters;
        fact.known_by.retain(|party| match party {
            Party::Player => true,
            Party::Npc(id) => characters.contains_key(id),
        });
        let day = self.current_day;
        for party in &fact.known_by {
            if let Party::Npc(id) = party {
                self.knowledge
                    .entry(*id)
                    .or_default()
                    .learn(&fact, day, KnowledgeSource::Initial);
            }
        }
        self.facts.insert(fact.id, fact);
        self.touch()
    }

    /// A party learns an existing fact. The known-by set only ever grows.
    pub fn learn_fact(mut self, party: Party, fact_id: FactId, source: KnowledgeSource) -> Self {
        if !self.party_exists(party) {
            trace!(%party, "learn_fact for unknown party ignored");
            return self;
        }
        let day = self.current_day;
        let Some(fact) = self.facts.get_mut(&fact_id) else {
            trace!(%fact_id, "learn_fact for unknown fact ignored");
            return self;
        };
        if !fact.known_by.insert(party) {
            return self;
        }
        if let Party::Npc(id) = party {
            self.knowledge
                .entry(id)
                .or_default()
                .learn(fact, day, source);
        }
        self.touch()
    }

    pub fn add_suspicion(mut self, character: CharacterId, suspicion: Suspicion) -> Self {
        let Some(knowledge) = self.knowledge.get_mut(&character) else {
            return self;
        };
        if !knowledge.suspect(suspicion) {
            return self;
        }
        self.touch()
    }

    /// Start an arc together with the facts generated for it.
    pub fn install_arc(mut self, mut arc: StoryArc, facts: Vec<WorldFact>) -> Self {
        if self.arc(arc.id).is_some() {
            return self;
        }
        arc.started_day = self.current_day;
        let event = TimelineEvent::new(
            self.current_day,
            TimelineKind::ArcStarted,
            format!("{} begins: {}", arc.title, arc.premise),
        )
        .with_involved(arc.participants.keys().copied())
        .with_arc(arc.id);

        let (id, parent) = (arc.id, arc.parent);
        self.active_arcs.push(arc);
        self.timeline.push(event);
        if let Some(parent) = parent {
            self = self.link_arcs(parent, id);
        }
        facts.into_iter().fold(self, |s, f| s.add_fact(f)).touch()
    }

    /// Park an arc until there is room for it. Its facts exist immediately.
    pub fn queue_arc(mut self, arc: StoryArc, facts: Vec<WorldFact>) -> Self {
        if self.arc(arc.id).is_some() {
            return self;
        }
        self.queued_arcs.push(arc);
        facts.into_iter().fold(self, |s, f| s.add_fact(f)).touch()
    }

    /// Move the oldest queued arc into play.
    pub fn activate_next_queued(mut self) -> Self {
        if self.queued_arcs.is_empty() {
            return self;
        }
        let arc = self.queued_arcs.remove(0);
        self.install_arc(arc, Vec::new())
    }

    /// Fire a beat. No-op if the beat already fired or its prerequisites have not.
    pub fn trigger_beat(mut self, arc_id: ArcId, beat_id: BeatId) -> Self {
        let day = self.current_day;
        let Some(arc) = self.active_arcs.iter_mut().find(|a| a.id == arc_id) else {
            trace!(%arc_id, "trigger_beat for unknown or inactive arc ignored");
            return self;
        };
        let Some(index) = arc.beats.iter().position(|b| b.id == beat_id) else {
            return self;
        };
        if arc.beats[index].triggered || !arc.prerequisites_met(&arc.beats[index]) {
            return self;
        }

        let beat = &mut arc.beats[index];
        beat.triggered = true;
        beat.triggered_day = Some(day);
        let event = TimelineEvent::new(day, TimelineKind::BeatTriggered, beat.content.clone())
            .with_involved(arc.participants.keys().copied())
            .with_arc(arc.id);

        self.timeline.push(event);
        self.touch()
    }

    /// Move an active arc one phase forward. No-op from aftermath.
    pub fn progress_arc_phase(mut self, arc_id: ArcId) -> Self {
        let day = self.current_day;
        let Some(arc) = self.active_arcs.iter_mut().find(|a| a.id == arc_id) else {
            return self;
        };
        let Some(next) = arc.phase.next() else {
            return self;
        };
        arc.phase = next;
        let event = TimelineEvent::new(
            day,
            TimelineKind::PhaseAdvanced,
            format!("{} enters its {} phase", arc.title, next.name()),
        )
        .with_arc(arc.id);

        self.timeline.push(event);
        self.touch()
    }

    /// Move an arc to the completed list. Completed arcs are never modified again.
    pub fn complete_arc(mut self, arc_id: ArcId) -> Self {
        let Some(index) = self.active_arcs.iter().position(|a| a.id == arc_id) else {
            return self;
        };
        let mut arc = self.active_arcs.remove(index);
        arc.completed_day = Some(self.current_day);
        self.timeline.push(
            TimelineEvent::new(
                self.current_day,
                TimelineKind::ArcCompleted,
                format!("{} has run its course", arc.title),
            )
            .with_involved(arc.participants.keys().copied())
            .with_arc(arc.id),
        );
        self.completed_arcs.push(arc);
        self.touch()
    }

    pub fn set_arc_tension(mut self, arc_id: ArcId, tension: f32) -> Self {
        let Some(arc) = self.active_arcs.iter_mut().find(|a| a.id == arc_id) else {
            return self;
        };
        arc.tension = tension.clamp(0.0, 100.0);
        self.touch()
    }

    /// Record a parent/child link between two arcs.
    pub fn link_arcs(mut self, parent: ArcId, child: ArcId) -> Self {
        if parent == child
            || self.open_arc_mut(parent).is_none()
            || self.open_arc_mut(child).is_none()
        {
            trace!(%parent, %child, "link_arcs needs two open arcs");
            return self;
        }
        if let Some(p) = self.open_arc_mut(parent) {
            if !p.children.contains(&child) {
                p.children.push(child);
            }
        }
        if let Some(c) = self.open_arc_mut(child) {
            c.parent = Some(parent);
        }
        self.touch()
    }

    /// Apply a partial delta to the directed relationship `from -> to`,
    /// creating it at neutral defaults if both parties exist.
    pub fn update_relationship(
        mut self,
        from: Party,
        to: Party,
        delta: MetricDelta,
        reason: impl Into<String>,
    ) -> Self {
        if from == to || !self.party_exists(from) || !self.party_exists(to) {
            trace!(%from, %to, "update_relationship for unknown pair ignored");
            return self;
        }
        let day = self.current_day;
        match self.relationships.iter_mut().find(|r| r.connects(from, to)) {
            Some(rel) => rel.apply(&delta, day, reason),
            None => {
                let mut rel = Relationship::new(from, to, RelationshipMetrics::default());
                rel.apply(&delta, day, reason);
                self.relationships.push(rel);
            }
        }
        self.touch()
    }

    pub fn add_timeline_event(mut self, event: TimelineEvent) -> Self {
        self.timeline.push(event);
        self.touch()
    }

    pub fn record_player_action(
        mut self,
        description: impl Into<String>,
        target: Option<CharacterId>,
    ) -> Self {
        let description = description.into();
        let now = Timestamp::now();
        self.player_actions.push(PlayerAction {
            day: self.current_day,
            description: description.clone(),
            target,
            recorded_at: now,
        });
        self.timeline.push(
            TimelineEvent::new(self.current_day, TimelineKind::PlayerAction, description)
                .with_involved(target),
        );
        self.touch()
    }

    /// Count one message exchanged in dialogue.
    pub fn record_message(self) -> Self {
        self.record_messages(1)
    }

    pub fn record_messages(mut self, count: u32) -> Self {
        if count == 0 {
            return self;
        }
        self.message_count = self.message_count.saturating_add(count);
        self.touch()
    }

    pub fn adjust_reputation(mut self, key: impl Into<String>, delta: f32) -> Self {
        let entry = self.reputation.entry(key.into()).or_insert(0.0);
        *entry = (*entry + delta).clamp(-100.0, 100.0);
        self.touch()
    }

    pub fn add_theme(mut self, theme: impl Into<String>) -> Self {
        let theme = theme.into();
        if self.themes.contains(&theme) {
            return self;
        }
        self.themes.push(theme);
        self.touch()
    }

    pub fn remove_theme(mut self, theme: &str) -> Self {
        let before = self.themes.len();
        self.themes.retain(|t| t != theme);
        if self.themes.len() == before {
            return self;
        }
        self.touch()
    }

    pub fn schedule_consequence(mut self, consequence: PendingConsequence) -> Self {
        self.pending_consequences.push(consequence);
        self.touch()
    }

    /// Drop every consequence that has manifested by `day`.
    pub fn drop_due_consequences(mut self, day: u32) -> Self {
        let before = self.pending_consequences.len();
        self.pending_consequences.retain(|c| !c.is_due(day));
        if self.pending_consequences.len() == before {
            return self;
        }
        self.touch()
    }

    pub fn set_global_tension(mut self, tension: f32) -> Self {
        self.global_tension = tension.clamp(0.0, 100.0);
        self.touch()
    }

    pub fn advance_day(self) -> Self {
        self.advance_days(1)
    }

    pub fn advance_days(mut self, days: u32) -> Self {
        if days == 0 {
            return self;
        }
        self.current_day = self.current_day.saturating_add(days);
        self.touch()
    }

    /// Register a new conversation. No-op if the id is already live.
    pub fn start_conversation(self, conversation: GroupConversationState) -> Self {
        if self.conversations.contains_key(&conversation.id) {
            return self;
        }
        self.put_conversation(conversation)
    }

    /// Insert or replace a conversation.
    pub fn put_conversation(mut self, conversation: GroupConversationState) -> Self {
        self.conversations.insert(conversation.id, conversation);
        self.touch()
    }

    /// Discard a conversation when its scene ends.
    pub fn end_conversation(mut self, id: ConversationId) -> Self {
        if self.conversations.remove(&id).is_none() {
            return self;
        }
        self.touch()
    }
}

// Queries.
impl NarrativeState {
    pub fn player_name(&self) -> &str {
        &self.identity.player_name
    }

    pub fn difficulty(&self) -> Difficulty {
        self.identity.difficulty
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Case-insensitive lookup by display name.
    pub fn character_by_name(&self, name: &str) -> Option<&Character> {
        let name = name.trim();
        self.characters
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Display name for a party.
    pub fn party_name(&self, party: Party) -> &str {
        match party {
            Party::Player => self.player_name(),
            Party::Npc(id) => self
                .characters
                .get(&id)
                .map(|c| c.name.as_str())
                .unwrap_or("someone"),
        }
    }

    /// Alive, present characters that can take part in new arcs.
    pub fn eligible_characters(&self) -> Vec<&Character> {
        self.characters.values().filter(|c| c.is_available()).collect()
    }

    /// Look an arc up in the active, completed and queued lists.
    pub fn arc(&self, id: ArcId) -> Option<&StoryArc> {
        self.active_arcs
            .iter()
            .chain(self.completed_arcs.iter())
            .chain(self.queued_arcs.iter())
            .find(|a| a.id == id)
    }

    pub fn active_arc(&self, id: ArcId) -> Option<&StoryArc> {
        self.active_arcs.iter().find(|a| a.id == id)
    }

    /// Active arcs a character takes part in.
    pub fn arcs_for(&self, character: CharacterId) -> Vec<&StoryArc> {
        self.active_arcs
            .iter()
            .filter(|a| a.involves(character))
            .collect()
    }

    /// Number of active arcs a character takes part in.
    pub fn arc_involvement(&self, character: CharacterId) -> usize {
        self.active_arcs.iter().filter(|a| a.involves(character)).count()
    }

    /// Active arcs in a given phase.
    pub fn arcs_in_phase(&self, phase: ArcPhase) -> Vec<&StoryArc> {
        self.active_arcs.iter().filter(|a| a.phase == phase).collect()
    }

    pub fn fact(&self, id: FactId) -> Option<&WorldFact> {
        self.facts.get(&id)
    }

    pub fn facts_known_by(&self, party: Party) -> Vec<&WorldFact> {
        self.facts.values().filter(|f| f.is_known_by(party)).collect()
    }

    /// Facts whose subject is the given character.
    pub fn facts_about(&self, character: CharacterId) -> Vec<&WorldFact> {
        self.facts
            .values()
            .filter(|f| f.subject == Some(character))
            .collect()
    }

    pub fn knowledge_of(&self, character: CharacterId) -> Option<&NpcKnowledge> {
        self.knowledge.get(&character)
    }

    pub fn relationship(&self, from: Party, to: Party) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.connects(from, to))
    }

    /// The last `count` timeline entries, oldest first.
    pub fn recent_timeline(&self, count: usize) -> &[TimelineEvent] {
        let start = self.timeline.len().saturating_sub(count);
        &self.timeline[start..]
    }

    /// Consequences that have manifested by `day`.
    pub fn due_consequences(&self, day: u32) -> Vec<&PendingConsequence> {
        self.pending_consequences
            .iter()
            .filter(|c| c.is_due(day))
            .collect()
    }

    pub fn conversation(&self, id: ConversationId) -> Option<&GroupConversationState> {
        self.conversations.get(&id)
    }

    /// Player actions recorded on or after `day`.
    pub fn player_actions_since(&self, day: u32) -> impl Iterator<Item = &PlayerAction> {
        self.player_actions.iter().filter(move |a| a.day >= day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanics::{ArcCategory, FactCategory, Importance, PlayerInvolvement};

    fn state_with(names: &[&str]) -> (NarrativeState, Vec<CharacterId>) {
        let characters: Vec<_> = names.iter().map(|n| Character::new(*n)).collect();
        let ids = characters.iter().map(|c| c.id).collect();
        let state = NarrativeState::new(
            PlaythroughRef::new("Alex", "suburban family drama", Difficulty::Dramatic),
            characters,
        );
        (state, ids)
    }

    fn bare_arc(title: &str) -> StoryArc {
        StoryArc {
            id: ArcId::new(),
            template_id: title.to_lowercase(),
            category: ArcCategory::Crisis,
            title: title.to_string(),
            premise: String::new(),
            participants: BTreeMap::new(),
            phase: ArcPhase::Setup,
            beats: Vec::new(),
            tension: 20.0,
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
    fn test_unknown_ids_are_no_ops() {
        let (state, _) = state_with(&["Dana", "Eli"]);
        let ghost = CharacterId::new();

        let next = state
            .clone()
            .update_relationship(Party::Npc(ghost), Party::Player, MetricDelta::trust(10.0), "?")
            .learn_fact(Party::Player, FactId::new(), KnowledgeSource::Initial)
            .trigger_beat(ArcId::new(), BeatId::new())
            .progress_arc_phase(ArcId::new())
            .complete_arc(ArcId::new())
            .set_character_status(ghost, CharacterStatus::Dead)
            .end_conversation(ConversationId::new());

        assert_eq!(next, state);
    }

    #[test]
    fn test_mutators_return_new_value() {
        let (state, ids) = state_with(&["Dana"]);
        let before = state.clone();

        let after = state.update_relationship(
            Party::Npc(ids[0]),
            Party::Player,
            MetricDelta::trust(-15.0),
            "caught lying",
        );

        let old = before.relationship(Party::Npc(ids[0]), Party::Player).unwrap();
        let new = after.relationship(Party::Npc(ids[0]), Party::Player).unwrap();
        assert_eq!(new.metrics.trust, old.metrics.trust - 15.0);
        assert_eq!(new.history.len(), old.history.len() + 1);
    }

    #[test]
    fn test_learn_fact_grows_known_by_and_knowledge() {
        let (state, ids) = state_with(&["Dana", "Eli"]);
        let fact = WorldFact::new("Dana lost her job", FactCategory::Secret)
            .with_importance(Importance::Major)
            .with_subject(ids[0])
            .known_by(ids[0]);
        let fact_id = fact.id;

        let state = state
            .add_fact(fact)
            .learn_fact(Party::Npc(ids[1]), fact_id, KnowledgeSource::ToldBy(Party::Npc(ids[0])));

        let fact = state.fact(fact_id).unwrap();
        assert!(fact.is_known_by(Party::Npc(ids[0])));
        assert!(fact.is_known_by(Party::Npc(ids[1])));
        assert!(state.knowledge_of(ids[1]).unwrap().secrets.contains(&fact_id));
        assert_eq!(state.facts_about(ids[0]).len(), 1);
    }

    #[test]
    fn test_add_fact_drops_unknown_knowers() {
        let (state, ids) = state_with(&["Dana"]);
        let ghost = CharacterId::new();
        let fact = WorldFact::new("The house is mortgaged twice", FactCategory::Secret)
            .known_by(ids[0])
            .known_by(ghost)
            .known_by(Party::Player);
        let fact_id = fact.id;

        let state = state.add_fact(fact);
        let fact = state.fact(fact_id).unwrap();
        assert!(fact.is_known_by(Party::Npc(ids[0])));
        assert!(fact.is_known_to_player());
        assert!(!fact.is_known_by(Party::Npc(ghost)));
        assert!(state.knowledge_of(ghost).is_none());
    }

    #[test]
    fn test_link_arcs_leaves_completed_arcs_alone() {
        let (state, _) = state_with(&[]);
        let (done, open, queued) = (bare_arc("Done"), bare_arc("Open"), bare_arc("Queued"));
        let (done_id, open_id, queued_id) = (done.id, open.id, queued.id);
        let state = state
            .install_arc(done, Vec::new())
            .install_arc(open, Vec::new())
            .queue_arc(queued, Vec::new())
            .complete_arc(done_id);

        let linked = state.clone().link_arcs(done_id, open_id);
        assert_eq!(linked, state);
        let linked = state.clone().link_arcs(open_id, done_id);
        assert_eq!(linked, state);

        let state = state.link_arcs(open_id, queued_id);
        assert_eq!(state.active_arc(open_id).unwrap().children, vec![queued_id]);
        assert_eq!(state.arc(queued_id).unwrap().parent, Some(open_id));
    }

    #[test]
    fn test_reputation_and_tension_are_clamped() {
        let (state, _) = state_with(&[]);
        let state = state
            .adjust_reputation("honesty", 80.0)
            .adjust_reputation("honesty", 80.0)
            .set_global_tension(140.0);

        assert_eq!(state.reputation["honesty"], 100.0);
        assert_eq!(state.global_tension, 100.0);
    }

    #[test]
    fn test_consequences_drop_when_due() {
        let (state, _) = state_with(&[]);
        let state = state
            .schedule_consequence(PendingConsequence::new("a", "x", 0, 2))
            .schedule_consequence(PendingConsequence::new("b", "x", 0, 6));

        assert_eq!(state.due_consequences(3).len(), 1);
        let state = state.drop_due_consequences(3);
        assert_eq!(state.pending_consequences.len(), 1);
        assert_eq!(state.pending_consequences[0].description, "b");
    }

    #[test]
    fn test_character_lookup_by_name() {
        let (state, ids) = state_with(&["Dana", "Eli"]);
        assert_eq!(state.character_by_name(" eli ").map(|c| c.id), Some(ids[1]));
        assert!(state.character_by_name("Zed").is_none());
    }

    #[test]
    fn test_record_player_action_hits_timeline() {
        let (state, ids) = state_with(&["Dana"]);
        let state = state.record_player_action("apologised to Dana", Some(ids[0]));
        assert_eq!(state.player_actions.len(), 1);
        assert_eq!(state.timeline.last().unwrap().kind, TimelineKind::PlayerAction);
        assert_eq!(state.player_actions_since(0).count(), 1);
    }
}
