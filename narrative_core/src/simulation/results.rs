//! Folding a simulated time-jump back into the narrative state.

use rand::Rng;
use story_state::{
    ArcId, BeatId, CharacterId, CharacterStatus, FactCategory, FactId, Importance,
    KnowledgeSource, NarrativeState, Party, PendingConsequence, TimelineEvent, TimelineKind,
    WorldFact,
};
use tracing::{debug, warn};

use super::SimulationDirective;
use crate::config::SimulationConfig;
use crate::events::{NpcChange, SimEvent, SimulationResult};
use crate::knowledge_base::KnowledgeGraph;
use crate::text::{mentions_any, shared_key_words};

const DEATH_WORDS: &[&str] = &[
    "died", "dies", "dead", "passed away", "killed", "murdered", "funeral",
];

/// Beats at or above this weight leave a pending consequence when fired.
const FALLOUT_WEIGHT: u8 = 8;

/// Applies a [`SimulationResult`] to the state.
#[derive(Debug, Clone, Default)]
pub struct ResultProcessor {
    config: SimulationConfig,
    knowledge: KnowledgeGraph,
}

impl ResultProcessor {
    pub fn new(config: SimulationConfig, knowledge: KnowledgeGraph) -> Self {
        Self { config, knowledge }
    }

    /// Apply the outcome of the jump described by `directive`.
    ///
    /// The clock moves forward first, so everything recorded here is dated
    /// to the end of the jump. Events go on the timeline and fire any ready
    /// beat they describe. NPC changes update relationships, moods, knowledge
    /// and deaths. Arcs then advance or complete, due consequences are
    /// dropped, global tension closes half the gap to the target, and facts
    /// get one propagation pass.
    pub fn process<R>(
        &self,
        state: NarrativeState,
        directive: &SimulationDirective,
        result: &SimulationResult,
        rng: &mut R,
    ) -> NarrativeState
    where
        R: Rng + ?Sized,
    {
        let state = state.advance_days(directive.days);
        let day = state.current_day;
        let state = result
            .events
            .iter()
            .fold(state, |s, event| self.record_event(s, event, day));
        let state = result
            .npc_changes
            .iter()
            .fold(state, |s, change| self.apply_change(s, change, day, rng));
        let state = self.progress_arcs(state).drop_due_consequences(day);

        let gap = directive.target_tension - state.global_tension;
        let tension = state.global_tension + gap * self.config.tension_convergence;
        let state = state.set_global_tension(tension);

        let (state, hops) = self.knowledge.propagate(state, rng);
        debug!(
            days = directive.days,
            events = result.events.len(),
            hops = hops.len(),
            "simulation results applied"
        );
        state
    }

    fn record_event(&self, state: NarrativeState, event: &SimEvent, day: u32) -> NarrativeState {
        let involved: Vec<CharacterId> = event
            .involved
            .iter()
            .filter_map(|name| {
                let id = state.character_by_name(name).map(|c| c.id);
                if id.is_none() {
                    warn!(name = %name, "simulated event names an unknown character");
                }
                id
            })
            .collect();

        let description = event.description.as_str();
        let (min_len, needed) = (self.config.beat_match_min_len, self.config.beat_match_words);
        let matched: Vec<(ArcId, BeatId)> = state
            .active_arcs
            .iter()
            .flat_map(|arc| {
                arc.ready_beats()
                    .filter(move |b| shared_key_words(description, &b.content, min_len) >= needed)
                    .map(move |b| (arc.id, b.id))
            })
            .collect();

        let state = state.add_timeline_event(
            TimelineEvent::new(day, TimelineKind::Simulated, event.description.clone())
                .with_involved(involved),
        );
        matched
            .into_iter()
            .fold(state, |s, (arc, beat)| self.fire_beat(s, arc, beat, day))
    }

    fn fire_beat(&self, state: NarrativeState, arc_id: ArcId, beat_id: BeatId, day: u32) -> NarrativeState {
        let fallout = state.active_arc(arc_id).and_then(|arc| {
            let beat = arc.beat(beat_id).filter(|b| b.weight >= FALLOUT_WEIGHT)?;
            let consequence = PendingConsequence::new(
                format!("Fallout: {}", beat.content),
                arc.title.clone(),
                day,
                day.saturating_add(self.config.consequence_delay_days),
            )
            .with_severity(Importance::Major)
            .with_arc(arc_id);
            Some(
                arc.participants
                    .keys()
                    .fold(consequence, |c, id| c.with_involved(*id)),
            )
        });

        debug!(arc = %arc_id, beat = %beat_id, "simulated event fired beat");
        let state = state.trigger_beat(arc_id, beat_id);
        match fallout {
            Some(consequence) => state.schedule_consequence(consequence),
            None => state,
        }
    }

    fn apply_change<R>(
        &self,
        state: NarrativeState,
        change: &NpcChange,
        day: u32,
        rng: &mut R,
    ) -> NarrativeState
    where
        R: Rng + ?Sized,
    {
        let Some(npc) = state.character_by_name(&change.name).map(|c| c.id) else {
            warn!(name = %change.name, "change for unknown character skipped");
            return state;
        };
        let mut state = state;

        if let Some(delta) = change.relationship {
            let target = match change.toward.as_deref() {
                None => Some(Party::Player),
                Some(name) => {
                    let target = state.character_by_name(name).map(|c| Party::Npc(c.id));
                    if target.is_none() {
                        warn!(name = %name, "relationship change toward unknown character skipped");
                    }
                    target
                }
            };
            if let Some(to) = target {
                let reason = change
                    .note
                    .clone()
                    .unwrap_or_else(|| "off-screen events".to_string());
                state = state.update_relationship(Party::Npc(npc), to, delta, reason);
            }
        }

        if let Some(mood) = change.mood() {
            state = state.set_emotional_state(npc, mood);
        }

        for text in change.learned.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            state = self.learn_text(state, npc, text, day, rng);
        }

        let died = change.died
            || change
                .note
                .as_deref()
                .is_some_and(|note| mentions_any(note, DEATH_WORDS));
        if died && state.character(npc).is_some_and(|c| c.is_alive()) {
            let name = state.party_name(npc.into()).to_string();
            state = state
                .set_character_status(npc, CharacterStatus::Dead)
                .add_timeline_event(
                    TimelineEvent::new(day, TimelineKind::Death, format!("{name} died"))
                        .with_involved([npc]),
                );
        }
        state
    }

    /// Teach `npc` a fact by its text, creating it as an event if no fact
    /// with the same content exists.
    fn learn_text<R>(
        &self,
        state: NarrativeState,
        npc: CharacterId,
        text: &str,
        day: u32,
        rng: &mut R,
    ) -> NarrativeState
    where
        R: Rng + ?Sized,
    {
        let existing = state
            .facts
            .values()
            .find(|f| f.content.trim().eq_ignore_ascii_case(text))
            .map(|f| f.id);
        let (state, id) = match existing {
            Some(id) => (state, id),
            None => {
                let fact = WorldFact::new(text, FactCategory::Event)
                    .with_id(FactId::from_rng(rng))
                    .with_day(day);
                let id = fact.id;
                (state.add_fact(fact), id)
            }
        };
        self.knowledge
            .learn(state, Party::Npc(npc), id, KnowledgeSource::Simulated)
    }

    /// Close arcs that are far enough through their ending, otherwise move
    /// arcs whose current phase is mostly done into the next phase.
    fn progress_arcs(&self, state: NarrativeState) -> NarrativeState {
        let ids: Vec<ArcId> = state.active_arcs.iter().map(|a| a.id).collect();
        ids.into_iter().fold(state, |state, id| {
            let Some(arc) = state.active_arc(id) else {
                return state;
            };
            if arc.phase.is_closing() && arc.total_progress() >= self.config.completion_ratio {
                debug!(arc = %id, "arc completed");
                return state.complete_arc(id).activate_next_queued();
            }
            if arc.phase.next().is_some()
                && arc.phase_progress(arc.phase) >= self.config.phase_advance_ratio
            {
                debug!(arc = %id, phase = arc.phase.name(), "arc phase advanced");
                return state.progress_arc_phase(id);
            }
            state
        })
    }
}
