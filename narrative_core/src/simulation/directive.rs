//! Directive generation for simulated time-jumps.

use rand::Rng;
use serde::{Deserialize, Serialize};
use story_state::{
    ArcId, ArcPhase, BeatId, BeatTrigger, BeatType, CharacterId, EmotionalState, Meters,
    NarrativeState, Party, PendingConsequence, StoryArc, StoryBeat,
};

use crate::config::SimulationConfig;
use crate::group::{mood_goal, role_goal};

/// A beat the simulation should (or may) bring about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatDirective {
    pub arc: ArcId,
    pub arc_title: String,
    pub beat: BeatId,
    pub beat_type: BeatType,
    pub content: String,
    pub weight: u8,
    pub participants: Vec<String>,
}

/// What one NPC is up to while the player is away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffscreenAgenda {
    pub character: CharacterId,
    pub name: String,
    pub mood: EmotionalState,
    pub goals: Vec<String>,
}

/// An arc the simulation should spend most of its attention on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcFocus {
    pub arc: ArcId,
    pub title: String,
    pub phase: ArcPhase,
    pub tension: f32,
}

/// Structured guidance for one simulated time-jump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDirective {
    pub from_day: u32,
    pub days: u32,
    /// Beats whose conditions are met, heaviest first.
    pub mandatory_beats: Vec<BeatDirective>,
    pub possible_beats: Vec<BeatDirective>,
    pub npc_agendas: Vec<OffscreenAgenda>,
    pub due_consequences: Vec<PendingConsequence>,
    pub world_guidance: Vec<String>,
    pub target_tension: f32,
    pub focus_arcs: Vec<ArcFocus>,
}

impl SimulationDirective {
    /// Day the jump ends on.
    pub fn to_day(&self) -> u32 {
        self.from_day.saturating_add(self.days)
    }
}

/// Target tension adjustment for each active arc in a phase.
fn phase_pressure(phase: ArcPhase) -> f32 {
    match phase {
        ArcPhase::Setup => 0.0,
        ArcPhase::Rising => 2.0,
        ArcPhase::Climax => 5.0,
        ArcPhase::Resolution => -5.0,
        ArcPhase::Aftermath => -8.0,
    }
}

fn phase_guidance(arc: &StoryArc) -> String {
    let title = &arc.title;
    match arc.phase {
        ArcPhase::Setup => format!("\"{title}\" is just beginning; plant small hints only"),
        ArcPhase::Rising => format!("\"{title}\" is building; raise the stakes for those involved"),
        ArcPhase::Climax => format!("\"{title}\" is at its climax; bring it to a head"),
        ArcPhase::Resolution => format!("\"{title}\" is resolving; let the dust start to settle"),
        ArcPhase::Aftermath => format!("\"{title}\" is over; show how people live with it"),
    }
}

fn meter_guidance(name: &str) -> &'static str {
    match name {
        "health" => "The player is worn down; let exhaustion or illness colour events",
        "happiness" => "The player is unhappy; give someone a reason to notice",
        "wealth" => "Money is tight for the player; let it limit their options",
        "social" => "The player has been isolated; someone may reach out or drift away",
        "career" => "The player's work is suffering; let that have consequences",
        _ => "One of the player's needs is being neglected",
    }
}

/// Builds directives from the current state.
#[derive(Debug, Clone, Default)]
pub struct DirectiveGenerator {
    config: SimulationConfig,
}

impl DirectiveGenerator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Whether a beat's trigger holds once the jump of `days` is over.
    pub fn trigger_satisfied(
        &self,
        state: &NarrativeState,
        arc: &StoryArc,
        beat: &StoryBeat,
        days: u32,
    ) -> bool {
        let end_day = state.current_day.saturating_add(days);
        match &beat.trigger {
            BeatTrigger::DayElapsed { days } => end_day.saturating_sub(arc.started_day) >= *days,
            BeatTrigger::MessageCount { count } => state.message_count >= *count,
            BeatTrigger::TensionThreshold { tension } => {
                arc.tension.max(state.global_tension) >= *tension
            }
            BeatTrigger::PlayerAction { keyword } => {
                let keyword = keyword.to_lowercase();
                state
                    .player_actions_since(arc.started_day)
                    .any(|a| a.description.to_lowercase().contains(&keyword))
            }
            BeatTrigger::Random { .. } => false,
        }
    }

    pub fn target_tension(&self, state: &NarrativeState, days: u32) -> f32 {
        let pressure: f32 = state.active_arcs.iter().map(|a| phase_pressure(a.phase)).sum();
        (state.global_tension + self.config.tension_per_day * days as f32 + pressure).clamp(
            self.config.min_target_tension,
            self.config.max_target_tension,
        )
    }

    /// Assemble the directive for a jump of `days` days.
    pub fn generate<R>(
        &self,
        state: &NarrativeState,
        days: u32,
        meters: &Meters,
        rng: &mut R,
    ) -> SimulationDirective
    where
        R: Rng + ?Sized,
    {
        let mut mandatory = Vec::new();
        let mut possible = Vec::new();
        for arc in &state.active_arcs {
            for beat in arc.ready_beats() {
                if self.trigger_satisfied(state, arc, beat, days) {
                    mandatory.push(beat_directive(state, arc, beat));
                    continue;
                }
                if !beat.trigger.is_npc_triggerable() {
                    continue;
                }
                let gate = match beat.trigger {
                    BeatTrigger::Random { probability } => probability,
                    _ => f32::from(beat.weight) / 10.0,
                };
                if rng.gen::<f32>() < gate {
                    possible.push(beat_directive(state, arc, beat));
                }
            }
        }
        mandatory.sort_by(|a, b| b.weight.cmp(&a.weight));

        let mut guidance: Vec<String> = meters
            .entries()
            .iter()
            .filter(|(_, value)| *value < self.config.low_meter)
            .map(|(name, _)| meter_guidance(name).to_string())
            .collect();
        guidance.extend(state.active_arcs.iter().map(phase_guidance));

        SimulationDirective {
            from_day: state.current_day,
            days,
            mandatory_beats: mandatory,
            possible_beats: possible,
            npc_agendas: self.offscreen_agendas(state),
            due_consequences: state
                .due_consequences(state.current_day.saturating_add(days))
                .into_iter()
                .cloned()
                .collect(),
            world_guidance: guidance,
            target_tension: self.target_tension(state, days),
            focus_arcs: self.focus_arcs(state),
        }
    }

    fn offscreen_agendas(&self, state: &NarrativeState) -> Vec<OffscreenAgenda> {
        let player = state.player_name();
        state
            .characters
            .values()
            .filter(|c| c.is_alive())
            .map(|c| {
                let mut goals = vec![mood_goal(c.emotional_state).to_string()];
                for arc in state.arcs_for(c.id) {
                    if let Some(role) = arc.role_of(c.id) {
                        goals.push(format!("In \"{}\", {}", arc.title, role_goal(role)));
                    }
                }
                if let Some(rel) = state.relationship(Party::Npc(c.id), Party::Player) {
                    let m = &rel.metrics;
                    if m.trust < 20.0 {
                        goals.push(format!("Keep {player} at arm's length"));
                    }
                    if m.affection >= 60.0 {
                        goals.push(format!("Find time to spend with {player}"));
                    }
                    if m.rivalry >= 60.0 {
                        goals.push(format!("Get ahead of {player}"));
                    }
                    if m.fear >= 50.0 {
                        goals.push(format!("Avoid crossing {player}"));
                    }
                    if m.dependency >= 60.0 {
                        goals.push(format!("Lean on {player} for support"));
                    }
                }
                OffscreenAgenda {
                    character: c.id,
                    name: c.name.clone(),
                    mood: c.emotional_state,
                    goals,
                }
            })
            .collect()
    }

    /// Climax arcs, then high-tension rising arcs, then main arcs.
    fn focus_arcs(&self, state: &NarrativeState) -> Vec<ArcFocus> {
        let rank = |arc: &StoryArc| match arc.phase {
            ArcPhase::Climax => Some(0),
            ArcPhase::Rising if arc.tension >= 60.0 => Some(1),
            _ if arc.is_main => Some(2),
            _ => None,
        };
        let mut ranked: Vec<(u8, &StoryArc)> = state
            .active_arcs
            .iter()
            .filter_map(|a| rank(a).map(|r| (r, a)))
            .collect();
        ranked.sort_by(|(ra, a), (rb, b)| ra.cmp(rb).then(b.tension.total_cmp(&a.tension)));
        ranked
            .into_iter()
            .take(self.config.max_focus_arcs)
            .map(|(_, a)| ArcFocus {
                arc: a.id,
                title: a.title.clone(),
                phase: a.phase,
                tension: a.tension,
            })
            .collect()
    }
}

fn beat_directive(state: &NarrativeState, arc: &StoryArc, beat: &StoryBeat) -> BeatDirective {
    BeatDirective {
        arc: arc.id,
        arc_title: arc.title.clone(),
        beat: beat.id,
        beat_type: beat.beat_type,
        content: beat.content.clone(),
        weight: beat.weight,
        participants: arc
            .participants
            .keys()
            .map(|id| state.party_name((*id).into()).to_string())
            .collect(),
    }
}
