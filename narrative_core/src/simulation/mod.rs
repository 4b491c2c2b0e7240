//! Simulated time-jumps.
//!
//! Before the external model simulates a stretch of off-screen days,
//! [`DirectiveGenerator`] tells it which beats must happen, which may, what
//! every NPC is after and where tension should land. [`ResultProcessor`]
//! then applies the parsed [`SimulationResult`](crate::events::SimulationResult).

mod directive;
mod results;

pub use directive::*;
pub use results::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::events::{NpcChange, SimEvent, SimulationResult};
    use crate::knowledge_base::KnowledgeGraph;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;
    use story_state::{
        ArcCategory, ArcId, ArcPhase, ArcRole, BeatId, BeatTrigger, BeatType, Character,
        CharacterId, CharacterStatus, Difficulty, Meters, MetricDelta, NarrativeState, Party,
        PlayerInvolvement, PlaythroughRef, StoryArc, StoryBeat, TimelineKind,
    };

    fn cast() -> (NarrativeState, Vec<CharacterId>) {
        let people = vec![Character::new("Ana"), Character::new("Ben")];
        let ids = people.iter().map(|c| c.id).collect();
        let state = NarrativeState::new(
            PlaythroughRef::new("Alex", "office", Difficulty::Dramatic),
            people,
        );
        (state, ids)
    }

    fn beat(phase: ArcPhase, content: &str, trigger: BeatTrigger, weight: u8) -> StoryBeat {
        StoryBeat {
            id: BeatId::new(),
            beat_type: BeatType::Escalation,
            phase,
            content: content.to_string(),
            trigger,
            weight,
            triggered: false,
            triggered_day: None,
            prerequisites: Vec::new(),
        }
    }

    fn arc(title: &str, ids: &[CharacterId], beats: Vec<StoryBeat>) -> StoryArc {
        StoryArc {
            id: ArcId::new(),
            template_id: title.to_lowercase(),
            category: ArcCategory::Conflict,
            title: title.to_string(),
            premise: "Two coworkers fall out".to_string(),
            participants: ids
                .iter()
                .zip([ArcRole::Protagonist, ArcRole::Rival])
                .map(|(id, role)| (*id, role))
                .collect::<BTreeMap<_, _>>(),
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

    fn days(n: u32) -> BeatTrigger {
        BeatTrigger::DayElapsed { days: n }
    }

    fn quiet_rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    #[test]
    fn test_mandatory_beats_heaviest_first() {
        let (state, ids) = cast();
        let state = state.install_arc(
            arc(
                "Feud",
                &ids,
                vec![
                    beat(ArcPhase::Setup, "Ana snaps at Ben", days(2), 3),
                    beat(ArcPhase::Setup, "Ben takes credit for Ana's work", days(2), 9),
                    beat(
                        ArcPhase::Setup,
                        "Ana asks Alex to choose",
                        BeatTrigger::PlayerAction { keyword: "resign".to_string() },
                        5,
                    ),
                ],
            ),
            Vec::new(),
        );

        let directive = DirectiveGenerator::default().generate(&state, 3, &Meters::default(), &mut quiet_rng());
        assert_eq!(directive.mandatory_beats.len(), 2);
        assert_eq!(directive.mandatory_beats[0].weight, 9);
        assert!(directive.possible_beats.is_empty());
        assert_eq!(directive.to_day(), 3);

        let short = DirectiveGenerator::default().generate(&state, 1, &Meters::default(), &mut quiet_rng());
        assert!(short.mandatory_beats.is_empty());
    }

    #[test]
    fn test_player_action_trigger() {
        let (state, ids) = cast();
        let state = state
            .install_arc(
                arc(
                    "Feud",
                    &ids,
                    vec![beat(
                        ArcPhase::Setup,
                        "Ana asks Alex to choose",
                        BeatTrigger::PlayerAction { keyword: "resign".to_string() },
                        5,
                    )],
                ),
                Vec::new(),
            )
            .record_player_action("Alex threatened to Resign", None);

        let directive = DirectiveGenerator::default().generate(&state, 1, &Meters::default(), &mut quiet_rng());
        assert_eq!(directive.mandatory_beats.len(), 1);
    }

    #[test]
    fn test_target_tension_clamped() {
        let (state, _) = cast();
        let generator = DirectiveGenerator::default();
        assert_eq!(generator.target_tension(&state, 5), 50.0);
        assert_eq!(generator.target_tension(&state.clone().set_global_tension(90.0), 10), 95.0);
        assert_eq!(generator.target_tension(&state.set_global_tension(0.0), 0), 10.0);
    }

    #[test]
    fn test_guidance_and_agendas() {
        let (state, ids) = cast();
        let state = state.set_character_status(ids[1], CharacterStatus::Dead);
        let meters = Meters { health: 20.0, ..Default::default() };

        let directive = DirectiveGenerator::default().generate(&state, 2, &meters, &mut quiet_rng());
        assert_eq!(directive.world_guidance.len(), 1);
        assert!(directive.world_guidance[0].contains("worn down"));
        assert_eq!(directive.npc_agendas.len(), 1);
        assert_eq!(directive.npc_agendas[0].name, "Ana");
    }

    #[test]
    fn test_focus_arcs_order() {
        let (state, ids) = cast();
        let mut main = arc("Main", &ids, Vec::new());
        main.is_main = true;
        let mut climax = arc("Climax", &ids, Vec::new());
        climax.phase = ArcPhase::Climax;
        let mut hot = arc("Hot", &ids, Vec::new());
        hot.phase = ArcPhase::Rising;
        hot.tension = 70.0;
        let mut cold = arc("Cold", &ids, Vec::new());
        cold.phase = ArcPhase::Rising;

        let state = [main, cold, hot, climax]
            .into_iter()
            .fold(state, |s, a| s.install_arc(a, Vec::new()));
        let directive = DirectiveGenerator::default().generate(&state, 1, &Meters::default(), &mut quiet_rng());
        let titles: Vec<&str> = directive.focus_arcs.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Climax", "Hot", "Main"]);
    }

    #[test]
    fn test_phase_advances_after_setup() {
        let (state, ids) = cast();
        let first = beat(ArcPhase::Setup, "Ana snaps at Ben", days(1), 3);
        let second = beat(ArcPhase::Setup, "Ben complains to the boss", days(1), 3);
        let (b1, b2) = (first.id, second.id);
        let feud = arc(
            "Feud",
            &ids,
            vec![first, second, beat(ArcPhase::Rising, "Shouting match", days(5), 6)],
        );
        let arc_id = feud.id;
        let state = state
            .install_arc(feud, Vec::new())
            .trigger_beat(arc_id, b1)
            .trigger_beat(arc_id, b2);

        let generator = DirectiveGenerator::default();
        let directive = generator.generate(&state, 1, &Meters::default(), &mut quiet_rng());
        let state = ResultProcessor::default().process(
            state,
            &directive,
            &SimulationResult::default(),
            &mut quiet_rng(),
        );

        assert_eq!(state.active_arc(arc_id).unwrap().phase, ArcPhase::Rising);
        assert_eq!(state.current_day, 1);
    }

    #[test]
    fn test_event_fires_matching_beat() {
        let (state, ids) = cast();
        let confrontation = beat(
            ArcPhase::Setup,
            "Marcus confronts Helen about the forged contract",
            days(30),
            9,
        );
        let beat_id = confrontation.id;
        let feud = arc("Feud", &ids, vec![confrontation]);
        let arc_id = feud.id;
        let state = state.install_arc(feud, Vec::new());

        let directive = DirectiveGenerator::default().generate(&state, 2, &Meters::default(), &mut quiet_rng());
        let result = SimulationResult {
            events: vec![SimEvent::new("Helen was confronted by Marcus over the forged contract")
                .with_involved("ana")],
            npc_changes: Vec::new(),
        };
        let state = ResultProcessor::default().process(state, &directive, &result, &mut quiet_rng());

        assert!(state.active_arc(arc_id).unwrap().beat(beat_id).unwrap().triggered);
        let simulated = state
            .timeline
            .iter()
            .find(|e| e.kind == TimelineKind::Simulated)
            .unwrap();
        assert_eq!(simulated.involved, vec![ids[0]]);
        assert_eq!(simulated.day, 2);
        assert_eq!(state.pending_consequences.len(), 1);
        assert_eq!(state.pending_consequences[0].manifest_day, 4);
    }

    #[test]
    fn test_timeline_stays_chronological_after_jump() {
        let (state, ids) = cast();
        let setup = beat(ArcPhase::Setup, "Marcus confronts Helen about the forged contract", days(30), 9);
        let beat_id = setup.id;
        let feud = arc("Feud", &ids, vec![setup, beat(ArcPhase::Rising, "Shouting match", days(30), 3)]);
        let arc_id = feud.id;
        let state = state.advance_days(4).install_arc(feud, Vec::new());

        let directive = DirectiveGenerator::default().generate(&state, 3, &Meters::default(), &mut quiet_rng());
        let result = SimulationResult {
            events: vec![SimEvent::new("Helen was confronted by Marcus over the forged contract")],
            npc_changes: vec![NpcChange::new("Ben").with_note("Ben was killed in a crash")],
        };
        let state = ResultProcessor::default().process(state, &directive, &result, &mut quiet_rng());

        let days: Vec<u32> = state.timeline.iter().map(|e| e.day).collect();
        assert!(days.windows(2).all(|w| w[0] <= w[1]), "timeline out of order: {days:?}");
        let arc = state.active_arc(arc_id).unwrap();
        assert_eq!(arc.beat(beat_id).unwrap().triggered_day, Some(7));
        assert_eq!(arc.phase, ArcPhase::Rising);
        assert!(state
            .timeline
            .iter()
            .filter(|e| e.kind != TimelineKind::ArcStarted)
            .all(|e| e.day == 7));
        assert_eq!(state.current_day, 7);
    }

    #[test]
    fn test_npc_changes_applied() {
        let (state, ids) = cast();
        let directive = DirectiveGenerator::default().generate(&state, 1, &Meters::default(), &mut quiet_rng());
        let result = SimulationResult {
            events: Vec::new(),
            npc_changes: vec![
                NpcChange::new("ANA")
                    .with_relationship(MetricDelta::trust(-10.0))
                    .with_learned("The bakery is closing"),
                NpcChange::new("Ben").with_note("Ben passed away in his sleep"),
                NpcChange::new("Zed").with_relationship(MetricDelta::trust(50.0)),
            ],
        };
        let state = ResultProcessor::default().process(state, &directive, &result, &mut quiet_rng());

        let rel = state.relationship(Party::Npc(ids[0]), Party::Player).unwrap();
        assert_eq!(rel.metrics.trust, 30.0);
        assert!(state
            .facts_known_by(Party::Npc(ids[0]))
            .iter()
            .any(|f| f.content == "The bakery is closing"));
        assert_eq!(state.character(ids[1]).unwrap().status, CharacterStatus::Dead);
        assert!(state.timeline.iter().any(|e| e.kind == TimelineKind::Death));
    }

    #[test]
    fn test_tension_moves_halfway_to_target() {
        let (state, _) = cast();
        let mut directive = DirectiveGenerator::default().generate(&state, 1, &Meters::default(), &mut quiet_rng());
        directive.target_tension = 60.0;
        let processor = ResultProcessor::new(SimulationConfig::default(), KnowledgeGraph::default());
        let state = processor.process(state, &directive, &SimulationResult::default(), &mut quiet_rng());
        assert_eq!(state.global_tension, 50.0);
    }

    #[test]
    fn test_closing_arc_completes_and_queue_advances() {
        let (state, ids) = cast();
        let mut beats: Vec<StoryBeat> = (0..5)
            .map(|i| beat(ArcPhase::Resolution, &format!("step {i}"), days(1), 2))
            .collect();
        for b in beats.iter_mut().take(4) {
            b.triggered = true;
        }
        let mut ending = arc("Ending", &ids, beats);
        ending.phase = ArcPhase::Resolution;
        let ending_id = ending.id;
        let next = arc("Next", &ids, Vec::new());
        let next_id = next.id;
        let state = state.install_arc(ending, Vec::new()).queue_arc(next, Vec::new());

        let directive = DirectiveGenerator::default().generate(&state, 1, &Meters::default(), &mut quiet_rng());
        let state = ResultProcessor::default().process(
            state,
            &directive,
            &SimulationResult::default(),
            &mut quiet_rng(),
        );

        assert!(state.completed_arcs.iter().any(|a| a.id == ending_id));
        assert!(state.active_arc(next_id).is_some());
        assert!(state.queued_arcs.is_empty());
    }
}
