//! End-to-end scenarios across the state store and the engine components.

use std::collections::BTreeMap;

use narrative_core::{
    calculate_tension, EngineConfig, GroupConfig, KnowledgeGraph, NarrativeEngine,
    SimulationResult,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use story_state::{
    deserialize, serialize, ArcCategory, ArcId, ArcPhase, ArcRole, BeatId, BeatTrigger, BeatType,
    Character, CharacterId, Difficulty, FactCategory, Importance, Meters, MetricDelta,
    NarrativeState, Party, PlayerInvolvement, PlaythroughRef, StoryArc, StoryBeat, WorldFact,
};

fn cast(names: &[&str], difficulty: Difficulty) -> (NarrativeState, Vec<CharacterId>) {
    let people: Vec<Character> = names.iter().map(|n| Character::new(*n)).collect();
    let ids = people.iter().map(|c| c.id).collect();
    let state = NarrativeState::new(PlaythroughRef::new("Alex", "office", difficulty), people);
    (state, ids)
}

fn quiet_engine() -> NarrativeEngine {
    NarrativeEngine::new(EngineConfig {
        group: GroupConfig {
            emergent_tension_chance: 0.0,
            emergent_pair_chance: 0.0,
            ..Default::default()
        },
        ..Default::default()
    })
}

fn simple_beat(phase: ArcPhase) -> StoryBeat {
    StoryBeat {
        id: BeatId::new(),
        beat_type: BeatType::Escalation,
        phase,
        content: format!("something happens during {}", phase.name()),
        trigger: BeatTrigger::DayElapsed { days: 50 },
        weight: 4,
        triggered: false,
        triggered_day: None,
        prerequisites: Vec::new(),
    }
}

#[test]
fn test_dramatic_playthrough_opening() {
    let engine = NarrativeEngine::with_defaults();
    let mut rng = StdRng::seed_from_u64(42);
    let state = engine.new_game(
        PlaythroughRef::new("Alex", "a family bakery", Difficulty::Dramatic),
        ["Maya", "Jonah", "Priya"].map(Character::new),
        &mut rng,
    );

    assert_eq!(state.active_arcs.len(), 3);
    let mains: Vec<&StoryArc> = state.active_arcs.iter().filter(|a| a.is_main).collect();
    assert_eq!(mains.len(), 1);
    assert_eq!(mains[0].involvement, PlayerInvolvement::Central);
    assert_eq!(state.global_tension, 40.0);
}

#[test]
fn test_setup_complete_advances_to_rising() {
    let (state, ids) = cast(&["Maya", "Jonah"], Difficulty::Dramatic);
    let beats = vec![
        simple_beat(ArcPhase::Setup),
        simple_beat(ArcPhase::Setup),
        simple_beat(ArcPhase::Rising),
        simple_beat(ArcPhase::Rising),
        simple_beat(ArcPhase::Rising),
    ];
    let (b1, b2) = (beats[0].id, beats[1].id);
    let arc = StoryArc {
        id: ArcId::new(),
        template_id: "conflict_open_feud".to_string(),
        category: ArcCategory::Conflict,
        title: "The Feud".to_string(),
        premise: "Maya and Jonah fall out".to_string(),
        participants: BTreeMap::from([(ids[0], ArcRole::Protagonist), (ids[1], ArcRole::Rival)]),
        phase: ArcPhase::Setup,
        beats,
        tension: 40.0,
        involvement: PlayerInvolvement::Observer,
        is_main: false,
        parent: None,
        children: Vec::new(),
        facts: Vec::new(),
        started_day: 0,
        completed_day: None,
    };
    let arc_id = arc.id;
    let state = state
        .install_arc(arc, Vec::new())
        .trigger_beat(arc_id, b1)
        .trigger_beat(arc_id, b2);

    let engine = NarrativeEngine::with_defaults();
    let mut rng = StdRng::seed_from_u64(7);
    let directive = engine.simulation_directive(&state, 1, &Meters::default(), &mut rng);
    let state = engine.process_simulation(state, &directive, &SimulationResult::default(), &mut rng);

    let arc = state.active_arc(arc_id).unwrap();
    assert_eq!(arc.phase, ArcPhase::Rising);
    assert!(arc.beats[2..].iter().all(|b| !b.triggered));
}

#[test]
fn test_pair_tension_from_metrics() {
    let (state, ids) = cast(&["Maya", "Jonah"], Difficulty::Dramatic);
    let (a, b) = (Party::Npc(ids[0]), Party::Npc(ids[1]));
    // Fresh NPC pairs start at trust 50, rivalry 10, fear 0.
    let state = state
        .update_relationship(
            a,
            b,
            MetricDelta { trust: -30.0, ..Default::default() },
            "argument",
        )
        .update_relationship(
            b,
            a,
            MetricDelta { trust: -25.0, rivalry: 5.0, ..Default::default() },
            "argument",
        );

    let tension = calculate_tension(&state, a, b);
    assert!((tension - 36.0).abs() < 1e-4, "tension was {tension}");
}

#[test]
fn test_tension_defaults_and_bounds() {
    let (state, ids) = cast(&["Maya"], Difficulty::Dramatic);
    let stranger = Party::Npc(CharacterId::new());
    assert_eq!(calculate_tension(&state, Party::Npc(ids[0]), stranger), 50.0);

    let (state, ids) = cast(&["Maya", "Jonah"], Difficulty::Dramatic);
    let (a, b) = (Party::Npc(ids[0]), Party::Npc(ids[1]));
    let worst = MetricDelta { trust: -500.0, rivalry: 500.0, fear: 500.0, ..Default::default() };
    let state = state
        .update_relationship(a, b, worst, "war")
        .update_relationship(b, a, worst, "war");
    let tension = calculate_tension(&state, a, b);
    assert!((0.0..=100.0).contains(&tension));
}

#[test]
fn test_forced_revelation_and_exclusivity() {
    let (state, ids) = cast(&["Maya", "Jonah", "Priya"], Difficulty::Dramatic);
    let (maya, jonah, priya) = (ids[0], ids[1], ids[2]);
    let secret = WorldFact::new(
        "Priya forged the signature on the bakery lease",
        FactCategory::Secret,
    )
    .with_importance(Importance::Major)
    .with_subject(priya)
    .known_by(maya);
    let fact_id = secret.id;
    let state = KnowledgeGraph::default().add_fact(state, secret);

    let engine = quiet_engine();
    let mut rng = StdRng::seed_from_u64(3);
    let (mut state, conv) = engine.start_conversation(state, &[maya, jonah], &mut rng);
    for _ in 0..4 {
        state = engine.process_message(state, conv, maya, "Nice weather today.");
    }

    let agenda = state.conversation(conv).unwrap().agenda(maya).unwrap();
    let reveal = agenda.must_reveal.as_ref().unwrap();
    assert_eq!(reveal.reveal_after_messages, 0);
    assert_eq!(reveal.content, "Priya forged the signature on the bakery lease");

    let state = engine.process_message(
        state,
        conv,
        maya,
        "I have to say it: Priya forged the signature on the lease.",
    );
    let state = engine.process_message(state, conv, jonah, "That can't be true.");
    let state = engine.process_message(state, conv, jonah, "Are you sure?");

    let conversation = state.conversation(conv).unwrap();
    assert!(conversation.revealed_facts.contains(&fact_id));
    assert!(state.fact(fact_id).unwrap().is_known_to_player());
    for agenda in conversation.agendas.values() {
        assert!(agenda.must_reveal.as_ref().map_or(true, |m| m.fact != fact_id));
    }
}

#[test]
fn test_relationship_metrics_stay_clamped() {
    let (mut state, ids) = cast(&["Maya", "Jonah", "Priya"], Difficulty::Intense);
    let mut rng = StdRng::seed_from_u64(99);
    let parties: Vec<Party> = ids
        .iter()
        .map(|id| Party::Npc(*id))
        .chain([Party::Player])
        .collect();

    for _ in 0..200 {
        let from = parties[rng.gen_range(0..parties.len())];
        let to = parties[rng.gen_range(0..parties.len())];
        let delta = MetricDelta {
            trust: rng.gen_range(-80.0..80.0),
            affection: rng.gen_range(-80.0..80.0),
            fear: rng.gen_range(-80.0..80.0),
            respect: rng.gen_range(-80.0..80.0),
            rivalry: rng.gen_range(-80.0..80.0),
            dependency: rng.gen_range(-80.0..80.0),
        };
        state = state.update_relationship(from, to, delta, "random shove");
    }

    for rel in &state.relationships {
        let m = &rel.metrics;
        for signed in [m.trust, m.affection, m.fear] {
            assert!((-100.0..=100.0).contains(&signed));
        }
        for unsigned in [m.respect, m.rivalry, m.dependency] {
            assert!((0.0..=100.0).contains(&unsigned));
        }
    }
}

#[test]
fn test_phase_never_regresses() {
    let engine = NarrativeEngine::with_defaults();
    let mut rng = StdRng::seed_from_u64(5);
    let state = engine.new_game(
        PlaythroughRef::new("Alex", "office", Difficulty::Casual),
        ["Maya", "Jonah", "Priya"].map(Character::new),
        &mut rng,
    );
    let arc_id = state.active_arcs[0].id;

    let mut state = state;
    let mut last = ArcPhase::Setup;
    for _ in 0..6 {
        state = state.progress_arc_phase(arc_id);
        let phase = state.active_arc(arc_id).unwrap().phase;
        assert!(phase >= last);
        last = phase;
    }
    assert_eq!(last, ArcPhase::Aftermath);
    assert_eq!(state.clone().progress_arc_phase(arc_id), state);
}

#[test]
fn test_state_round_trips() {
    let engine = quiet_engine();
    let mut rng = StdRng::seed_from_u64(21);
    let state = engine.new_game(
        PlaythroughRef::new("Alex", "high school reunion", Difficulty::Intense),
        ["Maya", "Jonah", "Priya", "Sam"].map(Character::new),
        &mut rng,
    );
    let ids: Vec<CharacterId> = state.characters.keys().copied().collect();
    let (state, _) = engine.start_conversation(state, &ids[..3], &mut rng);
    let state = state
        .record_player_action("Alex confronted Maya", Some(ids[0]))
        .adjust_reputation("honesty", -12.5)
        .advance_day();

    let text = serialize(&state).unwrap();
    assert!(text.contains("$timestamp"));
    assert_eq!(deserialize(&text).unwrap(), state);
}
