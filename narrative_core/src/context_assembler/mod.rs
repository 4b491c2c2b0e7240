//! Context Assembler - Builds prompt fragments for the external completion service.
//!
//! The assembler never calls a model. It works in two steps:
//! 1. **Gathering**: Pull what one prompt needs out of the [`NarrativeState`]
//!    into a plain context struct
//! 2. **Rendering**: Each context renders itself with `to_prompt_string`
//!
//! Three fragments exist: the simulation directive for a time-jump, one
//! character's agenda in a group scene, and one NPC's view of the player for
//! ordinary dialogue.

mod prompt;

pub use prompt::*;

use story_state::{CharacterId, GroupConversationState, NarrativeState, Party};

/// Limits on how much of the state goes into a fragment.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Maximum number of known facts listed for a character.
    pub max_facts: usize,

    /// Maximum number of suspicions listed, newest kept.
    pub max_suspicions: usize,

    /// Number of recent timeline entries involving the character.
    pub recent_events: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_facts: 10,
            max_suspicions: 5,
            recent_events: 5,
        }
    }
}

/// The context assembler gathers prompt context from the state.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    config: ContextConfig,
}

impl ContextAssembler {
    /// Create a new context assembler with the given configuration.
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Create a context assembler with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ContextConfig::default())
    }

    /// Gather one participant's instructions for a group scene.
    ///
    /// Returns `None` if the character has no agenda in the conversation.
    pub fn assemble_agenda(
        &self,
        state: &NarrativeState,
        conversation: &GroupConversationState,
        character: CharacterId,
    ) -> Option<AgendaContext> {
        let agenda = conversation.agenda(character)?;
        let name = |id: CharacterId| state.party_name(Party::Npc(id)).to_string();

        Some(AgendaContext {
            name: name(character),
            strategy: agenda.strategy,
            goals: agenda.goals.clone(),
            conflicts: agenda
                .conflicts
                .iter()
                .map(|(other, reasons)| {
                    let reasons: Vec<&str> = reasons.iter().map(|r| r.describe()).collect();
                    format!("{} ({})", name(*other), reasons.join(", "))
                })
                .collect(),
            allies: agenda.allies.iter().map(|id| name(*id)).collect(),
            others: conversation
                .participants
                .iter()
                .filter(|id| **id != character)
                .map(|id| name(*id))
                .collect(),
            must_reveal: agenda.must_reveal.clone(),
            scene_tension: conversation.tension,
        })
    }

    /// Gather what one NPC knows, suspects and feels about the player.
    ///
    /// Returns `None` for an unknown character.
    pub fn character_context(
        &self,
        state: &NarrativeState,
        character: CharacterId,
    ) -> Option<CharacterContext> {
        let c = state.character(character)?;
        let party = Party::Npc(character);

        let mut facts = state.facts_known_by(party);
        facts.sort_by_key(|f| f.priority());
        let known_facts = facts
            .into_iter()
            .take(self.config.max_facts)
            .map(|f| f.content.clone())
            .collect();

        let suspicions = state
            .knowledge_of(character)
            .map(|k| {
                let skip = k.suspicions.len().saturating_sub(self.config.max_suspicions);
                k.suspicions
                    .iter()
                    .skip(skip)
                    .map(|s| format!("{} ({:.0}% sure)", s.content, s.confidence * 100.0))
                    .collect()
            })
            .unwrap_or_default();

        let arcs = state
            .arcs_for(character)
            .into_iter()
            .filter_map(|arc| {
                arc.role_of(character).map(|role| {
                    format!("{}: {} ({} phase)", arc.title, role.name(), arc.phase.name())
                })
            })
            .collect();

        let mut recent_events: Vec<String> = state
            .timeline
            .iter()
            .rev()
            .filter(|e| e.involved.contains(&character))
            .take(self.config.recent_events)
            .map(|e| format!("Day {}: {}", e.day, e.description))
            .collect();
        recent_events.reverse();

        let toward_player = state.relationship(party, Party::Player).map(|r| r.metrics);

        Some(CharacterContext {
            name: c.name.clone(),
            role: c.role.clone(),
            personality: c.personality.clone(),
            mood: c.emotional_state,
            player_name: state.player_name().to_string(),
            feeling: toward_player
                .map(|m| m.describe())
                .unwrap_or("neutral")
                .to_string(),
            toward_player,
            known_facts,
            suspicions,
            arcs,
            recent_events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{ArcFocus, BeatDirective, OffscreenAgenda, SimulationDirective};
    use story_state::{
        ArcId, ArcPhase, BeatId, BeatType, Character, ConflictReason, ConversationAgenda,
        ConversationId, Difficulty, EmotionalState, FactCategory, FactId, Importance, MetricDelta,
        MustReveal, PendingConsequence, PlaythroughRef, Strategy, Suspicion, WorldFact,
    };

    fn pair() -> (NarrativeState, CharacterId, CharacterId) {
        let dana = Character::new("Dana")
            .with_role("sister")
            .with_personality("sharp and loyal")
            .with_emotional_state(EmotionalState::Suspicious);
        let eli = Character::new("Eli");
        let (d, e) = (dana.id, eli.id);
        let state = NarrativeState::new(
            PlaythroughRef::new("Alex", "family", Difficulty::Dramatic),
            vec![dana, eli],
        );
        (state, d, e)
    }

    #[test]
    fn test_directive_to_prompt() {
        let directive = SimulationDirective {
            from_day: 4,
            days: 3,
            mandatory_beats: vec![BeatDirective {
                arc: ArcId::new(),
                arc_title: "The Missing Money".to_string(),
                beat: BeatId::new(),
                beat_type: BeatType::Discovery,
                content: "Dana finds the empty envelope".to_string(),
                weight: 8,
                participants: vec!["Dana".to_string(), "Eli".to_string()],
            }],
            possible_beats: Vec::new(),
            npc_agendas: vec![OffscreenAgenda {
                character: CharacterId::new(),
                name: "Eli".to_string(),
                mood: EmotionalState::Guilty,
                goals: vec!["Keep your own mistakes from coming out".to_string()],
            }],
            due_consequences: vec![PendingConsequence::new("The landlord calls", "missed rent", 1, 6)],
            world_guidance: vec!["Money is tight for the player".to_string()],
            target_tension: 52.0,
            focus_arcs: vec![ArcFocus {
                arc: ArcId::new(),
                title: "The Missing Money".to_string(),
                phase: ArcPhase::Rising,
                tension: 64.0,
            }],
        };

        let prompt = directive.to_prompt_string();

        assert!(prompt.contains("days 5 to 7"));
        assert!(prompt.contains("Target tension: 52/100"));
        assert!(prompt.contains("[The Missing Money] Dana finds the empty envelope (Dana, Eli)"));
        assert!(prompt.contains("Eli (guilty)"));
        assert!(prompt.contains("The landlord calls"));
        assert!(prompt.contains("Money is tight"));
        assert!(!prompt.contains("## May Happen"));
    }

    #[test]
    fn test_agenda_prompt() {
        let (state, d, e) = pair();
        let mut conv = GroupConversationState::new(ConversationId::new(), vec![d, e], 0);
        conv.tension = 45.0;
        let mut agenda = ConversationAgenda::new(d);
        agenda.strategy = Strategy::Aggressive;
        agenda.goals = vec!["Find out who is hiding something".to_string()];
        agenda.conflicts = vec![(e, vec![ConflictReason::Distrust, ConflictReason::Rivalry])];
        agenda.must_reveal = Some(MustReveal {
            fact: FactId::new(),
            content: "Eli borrowed the rent money".to_string(),
            reveal_after_messages: 0,
            hint_only: false,
            priority: 2,
        });
        conv.agendas.insert(d, agenda);

        let assembler = ContextAssembler::with_defaults();
        let context = assembler.assemble_agenda(&state, &conv, d).unwrap();
        assert_eq!(context.others, vec!["Eli".to_string()]);
        assert_eq!(context.conflicts, vec!["Eli (distrust, rivalry)".to_string()]);

        let prompt = context.to_prompt_string();
        assert!(prompt.contains("Strategy: aggressive"));
        assert!(prompt.contains("Reveal this now: Eli borrowed the rent money"));
        assert!(assembler.assemble_agenda(&state, &conv, e).is_none());
    }

    #[test]
    fn test_hint_only_prompt() {
        let context = AgendaContext {
            name: "Dana".to_string(),
            strategy: Strategy::Defensive,
            goals: Vec::new(),
            conflicts: Vec::new(),
            allies: Vec::new(),
            others: vec!["Eli".to_string()],
            must_reveal: Some(MustReveal {
                fact: FactId::new(),
                content: "Eli borrowed the rent money".to_string(),
                reveal_after_messages: 2,
                hint_only: true,
                priority: 2,
            }),
            scene_tension: 30.0,
        };
        let prompt = context.to_prompt_string();
        assert!(prompt.contains("Only hint"));
        assert!(!prompt.contains("Reveal this now"));
    }

    #[test]
    fn test_character_context() {
        let (state, d, e) = pair();
        let fact = WorldFact::new("Eli borrowed the rent money", FactCategory::Secret)
            .with_importance(Importance::Major)
            .known_by(d);
        let minor = WorldFact::new("The car needs new tyres", FactCategory::Event)
            .with_importance(Importance::Minor)
            .known_by(d);
        let from_fact = fact.id;
        let state = state
            .add_fact(minor)
            .add_fact(fact)
            .add_suspicion(
                d,
                Suspicion {
                    about: Some(e),
                    from_fact,
                    content: "Eli is hiding money troubles".to_string(),
                    confidence: 0.5,
                    day: 0,
                },
            )
            .update_relationship(Party::Npc(d), Party::Player, MetricDelta::affection(40.0), "old times");

        let context = ContextAssembler::with_defaults().character_context(&state, d).unwrap();
        assert_eq!(context.known_facts[0], "Eli borrowed the rent money");
        assert_eq!(context.suspicions, vec!["Eli is hiding money troubles (50% sure)".to_string()]);
        assert_eq!(context.feeling, "close");

        let prompt = context.to_prompt_string();
        assert!(prompt.contains("## Dana"));
        assert!(prompt.contains("Role: sister"));
        assert!(prompt.contains("Mood: suspicious"));
        assert!(prompt.contains("Feelings toward Alex: close"));
        assert!(ContextAssembler::with_defaults()
            .character_context(&state, CharacterId::new())
            .is_none());
    }
}
