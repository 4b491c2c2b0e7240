//! One entry point bundling every component under a single configuration.

use rand::Rng;
use story_state::{
    ArcId, Character, CharacterId, ConversationId, Meters, NarrativeState, PlaythroughRef,
};
use tracing::debug;

use crate::arcs::{ArcGenerator, ArcRequest};
use crate::config::EngineConfig;
use crate::context_assembler::{AgendaContext, CharacterContext, ContextAssembler};
use crate::error::ConfigError;
use crate::events::SimulationResult;
use crate::group::GroupDynamics;
use crate::knowledge_base::{seed_secrets, KnowledgeGraph, Propagation};
use crate::simulation::{DirectiveGenerator, ResultProcessor, SimulationDirective};

/// The narrative engine. Holds no game state of its own; every call takes
/// a [`NarrativeState`] and hands back the next one.
#[derive(Debug, Clone, Default)]
pub struct NarrativeEngine {
    config: EngineConfig,
    knowledge: KnowledgeGraph,
    arcs: ArcGenerator,
    group: GroupDynamics,
    directives: DirectiveGenerator,
    results: ResultProcessor,
    context: ContextAssembler,
}

impl NarrativeEngine {
    pub fn new(config: EngineConfig) -> Self {
        let knowledge = KnowledgeGraph::new(config.propagation.clone());
        let arcs = ArcGenerator::default();
        Self {
            group: GroupDynamics::new(
                config.group.clone(),
                config.revelation.clone(),
                knowledge.clone(),
                arcs,
            ),
            directives: DirectiveGenerator::new(config.simulation.clone()),
            results: ResultProcessor::new(config.simulation.clone(), knowledge.clone()),
            context: ContextAssembler::with_defaults(),
            knowledge,
            arcs,
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Build an engine from a TOML config, validating it first.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(EngineConfig::from_toml_str(text)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a playthrough: derive relationships from the cast, seed the
    /// opening arcs and hand out one secret per pair of characters.
    pub fn new_game<R>(
        &self,
        identity: PlaythroughRef,
        characters: impl IntoIterator<Item = Character>,
        rng: &mut R,
    ) -> NarrativeState
    where
        R: Rng + ?Sized,
    {
        let state = NarrativeState::new(identity, characters);
        let state = self.arcs.seed_initial_arcs(state, &self.knowledge, rng);
        let secrets = state.eligible_characters().len() / 2;
        let state = seed_secrets(state, secrets, rng);
        debug!(
            arcs = state.active_arcs.len(),
            facts = state.facts.len(),
            "new game seeded"
        );
        state
    }

    /// Generate and install one arc. Returns the state unchanged and `None`
    /// if the arc could not be cast.
    pub fn add_arc<R>(
        &self,
        state: NarrativeState,
        request: &ArcRequest,
        rng: &mut R,
    ) -> (NarrativeState, Option<ArcId>)
    where
        R: Rng + ?Sized,
    {
        match self.arcs.generate(&state, request, rng) {
            Some(generated) => {
                let id = generated.arc.id;
                (generated.install(state, &self.knowledge), Some(id))
            }
            None => (state, None),
        }
    }

    pub fn start_conversation<R>(
        &self,
        state: NarrativeState,
        participants: &[CharacterId],
        rng: &mut R,
    ) -> (NarrativeState, ConversationId)
    where
        R: Rng + ?Sized,
    {
        self.group.start_conversation(state, participants, rng)
    }

    pub fn process_message(
        &self,
        state: NarrativeState,
        conversation: ConversationId,
        speaker: CharacterId,
        text: &str,
    ) -> NarrativeState {
        self.group.process_message(state, conversation, speaker, text)
    }

    pub fn end_conversation(&self, state: NarrativeState, id: ConversationId) -> NarrativeState {
        self.group.end_conversation(state, id)
    }

    /// Prompt context for one participant of a live scene.
    pub fn agenda_context(
        &self,
        state: &NarrativeState,
        conversation: ConversationId,
        character: CharacterId,
    ) -> Option<AgendaContext> {
        let conv = state.conversation(conversation)?;
        self.context.assemble_agenda(state, conv, character)
    }

    pub fn character_context(
        &self,
        state: &NarrativeState,
        character: CharacterId,
    ) -> Option<CharacterContext> {
        self.context.character_context(state, character)
    }

    pub fn simulation_directive<R>(
        &self,
        state: &NarrativeState,
        days: u32,
        meters: &Meters,
        rng: &mut R,
    ) -> SimulationDirective
    where
        R: Rng + ?Sized,
    {
        self.directives.generate(state, days, meters, rng)
    }

    pub fn process_simulation<R>(
        &self,
        state: NarrativeState,
        directive: &SimulationDirective,
        result: &SimulationResult,
        rng: &mut R,
    ) -> NarrativeState
    where
        R: Rng + ?Sized,
    {
        self.results.process(state, directive, result, rng)
    }

    /// One round of gossip between NPCs.
    pub fn propagate_facts<R>(&self, state: NarrativeState, rng: &mut R) -> (NarrativeState, Vec<Propagation>)
    where
        R: Rng + ?Sized,
    {
        self.knowledge.propagate(state, rng)
    }
}
