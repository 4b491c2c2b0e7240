//! Story Arc Generator - instantiates arcs from templates.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use story_state::{
    ArcCategory, ArcId, ArcPhase, ArcRole, BeatId, CharacterId, FactId, NarrativeState,
    PlayerInvolvement, StoryArc, StoryBeat, WorldFact,
};
use tracing::debug;

use super::templates::{ArcTemplate, TEMPLATES};
use crate::knowledge_base::KnowledgeGraph;

/// What kind of arc to generate.
#[derive(Debug, Clone)]
pub struct ArcRequest {
    pub category: Option<ArcCategory>,
    pub involvement: PlayerInvolvement,
    pub is_main: bool,
    /// Restrict casting to these characters.
    pub participants: Option<Vec<CharacterId>>,
    pub parent: Option<ArcId>,
}

impl Default for ArcRequest {
    fn default() -> Self {
        Self {
            category: None,
            involvement: PlayerInvolvement::Observer,
            is_main: false,
            participants: None,
            parent: None,
        }
    }
}

impl ArcRequest {
    /// The arc the playthrough is built around.
    pub fn main() -> Self {
        Self {
            involvement: PlayerInvolvement::Central,
            is_main: true,
            ..Default::default()
        }
    }

    pub fn subplot(category: ArcCategory) -> Self {
        Self {
            category: Some(category),
            involvement: PlayerInvolvement::Peripheral,
            ..Default::default()
        }
    }

    /// An arc that surfaced between characters during play.
    pub fn emergent(participants: Vec<CharacterId>, parent: Option<ArcId>) -> Self {
        Self {
            involvement: PlayerInvolvement::Discovering,
            participants: Some(participants),
            parent,
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: ArcCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// A generated arc with the facts it introduces.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArc {
    pub arc: StoryArc,
    pub facts: Vec<WorldFact>,
    /// Which characters start out knowing which new facts.
    pub knowledge_updates: Vec<(CharacterId, FactId)>,
}

impl GeneratedArc {
    /// Start the arc in the given state. Its facts go through the knowledge
    /// graph so initial knowers pick up suspicions like any other learner.
    pub fn install(self, state: NarrativeState, knowledge: &KnowledgeGraph) -> NarrativeState {
        let state = state.install_arc(self.arc, Vec::new());
        self.facts
            .into_iter()
            .fold(state, |s, fact| knowledge.add_fact(s, fact))
    }
}

/// Generates arcs from a template library.
#[derive(Debug, Clone, Copy)]
pub struct ArcGenerator {
    templates: &'static [ArcTemplate],
}

impl Default for ArcGenerator {
    fn default() -> Self {
        Self::new(TEMPLATES)
    }
}

fn substitute(text: &str, names: &BTreeMap<ArcRole, &str>, player: &str) -> String {
    names
        .iter()
        .fold(text.replace("{player}", player), |acc, (role, name)| {
            acc.replace(role.placeholder(), name)
        })
}

impl ArcGenerator {
    pub fn new(templates: &'static [ArcTemplate]) -> Self {
        Self { templates }
    }

    /// Generate an arc, or `None` if there are too few eligible characters.
    pub fn generate<R>(
        &self,
        state: &NarrativeState,
        request: &ArcRequest,
        rng: &mut R,
    ) -> Option<GeneratedArc>
    where
        R: Rng + ?Sized,
    {
        let template = self.choose_template(state, request, rng)?;
        let cast = self.assign_roles(state, template, request, rng)?;
        let arc_id = ArcId::from_rng(rng);

        let names: BTreeMap<ArcRole, &str> = cast
            .iter()
            .filter_map(|(role, id)| state.character(*id).map(|c| (*role, c.name.as_str())))
            .collect();
        let player = state.player_name();

        let beats = build_beats(template, &cast, &names, player, rng);
        let facts = build_facts(template, &cast, &names, player, arc_id, state.current_day, rng);
        let knowledge_updates = facts
            .iter()
            .flat_map(|f| f.known_by.iter().filter_map(|p| p.npc()).map(move |c| (c, f.id)))
            .collect();

        let arc = StoryArc {
            id: arc_id,
            template_id: template.id.to_string(),
            category: template.category,
            title: substitute(template.title, &names, player),
            premise: substitute(template.premise, &names, player),
            participants: cast.iter().map(|(role, id)| (*id, *role)).collect(),
            phase: ArcPhase::Setup,
            beats,
            tension: template.initial_tension(state.global_tension),
            involvement: request.involvement,
            is_main: request.is_main,
            parent: request.parent,
            children: Vec::new(),
            facts: facts.iter().map(|f| f.id).collect(),
            started_day: state.current_day,
            completed_day: None,
        };

        debug!(
            arc = %arc.id,
            template = template.id,
            participants = arc.participants.len(),
            beats = arc.beats.len(),
            tension = arc.tension,
            "arc generated"
        );
        Some(GeneratedArc {
            arc,
            facts,
            knowledge_updates,
        })
    }

    fn choose_template<R>(
        &self,
        state: &NarrativeState,
        request: &ArcRequest,
        rng: &mut R,
    ) -> Option<&'static ArcTemplate>
    where
        R: Rng + ?Sized,
    {
        let difficulty = state.difficulty();
        let available: Vec<&'static ArcTemplate> =
            self.templates.iter().filter(|t| t.allows(difficulty)).collect();

        let running: BTreeSet<&str> = state
            .active_arcs
            .iter()
            .chain(state.queued_arcs.iter())
            .map(|a| a.template_id.as_str())
            .collect();
        let preferred: Vec<&'static ArcTemplate> = available
            .iter()
            .copied()
            .filter(|t| request.category.map_or(true, |c| t.category == c))
            .filter(|t| !running.contains(t.id))
            .collect();

        let pool = if preferred.is_empty() {
            available
        } else {
            preferred
        };
        pool.choose(rng).copied()
    }

    /// Cast the least-involved characters, required roles first.
    fn assign_roles<R>(
        &self,
        state: &NarrativeState,
        template: &ArcTemplate,
        request: &ArcRequest,
        rng: &mut R,
    ) -> Option<BTreeMap<ArcRole, CharacterId>>
    where
        R: Rng + ?Sized,
    {
        let mut ranked: Vec<CharacterId> = match &request.participants {
            Some(ids) => ids
                .iter()
                .copied()
                .filter(|id| state.character(*id).is_some_and(|c| c.is_available()))
                .collect(),
            None => state.eligible_characters().iter().map(|c| c.id).collect(),
        };
        if ranked.len() < template.required_roles.len() {
            debug!(
                template = template.id,
                eligible = ranked.len(),
                "not enough characters for arc"
            );
            return None;
        }

        ranked.shuffle(rng);
        ranked.sort_by_key(|id| state.arc_involvement(*id));
        let mut pool = ranked.into_iter();

        let mut cast = BTreeMap::new();
        for role in template.required_roles {
            cast.insert(*role, pool.next()?);
        }
        for role in template.optional_roles {
            if rng.gen_bool(0.5) {
                if let Some(id) = pool.next() {
                    cast.insert(*role, id);
                }
            }
        }
        Some(cast)
    }

    /// Main arc plus subplots in unused categories until the difficulty's
    /// arc count is reached or nothing more can be cast.
    pub fn seed_initial_arcs<R>(
        &self,
        state: NarrativeState,
        knowledge: &KnowledgeGraph,
        rng: &mut R,
    ) -> NarrativeState
    where
        R: Rng + ?Sized,
    {
        let target = state.difficulty().initial_arc_count();
        let Some(main) = self.generate(&state, &ArcRequest::main(), rng) else {
            return state;
        };
        let mut used: BTreeSet<ArcCategory> = BTreeSet::from([main.arc.category]);
        let mut state = main.install(state, knowledge);

        let mut categories = ArcCategory::ALL.to_vec();
        categories.shuffle(rng);
        for category in categories {
            if state.active_arcs.len() >= target {
                break;
            }
            if used.contains(&category) {
                continue;
            }
            let Some(subplot) = self.generate(&state, &ArcRequest::subplot(category), rng) else {
                break;
            };
            if !used.insert(subplot.arc.category) {
                continue;
            }
            state = subplot.install(state, knowledge);
        }
        state
    }

    /// Generate an arc among characters whose tension surfaced during play.
    pub fn emergent_arc<R>(
        &self,
        state: &NarrativeState,
        participants: Vec<CharacterId>,
        parent: Option<ArcId>,
        rng: &mut R,
    ) -> Option<GeneratedArc>
    where
        R: Rng + ?Sized,
    {
        self.generate(state, &ArcRequest::emergent(participants, parent), rng)
    }
}

fn build_beats<R>(
    template: &ArcTemplate,
    cast: &BTreeMap<ArcRole, CharacterId>,
    names: &BTreeMap<ArcRole, &str>,
    player: &str,
    rng: &mut R,
) -> Vec<StoryBeat>
where
    R: Rng + ?Sized,
{
    let mut beats: Vec<StoryBeat> = Vec::new();
    for bt in template.beats {
        if !bt.roles.iter().all(|r| cast.contains_key(r)) {
            continue;
        }
        let prerequisites = beats
            .iter()
            .filter(|b| b.phase < bt.phase)
            .map(|b| b.id)
            .collect();
        beats.push(StoryBeat {
            id: BeatId::from_rng(rng),
            beat_type: bt.beat_type,
            phase: bt.phase,
            content: substitute(bt.content, names, player),
            trigger: bt.trigger.build(),
            weight: bt.weight.clamp(1, 10),
            triggered: false,
            triggered_day: None,
            prerequisites,
        });
    }
    beats
}

fn build_facts<R>(
    template: &ArcTemplate,
    cast: &BTreeMap<ArcRole, CharacterId>,
    names: &BTreeMap<ArcRole, &str>,
    player: &str,
    arc: ArcId,
    day: u32,
    rng: &mut R,
) -> Vec<WorldFact>
where
    R: Rng + ?Sized,
{
    let mut facts = Vec::new();
    for ft in template.facts {
        let knowers: Option<Vec<CharacterId>> =
            ft.known_by.iter().map(|r| cast.get(r).copied()).collect();
        let subject = match ft.subject {
            Some(role) => match cast.get(&role) {
                Some(id) => Some(*id),
                None => continue,
            },
            None => None,
        };
        let content = substitute(ft.content, names, player);
        let Some(knowers) = knowers.filter(|_| !content.contains('{')) else {
            continue;
        };

        let mut fact = WorldFact::new(content, ft.category)
            .with_id(FactId::from_rng(rng))
            .with_importance(ft.importance)
            .with_spread(ft.spread)
            .with_arc(arc)
            .with_day(day);
        if let Some(subject) = subject {
            fact = fact.with_subject(subject);
        }
        facts.push(knowers.into_iter().fold(fact, |f, id| f.known_by(id)));
    }
    facts
}
