//! Scenario-matched secret templates.
//!
//! A secret has a witness, who knows it and may let it slip, and a subject,
//! whom it concerns. Only the witness starts out knowing it, so nobody is
//! ever pushed to confess their own secret unprompted.

use rand::seq::SliceRandom;
use rand::Rng;
use story_state::{Character, FactCategory, FactId, Importance, NarrativeState, WorldFact};
use tracing::debug;

/// Broad setting a scenario falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    Workplace,
    Family,
    School,
    Generic,
}

const SCENARIO_KEYWORDS: &[(ScenarioKind, &[&str])] = &[
    (
        ScenarioKind::Workplace,
        &["office", "work", "company", "startup", "firm", "hospital", "restaurant", "corporate"],
    ),
    (
        ScenarioKind::School,
        &["school", "college", "campus", "university", "class", "dorm", "student"],
    ),
    (
        ScenarioKind::Family,
        &["family", "home", "marriage", "household", "suburb", "wedding", "parents", "siblings"],
    ),
];

impl ScenarioKind {
    /// Classify free scenario text.
    pub fn from_scenario(text: &str) -> Self {
        let lower = text.to_lowercase();
        SCENARIO_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(kind, _)| *kind)
            .unwrap_or(ScenarioKind::Generic)
    }

    pub fn templates(&self) -> &'static [SecretTemplate] {
        match self {
            ScenarioKind::Workplace => WORKPLACE,
            ScenarioKind::Family => FAMILY,
            ScenarioKind::School => SCHOOL,
            ScenarioKind::Generic => GENERIC,
        }
    }
}

/// A secret with `{subject}` and `{witness}` placeholders.
#[derive(Debug, Clone, Copy)]
pub struct SecretTemplate {
    pub content: &'static str,
    pub importance: Importance,
    pub spread: f32,
}

const fn secret(content: &'static str, importance: Importance, spread: f32) -> SecretTemplate {
    SecretTemplate {
        content,
        importance,
        spread,
    }
}

const WORKPLACE: &[SecretTemplate] = &[
    secret("{subject} has been taking credit for {witness}'s work", Importance::Moderate, 0.3),
    secret("{subject} is interviewing with a competitor", Importance::Moderate, 0.4),
    secret("{witness} saw {subject} altering the expense reports", Importance::Major, 0.2),
    secret("{subject} is about to be laid off and doesn't know it", Importance::Major, 0.3),
    secret("{subject} is having an affair with a manager", Importance::Critical, 0.2),
];

const FAMILY: &[SecretTemplate] = &[
    secret("{subject} has been hiding serious debts", Importance::Major, 0.2),
    secret("{subject} secretly reads everyone's messages", Importance::Moderate, 0.3),
    secret("{witness} knows {subject} was adopted", Importance::Critical, 0.1),
    secret("{subject} has been lying about where they go at night", Importance::Moderate, 0.4),
    secret("{subject} changed the will without telling anyone", Importance::Critical, 0.2),
];

const SCHOOL: &[SecretTemplate] = &[
    secret("{subject} cheated on the final exam", Importance::Major, 0.4),
    secret("{subject} has a crush on {witness}", Importance::Minor, 0.5),
    secret("{subject} is failing and hiding it from their parents", Importance::Moderate, 0.3),
    secret("{witness} saw {subject} vandalising the gym", Importance::Major, 0.3),
];

const GENERIC: &[SecretTemplate] = &[
    secret("{subject} is not who they claim to be", Importance::Critical, 0.2),
    secret("{subject} owes money to dangerous people", Importance::Major, 0.2),
    secret("{subject} broke a promise to {witness} and never admitted it", Importance::Moderate, 0.3),
    secret("{subject} has been talking behind everyone's back", Importance::Moderate, 0.5),
];

impl SecretTemplate {
    /// Build the fact for a witness/subject pair.
    pub fn instantiate(&self, witness: &Character, subject: &Character, day: u32) -> WorldFact {
        let content = self
            .content
            .replace("{subject}", &subject.name)
            .replace("{witness}", &witness.name);
        WorldFact::new(content, FactCategory::Secret)
            .with_importance(self.importance)
            .with_spread(self.spread)
            .with_subject(subject.id)
            .with_day(day)
            .known_by(witness.id)
    }
}

/// Pick a witness, a subject and a scenario-matched template.
///
/// Returns `None` with fewer than two eligible characters.
pub fn generate_secret<R>(state: &NarrativeState, rng: &mut R) -> Option<WorldFact>
where
    R: Rng + ?Sized,
{
    let eligible = state.eligible_characters();
    let pair: Vec<&&Character> = eligible.choose_multiple(rng, 2).collect();
    let [witness, subject] = pair.as_slice() else {
        return None;
    };
    let kind = ScenarioKind::from_scenario(&state.identity.scenario);
    let template = kind.templates().choose(rng)?;
    let fact = template.instantiate(witness, subject, state.current_day);
    Some(fact.with_id(FactId::from_rng(rng)))
}

/// Add up to `count` fresh secrets to the world.
pub fn seed_secrets<R>(mut state: NarrativeState, count: usize, rng: &mut R) -> NarrativeState
where
    R: Rng + ?Sized,
{
    for _ in 0..count {
        let Some(fact) = generate_secret(&state, rng) else {
            break;
        };
        debug!(fact = %fact.id, content = %fact.content, "secret seeded");
        state = state.add_fact(fact);
    }
    state
}
