//! Built-in arc templates.
//!
//! Content strings use role placeholders (`{antagonist}`, `{victim}`, ...)
//! and `{player}`. A beat or fact that names an optional role is dropped when
//! that role goes unfilled.

use story_state::{
    ArcCategory, ArcPhase, ArcRole, BeatTrigger, BeatType, Difficulty, FactCategory, Importance,
};

/// Trigger condition as written in a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerTemplate {
    Days(u32),
    Messages(u32),
    Tension(f32),
    Action(&'static str),
    Chance(f32),
}

impl TriggerTemplate {
    pub fn build(&self) -> BeatTrigger {
        match *self {
            TriggerTemplate::Days(days) => BeatTrigger::DayElapsed { days },
            TriggerTemplate::Messages(count) => BeatTrigger::MessageCount { count },
            TriggerTemplate::Tension(tension) => BeatTrigger::TensionThreshold { tension },
            TriggerTemplate::Action(keyword) => BeatTrigger::PlayerAction {
                keyword: keyword.to_string(),
            },
            TriggerTemplate::Chance(probability) => BeatTrigger::Random { probability },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BeatTemplate {
    pub phase: ArcPhase,
    pub beat_type: BeatType,
    pub content: &'static str,
    pub trigger: TriggerTemplate,
    /// Roles beyond the arc's required ones that this beat names.
    pub roles: &'static [ArcRole],
    /// 1 - 10.
    pub weight: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct FactTemplate {
    pub content: &'static str,
    pub category: FactCategory,
    pub importance: Importance,
    pub known_by: &'static [ArcRole],
    pub subject: Option<ArcRole>,
    pub spread: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct ArcTemplate {
    pub id: &'static str,
    pub category: ArcCategory,
    pub title: &'static str,
    pub premise: &'static str,
    pub required_roles: &'static [ArcRole],
    pub optional_roles: &'static [ArcRole],
    pub beats: &'static [BeatTemplate],
    pub facts: &'static [FactTemplate],
    pub min_tension: f32,
    pub max_tension: f32,
    pub difficulties: &'static [Difficulty],
}

impl ArcTemplate {
    pub fn allows(&self, difficulty: Difficulty) -> bool {
        self.difficulties.contains(&difficulty)
    }

    /// Initial tension, interpolated by the current global tension.
    pub fn initial_tension(&self, global_tension: f32) -> f32 {
        let weight = (global_tension / 100.0).clamp(0.0, 1.0);
        self.min_tension + (self.max_tension - self.min_tension) * weight
    }
}

const ALL: &[Difficulty] = &[Difficulty::Casual, Difficulty::Dramatic, Difficulty::Intense];
const NOT_CASUAL: &[Difficulty] = &[Difficulty::Dramatic, Difficulty::Intense];
const GENTLE: &[Difficulty] = &[Difficulty::Casual, Difficulty::Dramatic];

const fn beat(
    phase: ArcPhase,
    beat_type: BeatType,
    content: &'static str,
    trigger: TriggerTemplate,
    weight: u8,
) -> BeatTemplate {
    BeatTemplate {
        phase,
        beat_type,
        content,
        trigger,
        roles: &[],
        weight,
    }
}

const fn beat_with(
    phase: ArcPhase,
    beat_type: BeatType,
    content: &'static str,
    trigger: TriggerTemplate,
    roles: &'static [ArcRole],
    weight: u8,
) -> BeatTemplate {
    BeatTemplate {
        phase,
        beat_type,
        content,
        trigger,
        roles,
        weight,
    }
}

const fn fact(
    content: &'static str,
    category: FactCategory,
    importance: Importance,
    known_by: &'static [ArcRole],
    subject: Option<ArcRole>,
    spread: f32,
) -> FactTemplate {
    FactTemplate {
        content,
        category,
        importance,
        known_by,
        subject,
        spread,
    }
}

use ArcPhase::{Aftermath, Climax, Resolution, Rising, Setup};
use ArcRole::{
    Ally, Antagonist, Catalyst, Enabler, Manipulator, Mediator, Protagonist, Rival, Victim,
    Witness,
};
use TriggerTemplate::{Action, Chance, Days, Messages, Tension};

pub const TEMPLATES: &[ArcTemplate] = &[
    ArcTemplate {
        id: "betrayal_broken_trust",
        category: ArcCategory::Betrayal,
        title: "Broken Trust",
        premise: "{antagonist} has been quietly working against {victim}, who still trusts them completely.",
        required_roles: &[Antagonist, Victim],
        optional_roles: &[Witness],
        beats: &[
            beat_with(Setup, BeatType::Discovery, "{witness} notices {antagonist} acting strangely around {victim}", Days(1), &[Witness], 4),
            beat(Setup, BeatType::Alliance, "{antagonist} makes {victim} a promise they never intend to keep", Days(1), 5),
            beat(Rising, BeatType::Escalation, "{victim} starts to sense that something about {antagonist} is off", Tension(45.0), 6),
            beat(Rising, BeatType::Discovery, "{player} stumbles onto proof of what {antagonist} has been doing", Action("investigate"), 7),
            beat(Climax, BeatType::Betrayal, "The betrayal comes out: {antagonist} has been deceiving {victim} all along", Days(4), 9),
            beat(Climax, BeatType::Confrontation, "{victim} confronts {antagonist} in front of everyone", Tension(65.0), 8),
            beat(Resolution, BeatType::Decision, "{victim} has to decide whether {antagonist} can ever be forgiven", Days(6), 7),
            beat(Aftermath, BeatType::Consequence, "The fallout changes how {victim} treats everyone around them", Days(8), 5),
        ],
        facts: &[
            fact("{antagonist} has been betraying {victim}'s confidence", FactCategory::Secret, Importance::Major, &[Antagonist], Some(Antagonist), 0.1),
            fact("{witness} saw {antagonist} doing something behind {victim}'s back", FactCategory::Evidence, Importance::Moderate, &[Witness], Some(Antagonist), 0.3),
        ],
        min_tension: 30.0,
        max_tension: 70.0,
        difficulties: ALL,
    },
    ArcTemplate {
        id: "conflict_open_feud",
        category: ArcCategory::Conflict,
        title: "Open Feud",
        premise: "{protagonist} and {rival} can no longer stand each other, and everyone can tell.",
        required_roles: &[Protagonist, Rival],
        optional_roles: &[Mediator],
        beats: &[
            beat(Setup, BeatType::Confrontation, "{protagonist} and {rival} trade barbed remarks over something small", Days(1), 5),
            beat(Rising, BeatType::Escalation, "{rival} deliberately embarrasses {protagonist} in public", Tension(40.0), 7),
            beat_with(Rising, BeatType::Alliance, "{mediator} tries to get {protagonist} and {rival} to talk it out", Messages(20), &[Mediator], 5),
            beat(Climax, BeatType::Confrontation, "{protagonist} and {rival} finally have it out, loudly", Tension(60.0), 9),
            beat(Resolution, BeatType::Resolution, "{protagonist} and {rival} reach an uneasy truce", Days(5), 6),
            beat(Aftermath, BeatType::Consequence, "Everyone has picked a side in the feud between {protagonist} and {rival}", Days(7), 4),
        ],
        facts: &[
            fact("{rival} has been badmouthing {protagonist} to anyone who will listen", FactCategory::Rumor, Importance::Moderate, &[Rival], Some(Rival), 0.5),
        ],
        min_tension: 35.0,
        max_tension: 75.0,
        difficulties: ALL,
    },
    ArcTemplate {
        id: "mystery_missing_money",
        category: ArcCategory::Mystery,
        title: "The Missing Money",
        premise: "Money has gone missing from {victim}, and {witness} saw more than they are saying.",
        required_roles: &[Victim, Witness],
        optional_roles: &[Manipulator],
        beats: &[
            beat(Setup, BeatType::Discovery, "{victim} realises a large sum of money has vanished", Days(1), 6),
            beat(Rising, BeatType::Revelation, "{witness} admits they saw someone near {victim}'s things", Messages(15), 6),
            beat_with(Rising, BeatType::Twist, "{manipulator} steers suspicion toward an innocent person", Chance(0.4), &[Manipulator], 7),
            beat(Climax, BeatType::Revelation, "{player} pieces together who really took the money", Action("accuse"), 9),
            beat(Resolution, BeatType::Resolution, "The money is returned, but {victim} is shaken", Days(6), 6),
            beat(Aftermath, BeatType::Consequence, "{victim} locks everything away and trusts no one", Days(8), 4),
        ],
        facts: &[
            fact("{witness} saw who took {victim}'s money", FactCategory::Secret, Importance::Major, &[Witness], Some(Witness), 0.2),
            fact("{manipulator} took the money from {victim}", FactCategory::Secret, Importance::Critical, &[Manipulator], Some(Manipulator), 0.0),
        ],
        min_tension: 25.0,
        max_tension: 60.0,
        difficulties: ALL,
    },
    ArcTemplate {
        id: "romance_triangle",
        category: ArcCategory::Romance,
        title: "Triangle",
        premise: "{protagonist} is falling for someone, and {rival} has noticed.",
        required_roles: &[Protagonist, Rival],
        optional_roles: &[Ally],
        beats: &[
            beat(Setup, BeatType::Revelation, "{protagonist} can't stop talking about a new crush", Days(1), 5),
            beat_with(Setup, BeatType::Alliance, "{ally} promises to help {protagonist} make a move", Days(2), &[Ally], 4),
            beat(Rising, BeatType::Escalation, "{rival} starts competing for the same attention", Tension(35.0), 7),
            beat(Climax, BeatType::Confrontation, "{protagonist} catches {rival} making a move first", Days(4), 9),
            beat(Resolution, BeatType::Decision, "{protagonist} has to choose between pride and the friendship with {rival}", Days(6), 7),
            beat(Aftermath, BeatType::Consequence, "Things between {protagonist} and {rival} are never quite the same", Days(8), 4),
        ],
        facts: &[
            fact("{protagonist} has feelings for someone close to {player}", FactCategory::Secret, Importance::Moderate, &[Protagonist], Some(Protagonist), 0.4),
            fact("{rival} is jealous of {protagonist}", FactCategory::Relationship, Importance::Minor, &[Rival], Some(Rival), 0.3),
        ],
        min_tension: 20.0,
        max_tension: 55.0,
        difficulties: ALL,
    },
    ArcTemplate {
        id: "crisis_debt_spiral",
        category: ArcCategory::Crisis,
        title: "Debt Spiral",
        premise: "{victim} is drowning in debt, and {enabler} keeps making it worse.",
        required_roles: &[Victim, Enabler],
        optional_roles: &[Ally],
        beats: &[
            beat(Setup, BeatType::Discovery, "{victim} gets a letter they immediately hide", Days(1), 5),
            beat(Rising, BeatType::Escalation, "{enabler} talks {victim} into one more risky bet", Days(3), 7),
            beat_with(Rising, BeatType::Alliance, "{ally} quietly offers {victim} a loan", Chance(0.3), &[Ally], 5),
            beat(Climax, BeatType::Revelation, "Creditors show up and {victim}'s debts become public", Tension(55.0), 9),
            beat(Resolution, BeatType::Decision, "{victim} asks {player} for help, swallowing their pride", Action("help"), 7),
            beat(Aftermath, BeatType::Consequence, "{victim} rebuilds slowly, wary of {enabler}", Days(9), 4),
        ],
        facts: &[
            fact("{victim} owes far more money than anyone knows", FactCategory::Secret, Importance::Major, &[Victim, Enabler], Some(Victim), 0.2),
        ],
        min_tension: 30.0,
        max_tension: 70.0,
        difficulties: ALL,
    },
    ArcTemplate {
        id: "crisis_health_scare",
        category: ArcCategory::Crisis,
        title: "Health Scare",
        premise: "{victim} has had worrying news from a doctor and only {ally} knows.",
        required_roles: &[Victim, Ally],
        optional_roles: &[],
        beats: &[
            beat(Setup, BeatType::Revelation, "{victim} cancels plans without explanation", Days(1), 4),
            beat(Rising, BeatType::Discovery, "{player} notices {victim} has been unwell", Messages(10), 6),
            beat(Climax, BeatType::Revelation, "{victim} finally tells everyone about the diagnosis", Days(4), 8),
            beat(Resolution, BeatType::Alliance, "Everyone rallies around {victim}, led by {ally}", Days(5), 6),
            beat(Aftermath, BeatType::Resolution, "{victim} faces treatment with the people they love nearby", Days(7), 4),
        ],
        facts: &[
            fact("{victim} is seriously ill", FactCategory::Secret, Importance::Critical, &[Victim, Ally], Some(Victim), 0.1),
        ],
        min_tension: 15.0,
        max_tension: 45.0,
        difficulties: GENTLE,
    },
    ArcTemplate {
        id: "power_promotion",
        category: ArcCategory::Power,
        title: "The Promotion",
        premise: "Only one of {manipulator} and {rival} can come out on top, and {manipulator} isn't playing fair.",
        required_roles: &[Manipulator, Rival],
        optional_roles: &[Enabler],
        beats: &[
            beat(Setup, BeatType::Revelation, "Word spreads that there is only one spot for {manipulator} or {rival}", Days(1), 5),
            beat_with(Rising, BeatType::Alliance, "{manipulator} wins {enabler} over with flattery and favours", Days(2), &[Enabler], 5),
            beat(Rising, BeatType::Betrayal, "{manipulator} leaks something damaging about {rival}", Tension(45.0), 8),
            beat(Climax, BeatType::Confrontation, "{rival} confronts {manipulator} about the leak", Tension(60.0), 9),
            beat(Resolution, BeatType::Decision, "The decision is announced and someone has to live with losing", Days(6), 7),
            beat(Aftermath, BeatType::Consequence, "The winner finds out power costs more than expected", Days(9), 4),
        ],
        facts: &[
            fact("{manipulator} leaked the damaging story about {rival}", FactCategory::Secret, Importance::Major, &[Manipulator], Some(Manipulator), 0.1),
            fact("{rival} is rumoured to be on thin ice", FactCategory::Rumor, Importance::Minor, &[Manipulator], Some(Rival), 0.6),
        ],
        min_tension: 35.0,
        max_tension: 75.0,
        difficulties: ALL,
    },
    ArcTemplate {
        id: "secret_double_life",
        category: ArcCategory::Secret,
        title: "Double Life",
        premise: "{protagonist} is living a second life, and {witness} is close to finding out.",
        required_roles: &[Protagonist, Witness],
        optional_roles: &[Catalyst],
        beats: &[
            beat(Setup, BeatType::Discovery, "{witness} catches {protagonist} in a small lie", Days(1), 5),
            beat(Rising, BeatType::Escalation, "{protagonist}'s excuses stop adding up", Days(3), 6),
            beat_with(Rising, BeatType::Twist, "{catalyst} turns up knowing far too much about {protagonist}", Chance(0.35), &[Catalyst], 7),
            beat(Climax, BeatType::Revelation, "{witness} uncovers what {protagonist} has been hiding", Tension(55.0), 9),
            beat(Resolution, BeatType::Decision, "{protagonist} chooses which life to keep", Days(6), 7),
            beat(Aftermath, BeatType::Consequence, "{witness} keeps the secret, at a price", Days(8), 5),
        ],
        facts: &[
            fact("{protagonist} is hiding a whole second life", FactCategory::Secret, Importance::Critical, &[Protagonist], Some(Protagonist), 0.0),
            fact("{witness} has noticed {protagonist} lying about where they were", FactCategory::Evidence, Importance::Moderate, &[Witness], Some(Protagonist), 0.3),
        ],
        min_tension: 25.0,
        max_tension: 65.0,
        difficulties: ALL,
    },
    ArcTemplate {
        id: "revenge_old_wound",
        category: ArcCategory::Revenge,
        title: "Old Wound",
        premise: "{antagonist} has never forgiven {victim} for something years ago, and has started to act on it.",
        required_roles: &[Antagonist, Victim],
        optional_roles: &[Ally],
        beats: &[
            beat(Setup, BeatType::Revelation, "{antagonist} brings up an old grievance against {victim}", Days(1), 5),
            beat_with(Rising, BeatType::Alliance, "{antagonist} recruits {ally} with a one-sided story", Days(2), &[Ally], 6),
            beat(Rising, BeatType::Escalation, "Small things start going wrong for {victim}", Chance(0.5), 6),
            beat(Climax, BeatType::Betrayal, "{antagonist}'s plan against {victim} is set in motion", Tension(60.0), 9),
            beat(Resolution, BeatType::Confrontation, "{victim} learns who has been behind it all", Days(6), 8),
            beat(Aftermath, BeatType::Consequence, "{antagonist} has to live with what revenge cost them", Days(9), 5),
        ],
        facts: &[
            fact("{antagonist} blames {victim} for an old loss", FactCategory::History, Importance::Moderate, &[Antagonist, Victim], Some(Victim), 0.2),
            fact("{antagonist} is planning to get even with {victim}", FactCategory::Secret, Importance::Major, &[Antagonist], Some(Antagonist), 0.0),
        ],
        min_tension: 40.0,
        max_tension: 85.0,
        difficulties: NOT_CASUAL,
    },
    ArcTemplate {
        id: "conflict_accusation",
        category: ArcCategory::Conflict,
        title: "Accusation",
        premise: "{antagonist} accuses {victim} of something terrible, and the accusation sticks.",
        required_roles: &[Antagonist, Victim],
        optional_roles: &[Witness, Mediator],
        beats: &[
            beat(Setup, BeatType::Confrontation, "{antagonist} publicly accuses {victim}", Days(1), 7),
            beat_with(Rising, BeatType::Revelation, "{witness} hints they know the accusation is false", Messages(12), &[Witness], 6),
            beat(Rising, BeatType::Escalation, "People start avoiding {victim}", Tension(50.0), 7),
            beat_with(Climax, BeatType::Confrontation, "{mediator} forces {antagonist} and {victim} into the same room", Tension(65.0), &[Mediator], 8),
            beat(Climax, BeatType::Twist, "The truth behind the accusation surfaces", Days(5), 9),
            beat(Resolution, BeatType::Resolution, "{victim} is cleared, but not by everyone", Days(7), 6),
            beat(Aftermath, BeatType::Consequence, "{antagonist}'s reputation takes the hit instead", Days(9), 5),
        ],
        facts: &[
            fact("{antagonist}'s accusation against {victim} is false", FactCategory::Secret, Importance::Critical, &[Antagonist], Some(Antagonist), 0.0),
            fact("People are whispering that {victim} did something unforgivable", FactCategory::Rumor, Importance::Moderate, &[Antagonist], Some(Victim), 0.6),
        ],
        min_tension: 45.0,
        max_tension: 90.0,
        difficulties: &[Difficulty::Intense],
    },
    ArcTemplate {
        id: "romance_second_chance",
        category: ArcCategory::Romance,
        title: "Second Chance",
        premise: "{protagonist} and {catalyst} were close once, and the spark hasn't gone out.",
        required_roles: &[Protagonist, Catalyst],
        optional_roles: &[Mediator],
        beats: &[
            beat(Setup, BeatType::Revelation, "{protagonist} and {catalyst} keep running into each other", Days(1), 4),
            beat_with(Rising, BeatType::Alliance, "{mediator} engineers a chance for them to talk", Days(2), &[Mediator], 4),
            beat(Rising, BeatType::Escalation, "Old feelings between {protagonist} and {catalyst} resurface", Messages(15), 6),
            beat(Climax, BeatType::Decision, "{catalyst} asks {protagonist} whether they want to try again", Days(4), 8),
            beat(Resolution, BeatType::Resolution, "{protagonist} gives an answer", Days(6), 6),
        ],
        facts: &[
            fact("{protagonist} and {catalyst} were once together", FactCategory::History, Importance::Minor, &[Protagonist, Catalyst], Some(Protagonist), 0.4),
        ],
        min_tension: 10.0,
        max_tension: 40.0,
        difficulties: GENTLE,
    },
];

/// All templates available at a difficulty.
pub fn templates_for(difficulty: Difficulty) -> impl Iterator<Item = &'static ArcTemplate> {
    TEMPLATES.iter().filter(move |t| t.allows(difficulty))
}
