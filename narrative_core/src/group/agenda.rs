//! Per-character agendas for group scenes.
//!
//! Strategy and goals come from explicit tables keyed by emotional state and
//! arc role, then shift with the character's conflicts and allies.

use story_state::{
    ArcRole, CharacterId, ConversationAgenda, EmotionalState, GroupConversationState,
    NarrativeState, Strategy,
};

/// Strategy and goal for each emotional state.
const MOOD_TABLE: &[(EmotionalState, Strategy, &str)] = &[
    (EmotionalState::Calm, Strategy::Neutral, "Keep the conversation civil"),
    (EmotionalState::Happy, Strategy::Supportive, "Keep the good mood going"),
    (EmotionalState::Affectionate, Strategy::Supportive, "Show the people you care about that you're on their side"),
    (EmotionalState::Anxious, Strategy::Defensive, "Avoid drawing attention to yourself"),
    (EmotionalState::Fearful, Strategy::Defensive, "Stay out of trouble and look for protection"),
    (EmotionalState::Sad, Strategy::Neutral, "Look for some sign that someone understands"),
    (EmotionalState::Angry, Strategy::Aggressive, "Make someone answer for what's been bothering you"),
    (EmotionalState::Jealous, Strategy::Aggressive, "Knock down whoever has what you want"),
    (EmotionalState::Suspicious, Strategy::Defensive, "Find out who is hiding something"),
    (EmotionalState::Guilty, Strategy::Defensive, "Keep your own mistakes from coming out"),
    (EmotionalState::Scheming, Strategy::Manipulative, "Steer the others without them noticing"),
    (EmotionalState::Desperate, Strategy::Aggressive, "Get what you need from this conversation, whatever it takes"),
];

/// Goal for each arc role.
const ROLE_GOALS: &[(ArcRole, &str)] = &[
    (ArcRole::Protagonist, "push your own story forward"),
    (ArcRole::Antagonist, "keep your plans hidden while steering the others"),
    (ArcRole::Victim, "find out who is working against you"),
    (ArcRole::Witness, "decide whether to share what you saw"),
    (ArcRole::Enabler, "keep things running smoothly, whatever it costs"),
    (ArcRole::Manipulator, "quietly turn people against each other"),
    (ArcRole::Mediator, "keep the peace between the others"),
    (ArcRole::Catalyst, "stir things up"),
    (ArcRole::Ally, "stand by the people you've sided with"),
    (ArcRole::Rival, "get the upper hand"),
];

pub fn mood_strategy(state: EmotionalState) -> Strategy {
    MOOD_TABLE
        .iter()
        .find(|(s, _, _)| *s == state)
        .map(|(_, strategy, _)| *strategy)
        .unwrap_or_default()
}

pub fn mood_goal(state: EmotionalState) -> &'static str {
    MOOD_TABLE
        .iter()
        .find(|(s, _, _)| *s == state)
        .map(|(_, _, goal)| *goal)
        .unwrap_or("Keep the conversation civil")
}

pub fn role_goal(role: ArcRole) -> &'static str {
    ROLE_GOALS
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, goal)| *goal)
        .unwrap_or("play your part")
}

/// Choose a strategy from mood, arc roles and the balance of conflicts
/// against allies.
pub fn choose_strategy(
    mood: EmotionalState,
    roles: &[ArcRole],
    conflicts: usize,
    allies: usize,
) -> Strategy {
    match mood_strategy(mood) {
        Strategy::Neutral if roles.iter().any(|r| r.is_aggressor()) => Strategy::Manipulative,
        Strategy::Neutral if conflicts >= 2 => Strategy::Aggressive,
        Strategy::Neutral if allies > conflicts => Strategy::Supportive,
        Strategy::Supportive if conflicts > allies + 1 => Strategy::Defensive,
        strategy => strategy,
    }
}

/// Build a fresh agenda for `character` from the conflicts and alliances
/// already recorded on the conversation.
pub fn build_agenda(
    state: &NarrativeState,
    conversation: &GroupConversationState,
    character: CharacterId,
) -> ConversationAgenda {
    let mut agenda = ConversationAgenda::new(character);
    let mood = state
        .character(character)
        .map(|c| c.emotional_state)
        .unwrap_or_default();

    agenda.conflicts = conversation
        .conflicts
        .iter()
        .filter_map(|c| c.other(character).map(|other| (other, c.reasons.clone())))
        .collect();
    agenda.allies = conversation
        .alliances
        .iter()
        .filter_map(|(a, b)| {
            if *a == character {
                Some(*b)
            } else if *b == character {
                Some(*a)
            } else {
                None
            }
        })
        .collect();
    agenda.arc_roles = state
        .arcs_for(character)
        .iter()
        .filter_map(|arc| arc.role_of(character).map(|role| (arc.id, role)))
        .collect();

    let roles: Vec<ArcRole> = agenda.arc_roles.iter().map(|(_, r)| *r).collect();
    agenda.strategy = choose_strategy(mood, &roles, agenda.conflicts.len(), agenda.allies.len());

    agenda.goals.push(mood_goal(mood).to_string());
    for (arc_id, role) in &agenda.arc_roles {
        if let Some(arc) = state.arc(*arc_id) {
            agenda
                .goals
                .push(format!("In \"{}\", {}", arc.title, role_goal(*role)));
        }
    }
    for (other, reasons) in &agenda.conflicts {
        let name = state.party_name((*other).into());
        let why = reasons
            .iter()
            .map(|r| r.describe())
            .collect::<Vec<_>>()
            .join(" and ");
        agenda.goals.push(format!("Deal with {why} between you and {name}"));
    }
    for ally in &agenda.allies {
        agenda
            .goals
            .push(format!("Back up {}", state.party_name((*ally).into())));
    }
    agenda
}
