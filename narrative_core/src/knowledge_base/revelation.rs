//! Revelation selection for group scenes.
//!
//! Pressure to reveal grows with the number of messages a character has
//! sent themselves, so characters who have been quiet are not all pushed at
//! once.

use story_state::{
    CharacterId, GroupConversationState, MustReveal, NarrativeState, Party, WorldFact,
};

use crate::config::RevelationConfig;
use crate::text::key_words;

/// Countdown for a character who has sent `own` messages in a conversation
/// of `total` messages, or `None` if there is no pressure yet.
pub fn reveal_countdown(own: u32, total: u32, config: &RevelationConfig) -> Option<u32> {
    if own >= config.force_after_own_messages {
        Some(0)
    } else if own >= config.short_countdown_from {
        Some(config.force_after_own_messages - own)
    } else if own == 1 && total >= config.min_conversation_messages {
        Some(config.long_countdown)
    } else {
        None
    }
}

/// Facts `character` could reveal in this conversation, best first.
///
/// Facts already revealed in the conversation and facts about the character
/// themselves are never candidates. Ordering is by ascending priority, then
/// facts the player has not heard, then facts not every participant knows.
pub fn revelation_candidates<'a>(
    state: &'a NarrativeState,
    conversation: &GroupConversationState,
    character: CharacterId,
) -> Vec<&'a WorldFact> {
    let Some(knowledge) = state.knowledge_of(character) else {
        return Vec::new();
    };
    let mut candidates: Vec<&WorldFact> = knowledge
        .known_facts
        .iter()
        .filter_map(|id| state.fact(*id))
        .filter(|f| !conversation.revealed_facts.contains(&f.id))
        .filter(|f| f.subject != Some(character))
        .collect();

    let everyone_knows = |f: &WorldFact| {
        conversation
            .participants
            .iter()
            .all(|p| f.is_known_by(Party::Npc(*p)))
    };
    candidates.sort_by_key(|f| (f.priority(), f.is_known_to_player(), everyone_knows(f)));
    candidates
}

/// Decide what, if anything, `character` must reveal next.
pub fn plan_revelation(
    state: &NarrativeState,
    conversation: &GroupConversationState,
    character: CharacterId,
    config: &RevelationConfig,
) -> Option<MustReveal> {
    let own = conversation.agenda(character)?.own_messages;
    let countdown = reveal_countdown(own, conversation.message_count, config)?;
    let fact = revelation_candidates(state, conversation, character)
        .into_iter()
        .next()?;

    Some(MustReveal {
        fact: fact.id,
        content: fact.content.clone(),
        reveal_after_messages: countdown,
        hint_only: conversation.revelation_this_round_by_other(character),
        priority: fact.priority(),
    })
}

/// Whether a message discloses a fact: it must repeat at least
/// `key_word_matches` of the fact's key words. Facts with fewer key words
/// than that are never revealed by wording alone.
pub fn message_reveals(message: &str, fact_content: &str, config: &RevelationConfig) -> bool {
    let fact_words = key_words(fact_content, config.key_word_min_len);
    if fact_words.len() < config.key_word_matches {
        return false;
    }
    let message_words = key_words(message, config.key_word_min_len);
    fact_words.intersection(&message_words).count() >= config.key_word_matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_state::{
        Character, ConversationAgenda, ConversationId, Difficulty, FactCategory, Importance,
        PlaythroughRef,
    };

    fn scene(own: u32, total: u32) -> (NarrativeState, GroupConversationState, CharacterId) {
        let ana = Character::new("Ana");
        let ben = Character::new("Ben");
        let (a, b) = (ana.id, ben.id);
        let state = NarrativeState::new(
            PlaythroughRef::new("Alex", "office", Difficulty::Dramatic),
            vec![ana, ben],
        )
        .add_fact(
            WorldFact::new("Ben shredded the audit documents", FactCategory::Secret)
                .with_importance(Importance::Major)
                .with_subject(b)
                .known_by(a),
        )
        .add_fact(
            WorldFact::new("The coffee machine is broken", FactCategory::Event)
                .with_importance(Importance::Minor)
                .known_by(a),
        );

        let mut conv = GroupConversationState::new(ConversationId::new(), vec![a, b], 0);
        let mut agenda = ConversationAgenda::new(a);
        agenda.own_messages = own;
        conv.agendas.insert(a, agenda);
        conv.agendas.insert(b, ConversationAgenda::new(b));
        conv.message_count = total;
        (state, conv, a)
    }

    #[test]
    fn test_countdown_by_own_messages() {
        let config = RevelationConfig::default();
        assert_eq!(reveal_countdown(4, 8, &config), Some(0));
        assert_eq!(reveal_countdown(6, 8, &config), Some(0));
        assert_eq!(reveal_countdown(3, 8, &config), Some(1));
        assert_eq!(reveal_countdown(2, 8, &config), Some(2));
        assert_eq!(reveal_countdown(1, 4, &config), Some(3));
        assert_eq!(reveal_countdown(1, 3, &config), None);
        assert_eq!(reveal_countdown(0, 10, &config), None);
    }

    #[test]
    fn test_forced_revelation_picks_most_severe() {
        let (state, conv, a) = scene(4, 8);
        let plan = plan_revelation(&state, &conv, a, &RevelationConfig::default()).unwrap();
        assert_eq!(plan.reveal_after_messages, 0);
        assert_eq!(plan.content, "Ben shredded the audit documents");
        assert!(!plan.hint_only);
    }

    #[test]
    fn test_revealed_facts_never_reselected() {
        let (state, mut conv, a) = scene(4, 8);
        let first = plan_revelation(&state, &conv, a, &RevelationConfig::default()).unwrap();
        conv.revealed_facts.insert(first.fact);

        let second = plan_revelation(&state, &conv, a, &RevelationConfig::default()).unwrap();
        assert_ne!(second.fact, first.fact);
        conv.revealed_facts.insert(second.fact);
        assert!(plan_revelation(&state, &conv, a, &RevelationConfig::default()).is_none());
    }

    #[test]
    fn test_subject_never_confesses() {
        let (state, conv, a) = scene(4, 8);
        let b = conv.participants[1];
        assert!(revelation_candidates(&state, &conv, b).is_empty());
        assert_eq!(revelation_candidates(&state, &conv, a).len(), 2);
    }

    #[test]
    fn test_message_reveals_needs_two_key_words() {
        let config = RevelationConfig::default();
        let fact = "Ben shredded the audit documents";
        assert!(message_reveals("I watched him shred... no, he SHREDDED the documents!", fact, &config));
        assert!(!message_reveals("Those documents are boring", fact, &config));
    }

    #[test]
    fn test_single_key_word_fact_not_revealed_by_denial() {
        let config = RevelationConfig::default();
        assert!(!message_reveals("I'm not pregnant, I swear", "Ana is pregnant", &config));
        assert!(!message_reveals("Ana is pregnant", "Ana is pregnant", &config));
    }
}
