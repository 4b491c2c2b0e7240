//! Ephemeral state for multi-party conversations.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::entities::{ArcId, CharacterId, ConversationId, FactId};
use crate::mechanics::{ArcRole, Strategy};

/// Why two characters are at odds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictReason {
    Rivalry,
    Distrust,
    /// One of them knows a secret about the other.
    UnresolvedSecret,
    Resentment,
}

impl ConflictReason {
    pub fn describe(&self) -> &'static str {
        match self {
            ConflictReason::Rivalry => "rivalry",
            ConflictReason::Distrust => "distrust",
            ConflictReason::UnresolvedSecret => "an unresolved secret",
            ConflictReason::Resentment => "resentment",
        }
    }
}

/// A conflict between two participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairConflict {
    pub a: CharacterId,
    pub b: CharacterId,
    pub reasons: Vec<ConflictReason>,
    /// Secret facts one of the pair holds about the other.
    pub secret_facts: Vec<FactId>,
}

impl PairConflict {
    pub fn involves(&self, character: CharacterId) -> bool {
        self.a == character || self.b == character
    }

    pub fn other(&self, character: CharacterId) -> Option<CharacterId> {
        if self.a == character {
            Some(self.b)
        } else if self.b == character {
            Some(self.a)
        } else {
            None
        }
    }
}

/// A fact a character is being pushed to disclose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MustReveal {
    pub fact: FactId,
    pub content: String,
    /// How many more own messages before the character must disclose it.
    pub reveal_after_messages: u32,
    /// Only allude to the fact, someone else just made a major revelation.
    pub hint_only: bool,
    pub priority: u8,
}

/// One character's plan for a group scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationAgenda {
    pub character: CharacterId,
    pub goals: Vec<String>,
    pub conflicts: Vec<(CharacterId, Vec<ConflictReason>)>,
    pub allies: Vec<CharacterId>,
    pub arc_roles: Vec<(ArcId, ArcRole)>,
    pub must_reveal: Option<MustReveal>,
    pub strategy: Strategy,
    /// Messages this character has sent in the conversation.
    pub own_messages: u32,
}

impl ConversationAgenda {
    pub fn new(character: CharacterId) -> Self {
        Self {
            character,
            goals: Vec::new(),
            conflicts: Vec::new(),
            allies: Vec::new(),
            arc_roles: Vec::new(),
            must_reveal: None,
            strategy: Strategy::Neutral,
            own_messages: 0,
        }
    }
}

/// Record of the latest major revelation in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevelationMark {
    pub by: CharacterId,
    pub fact: FactId,
    pub at_message: u32,
}

/// State of a live multi-party scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConversationState {
    pub id: ConversationId,
    pub participants: Vec<CharacterId>,
    pub agendas: BTreeMap<CharacterId, ConversationAgenda>,
    pub conflicts: Vec<PairConflict>,
    pub alliances: Vec<(CharacterId, CharacterId)>,
    /// Facts known by at least two participants.
    pub shared_knowledge: Vec<FactId>,
    /// 0 - 100.
    pub tension: f32,
    pub revealed_facts: BTreeSet<FactId>,
    pub message_count: u32,
    pub last_major_revelation: Option<RevelationMark>,
    pub emergent_arc: Option<ArcId>,
    pub started_day: u32,
}

impl GroupConversationState {
    pub fn new(id: ConversationId, participants: Vec<CharacterId>, started_day: u32) -> Self {
        Self {
            id,
            participants,
            agendas: BTreeMap::new(),
            conflicts: Vec::new(),
            alliances: Vec::new(),
            shared_knowledge: Vec::new(),
            tension: 0.0,
            revealed_facts: BTreeSet::new(),
            message_count: 0,
            last_major_revelation: None,
            emergent_arc: None,
            started_day,
        }
    }

    pub fn agenda(&self, character: CharacterId) -> Option<&ConversationAgenda> {
        self.agendas.get(&character)
    }

    pub fn is_participant(&self, character: CharacterId) -> bool {
        self.participants.contains(&character)
    }

    /// Whether someone other than `character` made a major revelation within
    /// the current round (the last `participants.len()` messages).
    pub fn revelation_this_round_by_other(&self, character: CharacterId) -> bool {
        let round = self.participants.len().max(1) as u32;
        self.last_major_revelation.is_some_and(|mark| {
            mark.by != character && self.message_count.saturating_sub(mark.at_message) < round
        })
    }
}
