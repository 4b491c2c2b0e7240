//! World facts and per-character knowledge.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Timestamp;
use crate::entities::{ArcId, CharacterId, FactId, Party};
use crate::mechanics::{FactCategory, Importance, Veracity};

/// Maximum number of entries kept in a character's recency log.
pub const RECENT_KNOWLEDGE_LIMIT: usize = 20;

/// An atomic truth (or claim) about the world.
///
/// Facts are immutable once created, except that `known_by` may grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldFact {
    pub id: FactId,
    pub content: String,
    pub category: FactCategory,
    pub importance: Importance,
    pub known_by: BTreeSet<Party>,
    pub veracity: Veracity,
    /// Chance (0.0 - 1.0) that a knower passes the fact on per propagation pass.
    pub spread_propensity: f32,
    /// The character this fact is about, if any.
    pub subject: Option<CharacterId>,
    /// The arc that produced this fact, if any.
    pub arc: Option<ArcId>,
    pub created_day: u32,
    pub created_at: Timestamp,
}

impl WorldFact {
    /// Create a new true, moderate fact known by nobody.
    pub fn new(content: impl Into<String>, category: FactCategory) -> Self {
        Self {
            id: FactId::new(),
            content: content.into(),
            category,
            importance: Importance::Moderate,
            known_by: BTreeSet::new(),
            veracity: Veracity::True,
            spread_propensity: 0.0,
            subject: None,
            arc: None,
            created_day: 0,
            created_at: Timestamp::now(),
        }
    }

    pub fn with_id(mut self, id: FactId) -> Self {
        self.id = id;
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_veracity(mut self, veracity: Veracity) -> Self {
        self.veracity = veracity;
        self
    }

    /// Set the spread propensity, clamped to 0.0 - 1.0.
    pub fn with_spread(mut self, propensity: f32) -> Self {
        self.spread_propensity = propensity.clamp(0.0, 1.0);
        self
    }

    pub fn with_subject(mut self, subject: CharacterId) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_arc(mut self, arc: ArcId) -> Self {
        self.arc = Some(arc);
        self
    }

    pub fn with_day(mut self, day: u32) -> Self {
        self.created_day = day;
        self
    }

    pub fn known_by(mut self, party: impl Into<Party>) -> Self {
        self.known_by.insert(party.into());
        self
    }

    pub fn is_known_by(&self, party: Party) -> bool {
        self.known_by.contains(&party)
    }

    pub fn is_known_to_player(&self) -> bool {
        self.is_known_by(Party::Player)
    }

    pub fn is_secret(&self) -> bool {
        self.category == FactCategory::Secret
    }

    pub fn is_spreadable(&self) -> bool {
        self.spread_propensity > 0.0
    }

    /// Revelation priority, lower is more urgent.
    pub fn priority(&self) -> u8 {
        self.importance.priority()
    }
}

/// How a character came to know a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnowledgeSource {
    /// Known from the moment the fact was created.
    Initial,
    /// Passed on by another party.
    ToldBy(Party),
    /// Disclosed during a group conversation.
    Revealed,
    /// Learned during an off-screen simulation.
    Simulated,
}

/// One line of a character's recency log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub fact: FactId,
    pub day: u32,
    pub source: KnowledgeSource,
}

/// A belief derived from a rumor or piece of evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suspicion {
    pub about: Option<CharacterId>,
    pub from_fact: FactId,
    pub content: String,
    /// 0.0 - 1.0.
    pub confidence: f32,
    pub day: u32,
}

/// Everything one NPC knows and suspects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NpcKnowledge {
    pub known_facts: BTreeSet<FactId>,
    pub suspicions: Vec<Suspicion>,
    /// Known facts that are secrets.
    pub secrets: BTreeSet<FactId>,
    /// Oldest first, capped at `RECENT_KNOWLEDGE_LIMIT`.
    pub recent: Vec<KnowledgeEntry>,
}

impl NpcKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn knows(&self, fact: FactId) -> bool {
        self.known_facts.contains(&fact)
    }

    /// Record a newly learned fact. Returns `false` if it was already known.
    pub fn learn(&mut self, fact: &WorldFact, day: u32, source: KnowledgeSource) -> bool {
        if !self.known_facts.insert(fact.id) {
            return false;
        }
        if fact.is_secret() {
            self.secrets.insert(fact.id);
        }
        self.recent.push(KnowledgeEntry {
            fact: fact.id,
            day,
            source,
        });
        if self.recent.len() > RECENT_KNOWLEDGE_LIMIT {
            let overflow = self.recent.len() - RECENT_KNOWLEDGE_LIMIT;
            self.recent.drain(..overflow);
        }
        true
    }

    /// Add a suspicion unless one already stems from the same fact.
    pub fn suspect(&mut self, suspicion: Suspicion) -> bool {
        if self
            .suspicions
            .iter()
            .any(|s| s.from_fact == suspicion.from_fact)
        {
            return false;
        }
        self.suspicions.push(suspicion);
        true
    }
}
