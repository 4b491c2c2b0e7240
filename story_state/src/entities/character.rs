//! Character definitions.

use serde::{Deserialize, Serialize};

use super::CharacterId;

/// A non-player character as supplied by the scenario/persona layer.
///
/// The engine never authors these fields; it only reads them to seed
/// relationships, assign arc roles and pick conversational strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Relation to the player, e.g. "spouse", "estranged brother", "new coworker".
    pub role: String,
    pub personality: String,
    /// Free-text status line from the persona layer, e.g. "recently divorced".
    pub status_text: String,
    pub emotional_state: EmotionalState,
    pub status: CharacterStatus,
}

impl Character {
    /// Create a new active, calm character with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            role: String::new(),
            personality: String::new(),
            status_text: String::new(),
            emotional_state: EmotionalState::Calm,
            status: CharacterStatus::Active,
        }
    }

    /// Set the relation-to-player text.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the personality text.
    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    /// Set the status text.
    pub fn with_status_text(mut self, status: impl Into<String>) -> Self {
        self.status_text = status.into();
        self
    }

    /// Set the emotional state.
    pub fn with_emotional_state(mut self, state: EmotionalState) -> Self {
        self.emotional_state = state;
        self
    }

    /// Set the presence status.
    pub fn with_status(mut self, status: CharacterStatus) -> Self {
        self.status = status;
        self
    }

    /// Check if the character is alive.
    pub fn is_alive(&self) -> bool {
        self.status != CharacterStatus::Dead
    }

    /// Alive and currently present in the player's life.
    pub fn is_available(&self) -> bool {
        self.status == CharacterStatus::Active
    }
}

/// Presence of a character in the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CharacterStatus {
    #[default]
    Active,
    /// Alive but away (moved, hospitalised, travelling).
    Absent,
    Dead,
}

/// Closed set of emotional states a character can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum EmotionalState {
    #[default]
    Calm,
    Happy,
    Affectionate,
    Anxious,
    Fearful,
    Sad,
    Angry,
    Jealous,
    Suspicious,
    Guilty,
    Scheming,
    Desperate,
}

/// Keyword table used to classify persona text into an [`EmotionalState`].
/// Earlier rows win when several match.
const EMOTION_KEYWORDS: &[(EmotionalState, &[&str])] = &[
    (EmotionalState::Scheming, &["scheming", "plotting", "calculating", "manipulat"]),
    (EmotionalState::Guilty, &["guilt", "ashamed", "remorse"]),
    (EmotionalState::Jealous, &["jealous", "envious", "envy"]),
    (EmotionalState::Suspicious, &["suspicious", "paranoid", "distrust", "wary"]),
    (EmotionalState::Angry, &["angry", "furious", "hostile", "bitter", "resent", "rage"]),
    (EmotionalState::Desperate, &["desperate", "cornered", "hopeless"]),
    (EmotionalState::Fearful, &["afraid", "scared", "terrified", "fear"]),
    (EmotionalState::Anxious, &["anxious", "nervous", "worried", "stressed", "tense"]),
    (EmotionalState::Sad, &["sad", "grieving", "depressed", "lonely", "heartbroken"]),
    (EmotionalState::Affectionate, &["loving", "affectionate", "devoted", "smitten"]),
    (EmotionalState::Happy, &["happy", "cheerful", "content", "excited", "joyful"]),
    (EmotionalState::Calm, &["calm", "relaxed", "serene"]),
];

impl EmotionalState {
    /// Classify free persona text. Falls back to [`EmotionalState::Calm`].
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        EMOTION_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(state, _)| *state)
            .unwrap_or_default()
    }

    /// States that push a character toward confrontation.
    pub fn is_hostile(&self) -> bool {
        matches!(
            self,
            EmotionalState::Angry | EmotionalState::Jealous | EmotionalState::Scheming
        )
    }

    /// States that make a character guarded.
    pub fn is_guarded(&self) -> bool {
        matches!(
            self,
            EmotionalState::Anxious
                | EmotionalState::Fearful
                | EmotionalState::Suspicious
                | EmotionalState::Guilty
        )
    }

    /// Lowercase label for prompt text.
    pub fn label(&self) -> &'static str {
        match self {
            EmotionalState::Calm => "calm",
            EmotionalState::Happy => "happy",
            EmotionalState::Affectionate => "affectionate",
            EmotionalState::Anxious => "anxious",
            EmotionalState::Fearful => "fearful",
            EmotionalState::Sad => "sad",
            EmotionalState::Angry => "angry",
            EmotionalState::Jealous => "jealous",
            EmotionalState::Suspicious => "suspicious",
            EmotionalState::Guilty => "guilty",
            EmotionalState::Scheming => "scheming",
            EmotionalState::Desperate => "desperate",
        }
    }
}

impl std::fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character() {
        let character = Character::new("Dana");
        assert_eq!(character.name, "Dana");
        assert!(character.is_alive());
        assert!(character.is_available());
        assert_eq!(character.emotional_state, EmotionalState::Calm);
    }

    #[test]
    fn test_character_death() {
        let character = Character::new("Doomed").with_status(CharacterStatus::Dead);
        assert!(!character.is_alive());
        assert!(!character.is_available());
    }

    #[test]
    fn test_absent_character_is_alive_but_unavailable() {
        let character = Character::new("Traveller").with_status(CharacterStatus::Absent);
        assert!(character.is_alive());
        assert!(!character.is_available());
    }

    #[test]
    fn test_emotion_from_text() {
        assert_eq!(EmotionalState::from_text("Quietly FURIOUS"), EmotionalState::Angry);
        assert_eq!(EmotionalState::from_text("nervous and worried"), EmotionalState::Anxious);
        assert_eq!(
            EmotionalState::from_text("plotting, and a bit angry"),
            EmotionalState::Scheming
        );
        assert_eq!(EmotionalState::from_text("???"), EmotionalState::Calm);
    }
}
