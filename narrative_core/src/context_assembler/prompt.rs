//! Prompt text for each assembled context.

use serde::{Deserialize, Serialize};
use story_state::{EmotionalState, MustReveal, RelationshipMetrics, Strategy};

use crate::simulation::{BeatDirective, SimulationDirective};

/// One participant's instructions for a group scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaContext {
    pub name: String,
    pub strategy: Strategy,
    pub goals: Vec<String>,
    /// "Name (reason, reason)" per opponent.
    pub conflicts: Vec<String>,
    pub allies: Vec<String>,
    /// Everyone else in the scene.
    pub others: Vec<String>,
    pub must_reveal: Option<MustReveal>,
    pub scene_tension: f32,
}

/// One NPC's view of the world and of the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterContext {
    pub name: String,
    pub role: String,
    pub personality: String,
    pub mood: EmotionalState,
    pub player_name: String,
    /// Short label for how the NPC regards the player.
    pub feeling: String,
    pub toward_player: Option<RelationshipMetrics>,
    /// Most urgent first.
    pub known_facts: Vec<String>,
    pub suspicions: Vec<String>,
    pub arcs: Vec<String>,
    pub recent_events: Vec<String>,
}

fn push_list(prompt: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    prompt.push_str(&format!("## {}\n", heading));
    for item in items {
        prompt.push_str(&format!("- {}\n", item));
    }
    prompt.push('\n');
}

fn beat_line(beat: &BeatDirective) -> String {
    if beat.participants.is_empty() {
        format!("[{}] {}", beat.arc_title, beat.content)
    } else {
        format!(
            "[{}] {} ({})",
            beat.arc_title,
            beat.content,
            beat.participants.join(", ")
        )
    }
}

impl SimulationDirective {
    /// Format the directive as a prompt string.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "## Simulate days {} to {}\n",
            self.from_day.saturating_add(1),
            self.to_day()
        ));
        prompt.push_str(&format!("Target tension: {:.0}/100\n\n", self.target_tension));

        let focus: Vec<String> = self
            .focus_arcs
            .iter()
            .map(|f| format!("{} ({} phase, tension {:.0})", f.title, f.phase.name(), f.tension))
            .collect();
        push_list(&mut prompt, "Focus On", &focus);

        let mandatory: Vec<String> = self.mandatory_beats.iter().map(beat_line).collect();
        push_list(&mut prompt, "Must Happen", &mandatory);

        let possible: Vec<String> = self.possible_beats.iter().map(beat_line).collect();
        push_list(&mut prompt, "May Happen", &possible);

        let due: Vec<String> = self
            .due_consequences
            .iter()
            .map(|c| format!("{} ({})", c.description, c.severity.name()))
            .collect();
        push_list(&mut prompt, "Consequences Coming Due", &due);

        let agendas: Vec<String> = self
            .npc_agendas
            .iter()
            .map(|a| format!("{} ({}): {}", a.name, a.mood, a.goals.join("; ")))
            .collect();
        push_list(&mut prompt, "What Everyone Is Up To", &agendas);

        push_list(&mut prompt, "World Guidance", &self.world_guidance);

        prompt
    }
}

impl AgendaContext {
    /// Format the agenda as a prompt string.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("## Your Agenda ({})\n", self.name));
        if !self.others.is_empty() {
            prompt.push_str(&format!("In the scene: {}\n", self.others.join(", ")));
        }
        prompt.push_str(&format!("Strategy: {}\n", self.strategy.name()));
        prompt.push_str(&format!("Scene tension: {:.0}/100\n\n", self.scene_tension));

        push_list(&mut prompt, "Goals", &self.goals);
        push_list(&mut prompt, "Conflicts", &self.conflicts);
        push_list(&mut prompt, "Allies", &self.allies);

        if let Some(reveal) = &self.must_reveal {
            prompt.push_str("## Something You Know\n");
            let line = if reveal.hint_only {
                format!(
                    "Someone just made a big revelation. Only hint at this, do not say it outright: {}",
                    reveal.content
                )
            } else if reveal.reveal_after_messages == 0 {
                format!("Reveal this now: {}", reveal.content)
            } else {
                format!(
                    "Work toward revealing this within {} messages: {}",
                    reveal.reveal_after_messages, reveal.content
                )
            };
            prompt.push_str(&line);
            prompt.push_str("\n\n");
        }

        prompt
    }
}

impl CharacterContext {
    /// Format the character context as a prompt string.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("## {}\n", self.name));
        if !self.role.is_empty() {
            prompt.push_str(&format!("Role: {}\n", self.role));
        }
        if !self.personality.is_empty() {
            prompt.push_str(&format!("Personality: {}\n", self.personality));
        }
        prompt.push_str(&format!("Mood: {}\n", self.mood));
        match &self.toward_player {
            Some(m) => prompt.push_str(&format!(
                "Feelings toward {}: {} (trust {:.0}, affection {:.0}, fear {:.0}, respect {:.0}, rivalry {:.0})\n",
                self.player_name, self.feeling, m.trust, m.affection, m.fear, m.respect, m.rivalry
            )),
            None => prompt.push_str(&format!(
                "Feelings toward {}: {}\n",
                self.player_name, self.feeling
            )),
        }
        prompt.push('\n');

        push_list(&mut prompt, "What You Know", &self.known_facts);
        push_list(&mut prompt, "What You Suspect", &self.suspicions);
        push_list(&mut prompt, "Your Stories", &self.arcs);
        push_list(&mut prompt, "Recently", &self.recent_events);

        prompt
    }
}
