//! Directed relationships and their bounded metrics.

use serde::{Deserialize, Serialize};

use crate::entities::Party;

/// Range of the signed metrics (trust, affection, fear).
pub const SIGNED_RANGE: (f32, f32) = (-100.0, 100.0);
/// Range of the unsigned metrics (respect, rivalry, dependency).
pub const UNSIGNED_RANGE: (f32, f32) = (0.0, 100.0);

/// Six bounded metrics describing how `from` feels about `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelationshipMetrics {
    pub trust: f32,
    pub affection: f32,
    pub fear: f32,
    pub respect: f32,
    pub rivalry: f32,
    pub dependency: f32,
}

impl Default for RelationshipMetrics {
    fn default() -> Self {
        Self {
            trust: 50.0,
            affection: 30.0,
            fear: 0.0,
            respect: 50.0,
            rivalry: 10.0,
            dependency: 5.0,
        }
    }
}

impl RelationshipMetrics {
    /// Clamp every metric into its declared range.
    pub fn clamped(self) -> Self {
        let signed = |v: f32| v.clamp(SIGNED_RANGE.0, SIGNED_RANGE.1);
        let unsigned = |v: f32| v.clamp(UNSIGNED_RANGE.0, UNSIGNED_RANGE.1);
        Self {
            trust: signed(self.trust),
            affection: signed(self.affection),
            fear: signed(self.fear),
            respect: unsigned(self.respect),
            rivalry: unsigned(self.rivalry),
            dependency: unsigned(self.dependency),
        }
    }

    /// Add a delta and clamp the result.
    pub fn apply(&self, delta: &MetricDelta) -> Self {
        Self {
            trust: self.trust + delta.trust,
            affection: self.affection + delta.affection,
            fear: self.fear + delta.fear,
            respect: self.respect + delta.respect,
            rivalry: self.rivalry + delta.rivalry,
            dependency: self.dependency + delta.dependency,
        }
        .clamped()
    }

    /// Short label summarising the metrics, used as the relationship status.
    pub fn describe(&self) -> &'static str {
        if self.fear >= 60.0 {
            "afraid"
        } else if self.trust <= -30.0 || self.affection <= -30.0 {
            "hostile"
        } else if self.rivalry >= 60.0 {
            "rivals"
        } else if self.trust >= 70.0 && self.affection >= 70.0 {
            "devoted"
        } else if self.affection >= 50.0 {
            "close"
        } else if self.trust < 20.0 {
            "distrustful"
        } else if self.dependency >= 60.0 {
            "dependent"
        } else {
            "neutral"
        }
    }
}

/// A partial change to relationship metrics. Missing fields are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricDelta {
    pub trust: f32,
    pub affection: f32,
    pub fear: f32,
    pub respect: f32,
    pub rivalry: f32,
    pub dependency: f32,
}

impl MetricDelta {
    pub fn trust(value: f32) -> Self {
        Self {
            trust: value,
            ..Default::default()
        }
    }

    pub fn affection(value: f32) -> Self {
        Self {
            affection: value,
            ..Default::default()
        }
    }

    pub fn rivalry(value: f32) -> Self {
        Self {
            rivalry: value,
            ..Default::default()
        }
    }

    pub fn fear(value: f32) -> Self {
        Self {
            fear: value,
            ..Default::default()
        }
    }

    /// Component-wise sum.
    pub fn plus(self, other: MetricDelta) -> Self {
        Self {
            trust: self.trust + other.trust,
            affection: self.affection + other.affection,
            fear: self.fear + other.fear,
            respect: self.respect + other.respect,
            rivalry: self.rivalry + other.rivalry,
            dependency: self.dependency + other.dependency,
        }
    }

    /// The delta that actually took effect between two metric values.
    pub fn between(before: &RelationshipMetrics, after: &RelationshipMetrics) -> Self {
        Self {
            trust: after.trust - before.trust,
            affection: after.affection - before.affection,
            fear: after.fear - before.fear,
            respect: after.respect - before.respect,
            rivalry: after.rivalry - before.rivalry,
            dependency: after.dependency - before.dependency,
        }
    }

    /// Sum of absolute changes across all metrics.
    pub fn total_shift(&self) -> f32 {
        self.trust.abs()
            + self.affection.abs()
            + self.fear.abs()
            + self.respect.abs()
            + self.rivalry.abs()
            + self.dependency.abs()
    }

    pub fn is_zero(&self) -> bool {
        self.total_shift() == 0.0
    }
}

/// How large a recorded relationship change was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChangeMagnitude {
    Minor,
    Moderate,
    Significant,
    Dramatic,
}

impl ChangeMagnitude {
    /// Classify a change by its total shift.
    pub fn classify(delta: &MetricDelta) -> Self {
        match delta.total_shift() {
            s if s < 5.0 => ChangeMagnitude::Minor,
            s if s < 15.0 => ChangeMagnitude::Moderate,
            s if s < 30.0 => ChangeMagnitude::Significant,
            _ => ChangeMagnitude::Dramatic,
        }
    }
}

/// One entry in a relationship's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEvent {
    pub day: u32,
    pub reason: String,
    /// The change after clamping.
    pub applied: MetricDelta,
    pub magnitude: ChangeMagnitude,
}

/// How `from` regards `to`. The reverse direction is a separate relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: Party,
    pub to: Party,
    pub metrics: RelationshipMetrics,
    pub status: String,
    pub history: Vec<RelationshipEvent>,
}

impl Relationship {
    /// Create a relationship with the given starting metrics.
    pub fn new(from: Party, to: Party, metrics: RelationshipMetrics) -> Self {
        let metrics = metrics.clamped();
        Self {
            from,
            to,
            metrics,
            status: metrics.describe().to_string(),
            history: Vec::new(),
        }
    }

    /// Apply a delta, clamp, refresh the status and append a history entry.
    pub fn apply(&mut self, delta: &MetricDelta, day: u32, reason: impl Into<String>) {
        let before = self.metrics;
        self.metrics = before.apply(delta);
        self.status = self.metrics.describe().to_string();

        let applied = MetricDelta::between(&before, &self.metrics);
        self.history.push(RelationshipEvent {
            day,
            reason: reason.into(),
            applied,
            magnitude: ChangeMagnitude::classify(&applied),
        });
    }

    /// Check if this relationship runs between the two parties in this direction.
    pub fn connects(&self, from: Party, to: Party) -> bool {
        self.from == from && self.to == to
    }

    /// Check if this relationship involves a party in either position.
    pub fn involves(&self, party: Party) -> bool {
        self.from == party || self.to == party
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CharacterId;

    fn pair() -> (Party, Party) {
        (Party::Npc(CharacterId::new()), Party::Player)
    }

    #[test]
    fn test_apply_clamps_to_bounds() {
        let (a, b) = pair();
        let mut rel = Relationship::new(a, b, RelationshipMetrics::default());

        rel.apply(
            &MetricDelta {
                trust: 500.0,
                affection: -500.0,
                fear: 250.0,
                respect: -80.0,
                rivalry: 400.0,
                dependency: -40.0,
            },
            1,
            "extreme swing",
        );

        assert_eq!(rel.metrics.trust, 100.0);
        assert_eq!(rel.metrics.affection, -100.0);
        assert_eq!(rel.metrics.fear, 100.0);
        assert_eq!(rel.metrics.respect, 0.0);
        assert_eq!(rel.metrics.rivalry, 100.0);
        assert_eq!(rel.metrics.dependency, 0.0);
    }

    #[test]
    fn test_history_records_applied_change() {
        let (a, b) = pair();
        let mut rel = Relationship::new(a, b, RelationshipMetrics::default());

        rel.apply(&MetricDelta::trust(60.0), 3, "saved their life");

        assert_eq!(rel.history.len(), 1);
        let entry = &rel.history[0];
        assert_eq!(entry.day, 3);
        assert_eq!(entry.applied.trust, 50.0);
        assert_eq!(entry.magnitude, ChangeMagnitude::Dramatic);
    }

    #[test]
    fn test_magnitude_classification() {
        assert_eq!(ChangeMagnitude::classify(&MetricDelta::trust(2.0)), ChangeMagnitude::Minor);
        assert_eq!(
            ChangeMagnitude::classify(&MetricDelta::trust(-10.0)),
            ChangeMagnitude::Moderate
        );
        assert_eq!(
            ChangeMagnitude::classify(&MetricDelta::trust(10.0).plus(MetricDelta::fear(10.0))),
            ChangeMagnitude::Significant
        );
    }

    #[test]
    fn test_status_follows_metrics() {
        let (a, b) = pair();
        let mut rel = Relationship::new(a, b, RelationshipMetrics::default());
        assert_eq!(rel.status, "neutral");

        rel.apply(&MetricDelta::fear(70.0), 1, "threatened");
        assert_eq!(rel.status, "afraid");
    }
}
