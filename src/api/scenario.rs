//! Weighted outcome scenarios for the simulated endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ScenarioError;

/// Tolerance when checking that weights sum to 1.0
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Outcome kind a scenario resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Success,
    ValidationError,
    NetworkError,
    ServerError,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Success,
        ScenarioKind::ValidationError,
        ScenarioKind::NetworkError,
        ScenarioKind::ServerError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Success => "success",
            ScenarioKind::ValidationError => "validation_error",
            ScenarioKind::NetworkError => "network_error",
            ScenarioKind::ServerError => "server_error",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ScenarioKind::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(rename = "type")]
    pub kind: ScenarioKind,
    pub weight: f64,
}

impl Scenario {
    pub const fn new(kind: ScenarioKind, weight: f64) -> Self {
        Self { kind, weight }
    }
}

/// Default demo distribution
pub const DEFAULT_SCENARIOS: [Scenario; 4] = [
    Scenario::new(ScenarioKind::Success, 0.6),
    Scenario::new(ScenarioKind::ValidationError, 0.2),
    Scenario::new(ScenarioKind::NetworkError, 0.1),
    Scenario::new(ScenarioKind::ServerError, 0.1),
];

/// Walk the list accumulating weights until `roll` falls in a range.
///
/// `roll` is expected in `[0, 1)`. Returns `None` when the weights run out
/// before reaching `roll` (only possible if they sum to less than `roll`).
pub fn select_scenario(scenarios: &[Scenario], roll: f64) -> Option<ScenarioKind> {
    let mut cumulative = 0.0;
    for scenario in scenarios {
        cumulative += scenario.weight;
        if roll <= cumulative {
            return Some(scenario.kind);
        }
    }
    None
}

/// Scenario table whose weights are known to sum to 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Scenario>", into = "Vec<Scenario>")]
pub struct ScenarioSet(Vec<Scenario>);

impl ScenarioSet {
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, ScenarioError> {
        if scenarios.is_empty() {
            return Err(ScenarioError::Empty);
        }
        if let Some(bad) = scenarios
            .iter()
            .find(|s| !s.weight.is_finite() || s.weight < 0.0)
        {
            return Err(ScenarioError::InvalidWeight(bad.weight));
        }

        let total: f64 = scenarios.iter().map(|s| s.weight).sum();
        if (total - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ScenarioError::WeightsDoNotSumToOne(total));
        }
        Ok(Self(scenarios))
    }

    /// Single scenario with weight 1: every call resolves to `kind`
    pub fn forced(kind: ScenarioKind) -> Self {
        Self(vec![Scenario::new(kind, 1.0)])
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.0
    }

    /// Pick the outcome for `roll` in `[0, 1)`.
    ///
    /// A roll past the cumulative weights resolves to Success.
    pub fn select(&self, roll: f64) -> ScenarioKind {
        select_scenario(&self.0, roll).unwrap_or(ScenarioKind::Success)
    }
}

impl Default for ScenarioSet {
    fn default() -> Self {
        Self(DEFAULT_SCENARIOS.to_vec())
    }
}

impl TryFrom<Vec<Scenario>> for ScenarioSet {
    type Error = ScenarioError;

    fn try_from(value: Vec<Scenario>) -> Result<Self, Self::Error> {
        ScenarioSet::new(value)
    }
}

impl From<ScenarioSet> for Vec<Scenario> {
    fn from(set: ScenarioSet) -> Self {
        set.0
    }
}
