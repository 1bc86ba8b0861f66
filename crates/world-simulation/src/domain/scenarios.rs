//! # Decision Scenarios
//!
//! The built-in catalog of world events a player can respond to. Each option
//! carries signed KPI deltas; [`SignedDeltas::to_wire`] turns them into the
//! unsigned values the coprocessor encrypts.
//!
//! Negative deltas travel as two's complement: adding `2^32 - n` modulo 2^32
//! is subtracting `n`, so a counter read back through [`decode_signed`]
//! reflects the signed sum as long as it stays within `i32`.

use crate::domain::entities::{DecodedWorldState, Kpi};
use serde::{Deserialize, Serialize};

/// Stability below this promotes the crisis scenario.
pub const LOW_STABILITY_THRESHOLD: i32 = 30;
/// Innovation above this promotes the technology scenario.
pub const HIGH_INNOVATION_THRESHOLD: i32 = 70;
/// Number of scenarios offered at a time.
pub const RECOMMENDATION_LIMIT: usize = 4;

const CRISIS_SCENARIO: &str = "crisis-management";
const TECH_SCENARIO: &str = "tech-breakthrough";

/// Scenario category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioCategory {
    /// Resource allocation.
    Resource,
    /// Crisis response.
    Crisis,
    /// Exploration.
    Exploration,
    /// Diplomacy.
    Diplomacy,
    /// Technology.
    Technology,
}

/// Signed per-KPI deltas of one option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDeltas {
    /// World evolution delta.
    pub world_evolution: i32,
    /// Stability delta.
    pub stability: i32,
    /// Innovation delta.
    pub innovation: i32,
    /// Mystery delta.
    pub mystery: i32,
}

impl SignedDeltas {
    /// Deltas in submission order.
    #[must_use]
    pub const fn new(world_evolution: i32, stability: i32, innovation: i32, mystery: i32) -> Self {
        Self {
            world_evolution,
            stability,
            innovation,
            mystery,
        }
    }

    /// Delta for `kpi`.
    #[must_use]
    pub fn get(&self, kpi: Kpi) -> i32 {
        match kpi {
            Kpi::WorldEvolution => self.world_evolution,
            Kpi::Stability => self.stability,
            Kpi::Innovation => self.innovation,
            Kpi::Mystery => self.mystery,
        }
    }

    /// Two's complement encoding, ready for encryption.
    #[must_use]
    pub fn to_wire(&self) -> [u32; 4] {
        Kpi::ALL.map(|kpi| encode_signed(self.get(kpi)))
    }
}

/// Encodes a signed delta as its two's complement u32.
#[must_use]
pub const fn encode_signed(delta: i32) -> u32 {
    delta as u32
}

/// Reads a wrapped u32 counter as a signed value.
#[must_use]
pub const fn decode_signed(value: u32) -> i32 {
    value as i32
}

/// One way of responding to a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    /// Display name, unique within its scenario.
    pub name: String,
    /// What choosing this option means.
    pub description: String,
    /// KPI effect of the option.
    pub deltas: SignedDeltas,
}

/// A world event with three possible responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionScenario {
    /// Stable kebab-case identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Situation shown to the player.
    pub description: String,
    /// Scenario category.
    pub category: ScenarioCategory,
    /// Available responses.
    pub options: Vec<DecisionOption>,
}

impl DecisionScenario {
    /// Option by name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.name == name)
    }
}

fn option(name: &str, description: &str, deltas: (i32, i32, i32, i32)) -> DecisionOption {
    DecisionOption {
        name: name.to_string(),
        description: description.to_string(),
        deltas: SignedDeltas::new(deltas.0, deltas.1, deltas.2, deltas.3),
    }
}

fn scenario(
    id: &str,
    title: &str,
    description: &str,
    category: ScenarioCategory,
    options: Vec<DecisionOption>,
) -> DecisionScenario {
    DecisionScenario {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category,
        options,
    }
}

/// The built-in scenario catalog, in display order.
#[must_use]
pub fn builtin_scenarios() -> Vec<DecisionScenario> {
    vec![
        scenario(
            "resource-allocation",
            "Resource Allocation",
            "How should limited resources be allocated?",
            ScenarioCategory::Resource,
            vec![
                option(
                    "Prioritize Technology",
                    "Invest most resources in technology R&D",
                    (3, -2, 5, 1),
                ),
                option(
                    "Balanced Development",
                    "Distribute resources evenly across all areas",
                    (2, 3, 2, 0),
                ),
                option(
                    "Conservative Stability",
                    "Prioritize system stability, develop cautiously",
                    (1, 5, -1, -2),
                ),
            ],
        ),
        scenario(
            "mysterious-signal",
            "Mysterious Signal",
            "A signal from an unknown source has been detected...",
            ScenarioCategory::Exploration,
            vec![
                option(
                    "Deep Investigation",
                    "Dispatch research team to investigate the signal source",
                    (2, -3, 4, 5),
                ),
                option(
                    "Cautious Observation",
                    "Observe signal patterns first, then decide",
                    (0, 2, 1, 3),
                ),
                option("Ignore Signal", "Possibly interference, ignore it", (-1, 1, 0, -2)),
            ],
        ),
        scenario(
            CRISIS_SCENARIO,
            "System Crisis",
            "Signs of system instability detected...",
            ScenarioCategory::Crisis,
            vec![
                option(
                    "Emergency Repair",
                    "Immediately invest resources to repair the system",
                    (-1, 5, -2, -1),
                ),
                option(
                    "Gradual Optimization",
                    "Gradually optimize system while maintaining other development",
                    (1, 3, 1, 0),
                ),
                option("Innovation Breakthrough", "Try new solutions", (2, 1, 4, 2)),
            ],
        ),
        scenario(
            "diplomatic-contact",
            "Diplomatic Contact",
            "Received communication request from another world...",
            ScenarioCategory::Diplomacy,
            vec![
                option(
                    "Positive Response",
                    "Respond warmly, seek cooperation opportunities",
                    (3, 2, 2, -3),
                ),
                option(
                    "Cautious Communication",
                    "Maintain distance but keep communication",
                    (1, 3, 1, 1),
                ),
                option(
                    "Reject Contact",
                    "Maintain independence, reject external interference",
                    (0, 2, 0, 3),
                ),
            ],
        ),
        scenario(
            TECH_SCENARIO,
            "Technology Breakthrough",
            "Research team discovered breakthrough technology...",
            ScenarioCategory::Technology,
            vec![
                option(
                    "Full Throttle",
                    "Invest all resources to advance new technology",
                    (4, -2, 6, 2),
                ),
                option("Safe Testing", "Test on small scale first, ensure safety", (2, 1, 3, -1)),
                option(
                    "Conservative Adoption",
                    "Wait for more validation, adopt slowly",
                    (1, 3, 1, -2),
                ),
            ],
        ),
        scenario(
            "ancient-ruins",
            "Ancient Ruins",
            "Discovered mysterious ruins of an ancient civilization...",
            ScenarioCategory::Exploration,
            vec![
                option(
                    "Deep Exploration",
                    "Dispatch archaeological team for deep exploration",
                    (2, -1, 3, 4),
                ),
                option(
                    "Protective Research",
                    "Conduct protective research, dig carefully",
                    (1, 2, 2, 2),
                ),
                option("Keep Distance", "Keep ruins intact, do not interfere", (0, 3, 0, 3)),
            ],
        ),
    ]
}

/// Looks up a built-in scenario by id.
#[must_use]
pub fn find_scenario(id: &str) -> Option<DecisionScenario> {
    builtin_scenarios().into_iter().find(|s| s.id == id)
}

/// Scenarios to offer given the decrypted world state.
///
/// Low stability moves the crisis scenario to the front; high innovation then
/// moves the technology scenario in front of it. At most
/// [`RECOMMENDATION_LIMIT`] are returned.
#[must_use]
pub fn recommended_scenarios(state: &DecodedWorldState) -> Vec<DecisionScenario> {
    let mut scenarios = builtin_scenarios();

    if decode_signed(state.stability) < LOW_STABILITY_THRESHOLD {
        promote(&mut scenarios, CRISIS_SCENARIO);
    }
    if decode_signed(state.innovation) > HIGH_INNOVATION_THRESHOLD {
        promote(&mut scenarios, TECH_SCENARIO);
    }

    scenarios.truncate(RECOMMENDATION_LIMIT);
    scenarios
}

fn promote(scenarios: &mut [DecisionScenario], id: &str) {
    // Stable sort keeps the relative order of everything else.
    scenarios.sort_by_key(|s| s.id != id);
}

// =============================================================================
// TESTS
// =============================================================================
