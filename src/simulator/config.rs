//! Simulation configuration.

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of independent characters to simulate
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Encounters (spawn to kill or death) per run
    pub encounters: u32,

    /// Rounds before an encounter is abandoned as a stalemate
    pub max_rounds_per_encounter: u32,

    pub race_id: String,
    pub class_id: String,
    pub camp_id: String,

    /// Merchant that buys the bags empty when they fill up (None = never sell)
    pub merchant_id: Option<String>,

    /// Whether to generate, accept, and turn in quests along the way
    pub simulate_quests: bool,

    /// Simulated wall-clock seconds per round, for the quest daily reset
    pub seconds_per_round: i64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 100,
            seed: None,
            encounters: 200,
            max_rounds_per_encounter: 500,
            race_id: "human".to_string(),
            class_id: "warrior".to_string(),
            camp_id: "meadow_burrows".to_string(),
            merchant_id: Some("trader_jolen".to_string()),
            simulate_quests: true,
            seconds_per_round: 3,
        }
    }
}

impl SimConfig {
    /// Quick seeded config for tests and balance spot checks.
    pub fn quick(encounters: u32, seed: u64) -> Self {
        Self {
            num_runs: 1,
            seed: Some(seed),
            encounters,
            ..Default::default()
        }
    }
}
