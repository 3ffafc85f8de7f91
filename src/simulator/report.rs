//! Simulation report generation.

use super::config::SimConfig;
use super::runner::RunStats;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregated results from multiple simulation runs.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub num_runs: u32,
    pub encounters_per_run: u32,
    pub race_id: String,
    pub class_id: String,
    pub camp_id: String,

    // Combat
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_stalemates: f64,
    pub avg_rounds_per_kill: f64,
    pub death_rate: f64,

    // Progression
    pub avg_final_level: f64,
    pub avg_xp_gained: f64,
    pub avg_skill_ups: f64,
    pub avg_final_skills: BTreeMap<String, f64>,

    // Economy and loot
    pub avg_currency_looted: f64,
    pub avg_currency_from_quests: f64,
    pub avg_currency_from_sales: f64,
    pub avg_final_currency: f64,
    pub avg_items_looted: f64,
    pub avg_items_overflowed: f64,
    pub avg_quests_completed: f64,

    // Individual run stats for detailed analysis
    #[serde(skip)]
    pub run_stats: Vec<RunStats>,
}

fn average(runs: &[RunStats], value: impl Fn(&RunStats) -> f64) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().map(value).sum::<f64>() / runs.len() as f64
}

impl SimReport {
    /// Create a new report from completed run stats.
    pub fn from_runs(runs: Vec<RunStats>, config: &SimConfig) -> Self {
        let total_kills: u64 = runs.iter().map(|r| r.kills).sum();
        let total_kill_rounds: u64 = runs.iter().map(|r| r.kill_rounds).sum();
        let total_encounters: u64 = runs.iter().map(|r| r.encounters as u64).sum();
        let total_deaths: u64 = runs.iter().map(|r| r.deaths).sum();

        let mut skill_totals: BTreeMap<String, f64> = BTreeMap::new();
        for run in &runs {
            for (skill, value) in &run.final_skills {
                *skill_totals.entry(skill.name().to_string()).or_insert(0.0) += *value as f64;
            }
        }
        let divisor = runs.len().max(1) as f64;
        let avg_final_skills = skill_totals
            .into_iter()
            .map(|(name, total)| (name, total / divisor))
            .collect();

        Self {
            num_runs: runs.len() as u32,
            encounters_per_run: config.encounters,
            race_id: config.race_id.clone(),
            class_id: config.class_id.clone(),
            camp_id: config.camp_id.clone(),
            avg_kills: average(&runs, |r| r.kills as f64),
            avg_deaths: average(&runs, |r| r.deaths as f64),
            avg_stalemates: average(&runs, |r| r.stalemates as f64),
            avg_rounds_per_kill: if total_kills == 0 {
                0.0
            } else {
                total_kill_rounds as f64 / total_kills as f64
            },
            death_rate: if total_encounters == 0 {
                0.0
            } else {
                total_deaths as f64 / total_encounters as f64
            },
            avg_final_level: average(&runs, |r| r.final_level as f64),
            avg_xp_gained: average(&runs, |r| r.xp_gained as f64),
            avg_skill_ups: average(&runs, |r| r.skill_ups as f64),
            avg_final_skills,
            avg_currency_looted: average(&runs, |r| r.currency_looted as f64),
            avg_currency_from_quests: average(&runs, |r| r.currency_from_quests as f64),
            avg_currency_from_sales: average(&runs, |r| r.currency_from_sales as f64),
            avg_final_currency: average(&runs, |r| r.final_currency as f64),
            avg_items_looted: average(&runs, |r| r.items_looted as f64),
            avg_items_overflowed: average(&runs, |r| r.items_overflowed as f64),
            avg_quests_completed: average(&runs, |r| r.quests_completed as f64),
            run_stats: runs,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                    SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} x {} encounters, {} {} at {}\n\n",
            self.num_runs, self.encounters_per_run, self.race_id, self.class_id, self.camp_id
        ));

        report.push_str("── COMBAT ───────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Avg Kills:           {:.1}\n", self.avg_kills));
        report.push_str(&format!("  Avg Deaths:          {:.1}\n", self.avg_deaths));
        report.push_str(&format!("  Avg Stalemates:      {:.1}\n", self.avg_stalemates));
        report.push_str(&format!(
            "  Rounds per Kill:     {:.2}\n",
            self.avg_rounds_per_kill
        ));
        report.push_str(&format!(
            "  Death Rate:          {:.1}% per encounter\n\n",
            self.death_rate * 100.0
        ));

        report.push_str("── PROGRESSION ──────────────────────────────────────────────────\n");
        report.push_str(&format!("  Avg Final Level:     {:.1}\n", self.avg_final_level));
        report.push_str(&format!("  Avg XP Gained:       {:.0}\n", self.avg_xp_gained));
        report.push_str(&format!("  Avg Skill-ups:       {:.1}\n", self.avg_skill_ups));
        for (skill, value) in &self.avg_final_skills {
            report.push_str(&format!("    {:<16} {:>6.1}\n", skill, value));
        }
        report.push('\n');

        report.push_str("── LOOT & ECONOMY ───────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  Avg Coin Looted:     {:.0}c\n",
            self.avg_currency_looted
        ));
        report.push_str(&format!(
            "  Avg Coin (Quests):   {:.0}c\n",
            self.avg_currency_from_quests
        ));
        report.push_str(&format!(
            "  Avg Coin (Sales):    {:.0}c\n",
            self.avg_currency_from_sales
        ));
        report.push_str(&format!(
            "  Avg Final Purse:     {:.0}c\n",
            self.avg_final_currency
        ));
        report.push_str(&format!("  Avg Items Looted:    {:.1}\n", self.avg_items_looted));
        report.push_str(&format!(
            "  Avg Items Lost:      {:.1} (bags full)\n",
            self.avg_items_overflowed
        ));
        report.push_str(&format!(
            "  Avg Quests Done:     {:.1}\n\n",
            self.avg_quests_completed
        ));

        report.push_str("── BALANCE ASSESSMENT ───────────────────────────────────────────\n");
        let death_rating = if self.death_rate < 0.01 {
            "TOO EASY - Players rarely die"
        } else if self.death_rate < 0.10 {
            "GOOD - Challenging but fair"
        } else if self.death_rate < 0.30 {
            "HARD - Frequent deaths"
        } else {
            "TOO HARD - Camp is out of reach"
        };
        report.push_str(&format!("  Death Rating:    {}\n", death_rating));
        if self.avg_rounds_per_kill > 20.0 {
            report.push_str("  ⚠️  Fights drag on - monster HP or AC too high?\n");
        }
        if self.avg_stalemates > 0.0 {
            report.push_str("  ⚠️  Some encounters hit the round limit\n");
        }
        if self.avg_items_overflowed > self.avg_items_looted * 0.25 {
            report.push_str("  ⚠️  Lots of loot left on the ground - bags too small?\n");
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
