/// Simulation tunables and compile-time limits.
///
/// Every field has a default, so partial TOML files only override what they
/// name (see `delve-content`'s `ConfigLoader`).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Energy an actor must hold to be admitted into the scheduling pool.
    pub action_threshold: f64,

    /// Practice points per point of weapon-category proficiency bonus.
    pub proficiency_ratio: i32,

    /// Percent chance that a displacement trait negates a hit.
    pub displacement_chance: u32,

    /// Percent chance that a poison coating is used up after delivering.
    pub coating_consume_chance: u32,

    /// Natural regeneration heals 1 HP every this many turns.
    pub regen_interval: u64,

    /// Encounter spawns are rolled every this many turns.
    pub encounter_interval: u64,

    /// Percent chance that an encounter roll spawns a wandering monster.
    pub encounter_chance: u32,

    /// Maximum distance the controlling player can see.
    pub sight_radius: i32,

    /// Consecutive empty End-of-Round sweeps tolerated before the scheduler
    /// reports an idle step.
    pub max_idle_rounds: u32,

    /// Attack penalty while nauseous.
    pub nausea_penalty: i32,

    /// Attack penalty per intoxication level.
    pub intoxication_penalty: i32,

    /// Accumulated stress points per point of attack penalty.
    pub stress_divisor: i32,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Reach of a melee attack (Chebyshev distance).
    pub const MELEE_RANGE: i32 = 1;
    /// Sides of the die used for attack rolls and saves.
    pub const D20: u32 = 20;
    /// Maximum tiles a knockback can push a target.
    pub const MAX_KNOCKBACK: i32 = 2;
    /// Rounds a creature keeps burning after its tile catches fire.
    pub const BURN_DURATION: u64 = 3;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ACTION_THRESHOLD: f64 = 1.0;
    pub const DEFAULT_PROFICIENCY_RATIO: i32 = 20;
    pub const DEFAULT_DISPLACEMENT_CHANCE: u32 = 33;
    pub const DEFAULT_COATING_CONSUME_CHANCE: u32 = 50;
    pub const DEFAULT_REGEN_INTERVAL: u64 = 10;
    pub const DEFAULT_ENCOUNTER_INTERVAL: u64 = 50;
    pub const DEFAULT_ENCOUNTER_CHANCE: u32 = 25;
    pub const DEFAULT_SIGHT_RADIUS: i32 = 8;
    pub const DEFAULT_MAX_IDLE_ROUNDS: u32 = 1000;

    pub fn new() -> Self {
        Self {
            action_threshold: Self::DEFAULT_ACTION_THRESHOLD,
            proficiency_ratio: Self::DEFAULT_PROFICIENCY_RATIO,
            displacement_chance: Self::DEFAULT_DISPLACEMENT_CHANCE,
            coating_consume_chance: Self::DEFAULT_COATING_CONSUME_CHANCE,
            regen_interval: Self::DEFAULT_REGEN_INTERVAL,
            encounter_interval: Self::DEFAULT_ENCOUNTER_INTERVAL,
            encounter_chance: Self::DEFAULT_ENCOUNTER_CHANCE,
            sight_radius: Self::DEFAULT_SIGHT_RADIUS,
            max_idle_rounds: Self::DEFAULT_MAX_IDLE_ROUNDS,
            nausea_penalty: 2,
            intoxication_penalty: 1,
            stress_divisor: 10,
        }
    }

    /// Proficiency bonus earned from a practice counter.
    pub fn proficiency_bonus(&self, practice: i32) -> i32 {
        if self.proficiency_ratio <= 0 {
            return 0;
        }
        practice.max(0) / self.proficiency_ratio
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proficiency_scales_with_practice() {
        let config = GameConfig::default();
        assert_eq!(config.proficiency_bonus(0), 0);
        assert_eq!(config.proficiency_bonus(19), 0);
        assert_eq!(config.proficiency_bonus(20), 1);
        assert_eq!(config.proficiency_bonus(65), 3);
    }

    #[test]
    fn zero_ratio_disables_proficiency() {
        let config = GameConfig {
            proficiency_ratio: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.proficiency_bonus(500), 0);
    }
}
