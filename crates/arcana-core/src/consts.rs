//! Core spellcasting constants
//!
//! Time units, resource thresholds and the tunable coefficient table used by
//! the failure, experience and encumbrance formulas.

/// Moves (action points) in one game turn
pub const MOVES_PER_TURN: i32 = 100;

/// Turns (seconds) in one hour
pub const TURNS_PER_HOUR: i32 = 3600;

/// Turns needed to refill an empty mana pool at the base regeneration rate
pub const MANA_FULL_REPLENISH_TURNS: f32 = (8 * TURNS_PER_HOUR) as f32;

/// Mana base a fresh caster starts with
pub const DEFAULT_MANA_BASE: i32 = 1000;

/// Fatigue at or above which fatigue-powered spells cannot be cast
pub const FATIGUE_EXHAUSTED: i32 = 575;

/// Moves needed to memorize a spell before difficulty and skill modifiers (30 minutes)
pub const LEARN_BASE_MOVES: i32 = 30 * 60 * MOVES_PER_TURN;

/// Attempts made when looking for a random landing cell
pub const TELEPORT_TRIES: u32 = 50;

/// Experience curve constants.
///
/// `level = floor(ln(xp + A) / B + C)`, inverted as
/// `xp(level) = ceil(exp((level - C) * B)) - A`.
pub const EXP_CURVE_A: f64 = 6200.0;
pub const EXP_CURVE_B: f64 = 0.146661;
pub const EXP_CURVE_C: f64 = -62.5;

/// Highest spell level; the experience curve stays well inside `i32` up to here
pub const MAX_SPELL_LEVEL: i32 = 80;

/// Tunable coefficients for the casting formulas.
///
/// Only the monotonic relationships are contractual (higher level means
/// lower failure, a larger skill deficit means more experience); the numbers
/// themselves are a balance table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastingTuning {
    /// Effective skill at or above which a spell never fails
    pub mastery_skill: f32,
    /// Weight of `(level - difficulty)` in the effective skill
    pub level_weight: f32,
    /// Combined arm encumbrance ignored by somatic spells
    pub somatic_free_encumbrance: i32,
    /// Failure added per point of arm encumbrance beyond the free amount
    pub somatic_fail_per_point: f32,
    /// Mouth encumbrance ignored by verbal spells
    pub verbal_free_encumbrance: i32,
    /// Failure added per point of mouth encumbrance beyond the free amount
    pub verbal_fail_per_point: f32,
    /// Focus that leaves concentration spells unmodified
    pub neutral_focus: f32,
    /// Combined hand encumbrance ignored when paying energy
    pub hands_free_encumbrance: i32,
    /// Energy added per point of hand encumbrance beyond the free amount
    pub hands_cost_per_point: i32,
    /// Combined leg encumbrance ignored when casting
    pub legs_free_encumbrance: i32,
    /// Moves added per point of leg encumbrance beyond the free amount
    pub legs_time_per_point: i32,
    /// Moves added per point of arm encumbrance beyond the free amount (somatic)
    pub somatic_time_per_point: i32,
    /// Experience granted by a successful cast before modifiers
    pub base_casting_exp: f32,
    /// Intelligence considered average for experience and learning
    pub average_intelligence: f32,
}

impl CastingTuning {
    pub const DEFAULT: CastingTuning = CastingTuning {
        mastery_skill: 30.0,
        level_weight: 2.0,
        somatic_free_encumbrance: 20,
        somatic_fail_per_point: 1.0 / 200.0,
        verbal_free_encumbrance: 5,
        verbal_fail_per_point: 1.0 / 100.0,
        neutral_focus: 100.0,
        hands_free_encumbrance: 10,
        hands_cost_per_point: 10,
        legs_free_encumbrance: 20,
        legs_time_per_point: 3,
        somatic_time_per_point: 2,
        base_casting_exp: 75.0,
        average_intelligence: 8.0,
    };
}

impl Default for CastingTuning {
    fn default() -> Self {
        Self::DEFAULT
    }
}
