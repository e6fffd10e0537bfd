//! Emotional state transitions.
//!
//! Two kinds of update move an agent's emotions: a slow ambient drift
//! applied on the emotion loop, and action-outcome deltas applied right
//! after each completed action. Both clamp every field back into [0, 1]
//! before the row is appended.

use chrono::{DateTime, Utc};
use hamlet_types::{ActionCategory, EmotionalState};
use rust_decimal::Decimal;

use crate::decision::AgentAction;

// ---------------------------------------------------------------------------
// Ambient drift
// ---------------------------------------------------------------------------

/// Apply one step of ambient drift and stamp the row.
///
/// Needs grow on their own: hunger fastest, then boredom, then the quieter
/// curiosity and loneliness. Nothing decays here; only actions relieve
/// pressure.
pub fn drift(state: &mut EmotionalState, now: DateTime<Utc>) {
    state.hunger = state.hunger.saturating_add(Decimal::new(5, 2)); // +0.05
    state.boredom = state.boredom.saturating_add(Decimal::new(3, 2)); // +0.03
    state.curiosity = state.curiosity.saturating_add(Decimal::new(2, 2)); // +0.02
    state.loneliness = state.loneliness.saturating_add(Decimal::new(2, 2)); // +0.02
    state.clamp_all();
    state.recorded_at = now;
}

// ---------------------------------------------------------------------------
// Action outcomes
// ---------------------------------------------------------------------------

/// Apply the emotional consequences of a finished action and stamp the row.
///
/// Deltas depend on what was attempted; `success` only gates the
/// satisfaction bonus for exploration, social, and trading actions.
/// Building pays out satisfaction regardless of outcome, and resting
/// always relieves stress while slightly feeding boredom.
pub fn apply_action_outcome(
    state: &mut EmotionalState,
    action: AgentAction,
    success: bool,
    now: DateTime<Utc>,
) {
    match action {
        AgentAction::Eat => {
            state.hunger = state.hunger.saturating_sub(Decimal::new(5, 1));
            state.satisfaction = state.satisfaction.saturating_add(Decimal::new(2, 1));
        }
        AgentAction::Flee | AgentAction::Shelter | AgentAction::Heal => {
            state.safety = state.safety.saturating_add(Decimal::new(3, 1));
            state.stress = state.stress.saturating_sub(Decimal::new(2, 1));
        }
        _ => match action.category() {
            ActionCategory::Exploration => {
                state.curiosity = state.curiosity.saturating_sub(Decimal::new(3, 1));
                state.boredom = state.boredom.saturating_sub(Decimal::new(4, 1));
                if success {
                    state.satisfaction = state.satisfaction.saturating_add(Decimal::new(3, 1));
                }
            }
            ActionCategory::Social | ActionCategory::Trading => {
                state.loneliness = state.loneliness.saturating_sub(Decimal::new(4, 1));
                state.boredom = state.boredom.saturating_sub(Decimal::new(2, 1));
                if success {
                    state.satisfaction = state.satisfaction.saturating_add(Decimal::new(2, 1));
                }
            }
            ActionCategory::Building => {
                state.satisfaction = state.satisfaction.saturating_add(Decimal::new(3, 1));
                state.boredom = state.boredom.saturating_sub(Decimal::new(3, 1));
            }
            ActionCategory::Resting => {
                state.stress = state.stress.saturating_sub(Decimal::new(4, 1));
                state.boredom = state.boredom.saturating_add(Decimal::new(1, 1));
            }
            ActionCategory::Survival | ActionCategory::Gathering => {}
        },
    }
    state.clamp_all();
    state.recorded_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_raises_needs_and_clamps() {
        let mut state = EmotionalState::neutral(Utc::now());
        state.hunger = Decimal::new(98, 2);
        let now = Utc::now();
        drift(&mut state, now);
        assert_eq!(state.hunger, Decimal::ONE);
        assert_eq!(state.boredom, Decimal::new(53, 2));
        assert_eq!(state.recorded_at, now);
    }

    #[test]
    fn eating_relieves_hunger() {
        let mut state = EmotionalState::neutral(Utc::now());
        state.hunger = Decimal::new(9, 1);
        apply_action_outcome(&mut state, AgentAction::Eat, true, Utc::now());
        assert_eq!(state.hunger, Decimal::new(4, 1));
        assert_eq!(state.satisfaction, Decimal::new(7, 1));
    }

    #[test]
    fn failed_social_attempt_skips_satisfaction() {
        let mut state = EmotionalState::neutral(Utc::now());
        apply_action_outcome(&mut state, AgentAction::Chat, false, Utc::now());
        assert_eq!(state.loneliness, Decimal::new(1, 1));
        assert_eq!(state.satisfaction, Decimal::new(5, 1));
    }

    #[test]
    fn building_pays_out_regardless_of_outcome() {
        let mut state = EmotionalState::neutral(Utc::now());
        apply_action_outcome(&mut state, AgentAction::CraftTool, false, Utc::now());
        assert_eq!(state.satisfaction, Decimal::new(8, 1));
        assert_eq!(state.boredom, Decimal::new(2, 1));
    }

    #[test]
    fn no_field_leaves_the_unit_range() {
        let mut state = EmotionalState::neutral(Utc::now());
        state.stress = Decimal::new(1, 1);
        apply_action_outcome(&mut state, AgentAction::Sleep, true, Utc::now());
        assert_eq!(state.stress, Decimal::ZERO);
    }
}
