//! Score, ore storage and goods storage.
//!
//! Every mutation keeps the pools inside `[0, capacity]`. Callers that must
//! not lose value (collector deliveries, factory output) check free space
//! first; the clamp here is the backstop, not the policy.

use crate::{Constants, ResourceLedger};

impl ResourceLedger {
    pub fn new(constants: &Constants) -> Self {
        let ledger = Self {
            score: constants.initial_score,
            ore_stored: constants
                .initial_ore_stored
                .min(constants.initial_ore_capacity),
            ore_capacity: constants.initial_ore_capacity,
            goods_stored: constants
                .initial_goods_stored
                .min(constants.initial_goods_capacity),
            goods_capacity: constants.initial_goods_capacity,
        };
        ledger.debug_check();
        ledger
    }

    /// Adds `delta` to the score. The score never goes negative; a debit
    /// larger than the balance is clamped and logged.
    pub fn add_score(&mut self, delta: i64) {
        if delta < 0 && delta.unsigned_abs() > self.score {
            tracing::warn!(
                score = self.score,
                debit = delta.unsigned_abs(),
                "score debit exceeds balance, clamping to zero"
            );
        }
        self.score = apply_delta(self.score, delta, u64::MAX);
    }

    pub fn add_ore(&mut self, delta: i64) {
        self.ore_stored = apply_delta(self.ore_stored, delta, self.ore_capacity);
        self.debug_check();
    }

    pub fn add_goods(&mut self, delta: i64) {
        self.goods_stored = apply_delta(self.goods_stored, delta, self.goods_capacity);
        self.debug_check();
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.score >= cost
    }

    /// Debits `cost` if the score covers it. Returns whether the debit happened.
    pub fn try_spend(&mut self, cost: u64) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.score -= cost;
        true
    }

    pub fn ore_free(&self) -> u64 {
        self.ore_capacity.saturating_sub(self.ore_stored)
    }

    pub fn goods_free(&self) -> u64 {
        self.goods_capacity.saturating_sub(self.goods_stored)
    }

    /// Buys one ore-capacity step. On success the capacity grows by
    /// `capacity_multiplier` (rounded up) and `cost` escalates by `cost_multiplier`.
    pub fn upgrade_ore_capacity(
        &mut self,
        cost: &mut u64,
        capacity_multiplier: f64,
        cost_multiplier: f64,
    ) -> bool {
        if !self.try_spend(*cost) {
            return false;
        }
        self.ore_capacity = scale_up(self.ore_capacity, capacity_multiplier);
        *cost = scale_up(*cost, cost_multiplier);
        self.debug_check();
        true
    }

    /// Goods counterpart of [`ResourceLedger::upgrade_ore_capacity`].
    pub fn upgrade_goods_capacity(
        &mut self,
        cost: &mut u64,
        capacity_multiplier: f64,
        cost_multiplier: f64,
    ) -> bool {
        if !self.try_spend(*cost) {
            return false;
        }
        self.goods_capacity = scale_up(self.goods_capacity, capacity_multiplier);
        *cost = scale_up(*cost, cost_multiplier);
        self.debug_check();
        true
    }

    fn debug_check(&self) {
        debug_assert!(self.ore_capacity > 0, "ore capacity must be positive");
        debug_assert!(self.goods_capacity > 0, "goods capacity must be positive");
        debug_assert!(self.ore_stored <= self.ore_capacity);
        debug_assert!(self.goods_stored <= self.goods_capacity);
    }
}

fn apply_delta(current: u64, delta: i64, max: u64) -> u64 {
    let next = if delta >= 0 {
        current.saturating_add(delta.unsigned_abs())
    } else {
        current.saturating_sub(delta.unsigned_abs())
    };
    next.min(max)
}

/// `ceil(value * multiplier)`, the rounding every escalating cost and
/// capacity uses.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scale_up(value: u64, multiplier: f64) -> u64 {
    (value as f64 * multiplier).ceil().max(0.0) as u64
}

/// Rounds a multiplier to one decimal, so repeated `+0.1` steps stay exact-looking.
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Converts a pool amount to a signed delta for the `add_*` calls.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn credit(amount: u64) -> i64 {
    amount.min(i64::MAX as u64) as i64
}

pub(crate) fn debit(amount: u64) -> i64 {
    -credit(amount)
}
