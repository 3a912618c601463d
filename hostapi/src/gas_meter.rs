//! Gas meter with fatal-on-exhaustion semantics.
//!
//! `gas_left` is debited by every host function and never observed
//! negative: a debit that would overdraw fails atomically, leaving the
//! meter unchanged. `gas_refund` is a separate monotonically
//! non-decreasing accumulator applied by the caller after halt; it is
//! never subtracted from `gas_left` mid-call.

use crate::error::EeiError;

/// Per-invocation gas accounting.
///
/// The signed [`take`](GasMeter::take) entry point exists because
/// value-transferring calls charge `(9000 − 2300) + forwarded` and then
/// immediately charge `−forwarded`, netting a constant surcharge while
/// still requiring the forwarded gas to be momentarily available.
#[derive(Debug, Clone)]
pub struct GasMeter {
    gas_left: u64,
    refund: u64,
}

impl GasMeter {
    /// Create a meter holding `gas_left` gas.
    pub fn new(gas_left: u64) -> Self {
        Self { gas_left, refund: 0 }
    }

    /// Debit (positive) or credit (negative) gas.
    ///
    /// A debit exceeding the remaining gas fails with `OutOfGas` and
    /// leaves the meter unchanged.
    pub fn take(&mut self, amount: i64) -> Result<(), EeiError> {
        if amount >= 0 {
            self.charge(amount as u64)
        } else {
            self.credit(amount.unsigned_abs());
            Ok(())
        }
    }

    /// Debit `amount` gas. Fails atomically on exhaustion.
    pub fn charge(&mut self, amount: u64) -> Result<(), EeiError> {
        if self.gas_left < amount {
            return Err(EeiError::OutOfGas {
                needed: amount,
                left: self.gas_left,
            });
        }
        self.gas_left -= amount;
        Ok(())
    }

    /// Credit `amount` gas back (used by the call-value stipend math).
    pub fn credit(&mut self, amount: u64) {
        self.gas_left = self.gas_left.saturating_add(amount);
    }

    /// Credit the refund accumulator. Applied by the caller after halt.
    pub fn credit_refund(&mut self, amount: u64) {
        self.refund = self.refund.saturating_add(amount);
    }

    /// Remaining gas.
    pub fn gas_left(&self) -> u64 {
        self.gas_left
    }

    /// Accumulated refund.
    pub fn refund(&self) -> u64 {
        self.refund
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_charge() {
        let mut meter = GasMeter::new(1000);
        assert_eq!(meter.gas_left(), 1000);
        meter.charge(100).unwrap();
        assert_eq!(meter.gas_left(), 900);
    }

    #[test]
    fn test_exact_exhaustion() {
        let mut meter = GasMeter::new(500);
        meter.charge(500).unwrap();
        assert_eq!(meter.gas_left(), 0);
    }

    #[test]
    fn test_overdraw_leaves_meter_unchanged() {
        let mut meter = GasMeter::new(100);
        meter.charge(60).unwrap();
        let err = meter.charge(41).unwrap_err();
        assert_eq!(err, EeiError::OutOfGas { needed: 41, left: 40 });
        assert_eq!(meter.gas_left(), 40);
    }

    #[test]
    fn test_signed_take_credits() {
        let mut meter = GasMeter::new(100);
        meter.take(80).unwrap();
        meter.take(-30).unwrap();
        assert_eq!(meter.gas_left(), 50);
    }

    #[test]
    fn test_value_transfer_netting() {
        // (9000 - 2300) + forwarded, then -forwarded: nets 6700 for any
        // forwarded amount the meter can momentarily cover.
        for forwarded in [0_i64, 1, 2300, 50_000] {
            let mut meter = GasMeter::new(100_000);
            meter.take(6_700 + forwarded).unwrap();
            meter.take(-forwarded).unwrap();
            assert_eq!(meter.gas_left(), 100_000 - 6_700);
        }
    }

    #[test]
    fn test_value_transfer_requires_forwarded_gas() {
        // The forwarded term cancels algebraically, but the debit still
        // fails if the forwarded gas is not momentarily available.
        let mut meter = GasMeter::new(7_000);
        let err = meter.take(6_700 + 10_000).unwrap_err();
        assert!(matches!(err, EeiError::OutOfGas { .. }));
        assert_eq!(meter.gas_left(), 7_000);
    }

    #[test]
    fn test_refund_accumulates() {
        let mut meter = GasMeter::new(100);
        meter.credit_refund(15_000);
        meter.credit_refund(24_000);
        assert_eq!(meter.refund(), 39_000);
        // Refunds never touch gas_left.
        assert_eq!(meter.gas_left(), 100);
    }

    #[test]
    fn test_credit_saturates() {
        let mut meter = GasMeter::new(u64::MAX - 1);
        meter.credit(10);
        assert_eq!(meter.gas_left(), u64::MAX);
    }

    #[test]
    fn test_zero_charge() {
        let mut meter = GasMeter::new(0);
        meter.charge(0).unwrap();
        assert_eq!(meter.gas_left(), 0);
    }
}
