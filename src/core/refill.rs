//! Refill validation and submission.

use crate::core::snapshot::{FleetSnapshot, FleetSource};
use crate::errors::{AppError, AppResult};
use crate::models::{Dispenser, RefillLog, RefillPayload};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Which step of the fallback chain produced the "level before refill".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOrigin {
    Captured,
    Recomputed,
    Stored,
    Unknown,
}

/// Pick the level before refill: captured estimate, fresh estimate,
/// stored level, then 0.
pub fn resolve_level_before(
    captured: Option<f64>,
    recomputed: Option<f64>,
    stored: Option<f64>,
    capacity: f64,
) -> (f64, LevelOrigin) {
    if let Some(c) = captured {
        if c.is_finite() && c > 0.0 && c <= capacity {
            return (c, LevelOrigin::Captured);
        }
        let stale = AppError::StaleEstimate(c);
        debug!(error = %stale, "captured level rejected, recomputing");
    }

    // a recomputed 0 is an empty tank, not a missing value
    if let Some(r) = recomputed.filter(|r| r.is_finite()) {
        return (r, LevelOrigin::Recomputed);
    }

    if let Some(s) = stored.filter(|s| s.is_finite()) {
        return (s.clamp(0.0, capacity), LevelOrigin::Stored);
    }

    (0.0, LevelOrigin::Unknown)
}

/// Check a refill against the current level and return the resulting level.
pub fn validate_refill(current_level: f64, capacity: f64, amount: f64) -> AppResult<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::InvalidInput(format!(
            "refill amount must be a positive number of ml (got {amount})"
        )));
    }

    let max_addable = (capacity - current_level).max(0.0);
    if current_level >= capacity || amount > max_addable {
        return Err(AppError::CapacityExceeded {
            requested: amount,
            max_addable,
        });
    }

    Ok((current_level + amount).min(capacity))
}

#[derive(Debug, Clone)]
pub struct RefillRequest {
    pub dispenser_id: i64,
    pub amount_ml: f64,
    pub timestamp: DateTime<Utc>,
    /// Level shown to the technician when the refill form was opened.
    pub captured_level_ml: Option<f64>,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct RefillOutcome {
    pub log: RefillLog,
    pub level_origin: LevelOrigin,
}

pub struct RefillLogic;

impl RefillLogic {
    /// Build the payload without touching the source.
    pub fn prepare(
        snapshot: &FleetSnapshot,
        dispenser: &Dispenser,
        req: &RefillRequest,
    ) -> AppResult<(RefillPayload, LevelOrigin)> {
        let capacity = dispenser.capacity();
        let recomputed = snapshot.estimate(dispenser, req.timestamp).level_ml;

        let (before, origin) = resolve_level_before(
            req.captured_level_ml,
            Some(recomputed),
            dispenser.current_level_ml,
            capacity,
        );

        let after = validate_refill(before, capacity, req.amount_ml)?;

        Ok((
            RefillPayload {
                level_before_refill_ml: before,
                refill_amount_ml: req.amount_ml,
                current_ml_refill: after,
                timestamp: req.timestamp,
                notes: req.notes.clone(),
            },
            origin,
        ))
    }

    /// Validate and submit. The snapshot is left untouched; reload it
    /// before computing any level again.
    pub fn apply<S: FleetSource + ?Sized>(
        source: &mut S,
        snapshot: &FleetSnapshot,
        req: &RefillRequest,
    ) -> AppResult<RefillOutcome> {
        let dispenser = snapshot
            .dispenser(req.dispenser_id)
            .ok_or(AppError::DispenserNotFound(req.dispenser_id))?;

        let (payload, level_origin) = Self::prepare(snapshot, dispenser, req)?;
        let log = source.log_refill(req.dispenser_id, &payload)?;

        info!(
            dispenser = req.dispenser_id,
            before = payload.level_before_refill_ml,
            added = payload.refill_amount_ml,
            after = payload.current_ml_refill,
            "refill logged"
        );

        Ok(RefillOutcome { log, level_origin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflowing_refill_is_rejected() {
        match validate_refill(480.0, 500.0, 30.0) {
            Err(AppError::CapacityExceeded {
                requested,
                max_addable,
            }) => {
                assert_eq!(requested, 30.0);
                assert_eq!(max_addable, 20.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn fitting_refill_is_accepted() {
        assert_eq!(validate_refill(480.0, 500.0, 15.0).unwrap(), 495.0);
        assert_eq!(validate_refill(480.0, 500.0, 20.0).unwrap(), 500.0);
    }

    #[test]
    fn full_tank_rejects_everything() {
        assert!(matches!(
            validate_refill(500.0, 500.0, 0.5),
            Err(AppError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn bad_amounts_are_invalid_input() {
        for amount in [0.0, -3.0, f64::NAN] {
            assert!(matches!(
                validate_refill(100.0, 500.0, amount),
                Err(AppError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn fallback_chain_order() {
        assert_eq!(
            resolve_level_before(Some(120.0), Some(100.0), Some(400.0), 500.0),
            (120.0, LevelOrigin::Captured)
        );
        assert_eq!(
            resolve_level_before(Some(0.0), Some(100.0), Some(400.0), 500.0),
            (100.0, LevelOrigin::Recomputed)
        );
        assert_eq!(
            resolve_level_before(Some(0.0), Some(0.0), Some(400.0), 500.0),
            (0.0, LevelOrigin::Recomputed)
        );
        assert_eq!(
            resolve_level_before(Some(f64::NAN), None, Some(400.0), 500.0),
            (400.0, LevelOrigin::Stored)
        );
        assert_eq!(
            resolve_level_before(None, Some(f64::NAN), None, 500.0),
            (0.0, LevelOrigin::Unknown)
        );
    }

    #[test]
    fn captured_level_above_capacity_is_stale() {
        assert_eq!(
            resolve_level_before(Some(650.0), Some(90.0), None, 500.0),
            (90.0, LevelOrigin::Recomputed)
        );
    }
}
