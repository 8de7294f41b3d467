//! SQLite-backed fleet store. Also acts as the usage service.

use crate::core::level::days_elapsed;
use crate::core::snapshot::FleetSource;
use crate::core::usage;
use crate::db::log::ttlog;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::{Dispenser, RefillLog, RefillPayload, Schedule, UsageInfo};
use chrono::{DateTime, Utc};

pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &str) -> AppResult<Self> {
        Self::from_pool(DbPool::new(path)?)
    }

    pub fn in_memory() -> AppResult<Self> {
        Self::from_pool(DbPool::in_memory()?)
    }

    fn from_pool(pool: DbPool) -> AppResult<Self> {
        run_pending_migrations(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn schedule(&self, id: i64) -> AppResult<Schedule> {
        queries::load_schedule(&self.pool.conn, id)?.ok_or(AppError::MissingSchedule(id))
    }

    pub fn dispenser(&self, id: i64) -> AppResult<Dispenser> {
        queries::load_dispenser(&self.pool.conn, id)?.ok_or(AppError::DispenserNotFound(id))
    }

    pub fn add_schedule(&mut self, schedule: &Schedule) -> AppResult<i64> {
        let id = queries::insert_schedule(&self.pool.conn, schedule)?;
        ttlog(
            &self.pool.conn,
            "schedule_add",
            &format!("#{id}"),
            &format!("Added {} schedule '{}'", schedule.kind.label(), schedule.name),
        )?;
        Ok(id)
    }

    pub fn delete_schedule(&mut self, id: i64) -> AppResult<()> {
        if !queries::delete_schedule(&self.pool.conn, id)? {
            return Err(AppError::MissingSchedule(id));
        }
        ttlog(&self.pool.conn, "schedule_del", &format!("#{id}"), "Schedule deleted")?;
        Ok(())
    }

    pub fn add_dispenser(&mut self, dispenser: &Dispenser) -> AppResult<i64> {
        if let Some(sid) = dispenser.current_schedule_id {
            self.schedule(sid)?;
        }
        let id = queries::insert_dispenser(&self.pool.conn, dispenser)?;
        ttlog(
            &self.pool.conn,
            "dispenser_add",
            &format!("#{id}"),
            &format!(
                "Added dispenser '{}' ({} ml)",
                dispenser.name, dispenser.refill_capacity_ml
            ),
        )?;
        Ok(id)
    }

    /// Point a dispenser at a schedule (or at none).
    pub fn assign_schedule(&mut self, dispenser_id: i64, schedule_id: Option<i64>) -> AppResult<()> {
        if let Some(sid) = schedule_id {
            self.schedule(sid)?;
        }
        if !queries::update_dispenser_schedule(&self.pool.conn, dispenser_id, schedule_id)? {
            return Err(AppError::DispenserNotFound(dispenser_id));
        }
        let msg = match schedule_id {
            Some(sid) => format!("Assigned schedule #{sid}"),
            None => "Schedule removed".to_string(),
        };
        ttlog(&self.pool.conn, "dispenser_assign", &format!("#{dispenser_id}"), &msg)?;
        Ok(())
    }

    pub fn set_dispenser_rate(&mut self, dispenser_id: i64, ml_per_hour: Option<f64>) -> AppResult<()> {
        if !queries::update_dispenser_rate(&self.pool.conn, dispenser_id, ml_per_hour)? {
            return Err(AppError::DispenserNotFound(dispenser_id));
        }
        ttlog(
            &self.pool.conn,
            "dispenser_rate",
            &format!("#{dispenser_id}"),
            &format!("ml/hour override set to {ml_per_hour:?}"),
        )?;
        Ok(())
    }

    pub fn delete_dispenser(&mut self, id: i64) -> AppResult<()> {
        if !queries::delete_dispenser(&self.pool.conn, id)? {
            return Err(AppError::DispenserNotFound(id));
        }
        ttlog(&self.pool.conn, "dispenser_del", &format!("#{id}"), "Dispenser deleted")?;
        Ok(())
    }

    pub fn refill_logs_for(&self, dispenser_id: Option<i64>) -> AppResult<Vec<RefillLog>> {
        queries::load_refill_logs(&self.pool.conn, dispenser_id)
    }
}

impl FleetSource for SqliteStore {
    fn schedules(&self) -> AppResult<Vec<Schedule>> {
        queries::load_schedules(&self.pool.conn)
    }

    fn dispensers(&self) -> AppResult<Vec<Dispenser>> {
        queries::load_dispensers(&self.pool.conn)
    }

    /// Server-side usage figure. It runs the same formula as the local
    /// estimate; a dispenser without a refill date or schedule reports no
    /// usage since refill.
    fn calculate_usage(&self, dispenser_id: i64, now: DateTime<Utc>) -> AppResult<UsageInfo> {
        let d = self.dispenser(dispenser_id)?;

        let Some(schedule_id) = d.current_schedule_id else {
            return Ok(UsageInfo::default());
        };
        let Some(schedule) = queries::load_schedule(&self.pool.conn, schedule_id)? else {
            return Ok(UsageInfo::default());
        };

        let daily = usage::daily_usage(&schedule, d.ml_per_hour);
        let since_refill = d
            .last_refill_date
            .map(|at| days_elapsed(at, now) * daily);

        Ok(UsageInfo {
            usage_since_refill_ml: since_refill,
            daily_usage_ml: Some(daily),
        })
    }

    fn refill_logs(&self) -> AppResult<Vec<RefillLog>> {
        queries::load_refill_logs(&self.pool.conn, None)
    }

    /// Append the log row and move the baseline in one transaction.
    fn log_refill(&mut self, dispenser_id: i64, payload: &RefillPayload) -> AppResult<RefillLog> {
        self.pool.with_tx(|tx| {
            let log = queries::insert_refill_log(tx, dispenser_id, payload)?;
            if !queries::update_dispenser_baseline(
                tx,
                dispenser_id,
                payload.current_ml_refill,
                &payload.timestamp,
            )? {
                return Err(AppError::DispenserNotFound(dispenser_id));
            }
            ttlog(
                tx,
                "refill",
                &format!("#{dispenser_id}"),
                &format!(
                    "{:.1} ml + {:.1} ml = {:.1} ml",
                    payload.level_before_refill_ml,
                    payload.refill_amount_ml,
                    payload.current_ml_refill
                ),
            )?;
            Ok(log)
        })
    }
}
