use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::refill::{LevelOrigin, RefillLogic, RefillRequest};
use crate::core::snapshot::FleetSnapshot;
use crate::db::store::SqliteStore;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::colors::colorize_optional;
use crate::utils::date;
use crate::utils::formatting::ml;
use crate::utils::table::{Align, Table};

/// Handle `refill` and `refills`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Refill {
            id,
            amount,
            at,
            captured,
            notes,
        } => {
            let mut store = SqliteStore::open(&cfg.database)?;
            let now = date::parse_at(at.as_ref())?;
            let mut snapshot = FleetSnapshot::load(&store, now)?;

            let req = RefillRequest {
                dispenser_id: *id,
                amount_ml: *amount,
                timestamp: now,
                captured_level_ml: *captured,
                notes: notes.clone(),
            };

            let outcome = RefillLogic::apply(&mut store, &snapshot, &req)?;
            if captured.is_some() && outcome.level_origin != LevelOrigin::Captured {
                info("Captured level was not usable, the level was recomputed.");
            }

            success(format!(
                "Refill #{} logged for dispenser #{}: {} + {} = {}",
                outcome.log.id,
                id,
                ml(outcome.log.level_before_refill_ml),
                ml(outcome.log.refill_amount_ml),
                ml(outcome.log.current_ml_refill)
            ));

            // the store is authoritative: reload before showing the new level
            snapshot.reload(&store, now)?;
            if let Some(level) = snapshot.current_level(*id, now) {
                println!("Current level: {}", ml(level));
            }
        }

        Commands::Refills { id } => {
            let store = SqliteStore::open(&cfg.database)?;
            let logs = store.refill_logs_for(*id)?;

            if logs.is_empty() {
                info("No refills recorded.");
                return Ok(());
            }

            let mut table = Table::new(&[
                ("ID", Align::Right),
                ("Dispenser", Align::Right),
                ("When", Align::Left),
                ("Before", Align::Right),
                ("Added", Align::Right),
                ("After", Align::Right),
                ("Notes", Align::Left),
            ]);
            for l in &logs {
                table.add_row(vec![
                    l.id.to_string(),
                    format!("#{}", l.dispenser_id),
                    date::display(&l.timestamp),
                    ml(l.level_before_refill_ml),
                    ml(l.refill_amount_ml),
                    ml(l.current_ml_refill),
                    colorize_optional(&l.notes),
                ]);
            }
            print!("{}", table.render());
        }

        _ => {}
    }

    Ok(())
}
