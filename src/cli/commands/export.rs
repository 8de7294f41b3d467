use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::export::{ExportLogic, to_export_rows};
use crate::core::snapshot::FleetSource;
use crate::db::store::SqliteStore;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        force,
    } = cmd
    {
        let store = SqliteStore::open(&cfg.database)?;
        let rows = to_export_rows(&store.refill_logs()?, &store.dispensers()?);
        ExportLogic::export(&rows, *format, file, *force)?;
    }
    Ok(())
}
