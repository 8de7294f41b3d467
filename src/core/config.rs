use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{error, success, warning};
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(cfg: &Config) -> AppResult<()> {
        println!("📄 Current configuration:\n");
        println!("{}", serde_yaml::to_string(cfg)?);
        Ok(())
    }

    /// Open the config file in an editor, falling back to $EDITOR/$VISUAL
    /// and then to the platform default.
    pub fn edit(path: &Path, editor: &Option<String>) -> AppResult<()> {
        if !path.exists() {
            return Err(AppError::Config(format!(
                "{} does not exist, run `scentfleet init` first",
                path.display()
            )));
        }

        let default_editor = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            });

        let first = editor.clone().unwrap_or_else(|| default_editor.clone());

        if matches!(Command::new(&first).arg(path).status(), Ok(s) if s.success()) {
            success(format!("Configuration file edited using '{first}'"));
            return Ok(());
        }

        if first == default_editor {
            error(format!("Failed to edit configuration file using '{first}'"));
            return Err(AppError::Config(format!("editor '{first}' failed")));
        }

        warning(format!(
            "Editor '{first}' not available, falling back to '{default_editor}'"
        ));
        match Command::new(&default_editor).arg(path).status() {
            Ok(s) if s.success() => {
                success(format!(
                    "Configuration file edited using fallback '{default_editor}'"
                ));
                Ok(())
            }
            _ => Err(AppError::Config(format!("editor '{default_editor}' failed"))),
        }
    }
}
