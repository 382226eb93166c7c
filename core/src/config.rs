use std::path::Path;

use log::{info, warn};

use crate::analyze_session::parse_cfg;
use crate::error::AnalysisError;
use crate::types::Cfg;

/// Reads an analysis config from disk (JSON).
/// A missing file yields the default config.
pub fn load_cfg(path: impl AsRef<Path>) -> Result<Cfg, AnalysisError> {
    let path = path.as_ref();
    if !path.exists() {
        warn!(
            "config {} not found, using defaults (zones={})",
            path.display(),
            Cfg::default().zone_table.name
        );
        return Ok(Cfg::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AnalysisError::Input(format!("{}: {e}", path.display())))?;
    let cfg = parse_cfg(&contents)?;
    cfg.validate()?;
    info!("config loaded from {} (zones={})", path.display(), cfg.zone_table.name);
    Ok(cfg)
}

/// Writes a config as pretty JSON.
pub fn save_cfg(cfg: &Cfg, path: impl AsRef<Path>) -> Result<(), AnalysisError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(cfg)
        .map_err(|e| AnalysisError::Input(format!("serialize config: {e}")))?;
    std::fs::write(path, json)
        .map_err(|e| AnalysisError::Input(format!("{}: {e}", path.display())))?;
    info!("config saved to {} (zones={})", path.display(), cfg.zone_table.name);
    Ok(())
}
