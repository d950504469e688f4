//! Layered configuration for a presale deployment.
//!
//! Layers (highest precedence last):
//!   1) Built-in defaults (reference deployment numbers)
//!   2) Config file (explicit path or auto-discovered)
//!   3) Environment variables (optionally via .env)

use std::path::{Path, PathBuf};

use config as cfg;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::PresaleError;
use crate::params::SaleParams;

/// Environment prefix: `PRESALE__SALE__RATE=950000` maps to `sale.rate`.
pub const ENV_PREFIX: &str = "PRESALE";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sale: SaleParams,
    pub telemetry: Telemetry,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    /// RUST_LOG-like directive, e.g. "info,fixed_presale=debug".
    pub log_filter: String,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self { log_filter: "info,fixed_presale=info".into() }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(#[from] cfg::ConfigError),
    #[error("path not found `{0}`")]
    PathNotFound(String),
    #[error(transparent)]
    Invalid(#[from] PresaleError),
}

/// Load configuration: defaults -> file(s) -> environment, then validate the sale parameters.
pub fn load(explicit_file: Option<&Path>) -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let d = Config::default();
    let mut builder = cfg::Config::builder()
        .set_default("sale.rate", d.sale.rate.to_string())?
        .set_default("sale.opening_time", d.sale.opening_time.to_string())?
        .set_default("sale.closing_time", d.sale.closing_time.to_string())?
        .set_default("sale.per_address_max", d.sale.per_address_max.to_string())?
        .set_default("sale.hard_cap", d.sale.hard_cap.to_string())?
        .set_default("telemetry.log_filter", d.telemetry.log_filter)?;

    for path in discover_config_files(explicit_file)? {
        debug!(path = %path.display(), "config file");
        builder = builder.add_source(cfg::File::from(path));
    }

    // Values stay strings so that amounts above 64 bits are not coerced to floats.
    builder = builder.add_source(cfg::Environment::with_prefix(ENV_PREFIX).separator("__"));

    let cfg: Config = builder.build()?.try_deserialize()?;
    cfg.sale.validate()?;
    Ok(cfg)
}

/// Explicit path if given; otherwise the platform config dir and the working
/// directory are searched for `presale.{toml,yaml,yml,json}`.
fn discover_config_files(explicit: Option<&Path>) -> Result<Vec<PathBuf>, ConfigError> {
    if let Some(p) = explicit {
        if !p.exists() {
            return Err(ConfigError::PathNotFound(p.display().to_string()));
        }
        return Ok(vec![p.to_path_buf()]);
    }

    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(pd) = ProjectDirs::from("io", "FixedPresale", "fixed-presale") {
        dirs.push(pd.config_dir().to_path_buf());
    }
    dirs.push(PathBuf::from("."));

    Ok(dirs
        .iter()
        .flat_map(|d| ["toml", "yaml", "yml", "json"].map(|ext| d.join(format!("presale.{ext}"))))
        .filter(|c| c.exists())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_explicit_file_is_reported() {
        let err = load(Some(Path::new("/definitely/not/here/presale.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::PathNotFound(_)));
    }

    #[test]
    fn defaults_need_receiver_and_custody() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(f, "[telemetry]\nlog_filter = \"debug\"").unwrap();
        let err = load(Some(f.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(PresaleError::InvalidParams(_))));
    }
}
