use anyhow::{Context, Result};
use coach_core::SolverConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{coach_home, ensure_coach_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub solver: SolverConfig,
    pub output: OutputSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Attach the explainability report to every run.
    pub explain: bool,
    /// Print JSON instead of the human report.
    pub json: bool,
    /// How many selected actions the plan lists before "and N more".
    pub plan_max_actions: usize,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            explain: true,
            json: false,
            plan_max_actions: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `tracing_subscriber::EnvFilter` directive; `COACH_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(coach_home()?.join("config.toml"))
}

/// Load from `path`, or `~/.coach/config.toml` when None. A missing file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s).context("parse config.toml")?;
    cfg.solver.validate().context("invalid [solver] section")?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_coach_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let written = save_config(&Config::default())?;
    println!("Wrote {}", written.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg = parse_config(
            r#"
[solver]
seed = 99
anneal_iterations = 2000

[output]
json = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.solver.seed, 99);
        assert_eq!(cfg.solver.anneal_iterations, 2000);
        assert_eq!(cfg.solver.exact_max_actions, 20);
        assert!(cfg.output.json);
        assert!(cfg.output.explain);
        assert_eq!(cfg.logging.filter, "warn");
    }

    #[test]
    fn test_invalid_solver_section_is_rejected() {
        let err = parse_config("[solver]\ncooling_rate = 2.0\n").unwrap_err();
        assert!(format!("{err:#}").contains("cooling_rate"));
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back = parse_config(&s).unwrap();
        assert_eq!(back.solver, SolverConfig::default());
    }
}
