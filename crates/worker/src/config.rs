use std::path::PathBuf;

use anyhow::{bail, Context};

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// PostgreSQL URL. Without one, ratings are only kept in memory.
    pub database_url: Option<String>,
    /// JSON input document describing the exposure to assess.
    pub input_path: PathBuf,
    /// Policy file for the ISR SDQA stage (defaults when unset).
    pub isr_policy: Option<PathBuf>,
    /// Policy file for the WCS failure-check stage (defaults when unset).
    pub wcs_policy: Option<PathBuf>,
    /// Apply pending migrations before persisting (default: `true`).
    pub run_migrations: bool,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Default  |
    /// |-----------------------|----------|
    /// | `DATABASE_URL`        | unset    |
    /// | `SDQA_INPUT_PATH`     | required |
    /// | `SDQA_ISR_POLICY`     | unset    |
    /// | `SDQA_WCS_POLICY`     | unset    |
    /// | `SDQA_RUN_MIGRATIONS` | `true`   |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`WorkerConfig::from_env`], reading variables through
    /// `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let input_path = var("SDQA_INPUT_PATH")
            .map(PathBuf::from)
            .context("SDQA_INPUT_PATH must be set")?;

        let run_migrations = match var("SDQA_RUN_MIGRATIONS") {
            None => true,
            Some(v) => parse_bool(&v)
                .with_context(|| format!("SDQA_RUN_MIGRATIONS must be a boolean, got '{v}'"))?,
        };

        Ok(Self {
            database_url: var("DATABASE_URL"),
            input_path,
            isr_policy: var("SDQA_ISR_POLICY").map(PathBuf::from),
            wcs_policy: var("SDQA_WCS_POLICY").map(PathBuf::from),
            run_migrations,
        })
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("not a boolean"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<WorkerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WorkerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn minimal_configuration() {
        let config = load(&[("SDQA_INPUT_PATH", "/data/ccd_1234.json")]).unwrap();
        assert_eq!(config.input_path, PathBuf::from("/data/ccd_1234.json"));
        assert_eq!(config.database_url, None);
        assert_eq!(config.isr_policy, None);
        assert!(config.run_migrations);
    }

    #[test]
    fn full_configuration() {
        let config = load(&[
            ("SDQA_INPUT_PATH", "in.json"),
            ("DATABASE_URL", "postgres://sdqa@localhost/sdqa"),
            ("SDQA_ISR_POLICY", "isr.json"),
            ("SDQA_WCS_POLICY", "wcs.json"),
            ("SDQA_RUN_MIGRATIONS", "off"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://sdqa@localhost/sdqa"));
        assert_eq!(config.wcs_policy, Some(PathBuf::from("wcs.json")));
        assert!(!config.run_migrations);
    }

    #[test]
    fn input_path_is_required() {
        let err = load(&[("SDQA_INPUT_PATH", "  ")]).unwrap_err();
        assert!(err.to_string().contains("SDQA_INPUT_PATH"));
    }

    #[test]
    fn bad_boolean_rejected() {
        let err = load(&[("SDQA_INPUT_PATH", "in.json"), ("SDQA_RUN_MIGRATIONS", "maybe")])
            .unwrap_err();
        assert!(err.to_string().contains("SDQA_RUN_MIGRATIONS"));
    }
}
