use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::errors::FormError;

const HOME_ENV: &str = "INTAKE_FORMS_HOME";
const DEFAULT_DIR_NAME: &str = ".intake_forms";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// User-tunable settings for the intake forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    pub default_phone_region: String,
    pub date_format: String,
    pub schedule_date_format: String,
    /// Grace period before leaving the registration form after success.
    pub registration_redirect_delay_ms: u64,
    pub brand: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            default_phone_region: "KE".into(),
            date_format: "%d/%m/%Y".into(),
            schedule_date_format: "%d/%m/%Y - %I:%M %p".into(),
            registration_redirect_delay_ms: 500,
            brand: "Rosehealth".into(),
        }
    }
}

impl IntakeConfig {
    pub fn registration_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.registration_redirect_delay_ms)
    }
}

/// Returns the application home, honouring `INTAKE_FORMS_HOME`.
pub fn app_home() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Loads and saves [`IntakeConfig`] as JSON inside the application home.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, FormError> {
        Self::with_base_dir(app_home())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, FormError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    /// Reads the stored configuration, or the defaults when none was saved.
    pub fn load(&self) -> Result<IntakeConfig, FormError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let config = serde_json::from_str(&data)?;
            tracing::debug!(path = %self.path.display(), "configuration loaded");
            Ok(config)
        } else {
            Ok(IntakeConfig::default())
        }
    }

    pub fn save(&self, config: &IntakeConfig) -> Result<(), FormError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), FormError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
        assert_eq!(manager.load().expect("load"), IntakeConfig::default());
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
        let config = IntakeConfig {
            default_phone_region: "UG".into(),
            registration_redirect_delay_ms: 0,
            ..IntakeConfig::default()
        };
        manager.save(&config).expect("save");
        assert_eq!(manager.load().expect("load"), config);
        assert!(!tmp_path(manager.path()).exists());
    }

    #[test]
    fn partial_file_fills_missing_keys() {
        let dir = tempfile::tempdir().expect("temp dir");
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
        fs::write(manager.path(), r#"{ "brand": "Clinic" }"#).expect("write");
        let config = manager.load().expect("load");
        assert_eq!(config.brand, "Clinic");
        assert_eq!(config.default_phone_region, "KE");
        assert_eq!(config.registration_redirect_delay(), Duration::from_millis(500));
    }
}
