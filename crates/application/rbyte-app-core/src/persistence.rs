use crate::domain::ClientSettings;
use crate::ports::SettingsRepo;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const QUALIFIER: &str = "com";
const ORG: &str = "rbyte";
const APP: &str = "client";

/// Settings stored as JSON under the platform config directory.
pub struct FilePersistence {
    dir_override: Option<PathBuf>,
}

impl Default for FilePersistence {
    fn default() -> Self {
        Self::new()
    }
}

impl FilePersistence {
    pub fn new() -> Self {
        Self { dir_override: None }
    }

    /// Keep everything under `dir` instead of the platform location.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir_override: Some(dir.into()),
        }
    }

    fn config_dir(&self) -> Result<PathBuf> {
        let config_dir = match &self.dir_override {
            Some(dir) => dir.clone(),
            None => ProjectDirs::from(QUALIFIER, ORG, APP)
                .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
                .config_dir()
                .to_path_buf(),
        };
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).with_context(|| {
                format!("Failed to create config dir {}", config_dir.display())
            })?;
        }
        Ok(config_dir)
    }

    pub fn settings_path(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("settings.json"))
    }

    pub fn load_settings(&self) -> Result<ClientSettings> {
        let path = self.settings_path()?;
        if !path.exists() {
            return Ok(ClientSettings::default());
        }
        let content = fs::read_to_string(&path).context("Failed to read settings")?;
        let settings: ClientSettings = serde_json::from_str(&content)
            .with_context(|| format!("Malformed settings file {}", path.display()))?;
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &ClientSettings) -> Result<()> {
        let path = self.settings_path()?;
        let json = serde_json::to_string_pretty(settings)?;
        atomic_write(&path, json.as_bytes()).context("Failed to write settings")?;
        Ok(())
    }
}

impl SettingsRepo for FilePersistence {
    fn load(&self) -> Result<ClientSettings> {
        self.load_settings()
    }

    fn save(&self, settings: &ClientSettings) -> Result<()> {
        self.save_settings(settings)
    }
}

fn atomic_write(path: &std::path::Path, contents: &[u8]) -> Result<()> {
    let tmp_path = {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    };

    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp file {}", tmp_path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write temp file {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {}", tmp_path.display()))?;
    drop(file);

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "Failed to rename temp file {} to {}",
            tmp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FilePersistence::in_dir(dir.path().join("nested"));
        assert_eq!(repo.load_settings().unwrap(), ClientSettings::default());
    }

    #[test]
    fn save_then_load_keeps_edits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FilePersistence::in_dir(dir.path());

        let mut settings = ClientSettings::default();
        settings.set("api_base_url", "http://127.0.0.1:9000/api").unwrap();
        repo.save(&settings).unwrap();

        assert_eq!(repo.load().unwrap().api_base_url, "http://127.0.0.1:9000/api");
        assert!(!dir.path().join("settings.json.tmp").exists());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "{not json").unwrap();
        let err = FilePersistence::in_dir(dir.path()).load_settings().unwrap_err();
        assert!(err.to_string().contains("Malformed settings file"));
    }
}
