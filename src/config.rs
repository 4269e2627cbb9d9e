//! Steam platform configuration
//!
//! Settings are loaded from a TOML file with environment-variable overrides,
//! mirroring how the rest of the game configures itself. The only required
//! value is the Steam app id of the game.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Public test app id ("Spacewar") used when no app id is configured in a
/// development build.
pub const DEV_APP_ID: u32 = 480;

/// File the Steam SDK reads to discover the app id when the process was not
/// launched through the Steam client.
pub const APP_ID_FILE_NAME: &str = "steam_appid.txt";

/// Settings for the Steam online platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamSettings {
    /// App id of the game.
    pub app_id: u32,
}

impl Default for SteamSettings {
    fn default() -> Self {
        Self { app_id: 0 }
    }
}

impl SteamSettings {
    /// Load settings from the configured path, then apply environment
    /// overrides. A missing file yields the defaults so a development build
    /// can run with nothing on disk.
    pub fn load() -> Result<Self> {
        let path = env::var("STEAMBRIDGE_CONFIG").unwrap_or_else(|_| "steam.toml".to_string());
        let mut settings = if Path::new(&path).exists() {
            Self::load_from_file(Path::new(&path))?
        } else {
            Self::default()
        };
        settings.override_from_env()?;
        Ok(settings)
    }

    /// Load settings from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read settings file: {}", e)))?;

        let settings: SteamSettings = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse settings: {}", e)))?;

        Ok(settings)
    }

    fn override_from_env(&mut self) -> Result<()> {
        if let Ok(app_id) = env::var("STEAM_APP_ID") {
            self.app_id = app_id
                .parse()
                .map_err(|_| Error::Config(format!("Invalid STEAM_APP_ID: {}", app_id)))?;
        }
        Ok(())
    }

    /// The app id handed to the SDK. Editor builds fall back to the public
    /// test app so the platform can be exercised before an id is assigned.
    pub fn effective_app_id(&self) -> u32 {
        #[cfg(feature = "editor")]
        if self.app_id == 0 {
            return DEV_APP_ID;
        }
        self.app_id
    }
}

/// Write the `steam_appid.txt` discovery file into `dir`.
///
/// The SDK expects it next to the running executable when the game is started
/// outside the Steam client, which is the normal case for editor runs.
pub fn write_app_id_file(dir: &Path, app_id: u32) -> Result<PathBuf> {
    let path = dir.join(APP_ID_FILE_NAME);
    fs::write(&path, app_id.to_string())
        .map_err(|e| Error::Config(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steam.toml");
        fs::write(&path, "app_id = 1337\n").unwrap();

        let settings = SteamSettings::load_from_file(&path).unwrap();
        assert_eq!(settings.app_id, 1337);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steam.toml");
        fs::write(&path, "").unwrap();

        let settings = SteamSettings::load_from_file(&path).unwrap();
        assert_eq!(settings.app_id, 0);
    }

    #[test]
    fn app_id_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_app_id_file(dir.path(), 480).unwrap();
        assert_eq!(path.file_name().unwrap(), APP_ID_FILE_NAME);
        assert_eq!(fs::read_to_string(path).unwrap(), "480");
    }
}
