//src/config.rs
use comfy_table::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";
pub(crate) const APP_DIR: &str = "workout-summary";
const CONFIG_ENV_VAR: &str = "WORKOUT_SUMMARY_CONFIG_DIR";
pub const DEFAULT_RANGE_DAYS: u32 = 30;
/// Longest default window accepted from the command line (about a century).
pub const MAX_RANGE_DAYS: u32 = 36_500;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid color name: {0}")]
    InvalidColor(String),
    #[error("Default date range must be at least one day (got {0}).")]
    InvalidRangeDays(u32),
    #[error("Default date range cannot exceed {} days (got {0}).", MAX_RANGE_DAYS)]
    RangeDaysTooLong(u32),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric, // kg
    Imperial, // lbs
}

impl Units {
    #[must_use]
    pub const fn weight_label(self) -> &'static str {
        match self {
            Self::Metric => "kg",
            Self::Imperial => "lbs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StandardColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGrey,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
    Grey,
}

impl From<StandardColor> for Color {
    fn from(value: StandardColor) -> Self {
        match value {
            StandardColor::Black => Self::Black,
            StandardColor::Red => Self::Red,
            StandardColor::Green => Self::Green,
            StandardColor::Yellow => Self::Yellow,
            StandardColor::Blue => Self::Blue,
            StandardColor::Magenta => Self::Magenta,
            StandardColor::Cyan => Self::Cyan,
            StandardColor::White => Self::White,
            StandardColor::DarkGrey => Self::DarkGrey,
            StandardColor::DarkRed => Self::DarkRed,
            StandardColor::DarkGreen => Self::DarkGreen,
            StandardColor::DarkYellow => Self::DarkYellow,
            StandardColor::DarkBlue => Self::DarkBlue,
            StandardColor::DarkMagenta => Self::DarkMagenta,
            StandardColor::DarkCyan => Self::DarkCyan,
            StandardColor::Grey => Self::Grey,
        }
    }
}

/// Case-insensitive lookup of a colour name such as `"darkcyan"`.
/// # Errors
/// Returns `Error::InvalidColor` for unknown names.
pub fn parse_color(color_str: &str) -> Result<StandardColor, Error> {
    StandardColor::iter()
        .find(|c| format!("{c:?}").eq_ignore_ascii_case(color_str.trim()))
        .ok_or_else(|| Error::InvalidColor(color_str.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Theme {
    pub header_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header_color: "Green".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Length of the default date window, ending today.
    pub default_range_days: u32,
    pub units: Units,
    /// JSON file with `{ "exercises": [...] }` for the catalog browser.
    pub catalog_path: Option<PathBuf>,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_range_days: DEFAULT_RANGE_DAYS,
            units: Units::default(),
            catalog_path: None,
            theme: Theme::default(),
        }
    }
}

impl Config {
    /// Header colour from the theme, falling back to green on a bad name.
    #[must_use]
    pub fn header_color(&self) -> Color {
        parse_color(&self.theme.header_color).map_or(Color::Green, Color::from)
    }
}

/// Determines the path to the configuration file, creating its directory.
/// `WORKOUT_SUMMARY_CONFIG_DIR` overrides the platform config directory.
/// # Errors
/// Returns `Error` if no directory can be determined or created.
pub fn get_config_path() -> Result<PathBuf, Error> {
    let config_dir_path = match std::env::var(CONFIG_ENV_VAR).ok() {
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if !path.is_dir() {
                tracing::warn!(
                    "{CONFIG_ENV_VAR} points to '{}', which is not a directory. Trying to create it.",
                    path.display()
                );
            }
            path
        }
        None => dirs::config_dir()
            .ok_or(Error::CannotDetermineConfigDir)?
            .join(APP_DIR),
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }

    Ok(config_dir_path.join(CONFIG_FILE_NAME))
}

/// Loads the configuration, writing a default file if none exists yet.
/// # Errors
/// Returns `Error` on I/O or TOML failures.
pub fn load(config_path: &Path) -> Result<Config, Error> {
    if config_path.exists() {
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    } else {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        Ok(default_config)
    }
}

/// Saves the configuration to the TOML file.
/// # Errors
/// Returns `Error` on I/O or TOML failures.
pub fn save(config_path: &Path, config: &Config) -> Result<(), Error> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config)?;
    fs::write(config_path, config_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_ignores_case() {
        assert_eq!(parse_color("darkcyan").unwrap(), StandardColor::DarkCyan);
        assert_eq!(parse_color(" Red ").unwrap(), StandardColor::Red);
        assert!(matches!(parse_color("chartreuse"), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = toml::from_str("units = \"imperial\"").unwrap();
        assert_eq!(config.units, Units::Imperial);
        assert_eq!(config.default_range_days, DEFAULT_RANGE_DAYS);
        assert_eq!(config.theme.header_color, "Green");
    }

    #[test]
    fn load_creates_default_file_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, Config::default());

        let changed = Config {
            default_range_days: 7,
            catalog_path: Some(PathBuf::from("/tmp/catalog.json")),
            ..Config::default()
        };
        save(&path, &changed).unwrap();
        assert_eq!(load(&path).unwrap(), changed);
    }

    #[test]
    fn bad_header_color_falls_back_to_green() {
        let config = Config {
            theme: Theme {
                header_color: "nope".into(),
            },
            ..Config::default()
        };
        assert_eq!(config.header_color(), Color::Green);
    }
}
