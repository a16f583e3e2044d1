use std::path::{Path, PathBuf};

use serde::Deserialize;

use midicontrols_types::{ButtonMode, DEFAULT_RANGE, FADER_RANGE};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Frontend module the widget models are registered under.
pub const DEFAULT_MODULE_NAME: &str = "@jupyter-widgets/midicontrols";
pub const DEFAULT_MODULE_VERSION: &str = "0.1.0";

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    widgets: WidgetsConfig,
    #[serde(default)]
    xtouch: XTouchConfig,
}

#[derive(Deserialize, Default)]
struct WidgetsConfig {
    module_name: Option<String>,
    module_version: Option<String>,
}

#[derive(Deserialize, Default)]
struct XTouchConfig {
    button_mode: Option<String>,
    rotary_min: Option<i64>,
    rotary_max: Option<i64>,
    fader_min: Option<i64>,
    fader_max: Option<i64>,
}

pub struct Config {
    widgets: WidgetsConfig,
    xtouch: XTouchConfig,
}

impl Config {
    /// Embedded defaults, overridden by the user's config file if present.
    pub fn load() -> Self {
        match user_config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::embedded(),
        }
    }

    /// Embedded defaults, overridden by the file at `path` if it exists.
    /// An unreadable or malformed file is logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Self::embedded();
        if !path.exists() {
            return config;
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                Ok(user) => config.merge(user),
                Err(e) => {
                    log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                }
            },
            Err(e) => {
                log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
            }
        }
        config
    }

    /// Embedded defaults overridden by `contents`.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let user: ConfigFile = toml::from_str(contents)?;
        let mut config = Self::embedded();
        config.merge(user);
        Ok(config)
    }

    fn embedded() -> Self {
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        Config { widgets: base.widgets, xtouch: base.xtouch }
    }

    fn merge(&mut self, user: ConfigFile) {
        merge_widgets(&mut self.widgets, user.widgets);
        merge_xtouch(&mut self.xtouch, user.xtouch);
    }

    pub fn module_name(&self) -> &str {
        self.widgets.module_name.as_deref().unwrap_or(DEFAULT_MODULE_NAME)
    }

    pub fn module_version(&self) -> &str {
        self.widgets.module_version.as_deref().unwrap_or(DEFAULT_MODULE_VERSION)
    }

    /// Mode for the main button grid. Unknown names fall back to toggle.
    pub fn button_mode(&self) -> ButtonMode {
        match self.xtouch.button_mode.as_deref() {
            None => ButtonMode::Toggle,
            Some(name) => name.parse().unwrap_or_else(|e| {
                log::warn!(target: "config", "button_mode: {}", e);
                ButtonMode::Toggle
            }),
        }
    }

    /// Encoder window as `(min, max)`.
    pub fn rotary_range(&self) -> (i64, i64) {
        checked_range(
            "rotary",
            self.xtouch.rotary_min.unwrap_or(DEFAULT_RANGE.min),
            self.xtouch.rotary_max.unwrap_or(DEFAULT_RANGE.max),
            (DEFAULT_RANGE.min, DEFAULT_RANGE.max),
        )
    }

    /// Fader window as `(min, max)`.
    pub fn fader_range(&self) -> (i64, i64) {
        checked_range(
            "fader",
            self.xtouch.fader_min.unwrap_or(FADER_RANGE.min),
            self.xtouch.fader_max.unwrap_or(FADER_RANGE.max),
            (FADER_RANGE.min, FADER_RANGE.max),
        )
    }
}

fn checked_range(name: &str, min: i64, max: i64, fallback: (i64, i64)) -> (i64, i64) {
    if min > max {
        log::warn!(target: "config", "{} range {}..{} is inverted, using defaults", name, min, max);
        return fallback;
    }
    (min, max)
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("midicontrols").join("config.toml"))
}

fn merge_widgets(base: &mut WidgetsConfig, user: WidgetsConfig) {
    if user.module_name.is_some() {
        base.module_name = user.module_name;
    }
    if user.module_version.is_some() {
        base.module_version = user.module_version;
    }
}

fn merge_xtouch(base: &mut XTouchConfig, user: XTouchConfig) {
    if user.button_mode.is_some() {
        base.button_mode = user.button_mode;
    }
    if user.rotary_min.is_some() {
        base.rotary_min = user.rotary_min;
    }
    if user.rotary_max.is_some() {
        base.rotary_max = user.rotary_max;
    }
    if user.fader_min.is_some() {
        base.fader_min = user.fader_min;
    }
    if user.fader_max.is_some() {
        base.fader_max = user.fader_max;
    }
}
