use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::schedule::paging::DEFAULT_SNAP_DELAY;
use crate::timer::DEFAULT_MINUTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClockFormat {
    #[default]
    Hour24,      // "14:30"
    Hour12,      // "2:30pm"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Tab {
    #[default]
    Timer,
    Schedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
    #[serde(default)]
    pub clock_format: ClockFormat,
    #[serde(default)]
    pub tab: Tab,
    #[serde(default = "default_timer_minutes")]
    pub timer_minutes: u32,
    #[serde(default = "default_snap_delay_ms")]
    pub snap_delay_ms: u64,
    /// Overrides where the schedule is stored
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_font_scale() -> f32 {
    1.0
}

fn default_timer_minutes() -> u32 {
    DEFAULT_MINUTES
}

fn default_snap_delay_ms() -> u64 {
    DEFAULT_SNAP_DELAY.as_millis() as u64
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_scale: default_font_scale(),
            clock_format: ClockFormat::Hour24,
            tab: Tab::Timer,
            timer_minutes: default_timer_minutes(),
            snap_delay_ms: default_snap_delay_ms(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            serde_json::from_str(&contents)
                .context("Failed to parse config file")
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    pub fn snap_delay(&self) -> Duration {
        Duration::from_millis(self.snap_delay_ms)
    }

    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "shuukan", "shuukan")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }
}
