use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "PathsConfig::default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "PathsConfig::default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default = "PathsConfig::default_fig_dir")]
    pub fig_dir: PathBuf,
}

impl PathsConfig {
    fn default_raw_dir() -> PathBuf {
        PathBuf::from("data/paper_runs/raw")
    }
    fn default_out_dir() -> PathBuf {
        PathBuf::from("data/paper_runs")
    }
    fn default_fig_dir() -> PathBuf {
        PathBuf::from("figures")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: Self::default_raw_dir(),
            out_dir: Self::default_out_dir(),
            fig_dir: Self::default_fig_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Raw files are `<scenario_key><file_suffix>`.
    #[serde(default = "InputConfig::default_file_suffix")]
    pub file_suffix: String,
    /// BehaviorSpace writes six records of run metadata before the header.
    #[serde(default = "InputConfig::default_preamble_lines")]
    pub preamble_lines: usize,
    /// Calendar year of step 0.
    #[serde(default = "InputConfig::default_epoch_year")]
    pub epoch_year: i64,
}

impl InputConfig {
    fn default_file_suffix() -> String {
        "_30y.csv".to_string()
    }
    fn default_preamble_lines() -> usize {
        6
    }
    fn default_epoch_year() -> i64 {
        2026
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            file_suffix: Self::default_file_suffix(),
            preamble_lines: Self::default_preamble_lines(),
            epoch_year: Self::default_epoch_year(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPointsConfig {
    /// The final observed year is always appended.
    #[serde(default = "KeyPointsConfig::default_milestone_years")]
    pub milestone_years: Vec<i64>,
}

impl KeyPointsConfig {
    fn default_milestone_years() -> Vec<i64> {
        vec![2026, 2035, 2050]
    }
}

impl Default for KeyPointsConfig {
    fn default() -> Self {
        Self {
            milestone_years: Self::default_milestone_years(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiguresConfig {
    #[serde(default = "FiguresConfig::default_enabled")]
    pub enabled: bool,
}

impl FiguresConfig {
    fn default_enabled() -> bool {
        true
    }
}

impl Default for FiguresConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub key_points: KeyPointsConfig,
    #[serde(default)]
    pub figures: FiguresConfig,
}

impl ReportConfig {
    /// Reads `path` if present. A missing, unreadable or unparsable file
    /// yields the defaults; nothing is written here.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    warn!("Failed to parse config {}: {err}. Using defaults.", path.display());
                }
            },
            Err(err) => {
                warn!("Failed to read config {}: {err}. Using defaults.", path.display());
            }
        }
        Self::default()
    }

    /// Writes a commented-out defaults template to `path` unless a file is
    /// already there. Called once a batch has succeeded.
    pub fn write_template_if_missing(path: &Path) {
        if path.exists() {
            return;
        }
        match toml::to_string_pretty(&Self::default()) {
            Ok(text) => {
                if let Err(err) = fs::write(path, comment_out(&text)) {
                    warn!(
                        "Failed to write default config to {}: {err}",
                        path.display()
                    );
                }
            }
            Err(err) => warn!("Failed to serialize default config: {err}"),
        }
    }
}

/// Keeps section headers live and comments out every value line, so the
/// written file documents the defaults without pinning them.
fn comment_out(text: &str) -> String {
    let mut commented = String::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || (trimmed.starts_with('[') && trimmed.ends_with(']')) {
            commented.push_str(line);
        } else {
            commented.push_str("# ");
            commented.push_str(line);
        }
        commented.push('\n');
    }
    commented
}
