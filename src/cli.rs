use clap::Parser;
use std::path::PathBuf;

use crate::config::ReportConfig;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "paper_runs.toml")]
    pub config: PathBuf,

    /// Directory holding the raw `<scenario>_30y.csv` exports (overrides config)
    #[arg(long, value_name = "DIR")]
    pub raw_dir: Option<PathBuf>,

    /// Directory for derived tables (overrides config)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Directory for rendered figures (overrides config)
    #[arg(long, value_name = "DIR")]
    pub fig_dir: Option<PathBuf>,

    /// Write tables only, skip chart rendering
    #[arg(long, default_value_t = false)]
    pub no_figures: bool,
}

impl Args {
    pub fn apply(&self, config: &mut ReportConfig) {
        if let Some(dir) = &self.raw_dir {
            config.paths.raw_dir = dir.clone();
        }
        if let Some(dir) = &self.out_dir {
            config.paths.out_dir = dir.clone();
        }
        if let Some(dir) = &self.fig_dir {
            config.paths.fig_dir = dir.clone();
        }
        if self.no_figures {
            config.figures.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_paths() {
        let args = Args::parse_from([
            "paper-runs",
            "--raw-dir",
            "in",
            "--fig-dir",
            "figs",
            "--no-figures",
        ]);
        let mut config = ReportConfig::default();
        args.apply(&mut config);
        assert_eq!(config.paths.raw_dir, PathBuf::from("in"));
        assert_eq!(config.paths.out_dir, PathBuf::from("data/paper_runs"));
        assert_eq!(config.paths.fig_dir, PathBuf::from("figs"));
        assert!(!config.figures.enabled);
    }

    #[test]
    fn defaults_leave_config_untouched() {
        let args = Args::parse_from(["paper-runs"]);
        assert_eq!(args.config, PathBuf::from("paper_runs.toml"));
        let mut config = ReportConfig::default();
        args.apply(&mut config);
        assert!(config.figures.enabled);
        assert_eq!(config.paths.raw_dir, PathBuf::from("data/paper_runs/raw"));
    }
}
