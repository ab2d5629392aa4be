// Entry point: builds the paper tables and figures from raw BehaviorSpace runs.
use clap::Parser;
use tracing_subscriber::EnvFilter;

use paper_runs::cli::Args;
use paper_runs::config::ReportConfig;
use paper_runs::report;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let mut config = ReportConfig::load_or_default(&args.config);
    args.apply(&mut config);

    match report::run(&config) {
        Ok(report) => {
            ReportConfig::write_template_if_missing(&args.config);
            print!("{}", report::console_summary(&report));
        }
        Err(err) => {
            eprintln!("paper runs failed: {err}");
            std::process::exit(1);
        }
    }
}
