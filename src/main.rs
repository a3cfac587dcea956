use std::process::ExitCode;
use osc_shell::config::Config;
use osc_shell::repl::start_repl;
use osc_shell::util::report;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &Config) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let config = Config::from_env();
    init_logging(&config);
    match start_repl(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
