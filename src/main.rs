#![forbid(unsafe_code)]

use serde::Serialize;
use spec_options::files::collect_spec_files;
use spec_options::{NoServer, Outcome, Resolver, RunConfiguration, Stream};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "SPEC_LOG";

/// What the execution engine receives
#[derive(Serialize)]
struct RunPlan<'a> {
    configuration: &'a RunConfiguration,
    spec_files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let mut remote = NoServer;

    let outcome = Resolver::new(
        Stream::exiting(&mut stderr),
        Stream::exiting(&mut stdout),
        &mut remote,
    )
    .resolve(&args, true);

    match outcome {
        Ok(Outcome::Run(config)) => print_plan(&config, &mut stdout, &mut stderr),
        Ok(Outcome::Transferred) => ExitCode::SUCCESS,
        Err(error) => ExitCode::from(error.exit_code()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV)
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_plan(
    config: &RunConfiguration,
    stdout: &mut StandardStream,
    stderr: &mut StandardStream,
) -> ExitCode {
    let spec_files = match collect_spec_files(config) {
        Ok(files) => files,
        Err(error) => {
            let _ = writeln!(stderr, "{}", error);
            return ExitCode::from(error.exit_code());
        }
    };

    let plan = RunPlan {
        configuration: config,
        spec_files,
    };

    let written = serde_json::to_writer_pretty(&mut *stdout, &plan)
        .map_err(std::io::Error::from)
        .and_then(|()| writeln!(stdout));
    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "failed to write run plan: {}", error);
            ExitCode::from(74)
        }
    }
}
