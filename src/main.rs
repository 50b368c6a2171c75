//! Target-tunnel binary entry point.

use std::process::ExitCode;

use tracing::error;

use target_tunnel::config::Config;
use target_tunnel::{cli, logging, ExecutionResult, Session};

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    logging::init_with_filter(config.log_filter());

    if args.command.is_empty() {
        eprintln!("error: no command given (see --help)");
        return ExitCode::FAILURE;
    }
    let line = args.command.join(" ");

    match run(&config, &line) {
        Ok(result) => {
            for line in &result.stdout {
                print!("{}", line);
            }
            for line in &result.stderr {
                eprint!("{}", line);
            }
            if result.timed_out() {
                error!("command '{}' did not finish in time", line);
                return ExitCode::FAILURE;
            }
            ExitCode::from((result.exit_status & 0xff) as u8)
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, line: &str) -> target_tunnel::Result<ExecutionResult> {
    let mut session = Session::connect(config.to_session_config()?)?;
    // Output is relayed to our own stdio below, not the log stream.
    let command = config.to_command(line).log_output(false);
    let result = session.execute_output(&command);
    session.close();
    result
}
