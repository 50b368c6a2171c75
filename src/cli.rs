//! Command-line interface for target-tunnel.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Target address to connect to.
    pub host: Option<String>,
    /// Target SSH port.
    pub port: Option<u16>,
    /// Username to authenticate as.
    pub username: Option<String>,
    /// Password for authentication.
    pub password: Option<String>,
    /// Private key file for authentication.
    pub key: Option<PathBuf>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Max execution time in seconds.
    pub max_exec_time: Option<u64>,
    /// Merge stderr into stdout instead of capturing separately.
    pub merge_stderr: bool,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Command to execute on the target.
    pub command: Vec<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                result.host = Some(parser.value()?.parse()?);
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('u') | Long("user") => {
                result.username = Some(parser.value()?.parse()?);
            }
            Long("password") => {
                result.password = Some(parser.value()?.parse()?);
            }
            Short('i') | Long("key") => {
                result.key = Some(parser.value()?.parse()?);
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("max-exec-time") => {
                let value: String = parser.value()?.parse()?;
                result.max_exec_time = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("max-exec-time", value))?,
                );
            }
            Long("merge-stderr") => {
                result.merge_stderr = true;
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                result.command.push(val.to_string_lossy().into());
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"target-tunnel {version}
Resilient SSH command transport for integration-test targets

USAGE:
    target-tunnel [OPTIONS] [--] <COMMAND>...

OPTIONS:
    -H, --host <ADDR>           Target address to connect to
    -p, --port <PORT>           Target SSH port [default: 22]
    -u, --user <NAME>           Username [default: root]
        --password <PASS>       Password (default: empty)
    -i, --key <FILE>            Private key file
    -c, --config <FILE>         Path to configuration file (JSON)
    -t, --max-exec-time <SECS>  Max execution time [default: 180]
        --merge-stderr          Merge stderr into stdout
    -l, --log-level <LVL>       Log level (error, warn, info, debug, trace)
    -h, --help                  Print help
    -V, --version               Print version

ENVIRONMENT VARIABLES:
    TARGET_TUNNEL_HOST          Target address (overrides config)
    TARGET_TUNNEL_PORT          Target port (overrides config)
    TARGET_TUNNEL_USERNAME      Username (overrides config)
    TARGET_TUNNEL_PASSWORD      Password (overrides config)
    TARGET_TUNNEL_PRIVATE_KEY   Private key file (overrides config)
    TARGET_TUNNEL_LOG_LEVEL     Log level (overrides config)
    RUST_LOG                    Alternative log level setting

EXAMPLES:
    # Run a command on a target container
    target-tunnel -H 172.17.0.2 -u tester --password tester -- uname -a

    # Key-based auth against a QEMU guest with a tight deadline
    target-tunnel -H 10.0.2.15 -i ~/.ssh/id_ed25519 -t 30 -- systemctl is-system-running

    # Target described by a config file
    target-tunnel -c target.json -- 'echo $PATH'
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("target-tunnel {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
