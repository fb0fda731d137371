use clap::Parser;
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "HTTP:   rouille 3.6 (sync)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Live game-state HTTP bridge
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Port for the REST API listener
    #[arg(short = 'p', long = "port", value_name = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address the REST API binds to
    #[arg(short = 'b', long = "bind", value_name = "ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    /// Simulation tick interval in milliseconds
    #[arg(short = 't', long = "tick-ms", value_name = "MS", default_value_t = 600)]
    pub tick_ms: u64,

    /// Enable debug logging to file (default: scry.log in the data dir)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    /// Socket address string for the API listener.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_documented_surface() {
        let args = Args::parse_from(["scry"]);
        assert_eq!(args.port, 8080);
        assert_eq!(args.bind, "0.0.0.0");
        assert_eq!(args.tick_ms, 600);
        assert_eq!(args.verbosity, 0);
        assert!(args.log_file.is_none());
        assert_eq!(args.api_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_log_flag_accepts_an_optional_path() {
        let bare = Args::parse_from(["scry", "--log"]);
        assert_eq!(bare.log_file, Some(None));

        let with_path = Args::parse_from(["scry", "--log=/tmp/out.log"]);
        assert_eq!(with_path.log_file, Some(Some(PathBuf::from("/tmp/out.log"))));
    }

    #[test]
    fn test_bind_and_port_compose() {
        let args = Args::parse_from(["scry", "-b", "127.0.0.1", "-p", "9090"]);
        assert_eq!(args.api_addr(), "127.0.0.1:9090");
    }
}
