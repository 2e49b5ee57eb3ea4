use anyhow::bail;
use checklist_tonic_core::checklist::{DEFAULT_MAX_TEXT_LEN, Limits};
use clap::Parser;

/// Runtime configuration for the `checklist-tonic-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is honoured), with defaults suitable for local use.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "checklist-tonic-server",
    version,
    about = "A gRPC service for named lists of todos"
)]
pub struct CliArgs {
    /// Maximum length, in characters, of a list name or todo description.
    ///
    /// Longer values are rejected with `INVALID_ARGUMENT`.
    ///
    /// Environment variable: `MAX_TEXT_LEN`
    #[arg(long, env = "MAX_TEXT_LEN", default_value_t = DEFAULT_MAX_TEXT_LEN)]
    pub max_text_len: usize,

    /// Address to listen on (TCP or Unix socket path; use --uds for Unix socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/checklist.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub limits: Limits,
    pub server_addr: String,
    pub uds: bool,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_text_len == 0 {
            bail!("MAX_TEXT_LEN must be greater than 0");
        }

        if args.server_addr.is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        Ok(Self {
            limits: Limits {
                max_text_len: args.max_text_len,
            },
            server_addr: args.server_addr,
            uds: args.uds,
        })
    }
}
