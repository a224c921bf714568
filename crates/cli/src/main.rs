use anyhow::Context;
use bookstore_authz::TokenIssuer;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Command-line entrypoint for the bookstore service
#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Print a token for USERNAME signed with the configured secret
    IssueToken { username: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load bookstore settings")?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }

            bookstore_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookstore CLI serving");

            tokio::runtime::Runtime::new()
                .context("failed to start tokio runtime")?
                .block_on(bookstore_app::run(settings))
        }
        Command::IssueToken { username } => {
            let issuer = TokenIssuer::from_settings(&settings.auth)
                .context("invalid token issuer settings")?;
            println!("{}", issuer.issue(&username)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from(["bookstore", "serve", "--port", "8081"]).unwrap();
        match cli.command {
            Command::Serve { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(8081));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn issue_token_requires_username() {
        assert!(Cli::try_parse_from(["bookstore", "issue-token"]).is_err());
        assert!(Cli::try_parse_from(["bookstore", "issue-token", "alice"]).is_ok());
    }
}
