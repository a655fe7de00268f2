use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Book catalog REST API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the resolved configuration (connection strings are omitted)
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookshelf CLI serving");
            bookshelf_app::run(settings).await
        }
        Command::Config => {
            print_settings(&settings);
            Ok(())
        }
    }
}

fn print_settings(settings: &Settings) {
    println!("environment        = {:?}", settings.environment);
    println!("server.host        = {}", settings.server.host);
    println!("server.port        = {}", settings.server.port);
    println!("server.api_prefix  = {}", settings.server.api_prefix);
    println!("server.timeout_ms  = {}", settings.server.request_timeout_ms);
    println!("database.backend   = {:?}", settings.database.backend);
    println!("database.name      = {}", settings.database.name);
    println!("pagination.default = {}", settings.pagination.default_limit);
    println!("pagination.max     = {}", settings.pagination.max_limit);
    println!("telemetry.format   = {:?}", settings.telemetry.log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_accepts_port_override() {
        let cli = Cli::try_parse_from(["bookshelf", "serve", "--port", "8081"]).unwrap();
        match cli.command {
            Command::Serve { port } => assert_eq!(port, Some(8081)),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
