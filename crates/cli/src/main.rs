use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Operate the bookshelf API
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API until interrupted
    Serve {
        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the HTTP routes exposed by the registered modules
    Routes,
    /// Print the effective configuration as JSON
    Config,
}

const METHODS: &[&str] = &["get", "post", "put", "patch", "delete"];

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Command::Serve { host, port } => serve(settings, host, port),
        Command::Routes => {
            print_routes();
            Ok(())
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}

fn serve(mut settings: Settings, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    bookshelf_telemetry::init(&settings.telemetry)?;
    tracing::info!(
        env = ?settings.environment,
        address = %settings.server.bind_address(),
        "bookshelf serve starting"
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(bookshelf_app::run(settings))
}

fn print_routes() {
    let registry = bookshelf_app::build_registry();
    let document = bookshelf_http::router::openapi_document(&registry);

    let Some(paths) = document["paths"].as_object() else {
        return;
    };
    for (path, item) in paths {
        for method in METHODS {
            if let Some(operation) = item.get(*method) {
                let summary = operation["summary"].as_str().unwrap_or_default();
                println!("{:<7} {:<20} {}", method.to_uppercase(), path, summary);
            }
        }
    }
}
