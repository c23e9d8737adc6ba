use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use pagelink::app::App;
use pagelink::backend::HayroLoader;
use pagelink::config::Config;
use pagelink::error::AppResult;
use pagelink::logging::{self, LogSink};
use pagelink::registry::{DocumentRegistry, Route, document_path};
use pagelink::url::{Location, MemoryHistory};

/// Terminal PDF viewer with shareable `/{document}/{page}` links.
#[derive(Debug, Parser)]
#[command(name = "pagelink", version)]
struct Cli {
    /// Config file to use instead of the default lookup.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Route to open, e.g. `/manual` or `/manual/12?lang=en`.
    #[arg(default_value = "/")]
    route: String,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    logging::init(&config.log, LogSink::Discard)?;

    let registry = DocumentRegistry::from_config(&config.documents)?;
    let location = Location::parse(&cli.route)?;

    match registry.resolve_route(&location.path) {
        Route::Home => {
            print_documents(&registry);
            Ok(())
        }
        Route::Redirect { to } => {
            println!("unknown document route {}, redirected to {to}", cli.route);
            print_documents(&registry);
            Ok(())
        }
        Route::Viewer { name, .. } => {
            let entry = registry.lookup(&name)?.clone();
            let mut app = App::new(
                config,
                entry,
                MemoryHistory::new(location),
                Arc::new(HayroLoader),
            )?;
            app.run().await
        }
    }
}

fn print_documents(registry: &DocumentRegistry) {
    if registry.is_empty() {
        println!("no documents configured; add [[documents]] entries to the config file");
        return;
    }
    for name in registry.names() {
        println!("{}", document_path(name));
    }
}
