use clap::Parser;
use solace::application::journal::list_user_entries;
use solace::application::{init::init, ConfigService, JournalService};
use solace::cli::{format_dispatch_result, format_entry_list, Cli, Commands};
use solace::domain::TimeReference;
use solace::error::SolaceError;
use solace::infrastructure::{EntryFilter, SqliteEntryStore, Workspace};
use std::str::FromStr;
use std::sync::Arc;
use tracing::Level;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

/// Log to stderr at `log.level` from the workspace config, or debug with `-v`
fn init_logging(verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        Workspace::discover()
            .and_then(|ws| ws.load_config())
            .ok()
            .and_then(|config| Level::from_str(&config.log.level).ok())
            .unwrap_or(Level::INFO)
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), SolaceError> {
    match cli.command {
        Commands::Init { path, database } => {
            let workspace = init(&path, database).await?;
            println!(
                "Initialized solace workspace in {}",
                workspace.solace_dir().display()
            );
            Ok(())
        }
        Commands::Config { key, value, list } => {
            let service = ConfigService::new(Workspace::discover()?);

            if list {
                for (key, value) in service.list()? {
                    println!("{} = {}", key, value);
                }
            } else if let Some(k) = key {
                if let Some(v) = value {
                    service.set(&k, &v)?;
                    println!("Set {} = {}", k, v);
                } else {
                    println!("{}", service.get(&k)?);
                }
            } else {
                println!("Usage: solace config [--list | <key> [<value>]]");
            }
            Ok(())
        }
        Commands::Serve { host, port } => {
            let workspace = Workspace::discover()?;
            let mut config = workspace.load_config()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let service = JournalService::from_workspace(&workspace, &config).await?;
            solace::server::serve(Arc::new(service), &config.server).await
        }
        Commands::List {
            user,
            from,
            to,
            limit,
        } => {
            let workspace = Workspace::discover()?;
            let config = workspace.load_config()?;
            let boundary = config.journal.day_boundary;

            let resolve = |value: Option<String>| {
                value
                    .map(|v| TimeReference::parse(&v).map(|t| t.resolve_in(&boundary)))
                    .transpose()
            };
            let filter = EntryFilter {
                from: resolve(from)?,
                to: resolve(to)?,
                limit,
            };

            let store = SqliteEntryStore::connect(&workspace.database_path(&config)).await?;
            let entries = list_user_entries(&store, user, &filter).await?;
            print!("{}", format_entry_list(&entries));
            if entries.is_empty() {
                println!();
            }
            Ok(())
        }
        Commands::Analyze { entry_id } => {
            let workspace = Workspace::discover()?;
            let config = workspace.load_config()?;
            let service = JournalService::from_workspace(&workspace, &config).await?;

            let result = service.analyze_entry(entry_id).await?;
            print!("{}", format_dispatch_result(&result));
            Ok(())
        }
    }
}
