use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use prodconf::files;
use prodconf_tool::commands::{self, SchemaKind, SelectMode};

/// Inspect and edit product configuration selections.
#[derive(Parser)]
#[command(name = "pconf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a catalog and list its features
    Validate { catalog: PathBuf },
    /// Show the visible configuration tree
    Tree {
        catalog: PathBuf,
        #[arg(short, long)]
        selection: Option<PathBuf>,
    },
    /// Select or deselect one option by key path, e.g. `size/l/trim/gold`
    Select {
        catalog: PathBuf,
        key: String,
        #[arg(short, long)]
        selection: Option<PathBuf>,
        #[arg(long, conflicts_with = "exclusive")]
        off: bool,
        #[arg(long)]
        exclusive: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge another selection into a base selection
    Apply {
        catalog: PathBuf,
        #[arg(short, long)]
        selection: PathBuf,
        incoming: PathBuf,
        /// Clear everything the incoming selection does not mention
        #[arg(long)]
        replace: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the JSON schema of a file format
    Schema {
        #[arg(value_enum)]
        kind: SchemaKind,
    },
    /// Download a product catalog
    Fetch {
        product: String,
        #[arg(long)]
        api_config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a selection file
    Push {
        product: String,
        selection: PathBuf,
        #[arg(long)]
        api_config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let out = match cli.command {
        Command::Validate { catalog } => commands::validate(&files::load_catalog(catalog)?)?,
        Command::Tree { catalog, selection } => {
            let (ctx, config) = commands::open(&catalog, selection)?;
            let out = commands::tree(&config);
            ctx.shutdown();
            out
        }
        Command::Select {
            catalog,
            key,
            selection,
            off,
            exclusive,
            output,
        } => {
            let mode = match (off, exclusive) {
                (true, _) => SelectMode::Off,
                (_, true) => SelectMode::Exclusive,
                _ => SelectMode::On,
            };
            let (ctx, mut config) = commands::open(&catalog, selection)?;
            let result = commands::select(&mut config, &key, mode);
            ctx.shutdown();
            commands::emit_selection(&result?, output.as_deref())?
        }
        Command::Apply {
            catalog,
            selection,
            incoming,
            replace,
            output,
        } => {
            let (ctx, mut config) = commands::open(&catalog, Some(selection))?;
            let result = commands::apply(&mut config, &incoming, replace);
            ctx.shutdown();
            commands::emit_selection(&result?, output.as_deref())?
        }
        Command::Schema { kind } => commands::schema(kind)?,
        Command::Fetch {
            product,
            api_config,
            output,
        } => {
            let client = commands::api_client(api_config.as_deref())?;
            commands::fetch(&client, &product, output.as_deref()).await?
        }
        Command::Push {
            product,
            selection,
            api_config,
        } => {
            let client = commands::api_client(api_config.as_deref())?;
            commands::push(&client, &product, &selection).await?
        }
    };
    println!("{out}");
    Ok(())
}
