use std::path::PathBuf;

use clap::{Parser, Subcommand};

use basekit_lib::bootstrap::config::CONFIG_ENV_VAR;
use basekit_lib::bootstrap::tracing::init_tracing_subscriber;
use basekit_lib::{commands, load_config, AppConfig};
use bk_core::format_file_size;

#[derive(Parser)]
#[command(name = "basekit", version, about = "Image tools for Base attachment fields")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Override `[service] base_url` from the configuration file
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Shorten a URL through the plugin backend
    Shorten {
        url: String,
    },
    /// Remove the background of a local image
    RemoveBg {
        input: PathBuf,

        /// Output file (defaults to `<stem>.nobg.<ext>` next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print a byte count in human-readable form
    Size {
        bytes: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::empty(),
    };
    if let Some(base_url) = args.base_url {
        config.service_base_url = base_url;
    }

    if let Err(err) = init_tracing_subscriber(config.log_dir.as_deref()) {
        eprintln!("Failed to initialize tracing: {err}");
    }

    match args.command {
        Command::Shorten { url } => {
            let short_url = commands::shorten(&config, &url).await?;
            println!("{short_url}");
        }
        Command::RemoveBg { input, output } => {
            let written = commands::remove_background(&config, &input, output).await?;
            println!("{}", written.display());
        }
        Command::Size { bytes } => println!("{}", format_file_size(bytes)),
    }

    Ok(())
}
