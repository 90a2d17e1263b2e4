use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use tripmate::core::config::{self, CliOverrides, Surface};
use tripmate::core::request::LlmProvider;
use tripmate::term;

#[derive(Parser)]
#[command(name = "tripmate", about = "Chat with your travel-planning agent")]
struct Args {
    /// Conversation surface to run
    #[arg(short, long, value_enum)]
    surface: Option<Surface>,

    /// Trip to scope the conversation to
    #[arg(short, long)]
    trip_id: Option<String>,

    /// User id sent with every request
    #[arg(short, long)]
    user_id: Option<String>,

    /// LLM provider the backend should use
    #[arg(short, long, value_enum)]
    provider: Option<LlmProvider>,

    /// Ask the backend not to change anything
    #[arg(long)]
    read_only: bool,

    /// Agent backend base URL
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to tripmate.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("tripmate.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{}, falling back to defaults", e);
            eprintln!("warning: {e}, using defaults");
            config::TripmateConfig::default()
        }
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            base_url: args.base_url,
            user_id: args.user_id,
            trip_id: args.trip_id,
            llm_provider: args.provider,
            surface: args.surface,
            read_only: args.read_only,
        },
    );

    log::info!(
        "Tripmate starting up: surface={:?} backend={}",
        resolved.surface,
        resolved.base_url
    );

    term::run(resolved).await
}
