use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;
use notion_qa::{Config, Credentials, NotionClient};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "notion-qa")]
#[command(about = "Append question/answer pairs from a JSON file to a Notion page as toggles")]
struct Cli {
    /// Path to JSON file of {"q", "a", "m"} records
    file: PathBuf,

    /// Notion integration API secret. Can generate this in Notion settings. [env: NOTION_KEY]
    #[arg(short = 'k', long = "notionKey")]
    notion_key: Option<String>,

    /// ID of the Notion page to be modified. Found as a 32-char string in the page URL. [env: PAGE_ID]
    #[arg(short = 'p', long = "pageId")]
    page_id: Option<String>,

    /// TOML file overriding the built-in API settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Help is a successful run; every other parse failure is a usage error.
fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> notion_qa::Result<String> {
    notion_qa::check_input_path(&cli.file)?;

    let credentials = Credentials::from_env(cli.notion_key, cli.page_id)?;
    let config = Config::load_or_default(cli.config.as_deref())?;
    tracing::debug!(?credentials, api = ?config.api, "resolved settings");

    let client = NotionClient::new(config.api, credentials);
    notion_qa::push_file(&cli.file, &client).await?;

    Ok(config.output.page_link(client.page_id()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env is fine, the real environment may already be set
    dotenvy::dotenv().ok();
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = exit_code_for(e.kind());
            let _ = e.print();
            std::process::exit(code);
        }
    };

    match run(cli).await {
        Ok(link) => println!("Successful: {}", link),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
