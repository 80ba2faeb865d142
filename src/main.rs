use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use prompt_lens::commands::{self, AnalyzeOptions, ImageSource};
use prompt_lens::{config, init_tracing, AnalysisResult};

/// Turn an image into a text-to-image prompt
#[derive(Parser)]
#[command(name = "prompt-lens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reverse-engineer a prompt from an image file, a data URI, or `-` for stdin
    Analyze {
        image: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Gemini model to use
        #[arg(long)]
        model: Option<String>,

        /// API key (overrides environment and keychain)
        #[arg(long)]
        api_key: Option<String>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Manage the stored Gemini API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store a key in the OS keychain
    Set { api_key: String },
    /// Remove the stored key
    Delete,
    /// Show where a key is configured
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            image,
            json,
            model,
            api_key,
            timeout,
        } => {
            let options = AnalyzeOptions {
                api_key,
                model,
                timeout_secs: timeout,
            };
            let snapshot = commands::analyze_image(&ImageSource::parse(&image), &options)
                .await
                .map_err(|e| anyhow!(e))?;
            let result = snapshot
                .result
                .ok_or_else(|| anyhow!("analysis finished without a result"))?;

            if json {
                let rendered =
                    serde_json::to_string_pretty(&result).context("Failed to encode result")?;
                println!("{}", rendered);
            } else {
                print_result(&result);
            }
        }
        Command::Key { action } => match action {
            KeyAction::Set { api_key } => {
                commands::set_api_key(&api_key).map_err(|e| anyhow!(e))?;
                eprintln!("API key stored.");
            }
            KeyAction::Delete => {
                commands::delete_api_key().map_err(|e| anyhow!(e))?;
                eprintln!("API key deleted.");
            }
            KeyAction::Status => {
                let status = commands::key_status();
                println!("provider:    {}", status.provider);
                println!("keychain:    {}", if status.stored { "stored" } else { "not set" });
                println!(
                    "environment: {}",
                    if status.env_configured { "set" } else { "not set" }
                );
            }
        },
    }

    Ok(())
}

fn print_result(result: &AnalysisResult) {
    println!("{}\n", result.prompt);
    println!("Style: {}", result.style);
    if !result.elements.is_empty() {
        println!("Elements: {}", result.elements.join(", "));
    }
}
