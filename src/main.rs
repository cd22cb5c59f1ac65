use std::fs::File;
use std::io::{self, Read};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use qa_assist::Provider;
use qa_assist::core::config::{self, CliOverrides};
use qa_assist::core::notify::LogNotifier;
use qa_assist::core::usage::UsageRecord;
use qa_assist::inference::{CompletionRequest, Router};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "qa-assist", about = "Send a prompt to the configured LLM provider")]
struct Args {
    /// Prompt text, or `-` to read it from stdin
    prompt: String,

    /// LLM provider to use (overrides config and QA_ASSIST_PROVIDER)
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,

    /// Model id (interpreted per provider)
    #[arg(short, long)]
    model: Option<String>,

    /// System instruction for this call
    #[arg(short, long)]
    system: Option<String>,

    /// Print the full result (content, usage, duration) as JSON
    #[arg(long)]
    json: bool,

    /// Print a usage record tagged with this kind instead of the content
    #[arg(long, value_name = "KIND")]
    record: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to qa-assist.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Ok(log_file) = File::create("qa-assist.log") {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let file_config = config::load_config()?;
    let cli = CliOverrides {
        provider: args.provider,
        model: args.model,
        system_prompt: args.system,
    };
    let provider_config = config::resolve(&file_config, &cli)?;
    log::info!("qa-assist starting with provider: {:?}", provider_config.provider);

    let prompt = if args.prompt == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        args.prompt
    };

    let router = Router::new(Arc::new(LogNotifier))?;
    let result = router
        .complete(&provider_config, &CompletionRequest::new(prompt))
        .await?;

    if let Some(kind) = args.record {
        println!("{}", serde_json::to_string(&UsageRecord::from_result(&result, kind))?);
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.content);
    }
    Ok(())
}
