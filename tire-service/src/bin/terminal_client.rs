use clap::Parser;
use std::sync::Arc;
use tire_flow::{ExecutionStatus, FlowRunner, InMemorySessionStorage, tire_wear_dialog};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Run the tire wear dialog in the terminal, one line per message
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Conversation id used for the in-memory session
    #[arg(long, default_value = "terminal")]
    session_id: String,

    /// Exit after the first completed report
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let storage = Arc::new(InMemorySessionStorage::new());
    let runner = FlowRunner::new(Arc::new(tire_wear_dialog()), storage);
    runner.open(&args.session_id).await?;

    println!("Type /start to begin, /cancel to abort, Ctrl-D to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let transition = runner.run(&args.session_id, &line).await?;

        println!("{}", transition.response);
        if let Some(choices) = &transition.choices {
            println!("[{}]", choices.join(" | "));
        }

        if args.once && transition.status == ExecutionStatus::Completed {
            break;
        }
    }

    Ok(())
}
