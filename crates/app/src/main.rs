use clap::Parser;
use receipt_client::{FileSource, HttpSource, ReceiptSource};
use receipt_engine::summarize;

mod config;
mod error;
mod render;

use crate::{
    config::{Cli, Command, OutputArgs},
    error::{AppError, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::load(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "receipts={level},receipt_client={level},receipt_engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let http = HttpSource::builder()
        .base_url(&settings.base_url)
        .token(settings.token.as_deref())
        .timeout(settings.timeout())
        .build()?;

    match cli.command {
        Command::Summary(args) => match args.file {
            Some(path) => report(&FileSource::new(path), args.output).await,
            None => report(&http, args.output).await,
        },
        Command::Complete(args) => {
            http.complete_receipt(&args.receipt_id).await?;
            tracing::info!("receipt {} completed", args.receipt_id);
            report(&http, args.output).await
        }
        Command::Clear(args) => {
            if !args.yes {
                return Err(AppError::Aborted(
                    "clearing deletes every receipt, pass --yes to confirm".to_string(),
                ));
            }
            http.clear_receipts().await?;
            tracing::info!("all receipts cleared");
            report(&http, args.output).await
        }
        Command::Subscribe(args) => {
            http.subscribe_alerts(&args.email).await?;
            println!(
                "Confirmation email sent to {}. Confirm the subscription to receive alerts.",
                args.email.trim()
            );
            Ok(())
        }
    }
}

/// Fetches a fresh snapshot and prints its summary.
///
/// A failed fetch is returned as is; the summary is only computed from a
/// complete snapshot.
async fn report(source: &impl ReceiptSource, output: OutputArgs) -> Result<()> {
    let records = source.fetch_receipts().await?;
    let summary = summarize(&records);

    if output.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render::summary_text(&summary));
    }
    Ok(())
}
