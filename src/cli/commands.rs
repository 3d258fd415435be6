//! Handlers for the CLI subcommands.

use std::fs;

use serde_json::Value;

use crate::batch::{BatchExecutor, SessionRunner};
use crate::cli::{BatchArgs, DigestArgs, RunArgs};
use crate::config::RelayConfig;
use crate::error::SessionError;
use crate::runtime::{ProcessRuntime, ReplayRuntime};
use crate::session::SessionOptions;

type CliResult = Result<(), Box<dyn std::error::Error>>;

pub async fn handle_run(args: RunArgs, config: &RelayConfig) -> CliResult {
    let options = args.into_options(config);
    let runner = SessionRunner::new(ProcessRuntime::from_config(config));
    let outcome = runner.run(&options, 0).await?;
    if outcome.cancelled {
        tracing::warn!(elapsed_ms = outcome.elapsed.as_millis() as u64, "session timed out");
    }
    print_json(&outcome.projection.to_value()?)
}

pub async fn handle_digest(args: DigestArgs, config: &RelayConfig) -> CliResult {
    let runtime = ReplayRuntime::from_jsonl_path(&args.transcript)?;
    let options = SessionOptions::builder()
        .prompt(args.transcript.display().to_string())
        .output_format(args.format)
        .include_partial_messages(args.include_stream_events)
        .debug(config.debug)
        .build();
    let outcome = SessionRunner::new(runtime).run(&options, 0).await?;
    print_json(&outcome.projection.to_value()?)
}

pub async fn handle_batch(args: BatchArgs, config: &RelayConfig) -> CliResult {
    let raw = fs::read_to_string(&args.items)?;
    let items = match serde_json::from_str::<Value>(&raw)? {
        Value::Array(items) => items,
        _ => {
            return Err(SessionError::InvalidArgument(format!(
                "{}: expected a JSON array of items",
                args.items.display()
            ))
            .into())
        }
    };
    let options = items
        .into_iter()
        .map(|item| config.item_options(item))
        .collect::<Result<Vec<_>, _>>()?;

    let executor = BatchExecutor::new(SessionRunner::new(ProcessRuntime::from_config(config)))
        .continue_on_failure(args.continue_on_fail || config.continue_on_failure);
    let records = executor.execute(&options).await?;
    print_json(&serde_json::to_value(records)?)
}

fn print_json(value: &Value) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
