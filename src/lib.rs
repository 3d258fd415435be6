//! sessionfold: drive coding-agent sessions and fold their message streams.
//!
//! A run turns [`SessionOptions`](session::SessionOptions) into one
//! [`SessionRequest`](session::SessionRequest), hands it to an
//! [`AgentRuntime`](runtime::AgentRuntime), collects the resulting message
//! stream once, and renders it as a text, summary, or full projection.
//!
//! # Quick Start
//!
//! ```no_run
//! use sessionfold::prelude::*;
//!
//! # async fn example() -> sessionfold::error::Result<()> {
//! let runtime = ReplayRuntime::from_jsonl_path("transcript.jsonl")?;
//! let options = SessionOptions::builder()
//!     .prompt("Summarize the transcript")
//!     .output_format(OutputFormat::Text)
//!     .build();
//! let outcome = SessionRunner::new(runtime).run(&options, 0).await?;
//! println!("{}", outcome.projection.to_value()?);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod prelude;
pub mod projection;
pub mod runtime;
pub mod session;
pub mod stream_transform;
pub mod timeline;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
