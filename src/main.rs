use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use hopchain_engine::{DEFAULT_FUNCTION_PORT, DEFAULT_GATEWAY, Engine, EngineConfig};
use tracing_subscriber::EnvFilter;

mod define;

/// Hopchain - runs one hop of a function chain per invocation
///
/// Reads the request from stdin and writes the hop's result to stdout.
#[derive(Parser)]
#[command(name = "hopchain")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Gateway address used for continuations
  #[arg(long, env = "gateway", default_value = DEFAULT_GATEWAY)]
  gateway: String,

  /// Name of this function on the gateway, needed once a chain dispatches
  #[arg(long, env = "function_name")]
  function_name: Option<String>,

  /// HTTP method for remote calls without a `method` header
  #[arg(long, env = "default-method")]
  default_method: Option<String>,

  /// URL notified with the result of the final phase
  #[arg(long, env = "X-Callback-Url")]
  callback_url: Option<String>,

  /// Port upstream functions listen on
  #[arg(long, env = "function_port", default_value_t = DEFAULT_FUNCTION_PORT)]
  function_port: u16,

  /// Timeout for outbound requests in milliseconds
  #[arg(long, env = "request_timeout_ms")]
  request_timeout_ms: Option<u64>,
}

impl Cli {
  fn into_config(self) -> EngineConfig {
    EngineConfig {
      gateway: self.gateway,
      function_name: self.function_name.unwrap_or_default(),
      default_method: self.default_method,
      callback_url: self.callback_url.filter(|url| !url.is_empty()),
      function_port: self.function_port,
      request_timeout_ms: self.request_timeout_ms,
    }
  }
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  match run(cli.into_config()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!(error = %format!("{:#}", e), "hop failed");
      ExitCode::FAILURE
    }
  }
}

fn run(config: EngineConfig) -> Result<()> {
  let mut input = Vec::new();
  io::stdin()
    .read_to_end(&mut input)
    .context("unable to read standard input")?;

  let rt = tokio::runtime::Runtime::new()?;
  let output = rt.block_on(async {
    let engine = Engine::new(config).context("failed to create engine")?;
    engine
      .handle(&define::define, input)
      .await
      .context("hop execution failed")
  })?;

  let mut stdout = io::stdout().lock();
  stdout.write_all(&output.into_bytes())?;
  stdout.write_all(b"\n")?;
  stdout.flush()?;

  Ok(())
}
