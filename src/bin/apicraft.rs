//! apicraft command-line entry point.
//!
//! Sends one request description and prints the outcome.
//!
//! ```text
//! apicraft [--export curl|fetch|python] <request.json> [environment-name]
//! ```
//!
//! The request file holds a JSON `RequestDescription`. When an environment name
//! is given it becomes the active environment before compiling. Settings are
//! read from `$APICRAFT_CONFIG`, falling back to `settings.json` in the default
//! storage directory; environments and history live in the configured storage
//! directory.
//!
//! The outcome is printed as pretty JSON on stdout. Exit status is 0 when an
//! HTTP response arrived (any status), 1 for a transport failure, timeout or
//! cancellation, and 2 for usage or input errors. Ctrl+C cancels the request.

use apicraft::client::ApiClient;
use apicraft::config::{load_config_file, AppConfig};
use apicraft::export::ExportFormat;
use apicraft::models::{RequestDescription, ResponseOutcome};
use apicraft::storage::FileStore;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

const USAGE: &str =
    "usage: apicraft [--export curl|fetch|python] <request.json> [environment-name]";

/// Parsed command line.
struct Args {
    request_path: PathBuf,
    environment: Option<String>,
    export: Option<ExportFormat>,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut export = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(USAGE.to_string()),
            "--export" => {
                let name = iter
                    .next()
                    .ok_or_else(|| "--export requires a format".to_string())?;
                export = Some(
                    ExportFormat::from_str(name)
                        .ok_or_else(|| format!("unknown export format '{}'", name))?,
                );
            }
            other if other.starts_with("--") => return Err(format!("unknown option '{}'", other)),
            other => positional.push(other.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    let request_path = positional.next().ok_or_else(|| USAGE.to_string())?;
    let environment = positional.next();
    if positional.next().is_some() {
        return Err(USAGE.to_string());
    }

    Ok(Args {
        request_path: PathBuf::from(request_path),
        environment,
        export,
    })
}

/// Reads a description; a file without `timeoutMs` gets the configured default.
fn read_request(path: &Path, config: &AppConfig) -> Result<RequestDescription, String> {
    let invalid = |e: serde_json::Error| format!("invalid request in {}: {}", path.display(), e);

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(invalid)?;
    let has_timeout = value.get("timeoutMs").is_some();

    let mut description: RequestDescription = serde_json::from_value(value).map_err(invalid)?;
    if !has_timeout {
        description.timeout_ms = config.timeout;
    }
    Ok(description)
}

fn settings_path() -> PathBuf {
    std::env::var_os("APICRAFT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| AppConfig::default().storage_path().join("settings.json"))
}

async fn run(args: Args) -> Result<ExitCode, String> {
    let config = load_config_file(&settings_path()).map_err(|e| e.to_string())?;
    let storage_dir = config.storage_path();
    log::debug!("Using storage directory {}", storage_dir.display());

    let store = FileStore::open(&storage_dir).map_err(|e| e.to_string())?;
    let client = ApiClient::open(Arc::new(store)).map_err(|e| e.to_string())?;

    if let Some(name) = &args.environment {
        client
            .environments()
            .set_active_by_name(name)
            .map_err(|e| e.to_string())?;
    }

    let description = read_request(&args.request_path, &config)?;

    if let Some(format) = args.export {
        println!("{}", client.export(&description, format));
        return Ok(ExitCode::SUCCESS);
    }

    let in_flight = client.start(&description);
    let cancel = in_flight.cancel_handle();
    let outcome = in_flight.outcome();
    tokio::pin!(outcome);

    let outcome = tokio::select! {
        outcome = &mut outcome => outcome,
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("[apicraft] Cancelling request...");
            cancel.cancel();
            outcome.await
        }
    };

    report(&outcome)?;
    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn report(outcome: &ResponseOutcome) -> Result<(), String> {
    match outcome {
        ResponseOutcome::Success(data) => eprintln!(
            "[apicraft] {} {} in {}ms ({} bytes)",
            data.status, data.status_text, data.elapsed_ms, data.size
        ),
        ResponseOutcome::Failure(failure) => eprintln!(
            "[apicraft] {:?} after {}ms: {}",
            failure.kind, failure.elapsed_ms, failure.message
        ),
    }

    let json = serde_json::to_string_pretty(outcome).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(message) => {
            eprintln!("[apicraft] error: {}", message);
            ExitCode::from(2)
        }
    }
}
