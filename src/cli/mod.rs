//! # Command Line
//!
//! `evalgate run` exercises a stored session against its endpoint,
//! `evalgate submit` registers it once a test has passed and
//! `evalgate list` shows what an evaluation already has.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;
use uuid::Uuid;

use crate::api::{ApiClient, EndpointIntegration};
use crate::config::Settings;
use crate::http::client::ReqwestTransport;
use crate::integration::TestExample;
use crate::session::SubmitTarget;
use crate::storage;
use crate::testing::{EndpointTestHarness, RunSummary};

/// Every test failed, or a submission was refused.
pub const EXIT_GATE_CLOSED: u8 = 1;
/// Bad arguments, settings or session configuration.
pub const EXIT_USAGE: u8 = 2;

pub const USAGE: &str = "\
Usage:
  evalgate run <session.json> [--format text|json] [--report <path>]
  evalgate submit <session.json> --eval <uuid> [--integration <uuid>]
  evalgate list --eval <uuid>

Environment:
  EVALGATE_API_BASE    API base URL (default http://localhost:8000/api)
  EVALGATE_TIMEOUT_MS  per-request timeout for test calls (default: none)
  RUST_LOG             log filter (default: info)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run {
        session_path: PathBuf,
        output_format: OutputFormat,
        report_path: Option<PathBuf>,
    },
    Submit {
        session_path: PathBuf,
        eval_id: Uuid,
        integration_id: Option<Uuid>,
    },
    List {
        eval_id: Uuid,
    },
    Help,
}

/// Parse arguments, not including the program name.
pub fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };

    let mut positional = Vec::new();
    let mut format = None;
    let mut report = None;
    let mut eval = None;
    let mut integration = None;

    while let Some(arg) = args.next() {
        let slot = match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--format" => Some(&mut format),
            "--report" => Some(&mut report),
            "--eval" => Some(&mut eval),
            "--integration" => Some(&mut integration),
            flag if flag.starts_with("--") => return Err(format!("Unknown option `{flag}`")),
            _ => None,
        };
        let Some(slot) = slot else {
            positional.push(arg);
            continue;
        };
        let value = args
            .next()
            .ok_or_else(|| format!("Option `{arg}` needs a value"))?;
        *slot = Some(value);
    }

    match command.as_str() {
        "help" | "-h" | "--help" => Ok(Command::Help),
        "run" => Ok(Command::Run {
            session_path: single_path(positional)?,
            output_format: match format.as_deref() {
                None | Some("text") => OutputFormat::Text,
                Some("json") => OutputFormat::Json,
                Some(other) => return Err(format!("Unknown format `{other}` (expected text or json)")),
            },
            report_path: report.map(PathBuf::from),
        }),
        "submit" => Ok(Command::Submit {
            session_path: single_path(positional)?,
            eval_id: parse_uuid("--eval", eval.ok_or("`submit` requires --eval <uuid>")?)?,
            integration_id: integration.map(|id| parse_uuid("--integration", id)).transpose()?,
        }),
        "list" => {
            if !positional.is_empty() {
                return Err("`list` takes no positional arguments".to_string());
            }
            Ok(Command::List {
                eval_id: parse_uuid("--eval", eval.ok_or("`list` requires --eval <uuid>")?)?,
            })
        }
        other => Err(format!("Unknown command `{other}`")),
    }
}

/// Run a parsed command to completion and pick the process exit code.
pub async fn execute(command: Command, settings: &Settings) -> ExitCode {
    match dispatch(command, settings).await {
        Ok(code) => code,
        Err(message) => {
            tracing::error!("{message}");
            eprintln!("{message}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

async fn dispatch(command: Command, settings: &Settings) -> Result<ExitCode, String> {
    match command {
        Command::Help => {
            println!("{USAGE}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            session_path,
            output_format,
            report_path,
        } => run_tests(&session_path, output_format, report_path.as_deref(), settings).await,
        Command::Submit {
            session_path,
            eval_id,
            integration_id,
        } => {
            let mut session = storage::load_session(&session_path).map_err(|e| e.to_string())?;
            let api = ApiClient::new(settings.api_base.clone());
            let target = match integration_id {
                Some(id) => SubmitTarget::Update { id },
                None => SubmitTarget::Create { eval_id },
            };
            match session.submit(&api, target).await {
                Ok(record) => {
                    println!("{}", session.message().unwrap_or_default());
                    println!("{}", render_integrations(std::slice::from_ref(&record)));
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{err}");
                    Ok(ExitCode::from(EXIT_GATE_CLOSED))
                }
            }
        }
        Command::List { eval_id } => {
            let api = ApiClient::new(settings.api_base.clone());
            let integrations = api
                .list_integrations_for_eval(eval_id)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}", render_integrations(&integrations));
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_tests(
    session_path: &Path,
    output_format: OutputFormat,
    report_path: Option<&Path>,
    settings: &Settings,
) -> Result<ExitCode, String> {
    let mut session = storage::load_session(session_path).map_err(|e| e.to_string())?;
    let transport = ReqwestTransport::with_timeout(settings.test_timeout)?;
    let harness = EndpointTestHarness::with_transport(transport);
    let total = session.examples().len();

    let summary = session
        .run_tests_with_progress(&harness, |index, result| {
            let verdict = if result.success { "passed" } else { "failed" };
            eprintln!("[{}/{total}] {verdict}", index + 1);
        })
        .await
        .map_err(|e| e.to_string())?;

    storage::save_session(session_path, &session).map_err(|e| e.to_string())?;

    let rendered = render_run(output_format, &summary, session.examples());
    println!("{rendered}");
    if let Some(path) = report_path {
        fs::write(path, &rendered).map_err(|e| format!("Failed to write report `{}`: {e}", path.display()))?;
    }
    if let Some(message) = session.message() {
        eprintln!("{message}");
    }

    Ok(if summary.has_successful_test {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_GATE_CLOSED)
    })
}

fn single_path(mut positional: Vec<String>) -> Result<PathBuf, String> {
    match positional.len() {
        1 => Ok(PathBuf::from(positional.remove(0))),
        0 => Err("Missing session file path".to_string()),
        _ => Err(format!("Unexpected arguments: {}", positional[1..].join(" "))),
    }
}

fn parse_uuid(flag: &str, raw: String) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|e| format!("Invalid {flag} value `{raw}`: {e}"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    #[serde(flatten)]
    summary: &'a RunSummary,
    examples: &'a [TestExample],
}

pub fn render_run(format: OutputFormat, summary: &RunSummary, examples: &[TestExample]) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&JsonReport { summary, examples })
            .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize report: {e}\"}}")),
        OutputFormat::Text => render_run_text(summary, examples),
    }
}

fn render_run_text(summary: &RunSummary, examples: &[TestExample]) -> String {
    let mut lines = Vec::new();
    for (index, example) in examples.iter().enumerate() {
        let Some(result) = &example.result else {
            lines.push(format!("#{} not run", index + 1));
            continue;
        };
        let status = result
            .status
            .map(|status| status.to_string())
            .unwrap_or_else(|| "---".to_string());
        if result.success {
            lines.push(format!("#{} PASS {status}", index + 1));
        } else {
            let error = result.error.as_deref().unwrap_or("Unknown error");
            lines.push(format!("#{} FAIL {status} {error}", index + 1));
        }
    }

    let report = &summary.report;
    lines.push(format!(
        "{} passed, {} failed, {} total in {} ms",
        report.passed, report.failed, report.total, report.duration_ms
    ));
    lines.join("\n")
}

pub fn render_integrations(integrations: &[EndpointIntegration]) -> String {
    if integrations.is_empty() {
        return "No endpoint integrations yet".to_string();
    }
    integrations
        .iter()
        .map(|integration| {
            format!(
                "{}  {}  {} {}  examples: {}  created: {}",
                integration.id,
                integration.name,
                integration.http_method,
                integration.endpoint_url,
                integration.test_examples.len(),
                integration.created_at.format("%Y-%m-%d"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
