//! Teradata Parallel Transporter (`tbuild`) loader.
//!
//! The loader renders a TPT job script for a staging table, writes it to a
//! temporary file and runs `tbuild` against it. The process is bounded by a
//! timeout and a cancellation token. Both kill the child, and whatever it
//! printed up to that point is kept for the error.

use crate::{
    copy::CopyError,
    source::{Credentials, FileSource, Storage},
};
use model::{import::options::ImportOptions, schema::table::StagingTableDefinition};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    io::Write,
    path::PathBuf,
    process::{ExitStatus, Stdio},
    time::Duration,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT_SECS: u64 = 3 * 60 * 60;

const ROWS_APPLIED_MARKER: &str = "Total Rows Applied:";

/// How long pipes may stay open after the child is gone. Processes spawned
/// by `tbuild` can inherit them.
const PIPE_GRACE: Duration = Duration::from_secs(5);

fn default_tbuild_path() -> PathBuf {
    PathBuf::from("tbuild")
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TptConfig {
    /// Teradata director program id (host).
    pub tdp_id: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_tbuild_path")]
    pub tbuild_path: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TptConfig {
    pub fn new(tdp_id: &str, user: &str, password: &str) -> Self {
        Self {
            tdp_id: tdp_id.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            tbuild_path: default_tbuild_path(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for TptConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TptConfig")
            .field("tdp_id", &self.tdp_id)
            .field("user", &self.user)
            .field("password", &"***")
            .field("tbuild_path", &self.tbuild_path)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// What a finished `tbuild` run reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderOutcome {
    /// `None` when the output carried no row summary.
    pub rows_loaded: Option<u64>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone)]
pub struct TptLoader {
    config: TptConfig,
    cancel: CancellationToken,
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Identifiers inside TPT string attributes keep their double quotes.
fn qualified(staging: &StagingTableDefinition, suffix: &str) -> String {
    let name = format!("{}{suffix}", staging.name());
    if staging.schema().is_empty() {
        format!("\"{name}\"")
    } else {
        format!("\"{}\".\"{name}\"", staging.schema())
    }
}

fn access_module_init(source: &FileSource, key: &str) -> String {
    let mut init = Vec::new();
    if let Storage::S3 { bucket, region } = &source.storage {
        init.push(format!("S3Region=\"{region}\""));
        init.push(format!("S3Bucket=\"{bucket}\""));
    }
    init.push("S3Prefix=\"\"".to_string());
    init.push(format!("S3Object=\"{}\"", key.trim_start_matches('/')));
    init.push("S3SinglePartFile=True".to_string());
    if let Credentials::AwsKeys {
        key_id, secret_key, ..
    } = &source.credentials
    {
        init.push(format!("S3AccessID=\"{key_id}\""));
        init.push(format!("S3AccessKey=\"{secret_key}\""));
    }
    init.join(" ")
}

/// Extracts the row count from a `Total Rows Applied: N` line.
pub fn parse_rows_applied(stdout: &str) -> Option<u64> {
    stdout.lines().rev().find_map(|line| {
        let (_, rest) = line.split_once(ROWS_APPLIED_MARKER)?;
        rest.trim().replace(',', "").parse().ok()
    })
}

impl TptLoader {
    pub fn new(config: TptConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &TptConfig {
        &self.config
    }

    pub fn job_name(staging: &StagingTableDefinition) -> String {
        format!("load_{}", staging.name().trim_start_matches('_'))
    }

    /// Renders the job: one data connector per file, unioned into a single
    /// LOAD operator that fills the (empty) staging table.
    pub fn script(
        &self,
        source: &FileSource,
        staging: &StagingTableDefinition,
        options: &ImportOptions,
    ) -> String {
        let columns = staging.column_names();
        let schema = columns
            .iter()
            .map(|c| format!("        \"{c}\" VARCHAR(32000)"))
            .collect::<Vec<_>>()
            .join(",\n");
        let csv = &source.csv;

        let mut reader_attrs = vec![
            "        VARCHAR AccessModuleName = 'libs3axsmod.so'".to_string(),
            "        VARCHAR Format = 'Delimited'".to_string(),
            format!("        VARCHAR TextDelimiter = {}", quote(&csv.delimiter.to_string())),
            "        VARCHAR QuotedData = 'Optional'".to_string(),
            format!("        VARCHAR OpenQuoteMark = {}", quote(&csv.enclosure.to_string())),
            format!("        VARCHAR CloseQuoteMark = {}", quote(&csv.enclosure.to_string())),
            format!("        INTEGER SkipRows = {}", options.number_of_ignored_lines),
        ];
        if let Some(escape) = csv.escaped_by {
            reader_attrs.push(format!(
                "        VARCHAR EscapeQuoteDelimiter = {}",
                quote(&escape.to_string())
            ));
        }

        let target = qualified(staging, "");
        let load_attrs = [
            format!("        VARCHAR TdpId = {}", quote(&self.config.tdp_id)),
            format!("        VARCHAR UserName = {}", quote(&self.config.user)),
            format!("        VARCHAR UserPassword = {}", quote(&self.config.password)),
            format!("        VARCHAR TargetTable = {}", quote(&target)),
            format!("        VARCHAR LogTable = {}", quote(&qualified(staging, "_log"))),
            format!("        VARCHAR ErrorTable1 = {}", quote(&qualified(staging, "_e1"))),
            format!("        VARCHAR ErrorTable2 = {}", quote(&qualified(staging, "_e2"))),
        ];

        let insert = format!(
            "INSERT INTO {target} ({}) VALUES ({});",
            columns
                .iter()
                .map(|c| format!("\"{c}\""))
                .collect::<Vec<_>>()
                .join(", "),
            columns
                .iter()
                .map(|c| format!(":\"{c}\""))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let readers = source
            .files
            .iter()
            .map(|key| {
                format!(
                    "    SELECT * FROM OPERATOR (file_reader ATTR (AccessModuleInitStr = {}))",
                    quote(&access_module_init(source, key))
                )
            })
            .collect::<Vec<_>>()
            .join("\n    UNION ALL\n");

        format!(
            "DEFINE JOB {job}\nDESCRIPTION 'Load staging table'\n(\n\
             \x20   DEFINE SCHEMA staging_schema (\n{schema}\n    );\n\n\
             \x20   DEFINE OPERATOR file_reader\n    TYPE DATACONNECTOR PRODUCER\n    SCHEMA staging_schema\n    ATTRIBUTES (\n{reader}\n    );\n\n\
             \x20   DEFINE OPERATOR load_operator\n    TYPE LOAD\n    SCHEMA *\n    ATTRIBUTES (\n{load}\n    );\n\n\
             \x20   APPLY ({insert})\n    TO OPERATOR (load_operator)\n{readers};\n);\n",
            job = Self::job_name(staging),
            reader = reader_attrs.join(",\n"),
            load = load_attrs.join(",\n"),
            insert = quote(&insert),
        )
    }

    /// Runs `tbuild` on a rendered script.
    pub async fn run(&self, script: &str, job_name: &str) -> Result<LoaderOutcome, CopyError> {
        if self.cancel.is_cancelled() {
            return Err(load_failed("Load was cancelled before it started", "", ""));
        }

        let mut script_file = tempfile::Builder::new()
            .prefix("tpt_")
            .suffix(".txt")
            .tempfile()?;
        script_file.write_all(script.as_bytes())?;
        script_file.flush()?;

        let timeout = self.config.timeout();
        info!(job = job_name, tbuild = %self.config.tbuild_path.display(), ?timeout, "Starting TPT load");

        let mut child = Command::new(&self.config.tbuild_path)
            .arg("-f")
            .arg(script_file.path())
            .arg(job_name)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        let stdout = child.stdout.take().map(capture);
        let stderr = child.stderr.take().map(capture);

        let ending = tokio::select! {
            result = tokio::time::timeout(timeout, child.wait()) => match result {
                Ok(status) => Ending::Exited(status?),
                Err(_) => Ending::TimedOut,
            },
            _ = self.cancel.cancelled() => Ending::Cancelled,
        };

        if !matches!(ending, Ending::Exited(_)) {
            if let Err(e) = child.kill().await {
                warn!(job = job_name, error = %e, "Failed to kill tbuild");
            }
        }
        let stdout = collect(stdout).await;
        let stderr = collect(stderr).await;
        debug!(job = job_name, %stdout, %stderr, "tbuild finished");

        let status = match ending {
            Ending::Exited(status) => status,
            Ending::TimedOut => {
                warn!(job = job_name, ?timeout, "TPT load timed out");
                return Err(load_failed(
                    &format!("tbuild did not finish within {}s", timeout.as_secs()),
                    &stdout,
                    &stderr,
                ));
            }
            Ending::Cancelled => {
                warn!(job = job_name, "TPT load cancelled");
                return Err(load_failed("Load was cancelled", &stdout, &stderr));
            }
        };

        if !status.success() {
            return Err(load_failed(
                &format!("tbuild exited with {status}"),
                &stdout,
                &stderr,
            ));
        }

        Ok(LoaderOutcome {
            rows_loaded: parse_rows_applied(&stdout),
            stdout,
            stderr,
        })
    }
}

enum Ending {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

/// Streams a child pipe into a channel so that output read before a kill is
/// not lost with the process.
fn capture<R>(mut pipe: R) -> mpsc::UnboundedReceiver<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut buf = vec![0u8; 8192];
        loop {
            match pipe.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

async fn collect(rx: Option<mpsc::UnboundedReceiver<Vec<u8>>>) -> String {
    let Some(mut rx) = rx else {
        return String::new();
    };

    let mut bytes = Vec::new();
    let drained = tokio::time::timeout(PIPE_GRACE, async {
        while let Some(chunk) = rx.recv().await {
            bytes.extend_from_slice(&chunk);
        }
    })
    .await;
    if drained.is_err() {
        while let Ok(chunk) = rx.try_recv() {
            bytes.extend_from_slice(&chunk);
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn load_failed(message: &str, stdout: &str, stderr: &str) -> CopyError {
    CopyError::LoadFailed {
        message: message.to_string(),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}
