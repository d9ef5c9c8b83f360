// converter.rs
use crate::app::selection::InputFile;
use crate::utils::{Logger, measure_time, get_memory_usage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use thiserror::Error;

pub const TOOL_ENV_VAR: &str = "AVIF2JPG_TOOL";

const DEFAULT_PROGRAM: &str = "ffmpeg";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("exited with {}: {diagnostic}", describe_code(.code))]
    Exit { code: Option<i32>, diagnostic: String },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code".to_string(),
    }
}

pub trait ConversionTool {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}

/// Runs `<program> -i <input> <output>` and waits for it to exit.
#[derive(Clone, Debug)]
pub struct ExternalTool {
    program: PathBuf,
}

impl Default for ExternalTool {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl ExternalTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn from_env() -> Self {
        std::env::var_os(TOOL_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ConversionTool for ExternalTool {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        // stdin stays closed so an overwrite prompt is answered with EOF
        let result = Command::new(&self.program)
            .arg("-i")
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ToolError::Launch {
                program: self.program.display().to_string(),
                source,
            })?;

        if result.status.success() {
            return Ok(());
        }

        Err(ToolError::Exit {
            code: result.status.code(),
            diagnostic: last_diagnostic_line(&result.stderr),
        })
    }
}

// ffmpeg prints its banner first and the actual error last
fn last_diagnostic_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no diagnostic output")
        .to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{file_name}: {detail}")]
pub struct ConversionFailure {
    pub file_name: String,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionOutcome {
    Success { output: PathBuf },
    Failure(ConversionFailure),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    AllSucceeded,
    PartialSuccess,
    AllFailed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversionReport {
    outcomes: Vec<ConversionOutcome>,
}

impl ConversionReport {
    pub fn outcomes(&self) -> &[ConversionOutcome] {
        &self.outcomes
    }

    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.len() - self.successes()
    }

    pub fn failure_details(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ConversionOutcome::Failure(failure) => Some(failure.to_string()),
                ConversionOutcome::Success { .. } => None,
            })
            .collect()
    }

    pub fn kind(&self) -> ReportKind {
        match (self.successes(), self.failures()) {
            (0, _) => ReportKind::AllFailed,
            (_, 0) => ReportKind::AllSucceeded,
            _ => ReportKind::PartialSuccess,
        }
    }

    pub fn summary(&self) -> String {
        match self.kind() {
            ReportKind::AllSucceeded => {
                format!("{} file(s) converted successfully!", self.successes())
            }
            ReportKind::PartialSuccess => format!(
                "{} file(s) converted successfully.\n{} file(s) failed:\n{}",
                self.successes(),
                self.failures(),
                self.failure_details().join("\n")
            ),
            ReportKind::AllFailed => {
                let mut message = String::from("No file was converted.");
                for detail in self.failure_details() {
                    message.push('\n');
                    message.push_str(&detail);
                }
                message
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("no input files selected")]
    NoInputFiles,
    #[error("no destination folder selected")]
    NoDestination,
    #[error("destination folder {} does not exist", .0.display())]
    DestinationMissing(PathBuf),
    #[error("destination {} is not a folder", .0.display())]
    NotADirectory(PathBuf),
    #[error("destination folder {} is read-only", .0.display())]
    ReadOnly(PathBuf),
}

fn check_destination(destination: &Path) -> Result<(), PreconditionError> {
    if destination.as_os_str().is_empty() {
        return Err(PreconditionError::NoDestination);
    }
    let metadata = fs::metadata(destination)
        .map_err(|_| PreconditionError::DestinationMissing(destination.to_path_buf()))?;
    if !metadata.is_dir() {
        return Err(PreconditionError::NotADirectory(destination.to_path_buf()));
    }
    // a real write, mode bits and folder attributes are not reliable
    tempfile::NamedTempFile::new_in(destination)
        .map(drop)
        .map_err(|_| PreconditionError::ReadOnly(destination.to_path_buf()))
}

pub enum BatchEvent<'a> {
    FileStarted { index: usize, total: usize, file: &'a InputFile },
    FileFinished { index: usize, total: usize, outcome: &'a ConversionOutcome },
}

pub struct BatchConverter<T> {
    tool: T,
    logger: Option<Logger>,
}

impl<T: ConversionTool> BatchConverter<T> {
    pub fn new(tool: T) -> Self {
        Self { tool, logger: None }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    fn log(&self, message: impl Into<String>) {
        if let Some(logger) = &self.logger {
            logger.log(message);
        }
    }

    pub fn convert(
        &self,
        input_files: &[InputFile],
        destination: &Path,
    ) -> Result<ConversionReport, PreconditionError> {
        self.convert_with_progress(input_files, destination, |_| {})
    }

    pub fn convert_with_progress<F>(
        &self,
        input_files: &[InputFile],
        destination: &Path,
        mut on_event: F,
    ) -> Result<ConversionReport, PreconditionError>
    where
        F: FnMut(BatchEvent<'_>),
    {
        let checked = if input_files.is_empty() {
            Err(PreconditionError::NoInputFiles)
        } else {
            check_destination(destination)
        };
        if let Err(e) = checked {
            self.log(format!("Conversion aborted, error: {}", e));
            return Err(e);
        }

        let total = input_files.len();
        self.log(format!("Converting {} file(s) into {}", total, destination.display()));
        self.log(get_memory_usage());
        let start_time = Instant::now();

        let mut outcomes = Vec::with_capacity(total);
        for (index, file) in input_files.iter().enumerate() {
            on_event(BatchEvent::FileStarted { index, total, file });

            let output = file.output_path(destination);
            self.log(format!("Trying to convert: {}", file.display_name()));
            let (result, duration) = measure_time(|| self.tool.convert(file.path(), &output));

            let outcome = match result {
                Ok(()) => {
                    self.log(format!("Converted {} in {:?}", output.display(), duration));
                    ConversionOutcome::Success { output }
                }
                Err(e) => {
                    let failure = ConversionFailure {
                        file_name: file.display_name(),
                        detail: e.to_string(),
                    };
                    self.log(format!("Conversion failed for {}", failure));
                    ConversionOutcome::Failure(failure)
                }
            };

            on_event(BatchEvent::FileFinished { index, total, outcome: &outcome });
            outcomes.push(outcome);
        }

        let report = ConversionReport { outcomes };
        self.log(format!(
            "Batch finished in {:?}: {} converted, {} failed",
            start_time.elapsed(),
            report.successes(),
            report.failures()
        ));
        self.log(get_memory_usage());
        Ok(report)
    }
}
