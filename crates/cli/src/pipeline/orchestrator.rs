//! Import orchestrator - wires the bus, the sinks and the reader.
//!
//! Lifecycle: sinks attach, Start, records are read, the error list goes
//! through `log_if_any_error`, a summary line is published, Stop.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{ImportSection, ImporterConfig, Severity};
use dispatcher::{log_if_any_error, Bus, ConsoleSink, EventLogSink, FileSink, FileSinkOptions};
use ingestion::{ImportOutcome, ImportReader};
use observability::{record_bus_metrics, record_import_outcome, record_lock_wait, RunSummary};
use tracing::{info, warn};

use crate::error::CliError;

/// Import configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Loaded (or default) importer settings, CLI overrides applied
    pub importer: ImporterConfig,

    /// Extract to read
    pub input: PathBuf,

    /// Shared log file (None = console only)
    pub log_file: Option<PathBuf>,

    /// Turn a non-empty error list into a failure
    pub fail_on_errors: bool,
}

/// One import run
pub struct ImportPipeline {
    config: PipelineConfig,
    console: Option<Box<dyn Write + Send>>,
}

impl ImportPipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            console: None,
        }
    }

    /// Send console output somewhere other than stderr
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn with_console_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.console = Some(Box::new(writer));
        self
    }

    /// Run the import to completion
    pub async fn run(self) -> Result<RunSummary, CliError> {
        let Self { config, console } = self;
        let logging = &config.importer.logging;

        let bus = Arc::new(Bus::with_settings(
            logging.verbosity,
            logging.message_format,
        ));
        let console_sink = match console {
            Some(writer) => ConsoleSink::attach_writer(&bus, writer),
            None => ConsoleSink::attach(&bus),
        };
        let event_sink = EventLogSink::attach(&bus);

        let mut summary = RunSummary::default();
        let file_sink = match &config.log_file {
            Some(path) => {
                let options = FileSinkOptions::from_config(&config.importer.file_sink);
                let (sink, waited) = open_file_sink(&bus, path, options).await?;
                summary.lock_wait = Some(waited);
                Some(sink)
            }
            None => None,
        };

        bus.start(
            Severity::Info,
            &format!("Training import of {}", config.input.display()),
        );

        let outcome = match read_input(&bus, &config.importer.import, &config.input).await {
            Ok(outcome) => outcome,
            Err(e) => {
                bus.stop(Severity::Error, "Training import aborted");
                return Err(e);
            }
        };

        let policy = log_if_any_error(
            &bus,
            &outcome.errors,
            "Import finished with rejected rows:",
            "Import finished without errors",
            config.fail_on_errors,
        );
        bus.add_message(
            Severity::Info,
            &format!(
                "{} record(s) accepted, {} rejected",
                outcome.records.len(),
                outcome.errors.len()
            ),
        );
        bus.stop(Severity::Info, "Training import");

        // Stop already closed the file sink; dropping it only detaches
        drop(file_sink);
        event_sink.detach(&bus);
        console_sink.detach(&bus);

        summary.records = outcome.records.len();
        summary.errors = outcome.errors.len();
        summary.skipped_lines = outcome.skipped_lines;
        summary.bus = bus.metrics().snapshot();
        record_bus_metrics(&summary.bus);
        record_import_outcome(summary.records, summary.errors);

        info!(
            records = summary.records,
            errors = summary.errors,
            "Import completed"
        );

        if policy.is_err() {
            return Err(CliError::RowsRejected {
                count: summary.errors,
            });
        }
        Ok(summary)
    }
}

/// Read on a blocking worker; the reader reports through the bus
async fn read_input(
    bus: &Arc<Bus>,
    settings: &ImportSection,
    input: &Path,
) -> Result<ImportOutcome, CliError> {
    let reader = ImportReader::new(Arc::clone(bus), settings)?;
    let input = input.to_path_buf();
    let outcome = tokio::task::spawn_blocking(move || reader.read_path(&input)).await??;
    Ok(outcome)
}

/// Acquire the shared lock off the runtime, giving up on Ctrl+C
async fn open_file_sink(
    bus: &Arc<Bus>,
    path: &Path,
    options: FileSinkOptions,
) -> Result<(FileSink, Duration), CliError> {
    info!(
        path = %path.display(),
        lock = %options.lock_path.display(),
        "Waiting for log file lock"
    );
    let started = Instant::now();
    let task = {
        let bus = Arc::clone(bus);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || FileSink::open(&bus, path, options))
    };

    tokio::select! {
        joined = task => {
            let waited = started.elapsed();
            match joined? {
                Ok(sink) => {
                    record_lock_wait(waited, true);
                    Ok((sink, waited))
                }
                Err(e) => {
                    if e.is_fatal() {
                        record_lock_wait(waited, false);
                    }
                    Err(e.into())
                }
            }
        }
        _ = shutdown_signal() => {
            warn!("Received shutdown signal while waiting for the log file lock");
            Err(CliError::Cancelled)
        }
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    const EXTRACT: &str = "Report header\n\
        UserID\tTitle\tDate\tCost\n\
        u1\tForklift\t01/02/2024\t$10\n\
        u2\tLadder\t01/03/2024\t\n\
        \tOrphan\t01/04/2024\t\n";

    fn config(dir: &TempDir, log_file: bool, fail_on_errors: bool) -> PipelineConfig {
        let input = dir.path().join("extract.txt");
        std::fs::write(&input, EXTRACT).unwrap();

        let mut importer = ImporterConfig::default();
        importer.file_sink.lock_path = Some(dir.path().join("sink.lock"));
        importer.file_sink.lock_timeout_secs = 2;

        PipelineConfig {
            importer,
            input,
            log_file: log_file.then(|| dir.path().join("import.log")),
            fail_on_errors,
        }
    }

    #[tokio::test]
    async fn test_console_only_run() {
        let dir = tempfile::tempdir().unwrap();
        let console = Captured::default();

        let summary = ImportPipeline::new(config(&dir, false, false))
            .with_console_writer(console.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.records, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.skipped_lines, 1);
        assert!(summary.lock_wait.is_none());

        let text = console.text();
        assert!(text.contains("Log starts"));
        assert!(text.contains("The UserID field is required."));
        assert!(text.contains("Import finished with rejected rows:"));
        assert!(text.contains("2 record(s) accepted, 1 rejected"));
        assert!(text.trim_end().ends_with("Log stops."));
    }

    #[tokio::test]
    async fn test_file_sink_receives_messages() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, true, false);
        let log_path = cfg.log_file.clone().unwrap();

        let summary = ImportPipeline::new(cfg)
            .with_console_writer(Captured::default())
            .run()
            .await
            .unwrap();
        assert!(summary.lock_wait.is_some());

        let log = std::fs::read_to_string(log_path).unwrap();
        assert!(log.contains("Training import of"));
        assert!(log.contains("2 record(s) accepted, 1 rejected"));

        // Lock was released by Stop
        let again = dispatcher::ExclusiveLock::acquire(
            &dir.path().join("sink.lock"),
            Duration::from_millis(100),
        );
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_fail_on_errors() {
        let dir = tempfile::tempdir().unwrap();
        let console = Captured::default();

        let err = ImportPipeline::new(config(&dir, false, true))
            .with_console_writer(console.clone())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::RowsRejected { count: 1 }));
        // Stop still ran
        assert!(console.text().trim_end().ends_with("Log stops."));
    }

    #[tokio::test]
    async fn test_lock_held_elsewhere_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(&dir, true, false);
        cfg.importer.file_sink.lock_timeout_secs = 1;
        let _held = dispatcher::ExclusiveLock::acquire(
            &dir.path().join("sink.lock"),
            Duration::from_millis(100),
        )
        .unwrap();

        let err = ImportPipeline::new(cfg)
            .with_console_writer(Captured::default())
            .run()
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test]
    async fn test_missing_input_aborts_after_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(&dir, false, false);
        cfg.input = dir.path().join("absent.txt");
        let console = Captured::default();

        let err = ImportPipeline::new(cfg)
            .with_console_writer(console.clone())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::Ingestion(_)));
        let text = console.text();
        assert!(text.contains("Log starts"));
        assert!(text.contains("Log stops."));
    }
}
