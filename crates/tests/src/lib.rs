//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 导入 → 总线 → 文件 的端到端测试
//! - 跨线程文件锁竞争

#[cfg(test)]
mod contract_tests {
    use contracts::{Environment, MessageFormat, Severity, Verbosity};

    #[test]
    fn test_contract_defaults() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
        assert_eq!(MessageFormat::default(), MessageFormat::TimePrefixed);
        assert_eq!(Environment::ALL.len(), 4);
        assert_eq!(Severity::None.label(), "");
        assert_eq!(Severity::Warning.label(), "Warning:");
    }

    #[test]
    fn test_config_round_trip_through_loader() {
        let config = contracts::ImporterConfig::default();
        let toml = config_loader::ConfigLoader::to_toml(&config).unwrap();
        let again =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();
        assert_eq!(again.file_sink.lock_timeout_secs, 600);
        assert_eq!(again.import.header_pattern, contracts::DEFAULT_HEADER_PATTERN);
    }
}

#[cfg(test)]
mod bus_tests {
    use std::sync::Arc;

    use dispatcher::{Bus, Environment, MemorySink, MessageFormat, Phase, Severity, Verbosity};
    use recorder::Recorder;

    mod recorder {
        use std::sync::{Arc, Mutex};

        /// Ordered trace of callback invocations
        #[derive(Clone, Default)]
        pub struct Recorder(Arc<Mutex<Vec<String>>>);

        impl Recorder {
            pub fn push(&self, entry: impl Into<String>) {
                self.0.lock().unwrap().push(entry.into());
            }

            pub fn entries(&self) -> Vec<String> {
                self.0.lock().unwrap().clone()
            }
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = Bus::new();
        for env in Environment::ALL {
            bus.publish(
                Phase::OnMessage,
                env,
                Severity::Error,
                "nobody listens",
                MessageFormat::Plain,
            );
        }
        assert_eq!(bus.metrics().delivered(), 0);
    }

    #[test]
    fn test_diagnostic_filtering_is_uniform() {
        let bus = Bus::new();
        let console = MemorySink::attach(&bus, Environment::Console);
        let event = MemorySink::attach(&bus, Environment::Event);

        bus.add_message(Severity::Diagnostic, "hidden");
        assert!(console.events().is_empty());
        assert!(event.events().is_empty());

        bus.set_verbosity(Verbosity::Verbose);
        bus.add_message(Severity::Diagnostic, "shown");
        assert_eq!(console.lines(), vec!["Diagnostic: shown"]);
        assert_eq!(event.lines(), vec!["Diagnostic: shown"]);
    }

    #[test]
    fn test_invocation_order_matches_subscription_order() {
        let bus = Bus::new();
        let recorder = Recorder::default();

        for i in 0..5 {
            let recorder = recorder.clone();
            bus.subscribe_fn(Environment::Database, Phase::OnMessage, move |_, _| {
                recorder.push(format!("h{i}"))
            });
        }
        bus.add_message_to(Environment::Database, Severity::Info, "go");

        assert_eq!(recorder.entries(), vec!["h0", "h1", "h2", "h3", "h4"]);
    }

    #[test]
    fn test_unsubscribe_all_silences_environment() {
        let bus = Bus::new();
        for env in Environment::ALL {
            let sink = MemorySink::attach(&bus, env);
            bus.unsubscribe_all(env);
            bus.add_message_to(env, Severity::Error, "gone");
            assert!(sink.events().is_empty(), "{env}");
        }
    }

    #[test]
    fn test_concurrent_add_message() {
        let bus = Arc::new(Bus::new());
        let sink = MemorySink::attach(&bus, Environment::Console);

        let workers: Vec<_> = (0..4)
            .map(|w| {
                let bus = Arc::clone(&bus);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        bus.add_message(Severity::Info, &format!("w{w}-{i}"));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(sink.events().len(), 200);
        assert_eq!(bus.metrics().snapshot().published, 200);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{ErrorKind, ImportSection};
    use dispatcher::{
        log_if_any_error, Bus, DispatcherError, Environment, FileSink, FileSinkOptions,
        MemorySink, Severity,
    };
    use ingestion::ImportReader;
    use regex::Regex;

    const EXTRACT: &str = "LMS transcript export\n\
        UserID\tTitle\tDate\tDescription\tCategory\tCity\tCost\n\
        u100\tHazmat Awareness\t03/04/2024\tAnnual\t03 - Compliance\tBoise\t$45.00\n\
        u101\tDefensive Driving\t03/05/2024\t\t04 - Fleet\tMeridian\t1,250\n\
        u102\t\t03/06/2024\t\t\t\t\n";

    fn options(dir: &std::path::Path) -> FileSinkOptions {
        FileSinkOptions {
            lock_path: dir.join("shared.lock"),
            lock_timeout: Duration::from_secs(5),
        }
    }

    /// Import → bus → console + file
    #[test]
    fn test_e2e_import_reports_one_rejected_row() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("import.log");

        let bus = Arc::new(Bus::new());
        let console = MemorySink::attach(&bus, Environment::Console);
        let file = FileSink::open(&bus, &log_path, options(dir.path())).unwrap();

        bus.start(Severity::Info, "Import");
        let reader = ImportReader::new(Arc::clone(&bus), &ImportSection::default()).unwrap();
        let outcome = reader.read_records(EXTRACT.as_bytes()).unwrap();
        bus.stop(Severity::Info, "Import");

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, ErrorKind::Validation);
        assert!(outcome.errors[0].message.contains("u102"));
        assert!(!file.is_active());

        let errors: Vec<_> = console
            .events()
            .into_iter()
            .filter(|e| e.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].text.contains("The Title field is required."));

        let log = std::fs::read_to_string(&log_path).unwrap();
        let error_lines: Vec<_> = log.lines().filter(|l| l.contains(" Error: ")).collect();
        assert_eq!(error_lines.len(), 1);
        assert!(error_lines[0].contains("Line 5"));

        let summary = observability::RunSummary {
            records: outcome.records.len(),
            errors: outcome.errors.len(),
            skipped_lines: outcome.skipped_lines,
            lock_wait: None,
            bus: bus.metrics().snapshot(),
        };
        assert!(summary.to_string().contains("Rows rejected: 1 (33.33%)"));
        assert_eq!(reader.metrics().snapshot().rejected, 1);
    }

    #[test]
    fn test_any_error_policy_logs_before_failing() {
        let bus = Bus::new();
        let console = MemorySink::attach(&bus, Environment::Console);
        let items = ["row 3 bad", "row 7 bad", "row 9 bad"];

        let err = log_if_any_error(&bus, &items, "Import failed", "Import ok", true).unwrap_err();

        assert!(matches!(err, DispatcherError::PolicyFailure { .. }));
        assert_eq!(
            console.lines(),
            vec!["Error: Import failed\nrow 3 bad\nrow 7 bad\nrow 9 bad"]
        );
    }

    #[test]
    fn test_time_prefixed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("timed.log");
        let bus = Arc::new(Bus::new());
        let sink = FileSink::open(&bus, &log_path, options(dir.path())).unwrap();

        for i in 0..7 {
            bus.add_message(Severity::Warning, &format!("message {i}"));
        }
        drop(sink);

        let log = std::fs::read_to_string(&log_path).unwrap();
        let time = Regex::new(r"^\d{2}:\d{2}:\d{2} Warning: message \d$").unwrap();
        let lines: Vec<_> = log.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines.iter().all(|l| time.is_match(l)), "{log}");
    }
}

#[cfg(test)]
mod lock_tests {
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    use dispatcher::{Bus, DispatcherError, FileSink, FileSinkOptions, Severity};

    /// Second sink on a different file still waits for the first (global lock)
    #[test]
    fn test_second_sink_waits_for_stop() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join("shared.lock");

        let first_bus = Arc::new(Bus::new());
        let first = FileSink::open(
            &first_bus,
            dir.path().join("a.log"),
            FileSinkOptions {
                lock_path: lock_path.clone(),
                lock_timeout: Duration::from_secs(1),
            },
        )
        .unwrap();

        let (tx, rx) = mpsc::channel();
        let second_dir = dir.path().to_path_buf();
        let waiter = thread::spawn(move || {
            let bus = Arc::new(Bus::new());
            let sink = FileSink::open(
                &bus,
                second_dir.join("b.log"),
                FileSinkOptions {
                    lock_path,
                    lock_timeout: Duration::from_secs(10),
                },
            );
            tx.send(()).unwrap();
            sink.map(|s| {
                bus.add_message(Severity::Info, "second writer");
                bus.stop(Severity::Info, "done");
                s.is_active()
            })
        });

        // Blocked while the first sink holds the lock
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        first_bus.stop(Severity::Info, "first done");
        assert!(!first.is_active());

        let still_active = waiter.join().unwrap().unwrap();
        assert!(!still_active);
        let log = std::fs::read_to_string(dir.path().join("b.log")).unwrap();
        assert!(log.contains("second writer"));
    }

    #[test]
    fn test_second_sink_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let options = FileSinkOptions {
            lock_path: dir.path().join("shared.lock"),
            lock_timeout: Duration::from_millis(300),
        };

        let bus = Arc::new(Bus::new());
        let _holder = FileSink::open(&bus, dir.path().join("a.log"), options.clone()).unwrap();

        let other = Arc::new(Bus::new());
        let err = FileSink::open(&other, dir.path().join("b.log"), options)
            .err()
            .unwrap();
        assert!(matches!(err, DispatcherError::LockTimeout { .. }));
        assert!(err.is_fatal());
    }
}
