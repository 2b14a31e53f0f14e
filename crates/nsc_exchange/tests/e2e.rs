//! End-to-end tests for the exchange pipelines
//!
//! Drives full receive and send runs against a directory-backed transport
//! in a temporary environment, and checks files, journal rows, and cursor
//! behavior together.

use filetime::{set_file_mtime, FileTime};
use nsc_exchange::config::{FtpConfig, ImportSettings, LocalConfig};
use nsc_exchange::{
    receive_files, send_files, DirTransport, ExchangeConfig, Journal, ReceiveOptions, Transport,
};
use nsc_engine::{ReportType, RuleDef, RuleSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp-dir exchange environment: remote endpoint directories plus the
/// full local layout.
struct TestEnv {
    _temp: TempDir,
    remote_receive: PathBuf,
    remote_send: PathBuf,
    config: ExchangeConfig,
}

impl TestEnv {
    fn new(import: Option<ImportSettings>) -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let remote_receive = temp.path().join("remote_receive");
        let remote_send = temp.path().join("remote_send");
        fs::create_dir_all(&remote_receive).unwrap();
        fs::create_dir_all(&remote_send).unwrap();

        let config = ExchangeConfig {
            ftp: FtpConfig {
                host: "localhost".to_string(),
                port: 22,
                username: "school".to_string(),
                password: "secret".to_string(),
                protocol: "local".to_string(),
                receive_path: remote_receive.to_string_lossy().to_string(),
                send_path: remote_send.to_string_lossy().to_string(),
            },
            local: LocalConfig {
                receive_path: temp.path().join("receive"),
                send_path: temp.path().join("send"),
                archive_path: temp.path().join("archive"),
                log_file: temp.path().join("nsc_log.csv"),
                file_path: temp.path().join("staging"),
            },
            rules: RuleSet::load(vec![
                RuleDef {
                    name: "IPEDS".to_string(),
                    mode: "SE".to_string(),
                    pattern: r"ipeds_(?P<code>.*)_(?P<year>\d{4})_se".to_string(),
                    replace: "{schoolcode}_{nsctype}_{nscmode}_{subdatetime}_{fn}.{ext}"
                        .to_string(),
                    desc: "IPEDS detail reports".to_string(),
                    import: true,
                },
                RuleDef {
                    name: "COHORT1".to_string(),
                    mode: "PA".to_string(),
                    pattern: r"(?P<stem>.*)_(?P<termidx>\d+)_(?P<termid>\w{6})_(?P<desc>.*)"
                        .to_string(),
                    replace: "{termid}_{nsctype}_{nscmode}_{desc}.{ext}".to_string(),
                    desc: String::new(),
                    import: false,
                },
            ])
            .unwrap(),
            import,
        };

        Self {
            _temp: temp,
            remote_receive,
            remote_send,
            config,
        }
    }

    fn deliver(&self, name: &str, content: &str) -> PathBuf {
        let path = self.remote_receive.join(name);
        fs::write(&path, content).expect("Failed to write remote file");
        path
    }

    fn receive_transport(&self) -> DirTransport {
        DirTransport::new(&self.remote_receive).unwrap()
    }

    fn send_transport(&self) -> DirTransport {
        DirTransport::new(&self.remote_send).unwrap()
    }

    fn journal(&self) -> Journal {
        Journal::open(&self.config.local.log_file).unwrap()
    }

    fn journal_rows(&self) -> Vec<csv::StringRecord> {
        let mut reader = csv::Reader::from_path(&self.config.local.log_file).unwrap();
        reader.records().map(|r| r.unwrap()).collect()
    }

    fn receive(&self) -> nsc_exchange::ReceiveReport {
        let mut transport = self.receive_transport();
        let journal = self.journal();
        receive_files(
            &self.config,
            &mut transport,
            &journal,
            &ReceiveOptions::default(),
        )
        .unwrap()
    }
}

fn row_for<'a>(rows: &'a [csv::StringRecord], remote_name: &str) -> &'a csv::StringRecord {
    rows.iter()
        .find(|r| &r[0] == remote_name)
        .unwrap_or_else(|| panic!("no journal row for {remote_name}"))
}

// ============================================================================
// Receive
// ============================================================================

#[test]
fn receive_renames_classified_files() {
    let env = TestEnv::new(None);
    let raw = "12345678_000042_DETLRPT_SE_01152024093000_ipeds_98765_2023_se.csv";
    env.deliver(raw, "enrollment data");

    let report = env.receive();
    assert_eq!(report.listed, 1);
    assert_eq!(report.received, 1);

    let renamed = env
        .config
        .local
        .receive_path
        .join("12345678_DETLRPT_SE_01152024093000_ipeds_98765_2023_se.csv");
    assert!(renamed.exists(), "renamed file should be in receive dir");
    assert_eq!(fs::read_to_string(&renamed).unwrap(), "enrollment data");

    // Remote copy acknowledged, staging drained.
    assert!(!env.remote_receive.join(raw).exists());
    assert!(env.remote_receive.join("acknowledged").join(raw).exists());
    assert!(!env.config.local.file_path.join(raw).exists());

    let rows = env.journal_rows();
    assert_eq!(rows.len(), 1);
    let row = row_for(&rows, raw);
    assert_eq!(&row[2], "IPEDS");
    assert_eq!(&row[4], "received");
}

#[test]
fn receive_distinguishes_unmatched_and_unparsed() {
    let env = TestEnv::new(None);
    // Valid convention fields, but no rule matches the fragment.
    let unmatched = "12345678_000001_CNTLRPT_SE_01152024093000_quarterly.csv";
    // Not even the convention fits.
    let unparsed = "README.txt";
    env.deliver(unmatched, "a");
    env.deliver(unparsed, "b");

    let report = env.receive();
    assert_eq!(report.unmatched, 1);
    assert_eq!(report.unparsed, 1);
    assert_eq!(report.received, 0);

    // Both quarantined under their original names.
    assert!(env.config.local.receive_path.join(unmatched).exists());
    assert!(env.config.local.receive_path.join(unparsed).exists());

    let rows = env.journal_rows();
    assert_eq!(&row_for(&rows, unmatched)[4], "unmatched");
    assert_eq!(&row_for(&rows, unparsed)[4], "unparsed");
}

#[test]
fn second_receive_fetches_nothing() {
    let env = TestEnv::new(None);
    env.deliver(
        "12345678_000042_DETLRPT_SE_01152024093000_ipeds_98765_2023_se.csv",
        "data",
    );

    let first = env.receive();
    assert_eq!(first.received, 1);

    let second = env.receive();
    assert_eq!(second.listed, 0);
    assert_eq!(second.received, 0);
    assert_eq!(env.journal_rows().len(), 1);
}

#[test]
fn receive_skips_entries_older_than_cursor() {
    let env = TestEnv::new(None);
    let newer = env.deliver(
        "12345678_000002_DETLRPT_SE_01152024093000_ipeds_11111_2023_se.csv",
        "newer",
    );
    set_file_mtime(&newer, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();

    let first = env.receive();
    assert_eq!(first.received, 1);

    // A stale delivery appears after the cursor has advanced past it.
    let older = env.deliver(
        "12345678_000001_DETLRPT_SE_01142024093000_ipeds_22222_2023_se.csv",
        "older",
    );
    set_file_mtime(&older, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();

    let second = env.receive();
    assert_eq!(second.listed, 1);
    assert_eq!(second.skipped_older, 1);
    assert_eq!(second.received, 0);
    assert!(older.exists(), "skipped file stays on the remote");
}

#[test]
fn receive_dry_run_touches_nothing() {
    let env = TestEnv::new(None);
    let raw = "12345678_000042_DETLRPT_SE_01152024093000_ipeds_98765_2023_se.csv";
    env.deliver(raw, "data");

    let mut transport = env.receive_transport();
    let journal = env.journal();
    let report = receive_files(
        &env.config,
        &mut transport,
        &journal,
        &ReceiveOptions { dry_run: true },
    )
    .unwrap();

    assert_eq!(report.received, 1, "dry run still classifies");
    assert!(env.remote_receive.join(raw).exists(), "remote untouched");
    assert!(env.journal_rows().is_empty(), "nothing journaled");
    let placed: Vec<_> = fs::read_dir(&env.config.local.receive_path)
        .unwrap()
        .collect();
    assert!(placed.is_empty(), "receive dir stays empty");
}

// ============================================================================
// Import dispatch
// ============================================================================

#[test]
fn receive_runs_import_for_eligible_files() {
    let env = TestEnv::new(Some(ImportSettings {
        report_type: ReportType::Detlrpt,
        cmd: "true {entry} {fn} {dt}".to_string(),
    }));
    let eligible = "12345678_000042_DETLRPT_SE_01152024093000_ipeds_98765_2023_se.csv";
    // Same rule, but the derived type is CNTLRPT: not eligible.
    let ineligible = "12345678_000043_CNTLRPT_SE_01152024093000_ipeds_98765_2023_se.csv";
    env.deliver(eligible, "a");
    env.deliver(ineligible, "b");

    let report = env.receive();
    assert_eq!(report.imported, 1);
    assert_eq!(report.received, 1);

    let rows = env.journal_rows();
    assert_eq!(&row_for(&rows, eligible)[4], "imported");
    assert_eq!(&row_for(&rows, ineligible)[4], "received");
}

#[test]
fn receive_logs_failed_import() {
    let env = TestEnv::new(Some(ImportSettings {
        report_type: ReportType::Detlrpt,
        cmd: "false".to_string(),
    }));
    let raw = "12345678_000042_DETLRPT_SE_01152024093000_ipeds_98765_2023_se.csv";
    env.deliver(raw, "a");

    let report = env.receive();
    assert_eq!(report.import_failed, 1);
    assert_eq!(report.imported, 0);

    // The file is still placed under its rendered name; only the import failed.
    assert!(env
        .config
        .local
        .receive_path
        .join("12345678_DETLRPT_SE_01152024093000_ipeds_98765_2023_se.csv")
        .exists());
    let rows = env.journal_rows();
    assert_eq!(&row_for(&rows, raw)[4], "import_failed");
}

// ============================================================================
// Send
// ============================================================================

#[test]
fn send_uploads_journals_and_archives() {
    let env = TestEnv::new(None);
    fs::create_dir_all(&env.config.local.send_path).unwrap();
    fs::write(env.config.local.send_path.join("enrollment.csv"), "payload").unwrap();

    let mut transport = env.send_transport();
    let journal = env.journal();
    let report = send_files(&env.config, &mut transport, &journal).unwrap();
    assert_eq!(report.sent, 1);

    // Uploaded to the remote send path.
    assert_eq!(
        fs::read_to_string(env.remote_send.join("enrollment.csv")).unwrap(),
        "payload"
    );

    // Local copy archived with a run stamp; the send directory drains.
    assert!(!env.config.local.send_path.join("enrollment.csv").exists());
    let archived: Vec<String> = fs::read_dir(&env.config.local.archive_path)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(archived.len(), 1);
    assert!(archived[0].starts_with("enrollment_"));
    assert!(archived[0].ends_with(".csv"));

    let rows = env.journal_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], "enrollment.csv");
    assert_eq!(&rows[0][4], "sent");
}

#[test]
fn send_with_empty_directory_is_a_no_op() {
    let env = TestEnv::new(None);
    let mut transport = env.send_transport();
    let journal = env.journal();

    let report = send_files(&env.config, &mut transport, &journal).unwrap();
    assert_eq!(report.listed, 0);
    assert_eq!(report.sent, 0);
}

// ============================================================================
// Failure containment
// ============================================================================

/// Transport whose acknowledge always fails, to pin the ordering invariant.
#[derive(Debug)]
struct NoAckTransport {
    inner: DirTransport,
}

impl Transport for NoAckTransport {
    fn list(&mut self) -> nsc_exchange::Result<Vec<nsc_exchange::RemoteEntry>> {
        self.inner.list()
    }

    fn fetch(&mut self, name: &str, dest: &Path) -> nsc_exchange::Result<()> {
        self.inner.fetch(name, dest)
    }

    fn acknowledge(&mut self, _name: &str) -> nsc_exchange::Result<()> {
        Err(nsc_exchange::ExchangeError::Transport(
            "remote rejected the acknowledgment".to_string(),
        ))
    }

    fn upload(&mut self, local: &Path, name: &str) -> nsc_exchange::Result<()> {
        self.inner.upload(local, name)
    }
}

#[test]
fn ack_failure_leaves_file_staged_under_original_name() {
    let env = TestEnv::new(None);
    let raw = "12345678_000042_DETLRPT_SE_01152024093000_ipeds_98765_2023_se.csv";
    env.deliver(raw, "data");

    let mut transport = NoAckTransport {
        inner: env.receive_transport(),
    };
    let journal = env.journal();
    let report = receive_files(
        &env.config,
        &mut transport,
        &journal,
        &ReceiveOptions::default(),
    )
    .unwrap();

    assert_eq!(report.ack_failed, 1);
    assert_eq!(report.received, 0);

    // Never renamed: staged copy keeps the original name, receive dir empty.
    assert!(env.config.local.file_path.join(raw).exists());
    assert!(!env
        .config
        .local
        .receive_path
        .join("12345678_DETLRPT_SE_01152024093000_ipeds_98765_2023_se.csv")
        .exists());

    let rows = env.journal_rows();
    assert_eq!(&row_for(&rows, raw)[4], "ack_failed");

    // The cursor must not advance past a file that was never consumed.
    let retry = env.receive();
    assert_eq!(retry.received, 1);
}
