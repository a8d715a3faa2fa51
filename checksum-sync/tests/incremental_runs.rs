use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use checksum_core::{Algorithm, ChecksumConfig, RunModeKind};
use checksum_sync::{
    pipeline::{self, RunOptions},
    state, ArtifactAction, FullReason, SyncError,
};
use filetime::{set_file_mtime, FileTime};
use tempfile::TempDir;

const HELLO: &str = "Hello, Checksum!";
const HELLO_SHA256: &str = "17dc1d7c1912574351e67069fef64e603d435c7b04197ddb95237cc93ebbe973";
const HELLO_MD5: &str = "5691b5ad8da499aa156eda19eafa8ca3";
const HELLO_SHA512: &str = "32ae12e4d047303297158cd23a93ba5d7f531b0b8597949a800e0ed57c0d0f6463563f9cb16b99f208bca97cd7471cc4d3ae1ab2b88c026016975dff68c39eb9";

struct Fixture {
    home: TempDir,
    _workspace: TempDir,
    src: PathBuf,
    out: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let home = TempDir::new().expect("home");
        let workspace = TempDir::new().expect("workspace");
        let src = workspace.path().join("src");
        let out = workspace.path().join("build").join("checksums");
        fs::create_dir_all(&src).expect("mkdir src");
        Self {
            home,
            _workspace: workspace,
            src,
            out,
        }
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.src.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, content).expect("write input");
        path
    }

    fn config(&self) -> ChecksumConfig {
        ChecksumConfig::new(&self.out, vec![self.src.clone()])
    }

    fn run(&self, config: &ChecksumConfig) -> pipeline::RunOutcome {
        pipeline::run(self.home.path(), config, RunOptions::default()).expect("run")
    }

    fn artifact(&self, name: &str) -> PathBuf {
        self.out.join(name)
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read artifact")
}

fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).expect("metadata").modified().expect("mtime")
}

fn age_artifacts(dir: &Path) {
    let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(3600));
    for entry in fs::read_dir(dir).expect("read out") {
        set_file_mtime(entry.expect("entry").path(), old).expect("age artifact");
    }
}

#[test]
fn unchanged_inputs_produce_no_writes_on_second_run() {
    let fx = Fixture::new();
    fx.write("foo.txt", "foo");
    fx.write("bar.txt", "bar");
    let config = fx.config();

    let first = fx.run(&config);
    assert_eq!(first.report.mode, RunModeKind::Full);
    assert_eq!(first.report.written(), 2);
    let foo_before = read(&fx.artifact("foo.txt.sha256"));

    let second = fx.run(&config);
    assert_eq!(second.report.mode, RunModeKind::Incremental);
    assert_eq!(second.report.mutations(), 0, "no-op run must not write");
    assert_eq!(second.report.skipped(), 2);
    assert_eq!(read(&fx.artifact("foo.txt.sha256")), foo_before);
}

#[test]
fn foreign_file_survives_full_and_incremental_runs() {
    let fx = Fixture::new();
    fx.write("foo.txt", "foo");
    fs::create_dir_all(&fx.out).unwrap();
    fs::write(fx.artifact("notMyFile"), "mine").unwrap();
    let config = fx.config();

    fx.run(&config);
    fx.write("bar.txt", "bar");
    fx.run(&config);
    fx.run(&config.clone().with_algorithm(Algorithm::Md5));
    pipeline::run(
        fx.home.path(),
        &config,
        RunOptions {
            force_full: true,
            dry_run: false,
        },
    )
    .expect("forced run");

    assert_eq!(read(&fx.artifact("notMyFile")), "mine");
}

#[test]
fn switching_algorithm_replaces_artifacts() {
    let fx = Fixture::new();
    fx.write("aFile.txt", HELLO);
    let config = fx.config();

    fx.run(&config);
    assert_eq!(read(&fx.artifact("aFile.txt.sha256")), HELLO_SHA256);

    let switched = config.clone().with_algorithm(Algorithm::Sha384);
    let outcome = fx.run(&switched);
    assert_eq!(
        outcome.reason,
        Some(FullReason::ConfigChanged { field: "algorithm" })
    );
    assert!(fx.artifact("aFile.txt.sha384").exists());
    assert!(
        !fx.artifact("aFile.txt.sha256").exists(),
        "sha256 artifact must be purged after switching algorithm"
    );
}

#[test]
fn removed_input_deletes_only_its_artifact() {
    let fx = Fixture::new();
    fx.write("foo.txt", "foo");
    let bar = fx.write("bar.txt", "bar");
    let config = fx.config();
    fx.run(&config);
    let foo_mtime = mtime(&fx.artifact("foo.txt.sha256"));

    fs::remove_file(bar).unwrap();
    let outcome = fx.run(&config);

    assert_eq!(outcome.report.mode, RunModeKind::Incremental);
    assert_eq!(outcome.report.removed(), 1);
    assert!(!fx.artifact("bar.txt.sha256").exists());
    assert!(fx.artifact("foo.txt.sha256").exists());
    assert_eq!(mtime(&fx.artifact("foo.txt.sha256")), foo_mtime);
}

#[test]
fn growing_tree_writes_only_new_artifacts() {
    let fx = Fixture::new();
    fx.write("foo.txt", "foo");
    fx.write("bar.txt", "bar");
    let config = fx.config();
    fx.run(&config);
    age_artifacts(&fx.out);
    let foo_mtime = mtime(&fx.artifact("foo.txt.sha256"));
    let bar_mtime = mtime(&fx.artifact("bar.txt.sha256"));

    fx.write("subdir/sub-foo.txt", "sub-foo");
    fx.write("baz.txt", "baz");
    let outcome = fx.run(&config);

    assert_eq!(outcome.report.mode, RunModeKind::Incremental);
    let written: Vec<_> = outcome
        .report
        .actions
        .iter()
        .filter_map(|a| match a {
            ArtifactAction::Written { path } => path.file_name().map(|n| n.to_owned()),
            _ => None,
        })
        .collect();
    assert_eq!(written.len(), 2);
    assert!(written.iter().any(|n| n == "sub-foo.txt.sha256"));
    assert!(written.iter().any(|n| n == "baz.txt.sha256"));
    assert_eq!(mtime(&fx.artifact("foo.txt.sha256")), foo_mtime);
    assert_eq!(mtime(&fx.artifact("bar.txt.sha256")), bar_mtime);
}

#[test]
fn modified_input_is_rehashed() {
    let fx = Fixture::new();
    let file = fx.write("aFile.txt", "draft");
    let config = fx.config().with_algorithm(Algorithm::Md5);
    fx.run(&config);

    fs::write(&file, HELLO).unwrap();
    let later = FileTime::from_system_time(SystemTime::now() + Duration::from_secs(60));
    set_file_mtime(&file, later).unwrap();
    let outcome = fx.run(&config);

    assert_eq!(outcome.report.mode, RunModeKind::Incremental);
    assert_eq!(outcome.report.written(), 1);
    assert_eq!(read(&fx.artifact("aFile.txt.md5")), HELLO_MD5);
}

#[test]
fn sha512_artifact_matches_reference_digest() {
    let fx = Fixture::new();
    fx.write("aFile.txt", HELLO);
    fx.run(&fx.config().with_algorithm(Algorithm::Sha512));
    assert_eq!(read(&fx.artifact("aFile.txt.sha512")), HELLO_SHA512);
}

#[test]
fn append_name_writes_digest_two_spaces_name() {
    let fx = Fixture::new();
    fx.write("foo.txt", HELLO);
    fx.run(&fx.config().with_append_name(true));
    assert_eq!(
        read(&fx.artifact("foo.txt.sha256")),
        format!("{HELLO_SHA256}  foo.txt")
    );
}

#[test]
fn toggling_append_name_rewrites_everything() {
    let fx = Fixture::new();
    fx.write("foo.txt", HELLO);
    let config = fx.config();
    fx.run(&config);

    let outcome = fx.run(&config.clone().with_append_name(true));
    assert_eq!(outcome.report.mode, RunModeKind::Full);
    assert!(read(&fx.artifact("foo.txt.sha256")).ends_with("  foo.txt"));
}

#[test]
fn deleted_artifact_triggers_full_regeneration() {
    let fx = Fixture::new();
    fx.write("foo.txt", "foo");
    fx.write("bar.txt", "bar");
    let config = fx.config();
    fx.run(&config);

    fs::remove_file(fx.artifact("bar.txt.sha256")).unwrap();
    let outcome = fx.run(&config);
    assert!(matches!(
        outcome.reason,
        Some(FullReason::OutputsChanged { .. })
    ));
    assert!(fx.artifact("bar.txt.sha256").exists());
}

#[test]
fn failed_run_leaves_partial_output_and_forces_full_next_time() {
    let fx = Fixture::new();
    fx.write("b.txt", "b");
    let config = fx.config();
    fx.run(&config);

    // A directory squatting on the artifact path makes the rename fail.
    fx.write("a.txt", "a");
    fx.write("c.txt", "c");
    let blocker = fx.artifact("a.txt.sha256");
    fs::create_dir_all(blocker.join("occupied")).unwrap();

    let err = pipeline::run(fx.home.path(), &config, RunOptions::default()).unwrap_err();
    assert!(matches!(err, SyncError::Io { .. }), "got: {err}");
    assert!(fx.artifact("b.txt.sha256").exists(), "earlier output stays");
    assert!(
        !fx.artifact("c.txt.sha256").exists(),
        "traversal stops at the first failure"
    );
    assert!(state::load_at(fx.home.path(), &config.output_dir)
        .unwrap()
        .is_none());

    fs::remove_dir_all(&blocker).unwrap();
    let outcome = fx.run(&config);
    assert_eq!(outcome.reason, Some(FullReason::NoPriorState));
    assert_eq!(outcome.report.written(), 3);
}

#[test]
fn output_dir_that_is_a_file_fails_before_processing() {
    let fx = Fixture::new();
    fx.write("foo.txt", "foo");
    fs::create_dir_all(fx.out.parent().unwrap()).unwrap();
    fs::write(&fx.out, "not a dir").unwrap();

    let err = pipeline::run(fx.home.path(), &fx.config(), RunOptions::default()).unwrap_err();
    assert!(matches!(err, SyncError::Config(_)), "got: {err}");
}

#[test]
fn same_length_rewrite_with_preserved_mtime_is_rehashed() {
    let fx = Fixture::new();
    let file = fx.write("aFile.txt", "aaaa");
    let stamp = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(600));
    set_file_mtime(&file, stamp).unwrap();
    let config = fx.config();
    fx.run(&config);

    fs::write(&file, "bbbb").unwrap();
    set_file_mtime(&file, stamp).unwrap();
    let outcome = fx.run(&config);

    assert_eq!(outcome.report.mode, RunModeKind::Incremental);
    assert_eq!(outcome.report.written(), 1);
    assert_eq!(
        read(&fx.artifact("aFile.txt.sha256")),
        "81cc5b17018674b401b42f35ba07bb79e211239c23bffe658da1577e3e646877"
    );
}

#[test]
fn touching_an_input_without_changing_it_writes_nothing() {
    let fx = Fixture::new();
    let file = fx.write("foo.txt", "foo");
    let config = fx.config();
    fx.run(&config);

    let later = FileTime::from_system_time(SystemTime::now() + Duration::from_secs(60));
    set_file_mtime(&file, later).unwrap();
    let outcome = fx.run(&config);

    assert_eq!(outcome.report.mode, RunModeKind::Incremental);
    assert_eq!(outcome.report.mutations(), 0);
}
