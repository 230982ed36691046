//! End-to-end tests for the enforcement loop
//!
//! These exercise the complete flow: config file -> policy tree -> base
//! folders -> initial sweep -> watcher-driven corrections.

use std::fs::{self, DirBuilder};
use std::os::unix::fs::DirBuilderExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use enforced_core::{EnforceOptions, Enforcer, Error, accessible_folders};
use enforced_fs::{AttributeWriter, SystemAttributes};
use enforced_policy::{EnforcerConfig, FolderSpec, PolicyTree, StaticIds, TreeBuilder};
use enforced_test_utils::{Call, RecordingWriter, TestTree};
use pretty_assertions::assert_eq;

const SETTLE: Duration = Duration::from_secs(10);

/// `site/` with drifted modes, plus a file outside it reached by a symlink.
fn site_tree() -> TestTree {
    let tree = TestTree::new();
    tree.dir("outside", 0o755);
    tree.file("outside/secret", 0o600);
    tree.dir("site", 0o700);
    tree.file("site/index.html", 0o600);
    tree.dir("site/assets", 0o700);
    tree.file("site/assets/app.css", 0o640);
    tree.symlink("site/link", &tree.path("outside/secret"));
    tree
}

fn load_policy(tree: &TestTree) -> (Arc<PolicyTree>, Vec<PathBuf>) {
    let config_path = tree.write(
        "enforced.yaml",
        &format!(
            "folders:\n  - path: {}\n    file_perms: \"644\"\n    dir_perms: \"755\"\n",
            tree.path("site").display()
        ),
    );
    let config = EnforcerConfig::load(&config_path).unwrap();
    let policy = TreeBuilder::new(&StaticIds::new())
        .build(&config.folders)
        .unwrap();
    let folders = accessible_folders(&policy.require_base_folders().unwrap());
    (Arc::new(policy), folders)
}

fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

struct Running {
    shutdown: Sender<()>,
    handle: JoinHandle<enforced_core::Result<()>>,
}

impl Running {
    fn start<W: AttributeWriter + 'static>(
        policy: Arc<PolicyTree>,
        writer: W,
        folders: Vec<PathBuf>,
        dry_run: bool,
    ) -> Self {
        let (shutdown, shutdown_rx) = crossbeam_channel::bounded(1);
        let options = EnforceOptions {
            dry_run,
            ..EnforceOptions::default()
        };
        let handle = thread::spawn(move || {
            Enforcer::new(policy, writer, options).run(&folders, shutdown_rx)
        });
        Self { shutdown, handle }
    }

    fn stop(self) {
        self.shutdown.send(()).unwrap();
        self.handle.join().unwrap().unwrap();
    }
}

#[test]
fn test_initial_sweep_and_live_corrections() {
    let tree = site_tree();
    let (policy, folders) = load_policy(&tree);
    assert_eq!(folders, vec![tree.path("site")]);

    let running = Running::start(policy, SystemAttributes, folders, false);

    // Initial sweep
    assert!(tree.wait_for_mode("site", 0o755, SETTLE));
    assert!(tree.wait_for_mode("site/index.html", 0o644, SETTLE));
    assert!(tree.wait_for_mode("site/assets", 0o755, SETTLE));
    assert!(tree.wait_for_mode("site/assets/app.css", 0o644, SETTLE));

    // New file
    tree.file("site/new.txt", 0o600);
    assert!(tree.wait_for_mode("site/new.txt", 0o644, SETTLE));

    // New nested directories and a file inside them
    fs::create_dir_all(tree.path("site/assets/img/icons")).unwrap();
    tree.file("site/assets/img/icons/logo.svg", 0o600);
    assert!(tree.wait_for_mode("site/assets/img", 0o755, SETTLE));
    assert!(tree.wait_for_mode("site/assets/img/icons", 0o755, SETTLE));
    assert!(tree.wait_for_mode("site/assets/img/icons/logo.svg", 0o644, SETTLE));

    // Drift on an existing file
    tree.chmod("site/index.html", 0o666);
    assert!(tree.wait_for_mode("site/index.html", 0o644, SETTLE));

    // Drift inside a directory that was created after startup
    tree.chmod("site/assets/img/icons/logo.svg", 0o600);
    assert!(tree.wait_for_mode("site/assets/img/icons/logo.svg", 0o644, SETTLE));

    running.stop();

    // The symlink target is outside every rule and never touched
    assert_eq!(tree.mode_of("outside/secret"), 0o600);
}

#[test]
fn test_initial_sweep_goes_through_the_writer() {
    let tree = site_tree();
    let (policy, folders) = load_policy(&tree);
    let writer = RecordingWriter::new();

    // run() drains the queue before returning, so an immediate shutdown still
    // sees the whole sweep.
    Running::start(policy, writer.clone(), folders, false).stop();

    assert_eq!(
        writer.calls(),
        vec![
            Call::set_mode(tree.path("site"), 0o755),
            Call::set_mode(tree.path("site/assets"), 0o755),
            Call::set_mode(tree.path("site/assets/app.css"), 0o644),
            Call::set_mode(tree.path("site/index.html"), 0o644),
        ]
    );
    assert_eq!(tree.mode_of("site/index.html"), 0o600);
}

#[test]
fn test_dry_run_changes_nothing() {
    let tree = site_tree();
    let (policy, folders) = load_policy(&tree);
    let writer = RecordingWriter::new();

    Running::start(policy, writer.clone(), folders, true).stop();

    assert!(writer.calls().is_empty());
    assert_eq!(tree.mode_of("site"), 0o700);
    assert_eq!(tree.mode_of("site/index.html"), 0o600);
}

#[test]
fn test_missing_base_folder_is_dropped() {
    let tree = TestTree::new();
    let config_path = tree.write(
        "enforced.json",
        &format!(
            r#"{{"folders": [{{"path": "{}", "file_perms": "600"}}]}}"#,
            tree.path("not-yet").display()
        ),
    );
    let config = EnforcerConfig::load(&config_path).unwrap();
    let policy = TreeBuilder::new(&StaticIds::new())
        .build(&config.folders)
        .unwrap();

    let folders = accessible_folders(&policy.require_base_folders().unwrap());

    assert!(folders.is_empty());
}

#[test]
fn test_unreadable_entry_in_initial_sweep_ends_the_loop() {
    if is_root() {
        eprintln!("Skipping test: running as root bypasses permission checks");
        return;
    }
    let tree = TestTree::new();
    tree.dir("site", 0o755);
    tree.file("site/sealed/inner.txt", 0o600);
    // Listable but not searchable: the walker can read the name of
    // inner.txt but cannot lstat it.
    tree.chmod("site/sealed", 0o600);

    let policy = TreeBuilder::new(&StaticIds::new())
        .build(&[FolderSpec::new(tree.path("site").display().to_string()).file_perms("644")])
        .unwrap();
    let folders = vec![tree.path("site")];
    let (_shutdown, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let result = Enforcer::new(Arc::new(policy), RecordingWriter::new(), EnforceOptions::default())
            .run(&folders, shutdown_rx);
        let _ = done_tx.send(result);
    });

    let result = done_rx.recv_timeout(SETTLE);
    tree.chmod("site/sealed", 0o755);

    let result = result.expect("loop should stop on its own");
    assert!(matches!(result, Err(Error::Walk { .. })), "got {result:?}");
}

#[test]
fn test_unreadable_new_directory_does_not_stop_the_loop() {
    let tree = site_tree();
    let (policy, folders) = load_policy(&tree);
    let running = Running::start(policy, SystemAttributes, folders, false);
    assert!(tree.wait_for_mode("site/assets", 0o755, SETTLE));

    // Neither watchable nor walkable when created; the reconciler still
    // fixes the directory itself.
    DirBuilder::new()
        .mode(0o000)
        .create(tree.path("site/sealed"))
        .unwrap();
    assert!(tree.wait_for_mode("site/sealed", 0o755, SETTLE));

    tree.file("site/after.txt", 0o600);
    assert!(tree.wait_for_mode("site/after.txt", 0o644, SETTLE));

    running.stop();
}
