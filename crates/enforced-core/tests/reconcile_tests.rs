//! Reconciler scenarios against recorded attribute writes

use std::fs::{self, Permissions};
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::sync::Arc;

use enforced_core::{Action, FileEvent, Reconciler};
use enforced_fs::{FileKind, FileStat, Mode};
use enforced_policy::{FolderSpec, PolicyTree, StaticIds, TreeBuilder};
use enforced_test_utils::{Call, RecordingWriter, TestTree};
use pretty_assertions::assert_eq;
use rstest::rstest;

const ADM: u32 = 4;

fn ids() -> StaticIds {
    StaticIds::new()
        .with_user("adm", ADM)
        .with_user("www-data", 33)
        .with_group("www-editors", 2001)
}

fn tree(specs: &[FolderSpec]) -> Arc<PolicyTree> {
    Arc::new(TreeBuilder::new(&ids()).build(specs).unwrap())
}

fn folder2() -> Arc<PolicyTree> {
    tree(&[FolderSpec::new("/lib/folder2").user("adm").file_perms("664")])
}

fn observed(path: &str, kind: FileKind, uid: u32, gid: u32, mode: u32) -> FileEvent {
    FileEvent::new(
        path,
        FileStat {
            uid,
            gid,
            mode: Mode::from_bits(mode),
            kind,
        },
    )
}

#[test]
fn test_file_gets_owner_and_mode() {
    let writer = RecordingWriter::new();
    let reconciler = Reconciler::new(folder2(), writer.clone());

    let report = reconciler.reconcile(&observed("/lib/folder2/a", FileKind::Regular, 0, 0, 0o644));

    assert_eq!(
        writer.calls(),
        vec![
            Call::set_mode("/lib/folder2/a", 0o664),
            Call::set_owner("/lib/folder2/a", ADM, 0),
        ]
    );
    assert_eq!(
        report.actions,
        vec![
            Action::Chmod {
                mode: Mode::from_bits(0o664)
            },
            Action::Chown { uid: ADM, gid: 0 },
        ]
    );
    assert!(report.errors.is_empty());
}

#[test]
fn test_dry_run_reports_without_writing() {
    let writer = RecordingWriter::new();
    let reconciler = Reconciler::new(folder2(), writer.clone()).dry_run(true);

    let report = reconciler.reconcile(&observed("/lib/folder2/a", FileKind::Regular, 0, 0, 0o644));

    assert!(writer.calls().is_empty());
    assert_eq!(report.actions.len(), 2);
}

#[test]
fn test_unrelated_path_is_left_alone() {
    let writer = RecordingWriter::new();
    let reconciler = Reconciler::new(
        tree(&[
            FolderSpec::new("/var").user("www-data").dir_perms("775"),
            FolderSpec::new("/var/site").group("www-editors"),
        ]),
        writer.clone(),
    );

    for mode in [0o000, 0o644, 0o777] {
        let report = reconciler.reconcile(&observed("/lib/x", FileKind::Regular, 7, 7, mode));
        assert!(report.is_clean());
    }
    assert!(writer.calls().is_empty());
}

#[rstest]
#[case::symlink(FileKind::Symlink)]
#[case::special(FileKind::Special)]
fn test_unmanaged_kinds_are_skipped(#[case] kind: FileKind) {
    let writer = RecordingWriter::new();
    let reconciler = Reconciler::new(folder2(), writer.clone());

    let report = reconciler.reconcile(&observed("/lib/folder2/link", kind, 0, 0, 0o777));

    assert!(report.skipped);
    assert!(writer.calls().is_empty());
}

#[test]
fn test_matching_entry_needs_nothing() {
    let writer = RecordingWriter::new();
    let reconciler = Reconciler::new(folder2(), writer.clone());

    let report = reconciler.reconcile(&observed("/lib/folder2/a", FileKind::Regular, ADM, 50, 0o664));

    assert!(report.is_clean());
    assert!(!report.skipped);
    assert!(writer.calls().is_empty());
}

#[test]
fn test_setgid_directory_with_matching_bits_is_left_alone() {
    let fs_tree = TestTree::new();
    let shared = fs_tree.dir("srv/shared", 0o775);
    fs::set_permissions(&shared, Permissions::from_mode(0o2775)).unwrap();
    if fs::symlink_metadata(&shared).unwrap().mode() & 0o2000 == 0 {
        eprintln!("Skipping test: the setgid bit was dropped by the filesystem");
        return;
    }
    let writer = RecordingWriter::new();
    let policy = tree(&[FolderSpec::new(fs_tree.path("srv").to_string_lossy()).dir_perms("775")]);
    let reconciler = Reconciler::new(policy, writer.clone());

    let report = reconciler.reconcile(&FileEvent::observe(&shared).unwrap());

    assert!(report.is_clean());
    assert!(writer.calls().is_empty());
}

#[test]
fn test_reconcile_on_disk_is_idempotent() {
    let fs_tree = TestTree::new();
    let path = fs_tree.file("data/report.csv", 0o600);
    let uid = FileStat::lstat(&path).unwrap().uid;
    let base = fs_tree.path("data");
    let policy = tree(&[FolderSpec::new(base.to_string_lossy()).file_perms("640")]);
    let reconciler = Reconciler::new(policy, enforced_fs::SystemAttributes);

    let first = reconciler.reconcile(&FileEvent::observe(&path).unwrap());
    let second = reconciler.reconcile(&FileEvent::observe(&path).unwrap());

    assert_eq!(
        first.actions,
        vec![Action::Chmod {
            mode: Mode::from_bits(0o640)
        }]
    );
    assert!(second.is_clean());
    assert_eq!(fs_tree.mode_of("data/report.csv"), 0o640);
    assert_eq!(FileStat::lstat(&path).unwrap().uid, uid);
}
