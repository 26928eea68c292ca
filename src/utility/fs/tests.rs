// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::copy::{copy_dir_contents, replace_dir, replace_dir_with_copy, stage_beside};
use super::walk::{WalkOptions, walk_sorted};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn tree(root: &Path) {
    fs::create_dir_all(root.join("mod-a/src")).unwrap();
    fs::create_dir_all(root.join("mod-a/build/classes")).unwrap();
    fs::create_dir_all(root.join("mod-b/nested/build")).unwrap();
    fs::write(root.join("mod-a/src/Main.java"), "class Main {}").unwrap();
    fs::write(root.join("mod-a/build/classes/Main.class"), "bin").unwrap();
    fs::write(root.join("mod-b/nested/build/out.jar"), "jar").unwrap();
    fs::write(root.join("mod-b/.hidden"), "h").unwrap();
    fs::write(root.join("mod-b/build.gradle"), "plugins {}").unwrap();
}

fn file_names(root: &Path, options: &WalkOptions) -> Vec<String> {
    walk_sorted(root, options)
        .unwrap()
        .iter()
        .filter(|e| !e.is_dir())
        .map(super::walk::WalkEntry::relative_slash)
        .collect()
}

#[test]
fn test_walk_sorted_includes_hidden_and_ignored() {
    let temp = temp_dir();
    tree(temp.path());
    fs::write(temp.path().join(".gitignore"), "mod-a/\n").unwrap();

    insta::assert_snapshot!(file_names(temp.path(), &WalkOptions::default()).join("\n"), @r"
    .gitignore
    mod-a/build/classes/Main.class
    mod-a/src/Main.java
    mod-b/.hidden
    mod-b/build.gradle
    mod-b/nested/build/out.jar
    ");
}

#[test]
fn test_walk_sorted_prunes_at_any_depth() {
    let temp = temp_dir();
    tree(temp.path());

    insta::assert_snapshot!(file_names(temp.path(), &WalkOptions::pruning("build")).join("\n"), @r"
    mod-a/src/Main.java
    mod-b/.hidden
    mod-b/build.gradle
    ");
}

#[test]
fn test_walk_sorted_missing_root() {
    let temp = temp_dir();
    assert!(walk_sorted(temp.path().join("nope"), &WalkOptions::default()).is_err());
}

#[test]
fn test_copy_dir_contents_prunes() {
    let temp = temp_dir();
    let src = temp.path().join("src");
    let dst = temp.path().join("dst");
    tree(&src);

    let copied = copy_dir_contents(&src, &dst, &WalkOptions::pruning("build")).unwrap();
    assert_eq!(copied, 3);
    assert!(dst.join("mod-a/src/Main.java").is_file());
    assert!(dst.join("mod-b/build.gradle").is_file());
    assert!(!dst.join("mod-a/build").exists());
    assert!(!dst.join("mod-b/nested/build").exists());
    // Parent of a pruned directory still exists.
    assert!(dst.join("mod-b/nested").is_dir());
}

#[cfg(unix)]
#[test]
fn test_copy_preserves_executable_bit() {
    use std::os::unix::fs::PermissionsExt;

    let temp = temp_dir();
    let src = temp.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("gradlew"), "#!/bin/sh\n").unwrap();
    fs::set_permissions(src.join("gradlew"), fs::Permissions::from_mode(0o755)).unwrap();

    let dst = temp.path().join("out");
    assert_eq!(copy_dir_contents(&src, &dst, &WalkOptions::default()).unwrap(), 1);
    let mode = fs::metadata(dst.join("gradlew")).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
}

#[test]
fn test_replace_dir_swaps_contents() {
    let temp = temp_dir();
    let target = temp.path().join("releases/1.0.0");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("stale.zip"), "old").unwrap();

    let staging = stage_beside(&target).unwrap();
    assert_eq!(staging.path().parent(), target.parent());
    let staged = staging.path().join("new");
    fs::create_dir_all(&staged).unwrap();
    fs::write(staged.join("fresh.zip"), "new").unwrap();

    replace_dir(&staged, &target).unwrap();
    assert!(target.join("fresh.zip").is_file());
    assert!(!target.join("stale.zip").exists());

    drop(staging);
    let leftovers: Vec<_> = fs::read_dir(temp.path().join("releases"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("1.0.0")]);
}

#[test]
fn test_replace_dir_creates_missing_target() {
    let temp = temp_dir();
    let target = temp.path().join("latest");
    let staging = stage_beside(&target).unwrap();
    let staged = staging.path().join("new");
    fs::create_dir_all(&staged).unwrap();
    fs::write(staged.join("versions.json"), "{}").unwrap();

    replace_dir(&staged, &target).unwrap();
    assert_eq!(fs::read_to_string(target.join("versions.json")).unwrap(), "{}");
}

#[test]
fn test_replace_dir_failure_keeps_old_contents() {
    let temp = temp_dir();
    let target = temp.path().join("latest");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("keep.txt"), "old").unwrap();

    let missing = temp.path().join("never-staged");
    assert!(replace_dir(&missing, &target).is_err());
    assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "old");
}

#[test]
fn test_replace_dir_with_copy() {
    let temp = temp_dir();
    let src = temp.path().join("src");
    tree(&src);
    let target = temp.path().join("mirror");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("old.txt"), "x").unwrap();

    replace_dir_with_copy(&src, &target, &WalkOptions::default()).unwrap();
    assert!(!target.join("old.txt").exists());
    assert!(target.join("mod-b/nested/build/out.jar").is_file());
}
