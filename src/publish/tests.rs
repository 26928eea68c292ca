// evermod: EverMod Workspace Release Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{BranchPublisher, TagOutcome, TagStrategy, Tagger, settle};
use crate::config::types::{PublishConfig, TagConfig};
use crate::error::{EvermodError, GitError};
use crate::git::Repository;
use crate::release::tag::ReleaseTag;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(path: &Path) {
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    git(path, &["config", "tag.gpgSign", "false"]);
    git(path, &["config", "user.signingkey", ""]);
}

/// Bare remote plus a clone on `main` that has pushed one commit.
struct Fixture {
    temp: TempDir,
    remote: PathBuf,
    work: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let remote = temp.path().join("remote.git");
        let work = temp.path().join("work");
        fs::create_dir_all(&remote).unwrap();
        fs::create_dir_all(&work).unwrap();

        git(&remote, &["init", "--bare", "--quiet"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&work, &["init", "--quiet"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        configure_identity(&work);
        fs::write(work.join("README.md"), "workspace\n").unwrap();
        git(&work, &["add", "README.md"]);
        git(&work, &["commit", "-m", "Initial commit", "--quiet"]);
        git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);
        git(&work, &["push", "--quiet", "-u", "origin", "main"]);

        Self { temp, remote, work }
    }

    fn repo(&self) -> Repository {
        Repository::open(&self.work, "origin").unwrap()
    }

    /// Local build output `releases/<tag>/` with a marker file.
    fn build_release(&self, tag: &str) -> PathBuf {
        let dir = self.work.join("releases").join(tag);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("version.txt"), tag).unwrap();
        fs::write(dir.join("versions.json"), format!("{{\"version\":\"{tag}\"}}\n")).unwrap();
        dir
    }

    fn show(&self, rev: &str) -> String {
        git(&self.remote, &["show", rev])
    }

    fn remote_has(&self, args: &[&str]) -> bool {
        !git(&self.remote, args).is_empty()
    }
}

fn tag(value: &str) -> ReleaseTag {
    ReleaseTag::new(value).unwrap()
}

#[test]
fn test_ensure_branch_creates_once() {
    let fixture = Fixture::new();
    let repo = fixture.repo();
    let config = PublishConfig::default();
    let publisher = BranchPublisher::new(&repo, &config, "releases");

    assert!(publisher.ensure_branch().unwrap());
    assert!(!publisher.ensure_branch().unwrap());

    assert_eq!(repo.current_branch().unwrap(), "main");
    assert!(fixture.remote_has(&["branch", "--list", "releases"]));
    assert!(
        git(&fixture.remote, &["ls-tree", "releases"]).is_empty(),
        "publishing branch must start with an empty tree"
    );
    assert_eq!(
        git(&fixture.remote, &["log", "--format=%s", "releases"]),
        "Initialize empty releases branch"
    );
}

#[test]
fn test_publish_stable_updates_latest() {
    let fixture = Fixture::new();
    let repo = fixture.repo();
    let config = PublishConfig::default();
    let publisher = BranchPublisher::new(&repo, &config, "releases");
    let local = fixture.build_release("1.0.0");

    let outcome = publisher.publish(&tag("1.0.0"), &local).unwrap();

    assert!(outcome.branch_created);
    assert!(outcome.latest_updated);
    assert_eq!(outcome.commit.as_deref(), Some("Release 1.0.0 (stable)"));
    assert_eq!(fixture.show("releases:releases/1.0.0/version.txt"), "1.0.0");
    assert_eq!(fixture.show("releases:releases/latest/version.txt"), "1.0.0");

    assert_eq!(repo.current_branch().unwrap(), "main");
    assert_eq!(fs::read_to_string(local.join("version.txt")).unwrap(), "1.0.0");
    assert!(!fixture.work.join("releases").join("latest").exists());
}

#[test]
fn test_publish_prerelease_keeps_latest() {
    let fixture = Fixture::new();
    let repo = fixture.repo();
    let config = PublishConfig::default();
    let publisher = BranchPublisher::new(&repo, &config, "releases");

    let stable = fixture.build_release("1.0.0");
    publisher.publish(&tag("1.0.0"), &stable).unwrap();
    fs::remove_dir_all(&stable).unwrap();

    let beta = fixture.build_release("1.1.0-beta.1");
    let outcome = publisher.publish(&tag("1.1.0-beta.1"), &beta).unwrap();

    assert!(!outcome.branch_created);
    assert!(!outcome.latest_updated);
    assert_eq!(
        outcome.commit.as_deref(),
        Some("Release 1.1.0-beta.1 (pre-release)")
    );
    assert_eq!(
        fixture.show("releases:releases/1.1.0-beta.1/version.txt"),
        "1.1.0-beta.1"
    );
    assert_eq!(fixture.show("releases:releases/latest/version.txt"), "1.0.0");
    assert_eq!(repo.current_branch().unwrap(), "main");
}

#[test]
fn test_publish_replaces_stale_release_contents() {
    let fixture = Fixture::new();
    let repo = fixture.repo();
    let config = PublishConfig::default();
    let publisher = BranchPublisher::new(&repo, &config, "releases");

    let local = fixture.build_release("1.0.0");
    fs::write(local.join("stale.txt"), "old").unwrap();
    publisher.publish(&tag("1.0.0"), &local).unwrap();

    fs::remove_file(local.join("stale.txt")).unwrap();
    fs::write(local.join("version.txt"), "1.0.0 rebuilt").unwrap();
    let outcome = publisher.publish(&tag("1.0.0"), &local).unwrap();

    assert!(outcome.commit.is_some());
    let tree = fixture.show("releases:releases/1.0.0/");
    assert!(!tree.contains("stale.txt"), "{tree}");
    assert_eq!(
        fixture.show("releases:releases/latest/version.txt"),
        "1.0.0 rebuilt"
    );
}

#[test]
fn test_republish_identical_skips_commit() {
    let fixture = Fixture::new();
    let repo = fixture.repo();
    let config = PublishConfig::default();
    let publisher = BranchPublisher::new(&repo, &config, "releases");
    let local = fixture.build_release("1.0.0");

    publisher.publish(&tag("1.0.0"), &local).unwrap();
    let before = git(&fixture.remote, &["rev-parse", "releases"]);

    let outcome = publisher.publish(&tag("1.0.0"), &local).unwrap();

    assert_eq!(outcome.commit, None);
    assert_eq!(git(&fixture.remote, &["rev-parse", "releases"]), before);
    assert_eq!(repo.current_branch().unwrap(), "main");
    assert!(local.join("versions.json").is_file());
}

#[test]
fn test_publish_from_fresh_clone_reuses_remote_branch() {
    let fixture = Fixture::new();
    let config = PublishConfig::default();
    {
        let repo = fixture.repo();
        let local = fixture.build_release("1.0.0");
        BranchPublisher::new(&repo, &config, "releases")
            .publish(&tag("1.0.0"), &local)
            .unwrap();
    }

    let clone = fixture.temp.path().join("clone");
    git(
        fixture.temp.path(),
        &["clone", "--quiet", fixture.remote.to_str().unwrap(), "clone"],
    );
    configure_identity(&clone);
    git(&clone, &["checkout", "--quiet", "main"]);
    let local = clone.join("releases").join("1.0.1");
    fs::create_dir_all(&local).unwrap();
    fs::write(local.join("version.txt"), "1.0.1").unwrap();

    let repo = Repository::open(&clone, "origin").unwrap();
    let outcome = BranchPublisher::new(&repo, &config, "releases")
        .publish(&tag("1.0.1"), &local)
        .unwrap();

    assert!(!outcome.branch_created);
    assert_eq!(fixture.show("releases:releases/1.0.0/version.txt"), "1.0.0");
    assert_eq!(fixture.show("releases:releases/latest/version.txt"), "1.0.1");
}

#[test]
fn test_publish_missing_source_fails_before_git() {
    let fixture = Fixture::new();
    let repo = fixture.repo();
    let config = PublishConfig::default();
    let publisher = BranchPublisher::new(&repo, &config, "releases");

    let err = publisher
        .publish(&tag("1.0.0"), &fixture.work.join("releases").join("1.0.0"))
        .unwrap_err();

    assert!(err.to_string().contains("directory not found"), "{err}");
    assert!(matches!(err.downcast_ref::<EvermodError>(), Some(EvermodError::Release(_))));
    assert!(git(&fixture.remote, &["branch", "--list", "releases"]).is_empty());
}

#[cfg(unix)]
#[test]
fn test_publish_rejected_push_keeps_local_releases() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = Fixture::new();
    let repo = fixture.repo();
    let config = PublishConfig::default();
    let publisher = BranchPublisher::new(&repo, &config, "releases");
    publisher.ensure_branch().unwrap();
    let hook = fixture.remote.join("hooks/pre-receive");
    fs::write(&hook, "#!/bin/sh\necho rejected >&2\nexit 1\n").unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();
    let local = fixture.build_release("1.0.0");

    let err = publisher.publish(&tag("1.0.0"), &local).unwrap_err();

    assert!(format!("{err:#}").contains("git push"), "{err:#}");
    assert_eq!(repo.current_branch().unwrap(), "main");
    assert_eq!(fs::read_to_string(local.join("version.txt")).unwrap(), "1.0.0");
    assert!(git(&fixture.remote, &["ls-tree", "releases"]).is_empty());
}

#[test]
fn test_settle_prefers_publish_failure() {
    let published: anyhow::Result<()> = Err(EvermodError::from(GitError::CommandFailed {
        command: "git push --quiet origin releases".to_string(),
        code: Some(1),
        message: "rejected".to_string(),
    })
    .into());
    let restored = Err(anyhow::anyhow!("failed to move releases back"));

    let err = settle(published, restored).unwrap_err();

    assert!(err.to_string().contains("git push"), "{err}");
    assert!(matches!(err.downcast_ref::<EvermodError>(), Some(EvermodError::Git(_))));
}

#[test]
fn test_settle_reports_restore_failure_after_success() {
    let err = settle(Ok(1), Err(anyhow::anyhow!("failed to move releases back"))).unwrap_err();
    assert_eq!(err.to_string(), "failed to move releases back");
}

#[test]
fn test_tag_created_and_pushed() {
    let fixture = Fixture::new();
    let repo = fixture.repo();
    let config = TagConfig::default();
    let tagger = Tagger::new(&repo, &config);

    let outcome = tagger
        .tag(&tag("1.0.0"), false, &|_: &str| -> bool {
            panic!("no prompt on the main branch")
        })
        .unwrap();

    assert_eq!(
        outcome,
        TagOutcome::Created {
            name: "v1.0.0".to_string(),
            branch: "main".to_string(),
            signed: false,
        }
    );
    assert_eq!(
        git(&fixture.remote, &["tag", "-l", "--format=%(contents:subject)", "v1.0.0"]),
        "EverMod 1.0.0 release"
    );
}

#[cfg(unix)]
#[test]
fn test_tag_failed_signing_falls_back_to_unsigned() {
    let fixture = Fixture::new();
    git(&fixture.work, &["config", "user.signingkey", "ABCDEF"]);
    git(&fixture.work, &["config", "gpg.program", "false"]);
    let repo = fixture.repo();
    assert_eq!(TagStrategy::probe(&repo), TagStrategy::Signed);

    let config = TagConfig::default();
    let outcome = Tagger::new(&repo, &config)
        .tag(&tag("1.0.0"), false, &|_: &str| false)
        .unwrap();

    assert_eq!(
        outcome,
        TagOutcome::Created {
            name: "v1.0.0".to_string(),
            branch: "main".to_string(),
            signed: false,
        }
    );
    assert_eq!(git(&fixture.remote, &["cat-file", "-t", "v1.0.0"]), "tag");
    assert_eq!(
        git(&fixture.remote, &["tag", "-l", "--format=%(contents:subject)", "v1.0.0"]),
        "EverMod 1.0.0 release"
    );
}

#[test]
fn test_tag_unknown_signing_key_falls_back_to_unsigned() {
    let fixture = Fixture::new();
    git(&fixture.work, &["config", "user.signingkey", "DEADBEEFNOSUCHKEY"]);
    let repo = fixture.repo();
    let config = TagConfig::default();

    let outcome = Tagger::new(&repo, &config)
        .tag(&tag("1.0.0"), false, &|_: &str| false)
        .unwrap();

    assert!(matches!(outcome, TagOutcome::Created { signed: false, .. }));
    assert_eq!(git(&fixture.remote, &["tag", "-l", "v1.0.0"]), "v1.0.0");
}

#[test]
fn test_tag_existing_is_noop() {
    let fixture = Fixture::new();
    let repo = fixture.repo();
    let config = TagConfig::default();
    let tagger = Tagger::new(&repo, &config);
    let decline = |_: &str| false;

    tagger.tag(&tag("1.0.0"), false, &decline).unwrap();
    let target = git(&fixture.work, &["rev-parse", "v1.0.0"]);

    fs::write(fixture.work.join("README.md"), "changed\n").unwrap();
    git(&fixture.work, &["commit", "-am", "Later commit", "--quiet"]);

    let outcome = tagger.tag(&tag("1.0.0"), false, &decline).unwrap();
    assert_eq!(
        outcome,
        TagOutcome::AlreadyExists {
            name: "v1.0.0".to_string()
        }
    );
    assert_eq!(git(&fixture.work, &["rev-parse", "v1.0.0"]), target);
}

#[test]
fn test_tag_keeps_v_prefix_single() {
    let fixture = Fixture::new();
    let repo = fixture.repo();
    let config = TagConfig::default();

    let outcome = Tagger::new(&repo, &config)
        .tag(&tag("v2.0.0"), true, &|_: &str| false)
        .unwrap();

    assert!(matches!(outcome, TagOutcome::Created { ref name, .. } if name == "v2.0.0"));
}

#[test]
fn test_tag_declined_stays_on_current_branch() {
    let fixture = Fixture::new();
    git(&fixture.work, &["checkout", "--quiet", "-b", "side"]);
    git(&fixture.work, &["commit", "--allow-empty", "-m", "Side", "--quiet"]);
    let side_head = git(&fixture.work, &["rev-parse", "HEAD"]);

    let repo = fixture.repo();
    let config = TagConfig::default();
    let outcome = Tagger::new(&repo, &config)
        .tag(&tag("1.0.0"), false, &|_: &str| false)
        .unwrap();

    assert!(matches!(outcome, TagOutcome::Created { ref branch, .. } if branch == "side"));
    assert_eq!(git(&fixture.work, &["rev-parse", "v1.0.0^{commit}"]), side_head);
    assert_eq!(repo.current_branch().unwrap(), "side");
}

#[test]
fn test_tag_accepted_retargets_main_and_restores() {
    let fixture = Fixture::new();
    let main_head = git(&fixture.work, &["rev-parse", "HEAD"]);
    git(&fixture.work, &["checkout", "--quiet", "-b", "side"]);
    git(&fixture.work, &["commit", "--allow-empty", "-m", "Side", "--quiet"]);

    let repo = fixture.repo();
    let config = TagConfig::default();
    let outcome = Tagger::new(&repo, &config)
        .tag(&tag("1.0.0"), false, &|question: &str| {
            assert!(question.contains("'main'"), "{question}");
            true
        })
        .unwrap();

    assert!(matches!(outcome, TagOutcome::Created { ref branch, .. } if branch == "main"));
    assert_eq!(git(&fixture.work, &["rev-parse", "v1.0.0^{commit}"]), main_head);
    assert_eq!(repo.current_branch().unwrap(), "side");
}

#[test]
fn test_tag_auto_targets_main_without_prompt() {
    let fixture = Fixture::new();
    git(&fixture.work, &["checkout", "--quiet", "-b", "side"]);

    let repo = fixture.repo();
    let config = TagConfig::default();
    let outcome = Tagger::new(&repo, &config)
        .tag(&tag("1.0.0-rc.1"), true, &|_: &str| -> bool {
            panic!("auto mode must not prompt")
        })
        .unwrap();

    assert!(matches!(outcome, TagOutcome::Created { ref branch, .. } if branch == "main"));
    assert_eq!(repo.current_branch().unwrap(), "side");
}

#[test]
fn test_probe_without_signing_key_is_unsigned() {
    let fixture = Fixture::new();
    assert_eq!(TagStrategy::probe(&fixture.repo()), TagStrategy::Unsigned);
}

#[test]
fn test_probe_with_key_and_program_is_signed() {
    let fixture = Fixture::new();
    git(&fixture.work, &["config", "user.signingkey", "ABCDEF"]);
    git(&fixture.work, &["config", "gpg.program", "git"]);

    assert_eq!(TagStrategy::probe(&fixture.repo()), TagStrategy::Signed);
}

#[test]
fn test_probe_with_missing_program_is_unsigned() {
    let fixture = Fixture::new();
    git(&fixture.work, &["config", "user.signingkey", "ABCDEF"]);
    git(&fixture.work, &["config", "gpg.format", "ssh"]);
    git(
        &fixture.work,
        &["config", "gpg.ssh.program", "evermod-no-such-signer"],
    );

    assert_eq!(TagStrategy::probe(&fixture.repo()), TagStrategy::Unsigned);
}
