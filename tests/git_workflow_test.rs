// tests/git_workflow_test.rs
//
// End-to-end runs against real repositories: a bare "remote" plus a working
// clone, driven by the system git binary.
use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;
use note_publish::config::Config;
use note_publish::git::{head_commit, PublishLock};
use note_publish::publish::mock::{Journal, MockPrompt, MockUi};
use note_publish::publish::{FlowOutcome, PublishState, Publisher, RunOutcome, Step, Trigger};
use note_publish::runner::{run_shell, SystemRunner};
use note_publish::PublishError;
use tempfile::TempDir;

struct Fixture {
    _root: TempDir,
    remote: PathBuf,
    site: PathBuf,
    notes: PathBuf,
}

fn sh(command: &str, cwd: &Path) {
    run_shell(command, cwd).unwrap_or_else(|e| panic!("`{}` failed: {}", command, e));
}

/// A working repo on `master` tracking `origin/master`, with one commit.
fn clone_with_upstream(remote: &Path, dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    sh("git init -q", dir);
    sh("git symbolic-ref HEAD refs/heads/master", dir);
    sh("git config user.email tester@example.com", dir);
    sh("git config user.name Tester", dir);
    sh("git config commit.gpgsign false", dir);
    sh("git config pull.rebase false", dir);
    sh(&format!("git remote add origin '{}'", remote.display()), dir);
    sh("echo seed > README.md && git add . && git commit -q -m seed", dir);
    sh("git push -q -u origin master", dir);
}

fn fixture() -> Fixture {
    let root = TempDir::new().unwrap();
    let remote = root.path().join("remote.git");
    let site = root.path().join("site");
    let notes = root.path().join("notes");

    Repository::init_bare(&remote).unwrap();
    clone_with_upstream(&remote, &site);
    fs::create_dir_all(site.join("public")).unwrap();

    let notes_remote = root.path().join("notes.git");
    Repository::init_bare(&notes_remote).unwrap();
    clone_with_upstream(&notes_remote, &notes);
    fs::write(notes.join("today.md"), "# today\n").unwrap();

    Fixture {
        _root: root,
        remote,
        site,
        notes,
    }
}

fn config_for(fx: &Fixture) -> Config {
    let mut config = Config {
        generator_project_path: fx.site.to_string_lossy().into_owned(),
        markdown_source_path: fx.notes.to_string_lossy().into_owned(),
        html_output_path: fx.site.join("public").to_string_lossy().into_owned(),
        ..Config::default()
    };
    config.generator.shell = "sh".to_string();
    config.generator.command =
        "ls {source} > {output}/pages.txt && echo '<h1>garden</h1>' > {output}/index.html"
            .to_string();
    config
}

fn remote_master_summary(remote: &Path) -> String {
    let repo = Repository::open_bare(remote).unwrap();
    let commit = repo
        .find_reference("refs/heads/master")
        .unwrap()
        .peel_to_commit()
        .unwrap();
    commit.summary().unwrap().to_string()
}

#[test]
fn test_publish_site_end_to_end() {
    let fx = fixture();
    let config = config_for(&fx);

    let journal = Journal::new();
    let runner = SystemRunner::new();
    let prompt = MockPrompt::submitting(&journal, "publish garden");
    let ui = MockUi::new(&journal);

    let outcome = Publisher::new(&config, &runner, &prompt, &ui, &ui)
        .run(Trigger::Publish { sync_source: true });

    assert!(outcome.is_success(), "{:?}", outcome);
    assert_eq!(
        fs::read_to_string(fx.site.join("public/pages.txt")).unwrap().trim(),
        "README.md\ntoday.md"
    );
    assert!(fx.site.join("public/vercel.json").exists());
    assert_eq!(remote_master_summary(&fx.remote), "publish garden");

    match outcome {
        RunOutcome::Finished(flows) => match &flows[..] {
            [FlowOutcome::Completed(report)] => {
                let head = report.head.as_ref().unwrap();
                assert_eq!(head.summary, "publish garden");
            }
            other => panic!("unexpected flows {:?}", other),
        },
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_failed_push_keeps_local_commit() {
    let fx = fixture();
    let mut config = config_for(&fx);
    config.git.remote = "nowhere".to_string();

    let journal = Journal::new();
    let runner = SystemRunner::new();
    let prompt = MockPrompt::submitting(&journal, "will not reach remote");
    let ui = MockUi::new(&journal);

    let publisher = Publisher::new(&config, &runner, &prompt, &ui, &ui);
    let outcome = publisher.run(Trigger::Publish { sync_source: true });

    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(
        publisher.state(),
        PublishState::Failed { step: Step::Push }
    );
    assert!(!journal.statuses().contains(&PublishState::Done));

    let head = head_commit(&fx.site).unwrap().unwrap();
    assert_eq!(head.summary, "will not reach remote");
    assert_eq!(remote_master_summary(&fx.remote), "seed");
}

#[test]
fn test_sync_source_end_to_end() {
    let fx = fixture();
    let config = config_for(&fx);

    let journal = Journal::new();
    let runner = SystemRunner::new();
    let prompt = MockPrompt::submitting(&journal, "");
    let ui = MockUi::new(&journal);

    let outcome = Publisher::new(&config, &runner, &prompt, &ui, &ui)
        .with_default_message(|| "Updated at 2024-01-01 00:00:00".to_string())
        .run(Trigger::SyncSource);

    assert!(outcome.is_success(), "{:?}", outcome);
    let notes_remote = fx.notes.parent().unwrap().join("notes.git");
    assert_eq!(
        remote_master_summary(&notes_remote),
        "Updated at 2024-01-01 00:00:00"
    );
    // the site repository is untouched by a source sync
    assert_eq!(remote_master_summary(&fx.remote), "seed");
}

#[test]
fn test_commit_with_nothing_staged_fails_at_commit() {
    let fx = fixture();
    let mut config = config_for(&fx);
    config.generator.command = "true".to_string();
    config.deploy.write_descriptor = false;

    let journal = Journal::new();
    let runner = SystemRunner::new();
    let prompt = MockPrompt::submitting(&journal, "empty");
    let ui = MockUi::new(&journal);

    let outcome = Publisher::new(&config, &runner, &prompt, &ui, &ui)
        .run(Trigger::Publish { sync_source: false });

    match outcome {
        RunOutcome::Finished(flows) => match &flows[..] {
            [FlowOutcome::Failed { state, error, .. }] => {
                assert_eq!(*state, PublishState::Failed { step: Step::Commit });
                assert!(matches!(error, PublishError::CommandExecution { .. }));
            }
            other => panic!("unexpected flows {:?}", other),
        },
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_lock_held_during_run_is_refused() {
    let fx = fixture();
    let _held = PublishLock::acquire(&fx.site).unwrap();

    let err = PublishLock::acquire(&fx.site).unwrap_err();
    assert!(matches!(err, PublishError::AlreadyRunning { .. }));
    assert!(err.to_string().contains("note-publish.lock"));
}
