//! End-to-end session tests driving the full protocol with scripted replies.
//!
//! Binary-level tests spawn the `remindful` binary with a script file and
//! assert on the report it writes; one library-level test runs the complete
//! sixteen-item protocol against the committed standard list.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use remindful_core::immediate::RecallStatus;
use remindful_core::report::{CuedResult, SessionReport};

fn remindful() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("remindful").unwrap()
}

const VOCAB_4: &str = r#"
[vocabulary]
id = "mini"
name = "Mini list"
version = "list-a"
sheet_size = 4

[[items]]
cue = "fruit"
target = "apple"

[[items]]
cue = "vehicle"
target = "truck"

[[items]]
cue = "furniture"
target = "couch"

[[items]]
cue = "animal"
target = "dog"
"#;

/// Introduction, sheet, flawless learning and recall, empty interference,
/// complete free recall. Nothing is missed, so no cued phase runs.
const SCRIPT_PERFECT: &str = "\
ok
ok
apple
truck
couch
dog
apple
truck
couch
dog
<<expire>>
apple
truck
couch
dog
<<expire>>
";

fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Load every session report written to `dir`, oldest first by file name.
fn load_reports(dir: &Path) -> Vec<SessionReport> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("session-") && name.ends_with(".json"))
        })
        .collect();
    paths.sort();
    paths
        .iter()
        .map(|path| SessionReport::load_json(path).unwrap())
        .collect()
}

fn load_report(dir: &Path) -> SessionReport {
    let mut reports = load_reports(dir);
    assert_eq!(reports.len(), 1, "expected exactly one report");
    reports.remove(0)
}

#[test]
fn perfect_session_writes_report() {
    let dir = TempDir::new().unwrap();
    let vocab = write_fixture(dir.path(), "vocab.toml", VOCAB_4);
    let script = write_fixture(dir.path(), "session.script", SCRIPT_PERFECT);
    let out = dir.path().join("out");

    remindful()
        .arg("run")
        .arg("--vocabulary")
        .arg(&vocab)
        .arg("--script")
        .arg(&script)
        .arg("--subject")
        .arg("mk")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Complete:"))
        .stderr(predicate::str::contains("Results saved to:"));

    let report = load_report(&out);
    assert_eq!(report.subject.as_deref(), Some("mk"));
    assert_eq!(report.scores.immediate, 4);
    assert_eq!(report.scores.free, 4);
    assert_eq!(report.scores.cued, 0);
    assert_eq!(report.scores.max_cued, 0);
    assert_eq!(report.scores.intrusions, 0);
    assert_eq!(report.scores.total, 8);
    assert!(report.missed.is_empty());
    assert!(report.cued.is_empty());
    assert!(report.interference_responses.is_empty());
}

#[test]
fn reminders_and_failures_are_scored() {
    let dir = TempDir::new().unwrap();
    let vocab = write_fixture(dir.path(), "vocab.toml", VOCAB_4);

    // One learning retry on "vehicle"; immediate recall uses the reminder
    // on "vehicle" (recovered) and "furniture" (failed twice); free recall
    // produces one target and one stray word; cued recall recovers one,
    // intrudes one, skips one. The final blank line is the skip.
    let script = write_fixture(
        dir.path(),
        "session.script",
        "ok\nok\napple\nbanana\ntruck\ncouch\ndog\napple\nwrong\ntruck\nnope\nnever\ndog\ncat\nlion\n<<expire>>\napple\nzebra\n<<expire>>\ntruck\nchair\n\n",
    );
    let out = dir.path().join("out");

    remindful()
        .arg("run")
        .arg("--vocabulary")
        .arg(&vocab)
        .arg("--script")
        .arg(&script)
        .arg("--matching")
        .arg("exact")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let report = load_report(&out);

    assert_eq!(report.scores.immediate, 3);
    assert_eq!(report.scores.max_immediate, 4);
    assert_eq!(report.scores.free, 1);
    assert_eq!(report.scores.cued, 1);
    assert_eq!(report.scores.max_cued, 3);
    assert_eq!(report.scores.intrusions, 1);
    assert_eq!(report.scores.total, 5);

    // Per-item detail
    let items = &report.sheets[0].items;
    assert_eq!(items[0].learning_attempts, 1);
    assert_eq!(items[1].learning_attempts, 2);
    assert_eq!(items[1].recall, RecallStatus::Correct);
    assert!(items[1].reminded);
    assert_eq!(items[2].recall, RecallStatus::Failed);
    assert!(items[2].reminded);
    assert_eq!(items[3].recall, RecallStatus::Correct);
    assert!(!items[3].reminded);

    // Free recall verbatim, in order
    assert_eq!(report.transcript, vec!["apple", "zebra"]);

    // Missed items in vocabulary order, resolved one response each
    let missed: Vec<&str> = report.missed.iter().map(|item| item.cue.as_str()).collect();
    assert_eq!(missed, vec!["vehicle", "furniture", "animal"]);
    assert_eq!(report.cued[0].result, CuedResult::Correct);
    assert_eq!(report.cued[1].result, CuedResult::Intrusion);
    assert_eq!(report.cued[1].response, "chair");
    assert_eq!(report.cued[2].result, CuedResult::Skipped);

    assert_eq!(report.interference_responses, vec!["cat", "lion"]);
}

#[test]
fn fuzzy_learning_forgives_typos() {
    let dir = TempDir::new().unwrap();
    let vocab = write_fixture(dir.path(), "vocab.toml", VOCAB_4);

    // "aple" is one dropped letter from "apple"; the default fuzzy policy
    // accepts it during learning, so no retry happens.
    let script = write_fixture(
        dir.path(),
        "session.script",
        "ok\nok\naple\ntruck\ncouch\ndog\napple\ntruck\ncouch\ndog\n<<expire>>\napple\ntruck\ncouch\ndog\n<<expire>>\n",
    );
    let out = dir.path().join("out");

    remindful()
        .arg("run")
        .arg("--vocabulary")
        .arg(&vocab)
        .arg("--script")
        .arg(&script)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let report = load_report(&out);
    assert_eq!(report.sheets[0].items[0].learning_attempts, 1);
    assert_eq!(report.scores.immediate, 4);
    assert_eq!(report.scores.total, 8);
}

#[test]
fn exact_learning_requires_retry() {
    let dir = TempDir::new().unwrap();
    let vocab = write_fixture(dir.path(), "vocab.toml", VOCAB_4);

    // Same typo under exact matching: the cue is probed again.
    let script = write_fixture(
        dir.path(),
        "session.script",
        "ok\nok\naple\napple\ntruck\ncouch\ndog\napple\ntruck\ncouch\ndog\n<<expire>>\napple\ntruck\ncouch\ndog\n<<expire>>\n",
    );
    let out = dir.path().join("out");

    remindful()
        .arg("run")
        .arg("--vocabulary")
        .arg(&vocab)
        .arg("--script")
        .arg(&script)
        .arg("--matching")
        .arg("exact")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let report = load_report(&out);
    assert_eq!(report.sheets[0].items[0].learning_attempts, 2);
    assert_eq!(report.scores.immediate, 4);
}

#[test]
fn all_formats_written() {
    let dir = TempDir::new().unwrap();
    let vocab = write_fixture(dir.path(), "vocab.toml", VOCAB_4);
    let script = write_fixture(dir.path(), "session.script", SCRIPT_PERFECT);
    let out = dir.path().join("out");

    remindful()
        .arg("run")
        .arg("--vocabulary")
        .arg(&vocab)
        .arg("--script")
        .arg(&script)
        .arg("--output")
        .arg(&out)
        .arg("--format")
        .arg("all")
        .assert()
        .success()
        .stderr(predicate::str::contains("HTML report:"))
        .stderr(predicate::str::contains("CSV row appended to:"));

    let has_html = std::fs::read_dir(&out).unwrap().any(|entry| {
        entry
            .unwrap()
            .path()
            .extension()
            .is_some_and(|ext| ext == "html")
    });
    assert!(has_html, "HTML report should exist");

    let csv = std::fs::read_to_string(out.join("sessions.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2, "header plus one row");
    assert!(lines[0].starts_with("id,created_at"));
}

#[test]
fn version_rotation_across_sessions() {
    let dir = TempDir::new().unwrap();
    let lists = dir.path().join("lists");
    std::fs::create_dir_all(&lists).unwrap();

    write_fixture(
        &lists,
        "a.toml",
        &VOCAB_4.replace("id = \"mini\"", "id = \"rotate\""),
    );
    write_fixture(
        &lists,
        "b.toml",
        r#"
[vocabulary]
id = "rotate"
name = "Mini list, alternate form"
version = "list-b"
sheet_size = 4

[[items]]
cue = "fruit"
target = "banana"

[[items]]
cue = "vehicle"
target = "wagon"

[[items]]
cue = "furniture"
target = "dresser"

[[items]]
cue = "animal"
target = "horse"
"#,
    );

    let script_a = write_fixture(dir.path(), "a.script", SCRIPT_PERFECT);
    let script_b = write_fixture(
        dir.path(),
        "b.script",
        "ok\nok\nbanana\nwagon\ndresser\nhorse\nbanana\nwagon\ndresser\nhorse\n<<expire>>\nbanana\nwagon\ndresser\nhorse\n<<expire>>\n",
    );
    let out = dir.path().join("out");

    // First administration takes list-a (never taken beats taken)
    remindful()
        .arg("run")
        .arg("--vocabulary")
        .arg(&lists)
        .arg("--script")
        .arg(&script_a)
        .arg("--subject")
        .arg("mk")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let first = load_reports(&out);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].vocabulary.version, "list-a");

    // Second administration for the same subject rotates to list-b
    remindful()
        .arg("run")
        .arg("--vocabulary")
        .arg(&lists)
        .arg("--script")
        .arg(&script_b)
        .arg("--subject")
        .arg("mk")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let reports = load_reports(&out);
    assert!(
        reports.iter().any(|r| r.vocabulary.version == "list-b"),
        "second run should use the alternate form"
    );

    let history =
        remindful_sources::history::VersionHistory::load(&out.join("history.json")).unwrap();
    assert_eq!(history.administrations.len(), 2);
    assert_eq!(history.administrations[0].version, "list-a");
    assert_eq!(history.administrations[1].version, "list-b");
}

/// The complete sixteen-item protocol against the committed standard list,
/// driven through the library.
#[tokio::test]
async fn full_protocol_with_the_standard_list() {
    use std::sync::Arc;

    use remindful_core::session::SessionConfig;
    use remindful_runner::observer::NoopObserver;
    use remindful_runner::SessionRunner;
    use remindful_sources::scripted::{NullSink, ScriptedSource};

    let vocabulary =
        remindful_core::parser::parse_vocabulary(Path::new("../../vocabularies/list-a.toml"))
            .unwrap();
    assert_eq!(vocabulary.len(), 16);

    let script = "\
ok
ok
apple
truck
couch
dog
apple
truck
couch
dog
ok
eagle
hammer
tulip
guitar
eagle
hammer
tulip
guitar
ok
jacket
salmon
coffee
beetle
jacket
salmon
coffee
beetle
ok
carrot
castle
thunder
copper
carrot
castle
thunder
copper
<<expire>>
apple
truck
couch
dog
eagle
hammer
tulip
guitar
jacket
salmon
coffee
beetle
carrot
castle
thunder
copper
<<expire>>
";

    let runner = SessionRunner::new(
        Arc::new(NullSink),
        Arc::new(ScriptedSource::from_text(script)),
    );
    let report = runner
        .run(vocabulary, SessionConfig::default(), &NoopObserver)
        .await
        .unwrap();

    assert_eq!(report.vocabulary.item_count, 16);
    assert_eq!(report.vocabulary.sheet_count, 4);
    assert_eq!(report.scores.immediate, 16);
    assert_eq!(report.scores.max_immediate, 16);
    assert_eq!(report.scores.free, 16);
    assert_eq!(report.scores.max_free, 16);
    assert_eq!(report.scores.cued, 0);
    assert_eq!(report.scores.max_cued, 0);
    assert_eq!(report.scores.total, 32);
    assert_eq!(report.scores.max_total(), 32);
    assert!(report.missed.is_empty());

    assert_eq!(report.sheets.len(), 4);
    for sheet in &report.sheets {
        for item in &sheet.items {
            assert_eq!(item.learning_attempts, 1, "{} took retries", item.cue);
            assert_eq!(item.recall, RecallStatus::Correct);
            assert!(!item.reminded);
        }
    }
    assert_eq!(report.transcript.len(), 16);
}
