use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn smartcollab(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("smartcollab").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("SMARTCOLLAB_ANALYSIS__DELAY_MS", "0");
    cmd
}

/// A seeded workspace with the demo owner logged in.
fn setup_logged_in() -> TempDir {
    let dir = TempDir::new().unwrap();
    smartcollab(&dir).arg("seed").assert().success();
    smartcollab(&dir)
        .args(["login", "test@gmail.com", "password123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as Test User 1."));
    dir
}

#[test]
fn seed_writes_data_file() {
    let dir = TempDir::new().unwrap();

    smartcollab(&dir)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("test@gmail.com / password123"));

    dir.child("smartcollab.json").assert(predicate::path::exists());
}

#[test]
fn commands_need_login() {
    let dir = TempDir::new().unwrap();
    smartcollab(&dir).arg("seed").assert().success();

    smartcollab(&dir)
        .arg("projects")
        .assert()
        .failure()
        .stderr(predicate::str::contains("You are not logged in"));
}

#[test]
fn wrong_password_is_rejected() {
    let dir = TempDir::new().unwrap();
    smartcollab(&dir).arg("seed").assert().success();

    smartcollab(&dir)
        .args(["login", "test@gmail.com", "nope-nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid email or password"));
    dir.child(".smartcollab-session")
        .assert(predicate::path::missing());
}

#[test]
fn projects_lists_owned_projects_newest_first() {
    let dir = setup_logged_in();

    smartcollab(&dir)
        .arg("projects")
        .assert()
        .success()
        .stdout(predicate::str::is_match("(?s)#2 Web App.*#1 AI Navigation System").unwrap())
        .stdout(predicate::str::contains("You are the owner | Key: NAV-8821"))
        .stdout(predicate::str::contains("Geography Class Group").not());
}

#[test]
fn show_renders_progress_and_contributions() {
    let dir = setup_logged_in();

    smartcollab(&dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created November 20, 2025"))
        .stdout(predicate::str::contains("50% (2/4 tasks)"))
        .stdout(predicate::str::is_match(r"Dan +50%  2/2 done").unwrap())
        .stdout(predicate::str::is_match(r"Sarah +0%  0/2 done").unwrap())
        .stdout(predicate::str::contains("flight_logs.csv"));
}

#[test]
fn toggling_a_task_updates_progress() {
    let dir = setup_logged_in();

    smartcollab(&dir)
        .args(["task", "toggle", "1", "6"])
        .assert()
        .success()
        .stdout("Task #6 marked done. Project is 75% complete.\n");

    smartcollab(&dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] #6 Train detection model (Sarah)"));
}

#[test]
fn create_and_join_with_key() {
    let dir = setup_logged_in();
    let output = smartcollab(&dir)
        .args(["create", "Thesis", "--description", "Due in May"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let key = stdout
        .lines()
        .find_map(|line| line.strip_prefix("Share this join key with your team: "))
        .unwrap()
        .to_string();
    assert!(key.starts_with("NEW-"));

    smartcollab(&dir).arg("logout").assert().success();
    smartcollab(&dir)
        .args(["login", "ben@example.com", "password123"])
        .assert()
        .success();

    smartcollab(&dir)
        .args(["join", &key])
        .assert()
        .success()
        .stdout(predicate::str::contains("Joined project #13 Thesis"));
    smartcollab(&dir)
        .args(["join", &key])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already a member"));
}

#[test]
fn non_members_cannot_open_a_project() {
    let dir = setup_logged_in();

    smartcollab(&dir)
        .args(["show", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a member of project 3"));
}

#[test]
fn tasks_links_and_files_can_be_added() {
    let dir = setup_logged_in();
    let notes = dir.child("notes.txt");
    notes.write_str("hello").unwrap();

    smartcollab(&dir)
        .args(["task", "add", "2", "Write README", "--assignee", "Test User 1"])
        .assert()
        .success()
        .stdout("Added [ ] #13 Write README (Test User 1)\n");
    smartcollab(&dir)
        .args(["link", "add", "2", "Tailwind", "https://tailwindcss.com"])
        .assert()
        .success();
    smartcollab(&dir)
        .args(["link", "add", "2", "Bad", "tailwindcss.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http://"));
    smartcollab(&dir)
        .args(["file", "add", "2"])
        .arg(notes.path())
        .assert()
        .success()
        .stdout("Added file notes.txt (5 bytes)\n");

    smartcollab(&dir)
        .args(["show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#14 Tailwind <https://tailwindcss.com>"))
        .stdout(predicate::str::contains("notes.txt (5 B) uploaded by Test User 1"))
        .stdout(predicate::str::contains("33% (1/3 tasks)"));
}

#[test]
fn deleting_a_task_removes_it() {
    let dir = setup_logged_in();

    smartcollab(&dir)
        .args(["task", "delete", "2", "11"])
        .assert()
        .success()
        .stdout("Deleted task #11 Mock JSON backend\n");
    smartcollab(&dir)
        .args(["task", "delete", "2", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task 11 not found"));
}

#[test]
fn analyze_prints_report() {
    let dir = setup_logged_in();

    smartcollab(&dir)
        .args(["analyze", "1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "AI Navigation System is 50% complete with 2 of 4 tasks done.",
        ))
        .stdout(predicate::str::contains("Test User 1 has no assigned tasks."));
}

#[test]
fn config_file_moves_the_data_file() {
    let dir = TempDir::new().unwrap();
    dir.child("team.toml")
        .write_str("data_file = \"team-data.json\"\n")
        .unwrap();

    smartcollab(&dir)
        .args(["--config", "team.toml", "seed"])
        .assert()
        .success();

    dir.child("team-data.json").assert(predicate::path::exists());
    dir.child("smartcollab.json").assert(predicate::path::missing());
}

#[test]
fn environment_moves_the_data_file() {
    let dir = TempDir::new().unwrap();

    smartcollab(&dir)
        .env("SMARTCOLLAB_DATA_FILE", "env-data.json")
        .arg("seed")
        .assert()
        .success();

    dir.child("env-data.json").assert(predicate::path::exists());
    dir.child("smartcollab.json").assert(predicate::path::missing());
}
