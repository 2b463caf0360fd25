//! Runs of the `modpin` binary against a local fixture repository.

use assert_cmd::Command;
use modpin::test_utils::FixtureRepo;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn modpin(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("modpin").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("MODPIN_CONFIG")
        .env_remove("MODPIN_PUPPETFILE")
        .env_remove("MODPIN_TIMEOUT")
        .env_remove("MODPIN_CLONE_TIMEOUT")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn write_puppetfile(dir: &Path, body: &str) {
    fs::write(dir.join("Puppetfile"), body).unwrap();
}

#[test]
fn test_valid_and_invalid_references() {
    let fixture = FixtureRepo::new().unwrap();
    let temp = TempDir::new().unwrap();
    let url = fixture.file_url();
    write_puppetfile(
        temp.path(),
        &format!(
            "forge 'https://forge.puppet.com'

mod 'puppetlabs/stdlib', '9.0.0'

mod 'fixture-tagged',
  :git => '{url}',
  :tag => 'v1.0.0'

mod 'fixture-broken',
  :git    => '{url}',
  :branch => 'nonexistent-branch-xyz'
"
        ),
    );

    let output = modpin(temp.path()).assert().code(1).get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();

    assert!(stdout.starts_with("NAME"));
    assert!(!stdout.contains("stdlib"));
    let broken = stdout.find("fixture-broken").unwrap();
    let tagged = stdout.find("fixture-tagged").unwrap();
    assert!(broken < tagged, "invalid rows come first:\n{stdout}");
    assert!(stdout.contains("✗"));
    assert!(stdout.contains("✓"));
    assert!(stdout.contains("1 of 2 git references are invalid"));
}

#[test]
fn test_all_valid_exits_zero() {
    let fixture = FixtureRepo::new().unwrap();
    let temp = TempDir::new().unwrap();
    write_puppetfile(
        temp.path(),
        &format!(
            "mod 'fixture-branch', :git => '{url}', :branch => 'release-1.x'
mod 'fixture-head', :git => '{url}'
",
            url = fixture.file_url()
        ),
    );

    modpin(temp.path())
        .arg("--exact-refs")
        .assert()
        .success()
        .stdout(predicate::str::contains("All 2 git references are valid"));
}

#[test]
fn test_commit_pin_is_valid_with_note() {
    let fixture = FixtureRepo::new().unwrap();
    let temp = TempDir::new().unwrap();
    write_puppetfile(
        temp.path(),
        &format!(
            "mod 'fixture-pinned', :git => '{}', :ref => '{}'\n",
            fixture.file_url(),
            fixture.first_commit
        ),
    );

    modpin(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("fixture-pinned is pinned to a raw commit"));
}

#[test]
fn test_forge_only_manifest_exits_zero() {
    let temp = TempDir::new().unwrap();
    write_puppetfile(
        temp.path(),
        "forge 'https://forge.puppet.com'\nmod 'puppetlabs/stdlib', '9.0.0'\n",
    );

    modpin(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("All 0 git references are valid"));
}

#[test]
fn test_missing_manifest_exits_two() {
    let temp = TempDir::new().unwrap();

    modpin(temp.path())
        .arg("does/not/exist/Puppetfile")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does/not/exist/Puppetfile"));
}

#[test]
fn test_json_format() {
    let fixture = FixtureRepo::new().unwrap();
    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("Puppetfile.prod");
    fs::write(
        &manifest,
        format!("mod 'fixture-tagged', :git => '{}', :tag => 'v1.0.0'\n", fixture.file_url()),
    )
    .unwrap();

    let output = modpin(temp.path())
        .args(["--format", "json"])
        .arg(&manifest)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["total"], 1);
    assert_eq!(json["results"][0]["name"], "fixture-tagged");
    assert_eq!(json["results"][0]["ref"], "v1.0.0");
    assert_eq!(json["results"][0]["resolution"], "advertised");
}

#[test]
fn test_quiet_prints_only_verdict() {
    let temp = TempDir::new().unwrap();
    write_puppetfile(temp.path(), "mod 'puppetlabs/stdlib', '9.0.0'\n");

    modpin(temp.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout("All 0 git references are valid\n");
}

#[test]
fn test_config_file_enables_exact_refs() {
    let fixture = FixtureRepo::new().unwrap();
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("modpin.toml");
    fs::write(&config, "exact_refs = true\n").unwrap();
    // "release" is a substring of "release-1.x" but not a ref name.
    write_puppetfile(
        temp.path(),
        &format!("mod 'fixture-partial', :git => '{}', :branch => 'release'\n", fixture.file_url()),
    );

    modpin(temp.path()).assert().success();
    modpin(temp.path()).arg("--config").arg(&config).assert().code(1);
}

#[test]
fn test_missing_explicit_config_is_fatal() {
    let temp = TempDir::new().unwrap();
    write_puppetfile(temp.path(), "");

    modpin(temp.path()).args(["--config", "absent.toml"]).assert().code(3);
}

#[test]
fn test_tagged_commit_pin_is_advertised() {
    let fixture = FixtureRepo::new().unwrap();
    let temp = TempDir::new().unwrap();
    write_puppetfile(
        temp.path(),
        &format!(
            "mod 'fixture-release', :git => '{}', :ref => '{}'\n",
            fixture.file_url(),
            fixture.tagged_commit
        ),
    );

    let output = modpin(temp.path())
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    // The tag and the release branch both point at this commit, so the
    // listing already names it and no clone is needed.
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["results"][0]["resolution"], "advertised");
}

#[test]
fn test_missing_git_reports_every_row_invalid() {
    let fixture = FixtureRepo::new().unwrap();
    let temp = TempDir::new().unwrap();
    let empty_bin = temp.path().join("bin");
    fs::create_dir(&empty_bin).unwrap();
    write_puppetfile(
        temp.path(),
        &format!(
            "mod 'fixture-tagged', :git => '{url}', :tag => 'v1.0.0'
mod 'fixture-head', :git => '{url}'
",
            url = fixture.file_url()
        ),
    );

    let assert = modpin(temp.path()).env("PATH", &empty_bin).assert().code(1);
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();

    assert!(stdout.contains("fixture-tagged"));
    assert!(stdout.contains("fixture-head"));
    assert!(!stdout.contains("✓"));
    assert!(stdout.contains("2 of 2 git references are invalid"));
    assert!(stderr.contains("git is not installed"));
}

#[test]
fn test_missing_manifest_wins_over_broken_config() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("broken.toml");
    fs::write(&config, "exact_refs = [not toml\n").unwrap();

    modpin(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("missing/Puppetfile")
        .assert()
        .code(2);

    write_puppetfile(temp.path(), "");
    modpin(temp.path()).arg("--config").arg(&config).arg("Puppetfile").assert().code(3);
}
