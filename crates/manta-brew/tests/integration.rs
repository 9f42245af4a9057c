//! End-to-end CLI integration tests for the `manta-brew` binary.
//!
//! Each test works in its own temporary directory and exercises the binary
//! as a subprocess via `assert_cmd`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const MANTA_RB: &str = r#"class Manta < Formula
  desc "Manta CLI"
  homepage "https://github.com/eth-cscs/manta"
  url "https://github.com/eth-cscs/manta/releases/download/v{{ VERSION }}/manta-aarch64-apple-darwin.tar.xz"
  sha256 "{{ SHA }}"
  version "{{ VERSION }}"

  def install
    bin.install "manta"
  end
end
"#;

/// Build a `Command` targeting the cargo-built binary, isolated from the
/// caller's environment.
fn brew(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("manta-brew").unwrap();
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("MANTA_BREW_CONFIG")
        .env_remove("MANTA_BREW_TEMPLATE")
        .env_remove("MANTA_BREW_OUTPUT_DIR")
        .env_remove("MANTA_BREW_ARTIFACT")
        .env_remove("MANTA_BREW_JSON");
    cmd
}

/// A temp directory holding the Ruby template as `Formula/manta.rb`.
fn ruby_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("Formula")).unwrap();
    std::fs::write(tmp.path().join("Formula").join("manta.rb"), MANTA_RB).unwrap();
    tmp
}

fn sha(c: char) -> String {
    std::iter::repeat_n(c, 64).collect()
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_ruby_template_to_stdout() {
    let tmp = ruby_project();
    let out = stdout_of(brew(&tmp).args([
        "render",
        "--template",
        "Formula/manta.rb",
        "--release-version",
        "1.2.3",
        "--sha256",
        sha('a').as_str(),
        "--output",
        "-",
    ]));
    insta::assert_snapshot!(out, @r#"
class Manta < Formula
  desc "Manta CLI"
  homepage "https://github.com/eth-cscs/manta"
  url "https://github.com/eth-cscs/manta/releases/download/v1.2.3/manta-aarch64-apple-darwin.tar.xz"
  sha256 "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
  version "1.2.3"

  def install
    bin.install "manta"
  end
end
"#);
}

#[test]
fn render_is_byte_identical_across_runs() {
    let tmp = ruby_project();
    let digest = sha('c');
    let args = [
        "render",
        "--release-version",
        "0.4.1",
        "--sha256",
        digest.as_str(),
        "-o",
        "-",
    ];
    let first = brew(&tmp).args(args).output().unwrap();
    let second = brew(&tmp).args(args).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn render_writes_into_configured_output_dir() {
    let tmp = ruby_project();
    std::fs::write(
        tmp.path().join(".manta-brew.toml"),
        "template = \"Formula/manta.rb\"\noutput_dir = \"tap/Formula\"\n",
    )
    .unwrap();

    brew(&tmp)
        .args(["render", "--release-version", "2.0.0", "--sha256", sha('b').as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered manta 2.0.0"));

    let written = std::fs::read_to_string(tmp.path().join("tap/Formula/manta.rb")).unwrap();
    assert!(written.contains("version \"2.0.0\""));
    assert!(written.contains("/v2.0.0/manta-aarch64-apple-darwin.tar.xz"));
}

#[test]
fn render_computes_checksum_from_artifact_file() {
    let tmp = ruby_project();
    std::fs::write(tmp.path().join("manta.tar.xz"), b"abc").unwrap();

    let out = stdout_of(brew(&tmp).args([
        "render",
        "--release-version",
        "1.0.0",
        "--artifact-file",
        "manta.tar.xz",
        "--format",
        "json",
        "-o",
        "-",
    ]));
    let record: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        record["sha256"].as_str().unwrap(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(record["version"].as_str().unwrap(), "1.0.0");
}

#[test]
fn render_rejects_bad_checksum() {
    let tmp = ruby_project();
    brew(&tmp)
        .args(["render", "--release-version", "1.2.3", "--sha256", sha('A').as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid checksum"));
    let template = std::fs::read_to_string(tmp.path().join("Formula/manta.rb")).unwrap();
    assert_eq!(template, MANTA_RB);
}

#[test]
fn render_ignores_release_binary_named_like_template() {
    let tmp = ruby_project();
    std::fs::write(tmp.path().join("manta"), [0x7f, b'E', b'L', b'F', 0xff, 0xfe]).unwrap();

    let out = stdout_of(brew(&tmp).args([
        "render",
        "--release-version",
        "1.2.3",
        "--sha256",
        sha('a').as_str(),
        "-o",
        "-",
    ]));
    assert!(out.starts_with("class Manta < Formula\n"));
}

#[test]
fn render_rejects_name_that_is_not_a_ruby_class() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("bad.formula.toml"),
        r#"name = "3manta"
desc = "Manta CLI"
homepage = "https://github.com/eth-cscs/manta"
url = "https://github.com/eth-cscs/manta/archive/v{{ VERSION }}.tar.gz"
sha256 = "{{ SHA }}"
version = "{{ VERSION }}"

[[install]]
source = "manta"
"#,
    )
    .unwrap();
    brew(&tmp)
        .args([
            "render",
            "-t",
            "bad",
            "--release-version",
            "1.2.3",
            "--sha256",
            sha('a').as_str(),
            "-o",
            "-",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a Ruby constant"));
}

#[test]
fn render_rejects_bad_version() {
    let tmp = ruby_project();
    brew(&tmp)
        .args(["render", "--release-version", "v1.2.3", "--sha256", sha('a').as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid version 'v1.2.3'"));
}

#[test]
fn render_error_as_json() {
    let tmp = ruby_project();
    let output = brew(&tmp)
        .args(["--json", "render", "--release-version", "1.2", "--sha256", sha('a').as_str()])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(err["error"].as_str().unwrap().contains("invalid version"));
}

// ---------------------------------------------------------------------------
// Artifact variants
// ---------------------------------------------------------------------------

#[test]
fn init_then_render_each_variant() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp).args(["init", "--quiet"]).assert().success();
    assert!(tmp.path().join("manta.formula.toml").is_file());
    assert!(tmp.path().join(".manta-brew.toml").is_file());

    let darwin = stdout_of(brew(&tmp).args([
        "render",
        "--release-version",
        "1.2.3",
        "--sha256",
        sha('a').as_str(),
        "--artifact",
        "darwin-arm64",
        "-o",
        "-",
    ]));
    assert!(darwin.contains(
        "url \"https://github.com/eth-cscs/manta/releases/download/v1.2.3/manta-aarch64-apple-darwin.tar.xz\""
    ));

    let generic = stdout_of(brew(&tmp).args([
        "render",
        "--release-version",
        "1.2.3",
        "--sha256",
        sha('a').as_str(),
        "--artifact",
        "generic",
        "-o",
        "-",
    ]));
    assert!(generic.contains("/v1.2.3/manta.tar.gz\""));

    // Same template, only the url differs between variants.
    let differing: Vec<(&str, &str)> = darwin
        .lines()
        .zip(generic.lines())
        .filter(|(a, b)| a != b)
        .collect();
    assert_eq!(differing.len(), 1);
    assert!(differing[0].0.trim_start().starts_with("url "));
}

#[test]
fn render_requires_variant_selection() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp).args(["init", "--quiet"]).assert().success();
    brew(&tmp)
        .args(["render", "--release-version", "1.2.3", "--sha256", sha('a').as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no artifact variant was selected"));
}

#[test]
fn render_uses_configured_variant() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp).args(["init", "--quiet"]).assert().success();
    brew(&tmp)
        .env("MANTA_BREW_ARTIFACT", "generic")
        .args(["render", "--release-version", "3.1.0", "--sha256", sha('d').as_str()])
        .assert()
        .success();
    let written = std::fs::read_to_string(tmp.path().join("Formula/manta.rb")).unwrap();
    assert!(written.contains("/v3.1.0/manta.tar.gz"));
}

#[test]
fn render_rejects_unknown_variant() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp).args(["init", "--quiet"]).assert().success();
    brew(&tmp)
        .args([
            "render",
            "--release-version",
            "1.2.3",
            "--sha256",
            sha('a').as_str(),
            "--artifact",
            "windows",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown artifact variant 'windows'"))
        .stderr(predicate::str::contains("darwin-arm64, generic"));
}

#[test]
fn init_refuses_to_overwrite() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp).args(["init", "--quiet"]).assert().success();
    brew(&tmp)
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    brew(&tmp).args(["init", "--force", "--quiet"]).assert().success();
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_template_passes() {
    let tmp = ruby_project();
    brew(&tmp)
        .args(["validate", "Formula/manta.rb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(templated): no violations"));
}

#[test]
fn validate_rendered_formula_passes() {
    let tmp = ruby_project();
    brew(&tmp)
        .args([
            "render",
            "--release-version",
            "1.2.3",
            "--sha256",
            sha('e').as_str(),
            "-o",
            "out/manta.rb",
        ])
        .assert()
        .success();
    brew(&tmp)
        .args(["validate", "out/manta.rb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(materialized): no violations"));
}

#[test]
fn validate_reports_unsubstituted_checksum() {
    let tmp = TempDir::new().unwrap();
    let formula = MANTA_RB.replace("{{ VERSION }}", "1.2.3");
    std::fs::write(tmp.path().join("manta.rb"), formula).unwrap();

    let output = brew(&tmp)
        .args(["--json", "validate", "manta.rb"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["phase"], "materialized");
    let violations = report["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["kind"], "invalid_checksum");
    assert_eq!(violations[0]["field"], "sha256");
}

#[test]
fn validate_lists_every_violation() {
    let tmp = TempDir::new().unwrap();
    let formula = r#"class Manta < Formula
  desc "Manta CLI"
  homepage "github.com/eth-cscs/manta"
  url "https://github.com/eth-cscs/manta/archive/v1.2.tar.gz"
  sha256 "deadbeef"
  version "1.2"
end
"#;
    std::fs::write(tmp.path().join("manta.rb"), formula).unwrap();

    brew(&tmp)
        .args(["validate", "manta.rb"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("4 violation(s)"))
        .stdout(predicate::str::contains("homepage [invalid-url]"))
        .stdout(predicate::str::contains("sha256 [invalid-checksum]"))
        .stdout(predicate::str::contains("version [invalid-version]"))
        .stdout(predicate::str::contains("install [missing-install-steps]"));
}

// ---------------------------------------------------------------------------
// checksum / show / misc
// ---------------------------------------------------------------------------

#[test]
fn checksum_prints_sha256sum_lines() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("empty.tar.gz"), b"").unwrap();
    brew(&tmp)
        .args(["checksum", "empty.tar.gz"])
        .assert()
        .success()
        .stdout(predicate::eq(
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855  empty.tar.gz\n",
        ));
}

#[test]
fn checksum_reads_stdin() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp)
        .args(["checksum", "-"])
        .write_stdin("abc")
        .assert()
        .success()
        .stdout(predicate::eq(
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad  -\n",
        ));
}

#[test]
fn checksum_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp)
        .args(["checksum", "missing.tar.xz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to hash missing.tar.xz"));
}

#[test]
fn show_summarizes_template() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp).args(["init", "--quiet"]).assert().success();

    let out = stdout_of(brew(&tmp).args(["--json", "show"]));
    let summary: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(summary["name"], "manta");
    assert_eq!(summary["ready"], true);
    assert_eq!(summary["artifacts"].as_array().unwrap().len(), 2);
    assert_eq!(
        summary["artifacts"][0]["file_name"],
        "manta-aarch64-apple-darwin.tar.xz"
    );
    assert_eq!(
        summary["placeholders"],
        serde_json::json!(["{{ VERSION }}", "{{ ARTIFACT }}", "{{ SHA }}"])
    );
}

#[test]
fn show_reports_archive_of_plain_url() {
    let tmp = ruby_project();
    let out = stdout_of(brew(&tmp).args(["--json", "show"]));
    let summary: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(summary["archive"], "tar.xz");
    assert!(summary["artifacts"].as_array().unwrap().is_empty());
}

#[test]
fn show_reports_template_problems() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("manta.rb"),
        MANTA_RB.replace("  homepage \"https://github.com/eth-cscs/manta\"\n", ""),
    )
    .unwrap();
    brew(&tmp)
        .args(["show", "--template", "manta.rb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(missing)"))
        .stdout(predicate::str::contains("missing required field 'homepage'"));
}

#[test]
fn version_json() {
    let tmp = TempDir::new().unwrap();
    let out = stdout_of(brew(&tmp).args(["--json", "version"]));
    let info: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(info["version"].is_string());
    assert_eq!(
        info["archive_formats"],
        serde_json::json!(["tar.xz", "tar.gz"])
    );
}

#[test]
fn completion_bash_mentions_binary() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("manta-brew"));
}

#[test]
fn completion_writes_into_directory() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp)
        .args(["completion", "fish", "--dir", "completions"])
        .assert()
        .success();
    assert!(tmp.path().join("completions/manta-brew.fish").is_file());
}

#[test]
fn missing_template_is_reported() {
    let tmp = TempDir::new().unwrap();
    brew(&tmp)
        .args(["validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template not found"));
}
