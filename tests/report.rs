//! Report Pipeline Tests

use std::path::Path;
use std::process::{Command, Output};

use inkforge_core::{
    load_report_data, pipeline::build_report_pdf, render_report, FontSet, PipelineError,
    ReportData, SearchResult,
};

fn sample(n_results: usize, output_path: Option<&Path>) -> ReportData {
    ReportData {
        question: "How do cats choose where to sleep?".to_string(),
        claude_answer: "Warmth matters most.\n\nSafety comes second.".to_string(),
        search_results: (1..=n_results)
            .map(|i| SearchResult {
                title: format!("Source {}", i),
                url: format!("https://example.com/cats/{}", i),
                description: format!("Notes on feline habit {}", i),
            })
            .collect(),
        conclusion: "Cats pick warm, sheltered spots.".to_string(),
        output_path: output_path.map(|p| p.display().to_string()),
    }
}

fn write_json(dir: &Path, value: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.join("data.json");
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn run_report(args: &[&Path], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_inkforge-report"))
        .args(args)
        .current_dir(cwd)
        .output()
        .unwrap()
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

#[test]
fn report_written_at_given_path() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("cats.pdf");
    let data = sample(3, Some(&out));

    let file = render_report(&data, &FontSet::base14()).unwrap();
    assert_eq!(file.path, out);
    assert!(file.bytes > 0);
    assert_eq!(file.pages, Some(1));

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn every_result_url_becomes_a_link() {
    let data = sample(4, None);
    let (bytes, _) = build_report_pdf(&data, &FontSet::base14(), chrono::Local::now()).unwrap();
    assert_eq!(count(&bytes, b"/URI ("), 4);
    assert!(count(&bytes, b"(https://example.com/cats/4)") >= 1);
}

#[test]
fn only_ten_results_are_rendered() {
    let data = sample(13, None);
    let (bytes, _) = build_report_pdf(&data, &FontSet::base14(), chrono::Local::now()).unwrap();
    assert_eq!(count(&bytes, b"/URI ("), 10);
    assert_eq!(count(&bytes, b"https://example.com/cats/11"), 0);
}

#[test]
fn long_answer_spills_onto_more_pages() {
    let mut data = sample(1, None);
    data.claude_answer = vec!["Cats sleep in sunny spots for most of the afternoon."; 120].join("\n\n");
    let (_, pages) = build_report_pdf(&data, &FontSet::base14(), chrono::Local::now()).unwrap();
    assert!(pages > 1);
}

#[test]
fn missing_key_is_a_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(
        dir.path(),
        &serde_json::json!({"question": "q", "claude_answer": "a", "conclusion": "c"}),
    );
    let err = load_report_data(&path).unwrap_err();
    assert!(matches!(err, PipelineError::Json(_)));
}

#[test]
fn cli_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");
    let json = serde_json::to_value(sample(2, Some(&out))).unwrap();
    let input = write_json(dir.path(), &json);

    let output = run_report(&[input.as_path()], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("✅ Report generated: {}", out.display())));
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn cli_defaults_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let json = serde_json::to_value(sample(1, None)).unwrap();
    let input = write_json(dir.path(), &json);

    let output = run_report(&[input.as_path()], dir.path());
    assert!(output.status.success());
    assert!(dir.path().join("research_report.pdf").exists());
}

#[test]
fn cli_wrong_argument_count_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let extra = dir.path().join("extra.json");

    for args in [vec![], vec![extra.as_path(), extra.as_path()]] {
        let output = run_report(&args, dir.path());
        assert_eq!(output.status.code(), Some(1));

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.starts_with("Usage: inkforge-report <data.json>\n\nExpected JSON format:"));
        assert!(stdout.contains("\"search_results\""));
        assert!(!dir.path().join("research_report.pdf").exists());
    }
}

#[test]
fn cli_missing_key_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_json(dir.path(), &serde_json::json!({"question": "q"}));

    let output = run_report(&[input.as_path()], dir.path());
    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).is_empty());
    assert!(!dir.path().join("research_report.pdf").exists());
}

#[test]
fn cli_help_exits_cleanly_without_output() {
    let dir = tempfile::tempdir().unwrap();

    for flag in ["--help", "--version"] {
        let output = run_report(&[Path::new(flag)], dir.path());
        assert_eq!(output.status.code(), Some(0));

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("inkforge-report"));
        assert!(!stdout.contains("Expected JSON format:"));
        assert!(!dir.path().join("research_report.pdf").exists());
    }
}
