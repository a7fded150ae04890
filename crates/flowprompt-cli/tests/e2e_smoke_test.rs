use std::{fs, path::PathBuf};

use tempfile::tempdir;

use flowprompt_cli::{Args, OutputFormat, run};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(input: &PathBuf, output: &PathBuf, format: OutputFormat) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: Some(output.to_string_lossy().to_string()),
        format,
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_fixtures = collect_json_files(fixtures_dir());

    assert!(
        !valid_fixtures.is_empty(),
        "No valid fixtures found in tests/fixtures/"
    );

    let mut failed = Vec::new();

    for fixture in &valid_fixtures {
        let stem = fixture.file_stem().unwrap().to_string_lossy().to_string();
        for (format, extension) in [(OutputFormat::Prompt, "txt"), (OutputFormat::Svg, "svg")] {
            let output_path = temp_dir.path().join(format!("{stem}.{extension}"));

            match run(&args(fixture, &output_path, format)) {
                Ok(()) => {
                    let written = fs::read_to_string(&output_path).unwrap_or_default();
                    if written.is_empty() {
                        failed.push((fixture.clone(), "empty output".to_string()));
                    }
                }
                Err(e) => failed.push((fixture.clone(), e.to_string())),
            }
        }
    }

    if !failed.is_empty() {
        eprintln!("\nValid fixtures that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid fixture run(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_fixtures = collect_json_files(fixtures_dir().join("errors"));

    assert!(
        !error_fixtures.is_empty(),
        "No error fixtures found in tests/fixtures/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for fixture in &error_fixtures {
        let output_path = temp_dir.path().join(format!(
            "error_{}.txt",
            fixture.file_stem().unwrap().to_string_lossy()
        ));

        if run(&args(fixture, &output_path, OutputFormat::Prompt)).is_ok() {
            unexpectedly_succeeded.push(fixture.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError fixtures that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error fixture(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_prompt_output_for_branching_flow() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = fixtures_dir().join("support_triage.json");
    let output = temp_dir.path().join("triage.txt");

    run(&args(&input, &output, OutputFormat::Prompt)).expect("Failed to compile fixture");
    let prompt = fs::read_to_string(&output).expect("Failed to read output");

    assert!(prompt.starts_with("## Declarations\n- \"Always be polite\"\n\n## Legend\n"));
    assert!(prompt.contains(
        "## Logic\n\
         [1] START\n    → [2]\n\
         [2] ACTION: \"Read the ticket\"\n    → [3]\n\
         [3] IF (\"Is it a bug?\"):\n    CASE ('yes') → [4]\n    CASE ('no') → [5]\n\
         [4] ACTION: \"Escalate to engineering\"\n    → [6]\n\
         [5] ACTION: \"Answer from the FAQ\"\n    → [6]\n\
         [6] END"
    ));
}

#[test]
fn e2e_missing_input_file() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("missing.json");
    let output = temp_dir.path().join("out.txt");

    let err = run(&args(&input, &output, OutputFormat::Prompt)).unwrap_err();
    assert!(matches!(err, flowprompt::FlowError::Io(_)));
}

#[test]
fn e2e_explicit_config_is_applied() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[prompt]\nlanguage = \"korean\"\n").unwrap();

    let input = fixtures_dir().join("linear.json");
    let output = temp_dir.path().join("linear.txt");
    let mut args = args(&input, &output, OutputFormat::Prompt);
    args.config = Some(config_path.to_string_lossy().to_string());

    run(&args).expect("Failed to compile fixture");
    let prompt = fs::read_to_string(&output).expect("Failed to read output");
    assert!(prompt.starts_with("## 기호 설명\n"));
}
