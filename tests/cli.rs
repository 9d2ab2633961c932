use std::process::{Command, Output};

fn classify_visual(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_classify-visual"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1, "expected one JSON line, got {stdout:?}");
    serde_json::from_str(stdout.trim_end()).unwrap()
}

#[test]
fn missing_image_reports_json_error() {
    for mode in ["classify", "detect"] {
        let output = classify_visual(&[mode, "/no/such/image.png"]);

        assert_eq!(output.status.code(), Some(1));
        assert_eq!(
            stdout_json(&output),
            serde_json::json!({ "error": "Image not found: /no/such/image.png" })
        );
    }
}

#[test]
fn undecodable_image_reports_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not an image").unwrap();

    let output = classify_visual(&["detect", path.to_str().unwrap(), "--min-score", "0.6"]);

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert!(json["error"].as_str().unwrap().starts_with("image:"));
}

#[test]
fn min_score_outside_unit_range_is_accepted() {
    let output = classify_visual(&["classify", "/no/such/page.png", "--min-score", "2"]);

    // parsing succeeds, so the run fails on the missing file instead
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({ "error": "Image not found: /no/such/page.png" })
    );
}
