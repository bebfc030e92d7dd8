// tests/config_env.rs
use mood_prank_analyzer::config::{ENV_MOOD_CONFIG_PATH, ENV_MOOD_TIME_UNIT_MS};
use mood_prank_analyzer::MoodConfig;
use std::{env, fs};

#[serial_test::serial]
#[test]
fn env_path_and_time_unit_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mood.toml");
    fs::write(
        &path,
        r#"
[timing]
time_unit_ms = 500
analysis_units = 5

[points]
joke = 30

[content]
jokes = ["Knock knock."]
"#,
    )
    .unwrap();

    env::set_var(ENV_MOOD_CONFIG_PATH, path.display().to_string());
    env::remove_var(ENV_MOOD_TIME_UNIT_MS);
    let cfg = MoodConfig::from_env().unwrap();
    assert_eq!(cfg.timing.time_unit_ms, 500);
    assert_eq!(cfg.timing.analysis_units, 5);
    assert_eq!(cfg.points.joke, 30);
    assert_eq!(cfg.points.quick_reply_positive, 12);
    assert_eq!(cfg.content.jokes, vec!["Knock knock.".to_string()]);
    // lists not in the file come from the embedded config
    assert_eq!(cfg.content.quick_replies.len(), 16);
    assert!(!cfg.lexicon.positive.is_empty());

    env::set_var(ENV_MOOD_TIME_UNIT_MS, "25");
    let cfg = MoodConfig::from_env().unwrap();
    assert_eq!(cfg.timing.time_unit_ms, 25);

    env::set_var(ENV_MOOD_TIME_UNIT_MS, "soon");
    let cfg = MoodConfig::from_env().unwrap();
    assert_eq!(cfg.timing.time_unit_ms, 500);

    env::remove_var(ENV_MOOD_TIME_UNIT_MS);
    env::remove_var(ENV_MOOD_CONFIG_PATH);
}

#[serial_test::serial]
#[test]
fn missing_file_falls_back_to_embedded() {
    let dir = tempfile::tempdir().unwrap();
    env::set_var(
        ENV_MOOD_CONFIG_PATH,
        dir.path().join("nope.toml").display().to_string(),
    );
    env::remove_var(ENV_MOOD_TIME_UNIT_MS);

    let cfg = MoodConfig::from_env().unwrap();
    assert_eq!(cfg, MoodConfig::default());

    env::remove_var(ENV_MOOD_CONFIG_PATH);
}

#[serial_test::serial]
#[test]
fn invalid_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[timing\ntime_unit_ms = ").unwrap();
    env::set_var(ENV_MOOD_CONFIG_PATH, path.display().to_string());

    let err = MoodConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("Invalid mood config"), "{err}");

    env::remove_var(ENV_MOOD_CONFIG_PATH);
}
