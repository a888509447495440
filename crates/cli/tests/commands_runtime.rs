use std::env;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use wardrobe_cli::commands::{migrate, recommend, seed};
use wardrobe_cli::RecommendArgs;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("WARDROBE_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("WARDROBE_DATABASE_URL", "postgres://localhost/wardrobe")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_reports_demo_garments() {
    with_env(&[("WARDROBE_DATABASE_URL", "sqlite::memory:")], || {
        let result = seed::run("demo");
        assert_eq!(result.exit_code, 0, "expected seed success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["data"]["owner"], "demo");
        let garments = payload["data"]["garments"].as_array().expect("garment slugs");
        assert!(garments.iter().any(|slug| slug == "tee-white"));
        assert!(payload["message"].as_str().unwrap_or("").contains("10 of 10"));
    });
}

#[test]
fn seed_then_recommend_against_file_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = file_url(&dir.path().join("wardrobe.db"));

    with_env(&[("WARDROBE_DATABASE_URL", url.as_str())], || {
        let first = seed::run("demo");
        assert_eq!(first.exit_code, 0, "expected first seed success: {}", first.output);
        let second = seed::run("demo");
        assert_eq!(second.exit_code, 0, "expected second seed success");
        assert!(parse_payload(&second.output)["message"]
            .as_str()
            .unwrap_or("")
            .contains("0 of 10"));

        let args = RecommendArgs {
            owner: "demo".to_string(),
            include_coat: Some(true),
            seed: Some(11),
            ..RecommendArgs::default()
        };
        let result = recommend::run(&args);
        assert_eq!(result.exit_code, 0, "expected recommend success: {}", result.output);

        let payload = parse_payload(&result.output);
        let outfits = payload["data"]["outfits"].as_array().expect("outfits");
        assert!(!outfits.is_empty() && outfits.len() <= 3);

        let scores: Vec<u64> =
            outfits.iter().map(|outfit| outfit["score"].as_u64().expect("score")).collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]), "ranked best first");
        assert!(scores.iter().all(|score| *score <= 100));
        assert!(outfits.iter().all(|outfit| !outfit["coat"].is_null()), "coat attached");

        let repeat = recommend::run(&args);
        assert_eq!(parse_payload(&repeat.output)["data"], payload["data"], "seeded output repeats");
    });
}

#[test]
fn recommend_for_empty_wardrobe_reports_inventory_error() {
    with_env(&[("WARDROBE_DATABASE_URL", "sqlite::memory:")], || {
        let args = RecommendArgs { owner: "nobody".to_string(), ..RecommendArgs::default() };
        let result = recommend::run(&args);
        assert_eq!(result.exit_code, 7);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["error_class"], "insufficient_inventory");
    });
}

fn file_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "WARDROBE_DATABASE_URL",
        "WARDROBE_DATABASE_MAX_CONNECTIONS",
        "WARDROBE_DATABASE_TIMEOUT_SECS",
        "WARDROBE_SERVER_BIND_ADDRESS",
        "WARDROBE_SERVER_PORT",
        "WARDROBE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "WARDROBE_LOGGING_LEVEL",
        "WARDROBE_LOGGING_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
