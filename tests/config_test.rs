use rgraph_exec::config::Config;
use rgraph_exec::engine::ErrorStrategy;
use std::sync::Mutex;
use std::time::Duration;

// Environment variables are process-global; serialize the tests that touch them.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "RGRAPH_DRY_RUN",
    "RGRAPH_MAX_CONCURRENT",
    "RGRAPH_ERROR_STRATEGY",
    "RGRAPH_TIMEOUT_SECS",
    "OTEL_ENDPOINT",
    "LOG_LEVEL",
];

fn clear_env() {
    for var in VARS {
        unsafe { std::env::remove_var(var) };
    }
}

#[test]
fn config_from_env_uses_defaults() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let config = Config::from_env().unwrap();
    assert!(!config.dry_run);
    assert_eq!(config.max_concurrent, 4);
    assert_eq!(config.error_strategy, ErrorStrategy::StopOnError);
    assert_eq!(config.timeout, None);
    assert_eq!(config.otel_endpoint, None);
    assert_eq!(config.log_level, "info");
}

#[test]
fn config_from_env_reads_overrides() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("RGRAPH_DRY_RUN", "true");
        std::env::set_var("RGRAPH_MAX_CONCURRENT", "1");
        std::env::set_var("RGRAPH_ERROR_STRATEGY", "continue");
        std::env::set_var("RGRAPH_TIMEOUT_SECS", "30");
        std::env::set_var("LOG_LEVEL", "debug");
    }

    let config = Config::from_env().unwrap();
    let exec = config.executor_config();
    assert!(exec.dry_run);
    assert_eq!(exec.max_concurrent, 1);
    assert_eq!(exec.error_strategy, ErrorStrategy::ContinueOnError);
    assert_eq!(exec.timeout, Some(Duration::from_secs(30)));
    assert_eq!(config.log_level, "debug");

    clear_env();
}

#[test]
fn config_from_env_rejects_malformed_values() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    for (var, value) in [
        ("RGRAPH_DRY_RUN", "maybe"),
        ("RGRAPH_MAX_CONCURRENT", "0"),
        ("RGRAPH_MAX_CONCURRENT", "-2"),
        ("RGRAPH_ERROR_STRATEGY", "retry"),
        ("RGRAPH_TIMEOUT_SECS", "soon"),
    ] {
        clear_env();
        unsafe { std::env::set_var(var, value) };
        assert!(Config::from_env().is_err(), "{var}={value} should be rejected");
    }

    clear_env();
}

#[test]
fn error_strategy_parses_aliases() {
    assert_eq!("stop".parse::<ErrorStrategy>().unwrap(), ErrorStrategy::StopOnError);
    assert_eq!(
        "Continue_On_Error".parse::<ErrorStrategy>().unwrap(),
        ErrorStrategy::ContinueOnError
    );
    assert!("".parse::<ErrorStrategy>().is_err());
}
