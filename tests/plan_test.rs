//! Tests for plan parsing and plan-driven execution.

use rgraph_exec::engine::NodeState;
use rgraph_exec::plan::Plan;
use rgraph_exec::{ActionType, Error, Event, Executor, ExecutorConfig, Key, ResourceId, RunContext};
use std::io::Write;

const WEB_PLAN: &str = r#"
[[exists]]
project_id = "proj1"
resource = "healthChecks"
key = { global = "hc" }

[[action]]
name = "create-backend"
type = "create"
summary = "Create the backend service"
want = [{ exists = { project_id = "proj1", resource = "healthChecks", key = { global = "hc" } } }]
emit = [{ exists = { project_id = "proj1", resource = "backendServices", key = { global = "be" } } }]

[[action]]
name = "create-url-map"
type = "create"
want = [{ exists = { project_id = "proj1", resource = "backendServices", key = { global = "be" } } }]
emit = [{ string = "url-map-ready" }]
"#;

#[test]
fn parses_actions_and_relays() {
    let plan = Plan::from_toml_str(WEB_PLAN).expect("valid plan");
    assert_eq!(plan.exists.len(), 1);
    assert!(plan.not_exists.is_empty());
    assert_eq!(plan.actions.len(), 2);

    let backend = &plan.actions[0];
    assert_eq!(backend.name, "create-backend");
    assert_eq!(backend.action_type, ActionType::Create);
    assert_eq!(
        backend.want,
        vec![Event::exists(ResourceId::new(
            "proj1",
            "healthChecks",
            Key::global("hc")
        ))]
    );
    assert_eq!(plan.actions[1].emit, vec![Event::string("url-map-ready")]);
}

#[test]
fn relays_come_first() {
    let actions = Plan::from_toml_str(WEB_PLAN).unwrap().into_actions();
    assert_eq!(actions.len(), 3);

    let meta = actions[0].metadata();
    assert_eq!(meta.action_type, ActionType::Exists);
    assert_eq!(meta.name, "EventAction([Exists(healthChecks:proj1/hc)])");

    let meta = actions[2].metadata();
    assert_eq!(meta.name, "create-url-map");
    assert_eq!(meta.summary, "Scripted action from plan");
}

#[test]
fn scoped_keys_parse() {
    let plan = Plan::from_toml_str(
        r#"
[[not_exists]]
project_id = "p"
resource = "instances"
key = { zonal = { zone = "us-east1-b", name = "vm" } }
"#,
    )
    .unwrap();
    assert_eq!(
        plan.not_exists[0],
        ResourceId::new("p", "instances", Key::zonal("us-east1-b", "vm"))
    );
}

#[test]
fn rejects_duplicate_names() {
    let err = Plan::from_toml_str(
        r#"
[[action]]
name = "a"

[[action]]
name = "a"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Plan(ref m) if m.contains("duplicate action name: a")));
}

#[test]
fn rejects_empty_name() {
    let err = Plan::from_toml_str("[[action]]\nname = \"  \"\n").unwrap_err();
    assert!(matches!(err, Error::Plan(_)));
}

#[test]
fn rejects_unknown_fields() {
    let err = Plan::from_toml_str("[[action]]\nname = \"a\"\nwants = []\n").unwrap_err();
    assert!(matches!(err, Error::Plan(_)));
}

#[test]
fn load_reports_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(WEB_PLAN.as_bytes()).unwrap();
    let plan = Plan::load(file.path()).unwrap();
    assert_eq!(plan.actions.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let err = Plan::load(&missing).unwrap_err();
    assert!(err.to_string().contains("missing.toml"));
}

#[tokio::test]
async fn runs_plan_end_to_end() {
    let actions = Plan::from_toml_str(WEB_PLAN).unwrap().into_actions();
    let result = Executor::new(actions, ExecutorConfig::default())
        .run(&RunContext::background(), None)
        .await
        .expect("plan should complete");

    let order: Vec<&str> = result
        .completed
        .iter()
        .map(|c| c.metadata.name.as_str())
        .collect();
    assert_eq!(
        order,
        vec![
            "EventAction([Exists(healthChecks:proj1/hc)])",
            "create-backend",
            "create-url-map"
        ]
    );
}

#[tokio::test]
async fn dry_run_ignores_scripted_failures() {
    let plan = r#"
[[action]]
name = "a"
emit = [{ string = "a" }]
fail = "quota exceeded"

[[action]]
name = "b"
want = [{ string = "a" }]
"#;

    let actions = Plan::from_toml_str(plan).unwrap().into_actions();
    let config = ExecutorConfig {
        dry_run: true,
        ..ExecutorConfig::default()
    };
    let result = Executor::new(actions, config)
        .run(&RunContext::background(), None)
        .await
        .unwrap();
    assert_eq!(result.completed.len(), 2);

    let actions = Plan::from_toml_str(plan).unwrap().into_actions();
    let err = Executor::new(actions, ExecutorConfig::default())
        .run(&RunContext::background(), None)
        .await
        .unwrap_err();
    let result = err.exec_result().unwrap();
    assert_eq!(result.failed[0].error, "action a failed: quota exceeded");
    assert_eq!(result.pending[0].state, NodeState::Blocked);
}

#[tokio::test]
async fn delayed_action_observes_timeout() {
    let plan = r#"
[[action]]
name = "slow"
delay_ms = 10000
"#;
    let actions = Plan::from_toml_str(plan).unwrap().into_actions();
    let config = ExecutorConfig {
        timeout: Some(std::time::Duration::from_millis(20)),
        ..ExecutorConfig::default()
    };
    let err = Executor::new(actions, config)
        .run(&RunContext::background(), None)
        .await
        .unwrap_err();

    // Nothing else was pending, so the failure itself is reported.
    let result = err.exec_result().expect("slow action failed");
    assert_eq!(result.failed[0].error, "context deadline exceeded");
}
