use crate::doubles::{FixedBroker, ScriptedProvider, ScriptedRunner};
use std::sync::Arc;
use std::time::Duration;
use sysops_agent::agent::{InferenceSettings, Orchestrator, TurnOutcome};
use sysops_agent::dispatch::{CommandOutput, DispatchSettings, Dispatcher};
use sysops_agent::memory::ConversationMemory;
use sysops_agent::security::{ApprovalDecision, Confirmation};

fn orchestrator(
    reply: &str,
    runner: Arc<ScriptedRunner>,
    broker: Arc<FixedBroker>,
) -> Orchestrator {
    Orchestrator::new(
        Arc::new(ScriptedProvider::new([reply])),
        Dispatcher::new(runner, DispatchSettings::default()),
        broker,
        ConversationMemory::new(3, 500),
        InferenceSettings {
            model: "test-model".into(),
            temperature: 0.2,
            timeout: Duration::from_secs(5),
        },
    )
}

fn write_reply(path: &std::path::Path) -> String {
    serde_json::json!({
        "tool": "write_path",
        "arguments": {"path": path.display().to_string(), "content": "hello\n"},
        "explanation": "Write a greeting"
    })
    .to_string()
}

#[tokio::test]
async fn declined_write_never_touches_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("greeting.txt");
    let broker = Arc::new(FixedBroker::new(Confirmation::Declined));
    let runner = Arc::new(ScriptedRunner::new());
    let mut agent = orchestrator(&write_reply(&target), runner.clone(), broker.clone());

    let outcome = agent.process_turn("write a greeting").await;

    assert!(matches!(outcome, TurnOutcome::Cancelled { .. }), "{outcome:?}");
    assert_eq!(broker.asked(), 1);
    assert!(!target.exists());
    assert!(runner.calls().is_empty());
    assert_eq!(
        agent.memory().context_window()[0].result_summary.as_deref(),
        Some("cancelled by user")
    );
}

#[tokio::test]
async fn confirmed_write_creates_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("greeting.txt");
    let broker = Arc::new(FixedBroker::new(Confirmation::Approved));
    let mut agent = orchestrator(
        &write_reply(&target),
        Arc::new(ScriptedRunner::new()),
        broker.clone(),
    );

    let outcome = agent.process_turn("write a greeting").await;

    let TurnOutcome::Executed {
        decision, envelope, ..
    } = outcome
    else {
        panic!("expected an executed turn, got {outcome:?}");
    };
    assert_eq!(decision, ApprovalDecision::Confirmed);
    assert!(envelope.is_success());
    assert_eq!(broker.asked(), 1);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello\n");
}

#[tokio::test]
async fn auto_approve_skips_the_broker() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("greeting.txt");
    let broker = Arc::new(FixedBroker::new(Confirmation::Declined));
    let mut agent = orchestrator(
        &write_reply(&target),
        Arc::new(ScriptedRunner::new()),
        broker.clone(),
    )
    .with_auto_approve(true);

    let outcome = agent.process_turn("write a greeting").await;

    assert!(matches!(
        outcome,
        TurnOutcome::Executed {
            decision: ApprovalDecision::AutoApproved,
            ..
        }
    ));
    assert_eq!(broker.asked(), 0);
    assert!(target.exists());
}

#[tokio::test]
async fn destructive_command_needs_confirmation() {
    let broker = Arc::new(FixedBroker::new(Confirmation::Declined));
    let runner = Arc::new(ScriptedRunner::new());
    let mut agent = orchestrator(
        r#"{"tool": "run_command", "arguments": {"command": "rm -rf /var/tmp/cache"}}"#,
        runner.clone(),
        broker.clone(),
    );

    let outcome = agent.process_turn("clear the cache").await;

    assert!(matches!(outcome, TurnOutcome::Cancelled { .. }), "{outcome:?}");
    assert_eq!(broker.asked(), 1);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn harmless_command_runs_without_asking() {
    let broker = Arc::new(FixedBroker::new(Confirmation::Declined));
    let runner = Arc::new(
        ScriptedRunner::new().on("sh -c uptime", CommandOutput::ok(" 10:00 up 3 days\n")),
    );
    let mut agent = orchestrator(
        r#"{"tool": "run_command", "arguments": {"command": "uptime"}}"#,
        runner.clone(),
        broker.clone(),
    );

    let outcome = agent.process_turn("how long has it been up?").await;

    let TurnOutcome::Executed { envelope, .. } = outcome else {
        panic!("expected an executed turn, got {outcome:?}");
    };
    assert_eq!(broker.asked(), 0);
    assert_eq!(envelope.get("stdout"), Some(" 10:00 up 3 days\n"));
    assert_eq!(envelope.get("returncode"), Some("0"));
}
