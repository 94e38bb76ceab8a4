use crate::doubles::{ScriptedProvider, ScriptedRunner, StalledProvider};
use std::sync::Arc;
use std::time::Duration;
use sysops_agent::agent::{InferenceSettings, Orchestrator, TurnOutcome};
use sysops_agent::dispatch::{CommandOutput, DispatchSettings, Dispatcher};
use sysops_agent::memory::ConversationMemory;
use sysops_agent::providers::Provider;
use sysops_agent::security::{ApprovalDecision, AutoDenyBroker};

const DF_OUTPUT: &str = "Filesystem Size Used Avail Use% Mounted on\n/dev/sda1 100G 42G 58G 42% /\n";

fn orchestrator(provider: Arc<dyn Provider>, runner: Arc<ScriptedRunner>) -> Orchestrator {
    orchestrator_with_timeout(provider, runner, Duration::from_secs(5))
}

fn orchestrator_with_timeout(
    provider: Arc<dyn Provider>,
    runner: Arc<ScriptedRunner>,
    timeout: Duration,
) -> Orchestrator {
    Orchestrator::new(
        provider,
        Dispatcher::new(runner, DispatchSettings::default()),
        Arc::new(AutoDenyBroker {
            reason: "test".into(),
        }),
        ConversationMemory::new(3, 500),
        InferenceSettings {
            model: "test-model".into(),
            temperature: 0.2,
            timeout,
        },
    )
}

#[tokio::test]
async fn disk_usage_request_runs_resource_probe_and_records_memory() {
    let provider = Arc::new(ScriptedProvider::new([
        r#"{"tool": "resource_status", "arguments": {"component": "disk"}, "explanation": "Check disk usage"}"#,
    ]));
    let runner = Arc::new(ScriptedRunner::new().on("df -h", CommandOutput::ok(DF_OUTPUT)));
    let mut agent = orchestrator(provider.clone(), runner.clone());

    let outcome = agent.process_turn("what's my disk usage").await;

    let TurnOutcome::Executed {
        decision, envelope, ..
    } = outcome
    else {
        panic!("expected an executed turn, got {outcome:?}");
    };
    assert_eq!(decision, ApprovalDecision::AutoApproved);
    assert!(envelope.is_success());
    assert!(envelope.get("disk").is_some_and(|disk| disk.contains("/dev/sda1")));
    assert_eq!(runner.calls(), vec!["df -h".to_string()]);

    let window = agent.memory().context_window();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].instruction, "what's my disk usage");
    assert_eq!(window[0].action_family.as_deref(), Some("resource_status"));
    assert!(
        window[0]
            .result_summary
            .as_deref()
            .is_some_and(|summary| summary.contains("42%"))
    );
}

#[tokio::test]
async fn fenced_tool_call_is_still_recognised() {
    let provider = Arc::new(ScriptedProvider::new([
        "```json\n{\"tool\": \"service_admin\", \"arguments\": {\"action\": \"status\", \"service\": \"sshd\"}}\n```",
    ]));
    let runner = Arc::new(
        ScriptedRunner::new().on("systemctl status sshd", CommandOutput::ok("active (running)")),
    );
    let mut agent = orchestrator(provider, runner.clone());

    let outcome = agent.process_turn("is sshd up?").await;

    assert!(matches!(outcome, TurnOutcome::Executed { .. }), "{outcome:?}");
    assert_eq!(runner.calls(), vec!["systemctl status sshd".to_string()]);
}

#[tokio::test]
async fn invalid_proposal_is_rejected_without_dispatch() {
    let provider = Arc::new(ScriptedProvider::new([
        r#"{"tool": "service_admin", "arguments": {"action": "explode", "service": "sshd"}}"#,
    ]));
    let runner = Arc::new(ScriptedRunner::new());
    let mut agent = orchestrator(provider, runner.clone());

    let outcome = agent.process_turn("blow up sshd").await;

    assert!(matches!(outcome, TurnOutcome::Rejected { .. }), "{outcome:?}");
    assert!(runner.calls().is_empty());
    let window = agent.memory().context_window();
    assert_eq!(window.len(), 1);
    assert!(
        window[0]
            .result_summary
            .as_deref()
            .is_some_and(|summary| summary.starts_with("rejected:"))
    );
}

#[tokio::test]
async fn unknown_family_is_rejected() {
    let provider = Arc::new(ScriptedProvider::new([
        r#"{"tool": "format_disk", "arguments": {"device": "/dev/sda"}}"#,
    ]));
    let runner = Arc::new(ScriptedRunner::new());
    let mut agent = orchestrator(provider, runner.clone());

    let outcome = agent.process_turn("format my disk").await;

    assert!(matches!(outcome, TurnOutcome::Rejected { .. }), "{outcome:?}");
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn plain_text_reply_is_answered_verbatim() {
    let provider = Arc::new(ScriptedProvider::new([
        "Your disk is 42% full, which is fine.",
    ]));
    let runner = Arc::new(ScriptedRunner::new());
    let mut agent = orchestrator(provider, runner.clone());

    let outcome = agent.process_turn("is that a lot?").await;

    assert_eq!(
        outcome,
        TurnOutcome::Answered {
            text: "Your disk is 42% full, which is fine.".into()
        }
    );
    assert!(runner.calls().is_empty());
    assert_eq!(
        agent.memory().context_window()[0].response_text.as_deref(),
        Some("Your disk is 42% full, which is fine.")
    );
}

#[tokio::test]
async fn stalled_inference_times_out_and_is_recorded() {
    let runner = Arc::new(ScriptedRunner::new());
    let mut agent = orchestrator_with_timeout(
        Arc::new(StalledProvider),
        runner.clone(),
        Duration::from_millis(50),
    );

    let outcome = agent.process_turn("anything").await;

    let TurnOutcome::InferenceFailed { message } = outcome else {
        panic!("expected an inference failure, got {outcome:?}");
    };
    assert!(message.contains("did not answer"), "{message}");
    assert!(runner.calls().is_empty());
    assert_eq!(agent.memory().len(), 1);
}

#[tokio::test]
async fn provider_error_becomes_inference_failure() {
    // No scripted replies left, so the provider errors immediately.
    let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
    let mut agent = orchestrator(provider, Arc::new(ScriptedRunner::new()));

    let outcome = agent.process_turn("hello").await;

    assert!(matches!(outcome, TurnOutcome::InferenceFailed { .. }), "{outcome:?}");
}

#[tokio::test]
async fn earlier_turns_are_replayed_into_the_next_prompt() {
    let provider = Arc::new(ScriptedProvider::new([
        r#"{"tool": "resource_status", "arguments": {"component": "disk"}}"#,
        "It is 42% full.",
    ]));
    let runner = Arc::new(ScriptedRunner::new().on("df -h", CommandOutput::ok(DF_OUTPUT)));
    let mut agent = orchestrator(provider.clone(), runner);

    agent.process_turn("check disk").await;
    agent.process_turn("how full is it?").await;

    let messages = provider.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], "Current user request: check disk");
    assert!(messages[1].starts_with("Previous conversation:"));
    assert!(messages[1].contains("User: check disk"));
    assert!(messages[1].contains("Tool result (resource_status):"));
    assert!(messages[1].ends_with("Current user request: how full is it?"));
}

#[tokio::test]
async fn memory_window_keeps_only_the_latest_turns() {
    let provider = Arc::new(ScriptedProvider::new(["one", "two", "three", "four"]));
    let mut agent = orchestrator(provider, Arc::new(ScriptedRunner::new()));

    for instruction in ["a", "b", "c", "d"] {
        agent.process_turn(instruction).await;
    }

    let kept: Vec<_> = agent
        .memory()
        .context_window()
        .iter()
        .map(|entry| entry.instruction.as_str())
        .collect();
    assert_eq!(kept, ["b", "c", "d"]);
}

#[tokio::test]
async fn system_prompt_carries_context_and_catalogue() {
    let provider = Arc::new(ScriptedProvider::new(["ok"]));
    let mut agent = orchestrator(provider.clone(), Arc::new(ScriptedRunner::new()))
        .with_system_context("host: build-01");

    agent.process_turn("hi").await;

    let systems = provider.systems.lock().unwrap().clone();
    assert!(systems[0].contains("host: build-01"));
    assert!(systems[0].contains("- resource_status:"));
    assert!(systems[0].contains("- cluster_admin:"));
}
