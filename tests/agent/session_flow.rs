use crate::doubles::{FixedBroker, ScriptedProvider, ScriptedRunner};
use std::sync::Arc;
use std::time::Duration;
use sysops_agent::agent::{InferenceSettings, Orchestrator, ScriptedLines, run_session};
use sysops_agent::dispatch::{CommandOutput, DispatchSettings, Dispatcher};
use sysops_agent::memory::ConversationMemory;
use sysops_agent::security::Confirmation;

fn orchestrator(provider: Arc<ScriptedProvider>, runner: Arc<ScriptedRunner>) -> Orchestrator {
    Orchestrator::new(
        provider,
        Dispatcher::new(runner, DispatchSettings::default()),
        Arc::new(FixedBroker::new(Confirmation::Declined)),
        ConversationMemory::new(3, 500),
        InferenceSettings {
            model: "test-model".into(),
            temperature: 0.2,
            timeout: Duration::from_secs(5),
        },
    )
}

async fn session(agent: &mut Orchestrator, lines: &[&str]) -> String {
    let mut input = ScriptedLines::new(lines.iter().copied());
    let mut out = Vec::new();
    run_session(agent, &mut input, &mut out).await.unwrap();
    console::strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned()
}

#[tokio::test]
async fn quit_word_ends_the_session_before_later_lines() {
    let provider = Arc::new(ScriptedProvider::new(["unused"]));
    let mut agent = orchestrator(provider.clone(), Arc::new(ScriptedRunner::new()));

    let transcript = session(&mut agent, &["QUIT", "check disk"]).await;

    assert!(transcript.contains("Model: test-model"));
    assert!(transcript.trim_end().ends_with("Goodbye!"));
    assert!(provider.messages().is_empty());
    assert!(agent.memory().is_empty());
}

#[tokio::test]
async fn end_of_input_ends_the_session() {
    let provider = Arc::new(ScriptedProvider::new(["Hello there."]));
    let mut agent = orchestrator(provider, Arc::new(ScriptedRunner::new()));

    let transcript = session(&mut agent, &["", "hi"]).await;

    assert!(transcript.contains("Response:\nHello there."));
    assert!(transcript.trim_end().ends_with("Goodbye!"));
    assert_eq!(agent.memory().len(), 1);
}

#[tokio::test]
async fn slash_commands_toggle_auto_approve() {
    let provider = Arc::new(ScriptedProvider::new(Vec::<String>::new()));
    let mut agent = orchestrator(provider.clone(), Arc::new(ScriptedRunner::new()));

    let transcript = session(&mut agent, &["/yes"]).await;
    assert!(transcript.contains("Auto-approve enabled"));
    assert!(agent.auto_approve());

    let transcript = session(&mut agent, &["/confirm", "exit"]).await;
    assert!(transcript.contains("Auto-approve is ON"));
    assert!(transcript.contains("Confirmations enabled"));
    assert!(!agent.auto_approve());
    assert!(provider.messages().is_empty());
}

#[tokio::test]
async fn executed_turn_is_rendered_with_its_fields() {
    let provider = Arc::new(ScriptedProvider::new([
        r#"{"tool": "service_admin", "arguments": {"action": "list"}, "explanation": "List services"}"#,
    ]));
    let runner = Arc::new(ScriptedRunner::new().on(
        "systemctl list-units --type=service --all --no-pager",
        CommandOutput::ok("sshd.service loaded active running\n"),
    ));
    let mut agent = orchestrator(provider, runner);

    let transcript = session(&mut agent, &["list services", "q"]).await;

    assert!(transcript.contains("Thinking..."));
    assert!(transcript.contains("✓ Auto-approved: List services"));
    assert!(transcript.contains("✓ Result:"));
    assert!(transcript.contains("sshd.service loaded active running"));
}
