use super::types::TurnContext;
use crate::actions::{FamilySchema, registry};
use crate::memory::render_entries;
use std::fmt::Write;

const RESPONSE_FORMAT: &str = r#"When the user asks you to do something on this machine, respond with ONLY a JSON object:
{
  "tool": "<family>",
  "arguments": {"action": "<sub-action, only for families that list actions>", "<name>": "<value>"},
  "explanation": "<one line describing what this will do>"
}

All argument values are strings. If the request is a question about earlier output, or needs no action, answer in plain text instead."#;

const EXAMPLES: &str = r#"Examples:
{"tool": "resource_status", "arguments": {"component": "disk"}, "explanation": "Check disk usage"}
{"tool": "run_command", "arguments": {"command": "cat /etc/os-release"}, "explanation": "Check OS version"}
{"tool": "service_admin", "arguments": {"action": "logs", "service": "sshd", "lines": "100"}, "explanation": "Show the last 100 sshd log lines"}
{"tool": "cluster_admin", "arguments": {"action": "pods", "namespace": "all"}, "explanation": "List pods in every namespace"}

Guidance:
- Use resource_status only for CPU, memory, disk, network, container and cluster summaries. Use run_command for OS version, hostname, uptime and similar facts.
- Use cluster_admin with action "check_health" when the user asks about problems or health.
- When reading logs or describing a pod, use the same namespace the pod was listed in."#;

/// Plain-text tool catalogue, one block per family.
pub fn render_catalogue() -> String {
    let mut out = String::new();
    for schema in registry() {
        render_family(&mut out, schema);
    }
    out
}

fn render_family(out: &mut String, schema: &FamilySchema) {
    let _ = writeln!(out, "- {}: {}", schema.family, schema.description);
    if schema.has_sub_actions() {
        let actions: Vec<&str> = schema.sub_actions().collect();
        let _ = writeln!(out, "    action = {}", actions.join("|"));
    }
    for op in schema.operations {
        let args: Vec<String> = op
            .arguments()
            .map(|(spec, required)| {
                let mut text = spec.name.to_string();
                if !spec.choices.is_empty() {
                    let _ = write!(text, " = {}", spec.choices.join("|"));
                }
                match (required, spec.default) {
                    (true, _) => {}
                    (false, Some(default)) => {
                        let _ = write!(text, " (optional, default {default})");
                    }
                    (false, None) => text.push_str(" (optional)"),
                }
                text
            })
            .collect();
        let args = if args.is_empty() {
            "no arguments".to_string()
        } else {
            args.join(", ")
        };
        match op.sub_action {
            Some(sub) => {
                let _ = writeln!(out, "    {sub}: {} [{args}]", op.description);
            }
            None => {
                let _ = writeln!(out, "    args: {args}");
            }
        }
    }
}

/// System prompt: host context, catalogue and response format.
pub fn system_prompt(ctx: &TurnContext) -> String {
    let mut prompt = String::new();
    if !ctx.system_context.trim().is_empty() {
        prompt.push_str(ctx.system_context.trim_end());
        prompt.push_str("\n\n");
    }
    prompt.push_str("You are a system administration assistant with access to these tools:\n\n");
    prompt.push_str(&render_catalogue());
    prompt.push('\n');
    prompt.push_str(RESPONSE_FORMAT);
    prompt.push_str("\n\n");
    prompt.push_str(EXAMPLES);
    prompt
}

/// User message: replayed history followed by the current request.
pub fn user_message(ctx: &TurnContext, instruction: &str) -> String {
    let history = render_entries(&ctx.history);
    if history.is_empty() {
        format!("Current user request: {instruction}")
    } else {
        format!("{history}\nCurrent user request: {instruction}")
    }
}
