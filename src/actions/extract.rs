use super::registry::lookup;
use super::types::{Action, Family};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const FENCE: &str = "```";

/// An action the model asked for, plus its own one-line justification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub action: Action,
    pub explanation: Option<String>,
}

/// What a model response turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Action(Proposal),
    /// Conversational answer; carries the response unchanged.
    PlainText(String),
}

/// Recover a single structured action from a raw model response.
///
/// Never fails: anything that is not a well-formed `{"tool": ..., "arguments": {...}}`
/// object degrades to [`Extraction::PlainText`].
pub fn extract(raw: &str) -> Extraction {
    let body = strip_fence(raw.trim());
    if !body.starts_with('{') {
        return Extraction::PlainText(raw.to_string());
    }

    let object = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => object,
        Ok(_) => return Extraction::PlainText(raw.to_string()),
        Err(error) => {
            tracing::debug!("Response is not a tool call: {error}");
            return Extraction::PlainText(raw.to_string());
        }
    };

    let Some(tool) = object.get("tool").and_then(Value::as_str) else {
        tracing::debug!("Discarding JSON response without a string tool field");
        return Extraction::PlainText(raw.to_string());
    };

    let arguments = match object.get("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(arguments)) => arguments.clone(),
        Some(_) => {
            tracing::warn!(tool, "Discarding tool call whose arguments are not an object");
            return Extraction::PlainText(raw.to_string());
        }
    };

    let explanation = object
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    Extraction::Action(Proposal {
        action: normalize(tool, &arguments),
        explanation,
    })
}

/// Remove an enclosing ``` fence (the opening line may carry a language tag).
fn strip_fence(text: &str) -> &str {
    if !text.starts_with(FENCE) {
        return text;
    }
    let Some((_, rest)) = text.split_once('\n') else {
        return text.trim_start_matches(FENCE).trim_end_matches(FENCE).trim();
    };
    let rest = rest.trim_end();
    let rest = match rest.rsplit_once('\n') {
        Some((inner, last)) if last.trim() == FENCE => inner,
        None if rest.trim() == FENCE => "",
        _ => rest,
    };
    rest.trim()
}

/// Map tool names and sub-action spellings onto the registry's vocabulary.
pub fn normalize(tool: &str, arguments: &Map<String, Value>) -> Action {
    let mut args: BTreeMap<String, String> = arguments
        .iter()
        .filter_map(|(name, value)| scalar_to_string(value).map(|text| (name.clone(), text)))
        .collect();

    let family_name = canonical_family(tool.trim());
    let mut action = Action::new(family_name);

    let Some(schema) = lookup(family_name) else {
        action.sub_action = args.remove("action");
        action.arguments = args;
        return action;
    };

    if schema.has_sub_actions() {
        action.sub_action = args
            .remove("action")
            .map(|sub| canonical_sub_action(schema.family, &sub));
    }
    if schema.family == Family::ResourceStatus
        && let Some(component) = args.get_mut("component")
    {
        *component = canonical_component(component);
    }

    action.arguments = args;
    action
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn canonical_family(tool: &str) -> &str {
    match tool {
        "execute_command" => "run_command",
        "read_file" => "read_path",
        "write_file" => "write_path",
        "sway" => "compositor_config",
        "waybar" => "status_bar",
        "network" => "network_admin",
        "systemd" => "service_admin",
        "kubernetes" => "cluster_admin",
        "system_status" => "resource_status",
        other => other,
    }
}

fn canonical_sub_action(family: Family, raw: &str) -> String {
    let sub = raw.trim().to_lowercase().replace('-', "_");
    let mapped = match (family, sub.as_str()) {
        (Family::CompositorConfig | Family::StatusBar, "show_config") => "show",
        (Family::CompositorConfig, "list_keybindings") => "list_bindings",
        (Family::CompositorConfig, "add_keybinding") => "add_binding",
        _ => return sub,
    };
    mapped.to_string()
}

fn canonical_component(raw: &str) -> String {
    let component = raw.trim().to_lowercase();
    match component.as_str() {
        "docker" => "containers".to_string(),
        "kubernetes" | "k8s" => "cluster".to_string(),
        _ => component,
    }
}
