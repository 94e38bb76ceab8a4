//! MCP tool definitions rendered from the action registry.

use super::protocol::Tool;
use crate::actions::{FamilySchema, registry};
use serde_json::{Map, Value, json};

pub fn get_tools() -> Vec<Tool> {
    registry().iter().map(tool_for).collect()
}

fn tool_for(schema: &FamilySchema) -> Tool {
    Tool {
        name: schema.family.to_string(),
        description: schema.description.to_string(),
        input_schema: input_schema(schema),
    }
}

/// Sub-action families get an `action` enum; argument requirements that
/// vary per action are stated in the property descriptions.
pub fn input_schema(schema: &FamilySchema) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<&str> = Vec::new();

    if schema.has_sub_actions() {
        let summary: Vec<String> = schema
            .operations
            .iter()
            .filter_map(|op| op.sub_action.map(|sub| format!("{sub}: {}", op.description)))
            .collect();
        properties.insert(
            "action".into(),
            json!({
                "type": "string",
                "enum": schema.sub_actions().collect::<Vec<_>>(),
                "description": summary.join("; "),
            }),
        );
        required.push("action");
    }

    for op in schema.operations {
        for (spec, is_required) in op.arguments() {
            let entry = properties.entry(spec.name.to_string()).or_insert_with(|| {
                let mut prop = json!({
                    "type": "string",
                    "description": spec.description,
                });
                if !spec.choices.is_empty() {
                    prop["enum"] = json!(spec.choices);
                }
                if let Some(default) = spec.default {
                    prop["default"] = json!(default);
                }
                prop
            });

            match op.sub_action {
                None if is_required => required.push(spec.name),
                Some(sub) if is_required => append_note(entry, &format!("required for {sub}")),
                _ => {}
            }
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn append_note(prop: &mut Value, note: &str) {
    if let Some(Value::String(description)) = prop.get_mut("description") {
        if description.contains("required for") {
            description.pop();
            description.push_str(&format!(", {}", note.trim_start_matches("required for ")));
            description.push(')');
        } else {
            description.push_str(&format!(" ({note})"));
        }
    }
}
