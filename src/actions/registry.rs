use super::types::{Action, Family, Operation, ResolvedArgs};
use crate::error::ValidationError;
use std::str::FromStr;

/// One named argument of an operation.
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub default: Option<&'static str>,
    /// Closed set of accepted values. Empty means free text.
    pub choices: &'static [&'static str],
    /// An empty string satisfies the argument (file content).
    pub allow_empty: bool,
}

const fn arg(name: &'static str, description: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        description,
        default: None,
        choices: &[],
        allow_empty: false,
    }
}

const fn text_arg(name: &'static str, description: &'static str) -> ArgSpec {
    ArgSpec {
        allow_empty: true,
        ..arg(name, description)
    }
}

const fn arg_or(name: &'static str, description: &'static str, default: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        description,
        default: Some(default),
        choices: &[],
        allow_empty: false,
    }
}

/// Argument contract of one sub-action (or of a family without sub-actions).
#[derive(Debug, Clone, Copy)]
pub struct OperationSchema {
    pub sub_action: Option<&'static str>,
    pub description: &'static str,
    pub required: &'static [ArgSpec],
    pub optional: &'static [ArgSpec],
}

impl OperationSchema {
    pub fn arguments(&self) -> impl Iterator<Item = (&ArgSpec, bool)> {
        self.required
            .iter()
            .map(|spec| (spec, true))
            .chain(self.optional.iter().map(|spec| (spec, false)))
    }
}

const fn op(
    sub_action: &'static str,
    description: &'static str,
    required: &'static [ArgSpec],
    optional: &'static [ArgSpec],
) -> OperationSchema {
    OperationSchema {
        sub_action: Some(sub_action),
        description,
        required,
        optional,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FamilySchema {
    pub family: Family,
    pub description: &'static str,
    pub operations: &'static [OperationSchema],
}

impl FamilySchema {
    /// Families like `service_admin` carry an explicit sub-action; families
    /// like `read_path` are a single operation.
    pub fn has_sub_actions(&self) -> bool {
        self.operations.iter().any(|op| op.sub_action.is_some())
    }

    pub fn sub_actions(&self) -> impl Iterator<Item = &'static str> {
        self.operations.iter().filter_map(|op| op.sub_action)
    }

    pub fn operation(&self, sub_action: Option<&str>) -> Option<&'static OperationSchema> {
        self.operations.iter().find(|op| op.sub_action == sub_action)
    }
}

const NAMESPACE: ArgSpec = arg(
    "namespace",
    "Namespace to query; \"all\" for every namespace",
);
const SERVICE: ArgSpec = arg("service", "Unit name, e.g. sshd or docker");
const POD: ArgSpec = arg("pod", "Pod name");

static REGISTRY: &[FamilySchema] = &[
    FamilySchema {
        family: Family::RunCommand,
        description: "Run a shell command and capture its output",
        operations: &[OperationSchema {
            sub_action: None,
            description: "Run a shell command",
            required: &[arg("command", "The shell command to execute")],
            optional: &[arg(
                "working_dir",
                "Working directory (defaults to the current directory)",
            )],
        }],
    },
    FamilySchema {
        family: Family::ReadPath,
        description: "Read the contents of a text file",
        operations: &[OperationSchema {
            sub_action: None,
            description: "Read a file",
            required: &[arg("path", "Path to the file; ~ expands to the home directory")],
            optional: &[],
        }],
    },
    FamilySchema {
        family: Family::WritePath,
        description: "Write content to a file, creating parent directories",
        operations: &[OperationSchema {
            sub_action: None,
            description: "Write a file",
            required: &[
                arg("path", "Path to the file; ~ expands to the home directory"),
                text_arg("content", "Full content to write"),
            ],
            optional: &[],
        }],
    },
    FamilySchema {
        family: Family::CompositorConfig,
        description: "Inspect and edit the Sway compositor configuration",
        operations: &[
            op("show", "Show the compositor config file", &[], &[]),
            op("list_bindings", "List bindsym key bindings", &[], &[]),
            op(
                "add_binding",
                "Append a key binding that runs a command",
                &[
                    arg("key", "Key combination, e.g. Mod4+d"),
                    arg("command", "Command to exec for the binding"),
                ],
                &[],
            ),
            op("reload", "Reload the compositor configuration", &[], &[]),
        ],
    },
    FamilySchema {
        family: Family::StatusBar,
        description: "Manage the Waybar status bar",
        operations: &[
            op("show", "Show the status bar config file", &[], &[]),
            op("restart", "Kill and relaunch the status bar", &[], &[]),
            op("reload", "Reload the status bar config in place", &[], &[]),
        ],
    },
    FamilySchema {
        family: Family::NetworkAdmin,
        description: "Inspect and configure NetworkManager",
        operations: &[
            op("status", "Show network device status", &[], &[]),
            op("connections", "List configured connections", &[], &[]),
            op("wifi_list", "List visible wifi networks", &[], &[]),
            op(
                "set_dns",
                "Set the DNS server of a connection and reapply it",
                &[
                    arg("connection", "Connection name, e.g. \"Wired connection 1\""),
                    arg("dns", "DNS server address, e.g. 1.1.1.1"),
                ],
                &[],
            ),
        ],
    },
    FamilySchema {
        family: Family::ServiceAdmin,
        description: "Manage systemd services",
        operations: &[
            op("status", "Show service status", &[SERVICE], &[]),
            op("restart", "Restart a service", &[SERVICE], &[]),
            op("enable", "Enable a service at boot", &[SERVICE], &[]),
            op("disable", "Disable a service at boot", &[SERVICE], &[]),
            op(
                "logs",
                "Show recent journal lines of a service",
                &[SERVICE],
                &[arg_or("lines", "Number of journal lines", "50")],
            ),
            op("list", "List all service units", &[], &[]),
        ],
    },
    FamilySchema {
        family: Family::ClusterAdmin,
        description: "Inspect Kubernetes resources",
        operations: &[
            op("pods", "List pods", &[], &[NAMESPACE]),
            op("deployments", "List deployments", &[], &[NAMESPACE]),
            op("services", "List services", &[], &[NAMESPACE]),
            op("namespaces", "List namespaces", &[], &[]),
            op("all", "List all resources", &[], &[NAMESPACE]),
            op(
                "logs",
                "Show logs of a pod; use the namespace the pod was found in",
                &[POD],
                &[
                    NAMESPACE,
                    arg_or("tail", "Number of log lines", "100"),
                    arg("container", "Container name for multi-container pods"),
                ],
            ),
            op("describe", "Describe a pod", &[POD], &[NAMESPACE]),
            op(
                "check_health",
                "Find failing or partially ready pods across the cluster",
                &[],
                &[],
            ),
        ],
    },
    FamilySchema {
        family: Family::ResourceStatus,
        description: "Summarize system resources (cpu, memory, disk, network, containers, cluster)",
        operations: &[OperationSchema {
            sub_action: None,
            description: "Probe a resource",
            required: &[ArgSpec {
                name: "component",
                description: "Resource to probe",
                default: None,
                choices: &[
                    "cpu",
                    "memory",
                    "disk",
                    "network",
                    "containers",
                    "cluster",
                    "all",
                ],
                allow_empty: false,
            }],
            optional: &[],
        }],
    },
];

/// Every declared family, in catalogue order.
pub fn registry() -> &'static [FamilySchema] {
    REGISTRY
}

pub fn lookup(family: &str) -> Option<&'static FamilySchema> {
    let family = Family::from_str(family).ok()?;
    REGISTRY.iter().find(|schema| schema.family == family)
}

/// Structural validation. Nothing reaches the dispatcher without passing here.
pub fn validate(action: &Action) -> Result<Operation, ValidationError> {
    let schema =
        lookup(&action.family).ok_or_else(|| ValidationError::UnknownFamily(action.family.clone()))?;

    let operation = if schema.has_sub_actions() {
        let sub = action
            .sub_action
            .as_deref()
            .ok_or_else(|| ValidationError::MissingArgument("action".into()))?;
        schema
            .operation(Some(sub))
            .ok_or_else(|| ValidationError::UnknownSubAction {
                family: action.family.clone(),
                sub_action: sub.to_string(),
            })?
    } else {
        schema
            .operation(None)
            .ok_or_else(|| ValidationError::UnknownFamily(action.family.clone()))?
    };

    let mut resolved = ResolvedArgs::default();
    for (spec, required) in operation.arguments() {
        let value = action.argument(spec.name);
        let present = value.is_some_and(|v| spec.allow_empty || !v.trim().is_empty());

        if required && !present {
            return Err(ValidationError::MissingArgument(spec.name.to_string()));
        }
        if let Some(v) = value
            && present
            && !spec.choices.is_empty()
            && !spec.choices.contains(&v.trim())
        {
            return Err(ValidationError::InvalidValue {
                name: spec.name.to_string(),
                value: v.to_string(),
            });
        }

        match (value, spec.default) {
            (Some(v), _) if present => {
                resolved.0.insert(spec.name.to_string(), v.to_string());
            }
            (_, Some(default)) => {
                resolved.0.insert(spec.name.to_string(), default.to_string());
            }
            _ => {}
        }
    }

    Operation::build(schema.family, operation.sub_action, &resolved)
}
