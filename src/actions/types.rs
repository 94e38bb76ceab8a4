use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString, IntoStaticStr};

/// A proposed operation as it arrives from the model or a remote caller.
///
/// Nothing about an `Action` is trusted: the family may be unknown and
/// arguments may be missing. [`validate`](super::validate) turns it into an
/// [`Operation`], which is the only thing the dispatcher accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_action: Option<String>,
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

impl Action {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            sub_action: None,
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_sub_action(mut self, sub_action: impl Into<String>) -> Self {
        self.sub_action = Some(sub_action.into());
        self
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }

    /// `family` or `family.sub_action`, for logs and prompts.
    pub fn label(&self) -> String {
        match &self.sub_action {
            Some(sub) => format!("{}.{sub}", self.family),
            None => self.family.clone(),
        }
    }
}

/// Top-level namespace of an action.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Family {
    RunCommand,
    ReadPath,
    WritePath,
    CompositorConfig,
    StatusBar,
    NetworkAdmin,
    ServiceAdmin,
    ClusterAdmin,
    ResourceStatus,
}

impl Family {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Resource probe selector for `resource_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Component {
    Cpu,
    Memory,
    Disk,
    Network,
    Containers,
    Cluster,
    All,
}

impl Component {
    /// Probe order used when aggregating `all`.
    pub const PROBES: [Self; 6] = [
        Self::Cpu,
        Self::Memory,
        Self::Disk,
        Self::Network,
        Self::Containers,
        Self::Cluster,
    ];

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositorOp {
    Show,
    ListBindings,
    AddBinding { key: String, command: String },
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBarOp {
    Show,
    Restart,
    Reload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkOp {
    Status,
    Connections,
    WifiList,
    SetDns { connection: String, dns: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceOp {
    Status { service: String },
    Restart { service: String },
    Enable { service: String },
    Disable { service: String },
    Logs { service: String, lines: u32 },
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterOp {
    Pods { namespace: Option<String> },
    Deployments { namespace: Option<String> },
    Services { namespace: Option<String> },
    Namespaces,
    All { namespace: Option<String> },
    Logs {
        pod: String,
        namespace: Option<String>,
        tail: u32,
        container: Option<String>,
    },
    Describe { pod: String, namespace: Option<String> },
    CheckHealth,
}

/// A validated action. Built only by [`validate`](super::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    RunCommand {
        command: String,
        working_dir: Option<String>,
    },
    ReadPath {
        path: String,
    },
    WritePath {
        path: String,
        content: String,
    },
    Compositor(CompositorOp),
    StatusBar(StatusBarOp),
    Network(NetworkOp),
    Service(ServiceOp),
    Cluster(ClusterOp),
    Resource(Component),
}

impl Operation {
    pub fn family(&self) -> Family {
        match self {
            Self::RunCommand { .. } => Family::RunCommand,
            Self::ReadPath { .. } => Family::ReadPath,
            Self::WritePath { .. } => Family::WritePath,
            Self::Compositor(_) => Family::CompositorConfig,
            Self::StatusBar(_) => Family::StatusBar,
            Self::Network(_) => Family::NetworkAdmin,
            Self::Service(_) => Family::ServiceAdmin,
            Self::Cluster(_) => Family::ClusterAdmin,
            Self::Resource(_) => Family::ResourceStatus,
        }
    }

    /// Build the typed operation from arguments that already passed the
    /// structural schema check (defaults filled in).
    pub(super) fn build(
        family: Family,
        sub_action: Option<&str>,
        args: &ResolvedArgs,
    ) -> Result<Self, ValidationError> {
        let unknown = |sub: &str| ValidationError::UnknownSubAction {
            family: family.to_string(),
            sub_action: sub.to_string(),
        };
        let sub = sub_action.unwrap_or_default();

        let op = match family {
            Family::RunCommand => Self::RunCommand {
                command: args.required("command")?,
                working_dir: args.optional("working_dir"),
            },
            Family::ReadPath => Self::ReadPath {
                path: args.required("path")?,
            },
            Family::WritePath => Self::WritePath {
                path: args.required("path")?,
                // Empty content is a legitimate write.
                content: args.raw("content")?,
            },
            Family::CompositorConfig => Self::Compositor(match sub {
                "show" => CompositorOp::Show,
                "list_bindings" => CompositorOp::ListBindings,
                "add_binding" => CompositorOp::AddBinding {
                    key: args.required("key")?,
                    command: args.required("command")?,
                },
                "reload" => CompositorOp::Reload,
                other => return Err(unknown(other)),
            }),
            Family::StatusBar => Self::StatusBar(match sub {
                "show" => StatusBarOp::Show,
                "restart" => StatusBarOp::Restart,
                "reload" => StatusBarOp::Reload,
                other => return Err(unknown(other)),
            }),
            Family::NetworkAdmin => Self::Network(match sub {
                "status" => NetworkOp::Status,
                "connections" => NetworkOp::Connections,
                "wifi_list" => NetworkOp::WifiList,
                "set_dns" => NetworkOp::SetDns {
                    connection: args.required("connection")?,
                    dns: args.required("dns")?,
                },
                other => return Err(unknown(other)),
            }),
            Family::ServiceAdmin => Self::Service(match sub {
                "status" => ServiceOp::Status {
                    service: args.required("service")?,
                },
                "restart" => ServiceOp::Restart {
                    service: args.required("service")?,
                },
                "enable" => ServiceOp::Enable {
                    service: args.required("service")?,
                },
                "disable" => ServiceOp::Disable {
                    service: args.required("service")?,
                },
                "logs" => ServiceOp::Logs {
                    service: args.required("service")?,
                    lines: args.number("lines")?,
                },
                "list" => ServiceOp::List,
                other => return Err(unknown(other)),
            }),
            Family::ClusterAdmin => Self::Cluster(match sub {
                "pods" => ClusterOp::Pods {
                    namespace: args.optional("namespace"),
                },
                "deployments" => ClusterOp::Deployments {
                    namespace: args.optional("namespace"),
                },
                "services" => ClusterOp::Services {
                    namespace: args.optional("namespace"),
                },
                "namespaces" => ClusterOp::Namespaces,
                "all" => ClusterOp::All {
                    namespace: args.optional("namespace"),
                },
                "logs" => ClusterOp::Logs {
                    pod: args.required("pod")?,
                    namespace: args.optional("namespace"),
                    tail: args.number("tail")?,
                    container: args.optional("container"),
                },
                "describe" => ClusterOp::Describe {
                    pod: args.required("pod")?,
                    namespace: args.optional("namespace"),
                },
                "check_health" => ClusterOp::CheckHealth,
                other => return Err(unknown(other)),
            }),
            Family::ResourceStatus => {
                let value = args.required("component")?;
                let component = value.parse::<Component>().map_err(|_| {
                    ValidationError::InvalidValue {
                        name: "component".into(),
                        value,
                    }
                })?;
                Self::Resource(component)
            }
        };
        Ok(op)
    }
}

/// Arguments after schema defaults have been applied.
#[derive(Debug, Default)]
pub(super) struct ResolvedArgs(pub(super) BTreeMap<String, String>);

impl ResolvedArgs {
    fn raw(&self, name: &str) -> Result<String, ValidationError> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| ValidationError::MissingArgument(name.to_string()))
    }

    fn required(&self, name: &str) -> Result<String, ValidationError> {
        match self.0.get(name).map(|v| v.trim()) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(ValidationError::MissingArgument(name.to_string())),
        }
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.0
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn number(&self, name: &str) -> Result<u32, ValidationError> {
        let value = self.required(name)?;
        value
            .parse()
            .map_err(|_| ValidationError::InvalidValue {
                name: name.to_string(),
                value,
            })
    }
}
