use super::cluster::with_diagnostic;
use super::envelope::{FailureKind, ResultEnvelope};
use super::runner::{CommandOutput, CommandSpec};
use super::Dispatcher;
use crate::actions::Component;
use std::fmt::Write;

impl Dispatcher {
    pub(super) async fn resource_status(&self, component: Component) -> ResultEnvelope {
        match component {
            Component::All => self.all_resources().await,
            Component::Cluster => self.cluster_probe().await,
            single => {
                let spec = self.probe_command(single);
                with_diagnostic(
                    ResultEnvelope::from_command(self.runner.run(&spec).await, single.as_str()),
                    &spec.to_string(),
                )
            }
        }
    }

    fn probe_command(&self, component: Component) -> CommandSpec {
        match component {
            Component::Cpu => self.command("lscpu", Vec::<String>::new()),
            Component::Memory => self.command("free", ["-h"]),
            Component::Disk => self.command("df", ["-h"]),
            Component::Network => self.command("nmcli", ["device", "status"]),
            Component::Containers => self.command("docker", ["ps", "-a"]),
            Component::Cluster | Component::All => {
                self.command("kubectl", ["config", "current-context"])
            }
        }
    }

    /// Context, nodes and pods of the current cluster, whichever are available.
    async fn cluster_probe(&self) -> ResultEnvelope {
        let context_spec = self.probe_command(Component::Cluster);
        let context = self.runner.run(&context_spec).await;
        if matches!(context, CommandOutput::NotFound { .. }) {
            return ResultEnvelope::from_command(context, Component::Cluster.as_str());
        }
        let nodes = self.runner.run(&self.command("kubectl", ["get", "nodes"])).await;
        let pods = self.runner.run(&self.command("kubectl", ["get", "pods"])).await;

        let mut report = String::new();
        if let (true, Some(name)) = (context.succeeded(), context.stdout()) {
            let _ = write!(report, "Context: {}\n\n", name.trim());
        }
        if let (true, Some(out)) = (nodes.succeeded(), nodes.stdout()) {
            let _ = write!(report, "Nodes:\n{out}\n");
        }
        if let (true, Some(out)) = (pods.succeeded(), pods.stdout()) {
            let _ = write!(report, "Pods:\n{out}");
        }

        if report.is_empty() {
            with_diagnostic(
                ResultEnvelope::from_command(context, Component::Cluster.as_str()),
                &context_spec.to_string(),
            )
        } else {
            ResultEnvelope::success().with_field(Component::Cluster.as_str(), report)
        }
    }

    /// Every probe in fixed order, skipping absent tools. Containers and
    /// cluster are also skipped when they fail.
    async fn all_resources(&self) -> ResultEnvelope {
        let mut envelope = ResultEnvelope::success();
        let mut collected = 0usize;

        for component in Component::PROBES {
            let name = component.as_str();
            let probe = if component == Component::Cluster {
                self.cluster_probe().await
            } else {
                ResultEnvelope::from_command(
                    self.runner.run(&self.probe_command(component)).await,
                    name,
                )
            };

            let keep = match component {
                Component::Containers | Component::Cluster => probe.is_success(),
                _ => probe.get(name).is_some_and(|out| !out.trim().is_empty()),
            };
            if keep {
                if let Some(out) = probe.get(name) {
                    envelope = envelope.with_field(name, out.to_string());
                    collected += 1;
                }
            } else {
                tracing::debug!(component = name, status = ?probe.status, "skipping resource probe");
            }
        }

        if collected == 0 {
            return ResultEnvelope::error(FailureKind::ToolMissing {
                program: "lscpu, free, df, nmcli, docker, kubectl".to_string(),
            })
            .with_field("error", "no resource probe produced data");
        }
        envelope
    }
}
