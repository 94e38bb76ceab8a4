use super::envelope::ResultEnvelope;
use super::runner::CommandOutput;
use super::Dispatcher;
use crate::actions::ClusterOp;

const HEALTHY: &str = "All pods are healthy!";

fn namespace_flags(namespace: Option<&str>) -> Vec<String> {
    match namespace.map(str::trim) {
        Some("all") => vec!["--all-namespaces".into()],
        Some(ns) if !ns.is_empty() => vec!["-n".into(), ns.into()],
        _ => Vec::new(),
    }
}

/// Rows of an all-namespaces pod listing (`NAMESPACE NAME READY STATUS ...`)
/// that are Running with fewer ready containers than declared.
pub fn partially_ready_rows(listing: &str) -> Vec<&str> {
    listing
        .lines()
        .skip(1)
        .filter(|row| {
            let cols: Vec<&str> = row.split_whitespace().collect();
            if cols.len() < 4 || cols[3] != "Running" {
                return false;
            }
            let Some((ready, total)) = cols[2].split_once('/') else {
                return false;
            };
            matches!(
                (ready.parse::<u32>(), total.parse::<u32>()),
                (Ok(ready), Ok(total)) if ready < total
            )
        })
        .collect()
}

/// Failing kubectl calls can come back with nothing on either stream.
pub(super) fn with_diagnostic(envelope: ResultEnvelope, what: &str) -> ResultEnvelope {
    if envelope.render().trim().is_empty() {
        envelope.with_field("error", format!("{what} produced no output"))
    } else {
        envelope
    }
}

impl Dispatcher {
    pub(super) async fn cluster(&self, op: &ClusterOp) -> ResultEnvelope {
        let spec = match op {
            ClusterOp::Pods { namespace } => self.kubectl_get("pods", namespace.as_deref()),
            ClusterOp::Deployments { namespace } => {
                self.kubectl_get("deployments", namespace.as_deref())
            }
            ClusterOp::Services { namespace } => {
                self.kubectl_get("services", namespace.as_deref())
            }
            ClusterOp::All { namespace } => self.kubectl_get("all", namespace.as_deref()),
            ClusterOp::Namespaces => self.command("kubectl", ["get", "namespaces"]),
            ClusterOp::Logs {
                pod,
                namespace,
                tail,
                container,
            } => {
                let mut args = vec!["logs".to_string(), pod.clone()];
                args.extend(namespace_flags(namespace.as_deref()));
                args.push(format!("--tail={tail}"));
                if let Some(container) = container.as_deref().filter(|c| !c.trim().is_empty()) {
                    args.extend(["-c".to_string(), container.to_string()]);
                }
                self.log_command("kubectl", args)
            }
            ClusterOp::Describe { pod, namespace } => {
                let mut args = vec!["describe".to_string(), "pod".to_string(), pod.clone()];
                args.extend(namespace_flags(namespace.as_deref()));
                self.command("kubectl", args)
            }
            ClusterOp::CheckHealth => return self.check_health().await,
        };
        let envelope = self.run_to_envelope(&spec).await;
        with_diagnostic(envelope, &spec.to_string())
    }

    fn kubectl_get(&self, resource: &str, namespace: Option<&str>) -> super::CommandSpec {
        let mut args = vec!["get".to_string(), resource.to_string()];
        args.extend(namespace_flags(namespace));
        self.command("kubectl", args)
    }

    /// Never returns an envelope without something to show.
    async fn check_health(&self) -> ResultEnvelope {
        let unhealthy = self.command(
            "kubectl",
            [
                "get",
                "pods",
                "--all-namespaces",
                "--field-selector=status.phase!=Running,status.phase!=Succeeded",
            ],
        );
        let stdout = match self.runner.run(&unhealthy).await {
            CommandOutput::Completed {
                code: Some(0),
                stdout,
                ..
            } => stdout,
            // A selector query that failed without output still gets the full scan.
            CommandOutput::Completed { code, stdout, .. } if stdout.trim().is_empty() => {
                tracing::debug!(?code, "field-selector query failed, scanning all pods");
                stdout
            }
            other => {
                return with_diagnostic(
                    ResultEnvelope::from_command(other, "output"),
                    &unhealthy.to_string(),
                );
            }
        };

        if !stdout.trim().is_empty() && !stdout.contains("No resources found") {
            return ResultEnvelope::success().with_field("output", stdout);
        }

        let all_pods = self.command("kubectl", ["get", "pods", "--all-namespaces"]);
        let listing = match self.runner.run(&all_pods).await {
            CommandOutput::Completed {
                code: Some(0),
                stdout,
                ..
            } => stdout,
            other => {
                return with_diagnostic(
                    ResultEnvelope::from_command(other, "output"),
                    &all_pods.to_string(),
                );
            }
        };

        let rows = partially_ready_rows(&listing);
        let report = match (listing.lines().next(), rows.is_empty()) {
            (Some(header), false) => {
                let mut lines = vec![header];
                lines.extend(rows);
                lines.join("\n")
            }
            _ => HEALTHY.to_string(),
        };
        ResultEnvelope::success().with_field("output", report)
    }
}
