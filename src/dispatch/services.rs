use super::envelope::ResultEnvelope;
use super::Dispatcher;
use crate::actions::ServiceOp;

impl Dispatcher {
    pub(super) async fn service(&self, op: &ServiceOp) -> ResultEnvelope {
        let spec = match op {
            ServiceOp::Status { service } => self.command("systemctl", ["status", service.as_str()]),
            ServiceOp::Restart { service } => self.command("systemctl", ["restart", service.as_str()]),
            ServiceOp::Enable { service } => self.command("systemctl", ["enable", service.as_str()]),
            ServiceOp::Disable { service } => self.command("systemctl", ["disable", service.as_str()]),
            ServiceOp::Logs { service, lines } => self.log_command(
                "journalctl",
                [
                    "-u".to_string(),
                    service.clone(),
                    "-n".to_string(),
                    lines.to_string(),
                    "--no-pager".to_string(),
                ],
            ),
            ServiceOp::List => self.command(
                "systemctl",
                ["list-units", "--type=service", "--all", "--no-pager"],
            ),
        };
        self.run_to_envelope(&spec).await
    }
}
