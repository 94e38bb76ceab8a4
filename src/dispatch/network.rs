use super::envelope::ResultEnvelope;
use super::Dispatcher;
use crate::actions::NetworkOp;

impl Dispatcher {
    pub(super) async fn network(&self, op: &NetworkOp) -> ResultEnvelope {
        let spec = match op {
            NetworkOp::Status => self.command("nmcli", ["device", "status"]),
            NetworkOp::Connections => self.command("nmcli", ["connection", "show"]),
            NetworkOp::WifiList => self.command("nmcli", ["device", "wifi", "list"]),
            NetworkOp::SetDns { connection, dns } => return self.set_dns(connection, dns).await,
        };
        self.run_to_envelope(&spec).await
    }

    /// Modify, then re-activate the connection only if the modify succeeded.
    async fn set_dns(&self, connection: &str, dns: &str) -> ResultEnvelope {
        let modify = self.command(
            "nmcli",
            ["connection", "modify", connection, "ipv4.dns", dns],
        );
        let modified = self.run_to_envelope(&modify).await;
        if !modified.is_success() {
            return modified;
        }

        let up = self.command("nmcli", ["connection", "up", connection]);
        let activated = self.run_to_envelope(&up).await;
        if activated.is_success() {
            activated.with_field("message", format!("DNS set to {dns} for {connection}"))
        } else {
            activated.with_field(
                "message",
                format!("DNS set to {dns} for {connection}, but re-activation failed"),
            )
        }
    }
}
