use super::schema::Config;

impl Config {
    /// Apply `SYSOPS_*` environment variables on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    pub(crate) fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(model) = non_empty("SYSOPS_MODEL") {
            self.provider.model = model;
        }

        if let Some(url) = non_empty("SYSOPS_OLLAMA_URL") {
            self.provider.base_url = url;
        }

        if let Some(temp_str) = non_empty("SYSOPS_TEMPERATURE") {
            match temp_str.trim().parse::<f64>() {
                Ok(temp) if (0.0..=2.0).contains(&temp) => self.provider.temperature = temp,
                _ => tracing::warn!(value = %temp_str, "ignoring invalid SYSOPS_TEMPERATURE"),
            }
        }

        if let Some(flag) = non_empty("SYSOPS_AUTO_APPROVE") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.agent.auto_approve = true,
                "0" | "false" | "no" | "off" => self.agent.auto_approve = false,
                _ => tracing::warn!(value = %flag, "ignoring invalid SYSOPS_AUTO_APPROVE"),
            }
        }
    }
}
