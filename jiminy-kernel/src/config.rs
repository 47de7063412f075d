use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct KernelConfig {
    pub mqtt: Option<MqttConf>,
    pub http: Option<HttpConf>,
    pub probe: Option<ProbeConf>,
    pub topics: Option<TopicsConf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MqttConf {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpConf {
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProbeConf {
    pub interval_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TopicsConf {
    pub reply: String,
    pub broadcast: String,
}

impl Default for MqttConf {
    fn default() -> Self {
        Self { host: "localhost".into(), port: 1883 }
    }
}

impl Default for HttpConf {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl Default for ProbeConf {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

impl Default for TopicsConf {
    fn default() -> Self {
        Self {
            reply: "/jiminy/reply".into(),
            broadcast: "/jiminy/c/all".into(),
        }
    }
}

impl KernelConfig {
    pub fn mqtt(&self) -> MqttConf {
        self.mqtt.clone().unwrap_or_default()
    }

    pub fn http(&self) -> HttpConf {
        self.http.clone().unwrap_or_default()
    }

    pub fn probe(&self) -> ProbeConf {
        self.probe.clone().unwrap_or_default()
    }

    pub fn topics(&self) -> TopicsConf {
        self.topics.clone().unwrap_or_default()
    }
}

pub async fn load_config() -> KernelConfig {
    let path = std::env::var("JIMINY_KERNEL_CONFIG").unwrap_or_else(|_| "jiminy.yaml".into());
    if Path::new(&path).exists() {
        let txt = fs::read_to_string(&path).await.unwrap_or_default();
        if txt.trim().is_empty() { return KernelConfig::default(); }
        serde_yaml::from_str(&txt).unwrap_or_else(|e| {
            eprintln!("[kernel] config invalide: {e}");
            KernelConfig::default()
        })
    } else {
        eprintln!("[kernel] pas de jiminy.yaml, usage config par défaut");
        KernelConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_original_deployment() {
        let cfg = KernelConfig::default();
        assert_eq!(cfg.mqtt().port, 1883);
        assert_eq!(cfg.http().port, 8080);
        assert_eq!(cfg.probe().interval_secs, 10);
        assert_eq!(cfg.topics().reply, "/jiminy/reply");
        assert_eq!(cfg.topics().broadcast, "/jiminy/c/all");
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_sections() {
        let cfg: KernelConfig = serde_yaml::from_str("mqtt:\n  host: broker.lan\n  port: 1884\n").unwrap();
        assert_eq!(cfg.mqtt().host, "broker.lan");
        assert_eq!(cfg.mqtt().port, 1884);
        assert_eq!(cfg.http().port, 8080);
        assert_eq!(cfg.topics().broadcast, "/jiminy/c/all");
    }
}
