//! Service metadata reported by `GET /version`.

use serde::Serialize;

pub const SERVICE_NAME: &str = "LLM API Connector";
pub const API_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub version: &'static str,
    pub service_name: &'static str,
    pub description: &'static str,
    pub api_version: &'static str,
}

impl ServiceInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            service_name: SERVICE_NAME,
            description: env!("CARGO_PKG_DESCRIPTION"),
            api_version: API_VERSION,
        }
    }
}
