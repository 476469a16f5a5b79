use serde::Serialize;

use crate::config::Config;
use crate::db::{self, Pool};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigPresence {
    pub has_document_id: bool,
    pub has_access_token: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DbHealth {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub config: ConfigPresence,
    pub db: DbHealth,
}

fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.starts_with("YOUR_") || v == "GOOGLE_DOC_ID"
}

/// Whether the configured Google settings look real rather than template values.
pub fn config_presence(cfg: &Config) -> ConfigPresence {
    ConfigPresence {
        has_document_id: !is_placeholder(&cfg.google.document_id),
        has_access_token: !is_placeholder(&cfg.google.access_token),
    }
}

pub async fn check(cfg: &Config, pool: &Pool) -> HealthReport {
    let config = config_presence(cfg);
    let db = match db::ping(pool).await {
        Ok(()) => DbHealth {
            ok: true,
            details: None,
        },
        Err(err) => DbHealth {
            ok: false,
            details: Some(format!("{:#}", err)),
        },
    };

    let error = if !db.ok {
        Some("Database unreachable. Confirm migrations have run.".to_string())
    } else if !config.has_document_id || !config.has_access_token {
        let mut missing = Vec::new();
        if !config.has_document_id {
            missing.push("google.document_id");
        }
        if !config.has_access_token {
            missing.push("google.access_token");
        }
        Some(format!("Missing or placeholder settings: {}", missing.join(", ")))
    } else {
        None
    };

    HealthReport {
        ok: error.is_none(),
        error,
        config,
        db,
    }
}
