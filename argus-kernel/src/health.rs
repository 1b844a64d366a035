use crate::models::HealthCheckResult;
use time::OffsetDateTime;

/// Dernier résultat de sonde pour une machine, écrasé à chaque probe.
/// Signal indépendant de la fraîcheur des rapports : une machine peut être
/// online par heartbeat avec un health check en échec, les deux sont exposés
/// séparément dans la vue.
#[derive(Debug, Clone, Default)]
pub struct HealthTracker {
    last: Option<HealthCheckResult>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Écrase le résultat précédent, aucun historique conservé.
    pub fn record(&mut self, status: &str, health_data: serde_json::Value, latency_ms: f64) {
        self.last = Some(HealthCheckResult {
            status: status.to_string(),
            health_data,
            latency_ms,
            observed_at: OffsetDateTime::now_utc(),
        });
    }

    pub fn last(&self) -> Option<HealthCheckResult> {
        self.last.clone()
    }
}
