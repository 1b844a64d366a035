use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;

/// Payloads opaques remontés par les agents : le store ne valide aucun schéma,
/// les champs manquants ou inattendus sont stockés tels quels.
pub type InfoMap = HashMap<String, serde_json::Value>;
pub type MetricsMap = HashMap<String, serde_json::Value>;

// Clés métriques reconnues par les agrégats (cpu/memory/disk en pourcents).
pub const METRIC_CPU: &str = "cpu";
pub const METRIC_MEMORY: &str = "memory";
pub const METRIC_DISK: &str = "disk";

/// Statut dérivé à la lecture depuis last_seen, jamais stocké.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Online,
    Offline,
}

impl MachineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Online => "online",
            MachineStatus::Offline => "offline",
        }
    }
}

/// Vue lecture d'une machine : copie profonde indépendante du store.
/// Muter cette valeur côté appelant n'affecte jamais le registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineView {
    pub machine_id: String,
    pub info: InfoMap,
    pub latest_metrics: MetricsMap,
    pub status: MachineStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_seen: Option<OffsetDateTime>,        // None tant qu'aucun rapport reçu
    #[serde(with = "time::serde::rfc3339")]
    pub first_seen: OffsetDateTime,
    pub stale_for_seconds: i64,                   // âge du dernier rapport en secondes
    pub health_check: Option<HealthCheckResult>,
}

/// Un relevé horodaté conservé dans l'historique borné d'une machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySnapshot {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub metrics: MetricsMap,
}

/// Commande opérateur en attente de pickup par l'agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCommand {
    pub command_id: String,
    pub command_type: String,       // shutdown, reboot, kill_process, run_command...
    pub parameters: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Dernier résultat de sonde health, écrasé à chaque probe (pas d'historique).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: String,             // healthy, degraded, unreachable...
    pub health_data: serde_json::Value,
    pub latency_ms: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub observed_at: OffsetDateTime,
}

/// Résumé de flotte calculé à la demande, jamais mis en cache.
/// Les moyennes sont None quand aucune machine ne remonte le champ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total_machines: usize,
    pub online: usize,
    pub avg_cpu: Option<f64>,
    pub avg_memory: Option<f64>,
    pub avg_disk: Option<f64>,
    pub alerts: Vec<ResourceAlert>,
}

/// Une alerte par couple (machine, ressource) au-dessus du seuil critique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAlert {
    pub machine_id: String,
    #[serde(rename = "type")]
    pub resource: String,           // cpu, memory, disk
    pub severity: String,           // "critical" uniquement pour l'instant
    pub value: f64,
}
