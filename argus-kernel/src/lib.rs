/**
 * ARGUS KERNEL - Store d'état de flotte en mémoire
 *
 * RÔLE : État central que le serveur Argus embarque pour suivre une
 * population d'agents : dernier rapport par machine, historique borné de
 * relevés, file de commandes opérateur, health checks, agrégats de flotte.
 *
 * ARCHITECTURE : registry unique derrière un RwLock, copies profondes à la
 * frontière, statut online/offline dérivé à la lecture. Les frontières
 * réseau (ingestion des rapports, API dashboard) vivent hors de ce crate
 * et n'appellent que l'API publique ci-dessous.
 *
 * UTILITÉ : état volatile, durée de vie du process ; aucune persistance ni
 * coordination multi-nœuds.
 */

pub mod commands;
pub mod config;
pub mod health;
pub mod history;
pub mod models;
pub mod registry;
pub mod summary;

pub use config::{load_config, AlertThresholds, ConfigError, StoreConfig};
pub use models::{
    FleetSummary, HealthCheckResult, HistorySnapshot, InfoMap, MachineStatus, MachineView,
    MetricsMap, PendingCommand, ResourceAlert,
};
pub use registry::MachineRegistry;
pub use summary::summarize;
