/**
 * MACHINE REGISTRY - Source de vérité de l'état de la flotte
 *
 * RÔLE : Map identité machine -> état (record + historique borné + file de
 * commandes + dernier health check), arbitrage de tous les accès concurrents.
 *
 * ARCHITECTURE : un seul RwLock sur la map entière. Les écritures
 * (rapports, commandes, probes) prennent le lock exclusif, les lectures le
 * lock partagé : plusieurs lecteurs dashboard en parallèle, jamais de vue
 * déchirée. Toutes les opérations sont synchrones en mémoire, aucun await
 * sous le lock.
 *
 * UTILITÉ DANS ARGUS :
 * 🎯 Ingestion : update_machine / update_health_check depuis la frontière réseau
 * 🎯 Dashboard : get_machine / get_all_machines / get_machine_history / summarize
 * 🎯 Contrôle : add_command / get_pending_commands / remove_command (polling agents)
 *
 * ISOLATION : tout ce qui sort du registry est une copie profonde. Muter une
 * valeur retournée n'affecte jamais le store, et réciproquement.
 */

use crate::commands::CommandQueue;
use crate::config::StoreConfig;
use crate::health::HealthTracker;
use crate::history::HistoryLedger;
use crate::models::{
    FleetSummary, HistorySnapshot, InfoMap, MachineStatus, MachineView, MetricsMap, PendingCommand,
};
use crate::summary;
use parking_lot::RwLock;
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};

/// État interne d'une machine. Jamais exposé par référence :
/// les lectures passent par to_view / clones.
#[derive(Debug)]
struct MachineEntry {
    info: InfoMap,
    latest_metrics: MetricsMap,
    first_seen: OffsetDateTime,
    last_seen: Option<OffsetDateTime>,    // None = placeholder (probe ou commande avant 1er rapport)
    history: HistoryLedger,
    commands: CommandQueue,
    health: HealthTracker,
}

impl MachineEntry {
    fn placeholder(history_size: usize, now: OffsetDateTime) -> Self {
        Self {
            info: InfoMap::new(),
            latest_metrics: MetricsMap::new(),
            first_seen: now,
            last_seen: None,
            history: HistoryLedger::new(history_size),
            commands: CommandQueue::new(),
            health: HealthTracker::new(),
        }
    }
}

pub struct MachineRegistry {
    machines: RwLock<HashMap<String, MachineEntry>>,
    config: StoreConfig,
}

impl MachineRegistry {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            machines: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Ingère un rapport d'agent : crée le record si besoin, merge l'info
    /// champ par champ (last-write-wins), remplace les métriques en bloc,
    /// rafraîchit last_seen et pousse un relevé dans l'historique.
    /// Fonction totale : aucun contenu ne fait échouer l'appel.
    pub fn update_machine(&self, machine_id: &str, info: InfoMap, metrics: MetricsMap) {
        let now = OffsetDateTime::now_utc();
        let mut machines = self.machines.write();
        let entry = machines
            .entry(machine_id.to_string())
            .or_insert_with(|| MachineEntry::placeholder(self.config.history_size, now));

        entry.info.extend(info);
        entry.latest_metrics = metrics.clone();
        entry.last_seen = Some(now);
        entry.history.push(now, metrics);
        tracing::debug!("report ingested for machine {machine_id}");
    }

    /// Vue d'une machine avec statut dérivé à l'instant de l'appel,
    /// None si l'identité n'a jamais été vue.
    pub fn get_machine(&self, machine_id: &str) -> Option<MachineView> {
        let now = OffsetDateTime::now_utc();
        let machines = self.machines.read();
        machines.get(machine_id).map(|e| self.to_view(machine_id, e, now))
    }

    /// Vues de toutes les machines connues, ordre non spécifié.
    pub fn get_all_machines(&self) -> Vec<MachineView> {
        let now = OffsetDateTime::now_utc();
        let machines = self.machines.read();
        machines
            .iter()
            .map(|(id, e)| self.to_view(id, e, now))
            .collect()
    }

    /// Historique d'une machine, du plus ancien au plus récent.
    /// Identité inconnue => liste vide, jamais d'erreur.
    pub fn get_machine_history(&self, machine_id: &str) -> Vec<HistorySnapshot> {
        let machines = self.machines.read();
        machines
            .get(machine_id)
            .map(|e| e.history.snapshots())
            .unwrap_or_default()
    }

    /// Enfile une commande pour une machine (record créé paresseusement si
    /// l'agent ne s'est pas encore annoncé) et retourne l'id généré.
    pub fn add_command(
        &self,
        machine_id: &str,
        command_type: &str,
        parameters: Option<serde_json::Value>,
    ) -> String {
        let now = OffsetDateTime::now_utc();
        let mut machines = self.machines.write();
        let entry = machines
            .entry(machine_id.to_string())
            .or_insert_with(|| MachineEntry::placeholder(self.config.history_size, now));
        let command_id = entry.commands.push(command_type, parameters);
        tracing::info!("queued command {command_id} for machine {machine_id}: {command_type}");
        command_id
    }

    /// Commandes en attente pour une machine, ordre FIFO.
    pub fn get_pending_commands(&self, machine_id: &str) -> Vec<PendingCommand> {
        let machines = self.machines.read();
        machines
            .get(machine_id)
            .map(|e| e.commands.pending())
            .unwrap_or_default()
    }

    /// Acquitte une commande. true exactement une fois par id ; machine ou
    /// commande inconnue => false, résultat attendu et non fatal (l'agent a
    /// pu être acquitté par un poll concurrent).
    pub fn remove_command(&self, machine_id: &str, command_id: &str) -> bool {
        let mut machines = self.machines.write();
        let removed = machines
            .get_mut(machine_id)
            .map(|e| e.commands.acknowledge(command_id))
            .unwrap_or(false);
        if removed {
            tracing::debug!("acknowledged command {command_id} for machine {machine_id}");
        }
        removed
    }

    /// Écrase le dernier résultat de sonde. Une probe peut précéder le
    /// premier rapport : on crée alors un placeholder (offline tant
    /// qu'aucun rapport n'arrive).
    pub fn update_health_check(
        &self,
        machine_id: &str,
        status: &str,
        health_data: serde_json::Value,
        latency_ms: f64,
    ) {
        let now = OffsetDateTime::now_utc();
        let mut machines = self.machines.write();
        let entry = machines
            .entry(machine_id.to_string())
            .or_insert_with(|| MachineEntry::placeholder(self.config.history_size, now));
        entry.health.record(status, health_data, latency_ms);
        tracing::debug!("health check for machine {machine_id}: {status}");
    }

    /// Résumé de flotte calculé sous un seul lock lecture : le snapshot est
    /// cohérent, aucune mutation concurrente ne peut déchirer les moyennes.
    pub fn summarize(&self) -> FleetSummary {
        let now = OffsetDateTime::now_utc();
        let machines = self.machines.read();
        let views: Vec<MachineView> = machines
            .iter()
            .map(|(id, e)| self.to_view(id, e, now))
            .collect();
        summary::summarize(&views, &self.config.thresholds)
    }

    /// Supprime explicitement les machines sans signe de vie depuis `older_than`
    /// (appel opérateur, jamais déclenché par le store lui-même).
    /// Retourne le nombre de records supprimés.
    pub fn purge_stale(&self, older_than: Duration) -> usize {
        let cutoff = OffsetDateTime::now_utc() - older_than;
        let mut machines = self.machines.write();
        let before = machines.len();
        machines.retain(|machine_id, entry| {
            let reference = entry.last_seen.unwrap_or(entry.first_seen);
            if reference < cutoff {
                tracing::info!("purging stale machine {machine_id} (last activity: {reference})");
                false
            } else {
                true
            }
        });
        before - machines.len()
    }

    /// Nombre de machines suivies (jauge pour le health du serveur hôte).
    pub fn machine_count(&self) -> usize {
        self.machines.read().len()
    }

    // Copie profonde + dérivation du statut. Le statut est une fonction pure
    // de (now, last_seen, fenêtre), jamais stocké : pas de thread de balayage.
    fn to_view(&self, machine_id: &str, entry: &MachineEntry, now: OffsetDateTime) -> MachineView {
        let window = self.config.freshness_window();
        let status = match entry.last_seen {
            Some(seen) if now - seen <= window => MachineStatus::Online,
            _ => MachineStatus::Offline,
        };
        let age = now - entry.last_seen.unwrap_or(entry.first_seen);
        MachineView {
            machine_id: machine_id.to_string(),
            info: entry.info.clone(),
            latest_metrics: entry.latest_metrics.clone(),
            status,
            last_seen: entry.last_seen,
            first_seen: entry.first_seen,
            stale_for_seconds: age.whole_seconds().max(0),
            health_check: entry.health.last(),
        }
    }
}
