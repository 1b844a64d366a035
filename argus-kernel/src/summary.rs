/**
 * AGRÉGATS DE FLOTTE - Statistiques et alertes calculées à la demande
 *
 * RÔLE : Produire le résumé global (compteurs, moyennes cpu/memory/disk,
 * alertes seuils) depuis un snapshot cohérent du registry.
 *
 * FONCTIONNEMENT : fonction pure sur une liste de vues machines, jamais de
 * cache (le statut dérivé de la fenêtre de fraîcheur deviendrait faux).
 * Les machines qui ne remontent pas un champ sont exclues de sa moyenne,
 * pas comptées à zéro.
 */

use crate::config::AlertThresholds;
use crate::models::{
    FleetSummary, MachineStatus, MachineView, MetricsMap, ResourceAlert, METRIC_CPU, METRIC_DISK,
    METRIC_MEMORY,
};

pub const SEVERITY_CRITICAL: &str = "critical";

/// Extrait une métrique numérique ; champ absent ou non numérique => None.
fn metric_value(metrics: &MetricsMap, key: &str) -> Option<f64> {
    metrics.get(key).and_then(|v| v.as_f64())
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Résumé de flotte depuis un snapshot de vues machines.
/// L'appelant garantit la cohérence du snapshot (voir MachineRegistry::summarize).
pub fn summarize(machines: &[MachineView], thresholds: &AlertThresholds) -> FleetSummary {
    let mut cpu = Vec::new();
    let mut memory = Vec::new();
    let mut disk = Vec::new();
    let mut alerts = Vec::new();
    let mut online = 0usize;

    for machine in machines {
        if machine.status == MachineStatus::Online {
            online += 1;
        }
        let resources = [
            (METRIC_CPU, thresholds.cpu, &mut cpu),
            (METRIC_MEMORY, thresholds.memory, &mut memory),
            (METRIC_DISK, thresholds.disk, &mut disk),
        ];
        for (key, threshold, bucket) in resources {
            if let Some(value) = metric_value(&machine.latest_metrics, key) {
                bucket.push(value);
                if value >= threshold {
                    alerts.push(ResourceAlert {
                        machine_id: machine.machine_id.clone(),
                        resource: key.to_string(),
                        severity: SEVERITY_CRITICAL.to_string(),
                        value,
                    });
                }
            }
        }
    }

    FleetSummary {
        total_machines: machines.len(),
        online,
        avg_cpu: average(&cpu),
        avg_memory: average(&memory),
        avg_disk: average(&disk),
        alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use time::OffsetDateTime;

    fn view(id: &str, cpu: Option<f64>, memory: Option<f64>) -> MachineView {
        let mut metrics = HashMap::new();
        if let Some(c) = cpu {
            metrics.insert(METRIC_CPU.to_string(), serde_json::json!(c));
        }
        if let Some(m) = memory {
            metrics.insert(METRIC_MEMORY.to_string(), serde_json::json!(m));
        }
        MachineView {
            machine_id: id.to_string(),
            info: HashMap::new(),
            latest_metrics: metrics,
            status: MachineStatus::Online,
            last_seen: Some(OffsetDateTime::now_utc()),
            first_seen: OffsetDateTime::now_utc(),
            stale_for_seconds: 0,
            health_check: None,
        }
    }

    #[test]
    fn test_average_and_single_critical_alert() {
        let machines = vec![
            view("m1", Some(30.0), None),
            view("m2", Some(95.0), None),
            view("m3", Some(70.0), None),
        ];
        let summary = summarize(&machines, &AlertThresholds::default());
        assert_eq!(summary.total_machines, 3);
        assert_eq!(summary.online, 3);
        assert_eq!(summary.avg_cpu, Some(65.0));
        assert_eq!(summary.avg_memory, None);
        assert_eq!(summary.alerts.len(), 1);
        let alert = &summary.alerts[0];
        assert_eq!(alert.machine_id, "m2");
        assert_eq!(alert.resource, METRIC_CPU);
        assert_eq!(alert.severity, SEVERITY_CRITICAL);
        assert_eq!(alert.value, 95.0);
    }

    #[test]
    fn test_missing_field_excluded_from_average() {
        // m2 ne remonte pas memory : la moyenne ne porte que sur m1 et m3
        let machines = vec![
            view("m1", Some(10.0), Some(40.0)),
            view("m2", Some(20.0), None),
            view("m3", Some(30.0), Some(60.0)),
        ];
        let summary = summarize(&machines, &AlertThresholds::default());
        assert_eq!(summary.avg_cpu, Some(20.0));
        assert_eq!(summary.avg_memory, Some(50.0));
    }

    #[test]
    fn test_empty_fleet() {
        let summary = summarize(&[], &AlertThresholds::default());
        assert_eq!(summary.total_machines, 0);
        assert_eq!(summary.online, 0);
        assert_eq!(summary.avg_cpu, None);
        assert!(summary.alerts.is_empty());
    }

    #[test]
    fn test_non_numeric_metric_ignored() {
        let mut machine = view("m1", None, None);
        machine
            .latest_metrics
            .insert(METRIC_CPU.to_string(), serde_json::json!("n/a"));
        let summary = summarize(&[machine], &AlertThresholds::default());
        assert_eq!(summary.avg_cpu, None);
        assert!(summary.alerts.is_empty());
    }
}
