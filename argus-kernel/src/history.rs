use crate::models::{HistorySnapshot, MetricsMap};
use std::collections::VecDeque;
use time::OffsetDateTime;

/// Historique borné d'une machine : fenêtre glissante des `capacity` derniers
/// relevés, plus ancien en tête. L'append évince en tête une fois plein et
/// n'échoue jamais, quel que soit le débit de rapports.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    capacity: usize,
    entries: VecDeque<HistorySnapshot>,
}

impl HistoryLedger {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Ajoute un relevé, en évinçant le plus ancien si la capacité est atteinte.
    pub fn push(&mut self, timestamp: OffsetDateTime, metrics: MetricsMap) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistorySnapshot { timestamp, metrics });
    }

    /// Copie profonde du contenu, du plus ancien au plus récent.
    pub fn snapshots(&self) -> Vec<HistorySnapshot> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn metrics(cpu: f64) -> MetricsMap {
        let mut m = HashMap::new();
        m.insert("cpu".to_string(), serde_json::json!(cpu));
        m
    }

    #[test]
    fn test_sliding_window_eviction() {
        let mut ledger = HistoryLedger::new(3);
        for i in 0..5 {
            ledger.push(OffsetDateTime::now_utc(), metrics(i as f64));
        }
        assert_eq!(ledger.len(), 3);
        let snaps = ledger.snapshots();
        // les relevés 0 et 1 ont été évincés, ordre ancien -> récent
        assert_eq!(snaps[0].metrics["cpu"], serde_json::json!(2.0));
        assert_eq!(snaps[2].metrics["cpu"], serde_json::json!(4.0));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut ledger = HistoryLedger::new(0);
        ledger.push(OffsetDateTime::now_utc(), metrics(1.0));
        ledger.push(OffsetDateTime::now_utc(), metrics(2.0));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.snapshots()[0].metrics["cpu"], serde_json::json!(2.0));
    }
}
