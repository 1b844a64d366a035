use crate::models::PendingCommand;
use std::collections::VecDeque;
use time::OffsetDateTime;
use uuid::Uuid;

/// File FIFO des commandes opérateur en attente de pickup par l'agent.
/// Volontairement non bornée : les agents sont censés dépiler rapidement,
/// et borner reviendrait à jeter silencieusement de l'intention opérateur.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    entries: VecDeque<PendingCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enfile une commande et retourne son id généré.
    pub fn push(&mut self, command_type: &str, parameters: Option<serde_json::Value>) -> String {
        let command_id = Uuid::new_v4().to_string();
        self.entries.push_back(PendingCommand {
            command_id: command_id.clone(),
            command_type: command_type.to_string(),
            parameters,
            created_at: OffsetDateTime::now_utc(),
        });
        command_id
    }

    /// Copie profonde des commandes en attente, ordre d'insertion.
    pub fn pending(&self) -> Vec<PendingCommand> {
        self.entries.iter().cloned().collect()
    }

    /// Retire la première commande dont l'id correspond. Retourne false si
    /// l'id est inconnu ou déjà acquitté : un double ack n'est pas une erreur.
    pub fn acknowledge(&mut self, command_id: &str) -> bool {
        match self.entries.iter().position(|c| c.command_id == command_id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
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

    #[test]
    fn test_fifo_order() {
        let mut q = CommandQueue::new();
        q.push("reboot", None);
        q.push("run_command", Some(serde_json::json!({"cmd": "uptime"})));
        let pending = q.pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].command_type, "reboot");
        assert_eq!(pending[1].command_type, "run_command");
    }

    #[test]
    fn test_acknowledge_once() {
        let mut q = CommandQueue::new();
        let id = q.push("shutdown", None);
        assert!(q.acknowledge(&id));
        assert!(!q.acknowledge(&id));
        assert!(!q.acknowledge("no-such-id"));
        assert!(q.is_empty());
    }
}
