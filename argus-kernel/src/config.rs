use serde::{Deserialize, Serialize};
use std::path::Path;
use time::Duration;
use tokio::fs;

/// Configuration consommée par le store à la construction.
/// Le chargement fichier est tolérant (défauts + warning) comme le reste
/// de la chaîne de boot ; `from_file` existe pour les appelants stricts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub history_size: usize,              // relevés conservés par machine
    pub freshness_window_seconds: i64,    // au-delà => statut offline
    pub thresholds: AlertThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_size: 100,
            freshness_window_seconds: 90,
            thresholds: AlertThresholds::default(),
        }
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self { cpu: 90.0, memory: 90.0, disk: 90.0 }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl StoreConfig {
    /// Lecture stricte : toute erreur IO/parse remonte à l'appelant.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let txt = fs::read_to_string(path).await?;
        let cfg: StoreConfig = serde_yaml::from_str(&txt)?;
        Ok(cfg.sanitized())
    }

    /// Fenêtre de fraîcheur sous forme de Duration prête à comparer.
    pub fn freshness_window(&self) -> Duration {
        Duration::seconds(self.freshness_window_seconds)
    }

    // history_size = 0 n'a pas de sens, on retombe sur 1 plutôt que paniquer
    fn sanitized(mut self) -> Self {
        if self.history_size == 0 {
            tracing::warn!("history_size 0 invalide, ramené à 1");
            self.history_size = 1;
        }
        self
    }
}

/// Charge la config YAML depuis $ARGUS_KERNEL_CONFIG (défaut: argus.yaml).
/// Fichier absent ou invalide => config par défaut, on ne bloque pas le boot.
pub async fn load_config() -> StoreConfig {
    let path = std::env::var("ARGUS_KERNEL_CONFIG").unwrap_or_else(|_| "argus.yaml".into());
    if Path::new(&path).exists() {
        let txt = fs::read_to_string(&path).await.unwrap_or_default();
        if txt.trim().is_empty() {
            return StoreConfig::default();
        }
        match serde_yaml::from_str::<StoreConfig>(&txt) {
            Ok(cfg) => cfg.sanitized(),
            Err(e) => {
                tracing::warn!("config invalide: {e}, usage config par défaut");
                StoreConfig::default()
            }
        }
    } else {
        tracing::warn!("pas de {path}, usage config par défaut");
        StoreConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.history_size, 100);
        assert_eq!(cfg.freshness_window_seconds, 90);
        assert_eq!(cfg.thresholds.cpu, 90.0);
    }

    #[tokio::test]
    async fn test_from_file_partial_yaml() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "history_size: 25").unwrap();
        let cfg = StoreConfig::from_file(f.path()).await.unwrap();
        assert_eq!(cfg.history_size, 25);
        // champs absents => défauts
        assert_eq!(cfg.freshness_window_seconds, 90);
    }

    #[tokio::test]
    async fn test_from_file_zero_history_sanitized() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "history_size: 0").unwrap();
        let cfg = StoreConfig::from_file(f.path()).await.unwrap();
        assert_eq!(cfg.history_size, 1);
    }

    #[tokio::test]
    async fn test_from_file_missing_is_error() {
        let res = StoreConfig::from_file("/nonexistent/argus.yaml").await;
        assert!(matches!(res, Err(ConfigError::Io(_))));
    }
}
