//! Transient user-facing notices.
//!
//! One `AlertCenter` is created at the application root and handed to every
//! list store by cloning the handle. Alerts dismiss themselves after a fixed
//! time when a tokio runtime is available.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use uuid::Uuid;

/// How long an alert stays visible.
pub const ALERT_TTL: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AlertCenter {
    alerts: Arc<Mutex<Vec<Alert>>>,
    ttl: Duration,
}

impl Default for AlertCenter {
    fn default() -> Self {
        Self::with_ttl(ALERT_TTL)
    }
}

impl AlertCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        AlertCenter {
            alerts: Arc::new(Mutex::new(Vec::new())),
            ttl,
        }
    }

    /// Show `message` and schedule its dismissal. Returns the alert id.
    pub fn show(&self, message: impl Into<String>) -> String {
        let alert = Alert {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
        };
        let id = alert.id.clone();
        tracing::info!(alert = %alert.message, "alert");

        self.lock().push(alert);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let center = self.clone();
            let expired = id.clone();
            handle.spawn(async move {
                tokio::time::sleep(center.ttl).await;
                center.dismiss(&expired);
            });
        }

        id
    }

    /// Remove an alert. Returns false if it was already gone.
    pub fn dismiss(&self, id: &str) -> bool {
        let mut alerts = self.lock();
        let before = alerts.len();
        alerts.retain(|a| a.id != id);
        alerts.len() != before
    }

    /// Currently visible alerts, oldest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Alert>> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_and_dismiss_without_runtime() {
        let center = AlertCenter::new();
        let id = center.show("Saved");

        assert_eq!(center.alerts().len(), 1);
        assert_eq!(center.alerts()[0].message, "Saved");
        assert!(center.dismiss(&id));
        assert!(!center.dismiss(&id));
        assert!(center.alerts().is_empty());
    }

    #[test]
    fn clones_share_the_queue() {
        let center = AlertCenter::new();
        let handle = center.clone();
        handle.show("from a child");
        assert_eq!(center.alerts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn alerts_expire() {
        let center = AlertCenter::new();
        center.show("Deleted");

        tokio::time::sleep(ALERT_TTL - Duration::from_millis(1)).await;
        assert_eq!(center.alerts().len(), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert!(center.alerts().is_empty());
    }
}
