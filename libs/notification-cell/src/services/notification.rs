use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{Notification, NotificationError};

pub struct NotificationService {
    db: PostgrestClient,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    /// Newest first.
    pub async fn list_for_doctor(&self, doctor_id: i64) -> Result<Vec<Notification>, NotificationError> {
        debug!("Fetching notifications for doctor {}", doctor_id);

        let path = format!("/notifications?doctor_id=eq.{}&order=created_at.desc", doctor_id);
        let notifications: Vec<Notification> = self.db.request(Method::GET, &path, None).await?;
        Ok(notifications)
    }

    pub async fn get_notification(&self, notification_id: i64) -> Result<Notification, NotificationError> {
        let path = format!("/notifications?id=eq.{}", notification_id);
        let mut rows: Vec<Notification> = self.db.request(Method::GET, &path, None).await?;

        if rows.is_empty() {
            return Err(NotificationError::NotFound);
        }
        Ok(rows.swap_remove(0))
    }

    pub async fn mark_read(&self, notification_id: i64) -> Result<Notification, NotificationError> {
        let path = format!("/notifications?id=eq.{}", notification_id);
        let mut rows: Vec<Notification> = self.db.update(&path, json!({ "is_read": true })).await?;

        if rows.is_empty() {
            return Err(NotificationError::NotFound);
        }
        info!("Notification {} marked as read", notification_id);
        Ok(rows.swap_remove(0))
    }

    pub async fn notify_doctor(&self, doctor_id: i64, message: &str) -> Result<Notification, NotificationError> {
        if message.trim().is_empty() {
            return Err(NotificationError::ValidationError("Notification message is empty".to_string()));
        }

        let notification: Notification = self.db.insert("notifications", json!({
            "doctor_id": doctor_id,
            "message": message,
            "is_read": false
        })).await?;

        debug!("Notification {} created for doctor {}", notification.id, doctor_id);
        Ok(notification)
    }
}
