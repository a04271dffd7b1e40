// src/services/notification_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::NotificationRepository,
    models::notification::{Notification, UnreadCount},
    services::invalidation::{ChangeOp, ChangeSource, Collection, InvalidationHub},
};

const LATEST_LIMIT: i64 = 10;

// Nada fica em memória: outros sistemas inserem notificações direto no banco,
// então o contador do sino é sempre consultado.
#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    pool: PgPool,
    hub: InvalidationHub,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository, pool: PgPool, hub: InvalidationHub) -> Self {
        Self { repo, pool, hub }
    }

    pub async fn latest_unread(&self) -> Result<Vec<Notification>, AppError> {
        self.repo.list_unread(LATEST_LIMIT).await
    }

    pub async fn unread_count(&self) -> Result<UnreadCount, AppError> {
        let unread = self.repo.count_unread().await?;
        Ok(UnreadCount { unread })
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Notification, AppError> {
        let mut tx = self.pool.begin().await?;
        let notification = self.repo.mark_read(&mut *tx, id).await?;
        tx.commit().await?;

        self.hub.publish(Collection::Notifications, ChangeOp::Update, ChangeSource::Local);
        Ok(notification)
    }
}
