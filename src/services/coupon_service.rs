// src/services/coupon_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CouponRepository, UserRepository},
    models::coupon::{Coupon, CouponUsageReset, CreateCouponPayload},
    services::invalidation::{ChangeOp, ChangeSource, Collection, InvalidationHub},
};

#[derive(Clone)]
pub struct CouponService {
    repo: CouponRepository,
    user_repo: UserRepository,
    pool: PgPool,
    hub: InvalidationHub,
}

impl CouponService {
    pub fn new(repo: CouponRepository, user_repo: UserRepository, pool: PgPool, hub: InvalidationHub) -> Self {
        Self { repo, user_repo, pool, hub }
    }

    pub async fn list_all(&self) -> Result<Vec<Coupon>, AppError> {
        self.repo.list_all().await
    }

    pub async fn active(&self) -> Result<Option<Coupon>, AppError> {
        self.repo.find_working(&self.pool).await
    }

    /// Só pode haver um cupom 'working'. A checagem roda na mesma transação
    /// do insert e o índice parcial do banco cobre a corrida entre as duas.
    pub async fn create(&self, payload: CreateCouponPayload) -> Result<Coupon, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        let mut tx = self.pool.begin().await?;
        if let Some(current) = self.repo.find_working(&mut *tx).await? {
            tracing::warn!("⚠️ Cupom '{}' ainda ativo; criação recusada", current.cupon_name);
            return Err(AppError::CouponAlreadyActive);
        }
        let coupon = self
            .repo
            .create(&mut *tx, &payload.cupon_name, payload.discount_percent)
            .await?;
        tx.commit().await?;

        tracing::info!("🎟️ Cupom '{}' criado ({}%)", coupon.cupon_name, coupon.discount_percent);
        self.hub.publish(Collection::Cupons, ChangeOp::Insert, ChangeSource::Local);
        Ok(coupon)
    }

    pub async fn delete(&self, id: Uuid) -> Result<Coupon, AppError> {
        let mut tx = self.pool.begin().await?;
        let coupon = self.repo.soft_delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Cupom '{}' removido", coupon.cupon_name);
        self.hub.publish(Collection::Cupons, ChangeOp::Update, ChangeSource::Local);
        Ok(coupon)
    }

    /// Volta o status de uso de todos os usuários para 'not_used'.
    pub async fn reset_usage(&self) -> Result<CouponUsageReset, AppError> {
        let mut tx = self.pool.begin().await?;
        let users_reset = self.user_repo.reset_coupon_status(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!("🔄 Uso de cupom reiniciado para {} usuários", users_reset);
        if users_reset > 0 {
            self.hub.publish(Collection::Users, ChangeOp::Update, ChangeSource::Local);
        }
        Ok(CouponUsageReset { users_reset })
    }
}
