use anyhow::Result;
use async_trait::async_trait;
use metering_client::{
    db::billing_queries,
    domain::{BillingPeriod, EnergySeries, HourlySettlementRow, Service, Tariff, TariffKey},
};
use sqlx::PgPool;

use super::MeteringStore;

/// `MeteringStore` backed by the Postgres metering schema.
#[derive(Clone)]
pub struct PgMeteringStore {
    pool: PgPool,
}

impl PgMeteringStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeteringStore for PgMeteringStore {
    async fn service_ids_in_period(&self, period: BillingPeriod) -> Result<Vec<i32>> {
        billing_queries::service_ids_in_period(&self.pool, period).await
    }

    async fn find_service(&self, service_id: i32) -> Result<Option<Service>> {
        billing_queries::find_service(&self.pool, service_id).await
    }

    async fn tariffs_for_key(&self, key: TariffKey) -> Result<Vec<Tariff>> {
        billing_queries::tariffs_for_key(&self.pool, key).await
    }

    async fn sum_series(
        &self,
        service_id: i32,
        series: EnergySeries,
        period: BillingPeriod,
    ) -> Result<Option<f64>> {
        billing_queries::sum_series(&self.pool, service_id, series, period).await
    }

    async fn hourly_settlement_rows(
        &self,
        service_id: i32,
        period: BillingPeriod,
    ) -> Result<Vec<HourlySettlementRow>> {
        billing_queries::hourly_settlement_rows(&self.pool, service_id, period).await
    }
}
