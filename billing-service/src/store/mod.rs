mod pg;

pub use pg::PgMeteringStore;

use anyhow::Result;
use async_trait::async_trait;
use metering_client::domain::{
    BillingPeriod, EnergySeries, HourlySettlementRow, Service, Tariff, TariffKey,
};

/// Read-only data-access capability the billing engine computes from.
///
/// The Postgres implementation delegates to `metering-client`; tests
/// substitute an in-memory fake. Locking and transaction discipline stay with
/// the backing store, the engine only reads.
#[async_trait]
pub trait MeteringStore: Send + Sync {
    /// Distinct services with metering records in the period, ascending by id.
    async fn service_ids_in_period(&self, period: BillingPeriod) -> Result<Vec<i32>>;

    async fn find_service(&self, service_id: i32) -> Result<Option<Service>>;

    /// All tariff rows matching the key; the engine enforces exactly-one.
    async fn tariffs_for_key(&self, key: TariffKey) -> Result<Vec<Tariff>>;

    /// Period total of one metered series, `None` when the service has no
    /// rows in that series for the period.
    async fn sum_series(
        &self,
        service_id: i32,
        series: EnergySeries,
        period: BillingPeriod,
    ) -> Result<Option<f64>>;

    /// Settlement rows joined with the reference series, ordered by timestamp.
    async fn hourly_settlement_rows(
        &self,
        service_id: i32,
        period: BillingPeriod,
    ) -> Result<Vec<HourlySettlementRow>>;
}
