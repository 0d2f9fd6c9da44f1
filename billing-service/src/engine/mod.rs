//! The billing calculator: resolves each service's tariff, aggregates the
//! period's metered energy and settles the four billing components.

mod calc;

pub use calc::{energy_components, tier2_settlement, EnergyComponents};

use futures::{stream, StreamExt};
use metering_client::domain::{BillingPeriod, EnergySeries, Tariff};

use crate::store::MeteringStore;

/// Billing components for one service over one period. Derived data owned by
/// the caller; nothing here is written back to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingResult {
    pub id_service: i32,
    /// Active energy charge.
    pub ea: f64,
    /// Excess energy commercialization credit.
    pub ec: f64,
    /// Tier-1 excess energy (injection offsetting consumption).
    pub ee1: f64,
    /// Tier-2 excess energy settled hour by hour against the reference series.
    pub ee2: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("service {service_id} has metering records but no services row")]
    ServiceNotFound { service_id: i32 },
    #[error(
        "no tariff matches service {service_id} \
         (market {id_market}, cdi {cdi}, voltage level {voltage_level})"
    )]
    TariffNotFound {
        service_id: i32,
        id_market: i32,
        cdi: i32,
        voltage_level: i32,
    },
    #[error("tariff key of service {service_id} matches {matches} rows, expected exactly one")]
    AmbiguousTariff { service_id: i32, matches: usize },
    #[error("data access failure: {source}")]
    DataAccess {
        service_id: Option<i32>,
        #[source]
        source: anyhow::Error,
    },
}

/// A service whose settlement failed; the rest of the run is unaffected.
#[derive(Debug)]
pub struct ServiceFailure {
    pub service_id: i32,
    pub error: BillingError,
}

/// Outcome of one billing run: settled results in ascending service-id order
/// plus the services that could not be settled.
#[derive(Debug)]
pub struct BillingRun {
    pub results: Vec<BillingResult>,
    pub failures: Vec<ServiceFailure>,
}

pub struct BillingCalculator<S> {
    store: S,
    concurrency: usize,
}

impl<S: MeteringStore> BillingCalculator<S> {
    pub fn new(store: S, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Settles every service with metering records in `period`.
    ///
    /// Services are independent, so they are settled with bounded fan-out;
    /// fan-in preserves discovery order, so results come back ascending by
    /// service id regardless of completion order. A failing service lands in
    /// `failures` without aborting the others; only the discovery query itself
    /// is fatal. An empty period is a diagnostic, not an error.
    pub async fn compute_bill(&self, period: BillingPeriod) -> Result<BillingRun, BillingError> {
        let service_ids = self
            .store
            .service_ids_in_period(period)
            .await
            .map_err(|source| BillingError::DataAccess {
                service_id: None,
                source,
            })?;

        if service_ids.is_empty() {
            tracing::info!(%period, "no charges for the month's bill");
            return Ok(BillingRun {
                results: Vec::new(),
                failures: Vec::new(),
            });
        }

        let outcomes = stream::iter(service_ids)
            .map(|service_id| async move {
                (service_id, self.settle_service(service_id, period).await)
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let mut run = BillingRun {
            results: Vec::with_capacity(outcomes.len()),
            failures: Vec::new(),
        };
        for (service_id, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    metrics::counter!("billing_services_settled_total").increment(1);
                    run.results.push(result);
                }
                Err(error) => {
                    metrics::counter!("billing_service_failures_total").increment(1);
                    tracing::error!(service_id, error = %error, "service settlement failed");
                    run.failures.push(ServiceFailure { service_id, error });
                }
            }
        }

        Ok(run)
    }

    async fn settle_service(
        &self,
        service_id: i32,
        period: BillingPeriod,
    ) -> Result<BillingResult, BillingError> {
        let tariff = self.resolve_tariff(service_id).await?;

        let total_consumption = self
            .sum_or_zero(service_id, EnergySeries::Consumption, period)
            .await?;
        let total_injection = self
            .sum_or_zero(service_id, EnergySeries::Injection, period)
            .await?;

        let components = calc::energy_components(total_consumption, total_injection, &tariff);

        let mut rows = self
            .store
            .hourly_settlement_rows(service_id, period)
            .await
            .map_err(|source| BillingError::DataAccess {
                service_id: Some(service_id),
                source,
            })?;
        // The query already orders by timestamp; the stable re-sort keeps the
        // walk deterministic for any store implementation and pins ties to
        // input order.
        rows.sort_by(|a, b| a.ts.cmp(&b.ts));

        let ee2 = calc::tier2_settlement(
            &rows,
            total_consumption,
            components.quantity_ee2,
            tariff.cu,
        );

        Ok(BillingResult {
            id_service: service_id,
            ea: components.ea,
            ec: components.ec,
            ee1: components.ee1,
            ee2,
        })
    }

    async fn resolve_tariff(&self, service_id: i32) -> Result<Tariff, BillingError> {
        let service = self
            .store
            .find_service(service_id)
            .await
            .map_err(|source| BillingError::DataAccess {
                service_id: Some(service_id),
                source,
            })?
            .ok_or(BillingError::ServiceNotFound { service_id })?;

        let key = service.tariff_key();
        let mut tariffs =
            self.store
                .tariffs_for_key(key)
                .await
                .map_err(|source| BillingError::DataAccess {
                    service_id: Some(service_id),
                    source,
                })?;

        match tariffs.len() {
            1 => Ok(tariffs.remove(0)),
            0 => Err(BillingError::TariffNotFound {
                service_id,
                id_market: key.id_market,
                cdi: key.cdi,
                voltage_level: key.voltage_level,
            }),
            matches => Err(BillingError::AmbiguousTariff {
                service_id,
                matches,
            }),
        }
    }

    async fn sum_or_zero(
        &self,
        service_id: i32,
        series: EnergySeries,
        period: BillingPeriod,
    ) -> Result<f64, BillingError> {
        let sum = self
            .store
            .sum_series(service_id, series, period)
            .await
            .map_err(|source| BillingError::DataAccess {
                service_id: Some(service_id),
                source,
            })?;

        Ok(match sum {
            Some(v) => v,
            None => {
                // SQL SUM over zero rows is NULL; an absent series bills as
                // zero energy.
                tracing::debug!(service_id, series = ?series, "series absent in period, sum treated as 0");
                0.0
            }
        })
    }
}
