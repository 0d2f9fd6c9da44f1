mod hourly;
mod period;
mod service;
mod tariff;

pub use hourly::HourlySettlementRow;
pub use period::{BillingPeriod, PeriodError};
pub use service::{Service, TariffKey};
pub use tariff::Tariff;

/// Which metered series a period aggregation ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergySeries {
    Consumption,
    Injection,
}
