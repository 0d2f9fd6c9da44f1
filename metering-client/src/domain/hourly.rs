use time::OffsetDateTime;

/// One settlement row for a service: the metered values summed per record
/// timestamp, joined with the system-wide reference rate published for that
/// hour (`xm_data_hourly_per_agent`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HourlySettlementRow {
    pub ts: OffsetDateTime,
    pub consumption_kwh: f64,
    pub injection_kwh: f64,
    pub reference_rate: f64,
}
