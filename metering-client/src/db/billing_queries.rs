use anyhow::Result;
use sqlx::PgPool;

use crate::domain::{BillingPeriod, EnergySeries, HourlySettlementRow, Service, Tariff, TariffKey};

/// Distinct services with metering records in the period, in ascending id
/// order. The ordering keeps result assembly stable run to run.
pub async fn service_ids_in_period(pool: &PgPool, period: BillingPeriod) -> Result<Vec<i32>> {
    let ids = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT DISTINCT id_service
        FROM records
        WHERE record_timestamp >= $1
          AND record_timestamp <  $2
        ORDER BY id_service
        "#,
    )
    .bind(period.start())
    .bind(period.end())
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

pub async fn find_service(pool: &PgPool, service_id: i32) -> Result<Option<Service>> {
    let service = sqlx::query_as::<_, Service>(
        r#"
        SELECT id_service, id_market, cdi, voltage_level
        FROM services
        WHERE id_service = $1
        "#,
    )
    .bind(service_id)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}

/// All tariff rows matching the key. The key is meant to be a candidate key,
/// so anything other than exactly one row is a data-integrity fault; the
/// caller classifies zero/one/many.
pub async fn tariffs_for_key(pool: &PgPool, key: TariffKey) -> Result<Vec<Tariff>> {
    let tariffs = sqlx::query_as::<_, Tariff>(
        r#"
        SELECT id_market, voltage_level, cdi, g, t, d, r, c, p, cu
        FROM tariffs
        WHERE id_market = $1
          AND cdi = $2
          AND voltage_level = $3
        "#,
    )
    .bind(key.id_market)
    .bind(key.cdi)
    .bind(key.voltage_level)
    .fetch_all(pool)
    .await?;

    Ok(tariffs)
}

/// Period total of one metered series for a service.
///
/// SQL `SUM` over zero rows is NULL; that comes back as `None` rather than a
/// silent zero so the caller decides how an absent series is billed.
pub async fn sum_series(
    pool: &PgPool,
    service_id: i32,
    series: EnergySeries,
    period: BillingPeriod,
) -> Result<Option<f64>> {
    let sql = match series {
        EnergySeries::Consumption => {
            r#"
            SELECT SUM(c.value)
            FROM consumption c
            JOIN records r ON r.id_record = c.id_record
            WHERE r.id_service = $1
              AND r.record_timestamp >= $2
              AND r.record_timestamp <  $3
            "#
        }
        EnergySeries::Injection => {
            r#"
            SELECT SUM(i.value)
            FROM injection i
            JOIN records r ON r.id_record = i.id_record
            WHERE r.id_service = $1
              AND r.record_timestamp >= $2
              AND r.record_timestamp <  $3
            "#
        }
    };

    let sum = sqlx::query_scalar::<_, Option<f64>>(sql)
        .bind(service_id)
        .bind(period.start())
        .bind(period.end())
        .fetch_one(pool)
        .await?;

    Ok(sum)
}

/// Time-ordered settlement rows for a service: per-timestamp sums of both
/// metered series joined with the published reference rate for that hour.
pub async fn hourly_settlement_rows(
    pool: &PgPool,
    service_id: i32,
    period: BillingPeriod,
) -> Result<Vec<HourlySettlementRow>> {
    let rows = sqlx::query_as::<_, HourlySettlementRow>(
        r#"
        SELECT
            r.record_timestamp AS ts,
            SUM(c.value)       AS consumption_kwh,
            SUM(i.value)       AS injection_kwh,
            xm.value           AS reference_rate
        FROM records r
        JOIN consumption c ON c.id_record = r.id_record
        JOIN injection  i  ON i.id_record = r.id_record
        JOIN xm_data_hourly_per_agent xm
          ON xm.record_timestamp = r.record_timestamp
        WHERE r.id_service = $1
          AND r.record_timestamp >= $2
          AND r.record_timestamp <  $3
        GROUP BY r.record_timestamp, xm.value
        ORDER BY r.record_timestamp
        "#,
    )
    .bind(service_id)
    .bind(period.start())
    .bind(period.end())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
