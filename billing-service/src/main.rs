use anyhow::{Context, Result};
use billing_service::{
    config::AppConfig, engine::BillingCalculator, observability, store::PgMeteringStore,
};
use metering_client::domain::BillingPeriod;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        observability::serve_metrics(&metrics_cfg.bind_addr);
    }

    let (month, year) = parse_period_args()?;
    let period = BillingPeriod::from_ym(year, month)?;

    // The pool lives for exactly one billing run and is released on exit.
    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await?;

    let calculator =
        BillingCalculator::new(PgMeteringStore::new(pool.clone()), cfg.billing.concurrency);
    let run = calculator.compute_bill(period).await?;

    for r in &run.results {
        println!(
            "id_service: {} EA: {:.2} EC: {:.2} EE1: {:.2} EE2: {:.2}",
            r.id_service, r.ea, r.ec, r.ee1, r.ee2
        );
    }

    tracing::info!(
        settled = run.results.len(),
        failed = run.failures.len(),
        %period,
        "billing run finished"
    );

    pool.close().await;

    if !run.failures.is_empty() {
        anyhow::bail!(
            "{} of {} services failed to settle",
            run.failures.len(),
            run.results.len() + run.failures.len()
        );
    }

    Ok(())
}

fn parse_period_args() -> Result<(u8, i32)> {
    let mut args = std::env::args().skip(1);

    let month = args
        .next()
        .context("usage: billing-service <month> <year>")?
        .parse::<u8>()
        .context("month must be an integer between 1 and 12")?;
    let year = args
        .next()
        .context("usage: billing-service <month> <year>")?
        .parse::<i32>()
        .context("year must be an integer")?;

    Ok((month, year))
}
