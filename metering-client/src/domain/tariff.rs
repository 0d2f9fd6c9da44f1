/// One row of the published tariff table, keyed by market, connection/device
/// index and voltage level.
///
/// Only `cu` (consumption unit rate) and `c` (commercialization rate) feed the
/// billing calculation; the other components are carried because the table
/// publishes them.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tariff {
    pub id_market: i32,
    pub voltage_level: i32,
    pub cdi: i32,
    pub g: f64,
    pub t: f64,
    pub d: f64,
    pub r: f64,
    pub c: f64,
    pub p: f64,
    pub cu: f64,
}
