/// Candidate key into the tariff table. A service must resolve to exactly one
/// tariff row through this tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TariffKey {
    pub id_market: i32,
    pub cdi: i32,
    pub voltage_level: i32,
}

/// A billing account, carrying the key its tariff is looked up by.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Service {
    pub id_service: i32,
    pub id_market: i32,
    pub cdi: i32,
    pub voltage_level: i32,
}

impl Service {
    pub fn tariff_key(&self) -> TariffKey {
        TariffKey {
            id_market: self.id_market,
            cdi: self.cdi,
            voltage_level: self.voltage_level,
        }
    }
}
