use bigdecimal::{BigDecimal, ToPrimitive};
use diesel::r2d2::{self, ConnectionManager, Pool};
use diesel::PgConnection;
use std::str::FromStr;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_conn() -> Result<DbPool, r2d2::PoolError> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://leather:@localhost:5432/leatherserver".to_string());
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().build(manager)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("running migrations: {e}"))?;
    Ok(())
}

pub fn bd(val: f64) -> BigDecimal {
    BigDecimal::from_str(&val.to_string()).unwrap_or_else(|_| BigDecimal::from(0))
}

pub fn bd_to_f64(val: &BigDecimal) -> f64 {
    val.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_roundtrip() {
        assert_eq!(bd_to_f64(&bd(249.90)), 249.90);
        assert_eq!(bd_to_f64(&bd(0.0)), 0.0);
    }
}
