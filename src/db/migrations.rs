use rusqlite::{Connection, Result};
use super::schema::SCHEMA;

/// Apply the schema. Safe to run on every start; seeding of default
/// settings is left to `ConfigAccessor::initialize_defaults` so a valid
/// stored value is never overwritten here.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
