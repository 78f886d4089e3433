//! SQLite schema definitions and migrations.

use rusqlite::Connection;

use crate::error::CatalogResult;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Multi-valued product fields, each stored in a `product_<field>` link table.
pub const PRODUCT_LIST_FIELDS: [&str; 8] = [
    "synonym",
    "class_of_compounds",
    "risk_phrase",
    "safety_phrase",
    "hazard_statement",
    "precautionary_statement",
    "hazard_code",
    "symbol",
];

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> CatalogResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, 1)?;
        migrate_schema(conn, 1)?;
    } else if current_version < SCHEMA_VERSION {
        migrate_schema(conn, current_version)?;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> CatalogResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> CatalogResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Create the initial schema (version 1).
fn create_schema_v1(conn: &Connection) -> CatalogResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS entity (
            id INTEGER PRIMARY KEY,
            role TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS name (
            id INTEGER PRIMARY KEY,
            label TEXT NOT NULL,
            label_nost TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS class_of_compounds (
            id INTEGER PRIMARY KEY,
            label TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS product (
            id INTEGER PRIMARY KEY,
            name INTEGER NOT NULL REFERENCES name(id),
            specificity TEXT,
            restricted_access INTEGER NOT NULL DEFAULT 0,
            creation_datetime TEXT,
            archive INTEGER NOT NULL DEFAULT 0,
            person INTEGER,
            cas_number TEXT,
            ce_number TEXT,
            empirical_formula INTEGER,
            linear_formula INTEGER,
            td_formula TEXT,
            msds TEXT,
            is_cmr INTEGER NOT NULL DEFAULT 0,
            is_radio INTEGER NOT NULL DEFAULT 0,
            cmr_cat TEXT,
            physical_state INTEGER,
            signal_word INTEGER,
            remark TEXT,
            disposal_comment TEXT
        );

        CREATE TABLE IF NOT EXISTS store_location (
            id INTEGER PRIMARY KEY,
            label TEXT NOT NULL,
            entity INTEGER NOT NULL REFERENCES entity(id),
            parent INTEGER REFERENCES store_location(id)
        );

        CREATE TABLE IF NOT EXISTS storage (
            id INTEGER PRIMARY KEY,
            product INTEGER NOT NULL REFERENCES product(id),
            store_location INTEGER NOT NULL REFERENCES store_location(id),
            volume_weight REAL,
            unit INTEGER,
            barecode TEXT,
            comment TEXT,
            batch_number TEXT,
            supplier INTEGER,
            creation_datetime TEXT,
            entry_datetime TEXT,
            exit_datetime TEXT,
            opening_datetime TEXT,
            to_destroy INTEGER NOT NULL DEFAULT 0,
            person INTEGER,
            archive INTEGER NOT NULL DEFAULT 0,
            reference TEXT,
            nb_items INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS borrow (
            id INTEGER PRIMARY KEY,
            storage INTEGER NOT NULL REFERENCES storage(id),
            borrower INTEGER NOT NULL,
            person INTEGER,
            creation_datetime TEXT,
            comment TEXT
        );

        CREATE TABLE IF NOT EXISTS bookmark (
            id INTEGER PRIMARY KEY,
            product INTEGER NOT NULL REFERENCES product(id),
            person INTEGER NOT NULL
        );",
    )?;

    for field in PRODUCT_LIST_FIELDS {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS product_{field} (
                product_id INTEGER NOT NULL REFERENCES product(id) ON DELETE CASCADE,
                value_id INTEGER NOT NULL,
                PRIMARY KEY (product_id, value_id)
            );"
        ))?;
    }

    Ok(())
}

fn migrate_schema(conn: &Connection, from_version: i32) -> CatalogResult<()> {
    let mut version = from_version;

    while version < SCHEMA_VERSION {
        match version {
            1 => migrate_v1_to_v2(conn)?,
            _ => {
                return Err(crate::error::CatalogError::unavailable(format!(
                    "unknown schema version: {}",
                    version
                )));
            }
        }
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

/// Migrate from schema version 1 to version 2.
///
/// Adds the indexes used by search joins and list-field lookups.
fn migrate_v1_to_v2(conn: &Connection) -> CatalogResult<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_product_name ON product(name)",
        "CREATE INDEX IF NOT EXISTS idx_name_label_nost ON name(label_nost)",
        "CREATE INDEX IF NOT EXISTS idx_storage_product ON storage(product)",
        "CREATE INDEX IF NOT EXISTS idx_storage_location ON storage(store_location)",
        "CREATE INDEX IF NOT EXISTS idx_store_location_parent ON store_location(parent)",
        "CREATE INDEX IF NOT EXISTS idx_borrow_storage ON borrow(storage)",
        "CREATE INDEX IF NOT EXISTS idx_bookmark_product ON bookmark(product, person)",
    ];
    for sql in indexes {
        conn.execute(sql, [])?;
    }

    for field in PRODUCT_LIST_FIELDS {
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_product_{field}_value ON product_{field}(value_id)"
            ),
            [],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE 'product_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, PRODUCT_LIST_FIELDS.len() as i64);
    }
}
