use anyhow::Context;
use rusqlite::Connection;

// Migrations are embedded so that in-memory databases come up fully migrated.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "0001_activities",
        "CREATE TABLE IF NOT EXISTS activities (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT,
            location TEXT,
            duration_minutes INTEGER NOT NULL DEFAULT 60,
            price REAL NOT NULL,
            capacity INTEGER NOT NULL DEFAULT 10,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    ),
    (
        "0002_customers",
        "CREATE TABLE IF NOT EXISTS customers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            country TEXT,
            created_at TEXT NOT NULL
        );",
    ),
    (
        "0003_bookings",
        "CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY,
            activity_id TEXT NOT NULL REFERENCES activities(id),
            customer_id TEXT NOT NULL REFERENCES customers(id),
            date_time TEXT NOT NULL,
            participants INTEGER NOT NULL,
            currency TEXT NOT NULL DEFAULT 'USD',
            total_price INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
        CREATE INDEX IF NOT EXISTS idx_bookings_customer ON bookings(customer_id);",
    ),
    (
        "0004_booking_sensitive",
        "CREATE TABLE IF NOT EXISTS booking_sensitive (
            booking_id TEXT PRIMARY KEY REFERENCES bookings(id),
            payload TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        );",
    ),
];

pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        conn.execute_batch(sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;

        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])
            .with_context(|| format!("failed to record migration: {name}"))?;

        tracing::info!("applied migration: {name}");
    }

    Ok(())
}
