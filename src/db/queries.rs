use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Activity, Booking, BookingStatus, Customer};

// ── Activities ──

pub fn create_activity(conn: &Connection, activity: &Activity) -> anyhow::Result<()> {
    let created_at = activity.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = activity.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO activities (id, name, slug, description, location, duration_minutes, price, capacity, active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            activity.id,
            activity.name,
            activity.slug,
            activity.description,
            activity.location,
            activity.duration_minutes,
            activity.price,
            activity.capacity,
            activity.active as i32,
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

pub fn update_activity(conn: &Connection, activity: &Activity) -> anyhow::Result<bool> {
    let updated_at = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE activities SET name = ?1, slug = ?2, description = ?3, location = ?4,
         duration_minutes = ?5, price = ?6, capacity = ?7, active = ?8, updated_at = ?9
         WHERE id = ?10",
        params![
            activity.name,
            activity.slug,
            activity.description,
            activity.location,
            activity.duration_minutes,
            activity.price,
            activity.capacity,
            activity.active as i32,
            updated_at,
            activity.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_activity(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM activities WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn get_activity_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Activity>> {
    let result = conn.query_row(
        "SELECT id, name, slug, description, location, duration_minutes, price, capacity, active, created_at, updated_at
         FROM activities WHERE id = ?1",
        params![id],
        |row| Ok(parse_activity_row(row)),
    );

    match result {
        Ok(activity) => Ok(Some(activity?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_activity_by_slug(conn: &Connection, slug: &str) -> anyhow::Result<Option<Activity>> {
    let result = conn.query_row(
        "SELECT id, name, slug, description, location, duration_minutes, price, capacity, active, created_at, updated_at
         FROM activities WHERE slug = ?1",
        params![slug],
        |row| Ok(parse_activity_row(row)),
    );

    match result {
        Ok(activity) => Ok(Some(activity?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_activities(conn: &Connection, active_only: bool) -> anyhow::Result<Vec<Activity>> {
    let sql = if active_only {
        "SELECT id, name, slug, description, location, duration_minutes, price, capacity, active, created_at, updated_at
         FROM activities WHERE active = 1 ORDER BY name ASC"
    } else {
        "SELECT id, name, slug, description, location, duration_minutes, price, capacity, active, created_at, updated_at
         FROM activities ORDER BY name ASC"
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_activity_row(row)))?;

    let mut activities = vec![];
    for row in rows {
        activities.push(row??);
    }
    Ok(activities)
}

fn parse_activity_row(row: &rusqlite::Row) -> anyhow::Result<Activity> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let slug: String = row.get(2)?;
    let description: Option<String> = row.get(3)?;
    let location: Option<String> = row.get(4)?;
    let duration_minutes: i32 = row.get(5)?;
    let price: f64 = row.get(6)?;
    let capacity: i32 = row.get(7)?;
    let active: bool = row.get::<_, i32>(8)? != 0;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    Ok(Activity {
        id,
        name,
        slug,
        description,
        location,
        duration_minutes,
        price,
        capacity,
        active,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

// ── Customers ──

pub fn create_customer(conn: &Connection, customer: &Customer) -> anyhow::Result<()> {
    let created_at = customer.created_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO customers (id, name, email, phone, country, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            customer.id,
            customer.name,
            customer.email,
            customer.phone,
            customer.country,
            created_at,
        ],
    )?;
    Ok(())
}

pub fn find_customer_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<Customer>> {
    let result = conn.query_row(
        "SELECT id, name, email, phone, country, created_at FROM customers WHERE email = ?1",
        params![email],
        |row| Ok(parse_customer_row(row)),
    );

    match result {
        Ok(customer) => Ok(Some(customer?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_customer_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Customer>> {
    let result = conn.query_row(
        "SELECT id, name, email, phone, country, created_at FROM customers WHERE id = ?1",
        params![id],
        |row| Ok(parse_customer_row(row)),
    );

    match result {
        Ok(customer) => Ok(Some(customer?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_customers(conn: &Connection, limit: i64) -> anyhow::Result<Vec<Customer>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, country, created_at
         FROM customers ORDER BY created_at DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| Ok(parse_customer_row(row)))?;

    let mut customers = vec![];
    for row in rows {
        customers.push(row??);
    }
    Ok(customers)
}

fn parse_customer_row(row: &rusqlite::Row) -> anyhow::Result<Customer> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let phone: Option<String> = row.get(3)?;
    let country: Option<String> = row.get(4)?;
    let created_at_str: String = row.get(5)?;

    Ok(Customer {
        id,
        name,
        email,
        phone,
        country,
        created_at: parse_timestamp(&created_at_str),
    })
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let date_time = booking.date_time.format("%Y-%m-%d %H:%M:%S").to_string();
    let created_at = booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = booking.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO bookings (id, activity_id, customer_id, date_time, participants, currency, total_price, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            booking.id,
            booking.activity_id,
            booking.customer_id,
            date_time,
            booking.participants,
            booking.currency,
            booking.total_price,
            booking.status.as_str(),
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT id, activity_id, customer_id, date_time, participants, currency, total_price, status, created_at, updated_at
         FROM bookings WHERE id = ?1",
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_all_bookings(
    conn: &Connection,
    status_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match status_filter {
        Some(status) => (
            "SELECT id, activity_id, customer_id, date_time, participants, currency, total_price, status, created_at, updated_at \
             FROM bookings WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2"
                .to_string(),
            vec![
                Box::new(status.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(limit),
            ],
        ),
        None => (
            "SELECT id, activity_id, customer_id, date_time, participants, currency, total_price, status, created_at, updated_at \
             FROM bookings ORDER BY created_at DESC LIMIT ?1"
                .to_string(),
            vec![Box::new(limit) as Box<dyn rusqlite::types::ToSql>],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: &BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let activity_id: String = row.get(1)?;
    let customer_id: String = row.get(2)?;
    let date_time_str: String = row.get(3)?;
    let participants: i64 = row.get(4)?;
    let currency: String = row.get(5)?;
    let total_price: i64 = row.get(6)?;
    let status_str: String = row.get(7)?;
    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;

    Ok(Booking {
        id,
        activity_id,
        customer_id,
        date_time: parse_timestamp(&date_time_str),
        participants,
        currency,
        total_price,
        status: BookingStatus::parse(&status_str),
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

// ── Sensitive records ──

pub fn create_sensitive_record(
    conn: &Connection,
    booking_id: &str,
    payload: &str,
    notes: Option<&str>,
) -> anyhow::Result<()> {
    let created_at = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    conn.execute(
        "INSERT INTO booking_sensitive (booking_id, payload, notes, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![booking_id, payload, notes, created_at],
    )?;
    Ok(())
}

pub fn get_sensitive_record(
    conn: &Connection,
    booking_id: &str,
) -> anyhow::Result<Option<String>> {
    let result = conn.query_row(
        "SELECT payload FROM booking_sensitive WHERE booking_id = ?1",
        params![booking_id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(payload) => Ok(Some(payload)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Dashboard stats ──

pub struct DashboardStats {
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub cancelled_bookings: i64,
    pub customers_count: i64,
    pub activities_count: i64,
}

pub fn get_dashboard_stats(conn: &Connection) -> anyhow::Result<DashboardStats> {
    let count_by_status = |status: &str| -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM bookings WHERE status = ?1",
            params![status],
            |row| row.get(0),
        )
        .unwrap_or(0)
    };

    let customers_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))
        .unwrap_or(0);

    let activities_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))
        .unwrap_or(0);

    Ok(DashboardStats {
        pending_bookings: count_by_status("pending"),
        confirmed_bookings: count_by_status("confirmed"),
        cancelled_bookings: count_by_status("cancelled"),
        customers_count,
        activities_count,
    })
}

fn parse_timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc())
}
