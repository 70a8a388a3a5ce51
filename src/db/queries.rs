use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    BookingSession, BusinessSettings, Cut, PortfolioItem, Product, Service, Testimonial,
};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn now_string() -> String {
    Utc::now().naive_utc().format(DATETIME_FMT).to_string()
}

fn parse_options(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

fn options_json(options: &[String]) -> String {
    serde_json::to_string(options).unwrap_or_else(|_| "[]".to_string())
}

// ── Services ──

pub fn get_services(conn: &Connection) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, price, duration_minutes, description, icon, active, options, is_child, requires_style
         FROM services ORDER BY position ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        let options: String = row.get(7)?;
        Ok(Service {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
            duration_minutes: row.get(3)?,
            description: row.get(4)?,
            icon: row.get(5)?,
            active: row.get::<_, i32>(6)? != 0,
            options: parse_options(&options),
            is_child: row.get::<_, i32>(8)? != 0,
            requires_style: row.get::<_, i32>(9)? != 0,
        })
    })?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

/// The admin panel saves collections wholesale, so writes replace the
/// whole table inside one transaction.
pub fn replace_services(conn: &mut Connection, items: &[Service]) -> anyhow::Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM services", [])?;
    for (position, s) in items.iter().enumerate() {
        tx.execute(
            "INSERT INTO services (id, name, price, duration_minutes, description, icon, active, options, is_child, requires_style, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                s.id,
                s.name,
                s.price,
                s.duration_minutes,
                s.description,
                s.icon,
                s.active as i32,
                options_json(&s.options),
                s.is_child as i32,
                s.requires_style as i32,
                position as i64,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

// ── Cuts ──

pub fn get_cuts(conn: &Connection) -> anyhow::Result<Vec<Cut>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, technical_name, category, image_url, active, options
         FROM cuts ORDER BY position ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        let options: String = row.get(6)?;
        Ok(Cut {
            id: row.get(0)?,
            name: row.get(1)?,
            technical_name: row.get(2)?,
            category: row.get(3)?,
            image_url: row.get(4)?,
            active: row.get::<_, i32>(5)? != 0,
            options: parse_options(&options),
        })
    })?;

    let mut cuts = vec![];
    for row in rows {
        cuts.push(row?);
    }
    Ok(cuts)
}

pub fn replace_cuts(conn: &mut Connection, items: &[Cut]) -> anyhow::Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM cuts", [])?;
    for (position, c) in items.iter().enumerate() {
        tx.execute(
            "INSERT INTO cuts (id, name, technical_name, category, image_url, active, options, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                c.id,
                c.name,
                c.technical_name,
                c.category,
                c.image_url,
                c.active as i32,
                options_json(&c.options),
                position as i64,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

// ── Products ──

pub fn get_products(conn: &Connection) -> anyhow::Result<Vec<Product>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, price, image_url, active, options
         FROM products ORDER BY position ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        let options: String = row.get(6)?;
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            image_url: row.get(4)?,
            active: row.get::<_, i32>(5)? != 0,
            options: parse_options(&options),
        })
    })?;

    let mut products = vec![];
    for row in rows {
        products.push(row?);
    }
    Ok(products)
}

pub fn replace_products(conn: &mut Connection, items: &[Product]) -> anyhow::Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM products", [])?;
    for (position, p) in items.iter().enumerate() {
        tx.execute(
            "INSERT INTO products (id, name, description, price, image_url, active, options, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                p.id,
                p.name,
                p.description,
                p.price,
                p.image_url,
                p.active as i32,
                options_json(&p.options),
                position as i64,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

// ── Portfolio ──

pub fn get_portfolio(conn: &Connection) -> anyhow::Result<Vec<PortfolioItem>> {
    let mut stmt =
        conn.prepare("SELECT id, url, title, active FROM portfolio ORDER BY position ASC")?;

    let rows = stmt.query_map([], |row| {
        Ok(PortfolioItem {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            active: row.get::<_, i32>(3)? != 0,
        })
    })?;

    let mut items = vec![];
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

pub fn replace_portfolio(conn: &mut Connection, items: &[PortfolioItem]) -> anyhow::Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM portfolio", [])?;
    for (position, item) in items.iter().enumerate() {
        tx.execute(
            "INSERT INTO portfolio (id, url, title, active, position) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![item.id, item.url, item.title, item.active as i32, position as i64],
        )?;
    }
    tx.commit()?;
    Ok(())
}

// ── Testimonials ──

pub fn get_testimonials(conn: &Connection) -> anyhow::Result<Vec<Testimonial>> {
    let mut stmt = conn.prepare(
        "SELECT id, client_name, comment, rating, active FROM testimonials ORDER BY position ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(Testimonial {
            id: row.get(0)?,
            client_name: row.get(1)?,
            comment: row.get(2)?,
            rating: row.get(3)?,
            active: row.get::<_, i32>(4)? != 0,
        })
    })?;

    let mut items = vec![];
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

pub fn replace_testimonials(conn: &mut Connection, items: &[Testimonial]) -> anyhow::Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM testimonials", [])?;
    for (position, t) in items.iter().enumerate() {
        tx.execute(
            "INSERT INTO testimonials (id, client_name, comment, rating, active, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                t.id,
                t.client_name,
                t.comment,
                t.rating,
                t.active as i32,
                position as i64,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

// ── Settings ──

pub fn get_settings(conn: &Connection) -> anyhow::Result<BusinessSettings> {
    let result = conn.query_row(
        "SELECT data FROM settings WHERE id = 'default'",
        [],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(data) => Ok(serde_json::from_str(&data).unwrap_or_default()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(BusinessSettings::default()),
        Err(e) => Err(e.into()),
    }
}

pub fn save_settings(conn: &Connection, settings: &BusinessSettings) -> anyhow::Result<()> {
    let data = serde_json::to_string(settings)?;
    conn.execute(
        "INSERT INTO settings (id, data, updated_at) VALUES ('default', ?1, datetime('now'))
         ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = datetime('now')",
        params![data],
    )?;
    Ok(())
}

// ── Booking sessions ──

pub fn get_session(conn: &Connection, id: &str) -> anyhow::Result<Option<BookingSession>> {
    let result = conn.query_row(
        "SELECT id, state, last_activity, expires_at FROM booking_sessions
         WHERE id = ?1 AND expires_at > ?2",
        params![id, now_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        },
    );

    match result {
        Ok((id, state_json, last_activity_str, expires_at_str)) => {
            let state = match serde_json::from_str(&state_json) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(error = %e, session = %id, "unreadable session state, dropping");
                    return Ok(None);
                }
            };
            let last_activity = NaiveDateTime::parse_from_str(&last_activity_str, DATETIME_FMT)
                .unwrap_or_else(|_| Utc::now().naive_utc());
            let expires_at = NaiveDateTime::parse_from_str(&expires_at_str, DATETIME_FMT)
                .unwrap_or_else(|_| Utc::now().naive_utc());

            Ok(Some(BookingSession {
                id,
                state,
                last_activity,
                expires_at,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_session(conn: &Connection, session: &BookingSession) -> anyhow::Result<()> {
    let state_json = serde_json::to_string(&session.state)?;
    conn.execute(
        "INSERT INTO booking_sessions (id, state, last_activity, expires_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
           state = excluded.state,
           last_activity = excluded.last_activity,
           expires_at = excluded.expires_at",
        params![
            session.id,
            state_json,
            session.last_activity.format(DATETIME_FMT).to_string(),
            session.expires_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn expire_old_sessions(conn: &Connection) -> anyhow::Result<usize> {
    let count = conn.execute(
        "DELETE FROM booking_sessions WHERE expires_at <= ?1",
        params![now_string()],
    )?;
    Ok(count)
}

pub fn count_active_sessions(conn: &Connection) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM booking_sessions WHERE expires_at > ?1",
        params![now_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ── Dashboard ──

pub struct CollectionCounts {
    pub services: i64,
    pub cuts: i64,
    pub products: i64,
    pub portfolio: i64,
    pub testimonials: i64,
}

pub fn collection_counts(conn: &Connection) -> anyhow::Result<CollectionCounts> {
    let count = |sql: &str| -> anyhow::Result<i64> {
        Ok(conn.query_row(sql, [], |row| row.get(0))?)
    };
    Ok(CollectionCounts {
        services: count("SELECT COUNT(*) FROM services")?,
        cuts: count("SELECT COUNT(*) FROM cuts")?,
        products: count("SELECT COUNT(*) FROM products")?,
        portfolio: count("SELECT COUNT(*) FROM portfolio")?,
        testimonials: count("SELECT COUNT(*) FROM testimonials")?,
    })
}
