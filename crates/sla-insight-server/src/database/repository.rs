use sqlx::sqlite::{Sqlite, SqliteConnection};
use sqlx::QueryBuilder;
use tracing::debug;

use super::{Customer, DefectRow, OverviewRow, Ticket, TrainingRow};
use crate::analytics::OverviewFilters;

/// Delete all tickets, then all customers.
pub async fn reset(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let tickets = sqlx::query("DELETE FROM tickets")
        .execute(&mut *conn)
        .await?;
    let customers = sqlx::query("DELETE FROM customers")
        .execute(&mut *conn)
        .await?;
    debug!(
        "Reset storage: {} tickets, {} customers removed",
        tickets.rows_affected(),
        customers.rows_affected()
    );
    Ok(())
}

pub async fn upsert_customer(
    conn: &mut SqliteConnection,
    customer: &Customer,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT OR REPLACE INTO customers (customer_id, region, plan, tenure_months, employees)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(&customer.customer_id)
    .bind(&customer.region)
    .bind(&customer.plan)
    .bind(customer.tenure_months)
    .bind(customer.employees)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn upsert_ticket(
    conn: &mut SqliteConnection,
    ticket: &Ticket,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT OR REPLACE INTO tickets (
               ticket_id, customer_id, created_at, category, channel,
               priority, first_response_time_hours, resolution_time_hours,
               is_open, breached_sla, summary
           )
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&ticket.ticket_id)
    .bind(&ticket.customer_id)
    .bind(&ticket.created_at)
    .bind(&ticket.category)
    .bind(&ticket.channel)
    .bind(&ticket.priority)
    .bind(ticket.first_response_time_hours)
    .bind(ticket.resolution_time_hours)
    .bind(ticket.is_open)
    .bind(ticket.breached_sla)
    .bind(&ticket.summary)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn count_customers(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(&mut *conn)
        .await
}

pub async fn count_tickets(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM tickets")
        .fetch_one(&mut *conn)
        .await
}

pub async fn get_ticket(
    conn: &mut SqliteConnection,
    ticket_id: &str,
) -> Result<Option<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE ticket_id = ?")
        .bind(ticket_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Single combined scan for the three defect signatures.
pub async fn fetch_defect_rows<'a>(
    conn: &mut SqliteConnection,
    valid_priorities: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<DefectRow>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"SELECT ticket_id, priority, created_at, first_response_time_hours
           FROM tickets
           WHERE created_at IS NULL
              OR first_response_time_hours IS NULL
              OR priority NOT IN ("#,
    );

    let mut separated = qb.separated(", ");
    for priority in valid_priorities {
        separated.push_bind(priority.to_string());
    }
    separated.push_unseparated(") ORDER BY rowid");

    qb.build_query_as::<DefectRow>()
        .fetch_all(&mut *conn)
        .await
}

/// Tickets left-joined to customers, in ingestion order.
pub async fn fetch_overview_rows(
    conn: &mut SqliteConnection,
    filters: &OverviewFilters,
) -> Result<Vec<OverviewRow>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"SELECT t.ticket_id, t.customer_id, t.created_at, t.category, t.priority,
                  t.resolution_time_hours, t.breached_sla,
                  c.customer_id AS joined_customer_id
           FROM tickets t
           LEFT JOIN customers c ON t.customer_id = c.customer_id
           WHERE 1=1"#,
    );

    if let Some(start) = &filters.start {
        qb.push(" AND t.created_at >= ").push_bind(start.clone());
    }
    if let Some(end) = &filters.end {
        qb.push(" AND t.created_at <= ").push_bind(end.clone());
    }
    if let Some(category) = &filters.category {
        qb.push(" AND t.category = ").push_bind(category.clone());
    }
    if let Some(priority) = &filters.priority {
        qb.push(" AND t.priority = ").push_bind(priority.clone());
    }
    qb.push(" ORDER BY t.rowid");

    qb.build_query_as::<OverviewRow>()
        .fetch_all(&mut *conn)
        .await
}

/// Inner join; rows without a timestamp are not usable for training.
pub async fn fetch_training_rows(
    conn: &mut SqliteConnection,
) -> Result<Vec<TrainingRow>, sqlx::Error> {
    sqlx::query_as::<_, TrainingRow>(
        r#"SELECT t.category, t.channel, t.priority, c.region, c.plan,
                  c.tenure_months, c.employees, t.breached_sla
           FROM tickets t
           JOIN customers c ON t.customer_id = c.customer_id
           WHERE t.created_at IS NOT NULL
           ORDER BY t.rowid"#,
    )
    .fetch_all(&mut *conn)
    .await
}
