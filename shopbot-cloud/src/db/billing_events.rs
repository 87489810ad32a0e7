use sqlx::PgPool;

/// Record a billing event id. Returns `false` if it was already processed.
///
/// INSERT first and check rows affected, so two deliveries of the same event
/// cannot both pass.
pub async fn record(
    pool: &PgPool,
    event_id: &str,
    event_type: &str,
    user_id: &str,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO processed_billing_events (event_id, event_type, user_id, processed_at)
         VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Forget an event so the provider's retry is processed again
pub async fn forget(pool: &PgPool, event_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM processed_billing_events WHERE event_id = $1")
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}
