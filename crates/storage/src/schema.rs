use newsroll_common::{Error, Result};

/// Create all tables if they do not exist yet.
///
/// Runs at startup; every statement is idempotent.
pub async fn migrate(pool: &sqlx::SqlitePool) -> Result<()> {
    let statements = [
        r#"CREATE TABLE IF NOT EXISTS users (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            tg_user_id INTEGER NOT NULL UNIQUE
        )"#,
        r#"CREATE TABLE IF NOT EXISTS channels (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            handle TEXT NOT NULL UNIQUE
        )"#,
        r#"CREATE TABLE IF NOT EXISTS user_channels (
            user_id    INTEGER NOT NULL REFERENCES users(id),
            channel_id INTEGER NOT NULL REFERENCES channels(id),
            PRIMARY KEY (user_id, channel_id)
        )"#,
        r#"CREATE TABLE IF NOT EXISTS posts (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            channel_id INTEGER NOT NULL REFERENCES channels(id),
            msg_id     INTEGER NOT NULL,
            date       INTEGER NOT NULL,
            text       TEXT NOT NULL,
            permalink  TEXT,
            UNIQUE (channel_id, msg_id)
        )"#,
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| Error::storage("migrate", e))?;
    }
    Ok(())
}
