use sqlx::MySqlPool;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPool::connect(database_url).await
}

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        roles VARCHAR(255) NOT NULL DEFAULT '',
        created_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        user_id BIGINT UNSIGNED NOT NULL,
        date DATE NOT NULL,
        checkin_time DATETIME(6) NULL,
        checkout_time DATETIME(6) NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'ABSENT',
        created_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
        UNIQUE KEY uq_attendance_user_date (user_id, date),
        CONSTRAINT fk_attendance_user FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS requests (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        user_id BIGINT UNSIGNED NOT NULL,
        `type` VARCHAR(20) NOT NULL,
        start_date DATETIME(6) NOT NULL,
        end_date DATETIME(6) NOT NULL,
        reason TEXT NOT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'PENDING',
        approver_id BIGINT UNSIGNED NULL,
        rejection_reason TEXT NULL,
        created_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
        updated_at DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
        KEY idx_requests_user_created (user_id, created_at),
        KEY idx_requests_status_created (status, created_at),
        KEY idx_requests_updated (updated_at),
        CONSTRAINT fk_requests_user FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
        CONSTRAINT fk_requests_approver FOREIGN KEY (approver_id) REFERENCES users(id) ON DELETE SET NULL
    )
    "#,
];

/// Creates the tables this service writes to when they do not exist yet.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
