// cardsynctool/src/utils/setting.rs
use sqlx::Connection;
use sqlx::postgres::PgConnection;

/// Preflight probe: opens and closes one connection so a flow can refuse to
/// start against an unreachable database.
pub async fn check_db_connection(db_url: &str) -> bool {
    match PgConnection::connect(db_url).await {
        Ok(conn) => {
            let _ = conn.close().await;
            println!("✅ Successfully connected to the database");
            true
        }
        Err(e) => {
            eprintln!("❌ Failed to connect to the database: {}", e);
            false
        }
    }
}
