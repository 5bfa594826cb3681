use std::error::Error;

use chrono::Utc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use medintake::api::{serve, ApiContext};
use medintake::auth::{hash_password, TokenKeys};
use medintake::config;
use medintake::db::{repository, Database};
use medintake::models::enums::Role;
use medintake::models::User;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    std::fs::create_dir_all(config::data_dir())?;
    let db = Database::open(&config::database_path())?;
    seed_admin(&db)?;

    let keys = TokenKeys::from_secret(&config::token_secret()?);
    let ctx = ApiContext::new(db, keys);

    let mut server = serve(ctx, config::bind_addr()?).await?;
    tracing::info!(addr = %server.addr, version = config::APP_VERSION, "medintake up");

    tokio::signal::ctrl_c().await?;
    tracing::info!("ctrl-c received, shutting down");
    server.shutdown();
    server.finished().await;
    Ok(())
}

/// First-run bootstrap: with an empty users table, create the ADMIN account
/// from `MEDINTAKE_ADMIN_EMAIL` / `MEDINTAKE_ADMIN_PASSWORD`.
fn seed_admin(db: &Database) -> Result<(), Box<dyn Error>> {
    let conn = db.connect()?;
    if repository::count_users(&conn)? > 0 {
        return Ok(());
    }
    match config::admin_seed() {
        Some((email, password)) => {
            let admin = User {
                id: Uuid::new_v4(),
                name: "Administrator".into(),
                email,
                password: hash_password(&password)?,
                role: Role::Admin,
                created_at: Utc::now(),
            };
            repository::insert_user(&conn, &admin)?;
            tracing::info!(email = %admin.email, "seeded admin account");
        }
        None => {
            tracing::warn!(
                "no users exist and MEDINTAKE_ADMIN_EMAIL / MEDINTAKE_ADMIN_PASSWORD \
                 are unset; nobody can log in"
            );
        }
    }
    Ok(())
}
