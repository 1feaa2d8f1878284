//! CardVault - Bank Card Management Service
//!
//! Entry point. Startup order:
//!
//! 1. Load `config/{env}.yaml` (env selected by `--env`, default `dev`)
//! 2. Initialize tracing (rolling file + stdout)
//! 3. Connect PostgreSQL, bootstrap the schema
//! 4. Seed the bootstrap admin account if configured and missing
//! 5. Serve the gateway

use std::sync::Arc;

use anyhow::{Context, Result};

use cardvault::auth::{AuthService, ROLE_ADMIN, ROLE_USER, hash_password};
use cardvault::config::AppConfig;
use cardvault::db::Database;
use cardvault::gateway::{self, state::AppState};
use cardvault::logging::init_logging;
use cardvault::user::repository::UserRepository;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--env" && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Create the configured bootstrap admin if it does not exist yet
async fn seed_admin(db: &Database, config: &AppConfig) -> Result<()> {
    let Some(seed) = &config.admin_seed else {
        return Ok(());
    };

    if UserRepository::find_by_username(db.pool(), &seed.username)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let password_hash =
        hash_password(&seed.password).map_err(|e| anyhow::anyhow!("admin seed: {}", e))?;
    let user_id = UserRepository::insert(
        db.pool(),
        &seed.username,
        &password_hash,
        &[ROLE_USER.to_string(), ROLE_ADMIN.to_string()],
    )
    .await?;

    tracing::info!(user_id, username = %seed.username, "bootstrap admin created");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);

    let _log_guard = init_logging(&config);
    tracing::info!(env = %env, "starting cardvault (build {})", env!("BUILD_GIT_HASH"));

    let db = Arc::new(
        Database::connect(&config.postgres_url)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );
    db.init_schema().await.context("Failed to init schema")?;
    seed_admin(&db, &config).await?;

    let auth = Arc::new(
        AuthService::new(
            db.pool().clone(),
            &config.jwt.secret,
            config.jwt.lifetime_secs,
        )
        .context("Failed to build auth service")?,
    );

    let state = Arc::new(AppState::new(db, auth));
    gateway::serve(state, &config.gateway.host, config.gateway.port).await
}
