//! Givebox dev server, local gateway and seeded test accounts

use clap::Parser;
use entity::user::Role;
use givebox::{setting::Gateway, *};
use migration::{Migrator, MigratorTrait};
use std::path::PathBuf;
use tracing::{info, warn};

/// Cli
#[derive(Debug, Parser)]
#[command(name = "givebox", about = "givebox dev server.", version)]
pub struct Cli {
    /// config file path
    #[arg(short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// fresh db
    #[arg(short = 'f')]
    pub fresh: bool,
}

struct TestUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: Role,
}

impl TestUser {
    fn new(name: &'static str, email: &'static str, password: &'static str, role: Role) -> Self {
        Self {
            name,
            email,
            password,
            role,
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "DEBUG");
    }
    // try to load config from .dev.env
    let _ = dotenvy::from_filename(".dev.env");
    tracing_subscriber::fmt::init();

    let args = Cli::parse();
    let mut setting = match args.config {
        Some(path) => setting::Setting::read(path, Some("GIVEBOX".to_owned()))?,
        None => setting::Setting::from_env("GIVEBOX".to_owned())?,
    };
    // never reach the real provider from the dev server
    setting.gateway = Gateway::Local;
    // public access
    setting.network.host = "0.0.0.0".to_string();
    let state = AppState::from_setting(setting).await?;

    if args.fresh {
        Migrator::fresh(state.service.db()).await?;
    } else {
        Migrator::up(state.service.db(), None).await?;
    }

    let users = vec![
        TestUser::new("Test Regular User", "user@test.com", "password123", Role::Donor),
        TestUser::new("Test Admin User", "admin@test.com", "password123", Role::Admin),
    ];

    for u in users {
        if state.service.get_user_by_email(u.email).await?.is_some() {
            warn!("{} already exists", u.email);
            continue;
        }
        state
            .service
            .create_user(NewUser {
                name: u.name.to_owned(),
                email: u.email.to_owned(),
                password: u.password.to_owned(),
                role: u.role,
            })
            .await?;
        info!("{} created: {} / {}", u.name, u.email, u.password);
    }

    info!("Start givebox dev server");
    start(state).await?;
    info!("Server shutdown");
    Ok(())
}
