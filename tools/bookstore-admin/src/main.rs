//! Bookstore admin CLI: bootstrap an admin account and load sample data.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p bookstore-admin -- create-superuser --username admin \
//!     --email admin@example.com --password admin123
//!
//! cargo run -p bookstore-admin -- seed
//! ```
//!
//! Both commands are idempotent; rows that already exist are left untouched.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sea_orm::Database;
use tracing::info;
use uuid::Uuid;

use bookstore_api::domain::repository::{CredentialPort, UserRepository};
use bookstore_api::domain::types::NewUser;
use bookstore_api::domain::validation;
use bookstore_api::infra::credentials::Argon2Credentials;
use bookstore_api::infra::db::user::DbUserRepository;
use bookstore_core::config::required;
use bookstore_core::tracing::{LogFormat, init_tracing};
use bookstore_domain::user::UserRole;

mod seed;

#[derive(Parser)]
#[command(about = "Administrative tasks for the bookstore database")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an admin account unless the username is already taken
    CreateSuperuser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Insert sample categories, authors, books, users and reviews
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(LogFormat::Compact);
    let args = Args::parse();

    let database_url = required("DATABASE_URL")?;
    let db = Database::connect(&database_url)
        .await
        .context("failed to connect to database")?;

    match args.command {
        Command::CreateSuperuser {
            username,
            email,
            password,
        } => {
            let users = DbUserRepository { db };
            create_superuser(&users, &username, &email, &password).await
        }
        Command::Seed => {
            let report = seed::run(&db).await?;
            println!("{report}");
            Ok(())
        }
    }
}

async fn create_superuser(
    users: &DbUserRepository,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    validation::username(username)?;
    validation::email(email)?;

    if users.find_by_username(username).await?.is_some() {
        println!("superuser '{username}' already exists");
        return Ok(());
    }

    let credential = Argon2Credentials.hash_and_store(password)?;
    let user = users
        .create(&NewUser {
            id: Uuid::now_v7(),
            username: username.to_owned(),
            email: email.to_owned(),
            credential,
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            address: String::new(),
            date_of_birth: None,
            bio: String::new(),
            role: UserRole::Admin,
            is_verified: true,
        })
        .await?;

    info!(user_id = %user.id, username, "superuser created");
    println!("superuser '{username}' created");
    Ok(())
}
