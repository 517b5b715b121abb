use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use std::{env, fs, path::Path};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path = env::var("DATABASE_PATH").expect("DATABASE_PATH must be set");
    let url = format!("sqlite://{}?mode=rwc", db_path);
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("clean") => {
            remove_db_file(&db_path);
        }
        Some("fresh") => {
            remove_db_file(&db_path);
            create_db_dir(&db_path);
            run_all_migrations(&url).await;
        }
        _ => {
            create_db_dir(&db_path);
            run_all_migrations(&url).await;
        }
    }
}

async fn run_all_migrations(url: &str) {
    let db = sea_orm::Database::connect(url)
        .await
        .expect("DB connection failed");

    println!("Running migrations...");
    Migrator::up(&db, None).await.expect("Migration failed");
    println!("Migrations applied");
}

fn remove_db_file(path: &str) {
    if Path::new(path).exists() {
        fs::remove_file(path).expect("Failed to remove database file");
        println!("Removed {path}");
    }
}

fn create_db_dir(path: &str) {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent).expect("Failed to create database directory");
    }
}
