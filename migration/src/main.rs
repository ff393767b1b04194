use std::{env, fs, path::Path, process};

mod runner;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let Ok(db_path) = env::var("DATABASE_PATH") else {
        eprintln!("DATABASE_PATH must be set");
        process::exit(1);
    };
    let url = if db_path.starts_with("sqlite:") {
        db_path.clone()
    } else {
        format!("sqlite://{}?mode=rwc", db_path)
    };
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("clean") => {
            remove_db_file(&db_path);
        }
        Some("fresh") => {
            remove_db_file(&db_path);
            create_db_dir(&db_path);
            runner::run_all_migrations(&url).await;
        }
        _ => {
            create_db_dir(&db_path);
            runner::run_all_migrations(&url).await;
        }
    }
}

fn remove_db_file(path: &str) {
    let db_path = Path::new(path);
    if !db_path.exists() {
        println!("DB file does not exist: {}", db_path.display());
        return;
    }

    match fs::remove_file(db_path) {
        Ok(()) => println!("Deleted DB: {}", db_path.display()),
        Err(e) => {
            eprintln!("Failed to delete {}: {e}", db_path.display());
            process::exit(1);
        }
    }
}

fn create_db_dir(path: &str) {
    if let Some(parent) = Path::new(path).parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Failed to create DB directory {}: {e}", parent.display());
            process::exit(1);
        }
    }
}
