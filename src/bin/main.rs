use std::{env, error::Error};

use log::info;
use todo_list_api::{app, db, settings::Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Setup tracing_subscriber
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Setup state
    let settings_path = env::var("SETTINGS_PATH").unwrap_or_else(|_| "./settings.json".to_string());
    let settings = Settings::load(settings_path)?;

    let db = db::connect(&settings.database_url).await?;
    sqlx::migrate!().run(&db).await?;

    let app = app(db, &settings);

    info!("listening on {}", settings.addr);
    axum::Server::bind(&settings.addr)
        .serve(app.into_make_service()).await?;

    Ok(())
}
