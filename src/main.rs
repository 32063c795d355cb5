use mood_client::{
    CacheStatus, ClientConfig, Credentials,
    charts::{build_bars, build_line_chart_data},
    format::format_time,
    models::{Emotion, Timeframe},
    sign_in,
};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = ClientConfig::from_env()?;
    let credentials = Credentials::new(
        env::var("MOOD_USER_ID").unwrap_or_default(),
        env::var("MOOD_TOKEN").unwrap_or_default(),
    )?;

    let cache = sign_in(&config, credentials.clone());
    match cache.initialize().await {
        CacheStatus::Degraded { message } => warn!("showing cached data only: {message}"),
        status => info!(?status, "cache ready"),
    }

    for reading in cache.todays_readings().await {
        let time = format_time(&reading.datetime).unwrap_or(reading.datetime);
        println!("{time}  {}", reading.emotion);
    }

    let reading_set = cache.reading_set().await;
    println!("{}", serde_json::to_string_pretty(&build_bars(&reading_set.counts))?);

    if let Ok(raw) = env::var("MOOD_TIMEFRAME") {
        let timeframe: Timeframe = raw.parse()?;
        let repository = mood_client::app::repository(&config);
        match repository
            .fetch_counts_over_time(&credentials, timeframe, &Emotion::ALL)
            .await
        {
            Ok(data) => {
                let chart = build_line_chart_data(&data)?;
                println!("{}", serde_json::to_string_pretty(&chart)?);
            }
            Err(failure) => warn!("failed to fetch emotion counts: {failure}"),
        }
    }

    Ok(())
}
