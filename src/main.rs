use std::io;

use anilist_recs::{
    config::Config,
    error::AppError,
    prompt::{prompt_threshold, prompt_username},
    services::{pipeline, providers::AniListClient},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout is reserved for prompts and results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "anilist_recs=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env()?;
    let catalog = AniListClient::new(&config);

    let mut input = io::stdin().lock();
    let mut output = io::stdout();
    let username = prompt_username(&catalog, &mut input, &mut output).await?;
    let threshold = prompt_threshold(&mut input, &mut output)?;

    match pipeline::run(&catalog, &config, &username, threshold).await {
        Ok(recommendations) => {
            println!("Saved {} recommendations to {}", recommendations.len(), config.output_path());
            for rec in &recommendations {
                println!(
                    "{}\t{}\t{}\t{}",
                    rec.candidate.id, rec.candidate.score, rec.candidate.name, rec.reason
                );
            }
            Ok(())
        }
        Err(AppError::ServiceUnavailable) => {
            println!("anilist is down, please try again later.");
            Err(AppError::ServiceUnavailable.into())
        }
        Err(e @ AppError::RateLimited { .. }) => {
            println!("hit the rate limit, try again");
            Err(e.into())
        }
        Err(e) => {
            if e.is_fatal() {
                tracing::error!(error = %e, "Run aborted");
            }
            Err(e.into())
        }
    }
}
