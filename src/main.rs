use anyhow::Result;
use clap::Parser;
use teachflow::cli::Args;
use teachflow::generator::workflow::launch;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let request = args.to_request()?;
    let config = args.into_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level())),
        )
        .with_target(false)
        .init();

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("request", id = %request_id);
    let response = launch(&config, request).instrument(span).await?;

    println!(
        "✅ 课程已生成: {} (耗时 {:.1}s, 置信度 {:.2})",
        config.output_path.display(),
        response.processing_time,
        response.confidence_score
    );

    Ok(())
}
