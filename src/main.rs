use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use tolk::application::ports::{AudioNormalizer, TranscriptionService};
use tolk::application::services::TranscriptionPipeline;
use tolk::infrastructure::audio::FfmpegNormalizer;
use tolk::infrastructure::observability::{TracingConfig, init_tracing};
use tolk::infrastructure::recognition::RecognitionEngineFactory;
use tolk::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig {
        environment: environment.to_string(),
        level: settings.logging.level.clone(),
        json_format: settings.logging.enable_json,
    });

    let shutdown = CancellationToken::new();

    let normalizer = FfmpegNormalizer::new(settings.normalizer.binary.clone(), shutdown.clone());
    if let Err(e) = normalizer.check_binary().await {
        tracing::warn!(
            binary = %normalizer.binary(),
            error = %e,
            "Audio converter not available; transcription requests will fail"
        );
    }

    let provider = settings.recognition.provider;
    let model_path = settings.recognition.resolved_model_path();
    tracing::info!(provider = %provider, model_path = %model_path.display(), "Loading recognition engine");
    let engine =
        tokio::task::spawn_blocking(move || RecognitionEngineFactory::create(provider, &model_path))
            .await
            .context("Recognition engine loader panicked")?
            .context("Failed to load recognition engine")?;

    let normalizer: Arc<dyn AudioNormalizer> = Arc::new(normalizer);
    let pipeline: Arc<dyn TranscriptionService> =
        Arc::new(TranscriptionPipeline::new(normalizer, Arc::clone(&engine)));

    let state = AppState::new(pipeline).with_max_upload_bytes(settings.upload.max_bytes());
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    drop(engine);
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
