use crate::config::Config;
use crate::server::HttpServer;

use leaf_prediction::{Classifier, OrtClassifier};
use std::{error::Error, sync::Arc};
use tokio::{signal, sync::broadcast};

pub async fn start_app(config: Config) -> Result<(), Box<dyn Error>> {
    let classifier = load_classifier(&config).await;

    let server = HttpServer::new(classifier, &config).await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let server_shutdown_rx = shutdown_tx.subscribe();

    let server_handle = server.run(server_shutdown_rx).await?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown.");

    let _ = shutdown_tx.send(());
    let _ = server_handle.await;

    Ok(())
}

/// One-shot model load at startup. A failure is logged and leaves the
/// classifier slot empty; the server still comes up so the UI can surface the
/// error, and every predict request fails fast until the process restarts.
async fn load_classifier(config: &Config) -> Option<Arc<dyn Classifier>> {
    let model_config = config.model.clone();
    let labels_config = config.labels.clone();

    let result = tokio::task::spawn_blocking(move || {
        OrtClassifier::new(&model_config, &labels_config)
    })
    .await;

    match result {
        Ok(Ok(classifier)) => Some(Arc::new(classifier)),
        Ok(Err(e)) => {
            tracing::error!("Failed to load model: {}", e);
            None
        }
        Err(e) => {
            tracing::error!("Model loading task failed: {}", e);
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
