use anyhow::{Context, Result};
use docinsight::{api, config, logging, service::DocumentService};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing();
    if config.uses_default_secret() && !config.debug {
        tracing::warn!("SECRET_KEY is not set; using the development placeholder");
    }

    let service = DocumentService::from_config(config).context("failed to configure models")?;
    service.uploads().ensure_dir().await.with_context(|| {
        format!(
            "failed to create upload folder {}",
            config.upload_folder.display()
        )
    })?;
    if service.uploads().spawn_sweeper().is_some() {
        tracing::info!(
            retention_secs = config.upload_retention_secs,
            "Upload retention sweeper started"
        );
    }

    let app = api::create_router(Arc::new(service), config.max_file_size);
    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.context("server terminated")?;
    Ok(())
}

async fn bind_listener(configured: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = configured {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 10000..=10099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 10000-10099",
    ))
}
