use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::config::{ServeArgs, ServerConfig};
use crate::error::ServerError;
use relay_api_server::ApiError;
use relay_store::{Relay, RelayInspector};

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("relay-server starting");

    // --- Load config ---
    let config = ServerConfig::load(&args.config)?;
    tracing::info!(
        config = %args.config,
        listen = %config.listen_addr,
        port = config.api_port,
        packet_capacity = config.packet_capacity,
        "loaded config"
    );

    // --- Stores ---
    let relay = Arc::new(Relay::new(config.packet_capacity)?);

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();

    // --- API server (HTTP + WS) ---
    let api_relay = relay.clone();
    let api_addr = config.listen_addr.clone();
    let api_port = config.api_port;
    let limits = config.limits();
    let api_token = token.clone();
    let mut api_handle = tokio::spawn(async move {
        relay_api_server::run(&api_addr, api_port, api_relay, limits, api_token).await
    });

    tracing::info!("server ready");

    // --- Wait for Ctrl+C, or an early API failure (e.g. port in use) ---
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("shutting down...");
        }
        res = &mut api_handle => {
            return api_outcome(res);
        }
    }

    token.cancel();

    // Drain: give open connections the grace period, then abort.
    let grace = Duration::from_secs(config.shutdown_grace_secs);
    let outcome = match tokio::time::timeout(grace, &mut api_handle).await {
        Ok(res) => api_outcome(res),
        Err(_) => {
            tracing::warn!(grace_secs = config.shutdown_grace_secs, "api server did not stop in time, aborting");
            api_handle.abort();
            Ok(())
        }
    };

    let stats = relay.stats().await;
    tracing::info!(
        packets_received = stats.packets_received,
        packets_dropped = stats.packets_dropped,
        events_received = stats.events_received,
        connections_total = stats.connections_total,
        "shutdown complete"
    );
    outcome
}

/// Fold the API task result: a server error or a panicked task is a failure.
fn api_outcome(res: Result<Result<(), ApiError>, JoinError>) -> Result<(), ServerError> {
    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(ServerError::ApiTask(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clean_stop_is_ok() {
        assert!(api_outcome(Ok(Ok(()))).is_ok());
    }

    #[tokio::test]
    async fn bind_failure_is_an_error() {
        let err = ApiError::Bind {
            addr: "0.0.0.0:8080".into(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(matches!(api_outcome(Ok(Err(err))), Err(ServerError::Api(_))));
    }

    #[tokio::test]
    async fn panicked_api_task_is_an_error() {
        let handle = tokio::spawn(async {
            if true {
                panic!("api task blew up");
            }
            Ok::<(), ApiError>(())
        });
        let res = handle.await;
        assert!(res.is_err());
        assert!(matches!(api_outcome(res), Err(ServerError::ApiTask(_))));
    }
}
