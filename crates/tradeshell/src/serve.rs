// SPDX-FileCopyrightText: 2026 Tradeshell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tradeshell serve` command implementation.
//!
//! Wires the composition root: credential cipher, SQLite database, the two
//! ledgers, and the HTTP gateway. Runs until SIGINT/SIGTERM, then
//! checkpoints and closes the database.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use tradeshell_cipher::CredentialCipher;
use tradeshell_config::TradeshellConfig;
use tradeshell_core::TradeshellError;
use tradeshell_gateway::{GatewayState, ServerConfig};
use tradeshell_ledger::{BrokerAccountLedger, ProfileLedger};
use tradeshell_storage::Database;

/// Runs the `tradeshell serve` command.
pub async fn run_serve(config: TradeshellConfig) -> Result<(), TradeshellError> {
    init_tracing(&config.app.log_level);

    info!("starting tradeshell serve");

    // Fatal when cipher.master_secret is unset: serving without it would
    // make every credential read fail later instead of now.
    let cipher = Arc::new(CredentialCipher::from_config(&config.cipher)?);

    let db = Database::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "database ready");

    let state = GatewayState {
        profiles: ProfileLedger::new(db.clone()),
        accounts: BrokerAccountLedger::new(db.clone(), cipher),
        start_time: Instant::now(),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        bearer_token: config.gateway.bearer_token.clone(),
    };

    let cancel = install_signal_handler();
    let mut server = tokio::spawn(async move {
        tradeshell_gateway::start_server(&server_config, state).await
    });

    let outcome = tokio::select! {
        _ = cancel.cancelled() => {
            info!("shutdown signal received");
            server.abort();
            Ok(())
        }
        result = &mut server => join_outcome(result),
    };

    db.close().await?;
    if let Err(e) = outcome {
        error!(error = %e, "gateway exited with error");
        return Err(e);
    }
    info!("tradeshell serve shutdown complete");
    Ok(())
}

/// Map a finished gateway task to the serve result.
///
/// A bind failure or server error must surface as a non-zero exit; a
/// cancelled task is an orderly shutdown, not an error.
fn join_outcome(
    result: Result<Result<(), TradeshellError>, tokio::task::JoinError>,
) -> Result<(), TradeshellError> {
    match result {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(TradeshellError::storage(e)),
    }
}

/// Install SIGINT/SIGTERM handlers that trip a cancellation token.
fn install_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trip = cancel.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut sigterm = match tokio::signal::unix::signal(
                tokio::signal::unix::SignalKind::terminate(),
            ) {
                Ok(s) => s,
                Err(e) => {
                    error!(error = %e, "failed to install SIGTERM handler");
                    return;
                }
            };
            tokio::select! {
                _ = ctrl_c => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
        }
        trip.cancel();
    });

    cancel
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tradeshell={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gateway_error_propagates_out_of_serve() {
        let handle = tokio::spawn(async {
            Err::<(), TradeshellError>(TradeshellError::Config(
                "failed to bind gateway to 127.0.0.1:7847: address in use".to_string(),
            ))
        });
        let result = join_outcome(handle.await);
        assert!(matches!(result, Err(TradeshellError::Config(_))));
    }

    #[tokio::test]
    async fn clean_gateway_exit_is_ok() {
        let handle = tokio::spawn(async { Ok::<(), TradeshellError>(()) });
        assert!(join_outcome(handle.await).is_ok());
    }

    #[tokio::test]
    async fn aborted_gateway_task_is_orderly_shutdown() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok::<(), TradeshellError>(())
        });
        handle.abort();
        assert!(join_outcome(handle.await).is_ok());
    }
}
