//! Persistent-identifier minting
//!
//! Assigns an identifier to every object that lacks one, via the external
//! minting endpoint. Per-object failures are logged and skipped; the batch
//! always runs to completion. Objects that already carry an identifier are
//! never re-minted, so repeated export runs make no redundant calls.

pub mod client;

use thiserror::Error;

use crate::core::config::MinterConfig;
use crate::core::progress::ProgressRegistry;
use crate::core::session::ProjectSession;
use crate::model::{DigitalObject, CREATOR_FIELD, DATE_FIELD, IDENTIFIER_FIELD, TITLE_FIELD};

pub use client::{Erc, MintClient};

/// Objects are minted concurrently in chunks of this width, chunks
/// processed sequentially
pub const MINT_CHUNK_SIZE: usize = 8;

/// Errors from the minting service
#[derive(Debug, Error)]
pub enum MintError {
    #[error("network error: {0}")]
    Network(String),

    #[error("minting service error {0}: {1}")]
    Api(u16, String),

    #[error("malformed minting response: {0}")]
    Parse(String),
}

impl MintError {
    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            MintError::Network(_) => true,
            MintError::Api(status, _) => *status >= 500,
            MintError::Parse(_) => false,
        }
    }
}

/// Assign identifiers to every object in the session that lacks one.
///
/// With no minter configured this logs a warning and returns immediately.
/// A progress bar is registered for the duration of the batch and cleared
/// on completion or failure; progress advances after each chunk as
/// `minted / total`.
pub async fn mint_identifiers(
    session: &mut ProjectSession,
    config: Option<&MinterConfig>,
    progress: &ProgressRegistry,
) -> Result<(), MintError> {
    let Some(config) = config else {
        tracing::warn!("minter is not configured; objects will not receive identifiers");
        return Ok(());
    };
    if session.objects.is_empty() {
        return Ok(());
    }

    let bar = progress.register("Minting identifiers");
    let client = match MintClient::new(config.clone()) {
        Ok(client) => client,
        Err(error) => {
            progress.clear(&bar);
            return Err(error);
        }
    };

    let total = session.objects.len();
    let mut processed = 0usize;
    for chunk in session.objects.chunks_mut(MINT_CHUNK_SIZE) {
        let minting: Vec<_> = chunk
            .iter_mut()
            .map(|object| mint_object(&client, object))
            .collect();
        futures::future::join_all(minting).await;

        processed += chunk.len();
        progress.set(&bar, processed as f64 / total as f64);
    }

    progress.clear(&bar);
    Ok(())
}

/// Mint one object, storing the identifier on success.
///
/// Already-minted objects are skipped. A failure is logged and leaves the
/// object unminted without failing the batch.
async fn mint_object(client: &MintClient, object: &mut DigitalObject) {
    if object.minted_id.is_some() {
        return;
    }

    let erc = Erc {
        who: non_empty(object.get_field_value(CREATOR_FIELD)).unwrap_or_else(|| "unknown".to_string()),
        what: object.get_field_value(TITLE_FIELD).unwrap_or_default(),
        when: non_empty(object.get_field_value(DATE_FIELD)).unwrap_or_else(|| "unknown".to_string()),
    };

    match client.mint(&erc).await {
        Ok(id) => {
            let existing = object.get_field_value(IDENTIFIER_FIELD).unwrap_or_default();
            let joined = if existing.is_empty() {
                id.clone()
            } else {
                format!("{}; {}", id, existing)
            };
            object.set_field(IDENTIFIER_FIELD, joined);
            object.minted_id = Some(id);
        }
        Err(error) => {
            tracing::error!(object = %object.title, %error, "minting failed; object left unminted");
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
