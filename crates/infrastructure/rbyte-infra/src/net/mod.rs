use camino::{Utf8Path, Utf8PathBuf};
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::api::error::extract_message;
use crate::api::ApiError;

/// HTTP client carrying the crate user agent and a per-request `timeout`.
pub fn default_http_client(timeout: Duration) -> Result<Client, ApiError> {
    Client::builder()
        .user_agent(rbyte_config::USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(ApiError::Client)
}

/// Stream `url` into `target`. The body lands in a sibling named after the
/// full file name plus `.part` (`curriculum.pdf.part`) and is renamed into
/// place only once fully written.
pub async fn download_to_file(
    client: &Client,
    url: reqwest::Url,
    target: &Utf8Path,
) -> Result<u64, ApiError> {
    debug!(%url, %target, "downloading");

    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(ApiError::Transport)?;

    let status = resp.status();
    if !status.is_success() {
        let bytes = resp.bytes().await.map_err(ApiError::Transport)?;
        let message = serde_json::from_slice::<serde_json::Value>(&bytes)
            .map(|body| extract_message(&body, status.as_u16()))
            .unwrap_or_else(|_| format!("API error: {}", status.as_u16()));
        warn!(%url, status = status.as_u16(), "download rejected: {message}");
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    if let Some(parent) = target.parent() {
        if !parent.as_str().is_empty() {
            tokio::fs::create_dir_all(parent.as_std_path()).await?;
        }
    }

    let tmp_path = Utf8PathBuf::from(format!("{target}.part"));
    let mut file = File::create(tmp_path.as_std_path()).await?;
    let mut stream = resp.bytes_stream();
    let mut written = 0u64;

    let res: Result<(), ApiError> = async {
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ApiError::Transport)?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(())
    }
    .await;
    drop(file);

    if let Err(e) = res {
        let _ = tokio::fs::remove_file(tmp_path.as_std_path()).await;
        return Err(e);
    }

    tokio::fs::rename(tmp_path.as_std_path(), target.as_std_path()).await?;
    debug!(%target, bytes = written, "download complete");
    Ok(written)
}
