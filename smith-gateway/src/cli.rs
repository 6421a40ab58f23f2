//! Interactive stdin/stdout agent.

use std::sync::Arc;

use smith_core::{Question, User};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::state::AppState;

/// Serve questions from stdin until EOF.
pub async fn run(state: Arc<AppState>) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    run_with(state, stdin, stdout).await
}

/// One session per call. Errors are printed and the loop keeps reading.
pub async fn run_with<R, W>(state: Arc<AppState>, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let user = User::new(uuid::Uuid::new_v4().to_string(), "CliUser", "CliUser");
    info!(session = %user.id, "CLI agent started");

    writer.write_all(b"enter a question!\n").await?;
    writer.flush().await?;

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match state.ask(&user, &Question::new(line)).await {
            Ok(answers) => {
                for answer in answers {
                    for text in [Some(answer.text), answer.link, answer.image_link]
                        .into_iter()
                        .flatten()
                        .filter(|text| !text.is_empty())
                    {
                        writer.write_all(text.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                    }
                }
            }
            Err(err) => {
                warn!(session = %user.id, error = %err, "CLI question failed");
                writer
                    .write_all(format!("error: {err}\n").as_bytes())
                    .await?;
            }
        }
        writer.flush().await?;
    }

    info!(session = %user.id, "CLI agent stopped");
    Ok(())
}
