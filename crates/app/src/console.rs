//! Terminal approval prompt.

use std::future::Future;
use std::pin::Pin;

use reelpass_application::ports::{ApprovalRequest, Approver};
use reelpass_domain::ApprovalOutcome;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::warn;

/// Asks the user to approve the token in a browser, then waits for Enter.
///
/// Answering `n` or `no`, or closing the input, declines.
pub struct ConsoleApprover<R, W> {
    io: Mutex<(R, W)>,
}

impl ConsoleApprover<BufReader<Stdin>, Stdout> {
    /// Prompt on stdout and read the answer from stdin.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsoleApprover<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Prompt on `output` and read the answer from `input`.
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
        }
    }

    async fn prompt(&self, authorization_url: &str) -> std::io::Result<ApprovalOutcome> {
        let mut io = self.io.lock().await;
        let (input, output) = &mut *io;

        let prompt = format!(
            "Open this page and approve access:\n\n    {authorization_url}\n\nPress Enter once approved (or type 'n' to cancel): "
        );
        output.write_all(prompt.as_bytes()).await?;
        output.flush().await?;

        let mut answer = String::new();
        if input.read_line(&mut answer).await? == 0 {
            return Ok(ApprovalOutcome::Cancelled);
        }
        Ok(match answer.trim().to_ascii_lowercase().as_str() {
            "n" | "no" => ApprovalOutcome::Cancelled,
            _ => ApprovalOutcome::Approved,
        })
    }
}

impl<R, W> Approver for ConsoleApprover<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn present_approval<'a>(
        &'a self,
        request: ApprovalRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = ApprovalOutcome> + Send + 'a>> {
        Box::pin(async move {
            self.prompt(request.authorization_url)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "approval prompt failed");
                    ApprovalOutcome::Cancelled
                })
        })
    }
}
