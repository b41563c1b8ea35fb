use async_trait::async_trait;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Lines read from stdin, shared between the command prompt and confirmations.
pub type InputLines = Arc<Mutex<mpsc::Receiver<String>>>;

/// Capabilities the agent borrows from whatever hosts it.
#[async_trait]
pub trait PageHost: Send + Sync {
    /// Ask the user to approve a destructive action.
    async fn confirm(&self, prompt: &str) -> bool;

    /// Throw away the current session and start a fresh one.
    fn reload(&self);
}

/// Host for the terminal session.
///
/// Confirmations read the next stdin line; reloads are signalled to the
/// session loop in `main`.
pub struct TerminalHost {
    input: InputLines,
    reload_tx: mpsc::UnboundedSender<()>,
}

impl TerminalHost {
    pub fn new(input: InputLines, reload_tx: mpsc::UnboundedSender<()>) -> Self {
        Self { input, reload_tx }
    }
}

/// Answers that count as a yes.
fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "是" | "确定"
    )
}

#[async_trait]
impl PageHost for TerminalHost {
    async fn confirm(&self, prompt: &str) -> bool {
        println!("{} [y/N]", prompt);

        let mut input = self.input.lock().await;
        match input.recv().await {
            Some(answer) => is_affirmative(&answer),
            None => {
                tracing::debug!("stdin closed while waiting for confirmation");
                false
            }
        }
    }

    fn reload(&self) {
        tracing::info!("Reloading session");
        if self.reload_tx.send(()).is_err() {
            tracing::warn!("Session loop is gone, reload dropped");
        }
    }
}

/// Forward stdin lines into a channel until EOF.
///
/// Reads on a plain thread: a blocking stdin read cannot be cancelled, and a
/// runtime-owned one would keep the process alive after `quit`.
pub fn spawn_stdin_reader() -> InputLines {
    spawn_line_reader(std::io::BufReader::new(std::io::stdin()))
}

/// Forward lines from any blocking reader into a channel until EOF.
pub fn spawn_line_reader<R>(reader: R) -> InputLines
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
        tracing::debug!("stdin reader finished");
    });

    Arc::new(Mutex::new(rx))
}
