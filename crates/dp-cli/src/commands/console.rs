//! Terminal console for the deletion workflow

use async_trait::async_trait;
use dp_audit::{Console, DeletionEvent};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin, Stdout};

/// Prompts on stdout and reads answers from stdin
pub(crate) struct TerminalConsole {
    input: BufReader<Stdin>,
    output: Stdout,
}

impl TerminalConsole {
    pub(crate) fn new() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()),
            output: tokio::io::stdout(),
        }
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn ask(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            // Keep the next line off the unanswered prompt.
            self.output.write_all(b"\n").await?;
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn notify(&mut self, event: &DeletionEvent) {
        if event.is_failure() {
            eprintln!("{}", event);
        } else {
            println!("{}", event);
        }
        if ends_step(event) {
            println!();
        }
    }
}

/// Whether a blank line follows the event
fn ends_step(event: &DeletionEvent) -> bool {
    !matches!(
        event,
        DeletionEvent::Deleting(_) | DeletionEvent::ContainerEmpty { .. }
    )
}
