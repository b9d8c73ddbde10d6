// Terminal UI utilities

use std::io::{self, BufRead, Write};

use anyhow::Context;
use async_trait::async_trait;
use colored::Colorize;
use tokio::sync::oneshot;

use crate::domain::Ui;

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_info(message: &str) {
    println!("{}", format!("ℹ️  {}", message).bright_cyan());
}

/// Answers that confirm the prompt
fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Read one line on a detached thread.
///
/// Dropping the receiver abandons the read; the runtime never waits on it.
fn spawn_line_reader<R>(mut reader: R) -> oneshot::Receiver<io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut input = String::new();
        let result = reader.read_line(&mut input).map(|_| input);
        let _ = tx.send(result);
    });
    rx
}

/// Stdout output plus a stdin confirmation prompt
pub struct TerminalUi {
    non_interactive: bool,
}

impl TerminalUi {
    pub fn new(non_interactive: bool) -> Self {
        Self { non_interactive }
    }
}

#[async_trait]
impl Ui for TerminalUi {
    fn say(&self, line: &str) {
        if line.starts_with("+ ") {
            print!("{}", line.green());
        } else if line.starts_with("- ") {
            print!("{}", line.red());
        } else {
            print!("{}", line);
        }
        let _ = io::stdout().flush();
    }

    async fn ask_for_confirmation(&self) -> anyhow::Result<()> {
        if self.non_interactive {
            return Ok(());
        }

        print!("\nContinue? [yN]: ");
        io::stdout().flush()?;

        let answer = spawn_line_reader(io::BufReader::new(io::stdin()))
            .await
            .context("Stdin reader stopped")??;

        if is_confirmation(&answer) {
            Ok(())
        } else {
            anyhow::bail!("Stopped")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    /// Input that blocks until its sender is dropped
    struct StalledInput(mpsc::Receiver<()>);

    impl Read for StalledInput {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[test]
    fn test_confirmation_answers() {
        assert!(is_confirmation("y\n"));
        assert!(is_confirmation("YES"));
        assert!(!is_confirmation(""));
        assert!(!is_confirmation("n"));
        assert!(!is_confirmation("yep"));
    }

    #[tokio::test]
    async fn test_line_reader_delivers_answer() {
        let answer = spawn_line_reader(io::Cursor::new("yes\nignored\n"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(answer, "yes\n");
    }

    #[test]
    fn test_unanswered_prompt_does_not_block_shutdown() {
        let (release_input, stalled) = mpsc::channel::<()>();
        let runtime = tokio::runtime::Runtime::new().unwrap();

        let answered = runtime.block_on(async {
            let reader = spawn_line_reader(io::BufReader::new(StalledInput(stalled)));
            tokio::time::timeout(Duration::from_millis(50), reader)
                .await
                .is_ok()
        });
        assert!(!answered);

        let started = Instant::now();
        drop(runtime);
        assert!(started.elapsed() < Duration::from_secs(1));

        drop(release_input);
    }

    #[tokio::test]
    async fn test_non_interactive_confirms() {
        let ui = TerminalUi::new(true);
        assert!(ui.ask_for_confirmation().await.is_ok());
    }
}
