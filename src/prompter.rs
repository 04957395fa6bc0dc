//! Terminal answers to tool permission prompts.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use buddy_browser_cdp::PermissionPrompter;
use buddy_protocols::{BrowserTool, PermissionChoice};

/// Asks on stderr and takes the answer from a single long-lived stdin reader.
///
/// Prompts are answered in order. Lines typed before a question appears
/// (for example a late answer to a prompt that already timed out) are
/// discarded rather than applied to the next question.
pub(crate) struct TerminalPrompter {
    answers: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl TerminalPrompter {
    pub(crate) fn stdin() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let spawned = std::thread::Builder::new()
            .name("buddy-stdin".to_string())
            .spawn(move || forward_lines(io::stdin().lock(), tx));
        if let Err(e) = spawned {
            warn!("Could not start the stdin reader, prompts will be denied: {}", e);
        }
        Self::from_lines(rx)
    }

    pub(crate) fn from_lines(answers: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            answers: Mutex::new(answers),
        }
    }
}

/// Runs on its own thread until the input closes or nobody is listening.
fn forward_lines(reader: impl BufRead, tx: mpsc::UnboundedSender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("Stopped reading stdin: {}", e);
                break;
            }
        }
    }
}

#[async_trait]
impl PermissionPrompter for TerminalPrompter {
    async fn prompt(&self, tool_name: &str, _request_id: &str) -> PermissionChoice {
        let label = tool_name
            .parse::<BrowserTool>()
            .map(|tool| tool.friendly_name().to_string())
            .unwrap_or_else(|_| tool_name.to_string());

        let mut answers = self.answers.lock().await;
        while let Ok(stale) = answers.try_recv() {
            debug!("Ignoring answer typed before the prompt: {:?}", stale);
        }

        let mut stderr = io::stderr();
        let asked = write!(
            stderr,
            "Buddy wants to: {}. Allow? [o]nce / [s]ession / [N]o: ",
            label
        )
        .and_then(|_| stderr.flush());
        if let Err(e) = asked {
            warn!("Could not show permission prompt: {}", e);
            return PermissionChoice::Deny;
        }

        match answers.recv().await {
            Some(line) => parse_choice(&line),
            None => {
                warn!("Input closed, denying {}", tool_name);
                PermissionChoice::Deny
            }
        }
    }
}

/// Anything not clearly allowing counts as a denial.
pub(crate) fn parse_choice(input: &str) -> PermissionChoice {
    match input.trim().to_lowercase().as_str() {
        "o" | "once" | "y" | "yes" => PermissionChoice::AllowOnce,
        "s" | "session" | "always" => PermissionChoice::AllowSession,
        _ => PermissionChoice::Deny,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_allow_once() {
        assert_eq!(parse_choice("o\n"), PermissionChoice::AllowOnce);
        assert_eq!(parse_choice("Yes"), PermissionChoice::AllowOnce);
    }

    #[test]
    fn test_allow_session() {
        assert_eq!(parse_choice("  s "), PermissionChoice::AllowSession);
        assert_eq!(parse_choice("SESSION\n"), PermissionChoice::AllowSession);
    }

    #[test]
    fn test_default_is_deny() {
        assert_eq!(parse_choice("\n"), PermissionChoice::Deny);
        assert_eq!(parse_choice("n"), PermissionChoice::Deny);
        assert_eq!(parse_choice("sure, why not"), PermissionChoice::Deny);
    }

    #[test]
    fn test_forward_lines_sends_each_line() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        forward_lines(io::Cursor::new("o\nsession\n"), tx);

        assert_eq!(rx.try_recv().unwrap(), "o");
        assert_eq!(rx.try_recv().unwrap(), "session");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_answer_typed_after_prompt() {
        let (tx, rx) = mpsc::unbounded_channel();
        let prompter = TerminalPrompter::from_lines(rx);

        let (choice, _) = tokio::join!(prompter.prompt("click", "r1"), async {
            tokio::task::yield_now().await;
            tx.send("s".to_string()).unwrap();
        });

        assert_eq!(choice, PermissionChoice::AllowSession);
    }

    #[tokio::test]
    async fn test_lines_before_prompt_are_discarded() {
        let (tx, rx) = mpsc::unbounded_channel();
        let prompter = TerminalPrompter::from_lines(rx);
        tx.send("s".to_string()).unwrap();

        let (choice, _) = tokio::join!(prompter.prompt("click", "r1"), async {
            tokio::task::yield_now().await;
            tx.send("o".to_string()).unwrap();
        });

        assert_eq!(choice, PermissionChoice::AllowOnce);
    }

    #[tokio::test]
    async fn test_timed_out_prompt_leaves_next_answer_alone() {
        let (tx, rx) = mpsc::unbounded_channel();
        let prompter = TerminalPrompter::from_lines(rx);

        let first =
            tokio::time::timeout(Duration::from_millis(20), prompter.prompt("click", "r1")).await;
        assert!(first.is_err());

        // Late answer meant for the first question.
        tx.send("o".to_string()).unwrap();

        let (choice, _) = tokio::join!(prompter.prompt("type_text", "r2"), async {
            tokio::task::yield_now().await;
            tx.send("s".to_string()).unwrap();
        });

        assert_eq!(choice, PermissionChoice::AllowSession);
    }

    #[tokio::test]
    async fn test_closed_input_denies() {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let prompter = TerminalPrompter::from_lines(rx);
        drop(tx);

        assert_eq!(prompter.prompt("click", "r1").await, PermissionChoice::Deny);
    }
}
