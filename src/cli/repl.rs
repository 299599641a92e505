// Interactive chat REPL
//
// One user line per turn. Input is read on a blocking thread; while a reply
// is pending, Ctrl-C cancels the remote call and the turn finishes with the
// fallback reply.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use super::commands::{format_help, format_stats, Command};
use super::input::InputHandler;
use super::render::Renderer;
use crate::chat::{ChatEngine, ConversationSession};

pub struct Repl {
    engine: ChatEngine,
    session: ConversationSession,
    renderer: Renderer,
}

impl Repl {
    pub fn new(engine: ChatEngine, renderer: Renderer) -> Self {
        let session = engine.new_session();
        Self {
            engine,
            session,
            renderer,
        }
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    /// Run the interactive loop until /quit or EOF
    pub async fn run(mut self) -> Result<()> {
        let mut input = InputHandler::new()?;

        println!("Sentibot - emotion-aware chat");
        if !self.engine.generator().remote_enabled() {
            println!(
                "{}",
                self.renderer
                    .notice("Remote replies unavailable; using built-in replies.")
            );
        }
        println!("Type /help for commands, /exit to quit\n");

        loop {
            let line = tokio::task::block_in_place(|| input.read_line("> "))?;
            let Some(line) = line else {
                println!("Goodbye!");
                break;
            };
            if line.is_empty() {
                continue;
            }

            if let Some(command) = Command::parse(&line) {
                match command {
                    Command::Help => println!("{}\n", format_help()),
                    Command::Stats => println!("{}\n", format_stats(&self.session)),
                    Command::New => {
                        self.session.reset();
                        println!("{}\n", self.renderer.notice("Started a new chat."));
                    }
                    Command::Quit => {
                        println!("Goodbye!");
                        break;
                    }
                }
                continue;
            }

            if line.starts_with('/') {
                println!("Unknown command: {} (try /help)\n", line);
                continue;
            }

            self.process_message(&line).await;
        }

        if let Err(e) = input.save_history() {
            tracing::debug!(error = %e, "Failed to save input history");
        }
        Ok(())
    }

    /// Run one turn and print the user badge and bot reply
    pub async fn process_message(&mut self, text: &str) {
        let cancel = CancellationToken::new();
        let turn = self
            .engine
            .handle_turn_with_cancel(&mut self.session, text, &cancel);
        tokio::pin!(turn);

        let outcome = tokio::select! {
            outcome = &mut turn => outcome,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                turn.await
            }
        };

        println!("{}", self.renderer.user_line(text, &outcome.classification));
        println!("{}\n", self.renderer.bot_line(&outcome.reply.text));
    }
}

/// Single turn without a REPL, for `query`
pub async fn run_single_turn(engine: &ChatEngine, text: &str) -> Result<crate::chat::TurnOutcome> {
    if text.trim().is_empty() {
        anyhow::bail!("Message must not be empty");
    }
    let mut session = engine.new_session();
    let cancel = CancellationToken::new();

    let turn = engine.handle_turn_with_cancel(&mut session, text, &cancel);
    tokio::pin!(turn);
    let outcome = tokio::select! {
        outcome = &mut turn => outcome,
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            cancel.cancel();
            turn.await
        }
    };
    Ok(outcome)
}
