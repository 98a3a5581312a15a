use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

use crate::client::Transport;
use crate::conversation::Conversation;
use crate::model::Message;

pub async fn run_repl<T: Transport>(conversation: &mut Conversation<'_, T>) -> Result<()> {
    let stdin = io::stdin();
    run_repl_with(conversation, stdin.lock(), io::stdout(), io::stderr()).await
}

pub async fn run_repl_with<T, R, W, E>(
    conversation: &mut Conversation<'_, T>,
    mut input: R,
    mut out: W,
    mut err: E,
) -> Result<()>
where
    T: Transport,
    R: BufRead,
    W: Write,
    E: Write,
{
    writeln!(
        out,
        "Interactive shell started. Using model: {}",
        conversation.params().model
    )?;
    writeln!(out, "Type 'exit' or use Ctrl-D to exit.")?;
    writeln!(out, "'/history' shows the conversation, '/reset' clears it.")?;

    loop {
        write!(out, "Prompt: ")?;
        out.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read stdin")?;
        if read == 0 {
            writeln!(out)?;
            break;
        }

        let prompt = line.trim_end_matches(['\r', '\n']);
        let command = prompt.trim();
        if command.is_empty() {
            continue;
        }
        if command.eq_ignore_ascii_case("exit") {
            break;
        }
        if command.eq_ignore_ascii_case("/reset") {
            conversation.reset();
            writeln!(out, "conversation reset\n")?;
            continue;
        }
        if command.eq_ignore_ascii_case("/history") {
            print_history(&mut out, conversation.history())?;
            continue;
        }

        match conversation.exchange(prompt).await {
            Ok(answer) => writeln!(out, "\nResponse:\n{}\n", answer)?,
            Err(error) => {
                warn!(error = %error, "completion turn failed");
                writeln!(err, "An error occurred: {error}")?;
            }
        }
    }

    info!(
        history_len = conversation.history().len(),
        "interactive shell ended"
    );
    writeln!(out, "Interactive shell ended.")?;
    Ok(())
}

fn print_history(out: &mut impl Write, history: &[Message]) -> io::Result<()> {
    if history.is_empty() {
        return writeln!(out, "(history is empty)\n");
    }

    for (idx, msg) in history.iter().enumerate() {
        writeln!(out, "[{}] {}: {}", idx, msg.role.as_str(), msg.content)?;
    }
    writeln!(out)
}
