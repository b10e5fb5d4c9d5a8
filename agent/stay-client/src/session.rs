/// Session driver
/// Line-oriented console loop around one orchestrator.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::orchestration::Orchestrator;

/// Reserved inputs that end the session without running any stage
pub fn is_exit_command(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

/// Read user lines from `input` until an exit command, end of input or a
/// terminated conversation, writing assistant output to `output`.
pub async fn run_session<R, W>(orchestrator: &mut Orchestrator, input: R, mut output: W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let greeting = orchestrator.greet();
    writeln!(output, "Assistant: {}", greeting)?;

    let mut lines = input.lines();
    loop {
        write!(output, "You: ")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let line = line?;

        if is_exit_command(&line) {
            tracing::info!("[SESSION] {} ended by user", orchestrator.conversation_id());
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        for reply in orchestrator.handle_turn(line.trim()).await {
            writeln!(output, "Assistant: {}", reply)?;
        }

        if orchestrator.is_terminated() {
            tracing::info!("[SESSION] {} conversation finished", orchestrator.conversation_id());
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands_any_case() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("QUIT"));
        assert!(is_exit_command("  Exit \n"));
        assert!(!is_exit_command("exit please"));
        assert!(!is_exit_command("quite nice"));
    }
}
