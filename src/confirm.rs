use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::{CliError, ErrorKind};

/// Gate for destructive commands: `--yes`, or an interactive y/N prompt when
/// stdin is a terminal.
pub fn require_yes_or_confirm(yes: bool, prompt: &str) -> Result<(), CliError> {
    if yes {
        return Ok(());
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::new(
            ErrorKind::ConfirmationRequired,
            "Deletion requires --yes in non-interactive mode",
        ));
    }
    if ask(prompt, &mut io::stdin().lock(), &mut io::stderr())? {
        Ok(())
    } else {
        Err(CliError::new(
            ErrorKind::ConfirmationRequired,
            "Deletion cancelled",
        ))
    }
}

/// Ask a y/N question; anything but `y`/`yes` declines.
fn ask(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool, CliError> {
    write!(output, "{prompt} [y/N]: ")
        .and_then(|()| output.flush())
        .map_err(|err| CliError::cli(format!("failed to write prompt: {err}")))?;
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|err| CliError::cli(format!("failed to read answer: {err}")))?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
