use anyhow::{bail, Context, Result};
use std::io::{BufRead, StdinLock, Stdout, Write};

/// Line-oriented question/answer helper shared by the input form and the
/// config wizard. Generic over its streams so both can be driven from tests.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line of explanatory text.
    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message).context("Failed to write to stdout")
    }

    /// Prompt user with a message and return their trimmed input.
    pub fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message).context("Failed to write to stdout")?;
        self.output.flush().context("Failed to flush stdout")?;
        let mut input = String::new();
        let read = self
            .input
            .read_line(&mut input)
            .context("Failed to read input")?;
        if read == 0 {
            bail!("Input ended before all questions were answered");
        }
        Ok(input.trim().to_string())
    }

    /// Prompt user with a message and a default value. Returns default if input is empty.
    pub fn prompt_with_default(&mut self, message: &str, default: &str) -> Result<String> {
        let input = self.prompt(&format!("{} [{}]: ", message, default))?;
        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input)
        }
    }

    /// Prompt user with a yes/no question. Returns bool based on input and default.
    pub fn prompt_yes_no(&mut self, message: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        let input = self.prompt(&format!("{} [{}]: ", message, hint))?;
        let input = input.to_lowercase();
        if input.is_empty() {
            Ok(default_yes)
        } else {
            Ok(input == "y" || input == "yes")
        }
    }

    /// Ask until `parse` accepts the answer, printing its complaint each time.
    pub fn prompt_until<T>(
        &mut self,
        message: &str,
        default: &str,
        mut parse: impl FnMut(&str) -> std::result::Result<T, String>,
    ) -> Result<T> {
        loop {
            let input = self.prompt_with_default(message, default)?;
            match parse(&input) {
                Ok(v) => return Ok(v),
                Err(e) => self.say(&format!("  Invalid: {}. Try again.", e))?,
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
