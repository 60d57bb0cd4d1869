use crate::command::Engine;
use anyhow::{Context as AnyhowContext, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const NAME_REQUIRED: &str = "Por favor, proporciona tu nombre primero.";
pub const EMPTY_NAME: &str = "El nombre no puede estar vacío.";

/// Per-conversation caller state. The matcher never sees it.
#[derive(Debug, Default, Clone)]
pub struct Session {
    name: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Stores the trimmed name and returns the greeting, or the validation
    /// message when the name is blank.
    pub fn set_name(&mut self, raw: &str) -> std::result::Result<String, &'static str> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(EMPTY_NAME);
        }
        self.name = Some(name.to_string());
        Ok(format!(
            "¡Hola, {name}! Bienvenido al Chatbot de Energías Renovables. ¿En qué puedo ayudarte?"
        ))
    }

    #[must_use]
    pub fn reply<'a>(&self, engine: &'a Engine, question: &str) -> &'a str {
        if self.name.is_none() {
            return NAME_REQUIRED;
        }
        engine.matcher().answer(question)
    }
}

/// Chat line that sets or replaces the user name, e.g. `/name Ana`.
pub const NAME_COMMAND: &str = "/name";

/// Argument of a `/name` line, or `None` when the line is a question.
fn name_argument(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(NAME_COMMAND)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

/// Line-oriented chat: `/name <NAME>` lines set the name, every other
/// non-blank line is a question and is refused until a name is set.
pub async fn run_chat<R, W>(
    engine: &Engine,
    mut session: Session,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read chat input")? {
        let reply = if let Some(name) = name_argument(&line) {
            match session.set_name(name) {
                Ok(greeting) => greeting,
                Err(message) => message.to_string(),
            }
        } else if line.trim().is_empty() {
            continue;
        } else {
            let reply = session.reply(engine, &line);
            log::debug!("chat: {:?} -> {:?}", line, reply);
            reply.to_string()
        };
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}
