use std::fmt;
use std::str::FromStr;

use crate::session::Tab;

/// One line of terminal input, already mapped to a controller intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        password: String,
        email: String,
    },
    ToggleAuthMode,
    Logout,
    Tab(Tab),
    Attach(Option<String>),
    Discard,
    /// One-based index into the current refill alerts.
    Refill(usize),
    Email(String),
    Voice,
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseCommandError {
    message: String,
}

impl ParseCommandError {
    fn usage(usage: &str) -> Self {
        Self { message: format!("Usage: {}", usage) }
    }
}

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseCommandError {}

pub const HELP: &str =
    "Commands:
  <text>                          send a message to the pharmacist
  /login <user> <password>        sign in
  /register <user> <password> <email>
  /mode                           switch between login and register
  /logout                         sign out and start over
  /tab <consultation|dashboard|traces|database>
  /attach [note]                  attach a prescription note (no note toggles the panel)
  /discard                        drop the attached note
  /refill <n>                     draft a refill request from alert n
  /email <address>                change the notification address
  /voice                          speak one message
  /refresh                        reload the dashboard
  /quit";

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Plain text is kept exactly as typed; only slash commands are trimmed.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let Some(rest) = line.trim().strip_prefix('/') else {
            return Ok(Command::Say(line.to_string()));
        };
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };
        let words: Vec<&str> = args.split_whitespace().collect();

        match name.to_lowercase().as_str() {
            "login" =>
                match words.as_slice() {
                    [username, password] =>
                        Ok(Command::Login {
                            username: username.to_string(),
                            password: password.to_string(),
                        }),
                    _ => Err(ParseCommandError::usage("/login <user> <password>")),
                }
            "register" =>
                match words.as_slice() {
                    [username, password, email] =>
                        Ok(Command::Register {
                            username: username.to_string(),
                            password: password.to_string(),
                            email: email.to_string(),
                        }),
                    _ => Err(ParseCommandError::usage("/register <user> <password> <email>")),
                }
            "mode" => Ok(Command::ToggleAuthMode),
            "logout" => Ok(Command::Logout),
            "tab" =>
                args
                    .parse::<Tab>()
                    .map(Command::Tab)
                    .map_err(|e| ParseCommandError { message: e.to_string() }),
            "attach" => Ok(Command::Attach(Some(args.to_string()).filter(|a| !a.is_empty()))),
            "discard" => Ok(Command::Discard),
            "refill" =>
                match args.parse::<usize>() {
                    Ok(n) if n > 0 => Ok(Command::Refill(n)),
                    _ => Err(ParseCommandError::usage("/refill <n>")),
                }
            "email" if !args.is_empty() => Ok(Command::Email(args.to_string())),
            "email" => Err(ParseCommandError::usage("/email <address>")),
            "voice" => Ok(Command::Voice),
            "refresh" => Ok(Command::Refresh),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ =>
                Err(ParseCommandError {
                    message: format!("Unknown command: '/{}'. Type /help.", name),
                }),
        }
    }
}
