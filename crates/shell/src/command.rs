use std::num::ParseIntError;

use sidechat_storage::StorageError;
use snafu::{OptionExt, ResultExt, Snafu};

use crate::identity::LocalIdentity;
use crate::sidebar::{CoordinatorError, SidebarCoordinator};

pub const HELP_TEXT: &str = "\
commands:
  login <name>         sign in and load your chats
  logout               sign out
  new                  create a new chat
  list                 show the sidebar
  panel                expand or collapse the sidebar
  menu <n>             open or close the menu of chat n
  select <n>           make chat n active
  rename <n> <name>    rename chat n
  delete <n>           delete chat n
  profile              open your profile
  help                 show this text
  quit                 exit";

/// One line of user input. Positions are 1-based, as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(String),
    Logout,
    New,
    List,
    Panel,
    Menu(usize),
    Select(usize),
    Rename(usize, String),
    Delete(usize),
    Profile,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Help,
    Quit,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommandError {
    #[snafu(display("unknown command '{raw}', try `help`"))]
    UnknownCommand { stage: &'static str, raw: String },
    #[snafu(display("`{command}` needs {argument}"))]
    MissingArgument {
        stage: &'static str,
        command: &'static str,
        argument: &'static str,
    },
    #[snafu(display("'{raw}' is not a chat number"))]
    InvalidPosition {
        stage: &'static str,
        raw: String,
        source: ParseIntError,
    },
    #[snafu(display("there is no chat number {position}"))]
    NoSessionAt {
        stage: &'static str,
        position: usize,
    },
    #[snafu(display("cannot sign in: {source}"))]
    SignIn {
        stage: &'static str,
        source: StorageError,
    },
    #[snafu(display("{source}"))]
    Sidebar {
        stage: &'static str,
        source: CoordinatorError,
    },
}

impl CommandError {
    /// Sidebar failures have already reached the user as notifications.
    pub fn already_reported(&self) -> bool {
        matches!(self, Self::Sidebar { .. })
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        let Some((verb, rest)) = split_word(line) else {
            return Ok(None);
        };

        let command = match verb {
            "login" => {
                let name = rest.context(MissingArgumentSnafu {
                    stage: "parse-login",
                    command: "login",
                    argument: "a name",
                })?;
                Self::Login(name.to_string())
            }
            "logout" => Self::Logout,
            "new" => Self::New,
            "list" | "ls" => Self::List,
            "panel" => Self::Panel,
            "menu" => Self::Menu(parse_position(rest, "menu")?),
            "select" => Self::Select(parse_position(rest, "select")?),
            "rename" => {
                let (raw_position, name) =
                    rest.and_then(split_word).context(MissingArgumentSnafu {
                        stage: "parse-rename",
                        command: "rename",
                        argument: "a chat number",
                    })?;
                let position = parse_position(Some(raw_position), "rename")?;
                let name = name.context(MissingArgumentSnafu {
                    stage: "parse-rename",
                    command: "rename",
                    argument: "a new name",
                })?;
                Self::Rename(position, name.to_string())
            }
            "delete" | "rm" => Self::Delete(parse_position(rest, "delete")?),
            "profile" => Self::Profile,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => {
                return UnknownCommandSnafu {
                    stage: "parse-command",
                    raw: other.to_string(),
                }
                .fail();
            }
        };
        Ok(Some(command))
    }

    pub async fn execute(
        self,
        coordinator: &SidebarCoordinator,
        identity: &LocalIdentity,
    ) -> Result<CommandOutcome, CommandError> {
        match self {
            Self::Login(name) => {
                identity.sign_in(&name).context(SignInSnafu {
                    stage: "execute-login",
                })?;
                coordinator
                    .refresh_for_current_user()
                    .await
                    .context(SidebarSnafu {
                        stage: "execute-login-refresh",
                    })?;
            }
            Self::Logout => {
                identity.sign_out();
                coordinator
                    .refresh_for_current_user()
                    .await
                    .context(SidebarSnafu {
                        stage: "execute-logout-refresh",
                    })?;
            }
            Self::New => {
                coordinator.create_session().await.context(SidebarSnafu {
                    stage: "execute-new",
                })?;
            }
            Self::List => {}
            Self::Panel => {
                coordinator.toggle_panel();
            }
            Self::Menu(position) => {
                let session_id = session_at(coordinator, position)?;
                coordinator.toggle_menu(session_id);
            }
            Self::Select(position) => {
                let session_id = session_at(coordinator, position)?;
                coordinator.select_session(session_id);
            }
            Self::Rename(position, name) => {
                let session_id = session_at(coordinator, position)?;
                coordinator
                    .rename_session(session_id, &name)
                    .await
                    .context(SidebarSnafu {
                        stage: "execute-rename",
                    })?;
                coordinator.close_menu();
            }
            Self::Delete(position) => {
                let session_id = session_at(coordinator, position)?;
                coordinator
                    .delete_session(session_id)
                    .await
                    .context(SidebarSnafu {
                        stage: "execute-delete",
                    })?;
            }
            Self::Profile => {
                if coordinator.open_profile() {
                    tracing::info!("profile opened");
                }
            }
            Self::Help => return Ok(CommandOutcome::Help),
            Self::Quit => return Ok(CommandOutcome::Quit),
        }
        Ok(CommandOutcome::Continue)
    }
}

fn split_word(text: &str) -> Option<(&str, Option<&str>)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => {
            let rest = rest.trim();
            Some((word, (!rest.is_empty()).then_some(rest)))
        }
        None => Some((text, None)),
    }
}

fn parse_position(raw: Option<&str>, command: &'static str) -> Result<usize, CommandError> {
    let raw = raw.context(MissingArgumentSnafu {
        stage: "parse-position",
        command,
        argument: "a chat number",
    })?;
    raw.parse::<usize>().context(InvalidPositionSnafu {
        stage: "parse-position",
        raw: raw.to_string(),
    })
}

fn session_at(
    coordinator: &SidebarCoordinator,
    position: usize,
) -> Result<sidechat_storage::SessionId, CommandError> {
    coordinator
        .snapshot()
        .session_at(position)
        .map(|item| item.id)
        .context(NoSessionAtSnafu {
            stage: "resolve-position",
            position,
        })
}
