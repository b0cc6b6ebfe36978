//! Line-oriented console driving one integration session.
//!
//! Connection flows and disconnects run as background tasks, so the console
//! keeps accepting commands while they are pending.

use anyhow::{Context, Result};
use integration_hub::notify::{NotificationKind, NotificationSink};
use integration_hub::view::IntegrationView;
use integration_hub::IntegrationController;
use std::fmt::Write as _;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const HELP: &str = "\
commands:
  types              list available integrations
  select <type>      select an integration (clears current params)
  select none        clear the selection
  user <id>          set the session user
  org <id>           set the session organization
  connect            run the selected integration's connection flow
  disconnect         revoke the selected integration's credentials
  status             show the current state
  credentials        show the credentials handed to the data form
  quit               exit";

/// A parsed console command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Types,
    Select(String),
    ClearSelection,
    User(String),
    Org(String),
    Connect,
    Disconnect,
    Status,
    Credentials,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let argument = |usage: &str| {
            if rest.is_empty() {
                Err(format!("usage: {}", usage))
            } else {
                Ok(rest.to_string())
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "help" | "?" => Ok(Command::Help),
            "types" => Ok(Command::Types),
            "select" if rest.eq_ignore_ascii_case("none") => Ok(Command::ClearSelection),
            "select" => argument("select <Notion|Airtable|HubSpot|none>").map(Command::Select),
            "user" => argument("user <id>").map(Command::User),
            "org" => argument("org <id>").map(Command::Org),
            "connect" => Ok(Command::Connect),
            "disconnect" => Ok(Command::Disconnect),
            "status" => Ok(Command::Status),
            "credentials" => Ok(Command::Credentials),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}' (try 'help')", other)),
        }
    }
}

/// What the console does after a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Print(String),
    Quit,
}

/// Prints notifications on stdout.
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, kind: NotificationKind, message: &str) {
        println!("[{}] {}", kind, message);
    }
}

pub struct Console {
    controller: IntegrationController,
    /// Pending connection flows and disconnects
    tasks: Vec<JoinHandle<()>>,
}

impl Console {
    pub fn new(controller: IntegrationController) -> Self {
        Self {
            controller,
            tasks: Vec::new(),
        }
    }

    pub fn controller(&self) -> &IntegrationController {
        &self.controller
    }

    /// Read commands from `input` until it ends, `quit`, or Ctrl-C.
    ///
    /// At end of input, pending tasks are awaited; on `quit` or Ctrl-C they
    /// are aborted.
    pub async fn run<R: AsyncRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = BufReader::new(input).lines();
        println!("{}", HELP);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read command")? else {
                        info!(pending = self.tasks.len(), "Input closed, waiting for pending tasks");
                        self.finish().await;
                        return Ok(());
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let reply = match line.parse::<Command>() {
                        Ok(command) => self.execute(command),
                        Err(message) => Reply::Print(message),
                    };
                    match reply {
                        Reply::Print(text) => println!("{}", text),
                        Reply::Quit => {
                            self.shutdown();
                            return Ok(());
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    self.shutdown();
                    return Ok(());
                }
            }
        }
    }

    /// Execute one command. Must be called inside a tokio runtime.
    pub fn execute(&mut self, command: Command) -> Reply {
        self.tasks.retain(|task| !task.is_finished());
        debug!(command = ?command, "Executing console command");

        let text = match command {
            Command::Help => HELP.to_string(),
            Command::Types => self
                .controller
                .options()
                .iter()
                .map(|ty| ty.display_name())
                .collect::<Vec<_>>()
                .join(", "),
            Command::Select(name) => match self.controller.select_by_name(&name) {
                Ok(ty) => format!("Selected {}", ty),
                Err(e) => format!("Cannot select '{}': {}", name, e),
            },
            Command::ClearSelection => match self.controller.select_type(None) {
                Ok(()) => "Selection cleared".to_string(),
                Err(e) => e.to_string(),
            },
            Command::User(user_id) => {
                self.controller.set_user(user_id.as_str());
                format!("User set to {}", user_id)
            }
            Command::Org(org_id) => {
                self.controller.set_org(org_id.as_str());
                format!("Organization set to {}", org_id)
            }
            Command::Connect => self.spawn_connect(),
            Command::Disconnect => self.spawn_disconnect(),
            Command::Status => render_status(&self.controller.view()),
            Command::Credentials => match self.controller.handoff() {
                Some(handoff) => serde_json::to_string_pretty(&handoff)
                    .unwrap_or_else(|e| format!("Cannot render credentials: {}", e)),
                None => "Not connected".to_string(),
            },
            Command::Quit => return Reply::Quit,
        };
        Reply::Print(text)
    }

    fn spawn_connect(&mut self) -> String {
        let Some(ty) = self.controller.snapshot().selected() else {
            return "Select an integration first".to_string();
        };

        let controller = self.controller.clone();
        self.tasks.push(tokio::spawn(async move {
            // Failures were already reported through the notification sink
            if let Err(e) = controller.connect().await {
                debug!(error = %e, "Connection flow ended with an error");
            }
        }));
        format!("Connecting to {}...", ty)
    }

    fn spawn_disconnect(&mut self) -> String {
        let Some(affordance) = self.controller.view().disconnect else {
            return "No connected integration to disconnect".to_string();
        };

        let controller = self.controller.clone();
        self.tasks.push(tokio::spawn(async move {
            if let Err(rejected) = controller.disconnect().await {
                println!("Disconnect unavailable: {}", rejected);
            }
        }));
        format!("{}...", affordance.label)
    }

    /// Wait for every pending task.
    pub async fn finish(&mut self) {
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }

    /// Abort every pending task.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

fn render_status(view: &IntegrationView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "user: {}  org: {}", view.user_id, view.org_id);

    match view.selected {
        Some(ty) if view.connected => {
            let _ = write!(out, "integration: {} (connected)", ty);
        }
        Some(ty) => {
            let _ = write!(out, "integration: {} (not connected)", ty);
        }
        None => {
            let _ = write!(out, "integration: none selected");
        }
    }

    if let Some(button) = &view.disconnect {
        if button.enabled {
            let _ = write!(out, "\naction: [{}]", button.label);
        } else {
            let _ = write!(out, "\naction: [{}] (in progress)", button.label);
        }
    }
    out
}
