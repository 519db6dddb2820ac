//! Line commands understood by the terminal shell.

use std::str::FromStr;

use crate::entity::ViewId;
use crate::interactor::auth_interactor::RegistrationForm;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Login { email: String, password: String },
    Register(RegistrationForm),
    Logout,
    Go(ViewId),
    Menu,
    Amount(String),
    Wallet(String),
    Submit,
    New,
    Search(String),
    From(String),
    To(String),
    Status(String),
    Clear,
    Edit(String),
    Delete(String),
    Role(String),
    Block(String),
    Approve(String),
    Reject(String),
    Confirm,
    Cancel,
    Set { field: String, value: String },
    Save,
    Refresh,
    Help,
    Quit,
}

/// Usage and description of every command, in help order
pub fn register_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("login <email> <password>", "sign in"),
        (
            "register <email> <pw> <pw> <name>",
            "create an account and sign in",
        ),
        ("logout", "sign out"),
        ("menu", "show the sections you can open"),
        ("go <section>", "open a section, e.g. `go statement`"),
        ("amount <depix>", "swap: set the DePiX amount"),
        ("wallet <0x...>", "swap: set the Polygon wallet"),
        ("submit", "swap: confirm the swap"),
        ("new", "swap: start another swap"),
        ("search [text]", "lists: filter by text, empty clears"),
        ("from [YYYY-MM-DD]", "lists: first day, empty clears"),
        ("to [YYYY-MM-DD]", "lists: last day, empty clears"),
        ("status <all|pending|...>", "transactions: filter by status"),
        ("clear", "lists: remove all filters"),
        ("edit <row|email>", "customers: edit a customer"),
        ("delete <row|email>", "customers: delete a customer"),
        ("role <row|email>", "customers: toggle client/admin"),
        ("block <row|email>", "customers: block or unblock"),
        ("approve <row|id>", "transactions: mark as completed"),
        ("reject <row|id>", "transactions: mark as failed"),
        ("confirm", "accept the open dialog"),
        ("cancel", "close the open dialog or editor"),
        ("set <field> <value>", "forms: change a field"),
        ("save", "forms: save changes"),
        ("refresh", "reload the current section"),
        ("help", "show this help"),
        ("quit", "leave the application"),
    ]
}

fn usage(command: &str) -> String {
    let usage = register_commands()
        .into_iter()
        .find(|(usage, _)| usage.split_whitespace().next() == Some(command))
        .map(|(usage, _)| usage)
        .unwrap_or(command);
    format!("Usage: {}", usage)
}

fn required(command: &str, rest: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(usage(command))
    } else {
        Ok(rest.to_string())
    }
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let name = name.to_lowercase();

        let command = match name.as_str() {
            "login" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(email), Some(password)) => ConsoleCommand::Login {
                        email: email.to_string(),
                        password: password.to_string(),
                    },
                    _ => return Err(usage("login")),
                }
            }
            "register" => {
                let parts: Vec<&str> = rest.splitn(4, char::is_whitespace).collect();
                if parts.len() < 4 || parts[3].trim().is_empty() {
                    return Err(usage("register"));
                }
                ConsoleCommand::Register(RegistrationForm {
                    email: parts[0].to_string(),
                    password: parts[1].to_string(),
                    confirm_password: parts[2].to_string(),
                    full_name: parts[3].trim().to_string(),
                })
            }
            "logout" => ConsoleCommand::Logout,
            "go" => {
                let view = required("go", rest)?;
                ConsoleCommand::Go(view.parse::<ViewId>()?)
            }
            "menu" => ConsoleCommand::Menu,
            "amount" => ConsoleCommand::Amount(required("amount", rest)?),
            "wallet" => ConsoleCommand::Wallet(required("wallet", rest)?),
            "submit" => ConsoleCommand::Submit,
            "new" => ConsoleCommand::New,
            "search" => ConsoleCommand::Search(rest.to_string()),
            "from" => ConsoleCommand::From(rest.to_string()),
            "to" => ConsoleCommand::To(rest.to_string()),
            "status" => ConsoleCommand::Status(rest.to_string()),
            "clear" => ConsoleCommand::Clear,
            "edit" => ConsoleCommand::Edit(required("edit", rest)?),
            "delete" => ConsoleCommand::Delete(required("delete", rest)?),
            "role" => ConsoleCommand::Role(required("role", rest)?),
            "block" | "unblock" => ConsoleCommand::Block(required("block", rest)?),
            "approve" => ConsoleCommand::Approve(required("approve", rest)?),
            "reject" => ConsoleCommand::Reject(required("reject", rest)?),
            "confirm" | "yes" => ConsoleCommand::Confirm,
            "cancel" | "no" => ConsoleCommand::Cancel,
            "set" => match rest.split_once(char::is_whitespace) {
                Some((field, value)) => ConsoleCommand::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                },
                // Setting a field to nothing clears it
                None if !rest.is_empty() => ConsoleCommand::Set {
                    field: rest.to_string(),
                    value: String::new(),
                },
                None => return Err(usage("set")),
            },
            "save" => ConsoleCommand::Save,
            "refresh" => ConsoleCommand::Refresh,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(format!("Unknown command '{}'", other)),
        };

        Ok(command)
    }
}
