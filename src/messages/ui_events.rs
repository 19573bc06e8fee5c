//! UI events - messages from UI layer to App layer

use crate::models::{ApiType, Auth, KeyValue, NewConnection};
use crate::reports::FinancialReportInput;
use crate::schema::Direction;

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Connections
    ListConnections,
    AddConnection(NewConnection),
    UseConnection(String),
    DeleteConnection(String),

    // Query builder
    SetMethod(String),
    SetPath(String),
    AddParam(KeyValue),
    AddHeader(KeyValue),
    SetBody(String),
    ClearQuery,
    ExecuteQuery,

    // Column manager
    ShowColumns,
    ToggleColumn(String),
    SetColumnVisibility { key: String, visible: bool },
    RenameColumn { key: String, name: String },
    MoveColumn { key: String, direction: Direction },

    // Export and reports
    Export(String),
    RunReport(FinancialReportInput),

    // Popups
    ToggleHelp,

    // System
    Quit,
}

/// Parse one input line into a UiEvent.
///
/// Blank lines yield `Ok(None)`; malformed commands yield a usage message.
pub fn parse_command(line: &str) -> Result<Option<UiEvent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    let args = tokenize(rest);

    let event = match command.to_lowercase().as_str() {
        "connections" | "ls" => UiEvent::ListConnections,
        "add" => UiEvent::AddConnection(parse_connection(&args)?),
        "use" => UiEvent::UseConnection(single_arg(&args, "use <id>")?),
        "delete" | "rm" => UiEvent::DeleteConnection(single_arg(&args, "delete <id>")?),

        "method" => UiEvent::SetMethod(single_arg(&args, "method <GET|POST|PUT|PATCH|DELETE>")?),
        "path" => UiEvent::SetPath(single_arg(&args, "path </endpoint>")?),
        "param" => UiEvent::AddParam(pair(&args, "param <key> <value>")?),
        "header" => UiEvent::AddHeader(pair(&args, "header <name> <value>")?),
        // The body is taken verbatim so JSON quotes survive
        "body" => UiEvent::SetBody(rest.to_string()),
        "clear" => UiEvent::ClearQuery,
        "run" => UiEvent::ExecuteQuery,

        "columns" | "cols" => UiEvent::ShowColumns,
        "toggle" => UiEvent::ToggleColumn(single_arg(&args, "toggle <key>")?),
        "hide" | "show" => UiEvent::SetColumnVisibility {
            key: single_arg(&args, "hide|show <key>")?,
            visible: command.eq_ignore_ascii_case("show"),
        },
        "rename" => {
            let (key, name) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "Usage: rename <key> <new name>".to_string())?;
            UiEvent::RenameColumn {
                key: key.to_string(),
                name: name.trim().to_string(),
            }
        }
        "up" | "down" => UiEvent::MoveColumn {
            key: single_arg(&args, "up|down <key>")?,
            direction: command.parse()?,
        },

        "export" => UiEvent::Export(single_arg(&args, "export <json|csv|pdf>")?),
        "report" => match args.as_slice() {
            [start, end, status] => UiEvent::RunReport(FinancialReportInput {
                start_date: start.clone(),
                end_date: end.clone(),
                status: status.clone(),
            }),
            _ => return Err("Usage: report <start-date> <end-date> <status[,status]>".to_string()),
        },

        "help" | "?" => UiEvent::ToggleHelp,
        "quit" | "exit" | "q" => UiEvent::Quit,
        other => return Err(format!("Unknown command: {} (type 'help')", other)),
    };

    Ok(Some(event))
}

fn single_arg(args: &[String], usage: &str) -> Result<String, String> {
    match args {
        [value] => Ok(value.clone()),
        _ => Err(format!("Usage: {}", usage)),
    }
}

fn pair(args: &[String], usage: &str) -> Result<KeyValue, String> {
    match args {
        [key, value] => Ok(KeyValue::new(key, value)),
        [key] => Ok(KeyValue::new(key, "")),
        _ => Err(format!("Usage: {}", usage)),
    }
}

const ADD_USAGE: &str = "Usage: add <name> <base-url> [generic|wordpress] \
    [none | basic <user> <pass> | bearer <token> | apikey <header> <value> | woo <key> <secret>]";

fn parse_connection(args: &[String]) -> Result<NewConnection, String> {
    let (name, base_url, rest) = match args {
        [name, base_url, rest @ ..] => (name, base_url, rest),
        _ => return Err(ADD_USAGE.to_string()),
    };

    let (api_type, auth_args) = match rest.first().map(|s| s.to_lowercase()) {
        Some(t) if t == "wordpress" || t == "wp" => (ApiType::WordPress, &rest[1..]),
        Some(t) if t == "generic" => (ApiType::Generic, &rest[1..]),
        _ => (ApiType::Generic, rest),
    };

    let auth = match auth_args {
        [] => Auth::None,
        [kind] if kind.eq_ignore_ascii_case("none") => Auth::None,
        [kind, user, pass] if kind.eq_ignore_ascii_case("basic") => Auth::Basic {
            username: user.clone(),
            password: pass.clone(),
        },
        [kind, token] if kind.eq_ignore_ascii_case("bearer") => Auth::Bearer { token: token.clone() },
        [kind, header, value] if kind.eq_ignore_ascii_case("apikey") => Auth::ApiKey {
            header_name: header.clone(),
            value: value.clone(),
        },
        [kind, key, secret] if kind.eq_ignore_ascii_case("woo") => Auth::WooCommerce {
            consumer_key: key.clone(),
            consumer_secret: secret.clone(),
        },
        _ => return Err(ADD_USAGE.to_string()),
    };

    Ok(NewConnection::new(name, base_url)
        .with_api_type(api_type)
        .with_auth(auth))
}

/// Split arguments on whitespace, respecting quotes
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            current.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' if !in_single_quote => escape_next = true,
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            ' ' | '\t' if !in_single_quote && !in_double_quote => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
