//! Command and trigger-token parsing for message text.
//!
//! Commands are case-sensitive and match on the first whitespace-delimited
//! word, so `/language` is not `/lang` and `/aix` is not `/ai`.

/// Language-switch command.
pub const LANG_COMMAND: &str = "/lang";

/// Commands that clear the conversation history.
pub const RESET_COMMANDS: [&str; 2] = ["/reset", "/newchat"];

/// Tokens that opt a group message into bot handling.
pub const TRIGGER_TOKENS: [&str; 2] = ["/ask", "/ai"];

/// Sends the configured store location.
pub const LOCATION_COMMAND: &str = "/location";

/// Sends the configured menu image.
pub const MENU_COMMAND: &str = "/menu";

/// A recognized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `/lang [code]`; the code is not validated here.
    Language(Option<&'a str>),
    /// `/reset` or `/newchat`.
    Reset,
    /// `/location`.
    Location,
    /// `/menu`.
    Menu,
}

/// Splits off the first whitespace-delimited word.
fn split_first_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], &text[idx..]),
        None => (text, ""),
    }
}

/// Parses a command from message text.
///
/// `/lang` must be the whole first word (`/language id` is not a command);
/// the reset and store commands must be the entire (trimmed) text.
pub fn parse_command(text: &str) -> Option<Command<'_>> {
    let trimmed = text.trim();
    let (first, rest) = split_first_word(trimmed);

    if first == LANG_COMMAND {
        let code = rest.split_whitespace().next();
        return Some(Command::Language(code));
    }
    if RESET_COMMANDS.contains(&trimmed) {
        return Some(Command::Reset);
    }
    match trimmed {
        LOCATION_COMMAND => Some(Command::Location),
        MENU_COMMAND => Some(Command::Menu),
        _ => None,
    }
}

/// Strips a leading trigger token.
///
/// Returns the trimmed remainder (possibly empty) when the text starts with
/// a trigger token, `None` otherwise.
pub fn strip_trigger(text: &str) -> Option<&str> {
    let (first, rest) = split_first_word(text);
    if TRIGGER_TOKENS.contains(&first) {
        Some(rest.trim())
    } else {
        None
    }
}
