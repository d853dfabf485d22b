/// Bot commands. Matching ignores case and any `@botname` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` or `/help`
    Start,
    ClearTable,
    Statistics,
    Unknown(String),
}

/// What an incoming text message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound<'a> {
    Command(Command),
    /// Anything else is a transaction submission.
    Transaction(&'a str),
}

pub fn classify(text: &str) -> Inbound<'_> {
    let trimmed = text.trim_start();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Inbound::Transaction(text);
    };

    let word = rest.split_whitespace().next().unwrap_or_default();
    let name = word.split('@').next().unwrap_or_default().to_lowercase();

    let command = match name.as_str() {
        "start" | "help" => Command::Start,
        "cleartable" => Command::ClearTable,
        "statistics" => Command::Statistics,
        _ => Command::Unknown(name),
    };
    Inbound::Command(command)
}
