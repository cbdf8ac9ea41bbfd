#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    LocalizeString,
    LocalizeDocument,
    Audit,
    RunBatch,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "localize_string" => Command::LocalizeString,
            "localize_document" => Command::LocalizeDocument,
            "audit" => Command::Audit,
            "run_batch" => Command::RunBatch,
            _ => Command::Unknown,
        }
    }
}
