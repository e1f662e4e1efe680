use failure::Fail;

/// Problems with what the user typed. No request is made for these.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum InputError {
    #[fail(display = "Enter a plate number")]
    Empty,
    #[fail(
        display = "Malformed plate number '{}'; use the format А123ВС777",
        _0
    )]
    Malformed(String),
    #[fail(display = "No history entry at position {}", _0)]
    NoSuchHistoryEntry(usize),
}

#[derive(Debug, Fail)]
pub enum PredictError {
    #[fail(display = "{}", _0)]
    Input(#[cause] InputError),
    #[fail(display = "Cannot reach service: {}", _0)]
    Transport(String),
    #[fail(display = "Service error ({}): {}", status, body)]
    Service { status: u16, body: String },
    #[fail(display = "Unreadable service response: {}", _0)]
    Decode(String),
}

impl From<InputError> for PredictError {
    fn from(e: InputError) -> Self {
        PredictError::Input(e)
    }
}

impl From<reqwest::Error> for PredictError {
    fn from(e: reqwest::Error) -> Self {
        PredictError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for PredictError {
    fn from(e: serde_json::Error) -> Self {
        PredictError::Decode(e.to_string())
    }
}
