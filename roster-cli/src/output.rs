//! Result and error rendering, and the process exit code contract

use roster_core::ErrorCode;
use serde::Serialize;

/// Print `value` as pretty JSON, or run `text` for the human format
pub fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

/// Error code of the roster error behind `err`, `INTERNAL` for anything else
pub fn error_code(err: &anyhow::Error) -> ErrorCode {
    err.downcast_ref::<roster_core::Error>()
        .map(roster_core::Error::code)
        .unwrap_or(ErrorCode::Internal)
}

/// 2 not found, 3 already exists, 4 conflict, 1 anything else
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match error_code(err) {
        ErrorCode::NotFound => 2,
        ErrorCode::PrExists | ErrorCode::TeamExists | ErrorCode::UserExists => 3,
        ErrorCode::PrMerged | ErrorCode::NotAssigned | ErrorCode::NoCandidate => 4,
        ErrorCode::Internal => 1,
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: ErrorCode,
    message: &'a str,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

/// Write `err` to stderr, or to stdout as `{"error": {...}}` in JSON mode
pub fn report_error(err: &anyhow::Error, json: bool) {
    let code = error_code(err);
    let message = format!("{:#}", err);

    if json {
        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code,
                message: &message,
            },
        };
        match serde_json::to_string(&envelope) {
            Ok(body) => println!("{}", body),
            Err(_) => eprintln!("Error [{}]: {}", code, message),
        }
    } else {
        eprintln!("Error [{}]: {}", code, message);
    }
}
