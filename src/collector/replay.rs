//! Recorded pointer traces in JSON Lines form.
//!
//! One event per line, for example:
//!
//! ```text
//! {"type":"move","x":0,"timestamp_ms":0}
//! {"type":"move","x":100,"timestamp_ms":40}
//! {"type":"click","timestamp_ms":900}
//! ```

use crate::collector::types::PointerEvent;
use std::io::BufRead;

/// Errors while reading a trace.
#[derive(Debug)]
pub enum ReplayError {
    Io(std::io::Error),
    Parse { line: usize, message: String },
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::Io(e) => write!(f, "IO error: {e}"),
            ReplayError::Parse { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<std::io::Error> for ReplayError {
    fn from(e: std::io::Error) -> Self {
        ReplayError::Io(e)
    }
}

/// Read every event from a JSON Lines trace. Blank lines are skipped.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<PointerEvent>, ReplayError> {
    let mut events = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event = serde_json::from_str(trimmed).map_err(|e| ReplayError::Parse {
            line: index + 1,
            message: e.to_string(),
        })?;
        events.push(event);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_events() {
        let trace = "{\"type\":\"move\",\"x\":0,\"timestamp_ms\":0}\n\
                     \n\
                     {\"type\":\"move\",\"x\":100,\"timestamp_ms\":40}\n\
                     {\"type\":\"click\",\"timestamp_ms\":900}\n";

        let events = read_events(trace.as_bytes()).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            PointerEvent::Move {
                x: 100.0,
                timestamp_ms: 40.0
            }
        );
        assert!(matches!(events[2], PointerEvent::Click { .. }));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let trace = "{\"type\":\"move\",\"x\":0,\"timestamp_ms\":0}\n{\"type\":\"wiggle\"}\n";

        match read_events(trace.as_bytes()) {
            Err(ReplayError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
