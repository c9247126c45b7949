use crate::store::StoreEvent;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSONL log of one session's commands and store events.
/// Never read back by the program.
pub struct Transcript {
    pub path: PathBuf,
    session_id: String,
    file: File,
}

#[derive(Serialize)]
struct Entry<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    #[serde(rename = "type")]
    entry_type: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl Transcript {
    pub fn new(path: &Path, session_id: &str) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            session_id: session_id.to_string(),
            file,
        })
    }

    pub fn log(&mut self, entry_type: &str, data: serde_json::Value) -> Result<()> {
        let entry = Entry {
            ts: Utc::now(),
            session_id: &self.session_id,
            entry_type,
            data,
        };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn session_start(&mut self, slots: usize) -> Result<()> {
        self.log("session_start", serde_json::json!({ "slots": slots }))
    }

    pub fn command(&mut self, line: &str) -> Result<()> {
        self.log("command", serde_json::json!({ "line": line }))
    }

    pub fn command_error(&mut self, line: &str, code: &str, message: &str) -> Result<()> {
        self.log(
            "command_error",
            serde_json::json!({
                "line": line,
                "code": code,
                "message": message,
            }),
        )
    }

    pub fn store_event(&mut self, event: &StoreEvent) -> Result<()> {
        self.log("store_event", serde_json::to_value(event)?)
    }

    pub fn session_end(&mut self, reservations: usize) -> Result<()> {
        self.log(
            "session_end",
            serde_json::json!({ "reservations": reservations }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SlotStatus;

    #[test]
    fn test_entries_are_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        let mut t = Transcript::new(&path, "abc").unwrap();

        t.command("/reserve 2").unwrap();
        t.store_event(&StoreEvent::SlotStatusChanged {
            slot_id: "2".to_string(),
            from: SlotStatus::Available,
            to: SlotStatus::Occupied,
            active_reservations: 0,
        })
        .unwrap();
        t.command_error("/cancel 9", "not_found", "reservation 9 not found")
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "command");
        assert_eq!(lines[0]["line"], "/reserve 2");
        assert_eq!(lines[1]["type"], "store_event");
        assert_eq!(lines[1]["event"], "slot_status_changed");
        assert_eq!(lines[1]["to"], "occupied");
        assert_eq!(lines[2]["code"], "not_found");
        assert!(lines.iter().all(|l| l["session_id"] == "abc"));
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        Transcript::new(&path, "one").unwrap().session_start(8).unwrap();
        Transcript::new(&path, "one").unwrap().session_end(0).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
