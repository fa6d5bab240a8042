use crate::{
    board::{Board, Layout},
    error::PageError,
    fetch::{Endpoint, Snapshot},
    normalize::clock,
};

use super::{root, Page, Query};

const D2GS_LATEST_JSON: &str = "data/d2gs_status_latest.json";

/// Game server uptime, as reported by the status parser.
pub struct Uptime;

impl Page for Uptime {
    fn name(&self) -> &'static str {
        "uptime"
    }

    fn endpoints(&self, _query: &Query) -> Result<Vec<Endpoint>, PageError> {
        Ok(vec![Endpoint::new(D2GS_LATEST_JSON)])
    }

    fn board(&self) -> Board {
        Board::new().with("d2gs-uptime", Layout::Label)
    }

    fn primary(&self) -> &'static str {
        "d2gs-uptime"
    }

    fn render(&self, snapshots: &[Snapshot], _query: &Query, board: &mut Board) -> Result<(), PageError> {
        let data = root(snapshots, 0);
        let uptime = data.path(&["data", "uptime"]);
        let text = if data.is_missing() {
            "Offline".to_string()
        } else if data.get("status").str() == Some("success") && uptime.flag() {
            clock(uptime.get("uptime_seconds").float()).unwrap_or_else(|| "N/A".to_string())
        } else {
            "Error/Offline".to_string()
        };
        board.set_label("d2gs-uptime", &text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn render(value: Value) -> String {
        let mut board = Uptime.board();
        Uptime
            .render(&[Snapshot::new(D2GS_LATEST_JSON, value)], &Query::default(), &mut board)
            .unwrap();
        board.label("d2gs-uptime").unwrap_or_default().to_string()
    }

    #[test]
    fn success_shows_clock() {
        let value = json!({ "status": "success", "data": { "uptime": { "uptime_seconds": 90061 } } });
        assert_eq!(render(value), "1d 1h 1m 1s");
    }

    #[test]
    fn wrong_shape_and_missing() {
        assert_eq!(render(json!({ "status": "error" })), "Error/Offline");
        assert_eq!(render(json!({ "status": "success", "data": {} })), "Error/Offline");
        assert_eq!(render(Value::Null), "Offline");
    }

    #[test]
    fn unreadable_seconds() {
        let value = json!({ "status": "success", "data": { "uptime": { "started": "x" } } });
        assert_eq!(render(value), "N/A");
    }
}
