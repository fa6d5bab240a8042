use crate::{
    board::{Board, Element, Layout},
    error::PageError,
    fetch::{Endpoint, Snapshot},
    normalize::{timestamp, Decode, Node},
    render::{char_link, esc, placeholder_row},
};

use super::{root, Page, Query};

const LOCATIONS_JSON: &str = "/data/char_locations.json";

/// Where every character currently is.
pub struct Locations;

struct CharLocation {
    name: String,
    location: String,
    area_id: Option<i64>,
}

impl Decode for CharLocation {
    fn decode(node: Node<'_>) -> Self {
        Self {
            name: node.get("charname").text_or("-"),
            location: node.get("location").text_or("N/A"),
            area_id: node.get("area_id").int().filter(|id| *id != 0),
        }
    }
}

impl CharLocation {
    /// Area 0 is offline and 1 is the lobby.
    fn status_class(&self) -> &'static str {
        match self.area_id {
            Some(id) if id > 1 => "status-online",
            _ => "status-offline",
        }
    }

    fn element(&self) -> Element {
        let area = self.area_id.map_or_else(|| "N/A".to_string(), |id| id.to_string());
        Element::row(format!(
            r#"<td>{}</td><td class="{}">{}</td><td>{area}</td>"#,
            char_link(&self.name),
            self.status_class(),
            esc(&self.location)
        ))
        .searchable(&format!("{} {}", self.name, self.location))
    }
}

impl Page for Locations {
    fn name(&self) -> &'static str {
        "locations"
    }

    fn endpoints(&self, _query: &Query) -> Result<Vec<Endpoint>, PageError> {
        Ok(vec![Endpoint::new(LOCATIONS_JSON)])
    }

    fn board(&self) -> Board {
        Board::new()
            .with("last-updated", Layout::Label)
            .with("total-chars", Layout::Label)
            .with(
                "location-table",
                Layout::Table {
                    headers: vec!["Char Name", "Current Location", "Area ID"],
                },
            )
    }

    fn searchable(&self) -> &'static [&'static str] {
        &["location-table"]
    }

    fn primary(&self) -> &'static str {
        "location-table"
    }

    fn render(&self, snapshots: &[Snapshot], _query: &Query, board: &mut Board) -> Result<(), PageError> {
        let data = root(snapshots, 0);
        let rows = data.get("rows");
        if !rows.is_array() {
            return Err(PageError::MissingCollection {
                path: LOCATIONS_JSON.to_string(),
            });
        }

        let chars: Vec<CharLocation> = rows.decode_items();
        board.set_label(
            "last-updated",
            &timestamp(data.get("generated")).unwrap_or_else(|| "N/A".to_string()),
        );
        board.set_label("total-chars", &chars.len().to_string());

        let elements = if chars.is_empty() {
            vec![Element::row(placeholder_row(3, "No character location data found."))]
        } else {
            chars.iter().map(CharLocation::element).collect()
        };
        board.replace("location-table", elements);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(value: serde_json::Value) -> Result<Board, PageError> {
        let mut board = Locations.board();
        Locations.render(&[Snapshot::new(LOCATIONS_JSON, value)], &Query::default(), &mut board)?;
        Ok(board)
    }

    #[test]
    fn online_when_past_the_lobby() {
        let board = render(json!({
            "generated": 1_700_000_000,
            "rows": [
                { "charname": "Sorsi", "location": "Act 5 - Worldstone Chamber", "area_id": 132 },
                { "charname": "Idle", "location": "Lobby", "area_id": 1 },
                { "charname": "Gone" }
            ]
        }))
        .unwrap();
        let rows = board.container("location-table").unwrap().elements();
        assert_eq!(
            rows[0].inner(),
            r#"<td><a href="charinfo.html?name=sorsi" target="_blank">Sorsi</a></td><td class="status-online">Act 5 - Worldstone Chamber</td><td>132</td>"#
        );
        assert!(rows[1].inner().contains(r#"class="status-offline">Lobby"#));
        assert!(rows[2].inner().ends_with(r#"<td class="status-offline">N/A</td><td>N/A</td>"#));
        assert_eq!(rows[1].search(), Some("idle lobby"));
        assert_eq!(board.label("last-updated"), Some("2023-11-14 22:13:20 UTC"));
        assert_eq!(board.label("total-chars"), Some("3"));
    }

    #[test]
    fn missing_rows_is_an_error() {
        assert_eq!(
            render(json!({})).unwrap_err(),
            PageError::MissingCollection {
                path: LOCATIONS_JSON.to_string()
            }
        );
    }

    #[test]
    fn empty_rows_render_a_placeholder() {
        let board = render(json!({ "rows": [] })).unwrap();
        assert!(board.to_html().contains("No character location data found."));
    }
}
