use crate::{
    board::{Board, Element, Layout},
    error::PageError,
    fetch::{Endpoint, Snapshot},
    normalize::{Decode, Node},
    render::{esc, placeholder_row},
};

use super::{root, Page, Query};

const RUNE_INVENTORY_JSON: &str = "jsons/rune_inventory.json";

/// Runes owned across all characters.
pub struct RuneInventory;

struct Rune {
    name: String,
    total: u64,
    stats: String,
    /// `(character, count)`, most runes first.
    holders: Vec<(String, u64)>,
}

impl Decode for Rune {
    fn decode(node: Node<'_>) -> Self {
        let mut holders: Vec<(String, u64)> = node
            .get("holders")
            .entries()
            .map(|(name, count)| (name.to_string(), count.count()))
            .collect();
        holders.sort_by(|a, b| b.1.cmp(&a.1));
        Self {
            name: node.get("name").text_or("-"),
            total: node.get("total_count").count(),
            stats: node.get("stats").text_or(""),
            holders,
        }
    }
}

impl Rune {
    fn element(&self) -> Element {
        let holders: String = self
            .holders
            .iter()
            .map(|(name, count)| {
                format!(
                    r#"<span class="char-name">{}</span>: <span class="char-count">{count}x</span><br>"#,
                    esc(name)
                )
            })
            .collect();
        let mut search = self.name.clone();
        for (name, _) in &self.holders {
            search.push(' ');
            search.push_str(name);
        }
        Element::row(format!(
            r#"<td class="rune-name">{}</td><td class="rune-count">{}</td><td class="rune-stats">{}</td><td class="char-list">{holders}</td>"#,
            esc(&self.name),
            self.total,
            esc(&self.stats)
        ))
        .searchable(&search)
    }
}

impl Page for RuneInventory {
    fn name(&self) -> &'static str {
        "runes"
    }

    fn endpoints(&self, _query: &Query) -> Result<Vec<Endpoint>, PageError> {
        Ok(vec![Endpoint::new(RUNE_INVENTORY_JSON)])
    }

    fn board(&self) -> Board {
        Board::new().with(
            "rune-table",
            Layout::Table {
                headers: vec!["Rune", "Total", "Stats", "Held By"],
            },
        )
    }

    fn searchable(&self) -> &'static [&'static str] {
        &["rune-table"]
    }

    fn primary(&self) -> &'static str {
        "rune-table"
    }

    fn render(&self, snapshots: &[Snapshot], _query: &Query, board: &mut Board) -> Result<(), PageError> {
        let data = root(snapshots, 0);
        let list = if data.is_array() { data } else { data.get("runes") };
        if !list.is_array() {
            return Err(PageError::MissingCollection {
                path: RUNE_INVENTORY_JSON.to_string(),
            });
        }

        let runes: Vec<Rune> = list.decode_items();
        let elements = if runes.is_empty() {
            vec![Element::row(placeholder_row(4, "No runes found."))]
        } else {
            runes.iter().map(Rune::element).collect()
        };
        board.replace("rune-table", elements);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(value: serde_json::Value) -> Result<Board, PageError> {
        let mut board = RuneInventory.board();
        RuneInventory.render(&[Snapshot::new(RUNE_INVENTORY_JSON, value)], &Query::default(), &mut board)?;
        Ok(board)
    }

    #[test]
    fn holders_sorted_by_count() {
        let board = render(json!([
            { "name": "Ber", "total_count": 3, "stats": "+20% Chance of Crushing Blow", "holders": { "Abc": 1, "Xyz": 2 } }
        ]))
        .unwrap();
        let rows = board.container("rune-table").unwrap().elements();
        assert_eq!(rows.len(), 1);
        let inner = rows[0].inner();
        let xyz = inner.find("Xyz</span>: <span class=\"char-count\">2x").unwrap();
        let abc = inner.find("Abc</span>: <span class=\"char-count\">1x").unwrap();
        assert!(xyz < abc);
        assert!(inner.starts_with(r#"<td class="rune-name">Ber</td><td class="rune-count">3</td>"#));
        assert_eq!(rows[0].search(), Some("ber xyz abc"));
    }

    #[test]
    fn wrapped_list_is_accepted() {
        let board = render(json!({ "runes": [{ "name": "Jah" }] })).unwrap();
        let rows = board.container("rune-table").unwrap().elements();
        assert_eq!(
            rows[0].inner(),
            r#"<td class="rune-name">Jah</td><td class="rune-count">0</td><td class="rune-stats"></td><td class="char-list"></td>"#
        );
    }

    #[test]
    fn empty_and_missing() {
        let board = render(json!([])).unwrap();
        assert!(board.to_html().contains("No runes found."));
        assert!(render(serde_json::Value::Null).is_err());
    }
}
