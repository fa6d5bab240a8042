use crate::{
    board::{Board, Element, Layout},
    error::PageError,
    fetch::{Endpoint, Snapshot},
    normalize::{Decode, Node},
    render::{esc, placeholder_row},
};

use super::{root, Page, Query};

const RUNEWORDS_JSON: &str = "runewords.json";

/// Runeword catalog against the runes on hand, plus a per-rune owner index.
/// `craftable=1` keeps only runewords that can be built now.
pub struct Runewords;

struct Runeword {
    name: String,
    can_build: bool,
    /// Rune name and the characters holding it.
    used: Vec<(String, Vec<String>)>,
    missing: Vec<String>,
}

fn strings(node: Node<'_>) -> Vec<String> {
    node.items().map(|n| n.text_or("-")).collect()
}

impl Decode for Runeword {
    fn decode(node: Node<'_>) -> Self {
        Self {
            name: node.get("name").text_or("-"),
            can_build: node.get("can_build").flag(),
            used: node
                .get("used")
                .entries()
                .map(|(rune, owners)| (rune.to_string(), strings(owners)))
                .collect(),
            missing: strings(node.get("missing")),
        }
    }
}

impl Runeword {
    fn element(&self) -> Element {
        let used = self
            .used
            .iter()
            .map(|(rune, owners)| {
                let owners: Vec<String> = owners.iter().map(|o| esc(o).to_string()).collect();
                format!("<b>{}</b><br><small>{}</small>", esc(rune), owners.join(", "))
            })
            .collect::<Vec<_>>()
            .join("<hr>");
        let missing = self
            .missing
            .iter()
            .map(|m| esc(m).to_string())
            .collect::<Vec<_>>()
            .join("<br>");
        let (class, state) = if self.can_build { ("ok", "OK") } else { ("bad", "MISSING") };
        Element::row(format!(
            "<td>{}</td><td>{state}</td><td>{}</td><td>{}</td>",
            esc(&self.name),
            or_dash(used),
            or_dash(missing)
        ))
        .with_class(class)
        .searchable(&self.name)
    }
}

fn or_dash(markup: String) -> String {
    if markup.is_empty() {
        "-".to_string()
    } else {
        markup
    }
}

struct RuneOwner {
    account: String,
    character: String,
    count: u64,
}

impl Decode for RuneOwner {
    fn decode(node: Node<'_>) -> Self {
        Self {
            account: node.get("account").text_or("-"),
            character: node.get("char").text_or("-"),
            count: node.get("count").count(),
        }
    }
}

fn rune_box(rune: &str, owners: Node<'_>) -> Element {
    let lines = owners
        .decode_items::<RuneOwner>()
        .iter()
        .map(|o| format!("{} / {} – {}x", esc(&o.account), esc(&o.character), o.count))
        .collect::<Vec<_>>()
        .join("<br>");
    Element::block(format!("<h3>{}</h3>{lines}", esc(rune)))
        .with_class("runeBox")
        .searchable(rune)
}

impl Page for Runewords {
    fn name(&self) -> &'static str {
        "runewords"
    }

    fn endpoints(&self, _query: &Query) -> Result<Vec<Endpoint>, PageError> {
        Ok(vec![Endpoint::new(RUNEWORDS_JSON)])
    }

    fn board(&self) -> Board {
        Board::new()
            .with(
                "runeword-table",
                Layout::Table {
                    headers: vec!["Runeword", "Status", "Used Runes", "Missing"],
                },
            )
            .with("rune-index", Layout::Block)
    }

    fn searchable(&self) -> &'static [&'static str] {
        &["runeword-table", "rune-index"]
    }

    fn primary(&self) -> &'static str {
        "runeword-table"
    }

    fn render(&self, snapshots: &[Snapshot], query: &Query, board: &mut Board) -> Result<(), PageError> {
        let data = root(snapshots, 0);
        let catalog = data.get("runewords");
        if !catalog.is_array() {
            return Err(PageError::MissingCollection {
                path: RUNEWORDS_JSON.to_string(),
            });
        }

        let craftable_only = query.flag("craftable");
        let rows: Vec<Element> = catalog
            .decode_items::<Runeword>()
            .iter()
            .filter(|rw| !craftable_only || rw.can_build)
            .map(Runeword::element)
            .collect();
        board.replace(
            "runeword-table",
            if rows.is_empty() {
                vec![Element::row(placeholder_row(4, "No runewords to show."))]
            } else {
                rows
            },
        );

        let boxes: Vec<Element> = data
            .get("rune_index")
            .entries()
            .map(|(rune, owners)| rune_box(rune, owners))
            .collect();
        board.replace(
            "rune-index",
            if boxes.is_empty() {
                vec![Element::new("p", "No runes indexed.")]
            } else {
                boxes
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "runewords": [
                { "name": "Enigma", "can_build": false, "used": { "Jah": ["acc1/Sorsi"] }, "missing": ["Ith", "Ber"] },
                { "name": "Spirit", "can_build": true, "used": { "Tal": ["acc1/Sorsi"], "Thul": ["acc2/Bob", "acc1/Sorsi"] }, "missing": [] }
            ],
            "rune_index": {
                "Jah": [{ "account": "acc1", "char": "Sorsi", "count": 2 }],
                "Tal": [{ "account": "acc1", "char": "Sorsi", "count": 1 }, { "account": "acc2", "char": "Bob", "count": 3 }]
            }
        })
    }

    fn render(query: &str) -> Board {
        let mut board = Runewords.board();
        Runewords
            .render(&[Snapshot::new(RUNEWORDS_JSON, sample())], &Query::parse(query), &mut board)
            .unwrap();
        board
    }

    #[test]
    fn catalog_rows() {
        let board = render("");
        let rows = board.container("runeword-table").unwrap().elements();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].inner(),
            "<td>Enigma</td><td>MISSING</td><td><b>Jah</b><br><small>acc1/Sorsi</small></td><td>Ith<br>Ber</td>"
        );
        assert_eq!(
            rows[1].inner(),
            "<td>Spirit</td><td>OK</td><td><b>Tal</b><br><small>acc1/Sorsi</small><hr><b>Thul</b><br><small>acc2/Bob, acc1/Sorsi</small></td><td>-</td>"
        );
        assert_eq!(rows[0].search(), Some("enigma"));
    }

    #[test]
    fn craftable_flag_filters() {
        let board = render("craftable=1");
        let rows = board.container("runeword-table").unwrap().elements();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].inner().starts_with("<td>Spirit</td>"));
    }

    #[test]
    fn rune_index_boxes() {
        let board = render("");
        let boxes = board.container("rune-index").unwrap().elements();
        assert_eq!(boxes.len(), 2);
        assert_eq!(
            boxes[1].inner(),
            "<h3>Tal</h3>acc1 / Sorsi – 1x<br>acc2 / Bob – 3x"
        );
        assert_eq!(boxes[1].search(), Some("tal"));
    }

    #[test]
    fn missing_catalog_is_an_error() {
        let mut board = Runewords.board();
        let err = Runewords
            .render(&[Snapshot::new(RUNEWORDS_JSON, json!({}))], &Query::default(), &mut board)
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: Could not load data from runewords.json");
    }
}
