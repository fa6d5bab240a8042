use crate::{
    board::{Board, Element, Layout},
    error::PageError,
    fetch::{Endpoint, Snapshot},
    normalize::{timestamp, Decode, Node},
    render::{char_link, esc, placeholder_row},
};

use super::{root, Page, Query};

const ALL_ITEMS_JSON: &str = "/data/all_items.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    /// One table row per character.
    Table,
    /// One char-block card per character.
    Blocks,
    /// Table with an extra rings/amulets/belts column.
    Gear,
}

/// Reports over the all-characters item dump.
pub struct ItemReport {
    style: Style,
}

impl ItemReport {
    pub fn table() -> Self {
        Self { style: Style::Table }
    }

    pub fn blocks() -> Self {
        Self { style: Style::Blocks }
    }

    pub fn gear() -> Self {
        Self { style: Style::Gear }
    }

    fn container(&self) -> &'static str {
        match self.style {
            Style::Table | Style::Gear => "item-report-table",
            Style::Blocks => "report-list",
        }
    }
}

/// An item is either a bare name or `{name, properties}`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Item {
    name: String,
    properties: Vec<String>,
}

impl Decode for Item {
    fn decode(node: Node<'_>) -> Self {
        let name = match node.str() {
            Some(name) => name.to_string(),
            None => node.get("name").text_or(""),
        };
        let properties = node
            .get("properties")
            .items()
            .filter_map(|p| p.str().map(str::to_string))
            .collect();
        Self { name, properties }
    }
}

struct Character {
    name: String,
    account: String,
    level: String,
    class: String,
    unique_set: Vec<Item>,
    runes: Vec<Item>,
    charms: Vec<Item>,
    /// Rings, amulets and belts.
    jewelry: Vec<Item>,
}

fn named_items(node: Node<'_>) -> Vec<Item> {
    node.decode_items::<Item>()
        .into_iter()
        .filter(|i| !i.name.is_empty())
        .collect()
}

impl Decode for Character {
    fn decode(node: Node<'_>) -> Self {
        let jewelry = ["rings", "amulets", "belts"]
            .into_iter()
            .flat_map(|key| named_items(node.get(key)))
            .collect();
        Self {
            name: node.get("charname").text_or("-"),
            account: node.get("account").text_or("-"),
            level: node.get("level").text_or("N/A"),
            class: node.get("class").text_or("-"),
            unique_set: named_items(node.get("unique_set")),
            runes: named_items(node.get("runes")),
            charms: named_items(node.get("charms")),
            jewelry,
        }
    }
}

impl Character {
    /// Name, account, class, optionally the level, then every item name
    /// and every property of the main categories.
    fn search_text(&self, with_level: bool) -> String {
        let mut words = vec![self.name.as_str(), self.account.as_str(), self.class.as_str()];
        if with_level {
            words.push(&self.level);
        }
        let items = || self.unique_set.iter().chain(&self.runes).chain(&self.charms);
        words.extend(items().map(|i| i.name.as_str()));
        words.extend(items().flat_map(|i| i.properties.iter().map(String::as_str)));
        words.join(" ")
    }
}

fn property_list(item: &Item, prefix: &str) -> String {
    if item.properties.is_empty() {
        return String::new();
    }
    let props: String = item
        .properties
        .iter()
        .map(|p| format!("<li>{prefix}{}</li>", esc(p)))
        .collect();
    format!(r#"<ul class="item-properties-list">{props}</ul>"#)
}

/// A table cell listing items; an em dash when there are none.
fn item_cell(items: &[Item], prefix: &str) -> String {
    if items.is_empty() {
        return "—".to_string();
    }
    items
        .iter()
        .map(|i| {
            format!(
                r#"<div class="item-cell-content"><h4>{}</h4>{}</div>"#,
                esc(&i.name),
                property_list(i, prefix)
            )
        })
        .collect()
}

impl ItemReport {
    fn row(&self, c: &Character) -> Element {
        let prefix = if self.style == Style::Gear { "- " } else { "" };
        let mut inner = format!(
            "<td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            char_link(&c.name),
            esc(&c.account),
            esc(&c.level),
            esc(&c.class)
        );
        for items in [&c.unique_set, &c.runes, &c.charms] {
            inner.push_str(&format!(r#"<td class="item-list-cell">{}</td>"#, item_cell(items, prefix)));
        }
        if self.style == Style::Gear {
            inner.push_str(&format!(
                r#"<td class="item-list-cell">{}</td>"#,
                item_cell(&c.jewelry, prefix)
            ));
            return Element::row(inner);
        }
        Element::row(inner).searchable(&c.search_text(false))
    }

    fn block(&self, c: &Character) -> Element {
        let items: String = c
            .unique_set
            .iter()
            .chain(&c.charms)
            .chain(&c.runes)
            .map(|i| format!(r#"<li class="item-entry"><h4>{}</h4>{}</li>"#, esc(&i.name), property_list(i, "")))
            .collect();
        Element::block(format!(
            r#"<div class="char-header"><h3>{}</h3><p>Lvl: {} | Class: {} | Account: {}</p></div><ul class="item-list">{items}</ul>"#,
            char_link(&c.name),
            esc(&c.level),
            esc(&c.class),
            esc(&c.account)
        ))
        .with_class("char-block")
        .searchable(&c.search_text(true))
    }

    fn empty(&self) -> Element {
        match self.style {
            Style::Table => Element::row(placeholder_row(7, "No characters found in the Item Report.")),
            Style::Gear => Element::row(placeholder_row(8, "No characters found in the Item Report.")),
            Style::Blocks => Element::new("p", "No characters found."),
        }
    }
}

impl Page for ItemReport {
    fn name(&self) -> &'static str {
        match self.style {
            Style::Table => "items",
            Style::Blocks => "attributes",
            Style::Gear => "gear",
        }
    }

    fn endpoints(&self, _query: &Query) -> Result<Vec<Endpoint>, PageError> {
        Ok(vec![Endpoint::new(ALL_ITEMS_JSON)])
    }

    fn board(&self) -> Board {
        let board = Board::new()
            .with("last-updated", Layout::Label)
            .with("total-chars", Layout::Label);
        let mut headers = vec![
            "Char Name",
            "Account",
            "Lvl",
            "Class",
            "Unique/Set Items",
            "Runes",
            "Charms",
        ];
        match self.style {
            Style::Blocks => board.with(self.container(), Layout::Block),
            Style::Table => board.with(self.container(), Layout::Table { headers }),
            Style::Gear => {
                headers.push("Rings/Amulets/Belts");
                board.with(self.container(), Layout::Table { headers })
            }
        }
    }

    fn searchable(&self) -> &'static [&'static str] {
        match self.style {
            Style::Table => &["item-report-table"],
            Style::Blocks => &["report-list"],
            Style::Gear => &[],
        }
    }

    fn primary(&self) -> &'static str {
        self.container()
    }

    fn render(&self, snapshots: &[Snapshot], _query: &Query, board: &mut Board) -> Result<(), PageError> {
        let data = root(snapshots, 0);
        let rows = data.get("rows");
        if !rows.is_array() {
            return Err(PageError::MissingCollection {
                path: ALL_ITEMS_JSON.to_string(),
            });
        }

        let characters: Vec<Character> = rows.decode_items();
        board.set_label(
            "last-updated",
            &timestamp(data.get("generated")).unwrap_or_else(|| "N/A".to_string()),
        );
        board.set_label("total-chars", &characters.len().to_string());

        let elements = if characters.is_empty() {
            vec![self.empty()]
        } else {
            characters
                .iter()
                .map(|c| match self.style {
                    Style::Blocks => self.block(c),
                    Style::Table | Style::Gear => self.row(c),
                })
                .collect()
        };
        board.replace(self.container(), elements);
        Ok(())
    }
}
