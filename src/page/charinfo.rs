use crate::{
    board::{Board, Element, Layout},
    error::PageError,
    fetch::{Endpoint, Snapshot},
    normalize::{Decode, Node},
    render::{encode_component, esc, group_thousands},
};

use super::{root, Page, Query};

const CHARS_DIR: &str = "jsons/chars/";
const INVENTORY_SLOTS: usize = 40;

/// Item categories in display order, with their card titles.
const CATEGORIES: [(&str, &str); 11] = [
    ("unique_set", "Unique / Set"),
    ("runes", "Runes"),
    ("amulets", "Amulets"),
    ("rings", "Rings"),
    ("belts", "Belts"),
    ("charms_grand", "Grand Charms"),
    ("charms_large", "Large Charms"),
    ("charms_small", "Small Charms"),
    ("weapons", "Weapons"),
    ("armors", "Armor (incl. Shields/Helms)"),
    ("other", "Other Items"),
];

/// Full sheet of a single character, selected with `name=`.
pub struct CharInfo;

/// The name is a single encoded path segment, so it cannot leave
/// `CHARS_DIR` or add a query.
fn char_path(name: &str) -> String {
    format!("{CHARS_DIR}{}.json", encode_component(&name.to_lowercase()))
}

struct CharItem {
    name: String,
    kind: String,
    properties: Vec<String>,
}

impl Decode for CharItem {
    fn decode(node: Node<'_>) -> Self {
        let name = match node.str() {
            Some(name) => name.to_string(),
            None => node.get("name").text_or(""),
        };
        let mut properties = node.get("properties");
        if properties.len() == 0 {
            properties = node.get("decoded_properties");
        }
        Self {
            name,
            kind: node.get("type").text_or(""),
            properties: properties
                .items()
                .filter_map(|p| p.str().filter(|s| !s.is_empty()).map(str::to_string))
                .collect(),
        }
    }
}

/// Text colour of an item property, picked by keyword.
fn property_color(prop: &str) -> &'static str {
    let has = |keys: &[&str]| keys.iter().any(|k| prop.contains(k));
    if has(&["Faster Cast Rate", "Faster Run/Walk", "Faster Hit Recovery"]) {
        "#00ccff"
    } else if has(&["Resist", "Defense", "Life", "Mana"]) {
        "#00ff00"
    } else if has(&["Damage", "Skill Levels", "Attack Rating", "Find Item"]) {
        "#ffff00"
    } else if has(&["Magic Items"]) {
        "#ff9900"
    } else {
        "#fff"
    }
}

fn item_markup(item: &CharItem) -> String {
    let mut html = format!(
        r#"<li><span class="{} item-name">{}</span>"#,
        esc(&item.kind),
        esc(&item.name)
    );
    if !item.properties.is_empty() {
        html.push_str(r#"<ul class="properties-list">"#);
        for prop in &item.properties {
            html.push_str(&format!(
                r#"<li style="color: {};">{}</li>"#,
                property_color(prop),
                esc(prop)
            ));
        }
        html.push_str("</ul>");
    }
    html.push_str("</li>");
    html
}

fn category_cards(data: Node<'_>) -> Vec<Element> {
    CATEGORIES
        .iter()
        .filter_map(|(key, title)| {
            let items: Vec<CharItem> = data.get(key).decode_items();
            if items.is_empty() {
                return None;
            }
            let list: String = items.iter().map(item_markup).collect();
            Some(
                Element::block(format!(
                    r#"<h3>{} ({})</h3><ul class="item-list">{list}</ul>"#,
                    esc(title),
                    items.len()
                ))
                .with_class("details-card"),
            )
        })
        .collect()
}

fn stat(label: &str, value: &str) -> Element {
    Element::block(format!("<span>{}</span><span>{}</span>", esc(label), esc(value))).with_class("stat-item")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Life and mana are stored with fractions.
fn floored(node: Node<'_>) -> String {
    node.float()
        .filter(|f| f.is_finite())
        .map_or_else(|| "-".to_string(), |f| (f.floor() as i64).to_string())
}

fn details(data: Node<'_>, stats: Node<'_>) -> Vec<Element> {
    let money = |key| group_thousands(stats.get(key).int().unwrap_or(0));
    vec![
        stat("Account File", &data.get("charfile").text_or("-")),
        stat("Progression", &stats.get("progression").text_or("-")),
        stat("Experience", &money("experience")),
        stat("Gold (On Hand)", &money("gold")),
        stat("Gold (Stash)", &money("stashed_gold")),
    ]
}

fn attributes(stats: Node<'_>) -> Vec<Element> {
    vec![
        stat("Strength", &stats.get("strength").number_or_dash()),
        stat("Dexterity", &stats.get("dexterity").number_or_dash()),
        stat("Vitality", &stats.get("vitality").number_or_dash()),
        stat("Energy", &stats.get("energy").number_or_dash()),
        stat(
            "Life / Mana",
            &format!(
                "{} / {}",
                floored(stats.get("current_hp")),
                floored(stats.get("current_mana"))
            ),
        ),
        stat("Unused Stats", &stats.get("unused_stats").number_or_dash()).with_class("stat-item unused"),
        stat("Unused Skills", &stats.get("unused_skills").number_or_dash()).with_class("stat-item unused"),
    ]
}

impl Page for CharInfo {
    fn name(&self) -> &'static str {
        "charinfo"
    }

    fn endpoints(&self, query: &Query) -> Result<Vec<Endpoint>, PageError> {
        let name = query.get("name").ok_or(PageError::MissingParam { param: "name" })?;
        Ok(vec![Endpoint::new(char_path(name))])
    }

    fn board(&self) -> Board {
        Board::new()
            .with("char-name", Layout::Label)
            .with("char-summary", Layout::Label)
            .with("char-details", Layout::Block)
            .with("attributes", Layout::Block)
            .with("categorized-items-list", Layout::Block)
            .with("inventory-grid", Layout::Block)
    }

    fn primary(&self) -> &'static str {
        "char-name"
    }

    fn render(&self, snapshots: &[Snapshot], query: &Query, board: &mut Board) -> Result<(), PageError> {
        let requested = query.get("name").ok_or(PageError::MissingParam { param: "name" })?;
        let data = root(snapshots, 0);
        if data.is_missing() {
            return Err(PageError::MissingCollection {
                path: char_path(requested),
            });
        }

        let stats = data.get("char_stats");
        board.set_label("char-name", &data.get("charname").text_or(requested));
        board.set_label(
            "char-summary",
            &format!(
                "Account: {} | Class: {} | Level: {} | HC: {} | Ladder: {}",
                data.get("account").text_or("N/A"),
                stats.get("class").text_or("N/A"),
                stats.get("level").text_or("N/A"),
                yes_no(stats.get("is_hardcore").flag()),
                yes_no(stats.get("is_ladder").flag()),
            ),
        );
        board.replace("char-details", details(data, stats));
        board.replace("attributes", attributes(stats));
        board.replace("categorized-items-list", category_cards(data));
        board.replace(
            "inventory-grid",
            (0..INVENTORY_SLOTS).map(|_| Element::block("").with_class("slot")).collect(),
        );
        Ok(())
    }
}
