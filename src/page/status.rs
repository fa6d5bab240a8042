use crate::{
    board::{Board, Element, Layout},
    error::PageError,
    fetch::{Endpoint, Snapshot},
    normalize::{Decode, Node},
    render::{card, esc, placeholder_row},
};

use super::{root, Page, Query};

const STATUS_JSON: &str = "jsons/server_status.json";

/// Live server status, totals, active games and logged-in users.
pub struct ServerStatus;

struct ActiveGame {
    platform: String,
    name: String,
    players: u64,
}

impl Decode for ActiveGame {
    fn decode(node: Node<'_>) -> Self {
        Self {
            platform: node.get("platform_name").text_or("-"),
            name: node.get("name").text_or("-"),
            players: node.get("players").count(),
        }
    }
}

struct ActiveUser {
    username: String,
    platform: String,
    region: String,
    version: String,
}

impl Decode for ActiveUser {
    fn decode(node: Node<'_>) -> Self {
        Self {
            username: node.get("username").text_or("-"),
            platform: node.get("platform_name").text_or("-"),
            region: node.get("region").text_or("-"),
            version: node.get("version").text_or("-"),
        }
    }
}

fn is_empty_object(node: Node<'_>) -> bool {
    node.entries().next().is_none()
}

fn card_element(title: &str, value: &str) -> Element {
    Element::block(card(title, &esc(value).to_string(), "card-value")).with_class("card")
}

fn live_status(status: Node<'_>) -> Vec<Element> {
    if is_empty_object(status) {
        return vec![card_element("Status", "No data")];
    }
    vec![
        card_element("Online Users", &status.get("users").count().to_string()),
        card_element("Active Games", &status.get("games").count().to_string()),
        card_element("Total Accounts", &status.get("useraccounts").text_or("N/A")),
        card_element("Version", &status.get("version").text_or("N/A")),
        card_element("Uptime", &status.get("uptime").text_or("N/A")),
    ]
}

fn total_stats(meta: Node<'_>) -> Vec<Element> {
    if is_empty_object(meta) {
        return vec![Element::new("p", "No overall statistics (games.txt).")];
    }
    let contact = format!(
        "{} ({})",
        meta.get("contactname").text_or("N/A"),
        meta.get("contactemail").text_or("N/A")
    );
    let link = format!(
        r#"<a href="{}">{}</a>"#,
        esc(&meta.get("url").text_or("#")),
        esc(&meta.get("url").text_or("N/A"))
    );
    vec![
        card_element("Total Games", &meta.get("totalgames").count().to_string()),
        card_element("Total Logins", &meta.get("logins").count().to_string()),
        card_element("Location", &meta.get("location").text_or("N/A")),
        card_element("Contact", &contact),
        Element::block(card("URL", &link, "card-value")).with_class("card"),
    ]
}

fn game_rows(games: &[ActiveGame]) -> Vec<Element> {
    if games.is_empty() {
        return vec![Element::row(placeholder_row(3, "No active games at the moment."))];
    }
    games
        .iter()
        .map(|g| {
            Element::row(format!(
                "<td>{}</td><td>{}</td><td>{}</td>",
                esc(&g.platform),
                esc(&g.name),
                g.players
            ))
            .searchable(&format!("{} {}", g.platform, g.name))
        })
        .collect()
}

fn user_rows(users: &[ActiveUser]) -> Vec<Element> {
    if users.is_empty() {
        return vec![Element::row(placeholder_row(4, "No users logged in at the moment."))];
    }
    users
        .iter()
        .map(|u| {
            Element::row(format!(
                "<td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
                esc(&u.username),
                esc(&u.platform),
                esc(&u.region),
                esc(&u.version)
            ))
            .searchable(&format!("{} {} {}", u.username, u.platform, u.region))
        })
        .collect()
}

impl Page for ServerStatus {
    fn name(&self) -> &'static str {
        "status"
    }

    fn endpoints(&self, _query: &Query) -> Result<Vec<Endpoint>, PageError> {
        Ok(vec![Endpoint::new(STATUS_JSON)])
    }

    fn board(&self) -> Board {
        Board::new()
            .with("live-status", Layout::Block)
            .with("total-stats", Layout::Block)
            .with("active-games-count", Layout::Label)
            .with(
                "active-games",
                Layout::Table {
                    headers: vec!["Platform", "Game", "Players"],
                },
            )
            .with("active-users-count", Layout::Label)
            .with(
                "active-users",
                Layout::Table {
                    headers: vec!["User", "Platform", "Region", "Version"],
                },
            )
            .with("generated-time", Layout::Label)
    }

    fn searchable(&self) -> &'static [&'static str] {
        &["active-games", "active-users"]
    }

    fn primary(&self) -> &'static str {
        "live-status"
    }

    fn render(&self, snapshots: &[Snapshot], _query: &Query, board: &mut Board) -> Result<(), PageError> {
        let data = root(snapshots, 0);
        if data.is_missing() {
            return Err(PageError::MissingCollection {
                path: STATUS_JSON.to_string(),
            });
        }

        board.replace("live-status", live_status(data.get("active_status")));
        board.replace("total-stats", total_stats(data.get("total_stats")));

        let games: Vec<ActiveGame> = data.get("active_games").decode_items();
        board.set_label("active-games-count", &games.len().to_string());
        board.replace("active-games", game_rows(&games));

        let users: Vec<ActiveUser> = data.get("active_users").decode_items();
        board.set_label("active-users-count", &users.len().to_string());
        board.replace("active-users", user_rows(&users));

        board.set_label("generated-time", &data.get("generated_at").text_or("N/A"));
        Ok(())
    }
}
