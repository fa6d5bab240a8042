use serde_json::json;

use crate::{
    board::{Board, Element, Layout},
    error::PageError,
    fetch::{Endpoint, Snapshot},
    normalize::{Decode, Node},
    render::{esc, placeholder_row, win_loss_ratio},
};

use super::{connection_state, root, Page, Query};

const LADDER_JSON: &str = "jsons/multi_ladder.json";
const HISTORY_JSON: &str = "jsons/game_history.json";

/// Game server status shown above the Warcraft III ladder.
struct GameServer {
    uptime_json: &'static str,
    status_json: &'static str,
    uptime_label: &'static str,
    running_label: &'static str,
    users_label: &'static str,
    /// `(service key in the status file, label id)`.
    links: [(&'static str, &'static str); 2],
}

/// Ladder standings and game history of one Battle.net product.
pub struct Ladder {
    name: &'static str,
    title: &'static str,
    platform_tag: &'static str,
    ladder_tag: &'static str,
    ladder_id: &'static str,
    history_id: &'static str,
    searchable: &'static [&'static str],
    server: Option<GameServer>,
}

impl Ladder {
    pub fn starcraft() -> Self {
        Self {
            name: "scbw",
            title: "StarCraft",
            platform_tag: "SEXP",
            ladder_tag: "SEXP_NML",
            ladder_id: "scbw-ladder-table",
            history_id: "scbw-history-table",
            searchable: &["scbw-ladder-table", "scbw-history-table"],
            server: None,
        }
    }

    pub fn warcraft3() -> Self {
        Self {
            name: "w3tft",
            title: "Warcraft III",
            platform_tag: "W3XP",
            ladder_tag: "W3XP_NML",
            ladder_id: "w3tft-ladder-table",
            history_id: "w3tft-history-table",
            searchable: &["w3tft-ladder-table", "w3tft-history-table"],
            server: Some(GameServer {
                uptime_json: "jsons/w3gs_uptime_data.json",
                status_json: "jsons/w3gs_status_data.json",
                uptime_label: "w3gs-uptime-value",
                running_label: "w3gs-running-games",
                users_label: "w3gs-users-in-game",
                links: [("w3cs", "w3gs-w3cs"), ("w3dbs", "w3gs-w3dbs")],
            }),
        }
    }
}

struct LadderEntry {
    username: String,
    race: String,
    rating: String,
    wins: u64,
    losses: u64,
    draws: u64,
}

impl Decode for LadderEntry {
    fn decode(node: Node<'_>) -> Self {
        Self {
            username: node.get("username").text_or("-"),
            race: node.get("race").text_or("N/A"),
            rating: node.get("rating").text_or("N/A"),
            wins: node.get("wins").count(),
            losses: node.get("losses").count(),
            draws: node.get("draws").count(),
        }
    }
}

impl LadderEntry {
    fn record(&self) -> String {
        let mut wld = format!("{} / {}", self.wins, self.losses);
        if self.draws > 0 {
            wld.push_str(&format!(" / {}", self.draws));
        }
        wld
    }
}

struct HistoryEntry {
    platform_tag: String,
    name: String,
    id: String,
    result: String,
    player: String,
    race: String,
    units_killed: String,
    units_lost: String,
    duration: String,
    ended: String,
}

impl Decode for HistoryEntry {
    fn decode(node: Node<'_>) -> Self {
        Self {
            platform_tag: node.get("platform_tag").text_or(""),
            name: node.get("name").text_or("-"),
            id: node.get("id").text_or("-"),
            result: node.get("result").text_or("-"),
            player: node.get("player_name").text_or("-"),
            race: node.get("race").text_or("-"),
            units_killed: node.get("units_killed").text_or("N/A"),
            units_lost: node.get("units_lost").text_or("N/A"),
            duration: node.get("duration_minutes").text_or("N/A"),
            ended: node.get("ended_time").text_or("N/A"),
        }
    }
}

impl Ladder {
    fn ladder_rows(&self, ladder: Node<'_>) -> Vec<Element> {
        let players: Vec<LadderEntry> = ladder
            .path(&["platform_ladders", self.ladder_tag])
            .decode_items();
        if players.is_empty() {
            let message = format!("No active W/L statistics found for {}.", self.title);
            return vec![Element::row(placeholder_row(7, &message))];
        }
        players
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Element::row(format!(
                    "<td>{}</td><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
                    i + 1,
                    esc(&p.username),
                    esc(&p.race),
                    esc(&p.rating),
                    p.record(),
                    p.wins + p.losses + p.draws,
                    win_loss_ratio(p.wins, p.losses)
                ))
                .searchable(&format!("{} {}", p.username, p.race))
            })
            .collect()
    }

    fn history_rows(&self, history: Node<'_>) -> Vec<Element> {
        let games: Vec<HistoryEntry> = history
            .get("game_history")
            .decode_items::<HistoryEntry>()
            .into_iter()
            .filter(|g| g.platform_tag == self.platform_tag)
            .collect();
        if games.is_empty() {
            let message = format!("No game history found for {}.", self.title);
            return vec![Element::row(placeholder_row(6, &message))];
        }
        games
            .iter()
            .map(|g| {
                Element::row(format!(
                    r#"<td>{} (#{})</td><td><span class="{}">{}</span></td><td>{} / {}</td><td>{} / {}</td><td>{} min</td><td>{}</td>"#,
                    esc(&g.name),
                    esc(&g.id),
                    esc(&g.result.to_lowercase()),
                    esc(&g.result),
                    esc(&g.player),
                    esc(&g.race),
                    esc(&g.units_killed),
                    esc(&g.units_lost),
                    esc(&g.duration),
                    esc(&g.ended)
                ))
                .searchable(&format!("{} {} {} {}", g.name, g.result, g.player, g.race))
            })
            .collect()
    }

    fn render_server(&self, server: &GameServer, uptime: Node<'_>, status: Node<'_>, board: &mut Board) {
        board.set_label(
            server.uptime_label,
            &uptime.get("uptime_duration_value").text_or("N/A"),
        );
        if status.is_missing() {
            board.set_label(server.running_label, "N/A");
            board.set_label(server.users_label, "N/A");
            for (_, label) in server.links {
                board.set_label(label, "N/A");
            }
            return;
        }
        let activity = status.get("current_activity");
        board.set_label(server.running_label, &activity.get("running_games").count().to_string());
        board.set_label(server.users_label, &activity.get("users_in_game").count().to_string());
        for (key, label) in server.links {
            board.set_label(label, connection_state(status.path(&["service_connections", key])));
        }
    }
}

impl Page for Ladder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn endpoints(&self, _query: &Query) -> Result<Vec<Endpoint>, PageError> {
        let mut endpoints = vec![
            Endpoint::new(LADDER_JSON).with_fallback(json!({ "platform_ladders": {} })),
            Endpoint::new(HISTORY_JSON).with_fallback(json!({ "game_history": [] })),
        ];
        if let Some(server) = &self.server {
            endpoints.push(Endpoint::new(server.uptime_json));
            endpoints.push(Endpoint::new(server.status_json));
        }
        Ok(endpoints)
    }

    fn board(&self) -> Board {
        let mut board = Board::new();
        if let Some(server) = &self.server {
            board = board
                .with(server.uptime_label, Layout::Label)
                .with(server.running_label, Layout::Label)
                .with(server.users_label, Layout::Label);
            for (_, label) in server.links {
                board = board.with(label, Layout::Label);
            }
        }
        board
            .with(
                self.ladder_id,
                Layout::Table {
                    headers: vec!["#", "Player", "Race", "Rating", "W / L", "Games", "W/L Ratio"],
                },
            )
            .with(
                self.history_id,
                Layout::Table {
                    headers: vec!["Game", "Result", "Player / Race", "Units Killed / Lost", "Duration", "Ended"],
                },
            )
            .with("generated-time", Layout::Label)
    }

    fn searchable(&self) -> &'static [&'static str] {
        self.searchable
    }

    fn primary(&self) -> &'static str {
        self.ladder_id
    }

    fn render(&self, snapshots: &[Snapshot], _query: &Query, board: &mut Board) -> Result<(), PageError> {
        let ladder = root(snapshots, 0);
        let history = root(snapshots, 1);

        if let Some(server) = &self.server {
            self.render_server(server, root(snapshots, 2), root(snapshots, 3), board);
        }

        board.replace(self.ladder_id, self.ladder_rows(ladder));
        board.replace(self.history_id, self.history_rows(history));

        let generated = match ladder.get("generated_at").str() {
            Some(at) if !at.is_empty() => at.to_string(),
            _ => history.get("generated_at").text_or("N/A"),
        };
        board.set_label("generated-time", &generated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::INFINITE_RATIO;
    use serde_json::Value;

    fn render(page: &Ladder, snapshots: Vec<Value>) -> Board {
        let mut board = page.board();
        let snapshots: Vec<_> = page
            .endpoints(&Query::default())
            .unwrap()
            .into_iter()
            .zip(snapshots)
            .map(|(e, v)| Snapshot::new(e.path, v))
            .collect();
        page.render(&snapshots, &Query::default(), &mut board).unwrap();
        board
    }

    #[test]
    fn ladder_rows_with_ratios() {
        let page = Ladder::starcraft();
        let board = render(
            &page,
            vec![
                json!({ "platform_ladders": { "SEXP_NML": [
                    { "username": "Flash", "rating": 2400, "wins": 5, "losses": 0 },
                    { "username": "Bisu", "wins": 0, "losses": 0, "draws": 2 },
                    { "username": "Jaedong", "wins": 7, "losses": 2 }
                ] }, "generated_at": "2024-02-02 12:00" }),
                json!({ "game_history": [] }),
            ],
        );
        let rows = board.container("scbw-ladder-table").unwrap().elements();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].inner().ends_with(&format!("<td>5 / 0</td><td>5</td><td>{INFINITE_RATIO}</td>")));
        assert!(rows[1].inner().contains("<td>N/A</td><td>0 / 0 / 2</td><td>2</td><td>0.00</td>"));
        assert!(rows[2].inner().ends_with("<td>9</td><td>3.50</td>"));
        assert_eq!(board.label("generated-time"), Some("2024-02-02 12:00"));
    }

    #[test]
    fn history_is_filtered_by_platform() {
        let page = Ladder::starcraft();
        let board = render(
            &page,
            vec![
                json!({ "platform_ladders": {} }),
                json!({ "game_history": [
                    { "platform_tag": "SEXP", "name": "lt", "id": 7, "result": "WIN", "player_name": "Flash", "race": "Terran", "duration_minutes": 14 },
                    { "platform_tag": "W3XP", "name": "ei", "id": 8, "result": "LOSS" }
                ], "generated_at": "later" }),
            ],
        );
        let rows = board.container("scbw-history-table").unwrap().elements();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].inner(),
            r#"<td>lt (#7)</td><td><span class="win">WIN</span></td><td>Flash / Terran</td><td>N/A / N/A</td><td>14 min</td><td>N/A</td>"#
        );
        assert!(board.to_html().contains("No active W/L statistics found for StarCraft."));
        assert_eq!(board.label("generated-time"), Some("later"));
    }

    #[test]
    fn warcraft_renders_server_status() {
        let page = Ladder::warcraft3();
        let board = render(
            &page,
            vec![
                json!({ "platform_ladders": { "W3XP_NML": [{ "username": "Grubby", "race": "Orc", "wins": 1, "losses": 1 }] } }),
                json!({ "game_history": [] }),
                json!({ "uptime_duration_value": "2d" }),
                json!({ "current_activity": { "running_games": 3 }, "service_connections": { "w3cs": "connected" } }),
            ],
        );
        assert_eq!(board.label("w3gs-uptime-value"), Some("2d"));
        assert_eq!(board.label("w3gs-running-games"), Some("3"));
        assert_eq!(board.label("w3gs-users-in-game"), Some("0"));
        assert_eq!(board.label("w3gs-w3cs"), Some("CONNECTED"));
        assert_eq!(board.label("w3gs-w3dbs"), Some("DISCONNECTED"));
        assert!(board.to_html().contains("No game history found for Warcraft III."));
        assert_eq!(
            board.container("w3tft-ladder-table").unwrap().elements()[0].search(),
            Some("grubby orc")
        );
    }

    #[test]
    fn fallbacks_are_declared() {
        let endpoints = Ladder::warcraft3().endpoints(&Query::default()).unwrap();
        assert_eq!(endpoints.len(), 4);
        assert_eq!(endpoints[0].fallback, Some(json!({ "platform_ladders": {} })));
        assert_eq!(endpoints[1].fallback, Some(json!({ "game_history": [] })));
        assert_eq!(endpoints[2].fallback, None);
    }
}
