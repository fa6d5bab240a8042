use std::time::Duration;

use crate::{
    board::{Board, Element, Layout},
    error::PageError,
    fetch::{Endpoint, Snapshot},
    normalize::{self, compact, timestamp, Decode, Lookup, Node},
    render::{bar_width, char_link, esc},
};

use super::{connection_state, root, Page, Query};

const UPTIME_JSON: &str = "jsons/d2gs_uptime_data.json";
const STATUS_JSON: &str = "jsons/d2gs_status_data.json";
const GAMES_JSON: &str = "jsons/all_games_d2.json";

const MAX_PLAYERS: u64 = 8;

/// Bar colour by number of players in the game.
const COLOR_PALETTE: [&str; 9] = [
    "#607d8b", "#8bc34a", "#cddc39", "#ffeb3b", "#ffc107", "#ff9800", "#ff5722", "#e64a19",
    "#b71c1c",
];

const STAT_LABELS: [&str; 11] = [
    "d2gs-running-games",
    "d2gs-users-in-game",
    "d2gs-max-games",
    "d2gs-max-prefer-users",
    "d2gs-max-game-life",
    "d2gs-d2cs",
    "d2gs-d2dbs",
    "d2gs-phys-memory",
    "d2gs-virt-memory",
    "d2gs-kernel-cpu",
    "d2gs-user-cpu",
];

/// Diablo II game server stats and the running games with their rosters.
pub struct D2Lod {
    classes: Lookup,
    difficulties: Lookup,
}

struct Player {
    name: String,
    class: String,
    level: String,
    enter_time: String,
}

impl Decode for Player {
    fn decode(node: Node<'_>) -> Self {
        Self {
            name: node.get("CharName").text_or("-"),
            class: node.get("Class").text_or("-"),
            level: node.get("Level").number_or_dash(),
            enter_time: node.get("EnterTime").text_or("-"),
        }
    }
}

struct Game {
    name: String,
    difficulty: String,
    users: u64,
    xp_rate: Option<String>,
    xp_bonus: Option<String>,
    players: Vec<Player>,
}

impl Decode for Game {
    fn decode(node: Node<'_>) -> Self {
        let info = node.get("GameInfo");
        let rate = info.get("XPRateMultiplier");
        Self {
            name: info.get("GameName").text_or("-"),
            difficulty: info.get("Difficult").text_or("Normal"),
            users: info.get("UserCount").count(),
            xp_rate: (!rate.is_missing()).then(|| rate.text_or("1")),
            xp_bonus: info.get("XPBonusPercent").str().map(str::to_string),
            players: node.get("Characters").decode_items(),
        }
    }
}

/// Experience multiplier for a party of `players`: `(N + 1) / 2`.
fn xp_multiplier(players: u64) -> (String, String) {
    let n = players.clamp(1, MAX_PLAYERS) as f64;
    let multiplier = (n + 1.0) / 2.0;
    (
        format!("{multiplier:.2}"),
        format!("+{:.0}%", (multiplier - 1.0) * 100.0),
    )
}

fn memory(node: Node<'_>) -> String {
    format!(
        "{:.2} MB / {:.2} MB",
        node.get("used_mb").float_or(0.0),
        node.get("total_mb").float_or(0.0)
    )
}

/// The game list is either the document itself or its `games` array.
fn game_list(data: Node<'_>) -> Option<Node<'_>> {
    if data.is_array() {
        Some(data)
    } else if data.get("games").is_array() {
        Some(data.get("games"))
    } else {
        None
    }
}

impl D2Lod {
    pub fn new(classes: Lookup) -> Self {
        Self {
            classes,
            difficulties: normalize::difficulty(),
        }
    }

    fn render_stats(&self, uptime: Node<'_>, status: Node<'_>, board: &mut Board) {
        board.set_label(
            "d2gs-uptime-value",
            &uptime.get("uptime_duration_value").text_or("N/A"),
        );
        board.set_label(
            "last-updated",
            &timestamp(uptime.get("current_time")).unwrap_or_else(|| "N/A".to_string()),
        );

        if status.is_missing() {
            for id in STAT_LABELS {
                board.set_label(id, "N/A");
            }
            return;
        }

        let activity = status.get("current_activity");
        let limits = status.get("game_limits");
        let connections = status.get("service_connections");
        let resources = status.get("resource_usage");

        board.set_label("d2gs-running-games", &activity.get("running_games").count().to_string());
        board.set_label("d2gs-users-in-game", &activity.get("users_in_game").count().to_string());
        board.set_label("d2gs-max-games", &limits.get("max_games_set").text_or("N/A"));
        board.set_label("d2gs-max-prefer-users", &limits.get("max_prefer_users").text_or("N/A"));
        board.set_label(
            "d2gs-max-game-life",
            &compact(limits.get("max_game_life_seconds").float(), "Unlimited / N/A"),
        );
        board.set_label("d2gs-d2cs", connection_state(connections.get("d2cs")));
        board.set_label("d2gs-d2dbs", connection_state(connections.get("d2dbs")));
        board.set_label("d2gs-phys-memory", &memory(resources.get("physical_memory")));
        board.set_label("d2gs-virt-memory", &memory(resources.get("virtual_memory")));
        board.set_label(
            "d2gs-kernel-cpu",
            &format!("{:.2} %", resources.get("kernel_cpu_percent").float_or(0.0)),
        );
        board.set_label(
            "d2gs-user-cpu",
            &format!("{:.2} %", resources.get("user_cpu_percent").float_or(0.0)),
        );
    }

    fn game_card(&self, game: &Game) -> Element {
        let difficulty_class = self
            .difficulties
            .get(&game.difficulty)
            .unwrap_or("normal");
        let color = COLOR_PALETTE
            .get(game.users as usize)
            .copied()
            .unwrap_or(COLOR_PALETTE[0]);
        let (derived_rate, derived_bonus) = xp_multiplier(game.users);
        let rate = game.xp_rate.clone().unwrap_or(derived_rate);
        let bonus = game.xp_bonus.clone().unwrap_or(derived_bonus);

        let mut html = format!(
            r#"<div class="game-title">{} ({}) - {}/{MAX_PLAYERS} player(s)</div>"#,
            esc(&game.name),
            esc(&game.difficulty),
            game.users
        );
        html.push_str(&format!(
            r#"<div class="xp-container"><div class="xp-bar-wrapper"><div class="xp-bar" style="width: {}; background-color: {color};"></div></div><div class="xp-text"><span>XP Potential: {}/{MAX_PLAYERS}</span><span class="xp-multiplier">{}x ({})</span></div></div>"#,
            bar_width(game.users as f64, MAX_PLAYERS as f64),
            game.users,
            esc(&rate),
            esc(&bonus)
        ));

        let mut search = vec![game.name.clone(), game.difficulty.clone()];
        if !game.players.is_empty() {
            html.push_str(
                r#"<table class="players-table"><tr><th>Name</th><th>Class</th><th>Level</th><th>EnterTime</th></tr>"#,
            );
            for player in &game.players {
                let class = self.classes.translate(&player.class);
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    char_link(&player.name),
                    esc(class),
                    esc(&player.level),
                    esc(&player.enter_time)
                ));
                search.push(player.name.clone());
                search.push(class.to_string());
            }
            html.push_str("</table>");
        }

        Element::block(html)
            .with_class(format!("game-card {difficulty_class}"))
            .searchable(&search.join(" "))
    }
}

impl Page for D2Lod {
    fn name(&self) -> &'static str {
        "d2lod"
    }

    fn refresh(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn endpoints(&self, _query: &Query) -> Result<Vec<Endpoint>, PageError> {
        Ok(vec![
            Endpoint::new(UPTIME_JSON),
            Endpoint::new(STATUS_JSON),
            Endpoint::new(GAMES_JSON),
        ])
    }

    fn board(&self) -> Board {
        let mut board = Board::new()
            .with("d2gs-uptime-value", Layout::Label)
            .with("last-updated", Layout::Label);
        for id in STAT_LABELS {
            board = board.with(id, Layout::Label);
        }
        board
            .with("d2-games-count", Layout::Label)
            .with("d2-games", Layout::Block)
    }

    fn searchable(&self) -> &'static [&'static str] {
        &["d2-games"]
    }

    fn primary(&self) -> &'static str {
        "d2-games"
    }

    fn render(&self, snapshots: &[Snapshot], _query: &Query, board: &mut Board) -> Result<(), PageError> {
        self.render_stats(root(snapshots, 0), root(snapshots, 1), board);

        let games = game_list(root(snapshots, 2)).ok_or_else(|| PageError::MissingCollection {
            path: GAMES_JSON.to_string(),
        })?;
        let games: Vec<Game> = games.decode_items();
        board.set_label("d2-games-count", &games.len().to_string());

        if games.is_empty() {
            board.replace(
                "d2-games",
                vec![Element::new("p", "No active Diablo II games at the moment.")
                    .with_class("no-games-message")],
            );
            return Ok(());
        }
        board.replace("d2-games", games.iter().map(|g| self.game_card(g)).collect());
        Ok(())
    }
}
