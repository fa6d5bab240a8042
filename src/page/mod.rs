//! Dashboard pages. Each page projects one or more snapshots onto its board.

use std::{collections::HashMap, time::Duration};

use clap::ValueEnum;
use reqwest::Url;

use crate::{
    board::Board,
    context::Context,
    error::PageError,
    fetch::{Endpoint, Snapshot},
    normalize::Node,
};

mod charinfo;
mod d2lod;
mod items;
mod ladder;
mod locations;
mod runes;
mod runewords;
mod status;
mod uptime;

pub trait Page: Send + Sync {
    fn name(&self) -> &'static str;

    /// How often `watch` refreshes this page.
    fn refresh(&self) -> Duration {
        Duration::from_secs(30)
    }

    /// Snapshots to load for one cycle, fetched concurrently.
    fn endpoints(&self, query: &Query) -> Result<Vec<Endpoint>, PageError>;

    /// The empty page: every container, in document order.
    fn board(&self) -> Board;

    /// Containers whose elements the search filter applies to.
    fn searchable(&self) -> &'static [&'static str] {
        &[]
    }

    /// Container that shows the page-level error.
    fn primary(&self) -> &'static str;

    /// Fills `board` from the snapshots, in `endpoints` order.
    fn render(&self, snapshots: &[Snapshot], query: &Query, board: &mut Board)
        -> Result<(), PageError>;
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    /// Server status, active games and logged-in users.
    Status,
    /// Diablo II game server stats and running games.
    D2lod,
    /// StarCraft ladder and game history.
    Scbw,
    /// Warcraft III ladder, game history and server status.
    W3tft,
    /// Item report table.
    Items,
    /// Item attribute report, one block per character.
    Attributes,
    /// Compact item table including rings, amulets and belts.
    Gear,
    /// Character locations.
    Locations,
    /// One character, needs `name`.
    Charinfo,
    /// Rune inventory.
    Runes,
    /// Runeword catalog and rune index.
    Runewords,
    /// Game server uptime.
    Uptime,
}

impl PageKind {
    pub fn build(self, context: &Context) -> Box<dyn Page> {
        match self {
            PageKind::Status => Box::new(status::ServerStatus),
            PageKind::D2lod => Box::new(d2lod::D2Lod::new(context.classes.clone())),
            PageKind::Scbw => Box::new(ladder::Ladder::starcraft()),
            PageKind::W3tft => Box::new(ladder::Ladder::warcraft3()),
            PageKind::Items => Box::new(items::ItemReport::table()),
            PageKind::Attributes => Box::new(items::ItemReport::blocks()),
            PageKind::Gear => Box::new(items::ItemReport::gear()),
            PageKind::Locations => Box::new(locations::Locations),
            PageKind::Charinfo => Box::new(charinfo::CharInfo),
            PageKind::Runes => Box::new(runes::RuneInventory),
            PageKind::Runewords => Box::new(runewords::Runewords),
            PageKind::Uptime => Box::new(uptime::Uptime),
        }
    }
}

/// Query-string parameters of a page, e.g. `name=sorsi&craftable=1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(HashMap<String, String>);

impl Query {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim_start_matches('?');
        let mut url = match Url::parse("http://localhost/") {
            Ok(url) => url,
            Err(_) => return Self::default(),
        };
        url.set_query(Some(raw));
        Self(url.query_pairs().into_owned().collect())
    }

    /// A non-empty parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some("1" | "true" | "yes" | "on"))
    }
}

/// Root of the `index`-th snapshot; missing when there is none.
fn root(snapshots: &[Snapshot], index: usize) -> Node<'_> {
    snapshots.get(index).map(Snapshot::root).unwrap_or_default()
}

/// Link state of a game server to its peer services.
fn connection_state(raw: Node<'_>) -> &'static str {
    let state = raw.text_or("").to_lowercase();
    if state.contains("connected") && !state.contains("disconnected") {
        "CONNECTED"
    } else {
        "DISCONNECTED"
    }
}
