//! One live page: fetch, render, filter, repeat.
//!
//! Every cycle renders into a fresh [`Board`] and swaps it in under the
//! lock, so a slow cycle finishing late simply overwrites a newer one. The
//! search input survives cycles and is re-applied to every new board.

use parking_lot::Mutex;
use serde::Serialize;

use crate::{
    board::Board,
    fetch::{Fetcher, Snapshot},
    filter::SearchFilter,
    page::{Page, Query},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Fetching,
    Rendering,
    Filtering,
    /// The last cycle could not produce the page's main content.
    ErrorDisplay,
}

/// A searchable element that passes the current filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub container: &'static str,
    pub search: String,
    pub html: String,
}

#[derive(Debug)]
struct PageState {
    board: Board,
    filter: SearchFilter,
    phase: Phase,
    cycles: u64,
}

pub struct Dashboard {
    page: Box<dyn Page>,
    query: Query,
    state: Mutex<PageState>,
}

impl Dashboard {
    pub fn new(page: Box<dyn Page>, query: Query) -> Self {
        let state = PageState {
            board: page.board(),
            filter: SearchFilter::new(page.searchable()),
            phase: Phase::Idle,
            cycles: 0,
        };
        Self {
            page,
            query,
            state: Mutex::new(state),
        }
    }

    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn cycles(&self) -> u64 {
        self.state.lock().cycles
    }

    /// Runs one full cycle and returns the resulting document.
    pub async fn refresh(&self, fetcher: &Fetcher) -> String {
        let endpoints = match self.page.endpoints(&self.query) {
            Ok(endpoints) => endpoints,
            Err(e) => {
                tracing::warn!(page = self.page.name(), "{e}");
                let mut board = self.page.board();
                board.show_error(self.page.primary(), &e.to_string());
                return self.swap(board, Phase::ErrorDisplay);
            }
        };

        self.state.lock().phase = Phase::Fetching;
        tracing::debug!(page = self.page.name(), endpoints = endpoints.len(), "fetching");
        let snapshots = fetcher.fetch_all(self.page.name(), &endpoints).await;
        self.apply(&snapshots)
    }

    /// Renders already fetched snapshots onto a fresh board.
    pub fn apply(&self, snapshots: &[Snapshot]) -> String {
        self.state.lock().phase = Phase::Rendering;
        let mut board = self.page.board();
        let phase = match self.page.render(snapshots, &self.query, &mut board) {
            Ok(()) => Phase::Idle,
            Err(e) => {
                tracing::warn!(page = self.page.name(), "{e}");
                board.show_error(self.page.primary(), &e.to_string());
                Phase::ErrorDisplay
            }
        };
        self.swap(board, phase)
    }

    fn swap(&self, mut board: Board, phase: Phase) -> String {
        let mut state = self.state.lock();
        state.phase = Phase::Filtering;
        let visible = state.filter.apply(&mut board);
        state.board = board;
        state.phase = phase;
        state.cycles += 1;
        tracing::info!(
            page = self.page.name(),
            cycle = state.cycles,
            visible,
            "page rendered"
        );
        state.board.to_html()
    }

    /// Updates the search input; returns how many elements stay visible.
    pub fn set_search(&self, needle: &str) -> usize {
        let mut state = self.state.lock();
        let PageState { board, filter, .. } = &mut *state;
        let visible = filter.set_input(needle, board);
        tracing::debug!(page = self.page.name(), needle, visible, "search updated");
        visible
    }

    /// Updates the search input of one container. `None` when the page has
    /// no such searchable container.
    pub fn set_search_in(&self, container: &str, needle: &str) -> Option<usize> {
        let mut state = self.state.lock();
        let PageState { board, filter, .. } = &mut *state;
        let visible = filter.set_input_for(container, needle, board)?;
        tracing::debug!(page = self.page.name(), container, needle, visible, "search updated");
        Some(visible)
    }

    pub fn html(&self) -> String {
        self.state.lock().board.to_html()
    }

    /// Visible elements of the searchable containers, in document order.
    pub fn matches(&self) -> Vec<Match> {
        let state = self.state.lock();
        self.page
            .searchable()
            .iter()
            .filter_map(|id| state.board.container(id))
            .flat_map(|container| {
                container
                    .elements()
                    .iter()
                    .filter(|e| e.is_visible())
                    .filter_map(move |e| {
                        e.search().map(|search| Match {
                            container: container.id(),
                            search: search.to_string(),
                            html: e.inner().to_string(),
                        })
                    })
            })
            .collect()
    }
}
