use clap::Args;

use crate::{
    context::Context,
    dashboard::Dashboard,
    page::{PageKind, Query},
};

pub mod render;
pub mod search;
pub mod watch;

#[async_trait::async_trait]
pub trait Command {
    /// Run the command.
    async fn run(&self, context: &mut Context) -> anyhow::Result<()>;
}

/// Which page to show, and with what parameters.
#[derive(Args, Clone, Debug)]
pub struct PageArgs {
    /// The page to render.
    #[arg(value_enum)]
    page: PageKind,
    /// Page parameters as a query string, e.g. `name=sorsi` or `craftable=1`.
    #[arg(short, long, default_value = "")]
    query: String,
    /// Apply the search to this container only, e.g. `rune-index`.
    #[arg(long)]
    within: Option<String>,
}

impl PageArgs {
    fn dashboard(&self, context: &Context) -> Dashboard {
        Dashboard::new(self.page.build(context), Query::parse(&self.query))
    }

    /// Sets the search input, on every searchable container or on the one
    /// named by `--within`.
    fn search(&self, dashboard: &Dashboard, needle: &str) -> anyhow::Result<usize> {
        match &self.within {
            None => Ok(dashboard.set_search(needle)),
            Some(container) => dashboard.set_search_in(container, needle).ok_or_else(|| {
                anyhow::anyhow!(
                    "page {} has no searchable container {container}, expected one of: {}",
                    dashboard.page().name(),
                    dashboard.page().searchable().join(", ")
                )
            }),
        }
    }
}
