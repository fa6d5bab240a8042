use std::path::PathBuf;

use clap::Args;

use crate::{context::Context, output::Format};

use super::{Command, PageArgs};

#[derive(Args, Clone, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    page: PageArgs,
    /// Initial search input.
    #[arg(short, long)]
    search: Option<String>,
    /// The output format.
    #[arg(short, long, default_value = "html", value_enum)]
    format: Format,
    /// Max width of text output.
    #[arg(short, long, default_value = "160")]
    width: usize,
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[async_trait::async_trait]
impl Command for RenderArgs {
    async fn run(&self, context: &mut Context) -> anyhow::Result<()> {
        let dashboard = self.page.dashboard(context);
        if let Some(needle) = &self.search {
            self.page.search(&dashboard, needle)?;
        }
        let html = dashboard.refresh(&context.fetcher).await;
        let content = self.format.format(&html, self.width)?;
        crate::output::emit(&content, self.output.as_deref()).await
    }
}
