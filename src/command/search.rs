use clap::{Args, ValueEnum};
use stanza::{
    renderer::{console::Console, Renderer as _},
    style::{Header, Styles},
    table::{Row, Table},
};

use crate::{context::Context, dashboard::Match};

use super::{Command, PageArgs};

#[derive(ValueEnum, Clone, Debug, Copy)]
enum OutputFormat {
    Text,
    Json,
    Table,
}

#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    #[command(flatten)]
    page: PageArgs,
    /// Case-insensitive substring to look for.
    needle: String,
    /// The output format.
    #[arg(long, default_value = "text", value_enum)]
    format: OutputFormat,
}

trait Outputs {
    fn output(&self, matches: &[Match]) -> anyhow::Result<()>;
}

struct TextOutput;

impl Outputs for TextOutput {
    fn output(&self, matches: &[Match]) -> anyhow::Result<()> {
        for m in matches {
            println!("{}\t{}", m.container, m.search);
        }
        Ok(())
    }
}

struct JsonOutput;

impl Outputs for JsonOutput {
    fn output(&self, matches: &[Match]) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string(matches)?);
        Ok(())
    }
}

struct TableOutput;

impl Outputs for TableOutput {
    fn output(&self, matches: &[Match]) -> anyhow::Result<()> {
        let mut table = Table::default().with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Container".into(), "Matched Text".into()],
        ));
        for m in matches {
            table.push_row(vec![m.container.to_string(), m.search.clone()]);
        }
        println!("{}", Console::default().render(&table));
        Ok(())
    }
}

impl OutputFormat {
    fn to_output(self) -> Box<dyn Outputs> {
        match self {
            OutputFormat::Text => Box::new(TextOutput),
            OutputFormat::Json => Box::new(JsonOutput),
            OutputFormat::Table => Box::new(TableOutput),
        }
    }
}

#[async_trait::async_trait]
impl Command for SearchArgs {
    async fn run(&self, context: &mut Context) -> anyhow::Result<()> {
        let dashboard = self.page.dashboard(context);
        if dashboard.page().searchable().is_empty() {
            anyhow::bail!("page {} has nothing to search", dashboard.page().name());
        }
        self.page.search(&dashboard, &self.needle)?;
        dashboard.refresh(&context.fetcher).await;

        let matches = dashboard.matches();
        tracing::info!(needle = %self.needle, found = matches.len(), "search finished");
        self.format.to_output().output(&matches)
    }
}
