use std::{future::Future, path::PathBuf, sync::Arc};

use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::{
    context::Context,
    dashboard::Dashboard,
    output::{emit, Format},
    schedule::{Overlap, Periodic},
};

use super::{Command, PageArgs};

#[derive(Args, Clone, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    page: PageArgs,
    /// Initial search input. Each line read from stdin replaces it.
    #[arg(short, long)]
    search: Option<String>,
    /// The output format.
    #[arg(short, long, default_value = "html", value_enum)]
    format: Format,
    /// Max width of text output.
    #[arg(short, long, default_value = "160")]
    width: usize,
    /// Rewrite this file instead of printing to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Where and how each new version of the page goes.
#[derive(Clone)]
struct Sink {
    format: Format,
    width: usize,
    output: Option<PathBuf>,
}

impl Sink {
    async fn write(&self, html: &str) {
        let written = match self.format.format(html, self.width) {
            Ok(content) => emit(&content, self.output.as_deref()).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            tracing::warn!("{e:#}");
        }
    }
}

/// Applies each input line as the new search until `shutdown` completes.
/// The shutdown future is created once and polled across iterations.
async fn follow<R, S>(
    page: &PageArgs,
    dashboard: &Dashboard,
    sink: &Sink,
    mut lines: Lines<R>,
    shutdown: S,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut input_open = true;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line(), if input_open => match line? {
                Some(needle) => {
                    page.search(dashboard, &needle)?;
                    sink.write(&dashboard.html()).await;
                }
                None => input_open = false,
            },
        }
    }
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

#[async_trait::async_trait]
impl Command for WatchArgs {
    async fn run(&self, context: &mut Context) -> anyhow::Result<()> {
        let dashboard = Arc::new(self.page.dashboard(context));
        self.page
            .search(&dashboard, self.search.as_deref().unwrap_or_default())?;
        let sink = Sink {
            format: self.format,
            width: self.width,
            output: self.output.clone(),
        };

        let period = context.config.refresh_interval(dashboard.page().refresh());
        let overlap = if context.config.skip_overlap() {
            Overlap::Skip
        } else {
            Overlap::Allow
        };
        tracing::info!(page = dashboard.page().name(), ?period, ?overlap, "watching");

        let periodic = {
            let dashboard = dashboard.clone();
            let fetcher = context.fetcher.clone();
            let sink = sink.clone();
            Periodic::spawn(period, overlap, move || {
                let dashboard = dashboard.clone();
                let fetcher = fetcher.clone();
                let sink = sink.clone();
                async move {
                    let html = dashboard.refresh(&fetcher).await;
                    sink.write(&html).await;
                }
            })
        };

        let lines = BufReader::new(tokio::io::stdin()).lines();
        let followed = follow(&self.page, &dashboard, &sink, lines, ctrl_c()).await;

        periodic.cancel();
        tracing::info!(cycles = dashboard.cycles(), "stopped watching");
        followed
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{io::AsyncWriteExt, sync::oneshot, time::sleep};

    use super::*;
    use crate::page::PageKind;

    fn runes(within: Option<&str>) -> PageArgs {
        PageArgs {
            page: PageKind::Runes,
            query: String::new(),
            within: within.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn shutdown_ends_the_loop_while_input_stays_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runes.html");
        let context = Context::new(Default::default()).unwrap();
        let page = runes(None);
        let dashboard = page.dashboard(&context);
        let sink = Sink {
            format: Format::Html,
            width: 80,
            output: Some(path.clone()),
        };
        let (mut writer, reader) = tokio::io::duplex(64);
        let (stop, stopped) = oneshot::channel::<()>();

        let typing = async {
            writer.write_all(b"ber\n").await.unwrap();
            while !path.exists() {
                sleep(Duration::from_millis(10)).await;
            }
            stop.send(()).unwrap();
        };
        let following = follow(&page, &dashboard, &sink, BufReader::new(reader).lines(), async {
            let _ = stopped.await;
        });
        let (followed, ()) = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(following, typing)
        })
        .await
        .expect("shutdown was not observed");
        followed.unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains(r#"<table id="rune-table">"#));
        drop(writer);
    }

    #[tokio::test]
    async fn unknown_container_is_an_error() {
        let context = Context::new(Default::default()).unwrap();
        let page = runes(Some("rune-index"));
        let dashboard = page.dashboard(&context);
        let err = page.search(&dashboard, "ber").unwrap_err();
        assert!(err.to_string().contains("expected one of: rune-table"), "{err}");
    }
}
