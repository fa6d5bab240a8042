use std::{borrow::Cow, sync::Arc};

use parking_lot::Mutex;

use crate::config::Config;

const KNOWN_TOTAL_TEMPLATE: &str =
    "{prefix}{spinner:.green} [{bar:40.cyan/blue}] {binary_bytes}/{binary_total_bytes} {binary_bytes_per_sec} {wide_msg}";
const UNKNOWN_TOTAL_TEMPLATE: &str = "{prefix}{spinner:.green} {binary_bytes} {wide_msg}";
const CYCLE_TEMPLATE: &str = "{spinner:.green} {pos}/{len} {wide_msg}";

fn style(template: &str) -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
        .progress_chars("##-")
}

pub struct ProgressBar {
    inner: indicatif::ProgressBar,
    children: Mutex<Vec<indicatif::ProgressBar>>,
}

/// Progress output for refresh cycles: one bar per cycle, one child per
/// endpoint download.
#[derive(Debug, Clone)]
pub struct ProgressBarManager {
    root: indicatif::MultiProgress,
}

impl ProgressBar {
    fn new(inner: indicatif::ProgressBar) -> Self {
        Self {
            inner,
            children: Mutex::new(Vec::new()),
        }
    }

    pub fn set_position(&self, pos: u64) {
        self.inner.set_position(pos);
    }

    pub fn inc(&self, n: u64) {
        self.inner.inc(n);
    }

    pub fn finish(&self, msg: impl Into<Cow<'static, str>>) {
        for child in self.children.lock().drain(..) {
            child.finish_and_clear();
        }
        self.inner.finish_with_message(msg);
    }

    /// Switches between the byte bar and the spinner once the response
    /// tells us whether the body length is known.
    pub fn update_template(&self, total: Option<u64>) {
        match total {
            Some(total) => {
                self.inner.set_style(style(KNOWN_TOTAL_TEMPLATE));
                self.inner.set_length(total);
            }
            None => self.inner.set_style(style(UNKNOWN_TOTAL_TEMPLATE)),
        }
    }
}

impl ProgressBarManager {
    pub fn new(config: &Config) -> Self {
        if config.progress() {
            Self {
                root: indicatif::MultiProgress::with_draw_target(
                    indicatif::ProgressDrawTarget::stderr(),
                ),
            }
        } else {
            Self::hidden()
        }
    }

    pub fn hidden() -> Self {
        Self {
            root: indicatif::MultiProgress::with_draw_target(
                indicatif::ProgressDrawTarget::hidden(),
            ),
        }
    }

    /// A bar counting finished endpoints of one refresh cycle.
    pub fn add_cycle(&self, label: impl Into<Cow<'static, str>>, endpoints: u64) -> Arc<ProgressBar> {
        let bar = indicatif::ProgressBar::new(endpoints).with_style(style(CYCLE_TEMPLATE));
        bar.set_message(label);
        Arc::new(ProgressBar::new(self.root.add(bar)))
    }

    /// A download bar nested under `parent`.
    pub fn add_download(&self, parent: &Arc<ProgressBar>, label: String) -> Arc<ProgressBar> {
        let bar = indicatif::ProgressBar::new_spinner().with_style(style(UNKNOWN_TOTAL_TEMPLATE));
        bar.set_prefix("  ");
        bar.set_message(label);
        let bar = self.root.insert_after(&parent.inner, bar);
        parent.children.lock().push(bar.clone());
        Arc::new(ProgressBar::new(bar))
    }
}
