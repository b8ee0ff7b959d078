//! Progress UI for the archive download.

use std::time::Duration;

use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use manifest_core::DownloadProgress;

const SPINNER_TEMPLATE: &str = "{spinner} {msg}";
const BAR_TEMPLATE: &str =
    "{spinner} Downloading manifest [{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Spinner until the body size is known, then a byte bar.
///
/// Disabled instances accept updates and render nothing.
pub(crate) struct DownloadProgressUi {
    bar: Option<ProgressBar>,
    sized: bool,
}

impl DownloadProgressUi {
    pub(crate) fn new(enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template(SPINNER_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message("Resolving manifest...");
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        });
        Self { bar, sized: false }
    }

    pub(crate) fn update(&mut self, progress: DownloadProgress) {
        let Some(bar) = &self.bar else {
            return;
        };
        match progress.total_bytes {
            Some(total) if total > 0 => {
                if !self.sized {
                    bar.set_length(total);
                    bar.set_style(
                        ProgressStyle::with_template(BAR_TEMPLATE)
                            .unwrap_or_else(|_| ProgressStyle::default_bar())
                            .progress_chars("=> "),
                    );
                    self.sized = true;
                }
                bar.set_position(progress.written_bytes);
            }
            _ => bar.set_message(spinner_message(progress.written_bytes)),
        }
    }

    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Drop for DownloadProgressUi {
    fn drop(&mut self) {
        self.finish();
    }
}

fn spinner_message(written_bytes: u64) -> String {
    format!("Downloading manifest... {}", HumanBytes(written_bytes))
}
