use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;
use manifest_core::pipeline::{CancelFlag, ManifestPipeline, credential_from_env};
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::lock::RunLock;
use crate::app::progress::DownloadProgressUi;
use crate::app::settings::{RunSettings, resolve_settings};
use crate::app::{exit, output, terminal};
use crate::app_config::{LoadedConfig, load_default_file_config};
use crate::cli::{Cli, Command, ConfigCommand};

pub(crate) async fn run() -> Result<ProcessExit> {
    let cli = Cli::parse();
    let loaded_config = load_default_file_config()?;
    let settings = resolve_settings(&cli, loaded_config.config.as_ref())?;

    let no_color = terminal::is_no_color_requested(cli.no_color);
    terminal::init_tracing(settings.log_level, no_color);
    debug!(?cli, "CLI arguments parsed");
    if let Some(path) = loaded_config.path.as_deref()
        && loaded_config.loaded_from_file()
    {
        debug!(path = %path.display(), "config file loaded");
    }

    match &cli.command {
        Command::Download(_) => run_download(&settings).await,
        Command::Explore(args) => run_explore(&settings, args.json).await,
        Command::Config {
            command: ConfigCommand::Show,
        } => {
            for line in config_show_lines(&loaded_config, &settings) {
                println!("{line}");
            }
            Ok(ProcessExit::Success)
        }
    }
}

async fn run_download(settings: &RunSettings) -> Result<ProcessExit> {
    // Checked before the lock and before any request.
    let api_key = match credential_from_env() {
        Ok(api_key) => api_key,
        Err(error) => {
            eprintln!("{}", output::failure_line(&error));
            return Ok(exit::determine_exit_outcome(&error));
        }
    };

    let pipeline = ManifestPipeline::new(settings.pipeline.clone());
    let _lock = RunLock::acquire(&pipeline.layout().lock_path())?;
    let pipeline = pipeline.with_cancel_flag(spawn_interrupt_listener());
    info!(
        language = %settings.pipeline.language,
        data_dir = %settings.pipeline.data_dir.display(),
        "Starting manifest download"
    );

    let use_progress = terminal::should_show_progress(
        io::stderr().is_terminal(),
        settings.quiet,
        terminal::is_dumb_terminal(),
    );
    let mut progress = DownloadProgressUi::new(use_progress);
    let result = pipeline
        .download(&api_key, |update| progress.update(update))
        .await;
    progress.finish();

    match result {
        Ok(summary) => {
            if !settings.quiet {
                output::print_download_summary(&summary);
            }
            Ok(ProcessExit::Success)
        }
        Err(error) => {
            eprintln!("{}", output::failure_line(&error));
            Ok(exit::determine_exit_outcome(&error))
        }
    }
}

async fn run_explore(settings: &RunSettings, json: bool) -> Result<ProcessExit> {
    let pipeline = ManifestPipeline::new(settings.pipeline.clone());
    let _lock = RunLock::acquire(&pipeline.layout().lock_path())?;
    let pipeline = pipeline.with_cancel_flag(spawn_interrupt_listener());
    info!(
        data_dir = %settings.pipeline.data_dir.display(),
        item_table = %settings.pipeline.item_table,
        "Exploring manifest store"
    );

    match pipeline.explore().await {
        Ok(report) => {
            if json || !settings.quiet {
                output::print_explore_report(&report, json)?;
            }
            Ok(ProcessExit::Success)
        }
        Err(error) => {
            eprintln!("{}", output::failure_line(&error));
            Ok(exit::determine_exit_outcome(&error))
        }
    }
}

/// Ctrl-C sets the returned flag; the pipeline stops at the next stage boundary.
fn spawn_interrupt_listener() -> CancelFlag {
    let cancel = CancelFlag::new();
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping after the current stage");
            signal_flag.cancel();
        }
    });
    cancel
}

fn config_show_lines(loaded: &LoadedConfig, settings: &RunSettings) -> Vec<String> {
    let source = match (&loaded.path, loaded.loaded_from_file()) {
        (Some(path), true) => format!("{} (loaded)", path.display()),
        (Some(path), false) => format!("{} (not found, using defaults)", path.display()),
        (None, _) => "no config directory (using defaults)".to_string(),
    };
    let verbosity = loaded
        .config
        .as_ref()
        .and_then(|config| config.verbosity)
        .map_or("default", |verbosity| verbosity.as_str());
    let pipeline = &settings.pipeline;

    vec![
        format!("config_file = {source}"),
        format!("data_dir = {}", pipeline.data_dir.display()),
        format!("language = {}", pipeline.language),
        format!("base_url = {}", pipeline.base_url),
        format!("verbosity = {verbosity}"),
        format!("top_categories = {}", pipeline.top_categories),
        format!("item_table = {}", pipeline.item_table),
        format!("category_table = {}", pipeline.category_table),
        format!("sample_size = {}", pipeline.sample_size),
        format!(
            "metadata_connect_timeout_secs = {}",
            pipeline.metadata_connect_timeout_secs
        ),
        format!(
            "metadata_read_timeout_secs = {}",
            pipeline.metadata_read_timeout_secs
        ),
        format!(
            "download_connect_timeout_secs = {}",
            pipeline.download_connect_timeout_secs
        ),
        format!(
            "download_read_timeout_secs = {}",
            pipeline.download_read_timeout_secs
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::{FileConfig, VerbositySetting};
    use std::path::PathBuf;

    fn settings_for(args: &[&str], file: Option<&FileConfig>) -> RunSettings {
        let mut argv = vec!["manifest-explorer"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        resolve_settings(&cli, file).unwrap()
    }

    #[test]
    fn test_config_show_lines_without_file() {
        let loaded = LoadedConfig {
            path: Some(PathBuf::from("/home/u/.config/manifest-explorer/config.toml")),
            config: None,
        };
        let lines = config_show_lines(&loaded, &settings_for(&["config", "show"], None));

        assert!(lines[0].ends_with("(not found, using defaults)"));
        assert!(lines.contains(&"language = en".to_string()));
        assert!(lines.contains(&"verbosity = default".to_string()));
        assert!(lines.contains(&"top_categories = 20".to_string()));
    }

    #[test]
    fn test_config_show_lines_with_file() {
        let file = FileConfig {
            language: Some("de".to_string()),
            verbosity: Some(VerbositySetting::Verbose),
            ..FileConfig::default()
        };
        let loaded = LoadedConfig {
            path: Some(PathBuf::from("/cfg/manifest-explorer/config.toml")),
            config: Some(file.clone()),
        };
        let lines = config_show_lines(&loaded, &settings_for(&["config", "show"], Some(&file)));

        assert_eq!(
            lines[0],
            "config_file = /cfg/manifest-explorer/config.toml (loaded)"
        );
        assert!(lines.contains(&"language = de".to_string()));
        assert!(lines.contains(&"verbosity = verbose".to_string()));
    }

    #[tokio::test]
    async fn test_interrupt_listener_starts_uncancelled() {
        let cancel = spawn_interrupt_listener();
        assert!(!cancel.is_cancelled());
    }
}
