//! Merges CLI flags, the optional config file and library defaults.
//!
//! Explicit CLI flags win over the config file, which wins over defaults.

use anyhow::{Result, bail};
use manifest_core::PipelineConfig;

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::{Cli, Command};

/// Everything a step needs before it starts.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) pipeline: PipelineConfig,
    pub(crate) log_level: &'static str,
    pub(crate) quiet: bool,
}

pub(crate) fn resolve_settings(cli: &Cli, file_config: Option<&FileConfig>) -> Result<RunSettings> {
    let mut pipeline = PipelineConfig::default();

    if let Some(file_config) = file_config {
        apply_file_config(&mut pipeline, file_config)?;
    }

    if let Some(data_dir) = &cli.data_dir {
        pipeline.data_dir.clone_from(data_dir);
    }

    match &cli.command {
        Command::Download(args) => {
            if let Some(language) = &args.language {
                pipeline.language.clone_from(language);
            }
            if let Some(base_url) = &args.base_url {
                pipeline.base_url.clone_from(base_url);
            }
        }
        Command::Explore(args) => {
            if let Some(top) = args.top {
                pipeline.top_categories = usize::from(top);
            }
            if let Some(samples) = args.samples {
                pipeline.sample_size = samples;
            }
            if let Some(item_table) = &args.item_table {
                pipeline.item_table.clone_from(item_table);
            }
            if let Some(category_table) = &args.category_table {
                pipeline.category_table.clone_from(category_table);
            }
        }
        Command::Config { .. } => {}
    }

    if pipeline.language.trim().is_empty() {
        bail!("Language must not be empty");
    }

    let file_verbosity = file_config.and_then(|config| config.verbosity);
    let log_level = resolve_log_level(cli.verbose, cli.quiet, file_verbosity);
    let quiet = cli.quiet || (cli.verbose == 0 && file_verbosity == Some(VerbositySetting::Quiet));

    Ok(RunSettings {
        pipeline,
        log_level,
        quiet,
    })
}

fn apply_file_config(pipeline: &mut PipelineConfig, file_config: &FileConfig) -> Result<()> {
    if let Some(data_dir) = &file_config.data_dir {
        pipeline.data_dir.clone_from(data_dir);
    }
    if let Some(language) = &file_config.language {
        pipeline.language.clone_from(language);
    }
    if let Some(base_url) = &file_config.base_url {
        pipeline.base_url.clone_from(base_url);
    }
    if let Some(item_table) = &file_config.item_table {
        pipeline.item_table.clone_from(item_table);
    }
    if let Some(category_table) = &file_config.category_table {
        pipeline.category_table.clone_from(category_table);
    }
    if let Some(top) = file_config.top_categories {
        pipeline.top_categories = usize::try_from(top)?;
    }
    if let Some(samples) = file_config.sample_size {
        pipeline.sample_size = u32::try_from(samples)?;
    }
    if let Some(secs) = file_config.metadata_connect_timeout_secs {
        pipeline.metadata_connect_timeout_secs = secs;
    }
    if let Some(secs) = file_config.metadata_read_timeout_secs {
        pipeline.metadata_read_timeout_secs = secs;
    }
    if let Some(secs) = file_config.download_connect_timeout_secs {
        pipeline.download_connect_timeout_secs = secs;
    }
    if let Some(secs) = file_config.download_read_timeout_secs {
        pipeline.download_read_timeout_secs = secs;
    }
    Ok(())
}

/// CLI flags beat the config file; `RUST_LOG` beats both at init time.
pub(crate) fn resolve_log_level(
    verbose: u8,
    quiet: bool,
    file_verbosity: Option<VerbositySetting>,
) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => file_verbosity.map_or("info", VerbositySetting::log_level),
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["manifest-explorer"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_config_file() {
        let settings = resolve_settings(&parse(&["explore"]), None).unwrap();
        assert_eq!(settings.pipeline, PipelineConfig::default());
        assert_eq!(settings.log_level, "info");
        assert!(!settings.quiet);
    }

    #[test]
    fn test_config_file_values_apply() {
        let file = FileConfig {
            data_dir: Some(PathBuf::from("/srv/manifest")),
            top_categories: Some(7),
            item_table: Some("Items".to_string()),
            download_read_timeout_secs: Some(60),
            verbosity: Some(VerbositySetting::Verbose),
            ..FileConfig::default()
        };
        let settings = resolve_settings(&parse(&["explore"]), Some(&file)).unwrap();
        assert_eq!(settings.pipeline.data_dir, PathBuf::from("/srv/manifest"));
        assert_eq!(settings.pipeline.top_categories, 7);
        assert_eq!(settings.pipeline.item_table, "Items");
        assert_eq!(settings.pipeline.download_read_timeout_secs, 60);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_cli_flags_override_config_file() {
        let file = FileConfig {
            data_dir: Some(PathBuf::from("/srv/manifest")),
            language: Some("fr".to_string()),
            verbosity: Some(VerbositySetting::Debug),
            ..FileConfig::default()
        };
        let cli = parse(&["download", "-l", "de", "-d", "/tmp/other", "-q"]);
        let settings = resolve_settings(&cli, Some(&file)).unwrap();
        assert_eq!(settings.pipeline.language, "de");
        assert_eq!(settings.pipeline.data_dir, PathBuf::from("/tmp/other"));
        assert_eq!(settings.log_level, "error");
        assert!(settings.quiet);
    }

    #[test]
    fn test_config_quiet_is_overridden_by_verbose_flag() {
        let file = FileConfig {
            verbosity: Some(VerbositySetting::Quiet),
            ..FileConfig::default()
        };
        let settings = resolve_settings(&parse(&["explore", "-v"]), Some(&file)).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert!(!settings.quiet);

        let settings = resolve_settings(&parse(&["explore"]), Some(&file)).unwrap();
        assert!(settings.quiet);
    }

    #[test]
    fn test_explore_flags_apply() {
        let cli = parse(&[
            "explore",
            "--top",
            "3",
            "--samples",
            "0",
            "--category-table",
            "Cats",
        ]);
        let settings = resolve_settings(&cli, None).unwrap();
        assert_eq!(settings.pipeline.top_categories, 3);
        assert_eq!(settings.pipeline.sample_size, 0);
        assert_eq!(settings.pipeline.category_table, "Cats");
    }

    #[test]
    fn test_blank_language_rejected() {
        let err = resolve_settings(&parse(&["download", "-l", " "]), None).unwrap_err();
        assert!(err.to_string().contains("Language"));
    }

    #[test]
    fn test_resolve_log_level_precedence() {
        assert_eq!(resolve_log_level(0, false, None), "info");
        assert_eq!(resolve_log_level(2, false, None), "trace");
        assert_eq!(resolve_log_level(1, true, None), "error");
        assert_eq!(
            resolve_log_level(0, false, Some(VerbositySetting::Debug)),
            "trace"
        );
        assert_eq!(
            resolve_log_level(1, false, Some(VerbositySetting::Quiet)),
            "debug"
        );
    }
}
