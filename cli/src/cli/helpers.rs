use std::path::Path;

use anyhow::Context;
use app::{ConfigBuilder, Settings};

use super::argparse;

pub fn get_settings(args: &argparse::MatchingConfig) -> anyhow::Result<Settings> {
    get_settings_with(args.config.as_deref(), |c| {
        c.acceptance_threshold(args.threshold)
            .similarity_metric(args.metric)
            .gap_marker(args.gap_marker.as_deref())
            .frame_rate(args.frame_rate)
            .resolve_timeout_ms(args.timeout_ms)
    })
}

pub fn get_settings_with(
    config_file: Option<&Path>,
    overrides: impl FnOnce(ConfigBuilder) -> ConfigBuilder,
) -> anyhow::Result<Settings> {
    let builder = ConfigBuilder::new()
        .context("could not create config builder")?
        .load_environment(true)
        .config_file(config_file)
        .context("could not set config file")?;
    overrides(builder)
        .build()
        .context("could not build app config")
}
