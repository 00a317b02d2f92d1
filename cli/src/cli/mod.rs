pub mod argparse;
mod helpers;

pub use argparse::get_args;

mod workflow {
    use std::io::Write;

    use anyhow::Context;
    use app::HighlightStatus;

    use super::{argparse, helpers};

    pub(crate) fn align(args: &argparse::AlignOpts) -> anyhow::Result<()> {
        let settings = helpers::get_settings(&args.matching)?;
        let transcript = app::load_transcript_file(&args.transcript)
            .with_context(|| format!("could not load transcript {:?}", args.transcript))?;
        let requests = app::load_highlights_file(&args.highlights)
            .with_context(|| format!("could not load highlights {:?}", args.highlights))?;

        let outcomes = app::resolve_batch(&transcript, &requests, &settings)
            .context("could not resolve highlights")?;

        let resolved = outcomes
            .iter()
            .filter(|o| o.status == HighlightStatus::Resolved)
            .count();
        log::info!("resolved {}/{} highlights", resolved, outcomes.len());

        let json = serde_json::to_string_pretty(&outcomes)?;
        match &args.out {
            Some(path) => std::fs::write(path, json)
                .with_context(|| format!("could not write {:?}", path))?,
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", json)?;
            }
        }
        Ok(())
    }
}

mod timecode {
    use shorts_core::timecode::Timecode;

    use super::{argparse, helpers};

    pub(crate) fn timecode(args: &argparse::TimecodeOpts) -> anyhow::Result<()> {
        let frame_rate = match args.frame_rate {
            Some(fps) => fps,
            None => helpers::get_settings_with(args.config.as_deref(), |c| c)?.frame_rate()?,
        };
        anyhow::ensure!(frame_rate > 0, "frame rate must be greater than zero");
        let tc = Timecode::from_seconds(args.seconds, frame_rate);
        println!("{}", tc);
        Ok(())
    }
}

mod debug_utils {
    use super::{argparse, helpers};

    pub(crate) fn show_config(args: &argparse::ShowConfig) -> anyhow::Result<()> {
        let settings = helpers::get_settings(&args.matching)?;
        match settings.config_file() {
            Some(path) => println!("config file: {}", path),
            None => println!("config file: none"),
        }
        let cfg = settings.match_config()?;
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        match settings.resolve_timeout()? {
            Some(t) => println!("resolve timeout: {:?}", t),
            None => println!("resolve timeout: none"),
        }
        Ok(())
    }
}

pub fn run_cli(args: &argparse::CliOpts) -> anyhow::Result<()> {
    match &args.subcmd {
        argparse::SubCommand::Align(opts) => workflow::align(opts),
        argparse::SubCommand::Timecode(opts) => timecode::timecode(opts),
        argparse::SubCommand::ShowConfig(opts) => debug_utils::show_config(opts),
    }
}
