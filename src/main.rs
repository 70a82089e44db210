use log::{debug, info};

use std::path::Path;
use std::process::exit;

use clap::Parser;

mod args;
mod survey;

use crate::args::Args;
use crate::survey::*;

fn source_from_args(args: &Args, input: &str) -> FileSource {
    let mut cfs = FileSource::new(
        args.input_type.as_deref().unwrap_or("json"),
        input,
        args.instrument.as_deref().unwrap_or("asean"),
    );
    cfs.region = args.region.clone();
    cfs.country_code = args.country.clone();
    cfs.split_by_country = Some(args.split_by_country);
    cfs.id_field = args.id_field.clone();
    cfs.excel_worksheet_name = args.excel_worksheet_name.clone();
    cfs
}

fn run(args: &Args) -> SResult<()> {
    match (&args.config, &args.input) {
        (Some(config_path), input) => {
            let overrides = input.as_ref().map(|i| source_from_args(args, i));
            run_dashboard(
                config_path.clone(),
                args.reference.clone(),
                args.out.clone(),
                overrides,
                args.validation.clone(),
            )?;
        }
        (None, Some(input)) => {
            let config = DashboardConfig {
                output_settings: OutputSettings::named(input),
                sources: vec![source_from_args(args, input)],
                rules: SurveyRules {
                    validation: args.validation.clone(),
                },
            };
            run_dashboard_config(
                &config,
                Path::new("."),
                args.reference.clone(),
                args.out.clone(),
            )?;
        }
        (None, None) => {
            return MissingInputSnafu {}.fail();
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    debug!("args: {:?}", args);

    if let Err(e) = run(&args) {
        eprintln!("An error occured: {}", e);
        if let Some(source) = std::error::Error::source(&e) {
            eprintln!("Caused by: {}", source);
        }
        exit(1);
    }
    info!("Done");
}
