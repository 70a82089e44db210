use clap::Parser;

/// This is a survey tabulation program: it aggregates health technology and wellbeing
/// survey responses into region summaries.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file describing the dashboard: data sources, instruments and rules.
    /// For more information about the file format, read the manual of the survey_metrics crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary in JSON format. If provided, surveytab will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file containing the survey responses. Setting this option overrides
    /// the data sources of the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default json) The type of the input: json, csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default asean) The survey instrument of the input: asean, hong_kong or hong_kong_dementia.
    #[clap(long, value_parser)]
    pub instrument: Option<String>,

    /// The name of the region in the summary.
    #[clap(long, value_parser)]
    pub region: Option<String>,

    /// If specified, only the respondents of this country code are summarized (HQ_COUNTRY).
    #[clap(long, value_parser)]
    pub country: Option<String>,

    /// If passed as an argument, one summary is produced for each country of the input.
    #[clap(long, takes_value = false)]
    pub split_by_country: bool,

    /// The field holding the identifier of each respondent.
    #[clap(long, value_parser)]
    pub id_field: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (flag or failFast) What to do with records that do not match the instrument.
    #[clap(long, value_parser)]
    pub validation: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
