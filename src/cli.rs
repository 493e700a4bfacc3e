use std::error::Error;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum, error::ErrorKind};
use tracing_subscriber::EnvFilter;

use crate::config::{ColumnLayout, ConvertConfig, InputEncoding};
use crate::convert::convert_file;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Latin1,
    Utf8,
}

impl From<EncodingArg> for InputEncoding {
    fn from(value: EncodingArg) -> Self {
        match value {
            EncodingArg::Latin1 => InputEncoding::Latin1,
            EncodingArg::Utf8 => InputEncoding::Utf8,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "darwin-kml",
    version,
    disable_help_subcommand = true,
    about = "Convert Darwin Core occurrence exports to KML",
    long_about = "Convert a delimited Darwin Core occurrence export into a KML document with one placemark per row, nested folders per grouping field, and one icon color per innermost folder.",
    after_help = "Grouping fields default to genus, then specificEpithet. Coordinates are written as longitude,latitude."
)]
/// CLI for `darwin-kml`.
///
/// Common usage:
/// - Tab-delimited export with default grouping: `darwin-kml in.txt out.kml`
/// - Comma-delimited with a custom hierarchy: `--delimiter , --group-by family --group-by genus`
/// - Flat document without folders: `--no-groups`
struct ConvertCli {
    #[arg(value_name = "INPUT", help = "Delimited occurrence file (first row is the header)")]
    input: PathBuf,
    #[arg(value_name = "OUTPUT", help = "KML file to write")]
    output: PathBuf,
    #[arg(
        long,
        default_value = "\\t",
        value_parser = parse_delimiter,
        help = "Cell delimiter: a single character, or \\t for tab"
    )]
    delimiter: u8,
    #[arg(
        long = "group-by",
        value_name = "FIELD",
        action = ArgAction::Append,
        help = "Grouping field, repeat in nesting order (space-join names to combine fields)"
    )]
    group_by: Vec<String>,
    #[arg(
        long = "no-groups",
        conflicts_with = "group_by",
        help = "Write every placemark at the document root"
    )]
    no_groups: bool,
    #[arg(long, value_enum, default_value_t = EncodingArg::Latin1, help = "Input text encoding")]
    encoding: EncodingArg,
    #[arg(long, help = "Treat double quotes as cell quoting")]
    quoting: bool,
    #[arg(
        long,
        value_name = "PATH",
        help = "JSON array of {\"title\", \"key\"} objects replacing the description layout"
    )]
    layout: Option<PathBuf>,
    #[arg(
        long = "log-level",
        default_value = "info",
        help = "Log filter used when RUST_LOG is unset"
    )]
    log_level: String,
}

impl ConvertCli {
    fn into_config(self) -> Result<ConvertConfig, Box<dyn Error>> {
        let defaults = ConvertConfig::default();
        let group_by = if self.no_groups {
            Vec::new()
        } else if self.group_by.is_empty() {
            defaults.group_by.clone()
        } else {
            self.group_by
        };
        let layout = match self.layout {
            Some(path) => ColumnLayout::from_json_path(path)?,
            None => defaults.layout.clone(),
        };
        Ok(ConvertConfig {
            delimiter: self.delimiter,
            quoting: self.quoting,
            encoding: self.encoding.into(),
            group_by,
            layout,
            ..defaults
        })
    }
}

/// Parse `args_iter` (program name excluded), convert, and print a summary.
pub fn run<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) =
        parse_cli::<ConvertCli, _>(std::iter::once("darwin-kml".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    init_logging(&cli.log_level);

    let input = cli.input.clone();
    let output = cli.output.clone();
    let config = cli.into_config()?;
    let summary = convert_file(&input, &output, &config)?;

    println!("=== darwin-kml ===");
    println!("input:        {}", input.display());
    println!("output:       {}", output.display());
    println!("rows read:    {}", summary.rows_read);
    println!("grouped:      {}", summary.grouped);
    println!("ungrouped:    {}", summary.ungrouped);
    println!("skipped:      {}", summary.skipped.len());
    println!("folders:      {}", summary.folders);
    println!("leaf groups:  {}", summary.leaf_groups);
    for skipped in &summary.skipped {
        println!(
            "  skipped row {} (missing '{}')",
            skipped.row, skipped.missing_key
        );
    }
    Ok(())
}

fn init_logging(level: &str) {
    // A subscriber may already be installed when `run` is called more than once.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    if matches!(raw, "\\t" | "tab") {
        return Ok(b'\t');
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii() && ch != '\n' && ch != '\r' => Ok(ch as u8),
        _ => Err(format!(
            "invalid delimiter '{raw}': expected one ASCII character or \\t"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ConvertCli {
        ConvertCli::try_parse_from(std::iter::once("darwin-kml").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_match_darwin_core_export() {
        let config = parse(&["in.txt", "out.kml"]).into_config().unwrap();
        assert_eq!(config.delimiter, b'\t');
        assert_eq!(config.group_by, vec!["genus", "specificEpithet"]);
        assert_eq!(config.encoding, InputEncoding::Latin1);
        assert!(!config.quoting);
    }

    #[test]
    fn group_by_is_repeatable_and_ordered() {
        let config = parse(&[
            "in.csv",
            "out.kml",
            "--delimiter",
            ",",
            "--group-by",
            "family",
            "--group-by",
            "genus",
            "--encoding",
            "utf8",
        ])
        .into_config()
        .unwrap();
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.group_by, vec!["family", "genus"]);
        assert_eq!(config.encoding, InputEncoding::Utf8);
    }

    #[test]
    fn no_groups_clears_grouping() {
        let config = parse(&["in.txt", "out.kml", "--no-groups"])
            .into_config()
            .unwrap();
        assert!(config.group_by.is_empty());
    }

    #[test]
    fn no_groups_conflicts_with_group_by() {
        let result = ConvertCli::try_parse_from([
            "darwin-kml",
            "in.txt",
            "out.kml",
            "--no-groups",
            "--group-by",
            "genus",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn delimiter_parser_accepts_tab_escape_and_single_chars() {
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn help_returns_none() {
        let parsed = parse_cli::<ConvertCli, _>(["darwin-kml", "--help"]).unwrap();
        assert!(parsed.is_none());
    }
}
