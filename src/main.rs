use apitrail::model::SnapshotStore;
use apitrail::{Analysis, AnalysisConfig};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "apitrail")]
#[command(about = "Track API evolution across versioned documentation snapshots")]
#[command(version)]
struct Args {
    /// JSON file holding the ordered version snapshots
    snapshots: PathBuf,

    /// JSON analysis configuration; defaults apply when omitted
    config: Option<PathBuf>,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => AnalysisConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => AnalysisConfig::default(),
    };
    let mut store = SnapshotStore::from_json_str(&std::fs::read_to_string(&args.snapshots)?)?;
    tracing::info!(path = %args.snapshots.display(), versions = store.len(), "Loaded snapshots");

    let report = Analysis::new(config).run(&mut store)?;
    if args.json {
        println!("{}", report.to_json_string()?);
    } else {
        print!("{}", report);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Analysis failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_positional_and_flag() {
        let args = Args::try_parse_from(["apitrail", "snaps.json", "config.json", "--json"]).unwrap();
        assert_eq!(args.snapshots, PathBuf::from("snaps.json"));
        assert_eq!(args.config, Some(PathBuf::from("config.json")));
        assert!(args.json);

        let args = Args::try_parse_from(["apitrail", "snaps.json"]).unwrap();
        assert_eq!(args.config, None);
        assert!(!args.json);
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err = Args::try_parse_from(["apitrail", "snaps.json", "--cfg", "x.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
        assert!(Args::try_parse_from(["apitrail"]).is_err());
        assert!(Args::try_parse_from(["apitrail", "a.json", "b.json", "c.json"]).is_err());
    }
}
