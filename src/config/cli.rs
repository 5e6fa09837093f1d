use crate::domain::model::SearchMode;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "eatery-discovery")]
#[command(about = "Find restaurants that are open near a location")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// JSON dataset of restaurants and menus to serve from
    #[arg(short, long, default_value = "restaurants.json")]
    pub dataset: String,

    /// Output format for the results
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Open restaurants within the serving radius
    Nearby(LocationArgs),
    /// Open restaurants within the serving radius matching a search
    Search {
        #[command(flatten)]
        location: LocationArgs,

        /// Text matched against names, attributes and menu items
        #[arg(short, long)]
        query: String,

        #[arg(short, long, value_enum, default_value = "all")]
        mode: ModeArg,
    },
}

#[derive(Debug, Clone, Args)]
pub struct LocationArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Wall-clock time as HH:MM; defaults to the local time
    #[arg(long)]
    pub time: Option<String>,

    /// Serving radius in km; defaults to the configured peak/normal radius
    #[arg(long)]
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Name,
    Attributes,
    ItemName,
    ItemAttributes,
    All,
}

impl ModeArg {
    pub fn search_mode(self) -> Option<SearchMode> {
        match self {
            ModeArg::Name => Some(SearchMode::Name),
            ModeArg::Attributes => Some(SearchMode::Attributes),
            ModeArg::ItemName => Some(SearchMode::ItemName),
            ModeArg::ItemAttributes => Some(SearchMode::ItemAttributes),
            ModeArg::All => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_command() {
        let cli = CliConfig::parse_from([
            "eatery-discovery",
            "--dataset",
            "data.json",
            "search",
            "--lat",
            "12.97",
            "--lon",
            "77.59",
            "--query",
            "paneer tikka",
            "--mode",
            "item-name",
        ]);
        assert_eq!(cli.dataset, "data.json");
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Search {
                location,
                query,
                mode,
            } => {
                assert_eq!(location.lat, 12.97);
                assert!(location.radius.is_none());
                assert_eq!(query, "paneer tikka");
                assert_eq!(mode.search_mode(), Some(SearchMode::ItemName));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_nearby_with_negative_longitude() {
        let cli = CliConfig::parse_from([
            "eatery-discovery",
            "--format",
            "csv",
            "nearby",
            "--lat",
            "40.71",
            "--lon",
            "-74.0",
            "--time",
            "19:30",
            "--radius",
            "2.5",
        ]);
        assert_eq!(cli.format, OutputFormat::Csv);
        match cli.command {
            Command::Nearby(location) => {
                assert_eq!(location.lon, -74.0);
                assert_eq!(location.time.as_deref(), Some("19:30"));
                assert_eq!(location.radius, Some(2.5));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
