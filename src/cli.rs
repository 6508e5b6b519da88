//! Command-line interface definitions using clap
//!
//! 不带子命令时启动 HTTP 服务；带子命令时执行一次性查询后退出。

use clap::{Args, Parser, Subcommand};

/// salatlink - prayer times, reminders and nearby mosques
#[derive(Parser)]
#[command(name = "salatlink")]
#[command(version)]
#[command(about = "Prayer times, devotional reminders and nearby mosques", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 位置参数：坐标优先，其次城市名，都没有时使用配置的兜底位置
#[derive(Args, Debug, Clone, Default)]
pub struct PlaceArgs {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,

    /// City name (used when no coordinates are given)
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub city: Option<String>,

    /// Locate automatically by IP address
    #[arg(long, conflicts_with_all = ["lat", "lon", "city"])]
    pub auto: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show today's prayer times
    Times {
        #[command(flatten)]
        place: PlaceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current and next prayer with time remaining
    Next {
        #[command(flatten)]
        place: PlaceArgs,
    },

    /// Show prayer times for the next 7 days
    Weekly {
        #[command(flatten)]
        place: PlaceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show timezone and GMT offset for a location
    Timezone {
        #[command(flatten)]
        place: PlaceArgs,
    },

    /// Search cities by name
    Search {
        /// City name or part of it
        query: String,
    },

    /// Detect the current location by IP address
    Locate,

    /// List mosques near a location
    Mosques {
        #[command(flatten)]
        place: PlaceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a route to a mosque
    Route {
        /// Destination latitude
        #[arg(long, allow_hyphen_values = true)]
        to_lat: f64,

        /// Destination longitude
        #[arg(long, allow_hyphen_values = true)]
        to_lon: f64,

        /// Travel mode (driving-car, cycling-regular, foot-walking, driving-hgv,
        /// public-transport, scooter, taxi)
        #[arg(long, short = 'm', default_value = "driving-car")]
        mode: String,

        /// Start point (defaults to the configured fallback location)
        #[command(flatten)]
        from: PlaceArgs,

        /// Print turn-by-turn steps
        #[arg(long)]
        steps: bool,
    },

    /// Show adkar
    Adkar {
        /// Category: morning, evening, general (default: one random dhikr)
        category: Option<String>,
    },

    /// Show Quran verses
    Quran {
        /// Verse id
        #[arg(long, conflicts_with = "surah")]
        id: Option<u32>,

        /// All bundled verses of a surah
        #[arg(long)]
        surah: Option<u32>,
    },

    /// Show a random hadith
    Hadith,

    /// Run the reminder scheduler in the foreground and print notifications
    Remind {
        /// Fire one adkar + verse cycle immediately and exit
        #[arg(long)]
        once: bool,

        /// Ask for desktop notification permission before starting
        #[arg(long)]
        desktop: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_server() {
        let cli = Cli::try_parse_from(["salatlink"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_times_with_negative_coordinates() {
        let cli =
            Cli::try_parse_from(["salatlink", "times", "--lat", "-33.9", "--lon", "151.2"]).unwrap();
        match cli.command {
            Some(Commands::Times { place, json }) => {
                assert_eq!(place.lat, Some(-33.9));
                assert_eq!(place.lon, Some(151.2));
                assert!(!json);
            }
            _ => panic!("expected times command"),
        }
    }

    #[test]
    fn test_city_conflicts_with_coordinates() {
        let result = Cli::try_parse_from([
            "salatlink", "next", "--city", "Cairo", "--lat", "1", "--lon", "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["salatlink", "hadith", "-c", "custom.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
    }

    #[test]
    fn test_route_defaults_to_driving() {
        let cli = Cli::try_parse_from([
            "salatlink", "route", "--to-lat", "21.42", "--to-lon", "39.82",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Route { mode, from, .. }) => {
                assert_eq!(mode, "driving-car");
                assert!(from.lat.is_none());
            }
            _ => panic!("expected route command"),
        }
    }
}
