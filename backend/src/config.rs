//! Service configuration.
//!
//! Settings come from command-line flags with environment fallbacks
//! (a `.env` file is loaded first by the binary). They are read once at
//! startup and never change afterwards.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{ArgAction, Args};

use crate::models::Dataset;

pub const DEFAULT_SHIPLIST_PATH: &str = "./data/Shiplist-20260112.parquet";
pub const DEFAULT_LICENSELIST_PATH: &str = "./data/Licenselist-20260122-testing.parquet";

/// Locations of the two Parquet datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSources {
    pub shiplist: PathBuf,
    pub licenselist: PathBuf,
}

impl DatasetSources {
    pub fn path(&self, dataset: Dataset) -> &Path {
        match dataset {
            Dataset::Vessels => &self.shiplist,
            Dataset::Lands => &self.licenselist,
        }
    }
}

impl Default for DatasetSources {
    fn default() -> Self {
        Self {
            shiplist: PathBuf::from(DEFAULT_SHIPLIST_PATH),
            licenselist: PathBuf::from(DEFAULT_LICENSELIST_PATH),
        }
    }
}

/// Response shaping switches, the two ways deployments differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// Land licenses grouped by license number instead of a flat list.
    pub group_licenses: bool,
    /// Check every outgoing record against the embedded response schemas.
    pub validate: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            group_licenses: true,
            validate: true,
        }
    }
}

/// Everything the query pipeline needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub sources: DatasetSources,
    pub output: OutputOptions,
    /// Fixed evaluation date for `daysRemaining`; today (local time) when unset.
    pub as_of: Option<NaiveDate>,
}

impl AppConfig {
    pub fn today(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// Dataset and output flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Vessel license dataset (Parquet)
    #[arg(long, global = true, env = "JKPTG_SHIPLIST_PATH", default_value = DEFAULT_SHIPLIST_PATH)]
    pub shiplist: PathBuf,

    /// Land license dataset (Parquet)
    #[arg(long, global = true, env = "JKPTG_LICENSELIST_PATH", default_value = DEFAULT_LICENSELIST_PATH)]
    pub licenselist: PathBuf,

    /// Group land licenses by license number
    #[arg(long, global = true, env = "JKPTG_GROUP_LICENSES", default_value_t = true, action = ArgAction::Set)]
    pub group_licenses: bool,

    /// Validate responses against the embedded schemas
    #[arg(long, global = true, env = "JKPTG_VALIDATE_OUTPUT", default_value_t = true, action = ArgAction::Set)]
    pub validate_output: bool,

    /// Evaluation date for daysRemaining (YYYY-MM-DD, default: today)
    #[arg(long, global = true, env = "JKPTG_AS_OF")]
    pub as_of: Option<NaiveDate>,
}

impl From<ConfigArgs> for AppConfig {
    fn from(args: ConfigArgs) -> Self {
        Self {
            sources: DatasetSources {
                shiplist: args.shiplist,
                licenselist: args.licenselist,
            },
            output: OutputOptions {
                group_licenses: args.group_licenses,
                validate: args.validate_output,
            },
            as_of: args.as_of,
        }
    }
}

/// Address the HTTP server listens on.
pub fn listen_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::try_parse_from([
            "jkptg",
            "--shiplist",
            "/srv/ships.parquet",
            "--group-licenses",
            "false",
            "--as-of",
            "2025-03-01",
        ])
        .unwrap();
        let config = AppConfig::from(cli.config);

        assert_eq!(config.sources.path(Dataset::Vessels), Path::new("/srv/ships.parquet"));
        assert!(!config.output.group_licenses);
        assert_eq!(config.today(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_invalid_as_of_rejected() {
        let result = TestCli::try_parse_from(["jkptg", "--as-of", "01/03/2025"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_listen_addr() {
        assert_eq!(listen_addr(8000).to_string(), "0.0.0.0:8000");
    }
}
