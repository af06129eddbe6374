use std::path::PathBuf;

use clap::{ArgAction, Parser};

use csv_to_sheets::application::BatchOptions;
use csv_to_sheets::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "csv-to-sheets")]
#[command(about = "Upload every CSV file of a ZIP archive as a Google Sheets spreadsheet")]
#[command(version)]
pub struct Args {
    /// ZIP archive holding the CSV files
    pub archive: PathBuf,

    /// Service-account JSON key file
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Drive folder the spreadsheets are moved into
    #[arg(long = "folder")]
    pub folder_id: Option<String>,

    /// Directory CSV files are extracted to before upload
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Only list the CSV files that would be uploaded
    #[arg(long, conflicts_with = "dry_run")]
    pub list: bool,

    /// Upload to an in-memory remote instead of Google
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// More output per occurrence (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    List,
    DryRun,
    Upload { credentials: Option<PathBuf> },
}

/// Flags merged over the loaded configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub archive: PathBuf,
    pub mode: Mode,
    pub batch: BatchOptions,
}

impl Args {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    pub fn resolve(self, config: AppConfig) -> Settings {
        let mode = if self.list {
            Mode::List
        } else if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Upload {
                credentials: self.credentials.or(config.credentials),
            }
        };

        let defaults = BatchOptions::default();
        Settings {
            archive: self.archive,
            mode,
            batch: BatchOptions {
                folder_id: self.folder_id.or(config.folder_id),
                work_dir: self
                    .work_dir
                    .or(config.work_dir)
                    .unwrap_or(defaults.work_dir),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("csv-to-sheets").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_config() {
        let config = AppConfig {
            credentials: Some("config.json".into()),
            folder_id: Some("config-folder".into()),
            work_dir: Some("/config/work".into()),
        };

        let settings = parse(&["data.zip", "--credentials", "flag.json", "--folder", "F"])
            .resolve(config);

        assert_eq!(settings.archive, PathBuf::from("data.zip"));
        assert_eq!(
            settings.mode,
            Mode::Upload {
                credentials: Some("flag.json".into())
            }
        );
        assert_eq!(settings.batch.folder_id.as_deref(), Some("F"));
        assert_eq!(settings.batch.work_dir, PathBuf::from("/config/work"));
    }

    #[test]
    fn test_config_fills_missing_flags() {
        let config = AppConfig {
            credentials: Some("config.json".into()),
            ..Default::default()
        };

        let settings = parse(&["data.zip"]).resolve(config);
        assert_eq!(
            settings.mode,
            Mode::Upload {
                credentials: Some("config.json".into())
            }
        );
        assert_eq!(settings.batch.folder_id, None);
        assert_eq!(settings.batch.work_dir, std::env::temp_dir());
    }

    #[test]
    fn test_modes() {
        assert_eq!(parse(&["a.zip", "--list"]).resolve(AppConfig::default()).mode, Mode::List);
        assert_eq!(parse(&["a.zip", "-n"]).resolve(AppConfig::default()).mode, Mode::DryRun);
        assert!(Args::try_parse_from(["csv-to-sheets", "a.zip", "--list", "--dry-run"]).is_err());
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["a.zip"]).log_level(), tracing::Level::INFO);
        assert_eq!(parse(&["a.zip", "-v"]).log_level(), tracing::Level::DEBUG);
        assert_eq!(parse(&["a.zip", "-vvv"]).log_level(), tracing::Level::TRACE);
    }
}
