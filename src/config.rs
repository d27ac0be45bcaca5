use shellexpand::tilde;
use crate::utils::HoldupError;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_yaml as yml;
use std::{fs, path};
use serde::{Serialize, Deserialize};
use log::{LevelFilter, debug};
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder
};

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) workplace: String,
    pub(crate) config_name: String,
    pub(crate) address: String,
    pub(crate) port: u16,
    pub(crate) debug_file: Option<String>,
    pub(crate) intercept_on_start: bool,
    pub(crate) include: Vec<String>,
    pub(crate) exclude: Vec<String>,
    pub(crate) event_buffer: usize
}

impl Default for Config {
    fn default() -> Self {
        let expanded_path = tilde("~/.holdup/").to_string();
        Config {
            workplace: expanded_path.clone(),
            config_name: format!("{}{}", &expanded_path, "config.yaml"),
            address: "127.0.0.1".to_string(),
            port: 8080_u16,
            debug_file: None,
            intercept_on_start: false,
            include: Vec::default(),
            exclude: Vec::default(),
            event_buffer: 1024
        }
    }
}

// -----------------------------------------------------------------------------------------------//

fn cli() -> Command {
    let workplace_help = "Path to workplace, where data (configs, logs, etc.) will be stored";
    let config_help = "Path to config with YAML format";
    let address_help = "Address for proxy to bind, default: 127.0.0.1";
    let port_help = "Port for proxy to listen to, default: 8080";
    let debug_file_help = "A file to write debug messages, mostly needed for development";
    let intercept_help = "Start with interception enabled and the intercept window open";

    Command::new("holdup")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Hold HTTP requests for inspection, then forward or drop them one by one")
        .bin_name("holdup")
        .arg(
            Arg::new("workplace")
                .short('P')
                .long("workplace")
                .default_value("~/.holdup/")
                .value_name("WORKPLACE_DIR")
                .help(workplace_help)
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("YAML_CONFIG")
                .help(config_help)
        )
        .arg(
            Arg::new("address")
                .short('a')
                .long("address")
                .value_name("ADDR")
                .help(address_help)
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help(port_help)
        )
        .arg(
            Arg::new("debug-file")
                .long("debug-file")
                .value_name("FILE-TO-WRITE")
                .help(debug_file_help)
        )
        .arg(
            Arg::new("intercept")
                .short('i')
                .long("intercept")
                .action(ArgAction::SetTrue)
                .help(intercept_help)
        )
}

pub(crate) fn handle_user_input() -> Result<Config, HoldupError> {
    let matches = cli().get_matches();
    let config = config_from_matches(&matches)?;

    if let Some(dfile) = config.debug_file.as_ref() {
        enable_debug_log(dfile)?;
        debug!("Debugging enabled");
    }

    Ok(config)
}

fn config_from_matches(matches: &ArgMatches) -> Result<Config, HoldupError> {
    let workplace = tilde(
        matches
            .get_one::<String>("workplace")
            .ok_or(HoldupError::ConfigError("'--workplace' arg not found".to_owned()))?
    ).to_string();

    let config_name = match matches.get_one::<String>("config") {
        Some(name) => tilde(name).to_string(),
        None => path::Path::new(&workplace)
            .join("config.yaml")
            .to_string_lossy()
            .to_string()
    };

    let workplace_path = path::Path::new(&workplace);
    if !workplace_path.exists() {
        fs::create_dir_all(workplace_path)?;
    }

    let config_path = path::Path::new(&config_name);
    let mut config = if config_path.exists() {
        let file = fs::File::open(&config_name)?;
        let mut config_from_file: Config = yml::from_reader(file)?;
        config_from_file.workplace = workplace;
        config_from_file.config_name = config_name;
        config_from_file
    }
    else {
        let default_config = Config {
            workplace,
            config_name,
            ..Default::default()
        };
        let file = fs::File::create(&default_config.config_name)?;
        let yaml_config = yml::to_value(&default_config)?;
        yml::to_writer(file, &yaml_config)?;
        default_config
    };

    if let Some(addr) = matches.get_one::<String>("address") {
        config.address = addr.to_string();
    }

    if let Some(port) = matches.get_one::<String>("port") {
        config.port = port.parse()?;
    }

    if let Some(dfile) = matches.get_one::<String>("debug-file") {
        config.debug_file = Some(tilde(dfile).to_string());
    }

    if matches.get_flag("intercept") {
        config.intercept_on_start = true;
    }

    if config.event_buffer == 0 {
        return Err(HoldupError::ConfigError("'event_buffer' must be greater than zero".to_owned()));
    }

    Ok(config)
}

/// The terminal belongs to the UI, so log records only ever go to a file.
fn enable_debug_log(path: &str) -> Result<(), HoldupError> {
    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S%.3f)} {l:<5} {t} - {m}{n}")))
        .build(path)?;

    let log_config = log4rs::Config::builder()
        .appender(Appender::builder().build("debug-file", Box::new(appender)))
        .build(
            Root::builder()
                .appender("debug-file")
                .build(LevelFilter::Debug)
        )?;

    log4rs::init_config(log_config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, HoldupError> {
        let matches = cli().try_get_matches_from(args).unwrap();
        config_from_matches(&matches)
    }

    #[test]
    fn missing_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let workplace = dir.path().join("wp");
        let workplace = workplace.to_str().unwrap();

        let config = parse(&["holdup", "-P", workplace]).unwrap();

        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(!config.intercept_on_start);
        assert!(path::Path::new(&config.config_name).exists());
    }

    #[test]
    fn file_values_then_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.yaml");
        fs::write(
            &config_path,
            "port: 9000\naddress: 0.0.0.0\ninclude:\n  - example\\.com\n"
        ).unwrap();

        let config = parse(&[
            "holdup",
            "-P", dir.path().to_str().unwrap(),
            "-c", config_path.to_str().unwrap(),
            "-p", "9100",
            "--intercept",
        ]).unwrap();

        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.port, 9100);
        assert_eq!(config.include, vec!["example\\.com".to_string()]);
        assert!(config.exclude.is_empty());
        assert!(config.intercept_on_start);
        assert_eq!(config.event_buffer, 1024);
    }

    #[test]
    fn bad_port_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse(&["holdup", "-P", dir.path().to_str().unwrap(), "-p", "http"]);
        assert!(matches!(result, Err(HoldupError::ConfigError(_))));
    }

    #[test]
    fn zero_event_buffer_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("c.yaml");
        fs::write(&config_path, "event_buffer: 0\n").unwrap();

        let result = parse(&[
            "holdup",
            "-P", dir.path().to_str().unwrap(),
            "-c", config_path.to_str().unwrap(),
        ]);
        assert!(matches!(result, Err(HoldupError::ConfigError(_))));
    }
}
