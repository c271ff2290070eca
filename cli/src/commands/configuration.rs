use std::process::exit;

use worklog::config::{self, ApiConfiguration, AppConfiguration, SubmissionSettings};

use crate::cli::{ConfigCommand, UpdateConfiguration};

fn configuration_file_name() -> String {
    config::configuration_file().map_or_else(
        |_| "<unknown>".to_string(),
        |path| path.to_string_lossy().to_string(),
    )
}

fn list_and_exit() {
    println!("Configuration file {}:\n", configuration_file_name());

    match config::load().map(|config| config::application_config_to_string(&config)) {
        Ok(Ok(toml_as_string)) => {
            println!("{toml_as_string}");
        }
        Ok(Err(e)) => {
            eprintln!("ERROR: Unable to render the configuration: {e}");
            exit(4);
        }
        Err(_) => {
            println!("Config file does not exist or is empty. Use 'config update --url' to create it");
        }
    }
    exit(0);
}

/// Merges the supplied settings into the existing configuration, or creates a new one
fn updated_configuration(update: UpdateConfiguration) -> Result<AppConfiguration, String> {
    let mut app_config = match (config::load(), update.url.clone()) {
        (Ok(existing), _) => existing,
        (Err(_), Some(url)) => AppConfiguration {
            api: ApiConfiguration { url },
            submission: SubmissionSettings::default(),
        },
        (Err(e), None) => {
            return Err(format!(
                "{e}. Use --url to create a new configuration file"
            ))
        }
    };

    if let Some(url) = update.url {
        app_config.api.url = url;
    }
    if let Some(jira_instance) = update.jira_instance {
        app_config.submission.jira_instance = jira_instance;
    }
    if let Some(secs) = update.poll_interval_secs {
        app_config.submission.poll_interval_secs = secs;
    }
    if let Some(secs) = update.max_poll_secs {
        app_config.submission.max_poll_secs = Some(secs);
    }
    Ok(app_config)
}

pub fn execute(config: ConfigCommand) {
    match config {
        // List current configuration
        ConfigCommand::List => {
            list_and_exit();
        }
        // Add new values to the configuration
        ConfigCommand::Update(update) => {
            let app_config = match updated_configuration(update) {
                Ok(ac) => ac,
                Err(e) => {
                    eprintln!(
                        "ERROR: Unable to load or create configuration file {}, reason:{}",
                        configuration_file_name(),
                        e
                    );
                    exit(4);
                }
            };
            if let Err(e) = config::save(&app_config) {
                eprintln!("ERROR: Unable to save the application config: {e}");
                exit(4);
            }
            println!("Configuration saved to {}", configuration_file_name());
            exit(0);
        }
        ConfigCommand::Remove => match config::remove() {
            Ok(()) => {
                println!("Configuration file {} removed", configuration_file_name());
            }
            Err(e) => {
                println!(
                    "ERROR:Unable to remove configuration file {} : {}",
                    configuration_file_name(),
                    e
                );
            }
        },
    }
}
