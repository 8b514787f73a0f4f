use std::path::PathBuf;
use std::sync::Arc;

use crate::cli_pretty_printing;
use crate::config::{self, Config};
use crate::encoding::TextEncoding;
use crate::error::{MycnfError, Result};
use crate::model::ConfigModel;
use crate::placeholders::PlaceholderContext;
use crate::schema::{FieldKind, Schema};
/// This doc string acts as a help message when the uses run '--help' in CLI mode
/// as do all doc strings on fields
use clap::{Parser, Subcommand};
use log::{debug, trace};

/// The struct for Clap CLI arguments
#[derive(Parser)]
#[command(version, about = "Form editor for MySQL option files", long_about = None)]
pub struct Opts {
    /// The option file to edit. Defaults to my.ini next to the executable
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// A schema file (TOML) to use instead of the built-in MySQL catalog
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// A level of verbosity, and can be used multiple times
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,

    /// Do not write keys or sections the schema does not know about
    #[arg(long)]
    drop_unknown: bool,

    /// What to do. Opens the editor when omitted
    #[command(subcommand)]
    command: Option<Command>,
}

/// Subcommands of the CLI.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the interactive form editor
    Edit,
    /// Print every field with its value and state
    Show {
        /// Only show this section
        section: Option<String>,
        /// Print the stored entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the stored value of one key
    Get {
        /// Section name
        section: String,
        /// Key name
        key: String,
    },
    /// Validate and store a value, enabling the key, then save
    Set {
        /// Section name
        section: String,
        /// Key name
        key: String,
        /// New value
        value: String,
    },
    /// Flip a key between enabled and commented out, then save
    Toggle {
        /// Section name
        section: String,
        /// Key name
        key: String,
    },
    /// Restore a field's default value, then save
    Reset {
        /// Section name
        section: String,
        /// Key name
        key: String,
    },
    /// Write a new option file holding only the defaults
    Init {
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
    /// List the fields the schema declares
    Schema {
        /// Print the built-in catalog as TOML, to start a custom schema from
        #[arg(long)]
        toml: bool,
    },
}

/// Parse CLI Arguments turns a Clap Opts struct, seen above
/// Into a library Struct for use within the program
/// The library struct can be found in the [config](../config) folder.
pub fn parse_cli_args() -> Result<(Command, Config)> {
    let opts: Opts = Opts::parse();
    let min_log_level = match opts.verbose {
        0 => "Warn",
        1 => "Info",
        2 => "Debug",
        _ => "Trace",
    };
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, min_log_level),
    );

    trace!("Program was called with CLI 😉");
    cli_args_into_config_struct(opts)
}

/// Turns our CLI arguments into a config struct, with the preference file
/// applied underneath the flags.
fn cli_args_into_config_struct(opts: Opts) -> Result<(Command, Config)> {
    let mut config = Config::default();

    if let Some(path) = config::preferences_path() {
        if let Some(preferences) = config::load_preferences(&path)? {
            preferences.apply(&mut config);
        }
    }

    config.verbose = opts.verbose;
    config.quiet = opts.quiet;
    if let Some(file) = opts.file {
        config.ini_path = file;
    }
    if opts.schema.is_some() {
        config.schema_path = opts.schema;
    }
    if opts.drop_unknown {
        config.keep_unknown_keys = false;
    }

    debug!("Editing {}", config.ini_path.display());
    Ok((opts.command.unwrap_or(Command::Edit), config))
}

/// Loads the schema named by `config`, or the built-in one.
pub fn load_schema(config: &Config) -> Result<Arc<Schema>> {
    let context = PlaceholderContext::detect(&config.app_dir);
    let schema = match &config.schema_path {
        Some(path) => Schema::from_file(path, &context)?,
        None => Schema::builtin(&context)?,
    };
    Ok(Arc::new(schema))
}

/// Loads the option file named by `config`.
pub fn open_model(config: &Config) -> Result<ConfigModel> {
    let mut model = ConfigModel::load(&config.ini_path, load_schema(config)?);
    model.set_keep_unknown(config.keep_unknown_keys);
    Ok(model)
}

fn save(model: &mut ConfigModel) -> Result<()> {
    model.save()?;
    cli_pretty_printing::saved_successfully(model.path());
    Ok(())
}

/// Runs one subcommand to completion.
pub fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Edit => {
            let model = open_model(config)?;
            crate::tui::run_editor(model, config)
                .map_err(|e| MycnfError::Io(std::io::Error::other(e.to_string())))
        }
        Command::Show { section, json } => {
            let model = open_model(config)?;
            if json {
                cli_pretty_printing::show_model_json(&model)
            } else {
                cli_pretty_printing::show_model(&model, section.as_deref())
            }
        }
        Command::Get { section, key } => {
            let model = open_model(config)?;
            let entry = model
                .get(&section, &key)
                .ok_or_else(|| MycnfError::UnknownField {
                    section: section.clone(),
                    key: key.clone(),
                })?;
            cli_pretty_printing::print_value(&entry.value);
            if !entry.active {
                cli_pretty_printing::warning_message(&format!(
                    "[{}] {} is commented out",
                    section, key
                ));
            }
            Ok(())
        }
        Command::Set {
            section,
            key,
            value,
        } => {
            let mut model = open_model(config)?;
            model.set(&section, &key, &value)?;
            let toggles_presence = model
                .schema()
                .lookup(&section, &key)
                .map(|f| f.kind == FieldKind::Raw)
                .unwrap_or(false);
            if !toggles_presence {
                model.set_active(&section, &key, true)?;
            }
            save(&mut model)
        }
        Command::Toggle { section, key } => {
            let mut model = open_model(config)?;
            let active = model.toggle_active(&section, &key)?;
            save(&mut model)?;
            cli_pretty_printing::toggled(&section, &key, active);
            Ok(())
        }
        Command::Reset { section, key } => {
            let mut model = open_model(config)?;
            model.reset(&section, &key)?;
            let disabled = model.get(&section, &key).map(|e| !e.active).unwrap_or(false);
            save(&mut model)?;
            if disabled {
                cli_pretty_printing::value_is_disabled(&section, &key);
            }
            Ok(())
        }
        Command::Init { force } => {
            let path = &config.ini_path;
            if path.exists() && !force && !cli_pretty_printing::confirm_overwrite(path) {
                return Ok(());
            }
            let mut model =
                ConfigModel::from_text(path, "", TextEncoding::platform(), load_schema(config)?);
            model.set_keep_unknown(config.keep_unknown_keys);
            save(&mut model)
        }
        Command::Schema { toml: true } => {
            print!("{}", Schema::builtin_source());
            Ok(())
        }
        Command::Schema { toml: false } => {
            cli_pretty_printing::print_schema(&*load_schema(config)?);
            Ok(())
        }
    }
}
