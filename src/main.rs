use mycnf::cli::{parse_cli_args, run};
use mycnf::cli_pretty_printing::{failed_to_save, program_failed};
use mycnf::config::set_global_config;
use mycnf::MycnfError;

fn main() {
    human_panic::setup_panic!();

    // Turn CLI arguments into a library object
    let (command, config) = match parse_cli_args() {
        Ok(parsed) => parsed,
        Err(e) => {
            program_failed(&e);
            std::process::exit(1);
        }
    };
    set_global_config(config.clone());

    match run(command, &config) {
        Ok(()) => {}
        Err(e @ MycnfError::Save(_)) => {
            failed_to_save(&e);
            std::process::exit(1);
        }
        Err(e) => {
            program_failed(&e);
            std::process::exit(1);
        }
    }
}
