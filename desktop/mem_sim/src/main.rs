use std::{io, process};

use env_logger::{Builder, Env};
use log::{debug, error};
use page_sim::{execute, CommandReader, PageAllocator, PageSimConfig};

fn main() {
    Builder::from_env(Env::default())
        .format_module_path(false)
        .init();

    let config = match PageSimConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            process::exit(1);
        }
    };

    let mut allocator = match PageAllocator::new(config) {
        Ok(allocator) => allocator,
        Err(err) => {
            error!("Could not create page allocator: {}", err);
            process::exit(1);
        }
    };

    let input = match io::read_to_string(io::stdin()) {
        Ok(input) => input,
        Err(err) => {
            error!("Could not read commands: {}", err);
            process::exit(1);
        }
    };

    for command in CommandReader::new(&input) {
        let command = match command {
            Ok(command) => command,
            Err(err) => {
                error!("Stopped reading commands: {}", err);
                break;
            }
        };

        match execute(&mut allocator, command) {
            Ok(report) => println!("{}", report),
            Err(err) if err.is_fatal() => {
                println!("{}", err);
                error!("Cannot continue after {:?}", err.source);
                process::exit(1);
            }
            Err(err) => println!("{}", err),
        }
    }

    debug!("All commands processed");
}
