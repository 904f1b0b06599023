use julia_explorer::{app, Config};
use log::error;

fn main() {
    env_logger::init();

    let config = match Config::from_args() {
        Ok(config) => config,
        Err(err) => {
            error!("invalid configuration: {}", err);
            eprintln!("{}", err);
            std::process::exit(2);
        }
    };

    if let Err(err) = app::run(config) {
        error!("{}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
