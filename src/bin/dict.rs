use std::io;
use std::process::ExitCode;

use cdict::{Config, Session};
use log::{error, info};

fn main() -> ExitCode {
    env_logger::builder().init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    info!("starting session with {:?}", config.dict);

    let mut session = match Session::with_config(config.dict) {
        Ok(session) => session,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    match session.run(stdin.lock(), stdout.lock()) {
        Ok(()) => {
            info!("session closed with {} entries", session.dict().size());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
