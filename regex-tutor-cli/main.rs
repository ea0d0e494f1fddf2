use std::{env, io::Write};

mod args;
mod cmd;
mod logger;
mod util;

fn main() -> anyhow::Result<()> {
    let level = match env::var("RUST_LOG").as_deref().unwrap_or("") {
        "" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        unk => anyhow::bail!("unrecognized log level '{}'", unk),
    };
    logger::Logger::init()?;
    log::set_max_level(level);

    if let Err(err) = cmd::run(&mut lexopt::Parser::from_env()) {
        let mut stderr = std::io::stderr();
        // Nothing sensible is left to do if stderr is gone.
        let _ = if env::var("RUST_BACKTRACE").map_or(false, |v| v == "1") {
            writeln!(stderr, "{:?}", err)
        } else {
            writeln!(stderr, "{:#}", err)
        };
        std::process::exit(1);
    }
    Ok(())
}
