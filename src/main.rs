//! CLI driver: reads the whole program from standard input, wires up
//! logging, runs it to a fixed point, and prints the result. Exit code is
//! always `0`, matching the original's `er()`/`exit(0)` behaviour — a parse
//! failure is reported as a single diagnostic line on standard error instead
//! of a nonzero exit.

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::io::Read;

fn verbosity_from_args() -> LevelFilter {
    let mut level = LevelFilter::Info;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" => level = LevelFilter::Debug,
            "-vv" => level = LevelFilter::Trace,
            _ => {}
        }
    }
    level
}

fn main() {
    let level = verbosity_from_args();
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto);

    let mut src = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut src) {
        log::error!("failed to read program from stdin: {e}");
        return;
    }

    match pfp_datalog::run(&src) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => log::error!("{e}"),
    }
}
