use std::io::{self, BufRead, Write};

use log::{info, warn};

use movingmedian::config::Config;
use movingmedian::{logger, progbase, MedianFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    progbase::init();
    let _ = logger::init_combined_logger();

    if progbase::print_schema() {
        println!("{}", Config::schema());
        return Ok(());
    }

    let config_file = progbase::make_config_file_name("movingmedian", "json");
    let config = Config::load(&config_file)?;
    let window_size = progbase::window_size().unwrap_or(config.window_size);
    let mut filter = MedianFilter::new(window_size)?;
    info!("Moving median over {} observations", window_size);

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    for (number, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<f64>() {
            Ok(value) => writeln!(out, "{}", filter.consume(value))?,
            Err(e) => warn!("Skipping line {}: {:?} is not a number ({})", number + 1, line, e),
        }
    }
    out.flush()?;

    Ok(())
}
