use std::env;
use std::path::Path;

use anyhow::Result;
use chrono::Local;

use sales_report::config::Config;
use sales_report::notify::channels::Channel;
use sales_report::pipeline;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let config = match args.len() {
        1 => Config::default(),
        2 => Config::load(Path::new(&args[1]))?,
        _ => {
            eprintln!("Usage: cargo run -- [config.toml]");
            std::process::exit(1);
        },
    };

    let channel = Channel::from(config.channel);
    pipeline::run(&config, Local::now().date_naive(), &channel)?;

    Ok(())
}
