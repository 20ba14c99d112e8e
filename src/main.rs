use clap::Parser;

use portfolio_cli::app::{commands, App};
use portfolio_cli::cli::{Cli, Commands};
use portfolio_cli::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let mut app = App::bootstrap(cli.config.as_deref())?;

    match cli.command {
        Commands::Show => commands::show(&mut app).await?,
        Commands::List => commands::list(&app),
        Commands::Add { symbol, quantity } => commands::add(&mut app, &symbol, quantity).await?,
        Commands::Remove { symbol } => commands::remove(&mut app, &symbol)?,
        Commands::Set { symbol, quantity } => commands::set(&mut app, &symbol, quantity)?,
        Commands::Refresh => commands::refresh(&mut app).await?,
        Commands::Import { file } => commands::import(&mut app, &file).await?,
        Commands::Export { file } => commands::export(&app, file.as_deref())?,
        Commands::Link => commands::link(&app),
        Commands::Open { link } => commands::open(&mut app, &link)?,
    }

    Ok(())
}
