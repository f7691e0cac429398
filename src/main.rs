use clap::Parser;
use log::*;
use std::{path::Path, process, rc::Rc};

use relay_release::{
    Orchestrator, Result, ci,
    cli::Args,
    config::ReleaseConfig,
    forge::{config::RemoteConfig, github::Github},
    repo::{Repository, remote::RepoRef},
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("relay_release")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

async fn execute(args: &Args) -> Result<()> {
    let config = ReleaseConfig::from_args(args)?;

    let repo = Repository::open(Path::new(&args.repo_path), config.token.clone())?;
    let repo_ref = RepoRef::resolve(&repo, config.sha.clone())?;

    ci::set_output("organization", &repo_ref.organization)?;

    let forge = Github::new(RemoteConfig::new(&repo_ref, config.token.clone()))?;

    let orchestrator = Orchestrator::builder()
        .config(Rc::new(config))
        .repo_ref(Rc::new(repo_ref))
        .git(Rc::new(repo))
        .forge(Rc::new(forge))
        .build()?;

    orchestrator.run().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    initialize_logger(args.debug)?;

    if let Err(err) = execute(&args).await {
        error!("{err}");
        println!("{}", ci::error_annotation(&err.to_string()));
        eprintln!("{:?}", color_eyre::Report::new(err));
        process::exit(1);
    }

    Ok(())
}
