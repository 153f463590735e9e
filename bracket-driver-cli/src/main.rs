mod config;
mod load;
mod session;

use std::path::PathBuf;

use bracket_driver_api::id::TournamentId;
use bracket_driver_api::Client;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::config::{Config, Seconds};
use crate::load::LoadOptions;
use crate::session::{print_finals, Session};

#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct Args {
    /// Path to a TOML config file.
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Base URL of the bracket service.
    #[clap(short = 'H', long)]
    host: Option<String>,
    #[clap(long)]
    loglevel: Option<LevelFilter>,
    /// Teams per tournament.
    #[clap(short, long)]
    teams: Option<u32>,
    /// Seconds between two polls of the match count.
    #[clap(long)]
    poll_interval: Option<Seconds>,
    /// Seconds to wait for the match count to stabilize.
    #[clap(long)]
    poll_timeout: Option<Seconds>,
    /// Consecutive equal match counts required to consider a bracket complete.
    #[clap(long)]
    stable_checks: Option<u32>,
    /// Also score matches that already carry a score.
    #[clap(long)]
    rescore: bool,
    #[clap(long)]
    max_rounds: Option<u32>,
    /// Seconds to wait after every score update.
    #[clap(long)]
    match_delay: Option<Seconds>,
    #[clap(long)]
    bracket_type: Option<bracket_driver_api::tournaments::BracketType>,
    /// Endpoint used to add teams to a group ('group' or 'group_teams').
    #[clap(long)]
    add_teams: Option<bracket_driver_api::tournaments::groups::AddTeamsRoute>,
    /// Add teams to the group one request at a time.
    #[clap(long)]
    one_by_one: bool,
    #[clap(subcommand)]
    command: Command,
}

impl Args {
    /// Overwrites every field of `config` given on the command line.
    fn apply(&self, config: &mut Config) {
        macro_rules! apply {
            ($($name:ident),*$(,)?) => {
                $(
                    if let Some(value) = self.$name.clone() {
                        config.$name = value;
                    }
                )*
            };
        }

        apply!(
            host,
            loglevel,
            teams,
            poll_interval,
            poll_timeout,
            stable_checks,
            max_rounds,
            match_delay,
            bracket_type,
            add_teams,
        );

        if self.rescore {
            config.skip_scored = false;
        }

        if self.one_by_one {
            config.one_by_one = true;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a tournament with a group of teams.
    Provision,
    /// Score playable matches until the bracket is finished.
    Simulate {
        #[clap(long)]
        tournament: TournamentId,
        /// Use random outcomes seeded with this value.
        #[clap(long)]
        seed: Option<u64>,
    },
    /// Wait until the match count of a tournament stabilizes.
    Wait {
        #[clap(long)]
        tournament: TournamentId,
    },
    /// Provision a tournament and wait for it to complete.
    Run {
        /// Simulate the bracket before waiting.
        #[clap(long)]
        simulate: bool,
        #[clap(long)]
        seed: Option<u64>,
    },
    /// Execute many independent runs concurrently.
    Load {
        #[clap(short, long, default_value_t = 10)]
        users: usize,
        #[clap(short = 'j', long, default_value_t = 4)]
        concurrency: usize,
        #[clap(long)]
        simulate: bool,
        #[clap(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args).await {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load config: {}", err);
            std::process::exit(1);
        }
    };

    init_logger(config.loglevel);
    log::debug!("Using config: {:?}", config);

    let client = Client::new(&config.host);
    let session = Session::new(&client, &config);

    let res = match args.command {
        Command::Provision => session.provision().await.map(|provisioned| {
            println!("Tournament: {}", provisioned.tournament);
            println!("Group: {}", provisioned.group);
            for team in &provisioned.teams {
                println!("Team: {}", team);
            }
        }),
        Command::Simulate { tournament, seed } => {
            match session.simulate(&tournament, seed).await {
                Ok(report) => {
                    println!(
                        "Scored {} matches in {} rounds",
                        report.scored, report.rounds
                    );
                    if !report.waiting.is_empty() {
                        println!("Waiting for teams: {}", report.waiting.join(", "));
                    }

                    session.matches(&tournament).await.map(|m| print_finals(&m))
                }
                Err(err) => Err(err),
            }
        }
        Command::Wait { tournament } => session.wait(&tournament).await.map(|completion| {
            println!(
                "Tournament {} stable with {} matches after {:?} ({} polls)",
                tournament, completion.matches, completion.elapsed, completion.polls
            );
        }),
        Command::Run { simulate, seed } => session.run(simulate, seed).await.map(|report| {
            println!("Tournament: {}", report.provisioned.tournament);
            if let Some(simulation) = &report.simulation {
                println!(
                    "Scored {} matches in {} rounds",
                    simulation.scored, simulation.rounds
                );
            }
            println!(
                "Complete with {} matches after {:?}",
                report.completion.matches, report.elapsed
            );
        }),
        Command::Load {
            users,
            concurrency,
            simulate,
            seed,
        } => {
            let options = LoadOptions {
                users,
                concurrency,
                simulate,
                seed,
            };

            let report = load::run(&client, &config, options).await;

            println!(
                "Runs: {} successful, {} failed in {:?}",
                report.successful, report.failed, report.elapsed
            );
            if let Some(summary) = report.summary() {
                println!(
                    "Latency: min {:?} | mean {:?} | p50 {:?} | p95 {:?} | max {:?}",
                    summary.min, summary.mean, summary.p50, summary.p95, summary.max
                );
            }

            if report.failed > 0 {
                std::process::exit(1);
            }

            Ok(())
        }
    };

    if let Err(err) = res {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

/// Layers the config: defaults, then the config file, then the environment, then flags.
async fn load_config(args: &Args) -> Result<Config, config::ConfigError> {
    let config = match &args.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::default(),
    };

    let mut config = config.with_environment();
    args.apply(&mut config);
    config.validate()?;

    Ok(config)
}

/// Installs the logger at `level`. `RUST_LOG` takes precedence when set.
fn init_logger(level: LevelFilter) {
    let mut builder = pretty_env_logger::formatted_builder();

    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.filter_level(level),
    };

    builder.init();
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Args, Command};
    use crate::config::Config;

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "bracket-driver",
            "-H",
            "http://flags:1",
            "--teams",
            "4",
            "--poll-timeout",
            "2.5",
            "--rescore",
            "--add-teams",
            "group_teams",
            "wait",
            "--tournament",
            "abc",
        ]);

        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.host, "http://flags:1");
        assert_eq!(config.teams, 4);
        assert_eq!(
            config.detector_options().timeout,
            std::time::Duration::from_millis(2500)
        );
        assert!(!config.skip_scored);
        assert!(!config.one_by_one);
        // Not given, so unchanged.
        assert_eq!(config.stable_checks, 5);

        match args.command {
            Command::Wait { tournament } => assert_eq!(tournament, "abc"),
            command => panic!("unexpected command: {:?}", command),
        }
    }

    #[test]
    fn test_load_defaults() {
        let args = Args::parse_from(["bracket-driver", "load", "--simulate"]);

        match args.command {
            Command::Load {
                users,
                concurrency,
                simulate,
                seed,
            } => {
                assert_eq!(users, 10);
                assert_eq!(concurrency, 4);
                assert!(simulate);
                assert_eq!(seed, None);
            }
            command => panic!("unexpected command: {:?}", command),
        }
    }
}
