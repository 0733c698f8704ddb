use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sp_cli::commands::{
    ack, consequence, deviations, flex, goals, health, init, record, scenario, split,
};
use sp_cli::{Cli, Commands, Config, GoalAction, PlanStore};

/// Load config and build the store around the plan file.
fn open_store(config_path: Option<&Path>) -> Result<PlanStore> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(PlanStore::new(config.plan_path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let mut stdout = io::stdout();

    match cli.command {
        Some(Commands::Init) => {
            let store = open_store(cli.config.as_deref())?;
            init::run(&store)?;
        }
        Some(Commands::Goal { action }) => {
            let store = open_store(cli.config.as_deref())?;
            match action {
                GoalAction::Add {
                    name,
                    target,
                    deadline,
                    start,
                    priority,
                    monthly,
                    emergency,
                } => {
                    goals::add(
                        &store,
                        goals::AddArgs {
                            name,
                            target,
                            deadline,
                            start,
                            priority,
                            monthly,
                            emergency,
                        },
                        today,
                    )?;
                }
                GoalAction::List { json } => {
                    goals::list(&mut stdout, &store, today, json)?;
                }
            }
        }
        Some(Commands::Scenario {
            name,
            income,
            tax_rate,
            fixed_expenses,
            kind,
        }) => {
            let store = open_store(cli.config.as_deref())?;
            scenario::add(
                &store,
                scenario::AddArgs {
                    name,
                    income,
                    tax_rate,
                    fixed_expenses,
                    kind,
                },
            )?;
        }
        Some(Commands::Record {
            amount,
            kind,
            date,
            goal,
            category,
        }) => {
            let store = open_store(cli.config.as_deref())?;
            record::run(
                &store,
                record::RecordArgs {
                    amount,
                    kind,
                    date,
                    goal,
                    category,
                },
                today,
            )?;
        }
        Some(Commands::Split {
            income,
            scenario,
            no_flex,
            json,
        }) => {
            let store = open_store(cli.config.as_deref())?;
            split::run(
                &mut stdout,
                &store,
                split::SplitArgs {
                    income,
                    scenario,
                    no_flex,
                    json,
                },
                today,
            )?;
        }
        Some(Commands::Deviations { year, month, json }) => {
            let store = open_store(cli.config.as_deref())?;
            deviations::run(&mut stdout, &store, year, month, json)?;
        }
        Some(Commands::Ack { goal, year, month }) => {
            let store = open_store(cli.config.as_deref())?;
            ack::run(&store, &goal, year, month)?;
        }
        Some(Commands::Consequence {
            goal,
            shortfall,
            year,
            month,
            tolerance,
            json,
        }) => {
            let store = open_store(cli.config.as_deref())?;
            consequence::run(
                &mut stdout,
                &store,
                consequence::ConsequenceArgs {
                    goal,
                    shortfall,
                    year,
                    month,
                    tolerance,
                    json,
                },
                today,
            )?;
        }
        Some(Commands::Flex {
            date,
            reason,
            amount,
            affected,
            paused,
            adjusted,
            resume,
        }) => {
            let store = open_store(cli.config.as_deref())?;
            flex::run(
                &store,
                flex::FlexArgs {
                    date,
                    reason,
                    amount,
                    affected,
                    paused,
                    adjusted,
                    resume,
                },
            )?;
        }
        Some(Commands::Health {
            income,
            scenario,
            json,
        }) => {
            let store = open_store(cli.config.as_deref())?;
            health::run(
                &mut stdout,
                &store,
                health::HealthArgs {
                    income,
                    scenario,
                    json,
                },
                today,
            )?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
