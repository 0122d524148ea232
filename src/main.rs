mod books;
mod categorizer;
mod cli;
mod costs;
mod db;
mod error;
mod fmt;
mod history;
mod importer;
mod ledger;
mod logistics;
mod models;
mod normalizer;
mod receivables;
mod reports;
mod settings;
mod store;

use clap::Parser;

use cli::{
    Cli, Commands, CostsCommands, LogisticsCommands, ReceivablesCommands, RulesCommands,
    TransactionsCommands,
};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finflow=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, user_name } => cli::init::run(data_dir, user_name),
        Commands::Import {
            file,
            scope,
            no_logistics,
        } => cli::import::run(&file, scope, no_logistics),
        Commands::Undo { import } => cli::import::undo(import.as_deref()),
        Commands::ClearImports => cli::import::clear(),
        Commands::Transactions { command } => match command {
            TransactionsCommands::List { scope, import, limit } => {
                cli::transactions::list(scope, import.as_deref(), limit)
            }
            TransactionsCommands::Add {
                description,
                amount,
                txn_type,
                category,
                date,
                scope,
            } => cli::transactions::add(
                &description,
                amount,
                txn_type,
                &category,
                date.as_deref(),
                scope,
            ),
            TransactionsCommands::Remove { id } => cli::transactions::remove(&id),
            TransactionsCommands::Clear => cli::transactions::clear(),
        },
        Commands::Logistics { command } => match command {
            LogisticsCommands::Add {
                title,
                amount,
                kind,
                date,
                attachment,
                pending,
            } => cli::logistics::add(&title, amount, kind, date.as_deref(), attachment, pending),
            LogisticsCommands::List => cli::logistics::list(),
            LogisticsCommands::Remove { id } => cli::logistics::remove(&id),
        },
        Commands::Costs { command } => match command {
            CostsCommands::Add {
                description,
                amount,
                category,
                day,
                start,
                scope,
            } => cli::costs::add(&description, amount, &category, day, start.as_deref(), scope),
            CostsCommands::Edit {
                id,
                description,
                amount,
                category,
                day,
                end,
            } => cli::costs::edit(
                &id,
                cli::costs::CostChanges {
                    description,
                    amount,
                    category,
                    day,
                    end,
                },
            ),
            CostsCommands::List => cli::costs::list(),
            CostsCommands::Pay { id } => cli::costs::pay(&id),
            CostsCommands::Toggle { id } => cli::costs::toggle(&id),
            CostsCommands::Remove { id } => cli::costs::remove(&id),
        },
        Commands::Receivables { command } => match command {
            ReceivablesCommands::Add {
                client,
                project,
                total,
                service_date,
                due_date,
                scope,
            } => cli::receivables::add(
                &client,
                &project,
                total,
                service_date.as_deref(),
                due_date.as_deref(),
                scope,
            ),
            ReceivablesCommands::List => cli::receivables::list(),
            ReceivablesCommands::Pay { id, amount } => cli::receivables::pay(&id, amount),
            ReceivablesCommands::Remove { id } => cli::receivables::remove(&id),
        },
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                pattern,
                category,
                match_type,
                applies_to,
                priority,
            } => cli::rules::add(&pattern, &category, match_type, applies_to, priority),
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Remove { id } => cli::rules::remove(&id),
        },
        Commands::Report {
            scope,
            period,
            date,
            txn_type,
            search,
        } => cli::report::run(scope, period, date.as_deref(), txn_type, search),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
