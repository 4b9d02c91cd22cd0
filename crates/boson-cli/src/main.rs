use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use boson_classifiers::config::PipelineConfig;
use boson_classifiers::io::{load_events, write_search_records, write_submission};
use boson_classifiers::pipeline::{concat_predictions, run_groups};
use boson_classifiers::search::{best_record, run_grid_search};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("BOSON_LOG", "error,boson=info"))
        .init();

    let matches = Command::new("boson")
        .version(clap::crate_version!())
        .about("Signal/background classification pipeline for tabular event data")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("search")
                .about("Run the hyperparameter grid search on a training table")
                .arg(
                    Arg::new("train_data")
                        .help("Path to the training event table (CSV)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(config_arg())
                .arg(seed_arg())
                .arg(sub_sample_arg())
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the search record table (CSV)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Run the full per-group train/search/predict cycle")
                .arg(
                    Arg::new("train_data")
                        .help("Path to the training event table (CSV)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("test_data")
                        .help("Path to the test event table (CSV)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(config_arg())
                .arg(seed_arg())
                .arg(sub_sample_arg())
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the submission table (CSV)")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("records_dir")
                        .long("records-dir")
                        .help("Directory for per-group search record tables")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("search", sub_m)) => handle_search(sub_m),
        Some(("run", sub_m)) => handle_run(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help("Path to a JSON pipeline configuration file")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn seed_arg() -> Arg {
    Arg::new("seed")
        .long("seed")
        .help("Random seed; overrides the value in the configuration file")
        .value_parser(clap::value_parser!(u64))
}

fn sub_sample_arg() -> Arg {
    Arg::new("sub_sample")
        .long("sub-sample")
        .help("Keep every k-th row on load; overrides the configuration file")
        .value_parser(clap::value_parser!(usize))
}

fn load_config(matches: &ArgMatches) -> Result<PipelineConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => {
            log::info!("no config provided; using defaults");
            PipelineConfig::default()
        }
    };
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config.seed = seed;
    }
    if let Some(&sub_sample) = matches.get_one::<usize>("sub_sample") {
        config.sub_sample = sub_sample;
    }
    Ok(config)
}

fn handle_search(matches: &ArgMatches) -> Result<()> {
    let train_path: &PathBuf = matches.get_one("train_data").unwrap();
    let output_path: &PathBuf = matches.get_one("output_file").unwrap();
    let config = load_config(matches)?;

    let train = load_events(train_path, config.sub_sample)?;
    train.log_summary("training data");

    let records = run_grid_search(
        &train.x,
        &train.y,
        &config.grid,
        config.sentinel,
        config.threshold,
        config.seed,
    );
    write_search_records(output_path, &records)?;

    match best_record(&records) {
        Some(best) => log::info!(
            "best configuration {:?} with mean f1 {:.4}",
            best.params,
            best.scores.f1_mean
        ),
        None => log::warn!("no grid cell produced a finite score"),
    }
    Ok(())
}

fn handle_run(matches: &ArgMatches) -> Result<()> {
    let train_path: &PathBuf = matches.get_one("train_data").unwrap();
    let test_path: &PathBuf = matches.get_one("test_data").unwrap();
    let output_path: &PathBuf = matches.get_one("output_file").unwrap();
    let records_dir: Option<&PathBuf> = matches.get_one("records_dir");
    let config = load_config(matches)?;

    let train = load_events(train_path, config.sub_sample)?;
    let test = load_events(test_path, config.sub_sample)?;
    train.log_summary("training data");

    let outcomes = run_groups(&train, &test, &config)?;
    anyhow::ensure!(!outcomes.is_empty(), "every group was empty; nothing to predict");

    if let Some(dir) = records_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        for outcome in &outcomes {
            let path = dir.join(format!("results_{}.csv", outcome.code));
            write_search_records(&path, &outcome.records)?;
        }
    }

    let (ids, predictions) = concat_predictions(&outcomes);
    write_submission(output_path, &ids, &predictions)?;
    Ok(())
}
