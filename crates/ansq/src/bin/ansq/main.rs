mod cli;

use ansq::{AnsibleConfig, Query, Row};
use std::io::Write;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("ANSQ_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Query(query_cli) => query(query_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn query(cli: cli::QueryCommand) -> anyhow::Result<()> {
    let config = load(&cli.input)?;

    let mut query = Query::new(cli.table.into(), &config);
    if let Some(path) = &cli.input.path {
        query = query.path(path);
    }

    let rows = query.rows()?;
    let rows = rows.take(cli.output.limit.unwrap_or(usize::MAX));

    output(&cli.output, rows)
}

fn load(input: &cli::InputArgs) -> anyhow::Result<AnsibleConfig> {
    let mut config = match &input.config {
        Some(path) => AnsibleConfig::load_file(path, input.connection.as_deref())?,
        None => AnsibleConfig::default(),
    };

    config.extend_patterns(ansq::resolve::FileKind::Inventory, &input.inventory);
    config.extend_patterns(ansq::resolve::FileKind::Playbook, &input.playbook);

    tracing::debug!(?config, "effective configuration");
    Ok(config)
}

fn output(
    output: &cli::OutputArgs,
    rows: impl Iterator<Item = ansq::Result<Row>>,
) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();

    match output.format {
        cli::OutputFormat::Jsonl => {
            for row in rows {
                serde_json::to_writer(&mut stdout, &row?)?;
                writeln!(stdout)?;
            }
        }
        cli::OutputFormat::Json => {
            let rows = rows.collect::<ansq::Result<Vec<_>>>()?;
            serde_json::to_writer_pretty(&mut stdout, &rows)?;
            writeln!(stdout)?;
        }
        cli::OutputFormat::Yaml => {
            let rows = rows.collect::<ansq::Result<Vec<_>>>()?;
            serde_yaml::to_writer(&mut stdout, &rows)?;
        }
    };

    Ok(())
}
