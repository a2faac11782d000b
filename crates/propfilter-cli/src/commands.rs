use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use anyhow::Context;
use propfilter_core::{FilterConfig, FilterMode, JsonWriter, NameSet, TokenSink};
use serde_json::Value;
use tracing::{debug, info};

use crate::cli::Cli;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let (names, mode) = settings(&cli)?;
    info!(names = names.len(), ?mode, "filtering JSON input");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            filter_values(BufReader::new(file), &mut out, &names, mode)?;
        }
        None => {
            filter_values(io::stdin().lock(), &mut out, &names, mode)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Resolve the whitelist and mode from the config file and flags.
///
/// Flag names are added to the config file's names; `--mode` replaces the
/// config file's mode.
fn settings(cli: &Cli) -> anyhow::Result<(NameSet, FilterMode)> {
    let config = match &cli.config {
        Some(path) => FilterConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FilterConfig::default(),
    };

    let all: Vec<&str> = config
        .properties
        .iter()
        .chain(&cli.properties)
        .map(String::as_str)
        .collect();
    let names = NameSet::parse(&all.join(","));
    let mode = cli.mode.map(FilterMode::from).unwrap_or(config.mode);
    Ok((names, mode))
}

/// Filter every JSON value in `input`, writing one result per line.
///
/// All values share one writer, so `output` is flushed once at the end.
fn filter_values<R: Read, W: Write>(
    input: R,
    mut output: W,
    names: &NameSet,
    mode: FilterMode,
) -> anyhow::Result<usize> {
    let mut sink = JsonWriter::new(&mut output);
    let mut count = 0;
    for value in serde_json::Deserializer::from_reader(input).into_iter::<Value>() {
        let value = value.with_context(|| format!("invalid JSON in value #{}", count + 1))?;
        mode.write_tokens(&mut sink, &value, names)?;
        count += 1;
    }
    sink.close()?;
    if count > 0 {
        output.write_all(b"\n")?;
    }
    debug!(count, "values filtered");
    Ok(count)
}
