//! Script commands: one line, one command, run against a set of sessions.
//!
//! Each line is tokenized on whitespace and parsed with its own clap
//! command tree, so a bad line is reported like a failed in-game command
//! and the script carries on.

use std::collections::BTreeSet;
use std::io;
use std::ops::RangeInclusive;

use anyhow::{bail, Context};
use blockstatslib::{
    BlockPos, CountTarget, Dimensions, FileSink, Format, LineSink, ReportOptions, Requester,
    SessionRegistry, SpatialAggregator, StatsQuerySet, TracingSink, TypeFilter, World,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console::Style;
use tracing::{debug, warn};

/// Dimension scanned when a command names none.
const DEFAULT_DIMENSION: i32 = 0;

/// Writes lines to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_lines(&self, lines: &[String]) {
        for line in lines {
            println!("{}", line);
        }
    }
}

/// Grammar of a single script line.
fn build_line_command() -> Command {
    let block_entities = Arg::new("block-entities")
        .short('e')
        .long("block-entities")
        .action(ArgAction::SetTrue)
        .help("Use the block entity session instead of the block session");
    let format = Arg::new("format")
        .short('f')
        .long("format")
        .value_parser(|s: &str| s.parse::<Format>())
        .help("Output format: ascii-table, compact-table, csv or simple");
    let filters = Arg::new("filters")
        .num_args(0..)
        .help("Only include these types (namespace:name[:variant])");
    let numbers = |name: &'static str, count: RangeInclusive<usize>, help: &'static str| {
        Arg::new(name)
            .num_args(count)
            .required(true)
            .allow_negative_numbers(true)
            .value_parser(value_parser!(i32))
            .help(help)
    };

    Command::new("script")
        .no_binary_name(true)
        .subcommand_required(true)
        .disable_help_subcommand(true)
        .subcommand(
            Command::new("count")
                .about("Add counts from a region to the session")
                .subcommand_required(true)
                .arg(block_entities.clone())
                .subcommand(
                    Command::new("all-loaded-chunks")
                        .about("Count every loaded chunk: [dim]")
                        .arg(
                            Arg::new("dim")
                                .allow_negative_numbers(true)
                                .value_parser(value_parser!(i32)),
                        ),
                )
                .subcommand(
                    Command::new("chunk-radius")
                        .about("Load and count chunks around a point: <r> [dim] [x y z]")
                        .arg(numbers("values", 1..=5, "r [dim] [x y z]")),
                )
                .subcommand(
                    Command::new("range")
                        .about("Count a box around a point: <rx> <ry> <rz> [dim] [x y z]")
                        .arg(numbers("values", 3..=7, "rx ry rz [dim] [x y z]")),
                )
                .subcommand(
                    Command::new("box")
                        .about("Count the box between two corners: <x1 y1 z1> <x2 y2 z2> [dim]")
                        .arg(numbers("values", 6..=7, "x1 y1 z1 x2 y2 z2 [dim]")),
                ),
        )
        .subcommand(
            Command::new("query")
                .about("Print the session's stats")
                .arg(block_entities.clone())
                .arg(format.clone())
                .arg(
                    Arg::new("log")
                        .long("log")
                        .action(ArgAction::SetTrue)
                        .help("Send the output to the log instead of stdout"),
                )
                .arg(filters.clone()),
        )
        .subcommand(
            Command::new("dump")
                .about("Write the session's stats to a file")
                .arg(block_entities.clone())
                .arg(format)
                .arg(filters.clone()),
        )
        .subcommand(
            Command::new("dump-csv")
                .about("Write the session's stats to a CSV file")
                .arg(block_entities.clone())
                .arg(filters),
        )
        .subcommand(
            Command::new("reset")
                .about("Clear the session's counts")
                .arg(block_entities),
        )
}

/// The two kinds of sessions a script works with.
#[derive(Debug)]
struct Sessions {
    blocks: SessionRegistry,
    block_entities: SessionRegistry,
}

impl Sessions {
    fn new() -> Self {
        Self {
            blocks: SessionRegistry::new(CountTarget::Blocks),
            block_entities: SessionRegistry::new(CountTarget::BlockEntities),
        }
    }

    fn for_target(&mut self, target: CountTarget) -> &mut SessionRegistry {
        match target {
            CountTarget::Blocks => &mut self.blocks,
            CountTarget::BlockEntities => &mut self.block_entities,
        }
    }

    fn get(&self, target: CountTarget) -> &SessionRegistry {
        match target {
            CountTarget::Blocks => &self.blocks,
            CountTarget::BlockEntities => &self.block_entities,
        }
    }
}

/// Outcome of running a whole script.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs script lines against a world and per-requester sessions.
pub struct ScriptRunner {
    dimensions: Dimensions,
    sessions: Sessions,
    options: ReportOptions,
    requester: Requester,
    grammar: Command,
    known_types: BTreeSet<String>,
}

impl ScriptRunner {
    /// `requester` is used for lines without an `@name` prefix.
    pub fn new(dimensions: Dimensions, options: ReportOptions, requester: Requester) -> Self {
        let known_types = dimensions
            .ids()
            .into_iter()
            .filter_map(|id| dimensions.resolve(id).ok())
            .flat_map(|world| world.registered_types())
            .map(|key| key.id().to_string())
            .collect();

        Self {
            dimensions,
            sessions: Sessions::new(),
            options,
            requester,
            grammar: build_line_command(),
            known_types,
        }
    }

    /// Run each line in turn. Failing lines are reported on stderr.
    pub fn run<I, S>(&mut self, lines: I) -> ScriptSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let error_style = Style::new().red().bold();
        let mut summary = ScriptSummary::default();

        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match self.run_line(line) {
                Ok(()) => summary.succeeded += 1,
                Err(err) => {
                    summary.failed += 1;
                    eprintln!("{} {}: {:#}", error_style.apply_to("Error:"), line, err);
                }
            }
        }

        summary
    }

    /// Run one non-empty line.
    pub fn run_line(&mut self, line: &str) -> anyhow::Result<()> {
        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        let requester = match tokens.first().and_then(|t| t.strip_prefix('@')) {
            Some(name) => {
                let requester = Requester::from_name(Some(name));
                tokens.remove(0);
                requester
            }
            None => self.requester.clone(),
        };
        debug!(requester = %requester, line, "running command");

        let matches = self
            .grammar
            .try_get_matches_from_mut(tokens)
            .map_err(|e| anyhow::anyhow!(e.render().to_string().trim().to_string()))?;

        match matches.subcommand() {
            Some(("count", sub)) => self.count(&requester, sub),
            Some(("query", sub)) => self.query(&requester, sub),
            Some(("dump", sub)) => {
                let format = format_arg(sub).unwrap_or(self.options.format);
                self.dump(&requester, sub, format)
            }
            Some(("dump-csv", sub)) => self.dump(&requester, sub, Format::Csv),
            Some(("reset", sub)) => self.reset(&requester, sub),
            _ => bail!("unknown command"),
        }
    }

    fn count(&mut self, requester: &Requester, matches: &ArgMatches) -> anyhow::Result<()> {
        let target = target_arg(matches);
        let Some((mode, args)) = matches.subcommand() else {
            bail!("missing count mode");
        };
        // `all-loaded-chunks` has no "values" argument
        let values: Vec<i32> = args
            .try_get_many::<i32>("values")
            .ok()
            .flatten()
            .map(|v| v.copied().collect())
            .unwrap_or_default();

        let status = Style::new().green();
        let before = self.session_total(target, requester);

        match mode {
            "all-loaded-chunks" => {
                let dim = args
                    .get_one::<i32>("dim")
                    .copied()
                    .unwrap_or(DEFAULT_DIMENSION);
                let world = self.dimensions.resolve(dim)?;
                self.sessions
                    .for_target(target)
                    .session(requester)
                    .process_all_loaded(world);
            }
            "chunk-radius" => {
                let (radius, rest) = split_first(&values)?;
                let radius = u32::try_from(radius).with_context(|| {
                    format!("chunk radius must not be negative, got {}", radius)
                })?;
                let (dim, center) = dim_and_center(rest)?;
                let world = self.dimensions.resolve_mut(dim)?;
                let center = center.unwrap_or_else(|| world.spawn());
                let chunks = world.load_chunks_around(center.chunk(), radius);
                self.sessions
                    .for_target(target)
                    .session(requester)
                    .process_region(&*world, &chunks);
            }
            "range" => {
                let [rx, ry, rz] = [values[0], values[1], values[2]];
                let (dim, center) = dim_and_center(&values[3..])?;
                let world = self.dimensions.resolve(dim)?;
                let center = center.unwrap_or_else(|| world.spawn());
                self.sessions
                    .for_target(target)
                    .session(requester)
                    .process_radius(world, center, rx, ry, rz);
            }
            "box" => {
                let pos1 = BlockPos::new(values[0], values[1], values[2]);
                let pos2 = BlockPos::new(values[3], values[4], values[5]);
                let dim = values.get(6).copied().unwrap_or(DEFAULT_DIMENSION);
                let world = self.dimensions.resolve(dim)?;
                self.sessions
                    .for_target(target)
                    .session(requester)
                    .process_box(world, pos1, pos2);
            }
            other => bail!("unknown count mode '{}'", other),
        }

        let total = self.session_total(target, requester);
        eprintln!(
            "{}",
            status.apply_to(format!(
                "Counted {} {} for {} ({} in session)",
                total - before,
                target_noun(target),
                requester,
                total
            ))
        );
        Ok(())
    }

    fn session_total(&self, target: CountTarget, requester: &Requester) -> u64 {
        self.sessions
            .get(target)
            .get(requester)
            .map_or(0, |a| a.counter().total())
    }

    fn query(&self, requester: &Requester, matches: &ArgMatches) -> anyhow::Result<()> {
        let format = format_arg(matches).unwrap_or(self.options.format);
        let lines = self.render(requester, matches, format)?;

        if matches.get_flag("log") {
            TracingSink.write_lines(&lines);
        } else {
            StdoutSink.write_lines(&lines);
        }
        Ok(())
    }

    fn dump(
        &mut self,
        requester: &Requester,
        matches: &ArgMatches,
        format: Format,
    ) -> anyhow::Result<()> {
        let lines = self.render(requester, matches, format)?;
        let options = self
            .options
            .clone()
            .block_entities(target_arg(matches) == CountTarget::BlockEntities);
        let sink = FileSink::new(&options.output_dir);
        let path = sink.write_lines(options.dump_base_name(), format.extension(), &lines)?;

        println!("Output written to file {}", path.display());
        Ok(())
    }

    fn reset(&mut self, requester: &Requester, matches: &ArgMatches) -> anyhow::Result<()> {
        let target = target_arg(matches);
        let noun = target_noun(target);
        let message = if self.sessions.for_target(target).reset(requester) {
            format!("Reset {} stats for {}", noun, requester)
        } else {
            format!("No {} stats to reset for {}", noun, requester)
        };
        eprintln!("{}", Style::new().yellow().apply_to(message));
        Ok(())
    }

    /// Query the requester's session and render it.
    fn render(
        &self,
        requester: &Requester,
        matches: &ArgMatches,
        format: Format,
    ) -> anyhow::Result<Vec<String>> {
        let target = target_arg(matches);
        let names: Vec<String> = matches
            .get_many::<String>("filters")
            .map(|v| v.cloned().collect())
            .unwrap_or_default();

        let empty = SpatialAggregator::new(target);
        let aggregator = self.sessions.get(target).get(requester).unwrap_or(&empty);
        let queryset = self.build_query(aggregator, &names)?;

        Ok(queryset.to_lines(format)?)
    }

    fn build_query(
        &self,
        aggregator: &SpatialAggregator,
        names: &[String],
    ) -> anyhow::Result<StatsQuerySet> {
        if names.is_empty() {
            return Ok(aggregator.query_all());
        }

        let filter = TypeFilter::parse(names);
        if filter.is_empty() {
            bail!("no valid type names in '{}'", names.join(" "));
        }
        for entry in filter.entries() {
            if !self.known_types.contains(entry.id()) {
                warn!(entry = %entry, "type is not registered in any dimension");
            }
        }
        Ok(aggregator.query(&filter))
    }
}

/// Read commands from stdin, one per line.
pub fn stdin_lines() -> io::Result<Vec<String>> {
    io::stdin().lines().collect()
}

fn target_arg(matches: &ArgMatches) -> CountTarget {
    if matches.get_flag("block-entities") {
        CountTarget::BlockEntities
    } else {
        CountTarget::Blocks
    }
}

fn format_arg(matches: &ArgMatches) -> Option<Format> {
    matches.get_one::<Format>("format").copied()
}

fn target_noun(target: CountTarget) -> &'static str {
    match target {
        CountTarget::Blocks => "blocks",
        CountTarget::BlockEntities => "block entities",
    }
}

fn split_first(values: &[i32]) -> anyhow::Result<(i32, &[i32])> {
    match values.split_first() {
        Some((first, rest)) => Ok((*first, rest)),
        None => bail!("missing arguments"),
    }
}

/// Interpret `[dim] [x y z]`.
fn dim_and_center(values: &[i32]) -> anyhow::Result<(i32, Option<BlockPos>)> {
    match values {
        [] => Ok((DEFAULT_DIMENSION, None)),
        [dim] => Ok((*dim, None)),
        [dim, x, y, z] => Ok((*dim, Some(BlockPos::new(*x, *y, *z)))),
        _ => bail!("expected [dim] or [dim x y z] after the radius"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockstatslib::{MemoryWorld, TypeKey};

    fn runner() -> ScriptRunner {
        let mut world = MemoryWorld::new(0, 15);
        world.fill(
            BlockPos::new(0, 0, 0),
            BlockPos::new(3, 0, 3),
            &TypeKey::new("minecraft:stone"),
        );
        world.add_block_entity(BlockPos::new(1, 1, 1), TypeKey::new("minecraft:chest"));
        let mut dims = Dimensions::new();
        dims.insert(0, world);
        ScriptRunner::new(dims, ReportOptions::new(), Requester::Console)
    }

    fn stone(runner: &ScriptRunner, requester: &Requester) -> u64 {
        runner
            .sessions
            .blocks
            .get(requester)
            .map(|a| a.counter().get(&TypeKey::new("minecraft:stone")))
            .unwrap_or(0)
    }

    #[test]
    fn test_line_grammar() {
        build_line_command().debug_assert();
    }

    #[test]
    fn test_box_with_negative_corner() {
        let mut runner = runner();
        runner.run_line("count box -5 -5 -5 1 0 1").unwrap();
        assert_eq!(stone(&runner, &Requester::Console), 4);
    }

    #[test]
    fn test_requester_prefix_partitions_sessions() {
        let mut runner = runner();
        let summary = runner.run([
            "@alice count box 0 0 0 3 0 3",
            "count range 0 0 0 0 0 0 0",
            "# comment",
            "",
        ]);
        assert_eq!(
            summary,
            ScriptSummary {
                succeeded: 2,
                failed: 0
            }
        );
        assert_eq!(stone(&runner, &Requester::Player("alice".to_string())), 16);
        assert_eq!(stone(&runner, &Requester::Console), 1);
    }

    #[test]
    fn test_block_entity_session() {
        let mut runner = runner();
        runner.run_line("count -e all-loaded-chunks").unwrap();
        let agg = runner
            .sessions
            .block_entities
            .get(&Requester::Console)
            .unwrap();
        assert_eq!(agg.counter().get(&TypeKey::new("minecraft:chest")), 1);
        assert!(runner.sessions.blocks.is_empty());
    }

    #[test]
    fn test_usage_errors_do_not_stop_the_script() {
        let mut runner = runner();
        let summary = runner.run([
            "count box 1 2",
            "count all-loaded-chunks 7",
            "count chunk-radius -1",
            "frobnicate",
            "count box 0 0 0 0 0 0",
        ]);
        assert_eq!(
            summary,
            ScriptSummary {
                succeeded: 1,
                failed: 4
            }
        );
        assert_eq!(stone(&runner, &Requester::Console), 1);
    }

    #[test]
    fn test_reset_clears_session() {
        let mut runner = runner();
        runner.run_line("count box 0 0 0 3 0 3").unwrap();
        runner.run_line("reset").unwrap();
        assert_eq!(stone(&runner, &Requester::Console), 0);
    }

    #[test]
    fn test_chunk_radius_loads_and_counts() {
        let mut runner = runner();
        runner.run_line("count chunk-radius 1 0 0 0 0").unwrap();
        let agg = runner.sessions.blocks.get(&Requester::Console).unwrap();
        assert_eq!(agg.counter().chunks_visited(), 9);
        assert_eq!(agg.counter().chunks_counted(), 1);
        assert_eq!(stone(&runner, &Requester::Console), 16);
    }

    #[test]
    fn test_chunk_radius_at_world_edge() {
        let mut runner = runner();
        runner
            .run_line("count chunk-radius 1 0 2147483647 0 0")
            .unwrap();
        runner
            .run_line("count chunk-radius 1 0 -2147483648 0 -2147483648")
            .unwrap();
        let agg = runner.sessions.blocks.get(&Requester::Console).unwrap();
        // Columns past the last block coordinate are left out
        assert_eq!(agg.counter().chunks_visited(), 6 + 4);
        assert_eq!(agg.counter().total(), 0);
    }

    #[test]
    fn test_render_with_filter() {
        let mut runner = runner();
        runner.run_line("count box 0 0 0 3 1 3").unwrap();
        let matches = runner
            .grammar
            .try_get_matches_from_mut(["query", "minecraft:stone"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let lines = runner
            .render(&Requester::Console, sub, Format::Simple)
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "Block stats:",
                "Block, Count",
                "minecraft:stone, 16",
                "Block, Count"
            ]
        );

        let matches = runner
            .grammar
            .try_get_matches_from_mut(["query", "::"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(runner.render(&Requester::Console, sub, Format::Simple).is_err());
    }
}
