use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Parser};
use itertools::Itertools;
use log::{info, Level, LevelFilter, Log, Metadata, Record};
use perm_group::{Block, Closure, Perm, PermGroup, PermutationUniform};

/// Order, orbits, minimal block system and block stabilizer of a permutation group.
#[derive(Clone, Debug, Parser, PartialEq)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generators as comma-separated images, for example "1,2,0,3".
    generators: Vec<String>,

    /// Initial blocks for the block system, for example "0,1;2,3".
    /// By default, the refinement starts from all singletons.
    #[arg(long)]
    blocks: Option<String>,

    /// Build stabilizer chains with a plain stack instead of a deduplicated worklist.
    #[arg(long)]
    stack: bool,

    /// Add this many uniformly random generators.
    #[arg(long, requires = "len")]
    random: Option<usize>,

    /// Number of points of the random generators.
    #[arg(long)]
    len: Option<usize>,

    /// Seed for the random generators.
    #[arg(long, default_value_t = 0)]
    seed: usize,

    /// Log more, repeat for debug and trace output.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn group(&self) -> Result<PermGroup> {
        let mut generators: Vec<Perm> = self.generators.iter().map(|g| parse_perm(g)).try_collect()?;
        if let (Some(k), Some(len)) = (self.random, self.len) {
            generators.extend(PermutationUniform::new(len).samples(k, self.seed));
        }
        if generators.is_empty() {
            bail!("no generators given");
        }
        let closure = if self.stack { Closure::Stack } else { Closure::Deduplicated };
        Ok(PermGroup::new(generators).context("generators of different lengths")?.with_closure(closure))
    }

    fn initial_blocks(&self, len: usize) -> Result<Vec<Block>> {
        let Some(blocks) = &self.blocks else {
            return Ok((0..len).map(|i| Block::from([i])).collect());
        };
        blocks.split(';').map(|b| -> Result<Block> {
            let block: Block = parse_points(b)?.into_iter().collect();
            if let Some(&p) = block.iter().find(|&&p| p >= len) {
                bail!("point {p} of block '{b}' is out of range for {len} points");
            }
            Ok(block)
        }).try_collect()
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn parse_points(s: &str) -> Result<Vec<usize>> {
    s.split(',').map(|x| x.trim().parse::<usize>().with_context(|| format!("invalid point '{x}' in '{s}'"))).try_collect()
}

fn parse_perm(s: &str) -> Result<Perm> {
    Ok(Perm::new(parse_points(s)?).with_context(|| format!("invalid generator '{s}'"))?)
}

fn format_blocks(blocks: &[Block]) -> String {
    blocks.iter().map(|b| format!("{{{}}}", b.iter().join(","))).join(" ")
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level = match record.level() {
                Level::Error => "error",
                Level::Warn => "warn",
                Level::Info => "info",
                Level::Debug => "debug",
                Level::Trace => "trace",
            };
            eprintln!("[{level} {}] {}", record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() -> Result<()> {
    let args = Args::parse();
    log::set_logger(&LOGGER).map_err(|e| anyhow!("{e}"))?;
    log::set_max_level(args.log_level());

    let group = args.group()?;
    let blocks = args.initial_blocks(group.len())?;
    info!("stabilizer chain:\n{group}");

    println!("order: {}", group.order());
    println!("order factors: {}", group.order_factors().iter().join(" "));
    println!("orbits: {}", format_blocks(&group.compute_orbits(0..group.len())));
    let system = group.minimal_block_system(blocks);
    println!("minimal block system: {}", format_blocks(&system));
    println!("block stabilizer order: {}", group.block_stabilizer(&system).order());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generators_and_blocks() {
        let args = Args::parse_from(["", "1,0,2,3", "2,3,0,1", "--blocks", "0,1;2,3", "-vv"]);
        assert_eq!(args.log_level(), LevelFilter::Debug);
        let group = args.group().unwrap();
        assert_eq!(group.order().to_string(), "8");
        assert_eq!(format_blocks(&args.initial_blocks(4).unwrap()), "{0,1} {2,3}");
    }

    #[test]
    fn random_generators() {
        let args = Args::parse_from(["", "--random", "2", "--len", "5", "--seed", "3", "--stack"]);
        let group = args.group().unwrap();
        assert_eq!(group.generators().len(), 2);
        assert_eq!(group.closure(), Closure::Stack);
        assert!(Args::try_parse_from(["", "--random", "2"]).is_err());
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(Args::parse_from([""]).group().is_err());
        assert!(Args::parse_from(["", "0,0"]).group().is_err());
        assert!(Args::parse_from(["", "0,x"]).group().is_err());
        assert!(Args::parse_from(["", "0,1", "0,1,2"]).group().is_err());
        assert!(Args::parse_from(["", "0,1", "--blocks", "0;5"]).initial_blocks(2).is_err());
    }
}
