mod auto;
mod gambit;
mod json;

use clap::{Parser, ValueEnum};
use efg::{Efg, NormalForm};
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::fs::File;
use std::io;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Auto,
    Gambit,
    Json,
}

/// Normal form enumeration for extensive-form games
///
/// This program reads an extensive-form game with any number of players in several formats,
/// derives its normal form, and reports the payoffs of every pure strategy profile. The result
/// will be a json object like:
///
/// `{ "players": [{ "name": <string>, "strategies": [<label>] }], "subgames": <number>,
/// "contingencies": [{ "strategies": [<label>], "payoffs": [<number>] }] }`
///
/// where a strategy label lists the one based action picked at each of the player's information
/// sets, and contingencies are ordered with the first player's strategy varying fastest.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Mark every legal subgame before reporting
    ///
    /// The root of the game always counts as a subgame, so without this the reported number of
    /// subgames is one.
    #[clap(short, long, value_parser)]
    mark_subgames: bool,

    /// Compute the whole payoff table up front instead of walking the tree per contingency
    #[clap(long, value_parser)]
    materialize: bool,

    /// Amount of parallelism to use when materializing
    ///
    /// If set to zero (default), this will use rayon's default, which is the number of available
    /// cpus.
    #[clap(short, long, value_parser, default_value_t = 0)]
    parallel: usize,

    /// Format of the input game file
    ///
    /// Auto : If `input` was specified and the filename ends with ".json" or ".efg" use that
    /// parser. Otherwise attempt all parsers. If all of these fail, no diagnostic information will
    /// be given, instead retry with the desired parser.
    ///
    /// Gambit : parses Gambit style `.efg` files. Gambit uses rational payoffs and probabilities,
    /// but these are converted to floating point numbers.
    ///
    /// Json : uses a custom json extensive form game format. A game is an object `{ players:
    /// [<string>], root: <node> }`. Terminal nodes have the structure `{ terminal: [<number>] }`
    /// with one payoff per player. Chance nodes have the structure `{ chance: { infoset?:
    /// <string>, outcomes: { [<string>]: { prob: <number>, state: <node> } } } }`. Chance
    /// probabilities will be renormalized, so they don't need to explicitely sum to one. Player
    /// nodes have the structure `{ player: { player: <number>, infoset: <string>, actions: {
    /// [<string>]: <node> } } }` where players are numbered from one.
    #[clap(long, value_enum, default_value_t = InputFormat::Auto)]
    input_format: InputFormat,

    /// Read game from a file instead of from stdin
    #[clap(short, long, value_parser, default_value = "-")]
    input: String,

    /// Write results to a file instead of stdout
    #[clap(short, long, value_parser, default_value = "-")]
    output: String,
}

#[derive(Serialize)]
struct PlayerOutput {
    name: String,
    strategies: Vec<String>,
}

#[derive(Serialize)]
struct ContingencyOutput {
    strategies: Vec<String>,
    payoffs: Vec<f64>,
}

#[derive(Serialize)]
struct Output {
    players: Vec<PlayerOutput>,
    subgames: usize,
    contingencies: Vec<ContingencyOutput>,
}

impl Output {
    fn new(game: &Efg<f64>, nf: &NormalForm<f64>) -> Self {
        let label = |strat| {
            nf.strategy_label(strat)
                .expect("internal error: strategy from another normal form")
        };
        let players = nf
            .players()
            .map(|player| PlayerOutput {
                name: game.player_label(player).to_owned(),
                strategies: nf
                    .strategies(player)
                    .expect("internal error: normal form listed an invalid player")
                    .map(label)
                    .collect(),
            })
            .collect();
        let contingencies = nf
            .contingencies(&nf.support())
            .expect("internal error: support from another normal form")
            .map(|cont| ContingencyOutput {
                strategies: cont.strategies().map(label).collect(),
                payoffs: nf
                    .payoffs(&cont)
                    .expect("internal error: enumerated an incomplete contingency"),
            })
            .collect();
        Output {
            players,
            subgames: game.nodes().filter(|node| game.is_subgame_root(*node)).count(),
            contingencies,
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let mut game = if args.input == "-" {
        match args.input_format {
            InputFormat::Json => json::from_reader(&mut io::stdin()),
            InputFormat::Gambit => gambit::from_reader(&mut io::stdin()),
            InputFormat::Auto => auto::from_reader(io::stdin()),
        }
    } else {
        let mut file = File::open(&args.input).expect("couldn't open input file");
        match args.input_format {
            InputFormat::Json => json::from_reader(&mut file),
            InputFormat::Auto if args.input.ends_with(".json") => json::from_reader(&mut file),
            InputFormat::Gambit => gambit::from_reader(&mut file),
            InputFormat::Auto if args.input.ends_with(".efg") => gambit::from_reader(&mut file),
            InputFormat::Auto => auto::from_reader(file),
        }
    };
    if args.mark_subgames {
        let roots = game.legal_subgame_roots();
        game.mark_subgames(&roots)
            .expect("internal error: couldn't mark legal subgames");
    }
    let mut nf = NormalForm::new(&game).expect("game has too many strategy profiles to enumerate");
    if args.materialize {
        let pool = ThreadPoolBuilder::new()
            .num_threads(args.parallel)
            .build()
            .expect("couldn't create thread pool");
        pool.install(|| nf.materialize())
            .expect("internal error: fresh normal form was detached");
    }
    let out = Output::new(&game, &nf);
    if args.output == "-" {
        serde_json::to_writer(io::stdout(), &out).expect("couldn't write output");
    } else {
        let file = File::create(&args.output).expect("couldn't create output file");
        serde_json::to_writer(file, &out).expect("couldn't write output");
    };
}
