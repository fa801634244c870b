//! Factor a game made of several independent boards.
//!
//! Each board is a single light that the player can flip; a shared step counter ties
//! nothing together. Every board ends up as its own factor.
//!
//! Run with:
//! ```bash
//! cargo run --example factor_demo -- 4 --save factors.txt
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::info;

use ggp_factor::filter::StateViewFilter;
use ggp_factor::network::{CompiledNetwork, Move, PropNet};
use ggp_factor::pool::TermPool;
use ggp_factor::registry::FactorRegistry;
use ggp_factor::signal::Signal;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of boards.
    #[arg(value_name = "INT", default_value = "3")]
    boards: usize,

    /// Sentence table size (in bits, so the actual size is `2^size` buckets).
    #[clap(long, value_name = "INT", default_value = "12")]
    size: usize,

    /// Write the factors to this file.
    #[clap(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Enable debug logging.
    #[clap(long)]
    debug: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.debug {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();
    println!("args = {:?}", args);

    let pool = TermPool::new(args.size);
    let mut net = PropNet::new();
    let player = net.add_role(pool.atom("player"));
    net.add_base(pool.ground_sentence("step", &["0"]));

    let mut boards = Vec::new();
    let mut all_lit = Signal::one();
    for i in 0..args.boards {
        let name = i.to_string();
        let lit = net.add_base(pool.ground_sentence("lit", &[name.as_str()]));
        let mv = pool.compound(pool.atom("flip"), [pool.atom(&name).into()]);
        let input = pool.relation(&pool.atom("does"), &[pool.atom("player").into(), mv.clone()]);
        let flip = net.add_move(player, Move::new(mv), Some(input), !Signal::from(lit));
        all_lit = net.circuit_mut().and(all_lit, lit.into());
        boards.push((lit, flip));
    }
    net.set_terminal(all_lit);
    println!("pool = {:?}", pool);
    println!("network: {} base propositions, {} moves", net.num_bases(), net.num_moves());

    let mut registry = FactorRegistry::new();
    let mut builders = Vec::new();
    for &(lit, flip) in &boards {
        let mut b = registry.new_factor();
        b.add_all([lit]);
        b.add_all_moves([flip]);
        b.claim(&mut net);
        builders.push(b);
    }
    let factors = registry.seal_all(builders, &net);
    registry.check_disjoint(&factors)?;
    info!("found {} factors", factors.len());

    let state = net.create_empty_state();
    let moves = net.legal_moves(&state);
    for factor in &factors {
        factor.dump(&net);
        let view = StateViewFilter::from(factor);
        println!(
            "{}: specific mask {:?}, {} of {} moves visible",
            factor.id(),
            factor.state_mask(true),
            view.filtered_move_count(&state, &moves, player, false),
            moves.num_choices(player)
        );
    }

    let saved = registry.save(&factors, &net);
    print!("{}", saved);
    if let Some(path) = &args.save {
        std::fs::write(path, &saved)?;
        info!("saved factors to {}", path.display());
    }

    net.clear_factors();
    let loaded = registry.load(&saved, &net)?;
    for b in &loaded {
        b.claim(&mut net);
    }
    let reloaded = registry.seal_all(loaded, &net);
    registry.check_disjoint(&reloaded)?;
    for (old, new) in factors.iter().zip(&reloaded) {
        assert_eq!(old.state_mask(false), new.state_mask(false));
    }
    println!("reloaded {} factors with identical masks", reloaded.len());

    println!("Total time: {:?}", time_total.elapsed());
    Ok(())
}
