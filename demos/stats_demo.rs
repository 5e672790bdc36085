use std::hash::BuildHasherDefault;
use std::hash::DefaultHasher;

use chain_hash::Growth;
use chain_hash::HashMap;
use chain_hash::LoadFactor;
use clap::Parser;
use clap::ValueEnum;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GrowthArg {
    /// Keep the initial bucket count.
    Fixed,
    /// Double the bucket count when the load factor would be exceeded.
    Rehash,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "capacity", default_value_t = 16)]
    capacity: usize,

    #[arg(short = 'k', long = "keys", default_value_t = 1000)]
    keys: u64,

    #[arg(short = 'g', long = "growth", value_enum, default_value_t = GrowthArg::Fixed)]
    growth: GrowthArg,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.75)]
    load_factor: f64,
}

fn main() -> Result<(), chain_hash::MapError> {
    let args = Args::parse();

    let growth = match args.growth {
        GrowthArg::Fixed => Growth::Fixed,
        GrowthArg::Rehash => Growth::Rehash(LoadFactor::new(args.load_factor)?),
    };

    let mut map: HashMap<u64, u64, BuildHasherDefault<DefaultHasher>> =
        HashMap::with_capacity_growth_and_hasher(args.capacity, growth, Default::default());

    println!(
        "Created HashMap: requested capacity {}, actual capacity {}, growth {:?}",
        args.capacity,
        map.capacity(),
        map.growth()
    );

    for key in 0..args.keys {
        map.insert(key, key * 2);
    }
    // Overwrites keep the entry count and the chain positions.
    for key in (0..args.keys).step_by(10) {
        map.insert(key, key * 3);
    }

    println!("Inserted {} keys", map.len());
    println!(
        "Final capacity {}, load factor {:.2}",
        map.capacity(),
        map.load_factor()
    );

    map.debug_stats().print();
    map.print_chain_histogram();

    if let Some(first) = map.chain(0).next() {
        println!("First entry in bucket 0: {first:?}");
    }

    Ok(())
}
