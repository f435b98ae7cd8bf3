use clap::Parser;
use linear_hash::ByteMap;
use linear_hash::TryReserveError;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Fraction of the inserted keys to remove afterwards
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.0)]
    remove_fraction: f64,

    /// Rows of the probe histogram to print before folding the tail
    #[arg(long = "rows", default_value_t = 16)]
    rows: usize,
}

fn main() -> Result<(), TryReserveError> {
    env_logger::init();
    let args = Args::parse();

    println!(
        "Creating ByteMap with target capacity: {}",
        args.target_capacity
    );

    let mut map: ByteMap<String, u64> = ByteMap::try_with_capacity(args.target_capacity)?;
    let initial_capacity = map.capacity();

    println!("Actual capacity: {}", initial_capacity);
    println!("Filling map with string keys up to its max load...");

    let mut i = 0u64;
    loop {
        if map.policy().max_load() * (initial_capacity as f64) < (map.len() + 1) as f64 {
            break;
        }
        if !map.try_insert(format!("key_{:016X}", i), i)? {
            panic!("Key already exists in map: {}", i);
        }
        i += 1;
    }
    assert_eq!(map.capacity(), initial_capacity);

    let to_remove = (map.len() as f64 * args.remove_fraction.clamp(0.0, 1.0)) as u64;
    for k in 0..to_remove {
        map.remove(&format!("key_{:016X}", k));
    }

    println!("Inserted {} keys, removed {}", i, to_remove);
    println!(
        "Final load factor: {:.2}%",
        ((map.len() + map.tombstones()) as f64 / map.capacity() as f64) * 100.0
    );

    map.probe_histogram().print(args.rows);
    map.debug_stats().print();

    Ok(())
}
