use collections::{Dict, DictError};
use log::info;

fn main() -> Result<(), DictError> {
    env_logger::builder().init();

    let mut dict = Dict::new();
    println!("{dict}");

    for (city, team) in [
        ("Atlanta", "Hawks"),
        ("Boston", "Celtics"),
        ("Los Angeles", "Lakers"),
        ("Denver", "Nuggets"),
    ] {
        dict.store(city, team)?;
    }
    println!("{dict}");

    match dict.retrieve_str("Denver") {
        Some(team) => println!("Denver: {team}"),
        None => println!("Denver is missing"),
    }
    println!("size: {}", dict.size());

    dict.delete("Boston");
    info!("deleted Boston, contains: {}", dict.contains("Boston"));
    println!("{dict}");

    dict.store("Denver", "Broncos")?;
    for i in 0..50 {
        dict.store(&format!("team{i}"), "Some Team")?;
    }
    println!(
        "size: {}, capacity: {}, load factor: {:.3}",
        dict.size(),
        dict.capacity(),
        dict.load_factor()
    );

    dict.for_each(|city, team| {
        if !city.starts_with("team") {
            println!("{city}: {}", String::from_utf8_lossy(team));
        }
    });
    Ok(())
}
