use tenure::{format, Catalog, CivilTime, DurationFormatter, FixedClock, Policy, SystemClock, Unit};

fn main() {
    let catalog = Catalog::english();

    // Registered 2021-01-01, viewed a day later
    println!("{}", format(1_609_459_200, 1_609_545_600, &catalog));

    let joined = CivilTime::new(2019, 3, 1, 8, 30, 0).unwrap();
    println!("Joined: {}", joined);

    let views = [
        CivilTime::new(2019, 3, 1, 8, 30, 42).unwrap(),
        CivilTime::new(2019, 3, 1, 10, 45, 0).unwrap(),
        CivilTime::new(2019, 3, 20, 0, 0, 0).unwrap(),
        CivilTime::new(2019, 5, 1, 8, 30, 0).unwrap(),
        CivilTime::new(2020, 3, 1, 8, 30, 0).unwrap(),
        CivilTime::new(2022, 7, 14, 0, 0, 0).unwrap(),
    ];

    let latest = DurationFormatter::default();
    let legacy = DurationFormatter::new(Policy::Legacy);
    for view in views {
        let (old, new) = (joined.to_epoch_secs(), view.to_epoch_secs());
        println!(
            "{}  latest: {:<20} legacy: {}",
            view,
            latest.format(old, new, &catalog),
            legacy.format(old, new, &catalog)
        );
    }

    // Custom translation
    let french = Catalog::english()
        .with(Unit::Year, "%d an", "%d ans")
        .with(Unit::Month, "%d mois", "%d mois");
    let clock = FixedClock(CivilTime::new(2022, 7, 14, 0, 0, 0).unwrap().to_epoch_secs());
    println!("French: {}", latest.format_since(joined.to_epoch_secs(), &clock, &french));

    // Closure translator
    let short = |unit: Unit, count: u64| format!("{}{}", count, unit.key().to_lowercase());
    println!("Short: {}", format(0, 3_725, &short));

    // Against the wall clock
    println!(
        "Since 2021-01-01: {}",
        latest.format_since(1_609_459_200, &SystemClock, &catalog)
    );
}
