//! Writes a synthetic `car_prices.csv` in the auction dataset's column layout.
//!
//! Usage: `generate_sample [OUTPUT] [ROWS]` (defaults: `car_prices.csv`, 20000).

use anyhow::{Context, Result};
use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};

const HEADER: [&str; 16] = [
    "year",
    "make",
    "model",
    "trim",
    "body",
    "transmission",
    "vin",
    "state",
    "condition",
    "odometer",
    "color",
    "interior",
    "seller",
    "mmr",
    "sellingprice",
    "saledate",
];

/// (make, models, new-car base price)
const MAKES: [(&str, &[&str], f64); 8] = [
    ("Ford", &["F-150", "Fusion", "Escape", "Focus"], 32_000.0),
    ("Chevrolet", &["Malibu", "Impala", "Silverado 1500"], 30_000.0),
    ("Nissan", &["Altima", "Sentra", "Rogue"], 26_000.0),
    ("Toyota", &["Camry", "Corolla", "RAV4"], 27_000.0),
    ("Honda", &["Accord", "Civic", "CR-V"], 27_500.0),
    ("BMW", &["3 Series", "5 Series", "X5"], 52_000.0),
    ("Kia", &["Optima", "Sorento", "Soul"], 23_000.0),
    ("Hyundai", &["Sonata", "Elantra"], 24_000.0),
];

/// (state code as the auction data writes it, UTC offset in hours, zone name)
const STATES: [(&str, i32, &str); 10] = [
    ("ca", -8, "PST"),
    ("fl", -5, "EST"),
    ("pa", -5, "EST"),
    ("tx", -6, "CST"),
    ("ga", -5, "EST"),
    ("nj", -5, "EST"),
    ("il", -6, "CST"),
    ("az", -7, "MST"),
    ("tn", -6, "CST"),
    ("on", -5, "EST"),
];

const BODIES: [&str; 4] = ["Sedan", "SUV", "Coupe", "Crew Cab"];
const COLORS: [&str; 5] = ["black", "white", "silver", "gray", "blue"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform index in `0..n`.
    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn vin(rng: &mut SimpleRng) -> String {
    const CHARS: &[u8] = b"0123456789ABCDEFGHJKLMNPRSTUVWXYZ";
    (0..17).map(|_| *rng.pick(CHARS) as char).collect()
}

/// One clean row; mmr tracks age, mileage and condition, the sale price scatters around it.
fn clean_row(rng: &mut SimpleRng) -> Result<Vec<String>> {
    let &(make, models, base_price) = rng.pick(&MAKES);
    let &(state, offset_hours, zone) = rng.pick(&STATES);
    let year = 2000 + rng.below(16) as i32;
    let age = (2015 - year).max(0) as f64;
    let odometer = (age * 12_000.0 + rng.gauss(0.0, 6_000.0)).max(5.0).round();
    let condition = 1.0 + (rng.below(41) as f64) / 10.0;

    let mmr = (base_price * 0.85_f64.powf(age) * (0.6 + condition / 10.0) - odometer * 0.02)
        .max(300.0);
    let mmr = (mmr / 25.0).round() * 25.0;
    let sellingprice = (mmr * (1.0 + rng.gauss(0.0, 0.08))).max(100.0);
    let sellingprice = (sellingprice / 100.0).round() * 100.0;

    let start = NaiveDate::from_ymd_opt(2014, 12, 15)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .context("building start date")?;
    let local = start
        + Duration::days(rng.below(210) as i64)
        + Duration::minutes(rng.below(10 * 60) as i64);
    let offset = FixedOffset::east_opt(offset_hours * 3600).context("building UTC offset")?;
    let saledate = offset
        .from_local_datetime(&local)
        .single()
        .context("resolving local sale time")?;

    Ok(vec![
        year.to_string(),
        make.to_string(),
        rng.pick(models).to_string(),
        "Base".to_string(),
        rng.pick(&BODIES).to_string(),
        "automatic".to_string(),
        vin(rng).to_lowercase(),
        state.to_string(),
        format!("{condition:.1}"),
        format!("{odometer:.0}"),
        rng.pick(&COLORS).to_string(),
        "black".to_string(),
        format!("{} auto sales", make.to_lowercase()),
        format!("{mmr:.0}"),
        format!("{sellingprice:.0}"),
        format!("{} ({zone})", saledate.format("%a %b %d %Y %H:%M:%S GMT%z")),
    ])
}

/// Damage one field the way real exports go wrong.
fn corrupt(row: &mut [String], rng: &mut SimpleRng) {
    match rng.below(5) {
        0 => row[0] = "unknown".to_string(),
        1 => row[1].clear(),
        2 => row[13] = "n/a".to_string(),
        3 => row[14].clear(),
        _ => row[15] = "16/13/2015".to_string(),
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "car_prices.csv".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("row count {n:?}"))?,
        None => 20_000,
    };

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(HEADER)?;

    let mut corrupted = 0;
    for _ in 0..rows {
        let mut row = clean_row(&mut rng)?;
        // About one row in a hundred is broken.
        if rng.below(100) == 0 {
            corrupt(&mut row, &mut rng);
            corrupted += 1;
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;

    println!("Wrote {rows} sales ({corrupted} deliberately broken) to {output_path}");
    Ok(())
}
