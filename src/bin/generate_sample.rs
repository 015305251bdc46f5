//! Write a synthetic automobile dataset with the columns the dashboard
//! plots, as CSV and as Parquet.
//!
//! Usage: `generate_sample [output.csv]` (default `sample_cars.csv`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick from `(item, weight)` pairs.
    fn weighted<'a>(&mut self, items: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for (item, w) in items {
            if roll < *w {
                return *item;
            }
            roll -= w;
        }
        items.last().map(|(item, _)| *item).unwrap_or_default()
    }
}

struct Car {
    make: &'static str,
    fuel_type: &'static str,
    body_style: &'static str,
    drive_wheels: &'static str,
    horsepower: Option<f64>,
    highway_mpg: f64,
}

const MAKES: [&str; 8] = [
    "alfa-romero", "audi", "bmw", "honda", "mazda", "toyota", "volkswagen", "volvo",
];
const BODY_STYLES: [(&str, f64); 5] = [
    ("sedan", 0.47),
    ("hatchback", 0.34),
    ("wagon", 0.12),
    ("hardtop", 0.04),
    ("convertible", 0.03),
];
const DRIVE_WHEELS: [(&str, f64); 3] = [("fwd", 0.59), ("rwd", 0.37), ("4wd", 0.04)];
const FUEL_TYPES: [(&str, f64); 2] = [("gas", 0.9), ("diesel", 0.1)];

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Car> {
    (0..n)
        .map(|i| {
            let drive_wheels = rng.weighted(&DRIVE_WHEELS);
            let fuel_type = rng.weighted(&FUEL_TYPES);
            // Rear-wheel drive cars skew powerful, diesels skew frugal.
            let base_hp = if drive_wheels == "rwd" { 140.0 } else { 90.0 };
            let hp = rng.gauss(base_hp, 25.0).clamp(48.0, 288.0).round();
            let mpg_bonus = if fuel_type == "diesel" { 6.0 } else { 0.0 };
            let mpg = (55.0 - 0.15 * hp + mpg_bonus + rng.gauss(0.0, 2.5))
                .clamp(16.0, 54.0)
                .round();

            Car {
                make: MAKES[(rng.next_u64() % MAKES.len() as u64) as usize],
                fuel_type,
                body_style: rng.weighted(&BODY_STYLES),
                drive_wheels,
                // A couple of unknowns, as in the public dataset.
                horsepower: if i % 100 == 57 { None } else { Some(hp) },
                highway_mpg: mpg,
            }
        })
        .collect()
}

fn write_csv(path: &PathBuf, cars: &[Car]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(["make", "fuel-type", "body-style", "drive-wheels", "horsepower", "highway-mpg"])?;
    for car in cars {
        let hp = car
            .horsepower
            .map(|h| h.to_string())
            .unwrap_or_else(|| "?".to_string());
        writer.write_record([
            car.make,
            car.fuel_type,
            car.body_style,
            car.drive_wheels,
            hp.as_str(),
            car.highway_mpg.to_string().as_str(),
        ])?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &PathBuf, cars: &[Car]) -> Result<()> {
    let strings = |f: fn(&Car) -> &'static str| StringArray::from(cars.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("make", DataType::Utf8, false),
        Field::new("fuel-type", DataType::Utf8, false),
        Field::new("body-style", DataType::Utf8, false),
        Field::new("drive-wheels", DataType::Utf8, false),
        Field::new("horsepower", DataType::Float64, true),
        Field::new("highway-mpg", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(strings(|c| c.make)),
            Arc::new(strings(|c| c.fuel_type)),
            Arc::new(strings(|c| c.body_style)),
            Arc::new(strings(|c| c.drive_wheels)),
            Arc::new(Float64Array::from(
                cars.iter().map(|c| c.horsepower).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                cars.iter().map(|c| c.highway_mpg).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let csv_path = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "sample_cars.csv".to_string()),
    );
    let parquet_path = csv_path.with_extension("parquet");

    let mut rng = SimpleRng::new(42);
    let cars = generate(&mut rng, 205);

    write_csv(&csv_path, &cars)?;
    write_parquet(&parquet_path, &cars)?;

    println!(
        "Wrote {} cars to {} and {}",
        cars.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
