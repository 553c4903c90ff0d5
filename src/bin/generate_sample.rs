use anyhow::{Context, Result};

use rusty_ts::{write_ts, Channel, Dataset, Instance, Metadata, Target};

/// SplitMix64: one 64-bit state word, good enough for synthetic fixtures.
struct SeriesRng(u64);

impl SeriesRng {
    const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(Self::GAMMA);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * f64::EPSILON / 2.0
    }

    /// Normal sample via Box-Muller, keeping only the cosine branch.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let radius = (-2.0 * (1.0 - self.unit()).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.unit();
        mean + std_dev * radius * angle.cos()
    }
}

/// Random walk around `level`, rounded to two decimals like sensor output.
fn generate_series(rng: &mut SeriesRng, level: f64, len: usize) -> Vec<Option<f64>> {
    let mut value = level;
    (0..len)
        .map(|_| {
            value += rng.normal(0.0, 0.05);
            Some((value * 100.0).round() / 100.0)
        })
        .collect()
}

fn main() -> Result<()> {
    let mut rng = SeriesRng(42);
    let n_instances = 20;

    let instances: Vec<Instance> = (0..n_instances)
        .map(|_| {
            let level = 2.0 + rng.unit();
            let len = 12 + (rng.next_u64() % 12) as usize;
            let values = generate_series(&mut rng, level, len);
            // Target loosely tracks the series level.
            let target = (level - 2.5) + rng.normal(0.0, 0.1);
            Instance {
                channels: vec![Channel::from_values(values)],
                target: Some(Target::Value(target)),
            }
        })
        .collect();

    let dataset = Dataset {
        metadata: Metadata {
            problem_name: "SyntheticLevels".into(),
            timestamps: false,
            missing: false,
            univariate: true,
            equal_length: false,
            target_label: true,
            class_labels: None,
            series_length: None,
            dimensions: None,
        },
        instances,
    };

    let output_path = "sample_data.ts";
    std::fs::write(output_path, write_ts(&dataset)).context("writing sample file")?;

    println!(
        "Wrote {} univariate series of unequal length to {output_path}",
        dataset.len()
    );
    Ok(())
}
