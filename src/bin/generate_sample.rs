const ROWS: &str = "ABCDEFGH";
const COLUMNS: usize = 12;
const READS: usize = 61;
const INTERVAL_SECONDS: u32 = 30;

/// Saturating product curve: fast linear start, plateau later.
fn kinetic_curve(t_min: f64, rate: f64, plateau: f64, baseline: f64) -> f64 {
    if rate <= 0.0 {
        return baseline;
    }
    baseline + plateau * (1.0 - (-rate * t_min / plateau).exp())
}

fn format_time(seconds: u32) -> String {
    format!("{}:{:02}:{:02}", seconds / 3600, (seconds / 60) % 60, seconds % 60)
}

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
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);

    let times: Vec<f64> = (0..READS)
        .map(|i| (i as u32 * INTERVAL_SECONDS) as f64 / 60.0)
        .collect();

    let mut headers = vec!["Time".to_string()];
    let mut wells: Vec<Vec<f64>> = Vec::new();
    let mut jumps = 0;
    let mut dead = 0;

    for row in ROWS.chars() {
        for column in 1..=COLUMNS {
            headers.push(format!("{row}{column}"));

            // Column 12 holds blanks, the rest a spread of activities.
            let rate = if column == COLUMNS || rng.next_f64() < 0.08 {
                dead += 1;
                0.0
            } else {
                0.005 + rng.next_f64() * 0.06
            };
            let plateau = 0.4 + rng.next_f64() * 1.2;
            let baseline = 0.04 + rng.next_f64() * 0.02;

            let mut values: Vec<f64> = times
                .iter()
                .map(|&t| kinetic_curve(t, rate, plateau, baseline) + rng.gauss(0.0, 0.002))
                .collect();

            // Occasional reader jump (bubble, lid condensation).
            if rng.next_f64() < 0.1 {
                jumps += 1;
                let at = 10 + (rng.next_f64() * (READS - 20) as f64) as usize;
                let offset = 0.3 + rng.next_f64() * 0.5;
                for v in &mut values[at..] {
                    *v += offset;
                }
            }
            wells.push(values);
        }
    }

    let output_path = "sample_plate.txt";
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(output_path)?;
    writer.write_record(&headers)?;
    for (i, _) in times.iter().enumerate() {
        let mut record = vec![format_time(i as u32 * INTERVAL_SECONDS)];
        record.extend(wells.iter().map(|w| format!("{:.4}", w[i])));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} wells x {READS} reads to {output_path} ({jumps} with jumps, {dead} blank)",
        wells.len()
    );
    Ok(())
}
