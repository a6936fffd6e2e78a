use anyhow::{Context, Result};

const JOBS: [&str; 8] = [
    "admin.",
    "blue-collar",
    "technician",
    "services",
    "management",
    "retired",
    "student",
    "unknown",
];
const MARITAL: [&str; 4] = ["married", "single", "divorced", "unknown"];
const YES_NO: [&str; 3] = ["no", "yes", "unknown"];
const CONTACT: [&str; 2] = ["cellular", "telephone"];
const MONTHS: [&str; 10] = [
    "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const DAYS: [&str; 5] = ["mon", "tue", "wed", "thu", "fri"];

/// Deterministic SplitMix64 stream, enough for reproducible sample files.
struct CampaignRng(u64);

impl CampaignRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Normal sample, rounded and clamped to `[lo, hi]`.
    fn normal_int(&mut self, mean: f64, std_dev: f64, lo: i64, hi: i64) -> i64 {
        let radius = (-2.0 * (1.0 - self.unit()).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.unit();
        let value = (mean + std_dev * radius * angle.sin()).round() as i64;
        value.clamp(lo, hi)
    }

    fn pick<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[(self.next_u64() % choices.len() as u64) as usize]
    }
}

/// Acceptance odds loosely follow the real campaign: students, retirees and
/// cellular contacts convert more often.
fn accepts(rng: &mut CampaignRng, age: i64, job: &str, contact: &str) -> bool {
    let mut p: f64 = 0.08;
    if age < 25 || age > 60 {
        p += 0.15;
    }
    if matches!(job, "student" | "retired") {
        p += 0.10;
    }
    if contact == "cellular" {
        p += 0.04;
    }
    rng.unit() < p
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "bank_sample.csv".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count {n:?}"))?,
        None => 2000,
    };

    let mut rng = CampaignRng(42);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record([
        "age",
        "job",
        "marital",
        "default",
        "housing",
        "loan",
        "contact",
        "month",
        "day_of_week",
        "duration",
        "campaign",
        "y",
    ])?;

    for _ in 0..rows {
        let age = rng.normal_int(40.0, 10.0, 18, 95);
        let job = rng.pick(&JOBS);
        let contact = rng.pick(&CONTACT);
        let duration = rng.normal_int(260.0, 120.0, 0, 4_000);
        let campaign = 1 + (rng.next_u64() % 6) as i64;
        let y = if accepts(&mut rng, age, job, contact) { "yes" } else { "no" };

        writer.write_record([
            age.to_string().as_str(),
            job,
            rng.pick(&MARITAL),
            rng.pick(&YES_NO[..2]),
            rng.pick(&YES_NO),
            rng.pick(&YES_NO),
            contact,
            rng.pick(&MONTHS),
            rng.pick(&DAYS),
            duration.to_string().as_str(),
            campaign.to_string().as_str(),
            y,
        ])?;
    }
    writer.flush()?;

    println!("Wrote {rows} campaign contacts to {output_path}");
    Ok(())
}
