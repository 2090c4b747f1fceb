use std::path::PathBuf;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

const MONTHS_LONG: [&str; 12] = [
    "Janvier", "Février", "Mars", "Avril", "Mai", "Juin", "Juillet", "Août", "Septembre",
    "Octobre", "Novembre", "Décembre",
];

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Month label in one of the spellings found in real exports.
fn month_text(month: usize, rng: &mut SimpleRng) -> String {
    let name = MONTHS_LONG[month - 1];
    // A bare "Juin" resolves to July, so June always carries its number.
    if month == 6 || rng.next_f64() < 0.5 {
        format!("{month:02} - {name}")
    } else {
        name.to_string()
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data").join("DEM_VOLO_M2.xlsx"));
    if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut rng = SimpleRng::new(42);

    let products = ["VOLO", "VOLO+", "DUO", "PRO"];
    let classes = ["1*", "2*", "3*", "4*", "5*"];
    let divisions = ["DV Nord", "DV Est", "DV Ouest", "DV Sud", "DV IDF"];
    // Seasonal weight per month: peaks after summer and at year end.
    let seasonal = [1.0, 0.9, 0.95, 0.9, 0.85, 0.8, 0.7, 0.75, 1.3, 1.2, 1.1, 1.25];

    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name("Sheet1")?;
    let header = ["Mois saisie long", "Annee saisie", "PRODUIT", "CLASSE_CLIENT", "DV", "un"];
    for (c, h) in header.iter().enumerate() {
        ws.write_string(0, c as u16, *h)?;
    }

    let mut row: u32 = 1;
    for (year_idx, year) in (2005..=2008).enumerate() {
        let trend = 1.0 + 0.08 * year_idx as f64;
        for month in 1..=12usize {
            let n = (60.0 * seasonal[month - 1] * trend * (0.8 + 0.4 * rng.next_f64())) as usize;
            for _ in 0..n {
                ws.write_string(row, 0, month_text(month, &mut rng))?;
                ws.write_number(row, 1, year as f64)?;
                ws.write_string(row, 2, *rng.pick(&products))?;
                ws.write_string(row, 3, *rng.pick(&classes))?;
                ws.write_string(row, 4, *rng.pick(&divisions))?;
                ws.write_number(row, 5, 1.0)?;
                row += 1;
            }
        }
    }

    workbook
        .save(&output_path)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!("Wrote {} records to {}", row - 1, output_path.display());
    Ok(())
}
