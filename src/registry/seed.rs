use std::time::Instant;

use super::error::Result;
use super::record::Price;
use super::store::Registry;

// ─── Constants ───────────────────────────────────────────────────

pub const DEFAULT_SEED_SIZE: usize = 10;

/// Fraction appended to every seeded price (record `i` costs `i.66`).
const SEED_PRICE_CENTS: u64 = 66;

// ─── Public entry point ──────────────────────────────────────────

/// Populate `registry` with `count` synthetic records through the normal
/// create path. On a fresh registry they get ids `1..=count`.
pub fn seed(registry: &Registry, count: usize) -> Result<()> {
    let start = Instant::now();

    for i in 1..=count as u64 {
        registry.create(format!("name_{i}"), Price::from_cents(i * 100 + SEED_PRICE_CENTS))?;
    }

    tracing::info!(
        count,
        total = registry.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "registry seeded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_contiguous_ids_with_synthetic_values() {
        let registry = Registry::new();
        seed(&registry, 3).unwrap();

        let records = registry.list();
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            let n = i as u64 + 1;
            assert_eq!(record.id, n);
            assert_eq!(record.name, format!("name_{n}"));
            assert_eq!(record.price.to_string(), format!("{n}.66"));
        }
    }

    #[test]
    fn zero_seeds_nothing() {
        let registry = Registry::new();
        seed(&registry, 0).unwrap();
        assert!(registry.is_empty());
    }
}
