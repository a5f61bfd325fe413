//! Random test data: strings, numbers, arrays and tabular rows.
//!
//! Every function takes the generator explicitly so tests can seed it.

use std::collections::BTreeMap;

use rand::Rng;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

pub const DEFAULT_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    Upper,
    #[default]
    Lower,
    Mixed,
}

/// A number in `0..max`; `0` when `max` is `0`.
pub fn number<R: Rng + ?Sized>(rng: &mut R, max: u64) -> u64 {
    if max == 0 { 0 } else { rng.gen_range(0..max) }
}

pub fn character<R: Rng + ?Sized>(rng: &mut R, case: Case) -> char {
    let c = LETTERS[rng.gen_range(0..LETTERS.len())] as char;
    match case {
        Case::Upper => c.to_ascii_uppercase(),
        Case::Lower => c,
        Case::Mixed if rng.gen_bool(0.5) => c.to_ascii_uppercase(),
        Case::Mixed => c,
    }
}

pub fn string<R: Rng + ?Sized>(rng: &mut R, length: usize, case: Case) -> String {
    (0..length).map(|_| character(rng, case)).collect()
}

/// Letters (either case) and digits, roughly half of each.
pub fn alphanumeric<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| {
            if rng.gen_bool(0.5) {
                character(rng, Case::Mixed)
            } else {
                char::from(b'0' + rng.gen_range(0..10u8))
            }
        })
        .collect()
}

pub fn array<R: Rng + ?Sized>(rng: &mut R, size: usize, max_value: u64) -> Vec<u64> {
    (0..size).map(|_| number(rng, max_value)).collect()
}

fn columns<R: Rng + ?Sized>(rng: &mut R, count: usize) -> BTreeMap<String, String> {
    (0..count)
        .map(|_| {
            (
                alphanumeric(rng, DEFAULT_LENGTH),
                alphanumeric(rng, DEFAULT_LENGTH),
            )
        })
        .collect()
}

/// An object with fewer than `max_size` random alphanumeric entries.
pub fn object<R: Rng + ?Sized>(rng: &mut R, max_size: usize) -> BTreeMap<String, String> {
    let size = number(rng, max_size as u64) as usize;
    columns(rng, size)
}

/// Between 1 and `max_rows` rows, each with the same number (1..=`max_columns`)
/// of random alphanumeric columns.
pub fn table<R: Rng + ?Sized>(
    rng: &mut R,
    max_columns: usize,
    max_rows: usize,
) -> Vec<BTreeMap<String, String>> {
    let column_count = number(rng, max_columns as u64) as usize + 1;
    let row_count = number(rng, max_rows as u64) as usize + 1;
    (0..row_count).map(|_| columns(rng, column_count)).collect()
}
