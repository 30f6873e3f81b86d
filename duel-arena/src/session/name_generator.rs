//! Default player names for duelists who did not pick one
//!
//! Names look like `Kestra-417`: a Markov-chain base trained on callsigns,
//! capitalized, plus a three-digit tag. Every generated name is a valid
//! `PlayerId`.

use markov_namegen::{CharacterChainGenerator, RandomTextGenerator};
use rand::Rng;

use super::types::MAX_NAME_LEN;

/// Arcade-style callsigns the chain learns from
const CALLSIGNS: &[&str] = &[
    "Astrid", "Bjorn", "Freya", "Ragna", "Sigrid", "Ivar", "Kestrel", "Falcon", "Vesper",
    "Nova", "Quill", "Tamsin", "Orla", "Corvin", "Juno", "Saxon", "Talon", "Wren", "Brisk",
    "Cobalt", "Dagny", "Embla", "Haldor", "Linnea", "Maeve", "Niamh", "Oskar", "Petra",
    "Runa", "Solveig", "Tove", "Ulrik", "Valka", "Yrsa", "Zora",
];

/// Base names shorter than this read as noise
const MIN_BASE_LEN: usize = 3;
/// Longest base; leaves room for the tag
const MAX_BASE_LEN: usize = 10;
/// Chain draws before falling back to a training callsign
const MAX_ATTEMPTS: usize = 64;

pub(crate) struct NameGenerator {
    chain: CharacterChainGenerator,
}

impl NameGenerator {
    pub(crate) fn new() -> Self {
        let chain = CharacterChainGenerator::builder()
            .with_order(2)
            .with_prior(0.01)
            .train(CALLSIGNS.iter().copied())
            .build();
        Self { chain }
    }

    /// Capitalized letters-only base, `MIN_BASE_LEN..=MAX_BASE_LEN` long
    pub(crate) fn base(&mut self, rng: &mut impl Rng) -> String {
        for _ in 0..MAX_ATTEMPTS {
            let raw = self.chain.generate_one();
            let len = raw.chars().count();
            if (MIN_BASE_LEN..=MAX_BASE_LEN).contains(&len)
                && raw.chars().all(|c| c.is_ascii_alphabetic())
            {
                return capitalize(&raw);
            }
        }
        CALLSIGNS[rng.random_range(0..CALLSIGNS.len())].to_string()
    }

    /// Base plus a `-NNN` tag
    pub(crate) fn generate(&mut self, rng: &mut impl Rng) -> String {
        let base = self.base(rng);
        let tag: u16 = rng.random_range(100..1000);
        format!("{}-{}", base, tag)
    }
}

fn capitalize(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// A fresh default player name
pub fn generate_player_name() -> String {
    NameGenerator::new().generate(&mut rand::rng())
}

// Tag plus separator must fit next to the longest base
const _: () = assert!(MAX_BASE_LEN + 4 <= MAX_NAME_LEN);
