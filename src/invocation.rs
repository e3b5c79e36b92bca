//! Interpretation of the fuzzer's positional arguments.
//!
//! | Arguments               | Seed                          | Count        | Verbose |
//! |-------------------------|-------------------------------|--------------|---------|
//! | `SEED`                  | literal                       | 1000         | no      |
//! | `SEED COUNT`            | literal                       | `COUNT`      | no      |
//! | `ACCOUNT COUNT`         | hash of `ACCOUNT`             | `COUNT`      | no      |
//! | `SEED COUNT ANY`        | literal                       | `COUNT`      | yes     |
//! | none, or more than 3    | derived from the clock        | random       | no      |

use std::fmt;
use std::num::ParseIntError;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::random::Random;

pub const DEFAULT_COUNT: usize = 1000;

/// Upper bound of the iteration count picked for clock-derived runs.
pub const MAX_CLOCK_COUNT: i32 = 100_000;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SeedOrigin {
    Literal,
    Account,
    Clock,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Invocation {
    pub seed: u64,
    pub count: usize,
    pub verbose: bool,
    pub origin: SeedOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    InvalidSeed { arg: String, source: ParseIntError },
    InvalidCount { arg: String, source: ParseIntError },
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationError::InvalidSeed { arg, source } => {
                write!(f, "invalid seed '{}': {}", arg, source)
            }
            InvocationError::InvalidCount { arg, source } => {
                write!(f, "invalid test count '{}': {}", arg, source)
            }
        }
    }
}

impl std::error::Error for InvocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvocationError::InvalidSeed { source, .. } => Some(source),
            InvocationError::InvalidCount { source, .. } => Some(source),
        }
    }
}

/// Turn an account-style identifier into a seed.
///
/// Each byte is folded into a base-16 accumulator, so hex digits keep their
/// weight and everything else is just mixed in. Collisions do not matter.
pub fn seed_from_account(account: &str) -> u64 {
    account
        .bytes()
        .fold(0u64, |seed, c| seed.wrapping_mul(16).wrapping_add(c as u64))
}

fn parse_seed(arg: &str) -> Result<u64, InvocationError> {
    arg.parse().map_err(|source| InvocationError::InvalidSeed {
        arg: arg.to_string(),
        source,
    })
}

fn parse_count(arg: &str) -> Result<usize, InvocationError> {
    arg.parse().map_err(|source| InvocationError::InvalidCount {
        arg: arg.to_string(),
        source,
    })
}

fn clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Invocation {
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, InvocationError> {
        Self::from_args_at(args, clock())
    }

    /// Same as [`from_args`][Self::from_args], with the clock reading supplied.
    pub fn from_args_at<S: AsRef<str>>(args: &[S], now: u64) -> Result<Self, InvocationError> {
        let args: Vec<&str> = args.iter().map(|s| s.as_ref()).collect();
        let invocation = match args.as_slice() {
            [seed] => Invocation {
                seed: parse_seed(seed)?,
                count: DEFAULT_COUNT,
                verbose: false,
                origin: SeedOrigin::Literal,
            },
            [first, count] => {
                let count = parse_count(count)?;
                match first.parse::<u64>() {
                    Ok(seed) => Invocation {
                        seed,
                        count,
                        verbose: false,
                        origin: SeedOrigin::Literal,
                    },
                    Err(_) => Invocation {
                        seed: seed_from_account(first),
                        count,
                        verbose: false,
                        origin: SeedOrigin::Account,
                    },
                }
            }
            [seed, count, _] => Invocation {
                seed: parse_seed(seed)?,
                count: parse_count(count)?,
                verbose: true,
                origin: SeedOrigin::Literal,
            },
            _ => Self::from_clock(now),
        };
        Ok(invocation)
    }

    pub fn from_clock(now: u64) -> Self {
        let mut rand = Random::new(now);
        let seed = rand.generate() as u64;
        let count = rand.pick_int(0, MAX_CLOCK_COUNT) as usize;
        Invocation {
            seed,
            count,
            verbose: false,
            origin: SeedOrigin::Clock,
        }
    }
}
