//! Short code generation and validation utilities.
//!
//! Codes are drawn uniformly from a 62-symbol alphanumeric alphabet using the
//! operating system CSPRNG, so a published code says nothing about codes that
//! were issued before or after it.

use regex::Regex;
use std::sync::LazyLock;

/// Characters a short code is drawn from.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Code length used when none (or zero) is configured.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Shortest code length accepted anywhere in the system.
pub const MIN_CODE_LENGTH: usize = 4;

/// Longest code length accepted anywhere in the system.
pub const MAX_CODE_LENGTH: usize = 20;

/// Codes that collide with fixed top-level routes and must never be issued.
pub const RESERVED_CODES: &[&str] = &["health", "api", "admin", "stats"];

/// Largest byte value that maps onto the alphabet without modulo bias (62 * 4).
const UNBIASED_LIMIT: u8 = 248;

static SHORT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("short code pattern is valid"));

/// The random source failed to produce bytes.
#[derive(Debug, thiserror::Error)]
#[error("random source failure: {0}")]
pub struct GeneratorError(pub String);

/// Produces candidate short codes.
///
/// Implementations are stateless from the caller's point of view and safe to
/// share between concurrent requests. Uniqueness is not their concern; the
/// caller checks candidates against the store and retries.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// Returns a new candidate code.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] only if the underlying random source fails.
    fn generate(&self) -> Result<String, GeneratorError>;
}

/// CSPRNG-backed generator of fixed-length alphanumeric codes.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    /// Creates a generator for codes of `length` characters.
    ///
    /// A length of zero falls back to [`DEFAULT_CODE_LENGTH`].
    pub fn new(length: usize) -> Self {
        let length = if length == 0 {
            DEFAULT_CODE_LENGTH
        } else {
            length
        };
        Self { length }
    }

    /// Length of every code this generator emits.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> Result<String, GeneratorError> {
        let mut code = String::with_capacity(self.length);
        // Bytes >= UNBIASED_LIMIT are rejected, so ask for a little more than needed.
        let mut buffer = vec![0u8; self.length + self.length / 2 + 4];

        while code.len() < self.length {
            getrandom::fill(&mut buffer).map_err(|e| GeneratorError(e.to_string()))?;

            for &byte in &buffer {
                if byte >= UNBIASED_LIMIT {
                    continue;
                }
                code.push(ALPHABET[(byte % 62) as usize] as char);
                if code.len() == self.length {
                    break;
                }
            }
        }

        Ok(code)
    }
}

/// Returns `true` if `code` is shadowed by a fixed route.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Checks that `code` could have been issued by this service.
///
/// # Errors
///
/// Returns a human-readable reason when the code has the wrong length or
/// contains characters outside the alphanumeric alphabet.
pub fn validate_short_code(code: &str) -> Result<(), String> {
    if code.len() < MIN_CODE_LENGTH || code.len() > MAX_CODE_LENGTH {
        return Err(format!(
            "Short code must be {MIN_CODE_LENGTH}-{MAX_CODE_LENGTH} characters"
        ));
    }

    if !SHORT_CODE_REGEX.is_match(code) {
        return Err("Short code can only contain letters and digits".to_string());
    }

    Ok(())
}
