use std::fmt::Display;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};

/// Library-wide behaviour switches.
///
/// `verbose` is the threshold for diagnostics: a message at level `n` is only emitted
/// when `verbose >= n`. Level 0 is reserved for things that are almost certainly errors,
/// level 1 for warnings, level 2 for information and 3 or more for debugging output.
///
/// With `stop_on_warning` set, recoverable input problems turn into
/// [`Error::InvalidInput`] instead of a diagnostic followed by a fallback value.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub verbose: u8,
    pub stop_on_warning: bool,
    pub rng_seed: u64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            verbose: 1,
            stop_on_warning: false,
            rng_seed: 479901,
        }
    }
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }

    /// Emit `message` through the `log` facade if `verbose >= level`.
    pub fn notify(&self, level: u8, message: impl Display) {
        if self.verbose < level {
            return;
        }
        match level {
            0 => log::error!("{}", message),
            1 => log::warn!("{}", message),
            2 => log::info!("{}", message),
            _ => log::debug!("{}", message),
        }
    }

    /// Report a recoverable input problem.
    ///
    /// Lenient mode notifies and returns `Ok(())`, leaving the caller to return its safe
    /// fallback. Strict mode notifies and returns the problem as an error.
    pub fn check(&self, level: u8, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        self.notify(level, &message);
        if self.stop_on_warning {
            return Err(Error::InvalidInput(message));
        }
        Ok(())
    }

    /// A fresh generator seeded from `rng_seed`.
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.rng_seed)
    }
}

pub struct OptionsBuilder {
    verbose: u8,
    stop_on_warning: bool,
    rng_seed: u64,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        let defaults = Options::default();
        OptionsBuilder {
            verbose: defaults.verbose,
            stop_on_warning: defaults.stop_on_warning,
            rng_seed: defaults.rng_seed,
        }
    }

    pub fn verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn stop_on_warning(mut self, stop: bool) -> Self {
        self.stop_on_warning = stop;
        self
    }

    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn build(self) -> Options {
        Options {
            verbose: self.verbose,
            stop_on_warning: self.stop_on_warning,
            rng_seed: self.rng_seed,
        }
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
