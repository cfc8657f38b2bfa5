// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! [`EngineConfig`] (SPEC_FULL.md §A.3): the run-wide flag surface named
//! by spec §6's informative CLI list.

use std::path::PathBuf;

/// Run-wide engine configuration. Every field has an explicit default;
/// `werror` in particular defaults to `false` (spec §9 open question).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of `-v` repeats on the CLI; drives `log::LevelFilter`.
    pub verbosity: u8,
    /// Suppress file writes while still performing every transformation.
    pub dryrun: bool,
    /// Overwrite an existing output path instead of erroring.
    pub force: bool,
    /// Promote every best-effort warning to a fatal error.
    pub werror: bool,
    /// Keep intermediate files instead of removing them after the run.
    pub save_temps: bool,
    /// Emit comments, symbolic phandle references, and annotated types
    /// in `.dts` output.
    pub enhanced: bool,
    /// Relax structural checks that would otherwise fail fast.
    pub permissive: bool,
    /// Run without interactive confirmation prompts.
    pub auto_run: bool,
    /// Directory output paths are resolved relative to.
    pub output_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            verbosity: 0,
            dryrun: false,
            force: false,
            werror: false,
            save_temps: false,
            enhanced: false,
            permissive: false,
            auto_run: false,
            output_dir: None,
        }
    }
}

impl EngineConfig {
    /// Starts from defaults; use the `with_*` setters to adjust.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style verbosity setter.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Builder-style `werror` setter.
    pub fn with_werror(mut self, werror: bool) -> Self {
        self.werror = werror;
        self
    }

    /// Builder-style `dryrun` setter.
    pub fn with_dryrun(mut self, dryrun: bool) -> Self {
        self.dryrun = dryrun;
        self
    }

    /// Builder-style `force` setter.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// The `log::LevelFilter` implied by `verbosity`, mirroring the
    /// conventional `-v`/`-v -v`/`-v -v -v` step-up.
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn werror_defaults_false() {
        assert!(!EngineConfig::default().werror);
    }

    #[test]
    fn verbosity_maps_to_level_filter() {
        assert_eq!(EngineConfig::new().level_filter(), log::LevelFilter::Warn);
        assert_eq!(
            EngineConfig::new().with_verbosity(2).level_filter(),
            log::LevelFilter::Debug
        );
    }
}
