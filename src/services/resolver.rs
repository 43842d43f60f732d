//! Build configuration resolution.
//!
//! Turns a scanned project directory into build targets by reconciling the
//! project's config file, its project file, the user's default game and the
//! per-game compiler paths.
//!
//! # Precedence
//!
//! 1. A config file that names a `game` decides the game outright; an
//!    unrecognized slug is an error, never a fallback to the default game.
//! 2. Without a `game`, a project file falls back to the `defaultGame` setting.
//! 3. A config `compiler` replaces the game's configured compiler and skips
//!    the per-game path check.
//! 4. Project file targets are produced first. Config targets are best-effort
//!    once a project target exists: their validation errors are dropped.

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::{SettingsStore, load_config_file};
use crate::error::{CompilerSource, ResolveError, Result};
use crate::models::{ACTIVE_FILE_PLACEHOLDER, BuildTarget, Game, ProjectConfig};
use crate::services::scanner::ScanResult;
use crate::services::targets::{BuildVariant, make_target};
use crate::services::validator::CompilerPathValidator;

async fn is_file(path: &Utf8Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn is_dir(path: &Utf8Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Resolves build targets for one scanned project directory
pub struct ConfigResolver<'a> {
    cwd: &'a Utf8Path,
    scan: &'a ScanResult,
    settings: &'a dyn SettingsStore,
    validator: &'a CompilerPathValidator,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(
        cwd: &'a Utf8Path,
        scan: &'a ScanResult,
        settings: &'a dyn SettingsStore,
        validator: &'a CompilerPathValidator,
    ) -> Self {
        Self {
            cwd,
            scan,
            settings,
            validator,
        }
    }

    /// Resolve the build targets.
    ///
    /// `game` is reset to [`Game::Unknown`] and then updated as soon as the
    /// game is decided, so it reflects the resolved game even when a later
    /// step (such as the compiler path check) fails.
    ///
    /// # Errors
    /// The first failing gate, or the last target assembly error when no
    /// target could be produced at all
    pub async fn resolve(&self, game: &mut Game) -> Result<Vec<BuildTarget>> {
        *game = Game::Unknown;
        let project_file = self.scan.project_file.as_deref();
        let mut last_error = None;

        let config = match &self.scan.config_file {
            Some(path) => match load_config_file(path).await {
                // A file without a usable map still counts, it just sets nothing
                Ok(values) => Some(ProjectConfig::new(values.unwrap_or_default())),
                Err(e) if project_file.is_some() => {
                    tracing::warn!("{}; continuing with the project file only", e);
                    last_error = Some(e);
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };
        let custom_compiler = config.as_ref().and_then(ProjectConfig::compiler);

        if let Some(config) = &config {
            if project_file.is_none() && !config.has_game_or_compiler() {
                return Err(ResolveError::MissingGameOrCompiler);
            }

            if let Some(slug) = config.game() {
                *game = Game::from_slug(slug)
                    .ok_or_else(|| ResolveError::UnknownGame(slug.to_string()))?;
            } else if project_file.is_some() {
                *game = self.default_game()?;
            }

            if *game == Game::Unknown || custom_compiler.is_some() {
                let Some(path) = &custom_compiler else {
                    return Err(ResolveError::MissingGameOrCompiler);
                };
                if !is_file(path).await {
                    return Err(ResolveError::invalid_compiler(CompilerSource::Custom(
                        path.clone(),
                    )));
                }
            }
        } else if project_file.is_some() {
            *game = self.default_game()?;
        } else {
            return Err(last_error.unwrap_or_else(|| ResolveError::NotEligible(self.cwd.to_path_buf())));
        }

        let game = *game;
        tracing::debug!("Resolved game for {}: {}", self.cwd, game);

        let compiler = match custom_compiler {
            Some(path) => path,
            None => {
                if !self.validator.validate(game, true) {
                    return Err(ResolveError::invalid_compiler(game));
                }
                self.validator
                    .compiler_path(game)
                    .ok_or_else(|| ResolveError::invalid_compiler(game))?
            }
        };

        let mut targets = Vec::new();

        if let Some(project_file) = project_file {
            if game.supports_release_variants() {
                targets.extend(self.project_targets(project_file, &compiler));
            } else {
                tracing::debug!("{} has no project file support, skipping {}", game, project_file);
                last_error = Some(ResolveError::ProjectFileUnsupported(game));
            }
        }

        if let Some(config) = &config {
            match self.config_arguments(config, game).await {
                Ok(base) => targets.extend(self.config_targets(config, game, &compiler, &base)),
                Err(e) if !targets.is_empty() => {
                    tracing::debug!("Ignoring config file problem, project targets exist: {}", e);
                }
                Err(e) => last_error = Some(e),
            }
        }

        if targets.is_empty() {
            return Err(last_error.unwrap_or_else(|| ResolveError::NotEligible(self.cwd.to_path_buf())));
        }

        tracing::info!("Resolved {} build target(s) for {}", targets.len(), self.cwd);
        Ok(targets)
    }

    fn default_game(&self) -> Result<Game> {
        let slug = self.settings.default_game().unwrap_or_default();
        Game::from_slug(&slug).ok_or(ResolveError::InvalidDefaultGame(slug))
    }

    fn project_targets(&self, project_file: &Utf8Path, compiler: &Utf8Path) -> Vec<BuildTarget> {
        let name = project_file.file_name().unwrap_or(project_file.as_str());
        let base = vec![project_file.to_string()];

        BuildVariant::ALL
            .into_iter()
            .map(|variant| {
                make_target(
                    format!("Papyrus: {}{}", name, variant.label()),
                    compiler,
                    variant.apply(&base),
                )
            })
            .collect()
    }

    fn config_targets(
        &self,
        config: &ProjectConfig,
        game: Game,
        compiler: &Utf8Path,
        base: &[String],
    ) -> Vec<BuildTarget> {
        if game.supports_release_variants() {
            return BuildVariant::ALL
                .into_iter()
                .map(|variant| {
                    make_target(
                        format!("Papyrus: active file{}", variant.label()),
                        compiler,
                        variant.apply(base),
                    )
                })
                .collect();
        }

        let mut args = base.to_vec();
        if config.release() {
            args.push("-release".to_string());
        }
        if config.final_release() {
            args.push("-final".to_string());
        }
        vec![make_target("Papyrus: active file", compiler, args)]
    }

    /// Validate the config file for building the active file and produce the
    /// shared compiler arguments.
    ///
    /// Relative imports and output directories are taken relative to the
    /// project directory, since the compiler runs from its own directory.
    async fn config_arguments(&self, config: &ProjectConfig, game: Game) -> Result<Vec<String>> {
        if !config.has_game_or_compiler() {
            return Err(ResolveError::MissingGameOrCompiler);
        }

        let imports = config.imports().ok_or(ResolveError::MissingImportsList)?;
        let imports: Vec<String> = imports
            .iter()
            .map(|import| self.project_relative(Utf8Path::new(import)).into_string())
            .collect();

        let output = match config.output() {
            Some(dir) => {
                let dir = self.project_relative(&dir);
                if !is_dir(&dir).await {
                    return Err(ResolveError::InvalidOutputDirectory(dir));
                }
                dir.into_string()
            }
            None => ".".to_string(),
        };

        let flags = match config.flags() {
            Some(flags) => flags.to_string(),
            None if game == Game::Unknown => return Err(ResolveError::MissingFlags),
            None => game.default_flags().to_string(),
        };

        let mut args = vec![
            ACTIVE_FILE_PLACEHOLDER.to_string(),
            format!("-import={}", imports.join(";")),
            format!("-output={}", output),
            format!("-flags={}", flags),
        ];
        if config.optimize() {
            args.push("-optimize".to_string());
        }
        Ok(args)
    }

    fn project_relative(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
