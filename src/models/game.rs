//! Registry of the games whose Papyrus compilers we know how to drive.
//!
//! Each game has a slug (used to build settings keys such as
//! `fallout4CompilerPath`), a display title, the flags file its compiler ships
//! with, and whether its compiler understands the `-release`/`-final` switches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Static description of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameInfo {
    pub slug: &'static str,
    pub title: &'static str,
    pub default_flags: &'static str,
    pub supports_release_variants: bool,
}

/// A target game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    #[default]
    Unknown,
    Skyrim,
    Fallout4,
}

const UNKNOWN: GameInfo = GameInfo {
    slug: "unknown",
    title: "Unknown",
    default_flags: "",
    supports_release_variants: false,
};

const SKYRIM: GameInfo = GameInfo {
    slug: "skyrim",
    title: "Skyrim",
    default_flags: "TESV_Papyrus_Flags.flg",
    supports_release_variants: false,
};

const FALLOUT4: GameInfo = GameInfo {
    slug: "fallout4",
    title: "Fallout 4",
    default_flags: "Institute_Papyrus_Flags.flg",
    supports_release_variants: true,
};

impl Game {
    /// All games in registry order. Unknown is always first.
    pub const ALL: [Game; 3] = [Game::Unknown, Game::Skyrim, Game::Fallout4];

    /// The real games, i.e. everything except Unknown
    pub fn known() -> impl Iterator<Item = Game> {
        Self::ALL.into_iter().filter(|g| *g != Game::Unknown)
    }

    pub fn info(self) -> &'static GameInfo {
        match self {
            Game::Unknown => &UNKNOWN,
            Game::Skyrim => &SKYRIM,
            Game::Fallout4 => &FALLOUT4,
        }
    }

    pub fn slug(self) -> &'static str {
        self.info().slug
    }

    pub fn title(self) -> &'static str {
        self.info().title
    }

    pub fn default_flags(self) -> &'static str {
        self.info().default_flags
    }

    pub fn supports_release_variants(self) -> bool {
        self.info().supports_release_variants
    }

    /// Look up a known game by slug, ignoring ASCII case.
    ///
    /// Never returns [`Game::Unknown`]: "unknown" is not something a user can
    /// select, so it is treated like any other unrecognized slug.
    pub fn from_slug(slug: &str) -> Option<Game> {
        let slug = slug.trim();
        Self::known().find(|g| g.slug().eq_ignore_ascii_case(slug))
    }

    /// Settings key holding this game's compiler path, e.g. `skyrimCompilerPath`
    pub fn compiler_path_key(self) -> String {
        format!("{}CompilerPath", self.slug())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
