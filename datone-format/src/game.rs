use std::fmt;
use std::str::FromStr;

use crate::order::is_buzzword;

/// The game an archive was built for. The games disagree on which node index
/// a non-first directory entry links back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Game {
    /// LEGO Star Wars: The Video Game.
    #[default]
    Lsw1,
    /// LEGO Star Wars II: The Original Trilogy.
    Lsw2,
    /// LEGO Star Wars: The Complete Saga.
    Tcs,
}

impl Game {
    /// Whether a directory entry that is not the first of its siblings
    /// points at the running cursor instead of the remembered first child.
    pub(crate) fn links_to_cursor(self, name: &str, first_directory: bool) -> bool {
        match self {
            Game::Lsw1 => is_buzzword(&name.to_lowercase()),
            Game::Lsw2 => first_directory,
            Game::Tcs => false,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Game::Lsw1 => "lsw1",
            Game::Lsw2 => "lsw2",
            Game::Tcs => "tcs",
        })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown game `{0}`, expected one of `lsw1`, `lsw2` or `tcs`")]
pub struct ParseGameError(String);

impl FromStr for Game {
    type Err = ParseGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lsw1" => Ok(Game::Lsw1),
            "lsw2" => Ok(Game::Lsw2),
            "tcs" => Ok(Game::Tcs),
            _ => Err(ParseGameError(s.to_string())),
        }
    }
}
