/// Best-effort glyph table for the terminal renderer.
///
/// Every visual is a two-column cell.  A missing file, a bad file, or a
/// missing or malformed entry falls back to a flat block of the same width
/// and logs a warning; loading never fails.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::level::SpriteKind;

/// Glyph used when an asset is unavailable.
pub const PLACEHOLDER: &str = "██";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKey {
    Player,
    Enemy,
    Boss,
    Bullet,
    Coin,
    Door,
    Heart,
    HalfHeart,
    Floor,
}

impl AssetKey {
    pub const ALL: [AssetKey; 9] = [
        AssetKey::Player,
        AssetKey::Enemy,
        AssetKey::Boss,
        AssetKey::Bullet,
        AssetKey::Coin,
        AssetKey::Door,
        AssetKey::Heart,
        AssetKey::HalfHeart,
        AssetKey::Floor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AssetKey::Player => "player",
            AssetKey::Enemy => "enemy",
            AssetKey::Boss => "boss",
            AssetKey::Bullet => "bullet",
            AssetKey::Coin => "coin",
            AssetKey::Door => "door",
            AssetKey::Heart => "heart",
            AssetKey::HalfHeart => "half_heart",
            AssetKey::Floor => "floor",
        }
    }
}

impl From<SpriteKind> for AssetKey {
    fn from(kind: SpriteKind) -> Self {
        match kind {
            SpriteKind::Player => AssetKey::Player,
            SpriteKind::Enemy => AssetKey::Enemy,
            SpriteKind::Boss => AssetKey::Boss,
            SpriteKind::Bullet => AssetKey::Bullet,
            SpriteKind::Coin => AssetKey::Coin,
            SpriteKind::Door => AssetKey::Door,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpriteFile {
    sprites: HashMap<String, String>,
}

#[derive(Clone, Debug, Default)]
pub struct SpriteSet {
    glyphs: HashMap<AssetKey, String>,
}

impl SpriteSet {
    /// Every asset on its placeholder.
    pub fn placeholders() -> Self {
        SpriteSet::default()
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ron::error::SpannedError> {
        let file: SpriteFile = ron::from_str(text)?;
        let mut glyphs = HashMap::new();
        for key in AssetKey::ALL {
            match file.sprites.get(key.name()) {
                Some(glyph) if glyph.chars().count() == 2 => {
                    glyphs.insert(key, glyph.clone());
                }
                Some(glyph) => {
                    warn!(asset = key.name(), glyph = %glyph, "glyph must be two cells wide, using placeholder");
                }
                None => {
                    warn!(asset = key.name(), "asset missing, using placeholder");
                }
            }
        }
        Ok(SpriteSet { glyphs })
    }

    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), %err, "could not load sprites, using placeholders");
                return Self::placeholders();
            }
        };
        Self::from_ron_str(&text).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "could not parse sprites, using placeholders");
            Self::placeholders()
        })
    }

    pub fn glyph(&self, key: impl Into<AssetKey>) -> &str {
        self.glyphs
            .get(&key.into())
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER)
    }

    pub fn is_placeholder(&self, key: AssetKey) -> bool {
        !self.glyphs.contains_key(&key)
    }
}
