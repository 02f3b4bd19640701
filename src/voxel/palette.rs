//! Named color palettes

use serde::{Deserialize, Serialize};

use super::voxel::Voxel;

/// One named palette color
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    #[serde(default)]
    pub name: String,
    pub color: Voxel,
}

/// Ordered list of colors; export meshes can reference entries by index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default)]
    pub name: String,
    pub entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Palette built from bare colors
    pub fn from_colors(colors: impl IntoIterator<Item = Voxel>) -> Self {
        Self {
            name: String::new(),
            entries: colors
                .into_iter()
                .map(|color| PaletteEntry { name: String::new(), color })
                .collect(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, color: Voxel) -> usize {
        self.entries.push(PaletteEntry { name: name.into(), color });
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Voxel> {
        self.entries.get(index).map(|e| e.color)
    }

    /// Index of the entry with the given name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Index of the entry closest to `color` in RGB (squared euclidean).
    /// Ties resolve to the lowest index. `None` for an empty palette.
    pub fn nearest(&self, color: Voxel) -> Option<usize> {
        let dist = |c: Voxel| {
            let dr = c.r as i32 - color.r as i32;
            let dg = c.g as i32 - color.g as i32;
            let db = c.b as i32 - color.b as i32;
            dr * dr + dg * dg + db * db
        };
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(i, e)| (dist(e.color), *i))
            .map(|(i, _)| i)
    }

    /// Texture coordinate sampling entry `index` from a 1-row palette texture
    pub fn texcoord(&self, index: usize) -> [f32; 2] {
        let len = self.entries.len().max(1) as f32;
        [(index as f32 + 0.5) / len, 0.5]
    }
}
