// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Per-cell inline styling. Styles live only in the view that set them and
//! are never written to the sheets service.

use crate::grid::CellPos;
use std::collections::BTreeMap;

pub const FONT_SIZES: [u16; 3] = [14, 16, 18];
pub const DEFAULT_FONT_SIZE: u16 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl CellColor {
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "red" => Some(Self::Red),
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "blue" => Some(Self::Blue),
            "magenta" => Some(Self::Magenta),
            "cyan" => Some(Self::Cyan),
            _ => None,
        }
    }

    /// Next color in the palette; `None` starts at the first.
    pub fn cycle(current: Option<Self>) -> Self {
        let Some(current) = current else {
            return Self::ALL[0];
        };
        let index = Self::ALL
            .iter()
            .position(|color| *color == current)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub size: Option<u16>,
    pub color: Option<CellColor>,
}

impl CellStyle {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    pub fn font_size(&self) -> u16 {
        self.size.unwrap_or(DEFAULT_FONT_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleChange {
    Bold,
    Italic,
    Size(u16),
    NextSize,
    Color(CellColor),
    NextColor,
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    cells: BTreeMap<CellPos, CellStyle>,
}

impl StyleMap {
    pub fn get(&self, pos: CellPos) -> CellStyle {
        self.cells.get(&pos).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bold and italic toggle; the other changes set a value.
    pub fn apply(&mut self, pos: CellPos, change: StyleChange) -> CellStyle {
        let mut style = self.get(pos);
        match change {
            StyleChange::Bold => style.bold = !style.bold,
            StyleChange::Italic => style.italic = !style.italic,
            StyleChange::Size(size) => style.size = Some(size),
            StyleChange::NextSize => {
                let current = style.font_size();
                let index = FONT_SIZES
                    .iter()
                    .position(|size| *size == current)
                    .map_or(0, |index| (index + 1) % FONT_SIZES.len());
                style.size = Some(FONT_SIZES[index]);
            }
            StyleChange::Color(color) => style.color = Some(color),
            StyleChange::NextColor => style.color = Some(CellColor::cycle(style.color)),
            StyleChange::Clear => style = CellStyle::default(),
        }

        if style.is_plain() {
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, style);
        }
        style
    }

    /// Drops styles for cells that no longer exist after a shrink.
    pub fn retain_within(&mut self, rows: usize, cols: usize) {
        self.cells.retain(|pos, _| pos.row < rows && pos.col < cols);
    }
}

#[cfg(test)]
mod tests {
    use super::{CellColor, CellStyle, StyleChange, StyleMap};
    use crate::CellPos;

    #[test]
    fn bold_and_italic_toggle() {
        let mut styles = StyleMap::default();
        let pos = CellPos::new(1, 2);

        let style = styles.apply(pos, StyleChange::Bold);
        assert!(style.bold);
        styles.apply(pos, StyleChange::Italic);
        assert_eq!(
            styles.get(pos),
            CellStyle {
                bold: true,
                italic: true,
                ..CellStyle::default()
            }
        );

        styles.apply(pos, StyleChange::Bold);
        styles.apply(pos, StyleChange::Italic);
        assert!(styles.is_empty(), "plain styles should not be stored");
    }

    #[test]
    fn size_cycles_through_palette() {
        let mut styles = StyleMap::default();
        let pos = CellPos::new(0, 0);
        assert_eq!(styles.apply(pos, StyleChange::NextSize).size, Some(16));
        assert_eq!(styles.apply(pos, StyleChange::NextSize).size, Some(18));
        assert_eq!(styles.apply(pos, StyleChange::NextSize).size, Some(14));
    }

    #[test]
    fn color_cycle_wraps() {
        assert_eq!(CellColor::cycle(None), CellColor::Red);
        assert_eq!(CellColor::cycle(Some(CellColor::Red)), CellColor::Green);
        assert_eq!(CellColor::cycle(Some(CellColor::Cyan)), CellColor::Red);
        assert_eq!(CellColor::parse(CellColor::Blue.as_str()), Some(CellColor::Blue));
    }

    #[test]
    fn retain_within_prunes_removed_cells() {
        let mut styles = StyleMap::default();
        styles.apply(CellPos::new(0, 0), StyleChange::Bold);
        styles.apply(CellPos::new(4, 0), StyleChange::Bold);
        styles.apply(CellPos::new(0, 4), StyleChange::Color(CellColor::Blue));

        styles.retain_within(4, 4);
        assert_eq!(styles.len(), 1);
        assert!(styles.get(CellPos::new(0, 0)).bold);
    }
}
