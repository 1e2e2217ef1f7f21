//! Coordinate transform between two chapter maps.
//!
//! Physical page numbers drift between the probe-bearing rendering and the
//! clean one, but a page's rank within its chapter is comparatively
//! stable. Reprojection carries a rank across: exact when the chapter has
//! the same page count in both maps, clamped to the new chapter's last page
//! when the clean rendering reflowed shorter.

use crate::model::ChapterMap;

/// Maps `(ordinal, chapter)` coordinates from an old map to pages of a new map.
#[derive(Debug, Clone, Copy)]
pub struct PositionReprojector<'a> {
    old: &'a ChapterMap,
    new: &'a ChapterMap,
}

impl<'a> PositionReprojector<'a> {
    pub fn new(old: &'a ChapterMap, new: &'a ChapterMap) -> Self {
        Self { old, new }
    }

    /// Physical page in the new map for the page at `ordinal` of `chapter`
    /// in the old map.
    ///
    /// Ordinals past the end of the old chapter clamp to its last page.
    /// Returns `None` when either map lacks the chapter.
    pub fn reproject(&self, ordinal: usize, chapter: u32) -> Option<u32> {
        reproject(ordinal, chapter, self.old, self.new)
    }
}

/// Free-function form of [`PositionReprojector::reproject`].
pub fn reproject(ordinal: usize, chapter: u32, old: &ChapterMap, new: &ChapterMap) -> Option<u32> {
    let old_pages = old.pages(chapter)?;
    let new_pages = new.pages(chapter)?;
    let last_new = *new_pages.last()?;

    let rank = ordinal.clamp(1, old_pages.len()) - 1;
    let old_page = old_pages[rank];
    let index = old_pages.iter().position(|&p| p == old_page)?;

    Some(new_pages.get(index).copied().unwrap_or(last_new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn map(entries: &[(u32, &[u32])]) -> ChapterMap {
        let raw: BTreeMap<u32, Vec<u32>> = entries.iter().map(|(c, p)| (*c, p.to_vec())).collect();
        ChapterMap::new(raw).unwrap()
    }

    #[test]
    fn test_shorter_chapter_clamps_to_last_page() {
        let old = map(&[(3, &[10, 11, 12])]);
        let new = map(&[(3, &[9, 10])]);
        assert_eq!(reproject(3, 3, &old, &new), Some(10));
    }

    #[test]
    fn test_equal_page_counts_are_exact() {
        let old = map(&[(1, &[1, 2]), (2, &[3, 4, 5])]);
        let new = map(&[(1, &[1, 2]), (2, &[3, 4, 5])]);
        let reprojector = PositionReprojector::new(&old, &new);
        assert_eq!(reprojector.reproject(1, 2), Some(3));
        assert_eq!(reprojector.reproject(3, 2), Some(5));
    }

    #[test]
    fn test_drifted_chapter_keeps_rank() {
        let old = map(&[(1, &[1, 2, 3]), (2, &[4, 5, 6])]);
        let new = map(&[(1, &[1, 2]), (2, &[3, 4, 5])]);
        assert_eq!(reproject(2, 2, &old, &new), Some(4));
    }

    #[test]
    fn test_out_of_range_ordinal_clamps() {
        let old = map(&[(1, &[1, 2])]);
        let new = map(&[(1, &[1, 2, 3])]);
        assert_eq!(reproject(9, 1, &old, &new), Some(2));
        assert_eq!(reproject(0, 1, &old, &new), Some(1));
    }

    #[test]
    fn test_missing_chapter() {
        let old = map(&[(1, &[1]), (2, &[2])]);
        let new = map(&[(1, &[1])]);
        assert_eq!(reproject(1, 2, &old, &new), None);
        assert_eq!(reproject(1, 5, &old, &new), None);
    }
}
