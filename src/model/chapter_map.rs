//! Chapter → page coordinate system for one rendering.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Ordered mapping from chapter number to the physical pages it spans.
///
/// Invariants, enforced by every constructor:
/// - chapter numbers are positive and strictly increasing;
/// - every chapter has at least one page;
/// - pages strictly increase within a chapter and across chapters, so every
///   page of chapter `c1` is below every page of any later chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(transparent))]
pub struct ChapterMap {
    chapters: BTreeMap<u32, Vec<u32>>,
}

impl ChapterMap {
    /// An empty map. Produced for documents with no page signals.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a map from already-ordered data, rejecting anything that breaks
    /// the ordering invariants.
    pub fn new(chapters: BTreeMap<u32, Vec<u32>>) -> Result<Self> {
        let mut prev_page: Option<u32> = None;

        for (&chapter, pages) in &chapters {
            if chapter == 0 {
                return Err(Error::InvalidChapterMap(
                    "chapter numbers start at 1".to_string(),
                ));
            }
            if pages.is_empty() {
                return Err(Error::InvalidChapterMap(format!(
                    "chapter {chapter} has no pages"
                )));
            }
            for &page in pages {
                if prev_page.is_some_and(|prev| page <= prev) {
                    return Err(Error::InvalidChapterMap(format!(
                        "page {page} in chapter {chapter} does not follow page {}",
                        prev_page.unwrap_or_default()
                    )));
                }
                prev_page = Some(page);
            }
        }

        Ok(Self { chapters })
    }

    /// Repair a raw chapter dictionary into a valid map.
    ///
    /// Chapters are visited in key order and renumbered densely from 1.
    /// Within each chapter pages are sorted, then any page that does not
    /// exceed the last accepted page (carried across chapters) becomes
    /// `last + 1`. Pages that cannot move past `u32::MAX` are dropped, as are
    /// chapters left without pages. Never fails; running it on its own output
    /// is a no-op.
    pub fn repair(raw: BTreeMap<u32, Vec<u32>>) -> Self {
        let mut chapters = BTreeMap::new();
        let mut prev_chapter = 0u32;
        let mut prev_page: Option<u32> = None;

        for (_, mut pages) in raw {
            pages.sort_unstable();

            let mut accepted = Vec::with_capacity(pages.len());
            for page in pages {
                let page = match prev_page {
                    None if page > 0 => page,
                    None => 1,
                    Some(prev) if page > prev => page,
                    Some(prev) => match prev.checked_add(1) {
                        Some(next) => next,
                        None => break,
                    },
                };
                accepted.push(page);
                prev_page = Some(page);
            }

            if accepted.is_empty() {
                continue;
            }
            prev_chapter += 1;
            chapters.insert(prev_chapter, accepted);
        }

        Self { chapters }
    }

    /// Expand every chapter to the contiguous page range `min..=max`.
    ///
    /// Pages that carried no header in the extracted text are still
    /// physically inside their chapter; filling makes them addressable.
    pub fn filled(&self) -> Self {
        let chapters = self
            .chapters
            .iter()
            .map(|(&chapter, pages)| {
                let first = pages[0];
                let last = pages[pages.len() - 1];
                (chapter, (first..=last).collect())
            })
            .collect();
        Self { chapters }
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Number of chapters.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Pages belonging to `chapter`, in order.
    pub fn pages(&self, chapter: u32) -> Option<&[u32]> {
        self.chapters.get(&chapter).map(Vec::as_slice)
    }

    /// The chapter whose page list contains `page`.
    pub fn chapter_of(&self, page: u32) -> Option<u32> {
        self.chapters
            .iter()
            .find(|(_, pages)| pages.binary_search(&page).is_ok())
            .map(|(&chapter, _)| chapter)
    }

    /// 1-based rank of `page` within `chapter`, if it is listed there.
    pub fn ordinal_of(&self, chapter: u32, page: u32) -> Option<usize> {
        self.pages(chapter)?
            .binary_search(&page)
            .ok()
            .map(|index| index + 1)
    }

    /// Rank of the last listed page not after `page`, at least 1.
    ///
    /// Equals [`ordinal_of`](Self::ordinal_of) for listed pages. For pages
    /// pushed past the end of the chapter by monotonic correction this is
    /// the chapter's last ordinal; the result always addresses a real entry.
    pub fn clamped_ordinal(&self, chapter: u32, page: u32) -> Option<usize> {
        let pages = self.pages(chapter)?;
        Some(pages.partition_point(|&p| p <= page).max(1))
    }

    /// Physical page at 1-based `ordinal` in `chapter`.
    pub fn page_at(&self, chapter: u32, ordinal: usize) -> Option<u32> {
        let index = ordinal.checked_sub(1)?;
        self.pages(chapter)?.get(index).copied()
    }

    pub fn first_chapter(&self) -> Option<u32> {
        self.chapters.keys().next().copied()
    }

    /// Iterate `(chapter, pages)` in chapter order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u32])> {
        self.chapters
            .iter()
            .map(|(&chapter, pages)| (chapter, pages.as_slice()))
    }

    pub fn into_inner(self) -> BTreeMap<u32, Vec<u32>> {
        self.chapters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn raw(entries: &[(u32, &[u32])]) -> BTreeMap<u32, Vec<u32>> {
        entries.iter().map(|(c, p)| (*c, p.to_vec())).collect()
    }

    #[test]
    fn test_repair_scenario() {
        let map = ChapterMap::repair(raw(&[(1, &[5]), (2, &[5, 4]), (4, &[6])]));
        assert_eq!(map.into_inner(), raw(&[(1, &[5]), (2, &[6, 7]), (3, &[8])]));
    }

    #[test]
    fn test_repair_lifts_page_zero() {
        let map = ChapterMap::repair(raw(&[(1, &[0, 1])]));
        assert_eq!(map.pages(1), Some(&[1, 2][..]));
    }

    #[test]
    fn test_repair_drops_empty_chapters() {
        let map = ChapterMap::repair(raw(&[(1, &[]), (2, &[3])]));
        assert_eq!(map.into_inner(), raw(&[(1, &[3])]));
    }

    #[test]
    fn test_repair_stops_at_last_page_number() {
        let max = u32::MAX;
        let input = raw(&[(1, &[max - 1, max]), (2, &[max]), (3, &[max, 2])]);
        let map = ChapterMap::repair(input);
        assert_eq!(map.clone().into_inner(), raw(&[(1, &[max - 1, max])]));
        assert!(ChapterMap::new(map.into_inner()).is_ok());
    }

    #[test]
    fn test_new_rejects_overlapping_chapters() {
        let err = ChapterMap::new(raw(&[(1, &[1, 5]), (2, &[4])])).unwrap_err();
        assert!(matches!(err, Error::InvalidChapterMap(_)));
    }

    #[test]
    fn test_new_rejects_chapter_zero() {
        assert!(ChapterMap::new(raw(&[(0, &[1])])).is_err());
    }

    #[test]
    fn test_new_accepts_gaps() {
        let map = ChapterMap::new(raw(&[(1, &[1, 3]), (3, &[7])])).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.chapter_of(7), Some(3));
        assert_eq!(map.chapter_of(2), None);
    }

    #[test]
    fn test_filled_closes_gaps() {
        let map = ChapterMap::new(raw(&[(1, &[1, 4]), (2, &[6])])).unwrap();
        assert_eq!(map.filled().into_inner(), raw(&[(1, &[1, 2, 3, 4]), (2, &[6])]));
    }

    #[test]
    fn test_ordinals() {
        let map = ChapterMap::new(raw(&[(1, &[1, 2]), (2, &[5, 6, 8])])).unwrap();
        assert_eq!(map.ordinal_of(2, 6), Some(2));
        assert_eq!(map.ordinal_of(2, 7), None);
        assert_eq!(map.clamped_ordinal(2, 7), Some(2));
        assert_eq!(map.clamped_ordinal(2, 40), Some(3));
        assert_eq!(map.clamped_ordinal(2, 1), Some(1));
        assert_eq!(map.page_at(2, 3), Some(8));
        assert_eq!(map.page_at(2, 0), None);
        assert_eq!(map.page_at(9, 1), None);
    }

    fn arb_raw() -> impl Strategy<Value = BTreeMap<u32, Vec<u32>>> {
        prop::collection::btree_map(0u32..40, prop::collection::vec(0u32..500, 0..8), 0..10)
    }

    proptest! {
        #[test]
        fn prop_repair_output_is_strictly_increasing(input in arb_raw()) {
            let map = ChapterMap::repair(input);
            let mut prev_chapter = 0;
            let mut prev_page = 0;
            for (chapter, pages) in map.iter() {
                prop_assert!(chapter > prev_chapter);
                prev_chapter = chapter;
                prop_assert!(!pages.is_empty());
                for &page in pages {
                    prop_assert!(page > prev_page);
                    prev_page = page;
                }
            }
        }

        #[test]
        fn prop_repair_is_idempotent(input in arb_raw()) {
            let once = ChapterMap::repair(input);
            let twice = ChapterMap::repair(once.clone().into_inner());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_repaired_maps_pass_validation(input in arb_raw()) {
            let map = ChapterMap::repair(input);
            prop_assert!(ChapterMap::new(map.clone().into_inner()).is_ok());
            prop_assert!(ChapterMap::new(map.filled().into_inner()).is_ok());
        }

        #[test]
        fn prop_clamped_ordinal_stays_in_chapter(input in arb_raw(), page in 0u32..600) {
            let map = ChapterMap::repair(input);
            for (chapter, pages) in map.iter() {
                let ordinal = map.clamped_ordinal(chapter, page).unwrap();
                prop_assert!(ordinal >= 1 && ordinal <= pages.len());
            }
        }
    }
}
