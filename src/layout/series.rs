//! Per-axis size, position and index bookkeeping.
//!
//! A [`SeriesSizing`] describes one axis of the grid (rows or columns) in
//! three coordinate spaces:
//!
//! - **model** index: position in the full data set, `0..count`
//! - **real** index: hidden entries removed, frozen entries moved to the
//!   front in ascending model order, `0..real_count`
//! - **scroll** index: real index minus the frozen count, `0..scroll_count`
//!
//! Sizes are stored as overrides keyed by model index so they survive any
//! hide/freeze reconfiguration. Positions come from two prefix-sum arrays
//! (frozen entries and scroll entries) rebuilt by [`SeriesSizing::build_index`].
//!
//! Every lookup clamps its input. Indices may go stale between a recount
//! and a queued UI event, and a stale index must never bring the grid down.

use std::collections::HashMap;
use std::ops::Range;

use tracing::debug;

/// Default row height in pixels.
pub const DEFAULT_ROW_HEIGHT: i32 = 20;

/// Default column width in pixels.
pub const DEFAULT_COLUMN_WIDTH: i32 = 80;

/// Where model index `index` ends up after the entry at `start` is moved
/// in front of `target` on an axis of `count` entries. `target` counts
/// positions before the removal, so `count` means "to the end".
pub fn moved_index(index: u32, start: u32, target: u32, count: u32) -> u32 {
    if start >= count {
        return index;
    }
    let at = if target > start { target - 1 } else { target }.min(count.saturating_sub(1));
    if index == start {
        at
    } else if start < index && index <= at {
        index - 1
    } else if at <= index && index < start {
        index + 1
    } else {
        index
    }
}

/// Size, position and index mapping for one grid axis.
#[derive(Debug, Clone)]
pub struct SeriesSizing {
    count: u32,
    default_size: i32,
    max_size: Option<i32>,
    size_overrides: HashMap<u32, i32>,
    /// Hidden model indices, sorted and deduplicated.
    hidden: Vec<u32>,
    /// Frozen model indices (never hidden), sorted and deduplicated.
    frozen: Vec<u32>,
    /// `hidden_before[m]` = number of hidden model indices `< m`.
    /// Empty while the axis has no hidden or frozen entries.
    hidden_before: Vec<u32>,
    /// `frozen_before[m]` = number of frozen model indices `< m`.
    frozen_before: Vec<u32>,
    /// Model index of every scroll index.
    scroll_to_model: Vec<u32>,
    /// `frozen_positions[i]` = pixel start of frozen entry `i`; one extra
    /// trailing entry holds the total frozen size.
    frozen_positions: Vec<i32>,
    /// `scroll_positions[i]` = pixel start of scroll entry `i` relative to
    /// the scroll area; one extra trailing entry holds the total.
    scroll_positions: Vec<i32>,
    /// Set when sizes changed after the last index build.
    stale: bool,
}

impl Default for SeriesSizing {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_HEIGHT)
    }
}

impl SeriesSizing {
    /// Create an empty axis whose entries are `default_size` pixels.
    pub fn new(default_size: i32) -> Self {
        Self {
            count: 0,
            default_size: default_size.max(1),
            max_size: None,
            size_overrides: HashMap::new(),
            hidden: Vec::new(),
            frozen: Vec::new(),
            hidden_before: Vec::new(),
            frozen_before: Vec::new(),
            scroll_to_model: Vec::new(),
            frozen_positions: vec![0],
            scroll_positions: vec![0],
            stale: false,
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Model entry count.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Change the model count. Hidden and frozen indices past the new end
    /// are dropped; size overrides are kept.
    pub fn set_count(&mut self, count: u32) {
        self.count = count;
        self.hidden.retain(|&m| m < count);
        self.frozen.retain(|&m| m < count);
        self.rebuild_mapping();
        self.build_index();
    }

    /// Replace the hidden and frozen sets.
    ///
    /// Indices outside `0..count` are ignored, and an index that is both
    /// hidden and frozen is treated as hidden. Frozen entries are ordered by
    /// model index whatever order they arrive in.
    pub fn set_extraordinary_indexes<H, F>(&mut self, hidden: H, frozen: F)
    where
        H: IntoIterator<Item = u32>,
        F: IntoIterator<Item = u32>,
    {
        let count = self.count;
        let mut hidden: Vec<u32> = hidden.into_iter().filter(|&m| m < count).collect();
        hidden.sort_unstable();
        hidden.dedup();

        let mut requested = 0usize;
        let mut frozen: Vec<u32> = frozen
            .into_iter()
            .inspect(|_| requested += 1)
            .filter(|&m| m < count && hidden.binary_search(&m).is_err())
            .collect();
        frozen.sort_unstable();
        frozen.dedup();

        if frozen.len() < requested {
            debug!(
                target: "gridview::layout",
                requested,
                kept = frozen.len(),
                "frozen set clamped to visible entries"
            );
        }

        self.hidden = hidden;
        self.frozen = frozen;
        self.rebuild_mapping();
        self.build_index();
    }

    pub fn default_size(&self) -> i32 {
        self.default_size
    }

    /// Change the default entry size. Call [`build_index`](Self::build_index)
    /// (or [`ensure_index`](Self::ensure_index)) before trusting positions.
    pub fn set_default_size(&mut self, size: i32) {
        let size = size.max(1);
        if size != self.default_size {
            self.default_size = size;
            self.stale = true;
        }
    }

    pub fn max_size(&self) -> Option<i32> {
        self.max_size
    }

    /// Upper bound applied to every override.
    pub fn set_max_size(&mut self, max_size: Option<i32>) {
        let max_size = max_size.map(|m| m.max(1));
        if max_size != self.max_size {
            self.max_size = max_size;
            self.stale = true;
        }
    }

    // ------------------------------------------------------------------
    // Counts
    // ------------------------------------------------------------------

    /// Entries left after removing hidden ones.
    pub fn real_count(&self) -> u32 {
        self.count.saturating_sub(len_u32(&self.hidden))
    }

    pub fn frozen_count(&self) -> u32 {
        len_u32(&self.frozen)
    }

    pub fn scroll_count(&self) -> u32 {
        self.real_count().saturating_sub(self.frozen_count())
    }

    /// Total pixel size of the frozen entries.
    pub fn frozen_size(&self) -> i32 {
        self.frozen_positions.last().copied().unwrap_or(0)
    }

    /// Total pixel size of the scrollable entries.
    pub fn total_scroll_size(&self) -> i32 {
        self.scroll_positions.last().copied().unwrap_or(0)
    }

    fn has_extraordinary(&self) -> bool {
        !self.hidden.is_empty() || !self.frozen.is_empty()
    }

    // ------------------------------------------------------------------
    // Index mapping
    // ------------------------------------------------------------------

    pub fn is_model_index_hidden(&self, model: u32) -> bool {
        if model >= self.count || self.hidden.is_empty() {
            return false;
        }
        prefix_step(&self.hidden_before, model)
    }

    pub fn is_model_index_frozen(&self, model: u32) -> bool {
        if model >= self.count || self.frozen.is_empty() {
            return false;
        }
        prefix_step(&self.frozen_before, model)
    }

    /// Frozen entries occupy the first real indices.
    pub fn is_real_index_frozen(&self, real: u32) -> bool {
        real < self.frozen_count()
    }

    /// Map a model index to its real index.
    ///
    /// Out-of-range input is clamped to the last model index. Returns `None`
    /// for an empty axis or a hidden entry.
    pub fn model_to_real(&self, model: u32) -> Option<u32> {
        if self.count == 0 {
            return None;
        }
        let model = model.min(self.count - 1);
        if !self.has_extraordinary() {
            return Some(model);
        }
        if self.is_model_index_hidden(model) {
            return None;
        }
        let frozen_before = self.frozen_before.get(model as usize).copied()?;
        if self.is_model_index_frozen(model) {
            return Some(frozen_before);
        }
        let hidden_before = self.hidden_before.get(model as usize).copied()?;
        Some(model - hidden_before - frozen_before + self.frozen_count())
    }

    /// Map a real index back to its model index.
    ///
    /// Out-of-range input is clamped to the last real index. Returns `None`
    /// only when the axis has no real entries.
    pub fn real_to_model(&self, real: u32) -> Option<u32> {
        let real_count = self.real_count();
        if real_count == 0 {
            return None;
        }
        let real = real.min(real_count - 1);
        if !self.has_extraordinary() {
            return Some(real);
        }
        let frozen_count = self.frozen_count();
        if real < frozen_count {
            return self.frozen.get(real as usize).copied();
        }
        self.scroll_to_model
            .get((real - frozen_count) as usize)
            .copied()
    }

    /// Model index of a scroll index, clamped like [`real_to_model`](Self::real_to_model).
    pub fn scroll_to_model(&self, scroll: u32) -> Option<u32> {
        if self.scroll_count() == 0 {
            return None;
        }
        self.real_to_model(scroll.saturating_add(self.frozen_count()))
    }

    // ------------------------------------------------------------------
    // Sizes
    // ------------------------------------------------------------------

    fn clamp_size(&self, size: i32) -> i32 {
        let size = size.max(1);
        match self.max_size {
            Some(max) => size.min(max),
            None => size,
        }
    }

    pub fn get_size_by_model_index(&self, model: u32) -> i32 {
        match self.size_overrides.get(&model) {
            Some(&size) => self.clamp_size(size),
            None => self.default_size,
        }
    }

    pub fn get_size_by_real_index(&self, real: u32) -> i32 {
        match self.real_to_model(real) {
            Some(model) => self.get_size_by_model_index(model),
            None => self.default_size,
        }
    }

    pub fn get_size_by_scroll_index(&self, scroll: u32) -> i32 {
        match self.scroll_to_model(scroll) {
            Some(model) => self.get_size_by_model_index(model),
            None => self.default_size,
        }
    }

    pub fn has_size_override(&self, model: u32) -> bool {
        self.size_overrides.contains_key(&model)
    }

    /// Record a measured size for a model index.
    ///
    /// Overrides only grow: measuring a column cell by cell keeps the widest
    /// value. Use [`resize`](Self::resize) to set an exact size.
    pub fn put_size_override(&mut self, model: u32, size: i32) {
        let size = self.clamp_size(size);
        let entry = self.size_overrides.entry(model).or_insert(size);
        if size > *entry {
            *entry = size;
        }
        self.stale = true;
    }

    pub fn remove_size_override(&mut self, model: u32) {
        if self.size_overrides.remove(&model).is_some() {
            self.stale = true;
        }
    }

    /// Carry size overrides along when the model entry at `start` moves in
    /// front of `target`.
    pub fn move_size_overrides(&mut self, start: u32, target: u32) {
        let count = self.count;
        self.size_overrides = self
            .size_overrides
            .drain()
            .map(|(model, size)| (moved_index(model, start, target, count), size))
            .collect();
        self.stale = true;
    }

    /// Drop every override and rebuild positions.
    pub fn clear_size_overrides(&mut self) {
        self.size_overrides.clear();
        self.build_index();
    }

    /// Set the exact size of a real index and rebuild positions immediately.
    pub fn resize(&mut self, real: u32, size: i32) {
        self.resize_no_build(real, size);
        self.build_index();
    }

    /// Set the exact size of a real index without rebuilding.
    ///
    /// Positions stay stale until [`build_index`](Self::build_index) runs.
    pub fn resize_no_build(&mut self, real: u32, size: i32) {
        if let Some(model) = self.real_to_model(real) {
            let size = self.clamp_size(size);
            self.size_overrides.insert(model, size);
            self.stale = true;
        }
    }

    /// Resize a batch of real indices with a single rebuild.
    pub fn resize_many<I>(&mut self, reals: I, size: i32)
    where
        I: IntoIterator<Item = u32>,
    {
        for real in reals {
            self.resize_no_build(real, size);
        }
        self.build_index();
    }

    // ------------------------------------------------------------------
    // Index build
    // ------------------------------------------------------------------

    /// True when sizes changed since the last [`build_index`](Self::build_index).
    pub fn is_index_stale(&self) -> bool {
        self.stale
    }

    /// Rebuild positions only if sizes changed since the last build.
    pub fn ensure_index(&mut self) {
        if self.stale {
            self.build_index();
        }
    }

    /// Recompute the frozen and scroll prefix sums. O(real count).
    pub fn build_index(&mut self) {
        let mut frozen_positions = Vec::with_capacity(self.frozen.len() + 1);
        let mut acc: i32 = 0;
        frozen_positions.push(acc);
        for &model in &self.frozen {
            acc = acc.saturating_add(self.get_size_by_model_index(model));
            frozen_positions.push(acc);
        }

        let scroll_count = self.scroll_count() as usize;
        let mut scroll_positions = Vec::with_capacity(scroll_count + 1);
        let mut acc: i32 = 0;
        scroll_positions.push(acc);
        if self.has_extraordinary() {
            for &model in &self.scroll_to_model {
                acc = acc.saturating_add(self.get_size_by_model_index(model));
                scroll_positions.push(acc);
            }
        } else if self.size_overrides.is_empty() {
            for _ in 0..scroll_count {
                acc = acc.saturating_add(self.default_size);
                scroll_positions.push(acc);
            }
        } else {
            for model in 0..self.count {
                acc = acc.saturating_add(self.get_size_by_model_index(model));
                scroll_positions.push(acc);
            }
        }

        self.frozen_positions = frozen_positions;
        self.scroll_positions = scroll_positions;
        self.stale = false;
    }

    /// Recompute the hidden/frozen prefix counts and the scroll-to-model map.
    fn rebuild_mapping(&mut self) {
        self.hidden_before.clear();
        self.frozen_before.clear();
        self.scroll_to_model.clear();
        if !self.has_extraordinary() {
            return;
        }

        let count = self.count as usize;
        self.hidden_before.reserve(count + 1);
        self.frozen_before.reserve(count + 1);
        self.scroll_to_model
            .reserve(count.saturating_sub(self.hidden.len() + self.frozen.len()));

        let mut hidden = self.hidden.iter().peekable();
        let mut frozen = self.frozen.iter().peekable();
        let mut hidden_seen = 0u32;
        let mut frozen_seen = 0u32;
        for model in 0..self.count {
            self.hidden_before.push(hidden_seen);
            self.frozen_before.push(frozen_seen);
            if hidden.peek() == Some(&&model) {
                hidden.next();
                hidden_seen += 1;
            } else if frozen.peek() == Some(&&model) {
                frozen.next();
                frozen_seen += 1;
            } else {
                self.scroll_to_model.push(model);
            }
        }
        self.hidden_before.push(hidden_seen);
        self.frozen_before.push(frozen_seen);
    }

    // ------------------------------------------------------------------
    // Positions
    // ------------------------------------------------------------------

    /// Pixel start of a real index, counting every real entry before it
    /// (frozen ones included). `real_count` yields the total size.
    pub fn get_position_by_real_index(&self, real: u32) -> i32 {
        let real = real.min(self.real_count());
        let frozen_count = self.frozen_count();
        if real < frozen_count {
            return self.get_frozen_position(real);
        }
        self.frozen_size()
            .saturating_add(self.get_position_by_scroll_index(real - frozen_count))
    }

    /// Pixel start of a scroll index relative to the scroll area origin.
    pub fn get_position_by_scroll_index(&self, scroll: u32) -> i32 {
        let scroll = scroll.min(self.scroll_count()) as usize;
        self.scroll_positions
            .get(scroll)
            .or_else(|| self.scroll_positions.last())
            .copied()
            .unwrap_or(0)
    }

    /// Pixel start of a frozen real index relative to the frozen area origin.
    pub fn get_frozen_position(&self, real: u32) -> i32 {
        let real = real.min(self.frozen_count()) as usize;
        self.frozen_positions.get(real).copied().unwrap_or(0)
    }

    /// Pixel distance from the start of `from` to the start of `to` (both
    /// scroll indices). Negative when `to` precedes `from`.
    pub fn get_size_sum(&self, from: u32, to: u32) -> i32 {
        self.get_position_by_scroll_index(to)
            .saturating_sub(self.get_position_by_scroll_index(from))
    }

    /// Scroll index whose span contains `position`, clamped to
    /// `0..scroll_count`.
    pub fn get_scroll_index_on_position(&self, position: i32) -> u32 {
        let starts = self
            .scroll_positions
            .get(..self.scroll_count() as usize)
            .unwrap_or(&[]);
        let idx = starts.partition_point(|&p| p <= position);
        to_u32(idx.saturating_sub(1))
    }

    /// Frozen real index whose span contains `position`, clamped to
    /// `0..frozen_count`.
    pub fn get_frozen_index_on_position(&self, position: i32) -> u32 {
        let starts = self
            .frozen_positions
            .get(..self.frozen.len())
            .unwrap_or(&[]);
        let idx = starts.partition_point(|&p| p <= position);
        to_u32(idx.saturating_sub(1))
    }

    // ------------------------------------------------------------------
    // Viewport helpers
    // ------------------------------------------------------------------

    /// Number of whole or partial scroll entries visible from `first` in a
    /// viewport of `viewport` pixels.
    pub fn get_visible_scroll_count(&self, first: u32, viewport: i32) -> u32 {
        let scroll_count = self.scroll_count();
        if first >= scroll_count || viewport <= 0 {
            return 0;
        }
        let end = self
            .get_position_by_scroll_index(first)
            .saturating_add(viewport);
        let starts = self
            .scroll_positions
            .get(..scroll_count as usize)
            .unwrap_or(&[]);
        to_u32(starts.partition_point(|&p| p < end)).saturating_sub(first)
    }

    /// Number of whole or partial scroll entries visible when the viewport
    /// ends at `last` (inclusive).
    pub fn get_visible_scroll_count_reversed(&self, last: u32, viewport: i32) -> u32 {
        let scroll_count = self.scroll_count();
        if scroll_count == 0 || viewport <= 0 {
            return 0;
        }
        let last = last.min(scroll_count - 1);
        let end = self.get_position_by_scroll_index(last + 1);
        let start = end.saturating_sub(viewport);
        let ends = self
            .scroll_positions
            .get(1..=last as usize + 1)
            .unwrap_or(&[]);
        let first = to_u32(ends.partition_point(|&p| p <= start));
        (last + 1).saturating_sub(first)
    }

    /// Largest first-visible scroll index worth scrolling to.
    pub fn max_first_visible(&self, viewport: i32) -> u32 {
        let scroll_count = self.scroll_count();
        if scroll_count == 0 {
            return 0;
        }
        let reversed = self.get_visible_scroll_count_reversed(scroll_count - 1, viewport);
        (scroll_count - 1).min((scroll_count + 1).saturating_sub(reversed))
    }

    /// True when `target` is entirely inside the viewport starting at `first`.
    pub fn is_whole_in_view(&self, first: u32, target: u32, viewport: i32) -> bool {
        if target < first || target >= self.scroll_count() {
            return false;
        }
        self.get_size_sum(first, target + 1) <= viewport
    }

    /// Minimal first-visible scroll index that brings `target` fully into
    /// view. Returns `first` unchanged when `target` is already visible.
    pub fn scroll_in_view(&self, first: u32, target: u32, viewport: i32) -> u32 {
        let scroll_count = self.scroll_count();
        if scroll_count == 0 {
            return 0;
        }
        let target = target.min(scroll_count - 1);
        if self.is_whole_in_view(first, target, viewport) {
            return first;
        }
        if target < first {
            return target;
        }
        let end = self.get_position_by_scroll_index(target + 1);
        let needed = end.saturating_sub(viewport);
        let starts = self
            .scroll_positions
            .get(..=target as usize)
            .unwrap_or(&[]);
        to_u32(starts.partition_point(|&p| p < needed)).min(target)
    }

    /// Signed pixel shift applied to existing content when the first visible
    /// scroll index moves from `old_first` to `new_first`. Negative when
    /// scrolling forward (content moves up or left).
    pub fn get_scroll(&self, old_first: u32, new_first: u32) -> i32 {
        self.get_size_sum(new_first, old_first)
    }

    /// Real indices that become visible when scrolling from `old_first` to
    /// `new_first` after the existing pixels were shifted.
    pub fn invalidate_after_scroll(&self, old_first: u32, new_first: u32, viewport: i32) -> Range<u32> {
        let frozen_count = self.frozen_count();
        let new_end = new_first.saturating_add(self.get_visible_scroll_count(new_first, viewport));
        let exposed = if new_first > old_first {
            let old_count = self.get_visible_scroll_count(old_first, viewport);
            let old_end = old_first + old_count;
            let window_end = self
                .get_position_by_scroll_index(old_first)
                .saturating_add(viewport);
            // A partially visible last entry has to be drawn again.
            let last_partial =
                old_count > 0 && self.get_position_by_scroll_index(old_end) > window_end;
            let start = if last_partial { old_end - 1 } else { old_end };
            start.max(new_first)..new_end
        } else {
            new_first..old_first.min(new_end)
        };
        if exposed.start >= exposed.end {
            return 0..0;
        }
        (exposed.start + frozen_count)..(exposed.end + frozen_count)
    }
}

fn len_u32<T>(v: &[T]) -> u32 {
    to_u32(v.len())
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// True when `prefix[m + 1] > prefix[m]`, i.e. model `m` itself was counted.
fn prefix_step(prefix: &[u32], model: u32) -> bool {
    let m = model as usize;
    match (prefix.get(m), prefix.get(m + 1)) {
        (Some(&before), Some(&after)) => after > before,
        _ => false,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn axis(count: u32, default: i32) -> SeriesSizing {
        let mut s = SeriesSizing::new(default);
        s.set_count(count);
        s
    }

    #[test]
    fn test_identity_mapping_without_extraordinary() {
        let s = axis(5, 20);
        assert_eq!(s.real_count(), 5);
        assert_eq!(s.model_to_real(3), Some(3));
        assert_eq!(s.real_to_model(3), Some(3));
        assert_eq!(s.get_position_by_real_index(5), 100);
    }

    #[test]
    fn test_hidden_and_frozen_mapping() {
        let mut s = axis(10, 20);
        s.set_extraordinary_indexes([3, 5], [1, 0]);
        assert_eq!(s.real_count(), 8);
        assert_eq!(s.frozen_count(), 2);
        assert_eq!(s.scroll_count(), 6);
        let order: Vec<u32> = (0..8).map(|r| s.real_to_model(r).unwrap()).collect();
        assert_eq!(order, vec![0, 1, 2, 4, 6, 7, 8, 9]);
        assert_eq!(s.model_to_real(3), None);
        assert_eq!(s.model_to_real(4), Some(3));
        assert_eq!(s.model_to_real(9), Some(7));
    }

    #[test]
    fn test_frozen_reordered_first() {
        let mut s = axis(6, 10);
        s.set_extraordinary_indexes([], [4, 2]);
        let order: Vec<u32> = (0..6).map(|r| s.real_to_model(r).unwrap()).collect();
        assert_eq!(order, vec![2, 4, 0, 1, 3, 5]);
        assert_eq!(s.model_to_real(4), Some(1));
        assert_eq!(s.model_to_real(3), Some(4));
    }

    #[test]
    fn test_frozen_and_hidden_overlap_is_hidden() {
        let mut s = axis(4, 10);
        s.set_extraordinary_indexes([1], [1, 2]);
        assert_eq!(s.frozen_count(), 1);
        assert!(s.is_model_index_hidden(1));
        assert!(!s.is_model_index_frozen(1));
        assert_eq!(s.real_to_model(0), Some(2));
    }

    #[test]
    fn test_out_of_range_inputs_clamp() {
        let mut s = axis(4, 10);
        s.set_extraordinary_indexes([7, 9], [8]);
        assert_eq!(s.real_count(), 4);
        assert_eq!(s.frozen_count(), 0);
        assert_eq!(s.real_to_model(100), Some(3));
        assert_eq!(s.model_to_real(100), Some(3));
        assert_eq!(s.get_scroll_index_on_position(10_000), 3);
        assert_eq!(s.get_scroll_index_on_position(-5), 0);
    }

    #[test]
    fn test_empty_axis() {
        let s = axis(0, 20);
        assert_eq!(s.real_to_model(0), None);
        assert_eq!(s.model_to_real(0), None);
        assert_eq!(s.get_visible_scroll_count(0, 500), 0);
        assert_eq!(s.scroll_in_view(0, 3, 100), 0);
        assert_eq!(s.max_first_visible(100), 0);
    }

    #[test]
    fn test_override_position() {
        let mut s = axis(10, 20);
        s.put_size_override(4, 50);
        s.build_index();
        assert_eq!(s.get_position_by_real_index(5), 130);
        assert_eq!(s.get_size_by_real_index(4), 50);
    }

    #[test]
    fn test_put_size_override_grows_only() {
        let mut s = axis(3, 20);
        s.put_size_override(1, 40);
        s.put_size_override(1, 30);
        assert_eq!(s.get_size_by_model_index(1), 40);
        s.put_size_override(1, 0);
        assert_eq!(s.get_size_by_model_index(1), 40);
    }

    #[test]
    fn test_max_size_clamps_overrides() {
        let mut s = axis(3, 20);
        s.set_max_size(Some(100));
        s.put_size_override(0, 400);
        s.resize(1, 900);
        assert_eq!(s.get_size_by_model_index(0), 100);
        assert_eq!(s.get_size_by_model_index(1), 100);
    }

    #[test]
    fn test_resize_no_build_is_stale_until_build() {
        let mut s = axis(5, 20);
        s.resize_no_build(0, 40);
        assert!(s.is_index_stale());
        assert_eq!(s.get_position_by_real_index(1), 20);
        s.ensure_index();
        assert!(!s.is_index_stale());
        assert_eq!(s.get_position_by_real_index(1), 40);
    }

    #[test]
    fn test_resize_many_single_build() {
        let mut s = axis(5, 20);
        s.resize_many([0, 1, 2], 10);
        assert!(!s.is_index_stale());
        assert_eq!(s.get_position_by_real_index(3), 30);
    }

    #[test]
    fn test_override_survives_reconfiguration() {
        let mut s = axis(6, 20);
        s.resize(4, 70);
        s.set_extraordinary_indexes([1], [4]);
        assert_eq!(s.model_to_real(4), Some(0));
        assert_eq!(s.get_size_by_real_index(0), 70);
        assert_eq!(s.frozen_size(), 70);
        s.set_extraordinary_indexes([], []);
        assert_eq!(s.get_size_by_real_index(4), 70);
    }

    #[test]
    fn test_scroll_index_on_position() {
        let s = axis(10, 20);
        assert_eq!(s.get_scroll_index_on_position(0), 0);
        assert_eq!(s.get_scroll_index_on_position(19), 0);
        assert_eq!(s.get_scroll_index_on_position(20), 1);
        assert_eq!(s.get_scroll_index_on_position(199), 9);
    }

    #[test]
    fn test_frozen_index_on_position() {
        let mut s = axis(10, 20);
        s.set_extraordinary_indexes([], [0, 1, 2]);
        assert_eq!(s.get_frozen_index_on_position(0), 0);
        assert_eq!(s.get_frozen_index_on_position(45), 2);
        assert_eq!(s.get_frozen_index_on_position(500), 2);
    }

    #[test]
    fn test_visible_scroll_count_counts_partial() {
        let s = axis(100, 20);
        assert_eq!(s.get_visible_scroll_count(0, 100), 5);
        assert_eq!(s.get_visible_scroll_count(0, 101), 6);
        assert_eq!(s.get_visible_scroll_count(98, 100), 2);
    }

    #[test]
    fn test_visible_scroll_count_reversed() {
        let s = axis(100, 20);
        assert_eq!(s.get_visible_scroll_count_reversed(99, 100), 5);
        assert_eq!(s.get_visible_scroll_count_reversed(99, 110), 6);
        assert_eq!(s.max_first_visible(110), 95);
    }

    #[test]
    fn test_scroll_in_view() {
        let s = axis(100, 20);
        assert_eq!(s.scroll_in_view(10, 12, 100), 10);
        assert_eq!(s.scroll_in_view(10, 5, 100), 5);
        // Target 20 must end at the bottom: rows 16..=20 fit in 100 px.
        assert_eq!(s.scroll_in_view(10, 20, 100), 16);
    }

    #[test]
    fn test_scroll_in_view_oversized_target() {
        let mut s = axis(10, 20);
        s.resize(5, 500);
        assert_eq!(s.scroll_in_view(0, 5, 100), 5);
    }

    #[test]
    fn test_get_scroll_sign() {
        let s = axis(100, 20);
        assert_eq!(s.get_scroll(0, 1), -20);
        assert_eq!(s.get_scroll(3, 1), 40);
    }

    #[test]
    fn test_invalidate_after_scroll_forward_exact_fit() {
        let s = axis(100, 20);
        assert_eq!(s.invalidate_after_scroll(0, 1, 1000), 50..51);
    }

    #[test]
    fn test_invalidate_after_scroll_forward_partial_last() {
        let s = axis(100, 20);
        // 1010 px shows 50 whole rows and a sliver of row 50.
        assert_eq!(s.invalidate_after_scroll(0, 1, 1010), 50..52);
    }

    #[test]
    fn test_invalidate_after_scroll_backward() {
        let mut s = axis(100, 20);
        s.set_extraordinary_indexes([], [0]);
        // Scroll indices 3..5 are real indices 4..6.
        assert_eq!(s.invalidate_after_scroll(5, 3, 200), 4..6);
    }

    #[test]
    fn test_frozen_positions_independent_of_scroll() {
        let mut s = axis(20, 20);
        s.set_extraordinary_indexes([], [0, 1]);
        s.resize(1, 35);
        assert_eq!(s.get_frozen_position(0), 0);
        assert_eq!(s.get_frozen_position(1), 20);
        assert_eq!(s.frozen_size(), 55);
        assert_eq!(s.get_position_by_real_index(2), 55);
    }

    #[test]
    fn test_set_count_prunes_extraordinary() {
        let mut s = axis(10, 20);
        s.set_extraordinary_indexes([8], [9]);
        s.set_count(5);
        assert_eq!(s.real_count(), 5);
        assert_eq!(s.frozen_count(), 0);
    }

    #[test]
    fn test_moved_index_right_and_left() {
        // [a b c d e]: b in front of e -> [a c d b e]
        let right: Vec<u32> = (0..5).map(|i| moved_index(i, 1, 4, 5)).collect();
        assert_eq!(right, vec![0, 3, 1, 2, 4]);
        // d in front of a -> [d a b c e]
        let left: Vec<u32> = (0..5).map(|i| moved_index(i, 3, 0, 5)).collect();
        assert_eq!(left, vec![1, 2, 3, 0, 4]);
        assert_eq!(moved_index(2, 0, 5, 5), 1);
        assert_eq!(moved_index(0, 0, 5, 5), 4);
    }

    #[test]
    fn test_size_overrides_follow_moved_entry() {
        let mut s = axis(5, 20);
        s.resize(1, 70);
        s.move_size_overrides(1, 4);
        s.ensure_index();
        assert_eq!(s.get_size_by_model_index(3), 70);
        assert!(!s.has_size_override(1));
    }
}
