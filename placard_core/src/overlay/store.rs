// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame overlay working set.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Reverse;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker};

use crate::dirty;
use crate::screen::Screen;
use crate::trace::{PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer, UpdateEvent};

use super::handle::{OverlayHandle, OverlayRank};
use super::id::OverlayId;

/// Outcome of [`OverlayStore::update_all`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Handles that accepted the frame.
    pub accepted: usize,
    /// Handles that excluded themselves from the frame.
    pub excluded: Vec<OverlayId>,
}

/// The set of changes produced by a single [`OverlayStore::evaluate`] call.
///
/// Index fields hold raw slot indices, usable with
/// [`OverlayStore::get_at`].
#[derive(Clone, Debug, Default)]
pub struct OverlayChanges {
    /// Overlays that became visible.
    pub shown: Vec<u32>,
    /// Overlays that stopped being visible and are still in the store.
    pub hidden: Vec<u32>,
    /// Overlays moved to another resolution rank.
    pub reranked: Vec<u32>,
    /// Overlays inserted since the last evaluate.
    pub added: Vec<u32>,
    /// Overlays removed since the last evaluate.
    pub removed: Vec<u32>,
    /// Pixel bounds of overlays that were visible and are now hidden or
    /// removed.
    ///
    /// Each rect is where the overlay was drawn when it was last reported in
    /// `shown`, under the screen passed to that evaluate. It is not
    /// re-projected: after a camera change these rects no longer match the
    /// current screen, and callers should redraw the full viewport instead.
    pub vacated: Vec<Rect>,
}

impl OverlayChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.shown.clear();
        self.hidden.clear();
        self.reranked.clear();
        self.added.clear();
        self.removed.clear();
        self.vacated.clear();
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
            && self.hidden.is_empty()
            && self.reranked.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && self.vacated.is_empty()
    }
}

/// Storage for the overlays of the current frame.
///
/// Handles are addressed by [`OverlayId`]. Removed slots are recycled via a
/// free list, and generation counters prevent stale handle access.
///
/// Visibility and rank are written by the external resolver through
/// [`set_visible`](Self::set_visible) and
/// [`set_overlay_rank`](Self::set_overlay_rank) so that
/// [`evaluate`](Self::evaluate) can report what changed.
#[derive(Debug)]
pub struct OverlayStore {
    handles: Vec<Option<Box<dyn OverlayHandle>>>,

    // -- Per-frame state (written by update_all / evaluate) --
    accepted: Vec<bool>,
    presented: Vec<Option<Rect>>,

    // -- Allocation --
    generation: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,

    // -- Dirty tracking --
    dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pending_added: Vec<u32>,
    pending_removed: Vec<u32>,
    pending_vacated: Vec<Rect>,
}

impl Default for OverlayStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            accepted: Vec::new(),
            presented: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            pending_vacated: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Adds a handle and returns its id.
    ///
    /// The handle counts as excluded until the next
    /// [`update_all`](Self::update_all).
    pub fn insert<H: OverlayHandle + 'static>(&mut self, handle: H) -> OverlayId {
        self.insert_boxed(Box::new(handle))
    }

    /// Adds an already boxed handle and returns its id.
    pub fn insert_boxed(&mut self, handle: Box<dyn OverlayHandle>) -> OverlayId {
        let visible = handle.is_visible();
        let idx = if let Some(idx) = self.free_list.pop() {
            self.handles[idx as usize] = Some(handle);
            self.accepted[idx as usize] = false;
            self.presented[idx as usize] = None;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.handles.push(Some(handle));
            self.accepted.push(false);
            self.presented.push(None);
            self.generation.push(0);
            idx
        };

        self.pending_added.push(idx);
        if visible {
            self.dirty.mark(idx, dirty::VISIBILITY);
        }

        OverlayId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Removes a handle, freeing its slot for reuse, and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove(&mut self, id: OverlayId) -> Box<dyn OverlayHandle> {
        self.validate(id);
        let idx = id.idx;
        let Some(handle) = self.handles[idx as usize].take() else {
            unreachable!("validated slot is occupied");
        };

        self.dirty.remove_key(idx);
        if let Some(rect) = self.presented[idx as usize].take() {
            self.pending_vacated.push(rect);
        }
        self.accepted[idx as usize] = false;

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.pending_removed.push(idx);
        handle
    }

    /// Returns whether the given id refers to a live handle.
    #[must_use]
    pub fn is_alive(&self, id: OverlayId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.handles[id.idx as usize].is_some()
    }

    /// Returns the number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns `true` if the store holds no live handle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the ids of all live handles in slot order.
    #[must_use]
    pub fn ids(&self) -> Vec<OverlayId> {
        (0..self.len).filter_map(|idx| self.id_at(idx)).collect()
    }

    // -- Access --

    /// Returns the handle behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn get(&self, id: OverlayId) -> &dyn OverlayHandle {
        self.validate(id);
        match &self.handles[id.idx as usize] {
            Some(handle) => &**handle,
            None => unreachable!("validated slot is occupied"),
        }
    }

    /// Returns whether the handle accepted the last
    /// [`update_all`](Self::update_all).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_accepted(&self, id: OverlayId) -> bool {
        self.validate(id);
        self.accepted[id.idx as usize]
    }

    // -- Resolver API (auto-marks dirty) --

    /// Sets a handle's visibility.
    ///
    /// Marks the VISIBILITY channel dirty.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_visible(&mut self, id: OverlayId, visible: bool) {
        self.validate(id);
        if let Some(handle) = &mut self.handles[id.idx as usize] {
            handle.set_visible(visible);
        }
        self.dirty.mark(id.idx, dirty::VISIBILITY);
    }

    /// Moves a handle to another resolution rank.
    ///
    /// Marks the RANK channel dirty if the rank changed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_overlay_rank(&mut self, id: OverlayId, rank: OverlayRank) {
        self.validate(id);
        if let Some(handle) = &mut self.handles[id.idx as usize] {
            if handle.overlay_rank() == rank {
                return;
            }
            handle.set_overlay_rank(rank);
        }
        self.dirty.mark(id.idx, dirty::RANK);
    }

    // -- Frame API --

    /// Runs every live handle's [`update`](OverlayHandle::update) against
    /// `screen`.
    ///
    /// A handle that refuses the frame is made invisible and stays out of
    /// [`resolution_order`](Self::resolution_order) until it accepts again.
    /// A visible handle that accepts after being excluded is marked so that
    /// the next [`evaluate`](Self::evaluate) reports it as shown.
    pub fn update_all(
        &mut self,
        screen: &Screen,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> UpdateReport {
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Update,
        });

        let mut report = UpdateReport::default();
        for idx in 0..self.len {
            let generation = self.generation[idx as usize];
            let Some(handle) = &mut self.handles[idx as usize] else {
                continue;
            };
            let was_accepted = self.accepted[idx as usize];
            let accepted = handle.update(screen);
            let feature = handle.feature_id();
            if handle.is_visible() {
                if !accepted {
                    handle.set_visible(false);
                    self.dirty.mark(idx, dirty::VISIBILITY);
                } else if !was_accepted {
                    self.dirty.mark(idx, dirty::VISIBILITY);
                }
            }
            self.accepted[idx as usize] = accepted;

            let overlay = OverlayId { idx, generation };
            tracer.update(&UpdateEvent {
                frame_index,
                overlay,
                feature,
                accepted,
            });
            if accepted {
                report.accepted += 1;
            } else {
                report.excluded.push(overlay);
            }
        }

        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Update,
        });
        report
    }

    /// Drains the resolver's decisions and returns what changed since the
    /// last call.
    ///
    /// `screen` is used to record where newly shown overlays are presented.
    pub fn evaluate(
        &mut self,
        screen: &Screen,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> OverlayChanges {
        let mut changes = OverlayChanges::default();
        self.evaluate_into(screen, frame_index, tracer, &mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(
        &mut self,
        screen: &Screen,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
        changes: &mut OverlayChanges,
    ) {
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Evaluate,
        });
        changes.clear();

        let dirty_visibility: Vec<u32> = self
            .dirty
            .drain(dirty::VISIBILITY)
            .deterministic()
            .run()
            .collect();
        for idx in dirty_visibility {
            let Some(handle) = &self.handles[idx as usize] else {
                continue;
            };
            let now = handle.is_visible() && self.accepted[idx as usize];
            let presented = &mut self.presented[idx as usize];
            match (presented.is_some(), now) {
                (false, true) => {
                    *presented = Some(handle.pixel_rect(screen));
                    changes.shown.push(idx);
                }
                (true, false) => {
                    if let Some(rect) = presented.take() {
                        changes.vacated.push(rect);
                    }
                    changes.hidden.push(idx);
                }
                _ => {}
            }
        }

        changes.reranked = self
            .dirty
            .drain(dirty::RANK)
            .deterministic()
            .run()
            .filter(|&idx| self.handles[idx as usize].is_some())
            .collect();

        // Move lifecycle lists.
        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
        changes.vacated.append(&mut self.pending_vacated);

        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Evaluate,
        });
    }

    /// Returns the live, accepted handles in resolution order: by rank, then
    /// by descending priority, then by feature id.
    #[must_use]
    pub fn resolution_order(&self) -> Vec<OverlayId> {
        let mut order: Vec<_> = (0..self.len)
            .filter(|&idx| self.accepted[idx as usize])
            .filter_map(|idx| {
                let handle = self.handles[idx as usize].as_ref()?;
                Some((
                    handle.overlay_rank(),
                    Reverse(handle.priority()),
                    handle.feature_id(),
                    idx,
                ))
            })
            .collect();
        order.sort_unstable();
        order
            .into_iter()
            .map(|(.., idx)| OverlayId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    // -- Raw-index accessors --
    //
    // These accept raw slot indices (as found in `OverlayChanges`) rather than
    // `OverlayId` handles.

    /// Returns the handle at raw slot `idx`, if the slot is occupied.
    #[must_use]
    pub fn get_at(&self, idx: u32) -> Option<&dyn OverlayHandle> {
        self.handles.get(idx as usize)?.as_deref()
    }

    /// Returns the id of the handle at raw slot `idx`, if the slot is
    /// occupied.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> Option<OverlayId> {
        self.get_at(idx).map(|_| OverlayId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: OverlayId) {
        assert!(
            self.is_alive(id),
            "stale OverlayId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Point, Size};

    use super::*;
    use crate::overlay::handle::{OverlayBase, Rects};
    use crate::overlay::id::{FeatureId, SourceId};
    use crate::overlay::{Anchor, SquareHandle};
    use crate::priority::{Priority, compute_priority};

    fn square(index: u32, priority: Priority) -> SquareHandle {
        SquareHandle::new(
            FeatureId::new(SourceId(0), index),
            Anchor::Center,
            Point::new(320.0, 240.0),
            Size::new(10.0, 10.0),
            priority,
        )
    }

    /// Accepts the frame only while `accept` is set.
    #[derive(Debug)]
    struct Flaky {
        base: OverlayBase,
        accept: bool,
    }

    impl OverlayHandle for Flaky {
        fn base(&self) -> &OverlayBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut OverlayBase {
            &mut self.base
        }
        fn pixel_rect(&self, _screen: &Screen) -> Rect {
            Rect::new(0.0, 0.0, 1.0, 1.0)
        }
        fn pixel_shape(&self, screen: &Screen) -> Rects {
            vec![self.pixel_rect(screen)]
        }
        fn update(&mut self, _screen: &Screen) -> bool {
            self.accept
        }
    }

    fn flaky(accept: bool) -> Flaky {
        Flaky {
            base: OverlayBase::new(
                FeatureId::new(SourceId(9), 0),
                Anchor::Center,
                Priority::default(),
            ),
            accept,
        }
    }

    fn update(store: &mut OverlayStore, screen: &Screen) -> UpdateReport {
        store.update_all(screen, 0, &mut Tracer::none())
    }

    fn evaluate(store: &mut OverlayStore, screen: &Screen) -> OverlayChanges {
        store.evaluate(screen, 0, &mut Tracer::none())
    }

    #[test]
    fn insert_and_remove() {
        let mut store = OverlayStore::new();
        let id = store.insert(square(1, Priority::default()));
        assert!(store.is_alive(id));
        assert_eq!(store.len(), 1);
        let handle = store.remove(id);
        assert_eq!(handle.feature_id().index, 1);
        assert!(!store.is_alive(id));
        assert!(store.is_empty());
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = OverlayStore::new();
        let id1 = store.insert(square(1, Priority::default()));
        let _ = store.remove(id1);
        let id2 = store.insert(square(2, Priority::default()));
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.index(), id2.index());
        assert_ne!(id1.generation(), id2.generation());
        assert_eq!(store.ids(), vec![id2]);
    }

    #[test]
    #[should_panic(expected = "stale OverlayId")]
    fn removed_handle_panics_on_get() {
        let mut store = OverlayStore::new();
        let id = store.insert(square(1, Priority::default()));
        let _ = store.remove(id);
        let _ = store.get(id);
    }

    #[test]
    #[should_panic(expected = "stale OverlayId")]
    fn removed_handle_panics_on_set_visible() {
        let mut store = OverlayStore::new();
        let id = store.insert(square(1, Priority::default()));
        let _ = store.remove(id);
        store.set_visible(id, true);
    }

    #[test]
    fn shown_then_hidden_reports_vacated_rect() {
        let screen = Screen::default();
        let mut store = OverlayStore::new();
        let id = store.insert(square(1, Priority::default()));
        let _ = update(&mut store, &screen);

        let changes = evaluate(&mut store, &screen);
        assert_eq!(changes.added, vec![id.index()]);
        assert!(changes.shown.is_empty());

        store.set_visible(id, true);
        let changes = evaluate(&mut store, &screen);
        assert_eq!(changes.shown, vec![id.index()]);
        assert!(store.get(id).is_visible());

        store.set_visible(id, false);
        let changes = evaluate(&mut store, &screen);
        assert_eq!(changes.hidden, vec![id.index()]);
        assert_eq!(changes.vacated.len(), 1);
        let r = changes.vacated[0];
        assert!((r.width() - 10.0).abs() < 1e-9 && (r.height() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn toggling_within_a_frame_is_not_a_change() {
        let screen = Screen::default();
        let mut store = OverlayStore::new();
        let id = store.insert(square(1, Priority::default()));
        let _ = update(&mut store, &screen);
        let _ = evaluate(&mut store, &screen);

        store.set_visible(id, true);
        store.set_visible(id, false);
        assert!(evaluate(&mut store, &screen).is_empty());
    }

    #[test]
    fn excluded_handle_is_hidden_and_unordered() {
        let screen = Screen::default();
        let mut store = OverlayStore::new();
        let id = store.insert(flaky(true));
        let report = update(&mut store, &screen);
        assert_eq!(report.accepted, 1);
        store.set_visible(id, true);
        assert_eq!(evaluate(&mut store, &screen).shown, vec![id.index()]);
        assert_eq!(store.resolution_order(), vec![id]);

        // The handle refuses the next frame.
        let _ = store.remove(id);
        let id = store.insert(flaky(false));
        store.set_visible(id, true);
        let report = update(&mut store, &screen);
        assert_eq!(report.excluded, vec![id]);
        assert!(!store.is_accepted(id));
        assert!(!store.get(id).is_visible());
        assert!(store.resolution_order().is_empty());

        let changes = evaluate(&mut store, &screen);
        assert!(changes.shown.is_empty(), "excluded handles never show");
        assert_eq!(changes.removed, vec![id.index()]);
        assert_eq!(changes.added, vec![id.index()]);
        assert_eq!(changes.vacated.len(), 1, "the removed handle was on screen");
    }

    #[test]
    fn late_insert_is_shown_once_accepted() {
        let screen = Screen::default();
        let mut store = OverlayStore::new();
        let _ = update(&mut store, &screen);

        // Inserted between update and evaluate, so not yet accepted.
        let id = store.insert(square(1, Priority::default()));
        store.set_visible(id, true);
        let changes = evaluate(&mut store, &screen);
        assert!(changes.shown.is_empty());
        assert_eq!(changes.added, vec![id.index()]);

        let _ = update(&mut store, &screen);
        assert!(store.is_accepted(id));
        assert_eq!(evaluate(&mut store, &screen).shown, vec![id.index()]);
        assert!(evaluate(&mut store, &screen).is_empty());
    }

    #[test]
    fn vacated_rect_is_where_the_overlay_was_presented() {
        let mut screen = Screen::default();
        let mut store = OverlayStore::new();
        let id = store.insert(square(1, Priority::default()));
        let _ = update(&mut store, &screen);
        store.set_visible(id, true);
        let _ = evaluate(&mut store, &screen);
        let presented = store.get(id).pixel_rect(&screen);

        screen.move_by_pixels(40.0, 0.0);
        let _ = update(&mut store, &screen);
        assert_ne!(store.get(id).pixel_rect(&screen), presented);

        store.set_visible(id, false);
        let changes = evaluate(&mut store, &screen);
        assert_eq!(changes.vacated, vec![presented]);
    }

    #[test]
    fn rank_changes_are_reported_once() {
        let screen = Screen::default();
        let mut store = OverlayStore::new();
        let id = store.insert(square(1, Priority::default()));
        let _ = evaluate(&mut store, &screen);

        store.set_overlay_rank(id, OverlayRank::Rank0);
        assert!(evaluate(&mut store, &screen).reranked.is_empty(), "unchanged rank");

        store.set_overlay_rank(id, OverlayRank::Rank2);
        assert_eq!(evaluate(&mut store, &screen).reranked, vec![id.index()]);
        assert_eq!(store.get(id).overlay_rank(), OverlayRank::Rank2);
        assert!(evaluate(&mut store, &screen).reranked.is_empty());
    }

    #[test]
    fn resolution_order_groups_by_rank_then_priority() {
        let screen = Screen::default();
        let mut store = OverlayStore::new();
        let low = store.insert(square(1, compute_priority(3, 0, 0.0)));
        let high = store.insert(square(2, compute_priority(9, 0, 0.0)));
        let tie_b = store.insert(square(5, compute_priority(5, 0, 0.0)));
        let tie_a = store.insert(square(4, compute_priority(5, 0, 0.0)));
        let late = store.insert(square(0, compute_priority(12, 0, 0.0)));
        store.set_overlay_rank(late, OverlayRank::Rank1);
        let _ = update(&mut store, &screen);

        assert_eq!(
            store.resolution_order(),
            vec![high, tie_a, tie_b, low, late]
        );
    }

    #[cfg(feature = "trace")]
    #[test]
    fn update_all_reports_each_handle() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Outcomes(Vec<bool>, usize);
        impl TraceSink for Outcomes {
            fn on_update(&mut self, e: &UpdateEvent) {
                self.0.push(e.accepted);
            }
            fn on_phase_end(&mut self, e: &PhaseEndEvent) {
                assert_eq!(e.phase, PhaseKind::Update, "only the update phase runs");
                self.1 += 1;
            }
        }

        let screen = Screen::default();
        let mut store = OverlayStore::new();
        let _ = store.insert(flaky(true));
        let _ = store.insert(flaky(false));
        let mut sink = Outcomes::default();
        let mut tracer = Tracer::new(&mut sink);
        let _ = store.update_all(&screen, 7, &mut tracer);
        drop(tracer);
        assert_eq!(sink.0, vec![true, false]);
        assert_eq!(sink.1, 1);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn evaluate_brackets_its_phase() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Phases(Vec<(bool, PhaseKind, u64)>);
        impl TraceSink for Phases {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.0.push((true, e.phase, e.frame_index));
            }
            fn on_phase_end(&mut self, e: &PhaseEndEvent) {
                self.0.push((false, e.phase, e.frame_index));
            }
        }

        let screen = Screen::default();
        let mut store = OverlayStore::new();
        let _ = store.insert(square(1, Priority::default()));
        let mut sink = Phases::default();
        let mut tracer = Tracer::new(&mut sink);
        let _ = store.update_all(&screen, 3, &mut tracer);
        let changes = store.evaluate(&screen, 3, &mut tracer);
        drop(tracer);
        assert_eq!(changes.added.len(), 1);
        assert_eq!(
            sink.0,
            vec![
                (true, PhaseKind::Update, 3),
                (false, PhaseKind::Update, 3),
                (true, PhaseKind::Evaluate, 3),
                (false, PhaseKind::Evaluate, 3),
            ]
        );
    }
}
