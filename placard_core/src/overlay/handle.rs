// Copyright 2026 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overlay handle contract and the state every handle shares.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map::Entry;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use kurbo::{Point, Rect, Vec2};

use crate::buffer::{
    AttributeBufferMutator, BindingId, BindingInfo, BufferError, IndexBufferMutator,
    IndexStorage, MutateRegion,
};
use crate::priority::{Priority, PriorityMask};
use crate::screen::Screen;

use super::anchor::Anchor;
use super::id::FeatureId;

/// A pixel-space footprint made of one or more rectangles.
pub type Rects = Vec<Rect>;

/// Coarse bucket grouping overlays into independent resolution passes.
///
/// All `Rank0` overlays are resolved before any `Rank1` overlay, and so on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverlayRank {
    /// First pass.
    #[default]
    Rank0,
    /// Second pass.
    Rank1,
    /// Third pass.
    Rank2,
}

impl OverlayRank {
    /// Number of ranks.
    pub const COUNT: usize = 3;

    /// All ranks in resolution order.
    pub const ALL: [Self; Self::COUNT] = [Self::Rank0, Self::Rank1, Self::Rank2];

    /// Returns the rank's position in resolution order.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Rank0 => 0,
            Self::Rank1 => 1,
            Self::Rank2 => 2,
        }
    }

    /// Returns the rank at `index`, if any.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Rank0),
            1 => Some(Self::Rank1),
            2 => Some(Self::Rank2),
            _ => None,
        }
    }
}

/// State shared by every overlay handle.
///
/// The feature id, anchor and priority are fixed at construction. Visibility
/// and rank are written by the external resolver. The index scratch area and
/// the dynamic-attribute registry are owned here so every handle variant
/// stages data the same way.
#[derive(Clone, Debug)]
pub struct OverlayBase {
    feature: FeatureId,
    anchor: Anchor,
    priority: Priority,
    rank: OverlayRank,
    visible: bool,
    indexes: Option<IndexStorage>,
    attributes: BTreeMap<BindingId, (BindingInfo, MutateRegion)>,
}

impl OverlayBase {
    /// Creates the shared state for a new, invisible handle in
    /// [`OverlayRank::Rank0`].
    #[must_use]
    pub fn new(feature: FeatureId, anchor: Anchor, priority: Priority) -> Self {
        Self {
            feature,
            anchor,
            priority,
            rank: OverlayRank::Rank0,
            visible: false,
            indexes: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Returns the feature id.
    #[inline]
    #[must_use]
    pub fn feature_id(&self) -> FeatureId {
        self.feature
    }

    /// Returns the anchor.
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Returns the priority.
    #[inline]
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the resolution rank.
    #[inline]
    #[must_use]
    pub fn overlay_rank(&self) -> OverlayRank {
        self.rank
    }

    /// Sets the resolution rank.
    #[inline]
    pub fn set_overlay_rank(&mut self, rank: OverlayRank) {
        self.rank = rank;
    }

    /// Returns the visibility flag.
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Sets the visibility flag.
    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Returns the scratch area for `size` index values, allocating it on
    /// first use.
    ///
    /// The storage lives until [`reset_index_storage`](Self::reset_index_storage).
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::IndexCapacityMismatch`] if storage of another
    /// size already exists.
    pub fn acquire_index_storage(&mut self, size: usize) -> Result<&mut [u32], BufferError> {
        let storage = self
            .indexes
            .get_or_insert_with(|| IndexStorage::with_len(size));
        if storage.len() != size {
            return Err(BufferError::IndexCapacityMismatch {
                allocated: storage.len(),
                requested: size,
            });
        }
        Ok(storage.as_mut_slice())
    }

    /// Returns the staged indexes, if storage was acquired.
    #[must_use]
    pub fn index_storage(&self) -> Option<&IndexStorage> {
        self.indexes.as_ref()
    }

    /// Drops the index scratch area so the next rebuild can size it afresh.
    pub fn reset_index_storage(&mut self) {
        self.indexes = None;
    }

    /// Registers `binding` as a dynamic attribute updated every frame over
    /// `region`.
    ///
    /// Returns `false` and keeps the existing entry if the binding id is
    /// already registered.
    pub fn register_dynamic_attribute(
        &mut self,
        binding: BindingInfo,
        region: MutateRegion,
    ) -> bool {
        match self.attributes.entry(binding.id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert((binding, region));
                true
            }
        }
    }

    /// Returns whether any dynamic attribute is registered.
    #[inline]
    #[must_use]
    pub fn has_dynamic_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Looks up the binding and region registered for `id`.
    ///
    /// Meant for [`OverlayHandle`] implementors writing their own
    /// [`emit_attribute_mutation`](OverlayHandle::emit_attribute_mutation);
    /// renderers and resolvers have no use for it.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::AttributeNotFound`] for an unregistered id.
    pub fn attribute_region(
        &self,
        id: BindingId,
    ) -> Result<(&BindingInfo, MutateRegion), BufferError> {
        self.attributes
            .get(&id)
            .map(|(info, region)| (info, *region))
            .ok_or(BufferError::AttributeNotFound(id))
    }
}

/// One feature's overlay, answering shape, intersection and priority queries
/// without knowing about other overlays.
///
/// Implementors provide [`base`](Self::base) access plus the two shape
/// queries; every other method has a working default. All pixel-space queries
/// take the caller's [`Screen`] and never retain it.
pub trait OverlayHandle: fmt::Debug {
    /// Returns the shared handle state.
    fn base(&self) -> &OverlayBase;

    /// Returns the shared handle state for writing.
    fn base_mut(&mut self) -> &mut OverlayBase;

    /// Returns an axis-aligned pixel box containing the whole shape.
    fn pixel_rect(&self, screen: &Screen) -> Rect;

    /// Returns the exact pixel footprint.
    ///
    /// Every rectangle lies within [`pixel_rect`](Self::pixel_rect).
    fn pixel_shape(&self, screen: &Screen) -> Rects;

    /// Refreshes per-frame placement.
    ///
    /// Returning `false` excludes the handle from the current frame; it is
    /// not an error.
    fn update(&mut self, screen: &Screen) -> bool {
        _ = screen;
        true
    }

    /// Selects the priority fields this handle is compared on.
    fn priority_mask(&self) -> PriorityMask {
        PriorityMask::ALL
    }

    /// Whether the handle stages indexes at submission time.
    fn indexes_required(&self) -> bool {
        true
    }

    /// Pushes this frame's values for every dynamic attribute into
    /// `mutator`.
    ///
    /// Called once per frame, after [`update`](Self::update), for handles
    /// with dynamic attributes.
    ///
    /// # Errors
    ///
    /// Returns a [`BufferError`] if the registry does not match what the
    /// handle produces. Nothing is written in that case.
    fn emit_attribute_mutation(
        &self,
        mutator: &mut dyn AttributeBufferMutator,
        screen: &Screen,
    ) -> Result<(), BufferError> {
        _ = (mutator, screen);
        Ok(())
    }

    /// Returns the feature id.
    fn feature_id(&self) -> FeatureId {
        self.base().feature_id()
    }

    /// Returns the anchor.
    fn anchor(&self) -> Anchor {
        self.base().anchor()
    }

    /// Returns the priority.
    fn priority(&self) -> Priority {
        self.base().priority()
    }

    /// Returns the visibility flag.
    fn is_visible(&self) -> bool {
        self.base().is_visible()
    }

    /// Sets the visibility flag.
    fn set_visible(&mut self, visible: bool) {
        self.base_mut().set_visible(visible);
    }

    /// Returns the resolution rank.
    fn overlay_rank(&self) -> OverlayRank {
        self.base().overlay_rank()
    }

    /// Sets the resolution rank.
    fn set_overlay_rank(&mut self, rank: OverlayRank) {
        self.base_mut().set_overlay_rank(rank);
    }

    /// Returns the anchored point of the pixel bounds, which sits on the
    /// projected geographic pivot.
    fn pivot(&self, screen: &Screen) -> Point {
        let r = self.pixel_rect(screen).abs();
        let dir = self.anchor().direction();
        let half = r.size() / 2.0;
        r.center() + Vec2::new(dir.x * half.width, dir.y * half.height)
    }

    /// Returns whether this handle's pixel shape overlaps `other`'s.
    ///
    /// Touching edges count as overlap. The result is the same with the
    /// arguments swapped.
    fn intersects(&self, screen: &Screen, other: &dyn OverlayHandle) -> bool {
        if !rects_overlap(self.pixel_rect(screen), other.pixel_rect(screen)) {
            return false;
        }
        let ours = self.pixel_shape(screen);
        let theirs = other.pixel_shape(screen);
        ours.iter().any(|a| theirs.iter().any(|b| rects_overlap(*a, *b)))
    }

    /// Returns whether any dynamic attribute is registered.
    fn has_dynamic_attributes(&self) -> bool {
        self.base().has_dynamic_attributes()
    }

    /// See [`OverlayBase::acquire_index_storage`].
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::IndexCapacityMismatch`] if storage of another
    /// size already exists.
    fn acquire_index_storage(&mut self, size: usize) -> Result<&mut [u32], BufferError> {
        self.base_mut().acquire_index_storage(size)
    }

    /// See [`OverlayBase::register_dynamic_attribute`].
    fn register_dynamic_attribute(&mut self, binding: BindingInfo, region: MutateRegion) -> bool {
        self.base_mut().register_dynamic_attribute(binding, region)
    }

    /// Copies the staged indexes into `mutator` and returns how many were
    /// written.
    ///
    /// Handles that opt out of index staging write nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::IndexStorageMissing`] if storage was never
    /// acquired, or the mutator's error if it cannot take them all.
    fn emit_indexes(&self, mutator: &mut dyn IndexBufferMutator) -> Result<usize, BufferError> {
        if !self.indexes_required() {
            return Ok(0);
        }
        let storage = self
            .base()
            .index_storage()
            .ok_or(BufferError::IndexStorageMissing)?;
        mutator.append_indexes(storage.as_slice())?;
        Ok(storage.len())
    }
}

/// Compares two handles by priority on the fields both of them select.
#[must_use]
pub fn compare_overlays(a: &dyn OverlayHandle, b: &dyn OverlayHandle) -> Ordering {
    let mask = a.priority_mask() & b.priority_mask();
    a.priority().cmp_masked(b.priority(), mask)
}

fn rects_overlap(a: Rect, b: Rect) -> bool {
    let (a, b) = (a.abs(), b.abs());
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Size;

    use super::*;
    use crate::buffer::AttributeDecl;
    use crate::overlay::SquareHandle;
    use crate::overlay::id::SourceId;
    use crate::priority::compute_priority;

    fn feature(index: u32) -> FeatureId {
        FeatureId::new(SourceId(0), index)
    }

    /// Screen where one pixel is one global unit and pixel (320, 240) is
    /// global (0, 0).
    fn unit_screen() -> Screen {
        let mut screen = Screen::default();
        screen.set_scale(1.0);
        screen.set_origin(Point::ORIGIN);
        screen
    }

    fn square(index: u32, pivot: Point, half: f64, priority: Priority) -> SquareHandle {
        SquareHandle::new(
            feature(index),
            Anchor::Center,
            pivot,
            Size::new(half * 2.0, half * 2.0),
            priority,
        )
    }

    #[derive(Debug)]
    struct TwoBoxes {
        base: OverlayBase,
        boxes: [Rect; 2],
    }

    impl OverlayHandle for TwoBoxes {
        fn base(&self) -> &OverlayBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut OverlayBase {
            &mut self.base
        }
        fn pixel_rect(&self, _screen: &Screen) -> Rect {
            self.boxes[0].union(self.boxes[1])
        }
        fn pixel_shape(&self, _screen: &Screen) -> Rects {
            self.boxes.to_vec()
        }
        fn priority_mask(&self) -> PriorityMask {
            PriorityMask::ZOOM_LEVEL
        }
    }

    fn two_boxes() -> TwoBoxes {
        TwoBoxes {
            base: OverlayBase::new(feature(9), Anchor::Center, compute_priority(3, 9, 0.0)),
            boxes: [
                Rect::new(0.0, 0.0, 10.0, 10.0),
                Rect::new(90.0, 90.0, 100.0, 100.0),
            ],
        }
    }

    #[derive(Debug)]
    struct CountingSink(Vec<u32>);

    impl IndexBufferMutator for CountingSink {
        fn append_indexes(&mut self, indexes: &[u32]) -> Result<(), BufferError> {
            self.0.extend_from_slice(indexes);
            Ok(())
        }
    }

    #[test]
    fn new_handles_start_hidden_in_first_rank() {
        let h = square(1, Point::ORIGIN, 4.0, Priority::default());
        assert!(!h.is_visible());
        assert_eq!(h.overlay_rank(), OverlayRank::Rank0);
        assert!(h.indexes_required());
        assert!(!h.has_dynamic_attributes());
        assert_eq!(h.priority_mask(), PriorityMask::ALL);
    }

    #[test]
    fn intersects_is_symmetric() {
        let screen = unit_screen();
        let p = Priority::default();
        let a = square(1, Point::new(0.0, 0.0), 5.0, p);
        let b = square(2, Point::new(8.0, 0.0), 5.0, p);
        let c = square(3, Point::new(30.0, 0.0), 5.0, p);
        assert!(a.intersects(&screen, &b));
        assert!(b.intersects(&screen, &a));
        assert!(!a.intersects(&screen, &c));
        assert!(!c.intersects(&screen, &a));
    }

    #[test]
    fn touching_edges_intersect() {
        let screen = unit_screen();
        let p = Priority::default();
        let a = square(1, Point::new(0.0, 0.0), 5.0, p);
        let b = square(2, Point::new(10.0, 0.0), 5.0, p);
        assert!(a.intersects(&screen, &b));
    }

    #[test]
    fn bounding_overlap_alone_is_not_intersection() {
        let screen = unit_screen();
        let boxes = two_boxes();
        // Centre of the union box but away from both member boxes.
        let at = |p: Point| screen.pixel_to_global(p);
        let middle = square(1, at(Point::new(50.0, 50.0)), 5.0, Priority::default());
        assert!(rects_overlap(boxes.pixel_rect(&screen), middle.pixel_rect(&screen)));
        assert!(!boxes.intersects(&screen, &middle));
        assert!(!middle.intersects(&screen, &boxes));

        let corner = square(2, at(Point::new(95.0, 95.0)), 2.0, Priority::default());
        assert!(boxes.intersects(&screen, &corner));
        assert!(corner.intersects(&screen, &boxes));
    }

    #[test]
    fn compare_uses_shared_mask() {
        let a = two_boxes();
        // Same zoom, larger manual field: only visible under the full mask.
        let b = square(2, Point::ORIGIN, 1.0, compute_priority(3, 200, 0.0));
        assert_eq!(compare_overlays(&a, &b), Ordering::Equal);
        let c = square(3, Point::ORIGIN, 1.0, compute_priority(4, 0, 0.0));
        assert_eq!(compare_overlays(&c, &a), Ordering::Greater);
        assert_eq!(compare_overlays(&b, &c), Ordering::Less);
    }

    #[test]
    fn index_storage_is_allocated_once() {
        let mut h = square(1, Point::ORIGIN, 1.0, Priority::default());
        {
            let slots = h.acquire_index_storage(6).unwrap();
            slots.copy_from_slice(&[0, 1, 2, 2, 1, 3]);
        }
        // Same size returns the same contents.
        assert_eq!(h.acquire_index_storage(6).unwrap()[5], 3);
        assert_eq!(
            h.acquire_index_storage(4),
            Err(BufferError::IndexCapacityMismatch {
                allocated: 6,
                requested: 4,
            })
        );

        let mut sink = CountingSink(Vec::new());
        assert_eq!(h.emit_indexes(&mut sink), Ok(6));
        assert_eq!(sink.0, vec![0, 1, 2, 2, 1, 3]);

        h.base_mut().reset_index_storage();
        assert_eq!(h.acquire_index_storage(4).map(|s| s.len()), Ok(4));
    }

    #[test]
    fn emit_without_storage_fails() {
        let h = square(1, Point::ORIGIN, 1.0, Priority::default());
        let mut sink = CountingSink(Vec::new());
        assert_eq!(
            h.emit_indexes(&mut sink),
            Err(BufferError::IndexStorageMissing)
        );
        assert!(sink.0.is_empty());
    }

    #[test]
    fn attribute_registry_lookup() {
        let mut h = square(1, Point::ORIGIN, 1.0, Priority::default());
        let info = BindingInfo::new(BindingId(3), 8).with_attribute(AttributeDecl {
            name: "a_offset",
            components: 2,
            offset: 0,
        });
        assert!(h.register_dynamic_attribute(info.clone(), MutateRegion::new(12, 4)));
        assert!(h.has_dynamic_attributes());

        let (found, region) = h.base().attribute_region(BindingId(3)).unwrap();
        assert_eq!(found.id(), BindingId(3));
        assert_eq!(region, MutateRegion::new(12, 4));

        assert_eq!(
            h.base().attribute_region(BindingId(4)).map(|(_, r)| r),
            Err(BufferError::AttributeNotFound(BindingId(4)))
        );

        // A second registration for the same binding keeps the first.
        assert!(!h.register_dynamic_attribute(info, MutateRegion::new(0, 1)));
        assert_eq!(
            h.base().attribute_region(BindingId(3)).map(|(_, r)| r),
            Ok(MutateRegion::new(12, 4))
        );
    }

    #[test]
    fn rank_indices_round_trip() {
        for rank in OverlayRank::ALL {
            assert_eq!(OverlayRank::from_index(rank.index()), Some(rank));
        }
        assert_eq!(OverlayRank::from_index(OverlayRank::COUNT), None);
    }
}
