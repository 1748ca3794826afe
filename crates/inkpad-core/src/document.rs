//! Scene store: the ordered collection of draw objects and its z-order
//! watermark. Only this state is captured by undo history.

use crate::geometry;
use crate::shapes::{DrawObject, SerializableColor, ShapeId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Offset applied to duplicated objects.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Direction for [`Document::reorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZOrder {
    /// Above every object.
    Front,
    /// Swap with the next object up.
    Forward,
    /// Swap with the next object down.
    Backward,
    /// Below every object.
    Back,
}

/// Partial update merged into an object by [`Document::update`].
///
/// `None` fields are left untouched. `fill_color: Some(None)` clears the fill.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    pub stroke_color: Option<SerializableColor>,
    pub fill_color: Option<Option<SerializableColor>>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<u8>,
    pub rotation: Option<f64>,
    /// Move the object so its origin lands here.
    pub origin: Option<Point>,
    pub font_size: Option<f64>,
    pub text: Option<String>,
}

impl ObjectPatch {
    pub fn origin(origin: Point) -> Self {
        Self {
            origin: Some(origin),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    /// Whether applying the patch can change a text object's measured width.
    pub fn affects_text_width(&self) -> bool {
        self.font_size.is_some() || self.text.is_some()
    }

    fn apply(&self, obj: &mut DrawObject) {
        if let Some(color) = self.stroke_color {
            obj.style.stroke_color = color;
        }
        if let Some(fill) = self.fill_color {
            obj.style.fill_color = fill;
        }
        if let Some(width) = self.stroke_width {
            obj.style.stroke_width = width;
        }
        if let Some(opacity) = self.opacity {
            obj.style.opacity = opacity.min(100);
        }
        if let Some(rotation) = self.rotation {
            obj.rotation = rotation;
        }
        if let Some(origin) = self.origin {
            let delta = origin - obj.shape.origin();
            obj.shape.translate(delta);
        }
        if let Some(text) = obj.shape.as_text_mut() {
            if let Some(size) = self.font_size {
                text.font_size = size;
            }
            if let Some(content) = &self.text {
                text.content.clone_from(content);
            }
            if self.affects_text_width() {
                text.measured_width = None;
            }
        }
    }
}

/// The set of committed draw objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    objects: Vec<DrawObject>,
    max_z_index: i64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[DrawObject] {
        &self.objects
    }

    pub fn max_z_index(&self) -> i64 {
        self.max_z_index
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ShapeId) -> Option<&DrawObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut DrawObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.get(id).is_some()
    }

    fn position(&self, id: ShapeId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Add an object above everything else. Returns its id.
    pub fn add(&mut self, mut obj: DrawObject) -> ShapeId {
        self.max_z_index += 1;
        obj.z_index = self.max_z_index;
        let id = obj.id;
        log::debug!("add {:?} {} at z {}", obj.kind(), id, obj.z_index);
        self.objects.push(obj);
        id
    }

    /// Remove an object. Absent ids are ignored.
    pub fn remove(&mut self, id: ShapeId) -> Option<DrawObject> {
        let index = self.position(id)?;
        Some(self.objects.remove(index))
    }

    /// Merge `patch` into the object. Returns false if the id is unknown.
    pub fn update(&mut self, id: ShapeId, patch: &ObjectPatch) -> bool {
        match self.get_mut(id) {
            Some(obj) => {
                patch.apply(obj);
                true
            }
            None => false,
        }
    }

    /// Objects sorted by ascending z-index; ties keep insertion order.
    pub fn ordered(&self) -> Vec<&DrawObject> {
        let mut ordered: Vec<&DrawObject> = self.objects.iter().collect();
        ordered.sort_by_key(|o| o.z_index);
        ordered
    }

    /// Change paint order. Returns false if nothing changed.
    pub fn reorder(&mut self, id: ShapeId, direction: ZOrder) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let z = self.objects[index].z_index;
        let mut others = self.objects.iter().filter(|o| o.id != id).map(|o| o.z_index);
        let changed = match direction {
            ZOrder::Front => {
                if others.all(|other| other < z) {
                    return false;
                }
                self.max_z_index += 1;
                self.objects[index].z_index = self.max_z_index;
                true
            }
            ZOrder::Back => {
                let Some(min) = others.min().filter(|&min| min <= z) else {
                    return false;
                };
                self.objects[index].z_index = min - 1;
                true
            }
            ZOrder::Forward | ZOrder::Backward => self.swap_with_neighbor(id, direction),
        };
        if changed {
            log::debug!("reorder {id} {direction:?}");
        }
        changed
    }

    fn swap_with_neighbor(&mut self, id: ShapeId, direction: ZOrder) -> bool {
        let order: Vec<ShapeId> = self.ordered().iter().map(|o| o.id).collect();
        let Some(rank) = order.iter().position(|&other| other == id) else {
            return false;
        };
        let neighbor_rank = match direction {
            ZOrder::Forward if rank + 1 < order.len() => rank + 1,
            ZOrder::Backward if rank > 0 => rank - 1,
            _ => return false,
        };
        let (Some(a), Some(b)) = (self.position(id), self.position(order[neighbor_rank])) else {
            return false;
        };
        if self.objects[a].z_index == self.objects[b].z_index {
            // Tied z-indices are ordered by insertion, so swap positions instead.
            self.objects.swap(a, b);
        } else {
            let z = self.objects[a].z_index;
            self.objects[a].z_index = self.objects[b].z_index;
            self.objects[b].z_index = z;
        }
        true
    }

    /// Clone an object with a fresh id, offset by [`DUPLICATE_OFFSET`] and
    /// placed on top. Returns the new id.
    pub fn duplicate(&mut self, id: ShapeId) -> Option<ShapeId> {
        let mut copy = self.get(id)?.clone();
        copy.regenerate_id();
        copy.shape.translate(DUPLICATE_OFFSET);
        Some(self.add(copy))
    }

    /// Remove every object and reset the z watermark.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.max_z_index = 0;
    }

    /// Topmost object under `point`.
    pub fn hit_test(&self, point: Point) -> Option<ShapeId> {
        geometry::topmost_hit(&self.objects, point).map(DrawObject::id)
    }

    /// All objects under `point`, front to back.
    pub fn shapes_at_point(&self, point: Point) -> Vec<ShapeId> {
        geometry::hits_at_point(&self.objects, point)
            .into_iter()
            .map(DrawObject::id)
            .collect()
    }

    /// Union of all object bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(geometry::bounding_box)
            .reduce(|a, b| a.union(b))
    }

    /// Copy of the object array for history.
    pub fn snapshot(&self) -> Vec<DrawObject> {
        self.objects.clone()
    }

    /// Replace the object array, recomputing the watermark from the
    /// restored objects.
    pub fn restore(&mut self, objects: Vec<DrawObject>) {
        self.max_z_index = objects.iter().map(|o| o.z_index).max().unwrap_or(0);
        self.objects = objects;
    }
}
