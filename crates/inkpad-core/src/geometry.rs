//! Geometry kernel: bounding boxes, rotation pivots, handle placement and
//! hit-testing for draw objects. Everything here is a pure function.

use crate::shapes::DrawObject;
use kurbo::{Affine, Point, Rect, Vec2};

/// Offset of the rotation handle from the top-right bounding-box corner.
pub const ROTATION_HANDLE_OFFSET: Vec2 = Vec2::new(5.0, -5.0);
/// Pointer distance within which the rotation handle is grabbed.
pub const ROTATION_HANDLE_HIT_RADIUS: f64 = 8.0;
/// Painted radius of the rotation handle.
pub const ROTATION_HANDLE_RADIUS: f64 = 5.0;

/// Unrotated bounding box of an object.
pub fn bounding_box(obj: &DrawObject) -> Rect {
    obj.shape.bounds()
}

/// Pivot for rotation: bbox center for boxes and circles, centroid for point
/// lists, midpoint for segments, box center above the baseline for text.
pub fn rotation_center(obj: &DrawObject) -> Point {
    obj.shape.center()
}

/// Transform that applies the object's rotation about its center.
pub fn rotation_transform(obj: &DrawObject) -> Affine {
    if obj.rotation == 0.0 {
        return Affine::IDENTITY;
    }
    let center = rotation_center(obj);
    Affine::rotate_about(obj.rotation.to_radians(), center)
}

/// Where the rotation handle is painted and grabbed, in canvas space.
pub fn rotation_handle_position(obj: &DrawObject) -> Point {
    let bbox = bounding_box(obj);
    let corner = Point::new(bbox.x1, bbox.y0) + ROTATION_HANDLE_OFFSET;
    rotation_transform(obj) * corner
}

/// Whether `point` grabs the rotation handle of `obj`.
pub fn hits_rotation_handle(obj: &DrawObject, point: Point) -> bool {
    rotation_handle_position(obj).distance(point) <= ROTATION_HANDLE_HIT_RADIUS
}

/// Variant-specific hit test. The point is first mapped into the object's
/// unrotated frame.
pub fn contains_point(obj: &DrawObject, point: Point) -> bool {
    let local = rotation_transform(obj).inverse() * point;
    obj.shape.hit_test(local, obj.style.stroke_width)
}

/// Topmost object under `point`: highest z-index first, later insertion
/// winning ties.
pub fn topmost_hit(objects: &[DrawObject], point: Point) -> Option<&DrawObject> {
    let mut best: Option<&DrawObject> = None;
    for obj in objects {
        if contains_point(obj, point) && best.is_none_or(|b| obj.z_index >= b.z_index) {
            best = Some(obj);
        }
    }
    best
}

/// All objects under `point`, topmost first.
pub fn hits_at_point(objects: &[DrawObject], point: Point) -> Vec<&DrawObject> {
    let mut hits: Vec<&DrawObject> = objects
        .iter()
        .filter(|obj| contains_point(obj, point))
        .collect();
    hits.sort_by_key(|obj| obj.z_index);
    hits.reverse();
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Freehand, Rectangle, Shape, ShapeStyle, Text};

    fn object(shape: Shape, z: i64) -> DrawObject {
        let mut obj = DrawObject::new(shape, ShapeStyle::default());
        obj.z_index = z;
        obj
    }

    #[test]
    fn test_circle_hit_symmetry() {
        let circle = object(Shape::Circle(Circle::new(Point::new(100.0, 100.0), 20.0)), 1);
        assert!(contains_point(&circle, Point::new(115.0, 100.0)));
        assert!(!contains_point(&circle, Point::new(125.0, 100.0)));
        assert!(contains_point(&circle, Point::new(85.0, 100.0)));
        assert!(!contains_point(&circle, Point::new(75.0, 100.0)));
    }

    #[test]
    fn test_rotation_handle_position() {
        let rect = object(
            Shape::Rectangle(Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0)),
            1,
        );
        let handle = rotation_handle_position(&rect);
        assert!((handle.x - 115.0).abs() < 1e-9);
        assert!((handle.y - 15.0).abs() < 1e-9);
        assert!(hits_rotation_handle(&rect, Point::new(120.0, 15.0)));
        assert!(!hits_rotation_handle(&rect, Point::new(125.0, 15.0)));
    }

    #[test]
    fn test_rotation_handle_follows_rotation() {
        let mut rect = object(
            Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0)),
            1,
        );
        rect.rotation = 180.0;
        let handle = rotation_handle_position(&rect);
        // (105, -5) rotated half a turn about (50, 50).
        assert!((handle.x + 5.0).abs() < 1e-9);
        assert!((handle.y - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_point_respects_rotation() {
        let mut rect = object(
            Shape::Rectangle(Rectangle::new(Point::new(0.0, 40.0), 100.0, 20.0)),
            1,
        );
        assert!(contains_point(&rect, Point::new(90.0, 50.0)));
        assert!(!contains_point(&rect, Point::new(50.0, 90.0)));
        rect.rotation = 90.0;
        assert!(!contains_point(&rect, Point::new(90.0, 50.0)));
        assert!(contains_point(&rect, Point::new(50.0, 90.0)));
    }

    #[test]
    fn test_topmost_hit_prefers_high_z() {
        let low = object(
            Shape::Rectangle(Rectangle::new(Point::ZERO, 100.0, 100.0)),
            5,
        );
        let high = object(Shape::Circle(Circle::new(Point::new(50.0, 50.0), 10.0)), 9);
        let low_id = low.id();
        let high_id = high.id();
        let objects = vec![high, low];

        assert_eq!(topmost_hit(&objects, Point::new(50.0, 50.0)).map(|o| o.id()), Some(high_id));
        assert_eq!(topmost_hit(&objects, Point::new(5.0, 5.0)).map(|o| o.id()), Some(low_id));
        assert!(topmost_hit(&objects, Point::new(500.0, 5.0)).is_none());

        let hits = hits_at_point(&objects, Point::new(50.0, 50.0));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id(), high_id);
    }

    #[test]
    fn test_topmost_hit_tie_goes_to_later_object() {
        let first = object(Shape::Circle(Circle::new(Point::ZERO, 10.0)), 1);
        let second = object(Shape::Circle(Circle::new(Point::ZERO, 10.0)), 1);
        let second_id = second.id();
        let objects = vec![first, second];
        assert_eq!(topmost_hit(&objects, Point::ZERO).map(|o| o.id()), Some(second_id));
    }

    #[test]
    fn test_bounding_box_per_variant() {
        let stroke = object(
            Shape::Freehand(Freehand::new(vec![Point::new(1.0, 2.0), Point::new(5.0, -3.0)])),
            1,
        );
        assert_eq!(bounding_box(&stroke), Rect::new(1.0, -3.0, 5.0, 2.0));

        let text = object(
            Shape::Text(Text::new(Point::new(0.0, 30.0), "ab".into(), 10.0)),
            1,
        );
        let b = bounding_box(&text);
        assert!((b.y0 - 20.0).abs() < f64::EPSILON);
        assert!((b.x1 - 12.0).abs() < 1e-9);
    }
}
