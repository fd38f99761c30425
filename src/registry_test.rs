use super::*;

fn id(n: u32) -> Id {
    Id::new(n)
}

fn sample() -> ObjectRegistry {
    let mut reg = ObjectRegistry::new();
    assert!(reg.insert(id(1), Rect::new(0.0, 0.0, 10.0, 10.0), 0));
    assert!(reg.insert(id(2), Rect::new(20.0, 0.0, 10.0, 10.0), 0));
    // Overlaps id 1, allowed because it sits on a higher level.
    assert!(reg.insert(id(3), Rect::new(5.0, 5.0, 10.0, 10.0), 1));
    reg
}

#[test]
fn insert_rejects_same_level_overlap_and_duplicate_id() {
    let mut reg = sample();
    assert!(!reg.insert(id(4), Rect::new(25.0, 5.0, 2.0, 2.0), 0));
    assert!(!reg.insert(id(1), Rect::new(100.0, 100.0, 1.0, 1.0), 5));
    assert_eq!(reg.len(), 3);
    assert!(!reg.contains(id(4)));
}

#[test]
fn object_at_prefers_higher_level() {
    let reg = sample();
    assert_eq!(reg.object_at(Point::new(7.0, 7.0), None), Some(id(3)));
    assert_eq!(reg.object_at(Point::new(7.0, 7.0), Some(id(3))), Some(id(1)));
    assert_eq!(reg.object_at(Point::new(2.0, 2.0), None), Some(id(1)));
    assert_eq!(reg.object_at(Point::new(50.0, 50.0), None), None);
}

#[test]
fn relocate_moves_within_level() {
    let mut reg = sample();
    assert!(reg.relocate(id(2), Rect::new(40.0, 0.0, 10.0, 10.0)));
    assert_eq!(reg.get(id(2)), Some((Rect::new(40.0, 0.0, 10.0, 10.0), 0)));
    assert!(!reg.relocate(id(2), Rect::new(5.0, 0.0, 10.0, 10.0)));
    assert!(!reg.relocate(id(9), Rect::new(0.0, 0.0, 1.0, 1.0)));
}

#[test]
fn remove_drops_empty_levels() {
    let mut reg = sample();
    assert!(reg.remove(id(3)));
    assert!(!reg.remove(id(3)));
    assert_eq!(reg.object_at(Point::new(7.0, 7.0), None), Some(id(1)));
    assert!(reg.insert(id(5), Rect::new(12.0, 12.0, 1.0, 1.0), 1));
}

#[test]
fn objects_in_lists_topmost_first() {
    let reg = sample();
    let all = reg.objects_in(Rect::new(-1.0, -1.0, 100.0, 100.0), true);
    assert_eq!(all, vec![id(3), id(1), id(2)]);
}

#[test]
fn collides_checks_one_level() {
    let reg = sample();
    assert!(reg.collides(Rect::new(8.0, 8.0, 4.0, 4.0), 0, None));
    assert!(!reg.collides(Rect::new(8.0, 8.0, 4.0, 4.0), 0, Some(id(1))));
    assert!(!reg.collides(Rect::new(8.0, 8.0, 4.0, 4.0), 7, None));
}

#[test]
fn crop_applies_to_existing_and_new_levels() {
    let mut reg = sample();
    reg.set_crop(Some(Rect::new(15.0, -5.0, 100.0, 100.0)));
    assert_eq!(reg.object_at(Point::new(2.0, 2.0), None), None);
    assert_eq!(reg.object_at(Point::new(25.0, 5.0), None), Some(id(2)));
    assert!(reg.insert(id(6), Rect::new(60.0, 60.0, 5.0, 5.0), 2));
    assert!(reg.insert(id(7), Rect::new(0.0, 30.0, 5.0, 5.0), 2));
    assert_eq!(reg.object_at(Point::new(62.0, 62.0), None), Some(id(6)));
    assert_eq!(reg.object_at(Point::new(2.0, 32.0), None), None);
}

#[test]
fn bounding_box_spans_levels() {
    let mut reg = sample();
    assert_eq!(reg.bounding_box(), Some(Rect::new(0.0, 0.0, 30.0, 15.0)));
    reg.clear();
    assert!(reg.is_empty());
    assert_eq!(reg.bounding_box(), None);
}
