use super::*;

fn id(n: u32) -> Id {
    Id::new(n)
}

fn arena_with(rects: &[(u32, Rect)]) -> RectArena {
    let mut arena = RectArena::new();
    for (n, r) in rects {
        assert!(arena.add_object(id(*n), *r));
    }
    arena
}

// =============================================================
// Mutation
// =============================================================

#[test]
fn overlapping_insert_is_rejected_and_size_unchanged() {
    let mut arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0))]);
    let r2 = Rect::new(5.0, 5.0, 10.0, 10.0);
    assert!(Rect::new(0.0, 0.0, 10.0, 10.0).intersects_rect(&r2));
    assert!(!arena.add_object(id(2), r2));
    assert_eq!(arena.len(), 1);
    assert_eq!(arena.get(id(2)), None);
}

#[test]
fn edge_sharing_insert_is_accepted() {
    let arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0)), (2, Rect::new(10.0, 0.0, 10.0, 10.0))]);
    assert_eq!(arena.len(), 2);
}

#[test]
fn duplicate_id_is_rejected() {
    let mut arena = arena_with(&[(1, Rect::new(0.0, 0.0, 1.0, 1.0))]);
    assert!(!arena.add_object(id(1), Rect::new(50.0, 50.0, 1.0, 1.0)));
    assert_eq!(arena.get(id(1)), Some(Rect::new(0.0, 0.0, 1.0, 1.0)));
}

#[test]
fn set_object_moves_and_ignores_self_overlap() {
    let mut arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0))]);
    assert!(arena.set_object(id(1), Rect::new(2.0, 2.0, 10.0, 10.0)));
    assert_eq!(arena.get(id(1)), Some(Rect::new(2.0, 2.0, 10.0, 10.0)));
}

#[test]
fn set_object_rejects_overlap_with_other() {
    let mut arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0)), (2, Rect::new(20.0, 0.0, 10.0, 10.0))]);
    assert!(!arena.set_object(id(2), Rect::new(5.0, 0.0, 10.0, 10.0)));
    assert_eq!(arena.get(id(2)), Some(Rect::new(20.0, 0.0, 10.0, 10.0)));
}

#[test]
fn set_and_delete_unknown_id_fail() {
    let mut arena = RectArena::new();
    assert!(!arena.set_object(id(9), Rect::new(0.0, 0.0, 1.0, 1.0)));
    assert!(!arena.del_object(id(9)));
}

// =============================================================
// Bounding box
// =============================================================

#[test]
fn bounding_box_grows_and_shrinks() {
    let mut arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0)), (2, Rect::new(90.0, 90.0, 10.0, 10.0))]);
    assert_eq!(arena.bounding_box(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    assert!(arena.del_object(id(2)));
    assert_eq!(arena.bounding_box(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    assert!(arena.set_object(id(1), Rect::new(5.0, 5.0, 2.0, 2.0)));
    assert_eq!(arena.bounding_box(), Some(Rect::new(5.0, 5.0, 2.0, 2.0)));
    assert!(arena.del_object(id(1)));
    assert_eq!(arena.bounding_box(), None);
}

#[test]
fn interior_move_keeps_bounding_box() {
    let mut arena = arena_with(&[
        (1, Rect::new(0.0, 0.0, 10.0, 10.0)),
        (2, Rect::new(40.0, 40.0, 5.0, 5.0)),
        (3, Rect::new(90.0, 90.0, 10.0, 10.0)),
    ]);
    assert!(arena.set_object(id(2), Rect::new(50.0, 50.0, 5.0, 5.0)));
    assert_eq!(arena.bounding_box(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
}

// =============================================================
// Queries
// =============================================================

#[test]
fn pos_occupied_finds_containing_rect() {
    let arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0)), (2, Rect::new(20.0, 0.0, 10.0, 10.0))]);
    assert_eq!(arena.pos_occupied(Point::new(25.0, 5.0), None), Some(id(2)));
    assert_eq!(arena.pos_occupied(Point::new(15.0, 5.0), None), None);
    assert_eq!(arena.pos_occupied(Point::new(25.0, 5.0), Some(id(2))), None);
}

#[test]
fn shared_edge_point_reports_both() {
    let arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0)), (2, Rect::new(10.0, 0.0, 10.0, 10.0))]);
    assert_eq!(arena.pos_occupied_set(Point::new(10.0, 5.0), None), vec![id(1), id(2)]);
    assert_eq!(arena.pos_occupied(Point::new(10.0, 5.0), None), Some(id(1)));
}

#[test]
fn line_queries() {
    let arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0)), (2, Rect::new(20.0, 0.0, 10.0, 10.0))]);
    let a = Point::new(-5.0, 5.0);
    let b = Point::new(35.0, 5.0);
    assert_eq!(arena.line_occupied(a, b, None), Ok(Some(id(1))));
    assert_eq!(arena.line_occupied(a, b, Some(id(1))), Ok(Some(id(2))));
    assert_eq!(arena.line_occupied_set(a, b, None), Ok(vec![id(1), id(2)]));
    assert_eq!(arena.line_occupied(Point::new(0.0, 20.0), Point::new(30.0, 20.0), None), Ok(None));
}

#[test]
fn rect_query_fill_vs_outline() {
    let arena = arena_with(&[(1, Rect::new(10.0, 10.0, 5.0, 5.0)), (2, Rect::new(40.0, 10.0, 20.0, 5.0))]);
    let query = Rect::new(0.0, 0.0, 50.0, 50.0);
    assert_eq!(arena.rect_occupied_set(query, true, None), Ok(vec![id(1), id(2)]));
    // id 1 sits strictly inside the query so the outline never meets it.
    assert_eq!(arena.rect_occupied_set(query, false, None), Ok(vec![id(2)]));
    assert_eq!(arena.rect_occupied(query, false, Some(id(2))), Ok(None));
}

#[test]
fn fill_query_ignores_edge_contact() {
    let arena = arena_with(&[(1, Rect::new(10.0, 0.0, 10.0, 10.0))]);
    let query = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(arena.rect_occupied(query, true, None), Ok(None));
    assert_eq!(arena.rect_occupied(query, false, None), Ok(Some(id(1))));
}

// =============================================================
// Crop
// =============================================================

#[test]
fn crop_limits_queries_to_visible_region() {
    let mut arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0)), (2, Rect::new(100.0, 0.0, 10.0, 10.0))]);
    arena.set_crop(Some(Rect::new(-50.0, -50.0, 80.0, 80.0)));
    assert_eq!(arena.scope(), Some(Rect::new(0.0, 0.0, 30.0, 10.0)));
    assert_eq!(arena.pos_occupied(Point::new(105.0, 5.0), None), None);
    assert_eq!(arena.pos_occupied(Point::new(5.0, 5.0), None), Some(id(1)));
    let everything = Rect::new(-500.0, -500.0, 1000.0, 1000.0);
    assert_eq!(arena.rect_occupied_set(everything, true, None), Ok(vec![id(1)]));
    arena.set_crop(None);
    assert_eq!(arena.rect_occupied_set(everything, true, None), Ok(vec![id(1), id(2)]));
}

#[test]
fn crop_outside_bbox_matches_nothing() {
    let mut arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0))]);
    arena.set_crop(Some(Rect::new(500.0, 500.0, 10.0, 10.0)));
    assert_eq!(arena.scope(), None);
    assert_eq!(arena.pos_occupied(Point::new(5.0, 5.0), None), None);
}

#[test]
fn clear_empties_arena() {
    let mut arena = arena_with(&[(1, Rect::new(0.0, 0.0, 10.0, 10.0))]);
    arena.clear();
    assert!(arena.is_empty());
    assert_eq!(arena.bounding_box(), None);
    assert_eq!(arena.ids().count(), 0);
}

#[test]
fn select_ignores_crop() {
    let mut arena = arena_with(&[(1, Rect::new(0.0, 0.0, 2.0, 2.0)), (2, Rect::new(50.0, 50.0, 2.0, 2.0))]);
    arena.set_crop(Some(Rect::new(40.0, 40.0, 20.0, 20.0)));
    let area = Rect::new(-1.0, -1.0, 100.0, 100.0);
    assert_eq!(arena.rect_occupied_set(area, true, None), Ok(vec![id(2)]));
    assert_eq!(arena.select(&area, true), vec![id(1), id(2)]);
}
