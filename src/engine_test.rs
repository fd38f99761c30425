#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::animation::linear;
use crate::arena::Arena;
use crate::clock::ManualClock;
use crate::event::GestureKind;
use crate::id::CounterIds;

type Log = Rc<RefCell<Vec<String>>>;

struct Block {
    id: Id,
    rect: Rect,
    level: i32,
    registered: bool,
}

impl Block {
    fn new(raw: u32, x: f64, y: f64) -> Self {
        Self { id: Id::new(raw), rect: Rect::new(x, y, 2.0, 2.0), level: 0, registered: false }
    }
}

impl Registrable for Block {
    fn id(&self) -> Id {
        self.id
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn level(&self) -> i32 {
        self.level
    }

    fn on_registered(&mut self, core: &mut EngineCore) {
        self.registered = core.object_rect(self.id) == Some(self.rect);
    }
}

struct Blank(Size);

impl Surface for Blank {
    fn size(&self) -> Size {
        self.0
    }

    fn resize(&mut self, size: Size) {
        self.0 = size;
    }

    fn clear(&mut self) {}

    fn offscreen(&self, size: Size) -> Option<Self> {
        Some(Self(size))
    }

    fn draw_surface(&mut self, _src: &Self, _at: Point) {}
}

fn core_with_clock() -> (EngineCore, ManualClock) {
    let clock = ManualClock::new(0.0);
    let core = EngineCore::with_parts(EngineConfig::default(), Rc::new(clock.clone()), Box::new(CounterIds::default()))
        .expect("default config is valid");
    (core, clock)
}

fn core() -> EngineCore {
    core_with_clock().0
}

fn record(core: &EngineCore) -> Log {
    let log = Log::default();
    let sink = Rc::clone(&log);
    core.on("", move |name, _| {
        sink.borrow_mut().push(name.to_owned());
        Flow::Continue
    });
    log
}

fn request_count(actions: &[Action]) -> usize {
    actions.iter().filter(|a| **a == Action::RequestFrame).count()
}

// =============================================================
// Construction
// =============================================================

#[test]
fn invalid_config_is_rejected() {
    let config = EngineConfig { logic_width_min: 0.0, ..EngineConfig::default() };
    assert!(EngineCore::new(config).is_err());
    assert!(EngineCore::new(EngineConfig::default()).is_ok());
}

#[test]
fn new_core_starts_dirty_with_one_memory() {
    let core = core();
    assert!(core.is_dirty());
    assert!(!core.frame_pending());
    assert_eq!(core.memory().len(), 1);
    assert_eq!(core.cursor(), "default");
    let mut names = core.memory().field_names();
    names.sort();
    assert_eq!(names, vec![OBJECTS_FIELD, VIEW_FIELD]);
}

// =============================================================
// Frame requests / cursor
// =============================================================

#[test]
fn frame_requests_coalesce() {
    let mut core = core();
    core.render();
    core.render_all();
    core.mark_dirty();
    assert_eq!(core.take_actions(), vec![Action::RequestFrame]);
    assert!(core.frame_pending());
    core.render();
    assert!(core.take_actions().is_empty());
}

#[test]
fn cursor_changes_become_actions() {
    let mut core = core();
    let outer = core.push_cursor("move");
    let inner = core.push_cursor("move");
    core.pop_cursor(inner);
    core.pop_cursor(outer);
    assert_eq!(
        core.take_actions(),
        vec![Action::SetCursor("move".into()), Action::SetCursor("default".into())]
    );
}

// =============================================================
// Objects
// =============================================================

#[test]
fn register_indexes_and_notifies() {
    let mut core = core();
    let mut block = Block::new(1, 5.0, 5.0);
    assert!(core.register(&mut block));
    assert!(block.registered);
    assert_eq!(core.object_at(Point::new(6.0, 6.0)), Some(block.id));
    assert_eq!(core.object_count(), 1);

    let mut twin = Block::new(1, 20.0, 20.0);
    assert!(!core.register(&mut twin));
    assert!(!twin.registered);

    let mut overlap = Block::new(2, 6.0, 6.0);
    assert!(!core.register(&mut overlap));
    overlap.level = 1;
    assert!(core.register(&mut overlap));
    assert_eq!(core.object_at(Point::new(6.5, 6.5)), Some(overlap.id));

    assert!(core.unregister(overlap.id));
    assert!(!core.unregister(overlap.id));
    assert_eq!(core.object_at(Point::new(6.5, 6.5)), Some(block.id));
}

#[test]
fn hit_tests_follow_visible_area() {
    let mut core = core();
    let mut block = Block::new(1, 35.0, 25.0);
    assert!(core.register(&mut block));
    assert_eq!(core.object_at(Point::new(36.0, 26.0)), Some(block.id));

    // 800 px at 20 px per unit shifts the view 40 units to the right.
    core.pan_by(Vector::new(-800.0, 0.0));
    assert_eq!(core.object_at(Point::new(36.0, 26.0)), None);
    core.pan_by(Vector::new(800.0, 0.0));
    assert_eq!(core.object_at(Point::new(36.0, 26.0)), Some(block.id));
}

#[test]
fn fit_objects_brings_everything_into_view() {
    let mut core = core();
    assert!(!core.fit_objects(10.0));
    let mut a = Block::new(1, 1.0, 1.0);
    let mut b = Block::new(2, 30.0, 20.0);
    assert!(core.register(&mut a));
    assert!(core.register(&mut b));
    assert!(core.fit_objects(10.0));
    let visible = core.layout().visible_rect();
    assert!(visible.contains_rect(&Rect::new(1.0, 1.0, 31.0, 21.0)));
}

#[test]
fn ids_come_from_the_configured_source() {
    let mut core = core();
    assert_eq!(core.next_id(), Id::new(1));
    assert_eq!(core.next_id(), Id::new(2));
}

#[test]
fn unregister_returns_id_to_source() {
    struct Tracked {
        next: u32,
        released: Rc<RefCell<Vec<Id>>>,
    }

    impl IdSource for Tracked {
        fn next_id(&mut self) -> Id {
            self.next += 1;
            Id::new(self.next)
        }

        fn release(&mut self, id: Id) -> bool {
            self.released.borrow_mut().push(id);
            true
        }
    }

    let released = Rc::new(RefCell::new(Vec::new()));
    let ids = Tracked { next: 0, released: Rc::clone(&released) };
    let mut core = EngineCore::with_parts(EngineConfig::default(), Rc::new(ManualClock::new(0.0)), Box::new(ids))
        .expect("default config is valid");
    let id = core.next_id();
    let mut block = Block::new(id.raw(), 5.0, 5.0);
    assert!(core.register(&mut block));
    assert!(core.unregister(id));
    assert!(!core.unregister(id));
    assert_eq!(*released.borrow(), vec![id]);
}

// =============================================================
// Memories
// =============================================================

#[test]
fn memories_isolate_objects_and_views() {
    let mut core = core();
    let log = record(&core);
    let first = core.current_memory();
    let mut block = Block::new(1, 5.0, 5.0);
    assert!(core.register(&mut block));
    core.pan_by(Vector::new(40.0, 0.0));

    let second = core.create_memory().expect("memory created");
    assert_eq!(core.current_memory(), first);
    assert!(core.switch_memory(second));
    assert_eq!(core.object_count(), 0);
    assert_eq!(core.object_at(Point::new(6.0, 6.0)), None);
    assert_eq!(core.layout().origin_bias(), Vector::ZERO);

    assert!(core.switch_memory(first));
    assert_eq!(core.object_count(), 1);
    assert_eq!(core.layout().origin_bias(), Vector::new(2.0, 0.0));
    assert_eq!(
        *log.borrow(),
        vec!["memory.create", "memory.switch.before", "memory.switch.after", "memory.switch.before", "memory.switch.after"]
    );
}

#[test]
fn switch_to_current_or_unknown_memory() {
    let mut core = core();
    let log = record(&core);
    assert!(core.switch_memory(core.current_memory()));
    assert!(!core.switch_memory(uuid::Uuid::new_v4()));
    assert!(log.borrow().is_empty());
}

#[test]
fn deleting_current_memory_moves_to_neighbour() {
    let mut core = core();
    let first = core.current_memory();
    let second = core.create_memory().expect("memory created");
    let log = record(&core);

    assert!(core.delete_memory(first));
    assert_eq!(core.current_memory(), second);
    assert!(!core.memory().contains(first));
    assert_eq!(*log.borrow(), vec!["memory.switch.before", "memory.switch.after", "memory.delete"]);

    assert!(core.delete_memory(second));
    assert_eq!(core.memory().len(), 1);
    assert_ne!(core.current_memory(), second);
    assert!(!core.delete_memory(second));
}

// =============================================================
// Engine
// =============================================================

#[test]
fn attach_adopts_stage_size_and_requests_frame() {
    let mut engine = Engine::with_core(core());
    engine.attach_stage(Blank(Size::new(400.0, 300.0)));
    assert_eq!(engine.core.layout().stage_size(), Size::new(400.0, 300.0));
    assert_eq!(request_count(&engine.take_actions()), 1);

    let stats = engine.on_frame().expect("frame");
    assert!(stats.rebuilt);
    assert!(engine.take_actions().is_empty());
    assert!(!engine.core.frame_pending());

    engine.resize(Size::new(200.0, 100.0));
    assert_eq!(engine.stage().map(Surface::size), Some(Size::new(200.0, 100.0)));
    assert!(engine.core.is_dirty());
}

#[test]
fn running_tween_keeps_requesting_frames() {
    let (core, clock) = core_with_clock();
    let mut engine = Engine::with_core(core);
    engine.attach_stage(Blank(Size::new(400.0, 300.0)));
    engine.on_frame().expect("first frame");
    engine.take_actions();

    let steps = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&steps);
    engine.core.animate(100.0, linear, move |t| sink.borrow_mut().push(t), None);
    assert_eq!(request_count(&engine.take_actions()), 1);

    clock.set(50.0);
    engine.on_frame().expect("mid frame");
    assert_eq!(request_count(&engine.take_actions()), 1);

    clock.set(150.0);
    engine.on_frame().expect("last frame");
    assert!(engine.take_actions().is_empty());
    assert_eq!(*steps.borrow(), vec![0.5, 1.0]);
}

#[test]
fn layer_visibility_round_trips_through_engine() {
    struct Named;
    impl Layer<Blank> for Named {
        fn name(&self) -> &str {
            "named"
        }
        fn level(&self) -> i32 {
            0
        }
    }

    let mut engine: Engine<Blank> = Engine::with_core(core());
    engine.mount(Named);
    assert_eq!(engine.layer_names(), vec!["named"]);
    assert!(engine.set_layer_visible("named", false));
    assert_eq!(engine.is_layer_visible("named"), Some(false));
    assert!(engine.unmount("named").is_some());
    assert!(engine.layer_names().is_empty());
}

#[test]
fn switching_memory_cancels_running_gesture() {
    let mut engine: Engine<Blank> = Engine::with_core(core());
    let log = record(&engine.core);
    engine.on_pointer_down(Point::new(100.0, 100.0), Button::Primary, Modifiers::default());
    assert_eq!(engine.gesture(), GestureKind::Framing);

    let other = engine.create_memory().expect("memory created");
    assert!(engine.switch_memory(other));
    assert_eq!(engine.gesture(), GestureKind::Idle);
    assert!(log.borrow().iter().any(|n| n == "frame.cancel"));
    assert_eq!(engine.core.cursor(), "default");
}

#[test]
fn input_methods_return_pending_actions() {
    let mut engine: Engine<Blank> = Engine::with_core(core());
    engine.take_actions();
    let actions = engine.on_pointer_down(Point::new(100.0, 100.0), Button::Middle, Modifiers::default());
    assert_eq!(actions, vec![Action::SetCursor("grabbing".into())]);
    let actions = engine.on_pointer_move(Point::new(120.0, 100.0), Modifiers::default());
    assert_eq!(actions, vec![Action::RequestFrame]);
    let actions = engine.on_pointer_up(Point::new(120.0, 100.0), Button::Middle, Modifiers::default());
    assert_eq!(actions, vec![Action::SetCursor("default".into())]);
}

#[test]
fn point_arena_uses_configured_tolerance_and_view() {
    let core = core();
    let mut arena = core.point_arena();
    assert_eq!(arena.tolerance(), core.config().point_tolerance);
    assert!(arena.add_object(Id::new(1), Point::new(10.0, 10.0)));
    assert!(arena.add_object(Id::new(2), Point::new(100.0, 100.0)));
    assert_eq!(arena.pos_occupied(Point::new(10.3, 10.0), None), Some(Id::new(1)));
    // Outside the 40 x 30 unit view.
    assert_eq!(arena.pos_occupied(Point::new(100.0, 100.0), None), None);
}
