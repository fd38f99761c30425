//! Interactive 2D scene engine.
//!
//! The engine turns raw pointer, wheel and keyboard events into semantic
//! signals (pan, zoom, rubber-band frame, object relocation), keeps a logical
//! coordinate system with a zoomable, pannable viewport, indexes registered
//! objects for hit-testing, and composes frames from prioritized layers over
//! a cached background. Several independent documents ("memories") can be
//! held at once; switching swaps every per-document field, including the
//! object index and the view.
//!
//! Drawing is abstract: a host supplies a [`render::Surface`] (the `web`
//! feature provides one over an HTML canvas) and drives
//! [`engine::Engine::on_frame`] whenever an [`engine::Action::RequestFrame`]
//! comes out of the engine.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] and the surface-free [`engine::EngineCore`] |
//! | [`event`] | Gesture state machine over raw input |
//! | [`render`] | Layer trait, surface trait and the frame pipeline |
//! | [`layout`] | Logical ↔ pixel transform, zoom levels, grid, edge sliding |
//! | [`notify`] | Scoped (dotted-path) and stacked (priority) notifiers |
//! | [`memory`] | Multi-document state with per-field hooks |
//! | [`registry`] | Per-level object index for hit-testing |
//! | [`arena`] | Rect and point arenas behind the registry |
//! | [`animation`] | Frame-driven tweens and debounce timers |
//! | [`cursor`] | Stacked cursor overrides |
//! | [`input`] | Raw device event types |
//! | [`geom`] | Points, vectors, sizes, rects, bounds |
//! | [`id`] | Object identifiers and generators |
//! | [`clock`] | Wall and manual time sources |
//! | [`config`] | Tunables, env/JSON loading and validation |
//! | [`consts`] | Default tunable values |
//! | [`telemetry`] | Optional tracing subscriber setup |

pub mod animation;
pub mod arena;
pub mod clock;
pub mod config;
pub mod consts;
pub mod cursor;
pub mod engine;
pub mod event;
pub mod geom;
pub mod id;
pub mod input;
pub mod layout;
pub mod memory;
pub mod notify;
pub mod registry;
pub mod render;
pub mod telemetry;
#[cfg(feature = "web")]
pub mod web;
