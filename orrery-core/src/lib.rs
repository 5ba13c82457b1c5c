//! Orrery Core Library - scene graph, camera and pointer picking
//!
//! This library provides the renderer-independent pieces shared by the
//! terminal and web front ends: geometry, transform hierarchies, camera
//! projection, ray casting and the pointer-to-object picker.

pub mod config;
pub mod demo;
pub mod error;
pub mod geometry;
pub mod lighting;
pub mod picking;
pub mod projection;
pub mod ray;
pub mod scene;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use config::OrreryConfig;
pub use demo::{Demo, DemoKind};
pub use error::{Error, Result};
pub use geometry::{Mesh, Triangle, Vertex};
pub use lighting::{DirectionalLight, Rgb};
pub use picking::{compute_ndc, pick, Ndc, PickHit, Picker, PointerPosition};
pub use projection::{Camera, ProjectionMode};
pub use ray::Ray;
pub use scene::{Node, NodeId, SceneGraph};
pub use surface::{PointerEvent, PointerEventKind, Surface, SurfaceRect};
pub use transform::{RotationState, Transform};
