//! Domain layer
//!
//! Users, attendance records and the rules that govern them.
//! - `entities`: Domain models and the pure rules over them
//! - `ports`: Repository traits implemented by the adapters

pub mod entities;
pub mod ports;
