//! Persistence functions and the validated input structs they accept.
//! Each function takes the connection explicitly and returns plain entity
//! models or `DbErr`; only the cross-entity ownership check reports through
//! `AppError`, since its outcome is a 404 or a mismatch with ids attached.

pub mod categories;
pub mod projects;
pub mod screens;
