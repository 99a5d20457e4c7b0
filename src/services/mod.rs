// src/services/mod.rs

pub mod absence;
pub mod calendar;
pub mod geo;
pub mod kpi;
pub mod leave;
pub mod location;
pub mod payroll;
pub mod settings;
pub mod shift;
pub mod store;
