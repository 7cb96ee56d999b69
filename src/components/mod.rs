//! Leptos view components.

pub mod force_graph;
