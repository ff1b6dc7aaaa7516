//! pyviz Core Types and Definitions
//!
//! This crate provides the foundational types shared by every pyviz crate:
//!
//! - **Identifiers**: String-interned names for object records ([`identifier::Id`])
//! - **Colors**: CSS color handling for diagram styling ([`color::Color`])
//! - **Geometry**: Points, sizes, bounds and insets ([`geometry`] module)
//! - **Diagram**: The node/port/link model produced by the flatteners ([`diagram`] module)
//! - **Draw**: Text measurement and layered SVG output ([`draw`] module)

pub mod color;
pub mod diagram;
pub mod draw;
pub mod geometry;
pub mod identifier;
