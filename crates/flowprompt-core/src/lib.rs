//! Flowprompt Core Types and Definitions
//!
//! This crate provides the foundational types shared by every part of
//! flowprompt. It includes:
//!
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Identifiers**: Typed node/edge identifiers and their generators ([`identifier`])
//! - **Colors**: Fill colors with CSS parsing and hex persistence ([`color::Color`])
//! - **Text**: Measuring node captions to size shapes ([`text`] module)
//! - **Model**: Nodes, edges, anchors and selection references ([`model`] module)
//! - **Routing**: Anchor points, orthogonal connector paths, arrowheads ([`route`])
//! - **Hit testing**: Mapping a pointer position to the item under it ([`hit_test`])

pub mod color;
pub mod geometry;
pub mod identifier;
pub mod model;
pub mod route;
pub mod text;
