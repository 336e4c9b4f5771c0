// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod grid;
pub mod list;
pub mod style;
pub mod sync;
pub mod transform;
pub mod view;

pub use grid::*;
pub use list::*;
pub use style::*;
pub use sync::*;
pub use transform::*;
pub use view::*;
