// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod controller;
pub mod debounce;
pub mod dedupe;
pub mod format;
pub mod model;
pub mod pipeline;
pub mod platform;
pub mod projection;
pub mod search;
pub mod source;
pub mod state;

pub use controller::*;
pub use debounce::*;
pub use dedupe::*;
pub use model::*;
pub use platform::*;
pub use projection::*;
pub use search::*;
pub use source::*;
pub use state::*;
