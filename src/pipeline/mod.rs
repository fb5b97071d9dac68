//! Pipeline stages for resume-to-HTML generation.
//!
//! Each submodule implements one step, so each can be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! loader ──▶ assets ──▶ render ──▶ writer
//! (JSON/YAML)  (picture,   (tera)    (collision
//!               icons, css)           policy)
//!
//! batch: discover ──▶ [loader ▶ assets ▶ render ▶ writer]* (one at a time)
//! ```
//!
//! 1. [`loader`]: read a JSON or YAML file and validate it into a
//!    [`crate::model::ResumeDocument`]
//! 2. [`assets`]: resolve the profile picture through an ordered strategy
//!    list and provide inline icons and stylesheet text
//! 3. [`render`]: bind document + assets into the template; derived fields
//!    such as durations are computed here
//! 4. [`writer`]: apply the overwrite/timestamp policy and write atomically
//! 5. [`batch`]: run 1–4 for every resume in a directory

pub mod assets;
pub mod batch;
pub mod loader;
pub mod render;
pub mod writer;
