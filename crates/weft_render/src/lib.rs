//! Weft Render Batch Builder
//!
//! Turns drawing calls into backend-agnostic [`CommandList`]s:
//!
//! - **Vertices**: one fixed `#[repr(C)]` [`Vertex`] layout for every backend
//! - **Batching**: [`BatchBuilder`] groups vertices into draws and splits on
//!   texture, [`CommandKind`], stack changes and a per-draw vertex limit
//! - **Stacks**: scoped transform and clip push/pop emitted as commands
//! - **Primitives**: rectangles, rounded rectangles, lines, beziers, images, text
//! - **Backends**: the [`Backend`] trait, [`replay`], and the recording [`CommandLog`]
//!
//! Everything here is single-threaded. Textures and command lists are
//! `Rc`-shared between the nodes that build them and the lists that
//! reference them.

pub mod backend;
pub mod builder;
pub mod command;
pub mod config;
pub mod error;
mod primitives;
pub mod text;
pub mod texture;
pub mod vertex;

pub use backend::{replay, Backend, CommandLog, FrameStats, LoggedOp};
pub use builder::BatchBuilder;
pub use command::{
    Callback, ClipOp, CommandList, CommandScope, DrawCommand, RenderCommand, TransformOp,
    UNBOUNDED_CLIP,
};
pub use config::BatchConfig;
pub use error::{RenderError, Result, TextError};
pub use text::{FallbackFont, FontProvider, FontRequest, GlyphQuad, ShapedText};
pub use texture::{Filter, PixelFormat, Texture, TextureId};
pub use vertex::{CommandKind, Vertex, QUAD_VERTICES};
