//! Render Batch Builder
//!
//! Accumulates vertices for "the current draw" and decides where draws are
//! split. A draw is sealed (flushed) whenever:
//!
//! - the bound texture or [`CommandKind`] changes while vertices are pending
//! - a transform or clip is pushed or popped
//! - the next append would exceed the per-draw vertex limit
//! - a callback or a pre-built list is enqueued
//! - [`BatchBuilder::build`] is called
//!
//! Vertices are kept in the coordinate space of the transform active when
//! they were pushed. Transforms and clips travel as explicit commands, so a
//! stateless backend can replay the list and cached sub-lists stay valid when
//! their owner moves.
//!
//! # Example
//!
//! ```rust
//! use weft_core::{Affine2D, Color, Rect};
//! use weft_render::{BatchBuilder, BatchConfig};
//!
//! let mut builder = BatchBuilder::new(BatchConfig::default());
//! builder.with_transform(Affine2D::translation(10.0, 10.0), true, |b| {
//!     b.draw_rectangle(Rect::new(0.0, 0.0, 50.0, 20.0), Color::BLUE);
//! });
//! let list = builder.build();
//! assert_eq!(list.len(), 3); // push, draw, pop
//! ```

use weft_core::{Affine2D, Rect};

use crate::command::{
    Callback, ClipOp, CommandList, CommandScope, DrawCommand, RenderCommand, TransformOp,
    UNBOUNDED_CLIP,
};
use crate::config::BatchConfig;
use crate::texture::{self, Texture};
use crate::vertex::{CommandKind, Vertex, QUAD_VERTICES};

/// Per-element tolerance below which a multiply push is treated as identity
const IDENTITY_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug)]
struct TransformEntry {
    previous: Affine2D,
    emitted: bool,
}

/// Vertex accumulator with transform and clip stacks
#[derive(Debug)]
pub struct BatchBuilder {
    config: BatchConfig,
    vertex_limit: usize,

    /// Sealed commands of the list under construction
    commands: Vec<RenderCommand>,
    /// Open draw
    vertices: Vec<Vertex>,
    kind: CommandKind,
    texture: Option<Texture>,

    transform: Affine2D,
    transform_stack: Vec<TransformEntry>,
    /// Active clip in global space, `None` when unclipped
    clip: Option<Rect>,
    clip_stack: Vec<Option<Rect>>,

    vertex_total: usize,
}

impl Default for BatchBuilder {
    fn default() -> Self {
        Self::new(BatchConfig::default())
    }
}

impl BatchBuilder {
    pub fn new(config: BatchConfig) -> Self {
        let vertex_limit = config.vertex_limit();
        Self {
            config,
            vertex_limit,
            commands: Vec::new(),
            vertices: Vec::new(),
            kind: CommandKind::Solid,
            texture: None,
            transform: Affine2D::IDENTITY,
            transform_stack: Vec::new(),
            clip: None,
            clip_stack: Vec::new(),
            vertex_total: 0,
        }
    }

    /// A fresh builder sharing this one's configuration
    pub fn fork(&self) -> Self {
        Self::new(self.config.clone())
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Vertex accumulation
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a single vertex to the open draw
    pub fn push(&mut self, vertex: Vertex) {
        self.reserve(1);
        self.vertices.push(vertex);
    }

    /// Append one triangle
    pub fn push3(&mut self, a: Vertex, b: Vertex, c: Vertex) {
        self.reserve(3);
        self.vertices.extend_from_slice(&[a, b, c]);
    }

    /// Append a quad as two triangles `(tl, tr, br), (tl, br, bl)`
    pub fn push_quad(&mut self, tl: Vertex, tr: Vertex, br: Vertex, bl: Vertex) {
        self.reserve(QUAD_VERTICES);
        self.vertices.extend_from_slice(&[tl, tr, br, tl, br, bl]);
    }

    /// Make room for `count` vertices in the open draw.
    ///
    /// When the draw would grow past the limit it is sealed and a new one is
    /// opened with the same kind and texture, so a primitive is never split
    /// across draws.
    fn reserve(&mut self, count: usize) {
        if self.vertices.is_empty() || self.vertices.len() + count <= self.vertex_limit {
            return;
        }
        let kind = self.kind;
        let texture = self.texture.clone();
        tracing::trace!(
            pending = self.vertices.len(),
            limit = self.vertex_limit,
            "vertex limit reached, splitting draw"
        );
        self.flush();
        self.kind = kind;
        self.texture = texture;
    }

    /// Bind pipeline kind and texture for subsequent vertices.
    ///
    /// Flushes first when vertices are pending under a different state.
    pub fn bind_state(&mut self, kind: CommandKind, texture: Option<&Texture>) {
        let same = kind == self.kind && texture::same_binding(texture, self.texture.as_ref());
        if same {
            return;
        }
        if !self.vertices.is_empty() {
            self.flush();
        }
        self.kind = kind;
        self.texture = texture.cloned();
    }

    /// Change the command kind, keeping the bound texture
    pub fn set_command_kind(&mut self, kind: CommandKind) {
        let texture = self.texture.clone();
        self.bind_state(kind, texture.as_ref());
    }

    /// Change the bound texture, keeping the command kind
    pub fn set_texture(&mut self, texture: Option<Texture>) {
        self.bind_state(self.kind, texture.as_ref());
    }

    pub fn command_kind(&self) -> CommandKind {
        self.kind
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Seal pending vertices into a draw command.
    ///
    /// Always resets the bound texture to none and the kind to `Solid`.
    pub fn flush(&mut self) {
        if !self.vertices.is_empty() {
            let vertices = std::mem::take(&mut self.vertices);
            let vertex_count = vertices.len();
            self.vertex_total += vertex_count;
            self.commands.push(RenderCommand::Draw(DrawCommand {
                kind: self.kind,
                vertices,
                vertex_count,
                texture: self.texture.take(),
            }));
        }
        self.texture = None;
        self.kind = CommandKind::Solid;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transform stack
    // ─────────────────────────────────────────────────────────────────────────

    /// Push a transform.
    ///
    /// With `multiply` the matrix composes onto the current transform
    /// (`current.then(matrix)`); otherwise it replaces it. A multiply push of
    /// a near-identity matrix emits nothing and its pop emits nothing either.
    pub fn push_transform(&mut self, matrix: Affine2D, multiply: bool) {
        if multiply && matrix.approx_identity(IDENTITY_EPSILON) {
            self.transform_stack.push(TransformEntry {
                previous: self.transform,
                emitted: false,
            });
            return;
        }

        self.flush();
        let previous = self.transform;
        let op = if multiply {
            self.transform = previous.then(&matrix);
            TransformOp::MultiplyPush
        } else {
            self.transform = matrix;
            TransformOp::Push
        };
        self.transform_stack.push(TransformEntry {
            previous,
            emitted: true,
        });
        self.commands.push(RenderCommand::Transform { matrix, op });
    }

    /// Pop the most recent transform
    ///
    /// # Panics
    ///
    /// Panics when the transform stack is empty.
    pub fn pop_transform(&mut self) {
        if !self.try_pop_transform() {
            panic!("pop_transform called on an empty transform stack");
        }
    }

    fn try_pop_transform(&mut self) -> bool {
        let Some(entry) = self.transform_stack.pop() else {
            return false;
        };
        if entry.emitted {
            self.flush();
            self.commands.push(RenderCommand::Transform {
                matrix: entry.previous,
                op: TransformOp::Pop,
            });
        }
        self.transform = entry.previous;
        true
    }

    /// Run `f` inside a transform scope; the pop runs on every exit path
    pub fn with_transform<R>(
        &mut self,
        matrix: Affine2D,
        multiply: bool,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.push_transform(matrix, multiply);
        let scope = TransformScope { builder: self };
        f(&mut *scope.builder)
    }

    /// Composed transform as of the last push or pop
    pub fn current_transform(&self) -> Affine2D {
        self.transform
    }

    pub fn transform_depth(&self) -> usize {
        self.transform_stack.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clip stack
    // ─────────────────────────────────────────────────────────────────────────

    /// Push a clip given in local coordinates.
    ///
    /// The rect is mapped to global space and intersected with the active
    /// clip, so nested clips only ever shrink. Disjoint clips collapse to an
    /// empty rect at the parent clip's origin.
    pub fn push_clip(&mut self, rect: Rect) {
        self.flush();
        let global = self.transform.transform_rect(&rect);
        let clipped = self.intersect_clip(global);
        self.clip_stack.push(self.clip);
        self.clip = Some(clipped);
        self.commands.push(RenderCommand::Clip {
            rect: clipped,
            op: ClipOp::Push,
        });
    }

    /// Pop the most recent clip
    ///
    /// # Panics
    ///
    /// Panics when the clip stack is empty.
    pub fn pop_clip(&mut self) {
        if !self.try_pop_clip() {
            panic!("pop_clip called on an empty clip stack");
        }
    }

    fn try_pop_clip(&mut self) -> bool {
        let Some(previous) = self.clip_stack.pop() else {
            return false;
        };
        self.flush();
        self.clip = previous;
        self.commands.push(RenderCommand::Clip {
            rect: previous.unwrap_or(UNBOUNDED_CLIP),
            op: ClipOp::Pop,
        });
        true
    }

    /// Run `f` inside a clip scope; the pop runs on every exit path
    pub fn with_clip<R>(&mut self, rect: Rect, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push_clip(rect);
        let scope = ClipScope { builder: self };
        f(&mut *scope.builder)
    }

    /// Active clip in global space, `None` when nothing is clipped
    pub fn current_clip(&self) -> Option<Rect> {
        self.clip
    }

    pub fn clip_depth(&self) -> usize {
        self.clip_stack.len()
    }

    fn intersect_clip(&self, global: Rect) -> Rect {
        self.scope().clip_within(global)
    }

    /// Current transform and clip, as recorded into callbacks
    pub fn scope(&self) -> CommandScope {
        CommandScope {
            transform: self.transform,
            clip: self.clip,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deferred and pre-built content
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a callback that produces a sub-list when the backend runs it.
    ///
    /// The sub-list is built in its own space; the current transform and
    /// clip are recorded so its clips land where the callback was issued.
    pub fn run_action(&mut self, thunk: impl Fn() -> CommandList + 'static) {
        self.flush();
        let scope = self.scope();
        self.commands
            .push(RenderCommand::Callback(Callback::scoped(thunk, scope)));
    }

    /// Inline a finished command list under the current transform and clip.
    ///
    /// Vertices and multiply pushes are copied as-is; everything else is
    /// rebased with [`CommandScope::rebase`].
    pub fn enqueue_commands(&mut self, list: &CommandList) {
        if list.is_empty() {
            return;
        }
        self.flush();
        let scope = self.scope();
        for command in list.iter() {
            if let RenderCommand::Draw(draw) = command {
                self.vertex_total += draw.vertex_count;
            }
            self.commands.push(scope.rebase(command).into_owned());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Finalization
    // ─────────────────────────────────────────────────────────────────────────

    /// Flush, hand out the finished list and reset for reuse
    ///
    /// # Panics
    ///
    /// Panics when a transform or clip scope is still open.
    pub fn build(&mut self) -> CommandList {
        self.flush();
        assert!(
            self.transform_stack.is_empty(),
            "build() called with {} open transform scope(s)",
            self.transform_stack.len()
        );
        assert!(
            self.clip_stack.is_empty(),
            "build() called with {} open clip scope(s)",
            self.clip_stack.len()
        );

        let list = CommandList::new(std::mem::take(&mut self.commands));
        tracing::trace!(
            commands = list.len(),
            vertices = self.vertex_total,
            "command list built"
        );
        self.reset();
        list
    }

    /// Discard everything, including open scopes
    pub fn reset(&mut self) {
        self.commands.clear();
        self.vertices.clear();
        self.kind = CommandKind::Solid;
        self.texture = None;
        self.transform = Affine2D::IDENTITY;
        self.transform_stack.clear();
        self.clip = None;
        self.clip_stack.clear();
        self.vertex_total = 0;
    }

    /// Vertices in the open draw
    pub fn pending_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Vertices sealed into draws since the last build
    pub fn vertex_total(&self) -> usize {
        self.vertex_total
    }

    /// Sealed commands since the last build
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope guards
// ─────────────────────────────────────────────────────────────────────────────

struct TransformScope<'a> {
    builder: &'a mut BatchBuilder,
}

impl Drop for TransformScope<'_> {
    fn drop(&mut self) {
        if !self.builder.try_pop_transform() && !std::thread::panicking() {
            panic!("transform scope closed after its transform was already popped");
        }
    }
}

struct ClipScope<'a> {
    builder: &'a mut BatchBuilder,
}

impl Drop for ClipScope<'_> {
    fn drop(&mut self) {
        if !self.builder.try_pop_clip() && !std::thread::panicking() {
            panic!("clip scope closed after its clip was already popped");
        }
    }
}
