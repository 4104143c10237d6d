//! Render commands and command lists
//!
//! A [`CommandList`] is the only output of the batch builder: an ordered,
//! immutable sequence of draws interleaved with transform/clip stack
//! operations and deferred callbacks. Lists are reference counted, so a
//! node can keep its visuals list across frames and a parent can inline it
//! without copying vertices.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use weft_core::{Affine2D, Rect, Size};

use crate::texture::Texture;
use crate::vertex::{CommandKind, Vertex};

/// Clip rect meaning "nothing clipped"
///
/// Finite so intersections never produce NaN.
pub const UNBOUNDED_CLIP: Rect = Rect::new(-1.0e7, -1.0e7, 2.0e7, 2.0e7);

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// A sealed run of vertices sharing one pipeline state
#[derive(Clone, Debug)]
pub struct DrawCommand {
    pub kind: CommandKind,
    pub vertices: Vec<Vertex>,
    pub vertex_count: usize,
    pub texture: Option<Texture>,
}

/// Transform stack operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformOp {
    /// Replace the current transform
    Push,
    /// Compose onto the current transform (`current.then(matrix)`)
    MultiplyPush,
    /// Restore the previous transform; the command carries the restored matrix
    Pop,
}

/// Clip stack operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipOp {
    /// Rect is already intersected with the parent clip, in global space
    Push,
    /// Restore; the command carries the restored clip
    Pop,
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope
// ─────────────────────────────────────────────────────────────────────────────

/// Transform and clip active at one point of a list
///
/// A list built on its own starts from [`CommandScope::ROOT`]. When it is
/// inlined or expanded somewhere else, its clips and restore matrices are
/// rebased onto the scope of that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CommandScope {
    pub transform: Affine2D,
    /// Active clip in global space, `None` when nothing is clipped
    pub clip: Option<Rect>,
}

impl Default for CommandScope {
    fn default() -> Self {
        Self::ROOT
    }
}

impl CommandScope {
    pub const ROOT: Self = Self {
        transform: Affine2D::IDENTITY,
        clip: None,
    };

    pub fn is_root(&self) -> bool {
        self.clip.is_none() && self.transform.is_identity()
    }

    /// Intersect a global rect with this scope's clip.
    ///
    /// Disjoint rects collapse to an empty rect at the clip's origin.
    pub fn clip_within(&self, global: Rect) -> Rect {
        match self.clip {
            Some(parent) => parent
                .intersection(&global)
                .unwrap_or_else(|| Rect::from_origin_size(parent.origin, Size::ZERO)),
            None => global,
        }
    }

    /// Map a clip rect from a sub-list's space into this scope
    fn rebase_clip(&self, rect: &Rect) -> Rect {
        if *rect == UNBOUNDED_CLIP {
            self.clip.unwrap_or(UNBOUNDED_CLIP)
        } else {
            self.clip_within(self.transform.transform_rect(rect))
        }
    }

    /// Scope of `inner`, recorded in a sub-list, once the sub-list is placed here
    pub fn compose(&self, inner: &CommandScope) -> CommandScope {
        CommandScope {
            transform: self.transform.then(&inner.transform),
            clip: match inner.clip {
                Some(clip) => Some(self.rebase_clip(&clip)),
                None => self.clip,
            },
        }
    }

    /// Rewrite a command from a sub-list so it holds under this scope.
    ///
    /// Draws and multiply pushes are relative already and pass through.
    /// Replacing pushes and pop matrices compose onto the scope transform;
    /// clip rects are mapped to global space and intersected with the scope
    /// clip, so nested clips only shrink.
    pub fn rebase<'c>(&self, command: &'c RenderCommand) -> Cow<'c, RenderCommand> {
        if self.is_root() {
            return Cow::Borrowed(command);
        }
        match command {
            RenderCommand::Transform {
                matrix,
                op: op @ (TransformOp::Push | TransformOp::Pop),
            } => Cow::Owned(RenderCommand::Transform {
                matrix: self.transform.then(matrix),
                op: *op,
            }),
            RenderCommand::Clip { rect, op } => Cow::Owned(RenderCommand::Clip {
                rect: self.rebase_clip(rect),
                op: *op,
            }),
            RenderCommand::Callback(callback) => {
                Cow::Owned(RenderCommand::Callback(callback.rebased(self)))
            }
            other => Cow::Borrowed(other),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Callbacks
// ─────────────────────────────────────────────────────────────────────────────

/// Thunk producing a sub-list when the backend executes it
pub type CallbackFn = dyn Fn() -> CommandList;

/// Deferred sub-batch
///
/// Carries the scope it was recorded under; the produced sub-list is
/// rebased onto it on expansion.
#[derive(Clone)]
pub struct Callback {
    thunk: Rc<CallbackFn>,
    scope: CommandScope,
}

impl Callback {
    /// Callback recorded at the root of a list
    pub fn new(f: impl Fn() -> CommandList + 'static) -> Self {
        Self::scoped(f, CommandScope::ROOT)
    }

    pub fn scoped(f: impl Fn() -> CommandList + 'static, scope: CommandScope) -> Self {
        Self {
            thunk: Rc::new(f),
            scope,
        }
    }

    pub fn scope(&self) -> CommandScope {
        self.scope
    }

    /// Run the thunk; the result is in the thunk's own space
    pub fn invoke(&self) -> CommandList {
        (self.thunk)()
    }

    fn rebased(&self, parent: &CommandScope) -> Self {
        Self {
            thunk: Rc::clone(&self.thunk),
            scope: parent.compose(&self.scope),
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// A single render command
#[derive(Clone, Debug)]
pub enum RenderCommand {
    Draw(DrawCommand),
    Transform { matrix: Affine2D, op: TransformOp },
    Clip { rect: Rect, op: ClipOp },
    Callback(Callback),
}

impl RenderCommand {
    pub fn is_push(&self) -> bool {
        matches!(
            self,
            RenderCommand::Transform {
                op: TransformOp::Push | TransformOp::MultiplyPush,
                ..
            } | RenderCommand::Clip {
                op: ClipOp::Push,
                ..
            }
        )
    }

    pub fn is_pop(&self) -> bool {
        matches!(
            self,
            RenderCommand::Transform {
                op: TransformOp::Pop,
                ..
            } | RenderCommand::Clip {
                op: ClipOp::Pop,
                ..
            }
        )
    }

    pub fn as_draw(&self) -> Option<&DrawCommand> {
        match self {
            RenderCommand::Draw(draw) => Some(draw),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command list
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable, cheaply clonable sequence of render commands
#[derive(Clone)]
pub struct CommandList {
    commands: Rc<[RenderCommand]>,
}

impl CommandList {
    pub fn new(commands: Vec<RenderCommand>) -> Self {
        Self {
            commands: commands.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderCommand> {
        self.commands.iter()
    }

    pub fn as_slice(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Draw commands at this level (callbacks not expanded)
    pub fn draws(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter_map(RenderCommand::as_draw)
    }

    /// Total vertices at this level (callbacks not expanded)
    pub fn vertex_count(&self) -> usize {
        self.draws().map(|d| d.vertex_count).sum()
    }

    /// Visit every command in order, expanding callbacks in place.
    ///
    /// Each callback is invoked exactly once per traversal; the callback
    /// command itself is not passed to the visitor, only its expansion,
    /// rebased onto the scope the callback was recorded under.
    pub fn for_each_command(&self, visitor: &mut dyn FnMut(&RenderCommand)) {
        for command in self.commands.iter() {
            match command {
                RenderCommand::Callback(callback) => {
                    let scope = callback.scope();
                    callback
                        .invoke()
                        .for_each_command(&mut |inner| visitor(&scope.rebase(inner)));
                }
                other => visitor(other),
            }
        }
    }

    /// Whether both handles point at the same underlying list
    pub fn ptr_eq(&self, other: &CommandList) -> bool {
        Rc::ptr_eq(&self.commands, &other.commands)
    }
}

impl Default for CommandList {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for CommandList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.commands.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a CommandList {
    type Item = &'a RenderCommand;
    type IntoIter = std::slice::Iter<'a, RenderCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<RenderCommand> for CommandList {
    fn from_iter<I: IntoIterator<Item = RenderCommand>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use weft_core::{Color, Point};

    fn draw(n: usize) -> RenderCommand {
        RenderCommand::Draw(DrawCommand {
            kind: CommandKind::Solid,
            vertices: vec![Vertex::solid(Point::ZERO, Color::WHITE); n],
            vertex_count: n,
            texture: None,
        })
    }

    #[test]
    fn test_for_each_flattens_callbacks_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let inner = CommandList::new(vec![draw(3), draw(6)]);
        let list = CommandList::new(vec![
            draw(6),
            RenderCommand::Callback(Callback::new(move || {
                counter.set(counter.get() + 1);
                inner.clone()
            })),
            draw(3),
        ]);

        let mut seen = Vec::new();
        list.for_each_command(&mut |cmd| {
            if let RenderCommand::Draw(d) = cmd {
                seen.push(d.vertex_count);
            }
        });
        assert_eq!(seen, vec![6, 3, 6, 3]);
        assert_eq!(calls.get(), 1);

        // Non-expanding count ignores the callback
        assert_eq!(list.vertex_count(), 9);
    }

    #[test]
    fn test_nested_callbacks_flatten() {
        let leaf = CommandList::new(vec![draw(3)]);
        let middle = CommandList::new(vec![RenderCommand::Callback(Callback::new(move || {
            leaf.clone()
        }))]);
        let outer = CommandList::new(vec![RenderCommand::Callback(Callback::new(move || {
            middle.clone()
        }))]);

        let mut draws = 0;
        outer.for_each_command(&mut |cmd| {
            assert!(!matches!(cmd, RenderCommand::Callback(_)));
            draws += 1;
        });
        assert_eq!(draws, 1);
    }

    #[test]
    fn test_scope_rebase() {
        let scope = CommandScope {
            transform: Affine2D::translation(10.0, 10.0),
            clip: Some(Rect::new(0.0, 0.0, 14.0, 14.0)),
        };
        let push = RenderCommand::Clip {
            rect: Rect::new(0.0, 0.0, 8.0, 8.0),
            op: ClipOp::Push,
        };
        let RenderCommand::Clip { rect, .. } = scope.rebase(&push).into_owned() else {
            panic!("clip expected");
        };
        assert_eq!(rect, Rect::new(10.0, 10.0, 4.0, 4.0));

        // Restoring to "unclipped" in the sub-list restores the scope clip
        let pop = RenderCommand::Clip {
            rect: UNBOUNDED_CLIP,
            op: ClipOp::Pop,
        };
        let RenderCommand::Clip { rect, .. } = scope.rebase(&pop).into_owned() else {
            panic!("clip expected");
        };
        assert_eq!(rect, Rect::new(0.0, 0.0, 14.0, 14.0));

        // Relative commands pass through untouched
        assert!(matches!(scope.rebase(&draw(3)), Cow::Borrowed(_)));
        assert!(matches!(
            CommandScope::ROOT.rebase(&push),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_scope_compose() {
        let outer = CommandScope {
            transform: Affine2D::translation(10.0, 0.0),
            clip: Some(Rect::new(0.0, 0.0, 12.0, 12.0)),
        };
        let inner = CommandScope {
            transform: Affine2D::translation(0.0, 5.0),
            clip: Some(Rect::new(0.0, 0.0, 4.0, 4.0)),
        };
        let composed = outer.compose(&inner);
        assert_eq!(composed.transform, Affine2D::translation(10.0, 5.0));
        assert_eq!(composed.clip, Some(Rect::new(10.0, 0.0, 2.0, 4.0)));

        let unclipped = CommandScope {
            clip: None,
            ..inner
        };
        assert_eq!(outer.compose(&unclipped).clip, outer.clip);
    }

    #[test]
    fn test_push_pop_classification() {
        let push = RenderCommand::Transform {
            matrix: Affine2D::IDENTITY,
            op: TransformOp::MultiplyPush,
        };
        let pop = RenderCommand::Clip {
            rect: UNBOUNDED_CLIP,
            op: ClipOp::Pop,
        };
        assert!(push.is_push() && !push.is_pop());
        assert!(pop.is_pop() && !pop.is_push());
        assert!(!draw(3).is_push());
    }
}
