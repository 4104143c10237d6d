//! Backend boundary
//!
//! A [`Backend`] executes a command list: it binds textures and submits
//! vertices for draws, and applies transform and scissor stack operations.
//! [`replay`] drives any backend through a list, expanding callbacks in
//! place and enforcing push/pop balance.
//!
//! [`CommandLog`] is a recording backend. It keeps the replayed operations
//! and per-frame statistics, which makes it useful both for debug logging
//! and for asserting command sequences in tests.

use weft_core::{Affine2D, Rect};

use crate::command::{ClipOp, CommandList, DrawCommand, RenderCommand, TransformOp};
use crate::texture::TextureId;
use crate::vertex::CommandKind;

/// Executor of render commands
pub trait Backend {
    /// Submit one sealed draw
    fn draw(&mut self, draw: &DrawCommand);

    /// Push a transform; `multiply` composes onto the current one
    fn push_transform(&mut self, matrix: &Affine2D, multiply: bool);

    fn pop_transform(&mut self);

    /// Push a scissor rect, already intersected and in global space
    fn push_clip(&mut self, rect: &Rect);

    fn pop_clip(&mut self);
}

/// Drive `backend` through `list`
///
/// # Panics
///
/// Panics when a pop has no matching push, or when pushes are left open at
/// the end of the list.
pub fn replay<B: Backend + ?Sized>(list: &CommandList, backend: &mut B) {
    let mut transforms = 0usize;
    let mut clips = 0usize;

    list.for_each_command(&mut |command| match command {
        RenderCommand::Draw(draw) => backend.draw(draw),
        RenderCommand::Transform { matrix, op } => match op {
            TransformOp::Push => {
                transforms += 1;
                backend.push_transform(matrix, false);
            }
            TransformOp::MultiplyPush => {
                transforms += 1;
                backend.push_transform(matrix, true);
            }
            TransformOp::Pop => {
                assert!(transforms > 0, "unbalanced transform pop during replay");
                transforms -= 1;
                backend.pop_transform();
            }
        },
        RenderCommand::Clip { rect, op } => match op {
            ClipOp::Push => {
                clips += 1;
                backend.push_clip(rect);
            }
            ClipOp::Pop => {
                assert!(clips > 0, "unbalanced clip pop during replay");
                clips -= 1;
                backend.pop_clip();
            }
        },
        // for_each_command expands callbacks before visiting
        RenderCommand::Callback(_) => {}
    });

    assert!(
        transforms == 0 && clips == 0,
        "replay finished with {transforms} transform(s) and {clips} clip(s) still pushed"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording backend
// ─────────────────────────────────────────────────────────────────────────────

/// One replayed backend operation
#[derive(Clone, Debug, PartialEq)]
pub enum LoggedOp {
    Draw {
        kind: CommandKind,
        vertex_count: usize,
        texture: Option<TextureId>,
    },
    PushTransform {
        matrix: Affine2D,
        multiply: bool,
    },
    PopTransform,
    PushClip(Rect),
    PopClip,
}

/// Per-frame counters gathered during replay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub vertices: usize,
    /// Texture binding changes between consecutive textured draws
    pub texture_binds: usize,
    pub max_transform_depth: usize,
    pub max_clip_depth: usize,
}

/// Backend that records what it is asked to do
#[derive(Debug)]
pub struct CommandLog {
    ops: Vec<LoggedOp>,
    stats: FrameStats,
    transforms: Vec<Affine2D>,
    clips: Vec<Rect>,
    bound: Option<TextureId>,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandLog {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            stats: FrameStats::default(),
            transforms: vec![Affine2D::IDENTITY],
            clips: Vec::new(),
            bound: None,
        }
    }

    /// Replay `list` into a fresh log
    pub fn capture(list: &CommandList) -> Self {
        let mut log = Self::new();
        replay(list, &mut log);
        log
    }

    pub fn ops(&self) -> &[LoggedOp] {
        &self.ops
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Composed transform at this point of the replay
    pub fn current_transform(&self) -> Affine2D {
        self.transforms.last().copied().unwrap_or(Affine2D::IDENTITY)
    }

    /// Active scissor rect at this point of the replay
    pub fn current_clip(&self) -> Option<Rect> {
        self.clips.last().copied()
    }

    /// Draws as `(kind, vertex_count)` pairs, in order
    pub fn draws(&self) -> Vec<(CommandKind, usize)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                LoggedOp::Draw {
                    kind, vertex_count, ..
                } => Some((*kind, *vertex_count)),
                _ => None,
            })
            .collect()
    }
}

impl Backend for CommandLog {
    fn draw(&mut self, draw: &DrawCommand) {
        let texture = draw.texture.as_ref().map(|t| t.id());
        if texture.is_some() && texture != self.bound {
            self.stats.texture_binds += 1;
            self.bound = texture;
        }
        self.stats.draw_calls += 1;
        self.stats.vertices += draw.vertex_count;
        self.ops.push(LoggedOp::Draw {
            kind: draw.kind,
            vertex_count: draw.vertex_count,
            texture,
        });
    }

    fn push_transform(&mut self, matrix: &Affine2D, multiply: bool) {
        let next = if multiply {
            self.current_transform().then(matrix)
        } else {
            *matrix
        };
        self.transforms.push(next);
        self.stats.max_transform_depth = self.stats.max_transform_depth.max(self.transforms.len() - 1);
        self.ops.push(LoggedOp::PushTransform {
            matrix: *matrix,
            multiply,
        });
    }

    fn pop_transform(&mut self) {
        if self.transforms.len() > 1 {
            self.transforms.pop();
        }
        self.ops.push(LoggedOp::PopTransform);
    }

    fn push_clip(&mut self, rect: &Rect) {
        self.clips.push(*rect);
        self.stats.max_clip_depth = self.stats.max_clip_depth.max(self.clips.len());
        self.ops.push(LoggedOp::PushClip(*rect));
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
        self.ops.push(LoggedOp::PopClip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BatchBuilder;
    use crate::command::Callback;
    use crate::texture::{PixelFormat, Texture};
    use std::cell::Cell;
    use std::rc::Rc;
    use weft_core::{Color, Point};

    #[test]
    fn test_replay_restores_transform() {
        let m1 = Affine2D::translation(10.0, 0.0);
        let m2 = Affine2D::rotation(0.25);
        let mut b = BatchBuilder::default();
        b.with_transform(m1, false, |b| {
            b.with_transform(m2, true, |b| {
                b.draw_rectangle(Rect::new(0.0, 0.0, 5.0, 5.0), Color::RED);
            });
        });
        let log = CommandLog::capture(&b.build());

        assert_eq!(
            log.ops()[..2],
            [
                LoggedOp::PushTransform {
                    matrix: m1,
                    multiply: false
                },
                LoggedOp::PushTransform {
                    matrix: m2,
                    multiply: true
                },
            ]
        );
        assert_eq!(log.current_transform(), Affine2D::IDENTITY);
        assert_eq!(log.stats().max_transform_depth, 2);
        assert_eq!(log.stats().draw_calls, 1);
    }

    #[test]
    fn test_texture_bind_counting() {
        let a = Texture::new(2, 2, PixelFormat::Rgba8, vec![0; 16]).unwrap();
        let c = Texture::new(2, 2, PixelFormat::Rgba8, vec![0; 16]).unwrap();
        let mut b = BatchBuilder::default();
        let r = Rect::new(0.0, 0.0, 4.0, 4.0);
        b.draw_image(r, Some(&a), Color::WHITE);
        b.draw_rectangle(r, Color::RED);
        b.draw_image(r, Some(&a), Color::WHITE);
        b.draw_image(r, Some(&c), Color::WHITE);
        let log = CommandLog::capture(&b.build());

        let stats = log.stats();
        assert_eq!(stats.draw_calls, 4);
        assert_eq!(stats.vertices, 24);
        assert_eq!(stats.texture_binds, 2);
    }

    #[test]
    fn test_callbacks_run_once_per_replay() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut b = BatchBuilder::default();
        b.run_action(move || {
            counter.set(counter.get() + 1);
            let mut inner = BatchBuilder::default();
            inner.with_clip(Rect::new(0.0, 0.0, 3.0, 3.0), |b| {
                b.draw_line(Point::ZERO, Point::new(3.0, 3.0), 1.0, Color::WHITE);
            });
            inner.build()
        });
        let list = b.build();

        let log = CommandLog::capture(&list);
        assert_eq!(calls.get(), 1);
        assert_eq!(log.stats().max_clip_depth, 1);
        assert_eq!(log.draws(), vec![(CommandKind::Solid, 6)]);

        CommandLog::capture(&list);
        assert_eq!(calls.get(), 2);
    }

    fn pushed_clips(log: &CommandLog) -> Vec<Rect> {
        log.ops()
            .iter()
            .filter_map(|op| match op {
                LoggedOp::PushClip(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    /// Thunk whose list clips to `clip` in its own space
    fn clipped_action(clip: Rect) -> impl Fn() -> CommandList {
        move || {
            let mut inner = BatchBuilder::default();
            inner.with_clip(clip, |b| {
                b.draw_rectangle(Rect::new(0.0, 0.0, 5.0, 5.0), Color::WHITE);
            });
            inner.build()
        }
    }

    #[test]
    fn test_callback_clip_follows_transform() {
        let clip = Rect::new(0.0, 0.0, 5.0, 5.0);
        let mut b = BatchBuilder::default();
        b.with_transform(Affine2D::translation(100.0, 100.0), true, |b| {
            b.with_clip(clip, |b| {
                b.draw_rectangle(clip, Color::RED);
            });
            b.run_action(clipped_action(clip));
        });
        let log = CommandLog::capture(&b.build());

        // Direct and deferred clips land in the same place
        assert_eq!(
            pushed_clips(&log),
            vec![
                Rect::new(100.0, 100.0, 5.0, 5.0),
                Rect::new(100.0, 100.0, 5.0, 5.0)
            ]
        );
        assert_eq!(log.current_clip(), None);
    }

    #[test]
    fn test_callback_clip_only_shrinks() {
        let mut b = BatchBuilder::default();
        b.with_clip(Rect::new(0.0, 0.0, 10.0, 10.0), |b| {
            b.with_transform(Affine2D::translation(100.0, 100.0), true, |b| {
                b.run_action(clipped_action(Rect::new(0.0, 0.0, 5.0, 5.0)));
            });
        });
        let log = CommandLog::capture(&b.build());

        // Disjoint from the outer clip: empty at its origin
        assert_eq!(
            pushed_clips(&log),
            vec![Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 0.0, 0.0, 0.0)]
        );
        assert_eq!(log.stats().max_clip_depth, 2);
    }

    #[test]
    fn test_nested_callback_scopes_compose() {
        let mut b = BatchBuilder::default();
        b.with_transform(Affine2D::translation(10.0, 0.0), true, |b| {
            b.run_action(|| {
                let mut middle = BatchBuilder::default();
                middle.with_transform(Affine2D::translation(5.0, 0.0), true, |b| {
                    b.run_action(clipped_action(Rect::new(0.0, 0.0, 2.0, 2.0)));
                });
                middle.build()
            });
        });
        let log = CommandLog::capture(&b.build());

        assert_eq!(pushed_clips(&log), vec![Rect::new(15.0, 0.0, 2.0, 2.0)]);
        assert_eq!(log.stats().max_transform_depth, 2);
        assert_eq!(log.current_transform(), Affine2D::IDENTITY);
    }

    #[test]
    #[should_panic(expected = "unbalanced clip pop")]
    fn test_replay_rejects_unbalanced_list() {
        let list = CommandList::new(vec![RenderCommand::Clip {
            rect: Rect::ZERO,
            op: ClipOp::Pop,
        }]);
        CommandLog::capture(&list);
    }

    #[test]
    #[should_panic(expected = "still pushed")]
    fn test_replay_rejects_open_push() {
        let list = CommandList::new(vec![RenderCommand::Callback(Callback::new(|| {
            CommandList::new(vec![RenderCommand::Transform {
                matrix: Affine2D::scale(2.0, 2.0),
                op: TransformOp::Push,
            }])
        }))]);
        CommandLog::capture(&list);
    }
}
