//! Primitive tessellation
//!
//! CPU tessellation of the shapes widgets draw: rectangles, rounded
//! rectangles, lines, bezier curves, images and text. Every helper binds the
//! state it needs before pushing, so switching between solid shapes, images
//! and glyph runs flushes automatically.
//!
//! Geometry is pushed in the builder's current local space.

use std::f32::consts::{FRAC_PI_2, PI};

use lyon::geom::{CubicBezierSegment, QuadraticBezierSegment};
use lyon::lyon_tessellation::{
    BuffersBuilder, LineJoin, StrokeOptions, StrokeTessellator, StrokeVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::Path;
use smallvec::SmallVec;
use weft_core::{Color, CornerRadius, Point, Rect, Size, Thickness};

use crate::builder::BatchBuilder;
use crate::text::{FallbackFont, FontProvider, FontRequest};
use crate::texture::Texture;
use crate::vertex::{CommandKind, Vertex};

type Perimeter = SmallVec<[Point; 64]>;

impl BatchBuilder {
    // ─────────────────────────────────────────────────────────────────────────
    // Rectangles
    // ─────────────────────────────────────────────────────────────────────────

    /// Solid axis-aligned rectangle
    pub fn draw_rectangle(&mut self, rect: Rect, color: Color) {
        if rect.size.is_empty() {
            return;
        }
        self.bind_state(CommandKind::Solid, None);
        let [tl, tr, br, bl] = corners(&rect);
        self.push_quad(
            Vertex::solid(tl, color),
            Vertex::solid(tr, color),
            Vertex::solid(br, color),
            Vertex::solid(bl, color),
        );
    }

    /// Border drawn inside `rect` as four quads
    pub fn draw_rectangle_outline(&mut self, rect: Rect, thickness: &Thickness, color: Color) {
        let t = thickness.clamp_non_negative();
        let top = t.top.min(rect.height());
        let bottom = t.bottom.min(rect.height() - top);
        let left = t.left.min(rect.width());
        let right = t.right.min(rect.width() - left);
        let middle = (rect.height() - top - bottom).max(0.0);

        self.draw_rectangle(Rect::new(rect.x(), rect.y(), rect.width(), top), color);
        self.draw_rectangle(
            Rect::new(rect.x(), rect.bottom() - bottom, rect.width(), bottom),
            color,
        );
        self.draw_rectangle(Rect::new(rect.x(), rect.y() + top, left, middle), color);
        self.draw_rectangle(
            Rect::new(rect.right() - right, rect.y() + top, right, middle),
            color,
        );
    }

    /// Filled rounded rectangle, fan-tessellated from the center
    pub fn draw_rounded_rectangle(&mut self, rect: Rect, radii: CornerRadius, color: Color) {
        if rect.size.is_empty() {
            return;
        }
        let radii = radii.fit(rect.size);
        if radii.is_zero() {
            self.draw_rectangle(rect, color);
            return;
        }

        let mut points = rounded_perimeter(&rect, &radii, self.config().corner_segments);
        points.dedup_by(|a, b| a.distance(*b) <= f32::EPSILON);
        if points.len() > 1 && points[0].distance(points[points.len() - 1]) <= f32::EPSILON {
            points.pop();
        }

        self.bind_state(CommandKind::Solid, None);
        let center = Vertex::solid(rect.center(), color);
        for i in 0..points.len() {
            let next = (i + 1) % points.len();
            self.push3(
                center,
                Vertex::solid(points[i], color),
                Vertex::solid(points[next], color),
            );
        }
    }

    /// Rounded border ring inside `rect`
    pub fn draw_rounded_outline(
        &mut self,
        rect: Rect,
        radii: CornerRadius,
        thickness: &Thickness,
        color: Color,
    ) {
        if rect.size.is_empty() || thickness.is_zero() {
            return;
        }
        let outer_radii = radii.fit(rect.size);
        if outer_radii.is_zero() {
            self.draw_rectangle_outline(rect, thickness, color);
            return;
        }

        let t = thickness.clamp_non_negative();
        let inner = rect.deflate(&t);
        let inner_radii = CornerRadius::new(
            (outer_radii.top_left - t.left.max(t.top)).max(0.0),
            (outer_radii.top_right - t.right.max(t.top)).max(0.0),
            (outer_radii.bottom_right - t.right.max(t.bottom)).max(0.0),
            (outer_radii.bottom_left - t.left.max(t.bottom)).max(0.0),
        )
        .fit(inner.size);

        let segments = self.config().corner_segments;
        let outer = rounded_perimeter(&rect, &outer_radii, segments);
        let inner = rounded_perimeter(&inner, &inner_radii, segments);

        self.bind_state(CommandKind::Solid, None);
        for i in 0..outer.len() {
            let next = (i + 1) % outer.len();
            self.push_quad(
                Vertex::solid(outer[i], color),
                Vertex::solid(outer[next], color),
                Vertex::solid(inner[next], color),
                Vertex::solid(inner[i], color),
            );
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lines and curves
    // ─────────────────────────────────────────────────────────────────────────

    /// Straight segment as a quad along the segment normal
    pub fn draw_line(&mut self, from: Point, to: Point, width: f32, color: Color) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON || !(width > 0.0) || !len.is_finite() {
            return;
        }
        let half = width / 2.0;
        let nx = -dy / len * half;
        let ny = dx / len * half;

        self.bind_state(CommandKind::Solid, None);
        self.push_quad(
            Vertex::solid(from.offset(nx, ny), color),
            Vertex::solid(to.offset(nx, ny), color),
            Vertex::solid(to.offset(-nx, -ny), color),
            Vertex::solid(from.offset(-nx, -ny), color),
        );
    }

    /// Open polyline stroked with mitered joins
    pub fn draw_polyline(&mut self, points: &[Point], width: f32, color: Color) {
        if points.len() < 2 || !(width > 0.0) {
            return;
        }
        if points.len() == 2 {
            self.draw_line(points[0], points[1], width, color);
            return;
        }

        let mut path = Path::builder();
        path.begin(point(points[0].x, points[0].y));
        for p in &points[1..] {
            path.line_to(point(p.x, p.y));
        }
        path.end(false);
        let path = path.build();

        let options = StrokeOptions::default()
            .with_line_width(width)
            .with_line_join(LineJoin::Miter)
            .with_tolerance(self.config().effective_tolerance());

        let mut geometry: VertexBuffers<lyon::math::Point, u32> = VertexBuffers::new();
        let result = StrokeTessellator::new().tessellate_path(
            &path,
            &options,
            &mut BuffersBuilder::new(&mut geometry, |vertex: StrokeVertex| vertex.position()),
        );
        if let Err(err) = result {
            tracing::warn!("Polyline stroke tessellation failed: {:?}", err);
            return;
        }

        self.bind_state(CommandKind::Solid, None);
        let vertex = |i: u32| {
            let p = geometry.vertices[i as usize];
            Vertex::solid(Point::new(p.x, p.y), color)
        };
        for tri in geometry.indices.chunks_exact(3) {
            self.push3(vertex(tri[0]), vertex(tri[1]), vertex(tri[2]));
        }
    }

    /// Quadratic bezier, flattened then stroked
    pub fn draw_bezier_quadratic(
        &mut self,
        from: Point,
        ctrl: Point,
        to: Point,
        width: f32,
        color: Color,
    ) {
        let curve = QuadraticBezierSegment {
            from: point(from.x, from.y),
            ctrl: point(ctrl.x, ctrl.y),
            to: point(to.x, to.y),
        };
        let mut points = vec![from];
        points.extend(
            curve
                .flattened(self.config().effective_tolerance())
                .map(|p| Point::new(p.x, p.y)),
        );
        self.draw_polyline(&points, width, color);
    }

    /// Cubic bezier, flattened then stroked
    pub fn draw_bezier_cubic(
        &mut self,
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
        width: f32,
        color: Color,
    ) {
        let curve = CubicBezierSegment {
            from: point(from.x, from.y),
            ctrl1: point(ctrl1.x, ctrl1.y),
            ctrl2: point(ctrl2.x, ctrl2.y),
            to: point(to.x, to.y),
        };
        let mut points = vec![from];
        points.extend(
            curve
                .flattened(self.config().effective_tolerance())
                .map(|p| Point::new(p.x, p.y)),
        );
        self.draw_polyline(&points, width, color);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Images and text
    // ─────────────────────────────────────────────────────────────────────────

    /// Textured quad covering `rect`; a missing texture draws a magenta quad
    pub fn draw_image(&mut self, rect: Rect, texture: Option<&Texture>, tint: Color) {
        let Some(texture) = texture else {
            tracing::warn!(?rect, "drawing image without a texture, using fallback");
            self.draw_rectangle(rect, Color::MISSING);
            return;
        };
        if rect.size.is_empty() {
            return;
        }

        self.bind_state(CommandKind::Textured, Some(texture));
        let uv = corners(&texture.uv_region());
        let pos = corners(&rect);
        self.push_quad(
            Vertex::new(pos[0], tint, uv[0]),
            Vertex::new(pos[1], tint, uv[1]),
            Vertex::new(pos[2], tint, uv[2]),
            Vertex::new(pos[3], tint, uv[3]),
        );
    }

    /// Shape `text` and push its glyph quads with the top-left at `origin`.
    ///
    /// Falls back to [`FallbackFont`] when the provider fails. Returns the
    /// laid-out size.
    pub fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &FontRequest,
        color: Color,
        fonts: &dyn FontProvider,
    ) -> Size {
        let shaped = match fonts.shape(text, font) {
            Ok(shaped) => shaped,
            Err(err) => {
                tracing::warn!(%err, "text shaping failed, using fallback font");
                FallbackFont.layout(text, font)
            }
        };

        match &shaped.texture {
            Some(atlas) => self.bind_state(CommandKind::Glyph, Some(atlas)),
            None => self.bind_state(CommandKind::Solid, None),
        }
        for glyph in &shaped.glyphs {
            let pos = corners(&glyph.rect.offset(origin.x, origin.y));
            let uv = corners(&glyph.uv);
            self.push_quad(
                Vertex::new(pos[0], color, uv[0]),
                Vertex::new(pos[1], color, uv[1]),
                Vertex::new(pos[2], color, uv[2]),
                Vertex::new(pos[3], color, uv[3]),
            );
        }
        shaped.size
    }
}

/// `[tl, tr, br, bl]`
fn corners(rect: &Rect) -> [Point; 4] {
    [
        rect.origin,
        Point::new(rect.right(), rect.y()),
        Point::new(rect.right(), rect.bottom()),
        Point::new(rect.x(), rect.bottom()),
    ]
}

/// Clockwise perimeter, `segments + 1` points per corner starting at the
/// left edge of the top-left arc.
fn rounded_perimeter(rect: &Rect, radii: &CornerRadius, segments: u32) -> Perimeter {
    let n = segments.max(1);
    let arcs = [
        (rect.x() + radii.top_left, rect.y() + radii.top_left, radii.top_left, PI),
        (
            rect.right() - radii.top_right,
            rect.y() + radii.top_right,
            radii.top_right,
            1.5 * PI,
        ),
        (
            rect.right() - radii.bottom_right,
            rect.bottom() - radii.bottom_right,
            radii.bottom_right,
            0.0,
        ),
        (
            rect.x() + radii.bottom_left,
            rect.bottom() - radii.bottom_left,
            radii.bottom_left,
            FRAC_PI_2,
        ),
    ];

    let mut points = Perimeter::new();
    for (cx, cy, r, start) in arcs {
        for i in 0..=n {
            let (sin, cos) = (start + FRAC_PI_2 * i as f32 / n as f32).sin_cos();
            points.push(Point::new(cx + r * cos, cy + r * sin));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandList, RenderCommand};
    use crate::config::BatchConfig;
    use crate::error::TextError;
    use crate::text::{GlyphQuad, ShapedText};
    use crate::texture::PixelFormat;

    fn builder() -> BatchBuilder {
        BatchBuilder::new(BatchConfig::default().with_corner_segments(8))
    }

    fn single_draw(list: &CommandList) -> &crate::command::DrawCommand {
        assert_eq!(list.len(), 1, "expected one draw, got {list:?}");
        list.draws().next().unwrap()
    }

    struct BrokenFonts;

    impl FontProvider for BrokenFonts {
        fn shape(&self, _: &str, font: &FontRequest) -> Result<ShapedText, TextError> {
            Err(TextError::FontNotFound(
                font.family.clone().unwrap_or_default(),
            ))
        }
    }

    struct AtlasFonts(Texture);

    impl FontProvider for AtlasFonts {
        fn shape(&self, text: &str, _: &FontRequest) -> Result<ShapedText, TextError> {
            let glyphs = text
                .chars()
                .enumerate()
                .map(|(i, _)| GlyphQuad {
                    rect: Rect::new(i as f32 * 8.0, 0.0, 8.0, 10.0),
                    uv: Rect::new(0.0, 0.0, 0.5, 0.5),
                })
                .collect();
            Ok(ShapedText {
                size: Size::new(text.chars().count() as f32 * 8.0, 10.0),
                baseline: 8.0,
                glyphs,
                texture: Some(self.0.clone()),
            })
        }
    }

    #[test]
    fn test_rectangle_and_outline() {
        let mut b = builder();
        b.draw_rectangle(Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED);
        b.draw_rectangle(Rect::new(0.0, 0.0, 0.0, 10.0), Color::RED);
        assert_eq!(b.pending_vertices(), 6);

        b.draw_rectangle_outline(Rect::new(0.0, 0.0, 10.0, 10.0), &Thickness::uniform(1.0), Color::BLACK);
        assert_eq!(b.pending_vertices(), 30);

        // Only the top and bottom bands survive a one-sided border
        b.draw_rectangle_outline(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            &Thickness::new(0.0, 2.0, 0.0, 2.0),
            Color::BLACK,
        );
        assert_eq!(b.pending_vertices(), 42);
    }

    #[test]
    fn test_rounded_rectangle_fan() {
        let mut b = builder();
        b.draw_rounded_rectangle(
            Rect::new(0.0, 0.0, 100.0, 40.0),
            CornerRadius::uniform(8.0),
            Color::BLUE,
        );
        let list = b.build();
        let draw = single_draw(&list);
        // 4 corners x 9 points, one triangle per perimeter edge
        assert_eq!(draw.vertex_count, 36 * 3);
        for v in &draw.vertices {
            let p = v.position();
            assert!(p.x >= -1e-3 && p.x <= 100.001 && p.y >= -1e-3 && p.y <= 40.001);
        }
    }

    #[test]
    fn test_rounded_rectangle_zero_radius_is_quad() {
        let mut b = builder();
        b.draw_rounded_rectangle(Rect::new(0.0, 0.0, 10.0, 10.0), CornerRadius::ZERO, Color::BLUE);
        assert_eq!(b.pending_vertices(), 6);
    }

    #[test]
    fn test_rounded_outline_ring() {
        let mut b = builder();
        b.draw_rounded_outline(
            Rect::new(0.0, 0.0, 50.0, 50.0),
            CornerRadius::uniform(10.0),
            &Thickness::uniform(2.0),
            Color::BLACK,
        );
        assert_eq!(b.pending_vertices(), 36 * 6);
    }

    #[test]
    fn test_line_along_normal() {
        let mut b = builder();
        b.draw_line(Point::new(0.0, 5.0), Point::new(10.0, 5.0), 2.0, Color::WHITE);
        b.draw_line(Point::new(3.0, 3.0), Point::new(3.0, 3.0), 2.0, Color::WHITE);
        let list = b.build();
        let draw = single_draw(&list);
        assert_eq!(draw.vertex_count, 6);
        let ys: Vec<f32> = draw.vertices.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (*y - 4.0).abs() < 1e-5 || (*y - 6.0).abs() < 1e-5));
    }

    #[test]
    fn test_polyline_and_beziers() {
        let mut b = builder();
        b.draw_polyline(
            &[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            2.0,
            Color::WHITE,
        );
        assert!(b.pending_vertices() > 0);
        assert_eq!(b.pending_vertices() % 3, 0);
        b.flush();

        b.draw_bezier_quadratic(
            Point::new(0.0, 0.0),
            Point::new(50.0, 100.0),
            Point::new(100.0, 0.0),
            1.0,
            Color::WHITE,
        );
        let quad_vertices = b.pending_vertices();
        assert!(quad_vertices > 6, "curve should flatten into several segments");
        assert_eq!(quad_vertices % 3, 0);
        b.flush();

        b.draw_bezier_cubic(
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
            1.0,
            Color::WHITE,
        );
        let list = b.build();
        for v in list.draws().flat_map(|d| d.vertices.iter()) {
            let p = v.position();
            assert!(p.x > -2.0 && p.x < 102.0 && p.y > -2.0 && p.y < 102.0);
        }
    }

    #[test]
    fn test_missing_image_draws_magenta() {
        let mut b = builder();
        b.draw_image(Rect::new(0.0, 0.0, 4.0, 4.0), None, Color::WHITE);
        let list = b.build();
        let draw = single_draw(&list);
        assert_eq!(draw.kind, CommandKind::Solid);
        assert!(draw.texture.is_none());
        assert!(draw.vertices.iter().all(|v| v.color == Color::MISSING.to_array()));
    }

    #[test]
    fn test_image_uses_region_uvs() {
        let atlas = Texture::new(4, 4, PixelFormat::Rgba8, vec![0; 64]).unwrap();
        let icon = atlas.sub_region(Rect::new(2.0, 0.0, 2.0, 2.0));
        let mut b = builder();
        b.draw_rectangle(Rect::new(0.0, 0.0, 1.0, 1.0), Color::RED);
        b.draw_image(Rect::new(0.0, 0.0, 16.0, 16.0), Some(&icon), Color::WHITE);
        b.draw_image(Rect::new(16.0, 0.0, 16.0, 16.0), Some(&atlas), Color::WHITE);
        let list = b.build();

        assert_eq!(list.len(), 2);
        let textured = list.draws().nth(1).unwrap();
        assert_eq!(textured.kind, CommandKind::Textured);
        assert_eq!(textured.vertex_count, 12);
        assert_eq!(textured.vertices[0].uv, [0.5, 0.0]);
        assert_eq!(textured.vertices[2].uv, [1.0, 0.5]);
    }

    #[test]
    fn test_text_falls_back_on_error() {
        let mut b = builder();
        let size = b.draw_text(
            "hi",
            Point::new(5.0, 5.0),
            &FontRequest::new(10.0).with_family("Nope"),
            Color::BLACK,
            &BrokenFonts,
        );
        assert!(size.width > 0.0);
        assert_eq!(b.pending_vertices(), 12);
        assert_eq!(b.command_kind(), CommandKind::Solid);
    }

    #[test]
    fn test_glyph_run_switches_state() {
        let atlas = Texture::new(8, 8, PixelFormat::Alpha8, vec![0; 64]).unwrap();
        let fonts = AtlasFonts(atlas.clone());
        let mut b = builder();
        b.draw_rectangle(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        b.draw_text("abc", Point::new(2.0, 3.0), &FontRequest::default(), Color::BLACK, &fonts);
        b.draw_rectangle(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        let list = b.build();

        let kinds: Vec<_> = list.iter().map(|c| match c {
            RenderCommand::Draw(d) => (d.kind, d.vertex_count),
            other => panic!("unexpected {other:?}"),
        }).collect();
        assert_eq!(
            kinds,
            vec![
                (CommandKind::Solid, 6),
                (CommandKind::Glyph, 18),
                (CommandKind::Solid, 6)
            ]
        );
        let glyphs = list.draws().nth(1).unwrap();
        assert!(glyphs.texture.as_ref().unwrap().same_binding(&atlas));
        assert_eq!(glyphs.vertices[0].position, [2.0, 3.0]);
    }
}
