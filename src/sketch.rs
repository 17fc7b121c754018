//! Guidance-sketch projection and rasterization.
//!
//! `project` is a pure function: an arbitrary point set plus fixed frame
//! dimensions in, a black-and-white schematic raster plus the projected
//! points out. No hit-testing, no drawing surface, no memory between calls —
//! identical input yields byte-identical output, so the whole module is unit
//! testable without a graphical context.
//!
//! The projection fits the point set's bounding box into a target region
//! occupying 60% x 40% of the frame, centered at `(w/2, h * 0.35)` (biased
//! toward the upper portion), using a single uniform scale factor so the
//! drawn shape keeps its aspect ratio.

use image::{Rgba, RgbaImage};
use std::io::Cursor;

/// A plane coordinate, in the space of whatever surface captured it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Guidance sketch frame, 3:4.
pub const FRAME_WIDTH: u32 = 768;
pub const FRAME_HEIGHT: u32 = 1024;

/// Target region as fractions of the frame.
const TARGET_WIDTH_FRAC: f32 = 0.6;
const TARGET_HEIGHT_FRAC: f32 = 0.4;
const TARGET_CENTER_Y_FRAC: f32 = 0.35;

/// Heavy connecting stroke; node discs sit visibly atop line intersections.
const STROKE_WIDTH: f32 = 12.0;
const NODE_RADIUS: f32 = 14.0;

const INK: Rgba<u8> = Rgba([255, 255, 255, 255]);
const VOID: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Result of projecting a point set into the guidance frame.
pub struct Projection {
    /// Black background, white polyline + node markers.
    pub raster: RgbaImage,
    /// Projected points, in input order.
    pub points: Vec<Point>,
}

/// Project `points` into a `frame_width` x `frame_height` sketch.
///
/// An empty input yields a blank frame and no projected points.
pub fn project(points: &[Point], frame_width: u32, frame_height: u32) -> Projection {
    let mut raster = RgbaImage::from_pixel(frame_width, frame_height, VOID);

    if points.is_empty() {
        return Projection {
            raster,
            points: Vec::new(),
        };
    }

    let projected = project_points(points, frame_width, frame_height);

    // Polyline first, then markers, so nodes stay visible at intersections.
    for pair in projected.windows(2) {
        stroke_segment(&mut raster, pair[0], pair[1], STROKE_WIDTH / 2.0);
    }
    for p in &projected {
        fill_disc(&mut raster, *p, NODE_RADIUS);
    }

    Projection {
        raster,
        points: projected,
    }
}

/// Coordinate transform only: bounding box -> uniform scale -> target region.
pub fn project_points(points: &[Point], frame_width: u32, frame_height: u32) -> Vec<Point> {
    if points.is_empty() {
        return Vec::new();
    }

    let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    let bbox_w = max_x - min_x;
    let bbox_h = max_y - min_y;

    let target_w = frame_width as f32 * TARGET_WIDTH_FRAC;
    let target_h = frame_height as f32 * TARGET_HEIGHT_FRAC;
    let center_x = frame_width as f32 / 2.0;
    let center_y = frame_height as f32 * TARGET_CENTER_Y_FRAC;

    // Degenerate axes (all points sharing a coordinate) contribute no ratio.
    let ratio_x = if bbox_w > 0.0 { target_w / bbox_w } else { 1.0 };
    let ratio_y = if bbox_h > 0.0 { target_h / bbox_h } else { 1.0 };
    let scale = ratio_x.min(ratio_y);

    let bbox_cx = min_x + bbox_w / 2.0;
    let bbox_cy = min_y + bbox_h / 2.0;

    points
        .iter()
        .map(|p| Point {
            x: (p.x - bbox_cx) * scale + center_x,
            y: (p.y - bbox_cy) * scale + center_y,
        })
        .collect()
}

/// Encode the sketch raster as PNG bytes for the generation payload.
pub fn encode_png(raster: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Cursor::new(Vec::new());
    raster.write_to(&mut bytes, image::ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Fill every pixel within `radius` of segment `a`-`b`. The distance test
/// gives round caps and joins for free.
fn stroke_segment(img: &mut RgbaImage, a: Point, b: Point, radius: f32) {
    let min_x = (a.x.min(b.x) - radius).floor().max(0.0) as u32;
    let max_x = (a.x.max(b.x) + radius).ceil().min(img.width() as f32 - 1.0) as u32;
    let min_y = (a.y.min(b.y) - radius).floor().max(0.0) as u32;
    let max_y = (a.y.max(b.y) + radius).ceil().min(img.height() as f32 - 1.0) as u32;

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let p = Point {
                x: px as f32 + 0.5,
                y: py as f32 + 0.5,
            };
            if distance_to_segment(p, a, b) <= radius {
                img.put_pixel(px, py, INK);
            }
        }
    }
}

fn fill_disc(img: &mut RgbaImage, center: Point, radius: f32) {
    let min_x = (center.x - radius).floor().max(0.0) as u32;
    let max_x = (center.x + radius).ceil().min(img.width() as f32 - 1.0) as u32;
    let min_y = (center.y - radius).floor().max(0.0) as u32;
    let max_y = (center.y + radius).ceil().min(img.height() as f32 - 1.0) as u32;

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let dx = px as f32 + 0.5 - center.x;
            let dy = py as f32 + 0.5 - center.y;
            if dx * dx + dy * dy <= radius * radius {
                img.put_pixel(px, py, INK);
            }
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let cx = a.x + t * abx;
    let cy = a.y + t * aby;
    let dx = p.x - cx;
    let dy = p.y - cy;
    (dx * dx + dy * dy).sqrt()
}
