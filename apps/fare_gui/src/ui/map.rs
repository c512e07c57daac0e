//! Route map: pickup and dropoff markers on a Web Mercator projection
//! centered between the two points.

use std::f64::consts::PI;

use eframe::egui;
use shared::domain::Coordinate;

pub const DEFAULT_ZOOM: u8 = 12;
pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 18;
const TILE_SIZE: f64 = 256.0;
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;
const GRID_SPACING: f32 = 64.0;
const MARKER_RADIUS: f32 = 7.0;
const MAP_HEIGHT: f32 = 360.0;

const PICKUP_COLOR: egui::Color32 = egui::Color32::from_rgb(0x38, 0x6c, 0xd9);
const DROPOFF_COLOR: egui::Color32 = egui::Color32::from_rgb(0xd6, 0x3e, 0x2a);

/// Global pixel position of a coordinate at `zoom`.
pub fn mercator_pixels(point: Coordinate, zoom: u8) -> (f64, f64) {
    let world = TILE_SIZE * 2f64.powi(zoom as i32);
    let lat = point
        .latitude
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians();
    let x = (point.longitude + 180.0) / 360.0 * world;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
    (x, y)
}

/// Screen position of `point` on a map whose `center` sits at `origin`.
pub fn project(center: Coordinate, point: Coordinate, zoom: u8, origin: egui::Pos2) -> egui::Pos2 {
    let (cx, cy) = mercator_pixels(center, zoom);
    let (px, py) = mercator_pixels(point, zoom);
    egui::pos2(origin.x + (px - cx) as f32, origin.y + (py - cy) as f32)
}

pub fn osm_directions_url(pickup: Coordinate, dropoff: Coordinate) -> String {
    format!(
        "https://www.openstreetmap.org/directions?route={:.6}%2C{:.6}%3B{:.6}%2C{:.6}",
        pickup.latitude, pickup.longitude, dropoff.latitude, dropoff.longitude
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RideMap {
    pub zoom: u8,
}

impl Default for RideMap {
    fn default() -> Self {
        Self { zoom: DEFAULT_ZOOM }
    }
}

impl RideMap {
    pub fn show(&mut self, ui: &mut egui::Ui, pickup: Coordinate, dropoff: Coordinate) {
        ui.horizontal(|ui| {
            ui.add(egui::Slider::new(&mut self.zoom, MIN_ZOOM..=MAX_ZOOM).text("Zoom"));
            if ui.button("Reset").clicked() {
                self.zoom = DEFAULT_ZOOM;
            }
            ui.hyperlink_to(
                "Open route in OpenStreetMap",
                osm_directions_url(pickup, dropoff),
            );
        });

        let size = egui::vec2(ui.available_width(), MAP_HEIGHT);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let rect = response.rect;
        let painter = painter.with_clip_rect(rect);

        painter.rect_filled(rect, 6.0, egui::Color32::from_rgb(0xf2, 0xef, 0xe9));
        let grid_stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(220));
        let mut x = rect.left();
        while x <= rect.right() {
            painter.line_segment(
                [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
                grid_stroke,
            );
            x += GRID_SPACING;
        }
        let mut y = rect.top();
        while y <= rect.bottom() {
            painter.line_segment(
                [egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
                grid_stroke,
            );
            y += GRID_SPACING;
        }

        let center = pickup.midpoint(dropoff);
        let pickup_pos = project(center, pickup, self.zoom, rect.center());
        let dropoff_pos = project(center, dropoff, self.zoom, rect.center());

        painter.line_segment(
            [pickup_pos, dropoff_pos],
            egui::Stroke::new(2.0, egui::Color32::from_gray(90)),
        );
        draw_marker(&painter, pickup_pos, PICKUP_COLOR);
        draw_marker(&painter, dropoff_pos, DROPOFF_COLOR);

        let hover = response.hover_pos();
        let near = |pos: egui::Pos2| hover.is_some_and(|h| h.distance(pos) <= MARKER_RADIUS * 2.0);
        if near(pickup_pos) {
            response.on_hover_text("Pickup Location");
        } else if near(dropoff_pos) {
            response.on_hover_text("Dropoff Location");
        }
    }
}

fn draw_marker(painter: &egui::Painter, pos: egui::Pos2, color: egui::Color32) {
    painter.circle_filled(pos, MARKER_RADIUS, color);
    painter.circle_filled(pos, MARKER_RADIUS * 0.4, egui::Color32::WHITE);
}
