use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::widget::image::Handle;
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::state::analysis::Connection;
use crate::Message;

/// Radius around a hotspot center that accepts a click
const HOTSPOT_HIT_RADIUS: f32 = 24.0;

/// Interactive annotation layer over the main image.
///
/// Draws the cover image aspect-fit inside the canvas bounds and one red
/// hotspot per connection at its (x%, y%) position on the fitted image.
/// A click on a hotspot selects that connection.
pub struct AnnotationOverlay {
    backdrop: Handle,
    dimensions: (u32, u32),
    connections: Vec<Connection>,
}

impl AnnotationOverlay {
    pub fn new(backdrop: Handle, dimensions: (u32, u32), connections: Vec<Connection>) -> Self {
        AnnotationOverlay {
            backdrop,
            dimensions,
            connections,
        }
    }

    fn image_size(&self) -> Size {
        Size::new(self.dimensions.0 as f32, self.dimensions.1 as f32)
    }
}

impl Program<Message> for AnnotationOverlay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let fit = fit_rect(self.image_size(), bounds.size());
        frame.draw_image(fit, canvas::Image::new(self.backdrop.clone()));

        // Red hotspots: soft halo, solid core, white rim
        for conn in &self.connections {
            let center = hotspot_center(fit, conn.x, conn.y);

            let halo = Path::circle(center, 14.0);
            frame.fill(&halo, Color::from_rgba8(220, 38, 38, 0.4));

            let core = Path::circle(center, 6.0);
            frame.fill(&core, Color::from_rgb8(220, 38, 38));
            frame.stroke(
                &core,
                Stroke::default().with_width(2.0).with_color(Color::WHITE),
            );
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        if let canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) = event {
            if let Some(position) = cursor.position_in(bounds) {
                let fit = fit_rect(self.image_size(), bounds.size());
                if let Some(index) = hit_test(&self.connections, fit, position) {
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::SelectConnection(index)),
                    );
                }
            }
        }

        (canvas::event::Status::Ignored, None)
    }
}

/// Target image framed around its subject.
///
/// Draws the connection's target image cover-scaled and shifted so the
/// model-reported subject center stays in view, clipped to the canvas.
pub struct FocusView {
    target: Handle,
    dimensions: (u32, u32),
    focus_x: f32,
    focus_y: f32,
}

impl FocusView {
    pub fn new(target: Handle, dimensions: (u32, u32), focus_x: f32, focus_y: f32) -> Self {
        FocusView {
            target,
            dimensions,
            focus_x,
            focus_y,
        }
    }
}

impl Program<Message> for FocusView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let image_size = Size::new(self.dimensions.0 as f32, self.dimensions.1 as f32);
        let viewport = Rectangle::new(Point::ORIGIN, bounds.size());
        let dest = focus_dest(image_size, bounds.size(), self.focus_x, self.focus_y);

        frame.with_clip(viewport, |frame| {
            frame.draw_image(dest, canvas::Image::new(self.target.clone()));
        });

        vec![frame.into_geometry()]
    }
}

/// Centered aspect-fit rectangle for an image inside the given bounds
/// ("object-fit: contain"). Unknown dimensions fill the bounds.
pub fn fit_rect(image: Size, bounds: Size) -> Rectangle {
    if image.width <= 0.0 || image.height <= 0.0 {
        return Rectangle::new(Point::ORIGIN, bounds);
    }

    let scale = (bounds.width / image.width).min(bounds.height / image.height);
    let fitted = Size::new(image.width * scale, image.height * scale);

    Rectangle::new(
        Point::new(
            (bounds.width - fitted.width) / 2.0,
            (bounds.height - fitted.height) / 2.0,
        ),
        fitted,
    )
}

/// Hotspot center for a percentage position on the fitted image. Values
/// outside 0-100 simply land outside the visible image, which is harmless.
pub fn hotspot_center(fit: Rectangle, x_pct: f32, y_pct: f32) -> Point {
    Point::new(
        fit.x + fit.width * x_pct / 100.0,
        fit.y + fit.height * y_pct / 100.0,
    )
}

/// Placement rectangle for a cover-scaled image whose (focusX%, focusY%)
/// point should stay in view ("object-fit: cover" with "object-position").
/// The offset is bounded by the overflow, so the viewport never shows past
/// the image edge. Unknown dimensions fill the viewport.
pub fn focus_dest(image: Size, viewport: Size, focus_x_pct: f32, focus_y_pct: f32) -> Rectangle {
    if image.width <= 0.0 || image.height <= 0.0 {
        return Rectangle::new(Point::ORIGIN, viewport);
    }

    let scale = (viewport.width / image.width).max(viewport.height / image.height);
    let scaled = Size::new(image.width * scale, image.height * scale);

    let fx = (focus_x_pct / 100.0).clamp(0.0, 1.0);
    let fy = (focus_y_pct / 100.0).clamp(0.0, 1.0);

    Rectangle::new(
        Point::new(
            -(scaled.width - viewport.width) * fx,
            -(scaled.height - viewport.height) * fy,
        ),
        scaled,
    )
}

/// Index of the first connection whose hotspot contains the click, if any.
fn hit_test(connections: &[Connection], fit: Rectangle, position: Point) -> Option<usize> {
    connections.iter().position(|conn| {
        let center = hotspot_center(fit, conn.x, conn.y);
        position.distance(center) <= HOTSPOT_HIT_RADIUS
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(x: f32, y: f32) -> Connection {
        Connection {
            target_index: 0,
            x,
            y,
            focus_x: 50.0,
            focus_y: 50.0,
            relationship: "特写".to_string(),
            interpretation: "细节".to_string(),
        }
    }

    #[test]
    fn test_fit_rect_wide_image_letterboxes_vertically() {
        let fit = fit_rect(Size::new(200.0, 100.0), Size::new(100.0, 100.0));
        assert_eq!(fit.width, 100.0);
        assert_eq!(fit.height, 50.0);
        assert_eq!(fit.x, 0.0);
        assert_eq!(fit.y, 25.0);
    }

    #[test]
    fn test_fit_rect_tall_image_letterboxes_horizontally() {
        let fit = fit_rect(Size::new(100.0, 200.0), Size::new(100.0, 100.0));
        assert_eq!(fit.width, 50.0);
        assert_eq!(fit.height, 100.0);
        assert_eq!(fit.x, 25.0);
        assert_eq!(fit.y, 0.0);
    }

    #[test]
    fn test_fit_rect_unknown_dimensions_fill_bounds() {
        let fit = fit_rect(Size::new(0.0, 0.0), Size::new(300.0, 200.0));
        assert_eq!(fit.width, 300.0);
        assert_eq!(fit.height, 200.0);
    }

    #[test]
    fn test_hotspot_center_is_percentage_of_fit() {
        let fit = Rectangle::new(Point::new(10.0, 20.0), Size::new(200.0, 100.0));
        let center = hotspot_center(fit, 42.5, 10.0);
        assert_eq!(center.x, 10.0 + 85.0);
        assert_eq!(center.y, 20.0 + 10.0);
    }

    #[test]
    fn test_focus_dest_centers_focus_point() {
        // 400x100 image in a 100x100 viewport: cover scale 1.0, horizontal
        // overflow 300. A 50% focus sits at half the overflow.
        let dest = focus_dest(Size::new(400.0, 100.0), Size::new(100.0, 100.0), 50.0, 50.0);
        assert_eq!(dest.width, 400.0);
        assert_eq!(dest.height, 100.0);
        assert_eq!(dest.x, -150.0);
        assert_eq!(dest.y, 0.0);
    }

    #[test]
    fn test_focus_dest_clamps_to_image_edges() {
        let image = Size::new(400.0, 100.0);
        let viewport = Size::new(100.0, 100.0);

        // Focus at the far left: no shift
        let left = focus_dest(image, viewport, 0.0, 50.0);
        assert_eq!(left.x, 0.0);

        // Focus at the far right: shifted by exactly the overflow
        let right = focus_dest(image, viewport, 100.0, 50.0);
        assert_eq!(right.x, -300.0);

        // Out-of-range focus values clamp instead of overshooting
        let wild = focus_dest(image, viewport, 250.0, -40.0);
        assert_eq!(wild.x, -300.0);
        assert_eq!(wild.y, 0.0);
    }

    #[test]
    fn test_focus_dest_is_idempotent_for_same_connection() {
        let image = Size::new(1200.0, 800.0);
        let viewport = Size::new(450.0, 450.0);
        let first = focus_dest(image, viewport, 80.0, 15.0);
        let second = focus_dest(image, viewport, 80.0, 15.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_hit_test_inside_and_outside_radius() {
        let fit = Rectangle::new(Point::ORIGIN, Size::new(100.0, 100.0));
        let connections = vec![connection(50.0, 50.0), connection(90.0, 10.0)];

        assert_eq!(
            hit_test(&connections, fit, Point::new(52.0, 48.0)),
            Some(0)
        );
        assert_eq!(
            hit_test(&connections, fit, Point::new(88.0, 12.0)),
            Some(1)
        );
        assert_eq!(hit_test(&connections, fit, Point::new(10.0, 90.0)), None);
    }
}
