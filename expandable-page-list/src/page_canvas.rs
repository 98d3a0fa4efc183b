use crate::Message;
use expandable_page_list::pointer::PointerId;
use expandable_page_list::{ListState, Offset, Page, PageContent, ScrollableList, Scrollbar, ZoomState};
use iced::mouse::{self, ScrollDelta};
use iced::widget::canvas::{self, event, Frame, Geometry, Path};
use iced::widget::image::Handle;
use iced::{touch, Color, Point, Rectangle, Renderer, Size, Theme, Vector};
use std::time::Instant;

/// Vertical space above and below each page.
pub const PAGE_PADDING: f32 = 16.0;
/// Pixels scrolled per wheel line.
const WHEEL_LINE_HEIGHT: f32 = 48.0;
const BACKGROUND: Color = Color {
    r: 0.12,
    g: 0.12,
    b: 0.14,
    a: 1.0,
};

/// A rendered page ready for drawing.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
    content: PageContent,
}

impl LoadedPage {
    /// Height of the list item showing this page at `display_width`.
    pub fn item_height(&self, display_width: f32) -> f32 {
        let page_height = if self.width == 0 {
            0.0
        } else {
            display_width * self.height as f32 / self.width as f32
        };
        page_height + PAGE_PADDING * 2.0
    }

    /// Text, links and images for hit-testing layers; not drawn.
    pub fn content(&self) -> &PageContent {
        &self.content
    }
}

impl From<Page> for LoadedPage {
    fn from(page: Page) -> Self {
        let (width, height) = (page.width(), page.height());
        Self {
            handle: Handle::from_rgba(width, height, page.image.into_raw()),
            width,
            height,
            content: page.content,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PointerInput {
    Pressed(PointerId, Offset),
    Moved(PointerId, Offset),
    Released(PointerId, Offset),
    Lost,
    Wheel(f32),
}

/// Draws the visible pages as one surface scaled about the viewport centre,
/// with the scrollbar on top, and forwards raw pointer input.
pub struct PageCanvas<'a> {
    pub pages: &'a [LoadedPage],
    pub list: &'a ListState,
    pub zoom: ZoomState,
    pub scrollbar: &'a Scrollbar,
}

#[derive(Debug, Default)]
pub struct CanvasState {
    mouse_pressed: bool,
}

fn local(point: Point, bounds: Rectangle) -> Offset {
    Offset::new(point.x - bounds.x, point.y - bounds.y)
}

impl canvas::Program<Message> for PageCanvas<'_> {
    type State = CanvasState;

    fn update(
        &self,
        state: &mut CanvasState,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        let cursor_offset = || cursor.position().map(|p| local(p, bounds));
        let input = match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                cursor.position_in(bounds).map(|p| {
                    state.mouse_pressed = true;
                    PointerInput::Pressed(PointerId::Mouse, Offset::new(p.x, p.y))
                })
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) if state.mouse_pressed => {
                cursor_offset().map(|p| PointerInput::Moved(PointerId::Mouse, p))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
                if state.mouse_pressed =>
            {
                state.mouse_pressed = false;
                Some(match cursor_offset() {
                    Some(p) => PointerInput::Released(PointerId::Mouse, p),
                    None => PointerInput::Lost,
                })
            }
            canvas::Event::Mouse(mouse::Event::CursorLeft) if state.mouse_pressed => {
                state.mouse_pressed = false;
                Some(PointerInput::Lost)
            }
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                cursor.position_in(bounds).map(|_| {
                    PointerInput::Wheel(match delta {
                        ScrollDelta::Lines { y, .. } => -y * WHEEL_LINE_HEIGHT,
                        ScrollDelta::Pixels { y, .. } => -y,
                    })
                })
            }
            canvas::Event::Touch(touch::Event::FingerPressed { id, position }) => Some(
                PointerInput::Pressed(PointerId::Finger(id.0), local(position, bounds)),
            ),
            canvas::Event::Touch(touch::Event::FingerMoved { id, position }) => Some(
                PointerInput::Moved(PointerId::Finger(id.0), local(position, bounds)),
            ),
            canvas::Event::Touch(touch::Event::FingerLifted { id, position }) => Some(
                PointerInput::Released(PointerId::Finger(id.0), local(position, bounds)),
            ),
            canvas::Event::Touch(touch::Event::FingerLost { .. }) => Some(PointerInput::Lost),
            _ => None,
        };

        match input {
            Some(input) => (
                event::Status::Captured,
                Some(Message::Pointer(input, Instant::now())),
            ),
            None => (event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &CanvasState,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);

        let centre = Vector::new(bounds.width / 2.0, bounds.height / 2.0);
        let pan = Vector::new(self.zoom.offset_x(), self.zoom.offset_y());
        frame.with_save(|frame| {
            frame.translate(centre + pan);
            frame.scale(self.zoom.scale());
            frame.translate(-centre);

            for item in self.list.layout_info().visible_items {
                let Some(page) = self.pages.get(item.index) else {
                    continue;
                };
                let top_left = Point::new(0.0, item.offset + PAGE_PADDING);
                let size = Size::new(bounds.width, item.size - PAGE_PADDING * 2.0);
                frame.fill_rectangle(top_left, size, Color::WHITE);
                frame.draw_image(Rectangle::new(top_left, size), &page.handle);
            }
        });

        let now = Instant::now();
        let viewport = expandable_page_list::Size::new(bounds.width, bounds.height);
        if let Some(geometry) = self.scrollbar.geometry(viewport, self.list, now) {
            let config = self.scrollbar.config();
            let faded = |color: Color| Color {
                a: color.a * geometry.alpha,
                ..color
            };
            let rounded = |rect: expandable_page_list::Rect, radius: f32| {
                Path::rounded_rectangle(
                    Point::new(rect.x, rect.y),
                    Size::new(rect.width, rect.height),
                    radius.into(),
                )
            };
            frame.fill(
                &rounded(geometry.track, config.track_corner_radius),
                faded(config.track_color),
            );
            frame.fill(
                &rounded(geometry.knob, config.knob_corner_radius),
                faded(config.knob_color),
            );
        }

        vec![frame.into_geometry()]
    }
}
