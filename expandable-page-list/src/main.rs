use anyhow::Context;
use clap::Parser;
use expandable_page_list::input::PointerTracker;
use expandable_page_list::pdfium::{bind_pdfium, resolve_local_copy, PdfiumPageSource};
use expandable_page_list::{
    produce_pages, ControllerConfig, Extent, GestureOutcome, GestureScrollController, ListState,
    PageCountPolicy, RenderFidelity, ScrollableList, Scrollbar, ScrollbarConfig, SourceError,
    VerticalClaimPolicy,
};
use iced::widget::{canvas, container, text};
use iced::{task, window, Element, Length, Size, Subscription, Task, Theme};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

mod page_canvas;

use page_canvas::{LoadedPage, PageCanvas, PointerInput};

/// Zoomable, fling-scrollable PDF page list.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// PDF document to display
    path: PathBuf,

    /// Render every page instead of only the leading ones
    #[arg(long, conflicts_with = "max_pages")]
    all_pages: bool,

    /// How many leading pages to render
    #[arg(long, default_value_t = PageCountPolicy::DEFAULT_CAP)]
    max_pages: usize,

    /// Render at print quality
    #[arg(long)]
    print: bool,

    /// Directory the document is copied into before rendering
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Only claim drags that look like zooming or horizontal panning
    #[arg(long)]
    intent_threshold: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("expandable_page_list=debug,info")),
        )
        .init();

    let args = Args::parse();

    let mut config = ControllerConfig::default();
    if args.intent_threshold {
        config = config.with_vertical_policy(VerticalClaimPolicy::intent_threshold());
    }
    let controller =
        GestureScrollController::new(config).context("Invalid gesture configuration")?;
    let scrollbar = Scrollbar::new(ScrollbarConfig::default(), Instant::now())
        .context("Invalid scrollbar configuration")?;

    let cache_dir = args
        .cache_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("expandable-page-list"));
    // Without a document the viewer stays on its loading screen.
    let document = resolve_local_copy(&args.path, &cache_dir)
        .inspect_err(|e| tracing::error!("Failed to open document: {}", e))
        .ok();

    let options = RenderOptions {
        policy: if args.all_pages {
            PageCountPolicy::Full
        } else {
            PageCountPolicy::Capped(args.max_pages)
        },
        fidelity: if args.print {
            RenderFidelity::Print
        } else {
            RenderFidelity::Display
        },
    };

    iced::application("Expandable Page List", PageListViewer::update, PageListViewer::view)
        .subscription(PageListViewer::subscription)
        .theme(|_| Theme::Dark)
        .run_with(move || PageListViewer::new(document, options, controller, scrollbar))
        .context("Viewer exited with an error")
}

#[derive(Debug, Clone)]
pub enum Message {
    WindowResized(Size),
    PagesLoaded(u32, Result<Vec<LoadedPage>, String>),
    Pointer(PointerInput, Instant),
    Frame(Instant),
}

#[derive(Debug, Clone, Copy)]
struct RenderOptions {
    policy: PageCountPolicy,
    fidelity: RenderFidelity,
}

struct PageListViewer {
    document: Option<PathBuf>,
    options: RenderOptions,
    started: Instant,
    viewport: Option<Size>,
    pages: Option<Vec<LoadedPage>>,
    rendered_width: Option<u32>,
    loading: Option<task::Handle>,
    list: ListState,
    controller: GestureScrollController,
    tracker: PointerTracker,
    scrollbar: Scrollbar,
}

impl PageListViewer {
    fn new(
        document: Option<PathBuf>,
        options: RenderOptions,
        controller: GestureScrollController,
        scrollbar: Scrollbar,
    ) -> (Self, Task<Message>) {
        (
            Self {
                document,
                options,
                started: Instant::now(),
                viewport: None,
                pages: None,
                rendered_width: None,
                loading: None,
                list: ListState::new(Vec::new(), 0.0, 0.0),
                controller,
                tracker: PointerTracker::new(),
                scrollbar,
            },
            window::get_latest()
                .and_then(window::get_size)
                .map(Message::WindowResized),
        )
    }

    fn uptime_ms(&self, at: Instant) -> u64 {
        at.saturating_duration_since(self.started).as_millis() as u64
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::WindowResized(size) => return self.resize(size),
            Message::PagesLoaded(width, result) => {
                if self.rendered_width != Some(width) {
                    tracing::debug!(width, "discarding pages rendered for an old width");
                    return Task::none();
                }
                self.loading = None;
                match result {
                    Ok(pages) => {
                        let text_runs: usize =
                            pages.iter().map(|p| p.content().texts.len()).sum();
                        tracing::info!(count = pages.len(), text_runs, "pages ready");
                        self.list
                            .set_item_heights(pages.iter().map(|p| p.item_height(width as f32)).collect());
                        self.pages = Some(pages);
                    }
                    Err(e) => {
                        tracing::error!("Failed to render document: {}", e);
                    }
                }
            }
            Message::Pointer(input, at) => self.pointer(input, at),
            Message::Frame(at) => {
                let now_ms = self.uptime_ms(at);
                self.controller.on_frame(now_ms, &mut self.list);
                self.scrollbar
                    .update(self.controller.is_scroll_in_progress(), at);
            }
        }
        Task::none()
    }

    fn resize(&mut self, size: Size) -> Task<Message> {
        if self.viewport == Some(size) {
            return Task::none();
        }
        self.viewport = Some(size);
        self.controller
            .set_layout(Extent::new(size.width, size.height));
        self.list.set_viewport_height(size.height);

        let width = size.width.round() as u32;
        if width == 0 || self.rendered_width == Some(width) {
            return Task::none();
        }
        if let Some(pages) = &self.pages {
            self.list
                .set_item_heights(pages.iter().map(|p| p.item_height(size.width)).collect());
        }
        self.load_pages(width)
    }

    fn load_pages(&mut self, width: u32) -> Task<Message> {
        let Some(document) = self.document.clone() else {
            return Task::none();
        };
        if let Some(previous) = self.loading.take() {
            previous.abort();
        }
        self.rendered_width = Some(width);

        let options = self.options;
        let (task, handle) = Task::perform(
            async move {
                tokio::task::spawn_blocking(move || render_document(&document, width, options))
                    .await
                    .map_err(|e| e.to_string())?
                    .map_err(|e| e.to_string())
            },
            move |result| Message::PagesLoaded(width, result),
        )
        .abortable();
        self.loading = Some(handle);
        task
    }

    fn pointer(&mut self, input: PointerInput, at: Instant) {
        let uptime_ms = self.uptime_ms(at);
        let event = match input {
            PointerInput::Pressed(id, position) => Some(self.tracker.press(id, position, uptime_ms)),
            PointerInput::Moved(id, position) => self.tracker.move_to(id, position, uptime_ms),
            PointerInput::Released(id, position) => self.tracker.release(id, position, uptime_ms),
            PointerInput::Lost => {
                self.tracker.reset();
                self.controller.cancel_gesture();
                None
            }
            PointerInput::Wheel(delta) => {
                self.controller.cancel_fling();
                self.list.scroll_by(delta);
                None
            }
        };

        if let Some(mut event) = event {
            if let GestureOutcome::Passthrough { pan } =
                self.controller.on_pointer_event(&mut event, &mut self.list)
            {
                self.list.scroll_by(-pan.y);
            }
        }
        let scrolling = self.controller.is_scroll_in_progress()
            || matches!(input, PointerInput::Wheel(_));
        self.scrollbar.update(scrolling, at);
    }

    fn view(&self) -> Element<'_, Message> {
        match &self.pages {
            Some(pages) => canvas(PageCanvas {
                pages,
                list: &self.list,
                zoom: *self.controller.zoom(),
                scrollbar: &self.scrollbar,
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
            None => container(text("Rendering pages...").size(16))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let resizes = window::resize_events().map(|(_id, size)| Message::WindowResized(size));
        let animating = self.controller.is_flinging()
            || self.scrollbar.is_animating(Instant::now());
        if animating {
            Subscription::batch([resizes, window::frames().map(Message::Frame)])
        } else {
            resizes
        }
    }
}

/// Runs on a blocking worker: PDFium calls must not stall the UI thread.
fn render_document(
    path: &Path,
    width: u32,
    options: RenderOptions,
) -> Result<Vec<LoadedPage>, SourceError> {
    let pdfium = bind_pdfium()?;
    let source = PdfiumPageSource::open(&pdfium, path)?;
    produce_pages(&source, width, options.policy, options.fidelity)
        .map(|page| page.map(LoadedPage::from))
        .collect()
}
