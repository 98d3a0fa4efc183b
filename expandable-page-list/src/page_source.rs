//! Page images for the list, produced lazily from a paged document.

use crate::error::SourceError;
use crate::geometry::Rect;
use image::RgbaImage;

/// Text laid out on a page, in page image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub bounds: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    pub uri: String,
    pub bounds: Rect,
}

/// A link to another page of the same document.
#[derive(Debug, Clone, PartialEq)]
pub struct GotoLink {
    pub page_index: usize,
    pub bounds: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub bounds: Rect,
}

/// Content carried alongside the page raster for hit-testing layers. The
/// viewer itself never reads it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageContent {
    pub texts: Vec<TextRun>,
    pub links: Vec<PageLink>,
    pub images: Vec<PageImage>,
    pub goto_links: Vec<GotoLink>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub image: RgbaImage,
    /// Size of the page in document units before rasterisation.
    pub natural_width: f32,
    pub natural_height: f32,
    pub content: PageContent,
}

impl Page {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Height of the page when drawn `display_width` wide.
    pub fn height_at(&self, display_width: f32) -> f32 {
        if self.image.width() == 0 {
            return 0.0;
        }
        display_width * self.image.height() as f32 / self.image.width() as f32
    }
}

/// How many pages to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCountPolicy {
    /// At most this many leading pages, for a quick first display.
    Capped(usize),
    Full,
}

impl PageCountPolicy {
    pub const DEFAULT_CAP: usize = 20;

    pub fn resolve(self, document_pages: usize) -> usize {
        match self {
            PageCountPolicy::Capped(cap) => cap.min(document_pages),
            PageCountPolicy::Full => document_pages,
        }
    }
}

impl Default for PageCountPolicy {
    fn default() -> Self {
        PageCountPolicy::Capped(Self::DEFAULT_CAP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFidelity {
    #[default]
    Display,
    Print,
}

/// A paged document that can rasterise its pages.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Renders page `index` `target_width` pixels wide, height following the
    /// page's aspect ratio.
    fn render_page(
        &self,
        index: usize,
        target_width: u32,
        fidelity: RenderFidelity,
    ) -> Result<Page, SourceError>;
}

/// Lazy, finite sequence of rendered pages. Each page is rendered when the
/// iterator is advanced; a new sequence needs a new `produce_pages` call.
pub struct Pages<'a, S: PageSource + ?Sized> {
    source: &'a S,
    target_width: u32,
    fidelity: RenderFidelity,
    next: usize,
    count: usize,
}

pub fn produce_pages<S: PageSource + ?Sized>(
    source: &S,
    target_width: u32,
    policy: PageCountPolicy,
    fidelity: RenderFidelity,
) -> Pages<'_, S> {
    let count = policy.resolve(source.page_count());
    tracing::info!(count, target_width, ?fidelity, "producing pages");
    Pages {
        source,
        target_width,
        fidelity,
        next: 0,
        count,
    }
}

impl<S: PageSource + ?Sized> Iterator for Pages<'_, S> {
    type Item = Result<Page, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;
        let page = self
            .source
            .render_page(index, self.target_width, self.fidelity);
        match &page {
            Ok(page) => tracing::debug!(index, width = page.width(), height = page.height(), "page rendered"),
            Err(e) => tracing::warn!(index, "page failed: {}", e),
        }
        Some(page)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl<S: PageSource + ?Sized> ExactSizeIterator for Pages<'_, S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Blank A4-ish pages; counts renders to prove laziness.
    struct BlankDocument {
        pages: usize,
        rendered: Cell<usize>,
    }

    impl PageSource for BlankDocument {
        fn page_count(&self) -> usize {
            self.pages
        }

        fn render_page(
            &self,
            index: usize,
            target_width: u32,
            _fidelity: RenderFidelity,
        ) -> Result<Page, SourceError> {
            if index >= self.pages {
                return Err(SourceError::PageOutOfRange {
                    index,
                    count: self.pages,
                });
            }
            self.rendered.set(self.rendered.get() + 1);
            let height = (target_width as f32 * 842.0 / 595.0) as u32;
            Ok(Page {
                image: RgbaImage::new(target_width, height),
                natural_width: 595.0,
                natural_height: 842.0,
                content: PageContent::default(),
            })
        }
    }

    #[test]
    fn capped_policy_limits_page_count() {
        assert_eq!(PageCountPolicy::default().resolve(100), 20);
        assert_eq!(PageCountPolicy::Capped(20).resolve(3), 3);
        assert_eq!(PageCountPolicy::Full.resolve(100), 100);
    }

    #[test]
    fn pages_are_rendered_on_demand() {
        let document = BlankDocument {
            pages: 50,
            rendered: Cell::new(0),
        };
        let mut pages = produce_pages(&document, 595, PageCountPolicy::default(), RenderFidelity::Display);
        assert_eq!(pages.len(), 20);
        assert_eq!(document.rendered.get(), 0);

        let first = pages.next().expect("has pages").expect("renders");
        assert_eq!(document.rendered.get(), 1);
        assert_eq!(first.width(), 595);
        assert_eq!(first.height(), 842);
        assert_eq!(pages.count(), 19);
    }

    #[test]
    fn height_follows_display_width() {
        let page = Page {
            image: RgbaImage::new(100, 200),
            natural_width: 50.0,
            natural_height: 100.0,
            content: PageContent::default(),
        };
        assert_eq!(page.height_at(300.0), 600.0);
    }
}
