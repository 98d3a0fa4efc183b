use expandable_page_list::page_source::TextRun;
use expandable_page_list::{
    produce_pages, Page, PageContent, PageCountPolicy, PageSource, Rect, RenderFidelity,
    SourceError,
};
use image::RgbaImage;
use pretty_assertions::assert_eq;
use std::cell::RefCell;

/// Landscape pages with one text run each; page `broken` fails to render.
struct Slides {
    count: usize,
    broken: Option<usize>,
    requests: RefCell<Vec<(usize, u32, RenderFidelity)>>,
}

impl Slides {
    fn new(count: usize) -> Self {
        Self {
            count,
            broken: None,
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl PageSource for Slides {
    fn page_count(&self) -> usize {
        self.count
    }

    fn render_page(
        &self,
        index: usize,
        target_width: u32,
        fidelity: RenderFidelity,
    ) -> Result<Page, SourceError> {
        self.requests
            .borrow_mut()
            .push((index, target_width, fidelity));
        if self.broken == Some(index) {
            return Err(SourceError::Render {
                index,
                reason: "corrupt content stream".to_string(),
            });
        }
        Ok(Page {
            image: RgbaImage::new(target_width, target_width * 9 / 16),
            natural_width: 960.0,
            natural_height: 540.0,
            content: PageContent {
                texts: vec![TextRun {
                    text: format!("Slide {}", index + 1),
                    bounds: Rect::new(10.0, 10.0, 100.0, 20.0),
                }],
                ..PageContent::default()
            },
        })
    }
}

#[test]
fn full_policy_renders_every_page_in_order() {
    let slides = Slides::new(24);
    let pages: Vec<Page> = produce_pages(&slides, 1600, PageCountPolicy::Full, RenderFidelity::Print)
        .collect::<Result<_, _>>()
        .expect("all render");

    assert_eq!(pages.len(), 24);
    assert_eq!(pages[23].content.texts[0].text, "Slide 24");
    assert_eq!(pages[0].height(), 900);
    assert_eq!(pages[0].height_at(800.0), 450.0);

    let requests = slides.requests.borrow();
    assert!(requests
        .iter()
        .enumerate()
        .all(|(i, &(index, width, fidelity))| index == i
            && width == 1600
            && fidelity == RenderFidelity::Print));
}

#[test]
fn default_policy_stops_at_the_cap() {
    let slides = Slides::new(24);
    let pages = produce_pages(&slides, 320, PageCountPolicy::default(), RenderFidelity::default());
    assert_eq!(pages.len(), PageCountPolicy::DEFAULT_CAP);
    assert_eq!(pages.filter(Result::is_ok).count(), 20);
    assert_eq!(slides.requests.borrow().len(), 20);
}

#[test]
fn render_failure_surfaces_and_later_pages_still_render() {
    let mut slides = Slides::new(5);
    slides.broken = Some(2);

    let results: Vec<_> =
        produce_pages(&slides, 320, PageCountPolicy::Full, RenderFidelity::Display).collect();
    assert_eq!(results.len(), 5);
    assert!(matches!(
        results[2],
        Err(SourceError::Render { index: 2, .. })
    ));
    assert!(results[3].is_ok());

    // Collecting into one result stops at the first failure.
    let collected: Result<Vec<Page>, _> =
        produce_pages(&slides, 320, PageCountPolicy::Full, RenderFidelity::Display).collect();
    let err = collected.expect_err("page 2 is broken");
    assert_eq!(
        err.to_string(),
        "Failed to render page 2: corrupt content stream"
    );
}

#[test]
fn empty_document_produces_nothing() {
    let slides = Slides::new(0);
    let mut pages = produce_pages(&slides, 320, PageCountPolicy::Capped(5), RenderFidelity::Display);
    assert_eq!(pages.len(), 0);
    assert!(pages.next().is_none());
    assert!(slides.requests.borrow().is_empty());
}
