//! Zoomable, fling-scrollable list of document pages.
//!
//! The interaction core is [`controller::GestureScrollController`]: it reads
//! pointer events and decides, per gesture, whether motion zooms and pans the
//! whole page surface, scrolls the list underneath, or cycles the double-tap
//! zoom ladder. Release velocity continues as a fling the host advances per
//! frame.
//!
//! Pages come from a [`page_source::PageSource`]; [`pdfium::PdfiumPageSource`]
//! renders PDF documents.

pub mod config;
pub mod controller;
pub mod error;
pub mod fling;
pub mod geometry;
pub mod input;
pub mod page_source;
pub mod pdfium;
pub mod pointer;
pub mod scroll;
pub mod scrollbar;
pub mod velocity;
pub mod zoom;

pub use config::{ControllerConfig, VerticalClaimPolicy};
pub use controller::{GestureOutcome, GestureScrollController, GestureSession, VerticalRoute};
pub use error::{ConfigError, SourceError};
pub use geometry::{Offset, Rect, Size};
pub use page_source::{produce_pages, Page, PageContent, PageCountPolicy, PageSource, RenderFidelity};
pub use scroll::{ListState, ScrollableList};
pub use scrollbar::{KnobSizing, Scrollbar, ScrollbarConfig};
pub use zoom::{Extent, ZoomState};
