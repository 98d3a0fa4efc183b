//! PDF page source backed by pdfium-render.

use crate::error::SourceError;
use crate::geometry::Rect;
use crate::page_source::{Page, PageContent, PageSource, RenderFidelity, TextRun};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};

/// Binds PDFium from the working directory, next to the executable, or the
/// system library, in that order.
pub fn bind_pdfium() -> Result<Pdfium, SourceError> {
    let mut candidates = vec![Pdfium::pdfium_platform_library_name_at_path("./")];
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(Pdfium::pdfium_platform_library_name_at_path(&exe_dir));
    }

    for candidate in &candidates {
        if let Ok(bindings) = Pdfium::bind_to_library(candidate) {
            tracing::debug!(path = ?candidate, "bound PDFium");
            return Ok(Pdfium::new(bindings));
        }
    }
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| {
            SourceError::Bind(format!(
                "{e:?}. Please install PDFium or download the library from https://github.com/bblanchon/pdfium-binaries"
            ))
        })
}

/// Copies `asset` into `cache_dir` the first time it is requested and returns
/// the cached path. Later calls reuse the copy.
pub fn resolve_local_copy(asset: &Path, cache_dir: &Path) -> Result<PathBuf, SourceError> {
    let file_name = asset
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "document.pdf".into());
    let cached = cache_dir.join(file_name);
    if cached.exists() {
        tracing::debug!(path = %cached.display(), "using cached document");
        return Ok(cached);
    }

    std::fs::create_dir_all(cache_dir).map_err(|source| SourceError::Io {
        path: cache_dir.to_path_buf(),
        source,
    })?;
    std::fs::copy(asset, &cached).map_err(|source| SourceError::Io {
        path: asset.to_path_buf(),
        source,
    })?;
    tracing::info!(from = %asset.display(), to = %cached.display(), "cached document");
    Ok(cached)
}

pub struct PdfiumPageSource<'a> {
    document: PdfDocument<'a>,
}

impl std::fmt::Debug for PdfiumPageSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumPageSource")
            .field("page_count", &self.page_count())
            .finish()
    }
}

impl<'a> PdfiumPageSource<'a> {
    pub fn open(pdfium: &'a Pdfium, path: &Path) -> Result<Self, SourceError> {
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| SourceError::Open {
                path: path.to_path_buf(),
                reason: format!("{e:?}"),
            })?;
        Ok(Self { document })
    }

    fn text_runs(page: &PdfPage, scale: f32) -> Vec<TextRun> {
        let page_height = page.height().value;
        let Ok(text) = page.text() else {
            return Vec::new();
        };
        text.segments()
            .iter()
            .map(|segment| {
                let bounds = segment.bounds();
                TextRun {
                    text: segment.text(),
                    bounds: Rect::new(
                        bounds.left().value * scale,
                        (page_height - bounds.top().value) * scale,
                        bounds.width().value * scale,
                        bounds.height().value * scale,
                    ),
                }
            })
            .collect()
    }
}

impl PageSource for PdfiumPageSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(
        &self,
        index: usize,
        target_width: u32,
        fidelity: RenderFidelity,
    ) -> Result<Page, SourceError> {
        let count = self.page_count();
        let page_index = u16::try_from(index)
            .ok()
            .filter(|_| index < count)
            .ok_or(SourceError::PageOutOfRange { index, count })?;
        let render_error = |e: PdfiumError| SourceError::Render {
            index,
            reason: format!("{e:?}"),
        };

        let page = self.document.pages().get(page_index).map_err(render_error)?;
        let natural_width = page.width().value;
        let natural_height = page.height().value;

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width as i32)
            .render_form_data(true)
            .use_print_quality(fidelity == RenderFidelity::Print)
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(render_error)?;
        let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
        let image = image::RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(
            || SourceError::Render {
                index,
                reason: "bitmap size does not match its buffer".to_string(),
            },
        )?;

        let scale = if natural_width > 0.0 {
            width as f32 / natural_width
        } else {
            1.0
        };
        Ok(Page {
            image,
            natural_width,
            natural_height,
            content: PageContent {
                texts: Self::text_runs(&page, scale),
                ..PageContent::default()
            },
        })
    }
}
