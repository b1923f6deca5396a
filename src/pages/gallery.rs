use async_trait::async_trait;
use tracing::error;

use super::{PageContext, PageController, escape};
use crate::{assets::fetch_json, error::ShellError, models::GalleryDocument};

pub const GALLERY_RESOURCE: &str = "data/gallery.json";
pub const GALLERY_CONTAINER: &str = "gallery-container";
pub const GALLERY_FAILED: &str = "Unable to load the gallery at this time.";

/// GalleryPage
///
/// Thumbnails link to the full image for the lightbox script.
#[derive(Debug, Default)]
pub struct GalleryPage;

impl GalleryPage {
    pub fn render(document: &GalleryDocument) -> String {
        document
            .images
            .iter()
            .map(|image| {
                format!(
                    r#"<div class="col-md-4 mb-3"><a href="{}" data-lightbox="gallery" data-title="{}"><img src="{}" alt="{}" class="img-fluid rounded"></a></div>"#,
                    escape(&image.src),
                    escape(&image.title),
                    escape(&image.thumbnail),
                    escape(&image.title),
                )
            })
            .collect()
    }
}

#[async_trait]
impl PageController for GalleryPage {
    async fn enter(&self, ctx: &PageContext) -> Result<(), ShellError> {
        let html = match fetch_json::<GalleryDocument>(ctx.assets.as_ref(), GALLERY_RESOURCE).await {
            Ok(document) => Self::render(&document),
            Err(e) => {
                error!(error = %e, "error loading gallery images");
                format!("<p>{GALLERY_FAILED}</p>")
            }
        };
        ctx.host.set_region_markup(GALLERY_CONTAINER, &html)
    }
}
