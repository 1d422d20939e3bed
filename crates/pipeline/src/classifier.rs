use tracing::debug;

use prospekt_core::{DocKind, PageSummary, PipelineConfig};

/// Classify a document's composition from its per-page summaries.
///
/// A page is text-bearing when its trimmed native text exceeds
/// `min_text_chars`; it is image-bearing when it embeds at least one raster.
/// The decision order is load-bearing: the ratio test for scanned documents
/// must run before the hybrid fallback, or low-text image-heavy documents
/// would be misfiled as hybrid and never receive full-page recognition.
pub fn classify(summaries: &[PageSummary], config: &PipelineConfig) -> DocKind {
    let total_pages = summaries.len();
    let text_pages = summaries
        .iter()
        .filter(|s| s.text_len > config.min_text_chars)
        .count();
    let image_pages = summaries.iter().filter(|s| s.has_images).count();

    let text_ratio = if total_pages > 0 {
        text_pages as f64 / total_pages as f64
    } else {
        0.0
    };

    let kind = if text_pages == 0 {
        DocKind::Scanned
    } else if text_ratio < config.min_text_ratio && image_pages > 0 {
        DocKind::Scanned
    } else if image_pages > 0 {
        DocKind::Hybrid
    } else {
        DocKind::Digital
    };

    debug!(total_pages, text_pages, image_pages, text_ratio, kind = %kind, "Classified document");
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PipelineConfig {
        PipelineConfig::default()
    }

    fn page(page: u32, text_len: usize, has_images: bool) -> PageSummary {
        PageSummary { page, text_len, has_images }
    }

    #[test]
    fn empty_document_is_scanned() {
        assert_eq!(classify(&[], &cfg()), DocKind::Scanned);
    }

    #[test]
    fn no_text_bearing_pages_is_scanned() {
        let pages = [page(1, 0, false), page(2, 50, true)]; // 50 is not > 50
        assert_eq!(classify(&pages, &cfg()), DocKind::Scanned);
    }

    #[test]
    fn all_text_no_images_is_digital() {
        let pages = [page(1, 400, false), page(2, 900, false)];
        assert_eq!(classify(&pages, &cfg()), DocKind::Digital);
    }

    #[test]
    fn low_ratio_with_images_is_scanned_even_with_rich_pages() {
        // 1 of 4 pages text-bearing → ratio 0.25 < 0.3, and images exist.
        let pages = [
            page(1, 5000, false),
            page(2, 0, true),
            page(3, 0, true),
            page(4, 0, true),
        ];
        assert_eq!(classify(&pages, &cfg()), DocKind::Scanned);
    }

    #[test]
    fn low_ratio_without_images_is_not_scanned() {
        // Same ratio as above but no image-bearing page: falls through to digital.
        let pages = [page(1, 5000, false), page(2, 0, false), page(3, 0, false), page(4, 0, false)];
        assert_eq!(classify(&pages, &cfg()), DocKind::Digital);
    }

    #[test]
    fn text_with_any_images_above_ratio_is_hybrid() {
        // 1 of 3 pages text-bearing → ratio ≈ 0.33 ≥ 0.3.
        let pages = [page(1, 500, false), page(2, 10, true), page(3, 0, true)];
        assert_eq!(classify(&pages, &cfg()), DocKind::Hybrid);
    }

    #[test]
    fn ratio_boundary_is_exclusive() {
        // Exactly at the ratio: 3 of 10 text-bearing = 0.3, not < 0.3 → hybrid.
        let mut pages: Vec<PageSummary> = (1..=3).map(|i| page(i, 100, false)).collect();
        pages.extend((4..=10).map(|i| page(i, 0, true)));
        assert_eq!(classify(&pages, &cfg()), DocKind::Hybrid);
    }
}
