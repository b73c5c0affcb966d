//! Sitemap entries and `robots.txt`.

use chrono::{DateTime, SecondsFormat, Utc};

/// Priority given to every entry.
pub const DEFAULT_PRIORITY: f32 = 0.9;

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: DateTime<Utc>,
    pub priority: f32,
}

impl SitemapEntry {
    /// `lastmod` as RFC 3339 with millisecond precision.
    #[must_use]
    pub fn last_modified_rfc3339(&self) -> String {
        self.last_modified
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

fn site_root(site: &str) -> &str {
    site.trim_end_matches('/')
}

/// The home entry followed by one entry per product slug.
///
/// Every entry is stamped with `generated_at`. Blank slugs are skipped.
#[must_use]
pub fn entries<'a>(
    site: &str,
    slugs: impl IntoIterator<Item = &'a str>,
    generated_at: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let root = site_root(site);
    let entry = |loc: String| SitemapEntry {
        loc,
        last_modified: generated_at,
        priority: DEFAULT_PRIORITY,
    };

    std::iter::once(entry(format!("{root}/")))
        .chain(
            slugs
                .into_iter()
                .map(str::trim)
                .filter(|slug| !slug.is_empty())
                .map(|slug| entry(format!("{root}/product/{slug}"))),
        )
        .collect()
}

/// The `robots.txt` body.
#[must_use]
pub fn robots_txt(site: &str) -> String {
    format!(
        "User-agent: *\nDisallow: /system/\nDisallow: /dashboard/\nSitemap: {}/sitemap.xml\n",
        site_root(site)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_home_then_products() {
        let list = entries("https://shop.example/", ["tea", "coffee"], now());
        let locs: Vec<_> = list.iter().map(|e| e.loc.as_str()).collect();
        assert_eq!(
            locs,
            [
                "https://shop.example/",
                "https://shop.example/product/tea",
                "https://shop.example/product/coffee",
            ]
        );
        assert!(list.iter().all(|e| (e.priority - 0.9).abs() < f32::EPSILON));
        assert!(list.iter().all(|e| e.last_modified == now()));
    }

    #[test]
    fn test_no_products_is_home_only() {
        let list = entries("https://shop.example", std::iter::empty(), now());
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].loc, "https://shop.example/");
    }

    #[test]
    fn test_blank_slugs_skipped() {
        let list = entries("https://shop.example", ["", "  ", "tea"], now());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_lastmod_format() {
        let list = entries("https://shop.example", std::iter::empty(), now());
        assert_eq!(list[0].last_modified_rfc3339(), "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn test_robots() {
        let body = robots_txt("https://shop.example/");
        assert!(body.starts_with("User-agent: *\n"));
        assert!(body.contains("Disallow: /system/\n"));
        assert!(body.contains("Disallow: /dashboard/\n"));
        assert!(body.ends_with("Sitemap: https://shop.example/sitemap.xml\n"));
    }
}
