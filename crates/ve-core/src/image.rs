//! Image source normalization.
//!
//! Image optimizers rewrite `src` into a proxy URL carrying the real source
//! in a query parameter. Sources are compared and reported in their
//! unwrapped, absolute form.

use serde::Deserialize;
use url::Url;

/// The proxy rewriting pattern: `<path>?<param>=<real url>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageProxy {
    pub path: String,
    pub param: String,
}

impl Default for ImageProxy {
    fn default() -> Self {
        Self {
            path: "/_next/image".into(),
            param: "url".into(),
        }
    }
}

/// Resolve `input` against `origin` and unwrap proxy URLs.
///
/// Empty input stays empty; input that cannot be resolved is returned as-is.
pub fn normalize_image_src(input: &str, origin: &str, proxy: &ImageProxy) -> String {
    if input.is_empty() {
        return String::new();
    }
    let resolved = match Url::parse(origin) {
        Ok(base) => base.join(input),
        Err(_) => Url::parse(input),
    };
    let Ok(url) = resolved else {
        return input.to_string();
    };

    if url.path() == proxy.path
        && let Some((_, real)) = url.query_pairs().find(|(k, _)| *k == proxy.param)
        && !real.is_empty()
    {
        return real.into_owned();
    }
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://app.example.com";

    #[test]
    fn relative_sources_resolve_against_origin() {
        assert_eq!(
            normalize_image_src("/img/hero.png", ORIGIN, &ImageProxy::default()),
            "https://app.example.com/img/hero.png"
        );
    }

    #[test]
    fn proxy_urls_are_unwrapped() {
        let src = "/_next/image?url=https%3A%2F%2Fcdn.example.com%2Fa.jpg&w=1080&q=75";
        assert_eq!(
            normalize_image_src(src, ORIGIN, &ImageProxy::default()),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn proxy_with_relative_target() {
        let src = "https://app.example.com/_next/image?url=%2Fhero.png&w=640";
        assert_eq!(
            normalize_image_src(src, ORIGIN, &ImageProxy::default()),
            "/hero.png"
        );
    }

    #[test]
    fn empty_and_unresolvable_inputs() {
        assert_eq!(normalize_image_src("", ORIGIN, &ImageProxy::default()), "");
        assert_eq!(
            normalize_image_src("data-not-a-url", "not an origin", &ImageProxy::default()),
            "data-not-a-url"
        );
    }
}
