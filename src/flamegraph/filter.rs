//! Frame-inclusion predicates

/// Decides whether a frame of the given owning type contributes a node
pub trait FrameFilter {
    fn includes(&self, type_name: &str) -> bool;
}

impl<F> FrameFilter for F
where
    F: Fn(&str) -> bool,
{
    fn includes(&self, type_name: &str) -> bool {
        self(type_name)
    }
}

/// Includes every frame
#[derive(Debug, Clone, Copy, Default)]
pub struct AllFrames;

impl FrameFilter for AllFrames {
    fn includes(&self, _type_name: &str) -> bool {
        true
    }
}

/// Class-name fragments of generated proxy types, never useful in a graph
const PROXY_MARKERS: [&str; 2] = ["$$FastClassBySpringCGLIB$$", "$$EnhancerBySpringCGLIB$$"];

/// Includes frames whose owning type starts with a prefix, minus proxy artifacts
#[derive(Debug, Clone)]
pub struct PackagePrefixFilter {
    prefix: String,
}

impl PackagePrefixFilter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl FrameFilter for PackagePrefixFilter {
    fn includes(&self, type_name: &str) -> bool {
        type_name.starts_with(&self.prefix)
            && !PROXY_MARKERS
                .iter()
                .any(|marker| type_name.contains(marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_filter() {
        let filter = PackagePrefixFilter::new("com.acme.");
        assert!(filter.includes("com.acme.orders.OrderService"));
        assert!(!filter.includes("org.springframework.web.Dispatcher"));
        assert!(!filter.includes("com.acme.orders.OrderService$$EnhancerBySpringCGLIB$$1f2e"));
        assert!(!filter.includes("com.acme.orders.OrderService$$FastClassBySpringCGLIB$$99"));
    }

    #[test]
    fn test_closure_filter() {
        let filter = |name: &str| name.len() > 3;
        assert!(filter.includes("Long"));
        assert!(!FrameFilter::includes(&filter, "No"));
        assert!(AllFrames.includes(""));
    }
}
