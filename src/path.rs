use std::path::Path;

/// Rewrites analyzer paths relative to a fixed base directory, walking up
/// with `..` segments when the target lives outside of it.
///
/// Paths are compared as plain strings split on `/` or `\`; nothing touches
/// the filesystem. Output always uses `/`.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    base_parts: Vec<String>,
}

impl PathNormalizer {
    pub fn new(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref().to_string_lossy();
        let base_parts = split(strip_scheme(&base))
            .into_iter()
            .map(str::to_string)
            .collect();
        Self { base_parts }
    }

    /// Returns `target` relative to the base directory. When the two share
    /// no leading component, `target` comes back unchanged apart from any
    /// stream scheme.
    pub fn normalize(&self, target: &str) -> String {
        let target = strip_scheme(target);
        let target_parts = split(target);

        let common = self
            .base_parts
            .iter()
            .zip(target_parts.iter())
            .take_while(|(base, target)| base.as_str() == **target)
            .count();
        if common == 0 {
            return target.to_string();
        }

        std::iter::repeat("..")
            .take(self.base_parts.len() - common)
            .chain(target_parts[common..].iter().copied())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn strip_scheme(path: &str) -> &str {
    match path.find("://") {
        Some(position) => &path[position + 3..],
        None => path,
    }
}

/// Non-empty segments only, so the filesystem root never counts as a
/// shared component.
fn split(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_base_prefix_from_descendants() {
        let normalizer = PathNormalizer::new("/repo");
        assert_eq!(normalizer.normalize("/repo/src/A.php"), "src/A.php");
        assert_eq!(normalizer.normalize("/repo/B.php"), "B.php");
    }

    #[test]
    fn ignores_trailing_separator_on_base() {
        let normalizer = PathNormalizer::new("/repo/");
        assert_eq!(normalizer.normalize("/repo/src/A.php"), "src/A.php");
    }

    #[test]
    fn walks_up_to_common_ancestor() {
        let normalizer = PathNormalizer::new("/home/ci/build/repo");
        assert_eq!(
            normalizer.normalize("/home/ci/vendor/lib/Foo.php"),
            "../../vendor/lib/Foo.php"
        );
    }

    #[test]
    fn walks_up_past_target_depth() {
        let normalizer = PathNormalizer::new("/home/ci/build/repo");
        assert_eq!(normalizer.normalize("/home/other.php"), "../../../other.php");
    }

    #[test]
    fn root_alone_is_not_a_shared_component() {
        let normalizer = PathNormalizer::new("/x/y");
        assert_eq!(normalizer.normalize("/a/b/c/d/e.php"), "/a/b/c/d/e.php");
        assert_eq!(
            PathNormalizer::new("/home/ci/build/repo").normalize("/etc/php.ini"),
            "/etc/php.ini"
        );
    }

    #[test]
    fn unrelated_stream_path_loses_only_its_scheme() {
        let normalizer = PathNormalizer::new("/repo");
        assert_eq!(
            normalizer.normalize("phar:///opt/tools/app.phar/src/A.php"),
            "/opt/tools/app.phar/src/A.php"
        );
    }

    #[test]
    fn unrelated_paths_are_returned_unchanged() {
        let normalizer = PathNormalizer::new("/repo");
        assert_eq!(normalizer.normalize("C:\\work\\A.php"), "C:\\work\\A.php");
        assert_eq!(normalizer.normalize("src/A.php"), "src/A.php");
    }

    #[test]
    fn normalizing_twice_is_stable() {
        let normalizer = PathNormalizer::new("/repo");
        let once = normalizer.normalize("/repo/src/A.php");
        assert_eq!(normalizer.normalize(&once), once);
    }

    #[test]
    fn accepts_backslash_separators_and_emits_slashes() {
        let normalizer = PathNormalizer::new("C:\\work\\repo");
        assert_eq!(normalizer.normalize("C:\\work\\repo\\src\\A.php"), "src/A.php");
        assert_eq!(normalizer.normalize("D:\\other\\A.php"), "D:\\other\\A.php");
    }

    #[test]
    fn strips_stream_scheme_before_comparing() {
        let normalizer = PathNormalizer::new("/repo");
        assert_eq!(
            normalizer.normalize("phar:///repo/tools/app.phar/src/A.php"),
            "tools/app.phar/src/A.php"
        );
    }

    #[test]
    fn output_never_starts_with_separator() {
        let normalizer = PathNormalizer::new("/repo");
        let relative = normalizer.normalize("/repo//src/A.php");
        assert_eq!(relative, "src/A.php");
        assert!(!relative.starts_with('/'));
    }
}
