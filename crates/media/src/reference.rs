/// Whether a caller-supplied media reference points at the network or the
/// local filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaReference {
    Remote,
    Local,
}

impl MediaReference {
    pub fn classify(reference: &str) -> Self {
        if is_remote(reference) {
            Self::Remote
        } else {
            Self::Local
        }
    }
}

/// `true` iff `reference` starts with `http://` or `https://`, ignoring case.
pub fn is_remote(reference: &str) -> bool {
    has_prefix_ignore_case(reference, "http://") || has_prefix_ignore_case(reference, "https://")
}

fn has_prefix_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("http://example.com/a.png", MediaReference::Remote)]
    #[case("https://example.com/a.png", MediaReference::Remote)]
    #[case("HTTPS://EXAMPLE.COM/A.PNG", MediaReference::Remote)]
    #[case("HtTp://example.com", MediaReference::Remote)]
    #[case("http://", MediaReference::Remote)]
    #[case("/tmp/a.png", MediaReference::Local)]
    #[case("./videos/clip.mp4", MediaReference::Local)]
    #[case("C:\\media\\a.jpg", MediaReference::Local)]
    #[case("ftp://example.com/a.png", MediaReference::Local)]
    #[case("httpx://example.com", MediaReference::Local)]
    #[case("http:/example.com", MediaReference::Local)]
    #[case("", MediaReference::Local)]
    #[case("图片.png", MediaReference::Local)]
    fn classify_reference(#[case] reference: &str, #[case] expected: MediaReference) {
        assert_eq!(MediaReference::classify(reference), expected);
    }
}
