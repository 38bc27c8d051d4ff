/// The handler a request path maps to
///
/// Routing only looks at the path; the method is left to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Root,
    UserAgent,
    /// The segment to echo back
    Echo(&'a str),
    /// The file name relative to the serving directory
    Files(&'a str),
    NotFound,
}

impl<'a> Route<'a> {
    /// Picks a route from the segment right after the leading `/`
    ///
    /// `/echo` without a payload segment and `/files/` without a name have nothing to work on
    /// and resolve to [`Route::NotFound`].
    pub fn resolve(path: &'a str) -> Self {
        if path == "/" {
            return Self::Root;
        }

        let mut segments = path.split('/').skip(1);
        match segments.next() {
            Some("user-agent") => Self::UserAgent,
            Some("echo") => segments.next().map_or(Self::NotFound, Self::Echo),
            Some("files") => match path.strip_prefix("/files/") {
                Some(name) if !name.is_empty() => Self::Files(name),
                _ => Self::NotFound,
            },
            _ => Self::NotFound,
        }
    }
}
