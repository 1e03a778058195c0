/// Strips or substitutes characters that are not allowed in file names.
///
/// Replace mode mirrors what SABnzbd does when its "replace illegal
/// characters" option is on, so names built here line up with the folders
/// and files SABnzbd produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sanitizer {
    pub replace: bool,
}

impl Sanitizer {
    pub fn new(replace: bool) -> Self {
        Self { replace }
    }

    pub fn sanitize(&self, name: &str) -> String {
        name.chars()
            .filter_map(|c| match substitute(c) {
                Some(good) if self.replace => Some(good),
                Some(_) => None,
                None => Some(c),
            })
            .collect::<String>()
            .trim()
            .to_string()
    }
}

fn substitute(c: char) -> Option<char> {
    match c {
        '\\' | '/' => Some('+'),
        '<' => Some('{'),
        '>' => Some('}'),
        '?' => Some('!'),
        '*' => Some('@'),
        ':' => Some('-'),
        '|' => Some('#'),
        '"' => Some('`'),
        _ => None,
    }
}
