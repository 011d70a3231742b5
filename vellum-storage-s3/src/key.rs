/// Reasons a filename cannot become an object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    Empty,
    Traversal,
    InvalidCharacter(char),
}

impl std::fmt::Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyError::Empty => write!(f, "filename does not name an object"),
            KeyError::Traversal => write!(f, "filename must not contain `..` segments"),
            KeyError::InvalidCharacter(c) => write!(f, "filename contains invalid character {c:?}"),
        }
    }
}

impl std::error::Error for KeyError {}

/// Join a collection prefix and a client filename into an object key.
///
/// Both are split on `/`; empty and `.` segments are dropped and the rest
/// joined with `/`. The key never starts with `/`. Filenames containing `..`
/// segments, backslashes, or control characters are rejected so the key
/// stays below `prefix`.
pub fn object_key(prefix: &str, filename: &str) -> Result<String, KeyError> {
    if let Some(c) = filename.chars().find(|c| *c == '\\' || c.is_control()) {
        return Err(KeyError::InvalidCharacter(c));
    }
    if filename.split('/').any(|segment| segment == "..") {
        return Err(KeyError::Traversal);
    }

    let file_segments: Vec<&str> = segments(filename).collect();
    if file_segments.is_empty() {
        return Err(KeyError::Empty);
    }

    let mut key: Vec<&str> = Vec::new();
    for segment in segments(prefix) {
        if segment == ".." {
            key.pop();
        } else {
            key.push(segment);
        }
    }
    key.extend(file_segments);
    Ok(key.join("/"))
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_prefix_and_filename() {
        assert_eq!(object_key("uploads", "a.png").unwrap(), "uploads/a.png");
        assert_eq!(object_key("", "a.png").unwrap(), "a.png");
        assert_eq!(object_key("media/2024/", "cat.jpg").unwrap(), "media/2024/cat.jpg");
    }

    #[test]
    fn normalizes_redundant_segments() {
        assert_eq!(object_key("/uploads/./", "/nested//a.png").unwrap(), "uploads/nested/a.png");
        assert_eq!(object_key("a/../b", "c.txt").unwrap(), "b/c.txt");
    }

    #[test]
    fn rejects_traversal_and_bad_characters() {
        assert_eq!(object_key("uploads", "../secret.txt"), Err(KeyError::Traversal));
        assert_eq!(object_key("uploads", "x/../../y"), Err(KeyError::Traversal));
        assert_eq!(
            object_key("uploads", "..\\win.ini"),
            Err(KeyError::InvalidCharacter('\\'))
        );
        assert_eq!(
            object_key("uploads", "a\nb"),
            Err(KeyError::InvalidCharacter('\n'))
        );
    }

    #[test]
    fn rejects_empty_names() {
        assert_eq!(object_key("uploads", ""), Err(KeyError::Empty));
        assert_eq!(object_key("uploads", "./"), Err(KeyError::Empty));
    }

    #[test]
    fn dots_inside_names_are_fine() {
        assert_eq!(object_key("", "archive..tar.gz").unwrap(), "archive..tar.gz");
    }
}
