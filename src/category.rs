/// File categorization by extension.
///
/// This module maps file extensions to category names used as subdirectory
/// names under the sort directory (e.g., ".jpg" -> "Images").
///
/// # Examples
///
/// ```
/// use sortwatch::category::CategoryTable;
///
/// let table = CategoryTable::default();
/// assert_eq!(table.classify(".jpg"), "Images");
/// assert_eq!(table.classify(".MP4"), "Videos");
/// assert_eq!(table.classify(".xyz"), "Others");
/// ```
use std::path::Path;

/// The category files fall into when no extension entry matches.
pub const FALLBACK_CATEGORY: &str = "Others";

/// Ordered mapping from category name to the extensions it covers.
///
/// Lookup walks categories in declaration order and returns the first whose
/// extension list contains the (lowercased) input. Extensions carry the
/// leading dot and must be pairwise disjoint across categories.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<(&'static str, &'static [&'static str])>,
}

impl CategoryTable {
    /// Creates the built-in category table.
    pub fn new() -> Self {
        Self {
            categories: vec![
                ("Images", &[".jpg", ".jpeg", ".png", ".gif", ".bmp"]),
                ("Videos", &[".mp4", ".mkv", ".mov", ".avi"]),
                ("Documents", &[".pdf", ".docx", ".xlsx", ".pptx", ".txt"]),
                ("Archives", &[".zip", ".rar", ".7z", ".gz"]),
                ("Music", &[".mp3", ".wav", ".flac"]),
            ],
        }
    }

    /// Maps an extension (with leading dot) to its category name.
    ///
    /// Matching is case-insensitive. Unknown extensions fall back to
    /// [`FALLBACK_CATEGORY`].
    ///
    /// # Examples
    ///
    /// ```
    /// use sortwatch::category::CategoryTable;
    ///
    /// let table = CategoryTable::default();
    /// assert_eq!(table.classify(".PDF"), "Documents");
    /// assert_eq!(table.classify(""), "Others");
    /// ```
    pub fn classify(&self, extension: &str) -> &'static str {
        let ext = extension.to_lowercase();
        self.categories
            .iter()
            .find(|(_, exts)| exts.iter().any(|e| *e == ext))
            .map(|(name, _)| *name)
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// Maps a path to its category name based on the file extension.
    ///
    /// Paths without an extension classify as [`FALLBACK_CATEGORY`].
    pub fn classify_path(&self, path: &Path) -> &'static str {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.classify(&format!(".{}", ext)),
            None => FALLBACK_CATEGORY,
        }
    }

    /// Returns the category names in declaration order, fallback excluded.
    pub fn category_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.categories.iter().map(|(name, _)| *name)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new()
    }
}
