//! Session transcript accumulation and export.

/// File name offered when downloading a transcript.
pub const TRANSCRIPT_FILE_NAME: &str = "arxiv-qa-transcript.txt";

/// MIME type of an exported transcript.
pub const TRANSCRIPT_MIME: &str = "text/plain";

/// Append-only log of the query/response pairs of one session.
///
/// Entries are stored pre-formatted, so the exported file is exactly the
/// concatenation of every completed round-trip in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
    entries: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed round-trip.
    pub fn append(&mut self, query: &str, response: &str) {
        self.text.push_str(&format_entry(query, response));
        self.entries += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of recorded round-trips.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Snapshot the transcript as a download, or `None` while it is empty.
    pub fn export(&self) -> Option<Download> {
        if self.is_empty() {
            return None;
        }

        Some(Download {
            label: "Download Conversation Transcript".to_string(),
            file_name: TRANSCRIPT_FILE_NAME.to_string(),
            mime: TRANSCRIPT_MIME.to_string(),
            content: self.text.clone(),
        })
    }
}

/// Format a single transcript entry.
pub fn format_entry(query: &str, response: &str) -> String {
    format!("Query: {}\nResponse: {}\n\n", query, response)
}

/// A file offered to the user for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub label: String,
    pub file_name: String,
    pub mime: String,
    pub content: String,
}
