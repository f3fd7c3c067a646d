//! Bounded tag collection and its staged editor.
//!
//! Committed tags live in `FormValues::tags`. The editor owns only the
//! draft buffer; a commit gesture moves the trimmed draft into the
//! committed list through [`add_tag`].

use super::model::MAX_TAGS;

/// Append `candidate` (trimmed) to `tags`.
///
/// No-op when the trimmed candidate is empty, already present (exact
/// match), or the list is full. Returns whether `tags` changed.
pub fn add_tag(tags: &mut Vec<String>, candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() || tags.len() >= MAX_TAGS || tags.iter().any(|t| t == candidate) {
        return false;
    }
    tags.push(candidate.to_string());
    true
}

/// Remove the tag at `index`. No-op when out of range.
pub fn remove_tag(tags: &mut Vec<String>, index: usize) -> bool {
    if index >= tags.len() {
        return false;
    }
    tags.remove(index);
    true
}

/// Whether no more tags can be committed.
pub fn is_full(tags: &[String]) -> bool {
    tags.len() >= MAX_TAGS
}

/// A discrete gesture on the tag input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKey {
    Char(char),
    Enter,
    Space,
    Backspace,
}

/// Draft buffer for the tag input.
#[derive(Debug, Clone, Default)]
pub struct TagEditor {
    draft: String,
}

impl TagEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether the input should be presented as disabled.
    pub fn is_disabled(&self, tags: &[String]) -> bool {
        is_full(tags)
    }

    pub fn placeholder(&self, tags: &[String]) -> &'static str {
        if is_full(tags) {
            "Max tags reached"
        } else {
            "Type and press Space/Enter"
        }
    }

    /// Apply a gesture. Returns whether the committed `tags` changed.
    pub fn handle_key(&mut self, key: TagKey, tags: &mut Vec<String>) -> bool {
        match key {
            TagKey::Enter | TagKey::Space | TagKey::Char(' ') => self.commit(tags),
            TagKey::Backspace => {
                if self.draft.is_empty() {
                    match tags.len().checked_sub(1) {
                        Some(last) => remove_tag(tags, last),
                        None => false,
                    }
                } else {
                    self.draft.pop();
                    false
                }
            }
            TagKey::Char(c) => {
                // Keystrokes are dropped while the input is disabled.
                if !is_full(tags) {
                    self.draft.push(c);
                }
                false
            }
        }
    }

    /// Type a run of characters into the draft. Returns whether any typed
    /// space committed a tag.
    pub fn type_text(&mut self, text: &str, tags: &mut Vec<String>) -> bool {
        let mut changed = false;
        for c in text.chars() {
            changed |= self.handle_key(TagKey::Char(c), tags);
        }
        changed
    }

    /// Clear the draft and try to add its trimmed content.
    pub fn commit(&mut self, tags: &mut Vec<String>) -> bool {
        let draft = std::mem::take(&mut self.draft);
        add_tag(tags, &draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn add_appends_in_order() {
        let mut t = Vec::new();
        assert!(add_tag(&mut t, "ai"));
        assert!(add_tag(&mut t, "music"));
        assert_eq!(t, tags(&["ai", "music"]));
    }

    #[test]
    fn add_rejects_blank_and_duplicates() {
        let mut t = tags(&["ai"]);
        assert!(!add_tag(&mut t, ""));
        assert!(!add_tag(&mut t, "   "));
        assert!(!add_tag(&mut t, "ai"));
        assert!(!add_tag(&mut t, " ai "));
        // Exact match only: case differs, so it is a new tag.
        assert!(add_tag(&mut t, "AI"));
        assert_eq!(t, tags(&["ai", "AI"]));
    }

    #[test]
    fn add_stops_at_capacity() {
        let mut t = Vec::new();
        for i in 0..MAX_TAGS {
            assert!(add_tag(&mut t, &format!("tag{i}")));
        }
        assert!(!add_tag(&mut t, "overflow"));
        assert_eq!(t.len(), MAX_TAGS);
        assert!(is_full(&t));
    }

    #[test]
    fn remove_in_and_out_of_range() {
        let mut t = tags(&["a", "b", "c"]);
        assert!(remove_tag(&mut t, 1));
        assert_eq!(t, tags(&["a", "c"]));
        assert!(!remove_tag(&mut t, 2));
        assert!(!remove_tag(&mut Vec::new(), 0));
    }

    #[test]
    fn enter_and_space_commit_trimmed_draft() {
        let mut t = Vec::new();
        let mut editor = TagEditor::new();
        editor.type_text("rust", &mut t);
        assert_eq!(editor.draft(), "rust");
        assert!(editor.handle_key(TagKey::Enter, &mut t));
        assert_eq!(editor.draft(), "");

        editor.type_text("go", &mut t);
        assert!(editor.handle_key(TagKey::Space, &mut t));
        assert_eq!(t, tags(&["rust", "go"]));
    }

    #[test]
    fn typed_space_commits_the_draft() {
        let mut t = Vec::new();
        let mut editor = TagEditor::new();
        assert!(editor.type_text("ai music", &mut t));
        assert_eq!(t, tags(&["ai"]));
        assert_eq!(editor.draft(), "music");

        // Leading spaces commit an empty draft, which adds nothing.
        editor.type_text("  ", &mut t);
        assert_eq!(t, tags(&["ai", "music"]));
        assert!(!editor.handle_key(TagKey::Char(' '), &mut t));
        assert_eq!(editor.draft(), "");
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn committing_duplicate_clears_draft_silently() {
        let mut t = tags(&["rust"]);
        let mut editor = TagEditor::new();
        editor.type_text("rust ", &mut t);
        assert!(!editor.commit(&mut t));
        assert_eq!(editor.draft(), "");
        assert_eq!(t, tags(&["rust"]));
    }

    #[test]
    fn backspace_edits_draft_before_removing_tags() {
        let mut t = tags(&["a", "b"]);
        let mut editor = TagEditor::new();
        editor.type_text("xy", &mut t);
        assert!(!editor.handle_key(TagKey::Backspace, &mut t));
        assert_eq!(editor.draft(), "x");
        assert!(!editor.handle_key(TagKey::Backspace, &mut t));
        assert_eq!(t.len(), 2);
        assert!(editor.handle_key(TagKey::Backspace, &mut t));
        assert_eq!(t, tags(&["a"]));
        assert!(editor.handle_key(TagKey::Backspace, &mut t));
        assert!(!editor.handle_key(TagKey::Backspace, &mut t));
        assert!(t.is_empty());
    }

    #[test]
    fn full_editor_is_disabled_until_room_is_made() {
        let mut t: Vec<String> = (0..MAX_TAGS).map(|i| format!("t{i}")).collect();
        let mut editor = TagEditor::new();
        assert!(editor.is_disabled(&t));
        assert_eq!(editor.placeholder(&t), "Max tags reached");

        editor.type_text("more", &mut t);
        assert_eq!(editor.draft(), "");

        assert!(editor.handle_key(TagKey::Backspace, &mut t));
        assert!(!editor.is_disabled(&t));
        assert_eq!(editor.placeholder(&t), "Type and press Space/Enter");
    }

    #[test]
    fn gesture_sequences_keep_bounds_and_uniqueness() {
        let mut t = Vec::new();
        let mut editor = TagEditor::new();
        let words = ["a", "b", "a", "c", " ", "d", "e", "f", "g", "h", "i", "j", "k", "b"];
        for (i, w) in words.iter().cycle().take(60).enumerate() {
            editor.type_text(w, &mut t);
            let key = if i % 7 == 6 { TagKey::Backspace } else { TagKey::Enter };
            editor.handle_key(key, &mut t);
            editor.commit(&mut t);

            assert!(t.len() <= MAX_TAGS);
            let mut sorted = t.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), t.len(), "duplicate in {t:?}");
            assert!(t.iter().all(|s| !s.trim().is_empty()));
        }
    }
}
