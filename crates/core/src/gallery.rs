//! Gallery records and the dedup/merge used when syncing client-local
//! records into the durable index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Upper bound on entries kept in the durable index.
pub const MAX_GALLERY_ENTRIES: usize = 500;

/// One generated image shown in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryEntry {
    /// Generation job ID that produced the image.
    pub id: String,
    pub image_url: String,
    #[serde(default)]
    pub source_image_url: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    pub created_at: Timestamp,
}

impl GalleryEntry {
    fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.image_url.trim().is_empty()
    }
}

/// Result of [`merge_entries`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Merged entries, newest first.
    pub entries: Vec<GalleryEntry>,
    /// Incoming entries that were new to the index.
    pub added: usize,
    /// Incoming entries that replaced an older stored record.
    pub replaced: usize,
}

#[derive(Default)]
struct Merger {
    /// Slots emptied by a replacement stay `None` so indices remain stable.
    entries: Vec<Option<GalleryEntry>>,
    by_id: HashMap<String, usize>,
    by_url: HashMap<String, usize>,
}

enum Merge {
    Added,
    Replaced,
    Skipped,
}

impl Merger {
    fn offer(&mut self, candidate: GalleryEntry) -> Merge {
        if !candidate.is_valid() {
            return Merge::Skipped;
        }

        // A candidate can collide with one record by id and another by url.
        let mut rivals: Vec<usize> = [
            self.by_id.get(&candidate.id),
            self.by_url.get(&candidate.image_url),
        ]
        .into_iter()
        .flatten()
        .copied()
        .collect();
        rivals.dedup();

        let Some(&slot) = rivals.first() else {
            self.insert(self.entries.len(), candidate);
            return Merge::Added;
        };

        // Ties keep the record already held.
        let outranked = rivals.iter().any(|&i| {
            self.entries[i]
                .as_ref()
                .is_some_and(|held| held.created_at >= candidate.created_at)
        });
        if outranked {
            return Merge::Skipped;
        }

        for &i in &rivals {
            if let Some(old) = self.entries[i].take() {
                self.by_id.remove(&old.id);
                self.by_url.remove(&old.image_url);
            }
        }
        self.insert(slot, candidate);
        Merge::Replaced
    }

    fn insert(&mut self, slot: usize, entry: GalleryEntry) {
        self.by_id.insert(entry.id.clone(), slot);
        self.by_url.insert(entry.image_url.clone(), slot);
        if slot == self.entries.len() {
            self.entries.push(Some(entry));
        } else {
            self.entries[slot] = Some(entry);
        }
    }
}

/// Merge `incoming` client records into the `stored` index.
///
/// Records are matched first by `id`, then by `image_url`. On a match the
/// record with the later `created_at` wins. Records with an empty `id` or
/// `image_url` are dropped. The output is sorted newest first and capped
/// at [`MAX_GALLERY_ENTRIES`].
pub fn merge_entries(stored: Vec<GalleryEntry>, incoming: Vec<GalleryEntry>) -> MergeOutcome {
    let mut merger = Merger::default();
    for entry in stored {
        merger.offer(entry);
    }

    let mut added = 0;
    let mut replaced = 0;
    for entry in incoming {
        match merger.offer(entry) {
            Merge::Added => added += 1,
            Merge::Replaced => replaced += 1,
            Merge::Skipped => {}
        }
    }

    let mut entries: Vec<GalleryEntry> = merger.entries.into_iter().flatten().collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries.truncate(MAX_GALLERY_ENTRIES);

    MergeOutcome {
        entries,
        added,
        replaced,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn entry(id: &str, url: &str, minutes: i64) -> GalleryEntry {
        GalleryEntry {
            id: id.to_string(),
            image_url: url.to_string(),
            source_image_url: None,
            model_id: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn new_entries_are_added() {
        let outcome = merge_entries(
            vec![entry("a", "https://x/a.png", 0)],
            vec![entry("b", "https://x/b.png", 1)],
        );
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(outcome.entries[0].id, "b");
    }

    #[test]
    fn same_id_keeps_newer_record() {
        let outcome = merge_entries(
            vec![entry("a", "https://x/old.png", 0)],
            vec![entry("a", "https://x/new.png", 5)],
        );
        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].image_url, "https://x/new.png");
    }

    #[test]
    fn same_id_older_incoming_is_skipped() {
        let outcome = merge_entries(
            vec![entry("a", "https://x/stored.png", 5)],
            vec![entry("a", "https://x/stale.png", 0)],
        );
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.replaced, 0);
        assert_eq!(outcome.entries[0].image_url, "https://x/stored.png");
    }

    #[test]
    fn tie_keeps_stored_record() {
        let outcome = merge_entries(
            vec![entry("a", "https://x/stored.png", 3)],
            vec![entry("a", "https://x/client.png", 3)],
        );
        assert_eq!(outcome.entries[0].image_url, "https://x/stored.png");
    }

    #[test]
    fn same_url_different_id_is_deduplicated() {
        let outcome = merge_entries(
            vec![entry("a", "https://x/same.png", 0)],
            vec![entry("b", "https://x/same.png", 1)],
        );
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].id, "b");
    }

    #[test]
    fn replacement_resolves_id_and_url_collisions_together() {
        let outcome = merge_entries(
            vec![entry("a", "https://x/1.png", 0), entry("b", "https://x/2.png", 0)],
            vec![entry("a", "https://x/2.png", 5)],
        );

        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].id, "a");
        assert_eq!(outcome.entries[0].image_url, "https://x/2.png");
    }

    #[test]
    fn candidate_losing_to_either_collision_is_skipped() {
        let outcome = merge_entries(
            vec![entry("a", "https://x/1.png", 0), entry("b", "https://x/2.png", 9)],
            vec![entry("a", "https://x/2.png", 5)],
        );

        assert_eq!(outcome.replaced, 0);
        let pairs: Vec<_> = outcome
            .entries
            .iter()
            .map(|e| (e.id.as_str(), e.image_url.as_str()))
            .collect();
        assert_eq!(pairs, [("b", "https://x/2.png"), ("a", "https://x/1.png")]);
    }

    #[test]
    fn urls_and_ids_stay_unique_after_merge() {
        let stored = vec![
            entry("a", "https://x/1.png", 0),
            entry("b", "https://x/2.png", 1),
            entry("c", "https://x/3.png", 2),
        ];
        let incoming = vec![
            entry("a", "https://x/3.png", 6),
            entry("d", "https://x/2.png", 7),
            entry("c", "https://x/4.png", 8),
        ];
        let outcome = merge_entries(stored, incoming);

        let mut ids: Vec<_> = outcome.entries.iter().map(|e| e.id.clone()).collect();
        let mut urls: Vec<_> = outcome.entries.iter().map(|e| e.image_url.clone()).collect();
        let total = outcome.entries.len();
        ids.sort();
        ids.dedup();
        urls.sort();
        urls.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(urls.len(), total);
    }

    #[test]
    fn duplicates_within_incoming_collapse() {
        let outcome = merge_entries(
            Vec::new(),
            vec![
                entry("a", "https://x/a.png", 0),
                entry("a", "https://x/a.png", 0),
            ],
        );
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.entries.len(), 1);
    }

    #[test]
    fn invalid_entries_are_dropped() {
        let outcome = merge_entries(
            Vec::new(),
            vec![entry("", "https://x/a.png", 0), entry("b", " ", 0)],
        );
        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.added, 0);
    }

    #[test]
    fn output_is_capped() {
        let incoming = (0..(MAX_GALLERY_ENTRIES as i64 + 10))
            .map(|i| entry(&format!("id-{i}"), &format!("https://x/{i}.png"), i))
            .collect();
        let outcome = merge_entries(Vec::new(), incoming);
        assert_eq!(outcome.entries.len(), MAX_GALLERY_ENTRIES);
        // Newest survive the cap.
        assert_eq!(
            outcome.entries[0].id,
            format!("id-{}", MAX_GALLERY_ENTRIES + 9)
        );
    }
}
