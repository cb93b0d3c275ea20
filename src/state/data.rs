/// Shared data structures for the application state
///
/// These structs represent the records that flow between the database
/// layer and everything else. Photos are immutable once captured; only
/// projects carry a mutable timestamp (`last_modified_at`).

use chrono::{DateTime, Duration, Utc};

/// A named, independent container for one photo series.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Unique database ID
    pub id: i64,
    /// Unique, user-chosen name (case-sensitive)
    pub name: String,
    /// When the project was created
    pub created_at: DateTime<Utc>,
    /// Updated whenever a photo is added to the project
    pub last_modified_at: DateTime<Utc>,
}

/// A single captured photo within a project's series.
///
/// `seq` is assigned as max(existing)+1 at insertion and never reused,
/// even after deletions, so it both orders the series and survives as a
/// stable label for each shot.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    /// Unique database ID
    pub id: i64,
    /// Owning project
    pub project_id: i64,
    /// Encoded still image (extraction input and thumbnail source)
    pub image_bytes: Vec<u8>,
    /// Pixel width as captured (not as displayed)
    pub width: u32,
    /// Pixel height as captured
    pub height: u32,
    /// Whether the capture came from a front-facing camera. Recorded at
    /// capture time and used permanently for overlay mirroring; it is
    /// never re-derived because camera selection may change later.
    pub from_front_camera: bool,
    /// Position within the project, strictly increasing, never renumbered
    pub seq: i64,
    /// When the photo was captured
    pub captured_at: DateTime<Utc>,
}

/// Format a capture time relative to `now` for human display.
///
/// Today: "Just now" / "12m ago" / "14:05". This week: "Yesterday 14:05"
/// or "Tue 14:05". Older: "Mar 3".
pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp);

    if diff < Duration::zero() {
        // Clock skew; just show the time rather than "in the future"
        return timestamp.format("%H:%M").to_string();
    }

    if diff.num_days() == 0 {
        if diff.num_minutes() < 1 {
            "Just now".to_string()
        } else if diff.num_minutes() < 60 {
            format!("{}m ago", diff.num_minutes())
        } else {
            timestamp.format("%H:%M").to_string()
        }
    } else if diff.num_days() < 7 {
        if diff.num_days() == 1 {
            format!("Yesterday {}", timestamp.format("%H:%M"))
        } else {
            timestamp.format("%a %H:%M").to_string()
        }
    } else {
        timestamp.format("%b %-d").to_string()
    }
}
