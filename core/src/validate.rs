//! Field checks applied before an entry is sent to the backend.
//!
//! Lengths are counted in characters, not bytes. Images are expected as
//! base64 `data:` URLs; only the declared type and decoded size are checked.

use crate::types::{CreateEntry, UpdateEntry};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;
pub const IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Per-field messages. A field is `None` when it passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryErrors {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl EntryErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image.is_none()
    }

    /// Messages in field order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        [&self.title, &self.description, &self.image]
            .into_iter()
            .filter_map(|m| m.as_deref())
    }
}

pub fn validate_create(input: &CreateEntry) -> Result<(), EntryErrors> {
    let errors = EntryErrors {
        title: check_title(&input.title),
        description: check_description(&input.description),
        image: input.image.as_deref().and_then(check_image),
    };
    finish(errors)
}

pub fn validate_update(input: &UpdateEntry) -> Result<(), EntryErrors> {
    let errors = EntryErrors {
        title: input.title.as_deref().and_then(check_title),
        description: input.description.as_deref().and_then(check_description),
        image: input.image.as_deref().and_then(check_image),
    };
    finish(errors)
}

fn finish(errors: EntryErrors) -> Result<(), EntryErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_title(title: &str) -> Option<String> {
    if title.trim().is_empty() {
        Some("Title is required".to_string())
    } else if title.chars().count() > TITLE_MAX_CHARS {
        Some(format!("Title must be less than {TITLE_MAX_CHARS} characters"))
    } else {
        None
    }
}

fn check_description(description: &str) -> Option<String> {
    if description.trim().is_empty() {
        Some("Description is required".to_string())
    } else if description.chars().count() > DESCRIPTION_MAX_CHARS {
        Some(format!(
            "Description must be less than {DESCRIPTION_MAX_CHARS} characters"
        ))
    } else {
        None
    }
}

fn check_image(image: &str) -> Option<String> {
    let Some((media_type, payload)) = split_data_url(image) else {
        return Some("Only JPEG, PNG, and WebP images are allowed".to_string());
    };
    if !IMAGE_TYPES.contains(&media_type) {
        return Some("Only JPEG, PNG, and WebP images are allowed".to_string());
    }
    if decoded_len(payload) > IMAGE_MAX_BYTES {
        return Some("Image must be less than 5MB".to_string());
    }
    None
}

/// `data:<type>;base64,<payload>` → `(type, payload)`.
fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let media_type = header.strip_suffix(";base64")?;
    Some((media_type, payload))
}

fn decoded_len(payload: &str) -> usize {
    let payload = payload.trim_end();
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    ((payload.len() / 4) * 3 + (payload.len() % 4) * 3 / 4).saturating_sub(padding.min(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: &str, description: &str, image: Option<String>) -> CreateEntry {
        CreateEntry {
            title: title.to_string(),
            description: description.to_string(),
            image,
        }
    }

    #[test]
    fn valid_entry_passes() {
        let input = create("Title", "Body", Some("data:image/png;base64,iVBORw0KGgo=".to_string()));
        assert_eq!(validate_create(&input), Ok(()));
    }

    #[test]
    fn blank_fields_are_required() {
        let errors = validate_create(&create("   ", "", None)).unwrap_err();
        assert_eq!(errors.title.as_deref(), Some("Title is required"));
        assert_eq!(errors.description.as_deref(), Some("Description is required"));
        assert!(errors.image.is_none());
        assert_eq!(errors.messages().count(), 2);
    }

    #[test]
    fn length_limits_count_characters() {
        let title = "é".repeat(TITLE_MAX_CHARS);
        assert_eq!(validate_create(&create(&title, "ok", None)), Ok(()));

        let errors = validate_create(&create(&"a".repeat(101), &"b".repeat(1001), None)).unwrap_err();
        assert_eq!(
            errors.title.as_deref(),
            Some("Title must be less than 100 characters")
        );
        assert_eq!(
            errors.description.as_deref(),
            Some("Description must be less than 1000 characters")
        );
    }

    #[test]
    fn rejects_unsupported_image_types() {
        for image in ["data:image/gif;base64,R0lGOD==", "https://example.com/a.png", "data:image/png,raw"] {
            let errors = validate_create(&create("t", "d", Some(image.to_string()))).unwrap_err();
            assert_eq!(
                errors.image.as_deref(),
                Some("Only JPEG, PNG, and WebP images are allowed"),
                "{image}"
            );
        }
    }

    #[test]
    fn rejects_oversized_image() {
        // 4 base64 chars decode to 3 bytes.
        let chars = (IMAGE_MAX_BYTES / 3 + 1) * 4;
        let image = format!("data:image/jpeg;base64,{}", "A".repeat(chars));
        let errors = validate_create(&create("t", "d", Some(image))).unwrap_err();
        assert_eq!(errors.image.as_deref(), Some("Image must be less than 5MB"));
    }

    #[test]
    fn decoded_len_accounts_for_padding() {
        assert_eq!(decoded_len("QQ=="), 1);
        assert_eq!(decoded_len("QUI="), 2);
        assert_eq!(decoded_len("QUJD"), 3);
        assert_eq!(decoded_len(""), 0);
    }

    #[test]
    fn update_checks_only_supplied_fields() {
        assert_eq!(validate_update(&UpdateEntry::default()), Ok(()));

        let input = UpdateEntry {
            title: Some(" ".to_string()),
            ..UpdateEntry::default()
        };
        let errors = validate_update(&input).unwrap_err();
        assert_eq!(errors.title.as_deref(), Some("Title is required"));
        assert!(errors.description.is_none());
    }
}
