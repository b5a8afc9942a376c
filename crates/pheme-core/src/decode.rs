//! Pure decoding of raw review fragments into [`Review`] records.

use crate::error::AppError;
use crate::models::Review;

/// Raw strings read out of one review fragment, before decoding.
///
/// The pagination engine materializes this from the live DOM; everything
/// below is pure and testable without a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    /// Headline sub-element text.
    pub title: String,
    /// `title` attribute of the date sub-element, verbatim.
    pub date_attr: String,
    /// Class attribute of the rating sub-element, verbatim.
    pub rating_class: String,
    /// Full visible text of the fragment.
    pub text: String,
    /// Text of the hidden full-text sub-element, when the review was
    /// truncated on the page.
    pub hidden_text: Option<String>,
}

/// Decode one fragment into a [`Review`].
pub fn decode_review(raw: &RawFragment) -> Result<Review, AppError> {
    Ok(Review {
        title: raw.title.clone(),
        date: strip_handle_artifact(&raw.date_attr).to_string(),
        text: merge_hidden_text(&raw.text, raw.hidden_text.as_deref()),
        rating: parse_rating(&raw.rating_class)?,
    })
}

/// Attribute values read through a remote handle sometimes arrive with the
/// handle's serialization prefix still attached. Strip it.
fn strip_handle_artifact(value: &str) -> &str {
    value.strip_prefix("JSHandle:").unwrap_or(value)
}

/// Merge a truncated visible text with its hidden remainder.
///
/// The visible text is cut at its *last* literal `"..."` and joined with
/// the hidden text by a single space. Without a hidden part the visible
/// text passes through unchanged.
pub fn merge_hidden_text(visible: &str, hidden: Option<&str>) -> String {
    let Some(hidden) = hidden else {
        return visible.to_string();
    };
    match visible.rfind("...") {
        Some(idx) => format!("{} {}", &visible[..idx], hidden),
        None => format!("{visible} {hidden}"),
    }
}

/// Parse the 1–5 rating out of the rating element's class attribute.
///
/// The site encodes rating×10 in the final two characters of the last
/// class token (`"… bubble_50"` → 50 → 5). The two-character parse is the
/// site's naming convention and is kept literal.
pub fn parse_rating(class_attr: &str) -> Result<u8, AppError> {
    let token = class_attr.rsplit(' ').next().unwrap_or(class_attr);
    let digits = token
        .len()
        .checked_sub(2)
        .and_then(|start| token.get(start..))
        .ok_or_else(|| AppError::Decode(format!("rating token too short: {token:?}")))?;
    let scaled: u8 = digits
        .parse()
        .map_err(|_| AppError::Decode(format!("rating token not numeric: {token:?}")))?;
    let rating = scaled / 10;
    if !(1..=5).contains(&rating) {
        return Err(AppError::Decode(format!(
            "rating {rating} out of range (token {token:?})"
        )));
    }
    Ok(rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawFragment {
        RawFragment {
            title: "Wonderful evening".into(),
            date_attr: "July 12, 2025".into(),
            rating_class: "ui_bubble_rating bubble_40".into(),
            text: "Great food and service".into(),
            hidden_text: None,
        }
    }

    #[test]
    fn decodes_plain_fragment() {
        let review = decode_review(&raw()).unwrap();
        assert_eq!(review.title, "Wonderful evening");
        assert_eq!(review.date, "July 12, 2025");
        assert_eq!(review.text, "Great food and service");
        assert_eq!(review.rating, 4);
    }

    #[test]
    fn strips_handle_serialization_prefix_from_date() {
        let mut fragment = raw();
        fragment.date_attr = "JSHandle:July 12, 2025".into();
        let review = decode_review(&fragment).unwrap();
        assert_eq!(review.date, "July 12, 2025");
    }

    #[test]
    fn merges_hidden_text_at_last_ellipsis() {
        assert_eq!(
            merge_hidden_text("Great food was...", Some("amazing and fresh")),
            "Great food was amazing and fresh"
        );
    }

    #[test]
    fn merge_uses_last_ellipsis_only() {
        assert_eq!(
            merge_hidden_text("Well... the food was...", Some("fine")),
            "Well... the food was fine"
        );
    }

    #[test]
    fn merge_without_hidden_text_is_identity() {
        assert_eq!(merge_hidden_text("Short review", None), "Short review");
    }

    #[test]
    fn merge_without_ellipsis_appends() {
        assert_eq!(merge_hidden_text("Truncated", Some("rest")), "Truncated rest");
    }

    #[test]
    fn rating_token_endings_decode() {
        assert_eq!(parse_rating("ui_bubble_rating bubble_50").unwrap(), 5);
        assert_eq!(parse_rating("ui_bubble_rating bubble_10").unwrap(), 1);
        assert_eq!(parse_rating("bubble_30").unwrap(), 3);
    }

    #[test]
    fn rating_uses_token_after_last_space() {
        assert_eq!(parse_rating("a b bubble_20").unwrap(), 2);
    }

    #[test]
    fn bad_rating_tokens_are_decode_errors() {
        assert!(matches!(parse_rating("bubble_xx"), Err(AppError::Decode(_))));
        assert!(matches!(parse_rating("x"), Err(AppError::Decode(_))));
        assert!(matches!(parse_rating("bubble_00"), Err(AppError::Decode(_))));
    }
}
