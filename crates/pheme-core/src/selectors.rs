//! CSS selectors for the target site's review-listing markup.
//!
//! These are deliberately specific to one site; this is not a general
//! crawler. Keeping them in one place makes markup churn a one-file fix.

/// One review's rendered subtree on a listing page.
pub const REVIEW_FRAGMENT: &str = "div.review-container";

/// Quoted headline inside a fragment.
pub const REVIEW_TITLE: &str = "span.noQuotes";

/// Date element; the display date lives in its `title` attribute.
pub const REVIEW_DATE: &str = "span.ratingDate";

/// Rating element; the score is encoded in its class attribute.
pub const REVIEW_RATING: &str = "span.ui_bubble_rating";

/// Present only on truncated reviews; holds the hidden remainder of the
/// text after expansion.
pub const REVIEW_HIDDEN_TEXT: &str = "span.postSnippet";

/// "More" control that expands truncated review text in place.
pub const EXPAND_CONTROL: &str = "span.taLnk.ulBlueLinks";

/// Clicking one expander only expands one review; this script expands all
/// of them at once.
pub const EXPAND_SCRIPT: &str =
    "document.querySelectorAll('span.taLnk.ulBlueLinks').forEach(el => el.click())";

/// Pagination "next" control.
pub const NEXT_CONTROL: &str = "a.nav.next";

/// Class-attribute marker on a "next" control that cannot advance.
pub const NEXT_DISABLED_MARKER: &str = "disabled";

/// Overlay shown while a page of reviews is loading.
pub const LOADING_INDICATOR: &str = "div.loadingWhiteBox";

/// Cookie-consent accept button.
pub const CONSENT_ACCEPT: &str = "#_evidon-banner-acceptbutton";

/// "All languages" radio in the review language filter.
pub const LANGUAGE_ALL: &str = "input[name='filterLang'][value='ALL']";

/// Street address on the entity's page.
pub const ADDRESS: &str = "span.street-address";
