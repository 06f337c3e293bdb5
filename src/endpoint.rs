//! Endpoint templates and `{{placeholder}}` substitution.
//!
//! Every template carries the base tokens `{{BaseURL}}`, `{{key}}` and
//! `{{token}}`; some also need resource IDs such as `{{cardID}}`.

pub const CREATE_CARD: &str = "{{BaseURL}}/1/cards?key={{key}}&token={{token}}";
pub const DELETE_CARD: &str = "{{BaseURL}}/1/cards/{{cardID}}?key={{key}}&token={{token}}";
pub const UPDATE_CARD: &str = "{{BaseURL}}/1/cards/{{cardID}}?key={{key}}&token={{token}}";
pub const UPDATE_CUSTOM_FIELD: &str =
    "{{BaseURL}}/1/card/{{cardID}}/customField/{{customFieldID}}/item?key={{key}}&token={{token}}";
pub const BOARD_CUSTOM_FIELDS: &str =
    "{{BaseURL}}/1/boards/{{boardID}}/customFields?key={{key}}&token={{token}}";
pub const CARD_CUSTOM_FIELD_ITEMS: &str =
    "{{BaseURL}}/1/cards/{{cardID}}/customFieldItems?key={{key}}&token={{token}}";
pub const OPEN_BOARDS: &str =
    "{{BaseURL}}/1/members/me/boards?key={{key}}&token={{token}}&filter=open";
pub const BOARD_LISTS: &str = "{{BaseURL}}/1/boards/{{boardID}}/lists?key={{key}}&token={{token}}";
pub const LIST_CARDS: &str = "{{BaseURL}}/1/lists/{{listID}}/cards?key={{key}}&token={{token}}";

/// Replace every `{{key}}` token with its value.
///
/// A token left over after substitution means the template and the caller
/// disagree, which is a bug in this crate rather than a runtime condition.
pub fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    debug_assert!(
        !out.contains("{{"),
        "unsubstituted token left in endpoint template {template:?}"
    );
    out
}
