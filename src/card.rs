use crate::endpoint;
use crate::error::{BoardError, Result};
use crate::query::{encode, FieldValue, QueryFields};
use crate::resolve::associate_by;
use crate::rest::RestContext;
use crate::time::parse_timestamp;
use crate::transport::RestResponse;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Fields the update endpoint must not receive
pub const UPDATE_EXCLUDED: [&str; 4] = ["dueComplete", "cover", "subscribed", "idAttachmentCover"];

/// A flag that distinguishes "not sent" from an explicit value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriState {
    #[default]
    Unset,
    True,
    False,
}

impl TriState {
    pub fn as_option(self) -> Option<bool> {
        match self {
            TriState::Unset => None,
            TriState::True => Some(true),
            TriState::False => Some(false),
        }
    }
}

impl From<bool> for TriState {
    fn from(b: bool) -> Self {
        if b {
            TriState::True
        } else {
            TriState::False
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(b: Option<bool>) -> Self {
        b.map_or(TriState::Unset, TriState::from)
    }
}

/// Placement of a card within its list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Top,
    Bottom,
    /// Always positive
    At(f64),
}

impl Position {
    /// Checked constructor for a numeric position
    pub fn at(pos: f64) -> Result<Self> {
        if pos.is_finite() && pos > 0.0 {
            Ok(Position::At(pos))
        } else {
            Err(BoardError::Validation(format!(
                "position must be top, bottom or a positive number, got {pos}"
            )))
        }
    }

    fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => s.parse(),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| BoardError::MalformedResponse(format!("invalid pos {n}")))
                .and_then(Position::at),
            other => Err(BoardError::MalformedResponse(format!("invalid pos {other}"))),
        }
    }
}

impl FromStr for Position {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(Position::Top),
            "bottom" => Ok(Position::Bottom),
            other => other
                .parse::<f64>()
                .map_err(|_| {
                    BoardError::Validation(format!(
                        "position must be top, bottom or a positive number, got {other:?}"
                    ))
                })
                .and_then(Position::at),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Top => f.write_str("top"),
            Position::Bottom => f.write_str("bottom"),
            Position::At(pos) => write!(f, "{pos}"),
        }
    }
}

/// Value types a custom field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomFieldType {
    Text,
    Checked,
    Date,
    Number,
}

impl CustomFieldType {
    /// Type tag used in request and response bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomFieldType::Text => "text",
            CustomFieldType::Checked => "checked",
            CustomFieldType::Date => "date",
            CustomFieldType::Number => "number",
        }
    }
}

impl FromStr for CustomFieldType {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(CustomFieldType::Text),
            "checked" => Ok(CustomFieldType::Checked),
            "date" => Ok(CustomFieldType::Date),
            "number" => Ok(CustomFieldType::Number),
            other => Err(BoardError::Validation(format!(
                "{other} is not a supported custom field type"
            ))),
        }
    }
}

/// Card object as returned by the API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardObject {
    id: String,
    name: String,
    desc: Option<String>,
    id_members: Option<Vec<String>>,
    id_attachment_cover: Option<String>,
    id_list: Option<String>,
    id_board: Option<String>,
    pos: Option<Value>,
    due: Option<String>,
    due_complete: Option<bool>,
    subscribed: Option<bool>,
    address: Option<String>,
    coordinates: Option<Value>,
    cover: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomFieldItem {
    id_custom_field: String,
    value: Option<Map<String, Value>>,
}

/// Stringify a stored JSON value; strings are taken verbatim
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render echoed coordinates in the `latitude,longitude` form the API accepts.
///
/// Anything other than a string or a latitude/longitude object is ignored.
fn coordinates_param(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            let latitude = map.get("latitude")?;
            let longitude = map.get("longitude")?;
            if !(latitude.is_number() || latitude.is_string())
                || !(longitude.is_number() || longitude.is_string())
            {
                return None;
            }
            Some(format!("{},{}", stringify(latitude), stringify(longitude)))
        }
        _ => None,
    }
}

/// One card on a board.
///
/// A card without a `card_id` is a draft; [`Card::create`] turns it into a
/// persisted card. Attribute fields are public and sent as query
/// parameters under their API names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    card_id: Option<String>,
    identifier: Option<String>,
    custom_field_values: Option<HashMap<String, String>>,

    pub name: Option<String>,
    pub desc: Option<String>,
    pub id_members: Vec<String>,
    pub id_attachment_cover: Option<String>,
    pub id_list: Option<String>,
    pub id_board: Option<String>,
    pub pos: Option<Position>,
    pub due: Option<DateTime<Utc>>,
    pub due_complete: TriState,
    pub subscribed: Option<bool>,
    pub address: Option<String>,
    pub coordinates: Option<String>,
    /// Echoed by the API, never sent
    pub cover: Option<Value>,
}

impl QueryFields for Card {
    fn query_fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("name", FieldValue::text(self.name.as_deref())),
            ("desc", FieldValue::text(self.desc.as_deref())),
            ("idMembers", FieldValue::List(&self.id_members)),
            ("idAttachmentCover", FieldValue::text(self.id_attachment_cover.as_deref())),
            ("idList", FieldValue::text(self.id_list.as_deref())),
            ("idBoard", FieldValue::text(self.id_board.as_deref())),
            ("pos", FieldValue::Text(self.pos.map(|p| Cow::Owned(p.to_string())))),
            ("due", FieldValue::Timestamp(self.due.as_ref())),
            ("dueComplete", FieldValue::Flag(self.due_complete.as_option())),
            ("subscribed", FieldValue::Flag(self.subscribed)),
            ("address", FieldValue::text(self.address.as_deref())),
            ("coordinates", FieldValue::text(self.coordinates.as_deref())),
            ("cover", FieldValue::Opaque),
        ]
    }
}

impl Card {
    /// Create an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a draft destined for the given list
    pub fn for_list(id_list: impl Into<String>) -> Self {
        Card {
            id_list: Some(id_list.into()),
            ..Self::default()
        }
    }

    /// Build a persisted card from a fetched card object
    pub fn from_json(value: Value) -> Result<Self> {
        let object: CardObject = serde_json::from_value(value)?;
        let mut card = Card::new();
        card.populate(object)?;
        Ok(card)
    }

    pub fn card_id(&self) -> Option<&str> {
        self.card_id.as_deref()
    }

    pub fn is_draft(&self) -> bool {
        self.card_id.is_none()
    }

    /// Local label, never sent to the API
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = Some(identifier.into());
    }

    fn require_card_id(&self, operation: &'static str) -> Result<&str> {
        self.card_id
            .as_deref()
            .ok_or_else(|| BoardError::unset("cardID", operation))
    }

    fn require_board_id(&self, operation: &'static str) -> Result<&str> {
        self.id_board
            .as_deref()
            .ok_or_else(|| BoardError::unset("idBoard", operation))
    }

    /// Overwrite local attributes from a server card object.
    ///
    /// Fallible conversions run first so a bad object leaves the card as it
    /// was. `address` and `coordinates` are kept unless the server echoes them.
    fn populate(&mut self, object: CardObject) -> Result<()> {
        let due = match object.due.as_deref() {
            None | Some("") => None,
            Some(s) => Some(parse_timestamp(s)?),
        };
        let pos = object.pos.as_ref().map(Position::from_json).transpose()?;

        self.name = Some(object.name);
        self.desc = object.desc;
        self.id_members = object.id_members.unwrap_or_default();
        self.id_attachment_cover = object.id_attachment_cover;
        self.id_list = object.id_list;
        self.id_board = object.id_board;
        self.pos = pos;
        self.due = due;
        self.due_complete = object.due_complete.into();
        self.subscribed = object.subscribed;
        self.cover = object.cover;
        if object.address.is_some() {
            self.address = object.address;
        }
        if let Some(coordinates) = object.coordinates.as_ref().and_then(coordinates_param) {
            self.coordinates = Some(coordinates);
        }
        self.card_id = Some(object.id);
        Ok(())
    }

    /// Create the card and repopulate it from the server's echo.
    ///
    /// Requires a draft with `id_list` set. A non-success response is
    /// returned as [`BoardError::TransportFailure`] and leaves the card
    /// untouched.
    pub async fn create(&mut self, ctx: &RestContext) -> Result<RestResponse> {
        if let Some(card_id) = &self.card_id {
            return Err(BoardError::AlreadyPersisted {
                card_id: card_id.clone(),
            });
        }
        if self.id_list.is_none() {
            return Err(BoardError::unset("idList", "create"));
        }

        let url = ctx.endpoint(endpoint::CREATE_CARD, &[]) + &encode(&*self, &[]);
        let response = ctx.send(&url, Method::POST, None).await?;
        if !response.success {
            return Err(BoardError::TransportFailure {
                status: response.status,
                body: response.body,
            });
        }

        let object: CardObject = response.json()?;
        self.populate(object)?;
        debug!(card_id = ?self.card_id, "card created");
        Ok(response)
    }

    /// Push local attributes to the server.
    ///
    /// `dueComplete`, `cover`, `subscribed` and `idAttachmentCover` are not
    /// sent. The response is not applied to the card.
    pub async fn update(&self, ctx: &RestContext) -> Result<RestResponse> {
        let card_id = self.require_card_id("update")?;
        let url = ctx.endpoint(endpoint::UPDATE_CARD, &[("cardID", card_id)])
            + &encode(self, &UPDATE_EXCLUDED);
        let response = ctx.send(&url, Method::PUT, None).await?;
        if !response.success {
            return Err(BoardError::TransportFailure {
                status: response.status,
                body: response.body,
            });
        }
        debug!(card_id, "card updated");
        Ok(response)
    }

    /// Delete the card on the server; the local value is left as is
    pub async fn delete(&self, ctx: &RestContext) -> Result<RestResponse> {
        let card_id = self.require_card_id("delete")?;
        let url = ctx.endpoint(endpoint::DELETE_CARD, &[("cardID", card_id)]);
        let response = ctx.send(&url, Method::DELETE, None).await?;
        if !response.success {
            return Err(BoardError::TransportFailure {
                status: response.status,
                body: response.body,
            });
        }
        debug!(card_id, "card deleted");
        Ok(response)
    }

    /// Set a custom field value, looking the field up by name on the card's board
    pub async fn set_custom_field_by_name(
        &self,
        ctx: &RestContext,
        field_name: &str,
        value: &str,
        kind: &str,
    ) -> Result<RestResponse> {
        kind.parse::<CustomFieldType>()?;
        self.require_card_id("setting a custom field")?;
        let board_id = self.require_board_id("custom field lookup")?;

        let field_id = ctx.resolve_custom_field_id(board_id, field_name).await?;
        self.set_custom_field_by_id(ctx, &field_id, value, kind).await
    }

    /// Set a custom field value.
    ///
    /// `kind` must be one of `text`, `checked`, `date` or `number`; the body
    /// sent is `{"value": {<kind>: <value>}}`.
    pub async fn set_custom_field_by_id(
        &self,
        ctx: &RestContext,
        field_id: &str,
        value: &str,
        kind: &str,
    ) -> Result<RestResponse> {
        let kind: CustomFieldType = kind.parse()?;
        let card_id = self.require_card_id("setting a custom field")?;

        let url = ctx.endpoint(
            endpoint::UPDATE_CUSTOM_FIELD,
            &[("cardID", card_id), ("customFieldID", field_id)],
        );
        let mut typed = Map::new();
        typed.insert(kind.as_str().to_string(), Value::String(value.to_string()));
        let mut body = Map::new();
        body.insert("value".to_string(), Value::Object(typed));
        let body = Value::Object(body);

        let response = ctx.send(&url, Method::PUT, Some(&body)).await?;
        if !response.success {
            return Err(BoardError::TransportFailure {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }

    /// Get a custom field value by field name, `None` if the card has none
    pub async fn get_custom_field_value_by_name(
        &mut self,
        ctx: &RestContext,
        field_name: &str,
    ) -> Result<Option<String>> {
        self.require_card_id("reading custom fields")?;
        let board_id = self.require_board_id("custom field lookup")?.to_string();

        let field_id = ctx.resolve_custom_field_id(&board_id, field_name).await?;
        self.get_custom_field_value_by_id(ctx, &field_id).await
    }

    /// Get a custom field value by field ID, `None` if the card has none
    pub async fn get_custom_field_value_by_id(
        &mut self,
        ctx: &RestContext,
        field_id: &str,
    ) -> Result<Option<String>> {
        Ok(self.custom_field_values(ctx).await?.get(field_id).cloned())
    }

    /// All custom field values of this card keyed by field ID.
    ///
    /// Fetched on first use and kept for the lifetime of this value.
    pub async fn custom_field_values(
        &mut self,
        ctx: &RestContext,
    ) -> Result<&HashMap<String, String>> {
        let values = match self.custom_field_values.take() {
            Some(values) => values,
            None => self.fetch_custom_field_values(ctx).await?,
        };
        let values: &HashMap<String, String> = self.custom_field_values.insert(values);
        Ok(values)
    }

    async fn fetch_custom_field_values(
        &self,
        ctx: &RestContext,
    ) -> Result<HashMap<String, String>> {
        let card_id = self.require_card_id("reading custom fields")?;
        let url = ctx.endpoint(endpoint::CARD_CUSTOM_FIELD_ITEMS, &[("cardID", card_id)]);
        let response = ctx.send(&url, Method::GET, None).await?;
        if !response.success {
            return Err(BoardError::TransportFailure {
                status: response.status,
                body: response.body,
            });
        }

        let items: Vec<CustomFieldItem> = response.json()?;
        // list-type fields carry idValue instead of value and are skipped
        let values = items
            .into_iter()
            .filter_map(|item| {
                let value = item.value?.into_iter().next()?.1;
                Some((item.id_custom_field, stringify(&value)))
            })
            .collect();
        Ok(values)
    }
}

impl RestContext {
    /// Fetch the cards on a list
    pub async fn list_cards(&self, list_id: &str) -> Result<Vec<Card>> {
        self.fetch_list_cards(list_id)
            .await?
            .into_iter()
            .map(Card::from_json)
            .collect()
    }

    /// Fetch the cards on a list keyed by card name; duplicate names fail
    pub async fn list_cards_by_name(&self, list_id: &str) -> Result<HashMap<String, Card>> {
        let array = self.fetch_list_cards(list_id).await?;
        associate_by(array, "name")?
            .into_iter()
            .map(|(name, object)| Card::from_json(object).map(|card| (name, card)))
            .collect()
    }

    async fn fetch_list_cards(&self, list_id: &str) -> Result<Vec<Value>> {
        let url = self.endpoint(endpoint::LIST_CARDS, &[("listID", list_id)]);
        let response = self.send(&url, Method::GET, None).await?;
        if !response.success {
            return Err(BoardError::TransportFailure {
                status: response.status,
                body: response.body,
            });
        }
        response.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn echoed_card() -> Value {
        json!({
            "id": "C1",
            "name": "Homework",
            "desc": "chapter 3",
            "idMembers": ["M1", "M2"],
            "idAttachmentCover": "",
            "idList": "L9",
            "idBoard": "B1",
            "pos": 16384,
            "due": "2024-03-09T07:05:00.000Z",
            "dueComplete": false,
            "subscribed": true,
            "cover": {"color": null}
        })
    }

    #[test]
    fn test_from_json() {
        let card = Card::from_json(echoed_card()).unwrap();
        assert_eq!(card.card_id(), Some("C1"));
        assert!(!card.is_draft());
        assert_eq!(card.name.as_deref(), Some("Homework"));
        assert_eq!(card.id_members, vec!["M1", "M2"]);
        assert_eq!(card.pos, Some(Position::At(16384.0)));
        assert_eq!(
            card.due,
            Some(Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 0).unwrap())
        );
        assert_eq!(card.due_complete, TriState::False);
        assert_eq!(card.subscribed, Some(true));
        assert_eq!(card.cover, Some(json!({"color": null})));
    }

    #[test]
    fn test_coordinates_echo() {
        let mut object = echoed_card();
        object["coordinates"] = json!({"latitude": 48.85, "longitude": 2.35});
        let card = Card::from_json(object).unwrap();
        assert_eq!(card.coordinates.as_deref(), Some("48.85,2.35"));
        assert!(encode(&card, &UPDATE_EXCLUDED).contains("&coordinates=48.85%2C2.35"));

        let mut object = echoed_card();
        object["coordinates"] = json!("48.85,2.35");
        let card = Card::from_json(object).unwrap();
        assert_eq!(card.coordinates.as_deref(), Some("48.85,2.35"));

        let mut card = Card::for_list("L9");
        card.coordinates = Some("1,2".to_string());
        let mut object = echoed_card();
        object["coordinates"] = json!({"unexpected": true});
        let parsed: CardObject = serde_json::from_value(object).unwrap();
        card.populate(parsed).unwrap();
        assert_eq!(card.coordinates.as_deref(), Some("1,2"));
    }

    #[test]
    fn test_from_json_empty_due() {
        let mut object = echoed_card();
        object["due"] = json!("");
        assert_eq!(Card::from_json(object).unwrap().due, None);

        let mut object = echoed_card();
        object["due"] = Value::Null;
        assert_eq!(Card::from_json(object).unwrap().due, None);
    }

    #[test]
    fn test_from_json_missing_id() {
        let mut object = echoed_card();
        object.as_object_mut().unwrap().remove("id");
        assert!(matches!(
            Card::from_json(object),
            Err(BoardError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_populate_failure_leaves_card_untouched() {
        let mut card = Card::for_list("L1");
        card.name = Some("draft".to_string());
        let before = card.clone();

        let mut bad = echoed_card();
        bad["due"] = json!("not a date");
        let object: CardObject = serde_json::from_value(bad).unwrap();
        assert!(card.populate(object).is_err());
        assert_eq!(card, before);
    }

    #[test]
    fn test_draft_encoding() {
        let mut card = Card::for_list("L9");
        card.name = Some("Homework".to_string());
        card.pos = Some(Position::Top);
        card.due = Some(Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 0).unwrap());
        card.due_complete = TriState::True;
        card.id_members = vec!["M1".to_string(), "M2".to_string()];
        card.cover = Some(json!({"color": "red"}));

        assert_eq!(
            encode(&card, &[]),
            "&name=Homework&idMembers=M1%2CM2&idList=L9&pos=top\
             &due=2024-03-09T07%3A05%3A00Z&dueComplete=true"
        );
    }

    #[test]
    fn test_update_exclusions() {
        let mut card = Card::from_json(echoed_card()).unwrap();
        card.id_attachment_cover = Some("A1".to_string());
        card.due_complete = TriState::True;

        let query = encode(&card, &UPDATE_EXCLUDED);
        assert!(!query.contains("dueComplete"));
        assert!(!query.contains("subscribed"));
        assert!(!query.contains("idAttachmentCover"));
        assert!(!query.contains("cover"));
        assert!(query.contains("&name=Homework"));
    }

    #[test]
    fn test_empty_card_encodes_nothing() {
        assert_eq!(encode(&Card::new(), &[]), "");
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!("top".parse::<Position>().unwrap(), Position::Top);
        assert_eq!("bottom".parse::<Position>().unwrap(), Position::Bottom);
        assert_eq!("2.5".parse::<Position>().unwrap(), Position::At(2.5));
        assert!("-1".parse::<Position>().is_err());
        assert!("0".parse::<Position>().is_err());
        assert!("middle".parse::<Position>().is_err());
        assert_eq!(Position::At(65535.0).to_string(), "65535");
        assert_eq!(Position::At(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_custom_field_type() {
        assert_eq!("number".parse::<CustomFieldType>().unwrap(), CustomFieldType::Number);
        assert_eq!(CustomFieldType::Checked.as_str(), "checked");
        assert!(matches!(
            "bogus".parse::<CustomFieldType>(),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn test_tri_state() {
        assert_eq!(TriState::from(Some(true)), TriState::True);
        assert_eq!(TriState::from(None), TriState::Unset);
        assert_eq!(TriState::False.as_option(), Some(false));
        assert_eq!(TriState::default().as_option(), None);
    }

    #[test]
    fn test_identifier_is_local() {
        let mut card = Card::for_list("L1");
        card.set_identifier("row-7");
        assert_eq!(card.identifier(), Some("row-7"));
        assert!(!encode(&card, &[]).contains("row-7"));
    }
}
