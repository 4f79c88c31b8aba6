use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CoordinateError, ImageUriError, ScreenConfig, SEED_IMAGE_URI, SEED_LOCATION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub const fn as_tuple(self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Image reference as handed over by the shell. Bytes never enter the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageUri(String);

impl ImageUri {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ImageUriError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ImageUriError::Empty);
        }
        url::Url::parse(&raw).map_err(|e| ImageUriError::Invalid {
            uri: raw.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ImageUri {
    type Error = ImageUriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ImageUri> for String {
    fn from(uri: ImageUri) -> Self {
        uri.0
    }
}

impl fmt::Display for ImageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { body: String },
    Image { uri: ImageUri },
    Location { coordinate: Coordinate },
}

impl MessageContent {
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    #[must_use]
    pub const fn image(uri: ImageUri) -> Self {
        Self::Image { uri }
    }

    #[must_use]
    pub const fn location(coordinate: Coordinate) -> Self {
        Self::Location { coordinate }
    }

    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Text { .. } => MessageKind::Text,
            Self::Image { .. } => MessageKind::Image,
            Self::Location { .. } => MessageKind::Location,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    content: MessageContent,
}

impl Message {
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    #[must_use]
    pub const fn content(&self) -> &MessageContent {
        &self.content
    }

    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.content.kind()
    }

    #[must_use]
    pub fn image_uri(&self) -> Option<&ImageUri> {
        match &self.content {
            MessageContent::Image { uri } => Some(uri),
            _ => None,
        }
    }

    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self.content {
            MessageContent::Location { coordinate } => Some(coordinate),
            _ => None,
        }
    }
}

// Text bodies are user content; keep them out of logs.
impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Ordered message collection, most recent first.
///
/// The store is the only place message ids are minted: every id comes from
/// its own counter, so ids are unique for the lifetime of the store and
/// strictly increasing in creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageStore {
    messages: Vec<Message>,
    next_id: u64,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    /// The conversation a freshly opened screen shows.
    #[must_use]
    pub fn with_seed_conversation() -> Self {
        let mut store = Self::new();
        let (latitude, longitude) = SEED_LOCATION;
        if let Ok(coordinate) = Coordinate::new(latitude, longitude) {
            store.prepend(MessageContent::location(coordinate));
        }
        store.prepend(MessageContent::text("Hello"));
        store.prepend(MessageContent::text("World"));
        if let Ok(uri) = ImageUri::parse(SEED_IMAGE_URI) {
            store.prepend(MessageContent::image(uri));
        }
        store
    }

    pub fn prepend(&mut self, content: MessageContent) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.insert(0, Message { id, content });
        id
    }

    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        Some(self.messages.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    #[must_use]
    pub fn list(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Fullscreen overlay selection. Ids may dangle after a deletion; callers go
/// through the `open_*` resolvers, which treat a dangling id as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub fullscreen_image_id: Option<MessageId>,
    pub fullscreen_location_id: Option<MessageId>,
}

impl Selection {
    #[must_use]
    pub fn open_image<'a>(&self, store: &'a MessageStore) -> Option<&'a Message> {
        self.fullscreen_image_id
            .and_then(|id| store.get(id))
            .filter(|m| m.kind() == MessageKind::Image)
    }

    #[must_use]
    pub fn open_location<'a>(&self, store: &'a MessageStore) -> Option<&'a Message> {
        self.fullscreen_location_id
            .and_then(|id| store.get(id))
            .filter(|m| m.kind() == MessageKind::Location)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    ConfirmDelete { message_id: MessageId },
    LocationUnavailable,
}

/// FIFO of blocking dialogs; only the head is visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogQueue {
    queue: VecDeque<Dialog>,
}

impl DialogQueue {
    pub fn enqueue(&mut self, dialog: Dialog) {
        self.queue.push_back(dialog);
    }

    #[must_use]
    pub fn current(&self) -> Option<&Dialog> {
        self.queue.front()
    }

    pub fn dismiss(&mut self) -> Option<Dialog> {
        self.queue.pop_front()
    }

    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !self.queue.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Liveness token captured by every asynchronous request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SessionToken(pub u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenLifecycle {
    pub mounted: bool,
    pub back_subscribed: bool,
    session: SessionToken,
}

impl ScreenLifecycle {
    #[must_use]
    pub const fn session(&self) -> SessionToken {
        self.session
    }

    pub fn begin_session(&mut self) -> SessionToken {
        self.session = SessionToken(self.session.0 + 1);
        self.session
    }

    #[must_use]
    pub fn is_live(&self, token: SessionToken) -> bool {
        self.mounted && self.session == token
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageGridState {
    pub images: Vec<ImageUri>,
    /// Cursor for the next page; `None` once the library is exhausted.
    pub cursor: Option<String>,
    pub is_loading: bool,
    pub has_loaded_once: bool,
}

impl ImageGridState {
    #[must_use]
    pub fn can_load_more(&self) -> bool {
        !self.is_loading && self.cursor.is_some()
    }

    #[must_use]
    pub fn can_load_first_page(&self) -> bool {
        !self.is_loading && !self.has_loaded_once
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolbar {
    pub is_focused: bool,
    pub draft: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connectivity {
    pub connected: bool,
}

impl Default for Connectivity {
    fn default() -> Self {
        Self { connected: true }
    }
}

#[derive(Debug)]
pub struct Model {
    pub config: ScreenConfig,
    pub messages: MessageStore,
    pub selection: Selection,
    pub toolbar: Toolbar,
    pub dialogs: DialogQueue,
    pub image_grid: ImageGridState,
    pub connectivity: Connectivity,
    pub lifecycle: ScreenLifecycle,
    pub location_requests_in_flight: usize,
}

impl Default for Model {
    fn default() -> Self {
        Self::with_config(ScreenConfig::default())
    }
}

impl Model {
    #[must_use]
    pub fn with_config(config: ScreenConfig) -> Self {
        let messages = if config.seed_conversation {
            MessageStore::with_seed_conversation()
        } else {
            MessageStore::new()
        };
        Self {
            config,
            messages,
            selection: Selection::default(),
            toolbar: Toolbar::default(),
            dialogs: DialogQueue::default(),
            image_grid: ImageGridState::default(),
            connectivity: Connectivity::default(),
            lifecycle: ScreenLifecycle::default(),
            location_requests_in_flight: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text_bodies(store: &MessageStore) -> Vec<String> {
        store
            .list()
            .iter()
            .filter_map(|m| match m.content() {
                MessageContent::Text { body } => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_seed_conversation_order() {
        let store = MessageStore::with_seed_conversation();
        let kinds: Vec<_> = store.list().iter().map(Message::kind).collect();
        assert_eq!(
            kinds,
            vec![
                MessageKind::Image,
                MessageKind::Text,
                MessageKind::Text,
                MessageKind::Location
            ]
        );
        assert_eq!(text_bodies(&store), vec!["World", "Hello"]);
        let coordinate = store.list()[3].coordinate().unwrap();
        assert_eq!(coordinate.as_tuple(), SEED_LOCATION);
    }

    #[test]
    fn test_prepend_assigns_increasing_ids() {
        let mut store = MessageStore::new();
        let a = store.prepend(MessageContent::text("a"));
        let b = store.prepend(MessageContent::text("b"));
        assert!(b > a);
        assert_eq!(store.list()[0].id(), b);
        assert_eq!(store.list()[1].id(), a);
    }

    #[test]
    fn test_remove_absent_id_is_none() {
        let mut store = MessageStore::with_seed_conversation();
        assert!(store.remove(MessageId(999)).is_none());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut store = MessageStore::new();
        let a = store.prepend(MessageContent::text("a"));
        store.remove(a);
        let b = store.prepend(MessageContent::text("b"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(matches!(
            Coordinate::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            Coordinate::new(0.0, -181.0),
            Err(CoordinateError::LongitudeOutOfRange(_))
        ));
        assert!(matches!(
            Coordinate::new(f64::NAN, 0.0),
            Err(CoordinateError::NonFinite)
        ));
        assert!(Coordinate::new(16.0786, 108.1482).is_ok());
    }

    #[test]
    fn test_image_uri_validation() {
        assert!(ImageUri::parse("https://picsum.photos").is_ok());
        assert!(ImageUri::parse("content://media/external/images/media/42").is_ok());
        assert!(ImageUri::parse("ph://8F7A-11").is_ok());
        assert!(matches!(ImageUri::parse("  "), Err(ImageUriError::Empty)));
        assert!(matches!(
            ImageUri::parse("not a uri"),
            Err(ImageUriError::Invalid { .. })
        ));
    }

    #[test]
    fn test_image_uri_rejects_invalid_json() {
        let result: Result<ImageUri, _> = serde_json::from_str("\"relative/path.png\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_dangling_selection_is_closed() {
        let mut store = MessageStore::with_seed_conversation();
        let location_id = store.list()[3].id();
        let selection = Selection {
            fullscreen_image_id: None,
            fullscreen_location_id: Some(location_id),
        };
        assert!(selection.open_location(&store).is_some());
        store.remove(location_id);
        assert!(selection.open_location(&store).is_none());
    }

    #[test]
    fn test_selection_requires_matching_kind() {
        let store = MessageStore::with_seed_conversation();
        let text_id = store.list()[1].id();
        let selection = Selection {
            fullscreen_image_id: Some(text_id),
            fullscreen_location_id: Some(text_id),
        };
        assert!(selection.open_image(&store).is_none());
        assert!(selection.open_location(&store).is_none());
    }

    #[test]
    fn test_dialog_queue_is_fifo() {
        let mut queue = DialogQueue::default();
        queue.enqueue(Dialog::LocationUnavailable);
        queue.enqueue(Dialog::ConfirmDelete {
            message_id: MessageId(3),
        });
        assert_eq!(queue.current(), Some(&Dialog::LocationUnavailable));
        queue.dismiss();
        assert_eq!(
            queue.current(),
            Some(&Dialog::ConfirmDelete {
                message_id: MessageId(3)
            })
        );
        queue.dismiss();
        assert!(!queue.is_blocking());
    }

    #[test]
    fn test_session_liveness() {
        let mut lifecycle = ScreenLifecycle::default();
        let token = lifecycle.session();
        assert!(!lifecycle.is_live(token));
        lifecycle.mounted = true;
        let token = lifecycle.begin_session();
        assert!(lifecycle.is_live(token));
        lifecycle.begin_session();
        assert!(!lifecycle.is_live(token));
    }

    #[test]
    fn test_message_debug_hides_body() {
        let mut store = MessageStore::new();
        store.prepend(MessageContent::text("secret plans"));
        let rendered = format!("{:?}", store.list()[0]);
        assert!(!rendered.contains("secret plans"));
    }

    proptest! {
        #[test]
        fn prop_prepend_preserves_prior_order(bodies in proptest::collection::vec("[a-z]{1,8}", 0..20), new_body in "[a-z]{1,8}") {
            let mut store = MessageStore::new();
            for body in &bodies {
                store.prepend(MessageContent::text(body.clone()));
            }
            let before: Vec<MessageId> = store.list().iter().map(Message::id).collect();
            let id = store.prepend(MessageContent::text(new_body));
            let after: Vec<MessageId> = store.list().iter().map(Message::id).collect();

            prop_assert_eq!(after.len(), before.len() + 1);
            prop_assert_eq!(after[0], id);
            prop_assert_eq!(&after[1..], &before[..]);
            prop_assert!(!before.contains(&id));
        }

        #[test]
        fn prop_remove_only_removes_target(count in 1usize..20, pick in 0usize..20) {
            let mut store = MessageStore::new();
            for i in 0..count {
                store.prepend(MessageContent::text(i.to_string()));
            }
            let target = store.list()[pick % count].id();
            let expected: Vec<MessageId> = store
                .list()
                .iter()
                .map(Message::id)
                .filter(|id| *id != target)
                .collect();

            let removed = store.remove(target);
            prop_assert_eq!(removed.map(|m| m.id()), Some(target));
            let remaining: Vec<MessageId> = store.list().iter().map(Message::id).collect();
            prop_assert_eq!(remaining, expected);
        }
    }
}
