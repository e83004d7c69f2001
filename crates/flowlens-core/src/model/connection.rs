use serde::{Deserialize, Serialize};
use std::fmt;

/// The gesture or event that fires an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    OnClick,
    OnHover,
    OnPress,
    OnDrag,
    AfterTimeout,
    MouseEnter,
    MouseLeave,
    MouseUp,
    MouseDown,
    OnKeyDown,
    OnMediaEnd,
    /// Any trigger the model does not know about. Never a parse failure.
    #[serde(other)]
    Other,
}

impl TriggerType {
    /// Wire name, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnClick => "ON_CLICK",
            Self::OnHover => "ON_HOVER",
            Self::OnPress => "ON_PRESS",
            Self::OnDrag => "ON_DRAG",
            Self::AfterTimeout => "AFTER_TIMEOUT",
            Self::MouseEnter => "MOUSE_ENTER",
            Self::MouseLeave => "MOUSE_LEAVE",
            Self::MouseUp => "MOUSE_UP",
            Self::MouseDown => "MOUSE_DOWN",
            Self::OnKeyDown => "ON_KEY_DOWN",
            Self::OnMediaEnd => "ON_MEDIA_END",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an interaction does once triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Navigate to another node.
    Node,
    /// Open an external URL.
    Url,
    /// Open a node as an overlay.
    Overlay,
    /// Go back in navigation history.
    Back,
    /// Close the current overlay.
    Close,
    #[serde(other)]
    Other,
}

impl ActionType {
    /// Wire name, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "NODE",
            Self::Url => "URL",
            Self::Overlay => "OVERLAY",
            Self::Back => "BACK",
            Self::Close => "CLOSE",
            Self::Other => "OTHER",
        }
    }

    /// Only `NODE` and `OVERLAY` actions may carry a destination.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        matches!(self, Self::Node | Self::Overlay)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(rename = "type")]
    pub kind: TriggerType,
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub timeout: Option<f64>,
}

impl Trigger {
    #[must_use]
    pub const fn new(kind: TriggerType) -> Self {
        Self {
            kind,
            delay: 0.0,
            timeout: None,
        }
    }
}

/// Easing is either a bare curve name or an object `{ "type": "EASE_OUT", ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Easing {
    Named(String),
    Spec {
        #[serde(rename = "type")]
        kind: String,
    },
}

impl Easing {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) | Self::Spec { kind: name } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub easing: Option<Easing>,
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySettings {
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub background_interaction: Option<String>,
    #[serde(default)]
    pub close_on_click_outside: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionType,
    #[serde(default)]
    pub destination_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub transition: Option<Transition>,
    #[serde(default)]
    pub overlay: Option<OverlaySettings>,
    #[serde(default)]
    pub preserve_scroll_position: bool,
    #[serde(default)]
    pub reset_video_position: bool,
}

impl Action {
    /// A bare action of `kind` with no destination, transition, or overlay.
    #[must_use]
    pub const fn new(kind: ActionType) -> Self {
        Self {
            kind,
            destination_id: None,
            url: None,
            transition: None,
            overlay: None,
            preserve_scroll_position: false,
            reset_video_position: false,
        }
    }

    /// `NODE` action navigating to `destination`.
    #[must_use]
    pub fn navigate(destination: impl Into<String>) -> Self {
        Self {
            destination_id: Some(destination.into()),
            ..Self::new(ActionType::Node)
        }
    }

    /// `OVERLAY` action opening `destination` with the given settings.
    #[must_use]
    pub fn overlay(destination: impl Into<String>, settings: OverlaySettings) -> Self {
        Self {
            destination_id: Some(destination.into()),
            overlay: Some(settings),
            ..Self::new(ActionType::Overlay)
        }
    }

    #[must_use]
    pub fn with_transition(mut self, kind: impl Into<String>, duration: f64) -> Self {
        self.transition = Some(Transition {
            kind: kind.into(),
            duration,
            easing: None,
            direction: None,
        });
        self
    }
}

/// One trigger→action pair found on a screen or element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source_node_id: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub source_type: String,
    pub trigger: Trigger,
    pub action: Action,
}

impl Connection {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        source_node_id: impl Into<String>,
        trigger: TriggerType,
        action: Action,
    ) -> Self {
        Self {
            id: id.into(),
            source_node_id: source_node_id.into(),
            source_name: String::new(),
            source_type: String::new(),
            trigger: Trigger::new(trigger),
            action,
        }
    }

    /// Shorthand for an `ON_CLICK` → `NODE` navigation.
    #[must_use]
    pub fn click(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(id, from, TriggerType::OnClick, Action::navigate(to))
    }

    /// The graph edge target, if this connection is traversable.
    ///
    /// A destination recorded on a `BACK`/`CLOSE`/`URL` action, or an empty
    /// destination id, is ignored: such connections are terminal actions.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        if !self.action.kind.is_traversable() {
            return None;
        }
        self.action
            .destination_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.destination().is_none()
    }
}

/// Flattened, normalized view of a [`Connection`] used in analysis output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    pub id: String,
    pub source_node_id: String,
    pub source_name: String,
    pub source_type: String,
    pub trigger_type: TriggerType,
    pub action_type: ActionType,
    pub destination_id: Option<String>,
    pub url: Option<String>,
    pub transition_type: Option<String>,
    pub transition_duration: Option<f64>,
    pub terminal: bool,
}

impl From<&Connection> for ConnectionView {
    fn from(conn: &Connection) -> Self {
        let transition = conn.action.transition.as_ref();
        Self {
            id: conn.id.clone(),
            source_node_id: conn.source_node_id.clone(),
            source_name: conn.source_name.clone(),
            source_type: conn.source_type.clone(),
            trigger_type: conn.trigger.kind,
            action_type: conn.action.kind,
            destination_id: conn.destination().map(str::to_string),
            url: conn.action.url.clone(),
            transition_type: transition.map(|t| t.kind.clone()),
            transition_duration: transition.map(|t| t.duration),
            terminal: conn.is_terminal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_figma_shaped_record() {
        let raw = r#"{
            "id": "c1",
            "sourceNodeId": "1:2",
            "sourceName": "Sign in",
            "sourceType": "INSTANCE",
            "trigger": { "type": "ON_CLICK", "delay": 0, "timeout": null },
            "action": {
                "type": "NODE",
                "destinationId": "1:9",
                "url": null,
                "transition": {
                    "type": "SMART_ANIMATE",
                    "duration": 300,
                    "easing": { "type": "EASE_OUT" },
                    "direction": null
                },
                "overlay": null,
                "preserveScrollPosition": true,
                "resetVideoPosition": false
            }
        }"#;

        let conn: Connection = serde_json::from_str(raw).expect("parse connection");
        assert_eq!(conn.trigger.kind, TriggerType::OnClick);
        assert_eq!(conn.destination(), Some("1:9"));
        assert!(conn.action.preserve_scroll_position);
        let transition = conn.action.transition.expect("transition");
        assert_eq!(transition.easing.expect("easing").name(), "EASE_OUT");
    }

    #[test]
    fn unknown_enum_values_map_to_other() {
        let raw = r#"{
            "id": "c1",
            "sourceNodeId": "a",
            "trigger": { "type": "ON_SHAKE" },
            "action": { "type": "SCROLL_TO", "destinationId": "b" }
        }"#;
        let conn: Connection = serde_json::from_str(raw).expect("parse connection");
        assert_eq!(conn.trigger.kind, TriggerType::Other);
        assert_eq!(conn.action.kind, ActionType::Other);
        assert!(conn.is_terminal());
    }

    #[test]
    fn back_action_with_destination_is_terminal() {
        let mut action = Action::new(ActionType::Back);
        action.destination_id = Some("b".to_string());
        let conn = Connection::new("c1", "a", TriggerType::OnClick, action);
        assert_eq!(conn.destination(), None);
        assert!(conn.is_terminal());
    }

    #[test]
    fn empty_destination_is_terminal() {
        let conn = Connection::click("c1", "a", "");
        assert!(conn.is_terminal());
    }

    #[test]
    fn overlay_is_traversable() {
        let conn = Connection::new(
            "c1",
            "a",
            TriggerType::OnHover,
            Action::overlay("menu", OverlaySettings::default()),
        );
        assert_eq!(conn.destination(), Some("menu"));
    }

    #[test]
    fn view_flattens_transition() {
        let conn = Connection::new(
            "c1",
            "a",
            TriggerType::OnClick,
            Action::navigate("b").with_transition("DISSOLVE", 250.0),
        );
        let view = ConnectionView::from(&conn);
        assert_eq!(view.transition_type.as_deref(), Some("DISSOLVE"));
        assert_eq!(view.transition_duration, Some(250.0));
        assert!(!view.terminal);

        let json = serde_json::to_value(&view).expect("serialize view");
        assert_eq!(json["triggerType"], "ON_CLICK");
        assert_eq!(json["actionType"], "NODE");
    }
}
