/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const SCHEDULE_ROUTE_COMPONENT: &str = "schedule";
pub const OCCURRENCES_ROUTE_COMPONENT: &str = "occurrences";

/// Placeholder substituted with the event id in edit URL templates.
pub const EVENT_ID_PLACEHOLDER: &str = "{eventId}";

/// Edit form location used by the scheduling UI when an event carries no edit button.
pub const DEFAULT_EDIT_URL_TEMPLATE: &str =
    const_str::concat!("/schedule/form/edit/", EVENT_ID_PLACEHOLDER);

/// Identifier of the button that carries an event's own edit URL.
pub const EDIT_BUTTON_ID: &str = "schedule_button_edit";

/// Upper bound on occurrences generated for a single event per computation.
pub const DEFAULT_MAX_OCCURRENCES: usize = 100_000;
