//! Event composition.
//!
//! An [`EventBuilder`] turns `(type, subject, properties)` into a complete
//! [`TrackingEvent`] using a frozen [`EventContext`]. The context is
//! captured when the call is made, so `refer` reflects page identity at
//! build time rather than at flush time.

use chrono::Utc;
use tracking_core::naming::event_name;
use tracking_core::{DeviceInfo, EventType, Properties, TrackingEvent};

use crate::page::PageSnapshot;

/// Everything an event inherits from the tracker at build time.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub session_id: String,
    pub user_id: Option<String>,
    pub company_id: Option<String>,
    pub page: PageSnapshot,
    pub device: DeviceInfo,
    pub page_title: String,
    pub viewport: (u32, u32),
}

/// Builds events from one [`EventContext`].
#[derive(Debug, Clone)]
pub struct EventBuilder {
    ctx: EventContext,
}

impl EventBuilder {
    pub fn new(ctx: EventContext) -> Self {
        Self { ctx }
    }

    /// Typed event on the current page. `subject` names the button or
    /// element and is ignored for views.
    pub fn build(
        &self,
        event_type: EventType,
        subject: Option<&str>,
        properties: Option<Properties>,
    ) -> TrackingEvent {
        let page = self.ctx.page.current_page.clone();
        let component = match event_type {
            EventType::View => None,
            _ => subject.map(str::to_string),
        };
        let name = event_name(event_type, &page, component.as_deref());
        self.compose(event_type, name, page, component, properties)
    }

    /// Disappear event carrying the seconds the element was visible.
    pub fn build_disappear(
        &self,
        subject: Option<&str>,
        expose_time: u64,
        properties: Option<Properties>,
    ) -> TrackingEvent {
        let mut event = self.build(EventType::Disappear, subject, properties);
        event.expose_time = Some(expose_time);
        event
    }

    /// View of an explicitly named page, `View_{page_name}`.
    pub fn build_view_of(&self, page_name: &str, properties: Option<Properties>) -> TrackingEvent {
        let name = event_name(EventType::View, page_name, None);
        self.compose(EventType::View, name, page_name.to_string(), None, properties)
    }

    /// Event with a caller-supplied name on the current page.
    pub fn build_raw(
        &self,
        event_type: EventType,
        name: &str,
        properties: Option<Properties>,
    ) -> TrackingEvent {
        let page = self.ctx.page.current_page.clone();
        self.compose(event_type, name.to_string(), page, None, properties)
    }

    fn compose(
        &self,
        event_type: EventType,
        event_name: String,
        page_name: String,
        component_name: Option<String>,
        properties: Option<Properties>,
    ) -> TrackingEvent {
        let ctx = &self.ctx;
        TrackingEvent {
            event_type,
            event_name,
            page_name,
            component_name,
            timestamp: Utc::now(),
            refer: ctx.page.refer_page.clone(),
            expose_time: None,
            user_id: ctx.user_id.clone(),
            company_id: ctx.company_id.clone(),
            session_id: ctx.session_id.clone(),
            device: ctx.device.clone(),
            page_url: ctx.page.url.clone(),
            page_title: ctx.page_title.clone(),
            viewport_width: ctx.viewport.0,
            viewport_height: ctx.viewport.1,
            properties: properties.filter(|p| !p.is_empty()),
        }
    }
}
