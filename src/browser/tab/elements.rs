//! Element lookup and appearance waits.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::debug;

use crate::browser::Element;
use crate::browser::selector::By;
use crate::error::{Error, Result};
use crate::identifiers::ElementId;
use crate::protocol::{Command, ElementCommand, Event, ParsedEvent};

use super::Tab;

const ELEMENT_ADDED: &str = "element.added";

// ============================================================================
// Tab - Element Search
// ============================================================================

impl Tab {
    /// Finds the first element matching `by`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementNotFound`] when nothing matches.
    pub async fn find_element(&self, by: &By) -> Result<Element> {
        let command = Command::Element(ElementCommand::Find {
            strategy: by.strategy().to_string(),
            value: by.value().to_string(),
            parent_id: None,
        });

        let not_found = || Error::element_not_found(by.to_string(), self.tab_id, self.frame_id);

        let response = match self.send_command(command).await {
            Ok(response) => response,
            Err(Error::Protocol { message }) => {
                debug!(locator = %by, %message, "Element lookup failed");
                return Err(not_found());
            }
            Err(e) => return Err(e),
        };

        let element_id = response.result_str("elementId").ok_or_else(not_found)?;
        Ok(Element::new(ElementId::new(element_id), self.clone()))
    }
}

// ============================================================================
// Tab - Element Observation
// ============================================================================

impl Tab {
    /// Waits until an element matching `by` is present.
    ///
    /// Resolves immediately when it already exists, otherwise subscribes
    /// to `element.added`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] when nothing appears within `wait`.
    pub async fn wait_for_element(&self, by: &By, wait: Duration) -> Result<Element> {
        let wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
        debug!(tab_id = %self.tab_id, locator = %by, timeout_ms = wait_ms, "Waiting for element");

        let (tx, rx) = oneshot::channel::<ElementId>();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let expected_strategy = by.strategy();
        let expected_value = by.value().to_string();

        self.connection.set_event_handler(
            ELEMENT_ADDED,
            Box::new(move |event: Event| {
                if let ParsedEvent::ElementAdded {
                    strategy,
                    value,
                    element_id,
                    ..
                } = event.parse()
                    && strategy == expected_strategy
                    && value == expected_value
                    && let Some(tx) = tx.lock().take()
                {
                    let _ = tx.send(element_id);
                }
                None
            }),
        );

        let command = Command::Element(ElementCommand::Subscribe {
            strategy: by.strategy().to_string(),
            value: by.value().to_string(),
            one_shot: true,
            timeout: Some(wait_ms),
        });

        let response = match self.send_command(command).await {
            Ok(response) => response,
            Err(e) => {
                self.connection.clear_event_handler(ELEMENT_ADDED);
                return Err(e);
            }
        };

        if let Some(element_id) = response.result_str("elementId") {
            self.connection.clear_event_handler(ELEMENT_ADDED);
            return Ok(Element::new(ElementId::new(element_id), self.clone()));
        }

        let result = timeout(wait, rx).await;
        self.connection.clear_event_handler(ELEMENT_ADDED);

        match result {
            Ok(Ok(element_id)) => Ok(Element::new(element_id, self.clone())),
            Ok(Err(_)) => Err(Error::protocol("Element subscription dropped")),
            Err(_) => {
                if let Some(subscription_id) = response.result_str("subscriptionId") {
                    let unsubscribe = Command::Element(ElementCommand::Unsubscribe {
                        subscription_id: subscription_id.to_string(),
                    });
                    if let Err(e) = self.send_command(unsubscribe).await {
                        debug!(error = %e, "Failed to unsubscribe after timeout");
                    }
                }
                Err(Error::timeout(format!("wait_for({by})"), wait_ms))
            }
        }
    }
}
