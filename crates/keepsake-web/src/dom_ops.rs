#![forbid(unsafe_code)]

//! Translation of core commands into concrete DOM operations.
//!
//! Kept free of browser types so the mapping can be checked natively; the
//! wasm shell only executes the resulting [`HostAction`]s.

use keepsake_core::{ElementRole, PageCommand};

use crate::selectors::SelectorMap;

/// Element addressed by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementTarget<'a> {
    /// First element matching the selector.
    Selector(&'a str),
    /// Index into the section match list.
    Section(usize),
}

/// A single mutation of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomMutation<'a> {
    /// Set (`Some`) or remove (`None`) an inline style property.
    Style {
        property: &'static str,
        value: Option<&'a str>,
    },
    Class { name: &'static str, enabled: bool },
    Text(&'a str),
    InnerHtml(&'a str),
    Attribute { name: &'static str, value: &'a str },
}

/// What the shell must do for one [`PageCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction<'a> {
    Mutate {
        target: ElementTarget<'a>,
        mutation: DomMutation<'a>,
    },
    RequestAnimationFrame,
    StopCountdown,
    Unobserve(ElementTarget<'a>),
    ScrollIntoView { id: &'a str },
}

fn target<'a>(role: ElementRole, selectors: &'a SelectorMap) -> ElementTarget<'a> {
    match role {
        ElementRole::Section(index) => ElementTarget::Section(index),
        other => ElementTarget::Selector(selectors.selector(other).unwrap_or_default()),
    }
}

/// Map one command onto the host operation that realizes it.
#[must_use]
pub fn translate<'a>(command: &'a PageCommand, selectors: &'a SelectorMap) -> HostAction<'a> {
    let mutate = |role: ElementRole, mutation: DomMutation<'a>| HostAction::Mutate {
        target: target(role, selectors),
        mutation,
    };
    match command {
        PageCommand::SetStyle {
            role,
            property,
            value,
        } => mutate(
            *role,
            DomMutation::Style {
                property: property.css_name(),
                value: Some(value.as_str()),
            },
        ),
        PageCommand::ClearStyle { role, property } => mutate(
            *role,
            DomMutation::Style {
                property: property.css_name(),
                value: None,
            },
        ),
        PageCommand::SetClass {
            role,
            class,
            enabled,
        } => mutate(
            *role,
            DomMutation::Class {
                name: *class,
                enabled: *enabled,
            },
        ),
        PageCommand::SetText { role, text } => mutate(*role, DomMutation::Text(text)),
        PageCommand::SetInnerHtml { role, html } => mutate(*role, DomMutation::InnerHtml(html)),
        PageCommand::SetImageSource { role, src } => mutate(
            *role,
            DomMutation::Attribute {
                name: "src",
                value: src,
            },
        ),
        PageCommand::RequestAnimationFrame => HostAction::RequestAnimationFrame,
        PageCommand::StopCountdown => HostAction::StopCountdown,
        PageCommand::Unobserve { role } => HostAction::Unobserve(target(*role, selectors)),
        PageCommand::ScrollToAnchor { id } => HostAction::ScrollIntoView { id },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_core::StyleProperty;
    use keepsake_core::command::{CLASS_ACTIVE, CLASS_VISIBLE};
    use pretty_assertions::assert_eq;

    #[test]
    fn style_commands_use_css_names() {
        let selectors = SelectorMap::default();
        let set = PageCommand::SetStyle {
            role: ElementRole::TrackContainer,
            property: StyleProperty::Position,
            value: "sticky".into(),
        };
        assert_eq!(
            translate(&set, &selectors),
            HostAction::Mutate {
                target: ElementTarget::Selector(".horizontal-gallery-container"),
                mutation: DomMutation::Style {
                    property: "position",
                    value: Some("sticky"),
                },
            }
        );

        let clear = PageCommand::ClearStyle {
            role: ElementRole::Body,
            property: StyleProperty::Overflow,
        };
        assert_eq!(
            translate(&clear, &selectors),
            HostAction::Mutate {
                target: ElementTarget::Selector("body"),
                mutation: DomMutation::Style {
                    property: "overflow",
                    value: None,
                },
            }
        );
    }

    #[test]
    fn lightbox_source_becomes_src_attribute() {
        let selectors = SelectorMap::default();
        let command = PageCommand::SetImageSource {
            role: ElementRole::LightboxImage,
            src: "images/vertical/4.jpg".into(),
        };
        assert_eq!(
            translate(&command, &selectors),
            HostAction::Mutate {
                target: ElementTarget::Selector("#lightbox-img"),
                mutation: DomMutation::Attribute {
                    name: "src",
                    value: "images/vertical/4.jpg",
                },
            }
        );
    }

    #[test]
    fn sections_are_addressed_by_index() {
        let selectors = SelectorMap::default();
        let reveal = PageCommand::SetClass {
            role: ElementRole::Section(3),
            class: CLASS_VISIBLE,
            enabled: true,
        };
        assert_eq!(
            translate(&reveal, &selectors),
            HostAction::Mutate {
                target: ElementTarget::Section(3),
                mutation: DomMutation::Class {
                    name: "visible",
                    enabled: true,
                },
            }
        );
        let unobserve = PageCommand::Unobserve {
            role: ElementRole::Section(3),
        };
        assert_eq!(
            translate(&unobserve, &selectors),
            HostAction::Unobserve(ElementTarget::Section(3))
        );
    }

    #[test]
    fn host_only_commands() {
        let selectors = SelectorMap::default();
        assert_eq!(
            translate(&PageCommand::RequestAnimationFrame, &selectors),
            HostAction::RequestAnimationFrame
        );
        assert_eq!(
            translate(&PageCommand::StopCountdown, &selectors),
            HostAction::StopCountdown
        );
        let scroll = PageCommand::ScrollToAnchor { id: "rsvp".into() };
        assert_eq!(
            translate(&scroll, &selectors),
            HostAction::ScrollIntoView { id: "rsvp" }
        );
    }

    #[test]
    fn overridden_selectors_are_honored() {
        let selectors = SelectorMap {
            lightbox: "#viewer".into(),
            ..SelectorMap::default()
        };
        let command = PageCommand::SetClass {
            role: ElementRole::Lightbox,
            class: CLASS_ACTIVE,
            enabled: false,
        };
        assert_eq!(
            translate(&command, &selectors),
            HostAction::Mutate {
                target: ElementTarget::Selector("#viewer"),
                mutation: DomMutation::Class {
                    name: "active",
                    enabled: false,
                },
            }
        );
    }
}
