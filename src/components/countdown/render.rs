//! Turns an [`EventInfo`] into writes on the container's bound elements.
//!
//! [`render`] is pure; [`apply`] performs the writes. Fields are looked up once
//! through [`FieldBindings`] rather than queried on every tick.

use super::models::EventInfo;
use crate::markup::{Document, Element, ElementPath};
use crate::utils::time::{format_event_time, relative_time};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// Output slots a container can mark with attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Link,
    Name,
    Location,
    Countdown,
    Start,
    End,
    Now,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Link,
        Field::Name,
        Field::Location,
        Field::Countdown,
        Field::Start,
        Field::End,
        Field::Now,
    ];

    /// Attribute marking an element as this field's target
    pub fn marker(&self) -> &'static str {
        match self {
            Field::Link => "ec-link",
            Field::Name => "ec-name",
            Field::Location => "ec-location",
            Field::Countdown => "ec-countdown",
            Field::Start => "ec-start",
            Field::End => "ec-end",
            Field::Now => "ec-now",
        }
    }
}

/// Field to element binding table for one container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBindings {
    bindings: BTreeMap<Field, Vec<ElementPath>>,
}

impl FieldBindings {
    /// Collect every marked element inside the container, the container included
    pub fn discover(document: &Document, container: &ElementPath) -> Self {
        let mut bindings = BTreeMap::new();
        for field in Field::ALL {
            let paths: Vec<ElementPath> = document
                .find_all(|element| element.has_attribute(field.marker()))
                .into_iter()
                .filter(|path| container.contains(path))
                .collect();
            if !paths.is_empty() {
                bindings.insert(field, paths);
            }
        }
        Self { bindings }
    }

    pub fn bind(&mut self, field: Field, path: ElementPath) {
        self.bindings.entry(field).or_default().push(path);
    }

    pub fn paths(&self, field: Field) -> &[ElementPath] {
        self.bindings.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_bound(&self, field: Field) -> bool {
        !self.paths(field).is_empty()
    }
}

/// A single overwrite of a bound element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Attribute { name: &'static str, value: String },
    Text(String),
}

/// Everything one render pass writes, in field order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    writes: Vec<(Field, Write)>,
}

impl Rendering {
    pub fn writes(&self) -> &[(Field, Write)] {
        &self.writes
    }

    /// Text written to a field, if any
    pub fn text(&self, field: Field) -> Option<&str> {
        self.writes.iter().find_map(|(f, write)| match write {
            Write::Text(text) if *f == field => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Compute the writes for every field from the event and its virtual "now"
pub fn render(event: &EventInfo, timezone: Tz) -> Rendering {
    let local = |time: &chrono::DateTime<chrono::Utc>| format_event_time(&time.with_timezone(&timezone));

    let writes = vec![
        (
            Field::Link,
            Write::Attribute {
                name: "href",
                value: event.link.clone(),
            },
        ),
        (Field::Name, Write::Text(event.title.clone())),
        (
            Field::Location,
            Write::Text(event.location.clone().unwrap_or_default()),
        ),
        (
            Field::Countdown,
            Write::Text(relative_time(event.start_time, event.reference_now)),
        ),
        (Field::Start, Write::Text(local(&event.start_time))),
        (Field::End, Write::Text(local(&event.end_time))),
        (Field::Now, Write::Text(local(&event.reference_now))),
    ];

    Rendering { writes }
}

/// Write a rendering into the bound elements; unbound fields are skipped
pub fn apply(rendering: &Rendering, bindings: &FieldBindings, document: &mut Document) {
    for (field, write) in rendering.writes() {
        for path in bindings.paths(*field) {
            let Some(element) = document.get_mut(path) else {
                continue;
            };
            match write {
                Write::Attribute { name, value } => element.set_attribute(name, value),
                Write::Text(text) => element.set_text(text),
            }
        }
    }
}

/// Notice appended to a container missing a required attribute
pub fn missing_attribute_notice(attribute: &str) -> Element {
    Element::new("div")
        .with_attribute("class", "alert alert-danger")
        .with_attribute("role", "alert")
        .with_child(
            Element::new("p")
                .with_child(Element::new("strong").with_text("Error!").with_tail(format!(
                    " A valid \"{}\" attribute is required. Check the ",
                    attribute
                )))
                .with_child(
                    Element::new("a")
                        .with_attribute("href", "#")
                        .with_attribute("class", "alert-link")
                        .with_text("docs")
                        .with_tail(" for more info."),
                ),
        )
}

/// Content shown in place of the countdown when the fetch fails
pub fn failure_message() -> Element {
    Element::new("h2").with_text("Shoot, looks like something went wrong...")
}

/// Content shown when the calendar has no upcoming events
pub fn no_events_message() -> Element {
    Element::new("p").with_text("There are no upcoming events.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::CONTAINER_ATTRIBUTE;
    use chrono::{Duration, TimeZone, Utc};

    fn event() -> EventInfo {
        let start = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        EventInfo {
            start_time: start,
            end_time: start + Duration::minutes(90),
            title: "Weekly stream".to_string(),
            location: Some("Studio A".to_string()),
            link: "https://cal/1".to_string(),
            reference_now: start - Duration::hours(3),
        }
    }

    fn page() -> Document {
        Document::new(vec![
            Element::new("span").with_attribute("ec-name", "").with_text("outside"),
            Element::new("div")
                .with_attribute(CONTAINER_ATTRIBUTE, "")
                .with_child(
                    Element::new("a")
                        .with_attribute("ec-name", "")
                        .with_attribute("ec-link", "")
                        .with_attribute("href", "/")
                        .with_text("loading..."),
                )
                .with_child(Element::new("span").with_attribute("ec-countdown", ""))
                .with_child(Element::new("span").with_attribute("ec-location", ""))
                .with_child(Element::new("span").with_attribute("ec-start", ""))
                .with_child(Element::new("span").with_attribute("ec-end", "")),
        ])
    }

    #[test]
    fn test_bindings_are_scoped_to_container() {
        let document = page();
        let container = ElementPath::root(1);
        let bindings = FieldBindings::discover(&document, &container);

        assert_eq!(bindings.paths(Field::Name), &[container.child(0)]);
        assert_eq!(bindings.paths(Field::Link), &[container.child(0)]);
        assert_eq!(bindings.paths(Field::Countdown), &[container.child(1)]);
        assert!(!bindings.is_bound(Field::Now));
    }

    #[test]
    fn test_render_fields() {
        let rendering = render(&event(), Tz::UTC);

        assert_eq!(rendering.text(Field::Name), Some("Weekly stream"));
        assert_eq!(rendering.text(Field::Location), Some("Studio A"));
        assert_eq!(rendering.text(Field::Countdown), Some("in 3 hours"));
        assert_eq!(rendering.text(Field::Start), Some("March 5th @ 2:30:00 pm"));
        assert_eq!(rendering.text(Field::End), Some("March 5th @ 4:00:00 pm"));
        assert_eq!(rendering.text(Field::Now), Some("March 5th @ 11:30:00 am"));
        assert!(rendering.writes().contains(&(
            Field::Link,
            Write::Attribute {
                name: "href",
                value: "https://cal/1".to_string()
            }
        )));
    }

    #[test]
    fn test_render_absent_location_is_empty() {
        let mut event = event();
        event.location = None;
        assert_eq!(render(&event, Tz::UTC).text(Field::Location), Some(""));
    }

    #[test]
    fn test_apply_writes_bound_elements_only() {
        let mut document = page();
        let container = ElementPath::root(1);
        let bindings = FieldBindings::discover(&document, &container);

        apply(&render(&event(), Tz::UTC), &bindings, &mut document);

        let link = document.get(&container.child(0)).unwrap();
        assert_eq!(link.attribute("href"), Some("https://cal/1"));
        assert_eq!(link.text, "Weekly stream");
        assert_eq!(document.get(&container.child(1)).unwrap().text, "in 3 hours");
        assert_eq!(document.get(&container.child(2)).unwrap().text, "Studio A");
        assert_eq!(document.elements[0].text, "outside");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut document = page();
        let container = ElementPath::root(1);
        let bindings = FieldBindings::discover(&document, &container);
        let rendering = render(&event(), Tz::UTC);

        apply(&rendering, &bindings, &mut document);
        let first = document.to_html();
        apply(&rendering, &bindings, &mut document);

        assert_eq!(document.to_html(), first);
        assert_eq!(render(&event(), Tz::UTC), rendering);
    }

    #[test]
    fn test_apply_skips_stale_paths() {
        let mut document = page();
        let mut bindings = FieldBindings::default();
        bindings.bind(Field::Name, ElementPath::root(7).child(3));

        apply(&render(&event(), Tz::UTC), &bindings, &mut document);
        assert_eq!(document, page());
    }

    #[test]
    fn test_messages() {
        let notice = missing_attribute_notice("api-key");
        assert_eq!(notice.attribute("role"), Some("alert"));
        assert_eq!(
            notice.text_content(),
            "Error! A valid \"api-key\" attribute is required. Check the docs for more info."
        );
        assert_eq!(
            notice.to_html(),
            "<div class=\"alert alert-danger\" role=\"alert\"><p><strong>Error!</strong> \
             A valid &quot;api-key&quot; attribute is required. Check the \
             <a class=\"alert-link\" href=\"#\">docs</a> for more info.</p></div>"
        );
        assert_eq!(
            failure_message().text_content(),
            "Shoot, looks like something went wrong..."
        );
        assert_eq!(no_events_message().tag, "p");
    }
}
