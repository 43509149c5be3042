//! Host page access.
//!
//! Components never hold element references; they look elements up by id
//! on every access, so an element removed from the page is simply absent
//! the next time it is asked for.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// The operations components need from the host page.
///
/// Setters return `false` when the element is not attached.
pub trait Dom: Send + Sync {
    fn contains(&self, id: &str) -> bool;
    fn attribute(&self, id: &str, name: &str) -> Option<String>;
    fn set_attribute(&self, id: &str, name: &str, value: &str) -> bool;
    fn inner_html(&self, id: &str) -> Option<String>;
    fn set_inner_html(&self, id: &str, html: &str) -> bool;
    fn add_class(&self, id: &str, class: &str) -> bool;
    fn remove_class(&self, id: &str, class: &str) -> bool;
    fn has_class(&self, id: &str, class: &str) -> bool;
    /// Open `url` in the browsing context named `target`.
    fn open_window(&self, url: &str, target: &str);
    /// Show a transient notification.
    fn notify(&self, message: &str, kind: NoticeKind);
}

#[derive(Debug, Default, Clone)]
struct Element {
    attributes: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    inner_html: String,
}

#[derive(Debug, Default)]
struct Page {
    elements: HashMap<String, Element>,
    opened: Vec<(String, String)>,
    notices: Vec<(String, NoticeKind)>,
}

/// In-memory page used by tests and headless hosts.
///
/// Records opened windows and notifications so they can be inspected.
#[derive(Debug, Default)]
pub struct MemoryDom {
    page: RwLock<Page>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an empty element. Replaces any element with the same id.
    pub fn insert(&self, id: &str) -> &Self {
        self.write().elements.insert(id.to_string(), Element::default());
        self
    }

    /// Attach an element with the given `data-*`/plain attributes.
    pub fn insert_with_attributes(&self, id: &str, attributes: &[(&str, &str)]) -> &Self {
        let element = Element {
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Element::default()
        };
        self.write().elements.insert(id.to_string(), element);
        self
    }

    /// Detach an element. Returns `false` if it was not attached.
    pub fn remove(&self, id: &str) -> bool {
        self.write().elements.remove(id).is_some()
    }

    /// Windows opened so far, as `(url, target)`.
    pub fn opened_windows(&self) -> Vec<(String, String)> {
        self.read().opened.clone()
    }

    /// Notifications shown so far.
    pub fn notifications(&self) -> Vec<(String, NoticeKind)> {
        self.read().notices.clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Page> {
        self.page.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Page> {
        self.page.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_element<T>(&self, id: &str, f: impl FnOnce(&mut Element) -> T) -> Option<T> {
        self.write().elements.get_mut(id).map(f)
    }
}

impl Dom for MemoryDom {
    fn contains(&self, id: &str) -> bool {
        self.read().elements.contains_key(id)
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.read()
            .elements
            .get(id)
            .and_then(|e| e.attributes.get(name).cloned())
    }

    fn set_attribute(&self, id: &str, name: &str, value: &str) -> bool {
        self.with_element(id, |e| {
            e.attributes.insert(name.to_string(), value.to_string());
        })
        .is_some()
    }

    fn inner_html(&self, id: &str) -> Option<String> {
        self.read().elements.get(id).map(|e| e.inner_html.clone())
    }

    fn set_inner_html(&self, id: &str, html: &str) -> bool {
        self.with_element(id, |e| e.inner_html = html.to_string())
            .is_some()
    }

    fn add_class(&self, id: &str, class: &str) -> bool {
        self.with_element(id, |e| {
            e.classes.insert(class.to_string());
        })
        .is_some()
    }

    fn remove_class(&self, id: &str, class: &str) -> bool {
        self.with_element(id, |e| {
            e.classes.remove(class);
        })
        .is_some()
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.read()
            .elements
            .get(id)
            .is_some_and(|e| e.classes.contains(class))
    }

    fn open_window(&self, url: &str, target: &str) {
        self.write()
            .opened
            .push((url.to_string(), target.to_string()));
    }

    fn notify(&self, message: &str, kind: NoticeKind) {
        self.write().notices.push((message.to_string(), kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_fail_on_missing_element() {
        let dom = MemoryDom::new();
        assert!(!dom.set_inner_html("nope", "<p></p>"));
        assert!(!dom.add_class("nope", "x"));
        assert_eq!(dom.inner_html("nope"), None);
    }

    #[test]
    fn test_classes_and_attributes() {
        let dom = MemoryDom::new();
        dom.insert_with_attributes("map", &[("data-lat", "44.4")]);
        assert_eq!(dom.attribute("map", "data-lat").as_deref(), Some("44.4"));

        assert!(dom.add_class("map", "map-fullscreen"));
        assert!(dom.has_class("map", "map-fullscreen"));
        assert!(dom.remove_class("map", "map-fullscreen"));
        assert!(!dom.has_class("map", "map-fullscreen"));
    }

    #[test]
    fn test_removed_element_is_gone() {
        let dom = MemoryDom::new();
        dom.insert("nearby");
        assert!(dom.remove("nearby"));
        assert!(!dom.contains("nearby"));
        assert!(!dom.remove("nearby"));
    }
}
