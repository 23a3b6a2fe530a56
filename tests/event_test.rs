//! Tests for event equality and rendering.

use rgraph_exec::{Event, EventList, Key, ResourceId};

fn id(name: &str) -> ResourceId {
    ResourceId::new("proj1", "res1", Key::global(name))
}

#[test]
fn equality_is_structural() {
    assert_eq!(Event::string("a"), Event::string("a"));
    assert_ne!(Event::string("a"), Event::string("b"));
    assert_eq!(Event::exists(id("x")), Event::exists(id("x")));
    assert_ne!(Event::exists(id("x")), Event::exists(id("y")));
    assert_ne!(Event::exists(id("x")), Event::not_exists(id("x")));
    assert_ne!(
        Event::drop_ref(id("x"), id("y")),
        Event::drop_ref(id("y"), id("x"))
    );
}

#[test]
fn same_name_in_different_scopes_differs() {
    let global = ResourceId::new("p", "addresses", Key::global("ip"));
    let regional = ResourceId::new("p", "addresses", Key::regional("us-east1", "ip"));
    assert_ne!(Event::exists(global), Event::exists(regional));
}

#[test]
fn rendering() {
    assert_eq!(Event::string("a").to_string(), "StringEvent(a)");
    assert_eq!(Event::exists(id("x")).to_string(), "Exists(res1:proj1/x)");
    assert_eq!(
        Event::not_exists(id("x")).to_string(),
        "NotExists(res1:proj1/x)"
    );
    assert_eq!(
        Event::drop_ref(id("x"), id("y")).to_string(),
        "DropRef(res1:proj1/x => res1:proj1/y)"
    );
}

#[test]
fn resource_id_rendering() {
    assert_eq!(id("x").to_string(), "res1:proj1/x");
    assert_eq!(
        ResourceId::new("p", "instances", Key::zonal("us-east1-b", "vm")).to_string(),
        "instances:p/zones/us-east1-b/vm"
    );
    assert_eq!(Key::regional("r", "n").name(), "n");
}

#[test]
fn event_list_rendering() {
    assert_eq!(EventList(&[]).to_string(), "[]");
    assert_eq!(
        EventList(&[Event::string("a"), Event::exists(id("x"))]).to_string(),
        "[StringEvent(a) Exists(res1:proj1/x)]"
    );
}

#[test]
fn events_deserialize_from_plan_syntax() {
    let event: Event = serde_json::from_str(
        r#"{"exists": {"project_id": "proj1", "resource": "res1", "key": {"global": "x"}}}"#,
    )
    .unwrap();
    assert_eq!(event, Event::exists(id("x")));

    let event: Event = serde_json::from_str(r#"{"string": "a"}"#).unwrap();
    assert_eq!(event, Event::string("a"));
}
