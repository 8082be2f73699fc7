use chrono::{TimeZone, Utc};
use feedcal_gdata::{Entry, EventStatus, Person};

fn tennis() -> Entry {
    let mut entry = Entry::new();
    entry.set_title("Tennis with Beth");
    entry.set_content("Meet for a quick lesson.");
    entry
        .set_when(
            Utc.with_ymd_and_hms(2007, 4, 17, 15, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2007, 4, 17, 17, 0, 0).unwrap(),
            false,
        )
        .unwrap();
    entry.set_status(EventStatus::Confirmed);
    entry.set_location("Rolling Lawn Courts");
    entry
}

#[test]
fn new_event_document() {
    let xml = tennis().to_xml().unwrap();
    insta::assert_snapshot!(xml, @r##"<?xml version="1.0" encoding="UTF-8"?><entry xmlns="http://www.w3.org/2005/Atom" xmlns:gd="http://schemas.google.com/g/2005"><category scheme="http://schemas.google.com/g/2005#kind" term="http://schemas.google.com/g/2005#event"/><title type="text">Tennis with Beth</title><content type="text">Meet for a quick lesson.</content><gd:when startTime="2007-04-17T15:00:00.000Z" endTime="2007-04-17T17:00:00.000Z"/><gd:eventStatus value="http://schemas.google.com/g/2005#event.confirmed"/><gd:where valueString="Rolling Lawn Courts"/></entry>"##);
}

#[test]
fn document_survives_a_reparse() {
    let original = tennis();
    let reparsed = Entry::parse(&original.to_xml().unwrap()).unwrap();

    assert_eq!(reparsed.title(), original.title());
    assert_eq!(reparsed.status(), Some(EventStatus::Confirmed));
    assert_eq!(reparsed.location().as_deref(), Some("Rolling Lawn Courts"));
    assert_eq!(reparsed.when(), original.when());
}

#[test]
fn attendees_serialize_for_json_output() {
    let mut entry = tennis();
    entry.set_attendees(&[Person::new("Beth", "beth@example.com"), Person::with_email("jo@example.com")]);

    let json = serde_json::to_value(entry.attendees()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            { "name": "Beth", "email": "beth@example.com" },
            { "name": null, "email": "jo@example.com" },
        ])
    );
}
